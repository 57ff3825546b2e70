use crate::prelude::{eprintln, println, *};
use colored::Colorize;
use tokio_util::sync::CancellationToken;
use twquery_core::expression::{field, Expr};
use twquery_core::twitter::{Search, SearchType};

#[derive(Debug, clap::Args)]
#[command(after_help = "EXAMPLES:
  # Last 30 days:
  twquery search dev \"#rustlang\"

  # Full archive, first three pages, bounded in time:
  twquery search dev \"from:JoeMayo\" --full-archive --pages 3 \\
    --since 2019-01-01T00:00:00Z --until 2019-06-30T23:59:00Z")]
pub struct SearchOptions {
    /// Dev environment label
    pub environment: String,

    /// Search query, in premium search syntax
    pub query: String,

    /// Search the full archive instead of the last 30 days
    #[arg(long)]
    pub full_archive: bool,

    /// Results per page
    #[arg(short, long)]
    pub count: Option<u32>,

    /// Oldest tweet date (RFC 3339)
    #[arg(long)]
    pub since: Option<String>,

    /// Newest tweet date (RFC 3339)
    #[arg(long)]
    pub until: Option<String>,

    /// `next` token of the page to start from
    #[arg(long)]
    pub next: Option<String>,

    /// Number of pages to fetch, following `next` tokens
    #[arg(long, default_value = "1")]
    pub pages: usize,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl SearchOptions {
    fn kind(&self) -> SearchType {
        if self.full_archive {
            SearchType::FullArchive
        } else {
            SearchType::ThirtyDays
        }
    }

    fn expression(&self, page: Option<&str>) -> Expr {
        let mut expr = field("type")
            .eq(self.kind())
            .and(field("environment_name").eq(&self.environment))
            .and(field("query").eq(&self.query));

        if let Some(count) = self.count {
            expr = expr.and(field("count").eq(count));
        }
        if let Some(since) = &self.since {
            expr = expr.and(field("since").eq(since));
        }
        if let Some(until) = &self.until {
            expr = expr.and(field("until").eq(until));
        }
        if let Some(page) = page {
            expr = expr.and(field("page").eq(page));
        }

        expr
    }
}

pub async fn run(
    options: SearchOptions,
    global: crate::Global,
    cancel: CancellationToken,
) -> Result<()> {
    let ctx = global.context()?;
    let processor = ctx.search();

    let mut pages: Vec<Search> = Vec::new();
    let mut next = options.next.clone();

    for _ in 0..options.pages.max(1) {
        let expr = options.expression(next.as_deref());

        if global.verbose {
            eprintln!("Query: {expr}");
        }

        let page = ctx
            .query(&processor, &expr, &cancel)
            .await?
            .into_iter()
            .next()
            .map(|record| record.into_item())
            .unwrap_or_default();

        next = page.next_page.clone();
        pages.push(page);

        if next.is_none() {
            break;
        }
    }

    if options.json {
        println!("{}", to_json(&pages)?);
    } else {
        print_pages(&pages);
    }

    Ok(())
}

fn print_pages(pages: &[Search]) {
    let total: usize = pages.iter().map(|p| p.statuses.len()).sum();

    if total == 0 {
        println!("{}", "No results found.".yellow());
        return;
    }

    let mut table = new_table();
    table.add_row(prettytable::row![
        "ID".bold().cyan(),
        "User".bold().cyan(),
        "Text".bold().cyan()
    ]);

    for status in pages.iter().flat_map(|p| p.statuses.iter()) {
        table.add_row(prettytable::row![
            status.id.bright_white(),
            f!("@{}", status.user.screen_name).green(),
            truncate(&status.text, 90)
        ]);
    }

    table.printstd();

    println!();
    println!(
        "{} {} result(s) across {} page(s)",
        "Total:".bold(),
        total,
        pages.len()
    );

    if let Some(next) = pages.last().and_then(|p| p.next_page.as_deref()) {
        println!("{} {}", "Next page:".bold(), next.bright_black());
    }
}
