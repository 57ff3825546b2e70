use crate::prelude::{eprintln, println, *};
use colored::Colorize;
use tokio_util::sync::CancellationToken;
use twquery_core::expression::{field, Expr};
use twquery_core::processor::Record;
use twquery_core::twitter::{Status, StatusQuery, StatusType};

/// Timeline to read
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum TimelineKind {
    Friends,
    Home,
    Mentions,
    Public,
    Retweets,
    RetweetedByMe,
    RetweetedToMe,
    RetweetsOfMe,
    RetweetedByUser,
    RetweetedToUser,
    Show,
    User,
}

impl From<TimelineKind> for StatusType {
    fn from(kind: TimelineKind) -> Self {
        match kind {
            TimelineKind::Friends => StatusType::Friends,
            TimelineKind::Home => StatusType::Home,
            TimelineKind::Mentions => StatusType::Mentions,
            TimelineKind::Public => StatusType::Public,
            TimelineKind::Retweets => StatusType::Retweets,
            TimelineKind::RetweetedByMe => StatusType::RetweetedByMe,
            TimelineKind::RetweetedToMe => StatusType::RetweetedToMe,
            TimelineKind::RetweetsOfMe => StatusType::RetweetsOfMe,
            TimelineKind::RetweetedByUser => StatusType::RetweetedByUser,
            TimelineKind::RetweetedToUser => StatusType::RetweetedToUser,
            TimelineKind::Show => StatusType::Show,
            TimelineKind::User => StatusType::User,
        }
    }
}

#[derive(Debug, clap::Args)]
#[command(after_help = "EXAMPLES:
  # Read a single tweet:
  twquery timeline show --id 945932078

  # Latest 20 tweets of a user, including retweets:
  twquery timeline user --screen-name JoeMayo --count 20 --include-rts")]
pub struct TimelineOptions {
    /// Timeline kind
    #[arg(value_enum)]
    pub kind: TimelineKind,

    /// Status id, or user id / screen name for user timelines
    #[arg(long)]
    pub id: Option<String>,

    #[arg(long)]
    pub user_id: Option<String>,

    #[arg(long)]
    pub screen_name: Option<String>,

    /// Only statuses newer than this id
    #[arg(long)]
    pub since_id: Option<u64>,

    /// Only statuses up to and including this id
    #[arg(long)]
    pub max_id: Option<u64>,

    #[arg(short, long)]
    pub count: Option<u32>,

    #[arg(short, long)]
    pub page: Option<u32>,

    #[arg(long)]
    pub include_rts: bool,

    #[arg(long)]
    pub exclude_replies: bool,

    #[arg(long)]
    pub include_entities: bool,

    #[arg(long)]
    pub trim_user: bool,

    #[arg(long)]
    pub contributor_details: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl TimelineOptions {
    fn expression(&self) -> Expr {
        let mut expr = field("type").eq(StatusType::from(self.kind));

        let texts = [
            ("id", &self.id),
            ("user_id", &self.user_id),
            ("screen_name", &self.screen_name),
        ];
        for (name, value) in texts {
            if let Some(value) = value {
                expr = expr.and(field(name).eq(value));
            }
        }

        let numbers = [
            ("since_id", self.since_id),
            ("max_id", self.max_id),
            ("count", self.count.map(u64::from)),
            ("page", self.page.map(u64::from)),
        ];
        for (name, value) in numbers {
            if let Some(value) = value {
                expr = expr.and(field(name).eq(value));
            }
        }

        let flags = [
            ("include_rts", self.include_rts),
            ("exclude_replies", self.exclude_replies),
            ("include_entities", self.include_entities),
            ("trim_user", self.trim_user),
            ("contributor_details", self.contributor_details),
        ];
        for (name, set) in flags {
            if set {
                expr = expr.and(field(name).eq(true));
            }
        }

        expr
    }
}

pub async fn run(
    options: TimelineOptions,
    global: crate::Global,
    cancel: CancellationToken,
) -> Result<()> {
    let ctx = global.context()?;
    let expr = options.expression();

    if global.verbose {
        eprintln!("Query: {expr}");
    }

    let records = ctx.query(&ctx.status(), &expr, &cancel).await?;

    if options.json {
        println!("{}", to_json(&records)?);
    } else {
        print_statuses(&records);
    }

    Ok(())
}

fn print_statuses(records: &[Record<StatusQuery, Status>]) {
    let statuses: Vec<&Status> = records
        .iter()
        .map(|r| &r.item)
        .filter(|s| !s.id.is_empty())
        .collect();

    if statuses.is_empty() {
        println!("{}", "No statuses found.".yellow());
        return;
    }

    let mut table = new_table();
    table.add_row(prettytable::row![
        "ID".bold().cyan(),
        "Created".bold().cyan(),
        "User".bold().cyan(),
        "Text".bold().cyan()
    ]);

    for status in statuses {
        let created = status
            .created_at
            .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();

        table.add_row(prettytable::row![
            status.id.bright_white(),
            created.bright_black(),
            f!("@{}", status.user.screen_name).green(),
            truncate(&status.text, 80)
        ]);
    }

    table.printstd();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Debug, clap::Parser)]
    struct Cli {
        #[command(flatten)]
        options: TimelineOptions,
    }

    #[test]
    fn test_expression_from_flags() {
        let cli = Cli::parse_from([
            "twquery",
            "user",
            "--screen-name",
            "JoeMayo",
            "--count",
            "20",
            "--include-rts",
        ]);

        assert_eq!(
            cli.options.expression().to_string(),
            "(((type == User && screen_name == \"JoeMayo\") && count == 20) && include_rts == true)"
        );
    }

    #[test]
    fn test_unset_flags_are_not_sent() {
        let cli = Cli::parse_from(["twquery", "public"]);
        assert_eq!(cli.options.expression().to_string(), "type == Public");
    }
}
