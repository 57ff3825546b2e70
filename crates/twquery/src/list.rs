use crate::prelude::{eprintln, println, *};
use colored::Colorize;
use tokio_util::sync::CancellationToken;
use twquery_core::expression::{field, Expr};
use twquery_core::processor::Record;
use twquery_core::twitter::commands::{ListTarget, Members, UserTarget};
use twquery_core::twitter::{CommandResponse, List, ListQuery, ListResponse, ListType, User};

/// List query to run
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum ListKind {
    Lists,
    Show,
    Statuses,
    Members,
    IsMember,
    Subscribers,
    IsSubscribed,
    Memberships,
    Subscriptions,
    Ownerships,
}

impl From<ListKind> for ListType {
    fn from(kind: ListKind) -> Self {
        match kind {
            ListKind::Lists => ListType::Lists,
            ListKind::Show => ListType::Show,
            ListKind::Statuses => ListType::Statuses,
            ListKind::Members => ListType::Members,
            ListKind::IsMember => ListType::IsMember,
            ListKind::Subscribers => ListType::Subscribers,
            ListKind::IsSubscribed => ListType::IsSubscribed,
            ListKind::Memberships => ListType::Memberships,
            ListKind::Subscriptions => ListType::Subscriptions,
            ListKind::Ownerships => ListType::Ownerships,
        }
    }
}

/// List addressed by id, or by slug plus owner
#[derive(Debug, Clone, clap::Args)]
pub struct ListTargetArgs {
    #[arg(long)]
    pub list_id: Option<u64>,

    #[arg(long)]
    pub slug: Option<String>,

    #[arg(long)]
    pub owner_id: Option<u64>,

    #[arg(long)]
    pub owner_screen_name: Option<String>,
}

impl ListTargetArgs {
    fn target(&self) -> ListTarget {
        ListTarget::new(
            self.list_id.unwrap_or_default(),
            self.slug.as_deref().unwrap_or_default(),
            self.owner_id.unwrap_or_default(),
            self.owner_screen_name.as_deref(),
        )
    }
}

/// Single user, by id or screen name
#[derive(Debug, Clone, clap::Args)]
pub struct UserArgs {
    #[arg(long, conflicts_with = "screen_name")]
    pub user_id: Option<u64>,

    #[arg(long)]
    pub screen_name: Option<String>,
}

impl UserArgs {
    fn target(&self) -> UserTarget {
        match (self.user_id, &self.screen_name) {
            (Some(id), _) => UserTarget::Id(id),
            (None, Some(name)) => UserTarget::ScreenName(name.clone()),
            (None, None) => UserTarget::Id(0),
        }
    }
}

/// Batch of users, by ids or screen names (comma separated)
#[derive(Debug, Clone, clap::Args)]
pub struct MembersArgs {
    #[arg(long, value_delimiter = ',', conflicts_with = "screen_names")]
    pub user_ids: Vec<u64>,

    #[arg(long, value_delimiter = ',')]
    pub screen_names: Vec<String>,
}

impl MembersArgs {
    fn members(&self) -> Members {
        if self.screen_names.is_empty() {
            Members::UserIds(self.user_ids.clone())
        } else {
            Members::ScreenNames(self.screen_names.clone())
        }
    }
}

#[derive(Debug, clap::Args)]
pub struct QueryOptions {
    /// List query kind
    #[arg(value_enum)]
    pub kind: ListKind,

    #[command(flatten)]
    pub list: ListTargetArgs,

    #[command(flatten)]
    pub user: UserArgs,

    #[arg(long)]
    pub since_id: Option<u64>,

    #[arg(long)]
    pub max_id: Option<u64>,

    #[arg(short, long)]
    pub count: Option<u32>,

    /// Page cursor; -1 starts from the first page
    #[arg(long, allow_hyphen_values = true)]
    pub cursor: Option<i64>,

    #[arg(long)]
    pub reverse: bool,

    #[arg(long)]
    pub include_entities: bool,

    #[arg(long)]
    pub include_rts: bool,

    #[arg(long)]
    pub skip_status: bool,

    #[arg(long)]
    pub filter_to_owned_lists: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl QueryOptions {
    fn expression(&self) -> Expr {
        let mut expr = field("type").eq(ListType::from(self.kind));

        let texts = [
            ("slug", &self.list.slug),
            ("owner_screen_name", &self.list.owner_screen_name),
            ("screen_name", &self.user.screen_name),
        ];
        for (name, value) in texts {
            if let Some(value) = value {
                expr = expr.and(field(name).eq(value));
            }
        }

        let ids = [
            ("list_id", self.list.list_id),
            ("owner_id", self.list.owner_id),
            ("user_id", self.user.user_id),
            ("since_id", self.since_id),
            ("max_id", self.max_id),
            ("count", self.count.map(u64::from)),
        ];
        for (name, value) in ids {
            if let Some(value) = value {
                expr = expr.and(field(name).eq(value));
            }
        }

        if let Some(cursor) = self.cursor {
            expr = expr.and(field("cursor").eq(cursor));
        }

        let flags = [
            ("reverse", self.reverse),
            ("include_entities", self.include_entities),
            ("include_rts", self.include_rts),
            ("skip_status", self.skip_status),
            ("filter_to_owned_lists", self.filter_to_owned_lists),
        ];
        for (name, set) in flags {
            if set {
                expr = expr.and(field(name).eq(true));
            }
        }

        expr
    }
}

#[derive(Debug, clap::Parser)]
#[command(after_help = "EXAMPLES:
  # Lists owned by a user:
  twquery list query ownerships --screen-name JoeMayo

  # Members of a list addressed by slug:
  twquery list query members --slug linq --owner-screen-name JoeMayo

  # Add several members at once:
  twquery list add-members --list-id 1234 --screen-names alice,bob")]
pub enum Commands {
    /// Run a list query
    Query(QueryOptions),

    /// Create a list
    Create {
        name: String,

        #[arg(long, default_value = "")]
        description: String,

        #[arg(long)]
        private: bool,

        #[arg(long)]
        json: bool,
    },

    /// Update a list's name, description or visibility
    Update {
        id: String,

        #[arg(long, default_value = "")]
        name: String,

        #[arg(long, default_value = "")]
        description: String,

        #[arg(long)]
        private: bool,

        #[arg(long)]
        json: bool,
    },

    /// Delete a list
    Delete {
        id: String,

        #[arg(long)]
        json: bool,
    },

    /// Add one user to a list
    AddMember {
        #[command(flatten)]
        user: UserArgs,

        #[command(flatten)]
        list: ListTargetArgs,

        #[arg(long)]
        json: bool,
    },

    /// Add a user to a list by id (v2)
    AddListMember {
        list_id: String,
        user_id: String,

        #[arg(long)]
        json: bool,
    },

    /// Remove a user from a list by id (v2)
    DeleteListMember {
        list_id: String,
        user_id: String,

        #[arg(long)]
        json: bool,
    },

    /// Add up to 100 users to a list
    AddMembers {
        #[command(flatten)]
        members: MembersArgs,

        #[command(flatten)]
        list: ListTargetArgs,

        #[arg(long)]
        json: bool,
    },

    /// Remove one user from a list
    RemoveMember {
        #[command(flatten)]
        user: UserArgs,

        #[command(flatten)]
        list: ListTargetArgs,

        #[arg(long)]
        json: bool,
    },

    /// Remove up to 100 users from a list
    RemoveMembers {
        #[command(flatten)]
        members: MembersArgs,

        #[command(flatten)]
        list: ListTargetArgs,

        #[arg(long)]
        json: bool,
    },

    /// Subscribe the authenticated user to a list
    Subscribe {
        #[command(flatten)]
        list: ListTargetArgs,

        #[arg(long)]
        json: bool,
    },

    /// Unsubscribe the authenticated user from a list
    Unsubscribe {
        #[command(flatten)]
        list: ListTargetArgs,

        #[arg(long)]
        json: bool,
    },
}

pub async fn run(cmd: Commands, global: crate::Global, cancel: CancellationToken) -> Result<()> {
    let ctx = global.context()?;

    match cmd {
        Commands::Query(options) => {
            let expr = options.expression();
            if global.verbose {
                eprintln!("Query: {expr}");
            }

            let records = ctx.query(&ctx.list(), &expr, &cancel).await?;

            if options.json {
                println!("{}", to_json(&records)?);
            } else {
                print_records(&records);
            }
        }
        Commands::Create {
            name,
            description,
            private,
            json,
        } => {
            let response = ctx.create_list(&name, &description, private, &cancel).await?;
            print_v2(&response, "created", json)?;
        }
        Commands::Update {
            id,
            name,
            description,
            private,
            json,
        } => {
            let response = ctx
                .update_list(&id, &name, &description, private, &cancel)
                .await?;
            print_v2(&response, "updated", json)?;
        }
        Commands::Delete { id, json } => {
            let response = ctx.delete_list(&id, &cancel).await?;
            print_v2(&response, "deleted", json)?;
        }
        Commands::AddMember { user, list, json } => {
            let response = ctx
                .add_member_to_list(&user.target(), &list.target(), &cancel)
                .await?;
            print_v1(&response, json)?;
        }
        Commands::AddListMember {
            list_id,
            user_id,
            json,
        } => {
            let response = ctx.add_list_member(&list_id, &user_id, &cancel).await?;
            print_v2(&response, "added", json)?;
        }
        Commands::DeleteListMember {
            list_id,
            user_id,
            json,
        } => {
            let response = ctx.delete_list_member(&list_id, &user_id, &cancel).await?;
            print_v2(&response, "removed", json)?;
        }
        Commands::AddMembers {
            members,
            list,
            json,
        } => {
            let response = ctx
                .add_members_to_list(&list.target(), &members.members(), &cancel)
                .await?;
            print_v1(&response, json)?;
        }
        Commands::RemoveMember { user, list, json } => {
            let response = ctx
                .remove_member_from_list(&user.target(), &list.target(), &cancel)
                .await?;
            print_v1(&response, json)?;
        }
        Commands::RemoveMembers {
            members,
            list,
            json,
        } => {
            let response = ctx
                .remove_members_from_list(&list.target(), &members.members(), &cancel)
                .await?;
            print_v1(&response, json)?;
        }
        Commands::Subscribe { list, json } => {
            let response = ctx.subscribe_to_list(&list.target(), &cancel).await?;
            print_v1(&response, json)?;
        }
        Commands::Unsubscribe { list, json } => {
            let response = ctx.unsubscribe_from_list(&list.target(), &cancel).await?;
            print_v1(&response, json)?;
        }
    }

    Ok(())
}

fn print_v2(response: &CommandResponse<ListResponse>, action: &str, json: bool) -> Result<()> {
    if json {
        println!("{}", to_json(&response.data)?);
        return Ok(());
    }

    match &response.data.data {
        Some(data) if data.is_member.is_some() => {
            let member = if data.is_member == Some(true) {
                "member".green()
            } else {
                "not a member".yellow()
            };
            println!("{} user is now {}", action.green(), member);
        }
        Some(data) => {
            let id = data.id.as_deref().unwrap_or("-");
            let name = data.name.as_deref().unwrap_or_default();
            println!("{} list {} {}", action.green(), id.bright_white(), name);
        }
        None => println!("{}", "Empty response".yellow()),
    }

    Ok(())
}

fn print_v1(response: &CommandResponse<List>, json: bool) -> Result<()> {
    if json {
        println!("{}", to_json(&response.data)?);
        return Ok(());
    }

    let list = &response.data;
    println!(
        "{} {} ({} members, {} subscribers)",
        list.full_name.bright_white(),
        list.id.bright_black(),
        list.member_count,
        list.subscriber_count
    );

    Ok(())
}

fn print_records(records: &[Record<ListQuery, List>]) {
    let Some(first) = records.first() else {
        println!("{}", "No lists found.".yellow());
        return;
    };

    match first.query.kind {
        ListType::Members | ListType::Subscribers | ListType::IsMember | ListType::IsSubscribed => {
            print_users(first);
        }
        ListType::Statuses => {
            for status in &first.statuses {
                println!(
                    "{} {} {}",
                    status.id.bright_black(),
                    f!("@{}", status.user.screen_name).green(),
                    truncate(&status.text, 90)
                );
            }
        }
        _ => print_lists(records),
    }
}

fn print_lists(records: &[Record<ListQuery, List>]) {
    let mut table = new_table();
    table.add_row(prettytable::row![
        "ID".bold().cyan(),
        "Name".bold().cyan(),
        "Mode".bold().cyan(),
        "Members".bold().cyan(),
        "Subscribers".bold().cyan()
    ]);

    for list in records.iter().map(|r| &r.item) {
        table.add_row(prettytable::row![
            list.id.bright_white(),
            list.full_name,
            list.mode.as_deref().unwrap_or_default(),
            list.member_count,
            list.subscriber_count
        ]);
    }

    table.printstd();

    if let Some(cursors) = records.last().map(|r| &r.cursors) {
        if cursors.has_next() {
            println!("{} {}", "Next cursor:".bold(), cursors.next);
        }
    }
}

fn print_users(record: &Record<ListQuery, List>) {
    let users: &[User] = if record.users.is_empty() {
        std::slice::from_ref(&record.user)
    } else {
        &record.users
    };

    let mut table = new_table();
    table.add_row(prettytable::row![
        "ID".bold().cyan(),
        "Screen name".bold().cyan(),
        "Name".bold().cyan(),
        "Followers".bold().cyan()
    ]);

    for user in users {
        table.add_row(prettytable::row![
            user.id.bright_white(),
            f!("@{}", user.screen_name).green(),
            user.name,
            user.followers_count
        ]);
    }

    table.printstd();

    if record.cursors.has_next() {
        println!("{} {}", "Next cursor:".bold(), record.cursors.next);
    }
}
