//! Lists, their members and subscribers, served as JSON

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value as JsonValue;

use super::{entity_id, parse_twitter_date, Cursors, Status, User};
use crate::error::{
    Result, LIST_ID_OR_SLUG, OWNER_ID_OR_OWNER_SCREEN_NAME, USER_ID_OR_SCREEN_NAME,
};
use crate::expression::{Value, Variant};
use crate::parameters::ParameterMap;
use crate::processor::{duplicates_alternate, present, require_any, RequestProcessor};
use crate::request::Request;
use crate::wire::{Json, WireFormat, WireNode};

/// A Twitter list
///
/// Besides the list's own attributes, a record may carry the members or
/// subscribers (`users`) or the timeline (`statuses`) that a query returned
/// for it, along with the paging cursors of that collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct List {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub full_name: String,
    pub description: Option<String>,
    pub mode: Option<String>,
    pub uri: Option<String>,
    pub member_count: u64,
    pub subscriber_count: u64,
    pub following: bool,
    pub created_at: Option<DateTime<Utc>>,
    /// Owner of the list
    pub user: User,
    pub users: Vec<User>,
    pub statuses: Vec<Status>,
    pub cursors: Cursors,
}

impl List {
    pub fn from_node<N: WireNode>(node: &N) -> Self {
        Self {
            id: entity_id(node),
            name: node.string("name").unwrap_or_default(),
            slug: node.string("slug").unwrap_or_default(),
            full_name: node.string("full_name").unwrap_or_default(),
            description: node.string("description"),
            mode: node.string("mode"),
            uri: node.string("uri"),
            member_count: node.value("member_count").unwrap_or_default(),
            subscriber_count: node.value("subscriber_count").unwrap_or_default(),
            following: node.flag("following"),
            created_at: node
                .string("created_at")
                .and_then(|raw| parse_twitter_date(&raw)),
            user: node.query("user").map(User::from_node).unwrap_or_default(),
            ..Default::default()
        }
    }

    /// Placeholder list carrying the identification the caller queried with
    fn for_query(query: &ListQuery) -> Self {
        Self {
            id: query.list_id.map(|id| id.to_string()).unwrap_or_default(),
            slug: query.slug.clone().unwrap_or_default(),
            ..Default::default()
        }
    }
}

/// List query to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ListType {
    /// Lists a user subscribes to, including their own
    Lists,
    Show,
    Statuses,
    Members,
    IsMember,
    Subscribers,
    IsSubscribed,
    /// Lists a user has been added to
    Memberships,
    Subscriptions,
    Ownerships,
}

impl ListType {
    pub const ALL: [ListType; 10] = [
        ListType::Lists,
        ListType::Show,
        ListType::Statuses,
        ListType::Members,
        ListType::IsMember,
        ListType::Subscribers,
        ListType::IsSubscribed,
        ListType::Memberships,
        ListType::Subscriptions,
        ListType::Ownerships,
    ];

    /// Endpoint path relative to `lists/`
    pub fn path(self) -> &'static str {
        match self {
            ListType::Lists => "list.json",
            ListType::Show => "show.json",
            ListType::Statuses => "statuses.json",
            ListType::Members => "members.json",
            ListType::IsMember => "members/show.json",
            ListType::Subscribers => "subscribers.json",
            ListType::IsSubscribed => "subscribers/show.json",
            ListType::Memberships => "memberships.json",
            ListType::Subscriptions => "subscriptions.json",
            ListType::Ownerships => "ownerships.json",
        }
    }

    /// Variants addressing one specific list
    pub fn identifies_list(self) -> bool {
        matches!(
            self,
            ListType::Show
                | ListType::Statuses
                | ListType::Members
                | ListType::IsMember
                | ListType::Subscribers
                | ListType::IsSubscribed
        )
    }
}

impl Variant for ListType {
    fn name(self) -> &'static str {
        match self {
            ListType::Lists => "Lists",
            ListType::Show => "Show",
            ListType::Statuses => "Statuses",
            ListType::Members => "Members",
            ListType::IsMember => "IsMember",
            ListType::Subscribers => "Subscribers",
            ListType::IsSubscribed => "IsSubscribed",
            ListType::Memberships => "Memberships",
            ListType::Subscriptions => "Subscriptions",
            ListType::Ownerships => "Ownerships",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl From<ListType> for Value {
    fn from(kind: ListType) -> Self {
        Value::Variant(kind.name())
    }
}

/// Parameters of a list query, echoed onto each returned list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListQuery {
    #[serde(rename = "type")]
    pub kind: ListType,
    pub user_id: Option<u64>,
    pub screen_name: Option<String>,
    pub list_id: Option<u64>,
    pub slug: Option<String>,
    pub owner_id: Option<u64>,
    pub owner_screen_name: Option<String>,
    pub since_id: Option<u64>,
    pub max_id: Option<u64>,
    pub count: Option<u32>,
    pub cursor: Option<i64>,
    pub reverse: Option<bool>,
    pub include_entities: Option<bool>,
    pub include_rts: Option<bool>,
    pub skip_status: Option<bool>,
    pub filter_to_owned_lists: Option<bool>,
}

impl ListQuery {
    pub fn new(kind: ListType) -> Self {
        Self {
            kind,
            user_id: None,
            screen_name: None,
            list_id: None,
            slug: None,
            owner_id: None,
            owner_screen_name: None,
            since_id: None,
            max_id: None,
            count: None,
            cursor: None,
            reverse: None,
            include_entities: None,
            include_rts: None,
            skip_status: None,
            filter_to_owned_lists: None,
        }
    }

    fn list_id(&self) -> Option<u64> {
        self.list_id.filter(|id| *id != 0)
    }

    fn owner_id(&self) -> Option<u64> {
        self.owner_id.filter(|id| *id != 0)
    }

    fn user_id(&self) -> Option<u64> {
        self.user_id.filter(|id| *id != 0)
    }
}

/// Builds `lists/*.json` requests and projects list payloads
#[derive(Debug, Clone)]
pub struct ListProcessor {
    base_url: String,
}

impl ListProcessor {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    fn validate(&self, query: &ListQuery) -> Result<()> {
        if query.kind.identifies_list() {
            let slug = present(query.slug.as_deref());
            require_any(
                LIST_ID_OR_SLUG,
                &[query.list_id().is_some(), slug.is_some()],
                "Either list_id or slug is required.",
            )?;

            if slug.is_some() {
                require_any(
                    OWNER_ID_OR_OWNER_SCREEN_NAME,
                    &[
                        query.owner_id().is_some(),
                        present(query.owner_screen_name.as_deref()).is_some(),
                    ],
                    "If using slug, you must also provide either owner_id or owner_screen_name.",
                )?;
            }
        }

        if matches!(query.kind, ListType::IsMember | ListType::IsSubscribed) {
            require_any(
                USER_ID_OR_SCREEN_NAME,
                &[
                    query.user_id().is_some(),
                    present(query.screen_name.as_deref()).is_some(),
                ],
                "Either user_id or screen_name is required.",
            )?;
        }

        Ok(())
    }

    /// Project a collection of lists, stamping each with the envelope's cursors
    fn lists(root: &JsonValue) -> Vec<List> {
        let (items, cursors) = match root.child("lists") {
            Some(lists) => (lists.items(), Cursors::from_node(root)),
            None => (root.items(), Cursors::default()),
        };

        items
            .into_iter()
            .map(|node| List {
                cursors,
                ..List::from_node(node)
            })
            .collect()
    }

    /// Result of a v1.1 list action (member or subscription change)
    ///
    /// Those endpoints answer with the affected list. A blank body is a default
    /// list rather than an error.
    pub fn process_action_result(&self, raw: &str) -> Result<List> {
        if raw.trim().is_empty() {
            return Ok(List::default());
        }

        let root = Json::parse(raw)?;
        Ok(List::from_node(&root))
    }
}

impl RequestProcessor for ListProcessor {
    type Query = ListQuery;
    type Item = List;
    type Format = Json;

    const FIELDS: &'static [&'static str] = &[
        "type",
        "user_id",
        "screen_name",
        "list_id",
        "slug",
        "owner_id",
        "owner_screen_name",
        "since_id",
        "max_id",
        "count",
        "cursor",
        "reverse",
        "include_entities",
        "include_rts",
        "skip_status",
        "filter_to_owned_lists",
    ];

    fn query(&self, params: &ParameterMap) -> Result<ListQuery> {
        Ok(ListQuery {
            kind: params.variant("type")?,
            user_id: params.parse("user_id")?,
            screen_name: params.text("screen_name"),
            list_id: params.parse("list_id")?,
            slug: params.text("slug"),
            owner_id: params.parse("owner_id")?,
            owner_screen_name: params.text("owner_screen_name"),
            since_id: params.parse("since_id")?,
            max_id: params.parse("max_id")?,
            count: params.parse("count")?,
            cursor: params.parse("cursor")?,
            reverse: params.parse("reverse")?,
            include_entities: params.parse("include_entities")?,
            include_rts: params.parse("include_rts")?,
            skip_status: params.parse("skip_status")?,
            filter_to_owned_lists: params.parse("filter_to_owned_lists")?,
        })
    }

    fn request_for(&self, query: &ListQuery) -> Result<Request> {
        self.validate(query)?;

        let mut req = Request::new(format!("{}lists/{}", self.base_url, query.kind.path()));
        let slug = present(query.slug.as_deref());
        let owner_screen_name = present(query.owner_screen_name.as_deref());

        if let Some(list_id) = query.list_id() {
            if !duplicates_alternate(&list_id.to_string(), &[slug]) {
                req.push("list_id", list_id.to_string());
            }
        }
        req.push_opt("slug", slug);

        if let Some(owner_id) = query.owner_id() {
            if !duplicates_alternate(&owner_id.to_string(), &[owner_screen_name]) {
                req.push("owner_id", owner_id.to_string());
            }
        }
        req.push_opt("owner_screen_name", owner_screen_name);

        req.push_opt("user_id", query.user_id().as_ref());
        req.push_opt("screen_name", present(query.screen_name.as_deref()));
        req.push_opt("since_id", query.since_id.as_ref());
        req.push_opt("max_id", query.max_id.as_ref());
        req.push_opt("count", query.count.as_ref());
        req.push_opt("cursor", query.cursor.as_ref());
        req.push_flag("reverse", query.reverse);
        req.push_flag("include_entities", query.include_entities);
        req.push_flag("include_rts", query.include_rts);
        req.push_flag("skip_status", query.skip_status);
        req.push_flag("filter_to_owned_lists", query.filter_to_owned_lists);

        Ok(req)
    }

    fn items(&self, root: &JsonValue, query: &ListQuery) -> Result<Vec<List>> {
        let lists = match query.kind {
            ListType::Lists
            | ListType::Memberships
            | ListType::Subscriptions
            | ListType::Ownerships => Self::lists(root),
            ListType::Show => vec![List::from_node(root)],
            ListType::Statuses => vec![List {
                statuses: root.items().into_iter().map(Status::from_node).collect(),
                ..List::for_query(query)
            }],
            ListType::Members | ListType::Subscribers => vec![List {
                users: root.list("users").into_iter().map(User::from_node).collect(),
                cursors: Cursors::from_node(root),
                ..List::for_query(query)
            }],
            ListType::IsMember | ListType::IsSubscribed => vec![List {
                users: vec![User::from_node(root)],
                ..List::for_query(query)
            }],
        };

        Ok(lists)
    }
}
