//! Status timelines, served as XML

use serde::Serialize;

use super::Status;
use crate::error::{Error, Result, USER_ID_OR_SCREEN_NAME};
use crate::expression::{Value, Variant};
use crate::parameters::ParameterMap;
use crate::processor::{duplicates_alternate, present, records, require_any, RequestProcessor};
use crate::request::Request;
use crate::wire::{Xml, XmlElement};

/// Timeline or lookup to query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StatusType {
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

impl StatusType {
    pub const ALL: [StatusType; 12] = [
        StatusType::Friends,
        StatusType::Home,
        StatusType::Mentions,
        StatusType::Public,
        StatusType::Retweets,
        StatusType::RetweetedByMe,
        StatusType::RetweetedToMe,
        StatusType::RetweetsOfMe,
        StatusType::RetweetedByUser,
        StatusType::RetweetedToUser,
        StatusType::Show,
        StatusType::User,
    ];

    /// Endpoint path relative to `statuses/`
    pub fn path(self) -> &'static str {
        match self {
            StatusType::Friends => "friends_timeline.xml",
            StatusType::Home => "home_timeline.xml",
            StatusType::Mentions => "mentions.xml",
            StatusType::Public => "public_timeline.xml",
            StatusType::Retweets => "retweets.xml",
            StatusType::RetweetedByMe => "retweeted_by_me.xml",
            StatusType::RetweetedToMe => "retweeted_to_me.xml",
            StatusType::RetweetsOfMe => "retweets_of_me.xml",
            StatusType::RetweetedByUser => "retweeted_by_user.xml",
            StatusType::RetweetedToUser => "retweeted_to_user.xml",
            StatusType::Show => "show.xml",
            StatusType::User => "user_timeline.xml",
        }
    }
}

impl Variant for StatusType {
    fn name(self) -> &'static str {
        match self {
            StatusType::Friends => "Friends",
            StatusType::Home => "Home",
            StatusType::Mentions => "Mentions",
            StatusType::Public => "Public",
            StatusType::Retweets => "Retweets",
            StatusType::RetweetedByMe => "RetweetedByMe",
            StatusType::RetweetedToMe => "RetweetedToMe",
            StatusType::RetweetsOfMe => "RetweetsOfMe",
            StatusType::RetweetedByUser => "RetweetedByUser",
            StatusType::RetweetedToUser => "RetweetedToUser",
            StatusType::Show => "Show",
            StatusType::User => "User",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl From<StatusType> for Value {
    fn from(kind: StatusType) -> Self {
        Value::Variant(kind.name())
    }
}

/// Parameters of a timeline query, echoed onto each returned status
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusQuery {
    #[serde(rename = "type")]
    pub kind: StatusType,
    pub id: Option<String>,
    pub user_id: Option<String>,
    pub screen_name: Option<String>,
    pub since_id: Option<u64>,
    pub max_id: Option<u64>,
    pub count: Option<u32>,
    pub page: Option<u32>,
    pub include_rts: Option<bool>,
    pub exclude_replies: Option<bool>,
    pub include_entities: Option<bool>,
    pub trim_user: Option<bool>,
    pub contributor_details: Option<bool>,
}

impl StatusQuery {
    pub fn new(kind: StatusType) -> Self {
        Self {
            kind,
            id: None,
            user_id: None,
            screen_name: None,
            since_id: None,
            max_id: None,
            count: None,
            page: None,
            include_rts: None,
            exclude_replies: None,
            include_entities: None,
            trim_user: None,
            contributor_details: None,
        }
    }
}

/// Builds `statuses/*.xml` requests and reads `<status>` elements
#[derive(Debug, Clone)]
pub struct StatusProcessor {
    base_url: String,
}

impl StatusProcessor {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    fn required_id<'q>(&self, query: &'q StatusQuery) -> Result<&'q str> {
        present(query.id.as_deref()).ok_or_else(|| {
            Error::missing(
                "id",
                format!("id is required for {} queries", query.kind.name()),
            )
        })
    }

    /// User timelines: `id` is dropped when it repeats `screen_name` or `user_id`
    fn push_user_timeline(&self, req: &mut Request, query: &StatusQuery) {
        if let Some(id) = present(query.id.as_deref()) {
            let alternates = [query.screen_name.as_deref(), query.user_id.as_deref()];
            if !duplicates_alternate(id, &alternates) {
                req.push("id", id);
            }
        }

        self.push_timeline(req, query);
    }

    /// Identification, paging and flags shared by the timelines, after `id`
    fn push_timeline(&self, req: &mut Request, query: &StatusQuery) {

        req.push_opt("user_id", query.user_id.as_deref());
        req.push_opt("screen_name", query.screen_name.as_deref());
        req.push_opt("since_id", query.since_id.as_ref());
        req.push_opt("max_id", query.max_id.as_ref());
        req.push_opt("count", query.count.as_ref());
        req.push_opt("page", query.page.as_ref());
        req.push_flag("include_rts", query.include_rts);
        req.push_flag("exclude_replies", query.exclude_replies);
        req.push_flag("include_entities", query.include_entities);
        req.push_flag("trim_user", query.trim_user);
        req.push_flag("contributor_details", query.contributor_details);
    }
}

impl RequestProcessor for StatusProcessor {
    type Query = StatusQuery;
    type Item = Status;
    type Format = Xml;

    const FIELDS: &'static [&'static str] = &[
        "type",
        "id",
        "user_id",
        "screen_name",
        "since_id",
        "max_id",
        "count",
        "page",
        "include_rts",
        "exclude_replies",
        "include_entities",
        "trim_user",
        "contributor_details",
    ];

    fn query(&self, params: &ParameterMap) -> Result<StatusQuery> {
        Ok(StatusQuery {
            kind: params.variant("type")?,
            id: params.text("id"),
            user_id: params.text("user_id"),
            screen_name: params.text("screen_name"),
            since_id: params.parse("since_id")?,
            max_id: params.parse("max_id")?,
            count: params.parse("count")?,
            page: params.parse("page")?,
            include_rts: params.parse("include_rts")?,
            exclude_replies: params.parse("exclude_replies")?,
            include_entities: params.parse("include_entities")?,
            trim_user: params.parse("trim_user")?,
            contributor_details: params.parse("contributor_details")?,
        })
    }

    fn request_for(&self, query: &StatusQuery) -> Result<Request> {
        let mut req = Request::new(format!("{}statuses/{}", self.base_url, query.kind.path()));

        match query.kind {
            StatusType::Public => {}
            StatusType::Retweets => {
                let id = self.required_id(query)?;
                req.push("id", id);
                req.push_opt("count", query.count.as_ref());
            }
            StatusType::Show => {
                let id = self.required_id(query)?;
                req.push("id", id);
                self.push_timeline(&mut req, query);
            }
            StatusType::RetweetedByUser | StatusType::RetweetedToUser => {
                require_any(
                    USER_ID_OR_SCREEN_NAME,
                    &[
                        present(query.id.as_deref()).is_some(),
                        present(query.user_id.as_deref()).is_some(),
                        present(query.screen_name.as_deref()).is_some(),
                    ],
                    "Either id, user_id or screen_name is required.",
                )?;
                self.push_user_timeline(&mut req, query);
            }
            StatusType::Friends
            | StatusType::Home
            | StatusType::Mentions
            | StatusType::RetweetedByMe
            | StatusType::RetweetedToMe
            | StatusType::RetweetsOfMe
            | StatusType::User => self.push_user_timeline(&mut req, query),
        }

        Ok(req)
    }

    fn items(&self, root: &XmlElement, _query: &StatusQuery) -> Result<Vec<Status>> {
        Ok(records(root, "status")
            .into_iter()
            .map(Status::from_node)
            .collect())
    }
}
