//! Twitter resources: entities, request processors and list commands
//!
//! Entities are decoded through [`WireNode`], so the same decoder reads the
//! XML timelines and the JSON search and list payloads.

pub mod commands;
pub mod list;
pub mod search;
pub mod status;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::wire::WireNode;

pub use commands::{CommandResponse, ListResponse, ListResponseData};
pub use list::{List, ListProcessor, ListQuery, ListType};
pub use search::{Search, SearchMetadata, SearchProcessor, SearchQuery, SearchType};
pub use status::{StatusProcessor, StatusQuery, StatusType};

/// Timestamp format of `created_at` fields
pub const TWITTER_DATE_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

/// Parse a `created_at` value such as `Wed Aug 27 13:08:45 +0000 2008`
pub fn parse_twitter_date(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(raw.trim(), TWITTER_DATE_FORMAT)
        .ok()
        .map(|d| d.with_timezone(&Utc))
}

/// Identifier of an entity, preferring the string form
///
/// JSON payloads carry ids both as numbers (which can exceed `f64` precision in
/// other clients) and as `id_str`; XML only has `id`.
fn entity_id<N: WireNode>(node: &N) -> String {
    node.string("id_str")
        .or_else(|| node.string("id"))
        .unwrap_or_default()
}

fn count<N: WireNode>(node: &N, path: &str) -> u64 {
    node.value(path).unwrap_or_default()
}

/// Twitter user
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub screen_name: String,
    pub location: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub profile_image_url: Option<String>,
    pub followers_count: u64,
    pub friends_count: u64,
    pub statuses_count: u64,
    pub favourites_count: u64,
    pub listed_count: u64,
    pub protected: bool,
    pub verified: bool,
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn from_node<N: WireNode>(node: &N) -> Self {
        Self {
            id: entity_id(node),
            name: node.string("name").unwrap_or_default(),
            screen_name: node.string("screen_name").unwrap_or_default(),
            location: node.string("location"),
            description: node.string("description"),
            url: node.string("url"),
            profile_image_url: node
                .string("profile_image_url_https")
                .or_else(|| node.string("profile_image_url")),
            followers_count: count(node, "followers_count"),
            friends_count: count(node, "friends_count"),
            statuses_count: count(node, "statuses_count"),
            favourites_count: count(node, "favourites_count"),
            listed_count: count(node, "listed_count"),
            protected: node.flag("protected"),
            verified: node.flag("verified"),
            created_at: node
                .string("created_at")
                .and_then(|raw| parse_twitter_date(&raw)),
        }
    }
}

/// A tweet
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Status {
    pub id: String,
    pub text: String,
    pub source: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub in_reply_to_status_id: Option<String>,
    pub in_reply_to_user_id: Option<String>,
    pub in_reply_to_screen_name: Option<String>,
    pub truncated: bool,
    pub favorited: bool,
    pub retweet_count: u64,
    pub favorite_count: u64,
    pub user: User,
    pub retweeted_status: Option<Box<Status>>,
}

impl Status {
    pub fn from_node<N: WireNode>(node: &N) -> Self {
        Self {
            id: entity_id(node),
            text: node
                .string("extended_tweet/full_text")
                .or_else(|| node.string("full_text"))
                .or_else(|| node.string("text"))
                .unwrap_or_default(),
            source: node.string("source"),
            created_at: node
                .string("created_at")
                .and_then(|raw| parse_twitter_date(&raw)),
            in_reply_to_status_id: node
                .string("in_reply_to_status_id_str")
                .or_else(|| node.string("in_reply_to_status_id")),
            in_reply_to_user_id: node
                .string("in_reply_to_user_id_str")
                .or_else(|| node.string("in_reply_to_user_id")),
            in_reply_to_screen_name: node.string("in_reply_to_screen_name"),
            truncated: node.flag("truncated"),
            favorited: node.flag("favorited"),
            retweet_count: count(node, "retweet_count"),
            favorite_count: count(node, "favorite_count"),
            user: node.query("user").map(User::from_node).unwrap_or_default(),
            retweeted_status: node
                .query("retweeted_status")
                .filter(|rt| rt.has("id") || rt.has("id_str"))
                .map(|rt| Box::new(Status::from_node(rt))),
        }
    }
}

/// Paging cursors of a cursored collection
///
/// `0` means there is no page in that direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Cursors {
    pub next: i64,
    pub previous: i64,
}

impl Cursors {
    pub fn from_node<N: WireNode>(node: &N) -> Self {
        let cursor = |name: &str| -> i64 {
            node.value(&format!("{name}_str"))
                .or_else(|| node.value(name))
                .unwrap_or_default()
        };

        Self {
            next: cursor("next_cursor"),
            previous: cursor("previous_cursor"),
        }
    }

    pub fn has_next(&self) -> bool {
        self.next != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::{Json, WireFormat, XmlElement};
    use chrono::TimeZone;

    #[test]
    fn test_parse_twitter_date() {
        assert_eq!(
            parse_twitter_date("Wed Aug 27 13:08:45 +0000 2008"),
            Some(Utc.with_ymd_and_hms(2008, 8, 27, 13, 8, 45).unwrap())
        );
        assert_eq!(
            parse_twitter_date("Wed Aug 27 15:08:45 +0200 2008"),
            Some(Utc.with_ymd_and_hms(2008, 8, 27, 13, 8, 45).unwrap())
        );
        assert_eq!(parse_twitter_date("yesterday"), None);
    }

    #[test]
    fn test_status_from_xml() {
        let xml = r#"<status>
  <created_at>Tue Apr 07 22:52:51 +0000 2009</created_at>
  <id>1472669360</id>
  <text>At least I can get your humor through tweets. RT @abdur: I don't mean this in a bad way.</text>
  <source>&lt;a href="http://www.tweetdeck.com/"&gt;TweetDeck&lt;/a&gt;</source>
  <truncated>false</truncated>
  <in_reply_to_status_id></in_reply_to_status_id>
  <in_reply_to_user_id></in_reply_to_user_id>
  <favorited>false</favorited>
  <in_reply_to_screen_name></in_reply_to_screen_name>
  <user>
    <id>1401881</id>
    <name>Doug Williams</name>
    <screen_name>dougw</screen_name>
    <location>San Francisco, CA</location>
    <protected>false</protected>
    <followers_count>1036</followers_count>
  </user>
</status>"#;

        let root = XmlElement::parse(xml).unwrap();
        let status = Status::from_node(&root);

        assert_eq!(status.id, "1472669360");
        assert!(status.text.starts_with("At least I can get your humor"));
        assert_eq!(
            status.source.as_deref(),
            Some(r#"<a href="http://www.tweetdeck.com/">TweetDeck</a>"#)
        );
        assert_eq!(
            status.created_at,
            Some(Utc.with_ymd_and_hms(2009, 4, 7, 22, 52, 51).unwrap())
        );
        assert_eq!(status.in_reply_to_status_id, None);
        assert_eq!(status.user.screen_name, "dougw");
        assert_eq!(status.user.followers_count, 1036);
        assert!(status.retweeted_status.is_none());
    }

    #[test]
    fn test_status_from_json_with_retweet() {
        let json = r#"{
            "id": 1170045372478586880,
            "id_str": "1170045372478586880",
            "text": "RT @JoeMayo: LINQ to Twitter",
            "retweet_count": 4,
            "user": {"id": 15411837, "id_str": "15411837", "screen_name": "JoeMayo", "verified": false},
            "retweeted_status": {
                "id_str": "1170045000000000000",
                "extended_tweet": {"full_text": "LINQ to Twitter v5 is out"},
                "text": "LINQ to Twitter",
                "user": {"id_str": "15411837", "screen_name": "JoeMayo"}
            }
        }"#;

        let root = Json::parse(json).unwrap();
        let status = Status::from_node(&root);

        assert_eq!(status.id, "1170045372478586880");
        assert_eq!(status.retweet_count, 4);
        assert_eq!(status.user.id, "15411837");

        let retweeted = status.retweeted_status.unwrap();
        assert_eq!(retweeted.id, "1170045000000000000");
        assert_eq!(retweeted.text, "LINQ to Twitter v5 is out");
    }

    #[test]
    fn test_cursors() {
        let root = Json::parse(r#"{"next_cursor": 1305102810874389703, "previous_cursor": 0}"#)
            .unwrap();
        let cursors = Cursors::from_node(&root);
        assert_eq!(cursors.next, 1_305_102_810_874_389_703);
        assert!(cursors.has_next());
        assert_eq!(cursors.previous, 0);
    }
}
