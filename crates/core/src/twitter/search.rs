//! Premium search (30-day and full archive), served as JSON

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;
use serde_json::Value as JsonValue;

use super::Status;
use crate::error::{Error, Result};
use crate::expression::{Value, Variant};
use crate::parameters::ParameterMap;
use crate::processor::{present, RequestProcessor};
use crate::request::Request;
use crate::wire::{Json, WireFormat, WireNode};

/// Date format of `fromDate` / `toDate`
pub const SEARCH_DATE_FORMAT: &str = "%Y%m%d%H%M";

pub fn format_search_date(date: &DateTime<Utc>) -> String {
    date.format(SEARCH_DATE_FORMAT).to_string()
}

pub fn parse_search_date(raw: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw.trim(), SEARCH_DATE_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Search product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SearchType {
    ThirtyDays,
    FullArchive,
}

impl SearchType {
    pub fn path(self) -> &'static str {
        match self {
            SearchType::ThirtyDays => "30day",
            SearchType::FullArchive => "fullarchive",
        }
    }
}

impl Variant for SearchType {
    fn name(self) -> &'static str {
        match self {
            SearchType::ThirtyDays => "ThirtyDays",
            SearchType::FullArchive => "FullArchive",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "ThirtyDays" => Some(SearchType::ThirtyDays),
            "FullArchive" => Some(SearchType::FullArchive),
            _ => None,
        }
    }
}

impl From<SearchType> for Value {
    fn from(kind: SearchType) -> Self {
        Value::Variant(kind.name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchQuery {
    #[serde(rename = "type")]
    pub kind: SearchType,
    /// Dev environment label configured for the app
    pub environment_name: Option<String>,
    pub query: Option<String>,
    pub count: Option<u32>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    /// `next` token from a previous page
    pub page: Option<String>,
}

impl SearchQuery {
    pub fn new(kind: SearchType, environment_name: &str, query: &str) -> Self {
        Self {
            kind,
            environment_name: Some(environment_name.to_string()),
            query: Some(query.to_string()),
            count: None,
            since: None,
            until: None,
            page: None,
        }
    }
}

/// `requestParameters` echoed back by the API
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchMetadata {
    pub max_results: u64,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

impl SearchMetadata {
    pub fn from_node<N: WireNode>(node: &N) -> Self {
        Self {
            max_results: node.value("maxResults").unwrap_or_default(),
            since: node
                .string("fromDate")
                .and_then(|raw| parse_search_date(&raw)),
            until: node.string("toDate").and_then(|raw| parse_search_date(&raw)),
        }
    }
}

/// One page of search results
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Search {
    pub statuses: Vec<Status>,
    pub metadata: SearchMetadata,
    /// Token for the following page; `None` on the last page
    pub next_page: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SearchProcessor {
    base_url: String,
}

impl SearchProcessor {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl RequestProcessor for SearchProcessor {
    type Query = SearchQuery;
    type Item = Search;
    type Format = Json;

    const FIELDS: &'static [&'static str] = &[
        "type",
        "environment_name",
        "query",
        "count",
        "since",
        "until",
        "page",
    ];

    fn query(&self, params: &ParameterMap) -> Result<SearchQuery> {
        Ok(SearchQuery {
            kind: params.variant("type")?,
            environment_name: params.text("environment_name"),
            query: params.text("query"),
            count: params.parse("count")?,
            since: params.date("since")?,
            until: params.date("until")?,
            page: params.text("page"),
        })
    }

    fn request_for(&self, query: &SearchQuery) -> Result<Request> {
        let environment = present(query.environment_name.as_deref())
            .ok_or_else(|| Error::missing("environment_name", "environment_name is required"))?;
        let text = present(query.query.as_deref())
            .ok_or_else(|| Error::missing("query", "Query filter in where clause is required."))?;

        let mut req = Request::new(format!(
            "{}tweets/search/{}/{}.json",
            self.base_url,
            query.kind.path(),
            environment
        ));

        req.push("query", text);
        req.push_opt("maxResults", query.count.as_ref());
        req.push_opt("fromDate", query.since.as_ref().map(format_search_date).as_ref());
        req.push_opt("toDate", query.until.as_ref().map(format_search_date).as_ref());
        req.push_opt("next", present(query.page.as_deref()));

        Ok(req)
    }

    fn items(&self, root: &JsonValue, _query: &SearchQuery) -> Result<Vec<Search>> {
        let statuses = match root.query("results") {
            None | Some(JsonValue::Null) => Vec::new(),
            Some(JsonValue::Array(results)) => results.iter().map(Status::from_node).collect(),
            Some(other) => {
                return Err(Error::Materialization {
                    format: Json::NAME,
                    message: format!("`results` must be an array, found {other}"),
                })
            }
        };

        Ok(vec![Search {
            statuses,
            metadata: root
                .query("requestParameters")
                .map(SearchMetadata::from_node)
                .unwrap_or_default(),
            next_page: root.string("next"),
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::field;
    use chrono::TimeZone;

    const BASE: &str = "https://api.twitter.com/1.1/";

    const SEARCH_JSON: &str = r#"{
        "results": [],
        "requestParameters": {
            "maxResults": 100,
            "fromDate": "201709010000",
            "toDate": "201709172000"
        },
        "next": "abc"
    }"#;

    fn processor() -> SearchProcessor {
        SearchProcessor::new(BASE)
    }

    #[test]
    fn test_search_date_format() {
        let when = Utc.with_ymd_and_hms(2017, 9, 17, 20, 0, 0).unwrap();
        assert_eq!(format_search_date(&when), "201709172000");
        assert_eq!(parse_search_date("201709172000"), Some(when));
        assert_eq!(parse_search_date("2017-09-17"), None);
    }

    #[test]
    fn test_build_full_request() {
        let since = Utc.with_ymd_and_hms(2017, 9, 1, 0, 0, 0).unwrap();
        let until = Utc.with_ymd_and_hms(2017, 9, 17, 20, 0, 0).unwrap();
        let expr = field("type")
            .eq(SearchType::FullArchive)
            .and(field("environment_name").eq("dev"))
            .and(field("query").eq("LINQ to Twitter"))
            .and(field("count").eq(10u32))
            .and(field("since").eq(since))
            .and(field("until").eq(until))
            .and(field("page").eq("abc"));

        let params = processor().parameters(&expr).unwrap();
        let req = processor().build_request(&params).unwrap();

        assert_eq!(
            req.endpoint,
            "https://api.twitter.com/1.1/tweets/search/fullarchive/dev.json"
        );
        assert_eq!(
            req.parameters,
            vec![
                ("query".to_string(), "LINQ to Twitter".to_string()),
                ("maxResults".to_string(), "10".to_string()),
                ("fromDate".to_string(), "201709010000".to_string()),
                ("toDate".to_string(), "201709172000".to_string()),
                ("next".to_string(), "abc".to_string()),
            ]
        );
    }

    #[test]
    fn test_dates_are_normalized_to_utc() {
        let params: ParameterMap = [
            ("type", "ThirtyDays"),
            ("environment_name", "dev"),
            ("query", "rust"),
            ("since", "2020-01-01T02:30:00+02:00"),
        ]
        .into_iter()
        .collect();
        let req = processor().build_request(&params).unwrap();

        assert_eq!(
            req.endpoint,
            "https://api.twitter.com/1.1/tweets/search/30day/dev.json"
        );
        assert_eq!(req.parameter("fromDate"), Some("202001010030"));
    }

    #[test]
    fn test_environment_and_query_are_required() {
        let blank_env: ParameterMap = [("type", "ThirtyDays"), ("environment_name", " "), ("query", "x")]
            .into_iter()
            .collect();
        assert_eq!(
            processor().build_request(&blank_env).unwrap_err().parameter(),
            Some("environment_name")
        );

        let no_query: ParameterMap = [("type", "ThirtyDays"), ("environment_name", "dev")]
            .into_iter()
            .collect();
        assert_eq!(
            processor().build_request(&no_query).unwrap_err().parameter(),
            Some("query")
        );

        let no_type: ParameterMap = [("environment_name", "dev"), ("query", "x")]
            .into_iter()
            .collect();
        assert!(matches!(
            processor().build_request(&no_type),
            Err(Error::InvalidVariant { .. })
        ));
    }

    #[test]
    fn test_process_results() {
        let query = SearchQuery::new(SearchType::ThirtyDays, "dev", "LINQ to Twitter");
        let records = processor().process_results(SEARCH_JSON, &query).unwrap();

        assert_eq!(records.len(), 1);
        let search = &records[0];
        assert!(search.statuses.is_empty());
        assert_eq!(search.metadata.max_results, 100);
        assert_eq!(
            search.metadata.since,
            Some(Utc.with_ymd_and_hms(2017, 9, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(
            search.metadata.until,
            Some(Utc.with_ymd_and_hms(2017, 9, 17, 20, 0, 0).unwrap())
        );
        assert_eq!(search.next_page.as_deref(), Some("abc"));
        assert_eq!(search.query, query);
    }

    #[test]
    fn test_process_results_with_statuses_and_no_metadata() {
        let json = r#"{"results": [
            {"id_str": "1", "text": "first", "user": {"screen_name": "JoeMayo"}},
            {"id_str": "2", "text": "second"}
        ]}"#;
        let query = SearchQuery::new(SearchType::FullArchive, "dev", "x");
        let records = processor().process_results(json, &query).unwrap();

        assert_eq!(records[0].statuses.len(), 2);
        assert_eq!(records[0].statuses[0].user.screen_name, "JoeMayo");
        assert_eq!(records[0].metadata, SearchMetadata::default());
        assert_eq!(records[0].next_page, None);
    }

    #[test]
    fn test_results_must_be_an_array() {
        let query = SearchQuery::new(SearchType::ThirtyDays, "dev", "x");
        let err = processor()
            .process_results(r#"{"results": {"oops": 1}}"#, &query)
            .unwrap_err();
        assert!(matches!(err, Error::Materialization { format: "JSON", .. }));
    }

    #[test]
    fn test_paged_search_round_trip() {
        let since = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let until = Utc.with_ymd_and_hms(2020, 6, 1, 0, 0, 0).unwrap();
        let expr = field("type")
            .eq(SearchType::ThirtyDays)
            .and(field("environment_name").eq("dev"))
            .and(field("query").eq("twitter"))
            .and(field("count").eq(10u32))
            .and(field("since").eq(since))
            .and(field("until").eq(until))
            .and(field("page").eq("abc"));

        let params = processor().parameters(&expr).unwrap();
        let query = processor().query(&params).unwrap();
        let req = processor().request_for(&query).unwrap();

        assert_eq!(req.parameter("maxResults"), Some("10"));
        assert_eq!(req.parameter("fromDate"), Some("202001010000"));
        assert_eq!(req.parameter("toDate"), Some("202006010000"));
        assert_eq!(req.parameter("next"), Some("abc"));

        let json = r#"{
            "results": [],
            "requestParameters": {
                "maxResults": 10,
                "fromDate": "202001010000",
                "toDate": "202006010000"
            },
            "next": "abc"
        }"#;
        let records = processor().process_results(json, &query).unwrap();

        assert_eq!(records.len(), 1);
        assert!(records[0].statuses.is_empty());
        assert_eq!(records[0].metadata.max_results, 10);
        assert_eq!(records[0].metadata.since, Some(since));
        assert_eq!(records[0].metadata.until, Some(until));
        assert_eq!(records[0].next_page.as_deref(), Some("abc"));
        assert_eq!(records[0].query.page.as_deref(), Some("abc"));
    }

    #[test]
    fn test_process_empty_response() {
        let query = SearchQuery::new(SearchType::ThirtyDays, "dev", "x");
        let records = processor().process_results("", &query).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].item, Search::default());
        assert_eq!(records[0].query.environment_name.as_deref(), Some("dev"));
    }
}
