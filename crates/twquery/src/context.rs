//! Query pipeline and list commands bound to an executor
//!
//! Translation, validation and materialization are delegated to the pure
//! processors and command builders in `twquery_core`; this module only adds
//! dispatch, cancellation and logging. Nothing reaches the executor until the
//! request has been fully validated.

use log::{debug, trace, warn};
use tokio_util::sync::CancellationToken;

use twquery_core::expression::Expr;
use twquery_core::processor::{Record, RequestProcessor};
use twquery_core::request::{Body, CommandRequest, Method};
use twquery_core::twitter::commands::{
    self, parse_list_response, CommandResponse, ListResponse, ListTarget, Members, UserTarget,
};
use twquery_core::twitter::{List, ListProcessor, SearchProcessor, StatusProcessor};
use twquery_core::{Error, Result};

use crate::config::TwitterConfig;
use crate::executor::{Executor, HttpExecutor};

/// Log and pass through a result produced before dispatch
fn validated<T>(result: Result<T>) -> Result<T> {
    if let Err(err) = &result {
        warn!("Request rejected before dispatch: {err}");
    }
    result
}

pub struct TwitterContext<E: Executor> {
    config: TwitterConfig,
    executor: E,
}

impl TwitterContext<HttpExecutor> {
    pub fn from_config(config: TwitterConfig) -> Result<Self> {
        let executor = HttpExecutor::new(&config)?;
        Ok(Self::new(config, executor))
    }
}

impl<E: Executor> TwitterContext<E> {
    pub fn new(config: TwitterConfig, executor: E) -> Self {
        Self { config, executor }
    }

    pub fn config(&self) -> &TwitterConfig {
        &self.config
    }

    pub fn status(&self) -> StatusProcessor {
        StatusProcessor::new(self.config.base_url.as_str())
    }

    pub fn list(&self) -> ListProcessor {
        ListProcessor::new(self.config.base_url.as_str())
    }

    pub fn search(&self) -> SearchProcessor {
        SearchProcessor::new(self.config.base_url.as_str())
    }

    /// Run a predicate against a resource
    ///
    /// Every returned record carries the typed query it was produced by.
    pub async fn query<P: RequestProcessor>(
        &self,
        processor: &P,
        expr: &Expr,
        cancel: &CancellationToken,
    ) -> Result<Vec<Record<P::Query, P::Item>>> {
        let (query, url) = validated(
            processor
                .parameters(expr)
                .and_then(|params| processor.query(&params))
                .and_then(|query| {
                    let url = processor.request_for(&query)?.url();
                    Ok((query, url))
                }),
        )?;

        let raw = self.execute(Method::Get, &url, &Body::Empty, cancel).await?;
        processor.process_results(&raw, &query)
    }

    /// Send a request unless `cancel` fires first
    ///
    /// A cancelled call returns [`Error::Cancelled`] and drops the in-flight
    /// request.
    pub async fn execute(
        &self,
        method: Method,
        url: &str,
        body: &Body,
        cancel: &CancellationToken,
    ) -> Result<String> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        debug!("{method} {url}");

        let raw = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(Error::Cancelled),
            result = self.executor.send(method, url, body) => result,
        }?;

        trace!("{method} {url} returned {} bytes", raw.len());
        Ok(raw)
    }

    async fn send_command(
        &self,
        request: CommandRequest,
        cancel: &CancellationToken,
    ) -> Result<String> {
        self.execute(request.method, &request.url, &request.body, cancel)
            .await
    }

    async fn v2_action(
        &self,
        request: Result<CommandRequest>,
        cancel: &CancellationToken,
    ) -> Result<CommandResponse<ListResponse>> {
        let raw = self.send_command(validated(request)?, cancel).await?;
        Ok(CommandResponse {
            data: parse_list_response(&raw)?,
            raw_text: raw,
        })
    }

    async fn v1_action(
        &self,
        request: Result<CommandRequest>,
        cancel: &CancellationToken,
    ) -> Result<CommandResponse<List>> {
        let raw = self.send_command(validated(request)?, cancel).await?;
        Ok(CommandResponse {
            data: self.list().process_action_result(&raw)?,
            raw_text: raw,
        })
    }

    pub async fn create_list(
        &self,
        name: &str,
        description: &str,
        private: bool,
        cancel: &CancellationToken,
    ) -> Result<CommandResponse<ListResponse>> {
        let request = commands::create_list(&self.config.base_url2, name, description, private);
        self.v2_action(request, cancel).await
    }

    pub async fn update_list(
        &self,
        id: &str,
        name: &str,
        description: &str,
        private: bool,
        cancel: &CancellationToken,
    ) -> Result<CommandResponse<ListResponse>> {
        let request = commands::update_list(&self.config.base_url2, id, name, description, private);
        self.v2_action(request, cancel).await
    }

    pub async fn delete_list(
        &self,
        id: &str,
        cancel: &CancellationToken,
    ) -> Result<CommandResponse<ListResponse>> {
        let request = commands::delete_list(&self.config.base_url2, id);
        self.v2_action(request, cancel).await
    }

    /// Add a user to a list by id through v2; `is_member` reports the outcome
    pub async fn add_list_member(
        &self,
        list_id: &str,
        user_id: &str,
        cancel: &CancellationToken,
    ) -> Result<CommandResponse<ListResponse>> {
        let request = commands::add_list_member(&self.config.base_url2, list_id, user_id);
        self.v2_action(request, cancel).await
    }

    pub async fn delete_list_member(
        &self,
        list_id: &str,
        user_id: &str,
        cancel: &CancellationToken,
    ) -> Result<CommandResponse<ListResponse>> {
        let request = commands::delete_list_member(&self.config.base_url2, list_id, user_id);
        self.v2_action(request, cancel).await
    }

    pub async fn add_member_to_list(
        &self,
        user: &UserTarget,
        list: &ListTarget,
        cancel: &CancellationToken,
    ) -> Result<CommandResponse<List>> {
        let request = commands::add_member(&self.config.base_url, user, list);
        self.v1_action(request, cancel).await
    }

    pub async fn add_members_to_list(
        &self,
        list: &ListTarget,
        members: &Members,
        cancel: &CancellationToken,
    ) -> Result<CommandResponse<List>> {
        let request = commands::add_members(&self.config.base_url, list, members);
        self.v1_action(request, cancel).await
    }

    pub async fn remove_member_from_list(
        &self,
        user: &UserTarget,
        list: &ListTarget,
        cancel: &CancellationToken,
    ) -> Result<CommandResponse<List>> {
        let request = commands::remove_member(&self.config.base_url, user, list);
        self.v1_action(request, cancel).await
    }

    pub async fn remove_members_from_list(
        &self,
        list: &ListTarget,
        members: &Members,
        cancel: &CancellationToken,
    ) -> Result<CommandResponse<List>> {
        let request = commands::remove_members(&self.config.base_url, list, members);
        self.v1_action(request, cancel).await
    }

    pub async fn subscribe_to_list(
        &self,
        list: &ListTarget,
        cancel: &CancellationToken,
    ) -> Result<CommandResponse<List>> {
        let request = commands::subscribe(&self.config.base_url, list);
        self.v1_action(request, cancel).await
    }

    pub async fn unsubscribe_from_list(
        &self,
        list: &ListTarget,
        cancel: &CancellationToken,
    ) -> Result<CommandResponse<List>> {
        let request = commands::unsubscribe(&self.config.base_url, list);
        self.v1_action(request, cancel).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;
    use twquery_core::error::{OWNER_ID_OR_OWNER_SCREEN_NAME, USER_ID_OR_SCREEN_NAME};
    use twquery_core::expression::field;
    use twquery_core::twitter::{ListType, SearchType, StatusType};

    type Call = (Method, String, Body);

    /// Records every call and answers with a canned response
    struct MockExecutor {
        response: Result<String>,
        calls: Mutex<Vec<Call>>,
    }

    impl MockExecutor {
        fn ok(body: &str) -> Self {
            Self {
                response: Ok(body.to_string()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing(err: Error) -> Self {
            Self {
                response: Err(err),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Executor for MockExecutor {
        async fn send(&self, method: Method, url: &str, body: &Body) -> Result<String> {
            self.calls
                .lock()
                .unwrap()
                .push((method, url.to_string(), body.clone()));
            self.response.clone()
        }
    }

    /// Never answers
    struct PendingExecutor;

    #[async_trait]
    impl Executor for PendingExecutor {
        async fn send(&self, _method: Method, _url: &str, _body: &Body) -> Result<String> {
            std::future::pending().await
        }
    }

    fn context(executor: MockExecutor) -> TwitterContext<MockExecutor> {
        TwitterContext::new(TwitterConfig::new("token"), executor)
    }

    fn calls(ctx: &TwitterContext<MockExecutor>) -> Vec<Call> {
        ctx.executor.calls.lock().unwrap().clone()
    }

    const SEARCH_RESPONSE: &str = r#"{
        "results": [],
        "requestParameters": {"maxResults": 100, "fromDate": "201709010000", "toDate": "201709172000"},
        "next": "abc"
    }"#;

    const LIST_RESPONSE: &str = r#"{"id_str": "1130185227375038465", "slug": "test", "name": "test"}"#;

    #[tokio::test]
    async fn test_query_show_status() {
        let ctx = context(MockExecutor::ok("<status><id>123</id><text>Hi</text></status>"));
        let expr = field("type").eq(StatusType::Show).and(field("id").eq("123"));

        let records = ctx
            .query(&ctx.status(), &expr, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].text, "Hi");
        assert_eq!(records[0].query.kind, StatusType::Show);
        assert_eq!(
            calls(&ctx),
            vec![(
                Method::Get,
                "https://api.twitter.com/1.1/statuses/show.xml?id=123".to_string(),
                Body::Empty
            )]
        );
    }

    #[tokio::test]
    async fn test_query_search() {
        let ctx = context(MockExecutor::ok(SEARCH_RESPONSE));
        let expr = field("type")
            .eq(SearchType::ThirtyDays)
            .and(field("environment_name").eq("dev"))
            .and(field("query").eq("twitter"));

        let records = ctx
            .query(&ctx.search(), &expr, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(records.len(), 1);
        assert!(records[0].statuses.is_empty());
        assert_eq!(records[0].metadata.max_results, 100);
        assert_eq!(records[0].next_page.as_deref(), Some("abc"));
        assert_eq!(
            calls(&ctx)[0].1,
            "https://api.twitter.com/1.1/tweets/search/30day/dev.json?query=twitter"
        );
    }

    #[tokio::test]
    async fn test_query_validation_makes_no_call() {
        let ctx = context(MockExecutor::ok(LIST_RESPONSE));
        let expr = field("type")
            .eq(ListType::Members)
            .and(field("slug").eq("test"));

        let err = ctx
            .query(&ctx.list(), &expr, &CancellationToken::new())
            .await
            .unwrap_err();

        assert_eq!(err.parameter(), Some(OWNER_ID_OR_OWNER_SCREEN_NAME));
        assert!(calls(&ctx).is_empty());

        let or = field("type")
            .eq(ListType::Show)
            .or(field("list_id").eq(1u64));
        assert!(matches!(
            ctx.query(&ctx.list(), &or, &CancellationToken::new()).await,
            Err(Error::UnsupportedExpression(_))
        ));
        assert!(calls(&ctx).is_empty());
    }

    #[tokio::test]
    async fn test_empty_response_is_one_record() {
        let ctx = context(MockExecutor::ok(""));
        let expr = field("type").eq(StatusType::Home);

        let records = ctx
            .query(&ctx.status(), &expr, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].query.kind, StatusType::Home);
    }

    #[tokio::test]
    async fn test_transport_errors_pass_through() {
        let ctx = context(MockExecutor::failing(Error::Transport {
            status: Some(404),
            message: r#"{"errors":[{"code":34}]}"#.to_string(),
        }));
        let expr = field("type").eq(StatusType::Home);

        let err = ctx
            .query(&ctx.status(), &expr, &CancellationToken::new())
            .await
            .unwrap_err();

        assert_eq!(
            err,
            Error::Transport {
                status: Some(404),
                message: r#"{"errors":[{"code":34}]}"#.to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_cancelled_before_dispatch() {
        let ctx = context(MockExecutor::ok(""));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = ctx
            .query(&ctx.status(), &field("type").eq(StatusType::Home), &cancel)
            .await
            .unwrap_err();

        assert_eq!(err, Error::Cancelled);
        assert!(calls(&ctx).is_empty());
    }

    #[tokio::test]
    async fn test_cancel_in_flight_request() {
        let ctx = TwitterContext::new(TwitterConfig::new("token"), PendingExecutor);
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            trigger.cancel();
        });

        let err = ctx
            .query(&ctx.status(), &field("type").eq(StatusType::Public), &cancel)
            .await
            .unwrap_err();
        assert_eq!(err, Error::Cancelled);
    }

    #[tokio::test]
    async fn test_create_list() {
        let response = r#"{"data": {"id": "1441162269824405510", "name": "test v2 create list"}}"#;
        let ctx = context(MockExecutor::ok(response));

        let result = ctx
            .create_list("test v2 create list", "desc", false, &CancellationToken::new())
            .await
            .unwrap();

        let data = result.data.data.unwrap();
        assert_eq!(data.id.as_deref(), Some("1441162269824405510"));
        assert_eq!(result.raw_text, response);

        let call = &calls(&ctx)[0];
        assert_eq!(call.0, Method::Post);
        assert_eq!(call.1, "https://api.twitter.com/2/lists");
        assert!(matches!(call.2, Body::Json(_)));
    }

    #[tokio::test]
    async fn test_update_and_delete_list() {
        let ctx = context(MockExecutor::ok(r#"{"data": {"updated": true}}"#));
        let result = ctx
            .update_list("1441162269824405510", "new", "", true, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(result.data.data.unwrap().updated, Some(true));
        assert_eq!(calls(&ctx)[0].0, Method::Put);

        let ctx = context(MockExecutor::ok(r#"{"data": {"deleted": true}}"#));
        let result = ctx
            .delete_list("1441162269824405510", &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(result.data.data.unwrap().deleted, Some(true));
        assert_eq!(
            calls(&ctx)[0].1,
            "https://api.twitter.com/2/lists/1441162269824405510"
        );

        let err = ctx.delete_list("", &CancellationToken::new()).await.unwrap_err();
        assert_eq!(err.parameter(), Some("id"));
        assert_eq!(calls(&ctx).len(), 1);
    }

    #[tokio::test]
    async fn test_v2_list_members() {
        let ctx = context(MockExecutor::ok(r#"{"data": {"is_member": true}}"#));
        let cancel = CancellationToken::new();

        let added = ctx.add_list_member("abc", "def", &cancel).await.unwrap();
        assert_eq!(added.data.data.unwrap().is_member, Some(true));

        let call = &calls(&ctx)[0];
        assert_eq!(call.0, Method::Post);
        assert_eq!(call.1, "https://api.twitter.com/2/lists/abc/members");
        assert_eq!(call.2, Body::Json(serde_json::json!({"user_id": "def"})));

        let ctx = context(MockExecutor::ok(r#"{"data": {"is_member": false}}"#));
        let removed = ctx.delete_list_member("abc", "def", &cancel).await.unwrap();
        assert_eq!(removed.data.data.unwrap().is_member, Some(false));

        let call = &calls(&ctx)[0];
        assert_eq!(call.0, Method::Delete);
        assert_eq!(call.1, "https://api.twitter.com/2/lists/abc/members/def");

        let err = ctx.add_list_member("", "def", &cancel).await.unwrap_err();
        assert_eq!(err.parameter(), Some("list_id"));
        let err = ctx.delete_list_member("abc", "", &cancel).await.unwrap_err();
        assert_eq!(err.parameter(), Some("user_id"));
        assert_eq!(calls(&ctx).len(), 1);
    }

    #[tokio::test]
    async fn test_add_member() {
        let ctx = context(MockExecutor::ok(LIST_RESPONSE));

        let result = ctx
            .add_member_to_list(
                &UserTarget::ScreenName("JoeMayo".to_string()),
                &ListTarget::id(1130185227375038465),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(result.data.slug, "test");
        let call = &calls(&ctx)[0];
        assert_eq!(call.1, "https://api.twitter.com/1.1/lists/members/create.json");
        assert_eq!(call.2.form_value("screen_name"), Some("JoeMayo"));
        assert_eq!(call.2.form_value("list_id"), Some("1130185227375038465"));
    }

    #[tokio::test]
    async fn test_member_commands_validate_first() {
        let ctx = context(MockExecutor::ok(LIST_RESPONSE));
        let cancel = CancellationToken::new();

        let err = ctx
            .remove_member_from_list(&UserTarget::Id(0), &ListTarget::id(1), &cancel)
            .await
            .unwrap_err();
        assert_eq!(err.parameter(), Some(USER_ID_OR_SCREEN_NAME));

        let err = ctx
            .subscribe_to_list(&ListTarget::new(0, "test", 0, None), &cancel)
            .await
            .unwrap_err();
        assert_eq!(err.parameter(), Some(OWNER_ID_OR_OWNER_SCREEN_NAME));

        let names: Vec<String> = (0..101).map(|i| format!("user{i}")).collect();
        let err = ctx
            .add_members_to_list(&ListTarget::id(1), &Members::ScreenNames(names), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ArgumentOutOfRange { .. }));

        assert!(calls(&ctx).is_empty());
    }

    #[tokio::test]
    async fn test_batch_and_subscription_commands() {
        let ctx = context(MockExecutor::ok(LIST_RESPONSE));
        let cancel = CancellationToken::new();
        let list = ListTarget::slug("test", "JoeMayo");

        ctx.add_members_to_list(&list, &Members::UserIds(vec![1, 2]), &cancel)
            .await
            .unwrap();
        ctx.remove_members_from_list(&list, &Members::ScreenNames(vec!["a".into()]), &cancel)
            .await
            .unwrap();
        ctx.subscribe_to_list(&list, &cancel).await.unwrap();
        ctx.unsubscribe_from_list(&list, &cancel).await.unwrap();

        let urls: Vec<String> = calls(&ctx).into_iter().map(|(_, url, _)| url).collect();
        assert_eq!(
            urls,
            vec![
                "https://api.twitter.com/1.1/lists/members/create_all.json",
                "https://api.twitter.com/1.1/lists/members/destroy_all.json",
                "https://api.twitter.com/1.1/lists/subscribers/create.json",
                "https://api.twitter.com/1.1/lists/subscribers/destroy.json",
            ]
        );
    }
}
