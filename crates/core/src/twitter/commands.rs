//! List maintenance commands
//!
//! Every builder validates its arguments and returns a [`CommandRequest`]
//! without touching the network. Zero ids and blank names are "not supplied"
//! sentinels: they fail validation where required and are left out of the
//! request body otherwise.
//!
//! Creating, updating and deleting a list go through the v2 API with JSON
//! bodies, as do single-member changes addressed by id. Members addressed by
//! screen name or slug, batches and subscriptions go through v1.1 with form
//! bodies.

use serde::{Deserialize, Serialize};

use crate::error::{
    Error, Result, LIST_ID_OR_SLUG, OWNER_ID_OR_OWNER_SCREEN_NAME, USER_ID_OR_SCREEN_NAME,
};
use crate::processor::present;
use crate::request::{Body, CommandRequest, Method};

/// Most members the batch endpoints accept in one call
pub const MAX_BATCH: usize = 100;

/// Raw response text alongside its decoded envelope
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandResponse<T> {
    pub data: T,
    pub raw_text: String,
}

/// v2 list action envelope: `{"data": {...}}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListResponse {
    #[serde(default)]
    pub data: Option<ListResponseData>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListResponseData {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub updated: Option<bool>,
    #[serde(default)]
    pub deleted: Option<bool>,
    #[serde(default)]
    pub is_member: Option<bool>,
}

/// Decode a v2 list action response; a blank body has no data
pub fn parse_list_response(raw: &str) -> Result<ListResponse> {
    if raw.trim().is_empty() {
        return Ok(ListResponse::default());
    }

    serde_json::from_str(raw).map_err(|e| Error::Materialization {
        format: "JSON",
        message: e.to_string(),
    })
}

#[derive(Debug, Serialize)]
struct CreateOrUpdateListRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    private: bool,
}

#[derive(Debug, Serialize)]
struct DeleteListRequest<'a> {
    id: &'a str,
}

#[derive(Debug, Serialize)]
struct ListMemberRequest<'a> {
    user_id: &'a str,
}

/// List addressed by a v1.1 command, by id or by slug plus owner
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListTarget {
    pub list_id: u64,
    pub slug: String,
    pub owner_id: u64,
    pub owner_screen_name: String,
}

impl ListTarget {
    pub fn new(list_id: u64, slug: &str, owner_id: u64, owner_screen_name: Option<&str>) -> Self {
        Self {
            list_id,
            slug: slug.to_string(),
            owner_id,
            owner_screen_name: owner_screen_name.unwrap_or_default().to_string(),
        }
    }

    pub fn id(list_id: u64) -> Self {
        Self {
            list_id,
            ..Default::default()
        }
    }

    pub fn slug(slug: &str, owner_screen_name: &str) -> Self {
        Self::new(0, slug, 0, Some(owner_screen_name))
    }

    fn has_slug(&self) -> bool {
        present(Some(self.slug.as_str())).is_some()
    }

    fn has_owner(&self) -> bool {
        self.owner_id != 0 || present(Some(self.owner_screen_name.as_str())).is_some()
    }

    fn validate(&self) -> Result<()> {
        if self.list_id == 0 && !self.has_slug() {
            return Err(Error::missing(
                LIST_ID_OR_SLUG,
                "Either list_id or slug is required.",
            ));
        }

        if self.has_slug() && !self.has_owner() {
            return Err(missing_owner());
        }

        Ok(())
    }
}

fn missing_owner() -> Error {
    Error::missing(
        OWNER_ID_OR_OWNER_SCREEN_NAME,
        "If using slug, you must also provide either owner_id or owner_screen_name.",
    )
}

/// User addressed by a single-member command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserTarget {
    Id(u64),
    ScreenName(String),
}

impl UserTarget {
    fn validate(&self) -> Result<()> {
        let supplied = match self {
            UserTarget::Id(id) => *id != 0,
            UserTarget::ScreenName(name) => present(Some(name.as_str())).is_some(),
        };

        if supplied {
            Ok(())
        } else {
            Err(Error::missing(
                USER_ID_OR_SCREEN_NAME,
                "Either user_id or screen_name is required.",
            ))
        }
    }

    fn fields(&self) -> (Option<String>, Option<String>) {
        match self {
            UserTarget::Id(id) => (Some(id.to_string()), None),
            UserTarget::ScreenName(name) => (None, Some(name.clone())),
        }
    }
}

/// Members of a batch command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Members {
    UserIds(Vec<u64>),
    ScreenNames(Vec<String>),
}

impl Members {
    pub fn len(&self) -> usize {
        match self {
            Members::UserIds(ids) => ids.len(),
            Members::ScreenNames(names) => names.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn parameter(&self) -> &'static str {
        match self {
            Members::UserIds(_) => "user_ids",
            Members::ScreenNames(_) => "screen_names",
        }
    }

    fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(Error::missing(
                self.parameter(),
                format!("{} is required and must not be empty.", self.parameter()),
            ));
        }

        if self.len() > MAX_BATCH {
            return Err(Error::out_of_range(
                self.parameter(),
                format!("At most {MAX_BATCH} members can be changed at a time."),
            ));
        }

        Ok(())
    }

    fn fields(&self) -> (Option<String>, Option<String>) {
        match self {
            Members::UserIds(ids) => (
                Some(
                    ids.iter()
                        .map(u64::to_string)
                        .collect::<Vec<_>>()
                        .join(","),
                ),
                None,
            ),
            Members::ScreenNames(names) => (None, Some(names.join(","))),
        }
    }
}

/// Form body in wire order, skipping sentinel values
fn form(list: &ListTarget, users: (Option<String>, Option<String>)) -> Body {
    let mut fields: Vec<(String, String)> = Vec::new();
    let mut push = |name: &str, value: Option<String>| {
        if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
            fields.push((name.to_string(), value));
        }
    };

    let (user_id, screen_name) = users;
    push("list_id", Some(list.list_id).filter(|id| *id != 0).map(|id| id.to_string()));
    push("slug", Some(list.slug.clone()));
    push("user_id", user_id);
    push("screen_name", screen_name);
    push("owner_id", Some(list.owner_id).filter(|id| *id != 0).map(|id| id.to_string()));
    push("owner_screen_name", Some(list.owner_screen_name.clone()));

    Body::Form(fields)
}

fn post_form(url: String, body: Body) -> CommandRequest {
    CommandRequest {
        method: Method::Post,
        url,
        body,
    }
}

fn json_body<T: Serialize>(value: &T) -> Result<Body> {
    serde_json::to_value(value)
        .map(Body::Json)
        .map_err(|e| Error::invalid_parameter("body", &e.to_string()))
}

fn required<'a>(name: &str, value: &'a str) -> Result<&'a str> {
    present(Some(value)).ok_or_else(|| Error::missing(name, format!("{name} is required.")))
}

/// `POST {v2}lists`
pub fn create_list(
    base_url2: &str,
    name: &str,
    description: &str,
    private: bool,
) -> Result<CommandRequest> {
    let name = required("name", name)?;

    Ok(CommandRequest {
        method: Method::Post,
        url: format!("{base_url2}lists"),
        body: json_body(&CreateOrUpdateListRequest {
            name: Some(name),
            description: present(Some(description)),
            private,
        })?,
    })
}

/// `PUT {v2}lists/{id}`; blank name or description leaves it unchanged
pub fn update_list(
    base_url2: &str,
    id: &str,
    name: &str,
    description: &str,
    private: bool,
) -> Result<CommandRequest> {
    let id = required("id", id)?;

    Ok(CommandRequest {
        method: Method::Put,
        url: format!("{base_url2}lists/{id}"),
        body: json_body(&CreateOrUpdateListRequest {
            name: present(Some(name)),
            description: present(Some(description)),
            private,
        })?,
    })
}

/// `DELETE {v2}lists/{id}`
pub fn delete_list(base_url2: &str, id: &str) -> Result<CommandRequest> {
    let id = required("id", id)?;

    Ok(CommandRequest {
        method: Method::Delete,
        url: format!("{base_url2}lists/{id}"),
        body: json_body(&DeleteListRequest { id })?,
    })
}

/// `POST {v2}lists/{list_id}/members`; the response carries `is_member`
pub fn add_list_member(base_url2: &str, list_id: &str, user_id: &str) -> Result<CommandRequest> {
    let list_id = required("list_id", list_id)?;
    let user_id = required("user_id", user_id)?;

    Ok(CommandRequest {
        method: Method::Post,
        url: format!("{base_url2}lists/{list_id}/members"),
        body: json_body(&ListMemberRequest { user_id })?,
    })
}

/// `DELETE {v2}lists/{list_id}/members/{user_id}`
pub fn delete_list_member(
    base_url2: &str,
    list_id: &str,
    user_id: &str,
) -> Result<CommandRequest> {
    let list_id = required("list_id", list_id)?;
    let user_id = required("user_id", user_id)?;

    Ok(CommandRequest {
        method: Method::Delete,
        url: format!("{base_url2}lists/{list_id}/members/{user_id}"),
        body: json_body(&ListMemberRequest { user_id })?,
    })
}

pub fn add_member(base_url: &str, user: &UserTarget, list: &ListTarget) -> Result<CommandRequest> {
    user.validate()?;
    list.validate()?;
    Ok(post_form(
        format!("{base_url}lists/members/create.json"),
        form(list, user.fields()),
    ))
}

pub fn add_members(base_url: &str, list: &ListTarget, members: &Members) -> Result<CommandRequest> {
    members.validate()?;
    list.validate()?;
    Ok(post_form(
        format!("{base_url}lists/members/create_all.json"),
        form(list, members.fields()),
    ))
}

pub fn remove_member(
    base_url: &str,
    user: &UserTarget,
    list: &ListTarget,
) -> Result<CommandRequest> {
    user.validate()?;
    list.validate()?;
    Ok(post_form(
        format!("{base_url}lists/members/destroy.json"),
        form(list, user.fields()),
    ))
}

/// Batch removal; the owner is only needed when the slug alone names the list
pub fn remove_members(
    base_url: &str,
    list: &ListTarget,
    members: &Members,
) -> Result<CommandRequest> {
    if list.list_id == 0 && !list.has_slug() {
        return Err(Error::missing(
            LIST_ID_OR_SLUG,
            "Either list_id or slug is required.",
        ));
    }
    if list.list_id == 0 && !list.has_owner() {
        return Err(missing_owner());
    }
    members.validate()?;

    Ok(post_form(
        format!("{base_url}lists/members/destroy_all.json"),
        form(list, members.fields()),
    ))
}

pub fn subscribe(base_url: &str, list: &ListTarget) -> Result<CommandRequest> {
    list.validate()?;
    Ok(post_form(
        format!("{base_url}lists/subscribers/create.json"),
        form(list, (None, None)),
    ))
}

pub fn unsubscribe(base_url: &str, list: &ListTarget) -> Result<CommandRequest> {
    list.validate()?;
    Ok(post_form(
        format!("{base_url}lists/subscribers/destroy.json"),
        form(list, (None, None)),
    ))
}
