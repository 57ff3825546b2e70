//! Error type shared by the query pipeline and the list commands

/// Parameter group used when a list must be identified by `list_id` or `slug`
pub const LIST_ID_OR_SLUG: &str = "list_id_or_slug";

/// Parameter group used when a slug-identified list needs its owner
pub const OWNER_ID_OR_OWNER_SCREEN_NAME: &str = "owner_id_or_owner_screen_name";

/// Parameter group used when a user must be identified by `user_id` or `screen_name`
pub const USER_ID_OR_SCREEN_NAME: &str = "user_id_or_screen_name";

/// Errors raised while translating, dispatching, or materializing a request
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A mandatory field, or every field of a required either/or group, is absent
    #[error("Missing required parameter `{name}`: {message}")]
    MissingParameter { name: String, message: String },

    /// The resource kind is unset or not one of the known variants
    #[error("Invalid value for `{field}`: {}", .value.as_deref().unwrap_or("<unset>"))]
    InvalidVariant {
        field: String,
        value: Option<String>,
    },

    /// The predicate uses a shape the extractor does not understand
    #[error("Unsupported expression: {0}")]
    UnsupportedExpression(String),

    /// A batch argument exceeds what the API accepts in one call
    #[error("Argument `{name}` out of range: {message}")]
    ArgumentOutOfRange { name: String, message: String },

    /// A supplied value cannot be read as the field's type
    #[error("Invalid value for parameter `{name}`: {value}")]
    InvalidParameter { name: String, value: String },

    /// Network or HTTP failure; `message` carries the response body when there is one
    #[error("Transport failure{}: {message}", .status.map(|s| format!(" [{s}]")).unwrap_or_default())]
    Transport { status: Option<u16>, message: String },

    /// The payload is present but cannot be parsed at all
    #[error("Malformed {format} response: {message}")]
    Materialization {
        format: &'static str,
        message: String,
    },

    #[error("Operation cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn missing(name: &str, message: impl Into<String>) -> Self {
        Error::MissingParameter {
            name: name.to_string(),
            message: message.into(),
        }
    }

    pub fn out_of_range(name: &str, message: impl Into<String>) -> Self {
        Error::ArgumentOutOfRange {
            name: name.to_string(),
            message: message.into(),
        }
    }

    pub fn invalid_parameter(name: &str, value: &str) -> Self {
        Error::InvalidParameter {
            name: name.to_string(),
            value: value.to_string(),
        }
    }

    /// Name of the parameter (or parameter group) the error refers to, if any
    ///
    /// Lets callers branch on which precondition failed without matching on
    /// the message text.
    pub fn parameter(&self) -> Option<&str> {
        match self {
            Error::MissingParameter { name, .. }
            | Error::ArgumentOutOfRange { name, .. }
            | Error::InvalidParameter { name, .. } => Some(name),
            Error::InvalidVariant { field, .. } => Some(field),
            Error::UnsupportedExpression(_)
            | Error::Transport { .. }
            | Error::Materialization { .. }
            | Error::Cancelled => None,
        }
    }

    /// True for errors raised before any request reaches the transport
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::MissingParameter { .. }
                | Error::InvalidVariant { .. }
                | Error::UnsupportedExpression(_)
                | Error::ArgumentOutOfRange { .. }
                | Error::InvalidParameter { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_names_group() {
        let err = Error::missing(LIST_ID_OR_SLUG, "Either list_id or slug is required.");
        assert_eq!(err.parameter(), Some("list_id_or_slug"));
        assert!(err.is_validation());
    }

    #[test]
    fn test_transport_has_no_parameter() {
        let err = Error::Transport {
            status: Some(404),
            message: "{\"errors\":[]}".to_string(),
        };
        assert_eq!(err.parameter(), None);
        assert!(!err.is_validation());
        assert_eq!(err.to_string(), "Transport failure [404]: {\"errors\":[]}");
    }

    #[test]
    fn test_invalid_variant_display_unset() {
        let err = Error::InvalidVariant {
            field: "type".to_string(),
            value: None,
        };
        assert_eq!(err.to_string(), "Invalid value for `type`: <unset>");
    }
}
