//! Error types for the SDK layer.

use extkit_model::ResolveError;

/// Errors surfaced by SDK handles.
///
/// Validation failures are returned before any request leaves the iframe;
/// host and transport failures come back through the pending request and
/// are propagated unchanged, never swallowed or retried.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Field-path resolution failed (bad uid, bad index, unsaved entry).
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// An argument failed validation before any request was sent.
    #[error("{message}")]
    InvalidArgument { message: String },

    /// `set_data` on a composite or reference-like field outside self mode.
    #[error("Cannot call set data for current field type")]
    UnsupportedFieldType,

    /// The host answered the request with a domain-level failure. The
    /// display is the host's message, verbatim.
    #[error("{0}")]
    Host(String),

    /// The messaging channel itself failed.
    #[error("transport failure: {message}")]
    Transport { message: String },

    /// A host payload did not have the expected shape.
    #[error("malformed host payload: {message}")]
    Malformed { message: String },
}

impl Error {
    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        Error::InvalidArgument {
            message: message.into(),
        }
    }

    /// The message the original host UI uses for malformed call arguments.
    pub(crate) fn invalid_parameters() -> Self {
        Error::invalid_argument("Kindly provide valid parameters")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_errors_pass_through_unchanged() {
        let err: Error = ResolveError::FieldNotFound.into();
        assert_eq!(err.to_string(), "Invalid uid, Field not found");
    }

    #[test]
    fn unsupported_field_type_message_is_stable() {
        assert_eq!(
            Error::UnsupportedFieldType.to_string(),
            "Cannot call set data for current field type"
        );
    }

    #[test]
    fn host_error_displays_raw_message() {
        let err = Error::Host("uid is required".to_string());
        assert_eq!(err.to_string(), "uid is required");
    }

    #[test]
    fn invalid_parameters_message() {
        assert_eq!(
            Error::invalid_parameters().to_string(),
            "Kindly provide valid parameters"
        );
    }
}
