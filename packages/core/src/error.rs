use thiserror::Error;

/// Errors returned while building, parsing or converting descriptors.
///
/// Two kinds exist: *parse errors* (the input text is not a well-formed
/// XRD or JRD document) and *value errors* (the document is well formed but
/// a field has the wrong shape). [`XrdError::is_parse_error`] tells them
/// apart.
#[derive(Debug, Error)]
pub enum XrdError {
    #[error("invalid XML: {0}")]
    InvalidXml(String),

    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("invalid XRD: root element is <{0}>, expected <XRD>")]
    UnexpectedRoot(String),

    #[error("invalid XRD: type is empty in Property")]
    EmptyPropertyType,

    #[error("invalid expires timestamp: {0:?}")]
    InvalidExpires(String),

    #[error("invalid {field}: expected {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },

    #[error("invalid {0}: expected object")]
    NotAnObject(&'static str),
}

impl XrdError {
    /// `true` for errors caused by text that is not a well-formed document.
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            XrdError::InvalidXml(_) | XrdError::InvalidJson(_) | XrdError::UnexpectedRoot(_)
        )
    }
}
