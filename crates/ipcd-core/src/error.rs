//! Codec errors.

/// Error returned by every decode and encode operation.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Not JSON, or JSON of the wrong shape for the type being decoded.
    ///
    /// Use [`serde_json::Error::is_syntax`] to tell the two apart.
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    /// Valid JSON that is not a recognized protocol message.
    #[error("invalid message: {0}")]
    InvalidMessage(#[from] InvalidMessage),
}

impl CodecError {
    /// The JSON parsed but was not a recognized protocol envelope.
    pub fn is_invalid_message(&self) -> bool {
        matches!(self, CodecError::InvalidMessage(_))
    }

    /// The input was not well-formed JSON, or ended early.
    pub fn is_syntax(&self) -> bool {
        matches!(self, CodecError::Json(e) if e.is_syntax() || e.is_eof())
    }
}

/// Why an envelope could not be classified.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidMessage {
    #[error("envelope is not a JSON object")]
    NotAnObject,
    #[error("missing field `{0}`")]
    MissingField(&'static str),
    #[error("field `{0}` is not a string")]
    NotAString(&'static str),
    #[error("unknown command `{0}`")]
    UnknownCommand(String),
    #[error("client message has none of `report`, `events`, `request`")]
    NoClientMarker,
}
