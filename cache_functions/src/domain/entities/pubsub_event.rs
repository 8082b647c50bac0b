use base64::{engine::general_purpose, Engine as _};
use common::helper::error_chain_fmt;
use serde::Deserialize;

/// A message as delivered by the pub/sub push subscription
#[derive(Debug, Deserialize)]
pub struct PubSubMessage {
    /// Base64 encoded payload
    pub data: Option<String>,
    #[serde(rename = "messageId", alias = "message_id")]
    pub message_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PubSubPushBody {
    pub message: PubSubMessage,
    pub subscription: Option<String>,
}

/// Event received by the cache writer
///
/// Either the bare push body (push subscription, or a CloudEvent in binary mode where the HTTP
/// body is the event data), or a structured CloudEvent wrapping the push body in `data`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum PubSubEvent {
    Push(PubSubPushBody),
    CloudEvent { data: PubSubPushBody },
}

impl PubSubEvent {
    pub fn try_parsing(body: &[u8]) -> Result<Self, PubSubEventError> {
        let body = std::str::from_utf8(body)?;
        let event = serde_json::from_str(body)
            .map_err(|e| PubSubEventError::InvalidEnvelope(e, body.to_string()))?;

        Ok(event)
    }

    pub fn message(&self) -> &PubSubMessage {
        match self {
            Self::Push(body) | Self::CloudEvent { data: body } => &body.message,
        }
    }

    /// Decodes the base64 message data into a UTF-8 string
    pub fn decode_data(&self) -> Result<String, PubSubEventError> {
        let data = self
            .message()
            .data
            .as_deref()
            .ok_or(PubSubEventError::MissingData)?;

        let bytes = general_purpose::STANDARD.decode(data)?;
        let data = String::from_utf8(bytes)?;

        Ok(data)
    }
}

#[derive(thiserror::Error)]
pub enum PubSubEventError {
    #[error("Event body could not be converted from utf8 u8 vector to string")]
    InvalidStringBody(#[from] std::str::Utf8Error),

    #[error("Event body is not a pub/sub push envelope: {0}. Body: {1}")]
    InvalidEnvelope(serde_json::Error, String),

    #[error("The pub/sub message has no data")]
    MissingData,

    #[error("The pub/sub message data is not valid base64: {0}")]
    InvalidBase64Data(#[from] base64::DecodeError),

    #[error("The decoded pub/sub message data is not valid utf8: {0}")]
    InvalidStringData(#[from] std::string::FromUtf8Error),
}

impl std::fmt::Debug for PubSubEventError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
