//! Request and response types for the executor

use crate::routes::Route;
use concord_core::Snowflake;
use serde::Serialize;
use std::collections::HashMap;

/// HTTP method for a route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    /// Wire name of the method
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file to upload alongside a request body
#[derive(Debug, Clone)]
pub struct AttachmentUpload {
    pub filename: String,
    pub data: Vec<u8>,
}

/// One outbound API call
#[derive(Debug, Clone)]
pub struct Request {
    pub route: Route,
    pub body: Option<serde_json::Value>,
    pub attachments: Vec<AttachmentUpload>,
}

impl Request {
    /// A request with no body
    #[must_use]
    pub fn new(route: Route) -> Self {
        Self {
            route,
            body: None,
            attachments: Vec::new(),
        }
    }

    /// Attach a JSON body
    #[must_use]
    pub fn json(route: Route, body: &impl Serialize) -> Self {
        Self {
            route,
            // Serializing our own payload structs cannot fail
            body: serde_json::to_value(body).ok(),
            attachments: Vec::new(),
        }
    }

    /// Add file uploads (sent as multipart with a `payload_json` part)
    #[must_use]
    pub fn with_attachments(mut self, attachments: Vec<AttachmentUpload>) -> Self {
        self.attachments = attachments;
        self
    }
}

/// Raw response handed back by the transport
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    /// Header names lowercased by the transport
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl Response {
    /// Whether the status is a success (2xx)
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body as JSON
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// Body of a create-message call
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateMessage {
    pub content: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,

    /// Message ID being replied to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<Snowflake>,
}

impl CreateMessage {
    /// A plain text message
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    /// Mark this message as a reply
    #[must_use]
    pub fn in_reply_to(mut self, message_id: Snowflake) -> Self {
        self.reply_to = Some(message_id);
        self
    }
}

/// Body of an edit-message call
#[derive(Debug, Clone, Serialize)]
pub struct EditMessage {
    pub content: String,
}
