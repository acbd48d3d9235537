use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use vib3_shared::errors::{AppError, AppResult};

pub const MAX_CONTENT_CHARS: usize = 5000;
pub const MAX_ATTACHMENT_NAME: usize = 255;
pub const MAX_MESSAGE_TYPE_LEN: usize = 20;
pub const DEFAULT_MESSAGE_TYPE: &str = "text";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    Image,
    Video,
    Audio,
    Document,
    Location,
    Contact,
}

impl AttachmentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Document => "document",
            Self::Location => "location",
            Self::Contact => "contact",
        }
    }
}

impl FromStr for AttachmentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "image" => Ok(Self::Image),
            "video" => Ok(Self::Video),
            "audio" => Ok(Self::Audio),
            "document" => Ok(Self::Document),
            "location" => Ok(Self::Location),
            "contact" => Ok(Self::Contact),
            other => Err(format!("unknown attachment type: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(rename = "type")]
    pub kind: AttachmentKind,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,
}

impl Attachment {
    fn validated(self) -> AppResult<Self> {
        let url = self.url.trim().to_string();
        if url.is_empty() {
            return Err(AppError::Validation("attachment url is required".into()));
        }
        if self.name.as_ref().is_some_and(|n| n.chars().count() > MAX_ATTACHMENT_NAME) {
            return Err(AppError::Validation(format!(
                "attachment name cannot be longer than {MAX_ATTACHMENT_NAME} characters"
            )));
        }
        if self.size.is_some_and(|s| s < 0) {
            return Err(AppError::Validation("attachment size cannot be negative".into()));
        }
        Ok(Self { url, ..self })
    }
}

/// What a message carries. At least one of text or attachment is always present.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageBody {
    Text(String),
    Attachment(Attachment),
    TextWithAttachment { text: String, attachment: Attachment },
}

impl MessageBody {
    /// Blank text counts as absent.
    pub fn from_parts(content: Option<String>, attachment: Option<Attachment>) -> AppResult<Self> {
        let text = content.filter(|c| !c.trim().is_empty());
        if let Some(text) = &text {
            if text.chars().count() > MAX_CONTENT_CHARS {
                return Err(AppError::Validation(format!(
                    "message content cannot be longer than {MAX_CONTENT_CHARS} characters"
                )));
            }
        }
        let attachment = attachment.map(Attachment::validated).transpose()?;

        match (text, attachment) {
            (Some(text), None) => Ok(Self::Text(text)),
            (None, Some(attachment)) => Ok(Self::Attachment(attachment)),
            (Some(text), Some(attachment)) => Ok(Self::TextWithAttachment { text, attachment }),
            (None, None) => Err(AppError::Validation(
                "message must have content or an attachment".into(),
            )),
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text(text) | Self::TextWithAttachment { text, .. } => Some(text),
            Self::Attachment(_) => None,
        }
    }

    pub fn attachment(&self) -> Option<&Attachment> {
        match self {
            Self::Attachment(attachment) | Self::TextWithAttachment { attachment, .. } => Some(attachment),
            Self::Text(_) => None,
        }
    }
}

/// The conversation a message belongs to. Exactly one per message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageParent {
    Chat(Uuid),
    Match(Uuid),
}

impl MessageParent {
    pub fn from_columns(chat_id: Option<Uuid>, match_id: Option<Uuid>) -> AppResult<Self> {
        match (chat_id, match_id) {
            (Some(id), None) => Ok(Self::Chat(id)),
            (None, Some(id)) => Ok(Self::Match(id)),
            _ => Err(AppError::internal("message has no single parent")),
        }
    }

    /// `(chat_id, match_id)` as stored.
    pub fn columns(self) -> (Option<Uuid>, Option<Uuid>) {
        match self {
            Self::Chat(id) => (Some(id), None),
            Self::Match(id) => (None, Some(id)),
        }
    }

    pub fn scope(self) -> &'static str {
        match self {
            Self::Chat(_) => "chat",
            Self::Match(_) => "match",
        }
    }
}

/// A send request that passed validation and can be persisted as is.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingMessage {
    pub body: MessageBody,
    pub message_type: String,
    pub reply_to: Option<Uuid>,
}

impl OutgoingMessage {
    pub fn new(
        content: Option<String>,
        attachment: Option<Attachment>,
        message_type: Option<String>,
        reply_to: Option<Uuid>,
    ) -> AppResult<Self> {
        let body = MessageBody::from_parts(content, attachment)?;
        let message_type = match message_type.map(|t| t.trim().to_string()) {
            None => DEFAULT_MESSAGE_TYPE.to_string(),
            Some(t) if t.is_empty() => DEFAULT_MESSAGE_TYPE.to_string(),
            Some(t) if t.chars().count() > MAX_MESSAGE_TYPE_LEN => {
                return Err(AppError::Validation(format!(
                    "message_type cannot be longer than {MAX_MESSAGE_TYPE_LEN} characters"
                )));
            }
            Some(t) => t,
        };
        Ok(Self { body, message_type, reply_to })
    }
}
