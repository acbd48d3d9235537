use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use vib3_shared::errors::AppResult;

use crate::chat::body::{Attachment, MessageParent, OutgoingMessage};
use crate::chat::roles::{ChatRole, ChatType};
use crate::chat::status::MessageStatus;
use crate::schema::{
    chat_participants, chats, matches, message_deletions, message_reactions, message_reads, messages,
    user_chats,
};

pub const DEFAULT_HISTORY_LIMIT: i64 = 20;
pub const MAX_HISTORY_LIMIT: i64 = 100;

// --- Chat ---

#[derive(Debug, Queryable, Selectable, Identifiable, Clone)]
#[diesel(table_name = chats)]
pub struct Chat {
    pub id: Uuid,
    pub chat_type: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub avatar_url: Option<String>,
    pub created_by: Option<Uuid>,
    pub is_public: bool,
    pub approval_required: bool,
    pub encrypted: bool,
    pub read_receipts: bool,
    pub last_message_id: Option<Uuid>,
    pub direct_key: Option<String>,
    pub is_active: bool,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Chat {
    pub fn kind(&self) -> ChatType {
        self.chat_type.parse().unwrap_or(ChatType::Group)
    }

    pub fn is_direct(&self) -> bool {
        self.kind() == ChatType::Direct
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = chats)]
pub struct NewChat<'a> {
    pub id: Uuid,
    pub chat_type: &'a str,
    pub name: Option<&'a str>,
    pub description: Option<&'a str>,
    pub avatar_url: Option<&'a str>,
    pub created_by: Option<Uuid>,
    pub is_public: bool,
    pub approval_required: bool,
    pub encrypted: bool,
    pub read_receipts: bool,
    pub direct_key: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- Participants ---

#[derive(Debug, Queryable, Selectable, Clone)]
#[diesel(table_name = chat_participants)]
pub struct Participant {
    pub chat_id: Uuid,
    pub user_id: Uuid,
    pub role: String,
    pub joined_at: DateTime<Utc>,
    pub last_read_message_id: Option<Uuid>,
    pub is_muted: bool,
    pub is_blocked: bool,
}

impl Participant {
    pub fn role(&self) -> ChatRole {
        self.role.parse().unwrap_or(ChatRole::Member)
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = chat_participants)]
pub struct NewParticipant {
    pub chat_id: Uuid,
    pub user_id: Uuid,
    pub role: &'static str,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = user_chats)]
pub struct NewUserChat {
    pub user_id: Uuid,
    pub chat_id: Uuid,
}

// --- Message ---

#[derive(Debug, Queryable, Selectable, Identifiable, Clone)]
#[diesel(table_name = messages)]
pub struct Message {
    pub id: Uuid,
    pub chat_id: Option<Uuid>,
    pub match_id: Option<Uuid>,
    pub sender_id: Uuid,
    pub content: Option<String>,
    pub message_type: String,
    pub attachment_type: Option<String>,
    pub attachment_url: Option<String>,
    pub attachment_name: Option<String>,
    pub attachment_size: Option<i64>,
    pub reply_to_id: Option<Uuid>,
    pub status: String,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Message {
    pub fn status(&self) -> MessageStatus {
        self.status.parse().unwrap_or(MessageStatus::Sent)
    }

    pub fn parent(&self) -> AppResult<MessageParent> {
        MessageParent::from_columns(self.chat_id, self.match_id)
    }

    pub fn attachment(&self) -> Option<Attachment> {
        let kind = self.attachment_type.as_deref()?.parse().ok()?;
        Some(Attachment {
            kind,
            url: self.attachment_url.clone()?,
            name: self.attachment_name.clone(),
            size: self.attachment_size,
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = messages)]
pub struct NewMessage<'a> {
    pub id: Uuid,
    pub chat_id: Option<Uuid>,
    pub match_id: Option<Uuid>,
    pub sender_id: Uuid,
    pub content: Option<&'a str>,
    pub message_type: &'a str,
    pub attachment_type: Option<&'static str>,
    pub attachment_url: Option<&'a str>,
    pub attachment_name: Option<&'a str>,
    pub attachment_size: Option<i64>,
    pub reply_to_id: Option<Uuid>,
    pub status: &'static str,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> NewMessage<'a> {
    pub fn from_outgoing(parent: MessageParent, sender_id: Uuid, outgoing: &'a OutgoingMessage) -> Self {
        let (chat_id, match_id) = parent.columns();
        let attachment = outgoing.body.attachment();
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            chat_id,
            match_id,
            sender_id,
            content: outgoing.body.text(),
            message_type: &outgoing.message_type,
            attachment_type: attachment.map(|a| a.kind.as_str()),
            attachment_url: attachment.map(|a| a.url.as_str()),
            attachment_name: attachment.and_then(|a| a.name.as_deref()),
            attachment_size: attachment.and_then(|a| a.size),
            reply_to_id: outgoing.reply_to,
            status: MessageStatus::Sent.as_str(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = message_reads)]
pub struct NewMessageRead {
    pub message_id: Uuid,
    pub user_id: Uuid,
    pub read_at: DateTime<Utc>,
}

#[derive(Debug, Queryable, Selectable, Serialize, Clone, PartialEq)]
#[diesel(table_name = message_reactions)]
pub struct Reaction {
    #[serde(skip_serializing)]
    pub message_id: Uuid,
    pub user_id: Uuid,
    pub emoji: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = message_reactions)]
pub struct NewReaction<'a> {
    pub message_id: Uuid,
    pub user_id: Uuid,
    pub emoji: &'a str,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = message_deletions)]
pub struct NewDeletion {
    pub message_id: Uuid,
    pub user_id: Uuid,
    pub deleted_at: DateTime<Utc>,
}

// --- Match thread (read side of the matching service's table) ---

#[derive(Debug, Queryable, Selectable, Clone)]
#[diesel(table_name = matches)]
pub struct MatchThread {
    pub id: Uuid,
    pub user_low: Uuid,
    pub user_high: Uuid,
    pub matched: bool,
}

impl MatchThread {
    pub fn includes(&self, user_id: Uuid) -> bool {
        self.user_low == user_id || self.user_high == user_id
    }
}

// --- Requests ---

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
pub struct ChatSettings {
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub approval_required: bool,
    #[serde(default)]
    pub encrypted: bool,
    #[serde(default = "default_read_receipts")]
    pub read_receipts: bool,
}

fn default_read_receipts() -> bool { true }

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            is_public: false,
            approval_required: false,
            encrypted: false,
            read_receipts: default_read_receipts(),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateChatRequest {
    #[serde(rename = "type")]
    pub chat_type: ChatType,
    pub participant_ids: Vec<Uuid>,
    #[validate(length(min = 1, max = 50, message = "chat name must be between 1 and 50 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 500, message = "description cannot be longer than 500 characters"))]
    pub description: Option<String>,
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub settings: ChatSettings,
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub content: Option<String>,
    pub attachment: Option<Attachment>,
    pub message_type: Option<String>,
    pub reply_to: Option<Uuid>,
    /// Client-side correlation id, echoed back and never stored.
    pub client_id: Option<String>,
}

impl SendMessageRequest {
    pub fn into_outgoing(self) -> AppResult<(OutgoingMessage, Option<String>)> {
        let outgoing = OutgoingMessage::new(self.content, self.attachment, self.message_type, self.reply_to)?;
        Ok((outgoing, self.client_id))
    }
}

#[derive(Debug, Deserialize)]
pub struct MatchMessageRequest {
    pub match_id: Uuid,
    #[serde(flatten)]
    pub message: SendMessageRequest,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryParams {
    /// Exclusive upper bound on `created_at`.
    pub before: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
}

impl HistoryParams {
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_HISTORY_LIMIT).clamp(1, MAX_HISTORY_LIMIT)
    }
}

#[derive(Debug, Deserialize)]
pub struct ReactionRequest {
    pub emoji: String,
}

#[derive(Debug, Deserialize)]
pub struct AddParticipantRequest {
    pub user_id: Uuid,
    pub role: Option<ChatRole>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: ChatRole,
}

// --- Responses ---

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ReadReceipt {
    pub user_id: Uuid,
    pub read_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Clone)]
pub struct MessageView {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_id: Option<Uuid>,
    pub sender_id: Uuid,
    pub content: Option<String>,
    pub attachment: Option<Attachment>,
    pub message_type: String,
    pub reply_to_id: Option<Uuid>,
    pub status: MessageStatus,
    pub is_deleted: bool,
    pub read_by: Vec<ReadReceipt>,
    pub reactions: Vec<Reaction>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatView {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub chat_type: ChatType,
    pub name: Option<String>,
    pub description: Option<String>,
    pub avatar_url: Option<String>,
    pub created_by: Option<Uuid>,
    pub settings: ChatSettings,
    pub last_message_id: Option<Uuid>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Chat> for ChatView {
    fn from(chat: Chat) -> Self {
        Self {
            id: chat.id,
            chat_type: chat.kind(),
            settings: ChatSettings {
                is_public: chat.is_public,
                approval_required: chat.approval_required,
                encrypted: chat.encrypted,
                read_receipts: chat.read_receipts,
            },
            name: chat.name,
            description: chat.description,
            avatar_url: chat.avatar_url,
            created_by: chat.created_by,
            last_message_id: chat.last_message_id,
            is_active: chat.is_active,
            created_at: chat.created_at,
            updated_at: chat.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Clone)]
pub struct ParticipantView {
    pub user_id: Uuid,
    pub name: Option<String>,
    pub photo: Option<String>,
    pub role: ChatRole,
    pub joined_at: DateTime<Utc>,
    pub last_read_message_id: Option<Uuid>,
    pub is_muted: bool,
    pub is_blocked: bool,
}

#[derive(Debug, Serialize)]
pub struct ChatDetail {
    #[serde(flatten)]
    pub chat: ChatView,
    pub participants: Vec<ParticipantView>,
    pub last_message: Option<MessageView>,
}

#[derive(Debug, Serialize)]
pub struct ChatSummary {
    #[serde(flatten)]
    pub detail: ChatDetail,
    pub unread_count: i64,
}

#[derive(Debug, Serialize)]
pub struct CreatedChat {
    pub created: bool,
    #[serde(flatten)]
    pub chat: ChatDetail,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct MessageDeleted {
    pub message_id: Uuid,
    pub is_deleted: bool,
}
