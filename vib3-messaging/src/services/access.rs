use diesel::prelude::*;
use uuid::Uuid;

use vib3_shared::errors::{AppError, AppResult, ErrorCode};

use crate::chat::body::MessageParent;
use crate::models::{Chat, MatchThread, Message, Participant};
use crate::schema::{chat_participants, chats, matches, messages};

fn chat_not_found() -> AppError {
    AppError::new(ErrorCode::ChatNotFound, "chat not found")
}

/// A live (not soft-deleted) chat.
pub fn load_chat(conn: &mut PgConnection, chat_id: Uuid) -> AppResult<Chat> {
    chats::table
        .find(chat_id)
        .filter(chats::is_deleted.eq(false))
        .select(Chat::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(chat_not_found)
}

pub fn find_participant(
    conn: &mut PgConnection,
    chat_id: Uuid,
    user_id: Uuid,
) -> AppResult<Option<Participant>> {
    Ok(chat_participants::table
        .find((chat_id, user_id))
        .select(Participant::as_select())
        .first(conn)
        .optional()?)
}

/// Missing chat, deleted chat and non-membership all answer "not found" so
/// outsiders cannot probe for chat ids.
pub fn require_participant(
    conn: &mut PgConnection,
    chat_id: Uuid,
    user_id: Uuid,
) -> AppResult<(Chat, Participant)> {
    let chat = load_chat(conn, chat_id)?;
    let participant = find_participant(conn, chat_id, user_id)?.ok_or_else(chat_not_found)?;
    Ok((chat, participant))
}

/// The match thread, visible only to the two users of the pair.
pub fn require_match_member(conn: &mut PgConnection, match_id: Uuid, user_id: Uuid) -> AppResult<MatchThread> {
    matches::table
        .find(match_id)
        .select(MatchThread::as_select())
        .first(conn)
        .optional()?
        .filter(|m| m.includes(user_id))
        .ok_or_else(|| AppError::new(ErrorCode::MatchNotFound, "match not found"))
}

pub fn load_message(conn: &mut PgConnection, message_id: Uuid) -> AppResult<Message> {
    messages::table
        .find(message_id)
        .select(Message::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::MessageNotFound, "message not found"))
}

/// Whether `user_id` currently takes part in the conversation a message
/// belongs to.
pub fn can_access_parent(conn: &mut PgConnection, parent: MessageParent, user_id: Uuid) -> AppResult<bool> {
    match parent {
        MessageParent::Chat(chat_id) => {
            let live: bool = chats::table
                .find(chat_id)
                .select(chats::is_deleted)
                .first::<bool>(conn)
                .optional()?
                .is_some_and(|deleted| !deleted);
            Ok(live && find_participant(conn, chat_id, user_id)?.is_some())
        }
        MessageParent::Match(match_id) => Ok(matches::table
            .find(match_id)
            .select(MatchThread::as_select())
            .first(conn)
            .optional()?
            .is_some_and(|m| m.includes(user_id))),
    }
}
