use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use vib3_shared::errors::{AppError, AppResult, ErrorCode};

use crate::chat::body::{MessageParent, OutgoingMessage};
use crate::chat::reactions::{self, ReactionChange};
use crate::models::{HistoryParams, MessageDeleted, MessageView, NewDeletion, NewReaction, Reaction};
use crate::schema::{message_deletions, message_reactions, messages};
use crate::services::{access, thread};

/// Sends into a chat. Outsiders get "not found"; blocked participants are
/// refused outright.
pub fn send_message(
    conn: &mut PgConnection,
    sender: Uuid,
    chat_id: Uuid,
    outgoing: &OutgoingMessage,
) -> AppResult<MessageView> {
    let message = conn.transaction::<_, AppError, _>(|conn| {
        let (_, participant) = access::require_participant(conn, chat_id, sender)?;
        if participant.is_blocked {
            return Err(AppError::forbidden("you are blocked in this chat"));
        }
        thread::deliver(conn, MessageParent::Chat(chat_id), sender, outgoing)
    })?;

    metrics::counter!("messages_sent_total", "scope" => "chat").increment(1);
    tracing::debug!(chat_id = %chat_id, message_id = %message.id, user_id = %sender, "message sent");

    let mut views = thread::render_views(conn, vec![message], sender)?;
    views.pop().ok_or_else(|| AppError::internal("sent message could not be rendered"))
}

pub fn get_chat_messages(
    conn: &mut PgConnection,
    viewer: Uuid,
    chat_id: Uuid,
    params: &HistoryParams,
) -> AppResult<Vec<MessageView>> {
    access::require_participant(conn, chat_id, viewer)?;
    thread::fetch_history(conn, MessageParent::Chat(chat_id), viewer, params)
}

pub fn mark_chat_read(conn: &mut PgConnection, viewer: Uuid, chat_id: Uuid) -> AppResult<usize> {
    access::require_participant(conn, chat_id, viewer)?;
    let marked = thread::mark_all_read(conn, MessageParent::Chat(chat_id), viewer)?;
    tracing::debug!(chat_id = %chat_id, user_id = %viewer, marked, "chat marked read");
    Ok(marked)
}

/// Sender-only. Sets the global flag and hides the message from the sender;
/// repeating the call changes nothing.
pub fn delete_message(conn: &mut PgConnection, requester: Uuid, message_id: Uuid) -> AppResult<MessageDeleted> {
    conn.transaction::<_, AppError, _>(|conn| {
        let message = access::load_message(conn, message_id)?;
        if message.sender_id != requester {
            return Err(AppError::new(
                ErrorCode::NotMessageSender,
                "you can only delete your own messages",
            ));
        }

        if !message.is_deleted {
            diesel::update(messages::table.find(message_id))
                .set((messages::is_deleted.eq(true), messages::updated_at.eq(Utc::now())))
                .execute(conn)?;
        }
        diesel::insert_into(message_deletions::table)
            .values(&NewDeletion {
                message_id,
                user_id: requester,
                deleted_at: Utc::now(),
            })
            .on_conflict_do_nothing()
            .execute(conn)?;
        Ok(())
    })?;

    tracing::info!(message_id = %message_id, user_id = %requester, "message deleted");
    Ok(MessageDeleted { message_id, is_deleted: true })
}

/// Toggles or replaces the requester's reaction and returns the message's
/// reactions after the change.
pub fn add_reaction(
    conn: &mut PgConnection,
    requester: Uuid,
    message_id: Uuid,
    emoji: &str,
) -> AppResult<Vec<Reaction>> {
    let emoji = reactions::validate_emoji(emoji)?;

    conn.transaction::<_, AppError, _>(|conn| {
        let message = access::load_message(conn, message_id)?;
        if !access::can_access_parent(conn, message.parent()?, requester)? {
            return Err(AppError::new(
                ErrorCode::NotChatParticipant,
                "you are not a participant of this conversation",
            ));
        }

        let existing: Option<String> = message_reactions::table
            .find((message_id, requester))
            .select(message_reactions::emoji)
            .for_update()
            .first(conn)
            .optional()?;

        let change = reactions::resolve(existing.as_deref(), emoji);
        match change {
            ReactionChange::Added => {
                diesel::insert_into(message_reactions::table)
                    .values(&NewReaction {
                        message_id,
                        user_id: requester,
                        emoji,
                        created_at: Utc::now(),
                    })
                    .execute(conn)?;
            }
            ReactionChange::Replaced => {
                diesel::update(message_reactions::table.find((message_id, requester)))
                    .set((
                        message_reactions::emoji.eq(emoji),
                        message_reactions::created_at.eq(Utc::now()),
                    ))
                    .execute(conn)?;
            }
            ReactionChange::Removed => {
                diesel::delete(message_reactions::table.find((message_id, requester))).execute(conn)?;
            }
        }
        tracing::debug!(message_id = %message_id, user_id = %requester, ?change, "reaction updated");

        Ok(message_reactions::table
            .filter(message_reactions::message_id.eq(message_id))
            .order(message_reactions::created_at.asc())
            .select(Reaction::as_select())
            .load(conn)?)
    })
}
