//! Operations shared by chat threads and match threads: delivering a message,
//! read-on-fetch, receipts and per-viewer rendering.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use diesel::dsl::not;
use diesel::pg::Pg;
use diesel::prelude::*;
use uuid::Uuid;

use vib3_shared::errors::{AppError, AppResult};

use crate::chat::body::{MessageParent, OutgoingMessage};
use crate::chat::status::MessageStatus;
use crate::chat::visibility;
use crate::models::{HistoryParams, Message, MessageView, NewMessage, NewMessageRead, ReadReceipt, Reaction};
use crate::schema::{chat_participants, chats, matches, message_deletions, message_reactions, message_reads, messages};

fn in_parent<'a>(parent: MessageParent) -> messages::BoxedQuery<'a, Pg> {
    let query = messages::table.into_boxed();
    match parent {
        MessageParent::Chat(id) => query.filter(messages::chat_id.eq(id)),
        MessageParent::Match(id) => query.filter(messages::match_id.eq(id)),
    }
}

fn set_last_read(conn: &mut PgConnection, chat_id: Uuid, user_id: Uuid, message_id: Uuid) -> AppResult<()> {
    diesel::update(chat_participants::table.find((chat_id, user_id)))
        .set(chat_participants::last_read_message_id.eq(message_id))
        .execute(conn)?;
    Ok(())
}

fn ensure_reply_target(conn: &mut PgConnection, parent: MessageParent, reply_to: Uuid) -> AppResult<()> {
    let found: i64 = in_parent(parent)
        .filter(messages::id.eq(reply_to))
        .count()
        .get_result(conn)?;
    if found == 0 {
        return Err(AppError::Validation(
            "reply_to must reference a message in the same conversation".into(),
        ));
    }
    Ok(())
}

/// Persists a message and everything that must move with it: the parent's
/// last-message pointer, the sender's own receipt (status `delivered`) and,
/// for chats, the sender's read marker. Call inside a transaction.
pub fn deliver(
    conn: &mut PgConnection,
    parent: MessageParent,
    sender: Uuid,
    outgoing: &OutgoingMessage,
) -> AppResult<Message> {
    if let Some(reply_to) = outgoing.reply_to {
        ensure_reply_target(conn, parent, reply_to)?;
    }

    let message: Message = diesel::insert_into(messages::table)
        .values(&NewMessage::from_outgoing(parent, sender, outgoing))
        .returning(Message::as_returning())
        .get_result(conn)?;

    match parent {
        MessageParent::Chat(chat_id) => {
            diesel::update(chats::table.find(chat_id))
                .set((
                    chats::last_message_id.eq(message.id),
                    chats::updated_at.eq(message.created_at),
                ))
                .execute(conn)?;
        }
        MessageParent::Match(match_id) => {
            diesel::update(matches::table.find(match_id))
                .set((
                    matches::last_message_id.eq(message.id),
                    matches::updated_at.eq(message.created_at),
                ))
                .execute(conn)?;
        }
    }

    diesel::insert_into(message_reads::table)
        .values(&NewMessageRead {
            message_id: message.id,
            user_id: sender,
            read_at: message.created_at,
        })
        .on_conflict_do_nothing()
        .execute(conn)?;

    let status = message.status().advance(MessageStatus::Delivered);
    diesel::update(messages::table.find(message.id))
        .set(messages::status.eq(status.as_str()))
        .execute(conn)?;

    if let MessageParent::Chat(chat_id) = parent {
        set_last_read(conn, chat_id, sender, message.id)?;
    }

    Ok(Message {
        status: status.as_str().to_string(),
        ..message
    })
}

/// Records receipts for `rows` the viewer has not read yet and advances the
/// ones sent by someone else to `read`. Returns the ids that advanced.
fn record_reads(conn: &mut PgConnection, viewer: Uuid, rows: &[Message]) -> AppResult<Vec<Uuid>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<Uuid> = rows.iter().map(|m| m.id).collect();

    let already: HashSet<Uuid> = message_reads::table
        .filter(message_reads::user_id.eq(viewer))
        .filter(message_reads::message_id.eq_any(&ids))
        .select(message_reads::message_id)
        .load::<Uuid>(conn)?
        .into_iter()
        .collect();

    let now = Utc::now();
    let fresh: Vec<&Message> = rows.iter().filter(|m| !already.contains(&m.id)).collect();
    if fresh.is_empty() {
        return Ok(Vec::new());
    }

    let receipts: Vec<NewMessageRead> = fresh
        .iter()
        .map(|m| NewMessageRead { message_id: m.id, user_id: viewer, read_at: now })
        .collect();
    diesel::insert_into(message_reads::table)
        .values(&receipts)
        .on_conflict_do_nothing()
        .execute(conn)?;

    let advanced: Vec<Uuid> = fresh
        .iter()
        .filter(|m| m.sender_id != viewer)
        .map(|m| m.id)
        .collect();
    if !advanced.is_empty() {
        diesel::update(messages::table.filter(messages::id.eq_any(&advanced)))
            .set(messages::status.eq(MessageStatus::Read.as_str()))
            .execute(conn)?;
    }
    Ok(advanced)
}

/// A page of history, oldest first, as seen by `viewer`. Fetching counts as
/// reading: receipts, statuses and the read marker are updated atomically.
pub fn fetch_history(
    conn: &mut PgConnection,
    parent: MessageParent,
    viewer: Uuid,
    params: &HistoryParams,
) -> AppResult<Vec<MessageView>> {
    conn.transaction::<_, AppError, _>(|conn| {
        let mut query = in_parent(parent)
            .select(Message::as_select())
            .order((messages::created_at.desc(), messages::id.desc()))
            .limit(params.limit());
        if let Some(before) = params.before {
            query = query.filter(messages::created_at.lt(before));
        }

        let mut rows: Vec<Message> = query.load(conn)?;
        rows.reverse();

        let advanced = record_reads(conn, viewer, &rows)?;
        for row in rows.iter_mut().filter(|m| advanced.contains(&m.id)) {
            row.status = row.status().advance(MessageStatus::Read).as_str().to_string();
        }

        if let (MessageParent::Chat(chat_id), Some(newest)) = (parent, rows.last()) {
            set_last_read(conn, chat_id, viewer, newest.id)?;
        }

        render_views(conn, rows, viewer)
    })
}

/// Marks every message of the conversation as read by `viewer`. Returns how
/// many receipts were added.
pub fn mark_all_read(conn: &mut PgConnection, parent: MessageParent, viewer: Uuid) -> AppResult<usize> {
    conn.transaction::<_, AppError, _>(|conn| {
        let read_by_viewer = message_reads::table
            .filter(message_reads::user_id.eq(viewer))
            .select(message_reads::message_id);

        let unread: Vec<Message> = in_parent(parent)
            .filter(not(messages::id.eq_any(read_by_viewer)))
            .select(Message::as_select())
            .load(conn)?;
        record_reads(conn, viewer, &unread)?;

        let newest: Option<Uuid> = in_parent(parent)
            .select(messages::id)
            .order((messages::created_at.desc(), messages::id.desc()))
            .first(conn)
            .optional()?;
        if let (MessageParent::Chat(chat_id), Some(newest)) = (parent, newest) {
            set_last_read(conn, chat_id, viewer, newest)?;
        }

        Ok(unread.len())
    })
}

/// Messages from others the viewer has neither read nor deleted for themselves.
pub fn unread_count(conn: &mut PgConnection, parent: MessageParent, viewer: Uuid) -> AppResult<i64> {
    let read_by_viewer = message_reads::table
        .filter(message_reads::user_id.eq(viewer))
        .select(message_reads::message_id);
    let hidden_for_viewer = message_deletions::table
        .filter(message_deletions::user_id.eq(viewer))
        .select(message_deletions::message_id);

    Ok(in_parent(parent)
        .filter(messages::sender_id.ne(viewer))
        .filter(not(messages::id.eq_any(read_by_viewer)))
        .filter(not(messages::id.eq_any(hidden_for_viewer)))
        .count()
        .get_result(conn)?)
}

/// The newest message the viewer can see, for chat previews.
pub fn latest_for_viewer(
    conn: &mut PgConnection,
    parent: MessageParent,
    viewer: Uuid,
) -> AppResult<Option<MessageView>> {
    let hidden_for_viewer = message_deletions::table
        .filter(message_deletions::user_id.eq(viewer))
        .select(message_deletions::message_id);

    let row: Option<Message> = in_parent(parent)
        .filter(not(messages::id.eq_any(hidden_for_viewer)))
        .select(Message::as_select())
        .order((messages::created_at.desc(), messages::id.desc()))
        .first(conn)
        .optional()?;

    match row {
        Some(row) => Ok(render_views(conn, vec![row], viewer)?.pop()),
        None => Ok(None),
    }
}

/// Attaches receipts and reactions, then applies per-viewer visibility.
pub fn render_views(conn: &mut PgConnection, rows: Vec<Message>, viewer: Uuid) -> AppResult<Vec<MessageView>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<Uuid> = rows.iter().map(|m| m.id).collect();

    let hidden: HashSet<Uuid> = message_deletions::table
        .filter(message_deletions::user_id.eq(viewer))
        .filter(message_deletions::message_id.eq_any(&ids))
        .select(message_deletions::message_id)
        .load::<Uuid>(conn)?
        .into_iter()
        .collect();

    let mut reads: HashMap<Uuid, Vec<ReadReceipt>> = HashMap::new();
    let receipts: Vec<(Uuid, Uuid, DateTime<Utc>)> = message_reads::table
        .filter(message_reads::message_id.eq_any(&ids))
        .order(message_reads::read_at.asc())
        .select((message_reads::message_id, message_reads::user_id, message_reads::read_at))
        .load(conn)?;
    for (message_id, user_id, read_at) in receipts {
        reads.entry(message_id).or_default().push(ReadReceipt { user_id, read_at });
    }

    let mut reactions: HashMap<Uuid, Vec<Reaction>> = HashMap::new();
    let rows_reactions: Vec<Reaction> = message_reactions::table
        .filter(message_reactions::message_id.eq_any(&ids))
        .order(message_reactions::created_at.asc())
        .select(Reaction::as_select())
        .load(conn)?;
    for reaction in rows_reactions {
        reactions.entry(reaction.message_id).or_default().push(reaction);
    }

    Ok(rows
        .into_iter()
        .filter_map(|row| {
            let id = row.id;
            visibility::render(
                row,
                hidden.contains(&id),
                reads.remove(&id).unwrap_or_default(),
                reactions.remove(&id).unwrap_or_default(),
            )
        })
        .collect())
}
