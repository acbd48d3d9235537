use diesel::prelude::*;
use uuid::Uuid;

use vib3_shared::errors::{AppError, AppResult, ErrorCode};

use crate::chat::body::{MessageParent, OutgoingMessage};
use crate::models::{HistoryParams, MessageView};
use crate::services::{access, thread};

/// Sends into the thread of a match. Only the two users of the pair see the
/// thread, and only a mutual match may be written to.
pub fn send_match_message(
    conn: &mut PgConnection,
    sender: Uuid,
    match_id: Uuid,
    outgoing: &OutgoingMessage,
) -> AppResult<MessageView> {
    let message = conn.transaction::<_, AppError, _>(|conn| {
        let thread_match = access::require_match_member(conn, match_id, sender)?;
        if !thread_match.matched {
            return Err(AppError::new(
                ErrorCode::NotMatched,
                "messages can only be sent once both users have matched",
            ));
        }
        thread::deliver(conn, MessageParent::Match(match_id), sender, outgoing)
    })?;

    metrics::counter!("messages_sent_total", "scope" => "match").increment(1);
    tracing::debug!(match_id = %match_id, message_id = %message.id, user_id = %sender, "match message sent");

    let mut views = thread::render_views(conn, vec![message], sender)?;
    views.pop().ok_or_else(|| AppError::internal("sent message could not be rendered"))
}

pub fn get_match_messages(
    conn: &mut PgConnection,
    viewer: Uuid,
    match_id: Uuid,
    params: &HistoryParams,
) -> AppResult<Vec<MessageView>> {
    access::require_match_member(conn, match_id, viewer)?;
    thread::fetch_history(conn, MessageParent::Match(match_id), viewer, params)
}
