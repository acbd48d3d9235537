mod common;

use diesel::prelude::*;
use uuid::Uuid;

use common::{chat_request, insert_match, insert_user, text};
use vib3_messaging::chat::body::{Attachment, AttachmentKind, OutgoingMessage};
use vib3_messaging::chat::roles::ChatType;
use vib3_messaging::chat::status::MessageStatus;
use vib3_messaging::models::HistoryParams;
use vib3_messaging::schema::{chat_participants, chats, matches, messages};
use vib3_messaging::services::{chat_service, match_thread_service, message_service};
use vib3_shared::errors::ErrorCode;

fn direct_chat(conn: &mut PgConnection, a: Uuid, b: Uuid) -> Uuid {
    chat_service::create_chat(conn, a, chat_request(ChatType::Direct, vec![b]))
        .unwrap()
        .chat
        .chat
        .id
}

#[test]
fn send_moves_the_chat_pointer_and_delivers() {
    let Some(mut conn) = common::test_conn() else { return };
    let ana = insert_user(&mut conn, "Ana");
    let ben = insert_user(&mut conn, "Ben");
    let chat_id = direct_chat(&mut conn, ana, ben);

    let sent = message_service::send_message(&mut conn, ana, chat_id, &text("hello")).unwrap();
    assert_eq!(sent.status, MessageStatus::Delivered);
    assert_eq!(sent.read_by.len(), 1);
    assert_eq!(sent.read_by[0].user_id, ana);

    let last_message: Option<Uuid> = chats::table
        .find(chat_id)
        .select(chats::last_message_id)
        .first(&mut conn)
        .unwrap();
    assert_eq!(last_message, Some(sent.id));

    let last_read: Option<Uuid> = chat_participants::table
        .find((chat_id, ana))
        .select(chat_participants::last_read_message_id)
        .first(&mut conn)
        .unwrap();
    assert_eq!(last_read, Some(sent.id));
}

#[test]
fn attachment_only_message_is_stored() {
    let Some(mut conn) = common::test_conn() else { return };
    let ana = insert_user(&mut conn, "Ana");
    let ben = insert_user(&mut conn, "Ben");
    let chat_id = direct_chat(&mut conn, ana, ben);

    let photo = Attachment {
        kind: AttachmentKind::Image,
        url: "https://cdn.vib3.test/sunset.jpg".into(),
        name: Some("sunset.jpg".into()),
        size: Some(2048),
    };
    let outgoing = OutgoingMessage::new(None, Some(photo.clone()), Some("image".into()), None).unwrap();
    let sent = message_service::send_message(&mut conn, ana, chat_id, &outgoing).unwrap();
    assert_eq!(sent.content, None);
    assert_eq!(sent.attachment, Some(photo));
    assert_eq!(sent.message_type, "image");
}

#[test]
fn outsiders_get_not_found() {
    let Some(mut conn) = common::test_conn() else { return };
    let ana = insert_user(&mut conn, "Ana");
    let ben = insert_user(&mut conn, "Ben");
    let eve = insert_user(&mut conn, "Eve");
    let chat_id = direct_chat(&mut conn, ana, ben);
    message_service::send_message(&mut conn, ana, chat_id, &text("private")).unwrap();

    let err = message_service::get_chat_messages(&mut conn, eve, chat_id, &HistoryParams::default()).unwrap_err();
    assert_eq!(err.error_code(), ErrorCode::ChatNotFound);

    let err = message_service::send_message(&mut conn, eve, chat_id, &text("hi")).unwrap_err();
    assert_eq!(err.error_code(), ErrorCode::ChatNotFound);

    let err = message_service::get_chat_messages(&mut conn, ana, Uuid::new_v4(), &HistoryParams::default())
        .unwrap_err();
    assert_eq!(err.error_code(), ErrorCode::ChatNotFound);
}

#[test]
fn blocked_participant_cannot_send() {
    let Some(mut conn) = common::test_conn() else { return };
    let ana = insert_user(&mut conn, "Ana");
    let ben = insert_user(&mut conn, "Ben");
    let chat_id = direct_chat(&mut conn, ana, ben);

    diesel::update(chat_participants::table.find((chat_id, ben)))
        .set(chat_participants::is_blocked.eq(true))
        .execute(&mut conn)
        .unwrap();

    let err = message_service::send_message(&mut conn, ben, chat_id, &text("hey")).unwrap_err();
    assert_eq!(err.error_code(), ErrorCode::Forbidden);
    let count: i64 = messages::table.count().get_result(&mut conn).unwrap();
    assert_eq!(count, 0);
}

#[test]
fn reply_must_stay_in_the_same_chat() {
    let Some(mut conn) = common::test_conn() else { return };
    let ana = insert_user(&mut conn, "Ana");
    let ben = insert_user(&mut conn, "Ben");
    let cleo = insert_user(&mut conn, "Cleo");
    let with_ben = direct_chat(&mut conn, ana, ben);
    let with_cleo = direct_chat(&mut conn, ana, cleo);

    let elsewhere = message_service::send_message(&mut conn, ana, with_cleo, &text("hi Cleo")).unwrap();
    let original = message_service::send_message(&mut conn, ana, with_ben, &text("hi Ben")).unwrap();

    let reply = OutgoingMessage::new(Some("replying".into()), None, None, Some(elsewhere.id)).unwrap();
    let err = message_service::send_message(&mut conn, ben, with_ben, &reply).unwrap_err();
    assert_eq!(err.error_code(), ErrorCode::ValidationError);

    let reply = OutgoingMessage::new(Some("hi!".into()), None, None, Some(original.id)).unwrap();
    let sent = message_service::send_message(&mut conn, ben, with_ben, &reply).unwrap();
    assert_eq!(sent.reply_to_id, Some(original.id));
}

#[test]
fn fetching_marks_messages_read() {
    let Some(mut conn) = common::test_conn() else { return };
    let ana = insert_user(&mut conn, "Ana");
    let ben = insert_user(&mut conn, "Ben");
    let chat_id = direct_chat(&mut conn, ana, ben);

    let first = message_service::send_message(&mut conn, ana, chat_id, &text("one")).unwrap();
    let second = message_service::send_message(&mut conn, ana, chat_id, &text("two")).unwrap();

    // the sender reading their own messages changes no status
    let own = message_service::get_chat_messages(&mut conn, ana, chat_id, &HistoryParams::default()).unwrap();
    assert!(own.iter().all(|m| m.status == MessageStatus::Delivered));

    let seen = message_service::get_chat_messages(&mut conn, ben, chat_id, &HistoryParams::default()).unwrap();
    assert_eq!(seen.iter().map(|m| m.id).collect::<Vec<_>>(), vec![first.id, second.id]);
    assert!(seen.iter().all(|m| m.status == MessageStatus::Read));
    assert!(seen.iter().all(|m| m.read_by.iter().any(|r| r.user_id == ben)));

    let stored: Vec<String> = messages::table
        .filter(messages::chat_id.eq(chat_id))
        .select(messages::status)
        .load(&mut conn)
        .unwrap();
    assert!(stored.iter().all(|s| s == "read"));

    let last_read: Option<Uuid> = chat_participants::table
        .find((chat_id, ben))
        .select(chat_participants::last_read_message_id)
        .first(&mut conn)
        .unwrap();
    assert_eq!(last_read, Some(second.id));

    // fetching again adds no duplicate receipts
    let again = message_service::get_chat_messages(&mut conn, ben, chat_id, &HistoryParams::default()).unwrap();
    assert_eq!(again[0].read_by.len(), 2);
}

#[test]
fn history_pages_backwards() {
    let Some(mut conn) = common::test_conn() else { return };
    let ana = insert_user(&mut conn, "Ana");
    let ben = insert_user(&mut conn, "Ben");
    let chat_id = direct_chat(&mut conn, ana, ben);

    let sent: Vec<_> = (0..5)
        .map(|i| message_service::send_message(&mut conn, ana, chat_id, &text(&format!("m{i}"))).unwrap())
        .collect();

    let latest = HistoryParams { before: None, limit: Some(2) };
    let page = message_service::get_chat_messages(&mut conn, ben, chat_id, &latest).unwrap();
    assert_eq!(page.iter().map(|m| m.id).collect::<Vec<_>>(), vec![sent[3].id, sent[4].id]);

    let older = HistoryParams { before: Some(page[0].created_at), limit: Some(2) };
    let page = message_service::get_chat_messages(&mut conn, ben, chat_id, &older).unwrap();
    assert_eq!(page.iter().map(|m| m.id).collect::<Vec<_>>(), vec![sent[1].id, sent[2].id]);
}

#[test]
fn reactions_toggle_and_replace() {
    let Some(mut conn) = common::test_conn() else { return };
    let ana = insert_user(&mut conn, "Ana");
    let ben = insert_user(&mut conn, "Ben");
    let eve = insert_user(&mut conn, "Eve");
    let chat_id = direct_chat(&mut conn, ana, ben);
    let message = message_service::send_message(&mut conn, ana, chat_id, &text("guess what")).unwrap();

    let reactions = message_service::add_reaction(&mut conn, ben, message.id, "❤️").unwrap();
    assert_eq!(reactions.len(), 1);
    assert_eq!(reactions[0].emoji, "❤️");

    let reactions = message_service::add_reaction(&mut conn, ben, message.id, "😂").unwrap();
    assert_eq!(reactions.len(), 1);
    assert_eq!(reactions[0].emoji, "😂");

    let reactions = message_service::add_reaction(&mut conn, ben, message.id, "😂").unwrap();
    assert!(reactions.is_empty());

    let err = message_service::add_reaction(&mut conn, eve, message.id, "👀").unwrap_err();
    assert_eq!(err.error_code(), ErrorCode::NotChatParticipant);

    let err = message_service::add_reaction(&mut conn, ben, Uuid::new_v4(), "👀").unwrap_err();
    assert_eq!(err.error_code(), ErrorCode::MessageNotFound);
}

#[test]
fn only_the_sender_can_delete() {
    let Some(mut conn) = common::test_conn() else { return };
    let ana = insert_user(&mut conn, "Ana");
    let ben = insert_user(&mut conn, "Ben");
    let chat_id = direct_chat(&mut conn, ana, ben);
    let message = message_service::send_message(&mut conn, ana, chat_id, &text("keep me")).unwrap();

    let err = message_service::delete_message(&mut conn, ben, message.id).unwrap_err();
    assert_eq!(err.error_code(), ErrorCode::NotMessageSender);

    let (is_deleted, content): (bool, Option<String>) = messages::table
        .find(message.id)
        .select((messages::is_deleted, messages::content))
        .first(&mut conn)
        .unwrap();
    assert!(!is_deleted);
    assert_eq!(content.as_deref(), Some("keep me"));
}

#[test]
fn deletion_is_filtered_per_viewer() {
    let Some(mut conn) = common::test_conn() else { return };
    let ana = insert_user(&mut conn, "Ana");
    let ben = insert_user(&mut conn, "Ben");
    let chat_id = direct_chat(&mut conn, ana, ben);
    let kept = message_service::send_message(&mut conn, ana, chat_id, &text("still here")).unwrap();
    let gone = message_service::send_message(&mut conn, ana, chat_id, &text("oops")).unwrap();

    message_service::delete_message(&mut conn, ana, gone.id).unwrap();
    // idempotent
    message_service::delete_message(&mut conn, ana, gone.id).unwrap();

    // the sender no longer sees it at all
    let for_ana = message_service::get_chat_messages(&mut conn, ana, chat_id, &HistoryParams::default()).unwrap();
    assert_eq!(for_ana.iter().map(|m| m.id).collect::<Vec<_>>(), vec![kept.id]);

    // the other participant sees a tombstone
    let for_ben = message_service::get_chat_messages(&mut conn, ben, chat_id, &HistoryParams::default()).unwrap();
    assert_eq!(for_ben.len(), 2);
    let tombstone = for_ben.iter().find(|m| m.id == gone.id).unwrap();
    assert!(tombstone.is_deleted);
    assert_eq!(tombstone.content, None);
    assert_eq!(tombstone.attachment, None);
    let live = for_ben.iter().find(|m| m.id == kept.id).unwrap();
    assert_eq!(live.content.as_deref(), Some("still here"));

    // the preview skips what the viewer deleted
    let detail = chat_service::get_chat(&mut conn, ana, chat_id).unwrap();
    assert_eq!(detail.last_message.map(|m| m.id), Some(kept.id));
}

#[test]
fn match_thread_requires_a_mutual_match() {
    let Some(mut conn) = common::test_conn() else { return };
    let ana = insert_user(&mut conn, "Ana");
    let ben = insert_user(&mut conn, "Ben");
    let eve = insert_user(&mut conn, "Eve");
    let pending = insert_match(&mut conn, ana, eve, false);
    let matched = insert_match(&mut conn, ana, ben, true);

    let err = match_thread_service::send_match_message(&mut conn, ana, pending, &text("hi")).unwrap_err();
    assert_eq!(err.error_code(), ErrorCode::NotMatched);

    let err = match_thread_service::send_match_message(&mut conn, eve, matched, &text("hi")).unwrap_err();
    assert_eq!(err.error_code(), ErrorCode::MatchNotFound);

    let sent = match_thread_service::send_match_message(&mut conn, ana, matched, &text("we matched!")).unwrap();
    assert_eq!(sent.match_id, Some(matched));
    assert_eq!(sent.status, MessageStatus::Delivered);

    let pointer: Option<Uuid> = matches::table
        .find(matched)
        .select(matches::last_message_id)
        .first(&mut conn)
        .unwrap();
    assert_eq!(pointer, Some(sent.id));

    let history =
        match_thread_service::get_match_messages(&mut conn, ben, matched, &HistoryParams::default()).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].status, MessageStatus::Read);

    let err = match_thread_service::get_match_messages(&mut conn, eve, matched, &HistoryParams::default())
        .unwrap_err();
    assert_eq!(err.error_code(), ErrorCode::MatchNotFound);

    let reactions = vib3_messaging::services::message_service::add_reaction(&mut conn, ben, sent.id, "🎉").unwrap();
    assert_eq!(reactions.len(), 1);
}
