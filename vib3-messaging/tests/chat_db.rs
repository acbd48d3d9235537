mod common;

use diesel::prelude::*;

use common::{chat_request, insert_user, text};
use vib3_messaging::chat::roles::{ChatRole, ChatType};
use vib3_messaging::schema::{chats, user_chats};
use vib3_messaging::services::{chat_service, message_service};
use vib3_shared::errors::ErrorCode;
use vib3_shared::types::pagination::PaginationParams;

#[test]
fn direct_chat_creation_is_idempotent() {
    let Some(mut conn) = common::test_conn() else { return };
    let ana = insert_user(&mut conn, "Ana");
    let ben = insert_user(&mut conn, "Ben");

    let first = chat_service::create_chat(&mut conn, ana, chat_request(ChatType::Direct, vec![ben])).unwrap();
    assert!(first.created);

    let again = chat_service::create_chat(&mut conn, ben, chat_request(ChatType::Direct, vec![ana])).unwrap();
    assert!(!again.created);
    assert_eq!(first.chat.chat.id, again.chat.chat.id);

    let rows: i64 = chats::table.count().get_result(&mut conn).unwrap();
    assert_eq!(rows, 1);
    let index_rows: i64 = user_chats::table.count().get_result(&mut conn).unwrap();
    assert_eq!(index_rows, 2);
}

#[test]
fn deleted_direct_chat_can_be_started_again() {
    let Some(mut conn) = common::test_conn() else { return };
    let ana = insert_user(&mut conn, "Ana");
    let ben = insert_user(&mut conn, "Ben");

    let first = chat_service::create_chat(&mut conn, ana, chat_request(ChatType::Direct, vec![ben])).unwrap();
    chat_service::delete_chat(&mut conn, ben, first.chat.chat.id).unwrap();

    let err = chat_service::get_chat(&mut conn, ana, first.chat.chat.id).unwrap_err();
    assert_eq!(err.error_code(), ErrorCode::ChatNotFound);

    let second = chat_service::create_chat(&mut conn, ana, chat_request(ChatType::Direct, vec![ben])).unwrap();
    assert!(second.created);
    assert_ne!(first.chat.chat.id, second.chat.chat.id);
}

#[test]
fn unknown_participant_rolls_nothing_in() {
    let Some(mut conn) = common::test_conn() else { return };
    let ana = insert_user(&mut conn, "Ana");

    let err = chat_service::create_chat(
        &mut conn,
        ana,
        chat_request(ChatType::Group, vec![uuid::Uuid::new_v4()]),
    )
    .unwrap_err();
    assert_eq!(err.error_code(), ErrorCode::UserNotFound);

    let rows: i64 = chats::table.count().get_result(&mut conn).unwrap();
    assert_eq!(rows, 0);
}

#[test]
fn group_creator_is_admin_and_others_members() {
    let Some(mut conn) = common::test_conn() else { return };
    let ana = insert_user(&mut conn, "Ana");
    let ben = insert_user(&mut conn, "Ben");
    let cleo = insert_user(&mut conn, "Cleo");

    let created = chat_service::create_chat(&mut conn, ana, chat_request(ChatType::Group, vec![ben, cleo, ben])).unwrap();
    let roles: Vec<_> = created.chat.participants.iter().map(|p| (p.user_id, p.role)).collect();
    assert_eq!(roles.len(), 3);
    assert!(roles.contains(&(ana, ChatRole::Admin)));
    assert!(roles.contains(&(ben, ChatRole::Member)));
    assert_eq!(created.chat.participants.iter().find(|p| p.user_id == ben).unwrap().name.as_deref(), Some("Ben"));
}

#[test]
fn participant_management_follows_roles() {
    let Some(mut conn) = common::test_conn() else { return };
    let admin = insert_user(&mut conn, "Ana");
    let member = insert_user(&mut conn, "Ben");
    let newcomer = insert_user(&mut conn, "Cleo");

    let chat_id = chat_service::create_chat(&mut conn, admin, chat_request(ChatType::Group, vec![member]))
        .unwrap()
        .chat
        .chat
        .id;

    let err = chat_service::add_participant(&mut conn, member, chat_id, newcomer, None).unwrap_err();
    assert_eq!(err.error_code(), ErrorCode::InsufficientChatRole);

    chat_service::update_participant_role(&mut conn, admin, chat_id, member, ChatRole::Moderator).unwrap();
    let detail = chat_service::add_participant(&mut conn, member, chat_id, newcomer, None).unwrap();
    assert_eq!(detail.participants.len(), 3);

    // adding again is a no-op
    let detail = chat_service::add_participant(&mut conn, admin, chat_id, newcomer, None).unwrap();
    assert_eq!(detail.participants.len(), 3);

    let err = chat_service::remove_participant(&mut conn, member, chat_id, newcomer).unwrap_err();
    assert_eq!(err.error_code(), ErrorCode::InsufficientChatRole);

    chat_service::remove_participant(&mut conn, newcomer, chat_id, newcomer).unwrap();
    let err = chat_service::get_chat(&mut conn, newcomer, chat_id).unwrap_err();
    assert_eq!(err.error_code(), ErrorCode::ChatNotFound);

    let err = chat_service::update_participant_role(&mut conn, member, chat_id, admin, ChatRole::Member).unwrap_err();
    assert_eq!(err.error_code(), ErrorCode::InsufficientChatRole);

    let err = chat_service::delete_chat(&mut conn, member, chat_id).unwrap_err();
    assert_eq!(err.error_code(), ErrorCode::InsufficientChatRole);
    chat_service::delete_chat(&mut conn, admin, chat_id).unwrap();
}

#[test]
fn direct_chat_participants_are_fixed() {
    let Some(mut conn) = common::test_conn() else { return };
    let ana = insert_user(&mut conn, "Ana");
    let ben = insert_user(&mut conn, "Ben");
    let cleo = insert_user(&mut conn, "Cleo");

    let chat_id = chat_service::create_chat(&mut conn, ana, chat_request(ChatType::Direct, vec![ben]))
        .unwrap()
        .chat
        .chat
        .id;
    let err = chat_service::add_participant(&mut conn, ana, chat_id, cleo, None).unwrap_err();
    assert_eq!(err.error_code(), ErrorCode::GroupOnlyOperation);
}

#[test]
fn chat_list_carries_preview_and_unread_count() {
    let Some(mut conn) = common::test_conn() else { return };
    let ana = insert_user(&mut conn, "Ana");
    let ben = insert_user(&mut conn, "Ben");
    let chat_id = chat_service::create_chat(&mut conn, ana, chat_request(ChatType::Direct, vec![ben]))
        .unwrap()
        .chat
        .chat
        .id;

    message_service::send_message(&mut conn, ana, chat_id, &text("hi Ben")).unwrap();
    message_service::send_message(&mut conn, ana, chat_id, &text("are you free tonight?")).unwrap();

    let page = chat_service::list_chats(&mut conn, ben, &PaginationParams::default()).unwrap();
    assert_eq!(page.total, 1);
    let summary = &page.items[0];
    assert_eq!(summary.unread_count, 2);
    assert_eq!(
        summary.detail.last_message.as_ref().and_then(|m| m.content.as_deref()),
        Some("are you free tonight?")
    );

    let sender_view = chat_service::list_chats(&mut conn, ana, &PaginationParams::default()).unwrap();
    assert_eq!(sender_view.items[0].unread_count, 0);

    message_service::mark_chat_read(&mut conn, ben, chat_id).unwrap();
    let page = chat_service::list_chats(&mut conn, ben, &PaginationParams::default()).unwrap();
    assert_eq!(page.items[0].unread_count, 0);
}
