use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use vib3_shared::errors::{AppError, AppResult, ErrorCode};
use vib3_shared::types::pagination::{Paginated, PaginationParams};
use vib3_shared::types::UserPair;

use crate::chat::body::MessageParent;
use crate::chat::roles::{ChatRole, ChatType};
use crate::models::{
    Chat, ChatDetail, ChatSummary, ChatView, CreateChatRequest, CreatedChat, NewChat, NewParticipant, NewUserChat,
    Participant, ParticipantView,
};
use crate::schema::{chat_participants, chats, user_chats};
use crate::services::{access, profiles, thread};

/// Unique participant ids other than the creator, in request order.
pub fn other_participants(creator: Uuid, requested: &[Uuid]) -> Vec<Uuid> {
    let mut out: Vec<Uuid> = Vec::with_capacity(requested.len());
    for id in requested {
        if *id != creator && !out.contains(id) {
            out.push(*id);
        }
    }
    out
}

/// Participant-count rule for the requested chat type.
pub fn check_participant_count(chat_type: ChatType, others: &[Uuid]) -> AppResult<()> {
    if others.is_empty() {
        return Err(AppError::Validation("a chat needs at least one other participant".into()));
    }
    if chat_type == ChatType::Direct && others.len() != 1 {
        return Err(AppError::new(
            ErrorCode::DirectChatParticipants,
            "a direct chat has exactly two participants",
        ));
    }
    Ok(())
}

fn participant_views(conn: &mut PgConnection, chat_id: Uuid) -> AppResult<Vec<ParticipantView>> {
    let participants: Vec<Participant> = chat_participants::table
        .filter(chat_participants::chat_id.eq(chat_id))
        .order(chat_participants::joined_at.asc())
        .select(Participant::as_select())
        .load(conn)?;

    let ids: Vec<Uuid> = participants.iter().map(|p| p.user_id).collect();
    let mut cards = profiles::load_cards(conn, &ids)?;

    Ok(participants
        .into_iter()
        .map(|p| {
            let card = cards.remove(&p.user_id);
            ParticipantView {
                user_id: p.user_id,
                role: p.role(),
                name: card.as_ref().map(|c| c.name.clone()),
                photo: card.and_then(|c| c.photo),
                joined_at: p.joined_at,
                last_read_message_id: p.last_read_message_id,
                is_muted: p.is_muted,
                is_blocked: p.is_blocked,
            }
        })
        .collect())
}

fn detail(conn: &mut PgConnection, chat: Chat, viewer: Uuid) -> AppResult<ChatDetail> {
    let participants = participant_views(conn, chat.id)?;
    let last_message = thread::latest_for_viewer(conn, MessageParent::Chat(chat.id), viewer)?;
    Ok(ChatDetail {
        chat: ChatView::from(chat),
        participants,
        last_message,
    })
}

fn insert_member(conn: &mut PgConnection, chat_id: Uuid, user_id: Uuid, role: ChatRole) -> AppResult<()> {
    diesel::insert_into(chat_participants::table)
        .values(&NewParticipant {
            chat_id,
            user_id,
            role: role.as_str(),
            joined_at: Utc::now(),
        })
        .execute(conn)?;
    diesel::insert_into(user_chats::table)
        .values(&NewUserChat { user_id, chat_id })
        .on_conflict_do_nothing()
        .execute(conn)?;
    Ok(())
}

/// Creates a chat with its participants and membership index in one
/// transaction. A live direct chat for the same pair is returned instead of
/// creating a second one.
pub fn create_chat(conn: &mut PgConnection, creator: Uuid, req: CreateChatRequest) -> AppResult<CreatedChat> {
    let others = other_participants(creator, &req.participant_ids);
    check_participant_count(req.chat_type, &others)?;
    profiles::require_users(conn, &others)?;

    let direct_key = match req.chat_type {
        ChatType::Direct => UserPair::new(creator, others[0]).map(|pair| pair.key()),
        ChatType::Group => None,
    };

    let (chat, created) = conn.transaction::<_, AppError, _>(|conn| {
        if let Some(key) = &direct_key {
            let existing: Option<Chat> = chats::table
                .filter(chats::direct_key.eq(key))
                .filter(chats::is_deleted.eq(false))
                .select(Chat::as_select())
                .first(conn)
                .optional()?;
            if let Some(chat) = existing {
                return Ok((chat, false));
            }
        }

        let now = Utc::now();
        let chat: Chat = diesel::insert_into(chats::table)
            .values(&NewChat {
                id: Uuid::now_v7(),
                chat_type: req.chat_type.as_str(),
                name: req.name.as_deref().map(str::trim),
                description: req.description.as_deref(),
                avatar_url: req.avatar_url.as_deref(),
                created_by: Some(creator),
                is_public: req.settings.is_public,
                approval_required: req.settings.approval_required,
                encrypted: req.settings.encrypted,
                read_receipts: req.settings.read_receipts,
                direct_key: direct_key.clone(),
                created_at: now,
                updated_at: now,
            })
            .returning(Chat::as_returning())
            .get_result(conn)?;

        insert_member(conn, chat.id, creator, ChatRole::Admin)?;
        for user_id in &others {
            insert_member(conn, chat.id, *user_id, ChatRole::Member)?;
        }
        Ok((chat, true))
    })?;

    if created {
        metrics::counter!("chats_created_total", "type" => req.chat_type.as_str()).increment(1);
        tracing::info!(chat_id = %chat.id, user_id = %creator, chat_type = req.chat_type.as_str(), participants = others.len() + 1, "chat created");
    }

    Ok(CreatedChat {
        created,
        chat: detail(conn, chat, creator)?,
    })
}

pub fn list_chats(
    conn: &mut PgConnection,
    user_id: Uuid,
    params: &PaginationParams,
) -> AppResult<Paginated<ChatSummary>> {
    let member_of = chat_participants::table
        .filter(chat_participants::user_id.eq(user_id))
        .select(chat_participants::chat_id);

    let total: i64 = chats::table
        .filter(chats::is_deleted.eq(false))
        .filter(chats::id.eq_any(member_of))
        .count()
        .get_result(conn)?;

    let member_of = chat_participants::table
        .filter(chat_participants::user_id.eq(user_id))
        .select(chat_participants::chat_id);

    let page: Vec<Chat> = chats::table
        .filter(chats::is_deleted.eq(false))
        .filter(chats::id.eq_any(member_of))
        .order((chats::updated_at.desc(), chats::id.desc()))
        .offset(params.offset() as i64)
        .limit(params.limit() as i64)
        .select(Chat::as_select())
        .load(conn)?;

    let mut items = Vec::with_capacity(page.len());
    for chat in page {
        let unread_count = thread::unread_count(conn, MessageParent::Chat(chat.id), user_id)?;
        items.push(ChatSummary {
            detail: detail(conn, chat, user_id)?,
            unread_count,
        });
    }

    Ok(Paginated::new(items, total as u64, params))
}

pub fn get_chat(conn: &mut PgConnection, user_id: Uuid, chat_id: Uuid) -> AppResult<ChatDetail> {
    let (chat, _) = access::require_participant(conn, chat_id, user_id)?;
    detail(conn, chat, user_id)
}

/// Soft delete. Group chats need an admin; either side may close a direct
/// chat. The direct key is released so the pair can start over.
pub fn delete_chat(conn: &mut PgConnection, actor: Uuid, chat_id: Uuid) -> AppResult<()> {
    conn.transaction::<_, AppError, _>(|conn| {
        let (chat, participant) = access::require_participant(conn, chat_id, actor)?;
        if !chat.is_direct() && participant.role() != ChatRole::Admin {
            return Err(AppError::new(
                ErrorCode::InsufficientChatRole,
                "only an admin can delete a group chat",
            ));
        }

        diesel::update(chats::table.find(chat.id))
            .set((
                chats::is_deleted.eq(true),
                chats::direct_key.eq(None::<String>),
                chats::updated_at.eq(Utc::now()),
            ))
            .execute(conn)?;
        Ok(())
    })?;

    tracing::info!(chat_id = %chat_id, user_id = %actor, "chat deleted");
    Ok(())
}

fn require_group(chat: &Chat) -> AppResult<()> {
    if chat.is_direct() {
        return Err(AppError::new(
            ErrorCode::GroupOnlyOperation,
            "participants of a direct chat cannot be changed",
        ));
    }
    Ok(())
}

fn require_target(conn: &mut PgConnection, chat_id: Uuid, user_id: Uuid) -> AppResult<Participant> {
    access::find_participant(conn, chat_id, user_id)?
        .ok_or_else(|| AppError::not_found("participant not found"))
}

/// Adds a member to a group. Adding someone already present is a no-op.
pub fn add_participant(
    conn: &mut PgConnection,
    actor: Uuid,
    chat_id: Uuid,
    user_id: Uuid,
    role: Option<ChatRole>,
) -> AppResult<ChatDetail> {
    let role = role.unwrap_or(ChatRole::Member);

    let chat = conn.transaction::<_, AppError, _>(|conn| {
        let (chat, acting) = access::require_participant(conn, chat_id, actor)?;
        require_group(&chat)?;
        if !acting.role().can_add_participants() || !acting.role().can_grant(role) {
            return Err(AppError::new(
                ErrorCode::InsufficientChatRole,
                "your role does not allow adding this participant",
            ));
        }
        profiles::require_users(conn, &[user_id])?;

        if access::find_participant(conn, chat_id, user_id)?.is_none() {
            insert_member(conn, chat_id, user_id, role)?;
            diesel::update(chats::table.find(chat_id))
                .set(chats::updated_at.eq(Utc::now()))
                .execute(conn)?;
            tracing::info!(chat_id = %chat_id, user_id = %user_id, added_by = %actor, role = %role, "participant added");
        }
        Ok(chat)
    })?;

    detail(conn, chat, actor)
}

/// Admins remove anyone; any participant may remove themselves.
pub fn remove_participant(conn: &mut PgConnection, actor: Uuid, chat_id: Uuid, user_id: Uuid) -> AppResult<()> {
    conn.transaction::<_, AppError, _>(|conn| {
        let (chat, acting) = access::require_participant(conn, chat_id, actor)?;
        require_group(&chat)?;
        if !acting.role().can_remove(actor, user_id) {
            return Err(AppError::new(
                ErrorCode::InsufficientChatRole,
                "only an admin can remove other participants",
            ));
        }
        require_target(conn, chat_id, user_id)?;

        diesel::delete(chat_participants::table.find((chat_id, user_id))).execute(conn)?;
        diesel::delete(user_chats::table.find((user_id, chat_id))).execute(conn)?;
        diesel::update(chats::table.find(chat_id))
            .set(chats::updated_at.eq(Utc::now()))
            .execute(conn)?;
        Ok(())
    })?;

    tracing::info!(chat_id = %chat_id, user_id = %user_id, removed_by = %actor, "participant removed");
    Ok(())
}

pub fn update_participant_role(
    conn: &mut PgConnection,
    actor: Uuid,
    chat_id: Uuid,
    user_id: Uuid,
    role: ChatRole,
) -> AppResult<ChatDetail> {
    let chat = conn.transaction::<_, AppError, _>(|conn| {
        let (chat, acting) = access::require_participant(conn, chat_id, actor)?;
        require_group(&chat)?;
        if !acting.role().can_change_roles() {
            return Err(AppError::new(
                ErrorCode::InsufficientChatRole,
                "only an admin can change roles",
            ));
        }
        require_target(conn, chat_id, user_id)?;

        diesel::update(chat_participants::table.find((chat_id, user_id)))
            .set(chat_participants::role.eq(role.as_str()))
            .execute(conn)?;
        Ok(chat)
    })?;

    tracing::info!(chat_id = %chat_id, user_id = %user_id, role = %role, "participant role changed");
    detail(conn, chat, actor)
}
