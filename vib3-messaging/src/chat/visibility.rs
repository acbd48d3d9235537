use crate::models::{Message, MessageView, ReadReceipt, Reaction};

/// How a stored message appears to one viewer. Global deletion and
/// per-viewer deletion are independent flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    /// Deleted by its sender: metadata only.
    Tombstone,
    /// Deleted for this viewer: not returned at all.
    Hidden,
}

pub fn for_viewer(globally_deleted: bool, hidden_for_viewer: bool) -> Visibility {
    if hidden_for_viewer {
        Visibility::Hidden
    } else if globally_deleted {
        Visibility::Tombstone
    } else {
        Visibility::Visible
    }
}

pub fn render(
    row: Message,
    hidden_for_viewer: bool,
    read_by: Vec<ReadReceipt>,
    reactions: Vec<Reaction>,
) -> Option<MessageView> {
    let visibility = for_viewer(row.is_deleted, hidden_for_viewer);
    if visibility == Visibility::Hidden {
        return None;
    }

    let tombstone = visibility == Visibility::Tombstone;
    Some(MessageView {
        id: row.id,
        chat_id: row.chat_id,
        match_id: row.match_id,
        sender_id: row.sender_id,
        status: row.status(),
        content: if tombstone { None } else { row.content.clone() },
        attachment: if tombstone { None } else { row.attachment() },
        message_type: row.message_type,
        reply_to_id: row.reply_to_id,
        is_deleted: row.is_deleted,
        read_by,
        reactions: if tombstone { Vec::new() } else { reactions },
        created_at: row.created_at,
        updated_at: row.updated_at,
        client_id: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn row(is_deleted: bool) -> Message {
        let now = Utc::now();
        Message {
            id: Uuid::new_v4(),
            chat_id: Some(Uuid::new_v4()),
            match_id: None,
            sender_id: Uuid::new_v4(),
            content: Some("see you at eight".into()),
            message_type: "text".into(),
            attachment_type: Some("image".into()),
            attachment_url: Some("https://cdn.vib3.test/p.jpg".into()),
            attachment_name: None,
            attachment_size: None,
            reply_to_id: None,
            status: "delivered".into(),
            is_deleted,
            created_at: now,
            updated_at: now,
        }
    }

    fn reaction() -> Reaction {
        Reaction {
            message_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            emoji: "🔥".into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn flags_are_independent() {
        assert_eq!(for_viewer(false, false), Visibility::Visible);
        assert_eq!(for_viewer(true, false), Visibility::Tombstone);
        assert_eq!(for_viewer(false, true), Visibility::Hidden);
        assert_eq!(for_viewer(true, true), Visibility::Hidden);
    }

    #[test]
    fn live_message_keeps_its_body() {
        let view = render(row(false), false, vec![], vec![reaction()]).unwrap();
        assert_eq!(view.content.as_deref(), Some("see you at eight"));
        assert!(view.attachment.is_some());
        assert_eq!(view.reactions.len(), 1);
    }

    #[test]
    fn tombstone_drops_content_and_attachment() {
        let view = render(row(true), false, vec![], vec![reaction()]).unwrap();
        assert!(view.is_deleted);
        assert_eq!(view.content, None);
        assert_eq!(view.attachment, None);
        assert!(view.reactions.is_empty());
    }

    #[test]
    fn hidden_message_is_not_rendered() {
        assert!(render(row(false), true, vec![], vec![]).is_none());
        assert!(render(row(true), true, vec![], vec![]).is_none());
    }
}
