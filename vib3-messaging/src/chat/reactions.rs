use vib3_shared::errors::{AppError, AppResult};

pub const MAX_EMOJI_BYTES: usize = 32;

/// Outcome of a user reacting to a message they may already have reacted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionChange {
    Added,
    Replaced,
    Removed,
}

/// One reaction per user: the same emoji toggles off, a different one replaces.
pub fn resolve(existing: Option<&str>, proposed: &str) -> ReactionChange {
    match existing {
        None => ReactionChange::Added,
        Some(current) if current == proposed => ReactionChange::Removed,
        Some(_) => ReactionChange::Replaced,
    }
}

pub fn validate_emoji(emoji: &str) -> AppResult<&str> {
    let emoji = emoji.trim();
    if emoji.is_empty() {
        return Err(AppError::Validation("emoji is required".into()));
    }
    if emoji.len() > MAX_EMOJI_BYTES {
        return Err(AppError::Validation(format!(
            "emoji cannot be longer than {MAX_EMOJI_BYTES} bytes"
        )));
    }
    Ok(emoji)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_emoji_toggles_off() {
        assert_eq!(resolve(None, "❤️"), ReactionChange::Added);
        assert_eq!(resolve(Some("❤️"), "❤️"), ReactionChange::Removed);
        assert_eq!(resolve(Some("❤️"), "😂"), ReactionChange::Replaced);
    }

    #[test]
    fn emoji_must_be_short_and_present() {
        assert_eq!(validate_emoji(" 👍 ").unwrap(), "👍");
        assert!(validate_emoji("").is_err());
        assert!(validate_emoji("   ").is_err());
        assert!(validate_emoji(&"👍".repeat(9)).is_err());
    }
}
