use uuid::Uuid;

use vib3_shared::types::UserPair;

/// One entry of a pair's append-only swipe log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwipeEntry {
    pub user_id: Uuid,
    pub liked: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Promotion {
    /// The pair was already matched before this swipe. Matching is terminal.
    AlreadyMatched,
    /// This swipe completed the mutual like.
    Promoted,
    /// At least one side has not liked yet.
    Pending,
}

impl Promotion {
    pub fn is_matched(self) -> bool {
        !matches!(self, Promotion::Pending)
    }
}

/// Mutual once each member of the pair has at least one `liked` entry.
/// Passes never cancel an earlier like.
pub fn is_mutual(pair: &UserPair, log: &[SwipeEntry]) -> bool {
    let liked_by = |user: Uuid| log.iter().any(|s| s.user_id == user && s.liked);
    liked_by(pair.low()) && liked_by(pair.high())
}

pub fn evaluate(pair: &UserPair, log: &[SwipeEntry], already_matched: bool) -> Promotion {
    if already_matched {
        Promotion::AlreadyMatched
    } else if is_mutual(pair, log) {
        Promotion::Promoted
    } else {
        Promotion::Pending
    }
}
