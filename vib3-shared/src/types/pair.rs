use serde::Serialize;
use uuid::Uuid;

/// Two distinct users stored in sorted order, so `(a, b)` and `(b, a)` name
/// the same pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct UserPair {
    low: Uuid,
    high: Uuid,
}

impl UserPair {
    /// `None` when both ids are the same user.
    pub fn new(a: Uuid, b: Uuid) -> Option<Self> {
        match a.cmp(&b) {
            std::cmp::Ordering::Less => Some(Self { low: a, high: b }),
            std::cmp::Ordering::Greater => Some(Self { low: b, high: a }),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn low(&self) -> Uuid {
        self.low
    }

    pub fn high(&self) -> Uuid {
        self.high
    }

    pub fn contains(&self, user: Uuid) -> bool {
        self.low == user || self.high == user
    }

    /// The member of the pair that is not `user`.
    pub fn other(&self, user: Uuid) -> Option<Uuid> {
        if user == self.low {
            Some(self.high)
        } else if user == self.high {
            Some(self.low)
        } else {
            None
        }
    }

    /// Stable textual key, `"low:high"`.
    pub fn key(&self) -> String {
        format!("{}:{}", self.low, self.high)
    }
}
