use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatType {
    Direct,
    Group,
}

impl ChatType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Group => "group",
        }
    }
}

impl FromStr for ChatType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "direct" => Ok(Self::Direct),
            "group" => Ok(Self::Group),
            other => Err(format!("unknown chat type: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    Admin,
    Moderator,
    Member,
}

impl ChatRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Moderator => "moderator",
            Self::Member => "member",
        }
    }

    pub fn can_add_participants(self) -> bool {
        matches!(self, Self::Admin | Self::Moderator)
    }

    /// Moderators may only bring in plain members.
    pub fn can_grant(self, role: ChatRole) -> bool {
        match self {
            Self::Admin => true,
            Self::Moderator => role == Self::Member,
            Self::Member => false,
        }
    }

    /// Admins remove anyone; everyone may leave.
    pub fn can_remove(self, actor: Uuid, target: Uuid) -> bool {
        self == Self::Admin || actor == target
    }

    pub fn can_change_roles(self) -> bool {
        self == Self::Admin
    }
}

impl fmt::Display for ChatRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChatRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "moderator" => Ok(Self::Moderator),
            "member" => Ok(Self::Member),
            other => Err(format!("unknown chat role: {other}")),
        }
    }
}
