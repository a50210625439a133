use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which lookup path an identifier takes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IdentifierKind {
    Phone,
    Username,
}

/// A normalized phone number or username.
///
/// Phones keep an optional leading `+`; usernames are stored without `@`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Identifier {
    Phone(String),
    Username(String),
}

impl Identifier {
    /// Normalize a raw entry for a known kind. Returns `None` for blank input.
    pub fn parse(raw: &str, kind: IdentifierKind) -> Option<Self> {
        let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
        match kind {
            IdentifierKind::Phone if !compact.is_empty() => Some(Identifier::Phone(compact)),
            IdentifierKind::Username => {
                let name = compact.trim_start_matches('@');
                (!name.is_empty()).then(|| Identifier::Username(name.to_string()))
            }
            _ => None,
        }
    }

    /// Normalize a raw entry whose kind is not known up front.
    pub fn classify(raw: &str) -> Option<Self> {
        let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
        let kind = if looks_like_phone(&compact) {
            IdentifierKind::Phone
        } else {
            IdentifierKind::Username
        };
        Self::parse(&compact, kind)
    }

    pub fn kind(&self) -> IdentifierKind {
        match self {
            Identifier::Phone(_) => IdentifierKind::Phone,
            Identifier::Username(_) => IdentifierKind::Username,
        }
    }

    /// The normalized text, used as the result key.
    pub fn as_str(&self) -> &str {
        match self {
            Identifier::Phone(s) | Identifier::Username(s) => s,
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identifier::Phone(p) => write!(f, "{p}"),
            Identifier::Username(u) => write!(f, "@{u}"),
        }
    }
}

fn looks_like_phone(s: &str) -> bool {
    let digits = s.strip_prefix('+').unwrap_or(s);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

/// Presence status as reported by the service.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UserStatus {
    Empty,
    Online,
    Offline { was_online: DateTime<Utc> },
    Recently,
    LastWeek,
    LastMonth,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestrictionReason {
    pub platform: String,
    pub reason: String,
    pub text: String,
}

/// A user account record, as returned by the remote directory.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserAccount {
    pub id: i64,
    pub access_hash: Option<i64>,
    pub username: Option<String>,
    pub usernames: Option<Vec<String>>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub fake: bool,
    pub verified: bool,
    pub premium: bool,
    pub mutual_contact: bool,
    pub bot: bool,
    pub bot_chat_history: bool,
    pub restricted: bool,
    pub restriction_reason: Option<Vec<RestrictionReason>>,
    pub status: Option<UserStatus>,
    pub phone: Option<String>,
}

/// Handle to an account matched by a contact import; enough to delete it again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AccountRef {
    pub id: i64,
    pub access_hash: i64,
}

impl From<&UserAccount> for AccountRef {
    fn from(u: &UserAccount) -> Self {
        Self {
            id: u.id,
            access_hash: u.access_hash.unwrap_or(0),
        }
    }
}

/// What a username resolved to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolvedEntity {
    User(UserAccount),
    /// Broadcast channel or supergroup.
    Channel { title: String },
    /// Basic group chat.
    Group { title: String },
}
