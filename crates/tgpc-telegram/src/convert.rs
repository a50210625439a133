//! TL schema types -> core domain types.

use chrono::DateTime;
use grammers_tl_types as tl;

use tgpc_core::{
    domain::{RestrictionReason, UserAccount, UserStatus},
    errors::Error,
};

/// RPC errors from `contacts.deleteContacts` that mean the temporary contact
/// could not be removed, as opposed to a broken session.
pub const CLEANUP_RPC_ERRORS: &[&str] =
    &["CONTACT_ID_INVALID", "USER_ID_INVALID", "PEER_ID_INVALID"];

pub fn user_accounts(users: Vec<tl::enums::User>) -> Vec<UserAccount> {
    users
        .into_iter()
        .filter_map(|u| match u {
            tl::enums::User::User(user) => Some(user_account(&user)),
            tl::enums::User::Empty(_) => None,
        })
        .collect()
}

pub fn user_account(user: &tl::types::User) -> UserAccount {
    UserAccount {
        id: user.id,
        access_hash: user.access_hash,
        username: user.username.clone(),
        usernames: user.usernames.as_ref().map(|names| {
            names
                .iter()
                .map(|n| match n {
                    tl::enums::Username::Username(n) => n.username.clone(),
                })
                .collect()
        }),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        fake: user.fake,
        verified: user.verified,
        premium: user.premium,
        mutual_contact: user.mutual_contact,
        bot: user.bot,
        bot_chat_history: user.bot_chat_history,
        restricted: user.restricted,
        restriction_reason: user.restriction_reason.as_ref().map(|reasons| {
            reasons
                .iter()
                .map(|r| match r {
                    tl::enums::RestrictionReason::Reason(r) => RestrictionReason {
                        platform: r.platform.clone(),
                        reason: r.reason.clone(),
                        text: r.text.clone(),
                    },
                })
                .collect()
        }),
        status: user.status.as_ref().map(user_status),
        phone: user.phone.clone(),
    }
}

pub fn user_status(status: &tl::enums::UserStatus) -> UserStatus {
    match status {
        tl::enums::UserStatus::Online(_) => UserStatus::Online,
        tl::enums::UserStatus::Offline(s) => match DateTime::from_timestamp(s.was_online.into(), 0)
        {
            Some(was_online) => UserStatus::Offline { was_online },
            None => UserStatus::Empty,
        },
        tl::enums::UserStatus::Recently(_) => UserStatus::Recently,
        tl::enums::UserStatus::LastWeek(_) => UserStatus::LastWeek,
        tl::enums::UserStatus::LastMonth(_) => UserStatus::LastMonth,
        tl::enums::UserStatus::Empty => UserStatus::Empty,
    }
}

/// The user list carried by an `Updates` response, if the variant has one.
pub fn updates_users(updates: tl::enums::Updates) -> Option<Vec<tl::enums::User>> {
    match updates {
        tl::enums::Updates::Updates(u) => Some(u.users),
        tl::enums::Updates::Combined(u) => Some(u.users),
        _ => None,
    }
}

/// Map a failed `contacts.deleteContacts` call. `rpc` is the RPC error name,
/// if the failure was one.
pub fn delete_error(rpc: Option<&str>, detail: String) -> Error {
    match rpc {
        Some(name) if CLEANUP_RPC_ERRORS.contains(&name) => Error::Cleanup(name.to_string()),
        _ => Error::External(format!("telegram error: {detail}")),
    }
}

/// Map a failed username resolution.
pub fn resolve_error(rpc: Option<&str>, username: &str, detail: String) -> Error {
    match rpc {
        Some("USERNAME_INVALID") => Error::UsernameInvalid(username.to_string()),
        Some("USERNAME_NOT_OCCUPIED") => Error::UsernameNotOccupied(username.to_string()),
        _ => Error::External(format!("telegram error: {detail}")),
    }
}

/// grammers files megagroups under `Chat::Group`; server-side they are channels.
pub fn is_supergroup(raw: &tl::enums::Chat) -> bool {
    matches!(
        raw,
        tl::enums::Chat::Channel(_) | tl::enums::Chat::ChannelForbidden(_)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn offline_status_keeps_timestamp() {
        let status = tl::enums::UserStatus::Offline(tl::types::UserStatusOffline {
            was_online: 1_712_406_601,
        });
        assert_eq!(
            user_status(&status),
            UserStatus::Offline {
                was_online: Utc.with_ymd_and_hms(2024, 4, 6, 12, 30, 1).unwrap()
            }
        );
    }

    #[test]
    fn online_and_empty_statuses() {
        let online = tl::enums::UserStatus::Online(tl::types::UserStatusOnline { expires: 0 });
        assert_eq!(user_status(&online), UserStatus::Online);
        assert_eq!(user_status(&tl::enums::UserStatus::Empty), UserStatus::Empty);
    }

    #[test]
    fn too_long_updates_carry_no_users() {
        assert!(updates_users(tl::enums::Updates::TooLong).is_none());
    }

    #[test]
    fn cleanup_rpc_errors_are_recorded_others_abort() {
        for name in CLEANUP_RPC_ERRORS {
            let e = delete_error(Some(*name), format!("rpc error 400: {name}"));
            assert!(matches!(&e, Error::Cleanup(n) if n == name));
            assert!(e.is_classified());
        }

        let flood = delete_error(Some("FLOOD_WAIT"), "rpc error 420: FLOOD_WAIT".into());
        assert!(matches!(flood, Error::External(_)));
        assert!(!flood.is_classified());

        let dropped = delete_error(None, "connection reset".into());
        assert!(matches!(dropped, Error::External(ref m) if m.contains("connection reset")));
    }

    #[test]
    fn username_rpc_errors_are_classified() {
        assert!(matches!(
            resolve_error(Some("USERNAME_INVALID"), "bad!", String::new()),
            Error::UsernameInvalid(n) if n == "bad!"
        ));
        assert!(matches!(
            resolve_error(Some("USERNAME_NOT_OCCUPIED"), "ghost", String::new()),
            Error::UsernameNotOccupied(n) if n == "ghost"
        ));
        let other = resolve_error(Some("AUTH_KEY_UNREGISTERED"), "x", "rpc error".into());
        assert!(!other.is_classified());
    }

    #[test]
    fn megagroups_count_as_channels() {
        let forbidden = tl::enums::Chat::ChannelForbidden(tl::types::ChannelForbidden {
            broadcast: false,
            megagroup: true,
            id: 10,
            access_hash: 20,
            title: "Mega".into(),
            until_date: None,
        });
        assert!(is_supergroup(&forbidden));

        let small = tl::enums::Chat::Forbidden(tl::types::ChatForbidden {
            id: 11,
            title: "Small".into(),
        });
        assert!(!is_supergroup(&small));
        assert!(!is_supergroup(&tl::enums::Chat::Empty(tl::types::ChatEmpty {
            id: 12
        })));
    }
}
