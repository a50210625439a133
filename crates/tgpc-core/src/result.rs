//! Per-identifier lookup outcomes and the ordered result set.

use std::{collections::HashMap, fmt};

use serde::{
    de::{MapAccess, Visitor},
    ser::SerializeMap,
    Deserialize, Deserializer, Serialize, Serializer,
};

use crate::{
    domain::{RestrictionReason, UserAccount},
    status::render_status,
};

/// Public profile fields reported for a matched account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: i64,
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
    pub user_was_online: String,
    pub phone: Option<String>,
}

impl From<&UserAccount> for Profile {
    fn from(u: &UserAccount) -> Self {
        Self {
            id: u.id,
            username: u.username.clone(),
            usernames: u.usernames.clone(),
            first_name: u.first_name.clone(),
            last_name: u.last_name.clone(),
            fake: u.fake,
            verified: u.verified,
            premium: u.premium,
            mutual_contact: u.mutual_contact,
            bot: u.bot,
            bot_chat_history: u.bot_chat_history,
            restricted: u.restricted,
            restriction_reason: u.restriction_reason.clone(),
            user_was_online: render_status(u.status.as_ref()),
            phone: u.phone.clone(),
        }
    }
}

/// Outcome of looking up one identifier: an error description or a profile.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LookupResult {
    Failure { error: String },
    Found(Profile),
}

impl LookupResult {
    pub fn failure(msg: impl Into<String>) -> Self {
        LookupResult::Failure { error: msg.into() }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            LookupResult::Failure { error } => Some(error),
            LookupResult::Found(_) => None,
        }
    }

    pub fn profile(&self) -> Option<&Profile> {
        match self {
            LookupResult::Found(p) => Some(p),
            LookupResult::Failure { .. } => None,
        }
    }
}

/// Identifier -> result, in the order identifiers were looked up.
///
/// Serializes as a JSON object with keys in insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResultSet {
    entries: Vec<(String, LookupResult)>,
    /// key -> position in `entries`.
    index: HashMap<String, usize>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&LookupResult> {
        self.index.get(key).map(|&i| &self.entries[i].1)
    }

    /// Insert a result. An existing key keeps its position and gets the new value.
    pub fn insert(&mut self, key: impl Into<String>, value: LookupResult) {
        let key = key.into();
        match self.index.get(&key) {
            Some(&i) => self.entries[i].1 = value,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
            }
        }
    }

    /// Append every entry of `other`, with the same semantics as [`ResultSet::insert`].
    pub fn extend(&mut self, other: ResultSet) {
        for (k, v) in other.entries {
            self.insert(k, v);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &LookupResult)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl Serialize for ResultSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ResultSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ResultSetVisitor;

        impl<'de> Visitor<'de> for ResultSetVisitor {
            type Value = ResultSet;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of identifier to lookup result")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<ResultSet, A::Error> {
                let mut out = ResultSet::new();
                while let Some((k, v)) = access.next_entry::<String, LookupResult>()? {
                    out.insert(k, v);
                }
                Ok(out)
            }
        }

        deserializer.deserialize_map(ResultSetVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserStatus;
    use serde_json::json;

    fn sample_profile() -> Profile {
        Profile::from(&UserAccount {
            id: 42,
            username: Some("alice".into()),
            first_name: Some("Alice".into()),
            status: Some(UserStatus::Recently),
            phone: Some("15555550001".into()),
            ..Default::default()
        })
    }

    #[test]
    fn failure_serializes_as_single_error_key() {
        let v = serde_json::to_value(LookupResult::failure("nope")).unwrap();
        assert_eq!(v, json!({ "error": "nope" }));
    }

    #[test]
    fn profile_has_rendered_status_and_no_error_key() {
        let v = serde_json::to_value(LookupResult::Found(sample_profile())).unwrap();
        let obj = v.as_object().unwrap();
        assert!(!obj.contains_key("error"));
        assert_eq!(obj["user_was_online"], "Last seen recently");
        assert_eq!(obj["usernames"], serde_json::Value::Null);
        assert_eq!(obj["id"], 42);
    }

    #[test]
    fn result_set_keeps_insertion_order_and_unique_keys() {
        let mut rs = ResultSet::new();
        rs.insert("b", LookupResult::failure("1"));
        rs.insert("a", LookupResult::failure("2"));
        rs.insert("b", LookupResult::failure("3"));
        assert_eq!(rs.keys().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(rs.get("b").and_then(|r| r.error()), Some("3"));

        let text = serde_json::to_string(&rs).unwrap();
        assert!(text.find("\"b\"").unwrap() < text.find("\"a\"").unwrap());
    }

    #[test]
    fn result_set_survives_json() {
        let mut rs = ResultSet::new();
        rs.insert("+15555550001", LookupResult::Found(sample_profile()));
        rs.insert("+15555550002", LookupResult::failure("not found"));

        let text = serde_json::to_string_pretty(&rs).unwrap();
        let back: ResultSet = serde_json::from_str(&text).unwrap();
        assert_eq!(back, rs);
        assert!(back.get("+15555550001").unwrap().profile().is_some());
    }

    #[test]
    fn large_set_keeps_order_and_overwrites_in_place() {
        let mut rs = ResultSet::new();
        for i in 0..5_000 {
            rs.insert(format!("+{i}"), LookupResult::failure(format!("first {i}")));
        }
        rs.insert("+2500", LookupResult::failure("second"));

        assert_eq!(rs.len(), 5_000);
        assert!(rs.contains_key("+4999"));
        assert!(!rs.contains_key("+5000"));
        assert_eq!(rs.get("+2500").unwrap().error(), Some("second"));
        assert_eq!(rs.keys().nth(2500), Some("+2500"));
        assert_eq!(rs.keys().last(), Some("+4999"));

        let back: ResultSet = serde_json::from_str(&serde_json::to_string(&rs).unwrap()).unwrap();
        assert_eq!(back.get("+4999").unwrap().error(), Some("first 4999"));
        assert_eq!(back, rs);
    }
}
