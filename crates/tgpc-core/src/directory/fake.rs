//! In-memory [`Directory`] for tests.

use std::{
    collections::{BTreeSet, HashMap},
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use async_trait::async_trait;

use crate::{
    directory::port::Directory,
    domain::{AccountRef, ResolvedEntity, UserAccount},
    errors::Error,
    Result,
};

#[derive(Clone, Debug)]
pub enum FakeFailure {
    NotOccupied,
    Invalid,
    NotFound(String),
    Cleanup(String),
    External(String),
}

impl FakeFailure {
    fn to_error(&self, subject: &str) -> Error {
        match self {
            FakeFailure::NotOccupied => Error::UsernameNotOccupied(subject.to_string()),
            FakeFailure::Invalid => Error::UsernameInvalid(subject.to_string()),
            FakeFailure::NotFound(m) => Error::EntityNotFound(m.clone()),
            FakeFailure::Cleanup(m) => Error::Cleanup(m.clone()),
            FakeFailure::External(m) => Error::External(m.clone()),
        }
    }
}

#[derive(Default)]
pub struct FakeDirectory {
    /// phone -> full account records of every match.
    phones: HashMap<String, Vec<UserAccount>>,
    entities: HashMap<String, ResolvedEntity>,
    import_failures: HashMap<String, FakeFailure>,
    delete_failures: HashMap<i64, FakeFailure>,
    resolve_failures: HashMap<String, FakeFailure>,
    empty_deletes: BTreeSet<i64>,
    photos: BTreeSet<i64>,
    photo_failures: BTreeSet<i64>,

    contacts: Mutex<BTreeSet<i64>>,
    imports: Mutex<Vec<(String, String, String)>>,
    deletes: Mutex<Vec<i64>>,
    resolves: Mutex<Vec<String>>,
    downloads: Mutex<Vec<(i64, PathBuf)>>,
}

impl FakeDirectory {
    pub fn with_phone(mut self, phone: &str, accounts: Vec<UserAccount>) -> Self {
        self.phones.insert(phone.to_string(), accounts);
        self
    }

    pub fn with_user(self, username: &str, id: i64) -> Self {
        let account = account(id, Some(username));
        self.with_entity(username, ResolvedEntity::User(account))
    }

    pub fn with_entity(mut self, username: &str, entity: ResolvedEntity) -> Self {
        self.entities.insert(username.to_string(), entity);
        self
    }

    pub fn with_import_failure(mut self, phone: &str, f: FakeFailure) -> Self {
        self.import_failures.insert(phone.to_string(), f);
        self
    }

    pub fn with_delete_failure(mut self, id: i64, f: FakeFailure) -> Self {
        self.delete_failures.insert(id, f);
        self
    }

    pub fn with_empty_delete(mut self, id: i64) -> Self {
        self.empty_deletes.insert(id);
        self
    }

    pub fn with_resolve_failure(mut self, username: &str, f: FakeFailure) -> Self {
        self.resolve_failures.insert(username.to_string(), f);
        self
    }

    pub fn with_photo(mut self, id: i64) -> Self {
        self.photos.insert(id);
        self
    }

    pub fn with_photo_failure(mut self, id: i64) -> Self {
        self.photo_failures.insert(id);
        self
    }

    /// Contacts still present (imported and never deleted).
    pub fn residual_contacts(&self) -> Vec<i64> {
        self.contacts.lock().unwrap().iter().copied().collect()
    }

    pub fn import_calls(&self) -> Vec<(String, String, String)> {
        self.imports.lock().unwrap().clone()
    }

    pub fn delete_calls(&self) -> Vec<i64> {
        self.deletes.lock().unwrap().clone()
    }

    pub fn resolve_calls(&self) -> Vec<String> {
        self.resolves.lock().unwrap().clone()
    }

    pub fn download_calls(&self) -> Vec<(i64, PathBuf)> {
        self.downloads.lock().unwrap().clone()
    }

    fn find_account(&self, id: i64) -> Option<UserAccount> {
        self.phones.values().flatten().find(|a| a.id == id).cloned()
    }
}

/// A plausible account record with the given id and username.
pub fn account(id: i64, username: Option<&str>) -> UserAccount {
    UserAccount {
        id,
        access_hash: Some(id * 1000),
        username: username.map(str::to_string),
        first_name: Some(format!("User{id}")),
        ..Default::default()
    }
}

#[async_trait]
impl Directory for FakeDirectory {
    async fn import_contact(
        &self,
        phone: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<Vec<UserAccount>> {
        self.imports.lock().unwrap().push((
            phone.to_string(),
            first_name.to_string(),
            last_name.to_string(),
        ));
        if let Some(f) = self.import_failures.get(phone) {
            return Err(f.to_error(phone));
        }
        let matched = self.phones.get(phone).cloned().unwrap_or_default();
        self.contacts
            .lock()
            .unwrap()
            .extend(matched.iter().map(|a| a.id));

        // The import response is the thin record: no presence, no phone.
        Ok(matched
            .into_iter()
            .map(|a| UserAccount {
                status: None,
                phone: None,
                ..a
            })
            .collect())
    }

    async fn delete_contact(&self, account: AccountRef) -> Result<Vec<UserAccount>> {
        self.deletes.lock().unwrap().push(account.id);
        if let Some(f) = self.delete_failures.get(&account.id) {
            return Err(f.to_error(&account.id.to_string()));
        }
        self.contacts.lock().unwrap().remove(&account.id);
        if self.empty_deletes.contains(&account.id) {
            return Ok(Vec::new());
        }
        Ok(self.find_account(account.id).into_iter().collect())
    }

    async fn resolve_username(&self, username: &str) -> Result<ResolvedEntity> {
        self.resolves.lock().unwrap().push(username.to_string());
        if let Some(f) = self.resolve_failures.get(username) {
            return Err(f.to_error(username));
        }
        self.entities
            .get(username)
            .cloned()
            .ok_or_else(|| Error::UsernameNotOccupied(username.to_string()))
    }

    async fn download_profile_photo(&self, account: AccountRef, path: &Path) -> Result<bool> {
        self.downloads
            .lock()
            .unwrap()
            .push((account.id, path.to_path_buf()));
        if self.photo_failures.contains(&account.id) {
            return Err(Error::External("FILE_REFERENCE_EXPIRED".into()));
        }
        if !self.photos.contains(&account.id) {
            return Ok(false);
        }
        fs::write(path, b"\xff\xd8\xff\xe0fake-jpeg")?;
        Ok(true)
    }
}
