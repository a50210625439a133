//! Telegram adapter (grammers / MTProto).
//!
//! This crate implements the `tgpc-core` Directory port over a signed-in user
//! session. Bot accounts cannot import contacts, so the Bot API is not an option.

use std::{
    collections::HashMap,
    path::Path,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;

use grammers_client::{
    types::{Chat, User},
    Client, InvocationError,
};
use grammers_tl_types as tl;

pub mod convert;
pub mod session;

use tgpc_core::{
    directory::Directory,
    domain::{AccountRef, ResolvedEntity, UserAccount},
    errors::Error,
    Result,
};

#[derive(Clone)]
pub struct TelegramDirectory {
    client: Client,
    /// Raw user records seen in delete and resolve responses, by id. Photo
    /// downloads need the photo reference these carry.
    seen: Arc<Mutex<HashMap<i64, tl::types::User>>>,
}

impl TelegramDirectory {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            seen: Arc::default(),
        }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    fn map_err(e: InvocationError) -> Error {
        Error::External(format!("telegram error: {e}"))
    }

    fn rpc_name(e: &InvocationError) -> Option<String> {
        match e {
            InvocationError::Rpc(rpc) => Some(rpc.name.clone()),
            _ => None,
        }
    }

    fn remember(&self, user: &tl::types::User) {
        if let Ok(mut seen) = self.seen.lock() {
            seen.insert(user.id, user.clone());
        }
    }

    fn recall(&self, id: i64) -> Option<tl::types::User> {
        self.seen.lock().ok().and_then(|seen| seen.get(&id).cloned())
    }
}

#[async_trait]
impl Directory for TelegramDirectory {
    async fn import_contact(
        &self,
        phone: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<Vec<UserAccount>> {
        let request = tl::functions::contacts::ImportContacts {
            contacts: vec![tl::types::InputPhoneContact {
                client_id: 0,
                phone: phone.to_string(),
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
            }
            .into()],
        };
        let tl::enums::contacts::ImportedContacts::Contacts(imported) =
            self.client.invoke(&request).await.map_err(Self::map_err)?;

        tracing::debug!(
            phone,
            matched = imported.users.len(),
            retry = imported.retry_contacts.len(),
            "contacts.importContacts"
        );
        Ok(convert::user_accounts(imported.users))
    }

    async fn delete_contact(&self, account: AccountRef) -> Result<Vec<UserAccount>> {
        let request = tl::functions::contacts::DeleteContacts {
            id: vec![tl::types::InputUser {
                user_id: account.id,
                access_hash: account.access_hash,
            }
            .into()],
        };
        let updates = match self.client.invoke(&request).await {
            Ok(updates) => updates,
            Err(e) => {
                let rpc = Self::rpc_name(&e);
                return Err(convert::delete_error(rpc.as_deref(), e.to_string()));
            }
        };

        let users = convert::updates_users(updates).ok_or_else(|| {
            Error::Cleanup("contacts.deleteContacts returned no user list".to_string())
        })?;
        for user in &users {
            if let tl::enums::User::User(u) = user {
                self.remember(u);
            }
        }
        Ok(convert::user_accounts(users))
    }

    async fn resolve_username(&self, username: &str) -> Result<ResolvedEntity> {
        let chat = match self.client.resolve_username(username).await {
            Ok(Some(chat)) => chat,
            Ok(None) => return Err(Error::UsernameNotOccupied(username.to_string())),
            Err(e) => {
                let rpc = Self::rpc_name(&e);
                return Err(convert::resolve_error(
                    rpc.as_deref(),
                    username,
                    e.to_string(),
                ));
            }
        };

        Ok(match chat {
            Chat::User(user) => {
                self.remember(&user.raw);
                ResolvedEntity::User(convert::user_account(&user.raw))
            }
            Chat::Channel(channel) => ResolvedEntity::Channel {
                title: channel.title().to_string(),
            },
            Chat::Group(group) => {
                let title = group.title().to_string();
                if convert::is_supergroup(&group.raw) {
                    ResolvedEntity::Channel { title }
                } else {
                    ResolvedEntity::Group { title }
                }
            }
        })
    }

    async fn download_profile_photo(&self, account: AccountRef, path: &Path) -> Result<bool> {
        let raw = self.recall(account.id).ok_or_else(|| {
            Error::EntityNotFound(format!("no cached user record for id {}", account.id))
        })?;
        let chat = Chat::User(User { raw });
        let Some(photo) = chat.photo_downloadable(true) else {
            return Ok(false);
        };
        self.client.download_media(&photo, path).await?;
        Ok(true)
    }
}
