use std::path::Path;

use async_trait::async_trait;

use crate::{
    domain::{AccountRef, ResolvedEntity, UserAccount},
    Result,
};

/// Port over the remote contact and entity API.
///
/// The MTProto adapter implements this over a signed-in client session; tests
/// use an in-memory fake.
#[async_trait]
pub trait Directory: Send + Sync {
    /// Add `phone` as a contact and return every account the service matched.
    async fn import_contact(
        &self,
        phone: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<Vec<UserAccount>>;

    /// Remove a contact added by [`Directory::import_contact`].
    ///
    /// Returns the user records carried by the deletion response.
    async fn delete_contact(&self, account: AccountRef) -> Result<Vec<UserAccount>>;

    /// Resolve a bare username (no `@`) to an entity.
    async fn resolve_username(&self, username: &str) -> Result<ResolvedEntity>;

    /// Save the account's big profile photo to `path`.
    ///
    /// Returns `false` when the account has no photo. Only accounts returned
    /// by an earlier delete or resolve are known to the adapter.
    async fn download_profile_photo(&self, account: AccountRef, path: &Path) -> Result<bool>;
}
