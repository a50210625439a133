//! Single-identifier lookup: the temporary-contact probe for phones and
//! direct resolution for usernames.

use std::path::PathBuf;

use crate::{
    directory::Directory,
    domain::{AccountRef, Identifier, ResolvedEntity, UserAccount},
    errors::Error,
    result::{LookupResult, Profile},
};

pub const NOT_FOUND_MSG: &str =
    "No response, the phone number is not on Telegram or has blocked contact adding.";

pub const MULTIPLE_MATCHES_MSG: &str =
    "This phone number matched multiple Telegram accounts, which is unexpected.";

/// An unclassified failure. `result` is the error entry to record before the
/// failure is propagated.
#[derive(Debug, thiserror::Error)]
#[error("lookup of {identifier} failed: {source}")]
pub struct LookupAborted {
    pub identifier: String,
    pub result: LookupResult,
    pub source: Error,
}

/// Per-lookup extras.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LookupOptions {
    /// Save the big profile photo of every matched account.
    pub download_profile_photos: bool,
    /// Directory photos are written to, as `<id>_<identifier>_photo.jpeg`.
    pub photo_dir: PathBuf,
}

impl Default for LookupOptions {
    fn default() -> Self {
        Self {
            download_profile_photos: false,
            photo_dir: PathBuf::from("."),
        }
    }
}

/// What a phone probe or username resolution produced before result shaping.
enum Probe {
    Found(UserAccount),
    Recorded(LookupResult),
}

type ProbeResult = std::result::Result<Probe, LookupAborted>;

/// Look up one identifier with default options.
pub async fn lookup(
    dir: &dyn Directory,
    identifier: &Identifier,
) -> std::result::Result<LookupResult, LookupAborted> {
    lookup_with(dir, identifier, &LookupOptions::default()).await
}

/// Look up one identifier.
///
/// Known outcomes (no account, ambiguous match, cleanup failure, unknown or
/// non-user username) come back as `Ok` with an error entry. Anything else is
/// returned as [`LookupAborted`].
pub async fn lookup_with(
    dir: &dyn Directory,
    identifier: &Identifier,
    opts: &LookupOptions,
) -> std::result::Result<LookupResult, LookupAborted> {
    tracing::info!("Checking: {identifier} ...");
    let probe = match identifier {
        Identifier::Phone(phone) => lookup_phone(dir, phone).await,
        Identifier::Username(name) => lookup_username(dir, name).await,
    };

    let out = match probe {
        Ok(Probe::Found(user)) => {
            if opts.download_profile_photos {
                save_profile_photo(dir, identifier, &user, opts).await;
            }
            Ok(LookupResult::Found(Profile::from(&user)))
        }
        Ok(Probe::Recorded(res)) => Ok(res),
        Err(e) => Err(e),
    };

    match &out {
        Ok(LookupResult::Failure { error }) => tracing::info!("Done. {identifier}: {error}"),
        Ok(LookupResult::Found(p)) => tracing::info!("Done. {identifier}: account id {}", p.id),
        Err(e) => tracing::error!("{e}"),
    }
    out
}

/// Photo failures are logged and never fail the lookup.
async fn save_profile_photo(
    dir: &dyn Directory,
    identifier: &Identifier,
    user: &UserAccount,
    opts: &LookupOptions,
) {
    let path = opts
        .photo_dir
        .join(format!("{}_{}_photo.jpeg", user.id, identifier.as_str()));
    tracing::info!(
        "Attempting to download profile photo for {identifier} ({})",
        user.id
    );
    match dir.download_profile_photo(AccountRef::from(user), &path).await {
        Ok(true) => tracing::info!("Downloaded photo at '{}'", path.display()),
        Ok(false) => tracing::info!("No photo found for {identifier} ({})", user.id),
        Err(e) => tracing::error!("Unable to download profile photo for {identifier}: {e}"),
    }
}

async fn lookup_phone(dir: &dyn Directory, phone: &str) -> ProbeResult {
    // Empty names so no contact metadata sticks to the probing account.
    let matched = dir
        .import_contact(phone, "", "")
        .await
        .map_err(|e| phone_abort(phone, e))?;

    match matched.as_slice() {
        [] => Ok(Probe::Recorded(LookupResult::failure(NOT_FOUND_MSG))),
        [single] => {
            // The deletion response carries the fuller user record.
            let deleted = match dir.delete_contact(AccountRef::from(single)).await {
                Ok(users) => users,
                Err(e) => return phone_failure(phone, e),
            };
            match pick_user(&deleted, single.id) {
                Some(user) => Ok(Probe::Found(user.clone())),
                None => phone_failure(
                    phone,
                    Error::Cleanup("deletion response carried no user record".to_string()),
                ),
            }
        }
        many => {
            // Remove every match before deciding; the first unclassified
            // failure wins.
            let mut unclassified = None;
            for account in many {
                match dir.delete_contact(AccountRef::from(account)).await {
                    Ok(_) => {}
                    Err(e) if e.is_classified() => tracing::warn!(
                        account_id = account.id,
                        "failed to remove temporary contact for {phone}: {e}"
                    ),
                    Err(e) => {
                        if unclassified.is_none() {
                            unclassified = Some(e);
                        }
                    }
                }
            }
            match unclassified {
                Some(e) => Err(phone_abort(phone, e)),
                None => Ok(Probe::Recorded(LookupResult::failure(MULTIPLE_MATCHES_MSG))),
            }
        }
    }
}

fn pick_user(users: &[UserAccount], id: i64) -> Option<&UserAccount> {
    users.iter().find(|u| u.id == id).or_else(|| users.first())
}

fn phone_failure(phone: &str, e: Error) -> ProbeResult {
    match e {
        Error::Cleanup(detail) => Ok(Probe::Recorded(LookupResult::failure(format!(
            "Cleanup failed: {detail}. --> The error might have occurred due to the inability \
             to delete the phone_number='{phone}' from the contact list."
        )))),
        other => Err(phone_abort(phone, other)),
    }
}

fn phone_abort(phone: &str, e: Error) -> LookupAborted {
    LookupAborted {
        identifier: phone.to_string(),
        result: LookupResult::failure(format!("Unexpected error: {e}.")),
        source: e,
    }
}

async fn lookup_username(dir: &dyn Directory, name: &str) -> ProbeResult {
    let recorded =
        |msg: String| -> ProbeResult { Ok(Probe::Recorded(LookupResult::failure(msg))) };

    let entity = match dir.resolve_username(name).await {
        Ok(entity) => entity,
        Err(Error::UsernameNotOccupied(_)) => {
            return recorded(format!("Username @{name} does not exist on Telegram."))
        }
        Err(Error::UsernameInvalid(_)) => {
            return recorded(format!("Username @{name} is invalid."))
        }
        Err(Error::EntityNotFound(detail)) => {
            return recorded(format!("Could not find username @{name}: {detail}"))
        }
        Err(e) => {
            return Err(LookupAborted {
                identifier: name.to_string(),
                result: LookupResult::failure(format!(
                    "Unexpected error while searching for @{name}: {e}."
                )),
                source: e,
            })
        }
    };

    match entity {
        ResolvedEntity::User(user) => Ok(Probe::Found(user)),
        ResolvedEntity::Channel { title } => recorded(format!(
            "@{name} is a channel or supergroup ('{title}'), not a user account. \
             This tool is for searching user accounts only."
        )),
        ResolvedEntity::Group { title } => recorded(format!(
            "@{name} is a group chat ('{title}'), not a user account. \
             This tool is for searching user accounts only."
        )),
    }
}
