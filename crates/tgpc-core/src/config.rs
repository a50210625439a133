use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use dialoguer::{Input, Password};

use crate::{batch::BatchPolicy, errors::Error, lookup::LookupOptions, Result};

pub const DEFAULT_OUTPUT: &str = "results.json";
pub const DEFAULT_BATCH_SIZE: usize = 50;
pub const DEFAULT_BATCH_PAUSE_SECS: u64 = 10;

/// Load `.env` from the working directory. Existing env vars win.
pub fn load_env_file() {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!("loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!("ignoring unreadable .env file: {e}"),
    }
}

/// Interactive input source. Login codes, passwords and missing credentials
/// all come through here.
pub trait Prompter {
    fn ask(&self, prompt: &str) -> Result<String>;
    fn ask_secret(&self, prompt: &str) -> Result<String>;
}

/// Terminal prompts.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsolePrompter;

impl Prompter for ConsolePrompter {
    fn ask(&self, prompt: &str) -> Result<String> {
        Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
            .map_err(|e| Error::Prompt(e.to_string()))
    }

    fn ask_secret(&self, prompt: &str) -> Result<String> {
        Password::new()
            .with_prompt(prompt)
            .allow_empty_password(true)
            .interact()
            .map_err(|e| Error::Prompt(e.to_string()))
    }
}

/// Credentials for the account that performs the lookups.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_id: i32,
    pub api_hash: String,
    pub phone_number: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_id", &self.api_id)
            .field("api_hash", &"<redacted>")
            .field("phone_number", &self.phone_number)
            .finish()
    }
}

/// Credentials as gathered from flags and environment, before prompting.
#[derive(Clone, Debug, Default)]
pub struct CredentialSources {
    pub api_id: Option<String>,
    pub api_hash: Option<String>,
    pub phone_number: Option<String>,
}

impl CredentialSources {
    /// Fill in anything missing via `prompter` and validate.
    pub fn resolve(self, prompter: &dyn Prompter) -> Result<Credentials> {
        let api_id = match self.api_id.and_then(non_empty) {
            Some(v) => v,
            None => prompter.ask("Enter your Telegram App api_id")?,
        };
        let api_hash = match self.api_hash.and_then(non_empty) {
            Some(v) => v,
            None => prompter.ask_secret("Enter your Telegram App api_hash")?,
        };
        let phone_number = match self.phone_number.and_then(non_empty) {
            Some(v) => v,
            None => prompter.ask("Enter the number associated with your Telegram account")?,
        };

        let api_id = api_id
            .trim()
            .parse::<i32>()
            .map_err(|_| Error::Config(format!("api_id must be numeric, got {api_id:?}")))?;
        let api_hash = api_hash.trim().to_string();
        if api_hash.is_empty() {
            return Err(Error::Config("api_hash is required".to_string()));
        }
        let phone_number: String = phone_number.chars().filter(|c| !c.is_whitespace()).collect();
        if phone_number.is_empty() {
            return Err(Error::Config("phone number is required".to_string()));
        }

        Ok(Credentials {
            api_id,
            api_hash,
            phone_number,
        })
    }
}

/// Settings for one run of the tool.
#[derive(Clone, Debug)]
pub struct RunConfig {
    pub output: PathBuf,
    pub csv: bool,
    pub batch: BatchPolicy,
    /// Minimum spacing between remote calls; zero disables throttling.
    pub request_interval: Duration,
    pub lookup: LookupOptions,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from(DEFAULT_OUTPUT),
            csv: false,
            batch: BatchPolicy {
                batch_size: Some(DEFAULT_BATCH_SIZE),
                pause: Duration::from_secs(DEFAULT_BATCH_PAUSE_SECS),
            },
            request_interval: Duration::ZERO,
            lookup: LookupOptions::default(),
        }
    }
}

/// Session file used when none is given: `<phone>.session` in the working directory.
pub fn default_session_file(phone_number: &str) -> PathBuf {
    let stem: String = phone_number
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '+')
        .collect();
    Path::new(".").join(format!("{stem}.session"))
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
