use std::{path::PathBuf, time::Duration};

use clap::Parser;

use tgpc_core::{
    batch::{dedup_identifiers, parse_identifiers, read_identifier_file, BatchPolicy},
    config::{
        CredentialSources, Prompter, RunConfig, DEFAULT_BATCH_PAUSE_SECS, DEFAULT_BATCH_SIZE,
        DEFAULT_OUTPUT,
    },
    domain::{Identifier, IdentifierKind},
    lookup::LookupOptions,
    Result,
};

/// Check whether one or more phone numbers or usernames belong to a Telegram account.
///
/// Requires a Telegram account with an active phone number, plus an App api_id and
/// api_hash from https://my.telegram.org/apps. Credentials may also live in a `.env`
/// file in the working directory (API_ID, API_HASH, PHONE_NUMBER).
///
/// Phone numbers are best given in international format, e.g. +491234567891.
#[derive(Debug, Parser)]
#[command(name = "tgpc", version)]
pub struct Cli {
    /// Phone numbers to check, separated by commas
    #[arg(short = 'p', long)]
    pub phone_numbers: Option<String>,

    /// Usernames to check, separated by commas ('name' or '@name')
    #[arg(short = 'u', long)]
    pub usernames: Option<String>,

    /// File with phone numbers and/or usernames, one per line or comma-separated
    #[arg(short = 'i', long)]
    pub input: Option<PathBuf>,

    /// Your Telegram App api_id
    #[arg(long, env = "API_ID")]
    pub api_id: Option<String>,

    /// Your Telegram App api_hash
    #[arg(long, env = "API_HASH", hide_env_values = true)]
    pub api_hash: Option<String>,

    /// Phone number of the Telegram account used for the lookups
    #[arg(long, env = "PHONE_NUMBER")]
    pub api_phone_number: Option<String>,

    /// Session file [default: <phone>.session]
    #[arg(long, env = "TGPC_SESSION_FILE")]
    pub session: Option<PathBuf>,

    /// File to store results in
    #[arg(long, default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Also print an `identifier,username` CSV to stdout
    #[arg(long)]
    pub csv: bool,

    /// Identifiers per batch before pausing (0 disables pausing)
    #[arg(long, env = "TGPC_BATCH_SIZE", default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,

    /// Pause between batches, in seconds
    #[arg(long, env = "TGPC_BATCH_PAUSE_SECS", default_value_t = DEFAULT_BATCH_PAUSE_SECS)]
    pub batch_pause_secs: u64,

    /// Minimum delay between Telegram requests, in milliseconds
    #[arg(long, env = "TGPC_REQUEST_INTERVAL_MS", default_value_t = 0)]
    pub request_interval_ms: u64,

    /// Save each found account's profile photo as <id>_<identifier>_photo.jpeg
    #[arg(long)]
    pub download_profile_photos: bool,

    /// Directory for downloaded profile photos
    #[arg(long, default_value = ".")]
    pub photo_dir: PathBuf,
}

impl Cli {
    pub fn run_config(&self) -> RunConfig {
        RunConfig {
            output: self.output.clone(),
            csv: self.csv,
            batch: BatchPolicy {
                batch_size: (self.batch_size > 0).then_some(self.batch_size),
                pause: Duration::from_secs(self.batch_pause_secs),
            },
            request_interval: Duration::from_millis(self.request_interval_ms),
            lookup: LookupOptions {
                download_profile_photos: self.download_profile_photos,
                photo_dir: self.photo_dir.clone(),
            },
        }
    }

    pub fn credential_sources(&self) -> CredentialSources {
        CredentialSources {
            api_id: self.api_id.clone(),
            api_hash: self.api_hash.clone(),
            phone_number: self.api_phone_number.clone(),
        }
    }

    /// Every identifier from flags and the input file; prompts when there are none.
    pub fn identifiers(&self, prompter: &dyn Prompter) -> Result<Vec<Identifier>> {
        let mut ids = Vec::new();
        if let Some(phones) = &self.phone_numbers {
            ids.extend(parse_identifiers(phones, Some(IdentifierKind::Phone)));
        }
        if let Some(names) = &self.usernames {
            ids.extend(parse_identifiers(names, Some(IdentifierKind::Username)));
        }
        if let Some(path) = &self.input {
            ids.extend(read_identifier_file(path)?);
        }

        if ids.is_empty() {
            ids = prompt_identifiers(prompter)?;
        }
        Ok(dedup_identifiers(ids))
    }
}

fn prompt_identifiers(prompter: &dyn Prompter) -> Result<Vec<Identifier>> {
    let choice = prompter.ask("Search by (p)hone numbers or (u)sernames? [p/u]")?;
    let (kind, what) = if choice.trim().eq_ignore_ascii_case("u") {
        (IdentifierKind::Username, "usernames")
    } else {
        (IdentifierKind::Phone, "phone numbers")
    };
    let list = prompter.ask(&format!("Enter the {what} to check, separated by commas"))?;
    Ok(parse_identifiers(&list, Some(kind)))
}
