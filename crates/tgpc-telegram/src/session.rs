use std::path::Path;

use grammers_client::{Client, Config, InitParams, SignInError};
use grammers_session::Session;

use tgpc_core::{
    config::{Credentials, Prompter},
    errors::Error,
    Result,
};

use crate::TelegramDirectory;

/// Connect, signing in if the stored session is not authorized yet.
///
/// An existing session file is reused, so the login code is only requested on
/// the first run for a given account.
pub async fn login(
    creds: &Credentials,
    session_file: &Path,
    prompter: &dyn Prompter,
) -> Result<TelegramDirectory> {
    tracing::info!("Logging in...");
    let session = Session::load_file_or_create(session_file)?;

    let client = Client::connect(Config {
        session,
        api_id: creds.api_id,
        api_hash: creds.api_hash.clone(),
        params: InitParams::default(),
    })
    .await
    .map_err(|e| Error::External(format!("failed to connect: {e}")))?;

    let authorized = client
        .is_authorized()
        .await
        .map_err(|e| Error::External(format!("authorization check failed: {e}")))?;

    if !authorized {
        let token = client
            .request_login_code(&creds.phone_number)
            .await
            .map_err(|e| Error::External(format!("failed to request login code: {e}")))?;
        let code = prompter.ask("Enter the code (sent on telegram)")?;

        match client.sign_in(&token, code.trim()).await {
            Ok(_) => {}
            Err(SignInError::PasswordRequired(password_token)) => {
                let prompt = match password_token.hint() {
                    Some(hint) => format!(
                        "Two-Step Verification enabled. Please enter your account password (hint: {hint})"
                    ),
                    None => "Two-Step Verification enabled. Please enter your account password"
                        .to_string(),
                };
                let password = prompter.ask_secret(&prompt)?;
                client
                    .check_password(password_token, password.trim())
                    .await
                    .map_err(|e| Error::External(format!("sign-in failed: {e}")))?;
            }
            Err(e) => return Err(Error::External(format!("sign-in failed: {e}"))),
        }

        client.session().save_to_file(session_file)?;
        tracing::info!("Session saved to {}", session_file.display());
    }

    tracing::info!("Done.");
    Ok(TelegramDirectory::new(client))
}
