use std::{path::Path, sync::Arc, time::Duration};

use anyhow::Context;
use clap::Parser;

use tgpc_core::{
    batch::lookup_many_with,
    config::{default_session_file, load_env_file, ConsolePrompter, Credentials, Prompter},
    directory::{Directory, ThrottledDirectory},
    output,
};

mod cli;

use cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tgpc_core::logging::init("tgpc")?;
    // Before parsing, so `.env` values feed clap's env fallbacks.
    load_env_file();
    let cli = Cli::parse();

    let run = cli.run_config();
    let prompter = ConsolePrompter;

    let creds = cli.credential_sources().resolve(&prompter)?;
    let session_file = cli
        .session
        .clone()
        .unwrap_or_else(|| default_session_file(&creds.phone_number));

    let directory = connect(&creds, &session_file, &prompter).await?;
    let directory: Arc<dyn Directory> = if run.request_interval > Duration::ZERO {
        Arc::new(ThrottledDirectory::new(directory, run.request_interval))
    } else {
        directory
    };

    let identifiers = cli.identifiers(&prompter)?;
    if run.lookup.download_profile_photos {
        std::fs::create_dir_all(&run.lookup.photo_dir).with_context(|| {
            format!("failed to create {}", run.lookup.photo_dir.display())
        })?;
    }

    let looked_up =
        lookup_many_with(directory.as_ref(), &identifiers, &run.batch, &run.lookup).await;
    let (results, aborted) = match looked_up {
        Ok(results) => (results, None),
        Err(e) => (e.results, Some(e.source)),
    };

    // Partial results are saved even when the batch was aborted.
    output::write_json(&run.output, &results)
        .with_context(|| format!("failed to write {}", run.output.display()))?;
    if run.csv {
        print!("{}", output::render_csv(&results));
    }

    if let Some(source) = aborted {
        return Err(anyhow::Error::new(source).context("lookup aborted on an unexpected error"));
    }
    Ok(())
}

async fn connect(
    creds: &Credentials,
    session_file: &Path,
    prompter: &dyn Prompter,
) -> anyhow::Result<Arc<dyn Directory>> {
    let directory = tgpc_telegram::session::login(creds, session_file, prompter)
        .await
        .context("telegram login failed")?;
    Ok(Arc::new(directory))
}
