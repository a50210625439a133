use std::{collections::HashSet, fs, path::Path, time::Duration};

use tokio::time::sleep;

use crate::{
    directory::Directory,
    domain::{Identifier, IdentifierKind},
    errors::Error,
    lookup::{lookup_with, LookupOptions},
    result::ResultSet,
    Result,
};

/// Pacing between fixed-size sub-batches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchPolicy {
    /// Identifiers per sub-batch. `None` (or zero) disables pausing.
    pub batch_size: Option<usize>,
    pub pause: Duration,
}

/// An unclassified failure stopped the batch. `results` holds everything
/// recorded so far, including the failing identifier's error entry.
#[derive(Debug, thiserror::Error)]
#[error("batch aborted after {} lookups: {source}", .results.len())]
pub struct BatchAborted {
    pub results: ResultSet,
    pub source: Error,
}

/// Split a comma- or newline-delimited list into identifiers.
///
/// With `kind = None` each entry is classified on its own. Duplicates (after
/// normalization) are dropped, keeping the first occurrence.
pub fn parse_identifiers(input: &str, kind: Option<IdentifierKind>) -> Vec<Identifier> {
    let parsed = input
        .split(|c: char| matches!(c, ',' | '\n' | '\r'))
        .filter_map(|raw| match kind {
            Some(k) => Identifier::parse(raw, k),
            None => Identifier::classify(raw),
        });
    dedup_identifiers(parsed)
}

/// Read a list file and classify each entry.
pub fn read_identifier_file(path: &Path) -> Result<Vec<Identifier>> {
    let contents = fs::read_to_string(path)?;
    Ok(parse_identifiers(&contents, None))
}

pub fn dedup_identifiers(ids: impl IntoIterator<Item = Identifier>) -> Vec<Identifier> {
    let mut seen = HashSet::new();
    ids.into_iter()
        .filter(|id| seen.insert(id.as_str().to_string()))
        .collect()
}

/// Look up every identifier in order, one at a time.
pub async fn lookup_many(
    dir: &dyn Directory,
    identifiers: &[Identifier],
    policy: &BatchPolicy,
) -> std::result::Result<ResultSet, BatchAborted> {
    lookup_many_with(dir, identifiers, policy, &LookupOptions::default()).await
}

/// [`lookup_many`] with per-lookup options applied to every identifier.
pub async fn lookup_many_with(
    dir: &dyn Directory,
    identifiers: &[Identifier],
    policy: &BatchPolicy,
    opts: &LookupOptions,
) -> std::result::Result<ResultSet, BatchAborted> {
    let identifiers = dedup_identifiers(identifiers.iter().cloned());
    let chunk = match policy.batch_size {
        Some(n) if n > 0 => n,
        _ => identifiers.len().max(1),
    };

    let mut results = ResultSet::new();
    for (idx, batch) in identifiers.chunks(chunk).enumerate() {
        if idx > 0 && policy.pause > Duration::ZERO {
            tracing::info!(
                "Processed {} identifiers, pausing {}s before the next batch",
                results.len(),
                policy.pause.as_secs_f64()
            );
            sleep(policy.pause).await;
        }

        for id in batch {
            match lookup_with(dir, id, opts).await {
                Ok(res) => results.insert(id.as_str(), res),
                Err(aborted) => {
                    results.insert(id.as_str(), aborted.result);
                    return Err(BatchAborted {
                        results,
                        source: aborted.source,
                    });
                }
            }
        }
    }
    Ok(results)
}
