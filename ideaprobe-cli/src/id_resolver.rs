//! ID resolver module
//!
//! Lets users pass a short, unambiguous prefix instead of a full UUID.
//! Prefixes are resolved against the admin listing endpoints, so prefix
//! resolution needs the admin token while full UUIDs never do.

use anyhow::{Context, Result, anyhow};
use uuid::Uuid;

use crate::api::ApiClient;

/// Identifier that can be either a full UUID or a prefix of one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdOrPrefix {
    Full(Uuid),
    Prefix(String),
}

impl IdOrPrefix {
    /// Parse as a full UUID first, otherwise keep the lowercased prefix
    pub fn parse(input: &str) -> Self {
        match Uuid::parse_str(input.trim()) {
            Ok(uuid) => IdOrPrefix::Full(uuid),
            Err(_) => IdOrPrefix::Prefix(input.trim().to_lowercase()),
        }
    }
}

/// Resolve a submission ID or prefix to a full UUID
pub async fn resolve_submission_id(client: &ApiClient, input: &str) -> Result<Uuid> {
    let prefix = match IdOrPrefix::parse(input) {
        IdOrPrefix::Full(uuid) => return Ok(uuid),
        IdOrPrefix::Prefix(prefix) => prefix,
    };

    let submissions = client
        .list_submissions()
        .await
        .context("Failed to fetch submissions for ID resolution")?;

    resolve_among(submissions.iter().map(|s| s.id), &prefix, "submission")
}

/// Resolve a validation ID or prefix to a full UUID
pub async fn resolve_validation_id(client: &ApiClient, input: &str) -> Result<Uuid> {
    let prefix = match IdOrPrefix::parse(input) {
        IdOrPrefix::Full(uuid) => return Ok(uuid),
        IdOrPrefix::Prefix(prefix) => prefix,
    };

    let validations = client
        .list_validations()
        .await
        .context("Failed to fetch validations for ID resolution")?;

    resolve_among(validations.iter().map(|v| v.id), &prefix, "validation")
}

/// Pick the single id starting with `prefix`
///
/// # Errors
/// Returns an error if the prefix is empty, matches nothing, or is ambiguous.
fn resolve_among(ids: impl Iterator<Item = Uuid>, prefix: &str, kind: &str) -> Result<Uuid> {
    if prefix.is_empty() {
        return Err(anyhow!("An {} ID or prefix is required", kind));
    }

    let matches: Vec<Uuid> = ids
        .filter(|id| id.to_string().starts_with(prefix))
        .collect();

    match matches.as_slice() {
        [] => Err(anyhow!(
            "No {} found with ID starting with '{}'",
            kind,
            prefix
        )),
        [id] => Ok(*id),
        many => {
            let ids: Vec<String> = many.iter().map(Uuid::to_string).collect();
            Err(anyhow!(
                "Ambiguous prefix '{}' matches multiple {}s: {}",
                prefix,
                kind,
                ids.join(", ")
            ))
        }
    }
}
