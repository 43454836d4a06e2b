//! Per-identifier walker.
//!
//! Identifiers are walked from 1 up to a caller-supplied bound. The server
//! never says where the identifier space ends, so the bound may walk past the
//! last real record or stop short of it.

use serde_json::Value;
use tracing::{debug, error, info, instrument};

use super::AcquireContext;
use super::gallery::fetch_gallery;
use crate::fetch::{ApiEnvelope, FetchError};
use crate::resource::Acquisition;

/// Where one identifier's record comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierSource<'s> {
    /// `{api}/{endpoint}/{id}/`, stored as the bare record.
    Api {
        /// API endpoint name.
        endpoint: &'s str,
    },
    /// Image-data gallery `{owner_tag}-{id}`, stored as a list of images.
    Gallery {
        /// Image-data owner tag.
        owner_tag: &'s str,
    },
}

impl IdentifierSource<'static> {
    /// Returns the source and walk bound of a bucketed acquisition.
    #[must_use]
    pub fn for_acquisition(acquisition: &Acquisition) -> Option<(Self, u64)> {
        match *acquisition {
            Acquisition::PerIdentifier { endpoint, max_id } => Some((Self::Api { endpoint }, max_id)),
            Acquisition::Gallery { owner_tag, max_id } => {
                Some((Self::Gallery { owner_tag }, max_id))
            }
            _ => None,
        }
    }
}

/// Counts for one walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkTally {
    /// Identifiers fetched with a non-empty result.
    pub fetched: usize,
    /// Identifiers skipped without a request.
    pub skipped: usize,
    /// Identifiers fetched with an empty or error result.
    pub empty: usize,
}

/// Fetches one identifier, returning `None` for an empty result.
///
/// A non-OK status is logged and treated as empty; the walk goes on.
///
/// # Errors
///
/// Returns [`FetchError`] if the request exhausted its retries.
pub async fn fetch_identifier(
    ctx: &AcquireContext<'_>,
    source: &IdentifierSource<'_>,
    id: u64,
) -> Result<Option<Value>, FetchError> {
    match *source {
        IdentifierSource::Api { endpoint } => {
            let body = ctx
                .client
                .fetch_json(
                    &ctx.endpoints.identifier_url(endpoint, id),
                    &ctx.api_params(),
                )
                .await?;
            let envelope = ApiEnvelope::from_value(body);
            if !envelope.is_ok() {
                error!(
                    endpoint,
                    id,
                    status = envelope.error().unwrap_or_default(),
                    "received error status for identifier"
                );
                return Ok(None);
            }
            Ok(envelope.into_item(&format!("{endpoint}/{id}")))
        }
        IdentifierSource::Gallery { owner_tag } => {
            let images = fetch_gallery(ctx, owner_tag, id).await?;
            Ok((!images.is_empty()).then_some(Value::Array(images)))
        }
    }
}

/// Walks identifiers `1..=max_id`, handing each non-empty record to `sink`.
///
/// Identifiers for which `skip` returns true are not requested. The request
/// delay is slept after every request except the last.
///
/// # Errors
///
/// Stops at the first fetch exhaustion or sink error.
#[instrument(skip(ctx, skip, sink))]
pub async fn walk_identifiers<E, S, F>(
    ctx: &AcquireContext<'_>,
    source: &IdentifierSource<'_>,
    max_id: u64,
    mut skip: S,
    mut sink: F,
) -> Result<WalkTally, E>
where
    E: From<FetchError>,
    S: FnMut(u64) -> bool,
    F: FnMut(u64, Value) -> Result<(), E>,
{
    let mut tally = WalkTally::default();

    for id in 1..=max_id {
        if skip(id) {
            debug!(id, "skipping existing identifier");
            tally.skipped += 1;
            continue;
        }

        match fetch_identifier(ctx, source, id).await? {
            Some(record) => {
                sink(id, record)?;
                tally.fetched += 1;
            }
            None => tally.empty += 1,
        }

        if id < max_id {
            ctx.pause().await;
        }
    }

    info!(
        fetched = tally.fetched,
        skipped = tally.skipped,
        empty = tally.empty,
        "identifier walk complete"
    );
    Ok(tally)
}
