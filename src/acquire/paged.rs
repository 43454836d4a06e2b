//! Offset pager and single fetch.

use serde_json::Value;
use tracing::{debug, error, info, instrument};

use super::AcquireContext;
use crate::fetch::{ApiEnvelope, FetchError};

/// Items requested per page (the API maximum).
pub const PAGE_SIZE: usize = 100;

/// Fetches one `limit`/`offset` page of `endpoint`.
///
/// A non-OK status is logged; whatever `results` the body carries is still
/// returned.
///
/// # Errors
///
/// Returns [`FetchError`] if the request exhausted its retries.
#[instrument(skip(ctx), fields(endpoint = %endpoint))]
pub async fn fetch_page(
    ctx: &AcquireContext<'_>,
    endpoint: &str,
    offset: usize,
) -> Result<Vec<Value>, FetchError> {
    let mut params = ctx.api_params();
    params.push(("limit", PAGE_SIZE.to_string()));
    params.push(("offset", offset.to_string()));

    let body = ctx
        .client
        .fetch_json(&ctx.endpoints.resource_url(endpoint), &params)
        .await?;
    let envelope = ApiEnvelope::from_value(body);
    if !envelope.is_ok() {
        error!(
            endpoint,
            offset,
            status = envelope.error().unwrap_or_default(),
            "received error status for page"
        );
    }
    Ok(envelope.into_items(endpoint))
}

/// Fetches every page of `endpoint` until a page comes back empty.
///
/// A full final page is not special-cased: completion is only signalled by
/// the following empty page.
///
/// # Errors
///
/// Returns [`FetchError`] if any page exhausted its retries.
#[instrument(skip(ctx), fields(endpoint = %endpoint))]
pub async fn fetch_all_pages(
    ctx: &AcquireContext<'_>,
    endpoint: &str,
) -> Result<Vec<Value>, FetchError> {
    let mut items = Vec::new();
    let mut offset = 0;

    loop {
        let page = fetch_page(ctx, endpoint, offset).await?;
        if page.is_empty() {
            break;
        }
        debug!(offset, count = page.len(), "fetched page");
        info!(endpoint, total = items.len() + page.len(), "fetching pages");
        items.extend(page);
        offset += PAGE_SIZE;
        ctx.pause().await;
    }

    Ok(items)
}

/// Fetches the first page only.
///
/// # Errors
///
/// Returns [`FetchError`] if the request exhausted its retries.
pub async fn fetch_single(
    ctx: &AcquireContext<'_>,
    endpoint: &str,
) -> Result<Vec<Value>, FetchError> {
    fetch_page(ctx, endpoint, 0).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, ResponseTemplate};

    use super::*;
    use crate::acquire::Endpoints;
    use crate::fetch::{ApiClient, BackoffPolicy};
    use crate::test_support::socket_guard::start_mock_server_or_skip;

    fn page_of(start: usize, count: usize) -> Value {
        let results: Vec<Value> = (start..start + count).map(|id| json!({"id": id})).collect();
        json!({"error": "OK", "results": results})
    }

    #[tokio::test]
    async fn test_fetch_page_sends_paging_params() {
        let Some(mock_server) = start_mock_server_or_skip().await else {
            return;
        };
        Mock::given(method("GET"))
            .and(path("/api/games/"))
            .and(query_param("api_key", "k"))
            .and(query_param("format", "json"))
            .and(query_param("limit", "100"))
            .and(query_param("offset", "200"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_of(200, 3)))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = ApiClient::new(BackoffPolicy::new(1, Duration::ZERO, Duration::ZERO));
        let endpoints = Endpoints::single_host(&mock_server.uri());
        let ctx = AcquireContext {
            client: &client,
            api_key: "k",
            endpoints: &endpoints,
            request_delay: Duration::ZERO,
        };

        let items = fetch_page(&ctx, "games", 200).await.unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0]["id"], 200);
    }

    #[tokio::test]
    async fn test_fetch_page_missing_results_is_empty() {
        let Some(mock_server) = start_mock_server_or_skip().await else {
            return;
        };
        Mock::given(method("GET"))
            .and(path("/api/themes/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": "OK"})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = ApiClient::new(BackoffPolicy::new(1, Duration::ZERO, Duration::ZERO));
        let endpoints = Endpoints::single_host(&mock_server.uri());
        let ctx = AcquireContext {
            client: &client,
            api_key: "k",
            endpoints: &endpoints,
            request_delay: Duration::ZERO,
        };

        let items = fetch_all_pages(&ctx, "themes").await.unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_single_requests_offset_zero_once() {
        let Some(mock_server) = start_mock_server_or_skip().await else {
            return;
        };
        Mock::given(method("GET"))
            .and(path("/api/types/"))
            .and(query_param("offset", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_of(1, PAGE_SIZE)))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = ApiClient::new(BackoffPolicy::new(1, Duration::ZERO, Duration::ZERO));
        let endpoints = Endpoints::single_host(&mock_server.uri());
        let ctx = AcquireContext {
            client: &client,
            api_key: "k",
            endpoints: &endpoints,
            request_delay: Duration::ZERO,
        };

        assert_eq!(fetch_single(&ctx, "types").await.unwrap().len(), PAGE_SIZE);
    }
}
