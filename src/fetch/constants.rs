//! Constants for the fetch module (timeouts, retry budget, backoff delays).

use std::time::Duration;

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP read timeout (5 minutes, images can be large).
pub const READ_TIMEOUT_SECS: u64 = 300;

/// Maximum attempts per request, including the first one.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// Wait before retrying after a generic non-2xx response or network failure.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(30);

/// Wait before retrying after an explicit rate-limit response.
pub const DEFAULT_RATE_LIMIT_DELAY: Duration = Duration::from_secs(600);

/// Status codes the API uses to signal that the client is over its limit.
///
/// 420 is what the Giant Bomb API actually sends; 429 is the standard code.
pub const RATE_LIMIT_STATUSES: [u16; 2] = [420, 429];

/// Maximum number of body bytes echoed into logs for unexpected responses.
pub const MAX_LOGGED_BODY_BYTES: usize = 512;
