//! Domain constants
//!
//! Centralized location for the defaults and fixed endpoints used throughout
//! the workspace.

use std::time::Duration;

// Environment base URLs
pub const PRODUCTION_API_BASE_URL: &str = "https://apis.usps.com/addresses/v3";
pub const PRODUCTION_OAUTH_BASE_URL: &str = "https://apis.usps.com/oauth2/v3";
pub const TESTING_API_BASE_URL: &str = "https://apis-tem.usps.com/addresses/v3";
pub const TESTING_OAUTH_BASE_URL: &str = "https://apis-tem.usps.com/oauth2/v3";

// Resource and authorization paths
pub const ADDRESS_PATH: &str = "/address";
pub const CITY_STATE_PATH: &str = "/city-state";
pub const ZIP_CODE_PATH: &str = "/zipcode";
pub const TOKEN_PATH: &str = "/token";
pub const REVOKE_PATH: &str = "/revoke";

// HTTP client configuration
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const USER_AGENT: &str = concat!("postkit/", env!("CARGO_PKG_VERSION"));

// Credential manager configuration
pub const DEFAULT_TOKEN_REFRESH_BUFFER: Duration = Duration::from_secs(300);
pub const MIN_TOKEN_LIFETIME: Duration = Duration::from_secs(1);

// Bulk processing configuration
pub const DEFAULT_MAX_CONCURRENCY: usize = 10;
pub const DEFAULT_REQUESTS_PER_SECOND: u32 = 10;
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_secs(1);
pub const MAX_BACKOFF_EXPONENT: u32 = 5;
