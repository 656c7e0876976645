//! Security module.
//!
//! Provides core security features:
//! - **Cloaking**: HMAC-SHA256 based IP/hostname privacy protection
//! - **Rate Limiting**: Governor-based flood protection for messages, connections, joins
//! - **X-Lines**: Server-level bans (K/G/Z/R-lines) plus extended ban (+b) patterns
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                  Security Module                    │
//! ├─────────────┬────────────────┬──────────────────────┤
//! │  Cloaking   │ Rate Limiting  │       X-Lines         │
//! │ HMAC-SHA256 │   Governor     │  K/G/Z/R + ExtBans    │
//! │ IP+Hostname │ Token Bucket   │                       │
//! └─────────────┴────────────────┴──────────────────────┘
//! ```

pub mod cloaking;
pub mod rate_limit;
pub mod xlines;

// Re-export primary types for convenience
#[allow(unused_imports)]
pub use cloaking::{cloak_hostname, cloak_ip_hmac};
pub use rate_limit::RateLimitManager;
pub use xlines::{ExtendedBan, UserContext, XLine, matches_extended_ban, matches_xline};
