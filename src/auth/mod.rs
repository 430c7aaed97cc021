//! Admin access guard
//!
//! Upload toggling and deletion can be protected by a static bearer token
//! (`admin.token`). Without a configured token they stay open.

mod middleware;

pub use middleware::AdminGuard;
