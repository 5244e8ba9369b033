//! Endpoint path constants for the emissions service API
//!
//! Paths are opaque constants composed onto the configured base URL.

pub const SIGN_UP: &str = "/v1/auth/signup";
pub const SIGN_IN: &str = "/v1/auth/signin";
pub const GET_ME: &str = "/v1/users/me";
pub const ACTIVITIES: &str = "/v1/activities";
pub const ANALYTICS_KPIS: &str = "/v1/analytics/kpis";
pub const ANALYTICS_TREND: &str = "/v1/analytics/trend";
pub const ANALYTICS_SUMMARY: &str = "/v1/analytics/summary";
