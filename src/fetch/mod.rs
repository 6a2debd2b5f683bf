// =============================================================================
// Fetch Module — outbound HTTP and the two upstream fetcher families
// =============================================================================

pub mod fred;
pub mod http;
pub mod indeed;
