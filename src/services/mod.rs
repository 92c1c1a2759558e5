// wledmark services
// Services provide the read-only half of a run: mDNS discovery and profile search.

pub mod discovery;
pub mod profile_locator;
