//! wledmark — discover WLED controllers via mDNS and bookmark them in Firefox.
//!
//! This library crate exposes all modules for use by the binary and integration tests.

pub mod app;
pub mod database;
pub mod managers;
pub mod services;
pub mod types;
