//! Library surface for the flash-sale reservation service, so integration
//! tests can build a router and workflows without going through `main`.

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod http;
pub mod messages;
pub mod workflows;

pub use bootstrap::{connect, Handles};
pub use config::Config;
