//! Cloudstream command line front end.
//!
//! The binary in `main.rs` only parses arguments and sets up logging; the
//! commands live in [`app`] so they can be tested against mock servers.

pub mod app;
pub mod config;
pub mod error;
pub mod render;

pub use app::{Aggregate, App, GridQuery, TrackQuery};
pub use config::CliConfig;
pub use error::{CliError, Result};
