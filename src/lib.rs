//!# synodl
//!
//! Command-line client and library for the Synology Download Station task API.
//!
//! The library logs in to the NAS with `SYNO.API.Auth`, signs every following
//! request with the session ID and exposes the download tasks of
//! `SYNO.DownloadStation.Task`.
//!
//! ## Features
//!
//! - Session login/logout, logout on drop
//! - List download tasks with detail and transfer information
//! - Get information about specific tasks
//! - Create downloads from URLs, with optional destination and source credentials
//! - Delete tasks, optionally forcing unfinished ones
//! - Human-readable sizes, progress and an aligned task table
//!
//! ## Usage example
//!
//! ```rust,no_run
//! use std::env;
//! use synodl::client::DownloadStation;
//! use synodl::utils::format_task_table;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let synods = DownloadStation::builder()
//!         .host(env::var("SYNOLOGY_HOST")?)
//!         .username(env::var("SYNOLOGY_USERNAME")?)
//!         .password(env::var("SYNOLOGY_PASSWORD")?)
//!         .connect()?;
//!
//!     let tasks = synods.list()?;
//!     print!("{}", format_task_table(&tasks.tasks));
//!
//!     synods.close()?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod client;
pub mod entities;
pub mod error;
pub mod utils;

pub use error::{Result, SynoError};
