pub mod cli;
pub mod completed;
pub mod config;
pub mod download;
pub mod error;
pub mod global;
pub mod lifecycle;
pub mod upload;
pub mod zoom;

pub use error::{ArchiveError, ArchiveResult};
