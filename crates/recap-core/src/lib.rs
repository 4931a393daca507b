//! Shared foundation for the chat recap crates.
//!
//! Holds the canonical conversation/message model, the error type, the
//! validated run configuration and its command-line surface, local-time
//! projection helpers, and number formatting used by the renderers.

pub mod config;
pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod time_utils;

pub use config::{RoleScope, RunConfig};
pub use error::{RecapError, Result};
pub use models::{Conversation, ExportFormat, Message, Role};
