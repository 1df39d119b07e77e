pub mod config;
pub mod error;
pub mod types;

pub use config::RepovoxConfig;
pub use error::{RepovoxError, Result};
pub use types::{Message, RepoContext, Role};
