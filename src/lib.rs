pub mod config;
pub mod error;
pub mod paste;
pub mod publish;
pub mod secrets;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use paste::{PasteClient, PasteError, PasteOptions, PasteResponse};
