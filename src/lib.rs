//! Contact form gateway for a portfolio site.
//!
//! [`contact::ContactGateway`] validates a message, enforces a 24h cooldown
//! per sender email and forwards the message through an [`api::EmailProvider`].

pub mod api;
pub mod app;
pub mod contact;
pub mod storage;
pub mod utils;

pub use api::EmailProvider;
pub use api::client::EmailJsClient;
pub use api::models::{ContactMessage, ProviderError, ProviderResponse, TemplateParams};
pub use app::{AppConfig, ConfigError};
pub use contact::{
    AutoReply, ContactGateway, CooldownStatus, GatewaySettings, Remaining, SendOutcome, SubmitError,
};
pub use storage::{KeyValueStore, MemoryStore, SqliteStore, StorageError};
