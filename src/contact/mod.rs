pub mod cooldown;
pub mod error;
pub mod gateway;
pub mod validate;

pub use cooldown::{CooldownStatus, Remaining};
pub use error::SubmitError;
pub use gateway::{AutoReply, ContactGateway, GatewaySettings, SendOutcome};
