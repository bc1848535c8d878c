pub mod types;
pub mod payload;
pub mod traits;
pub mod error;
pub mod config;
pub mod foundry;

pub use traits::CompletionClient;
pub use error::UpstreamError;
pub use config::{AuthStyle, UpstreamConfig};
pub use payload::{CompletionPayload, DataSource, SamplingParams};
pub use foundry::FoundryClient;
pub use types::{Message, Role};
