pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod prompts;
pub mod proxy;
pub mod routes;
pub mod setup;
pub mod state;

pub use app::build_router;
pub use config::Config;
pub use proxy::{ChatProxy, ChatReply, ProxySettings};
pub use state::AppState;
