//! # parley-client
//!
//! Everything a chat front end needs besides drawing pixels: the
//! per-session state machine, the bounded history sent with each request,
//! the HTTP transport to `parley-api`, and the HTML rendering of transcript
//! entries.
//!
//! ```rust,no_run
//! use parley_client::{ChatSession, HttpTransport};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let transport = HttpTransport::new("http://localhost:3000")?;
//! let mut session = ChatSession::new();
//!
//! let entry = session.send(&transport, "Hello!").await?;
//! println!("{}", entry.text);
//! # Ok(())
//! # }
//! ```

pub mod budget;
pub mod format;
pub mod history;
pub mod session;
pub mod transcript;
pub mod transport;

pub use budget::{BudgetLevel, InputBudget, MAX_INPUT_CHARS};
pub use format::{escape_html, format_bot_message};
pub use history::{HistoryBuffer, HISTORY_LIMIT};
pub use session::{ChatSession, ConnectionStatus, SendState, SessionError};
pub use transcript::{EntryKind, Transcript, TranscriptEntry};
pub use transport::{ChatRequest, ChatResponse, ChatTransport, HealthReport, HttpTransport, TransportError};
