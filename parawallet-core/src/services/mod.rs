//! Service layer
//!
//! Session ownership, backend calls, per-form request lifecycles and the
//! event log.

mod client;
pub mod forms;
pub mod logging;
mod session;

pub use client::{cancellable, SessionClient};
pub use forms::{BusyFlag, FormState, LoginForm, SendForm, SignupForm, WalletPanel};
pub use logging::{EndpointStats, EntryPoint, LogEntry, LogEvent, LogFilter, LoggingService};
pub use session::SessionManager;
