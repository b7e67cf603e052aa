//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGINT/Ctrl+C → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     trigger → broadcast to subscribers
//!     → server stops accepting, drains connections
//!     → trace exporter flushes within its deadline
//!     → process exits
//! ```
//!
//! # Design Decisions
//! - Ordered shutdown: stop accepting, drain, flush telemetry, exit
//! - The telemetry flush has a timeout: exit is never held hostage by an
//!   unreachable collector

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
pub use signals::wait_for_signal;
