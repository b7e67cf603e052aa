//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, timeout + trace layers)
//!     → middleware/instrument.rs (latency clock, span, status recorder)
//!     → handlers.rs (demo routes)
//!     → middleware/instrument.rs (metrics + span finalization)
//!     → Send to client
//! ```

pub mod handlers;
pub mod middleware;
pub mod server;

pub use server::HttpServer;
