//! Request middleware.
//!
//! # Data Flow
//! ```text
//! request
//!     → instrument.rs (start clock, open span, insert recorder + context)
//!     → handler
//!     → instrument.rs (record final status, metrics, end span)
//!     → response
//! ```

pub mod instrument;
pub mod status;

pub use instrument::{instrument, Instrumentation, RouteInstrument};
pub use status::StatusRecorder;
