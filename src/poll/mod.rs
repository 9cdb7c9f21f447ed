//! Readiness multiplexers and the context that tracks them.
//!
//! # Data Flow
//! ```text
//! Caller creates Context (once) and Pollset (per worker)
//!     → HttpClient::get/post registers the pollset with the Context
//!     → request runs; the registration is held by the in-flight future
//!     → on completion the registration drops (pollset removed)
//!     → the pollset is kicked so a waiting worker observes completion
//! ```
//!
//! # Design Decisions
//! - Membership is reference counted: a pollset shared by several
//!   in-flight requests stays registered until the last one finishes
//! - Removal happens in `Drop`, so every exit path deregisters exactly once
//! - The set is a `DashMap`; concurrent completions never contend on one lock

pub mod context;
pub mod pollset;

pub use context::{Context, PollsetRegistration};
pub use pollset::{Pollset, PollsetId};
