//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path, query, resolved identity)
//!     → router.rs (rules in declaration order)
//!     → matcher.rs (evaluate match condition)
//!     → first match: rule's take runs (may be a nested router)
//!     → no match: DispatchError::NotFound
//!
//! Rule list (at startup):
//!     app.rs declares rules in required order
//!     → Compile regex matchers
//!     → Freeze as immutable Router
//! ```
//!
//! # Design Decisions
//! - Rules compiled at startup, immutable at runtime
//! - Deterministic: same input always matches same rule
//! - First match wins; order of declaration is the priority

pub mod matcher;
pub mod router;
pub mod takes;

pub use router::{take_fn, Router, Rule, Take};
