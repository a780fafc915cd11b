//! CyberDash Core - Roster Types and Query Pipeline
//!
//! Pure data structures and synchronous functions shared by the API server
//! and the client: the seeded agent generator, filter/search, pagination,
//! live-alert drift, and the chat transcript log. No I/O happens here.

use chrono::{DateTime, Utc};

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

mod agent;
mod chat;
mod config;
mod drift;
mod enums;
mod error;
mod filter;
mod generator;
mod paginate;
mod rng;

pub use agent::*;
pub use chat::*;
pub use config::*;
pub use drift::*;
pub use enums::*;
pub use error::*;
pub use filter::*;
pub use generator::*;
pub use paginate::*;
pub use rng::*;

// ============================================================================
// TESTS
// ============================================================================


// ============================================================================
// PROPERTY-BASED TESTS
// ============================================================================
