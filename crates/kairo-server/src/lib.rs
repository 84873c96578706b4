//! Kairo HTTP relay.
//!
//! Routes mobile-client chat and timetable photos to the LLM fallback
//! dispatcher, normalizes the replies, and mirrors schedule changes to the
//! store.

pub mod intent;
pub mod prompts;
pub mod routes;
pub mod state;
pub mod throttle;

pub use routes::build_router;
pub use state::AppState;
pub use throttle::{ChatThrottle, ThrottleDecision, TimeMode};
