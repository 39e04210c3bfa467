//! State Management
//!
//! Global application state and the session check in front of protected
//! routes.

pub mod global;
pub mod session;

pub use global::{provide_global_state, GlobalState, Notice, NoticeKind};
