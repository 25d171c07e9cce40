//! Clever Instant Login authentication
//!
//! Handles:
//! - OAuth authorization code flow
//! - In-memory session management
//! - Session extraction for protected routes

mod middleware;
mod oauth;
pub mod session;

pub use middleware::{CurrentSession, session_id_from_headers};
pub use oauth::auth_router;
pub use session::{Session, SessionStore};
