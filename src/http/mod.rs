//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (caller key from peer address, request ID header)
//!     → login.rs (challenge path through the login guard)
//!     → 302 redirect or 429 with Retry-After
//! ```

pub mod login;
pub mod request;
pub mod server;

pub use request::{client_key, X_REQUEST_ID};
pub use server::{AppState, HttpServer, ServerError};
