//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, ConnectInfo)
//!     → middleware.rs (request filter: allow or 403)
//!     → server.rs forward_handler (relay to upstream)
//!     → Send upstream response to client
//! ```

pub mod middleware;
pub mod response;
pub mod server;

pub use middleware::{header_block_middleware, FilterState};
pub use server::{HttpServer, ServerError};
