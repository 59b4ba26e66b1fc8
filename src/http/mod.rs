//! HTTP surface: server lifecycle and request handlers.

mod handlers;
mod server;

pub use handlers::{router, AppState};
pub use server::HttpServer;
