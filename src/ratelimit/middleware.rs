//! Request interception for rate limiting.
//!
//! The gate sits in front of the routed handlers. Operations without a
//! registered policy pass straight through with no store access; annotated
//! operations are checked against the client's statistics, and a denied
//! request is answered with 429 and an empty body without ever reaching the
//! downstream handler.

use axum::{
    extract::{ConnectInfo, MatchedPath, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, error};

use super::key::ClientKey;
use super::limiter::{Decision, RateLimiter};
use super::policy::PolicyRegistry;

/// Address component used when the connection peer is unknown.
const UNKNOWN_ADDRESS: &str = "unknown";

/// Shared state for the rate limiting middleware.
#[derive(Clone)]
pub struct RateLimitGate {
    registry: Arc<PolicyRegistry>,
    limiter: Arc<RateLimiter>,
}

impl RateLimitGate {
    /// Create a new gate from a policy registry and a limiter.
    pub fn new(registry: Arc<PolicyRegistry>, limiter: Arc<RateLimiter>) -> Self {
        Self { registry, limiter }
    }
}

/// Middleware entry point; install with `middleware::from_fn_with_state`.
pub async fn enforce(State(gate): State<RateLimitGate>, request: Request, next: Next) -> Response {
    // Policy lookup goes through the route template so every id hits the
    // same entry; the client key uses the literal path.
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let Some(policy) = gate.registry.resolve(request.method(), &route) else {
        return next.run(request).await;
    };

    let address = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_ADDRESS.to_string());
    let key = ClientKey::new(request.uri().path(), &address);

    match gate.limiter.check(&key, &policy, Utc::now()).await {
        Ok(Decision::Allow) => next.run(request).await,
        Ok(Decision::Deny) => {
            debug!(key = %key, route = %route, "Request rejected by rate limit");
            StatusCode::TOO_MANY_REQUESTS.into_response()
        }
        Err(e) => {
            error!(key = %key, error = %e, "Statistics store failure");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
