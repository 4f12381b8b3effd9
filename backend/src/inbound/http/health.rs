//! Liveness and readiness probes.
//!
//! Readiness follows the server lifecycle and the article store: the process
//! is ready only while it is serving and the store answers a ping. Liveness
//! only fails once the server has started draining. Every probe answers
//! `{"status": ...}` with `Cache-Control: no-store`.

use std::sync::atomic::{AtomicU8, Ordering};

use actix_web::{HttpResponse, get, http::header, web};
use serde::Serialize;
use tracing::warn;

use crate::inbound::http::state::HttpState;

/// Server lifecycle phase as seen by the probes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Phase {
    /// Listener not yet bound.
    Starting = 0,
    /// Accepting requests.
    Serving = 1,
    /// Shutting down; no new work should arrive.
    Draining = 2,
}

impl Phase {
    fn from_raw(raw: u8) -> Self {
        match raw {
            0 => Self::Starting,
            1 => Self::Serving,
            _ => Self::Draining,
        }
    }
}

/// Shared lifecycle flag read by the probes.
#[derive(Debug)]
pub struct HealthState {
    phase: AtomicU8,
}

impl Default for HealthState {
    fn default() -> Self {
        Self {
            phase: AtomicU8::new(Phase::Starting as u8),
        }
    }
}

impl HealthState {
    /// A state in [`Phase::Starting`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that the listener is bound.
    pub fn mark_serving(&self) {
        self.phase.store(Phase::Serving as u8, Ordering::Release);
    }

    /// Record that shutdown has begun. Draining is final.
    pub fn mark_draining(&self) {
        self.phase.store(Phase::Draining as u8, Ordering::Release);
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        Phase::from_raw(self.phase.load(Ordering::Acquire))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum ProbeStatus {
    Ready,
    Alive,
    Starting,
    Draining,
    StoreUnavailable,
}

fn probe_response(status: ProbeStatus) -> HttpResponse {
    let mut builder = match status {
        ProbeStatus::Ready | ProbeStatus::Alive => HttpResponse::Ok(),
        _ => HttpResponse::ServiceUnavailable(),
    };
    builder
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .json(serde_json::json!({ "status": status }))
}

/// Readiness probe: serving and the article store reachable.
#[utoipa::path(
    get,
    path = "/health/ready",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Serving with a reachable article store"),
        (status = 503, description = "Starting, draining, or the article store is unreachable")
    )
)]
#[get("/health/ready")]
pub async fn ready(health: web::Data<HealthState>, state: web::Data<HttpState>) -> HttpResponse {
    let status = match health.phase() {
        Phase::Starting => ProbeStatus::Starting,
        Phase::Draining => ProbeStatus::Draining,
        Phase::Serving => match state.articles.check_store().await {
            Ok(()) => ProbeStatus::Ready,
            Err(error) => {
                warn!(%error, "readiness probe: article store unavailable");
                ProbeStatus::StoreUnavailable
            }
        },
    };
    probe_response(status)
}

/// Liveness probe: fails only while draining.
#[utoipa::path(
    get,
    path = "/health/live",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Process is alive"),
        (status = 503, description = "Process is draining")
    )
)]
#[get("/health/live")]
pub async fn live(health: web::Data<HealthState>) -> HttpResponse {
    match health.phase() {
        Phase::Draining => probe_response(ProbeStatus::Draining),
        Phase::Starting | Phase::Serving => probe_response(ProbeStatus::Alive),
    }
}
