//! Readiness and liveness probes.
//!
//! The process moves through three phases: `starting` until the database is
//! migrated and the listener bound, `serving` afterwards, and `draining` once
//! shutdown begins. Readiness holds only while serving; liveness fails only
//! while draining.
use std::sync::atomic::{AtomicU8, Ordering};

use actix_web::{HttpResponse, get, http::header, web};
use serde::Serialize;
use tracing::debug;
use utoipa::ToSchema;

/// Lifecycle phase reported by the probes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Migrations or socket binding still in progress.
    Starting,
    /// Accepting traffic.
    Serving,
    /// Shutting down.
    Draining,
}

impl Phase {
    const fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Self::Serving,
            2 => Self::Draining,
            _ => Self::Starting,
        }
    }

    const fn as_u8(self) -> u8 {
        match self {
            Self::Starting => 0,
            Self::Serving => 1,
            Self::Draining => 2,
        }
    }
}

/// Probe response body.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProbeBody {
    pub phase: Phase,
}

/// Shared lifecycle flag read by both probes.
#[derive(Debug)]
pub struct HealthState {
    phase: AtomicU8,
}

impl Default for HealthState {
    fn default() -> Self {
        Self {
            phase: AtomicU8::new(Phase::Starting.as_u8()),
        }
    }
}

impl HealthState {
    /// Start in the `starting` phase.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        Phase::from_u8(self.phase.load(Ordering::Acquire))
    }

    /// Enter `serving`. Ignored once draining.
    pub fn mark_ready(&self) {
        let swapped = self.phase.compare_exchange(
            Phase::Starting.as_u8(),
            Phase::Serving.as_u8(),
            Ordering::AcqRel,
            Ordering::Acquire,
        );
        if swapped.is_err() {
            debug!(phase = ?self.phase(), "readiness not raised");
        }
    }

    /// Enter `draining` so orchestrators stop routing traffic here.
    pub fn mark_draining(&self) {
        self.phase.store(Phase::Draining.as_u8(), Ordering::Release);
    }

    fn respond(&self, healthy: bool) -> HttpResponse {
        let mut builder = if healthy {
            HttpResponse::Ok()
        } else {
            HttpResponse::ServiceUnavailable()
        };
        builder
            .insert_header((header::CACHE_CONTROL, "no-store"))
            .json(ProbeBody {
                phase: self.phase(),
            })
    }
}

/// Readiness probe: `200` while serving, `503` otherwise.
#[utoipa::path(
    get,
    path = "/health/ready",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Accepting traffic", body = ProbeBody),
        (status = 503, description = "Starting or draining", body = ProbeBody)
    )
)]
#[get("/health/ready")]
pub async fn ready(state: web::Data<HealthState>) -> HttpResponse {
    state.respond(state.phase() == Phase::Serving)
}

/// Liveness probe: `503` only while draining.
#[utoipa::path(
    get,
    path = "/health/live",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Process alive", body = ProbeBody),
        (status = 503, description = "Draining", body = ProbeBody)
    )
)]
#[get("/health/live")]
pub async fn live(state: web::Data<HealthState>) -> HttpResponse {
    state.respond(state.phase() != Phase::Draining)
}
