//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    LoginService, ManualStatsCommand, ManualStatsQuery, SessionVerifier, ShipmentCommand,
    ShipmentQuery, UserAdministration, WorkbookIngestion,
};

/// Largest accepted upload body when none is configured: 10 MiB.
pub const DEFAULT_UPLOAD_LIMIT_BYTES: usize = 10 * 1024 * 1024;

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub login: Arc<dyn LoginService>,
    pub sessions: Arc<dyn SessionVerifier>,
    pub users: Arc<dyn UserAdministration>,
    pub shipments: Arc<dyn ShipmentCommand>,
    pub shipments_query: Arc<dyn ShipmentQuery>,
    pub ingestion: Arc<dyn WorkbookIngestion>,
    pub manual_stats: Arc<dyn ManualStatsCommand>,
    pub manual_stats_query: Arc<dyn ManualStatsQuery>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub sessions: Arc<dyn SessionVerifier>,
    pub users: Arc<dyn UserAdministration>,
    pub shipments: Arc<dyn ShipmentCommand>,
    pub shipments_query: Arc<dyn ShipmentQuery>,
    pub ingestion: Arc<dyn WorkbookIngestion>,
    pub manual_stats: Arc<dyn ManualStatsCommand>,
    pub manual_stats_query: Arc<dyn ManualStatsQuery>,
    /// Largest workbook, in bytes, that `/api/upload` accepts.
    pub upload_limit_bytes: usize,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Construct state from a ports bundle with the default upload limit.
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            login,
            sessions,
            users,
            shipments,
            shipments_query,
            ingestion,
            manual_stats,
            manual_stats_query,
        } = ports;
        Self {
            login,
            sessions,
            users,
            shipments,
            shipments_query,
            ingestion,
            manual_stats,
            manual_stats_query,
            upload_limit_bytes: DEFAULT_UPLOAD_LIMIT_BYTES,
        }
    }

    /// Override the upload size limit.
    #[must_use]
    pub fn with_upload_limit(mut self, bytes: usize) -> Self {
        self.upload_limit_bytes = bytes;
        self
    }
}
