//! Test helpers for inbound HTTP components.
//!
//! [`HttpStateBuilder`] starts every port as an expectation-free mock, so a
//! handler test only configures the ports it exercises and any unexpected
//! call fails loudly.

use std::sync::Arc;

use actix_web::web;

use crate::domain::ports::{
    MockLoginService, MockManualStatsCommand, MockManualStatsQuery, MockSessionVerifier,
    MockShipmentCommand, MockShipmentQuery, MockUserAdministration, MockWorkbookIngestion,
};
use crate::domain::{Error, Identity, Role, UserId, Username};

use super::state::{HttpState, HttpStatePorts};

/// Bearer token accepted for [`admin`].
pub const ADMIN_TOKEN: &str = "admin-token";
/// Bearer token accepted for [`operator`].
pub const USER_TOKEN: &str = "user-token";

/// Admin identity used by handler tests.
pub fn admin() -> Identity {
    Identity {
        id: UserId::new(1),
        username: Username::new("admin").expect("valid username"),
        role: Role::Admin,
    }
}

/// Regular operator identity used by handler tests.
pub fn operator() -> Identity {
    Identity {
        id: UserId::new(2),
        username: Username::new("budi").expect("valid username"),
        role: Role::User,
    }
}

/// Session verifier accepting [`ADMIN_TOKEN`] and [`USER_TOKEN`].
pub fn fixed_sessions() -> MockSessionVerifier {
    let mut sessions = MockSessionVerifier::new();
    sessions.expect_authenticate().returning(|token| match token {
        ADMIN_TOKEN => Ok(admin()),
        USER_TOKEN => Ok(operator()),
        _ => Err(Error::unauthorized("invalid session token")),
    });
    sessions
}

/// `Authorization` header value for `token`.
pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {token}"))
}

/// Builder for [`HttpState`] backed by mocks.
pub struct HttpStateBuilder {
    login: MockLoginService,
    sessions: MockSessionVerifier,
    users: MockUserAdministration,
    shipments: MockShipmentCommand,
    shipments_query: MockShipmentQuery,
    ingestion: MockWorkbookIngestion,
    manual_stats: MockManualStatsCommand,
    manual_stats_query: MockManualStatsQuery,
    upload_limit_bytes: Option<usize>,
}

impl HttpStateBuilder {
    /// Start with expectation-free mocks and [`fixed_sessions`].
    pub fn new() -> Self {
        Self {
            login: MockLoginService::new(),
            sessions: fixed_sessions(),
            users: MockUserAdministration::new(),
            shipments: MockShipmentCommand::new(),
            shipments_query: MockShipmentQuery::new(),
            ingestion: MockWorkbookIngestion::new(),
            manual_stats: MockManualStatsCommand::new(),
            manual_stats_query: MockManualStatsQuery::new(),
            upload_limit_bytes: None,
        }
    }

    pub fn login(mut self, login: MockLoginService) -> Self {
        self.login = login;
        self
    }

    pub fn sessions(mut self, sessions: MockSessionVerifier) -> Self {
        self.sessions = sessions;
        self
    }

    pub fn users(mut self, users: MockUserAdministration) -> Self {
        self.users = users;
        self
    }

    pub fn shipments(mut self, shipments: MockShipmentCommand) -> Self {
        self.shipments = shipments;
        self
    }

    pub fn shipments_query(mut self, query: MockShipmentQuery) -> Self {
        self.shipments_query = query;
        self
    }

    pub fn ingestion(mut self, ingestion: MockWorkbookIngestion) -> Self {
        self.ingestion = ingestion;
        self
    }

    pub fn manual_stats(mut self, command: MockManualStatsCommand) -> Self {
        self.manual_stats = command;
        self
    }

    pub fn manual_stats_query(mut self, query: MockManualStatsQuery) -> Self {
        self.manual_stats_query = query;
        self
    }

    pub fn upload_limit(mut self, bytes: usize) -> Self {
        self.upload_limit_bytes = Some(bytes);
        self
    }

    /// Wrap the configured mocks for `App::app_data`.
    pub fn build(self) -> web::Data<HttpState> {
        let state = HttpState::new(HttpStatePorts {
            login: Arc::new(self.login),
            sessions: Arc::new(self.sessions),
            users: Arc::new(self.users),
            shipments: Arc::new(self.shipments),
            shipments_query: Arc::new(self.shipments_query),
            ingestion: Arc::new(self.ingestion),
            manual_stats: Arc::new(self.manual_stats),
            manual_stats_query: Arc::new(self.manual_stats_query),
        });
        let state = match self.upload_limit_bytes {
            Some(bytes) => state.with_upload_limit(bytes),
            None => state,
        };
        web::Data::new(state)
    }
}
