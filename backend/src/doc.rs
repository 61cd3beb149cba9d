//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every REST endpoint from the inbound layer together
//! with the bearer-token security scheme. Domain types derive `ToSchema`
//! directly so record JSON documents the spreadsheet column names.
//!
//! The generated document is served by Swagger UI in debug builds.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{
    DeliveryRecord, DeliveryStatus, Error, ErrorCode, IngestionSummary, ManualStats, PickupRecord,
    PurgeCounts, RecapRow, Role, ShipmentDump, StoredManualStats, User,
};
use crate::inbound::http::health::{Phase, ProbeBody};
use crate::inbound::http::manual_stats::ManualStatsRequest;
use crate::inbound::http::records::{DeliveryRequest, PickupRequest, PurgeResponse};
use crate::inbound::http::upload::{UploadForm, UploadResponse};
use crate::inbound::http::users::{
    CredentialsRequest, LoginResponse, MessageResponse, RegisterResponse, RoleUpdateRequest,
};

/// Name of the security scheme applied to authenticated endpoints.
pub const BEARER_SCHEME: &str = "BearerAuth";

/// Enrich the generated document with the bearer JWT security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            BEARER_SCHEME,
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("Token issued by POST /api/login; valid for 24 hours."))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Courier logistics API",
        description = "Pickup and delivery ledger with spreadsheet ingestion and daily reporting."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerAuth" = [])),
    paths(
        crate::inbound::http::users::register,
        crate::inbound::http::users::login,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::delete_user,
        crate::inbound::http::users::update_user_role,
        crate::inbound::http::records::list_pickups,
        crate::inbound::http::records::list_deliveries,
        crate::inbound::http::records::create_pickup,
        crate::inbound::http::records::create_delivery,
        crate::inbound::http::records::update_pickup,
        crate::inbound::http::records::update_delivery,
        crate::inbound::http::records::delete_pickup,
        crate::inbound::http::records::delete_delivery,
        crate::inbound::http::records::dump_records,
        crate::inbound::http::records::purge_record,
        crate::inbound::http::upload::upload_workbook,
        crate::inbound::http::manual_stats::list_manual_stats,
        crate::inbound::http::manual_stats::record_manual_stats,
        crate::inbound::http::recap::recap,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        User,
        Role,
        PickupRecord,
        DeliveryRecord,
        DeliveryStatus,
        ShipmentDump,
        PurgeCounts,
        RecapRow,
        ManualStats,
        StoredManualStats,
        IngestionSummary,
        CredentialsRequest,
        RegisterResponse,
        LoginResponse,
        RoleUpdateRequest,
        MessageResponse,
        PickupRequest,
        DeliveryRequest,
        PurgeResponse,
        UploadForm,
        UploadResponse,
        ManualStatsRequest,
        Phase,
        ProbeBody,
    )),
    tags(
        (name = "users", description = "Registration, login and account administration"),
        (name = "records", description = "Pickup and delivery ledger"),
        (name = "stats", description = "Recap and manual daily statistics"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
