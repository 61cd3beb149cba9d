//! Shipment record handlers: paged listings, single-record writes, the full
//! dump and the admin purge.
//!
//! ```text
//! GET /api/pickup?page=1&limit=10&date=2024-07-20&search=budi
//! POST /api/pickup {"AWB":"JNE0001","Nama":"Siti","Tanggal":"2024-07-20"}
//! PUT /api/delivery/JNE0001 {"Status":"Terkirim","Tanggal":"2024-07-21","COD Amount":50000}
//! DELETE /api/data/JNE0001
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use pagination::{Page, PageRequest, PageRequestError};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    DeliveryFields, DeliveryRecord, Error, PickupFields, PickupRecord, PurgeCounts, RecordFilter,
    RecordFilterError, RecordKind, ShipmentDump,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Authenticated;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, Numeric, invalid_date_error, optional_text, parse_awb, parse_cod, parse_status,
    require_awb, require_date,
};

const AWB: FieldName = FieldName::new("AWB");
const DATE: FieldName = FieldName::new("Tanggal");
const STATUS: FieldName = FieldName::new("Status");
const COD: FieldName = FieldName::new("COD Amount");

/// Query string accepted by the listing endpoints.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// One-based page number; defaults to 1.
    pub page: Option<i64>,
    /// Rows per page; defaults to 10 and is capped at 100.
    pub limit: Option<i64>,
    /// Exact event date, `YYYY-MM-DD`.
    pub date: Option<String>,
    /// Case-insensitive substring across the visible text columns.
    pub search: Option<String>,
}

/// One page of records plus paging metadata.
///
/// HTTP-facing mirror of [`Page`], which stays free of OpenAPI derives.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordPage<T> {
    /// Rows on this page.
    pub data: Vec<T>,
    /// One-based page number.
    pub page: u32,
    /// Page size after clamping.
    pub limit: u32,
    /// Rows matching the filter across all pages.
    pub total: u64,
    /// `ceil(total / limit)`; zero when nothing matches.
    pub total_pages: u64,
}

impl<T> From<Page<T>> for RecordPage<T> {
    fn from(page: Page<T>) -> Self {
        let (number, limit, total, total_pages) =
            (page.page(), page.limit(), page.total(), page.total_pages());
        Self {
            data: page.into_data(),
            page: number,
            limit,
            total,
            total_pages,
        }
    }
}

/// Pickup fields as typed on the spreadsheet.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct PickupRequest {
    /// Ignored on update; the path names the record.
    #[serde(rename = "AWB")]
    pub awb: Option<String>,
    #[serde(rename = "Nama")]
    pub name: Option<String>,
    #[serde(rename = "Alamat")]
    pub address: Option<String>,
    #[serde(rename = "No. HP")]
    pub phone: Option<String>,
    #[serde(rename = "Tanggal")]
    #[schema(example = "2024-07-20")]
    pub date: Option<String>,
}

/// Delivery fields as typed on the spreadsheet.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct DeliveryRequest {
    /// Ignored on update; the path names the record.
    #[serde(rename = "AWB")]
    pub awb: Option<String>,
    /// `Terkirim`, `Gagal` or `Proses`; defaults to `Proses`.
    #[serde(rename = "Status")]
    pub status: Option<String>,
    #[serde(rename = "Tanggal")]
    #[schema(example = "2024-07-21")]
    pub date: Option<String>,
    #[serde(rename = "COD Amount")]
    pub cod_amount: Option<Numeric>,
}

/// Result of purging an AWB from both record kinds.
#[derive(Debug, Serialize, ToSchema)]
pub struct PurgeResponse {
    pub message: String,
    #[serde(flatten)]
    pub removed: PurgeCounts,
}

impl PickupRequest {
    fn into_fields(self) -> Result<PickupFields, Error> {
        Ok(PickupFields {
            recipient_name: optional_text(self.name),
            address: optional_text(self.address),
            phone: optional_text(self.phone),
            event_date: require_date(self.date, DATE)?,
        })
    }
}

impl DeliveryRequest {
    fn into_fields(self) -> Result<DeliveryFields, Error> {
        Ok(DeliveryFields {
            status: parse_status(self.status, STATUS)?,
            event_date: require_date(self.date, DATE)?,
            cod_amount: parse_cod(self.cod_amount, COD)?,
        })
    }
}

fn map_page_error(err: PageRequestError) -> Error {
    let field = match err {
        PageRequestError::PageOutOfRange { .. } => "page",
        PageRequestError::LimitOutOfRange { .. } => "limit",
    };
    Error::invalid_request(err.to_string()).with_details(json!({
        "field": field,
        "code": "out_of_range",
    }))
}

fn map_filter_error(err: RecordFilterError, raw_date: Option<&str>) -> Error {
    match err {
        RecordFilterError::Date(_) => {
            invalid_date_error(FieldName::new("date"), raw_date.unwrap_or_default())
        }
        RecordFilterError::SearchTooLong { .. } => Error::invalid_request(err.to_string())
            .with_details(json!({ "field": "search", "code": "too_long" })),
    }
}

fn listing_inputs(query: ListQuery) -> Result<(RecordFilter, PageRequest), Error> {
    let page = PageRequest::from_optional(query.page, query.limit).map_err(map_page_error)?;
    let filter = RecordFilter::from_query(query.date.as_deref(), query.search.as_deref())
        .map_err(|err| map_filter_error(err, query.date.as_deref()))?;
    Ok((filter, page))
}

/// List pickups, newest event date first.
#[utoipa::path(
    get,
    path = "/api/pickup",
    params(ListQuery),
    responses(
        (status = 200, description = "One page of pickups", body = RecordPage<PickupRecord>),
        (status = 400, description = "Invalid paging or filter", body = Error),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["records"],
    operation_id = "listPickups"
)]
#[get("/pickup")]
pub async fn list_pickups(
    state: web::Data<HttpState>,
    _caller: Authenticated,
    query: web::Query<ListQuery>,
) -> ApiResult<web::Json<RecordPage<PickupRecord>>> {
    let (filter, page) = listing_inputs(query.into_inner())?;
    let records = state.shipments_query.list_pickups(&filter, page).await?;
    Ok(web::Json(records.into()))
}

/// List deliveries, newest event date first.
#[utoipa::path(
    get,
    path = "/api/delivery",
    params(ListQuery),
    responses(
        (status = 200, description = "One page of deliveries", body = RecordPage<DeliveryRecord>),
        (status = 400, description = "Invalid paging or filter", body = Error),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["records"],
    operation_id = "listDeliveries"
)]
#[get("/delivery")]
pub async fn list_deliveries(
    state: web::Data<HttpState>,
    _caller: Authenticated,
    query: web::Query<ListQuery>,
) -> ApiResult<web::Json<RecordPage<DeliveryRecord>>> {
    let (filter, page) = listing_inputs(query.into_inner())?;
    let records = state.shipments_query.list_deliveries(&filter, page).await?;
    Ok(web::Json(records.into()))
}

/// Add one pickup submitted by the caller.
#[utoipa::path(
    post,
    path = "/api/pickup",
    request_body = PickupRequest,
    responses(
        (status = 201, description = "Pickup created", body = PickupRecord),
        (status = 400, description = "Missing AWB or Tanggal", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 409, description = "AWB already recorded", body = Error)
    ),
    tags = ["records"],
    operation_id = "createPickup"
)]
#[post("/pickup")]
pub async fn create_pickup(
    state: web::Data<HttpState>,
    caller: Authenticated,
    payload: web::Json<PickupRequest>,
) -> ApiResult<HttpResponse> {
    let mut request = payload.into_inner();
    let awb = require_awb(request.awb.take(), AWB)?;
    let fields = request.into_fields()?;
    let record = state
        .shipments
        .create_pickup(caller.identity(), awb, fields)
        .await?;
    Ok(HttpResponse::Created().json(record))
}

/// Add one delivery submitted by the caller.
#[utoipa::path(
    post,
    path = "/api/delivery",
    request_body = DeliveryRequest,
    responses(
        (status = 201, description = "Delivery created", body = DeliveryRecord),
        (status = 400, description = "Missing AWB or Tanggal", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 409, description = "AWB already recorded", body = Error)
    ),
    tags = ["records"],
    operation_id = "createDelivery"
)]
#[post("/delivery")]
pub async fn create_delivery(
    state: web::Data<HttpState>,
    caller: Authenticated,
    payload: web::Json<DeliveryRequest>,
) -> ApiResult<HttpResponse> {
    let mut request = payload.into_inner();
    let awb = require_awb(request.awb.take(), AWB)?;
    let fields = request.into_fields()?;
    let record = state
        .shipments
        .create_delivery(caller.identity(), awb, fields)
        .await?;
    Ok(HttpResponse::Created().json(record))
}

/// Overwrite every field of a pickup; the caller becomes its submitter.
#[utoipa::path(
    put,
    path = "/api/pickup/{awb}",
    params(("awb" = String, Path, description = "Airway bill number")),
    request_body = PickupRequest,
    responses(
        (status = 200, description = "Pickup updated", body = PickupRecord),
        (status = 400, description = "Invalid fields", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "No such pickup", body = Error)
    ),
    tags = ["records"],
    operation_id = "updatePickup"
)]
#[put("/pickup/{awb}")]
pub async fn update_pickup(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<String>,
    payload: web::Json<PickupRequest>,
) -> ApiResult<web::Json<PickupRecord>> {
    let awb = parse_awb(&path.into_inner(), AWB)?;
    let fields = payload.into_inner().into_fields()?;
    let record = state
        .shipments
        .update_pickup(caller.identity(), awb, fields)
        .await?;
    Ok(web::Json(record))
}

/// Overwrite every field of a delivery; the caller becomes its submitter.
#[utoipa::path(
    put,
    path = "/api/delivery/{awb}",
    params(("awb" = String, Path, description = "Airway bill number")),
    request_body = DeliveryRequest,
    responses(
        (status = 200, description = "Delivery updated", body = DeliveryRecord),
        (status = 400, description = "Invalid fields", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "No such delivery", body = Error)
    ),
    tags = ["records"],
    operation_id = "updateDelivery"
)]
#[put("/delivery/{awb}")]
pub async fn update_delivery(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<String>,
    payload: web::Json<DeliveryRequest>,
) -> ApiResult<web::Json<DeliveryRecord>> {
    let awb = parse_awb(&path.into_inner(), AWB)?;
    let fields = payload.into_inner().into_fields()?;
    let record = state
        .shipments
        .update_delivery(caller.identity(), awb, fields)
        .await?;
    Ok(web::Json(record))
}

async fn delete_one(
    state: &HttpState,
    caller: &Authenticated,
    kind: RecordKind,
    raw_awb: &str,
) -> ApiResult<HttpResponse> {
    let awb = parse_awb(raw_awb, AWB)?;
    state.shipments.delete(caller.identity(), kind, awb).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Delete a single pickup.
#[utoipa::path(
    delete,
    path = "/api/pickup/{awb}",
    params(("awb" = String, Path, description = "Airway bill number")),
    responses(
        (status = 204, description = "Pickup deleted"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "No such pickup", body = Error)
    ),
    tags = ["records"],
    operation_id = "deletePickup"
)]
#[delete("/pickup/{awb}")]
pub async fn delete_pickup(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    delete_one(&state, &caller, RecordKind::Pickup, &path.into_inner()).await
}

/// Delete a single delivery.
#[utoipa::path(
    delete,
    path = "/api/delivery/{awb}",
    params(("awb" = String, Path, description = "Airway bill number")),
    responses(
        (status = 204, description = "Delivery deleted"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "No such delivery", body = Error)
    ),
    tags = ["records"],
    operation_id = "deleteDelivery"
)]
#[delete("/delivery/{awb}")]
pub async fn delete_delivery(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    delete_one(&state, &caller, RecordKind::Delivery, &path.into_inner()).await
}

/// Every pickup and delivery record.
#[utoipa::path(
    get,
    path = "/api/data",
    responses(
        (status = 200, description = "All records", body = ShipmentDump),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["records"],
    operation_id = "dumpRecords"
)]
#[get("/data")]
pub async fn dump_records(
    state: web::Data<HttpState>,
    _caller: Authenticated,
) -> ApiResult<web::Json<ShipmentDump>> {
    Ok(web::Json(state.shipments_query.dump().await?))
}

/// Remove an AWB from both record kinds. Admin only; succeeds when nothing
/// matched.
#[utoipa::path(
    delete,
    path = "/api/data/{awb}",
    params(("awb" = String, Path, description = "Airway bill number")),
    responses(
        (status = 200, description = "Rows removed", body = PurgeResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["records"],
    operation_id = "purgeRecord"
)]
#[delete("/data/{awb}")]
pub async fn purge_record(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<String>,
) -> ApiResult<web::Json<PurgeResponse>> {
    let awb = parse_awb(&path.into_inner(), AWB)?;
    let removed = state.shipments.purge(caller.identity(), awb).await?;
    Ok(web::Json(PurgeResponse {
        message: "Record deleted successfully".to_owned(),
        removed,
    }))
}
