//! Spreadsheet upload handler.
//!
//! ```text
//! POST /api/upload  (multipart/form-data, field "file")
//! ```

use actix_multipart::{Field, Multipart};
use actix_web::{post, web};
use futures_util::StreamExt;
use serde::Serialize;
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::{Error, IngestionSummary};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Authenticated;
use crate::inbound::http::state::HttpState;

/// Multipart field carrying the workbook.
pub const FILE_FIELD: &str = "file";

/// Response for a processed workbook.
#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    #[schema(example = "File processed and data saved successfully")]
    pub message: String,
    #[serde(flatten)]
    pub summary: IngestionSummary,
}

/// Multipart body documented for `POST /api/upload`.
#[derive(ToSchema)]
pub struct UploadForm {
    /// `.xlsx` or `.xls` workbook with `Pickup` and `Delivery` sheets.
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

fn multipart_error(err: impl std::fmt::Display) -> Error {
    Error::invalid_request(format!("malformed upload: {err}"))
}

async fn read_field(mut field: Field, limit: usize) -> Result<Vec<u8>, Error> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(multipart_error)?;
        if bytes.len() + chunk.len() > limit {
            return Err(
                Error::invalid_request(format!("file exceeds the {limit} byte upload limit"))
                    .with_details(json!({ "field": FILE_FIELD, "code": "too_large" })),
            );
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

/// Read the first `file` field; other fields are drained and ignored.
async fn workbook_bytes(mut payload: Multipart, limit: usize) -> Result<Vec<u8>, Error> {
    while let Some(field) = payload.next().await {
        let field = field.map_err(multipart_error)?;
        if field.name() == Some(FILE_FIELD) {
            return read_field(field, limit).await;
        }
    }
    Err(Error::invalid_request("no file uploaded")
        .with_details(json!({ "field": FILE_FIELD, "code": "missing_field" })))
}

/// Ingest a workbook's `Pickup` and `Delivery` sheets in one transaction.
///
/// Rows without an AWB are skipped and counted; any other rejected cell
/// fails the whole upload and nothing is written.
#[utoipa::path(
    post,
    path = "/api/upload",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Workbook ingested", body = UploadResponse),
        (status = 400, description = "Missing file, sheet or invalid cell", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["records"],
    operation_id = "uploadWorkbook"
)]
#[post("/upload")]
pub async fn upload_workbook(
    state: web::Data<HttpState>,
    caller: Authenticated,
    payload: Multipart,
) -> ApiResult<web::Json<UploadResponse>> {
    let bytes = workbook_bytes(payload, state.upload_limit_bytes).await?;
    if bytes.is_empty() {
        return Err(Error::invalid_request("no file uploaded")
            .with_details(json!({ "field": FILE_FIELD, "code": "empty_file" })));
    }
    let summary = state.ingestion.ingest(caller.identity(), bytes).await?;
    Ok(web::Json(UploadResponse {
        message: "File processed and data saved successfully".to_owned(),
        summary,
    }))
}
