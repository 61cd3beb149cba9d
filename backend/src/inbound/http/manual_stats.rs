//! Manual daily statistics handlers.
//!
//! ```text
//! GET /api/manual-stats
//! POST /api/manual-stats {"date":"2024-07-20","delivery_success":10,"pickup_failed":"1"}
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::domain::{Error, ManualStats, StoredManualStats, Username};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Authenticated;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, Numeric, invalid_value_error, optional_text, parse_counter, require_date,
};

/// Counters for one date. Absent counters are recorded as 0.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ManualStatsRequest {
    #[schema(example = "2024-07-20")]
    pub date: Option<String>,
    #[schema(value_type = Option<u32>)]
    pub delivery_success: Option<Numeric>,
    #[schema(value_type = Option<u32>)]
    pub delivery_pending: Option<Numeric>,
    #[schema(value_type = Option<u32>)]
    pub pickup_success: Option<Numeric>,
    #[schema(value_type = Option<u32>)]
    pub pickup_failed: Option<Numeric>,
    #[schema(value_type = Option<u32>)]
    pub cod_packages_count: Option<Numeric>,
    /// Defaults to the caller.
    pub submitted_by: Option<String>,
}

impl ManualStatsRequest {
    fn into_stats(self, caller: &Username) -> Result<ManualStats, Error> {
        let submitted_by = match optional_text(self.submitted_by) {
            None => caller.clone(),
            Some(raw) => Username::new(&raw).map_err(|err| {
                invalid_value_error(FieldName::new("submitted_by"), &raw, err.to_string())
            })?,
        };
        Ok(ManualStats {
            date: require_date(self.date, FieldName::new("date"))?,
            delivery_success: parse_counter(
                self.delivery_success,
                FieldName::new("delivery_success"),
            )?,
            delivery_pending: parse_counter(
                self.delivery_pending,
                FieldName::new("delivery_pending"),
            )?,
            pickup_success: parse_counter(self.pickup_success, FieldName::new("pickup_success"))?,
            pickup_failed: parse_counter(self.pickup_failed, FieldName::new("pickup_failed"))?,
            cod_packages_count: parse_counter(
                self.cod_packages_count,
                FieldName::new("cod_packages_count"),
            )?,
            submitted_by,
        })
    }
}

/// Every recorded date, newest first.
#[utoipa::path(
    get,
    path = "/api/manual-stats",
    responses(
        (status = 200, description = "Recorded counters", body = [StoredManualStats]),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["stats"],
    operation_id = "listManualStats"
)]
#[get("/manual-stats")]
pub async fn list_manual_stats(
    state: web::Data<HttpState>,
    _caller: Authenticated,
) -> ApiResult<web::Json<Vec<StoredManualStats>>> {
    Ok(web::Json(state.manual_stats_query.list().await?))
}

/// Insert or replace the counters for a date.
#[utoipa::path(
    post,
    path = "/api/manual-stats",
    request_body = ManualStatsRequest,
    responses(
        (status = 201, description = "Counters stored", body = StoredManualStats),
        (status = 400, description = "Missing date or invalid counter", body = Error),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["stats"],
    operation_id = "recordManualStats"
)]
#[post("/manual-stats")]
pub async fn record_manual_stats(
    state: web::Data<HttpState>,
    caller: Authenticated,
    payload: web::Json<ManualStatsRequest>,
) -> ApiResult<HttpResponse> {
    let stats = payload.into_inner().into_stats(&caller.identity().username)?;
    let stored = state.manual_stats.record(stats).await?;
    Ok(HttpResponse::Created().json(stored))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EventDate;
    use crate::domain::ports::{MockManualStatsCommand, MockManualStatsQuery};
    use crate::inbound::http::test_utils::{HttpStateBuilder, USER_TOKEN, bearer};
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use chrono::NaiveDate;
    use rstest::rstest;
    use serde_json::{Value, json};

    async fn send(
        state: web::Data<HttpState>,
        request: actix_test::TestRequest,
    ) -> (StatusCode, Value) {
        let app = actix_test::init_service(
            App::new().app_data(state).service(
                web::scope("/api")
                    .service(list_manual_stats)
                    .service(record_manual_stats),
            ),
        )
        .await;
        let response = actix_test::call_service(&app, request.to_request()).await;
        let status = response.status();
        let body = actix_test::read_body(response).await;
        (status, serde_json::from_slice(&body).expect("JSON body"))
    }

    fn stored(stats: ManualStats) -> StoredManualStats {
        StoredManualStats {
            id: 1,
            stats,
            created_at: NaiveDate::from_ymd_opt(2024, 7, 20)
                .and_then(|d| d.and_hms_opt(9, 0, 0))
                .expect("valid timestamp"),
        }
    }

    #[rstest]
    #[actix_web::test]
    async fn absent_counters_default_to_zero_and_submitter_to_caller() {
        let mut command = MockManualStatsCommand::new();
        command
            .expect_record()
            .withf(|stats| {
                stats.date == EventDate::parse("2024-07-20").expect("valid date")
                    && stats.delivery_success == 10
                    && stats.pickup_failed == 1
                    && stats.delivery_pending == 0
                    && stats.submitted_by.as_ref() == "budi"
            })
            .times(1)
            .return_once(|stats| Ok(stored(stats)));
        let state = HttpStateBuilder::new().manual_stats(command).build();

        let (status, body) = send(
            state,
            actix_test::TestRequest::post()
                .uri("/api/manual-stats")
                .insert_header(bearer(USER_TOKEN))
                .set_json(json!({
                    "date": "2024-07-20",
                    "delivery_success": 10,
                    "pickup_failed": "1"
                })),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["date"], "2024-07-20");
        assert_eq!(body["submitted_by"], "budi");
        assert_eq!(body["cod_packages_count"], 0);
    }

    #[rstest]
    #[actix_web::test]
    async fn explicit_submitter_is_kept() {
        let mut command = MockManualStatsCommand::new();
        command
            .expect_record()
            .withf(|stats| stats.submitted_by.as_ref() == "sari")
            .return_once(|stats| Ok(stored(stats)));
        let state = HttpStateBuilder::new().manual_stats(command).build();

        let (status, _) = send(
            state,
            actix_test::TestRequest::post()
                .uri("/api/manual-stats")
                .insert_header(bearer(USER_TOKEN))
                .set_json(json!({ "date": "2024-07-20", "submitted_by": "sari" })),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
    }

    #[rstest]
    #[case(json!({ "delivery_success": 1 }), "date")]
    #[case(json!({ "date": "2024-07-20", "pickup_success": -1 }), "pickup_success")]
    #[case(json!({ "date": "2024-07-20", "pickup_success": 1.5 }), "pickup_success")]
    #[case(json!({ "date": "2024-07-20", "delivery_pending": "banyak" }), "delivery_pending")]
    #[actix_web::test]
    async fn invalid_bodies_never_reach_the_port(#[case] body: Value, #[case] field: &str) {
        let state = HttpStateBuilder::new().build();
        let (status, response) = send(
            state,
            actix_test::TestRequest::post()
                .uri("/api/manual-stats")
                .insert_header(bearer(USER_TOKEN))
                .set_json(body),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["details"]["field"], field);
    }

    #[rstest]
    #[actix_web::test]
    async fn listing_returns_rows_as_stored() {
        let mut query = MockManualStatsQuery::new();
        query.expect_list().return_once(|| {
            Ok(vec![stored(ManualStats {
                date: EventDate::parse("2024-07-20").expect("valid date"),
                delivery_success: 3,
                delivery_pending: 0,
                pickup_success: 2,
                pickup_failed: 0,
                cod_packages_count: 1,
                submitted_by: Username::new("budi").expect("valid username"),
            })])
        });
        let state = HttpStateBuilder::new().manual_stats_query(query).build();

        let (status, body) = send(
            state,
            actix_test::TestRequest::get()
                .uri("/api/manual-stats")
                .insert_header(bearer(USER_TOKEN)),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["id"], 1);
        assert_eq!(body[0]["delivery_success"], 3);
    }
}
