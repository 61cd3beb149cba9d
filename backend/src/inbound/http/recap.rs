//! Per-user recap handler.
//!
//! ```text
//! GET /api/recap
//! ```

use actix_web::{get, web};

use crate::domain::{Error, RecapRow};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Authenticated;
use crate::inbound::http::state::HttpState;

/// Pickup count, delivery outcomes and COD total for every submitter,
/// ordered by username.
#[utoipa::path(
    get,
    path = "/api/recap",
    responses(
        (status = 200, description = "One row per submitter", body = [RecapRow]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["stats"],
    operation_id = "recap"
)]
#[get("/recap")]
pub async fn recap(
    state: web::Data<HttpState>,
    _caller: Authenticated,
) -> ApiResult<web::Json<Vec<RecapRow>>> {
    Ok(web::Json(state.shipments_query.recap().await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Username;
    use crate::domain::ports::MockShipmentQuery;
    use crate::inbound::http::test_utils::{HttpStateBuilder, USER_TOKEN, bearer};
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use serde_json::{Value, json};

    #[actix_web::test]
    async fn recap_rows_serialise_with_snake_case_keys() {
        let mut query = MockShipmentQuery::new();
        query.expect_recap().times(1).return_once(|| {
            Ok(vec![RecapRow {
                username: Username::new("budi").expect("valid username"),
                pickup_count: 3,
                delivery_success_count: 2,
                delivery_failed_count: 1,
                total_cod: 150_000.0,
            }])
        });
        let state = HttpStateBuilder::new().shipments_query(query).build();
        let app = actix_test::init_service(
            App::new()
                .app_data(state)
                .service(web::scope("/api").service(recap)),
        )
        .await;

        let request = actix_test::TestRequest::get()
            .uri("/api/recap")
            .insert_header(bearer(USER_TOKEN))
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(
            body,
            json!([{
                "username": "budi",
                "pickup_count": 3,
                "delivery_success_count": 2,
                "delivery_failed_count": 1,
                "total_cod": 150_000.0
            }])
        );
    }

    #[actix_web::test]
    async fn recap_requires_a_token() {
        let state = HttpStateBuilder::new().build();
        let app = actix_test::init_service(
            App::new()
                .app_data(state)
                .service(web::scope("/api").service(recap)),
        )
        .await;
        let request = actix_test::TestRequest::get().uri("/api/recap").to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
