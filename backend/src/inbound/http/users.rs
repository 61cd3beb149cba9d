//! Account API handlers.
//!
//! ```text
//! POST /api/register {"username":"budi","password":"rahasia"}
//! POST /api/login {"username":"budi","password":"rahasia"}
//! GET /api/users
//! DELETE /api/users/{id}
//! PUT /api/users/{id}/role {"role":"admin"}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::{Error, LoginCredentials, LoginValidationError, Role, User, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Authenticated;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_role};

/// Credentials body shared by `POST /api/register` and `POST /api/login`.
///
/// Example JSON:
/// `{"username":"budi","password":"rahasia"}`
#[derive(Deserialize, Serialize, ToSchema)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl TryFrom<CredentialsRequest> for LoginCredentials {
    type Error = LoginValidationError;

    fn try_from(value: CredentialsRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.username, &value.password)
    }
}

/// Response for a successful registration.
#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterResponse {
    #[schema(example = "User registered successfully as admin")]
    pub message: String,
    pub role: Role,
}

/// Response for a successful login.
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    /// Bearer token valid for 24 hours.
    pub token: String,
    #[schema(example = "budi")]
    pub username: String,
    pub role: Role,
}

/// Body for `PUT /api/users/{id}/role`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct RoleUpdateRequest {
    #[schema(example = "admin")]
    pub role: Option<String>,
}

/// Plain confirmation payload.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

fn credentials(payload: CredentialsRequest) -> Result<LoginCredentials, Error> {
    LoginCredentials::try_from(payload).map_err(map_login_validation_error)
}

fn map_login_validation_error(err: LoginValidationError) -> Error {
    match err {
        LoginValidationError::EmptyUsername => {
            Error::invalid_request("please provide username and password")
                .with_details(json!({ "field": "username", "code": "empty_username" }))
        }
        LoginValidationError::UsernameTooLong { max } => {
            Error::invalid_request(format!("username must be at most {max} characters"))
                .with_details(json!({ "field": "username", "code": "username_too_long" }))
        }
        LoginValidationError::EmptyPassword => {
            Error::invalid_request("please provide username and password")
                .with_details(json!({ "field": "password", "code": "empty_password" }))
        }
    }
}

/// Create an account. The very first account becomes an admin.
#[utoipa::path(
    post,
    path = "/api/register",
    request_body = CredentialsRequest,
    responses(
        (status = 201, description = "Account created", body = RegisterResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Username already exists", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "register",
    security([])
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<CredentialsRequest>,
) -> ApiResult<HttpResponse> {
    let credentials = credentials(payload.into_inner())?;
    let role = state.login.register(&credentials).await?;
    Ok(HttpResponse::Created().json(RegisterResponse {
        message: format!("User registered successfully as {role}"),
        role,
    }))
}

/// Exchange credentials for a bearer token.
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Login success", body = LoginResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<CredentialsRequest>,
) -> ApiResult<web::Json<LoginResponse>> {
    let credentials = credentials(payload.into_inner())?;
    let session = state.login.login(&credentials).await?;
    Ok(web::Json(LoginResponse {
        token: session.token.as_str().to_owned(),
        username: session.username.to_string(),
        role: session.role,
    }))
}

/// List every account. Admin only.
#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "Users", body = [User]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    caller: Authenticated,
) -> ApiResult<web::Json<Vec<User>>> {
    let users = state.users.list_users(caller.identity()).await?;
    Ok(web::Json(users))
}

/// Delete an account. Admin only.
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(("id" = i32, Path, description = "Account identifier")),
    responses(
        (status = 200, description = "Account deleted", body = MessageResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "No such account", body = Error)
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
#[delete("/users/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<i32>,
) -> ApiResult<web::Json<MessageResponse>> {
    let id = UserId::new(path.into_inner());
    state.users.delete_user(caller.identity(), id).await?;
    Ok(web::Json(MessageResponse::new("User deleted successfully.")))
}

/// Change an account's role. Admin only.
#[utoipa::path(
    put,
    path = "/api/users/{id}/role",
    params(("id" = i32, Path, description = "Account identifier")),
    request_body = RoleUpdateRequest,
    responses(
        (status = 200, description = "Role updated", body = MessageResponse),
        (status = 400, description = "Invalid role", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "No such account", body = Error)
    ),
    tags = ["users"],
    operation_id = "updateUserRole"
)]
#[put("/users/{id}/role")]
pub async fn update_user_role(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<i32>,
    payload: web::Json<RoleUpdateRequest>,
) -> ApiResult<web::Json<MessageResponse>> {
    let id = UserId::new(path.into_inner());
    let role = parse_role(payload.into_inner().role, FieldName::new("role"))?;
    state.users.update_role(caller.identity(), id, role).await?;
    Ok(web::Json(MessageResponse::new(
        "User role updated successfully.",
    )))
}
