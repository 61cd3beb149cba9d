//! Bearer-token extraction for protected handlers.
//!
//! Handlers that take an [`Authenticated`] argument only run once the
//! `Authorization: Bearer <token>` header has been verified against the
//! session port; everything else is rejected with `401` before the handler
//! body executes.

use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::{Ready, ready};
use tracing::debug;

use crate::domain::{Error, Identity};

use super::state::HttpState;

const BEARER_PREFIX: &str = "Bearer ";

/// Identity of the caller, resolved from the bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authenticated(Identity);

impl Authenticated {
    /// Verified claims.
    pub fn identity(&self) -> &Identity {
        &self.0
    }
}

fn bearer_token(req: &HttpRequest) -> Result<&str, Error> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| Error::unauthorized("not authorized, no token"))?;
    let value = header
        .to_str()
        .map_err(|_| Error::unauthorized("not authorized, token failed"))?;
    value
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| Error::unauthorized("not authorized, no token"))
}

fn authenticate(req: &HttpRequest) -> Result<Authenticated, Error> {
    let state = req
        .app_data::<web::Data<HttpState>>()
        .ok_or_else(|| Error::internal("HTTP state is not registered"))?;
    let token = bearer_token(req)?;
    state.sessions.authenticate(token).map(Authenticated).map_err(|err| {
        debug!(code = ?err.code(), "bearer token rejected");
        err
    })
}

impl FromRequest for Authenticated {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}
