//! Correlation identifier carried by each HTTP request.
//!
//! The identifier lives in Tokio task-local storage while the request is
//! handled, so logs and [`crate::domain::Error`] payloads can pick it up
//! without threading it through every call. Task-locals do not follow
//! `tokio::spawn` or `spawn_blocking`; wrap such work in [`TraceId::scope`]
//! when it must stay correlated.

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use tokio::task_local;
use uuid::Uuid;

task_local! {
    static CURRENT: TraceId;
}

/// UUID correlating a request with its logs and error body.
///
/// # Examples
/// ```
/// use courier_backend::TraceId;
///
/// let id: TraceId = "6f9619ff-8b86-d011-b42d-00cf4fc964ff".parse().expect("uuid");
/// assert_eq!(id.to_string(), "6f9619ff-8b86-d011-b42d-00cf4fc964ff");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceId(Uuid);

impl TraceId {
    /// Fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Reuse a caller-supplied identifier when it is a well-formed UUID.
    ///
    /// The nil UUID is refused so clients cannot collapse every request onto
    /// one identifier by accident.
    #[must_use]
    pub fn from_header(raw: &str) -> Option<Self> {
        raw.trim()
            .parse::<Self>()
            .ok()
            .filter(|id| !id.0.is_nil())
    }

    /// Identifier of the request being handled, if any.
    #[must_use]
    pub fn current() -> Option<Self> {
        CURRENT.try_with(|id| *id).ok()
    }

    /// Run `fut` with `trace_id` as the current identifier.
    pub async fn scope<Fut>(trace_id: Self, fut: Fut) -> Fut::Output
    where
        Fut: Future,
    {
        CURRENT.scope(trace_id, fut).await
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for TraceId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}
