//! Actor-context extraction from gateway headers.
//!
//! Authentication itself lives in front of this service; the gateway
//! forwards the authenticated user's identity and organisational scope as
//! headers, which we parse into an explicit [`RequestContext`].

use std::str::FromStr;

use axum::http::HeaderMap;
use presencia_core::employee::RequestContext;
use uuid::Uuid;

use crate::error::ApiError;

pub const ACTOR_ID_HEADER: &str = "x-actor-id";
pub const ACTOR_NAME_HEADER: &str = "x-actor-name";
pub const ACTOR_LEVEL_HEADER: &str = "x-actor-level";
pub const GENERAL_DIRECTION_HEADER: &str = "x-general-direction";
pub const DIRECTION_HEADER: &str = "x-direction";
pub const SUBDIRECTORATE_HEADER: &str = "x-subdirectorate";

fn raw<'a>(headers: &'a HeaderMap, name: &str) -> Result<&'a str, ApiError> {
  headers
    .get(name)
    .and_then(|value| value.to_str().ok())
    .ok_or_else(|| ApiError::BadRequest(format!("missing or malformed header {name}")))
}

fn parsed<T: FromStr>(headers: &HeaderMap, name: &str) -> Result<T, ApiError> {
  raw(headers, name)?
    .parse()
    .map_err(|_| ApiError::BadRequest(format!("cannot parse header {name}")))
}

/// Build the actor context for one request, or reject it as malformed.
pub fn context_from_headers(headers: &HeaderMap) -> Result<RequestContext, ApiError> {
  Ok(RequestContext {
    actor_user_id:        parsed::<Uuid>(headers, ACTOR_ID_HEADER)?,
    actor_name:           raw(headers, ACTOR_NAME_HEADER)?.to_string(),
    level:                parsed(headers, ACTOR_LEVEL_HEADER)?,
    general_direction_id: parsed(headers, GENERAL_DIRECTION_HEADER)?,
    direction_id:         parsed(headers, DIRECTION_HEADER)?,
    subdirectorate_id:    parsed(headers, SUBDIRECTORATE_HEADER)?,
  })
}
