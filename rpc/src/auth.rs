//! Caller identity asserted by the upstream identity provider.
//!
//! The provider authenticates the user and forwards `x-user-id`,
//! `x-user-role` and optionally `x-user-name`. This service trusts those
//! headers for its role guards.

use accredit_types::{Role, UserId};
use accredit_workflow::Caller;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;

use crate::error::{ApiError, ErrorResponse};
use crate::server::AppState;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";
pub const USER_NAME_HEADER: &str = "x-user-name";

/// Extractor for an authenticated [`Caller`].
#[derive(Clone, Debug)]
pub struct Authenticated(pub Caller);

#[async_trait]
impl FromRequestParts<AppState> for Authenticated {
    type Rejection = ErrorResponse;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        caller_from_headers(&parts.headers)
            .map(Authenticated)
            .map_err(|e| state.fail(e))
    }
}

pub fn caller_from_headers(headers: &HeaderMap) -> Result<Caller, ApiError> {
    let id = header(headers, USER_ID_HEADER)?
        .ok_or_else(|| ApiError::Unauthenticated(format!("{USER_ID_HEADER} is required")))?;
    let id = UserId::new(id).map_err(|e| ApiError::Unauthenticated(e.to_string()))?;

    let role = header(headers, USER_ROLE_HEADER)?
        .ok_or_else(|| ApiError::Unauthenticated(format!("{USER_ROLE_HEADER} is required")))?;
    let role = Role::parse(role)
        .ok_or_else(|| ApiError::Unauthenticated(format!("unknown role {role:?}")))?;

    let name = header(headers, USER_NAME_HEADER)?.unwrap_or_default();
    Ok(Caller::new(id, role, name))
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Result<Option<&'a str>, ApiError> {
    match headers.get(name) {
        None => Ok(None),
        Some(v) => v
            .to_str()
            .map(|s| Some(s.trim()).filter(|s| !s.is_empty()))
            .map_err(|_| ApiError::Unauthenticated(format!("{name} is not valid text"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut h = HeaderMap::new();
        for (k, v) in pairs {
            h.insert(*k, HeaderValue::from_str(v).unwrap());
        }
        h
    }

    #[test]
    fn parses_full_identity() {
        let caller = caller_from_headers(&headers(&[
            (USER_ID_HEADER, "faculty-1"),
            (USER_ROLE_HEADER, "faculty"),
            (USER_NAME_HEADER, "Dr. Rao"),
        ]))
        .unwrap();
        assert_eq!(caller.id.as_str(), "faculty-1");
        assert_eq!(caller.role, Role::Reviewer);
        assert_eq!(caller.display_name, "Dr. Rao");
    }

    #[test]
    fn name_is_optional() {
        let caller = caller_from_headers(&headers(&[
            (USER_ID_HEADER, "student-1"),
            (USER_ROLE_HEADER, "student"),
        ]))
        .unwrap();
        assert_eq!(caller.display_name, "");
    }

    #[test]
    fn missing_or_unknown_role_is_rejected() {
        assert!(caller_from_headers(&headers(&[(USER_ID_HEADER, "u")])).is_err());
        assert!(caller_from_headers(&headers(&[
            (USER_ID_HEADER, "u"),
            (USER_ROLE_HEADER, "root"),
        ]))
        .is_err());
        assert!(caller_from_headers(&headers(&[(USER_ROLE_HEADER, "admin")])).is_err());
    }
}
