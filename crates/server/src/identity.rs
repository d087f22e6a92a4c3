// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Caller identity extraction for the server.
//!
//! Authentication happens upstream. The fronting identity provider forwards
//! the verified pilot in request headers, and this module turns those
//! headers into an [`AuthenticatedActor`] plus the request's audit cause.

use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};
use va_career_api::{AuthenticatedActor, Role};
use va_career_audit::Cause;

/// Header carrying the verified pilot identifier.
pub const PILOT_ID_HEADER: &str = "x-pilot-id";
/// Header carrying the pilot's callsign.
pub const CALLSIGN_HEADER: &str = "x-pilot-callsign";
/// Header carrying the caller's role.
pub const ROLE_HEADER: &str = "x-pilot-role";
/// Header carrying the identity provider's career access flag.
pub const CAREER_APPROVED_HEADER: &str = "x-career-approved";
/// Header carrying a caller-supplied request identifier.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

static REQUEST_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Extractor for the verified caller.
///
/// # Usage
///
/// ```ignore
/// async fn my_handler(caller: Caller) -> Result<Json<Response>, HttpError> {
///     let cause: Cause = caller.cause("Dispatch leg");
///     // caller.actor: AuthenticatedActor
/// }
/// ```
///
/// # Errors
///
/// Returns HTTP 401 Unauthorized if the pilot header is missing or blank,
/// or if a header is not valid text or names an unknown role.
#[derive(Debug, Clone)]
pub struct Caller {
    /// The verified caller.
    pub actor: AuthenticatedActor,
    /// Identifier tying audit events to this request.
    pub request_id: String,
}

impl Caller {
    /// Builds the audit cause for an action taken by this request.
    #[must_use]
    pub fn cause(&self, description: &str) -> Cause {
        Cause::new(self.request_id.clone(), description.to_string())
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Caller {
    type Rejection = IdentityError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let caller: Self = caller_from_headers(&parts.headers)?;
        debug!(
            pilot_id = %caller.actor.pilot_id,
            role = ?caller.actor.role,
            request_id = %caller.request_id,
            "Caller identified"
        );
        Ok(caller)
    }
}

fn header_text<'a>(headers: &'a HeaderMap, name: &str) -> Result<Option<&'a str>, IdentityError> {
    headers
        .get(name)
        .map(|value| {
            value.to_str().map(str::trim).map_err(|_| {
                warn!(header = name, "Identity header is not valid text");
                IdentityError::InvalidHeader(name.to_string())
            })
        })
        .transpose()
}

fn caller_from_headers(headers: &HeaderMap) -> Result<Caller, IdentityError> {
    let pilot_id: &str = header_text(headers, PILOT_ID_HEADER)?
        .filter(|value| !value.is_empty())
        .ok_or_else(|| {
            debug!("Missing pilot identity header");
            IdentityError::MissingPilotId
        })?;

    let callsign: &str = header_text(headers, CALLSIGN_HEADER)?
        .filter(|value| !value.is_empty())
        .unwrap_or(pilot_id);

    let role: Role = match header_text(headers, ROLE_HEADER)? {
        Some(value) => Role::from_str(value).map_err(|e| {
            warn!(error = %e, "Rejected identity role");
            IdentityError::UnknownRole(value.to_string())
        })?,
        None => Role::Pilot,
    };

    let career_approved: bool = header_text(headers, CAREER_APPROVED_HEADER)?
        .is_some_and(|value| matches!(value.to_ascii_lowercase().as_str(), "true" | "1" | "yes"));

    let request_id: String = header_text(headers, REQUEST_ID_HEADER)?
        .filter(|value| !value.is_empty())
        .map_or_else(
            || format!("req-{}", REQUEST_COUNTER.fetch_add(1, Ordering::Relaxed)),
            str::to_string,
        );

    Ok(Caller {
        actor: AuthenticatedActor::new(pilot_id, callsign, role, career_approved),
        request_id,
    })
}

/// Identity extraction errors.
#[derive(Debug)]
pub enum IdentityError {
    /// The pilot identifier header is missing or blank.
    MissingPilotId,
    /// A header value is not valid text.
    InvalidHeader(String),
    /// The role header names no known role.
    UnknownRole(String),
}

impl IntoResponse for IdentityError {
    fn into_response(self) -> Response {
        let message: String = match self {
            Self::MissingPilotId => format!("Missing {PILOT_ID_HEADER} header"),
            Self::InvalidHeader(name) => format!("Invalid {name} header"),
            Self::UnknownRole(role) => format!("Unknown role '{role}'"),
        };
        let body: serde_json::Value = serde_json::json!({
            "error": "Unauthenticated",
            "message": message,
        });
        (StatusCode::UNAUTHORIZED, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map: HeaderMap = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_caller_defaults_to_unapproved_pilot() {
        let map: HeaderMap = headers(&[(PILOT_ID_HEADER, "pilot-1")]);
        let caller: Caller = caller_from_headers(&map).unwrap();
        assert_eq!(caller.actor.pilot_id.value(), "pilot-1");
        assert_eq!(caller.actor.callsign, "pilot-1");
        assert_eq!(caller.actor.role, Role::Pilot);
        assert!(!caller.actor.career_approved);
        assert!(caller.request_id.starts_with("req-"));
    }

    #[test]
    fn test_caller_reads_every_header() {
        let caller: Caller = caller_from_headers(&headers(&[
            (PILOT_ID_HEADER, "chief"),
            (CALLSIGN_HEADER, "VAC001"),
            (ROLE_HEADER, "career-admin"),
            (CAREER_APPROVED_HEADER, "TRUE"),
            (REQUEST_ID_HEADER, "trace-77"),
        ]))
        .unwrap();
        assert_eq!(caller.actor.callsign, "VAC001");
        assert_eq!(caller.actor.role, Role::CareerAdmin);
        assert!(caller.actor.career_approved);
        assert_eq!(caller.cause("Approve PIREP").id, "trace-77");
    }

    #[test]
    fn test_missing_or_blank_pilot_is_rejected() {
        assert!(matches!(
            caller_from_headers(&HeaderMap::new()),
            Err(IdentityError::MissingPilotId)
        ));
        assert!(matches!(
            caller_from_headers(&headers(&[(PILOT_ID_HEADER, "  ")])),
            Err(IdentityError::MissingPilotId)
        ));
    }

    #[test]
    fn test_unknown_role_is_rejected() {
        let result: Result<Caller, IdentityError> =
            caller_from_headers(&headers(&[(PILOT_ID_HEADER, "p"), (ROLE_HEADER, "captain")]));
        assert!(matches!(result, Err(IdentityError::UnknownRole(role)) if role == "captain"));
    }

    #[test]
    fn test_generated_request_ids_are_unique() {
        let map: HeaderMap = headers(&[(PILOT_ID_HEADER, "pilot-1")]);
        let first: Caller = caller_from_headers(&map).unwrap();
        let second: Caller = caller_from_headers(&map).unwrap();
        assert_ne!(first.request_id, second.request_id);
    }
}
