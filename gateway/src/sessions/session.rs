//! Request-level session helpers: extracting, beginning, and ending a
//! session against an Actix-web request/response. Grounded in
//! `sessions/session.go`.

use super::state::SessionState;
use super::store::SessionStore;
use actix_web::HttpRequest;
use shared::auth::SessionId;
use shared::errors::ApiError;

const HEADER_AUTHORIZATION: &str = "Authorization";
const PARAM_AUTHORIZATION: &str = "auth";
const SCHEME_BEARER: &str = "Bearer ";

/// Mints a session id, persists `state` under it, and returns the id so
/// the caller can set the `Authorization: Bearer <id>` response header.
pub async fn begin_session(
    signing_key: &str,
    store: &dyn SessionStore,
    state: SessionState,
) -> Result<SessionId, ApiError> {
    let session_id = SessionId::mint(signing_key)
        .map_err(|e| ApiError::InternalError { message: e.to_string() })?;

    store.save(session_id.as_str(), &state).await?;

    Ok(session_id)
}

/// Extracts and verifies the session id carried by a request: the
/// `Authorization: Bearer <id>` header, falling back to `?auth=<id>`.
pub fn extract_session_id(req: &HttpRequest, signing_key: &str) -> Result<SessionId, ApiError> {
    let raw = match req.headers().get(HEADER_AUTHORIZATION) {
        Some(value) => value.to_str().map_err(|_| ApiError::MissingSession)?.to_string(),
        None => {
            let query = req.query_string();
            let auth_param = url_query_param(query, PARAM_AUTHORIZATION);
            match auth_param {
                Some(v) if !v.is_empty() => v,
                _ => return Err(ApiError::MissingSession),
            }
        }
    };

    let token = raw.strip_prefix(SCHEME_BEARER).unwrap_or(raw.as_str());
    SessionId::verify(token, signing_key).map_err(|_| ApiError::InvalidSession)
}

fn url_query_param(query: &str, name: &str) -> Option<String> {
    query.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=')?;
        if k == name {
            Some(urlencoding_decode(v))
        } else {
            None
        }
    })
}

/// Minimal percent-decoding for query parameters: the session token
/// alphabet (`base64::URL_SAFE`) only ever needs `%3D` for `=` padding,
/// plus `%20` for the literal space in the `?auth=Bearer%20<id>` form
/// (`Authorization` header values can't carry a raw space unescaped).
fn urlencoding_decode(s: &str) -> String {
    s.replace("%3D", "=").replace("%2B", "+").replace("%2F", "/").replace("%20", " ")
}

/// Resolves the authenticated [`SessionState`] for a request.
pub async fn get_state(
    req: &HttpRequest,
    signing_key: &str,
    store: &dyn SessionStore,
) -> Result<(SessionId, SessionState), ApiError> {
    let session_id = extract_session_id(req, signing_key)?;
    let state = store.get(session_id.as_str()).await?;
    Ok((session_id, state))
}

/// Ends the session carried by a request, if any.
pub async fn end_session(
    req: &HttpRequest,
    signing_key: &str,
    store: &dyn SessionStore,
) -> Result<SessionId, ApiError> {
    let session_id = extract_session_id(req, signing_key)?;
    store.delete(session_id.as_str()).await?;
    Ok(session_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_query_param_finds_value() {
        assert_eq!(url_query_param("auth=abc&x=1", "auth"), Some("abc".to_string()));
        assert_eq!(url_query_param("x=1", "auth"), None);
    }

    #[test]
    fn urlencoding_decode_handles_padding() {
        assert_eq!(urlencoding_decode("abc%3D%3D"), "abc==");
    }

    #[test]
    fn urlencoding_decode_handles_bearer_space() {
        assert_eq!(urlencoding_decode("Bearer%20abc%3D%3D"), "Bearer abc==");
    }

    #[test]
    fn url_query_param_decodes_bearer_scheme_for_ws_auth() {
        let value = url_query_param("auth=Bearer%20abc%3D%3D", "auth").unwrap();
        assert_eq!(value.strip_prefix(SCHEME_BEARER), Some("abc=="));
    }
}
