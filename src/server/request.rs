use crate::dispatcher::{HeaderVec, IncomingRequest, REQUEST_ID_HEADER};
use crate::ids::RequestId;
use http::Method;
use may_minihttp::Request;
use std::io::Read;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Why a raw request could not become an [`IncomingRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestRejection {
    /// Method token is not valid HTTP
    BadMethod(String),
    /// Body exceeded the configured byte limit
    PayloadTooLarge { limit: usize },
    /// Reading the body from the socket failed
    BodyRead(String),
}

impl RequestRejection {
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            RequestRejection::BadMethod(_) | RequestRejection::BodyRead(_) => 400,
            RequestRejection::PayloadTooLarge { .. } => 413,
        }
    }

    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            RequestRejection::BadMethod(m) => format!("Invalid method '{m}'"),
            RequestRejection::PayloadTooLarge { limit } => {
                format!("Request body exceeds {limit} bytes")
            }
            RequestRejection::BodyRead(e) => format!("Could not read request body: {e}"),
        }
    }
}

/// Split a request target into path and raw query.
#[must_use]
pub fn split_target(target: &str) -> (&str, &str) {
    target.split_once('?').unwrap_or((target, ""))
}

/// Read at most `limit` bytes of body.
///
/// # Errors
///
/// Fails with [`RequestRejection::PayloadTooLarge`] when more than `limit`
/// bytes are available.
pub fn read_body_limited<R: Read>(reader: R, limit: usize) -> Result<Vec<u8>, RequestRejection> {
    let mut body = Vec::new();
    let cap = u64::try_from(limit).unwrap_or(u64::MAX).saturating_add(1);
    reader
        .take(cap)
        .read_to_end(&mut body)
        .map_err(|e| RequestRejection::BodyRead(e.to_string()))?;
    if body.len() > limit {
        return Err(RequestRejection::PayloadTooLarge { limit });
    }
    Ok(body)
}

/// Convert a `may_minihttp::Request` into an [`IncomingRequest`].
///
/// Header names are lowercased. A valid `x-request-id` header is adopted as
/// the request id; otherwise a new one is generated.
///
/// # Errors
///
/// See [`RequestRejection`].
pub fn parse_request(req: Request, max_body_bytes: usize) -> Result<IncomingRequest, RequestRejection> {
    let method_raw = req.method().to_string();
    let method = Method::from_bytes(method_raw.as_bytes())
        .map_err(|_| RequestRejection::BadMethod(method_raw.clone()))?;
    let (path, query) = split_target(req.path());
    let (path, query) = (path.to_string(), query.to_string());

    // Headers must be read before the body consumes the request.
    let headers: HeaderVec = req
        .headers()
        .iter()
        .map(|h| {
            (
                Arc::from(h.name.to_ascii_lowercase()),
                String::from_utf8_lossy(h.value).into_owned(),
            )
        })
        .collect();
    debug!(header_count = headers.len(), "Headers extracted");

    let request_id = RequestId::adopt_or_mint(
        headers
            .iter()
            .find(|(k, _)| k.as_ref() == REQUEST_ID_HEADER)
            .map(|(_, v)| v.as_str()),
    );

    let body = match read_body_limited(req.body(), max_body_bytes) {
        Ok(b) => b,
        Err(e) => {
            warn!(
                request_id = %request_id,
                method = %method,
                path = %path,
                error = %e.detail(),
                "Request body rejected"
            );
            return Err(e);
        }
    };

    info!(
        request_id = %request_id,
        method = %method,
        path = %path,
        query_len = query.len(),
        body_bytes = body.len(),
        "HTTP request parsed"
    );

    Ok(IncomingRequest {
        request_id,
        method,
        path,
        query,
        headers,
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_target() {
        assert_eq!(split_target("/items/?q=1"), ("/items/", "q=1"));
        assert_eq!(split_target("/"), ("/", ""));
        assert_eq!(split_target("/a?"), ("/a", ""));
    }

    #[test]
    fn test_body_limit() {
        assert_eq!(read_body_limited(&b"abcd"[..], 4).unwrap(), b"abcd");
        assert_eq!(
            read_body_limited(&b"abcde"[..], 4).unwrap_err(),
            RequestRejection::PayloadTooLarge { limit: 4 }
        );
        assert_eq!(RequestRejection::PayloadTooLarge { limit: 4 }.status(), 413);
    }
}
