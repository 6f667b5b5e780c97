use gw_domain::Error;

/// Maps an HTTP status code to the closed error-kind set (spec §4.2).
pub fn from_status(status: u16, body: impl Into<String>) -> Error {
    let body = body.into();
    match status {
        400 => Error::Validation(body),
        401 | 403 => Error::Authentication(body),
        404 => Error::NotFound(body),
        429 => Error::RateLimit(body),
        500..=599 => Error::ServerError(body),
        _ => Error::Other(format!("unexpected status {status}: {body}")),
    }
}

/// Maps a transport-level `reqwest::Error` (connection refused, DNS
/// failure, TLS handshake, or a client-side timeout) to the closed set.
pub fn from_reqwest(err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::Timeout(err.to_string())
    } else if err.is_connect() {
        Error::Connection(err.to_string())
    } else {
        Error::Other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_each_status_band() {
        assert!(matches!(from_status(400, ""), Error::Validation(_)));
        assert!(matches!(from_status(401, ""), Error::Authentication(_)));
        assert!(matches!(from_status(403, ""), Error::Authentication(_)));
        assert!(matches!(from_status(404, ""), Error::NotFound(_)));
        assert!(matches!(from_status(429, ""), Error::RateLimit(_)));
        assert!(matches!(from_status(500, ""), Error::ServerError(_)));
        assert!(matches!(from_status(503, ""), Error::ServerError(_)));
        assert!(matches!(from_status(418, ""), Error::Other(_)));
    }
}
