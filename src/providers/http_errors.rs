use reqwest::StatusCode;
use std::error::Error as StdError;
use std::io::ErrorKind;

use crate::model::GenerationError;

fn error_chain_has_connection_refused(err: &(dyn StdError + 'static)) -> bool {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(source) = current {
        if let Some(io_err) = source.downcast_ref::<std::io::Error>()
            && io_err.kind() == ErrorKind::ConnectionRefused
        {
            return true;
        }

        if source
            .to_string()
            .to_ascii_lowercase()
            .contains("connection refused")
        {
            return true;
        }

        current = source.source();
    }

    false
}

fn error_chain_has_timeout(err: &(dyn StdError + 'static)) -> bool {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(source) = current {
        if let Some(io_err) = source.downcast_ref::<std::io::Error>()
            && io_err.kind() == ErrorKind::TimedOut
        {
            return true;
        }

        if source
            .to_string()
            .to_ascii_lowercase()
            .contains("timed out")
        {
            return true;
        }

        current = source.source();
    }

    false
}

pub(crate) fn is_retryable_request_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || error_chain_has_timeout(err)
}

pub(crate) fn request_error(
    err: reqwest::Error,
    url: &str,
    read_timeout_secs: u64,
) -> GenerationError {
    if err.is_timeout() || error_chain_has_timeout(&err) {
        return GenerationError::Timeout {
            url: url.to_string(),
            timeout_secs: read_timeout_secs,
        };
    }

    if err.is_connect() {
        let detail = if error_chain_has_connection_refused(&err) {
            "connection refused; ensure the service is reachable and ENDPOINT_URL is correct"
                .to_string()
        } else {
            format!("connection failed ({err}); check ENDPOINT_URL and network connectivity")
        };
        return GenerationError::Unknown {
            url: url.to_string(),
            detail,
        };
    }

    GenerationError::Unknown {
        url: url.to_string(),
        detail: err.to_string(),
    }
}

pub(crate) fn status_error(status: StatusCode, body: &str, url: &str) -> GenerationError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GenerationError::AuthFailure {
            status: status.as_u16(),
        },
        StatusCode::TOO_MANY_REQUESTS => GenerationError::Throttled {
            status: status.as_u16(),
        },
        _ => GenerationError::Unknown {
            url: url.to_string(),
            detail: format!("status {status}: {body}"),
        },
    }
}
