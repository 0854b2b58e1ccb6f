use std::error::Error as StdError;
use std::io::ErrorKind;

use anyhow::anyhow;

fn error_chain_matches(err: &(dyn StdError + 'static), kind: ErrorKind, needle: &str) -> bool {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(source) = current {
        if let Some(io_err) = source.downcast_ref::<std::io::Error>()
            && io_err.kind() == kind
        {
            return true;
        }

        if source.to_string().to_ascii_lowercase().contains(needle) {
            return true;
        }

        current = source.source();
    }

    false
}

/// Maps transport-level reqwest failures to actionable messages. These are
/// never retried; only the model-not-found condition is, and that is
/// classified above this layer.
pub(crate) fn api_request_error(err: reqwest::Error, api_url: &str) -> anyhow::Error {
    if err.is_timeout() || error_chain_matches(&err, ErrorKind::TimedOut, "timed out") {
        return anyhow!(
            "Request to '{}' timed out. Check network connectivity and try again.",
            api_url
        );
    }

    if err.is_connect() {
        if error_chain_matches(&err, ErrorKind::ConnectionRefused, "connection refused") {
            return anyhow!(
                "Connection refused by '{}'. \
                 If GEMINI_BASE_URL is set, make sure that endpoint is reachable.",
                api_url
            );
        }

        return anyhow!(
            "Failed to connect to '{}'. Check GEMINI_BASE_URL and network connectivity.",
            api_url
        );
    }

    anyhow!("Failed to call Gemini API at '{}': {}", api_url, err)
}
