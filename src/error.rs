use serde::{Deserialize, Serialize};

/// Failure reported by the stats service. `status` is `None` when the request never
/// produced an HTTP response (connect error, timeout, undecodable body).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{}", describe(.status, .message))]
pub struct FetchError {
    pub status: Option<u16>,
    pub message: String,
}

impl FetchError {
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }
}

impl From<anyhow::Error> for FetchError {
    fn from(err: anyhow::Error) -> Self {
        Self::transport(format!("{err:#}"))
    }
}

fn describe(status: &Option<u16>, message: &str) -> String {
    match status {
        Some(code) => format!("API error {code}: {message}"),
        None => format!("request failed: {message}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_status_when_present() {
        let err = FetchError::http(404, "Team with ID 99 not found");
        assert_eq!(err.to_string(), "API error 404: Team with ID 99 not found");
        let err = FetchError::transport("timed out");
        assert_eq!(err.to_string(), "request failed: timed out");
    }

    #[test]
    fn anyhow_chain_is_flattened() {
        let err = anyhow::anyhow!("inner").context("outer");
        let fetch: FetchError = err.into();
        assert_eq!(fetch.status, None);
        assert_eq!(fetch.message, "outer: inner");
    }
}
