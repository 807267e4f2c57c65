use std::time::Duration;

/// Connection settings for [`RestBackend`](crate::RestBackend).
#[derive(Clone, Debug)]
pub struct RestConfig {
    /// Base URL without a trailing slash, e.g. `https://api.example.com/v1`.
    pub base_url: String,
    /// Sent as a bearer token when present.
    pub auth_token: Option<String>,
    /// Sent as `X-Session-Id` when present.
    pub session_id: Option<String>,
    pub timeout: Duration,
}

impl RestConfig {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            auth_token: None,
            session_id: None,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    pub fn with_session_id(mut self, session: impl Into<String>) -> Self {
        self.session_id = Some(session.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slashes_do_not_double_up() {
        let config = RestConfig::new("https://merge.example/api//");
        assert_eq!(config.endpoint("merge"), "https://merge.example/api/merge");
        assert_eq!(config.timeout, RestConfig::DEFAULT_TIMEOUT);
    }
}
