//! Shared HTTP client construction for consistent timeout and TLS configuration.

use std::time::Duration;

/// Create a shared HTTP client with standard lumen configuration.
///
/// Config: 30s connect timeout, 120s request timeout, rustls TLS,
/// `lumen/{version}` user-agent, redirect limit 10.
#[must_use]
pub fn default_client() -> reqwest::Client {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(30))
        .timeout(Duration::from_secs(120))
        .user_agent(concat!("lumen/", env!("CARGO_PKG_VERSION")))
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .expect("default HTTP client construction must not fail")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn default_client_sends_user_agent() {
        use wiremock::matchers::{header_regex, method};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header_regex("user-agent", "^lumen/"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let resp = default_client().get(server.uri()).send().await.unwrap();
        assert_eq!(resp.status(), 200);
    }
}
