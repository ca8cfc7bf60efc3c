//! Shared HTTP client construction for consistent timeout and TLS configuration.

use std::time::Duration;

/// Create a shared HTTP client with standard docent configuration.
///
/// Config: 30s connect timeout, 120s request timeout, rustls TLS,
/// `docent/{version}` user-agent, redirect limit 10. Every external call made
/// through this client inherits a deadline, so a hung upstream surfaces as a
/// timeout error instead of stalling the request.
#[must_use]
pub fn default_client() -> reqwest::Client {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(30))
        .timeout(Duration::from_secs(120))
        .user_agent(concat!("docent/", env!("CARGO_PKG_VERSION")))
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .expect("default HTTP client construction must not fail")
}
