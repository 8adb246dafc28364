//! Shared stand-ins for remote endpoints, used by unit tests.

use std::time::Duration;
use wiremock::matchers::any;
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A server that accepts every request and answers only after 30 seconds.
///
/// Keep the returned server alive for as long as the test needs it.
pub async fn hanging_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(30)))
        .mount(&server)
        .await;
    server
}
