use miette::{IntoDiagnostic, Result};
use tracing::info;
use wiremock::MockServer;

use std::sync::Once;

use recurly::{Client, Config};

/// API key every mock expects as the basic-auth username
#[allow(dead_code)]
pub const API_KEY: &str = "test-api-key";

/// Creates a client pointed at the mock server's `/v2/` root
#[allow(dead_code)]
pub fn create_test_client(server: &MockServer) -> Result<Client> {
    let config = Config::new("test", API_KEY).with_base_url(format!("{}/v2/", server.uri()));
    info!("Creating client for {}", server.uri());
    Client::new(config).into_diagnostic()
}

static LOGGING_CONFIGURED: Once = Once::new();

/// Setup before test runs
pub fn do_setup() {
    LOGGING_CONFIGURED.call_once(|| tracing_subscriber::fmt().with_test_writer().init());
    info!("Setting up test environment");
}
