//! Example test showing how to use the miette integration
use miette::{Diagnostic, IntoDiagnostic, Result};

use recurly::error::Error;

#[tokio::test]
async fn miette_integration_example() -> Result<()> {
    // Initialize logging for tests
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    // Our Error type is already Diagnostic-compatible
    let result: recurly::Result<()> = Err(Error::UnrecognizedWebhook {
        name: "new_widget_notification".to_string(),
    });
    if let Err(e) = result {
        println!("Error with diagnostic info: {e:#?}");
        assert_eq!(
            e.code().map(|code| code.to_string()).as_deref(),
            Some("recurly::unrecognized_webhook")
        );
        assert!(e.help().is_some());
    }

    // Converting through miette keeps the diagnostic
    if let Err(report) = create_client().await.into_diagnostic() {
        println!("Client error with diagnostic info: {report:?}");
    }

    // Errors from this crate convert into a miette report with `?`
    let config = recurly::Config::new("acme", "key");
    let client = recurly::Client::new(config)?;
    assert_eq!(client.base_url().as_str(), "https://acme.recurly.com/v2/");

    Ok(())
}

async fn create_client() -> recurly::Result<recurly::Client> {
    Err(Error::MissingConfig {
        name: "RECURLY_API_KEY",
    })
}
