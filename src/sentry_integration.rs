//! Sentry integration for recurly-rs errors.
//!
//! Only available when the `sentry` feature is enabled:
//!
//! ```toml
//! [dependencies]
//! recurly-rs = { version = "0.1", features = ["sentry"] }
//! ```

use std::collections::BTreeMap;

use sentry_core::{Breadcrumb, protocol::Value};

use crate::error::Error;

/// Convert a recurly-rs Error into a Sentry breadcrumb, so failed API calls
/// show up in the event trail.
impl<'a> From<&'a Error> for Breadcrumb {
    fn from(error: &'a Error) -> Self {
        let mut data = BTreeMap::new();
        if let Some(url) = error.url() {
            data.insert("url".to_string(), Value::from(url));
        }
        if let Some(status) = error.status_code() {
            data.insert("status_code".to_string(), Value::from(status.as_u16()));
        }

        let (category, message) = match error {
            Error::Request(source) => ("http.request", format!("HTTP request error: {source}")),

            Error::InvalidEndpoint | Error::MissingConfig { .. } => {
                ("recurly.config", error.to_string())
            }

            Error::Serialization(_) | Error::Parse(..) | Error::Xml(_) => {
                ("recurly.xml", error.to_string())
            }

            Error::NotFound { entity, .. } => {
                data.insert("entity".to_string(), Value::from(entity.clone()));
                ("http.response", format!("{entity} not found"))
            }

            Error::Validation { errors, .. } => {
                let fields: Vec<Value> = errors
                    .errors
                    .iter()
                    .filter_map(|e| e.field.clone())
                    .map(Value::from)
                    .collect();
                data.insert("fields".to_string(), Value::from(fields));
                ("recurly.validation", format!("Validation failed: {errors}"))
            }

            Error::RateLimitExceeded { retry_after, .. } => {
                if let Some(retry) = retry_after {
                    data.insert("retry_after_secs".to_string(), Value::from(retry.as_secs()));
                }
                ("recurly.rate_limit", "Rate limit exceeded".to_string())
            }

            Error::Api { error: api_error, .. } => {
                let symbol = api_error
                    .as_ref()
                    .and_then(|e| e.symbol.as_deref())
                    .unwrap_or("unknown");
                data.insert("symbol".to_string(), Value::from(symbol));
                ("recurly.api", format!("Recurly API error: {symbol}"))
            }

            Error::UnrecognizedWebhook { name } => {
                data.insert("root".to_string(), Value::from(name.clone()));
                ("recurly.webhook", error.to_string())
            }
        };

        Breadcrumb {
            ty: "error".to_string(),
            category: Some(category.to_string()),
            message: Some(message),
            data,
            level: sentry_core::Level::Error,
            ..Default::default()
        }
    }
}

/// Extract request context from an error for use as Sentry extras.
///
/// ```ignore
/// use sentry::configure_scope;
/// use recurly::sentry_integration::error_to_sentry_context;
///
/// if let Err(e) = client.adjustments().get(uuid).await {
///     configure_scope(|scope| {
///         for (key, value) in error_to_sentry_context(&e) {
///             scope.set_extra(&key, value);
///         }
///     });
/// }
/// ```
pub fn error_to_sentry_context(error: &Error) -> BTreeMap<String, Value> {
    let mut context = BTreeMap::new();

    if let Some(url) = error.url() {
        context.insert("recurly.url".to_string(), Value::from(url.to_string()));
    }

    if let Some(status) = error.status_code() {
        context.insert("recurly.status_code".to_string(), Value::from(status.as_u16()));
    }

    if let Some(body) = error.response_body() {
        // Truncate for Sentry
        let truncated = match body.char_indices().nth(500) {
            Some((end, _)) => format!("{}...", &body[..end]),
            None => body.to_string(),
        };
        context.insert("recurly.response_body".to_string(), Value::from(truncated));
    }

    if let Error::Api { error: Some(api_error), .. } = error {
        if let Some(symbol) = &api_error.symbol {
            context.insert("recurly.symbol".to_string(), Value::from(symbol.clone()));
        }
        if let Some(description) = &api_error.description {
            context.insert("recurly.description".to_string(), Value::from(description.clone()));
        }
    }

    context
}
