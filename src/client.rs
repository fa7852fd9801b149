use core::fmt;
use std::time::Duration;

use reqwest::{Method, RequestBuilder, StatusCode, header};
use serde::{Serialize, de::DeserializeOwned};
use url::Url;
use uuid::Uuid;

use crate::endpoints::RecurlyEndpoint;
use crate::entities::{
    adjustment::{self, Adjustment},
    redemption::{self, Redemption},
};
use crate::error::{ApiError, Error, Result, ValidationErrors};

/// API version requested through the `X-Api-Version` header.
pub const DEFAULT_API_VERSION: &str = "2.29";

const ENV_SUBDOMAIN: &str = "RECURLY_SUBDOMAIN";
const ENV_API_KEY: &str = "RECURLY_API_KEY";
const ENV_BASE_URL: &str = "RECURLY_BASE_URL";

// Rate limiting headers used by the Recurly API
/// Header containing the size of the current rate limit window
const HEADER_RATE_LIMIT_LIMIT: &str = "X-RateLimit-Limit";
/// Header containing number of remaining API calls in the window
const HEADER_RATE_LIMIT_REMAINING: &str = "X-RateLimit-Remaining";
/// Header containing the unix time at which the window resets
const HEADER_RATE_LIMIT_RESET: &str = "X-RateLimit-Reset";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Information about the remaining API rate limit
///
/// Recurly limits requests per site over a sliding window and reports the
/// window on every response.
pub struct RateLimitInfo {
    /// Number of requests allowed in the window
    pub limit: Option<u32>,
    /// Number of requests left in the window
    pub remaining: Option<u32>,
    /// Unix timestamp at which the window resets
    pub reset: Option<u64>,
}

impl RateLimitInfo {
    /// Extract rate limit information from response headers
    #[must_use]
    pub fn from_response_headers(headers: &header::HeaderMap) -> Self {
        fn parse<T: std::str::FromStr>(headers: &header::HeaderMap, name: &str) -> Option<T> {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse::<T>().ok())
        }

        Self {
            limit: parse(headers, HEADER_RATE_LIMIT_LIMIT),
            remaining: parse(headers, HEADER_RATE_LIMIT_REMAINING),
            reset: parse(headers, HEADER_RATE_LIMIT_RESET),
        }
    }

    /// Returns true when less than a tenth of the window is left
    #[must_use]
    pub fn is_near_limit(&self) -> bool {
        match (self.limit, self.remaining) {
            (Some(limit), Some(remaining)) => u64::from(remaining) * 10 < u64::from(limit),
            _ => false,
        }
    }
}

/// Connection settings for a Recurly site.
#[derive(Clone)]
pub struct Config {
    subdomain: String,
    api_key: String,
    base_url: Option<String>,
    api_version: String,
    timeout: Option<Duration>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("subdomain", &self.subdomain)
            .field("api_key", &"[redacted]")
            .field("base_url", &self.base_url)
            .field("api_version", &self.api_version)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Config {
    #[must_use]
    pub fn new(subdomain: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            subdomain: subdomain.into(),
            api_key: api_key.into(),
            base_url: None,
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout: None,
        }
    }

    /// Reads `RECURLY_SUBDOMAIN`, `RECURLY_API_KEY` and, optionally,
    /// `RECURLY_BASE_URL`.
    pub fn from_env() -> Result<Self> {
        let subdomain = std::env::var(ENV_SUBDOMAIN)
            .map_err(|_| Error::MissingConfig { name: ENV_SUBDOMAIN })?;
        let api_key =
            std::env::var(ENV_API_KEY).map_err(|_| Error::MissingConfig { name: ENV_API_KEY })?;

        let mut config = Self::new(subdomain, api_key);
        if let Ok(base_url) = std::env::var(ENV_BASE_URL) {
            config = config.with_base_url(base_url);
        }
        Ok(config)
    }

    /// Overrides the `https://{subdomain}.recurly.com/v2/` base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    #[must_use]
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    /// Deadline applied to every request, from connect until the body is read.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn subdomain(&self) -> &str {
        &self.subdomain
    }

    /// The resolved base URL all endpoints are joined onto.
    pub fn base_url(&self) -> Result<Url> {
        let raw = match &self.base_url {
            Some(base_url) => base_url.clone(),
            None => format!("https://{}.recurly.com/v2/", self.subdomain),
        };
        Url::parse(&raw).map_err(|_| Error::InvalidEndpoint)
    }
}

#[derive(Clone, Debug)]
/// This is the client that is used for interacting with the Recurly API. It holds the
/// HTTP connection pool and the site's credentials, and never changes after construction.
pub struct Client {
    http: reqwest::Client,
    base_url: Url,
    config: Config,
}

impl Client {
    #[instrument]
    pub fn new(config: Config) -> Result<Self> {
        let base_url = config.base_url()?;

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/xml"),
        );
        headers.insert(
            "X-Api-Version",
            header::HeaderValue::from_str(&config.api_version)
                .map_err(|_| Error::InvalidEndpoint)?,
        );

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base_url,
            config,
        })
    }

    /// Builds a client from the environment, see [`Config::from_env`].
    pub fn from_env() -> Result<Self> {
        Self::new(Config::from_env()?)
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Build a request object with authentication headers.
    pub(crate) fn build_request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http
            .request(method, url)
            .basic_auth(&self.config.api_key, None::<&str>)
    }

    /// Perform an authenticated `GET` request.
    #[instrument(skip(self, query))]
    pub async fn get<R: DeserializeOwned, Q: Serialize + Sized + fmt::Debug>(
        &self,
        endpoint: RecurlyEndpoint,
        query: &Q,
    ) -> Result<R> {
        let url = endpoint.to_url(&self.base_url)?;
        trace!(?query, %url, "making GET request");
        let response = self
            .build_request(Method::GET, url)
            .query(query)
            .send()
            .await?;

        Self::handle_response(response, endpoint.entity()).await
    }

    /// Perform an authenticated `POST` request with an XML body.
    #[instrument(skip(self, data))]
    pub async fn post<R: DeserializeOwned, T: Serialize + Sized>(
        &self,
        endpoint: RecurlyEndpoint,
        data: &T,
    ) -> Result<R> {
        let url = endpoint.to_url(&self.base_url)?;
        let body = quick_xml::se::to_string(data)?;
        trace!(%body, %url, "making POST request");
        let response = self
            .build_request(Method::POST, url)
            .header(header::CONTENT_TYPE, "application/xml; charset=utf-8")
            .body(body)
            .send()
            .await?;

        Self::handle_response(response, endpoint.entity()).await
    }

    /// Perform an authenticated `DELETE` request. Success carries no payload.
    #[instrument(skip(self))]
    pub async fn delete(&self, endpoint: RecurlyEndpoint) -> Result<()> {
        let url = endpoint.to_url(&self.base_url)?;
        trace!(%url, "making DELETE request");
        let response = self.build_request(Method::DELETE, url).send().await?;

        if response.status().is_success() {
            Self::log_rate_limit(response.headers());
            Ok(())
        } else {
            Self::handle_response::<()>(response, endpoint.entity()).await
        }
    }

    fn log_rate_limit(headers: &header::HeaderMap) -> RateLimitInfo {
        let rate_limit_info = RateLimitInfo::from_response_headers(headers);
        if rate_limit_info.is_near_limit() {
            warn!(
                limit = ?rate_limit_info.limit,
                remaining = ?rate_limit_info.remaining,
                reset = ?rate_limit_info.reset,
                "approaching Recurly API rate limit"
            );
        }
        rate_limit_info
    }

    #[instrument(skip(response))]
    async fn handle_response<T: DeserializeOwned>(
        response: reqwest::Response,
        entity: &str,
    ) -> Result<T> {
        let status = response.status();
        let url = response.url().to_string();

        debug!(%url, %status, entity, "response received");

        let rate_limit_info = Self::log_rate_limit(response.headers());

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .map(Duration::from_secs);

            warn!(
                %url,
                ?retry_after,
                remaining = ?rate_limit_info.remaining,
                reset = ?rate_limit_info.reset,
                "rate limit exceeded"
            );

            let text = response.text().await.unwrap_or_default();
            return Err(Error::RateLimitExceeded {
                retry_after,
                status_code: status,
                url,
                response_body: Some(text),
            });
        }

        let text = response.text().await?;
        debug!("Response body size: {} bytes", text.len());
        trace!("Response text:\n{}", text);

        match status {
            status if status.is_success() => quick_xml::de::from_str(&text).map_err(|e| {
                error!(%url, error = %e, "failed to decode response");
                Error::Parse(e, Some(text))
            }),
            StatusCode::NOT_FOUND => Err(Error::NotFound {
                entity: entity.to_string(),
                url,
                status_code: status,
                response_body: Some(text),
            }),
            StatusCode::UNPROCESSABLE_ENTITY => {
                match quick_xml::de::from_str::<ValidationErrors>(&text) {
                    Ok(errors) => Err(Error::Validation { url, errors }),
                    Err(e) => {
                        error!(%url, error = %e, "unreadable validation response");
                        Err(Error::Api {
                            status_code: status,
                            url,
                            error: quick_xml::de::from_str::<ApiError>(&text).ok(),
                            response_body: Some(text),
                        })
                    }
                }
            }
            _ => {
                error!(%url, %status, "unexpected status code");
                Err(Error::Api {
                    status_code: status,
                    url,
                    error: quick_xml::de::from_str::<ApiError>(&text).ok(),
                    response_body: Some(text),
                })
            }
        }
    }

    /// Access the adjustments API
    #[must_use]
    pub fn adjustments(&self) -> AdjustmentsApi<'_> {
        AdjustmentsApi::new(self)
    }

    /// Access the coupon redemptions API
    #[must_use]
    pub fn redemptions(&self) -> RedemptionsApi<'_> {
        RedemptionsApi::new(self)
    }
}

/// API handler for Adjustments endpoints
#[derive(Debug, Clone, Copy)]
pub struct AdjustmentsApi<'a> {
    client: &'a Client,
}

impl<'a> AdjustmentsApi<'a> {
    #[must_use]
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// List the charges and credits on an account, in the order returned.
    pub async fn list(
        &self,
        account_code: &str,
        parameters: &adjustment::ListParameters,
    ) -> Result<Vec<Adjustment>> {
        adjustment::list(self.client, account_code, parameters).await
    }

    /// Get a single adjustment by UUID
    pub async fn get(&self, uuid: Uuid) -> Result<Adjustment> {
        adjustment::get(self.client, uuid).await
    }

    /// Create a one-time charge or credit on an account
    pub async fn create(&self, account_code: &str, adjustment: &Adjustment) -> Result<Adjustment> {
        adjustment::create(self.client, account_code, adjustment).await
    }

    /// Remove a non-invoiced adjustment
    pub async fn delete(&self, uuid: Uuid) -> Result<()> {
        adjustment::delete(self.client, uuid).await
    }
}

/// API handler for coupon redemption endpoints
#[derive(Debug, Clone, Copy)]
pub struct RedemptionsApi<'a> {
    client: &'a Client,
}

impl<'a> RedemptionsApi<'a> {
    #[must_use]
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// The active redemption on an account
    pub async fn get_for_account(&self, account_code: &str) -> Result<Redemption> {
        redemption::get_for_account(self.client, account_code).await
    }

    /// All redemptions on an account
    pub async fn list_for_account(&self, account_code: &str) -> Result<Vec<Redemption>> {
        redemption::list_for_account(self.client, account_code).await
    }

    /// The redemption applied to an invoice
    pub async fn get_for_invoice(&self, invoice_number: &str) -> Result<Redemption> {
        redemption::get_for_invoice(self.client, invoice_number).await
    }

    /// Redeem a coupon on an account
    pub async fn redeem(
        &self,
        coupon_code: &str,
        account_code: &str,
        currency: &str,
    ) -> Result<Redemption> {
        redemption::redeem(self.client, coupon_code, account_code, currency).await
    }

    /// Remove the active coupon from an account
    pub async fn delete(&self, account_code: &str) -> Result<()> {
        redemption::delete(self.client, account_code).await
    }
}
