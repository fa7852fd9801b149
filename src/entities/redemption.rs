use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    Client,
    endpoints::RecurlyEndpoint,
    error::Result,
    utils::{
        href::linked_code,
        nullable::{null_bool, null_scalar, null_time},
    },
};

/// A coupon redeemed on an account or applied to an invoice.
///
/// On read, the coupon and account arrive as `<coupon href>` and
/// `<account href>` links and are resolved to their codes. On write only
/// `account_code` and `currency` are sent.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Redemption {
    pub uuid: Option<Uuid>,
    pub coupon_code: Option<String>,
    pub account_code: Option<String>,
    pub single_use: Option<bool>,
    pub total_discounted_in_cents: i64,
    pub currency: Option<String>,
    pub state: Option<String>,
    pub created_at: Option<OffsetDateTime>,
    pub updated_at: Option<OffsetDateTime>,
}

impl Redemption {
    /// A redemption request for `account_code`, billed in `currency`.
    #[must_use]
    pub fn new(account_code: impl Into<String>, currency: impl Into<String>) -> Self {
        Self {
            account_code: Some(account_code.into()),
            currency: Some(currency.into()),
            ..Self::default()
        }
    }

    /// Decode a `<redemption>` document.
    pub fn from_xml(xml: &str) -> Result<Self> {
        Ok(quick_xml::de::from_str(xml)?)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename = "redemption")]
struct RedeemRequest<'a> {
    account_code: &'a str,
    currency: &'a str,
}

impl Serialize for Redemption {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        RedeemRequest {
            account_code: self.account_code.as_deref().unwrap_or_default(),
            currency: self.currency.as_deref().unwrap_or_default(),
        }
        .serialize(serializer)
    }
}

#[derive(Debug, Deserialize)]
struct RedemptionRead {
    #[serde(default, deserialize_with = "null_scalar")]
    uuid: Option<Uuid>,
    #[serde(default, deserialize_with = "linked_code")]
    coupon: Option<String>,
    // Newer API versions also spell the code out
    #[serde(default, deserialize_with = "null_scalar")]
    coupon_code: Option<String>,
    #[serde(default, deserialize_with = "linked_code")]
    account: Option<String>,
    #[serde(default, deserialize_with = "null_bool::deserialize")]
    single_use: Option<bool>,
    #[serde(default, deserialize_with = "null_scalar")]
    total_discounted_in_cents: Option<i64>,
    #[serde(default, deserialize_with = "null_scalar")]
    currency: Option<String>,
    #[serde(default, deserialize_with = "null_scalar")]
    state: Option<String>,
    #[serde(default, deserialize_with = "null_time::deserialize")]
    created_at: Option<OffsetDateTime>,
    #[serde(default, deserialize_with = "null_time::deserialize")]
    updated_at: Option<OffsetDateTime>,
}

impl From<RedemptionRead> for Redemption {
    fn from(v: RedemptionRead) -> Self {
        Self {
            uuid: v.uuid,
            coupon_code: v.coupon.or(v.coupon_code),
            account_code: v.account,
            single_use: v.single_use,
            total_discounted_in_cents: v.total_discounted_in_cents.unwrap_or_default(),
            currency: v.currency,
            state: v.state,
            created_at: v.created_at,
            updated_at: v.updated_at,
        }
    }
}

impl<'de> Deserialize<'de> for Redemption {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        RedemptionRead::deserialize(deserializer).map(Self::from)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListResponse {
    #[serde(rename = "redemption", default)]
    pub redemptions: Vec<Redemption>,
}

/// Look up the active coupon redemption on an account.
#[instrument(skip(client))]
pub async fn get_for_account(client: &Client, account_code: &str) -> Result<Redemption> {
    let endpoint = RecurlyEndpoint::AccountRedemption(account_code.to_string());
    client.get(endpoint, &()).await
}

/// List every redemption on an account, active or not.
#[instrument(skip(client))]
pub async fn list_for_account(client: &Client, account_code: &str) -> Result<Vec<Redemption>> {
    let endpoint = RecurlyEndpoint::AccountRedemptions(account_code.to_string());
    let response: ListResponse = client.get(endpoint, &()).await?;
    Ok(response.redemptions)
}

/// Look up the coupon redemption applied to an invoice.
#[instrument(skip(client))]
pub async fn get_for_invoice(client: &Client, invoice_number: &str) -> Result<Redemption> {
    let endpoint = RecurlyEndpoint::InvoiceRedemption(invoice_number.to_string());
    client.get(endpoint, &()).await
}

/// Redeem a coupon on an account. The coupon applies to the account's next
/// new subscription, modification or renewal.
#[instrument(skip(client))]
pub async fn redeem(
    client: &Client,
    coupon_code: &str,
    account_code: &str,
    currency: &str,
) -> Result<Redemption> {
    info!("redeeming coupon");
    let request = Redemption::new(account_code, currency);
    client
        .post(RecurlyEndpoint::CouponRedeem(coupon_code.to_string()), &request)
        .await
}

/// Remove the active coupon from an account before it expires. The
/// redemption still counts towards the coupon's maximum redemptions.
#[instrument(skip(client))]
pub async fn delete(client: &Client, account_code: &str) -> Result<()> {
    client
        .delete(RecurlyEndpoint::AccountRedemption(account_code.to_string()))
        .await
}
