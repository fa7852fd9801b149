use serde::Deserialize;
use time::OffsetDateTime;

use crate::utils::nullable::{blank_time, null_bool, null_scalar};

/// A payment or refund as carried by payment notifications.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Transaction {
    #[serde(default, deserialize_with = "null_scalar")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_scalar")]
    pub invoice_id: Option<String>,
    #[serde(default, deserialize_with = "null_scalar")]
    pub invoice_number: Option<u32>,
    #[serde(default, deserialize_with = "null_scalar")]
    pub subscription_id: Option<String>,
    /// `purchase`, `refund`, `verify`, ...
    #[serde(default, deserialize_with = "null_scalar")]
    pub action: Option<String>,
    #[serde(default, deserialize_with = "blank_time")]
    pub date: Option<OffsetDateTime>,
    #[serde(default, deserialize_with = "null_scalar")]
    pub amount_in_cents: Option<i64>,
    #[serde(default, deserialize_with = "null_scalar")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "null_scalar")]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "null_scalar")]
    pub reference: Option<String>,
    #[serde(default, deserialize_with = "null_scalar")]
    pub source: Option<String>,
    #[serde(default, deserialize_with = "null_bool::deserialize")]
    pub test: Option<bool>,
    #[serde(default, deserialize_with = "null_bool::deserialize")]
    pub voidable: Option<bool>,
    #[serde(default, deserialize_with = "null_bool::deserialize")]
    pub refundable: Option<bool>,
}
