use serde::Deserialize;
use time::OffsetDateTime;

use crate::utils::nullable::{blank_time, null_scalar};

/// An invoice as carried by invoice notifications.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Invoice {
    #[serde(default, deserialize_with = "null_scalar")]
    pub uuid: Option<String>,
    #[serde(default, deserialize_with = "null_scalar")]
    pub subscription_id: Option<String>,
    #[serde(default, deserialize_with = "null_scalar")]
    pub state: Option<String>,
    #[serde(default, deserialize_with = "null_scalar")]
    pub invoice_number_prefix: Option<String>,
    #[serde(default, deserialize_with = "null_scalar")]
    pub invoice_number: Option<u32>,
    #[serde(default, deserialize_with = "null_scalar")]
    pub po_number: Option<String>,
    #[serde(default, deserialize_with = "null_scalar")]
    pub vat_number: Option<String>,
    #[serde(default, deserialize_with = "null_scalar")]
    pub total_in_cents: Option<i64>,
    #[serde(default, deserialize_with = "null_scalar")]
    pub currency: Option<String>,
    #[serde(default, deserialize_with = "blank_time")]
    pub date: Option<OffsetDateTime>,
    #[serde(default, deserialize_with = "blank_time")]
    pub closed_at: Option<OffsetDateTime>,
    #[serde(default, deserialize_with = "null_scalar")]
    pub net_terms: Option<u32>,
    #[serde(default, deserialize_with = "null_scalar")]
    pub collection_method: Option<String>,
}

impl Invoice {
    /// The number as printed on the invoice, e.g. `FR1005`.
    #[must_use]
    pub fn display_number(&self) -> Option<String> {
        self.invoice_number.map(|number| {
            format!(
                "{}{number}",
                self.invoice_number_prefix.as_deref().unwrap_or_default()
            )
        })
    }
}
