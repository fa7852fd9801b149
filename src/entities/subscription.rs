use serde::Deserialize;
use time::OffsetDateTime;

use crate::utils::nullable::{blank_time, null_scalar};

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Plan {
    #[serde(default, deserialize_with = "null_scalar")]
    pub plan_code: Option<String>,
    #[serde(default, deserialize_with = "null_scalar")]
    pub name: Option<String>,
}

/// A subscription as carried by subscription notifications.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Subscription {
    #[serde(default)]
    pub plan: Plan,
    #[serde(default, deserialize_with = "null_scalar")]
    pub uuid: Option<String>,
    #[serde(default, deserialize_with = "null_scalar")]
    pub state: Option<String>,
    #[serde(default, deserialize_with = "null_scalar")]
    pub quantity: Option<i32>,
    #[serde(default, deserialize_with = "null_scalar")]
    pub unit_amount_in_cents: Option<i64>,
    #[serde(default, deserialize_with = "null_scalar")]
    pub total_amount_in_cents: Option<i64>,
    #[serde(default, deserialize_with = "blank_time")]
    pub activated_at: Option<OffsetDateTime>,
    #[serde(default, deserialize_with = "blank_time")]
    pub canceled_at: Option<OffsetDateTime>,
    #[serde(default, deserialize_with = "blank_time")]
    pub expires_at: Option<OffsetDateTime>,
    #[serde(default, deserialize_with = "blank_time")]
    pub current_period_started_at: Option<OffsetDateTime>,
    #[serde(default, deserialize_with = "blank_time")]
    pub current_period_ends_at: Option<OffsetDateTime>,
    #[serde(default, deserialize_with = "blank_time")]
    pub trial_started_at: Option<OffsetDateTime>,
    #[serde(default, deserialize_with = "blank_time")]
    pub trial_ends_at: Option<OffsetDateTime>,
}
