use serde::Deserialize;

use crate::utils::nullable::null_scalar;

/// The account block carried by every webhook notification.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Account {
    #[serde(rename = "account_code", default, deserialize_with = "null_scalar")]
    pub code: Option<String>,
    #[serde(default, deserialize_with = "null_scalar")]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "null_scalar")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "null_scalar")]
    pub first_name: Option<String>,
    #[serde(default, deserialize_with = "null_scalar")]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "null_scalar")]
    pub company_name: Option<String>,
}
