use std::fmt;
use url::Url;
use uuid::Uuid;

use crate::error::{Error, Result};

/// A typed representation of Recurly v2 API endpoints.
///
/// Endpoints are relative to the site's base URL (see [`crate::Config`]).
/// Codes are percent-encoded as single path segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecurlyEndpoint {
    // Adjustments
    AccountAdjustments(String),
    Adjustment(Uuid),

    // Coupon redemptions
    AccountRedemption(String),
    AccountRedemptions(String),
    InvoiceRedemption(String),
    CouponRedeem(String),
}

impl RecurlyEndpoint {
    fn segments(&self) -> Vec<String> {
        match self {
            Self::AccountAdjustments(account_code) => {
                vec!["accounts".into(), account_code.clone(), "adjustments".into()]
            }
            Self::Adjustment(uuid) => vec!["adjustments".into(), uuid.simple().to_string()],
            Self::AccountRedemption(account_code) => {
                vec!["accounts".into(), account_code.clone(), "redemption".into()]
            }
            Self::AccountRedemptions(account_code) => {
                vec!["accounts".into(), account_code.clone(), "redemptions".into()]
            }
            Self::InvoiceRedemption(invoice_number) => {
                vec!["invoices".into(), invoice_number.clone(), "redemption".into()]
            }
            Self::CouponRedeem(coupon_code) => {
                vec!["coupons".into(), coupon_code.clone(), "redeem".into()]
            }
        }
    }

    /// The resource the endpoint addresses, used to label `NotFound` errors.
    #[must_use]
    pub fn entity(&self) -> &'static str {
        match self {
            Self::AccountAdjustments(_) | Self::Adjustment(_) => "Adjustment",
            Self::AccountRedemption(_)
            | Self::AccountRedemptions(_)
            | Self::InvoiceRedemption(_)
            | Self::CouponRedeem(_) => "Redemption",
        }
    }

    /// Joins the endpoint onto `base`.
    pub fn to_url(&self, base: &Url) -> Result<Url> {
        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|()| Error::InvalidEndpoint)?
            .pop_if_empty()
            .extend(self.segments());
        Ok(url)
    }

    /// The path relative to the base URL, e.g. `accounts/abc/adjustments`.
    #[must_use]
    pub fn path(&self) -> String {
        self.segments().join("/")
    }
}

impl fmt::Display for RecurlyEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
