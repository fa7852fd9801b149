//! Push notifications posted by Recurly to a site's webhook URL.
//!
//! Every payload is a single XML document whose root element names the event:
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <new_account_notification>
//!   <account>
//!     <account_code>1</account_code>
//!     ...
//!   </account>
//! </new_account_notification>
//! ```
//!
//! [`parse`] reads the root element name, looks it up in a fixed table and
//! decodes the whole document into the matching [`Notification`] variant.
//! Signature verification is left to the HTTP layer receiving the request.

use std::io::{self, Read};

use quick_xml::{Reader, events::Event};
use serde::{Deserialize, de::DeserializeOwned};

use crate::{
    entities::{account::Account, invoice::Invoice, subscription::Subscription, transaction::Transaction},
    error::{Error, Result},
};

/// Account lifecycle events.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AccountNotification {
    pub account: Account,
}

/// Invoice lifecycle events.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct InvoiceNotification {
    pub account: Account,
    pub invoice: Invoice,
}

/// Subscription lifecycle events.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SubscriptionNotification {
    pub account: Account,
    pub subscription: Subscription,
}

/// Payment and refund events.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PaymentNotification {
    pub account: Account,
    pub transaction: Transaction,
}

/// A decoded webhook payload. Exactly one variant per document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notification {
    NewAccount(AccountNotification),
    CanceledAccount(AccountNotification),
    BillingInfoUpdated(AccountNotification),
    ReactivatedAccount(AccountNotification),

    NewInvoice(InvoiceNotification),
    ProcessingInvoice(InvoiceNotification),
    ClosedInvoice(InvoiceNotification),
    PastDueInvoice(InvoiceNotification),

    NewSubscription(SubscriptionNotification),
    UpdatedSubscription(SubscriptionNotification),
    CanceledSubscription(SubscriptionNotification),
    ExpiredSubscription(SubscriptionNotification),
    RenewedSubscription(SubscriptionNotification),

    SuccessfulPayment(PaymentNotification),
    FailedPayment(PaymentNotification),
    VoidPayment(PaymentNotification),
    SuccessfulRefund(PaymentNotification),
}

impl Notification {
    /// The root element name the notification was decoded from.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::NewAccount(_) => "new_account_notification",
            Self::CanceledAccount(_) => "canceled_account_notification",
            Self::BillingInfoUpdated(_) => "billing_info_updated_notification",
            Self::ReactivatedAccount(_) => "reactivated_account_notification",
            Self::NewInvoice(_) => "new_invoice_notification",
            Self::ProcessingInvoice(_) => "processing_invoice_notification",
            Self::ClosedInvoice(_) => "closed_invoice_notification",
            Self::PastDueInvoice(_) => "past_due_invoice_notification",
            Self::NewSubscription(_) => "new_subscription_notification",
            Self::UpdatedSubscription(_) => "updated_subscription_notification",
            Self::CanceledSubscription(_) => "canceled_subscription_notification",
            Self::ExpiredSubscription(_) => "expired_subscription_notification",
            Self::RenewedSubscription(_) => "renewed_subscription_notification",
            Self::SuccessfulPayment(_) => "successful_payment_notification",
            Self::FailedPayment(_) => "failed_payment_notification",
            Self::VoidPayment(_) => "void_payment_notification",
            Self::SuccessfulRefund(_) => "successful_refund_notification",
        }
    }

    /// The account every notification carries.
    #[must_use]
    pub fn account(&self) -> &Account {
        match self {
            Self::NewAccount(n)
            | Self::CanceledAccount(n)
            | Self::BillingInfoUpdated(n)
            | Self::ReactivatedAccount(n) => &n.account,
            Self::NewInvoice(n)
            | Self::ProcessingInvoice(n)
            | Self::ClosedInvoice(n)
            | Self::PastDueInvoice(n) => &n.account,
            Self::NewSubscription(n)
            | Self::UpdatedSubscription(n)
            | Self::CanceledSubscription(n)
            | Self::ExpiredSubscription(n)
            | Self::RenewedSubscription(n) => &n.account,
            Self::SuccessfulPayment(n)
            | Self::FailedPayment(n)
            | Self::VoidPayment(n)
            | Self::SuccessfulRefund(n) => &n.account,
        }
    }
}

type Decoder = fn(&str) -> Result<Notification>;

static NOTIFICATIONS: &[(&str, Decoder)] = &[
    ("new_account_notification", |xml| decode(xml).map(Notification::NewAccount)),
    ("canceled_account_notification", |xml| decode(xml).map(Notification::CanceledAccount)),
    ("billing_info_updated_notification", |xml| decode(xml).map(Notification::BillingInfoUpdated)),
    ("reactivated_account_notification", |xml| decode(xml).map(Notification::ReactivatedAccount)),
    ("new_invoice_notification", |xml| decode(xml).map(Notification::NewInvoice)),
    ("processing_invoice_notification", |xml| decode(xml).map(Notification::ProcessingInvoice)),
    ("closed_invoice_notification", |xml| decode(xml).map(Notification::ClosedInvoice)),
    ("past_due_invoice_notification", |xml| decode(xml).map(Notification::PastDueInvoice)),
    ("new_subscription_notification", |xml| decode(xml).map(Notification::NewSubscription)),
    ("updated_subscription_notification", |xml| decode(xml).map(Notification::UpdatedSubscription)),
    ("canceled_subscription_notification", |xml| decode(xml).map(Notification::CanceledSubscription)),
    ("expired_subscription_notification", |xml| decode(xml).map(Notification::ExpiredSubscription)),
    ("renewed_subscription_notification", |xml| decode(xml).map(Notification::RenewedSubscription)),
    ("successful_payment_notification", |xml| decode(xml).map(Notification::SuccessfulPayment)),
    ("failed_payment_notification", |xml| decode(xml).map(Notification::FailedPayment)),
    ("void_payment_notification", |xml| decode(xml).map(Notification::VoidPayment)),
    ("successful_refund_notification", |xml| decode(xml).map(Notification::SuccessfulRefund)),
];

fn decode<T: DeserializeOwned>(xml: &str) -> Result<T> {
    quick_xml::de::from_str(xml).map_err(|e| {
        error!("Failed to decode webhook payload: {e}");
        Error::Parse(e, Some(xml.to_string()))
    })
}

/// Local name of the first element in the document.
fn root_name(xml: &str) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event()? {
            Event::Start(element) | Event::Empty(element) => {
                return Ok(String::from_utf8_lossy(element.local_name().as_ref()).into_owned());
            }
            Event::Eof => {
                return Err(Error::Xml(quick_xml::Error::from(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "document has no root element",
                ))));
            }
            _ => {}
        }
    }
}

/// Decode a webhook payload.
#[instrument(skip_all, fields(len = payload.len()))]
pub fn parse(payload: &[u8]) -> Result<Notification> {
    from_reader(payload)
}

/// Decode a webhook payload read to the end from `reader`.
pub fn from_reader(mut reader: impl Read) -> Result<Notification> {
    let mut xml = String::new();
    reader
        .read_to_string(&mut xml)
        .map_err(|e| Error::Xml(quick_xml::Error::from(e)))?;

    let name = root_name(&xml)?;
    let Some((_, decoder)) = NOTIFICATIONS.iter().find(|(root, _)| *root == name) else {
        warn!("Unrecognized webhook notification <{name}>");
        return Err(Error::UnrecognizedWebhook { name });
    };

    let notification = decoder(&xml)?;
    debug!("Decoded {}", notification.type_name());
    Ok(notification)
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    const NEW_ACCOUNT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
        <new_account_notification>
          <account>
            <account_code>1</account_code>
            <username nil="true"></username>
            <email>verena@example.com</email>
            <first_name>Verena</first_name>
            <last_name>Example</last_name>
            <company_name nil="true"></company_name>
          </account>
        </new_account_notification>"#;

    const NEW_INVOICE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
        <new_invoice_notification>
          <account>
            <account_code>1</account_code>
            <username nil="true"></username>
            <email>verena@example.com</email>
            <first_name>Verana</first_name>
            <last_name>Example</last_name>
            <company_name nil="true"></company_name>
          </account>
          <invoice>
            <uuid>ffc64d71d4b5404e93f13aac9c63b007</uuid>
            <subscription_id nil="true"></subscription_id>
            <state>open</state>
            <invoice_number_prefix></invoice_number_prefix>
            <invoice_number type="integer">1000</invoice_number>
            <po_number></po_number>
            <vat_number></vat_number>
            <total_in_cents type="integer">1000</total_in_cents>
            <currency>USD</currency>
            <date type="datetime">2014-01-01T20:21:44Z</date>
            <closed_at type="datetime" nil="true"></closed_at>
            <net_terms type="integer">0</net_terms>
            <collection_method>manual</collection_method>
          </invoice>
        </new_invoice_notification>"#;

    #[test]
    fn new_account_notification() {
        let notification = parse(NEW_ACCOUNT.as_bytes()).unwrap();
        assert_eq!(notification.type_name(), "new_account_notification");
        assert_eq!(
            notification,
            Notification::NewAccount(AccountNotification {
                account: Account {
                    code: Some("1".to_string()),
                    username: None,
                    email: Some("verena@example.com".to_string()),
                    first_name: Some("Verena".to_string()),
                    last_name: Some("Example".to_string()),
                    company_name: None,
                },
            })
        );
    }

    #[test]
    fn new_invoice_notification() {
        let notification = parse(NEW_INVOICE.as_bytes()).unwrap();
        assert_eq!(notification.type_name(), "new_invoice_notification");
        let Notification::NewInvoice(InvoiceNotification { account, invoice }) = notification else {
            panic!("expected an invoice notification");
        };
        assert_eq!(account.first_name.as_deref(), Some("Verana"));
        assert_eq!(invoice.uuid.as_deref(), Some("ffc64d71d4b5404e93f13aac9c63b007"));
        assert_eq!(invoice.subscription_id, None);
        assert_eq!(invoice.state.as_deref(), Some("open"));
        assert_eq!(invoice.invoice_number, Some(1000));
        assert_eq!(invoice.display_number().as_deref(), Some("1000"));
        assert_eq!(invoice.po_number, None);
        assert_eq!(invoice.total_in_cents, Some(1000));
        assert_eq!(invoice.date, Some(datetime!(2014-01-01 20:21:44 UTC)));
        assert_eq!(invoice.closed_at, None);
        assert_eq!(invoice.net_terms, Some(0));
        assert_eq!(invoice.collection_method.as_deref(), Some("manual"));
    }

    #[test]
    fn every_table_entry_round_trips_its_name() {
        for (name, decoder) in NOTIFICATIONS {
            let xml = format!(
                "<{name}><account><account_code>a</account_code></account>\
                 <invoice></invoice><subscription></subscription><transaction></transaction></{name}>"
            );
            let notification = decoder(&xml).unwrap();
            assert_eq!(notification.type_name(), *name);
            assert_eq!(notification.account().code.as_deref(), Some("a"));
        }
    }

    #[test]
    fn missing_blocks_decode_to_defaults() {
        let notification =
            parse(b"<billing_info_updated_notification></billing_info_updated_notification>")
                .unwrap();
        assert_eq!(
            notification,
            Notification::BillingInfoUpdated(AccountNotification::default())
        );

        let notification = parse(
            b"<closed_invoice_notification><account><account_code>7</account_code></account></closed_invoice_notification>",
        )
        .unwrap();
        let Notification::ClosedInvoice(InvoiceNotification { account, invoice }) = notification
        else {
            panic!("expected a closed invoice notification");
        };
        assert_eq!(account.code.as_deref(), Some("7"));
        assert_eq!(invoice, Invoice::default());
    }

    #[test]
    fn unrecognized_root_is_rejected() {
        let err = parse(b"<mystery_notification><account/></mystery_notification>").unwrap_err();
        assert!(
            matches!(&err, Error::UnrecognizedWebhook { name } if name == "mystery_notification"),
            "{err:?}"
        );
    }

    #[test]
    fn empty_document_is_an_xml_error() {
        let err = parse(b"<?xml version=\"1.0\"?>\n").unwrap_err();
        assert!(matches!(err, Error::Xml(_)), "{err:?}");
    }

    #[test]
    fn non_utf8_payload_is_an_xml_error() {
        let err = parse(&[0x3c, 0xff, 0xfe, 0x3e]).unwrap_err();
        assert!(matches!(err, Error::Xml(_)), "{err:?}");
    }
}
