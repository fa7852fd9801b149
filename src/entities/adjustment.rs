use rust_decimal::Decimal;
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

/// Adjustment states accepted by the list filter
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum State {
    Pending,
    Invoiced,
}

/// Whether an adjustment charges or credits the account
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Type {
    Charge,
    Credit,
}

/// A charge or credit on an account.
///
/// On the wire this type has two shapes. Encoding writes only the fields a
/// caller controls (`description`, `accounting_code`, `unit_amount_in_cents`,
/// `quantity`, `currency`, `tax_code`, `tax_exempt`); every server-assigned
/// field is dropped even if set. Decoding accepts the full document,
/// resolving the `<account href>` and `<invoice href>` links to codes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Adjustment {
    /// Code of the owning account. Read only.
    pub account_code: Option<String>,
    /// Number of the invoice this was billed on, once invoiced. Read only.
    pub invoice_number: Option<u32>,
    pub uuid: Option<Uuid>,
    pub state: Option<String>,
    pub description: Option<String>,
    pub accounting_code: Option<String>,
    pub product_code: Option<String>,
    pub origin: Option<String>,
    /// Positive for charges, negative for credits.
    pub unit_amount_in_cents: i64,
    pub quantity: Option<i32>,
    pub original_adjustment_uuid: Option<Uuid>,
    pub discount_in_cents: Option<i64>,
    pub tax_in_cents: Option<i64>,
    pub total_in_cents: Option<i64>,
    pub currency: String,
    pub taxable: Option<bool>,
    pub tax_code: Option<String>,
    pub tax_type: Option<String>,
    pub tax_region: Option<String>,
    pub tax_rate: Option<Decimal>,
    pub tax_exempt: Option<bool>,
    pub tax_details: Vec<TaxDetail>,
    pub start_date: Option<OffsetDateTime>,
    pub end_date: Option<OffsetDateTime>,
    pub created_at: Option<OffsetDateTime>,
}

/// One line of an adjustment's tax breakdown. Read only: never encoded.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct TaxDetail {
    #[serde(default, deserialize_with = "null_scalar")]
    pub name: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "null_scalar")]
    pub tax_type: Option<String>,
    #[serde(default, deserialize_with = "null_scalar")]
    pub tax_rate: Option<Decimal>,
    #[serde(default, deserialize_with = "null_scalar")]
    pub tax_in_cents: Option<i64>,
}

impl Adjustment {
    /// A charge (or, with a negative amount, a credit) ready to be created.
    #[must_use]
    pub fn new(unit_amount_in_cents: i64, currency: impl Into<String>) -> Self {
        Self {
            unit_amount_in_cents,
            currency: currency.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_quantity(mut self, quantity: i32) -> Self {
        self.quantity = Some(quantity);
        self
    }

    /// The request body sent when creating this adjustment.
    pub fn to_xml(&self) -> Result<String> {
        Ok(quick_xml::se::to_string(self)?)
    }

    /// Decode an `<adjustment>` document.
    pub fn from_xml(xml: &str) -> Result<Self> {
        Ok(quick_xml::de::from_str(xml)?)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename = "adjustment")]
struct AdjustmentWrite<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    accounting_code: Option<&'a str>,
    unit_amount_in_cents: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    quantity: Option<i32>,
    currency: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    tax_code: Option<&'a str>,
    #[serde(with = "null_bool", skip_serializing_if = "Option::is_none")]
    tax_exempt: Option<bool>,
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|value| !value.is_empty())
}

// Empty strings and a zero quantity are treated as unset and left out.
impl<'a> From<&'a Adjustment> for AdjustmentWrite<'a> {
    fn from(adjustment: &'a Adjustment) -> Self {
        Self {
            description: non_empty(adjustment.description.as_ref()),
            accounting_code: non_empty(adjustment.accounting_code.as_ref()),
            unit_amount_in_cents: adjustment.unit_amount_in_cents,
            quantity: adjustment.quantity.filter(|quantity| *quantity != 0),
            currency: &adjustment.currency,
            tax_code: non_empty(adjustment.tax_code.as_ref()),
            tax_exempt: adjustment.tax_exempt,
        }
    }
}

impl Serialize for Adjustment {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        AdjustmentWrite::from(self).serialize(serializer)
    }
}

#[derive(Debug, Default, Deserialize)]
struct TaxDetails {
    #[serde(rename = "tax_detail", default)]
    items: Vec<TaxDetail>,
}

#[derive(Debug, Deserialize)]
struct AdjustmentRead {
    #[serde(default, deserialize_with = "linked_code")]
    account: Option<String>,
    #[serde(default, deserialize_with = "linked_code")]
    invoice: Option<u32>,
    #[serde(default, deserialize_with = "null_scalar")]
    uuid: Option<Uuid>,
    #[serde(default, deserialize_with = "null_scalar")]
    state: Option<String>,
    #[serde(default, deserialize_with = "null_scalar")]
    description: Option<String>,
    #[serde(default, deserialize_with = "null_scalar")]
    accounting_code: Option<String>,
    #[serde(default, deserialize_with = "null_scalar")]
    product_code: Option<String>,
    #[serde(default, deserialize_with = "null_scalar")]
    origin: Option<String>,
    #[serde(default, deserialize_with = "null_scalar")]
    unit_amount_in_cents: Option<i64>,
    #[serde(default, deserialize_with = "null_scalar")]
    quantity: Option<i32>,
    #[serde(default, deserialize_with = "null_scalar")]
    original_adjustment_uuid: Option<Uuid>,
    #[serde(default, deserialize_with = "null_scalar")]
    discount_in_cents: Option<i64>,
    #[serde(default, deserialize_with = "null_scalar")]
    tax_in_cents: Option<i64>,
    #[serde(default, deserialize_with = "null_scalar")]
    total_in_cents: Option<i64>,
    #[serde(default, deserialize_with = "null_scalar")]
    currency: Option<String>,
    #[serde(default, deserialize_with = "null_bool::deserialize")]
    taxable: Option<bool>,
    #[serde(default, deserialize_with = "null_scalar")]
    tax_code: Option<String>,
    #[serde(default, deserialize_with = "null_scalar")]
    tax_type: Option<String>,
    #[serde(default, deserialize_with = "null_scalar")]
    tax_region: Option<String>,
    #[serde(default, deserialize_with = "null_scalar")]
    tax_rate: Option<Decimal>,
    #[serde(default, deserialize_with = "null_bool::deserialize")]
    tax_exempt: Option<bool>,
    #[serde(default)]
    tax_details: TaxDetails,
    #[serde(default, deserialize_with = "null_time::deserialize")]
    start_date: Option<OffsetDateTime>,
    #[serde(default, deserialize_with = "null_time::deserialize")]
    end_date: Option<OffsetDateTime>,
    #[serde(default, deserialize_with = "null_time::deserialize")]
    created_at: Option<OffsetDateTime>,
}

impl From<AdjustmentRead> for Adjustment {
    fn from(v: AdjustmentRead) -> Self {
        Self {
            account_code: v.account,
            invoice_number: v.invoice,
            uuid: v.uuid,
            state: v.state,
            description: v.description,
            accounting_code: v.accounting_code,
            product_code: v.product_code,
            origin: v.origin,
            unit_amount_in_cents: v.unit_amount_in_cents.unwrap_or_default(),
            quantity: v.quantity,
            original_adjustment_uuid: v.original_adjustment_uuid,
            discount_in_cents: v.discount_in_cents,
            tax_in_cents: v.tax_in_cents,
            total_in_cents: v.total_in_cents,
            currency: v.currency.unwrap_or_default(),
            taxable: v.taxable,
            tax_code: v.tax_code,
            tax_type: v.tax_type,
            tax_region: v.tax_region,
            tax_rate: v.tax_rate,
            tax_exempt: v.tax_exempt,
            tax_details: v.tax_details.items,
            start_date: v.start_date,
            end_date: v.end_date,
            created_at: v.created_at,
        }
    }
}

impl<'de> Deserialize<'de> for Adjustment {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        AdjustmentRead::deserialize(deserializer).map(Self::from)
    }
}

/// Parameters for listing adjustments
#[derive(Debug, Serialize, Default, Clone)]
pub struct ListParameters {
    /// Page size, up to 200
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,

    /// Opaque cursor from a previous page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<State>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub r#type: Option<Type>,
}

impl ListParameters {
    #[must_use]
    pub fn builder() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }

    #[must_use]
    pub fn with_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }

    #[must_use]
    pub fn with_state(mut self, state: State) -> Self {
        self.state = Some(state);
        self
    }

    #[must_use]
    pub fn with_type(mut self, r#type: Type) -> Self {
        self.r#type = Some(r#type);
        self
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListResponse {
    #[serde(rename = "adjustment", default)]
    pub adjustments: Vec<Adjustment>,
}

/// Retrieve all charges and credits issued for an account.
#[instrument(skip(client))]
pub async fn list(
    client: &Client,
    account_code: &str,
    parameters: &ListParameters,
) -> Result<Vec<Adjustment>> {
    let endpoint = RecurlyEndpoint::AccountAdjustments(account_code.to_string());
    let response: ListResponse = client.get(endpoint, parameters).await?;
    debug!(count = response.adjustments.len(), "listed adjustments");
    Ok(response.adjustments)
}

/// Retrieve a single adjustment by its UUID.
#[instrument(skip(client))]
pub async fn get(client: &Client, uuid: Uuid) -> Result<Adjustment> {
    client.get(RecurlyEndpoint::Adjustment(uuid), &()).await
}

/// Create a one-time charge or credit on an account. Charges are invoiced
/// when the account's subscription renews or an invoice is posted.
#[instrument(skip(client, adjustment))]
pub async fn create(
    client: &Client,
    account_code: &str,
    adjustment: &Adjustment,
) -> Result<Adjustment> {
    info!(account_code, "creating adjustment");
    let endpoint = RecurlyEndpoint::AccountAdjustments(account_code.to_string());
    client.post(endpoint, adjustment).await
}

/// Remove a non-invoiced adjustment from its account.
#[instrument(skip(client))]
pub async fn delete(client: &Client, uuid: Uuid) -> Result<()> {
    client.delete(RecurlyEndpoint::Adjustment(uuid)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use time::macros::datetime;

    const FULL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
        <adjustment href="https://example.recurly.com/v2/adjustments/626db120a2f14a8f9d6ac2b95a78c1d3" type="charge">
          <account href="https://example.recurly.com/v2/accounts/100"/>
          <invoice href="https://example.recurly.com/v2/invoices/1108"/>
          <uuid>626db120a2f14a8f9d6ac2b95a78c1d3</uuid>
          <state>invoiced</state>
          <description>Charge for extra bandwidth</description>
          <accounting_code>bandwidth</accounting_code>
          <product_code>basic</product_code>
          <origin>debit</origin>
          <unit_amount_in_cents type="integer">5000</unit_amount_in_cents>
          <quantity type="integer">1</quantity>
          <original_adjustment_uuid nil="true"></original_adjustment_uuid>
          <discount_in_cents type="integer">0</discount_in_cents>
          <tax_in_cents type="integer">438</tax_in_cents>
          <total_in_cents type="integer">5438</total_in_cents>
          <currency>USD</currency>
          <taxable type="boolean">false</taxable>
          <tax_code nil="true"></tax_code>
          <tax_type>usst</tax_type>
          <tax_region>CA</tax_region>
          <tax_rate type="float">0.0875</tax_rate>
          <tax_exempt type="boolean">false</tax_exempt>
          <tax_details type="array">
            <tax_detail>
              <name>california</name>
              <type>state</type>
              <tax_rate type="float">0.065</tax_rate>
              <tax_in_cents type="integer">325</tax_in_cents>
            </tax_detail>
            <tax_detail>
              <name>san francisco</name>
              <type>city</type>
              <tax_rate type="float">0.0225</tax_rate>
              <tax_in_cents type="integer">113</tax_in_cents>
            </tax_detail>
          </tax_details>
          <start_date type="datetime">2015-02-04T23:13:07Z</start_date>
          <end_date nil="true"></end_date>
          <created_at type="datetime">2015-02-04T23:13:07Z</created_at>
          <some_future_field>ignored</some_future_field>
        </adjustment>"#;

    #[test]
    fn decodes_full_read_model() {
        let adjustment = Adjustment::from_xml(FULL).unwrap();

        assert_eq!(adjustment.account_code.as_deref(), Some("100"));
        assert_eq!(adjustment.invoice_number, Some(1108));
        assert_eq!(
            adjustment.uuid,
            Some(Uuid::parse_str("626db120a2f14a8f9d6ac2b95a78c1d3").unwrap())
        );
        assert_eq!(adjustment.state.as_deref(), Some("invoiced"));
        assert_eq!(adjustment.unit_amount_in_cents, 5000);
        assert_eq!(adjustment.quantity, Some(1));
        assert_eq!(adjustment.original_adjustment_uuid, None);
        assert_eq!(adjustment.total_in_cents, Some(5438));
        assert_eq!(adjustment.currency, "USD");
        assert_eq!(adjustment.taxable, Some(false));
        assert_eq!(adjustment.tax_code, None);
        assert_eq!(adjustment.tax_rate, Some(dec!(0.0875)));
        assert_eq!(adjustment.tax_exempt, Some(false));
        assert_eq!(adjustment.start_date, Some(datetime!(2015-02-04 23:13:07 UTC)));
        assert_eq!(adjustment.end_date, None);

        assert_eq!(
            adjustment.tax_details,
            vec![
                TaxDetail {
                    name: Some("california".to_string()),
                    tax_type: Some("state".to_string()),
                    tax_rate: Some(dec!(0.065)),
                    tax_in_cents: Some(325),
                },
                TaxDetail {
                    name: Some("san francisco".to_string()),
                    tax_type: Some("city".to_string()),
                    tax_rate: Some(dec!(0.0225)),
                    tax_in_cents: Some(113),
                },
            ]
        );
    }

    #[test]
    fn minimal_document_decodes_to_defaults() {
        let adjustment =
            Adjustment::from_xml("<adjustment><currency>EUR</currency></adjustment>").unwrap();
        assert_eq!(adjustment.currency, "EUR");
        assert_eq!(adjustment.unit_amount_in_cents, 0);
        assert!(adjustment.tax_details.is_empty());
        assert_eq!(adjustment.account_code, None);
        assert_eq!(adjustment.created_at, None);
    }

    #[test]
    fn write_model_omits_server_assigned_fields() {
        let adjustment = Adjustment::from_xml(FULL).unwrap();
        let xml = adjustment.to_xml().unwrap();

        assert!(xml.starts_with("<adjustment>"), "{xml}");
        for field in [
            "uuid",
            "state",
            "account",
            "invoice",
            "total_in_cents",
            "tax_in_cents",
            "discount_in_cents",
            "tax_details",
            "tax_rate",
            "taxable",
            "created_at",
            "product_code",
        ] {
            assert!(!xml.contains(&format!("<{field}>")), "{field} leaked into {xml}");
        }
        assert!(xml.contains("<description>Charge for extra bandwidth</description>"));
        assert!(xml.contains("<accounting_code>bandwidth</accounting_code>"));
        assert!(xml.contains("<unit_amount_in_cents>5000</unit_amount_in_cents>"));
        assert!(xml.contains("<quantity>1</quantity>"));
        assert!(xml.contains("<currency>USD</currency>"));
        assert!(xml.contains("<tax_exempt>false</tax_exempt>"));
    }

    #[test]
    fn write_model_omits_empty_optionals() {
        let xml = Adjustment::new(-1500, "USD").to_xml().unwrap();
        assert_eq!(
            xml,
            "<adjustment><unit_amount_in_cents>-1500</unit_amount_in_cents><currency>USD</currency></adjustment>"
        );
    }

    #[test]
    fn write_model_omits_blank_strings_and_zero_quantity() {
        let mut adjustment = Adjustment::new(100, "USD")
            .with_description("")
            .with_quantity(0);
        adjustment.accounting_code = Some(String::new());
        adjustment.tax_code = Some(String::new());

        let xml = adjustment.to_xml().unwrap();
        assert_eq!(
            xml,
            "<adjustment><unit_amount_in_cents>100</unit_amount_in_cents><currency>USD</currency></adjustment>"
        );

        let echoed = Adjustment::from_xml(&xml).unwrap();
        assert_eq!(echoed.description, None);
        assert_eq!(echoed.quantity, None);
    }

    #[test]
    fn caller_fields_survive_a_round_trip() {
        let original = Adjustment::new(2000, "USD")
            .with_description("Setup fee")
            .with_quantity(3);
        let echoed = Adjustment::from_xml(&original.to_xml().unwrap()).unwrap();

        assert_eq!(echoed.description, original.description);
        assert_eq!(echoed.unit_amount_in_cents, original.unit_amount_in_cents);
        assert_eq!(echoed.quantity, original.quantity);
        assert_eq!(echoed.currency, original.currency);
    }

    #[test]
    fn list_parameters_as_query() {
        let params = ListParameters::builder()
            .with_per_page(50)
            .with_state(State::Pending)
            .with_type(Type::Credit);
        let request = reqwest::Client::new()
            .get("https://example.recurly.com/v2/accounts/1/adjustments")
            .query(&params)
            .build()
            .unwrap();
        assert_eq!(request.url().query(), Some("per_page=50&state=pending&type=credit"));
    }

    #[test]
    fn empty_list_response() {
        let response: ListResponse =
            quick_xml::de::from_str(r#"<adjustments type="array"></adjustments>"#).unwrap();
        assert!(response.adjustments.is_empty());

        let response: ListResponse = quick_xml::de::from_str("<adjustments/>").unwrap();
        assert!(response.adjustments.is_empty());
    }
}
