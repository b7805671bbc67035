//! # Fund-Transfer Model
//!
//! Strongly typed view of an accepted ISO-20022-style fund-transfer
//! instruction. Values are materialized from a [`CanonicalRecord`]
//! produced by the fund-transfer schema, so every constraint (lengths,
//! positivity, date validity) already holds when one of these exists.
//!
//! Amounts are `rust_decimal::Decimal`, never `f64`.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::digest::{record_digest, ContentDigest};
use crate::error::{ModelError, XferError};
use crate::record::{CanonicalRecord, CanonicalValue};

/// An accepted request together with the digest of its canonical form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedTransfer {
    pub request: FundTransferRequest,
    pub digest: ContentDigest,
}

impl AcceptedTransfer {
    /// Materialize the typed model and digest the canonical record.
    ///
    /// # Errors
    ///
    /// `XferError::Model` if the record does not have the transfer shape,
    /// `XferError::Canonicalization` if it cannot be serialized.
    pub fn from_record(record: &CanonicalRecord) -> Result<Self, XferError> {
        let request = FundTransferRequest::try_from(record)?;
        let digest = record_digest(record)?;
        Ok(Self { request, digest })
    }
}

/// The root transfer instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundTransferRequest {
    /// Transaction amount in THB, strictly positive.
    pub amount: Decimal,
    /// End-to-end transaction identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_to_end_id: Option<String>,
    /// Category purpose code (e.g. `RFT`).
    pub category_purpose: String,
    /// Bahtnet reference number, conventionally `BBBBTSSSSS`.
    pub reference_no: String,
    /// Message type (e.g. `008`).
    pub message_type: String,
    /// Transaction date.
    pub date: NaiveDate,
    /// Free-text instruction for the creditor agent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instruction_for_cdtr_agent: Option<String>,
    /// Creditor party.
    pub cdtr: Creditor,
    /// Debtor party.
    pub dbtr: Debtor,
}

/// Creditor party.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Creditor {
    pub account: String,
    /// BIC of the creditor agent.
    pub agent: String,
    pub name_en: String,
    pub name_th: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_info: Option<AddressInfo>,
}

/// Debtor party.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Debtor {
    pub account: String,
    pub name_en: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_th: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dbtr_card_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dbtr_card_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dbtr_date_of_birth: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dbtr_birth_place: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dbtr_birth_country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_info: Option<AddressInfo>,
}

/// Postal address block shared by creditor and debtor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_sub_department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_street: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_building_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_building_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_floor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_post_box: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_room: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_post_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_town_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_district_name: Option<String>,
    /// ISO 3166 alpha-2 country code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_line1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_line2: Option<String>,
}

impl TryFrom<&CanonicalRecord> for FundTransferRequest {
    type Error = ModelError;

    fn try_from(r: &CanonicalRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            amount: required(r, "amount", decimal)?,
            end_to_end_id: optional(r, "endToEndId", text)?,
            category_purpose: required(r, "categoryPurpose", text)?,
            reference_no: required(r, "referenceNo", text)?,
            message_type: required(r, "messageType", text)?,
            date: required(r, "date", date)?,
            instruction_for_cdtr_agent: optional(r, "instructionForCdtrAgent", text)?,
            cdtr: Creditor::try_from(required(r, "cdtr", record)?)?,
            dbtr: Debtor::try_from(required(r, "dbtr", record)?)?,
        })
    }
}

impl TryFrom<&CanonicalRecord> for Creditor {
    type Error = ModelError;

    fn try_from(r: &CanonicalRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            account: required(r, "account", text)?,
            agent: required(r, "agent", text)?,
            name_en: required(r, "nameEn", text)?,
            name_th: required(r, "nameTh", text)?,
            address_info: optional(r, "addressInfo", record)?
                .map(AddressInfo::try_from)
                .transpose()?,
        })
    }
}

impl TryFrom<&CanonicalRecord> for Debtor {
    type Error = ModelError;

    fn try_from(r: &CanonicalRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            account: required(r, "account", text)?,
            name_en: required(r, "nameEn", text)?,
            name_th: optional(r, "nameTh", text)?,
            dbtr_card_type: optional(r, "dbtrCardType", text)?,
            dbtr_card_no: optional(r, "dbtrCardNo", text)?,
            dbtr_date_of_birth: optional(r, "dbtrDateOfBirth", date)?,
            dbtr_birth_place: optional(r, "dbtrBirthPlace", text)?,
            dbtr_birth_country: optional(r, "dbtrBirthCountry", text)?,
            address_info: optional(r, "addressInfo", record)?
                .map(AddressInfo::try_from)
                .transpose()?,
        })
    }
}

impl TryFrom<&CanonicalRecord> for AddressInfo {
    type Error = ModelError;

    fn try_from(r: &CanonicalRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            address_department: optional(r, "addressDepartment", text)?,
            address_sub_department: optional(r, "addressSubDepartment", text)?,
            address_street: optional(r, "addressStreet", text)?,
            address_building_no: optional(r, "addressBuildingNo", text)?,
            address_building_name: optional(r, "addressBuildingName", text)?,
            address_floor: optional(r, "addressFloor", text)?,
            address_post_box: optional(r, "addressPostBox", text)?,
            address_room: optional(r, "addressRoom", text)?,
            address_post_code: optional(r, "addressPostCode", text)?,
            address_town_name: optional(r, "addressTownName", text)?,
            address_district_name: optional(r, "addressDistrictName", text)?,
            address_country: optional(r, "addressCountry", text)?,
            address_line1: optional(r, "addressLine1", text)?,
            address_line2: optional(r, "addressLine2", text)?,
        })
    }
}

/// Extracts a typed value from a canonical value, or names what it found.
type Extract<'a, T> = fn(&'a CanonicalValue) -> Result<T, (&'static str, &'static str)>;

fn text(v: &CanonicalValue) -> Result<String, (&'static str, &'static str)> {
    match v {
        CanonicalValue::Text(s) => Ok(s.clone()),
        other => Err(("text", other.type_name())),
    }
}

fn decimal(v: &CanonicalValue) -> Result<Decimal, (&'static str, &'static str)> {
    match v {
        CanonicalValue::Decimal(d) => Ok(*d),
        other => Err(("decimal", other.type_name())),
    }
}

fn date(v: &CanonicalValue) -> Result<NaiveDate, (&'static str, &'static str)> {
    match v {
        CanonicalValue::Date(d) => Ok(*d),
        other => Err(("date", other.type_name())),
    }
}

fn record(v: &CanonicalValue) -> Result<&CanonicalRecord, (&'static str, &'static str)> {
    match v {
        CanonicalValue::Record(r) => Ok(r),
        other => Err(("record", other.type_name())),
    }
}

fn optional<'a, T>(
    r: &'a CanonicalRecord,
    field: &str,
    extract: Extract<'a, T>,
) -> Result<Option<T>, ModelError> {
    r.get(field)
        .map(|v| {
            extract(v).map_err(|(expected, found)| ModelError::WrongType {
                schema: r.schema().to_string(),
                field: field.to_string(),
                expected,
                found,
            })
        })
        .transpose()
}

fn required<'a, T>(
    r: &'a CanonicalRecord,
    field: &str,
    extract: Extract<'a, T>,
) -> Result<T, ModelError> {
    optional(r, field, extract)?.ok_or_else(|| ModelError::MissingField {
        schema: r.schema().to_string(),
        field: field.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_value(s: &str) -> CanonicalValue {
        CanonicalValue::Text(s.to_string())
    }

    fn minimal_record() -> CanonicalRecord {
        let mut cdtr = CanonicalRecord::new("Creditor");
        cdtr.insert("account", text_value("123"));
        cdtr.insert("agent", text_value("BIC1"));
        cdtr.insert("nameEn", text_value("A"));
        cdtr.insert("nameTh", text_value("ก"));

        let mut dbtr = CanonicalRecord::new("Debtor");
        dbtr.insert("account", text_value("456"));
        dbtr.insert("nameEn", text_value("B"));

        let mut root = CanonicalRecord::new("IsoRequest");
        root.insert("amount", CanonicalValue::Decimal(Decimal::new(1000, 2)));
        root.insert("categoryPurpose", text_value("RFT"));
        root.insert("referenceNo", text_value("0700800001"));
        root.insert("messageType", text_value("008"));
        root.insert(
            "date",
            CanonicalValue::Date(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()),
        );
        root.insert("cdtr", CanonicalValue::Record(cdtr));
        root.insert("dbtr", CanonicalValue::Record(dbtr));
        root
    }

    #[test]
    fn materializes_minimal_request() {
        let req = FundTransferRequest::try_from(&minimal_record()).unwrap();
        assert_eq!(req.amount, Decimal::new(1000, 2));
        assert_eq!(req.cdtr.name_th, "ก");
        assert_eq!(req.dbtr.name_th, None);
        assert!(req.cdtr.address_info.is_none());
        assert!(req.end_to_end_id.is_none());
    }

    #[test]
    fn missing_field_is_named() {
        let mut r = CanonicalRecord::new("IsoRequest");
        r.insert("amount", CanonicalValue::Decimal(Decimal::ONE));
        let err = FundTransferRequest::try_from(&r).unwrap_err();
        assert_eq!(
            err,
            ModelError::MissingField {
                schema: "IsoRequest".into(),
                field: "categoryPurpose".into(),
            }
        );
    }

    #[test]
    fn wrong_type_is_reported() {
        let mut r = CanonicalRecord::new("IsoRequest");
        r.insert("amount", text_value("10.00"));
        let err = FundTransferRequest::try_from(&r).unwrap_err();
        assert!(matches!(
            err,
            ModelError::WrongType { expected: "decimal", found: "text", .. }
        ));
    }

    #[test]
    fn accepted_transfer_carries_digest() {
        let record = minimal_record();
        let accepted = AcceptedTransfer::from_record(&record).unwrap();
        assert_eq!(accepted.digest, record_digest(&record).unwrap());
        assert_eq!(accepted.request.reference_no, "0700800001");

        let err = AcceptedTransfer::from_record(&CanonicalRecord::new("Other")).unwrap_err();
        assert!(matches!(err, XferError::Model(ModelError::MissingField { .. })));
    }

    #[test]
    fn serializes_with_wire_names() {
        let req = FundTransferRequest::try_from(&minimal_record()).unwrap();
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["referenceNo"], "0700800001");
        assert_eq!(json["cdtr"]["nameEn"], "A");
        assert!(json.get("endToEndId").is_none());
    }
}
