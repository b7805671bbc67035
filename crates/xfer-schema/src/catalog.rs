//! # Fund-Transfer Catalog
//!
//! The built-in schema tree for the ISO-20022-style third-party fund
//! transfer request:
//!
//! ```text
//! IsoRequest
//! ├── cdtr: IsoRequestCdtr (required)
//! │   └── addressInfo: IsoRequestCdtrAddressInfo (optional)
//! └── dbtr: IsoRequestDbtr (required)
//!     └── addressInfo: IsoRequestDbtrAddressInfo (optional)
//! ```
//!
//! Text limits follow the ISO 20022 `PostalAddress` and party
//! identification element sizes. `referenceNo` is conventionally
//! `BBBBTSSSSS` (branch, application code, sequence) but only its length
//! is enforced.

use crate::constraint::{DateFormat, Pattern};
use crate::descriptor::FieldDescriptor;
use crate::error::SchemaDefinitionError;
use crate::registry::SchemaRegistry;
use crate::schema::NodeSchema;

/// Root schema id of the catalog.
pub const ROOT: &str = "IsoRequest";
pub const CREDITOR: &str = "IsoRequestCdtr";
pub const DEBTOR: &str = "IsoRequestDbtr";
pub const CREDITOR_ADDRESS: &str = "IsoRequestCdtrAddressInfo";
pub const DEBTOR_ADDRESS: &str = "IsoRequestDbtrAddressInfo";

/// BIC-shaped agent identifier, case-sensitive.
pub const BIC_PATTERN: &str = "[A-Z0-9]{4,11}";

/// Build the fund-transfer registry.
///
/// # Errors
///
/// Fails only if the catalog declarations themselves are malformed.
pub fn fund_transfer_registry() -> Result<SchemaRegistry, SchemaDefinitionError> {
    SchemaRegistry::builder(ROOT)
        .node(iso_request())
        .node(creditor()?)
        .node(debtor())
        .node(address_info(CREDITOR_ADDRESS))
        .node(address_info(DEBTOR_ADDRESS))
        .build()
}

fn iso_request() -> NodeSchema {
    NodeSchema::new(ROOT)
        .describe("ISO Request")
        .field(
            FieldDescriptor::decimal("amount")
                .required()
                .positive()
                .digits(13, 2)
                .describe("Transaction amount in THB. Must be greater than 0."),
        )
        .field(
            FieldDescriptor::text("endToEndId")
                .max_length(36)
                .describe("Unique end-to-end transaction identifier."),
        )
        .field(
            FieldDescriptor::text("categoryPurpose")
                .required()
                .max_length(4)
                .describe("Transaction category purpose code (e.g. RFT)."),
        )
        .field(
            FieldDescriptor::text("referenceNo")
                .required()
                .max_length(10)
                .describe("Reference number, conventionally BBBBTSSSSS."),
        )
        .field(
            FieldDescriptor::text("messageType")
                .required()
                .max_length(3)
                .describe("Transaction message type (e.g. 008)."),
        )
        .field(
            FieldDescriptor::date("date", DateFormat::IsoDate)
                .required()
                .describe("Transaction date."),
        )
        .field(
            FieldDescriptor::text("instructionForCdtrAgent")
                .max_length(140)
                .describe("Free-text transfer purpose."),
        )
        .field(FieldDescriptor::record("cdtr", CREDITOR).required().describe("Creditor"))
        .field(FieldDescriptor::record("dbtr", DEBTOR).required().describe("Debtor"))
}

fn creditor() -> Result<NodeSchema, SchemaDefinitionError> {
    Ok(NodeSchema::new(CREDITOR)
        .describe("Creditor")
        .field(
            FieldDescriptor::text("account")
                .required()
                .max_length(34)
                .describe("Creditor's account number."),
        )
        .field(
            FieldDescriptor::text("agent")
                .required()
                .max_length(11)
                .pattern(Pattern::new(BIC_PATTERN, "must be a valid BIC code")?)
                .describe("Creditor's BIC code."),
        )
        .field(
            FieldDescriptor::text("nameEn")
                .required()
                .max_length(140)
                .describe("Creditor's name in English."),
        )
        .field(
            FieldDescriptor::text("nameTh")
                .required()
                .max_length(140)
                .describe("Creditor's name in Thai."),
        )
        .field(FieldDescriptor::record("addressInfo", CREDITOR_ADDRESS)))
}

fn debtor() -> NodeSchema {
    NodeSchema::new(DEBTOR)
        .describe("Debtor")
        .field(
            FieldDescriptor::text("account")
                .required()
                .max_length(34)
                .describe("Debtor's account number."),
        )
        .field(
            FieldDescriptor::text("nameEn")
                .required()
                .max_length(140)
                .describe("Debtor's name in English."),
        )
        .field(
            FieldDescriptor::text("nameTh")
                .max_length(140)
                .describe("Debtor's name in Thai."),
        )
        .field(
            FieldDescriptor::text("dbtrCardType")
                .max_length(4)
                .describe("Type of the debtor's identification card."),
        )
        .field(
            FieldDescriptor::text("dbtrCardNo")
                .max_length(35)
                .describe("Debtor's identification card number."),
        )
        .field(
            FieldDescriptor::date("dbtrDateOfBirth", DateFormat::IsoDate)
                .describe("Debtor's date of birth."),
        )
        .field(
            FieldDescriptor::text("dbtrBirthPlace")
                .max_length(35)
                .describe("Debtor's place of birth."),
        )
        .field(
            FieldDescriptor::text("dbtrBirthCountry")
                .max_length(2)
                .describe("Debtor's birth country in ISO format."),
        )
        .field(FieldDescriptor::record("addressInfo", DEBTOR_ADDRESS))
}

/// Postal address block shared by creditor and debtor.
fn address_info(id: &str) -> NodeSchema {
    const FIELDS: [(&str, usize); 14] = [
        ("addressDepartment", 70),
        ("addressSubDepartment", 70),
        ("addressStreet", 70),
        ("addressBuildingNo", 16),
        ("addressBuildingName", 35),
        ("addressFloor", 70),
        ("addressPostBox", 16),
        ("addressRoom", 70),
        ("addressPostCode", 16),
        ("addressTownName", 35),
        ("addressDistrictName", 35),
        ("addressCountry", 2),
        ("addressLine1", 70),
        ("addressLine2", 70),
    ];

    FIELDS
        .iter()
        .fold(NodeSchema::new(id), |node, (name, max)| {
            node.field(FieldDescriptor::text(*name).max_length(*max))
        })
}
