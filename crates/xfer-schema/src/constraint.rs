//! # Constraint Primitives
//!
//! Atomic checks over a raw field value. Every primitive is a pure
//! function of its parameters and the value as received; none of them
//! coerce, and none of them stop evaluation of sibling constraints.
//!
//! The set of kinds is closed (`Constraint` is an enum) so that the
//! engine dispatches with an exhaustive `match` instead of trait objects.
//!
//! | Kind         | Fails when                                         | Reports           |
//! |--------------|----------------------------------------------------|-------------------|
//! | `Required`   | value absent, null, or blank text                  | `MissingRequired` |
//! | `MaxLength`  | more than `n` Unicode scalars                      | `LengthExceeded`  |
//! | `Pattern`    | trimmed text does not fully match                  | `PatternMismatch` |
//! | `Positive`   | coerced number `<= 0`                              | `NotPositive`     |
//! | `Digits`     | too many integral or fractional digits             | `DigitsExceeded`  |
//! | `DateFormat` | trimmed text does not have the date format's shape | `PatternMismatch` |
//! | `Nested`     | the referenced sub-schema reports violations       | `NestedInvalid`   |
//!
//! `Positive` and `Digits` only look at a value that already coerced to a
//! decimal. An uncoercible value is reported once, as `InvalidValue`, by
//! the field descriptor.

use std::borrow::Cow;
use std::str::FromStr;

use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use xfer_core::ViolationKind;

use crate::engine::EvalContext;
use crate::error::{PolicyError, SchemaDefinitionError};
use crate::schema::{NodeOutcome, SchemaId};

/// Discriminant of a [`Constraint`], used by engine policy and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintKind {
    Required,
    MaxLength,
    Pattern,
    Positive,
    Digits,
    DateFormat,
    Nested,
}

impl ConstraintKind {
    /// All kinds in declaration order.
    pub const ALL: [ConstraintKind; 7] = [
        Self::Required,
        Self::MaxLength,
        Self::Pattern,
        Self::Positive,
        Self::Digits,
        Self::DateFormat,
        Self::Nested,
    ];

    /// Stable snake_case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::MaxLength => "max_length",
            Self::Pattern => "pattern",
            Self::Positive => "positive",
            Self::Digits => "digits",
            Self::DateFormat => "date_format",
            Self::Nested => "nested",
        }
    }

    /// Whether engine policy may switch this kind off.
    ///
    /// `Required` and `Nested` decide whether a record can be materialized
    /// at all, so they always run.
    pub fn is_disableable(&self) -> bool {
        !matches!(self, Self::Required | Self::Nested)
    }
}

impl std::fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConstraintKind {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == wanted)
            .ok_or_else(|| PolicyError::UnknownKind(s.to_string()))
    }
}

/// The closed set of supported wire date formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateFormat {
    /// `YYYY-MM-DD`, the wire default.
    IsoDate,
    /// `YYYYMMDD`.
    BasicDate,
}

impl DateFormat {
    /// Shape template: `d` is an ASCII digit, anything else is literal.
    fn template(&self) -> &'static str {
        match self {
            Self::IsoDate => "dddd-dd-dd",
            Self::BasicDate => "dddddddd",
        }
    }

    /// `chrono` parse format.
    pub fn chrono_format(&self) -> &'static str {
        match self {
            Self::IsoDate => "%Y-%m-%d",
            Self::BasicDate => "%Y%m%d",
        }
    }

    /// Human-readable label used in messages and definition documents.
    pub fn label(&self) -> &'static str {
        match self {
            Self::IsoDate => "yyyy-MM-dd",
            Self::BasicDate => "yyyyMMdd",
        }
    }

    /// Resolve a label as written in a definition document.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "yyyy-MM-dd" | "YYYY-MM-DD" => Some(Self::IsoDate),
            "yyyyMMdd" | "YYYYMMDD" => Some(Self::BasicDate),
            _ => None,
        }
    }

    /// Whether `text` has this format's shape. Says nothing about whether
    /// the digits form a real calendar date.
    pub fn matches_shape(&self, text: &str) -> bool {
        let template = self.template();
        text.len() == template.len()
            && text.bytes().zip(template.bytes()).all(|(c, t)| match t {
                b'd' => c.is_ascii_digit(),
                lit => c == lit,
            })
    }

    /// Parse into a calendar date.
    pub fn parse(&self, text: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(text, self.chrono_format()).ok()
    }
}

/// A compiled, fully anchored pattern with its failure message.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
    message: String,
}

impl Pattern {
    /// Compile `source` with full-match semantics.
    ///
    /// # Errors
    ///
    /// Returns `SchemaDefinitionError::InvalidPattern` if the regex does not
    /// compile.
    pub fn new(
        source: impl Into<String>,
        message: impl Into<String>,
    ) -> Result<Self, SchemaDefinitionError> {
        let source = source.into();
        let regex = Regex::new(&format!("^(?:{source})$")).map_err(|e| {
            SchemaDefinitionError::InvalidPattern {
                pattern: source.clone(),
                reason: e.to_string(),
            }
        })?;
        Ok(Self {
            source,
            regex,
            message: message.into(),
        })
    }

    /// The pattern as declared.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Full-match test.
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

/// A field value as received, before coercion.
///
/// Lists and nulls carry no usable value for this schema family and are
/// treated as absent.
#[derive(Debug, Clone)]
pub enum RawValue<'a> {
    /// Missing key, `null`, or a list.
    Absent,
    /// A string, or the textual rendering of a number or boolean.
    Text(Cow<'a, str>),
    /// A JSON object.
    Object(&'a Map<String, Value>),
}

impl<'a> RawValue<'a> {
    /// Interpret a decoded JSON value.
    ///
    /// Numbers keep the literal they were written with (`10.00` stays
    /// `"10.00"`), so decimal coercion and `Digits` see the exact value.
    pub fn from_json(value: Option<&'a Value>) -> Self {
        match value {
            None | Some(Value::Null) | Some(Value::Array(_)) => Self::Absent,
            Some(Value::String(s)) => Self::Text(Cow::Borrowed(s)),
            Some(Value::Number(n)) => Self::Text(Cow::Owned(n.to_string())),
            Some(Value::Bool(b)) => Self::Text(Cow::Owned(b.to_string())),
            Some(Value::Object(m)) => Self::Object(m),
        }
    }

    /// The text, if this is a text value.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns true for [`RawValue::Absent`].
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

/// What a constraint sees: the raw value plus its decimal reading, when
/// the field is numeric and the text parsed.
#[derive(Debug, Clone)]
pub struct Observed<'a> {
    pub raw: RawValue<'a>,
    pub number: Option<Decimal>,
}

/// Result of a single constraint check.
#[derive(Debug)]
pub enum Check {
    Pass,
    Fail {
        kind: ViolationKind,
        message: String,
    },
    /// Outcome of a nested sub-schema (may itself be valid or invalid).
    Nested(NodeOutcome),
}

impl Check {
    fn fail(kind: ViolationKind, message: impl Into<String>) -> Self {
        Self::Fail {
            kind,
            message: message.into(),
        }
    }
}

/// One declared constraint.
#[derive(Debug, Clone)]
pub enum Constraint {
    Required,
    MaxLength(usize),
    Pattern(Pattern),
    Positive,
    Digits { integer: u32, fraction: u32 },
    DateFormat(DateFormat),
    Nested(SchemaId),
}

impl Constraint {
    /// The constraint's kind.
    pub fn kind(&self) -> ConstraintKind {
        match self {
            Self::Required => ConstraintKind::Required,
            Self::MaxLength(_) => ConstraintKind::MaxLength,
            Self::Pattern(_) => ConstraintKind::Pattern,
            Self::Positive => ConstraintKind::Positive,
            Self::Digits { .. } => ConstraintKind::Digits,
            Self::DateFormat(_) => ConstraintKind::DateFormat,
            Self::Nested(_) => ConstraintKind::Nested,
        }
    }

    /// Evaluate against one observed value.
    pub fn check(&self, observed: &Observed<'_>, ctx: &EvalContext<'_>) -> Check {
        match self {
            Self::Required => match &observed.raw {
                RawValue::Absent => Check::fail(ViolationKind::MissingRequired, REQUIRED_MESSAGE),
                RawValue::Text(s) if s.trim().is_empty() => {
                    Check::fail(ViolationKind::MissingRequired, REQUIRED_MESSAGE)
                }
                _ => Check::Pass,
            },
            Self::MaxLength(max) => match observed.raw.text() {
                Some(s) if s.chars().count() > *max => Check::fail(
                    ViolationKind::LengthExceeded,
                    format!("length must not exceed {max} characters"),
                ),
                _ => Check::Pass,
            },
            Self::Pattern(pattern) => match observed.raw.text() {
                Some(s) if !pattern.is_match(s.trim()) => {
                    Check::fail(ViolationKind::PatternMismatch, pattern.message.clone())
                }
                _ => Check::Pass,
            },
            Self::Positive => match observed.number {
                Some(n) if n <= Decimal::ZERO => {
                    Check::fail(ViolationKind::NotPositive, "must be greater than 0")
                }
                _ => Check::Pass,
            },
            Self::Digits { integer, fraction } => match observed.number {
                Some(n) if !digits_within(n, *integer, *fraction) => Check::fail(
                    ViolationKind::DigitsExceeded,
                    format!(
                        "numeric value out of bounds (<{integer} digits>.<{fraction} digits> expected)"
                    ),
                ),
                _ => Check::Pass,
            },
            Self::DateFormat(format) => match observed.raw.text() {
                Some(s) if !format.matches_shape(s.trim()) => Check::fail(
                    ViolationKind::PatternMismatch,
                    format!("Date must be in the format {}", format.label()),
                ),
                _ => Check::Pass,
            },
            Self::Nested(id) => match &observed.raw {
                RawValue::Object(obj) => Check::Nested(ctx.validate_nested(id, obj)),
                _ => Check::Pass,
            },
        }
    }
}

impl std::fmt::Display for Constraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Required => f.write_str("required"),
            Self::MaxLength(n) => write!(f, "max_length({n})"),
            Self::Pattern(p) => write!(f, "pattern({})", p.source()),
            Self::Positive => f.write_str("positive"),
            Self::Digits { integer, fraction } => write!(f, "digits({integer},{fraction})"),
            Self::DateFormat(d) => write!(f, "date_format({})", d.label()),
            Self::Nested(id) => write!(f, "nested({id})"),
        }
    }
}

const REQUIRED_MESSAGE: &str = "must not be null or empty";

/// Read decimal text exactly. Accepts plain and scientific notation.
pub fn parse_decimal(text: &str) -> Option<Decimal> {
    let text = text.trim();
    if text.is_empty() || text.contains('_') {
        return None;
    }
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

/// Integral/fractional digit counts after stripping trailing zeros.
fn digits_within(n: Decimal, integer: u32, fraction: u32) -> bool {
    let n = n.abs().normalize();
    let integral = n.trunc();
    let integral_digits = if integral.is_zero() {
        0
    } else {
        integral.to_string().len() as u32
    };
    integral_digits <= integer && n.scale() <= fraction
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EnginePolicy;
    use crate::registry::SchemaRegistry;

    fn observed(raw: RawValue<'_>) -> Observed<'_> {
        let number = raw.text().and_then(parse_decimal);
        Observed { raw, number }
    }

    fn text(s: &str) -> RawValue<'_> {
        RawValue::Text(Cow::Borrowed(s))
    }

    fn run(c: &Constraint, p: &Observed<'_>) -> Option<(ViolationKind, String)> {
        let registry = SchemaRegistry::empty();
        let policy = EnginePolicy::default();
        let ctx = EvalContext::new(&registry, &policy);
        match c.check(p, &ctx) {
            Check::Pass => None,
            Check::Fail { kind, message } => Some((kind, message)),
            Check::Nested(_) => panic!("unexpected nested outcome"),
        }
    }

    #[test]
    fn required_rejects_absent_and_blank() {
        assert!(run(&Constraint::Required, &observed(RawValue::Absent)).is_some());
        let (kind, msg) = run(&Constraint::Required, &observed(text("   "))).unwrap();
        assert_eq!(kind, ViolationKind::MissingRequired);
        assert_eq!(msg, "must not be null or empty");
        assert!(run(&Constraint::Required, &observed(text("RFT"))).is_none());
    }

    #[test]
    fn max_length_counts_scalars_not_bytes() {
        // 4 Thai characters = 12 UTF-8 bytes.
        let thai = "กขคง";
        assert!(run(&Constraint::MaxLength(4), &observed(text(thai))).is_none());
        let (kind, msg) = run(&Constraint::MaxLength(3), &observed(text(thai))).unwrap();
        assert_eq!(kind, ViolationKind::LengthExceeded);
        assert_eq!(msg, "length must not exceed 3 characters");
    }

    #[test]
    fn max_length_ignores_absent() {
        assert!(run(&Constraint::MaxLength(1), &observed(RawValue::Absent)).is_none());
    }

    #[test]
    fn pattern_is_full_match_on_trimmed_text() {
        let c = Constraint::Pattern(Pattern::new(r"\d{3}", "must be three digits").unwrap());
        assert!(run(&c, &observed(text(" 008 "))).is_none());
        let (kind, _) = run(&c, &observed(text("0081"))).unwrap();
        assert_eq!(kind, ViolationKind::PatternMismatch);
        assert!(run(&c, &observed(text("x008"))).is_some());
    }

    #[test]
    fn invalid_pattern_is_a_definition_error() {
        let err = Pattern::new("(unclosed", "x").unwrap_err();
        assert!(matches!(err, SchemaDefinitionError::InvalidPattern { .. }));
    }

    #[test]
    fn positive_only_judges_numbers() {
        let (kind, msg) = run(&Constraint::Positive, &observed(text("-5"))).unwrap();
        assert_eq!(kind, ViolationKind::NotPositive);
        assert_eq!(msg, "must be greater than 0");
        assert!(run(&Constraint::Positive, &observed(text("0"))).is_some());
        assert!(run(&Constraint::Positive, &observed(text("0.01"))).is_none());
        // Uncoercible text is left to the descriptor's InvalidValue.
        assert!(run(&Constraint::Positive, &observed(text("abc"))).is_none());
    }

    #[test]
    fn digits_strips_trailing_zeros() {
        let c = Constraint::Digits { integer: 13, fraction: 2 };
        assert!(run(&c, &observed(text("10.00"))).is_none());
        assert!(run(&c, &observed(text("10.000"))).is_none());
        assert!(run(&c, &observed(text("10.001"))).is_some());
        assert!(run(&c, &observed(text("1234567890123.45"))).is_none());
        let (kind, msg) = run(&c, &observed(text("12345678901234"))).unwrap();
        assert_eq!(kind, ViolationKind::DigitsExceeded);
        assert!(msg.contains("<13 digits>.<2 digits>"));
    }

    #[test]
    fn date_format_checks_shape_only() {
        let c = Constraint::DateFormat(DateFormat::IsoDate);
        assert!(run(&c, &observed(text("2024-01-15"))).is_none());
        // Shape is fine; calendar validity is coercion's job.
        assert!(run(&c, &observed(text("2024-02-30"))).is_none());
        let (kind, msg) = run(&c, &observed(text("2024/01/15"))).unwrap();
        assert_eq!(kind, ViolationKind::PatternMismatch);
        assert_eq!(msg, "Date must be in the format yyyy-MM-dd");
        assert!(run(&c, &observed(text("2024-1-15"))).is_some());
    }

    #[test]
    fn date_formats_parse_calendar_dates() {
        assert_eq!(
            DateFormat::IsoDate.parse("2024-01-15"),
            NaiveDate::from_ymd_opt(2024, 1, 15)
        );
        assert_eq!(DateFormat::IsoDate.parse("2024-02-30"), None);
        assert_eq!(
            DateFormat::BasicDate.parse("20240229"),
            NaiveDate::from_ymd_opt(2024, 2, 29)
        );
        assert!(DateFormat::BasicDate.matches_shape("20240229"));
        assert_eq!(DateFormat::from_label("yyyyMMdd"), Some(DateFormat::BasicDate));
    }

    #[test]
    fn parse_decimal_is_exact() {
        assert_eq!(parse_decimal("10.00"), Some(Decimal::new(1000, 2)));
        assert_eq!(parse_decimal("0.1"), Some(Decimal::new(1, 1)));
        assert_eq!(parse_decimal("1e-7"), Some(Decimal::new(1, 7)));
        assert_eq!(parse_decimal("ten"), None);
        assert_eq!(parse_decimal(""), None);
        assert_eq!(parse_decimal("1_000"), None);
    }

    #[test]
    fn raw_value_from_json() {
        let v = serde_json::json!({"s": "x", "n": 10.5, "l": [1], "z": null, "o": {}});
        assert_eq!(RawValue::from_json(v.get("s")).text(), Some("x"));
        assert_eq!(RawValue::from_json(v.get("n")).text(), Some("10.5"));
        assert!(RawValue::from_json(v.get("l")).is_absent());
        assert!(RawValue::from_json(v.get("z")).is_absent());
        assert!(RawValue::from_json(v.get("missing")).is_absent());
        assert!(matches!(RawValue::from_json(v.get("o")), RawValue::Object(_)));
    }

    #[test]
    fn constraint_kind_names_round_trip() {
        for kind in ConstraintKind::ALL {
            assert_eq!(kind.as_str().parse::<ConstraintKind>().unwrap(), kind);
        }
        assert_eq!("max-length".parse::<ConstraintKind>().unwrap(), ConstraintKind::MaxLength);
        assert!("bogus".parse::<ConstraintKind>().is_err());
        assert!(!ConstraintKind::Required.is_disableable());
        assert!(ConstraintKind::Pattern.is_disableable());
    }
}
