//! # Payload Loading
//!
//! Reads a payload file into a `serde_json::Value`. Files ending in
//! `.yaml`/`.yml` are parsed as YAML and converted to the JSON value
//! model; everything else, and `-` (stdin), is parsed as JSON.
//!
//! Numbers keep the literal they were written with in both formats, so
//! `amount: 10.00` reaches the engine as `10.00`, not as a float.

use std::fmt;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::de::{self, DeserializeSeed, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::Deserialize;
use serde_json::{Map, Number, Value};

/// Load and decode a payload.
///
/// # Errors
///
/// Fails if the file cannot be read or is not well-formed JSON/YAML.
pub fn load_payload(path: &Path) -> Result<Value> {
    if path.as_os_str() == "-" {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .context("cannot read payload from stdin")?;
        return serde_json::from_str(&content).context("stdin payload is not valid JSON");
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read payload {}", path.display()))?;
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    let value = match ext {
        "yaml" | "yml" => parse_yaml(&content)
            .with_context(|| format!("{} is not a valid YAML payload", path.display()))?,
        _ => serde_json::from_str(&content)
            .with_context(|| format!("{} is not valid JSON", path.display()))?,
    };
    tracing::debug!(path = %path.display(), "payload loaded");
    Ok(value)
}

/// Parse YAML into the JSON value model.
///
/// The document is read twice: once into a `serde_yaml::Value` for its
/// shape, then again guided by that shape, taking every numeric scalar as
/// its source text.
pub fn parse_yaml(content: &str) -> Result<Value, serde_yaml::Error> {
    let shape: serde_yaml::Value = serde_yaml::from_str(content)?;
    Shaped(&shape).deserialize(serde_yaml::Deserializer::from_str(content))
}

/// Deserialization guided by a previously parsed YAML value.
struct Shaped<'a>(&'a serde_yaml::Value);

impl<'de> DeserializeSeed<'de> for Shaped<'_> {
    type Value = Value;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Value, D::Error> {
        match self.0 {
            serde_yaml::Value::Number(parsed) => {
                let literal = String::deserialize(deserializer)?;
                match Number::from_str(literal.trim()) {
                    Ok(n) => Ok(Value::Number(n)),
                    // Hex, octal and `+`-prefixed numbers are not JSON literals.
                    Err(_) => serde_json::to_value(parsed).map_err(de::Error::custom),
                }
            }
            serde_yaml::Value::Mapping(map) => deserializer.deserialize_map(MappingVisitor(map)),
            serde_yaml::Value::Sequence(seq) => deserializer.deserialize_seq(SequenceVisitor(seq)),
            serde_yaml::Value::Tagged(_) => Err(de::Error::custom("tagged YAML values are not supported")),
            serde_yaml::Value::Null | serde_yaml::Value::Bool(_) | serde_yaml::Value::String(_) => {
                Value::deserialize(deserializer)
            }
        }
    }
}

struct MappingVisitor<'a>(&'a serde_yaml::Mapping);

impl<'de> Visitor<'de> for MappingVisitor<'_> {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a YAML mapping")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Value, A::Error> {
        let mut out = Map::new();
        let mut values = self.0.values();
        // Scalar keys of any type are read back as their text.
        while let Some(key) = access.next_key::<String>()? {
            let shape = values
                .next()
                .ok_or_else(|| de::Error::custom("YAML mapping changed between passes"))?;
            out.insert(key, access.next_value_seed(Shaped(shape))?);
        }
        Ok(Value::Object(out))
    }
}

struct SequenceVisitor<'a>(&'a serde_yaml::Sequence);

impl<'de> Visitor<'de> for SequenceVisitor<'_> {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a YAML sequence")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut access: A) -> Result<Value, A::Error> {
        let mut out = Vec::with_capacity(self.0.len());
        for shape in self.0 {
            match access.next_element_seed(Shaped(shape))? {
                Some(v) => out.push(v),
                None => break,
            }
        }
        Ok(Value::Array(out))
    }
}
