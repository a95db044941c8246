//! Symbol domain models.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{
    ATTRIBUTE_FIELD_PREFIX, FIELD_NAME, FIELD_SYMBOL_ID, RESERVED_RESPONSE_KEYS,
    SYMBOL_KEY_PREFIX, XREF_KEY_PREFIX,
};
use crate::errors::ValidationError;

/// Kinds of external identifier a symbol can be looked up by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IdentifierType {
    Isin,
    Cusip,
    Sedol,
    Ticker,
    BloombergId,
}

impl IdentifierType {
    pub const ALL: [IdentifierType; 5] = [
        IdentifierType::Isin,
        IdentifierType::Cusip,
        IdentifierType::Sedol,
        IdentifierType::Ticker,
        IdentifierType::BloombergId,
    ];

    /// Identifier types whose change triggers a re-index during reconciliation.
    pub const TRACKED: [IdentifierType; 4] = [
        IdentifierType::Isin,
        IdentifierType::Cusip,
        IdentifierType::Sedol,
        IdentifierType::Ticker,
    ];

    /// Name used in storage keys, record fields and API parameters.
    pub fn as_str(&self) -> &'static str {
        match self {
            IdentifierType::Isin => "isin",
            IdentifierType::Cusip => "cusip",
            IdentifierType::Sedol => "sedol",
            IdentifierType::Ticker => "ticker",
            IdentifierType::BloombergId => "bloombergId",
        }
    }
}

impl fmt::Display for IdentifierType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IdentifierType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "isin" => Ok(IdentifierType::Isin),
            "cusip" => Ok(IdentifierType::Cusip),
            "sedol" => Ok(IdentifierType::Sedol),
            "ticker" => Ok(IdentifierType::Ticker),
            "bloombergid" | "bloomberg_id" | "bloomberg" => Ok(IdentifierType::BloombergId),
            _ => Err(ValidationError::UnknownIdentifierType(s.to_string())),
        }
    }
}

/// Normalizes an identifier value for indexing.
///
/// Returns `None` for empty or blank values, which are never indexed.
pub fn normalize_identifier(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_uppercase())
    }
}

/// Storage key of a canonical record.
pub fn symbol_key(symbol_id: &str) -> String {
    format!("{}{}", SYMBOL_KEY_PREFIX, symbol_id)
}

/// An `(identifierType, normalizedValue)` pair addressing one index entry.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IndexKey {
    pub id_type: IdentifierType,
    pub value: String,
}

impl IndexKey {
    /// Builds a key from a raw value, or `None` when the value is blank.
    pub fn new(id_type: IdentifierType, raw_value: &str) -> Option<Self> {
        normalize_identifier(raw_value).map(|value| Self { id_type, value })
    }

    pub fn storage_key(&self) -> String {
        format!("{}{}:{}", XREF_KEY_PREFIX, self.id_type.as_str(), self.value)
    }
}

/// The canonical description of one instrument.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolRecord {
    pub symbol_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cusip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sedol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticker: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bloomberg_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub additional_attributes: BTreeMap<String, String>,
}

impl SymbolRecord {
    pub fn new(symbol_id: impl Into<String>) -> Self {
        Self {
            symbol_id: symbol_id.into(),
            ..Default::default()
        }
    }

    pub fn with_identifier(mut self, id_type: IdentifierType, value: impl Into<String>) -> Self {
        self.set_identifier(id_type, Some(value.into()));
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.additional_attributes.insert(key.into(), value.into());
        self
    }

    fn slot(&self, id_type: IdentifierType) -> &Option<String> {
        match id_type {
            IdentifierType::Isin => &self.isin,
            IdentifierType::Cusip => &self.cusip,
            IdentifierType::Sedol => &self.sedol,
            IdentifierType::Ticker => &self.ticker,
            IdentifierType::BloombergId => &self.bloomberg_id,
        }
    }

    /// Raw identifier value, if present.
    pub fn identifier(&self, id_type: IdentifierType) -> Option<&str> {
        self.slot(id_type).as_deref()
    }

    pub fn set_identifier(&mut self, id_type: IdentifierType, value: Option<String>) {
        let slot = match id_type {
            IdentifierType::Isin => &mut self.isin,
            IdentifierType::Cusip => &mut self.cusip,
            IdentifierType::Sedol => &mut self.sedol,
            IdentifierType::Ticker => &mut self.ticker,
            IdentifierType::BloombergId => &mut self.bloomberg_id,
        };
        *slot = value;
    }

    /// Index entries implied by this record. Blank identifiers are skipped.
    pub fn index_keys(&self) -> Vec<IndexKey> {
        IdentifierType::ALL
            .iter()
            .filter_map(|t| self.identifier(*t).and_then(|v| IndexKey::new(*t, v)))
            .collect()
    }

    /// Whether the tracked identifiers (ISIN, CUSIP, SEDOL, ticker) differ.
    ///
    /// An absent value compares equal to an empty one. The comparison is
    /// case-sensitive on raw values.
    pub fn tracked_identifiers_differ(&self, other: &SymbolRecord) -> bool {
        IdentifierType::TRACKED.iter().any(|t| {
            self.identifier(*t).unwrap_or("") != other.identifier(*t).unwrap_or("")
        })
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.symbol_id.trim().is_empty() {
            return Err(ValidationError::EmptySymbolId);
        }
        Ok(())
    }

    /// Encodes the record as a flat field map for hash storage.
    pub fn to_fields(&self) -> BTreeMap<String, String> {
        let mut fields = BTreeMap::new();
        fields.insert(FIELD_SYMBOL_ID.to_string(), self.symbol_id.clone());
        for id_type in IdentifierType::ALL {
            if let Some(value) = self.identifier(id_type) {
                fields.insert(id_type.as_str().to_string(), value.to_string());
            }
        }
        if let Some(name) = &self.name {
            fields.insert(FIELD_NAME.to_string(), name.clone());
        }
        for (key, value) in &self.additional_attributes {
            fields.insert(format!("{}{}", ATTRIBUTE_FIELD_PREFIX, key), value.clone());
        }
        fields
    }

    /// Decodes a field map written by [`to_fields`](Self::to_fields).
    ///
    /// `symbol_id` is the id taken from the storage key; it is used when the
    /// map carries no `symbolId` field. Unknown fields are ignored.
    pub fn from_fields(symbol_id: &str, fields: &HashMap<String, String>) -> Self {
        let mut record = SymbolRecord::new(
            fields
                .get(FIELD_SYMBOL_ID)
                .cloned()
                .unwrap_or_else(|| symbol_id.to_string()),
        );
        for id_type in IdentifierType::ALL {
            record.set_identifier(id_type, fields.get(id_type.as_str()).cloned());
        }
        record.name = fields.get(FIELD_NAME).cloned();
        record.additional_attributes = fields
            .iter()
            .filter_map(|(k, v)| {
                k.strip_prefix(ATTRIBUTE_FIELD_PREFIX)
                    .map(|attr| (attr.to_string(), v.clone()))
            })
            .collect();
        record
    }

    /// Flat attribute map returned to lookup callers.
    ///
    /// Additional attributes are merged in without a prefix; they never
    /// override the core fields. Attributes named like a response status key
    /// (`found`, `error`, `reason`) are left out.
    pub fn to_attribute_map(&self) -> BTreeMap<String, String> {
        let mut map: BTreeMap<String, String> = self
            .additional_attributes
            .iter()
            .filter(|(key, _)| !RESERVED_RESPONSE_KEYS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        map.insert(FIELD_SYMBOL_ID.to_string(), self.symbol_id.clone());
        for id_type in IdentifierType::ALL {
            if let Some(value) = self.identifier(id_type) {
                map.insert(id_type.as_str().to_string(), value.to_string());
            }
        }
        if let Some(name) = &self.name {
            map.insert(FIELD_NAME.to_string(), name.clone());
        }
        map
    }
}
