//! Wire model for the downstream snapshot.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One symbol as served by the downstream `GET /api/symbols` endpoint.
///
/// Field names follow the downstream JSON (camelCase). Every attribute except
/// the id is optional; unknown JSON fields are ignored.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceSymbol {
    pub symbol_id: String,
    #[serde(default)]
    pub isin: Option<String>,
    #[serde(default)]
    pub cusip: Option<String>,
    #[serde(default)]
    pub sedol: Option<String>,
    #[serde(default)]
    pub ticker: Option<String>,
    #[serde(default)]
    pub bloomberg_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub additional_attributes: Option<BTreeMap<String, String>>,
}
