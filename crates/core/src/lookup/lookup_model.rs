use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::constants::{
    NOT_FOUND_MESSAGE, RATE_LIMITED_MESSAGE, RESPONSE_ERROR, RESPONSE_FOUND, RESPONSE_REASON,
    UNAVAILABLE_MESSAGE,
};
use crate::symbols::SymbolRecord;

/// Flat attribute map returned to lookup callers.
pub type LookupResponse = BTreeMap<String, String>;

/// One entry of a batch lookup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupRequest {
    pub id_type: String,
    pub id_value: String,
}

/// Result of a lookup that passed input validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LookupOutcome {
    Found(SymbolRecord),
    NotFound,
    /// The store is unreachable or the lookup circuit is open.
    Degraded { reason: String },
    /// The inbound lookup rate was exceeded.
    RateLimited,
}

impl LookupOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, LookupOutcome::Found(_))
    }

    /// Render the outcome in the response shape callers expect.
    ///
    /// Found records carry every stored attribute plus `found=true`; every
    /// other outcome carries `found=false` and an `error` message.
    pub fn to_response(&self) -> LookupResponse {
        match self {
            LookupOutcome::Found(record) => {
                let mut response = record.to_attribute_map();
                response.insert(RESPONSE_FOUND.to_string(), "true".to_string());
                response
            }
            LookupOutcome::NotFound => not_found_response(NOT_FOUND_MESSAGE),
            LookupOutcome::Degraded { reason } => {
                let mut response = not_found_response(UNAVAILABLE_MESSAGE);
                response.insert(RESPONSE_REASON.to_string(), reason.clone());
                response
            }
            LookupOutcome::RateLimited => not_found_response(RATE_LIMITED_MESSAGE),
        }
    }
}

fn not_found_response(message: &str) -> LookupResponse {
    let mut response = LookupResponse::new();
    response.insert(RESPONSE_FOUND.to_string(), "false".to_string());
    response.insert(RESPONSE_ERROR.to_string(), message.to_string());
    response
}

/// Response for a request rejected before lookup.
pub fn invalid_response(message: impl AsRef<str>) -> LookupResponse {
    not_found_response(message.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::IdentifierType;

    #[test]
    fn test_found_response_carries_attributes() {
        let record = SymbolRecord::new("S1")
            .with_identifier(IdentifierType::Ticker, "ABC")
            .with_attribute("currency", "USD")
            .with_attribute("error", "vendor note");

        let response = LookupOutcome::Found(record).to_response();
        assert_eq!(response.get("found").map(String::as_str), Some("true"));
        assert_eq!(response.get("symbolId").map(String::as_str), Some("S1"));
        assert_eq!(response.get("ticker").map(String::as_str), Some("ABC"));
        assert_eq!(response.get("currency").map(String::as_str), Some("USD"));
        assert!(!response.contains_key("error"));
    }

    #[test]
    fn test_miss_and_degraded_responses() {
        let miss = LookupOutcome::NotFound.to_response();
        assert_eq!(miss.get("found").map(String::as_str), Some("false"));
        assert_eq!(miss.get("error").map(String::as_str), Some("Symbol not found"));

        let degraded = LookupOutcome::Degraded {
            reason: "connection refused".to_string(),
        }
        .to_response();
        assert_eq!(degraded.get("found").map(String::as_str), Some("false"));
        assert_eq!(
            degraded.get("error").map(String::as_str),
            Some("Service temporarily unavailable")
        );
        assert_eq!(
            degraded.get("reason").map(String::as_str),
            Some("connection refused")
        );

        let limited = LookupOutcome::RateLimited.to_response();
        assert_eq!(limited.get("error").map(String::as_str), Some("Rate limit exceeded"));
    }

    #[test]
    fn test_batch_request_json() {
        let req: LookupRequest =
            serde_json::from_str(r#"{"idType":"ticker","idValue":"ABC"}"#).unwrap();
        assert_eq!(req.id_type, "ticker");
        assert_eq!(req.id_value, "ABC");
    }
}
