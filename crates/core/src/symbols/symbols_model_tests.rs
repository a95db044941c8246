use std::collections::HashMap;

use super::*;
use crate::errors::ValidationError;

fn sample() -> SymbolRecord {
    SymbolRecord::new("SYM-1")
        .with_identifier(IdentifierType::Isin, "us0378331005")
        .with_identifier(IdentifierType::Ticker, "AAPL")
        .with_identifier(IdentifierType::Sedol, "   ")
        .with_name("Apple Inc")
        .with_attribute("exchange", "XNAS")
}

#[test]
fn test_identifier_type_parsing_is_case_insensitive() {
    assert_eq!("ISIN".parse::<IdentifierType>(), Ok(IdentifierType::Isin));
    assert_eq!("Ticker".parse::<IdentifierType>(), Ok(IdentifierType::Ticker));
    assert_eq!(
        "bloombergId".parse::<IdentifierType>(),
        Ok(IdentifierType::BloombergId)
    );
    assert_eq!(
        "bloomberg_id".parse::<IdentifierType>(),
        Ok(IdentifierType::BloombergId)
    );
    assert_eq!(
        "figi".parse::<IdentifierType>(),
        Err(ValidationError::UnknownIdentifierType("figi".to_string()))
    );
}

#[test]
fn test_normalize_identifier() {
    assert_eq!(normalize_identifier(" aapl "), Some("AAPL".to_string()));
    assert_eq!(normalize_identifier(""), None);
    assert_eq!(normalize_identifier("  \t"), None);
}

#[test]
fn test_index_keys_skip_blank_identifiers() {
    let keys = sample().index_keys();
    assert_eq!(
        keys,
        vec![
            IndexKey::new(IdentifierType::Isin, "US0378331005").unwrap(),
            IndexKey::new(IdentifierType::Ticker, "aapl").unwrap(),
        ]
    );
    assert_eq!(keys[0].storage_key(), "xref:isin:US0378331005");
    assert_eq!(keys[1].storage_key(), "xref:ticker:AAPL");
}

#[test]
fn test_bloomberg_storage_key() {
    let key = IndexKey::new(IdentifierType::BloombergId, "bbg000b9xry4").unwrap();
    assert_eq!(key.storage_key(), "xref:bloombergId:BBG000B9XRY4");
    assert_eq!(symbol_key("SYM-1"), "symbol:SYM-1");
}

#[test]
fn test_fields_codec_preserves_record() {
    let record = sample();
    let fields: HashMap<String, String> = record.to_fields().into_iter().collect();

    assert_eq!(fields.get("attr.exchange").map(String::as_str), Some("XNAS"));
    assert_eq!(SymbolRecord::from_fields("SYM-1", &fields), record);
}

#[test]
fn test_from_fields_falls_back_to_key_id() {
    let mut fields = HashMap::new();
    fields.insert("ticker".to_string(), "MSFT".to_string());

    let record = SymbolRecord::from_fields("SYM-9", &fields);
    assert_eq!(record.symbol_id, "SYM-9");
    assert_eq!(record.ticker.as_deref(), Some("MSFT"));
}

#[test]
fn test_tracked_identifiers_treat_absent_as_empty() {
    let a = SymbolRecord::new("S").with_identifier(IdentifierType::Cusip, "");
    let b = SymbolRecord::new("S");
    assert!(!a.tracked_identifiers_differ(&b));

    // Bloomberg id and name are not tracked.
    let c = b
        .clone()
        .with_identifier(IdentifierType::BloombergId, "BBG1")
        .with_name("Renamed");
    assert!(!b.tracked_identifiers_differ(&c));

    let d = b.clone().with_identifier(IdentifierType::Ticker, "NEW");
    assert!(b.tracked_identifiers_differ(&d));
}

#[test]
fn test_tracked_comparison_is_case_sensitive() {
    let a = SymbolRecord::new("S").with_identifier(IdentifierType::Ticker, "abc");
    let b = SymbolRecord::new("S").with_identifier(IdentifierType::Ticker, "ABC");
    assert!(a.tracked_identifiers_differ(&b));
}

#[test]
fn test_validate_rejects_blank_symbol_id() {
    assert_eq!(
        SymbolRecord::new(" ").validate(),
        Err(ValidationError::EmptySymbolId)
    );
    assert!(sample().validate().is_ok());
}

#[test]
fn test_attribute_map_core_fields_win() {
    let record = SymbolRecord::new("SYM-1")
        .with_identifier(IdentifierType::Ticker, "AAPL")
        .with_attribute("ticker", "SHADOW")
        .with_attribute("currency", "USD");

    let map = record.to_attribute_map();
    assert_eq!(map.get("ticker").map(String::as_str), Some("AAPL"));
    assert_eq!(map.get("currency").map(String::as_str), Some("USD"));
    assert_eq!(map.get("symbolId").map(String::as_str), Some("SYM-1"));
}

#[test]
fn test_attribute_map_drops_response_status_keys() {
    let record = SymbolRecord::new("SYM-1")
        .with_attribute("error", "stale vendor note")
        .with_attribute("reason", "x")
        .with_attribute("found", "false")
        .with_attribute("currency", "USD");

    let map = record.to_attribute_map();
    assert!(!map.contains_key("error"));
    assert!(!map.contains_key("reason"));
    assert!(!map.contains_key("found"));
    assert_eq!(map.get("currency").map(String::as_str), Some("USD"));
}

#[test]
fn test_record_json_is_camel_case() {
    let json = r#"{"symbolId":"S1","bloombergId":"BBG1","additionalAttributes":{"k":"v"}}"#;
    let record: SymbolRecord = serde_json::from_str(json).unwrap();
    assert_eq!(record.bloomberg_id.as_deref(), Some("BBG1"));
    assert_eq!(record.additional_attributes.get("k").map(String::as_str), Some("v"));
}
