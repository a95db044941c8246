/// Key prefix of the canonical record table (`symbol:{symbolId}`).
pub const SYMBOL_KEY_PREFIX: &str = "symbol:";

/// Key prefix of the identifier index table (`xref:{type}:{VALUE}`).
pub const XREF_KEY_PREFIX: &str = "xref:";

/// Hash field prefix for open-ended additional attributes.
pub const ATTRIBUTE_FIELD_PREFIX: &str = "attr.";

/// Record hash field names.
pub const FIELD_SYMBOL_ID: &str = "symbolId";
pub const FIELD_NAME: &str = "name";

/// Lookup response field names.
pub const RESPONSE_FOUND: &str = "found";
pub const RESPONSE_ERROR: &str = "error";
pub const RESPONSE_REASON: &str = "reason";
pub const RESERVED_RESPONSE_KEYS: [&str; 3] = [RESPONSE_FOUND, RESPONSE_ERROR, RESPONSE_REASON];

/// Lookup response messages.
pub const NOT_FOUND_MESSAGE: &str = "Symbol not found";
pub const UNAVAILABLE_MESSAGE: &str = "Service temporarily unavailable";
pub const RATE_LIMITED_MESSAGE: &str = "Rate limit exceeded";

/// Resilience scope of the inbound lookup path.
pub const LOOKUP_SCOPE: &str = "LOOKUP";
