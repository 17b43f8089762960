//! Carrier prefix table for Indonesian mobile numbers
//!
//! A four-digit prefix identifies the carrier; this path is purely local
//! and never touches the network.

/// Four-digit prefix → carrier name
pub const OPERATOR_PREFIXES: &[(&str, &str)] = &[
    ("0811", "Telkomsel"),
    ("0812", "Telkomsel"),
    ("0813", "Telkomsel"),
    ("0821", "Telkomsel"),
    ("0822", "Telkomsel"),
    ("0823", "Telkomsel"),
    ("0852", "Telkomsel"),
    ("0853", "Telkomsel"),
    ("0814", "Indosat"),
    ("0815", "Indosat"),
    ("0816", "Indosat"),
    ("0855", "Indosat"),
    ("0856", "Indosat"),
    ("0857", "Indosat"),
    ("0858", "Indosat"),
    ("0817", "XL"),
    ("0818", "XL"),
    ("0819", "XL"),
    ("0859", "XL"),
    ("0877", "XL"),
    ("0878", "XL"),
    ("0831", "Axis"),
    ("0832", "Axis"),
    ("0833", "Axis"),
    ("0838", "Axis"),
    ("0895", "Three"),
    ("0896", "Three"),
    ("0897", "Three"),
    ("0898", "Three"),
    ("0899", "Three"),
    ("0881", "Smartfren"),
    ("0882", "Smartfren"),
    ("0883", "Smartfren"),
    ("0884", "Smartfren"),
    ("0885", "Smartfren"),
    ("0886", "Smartfren"),
    ("0887", "Smartfren"),
    ("0888", "Smartfren"),
    ("0889", "Smartfren"),
];

/// Carrier for a phone-shaped number with a known prefix.
///
/// `get` keeps this safe for arbitrary user input: too-short strings and
/// prefixes cut on a non-char boundary simply miss the table.
pub fn prefix_operator(phone: &str) -> Option<&'static str> {
    let prefix = phone.get(..4)?;
    OPERATOR_PREFIXES
        .iter()
        .find(|(p, _)| *p == prefix)
        .map(|(_, name)| *name)
}

/// Operator display name for any input.
///
/// Mapped carrier for a known prefix, "Unknown" for a phone-shaped number
/// with an unmapped prefix, "N/A" for anything not starting with the
/// configured phone prefix.
pub fn detect_operator(phone: &str, phone_prefix: &str) -> &'static str {
    if !phone.starts_with(phone_prefix) {
        return "N/A";
    }
    prefix_operator(phone).unwrap_or("Unknown")
}
