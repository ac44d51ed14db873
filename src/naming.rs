//! Name transforms used to derive member names from element and
//! attribute keys.
//!
//! The binding convention assumes keys are valid identifiers once
//! capitalized; no characters are stripped or escaped.

/// Capitalize the first letter and every letter following a `-` or `_`.
///
/// All other characters pass through unchanged; separators are kept.
///
/// # Examples
/// ```
/// use xml_binder::naming::capitalize;
///
/// assert_eq!(capitalize("name"), "Name");
/// assert_eq!(capitalize("max-size"), "Max-Size");
/// assert_eq!(capitalize("max_size"), "Max_Size");
/// ```
#[must_use]
pub fn capitalize(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut upper_next = true;
    for ch in s.chars() {
        if upper_next {
            out.extend(ch.to_uppercase());
        } else {
            out.push(ch);
        }
        upper_next = ch == '-' || ch == '_';
    }
    out
}

/// Lowercase every character, no other transformation.
#[must_use]
pub fn lower(s: &str) -> String {
    s.to_lowercase()
}

/// Derive the setter-like member name for a key.
///
/// # Examples
/// ```
/// use xml_binder::naming::setter_of;
///
/// assert_eq!(setter_of("name"), "setName");
/// ```
#[must_use]
pub fn setter_of(key: &str) -> String {
    format!("set{}", capitalize(key))
}

/// Derive the adder-like member name for a key.
///
/// # Examples
/// ```
/// use xml_binder::naming::adder_of;
///
/// assert_eq!(adder_of("child"), "addChild");
/// ```
#[must_use]
pub fn adder_of(key: &str) -> String {
    format!("add{}", capitalize(key))
}
