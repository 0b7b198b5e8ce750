//! Variable name canonicalization and target-label decoration.
//!
//! Identifiers are case-insensitive in the source language; the
//! canonical form is uppercase with the type suffix (`%`, `!`, `$`)
//! preserved. For emission every canonical name maps to a distinct
//! assembler label: the alphanumeric part is kept and the suffix is
//! replaced by a `$`-separated marker, so `COUNT%` becomes `VARCOUNT$I`
//! and a suffix-less `COUNTI` becomes `VARCOUNTI` without colliding.
//! The `VAR` prefix keeps user names clear of the generated `L`/`N`/`X`
//! line labels and the runtime entry points.

use crate::ValueType;

/// Canonical form of a variable name: uppercase, suffix preserved.
///
/// # Examples
///
/// ```
/// use basc_util::canonical_name;
///
/// assert_eq!(canonical_name("count%"), "COUNT%");
/// assert_eq!(canonical_name("Name$"), "NAME$");
/// ```
pub fn canonical_name(name: &str) -> String {
    name.to_ascii_uppercase()
}

/// Value type implied by a canonical name's suffix.
///
/// `%` means integer, `!` single, `$` string; a name without a suffix
/// defaults to single.
///
/// # Examples
///
/// ```
/// use basc_util::{name_value_type, ValueType};
///
/// assert_eq!(name_value_type("I%"), ValueType::Integer);
/// assert_eq!(name_value_type("S$"), ValueType::String);
/// assert_eq!(name_value_type("X"), ValueType::Single);
/// ```
pub fn name_value_type(canonical: &str) -> ValueType {
    match canonical.as_bytes().last() {
        Some(b'%') => ValueType::Integer,
        Some(b'$') => ValueType::String,
        _ => ValueType::Single,
    }
}

/// Target-assembly label for a canonical variable name.
///
/// Distinct canonical names give distinct labels, and the label uses
/// only characters legal in an assembler identifier.
///
/// # Examples
///
/// ```
/// use basc_util::decorated_name;
///
/// assert_eq!(decorated_name("A%"), "VARA$I");
/// assert_eq!(decorated_name("A!"), "VARA$F");
/// assert_eq!(decorated_name("A$"), "VARA$S");
/// assert_eq!(decorated_name("A"), "VARA");
/// ```
pub fn decorated_name(canonical: &str) -> String {
    let mut label = String::with_capacity(canonical.len() + 5);
    label.push_str("VAR");
    for ch in canonical.chars() {
        match ch {
            '%' => label.push_str("$I"),
            '!' => label.push_str("$F"),
            '$' => label.push_str("$S"),
            _ => label.push(ch),
        }
    }
    label
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_uppercases() {
        assert_eq!(canonical_name("abc"), "ABC");
        assert_eq!(canonical_name("aB1%"), "AB1%");
    }

    #[test]
    fn test_value_type_from_suffix() {
        assert_eq!(name_value_type("X%"), ValueType::Integer);
        assert_eq!(name_value_type("X!"), ValueType::Single);
        assert_eq!(name_value_type("X$"), ValueType::String);
        assert_eq!(name_value_type("X"), ValueType::Single);
        assert_eq!(name_value_type("X1"), ValueType::Single);
    }

    #[test]
    fn test_decoration_is_injective_on_suffixes() {
        // "AI" without suffix and "A%" must not share a label.
        assert_ne!(decorated_name("AI"), decorated_name("A%"));
        assert_ne!(decorated_name("AF"), decorated_name("A!"));
        assert_ne!(decorated_name("AS"), decorated_name("A$"));
    }

    #[test]
    fn test_decoration_avoids_line_labels() {
        // A user variable named L10 must not alias the line label L10.
        assert_eq!(decorated_name("L10"), "VARL10");
    }
}
