// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Text helpers shared by every platform
//!
//! Nothing in here depends on the platform; callers pass the characters the
//! active dialect is configured with.

use unified_query_ir::MatchMode;

/// Escape LIKE wildcards and the escape character itself
pub fn escape_like(value: &str, escape: char) -> String {
    let mut escaped = String::with_capacity(value.len() + 2);
    for c in value.chars() {
        if c == escape || c == '%' || c == '_' {
            escaped.push(escape);
        }
        escaped.push(c);
    }
    escaped
}

/// Add wildcards for a match mode to an already escaped value
pub fn wrap_wildcards(escaped: &str, mode: MatchMode) -> String {
    match mode {
        MatchMode::Contains => format!("%{}%", escaped),
        MatchMode::StartsWith => format!("{}%", escaped),
        MatchMode::EndsWith => format!("%{}", escaped),
    }
}

/// Single-quoted string literal with embedded quotes doubled
pub fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Parenthesize each part and join with a boolean keyword
pub fn join_parenthesized(parts: &[String], keyword: &str) -> String {
    parts
        .iter()
        .map(|p| format!("({})", p))
        .collect::<Vec<_>>()
        .join(&format!(" {} ", keyword))
}

/// Derive the base of a generated alias from a target name
///
/// Takes the final `.` segment, lower-cases it, replaces characters that
/// cannot appear in an identification variable with `_` and keeps at most
/// four characters, counting the `t` prefix added before a leading digit.
pub fn alias_base(name: &str) -> String {
    let segment = name.rsplit('.').next().unwrap_or(name);
    let mut base: String = segment
        .chars()
        .map(|c| c.to_ascii_lowercase())
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .take(4)
        .collect();
    if base.is_empty() {
        base.push('t');
    } else if base.starts_with(|c: char| c.is_ascii_digit()) {
        base.insert(0, 't');
        base.truncate(4);
    }
    base
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("O'Neil%", '!'), "O'Neil!%");
        assert_eq!(escape_like("a_b!c", '!'), "a!_b!!c");
        assert_eq!(escape_like("plain", '\\'), "plain");
        assert_eq!(escape_like("50%\\", '\\'), "50\\%\\\\");
    }

    #[test]
    fn test_wrap_wildcards() {
        assert_eq!(wrap_wildcards("ab", MatchMode::Contains), "%ab%");
        assert_eq!(wrap_wildcards("ab", MatchMode::StartsWith), "ab%");
        assert_eq!(wrap_wildcards("ab", MatchMode::EndsWith), "%ab");
    }

    #[test]
    fn test_quote() {
        assert_eq!(quote("O'Neil"), "'O''Neil'");
    }

    #[test]
    fn test_join_parenthesized() {
        let parts = vec!["a=1".to_string(), "b=2".to_string()];
        assert_eq!(join_parenthesized(&parts, "AND"), "(a=1) AND (b=2)");
        assert_eq!(join_parenthesized(&parts[..1], "OR"), "(a=1)");
    }

    #[test]
    fn test_alias_base() {
        assert_eq!(alias_base("A"), "a");
        assert_eq!(alias_base("com.shop.PurchaseOrder"), "purc");
        assert_eq!(alias_base("order-line"), "orde");
        assert_eq!(alias_base("x-y"), "x_y");
        assert_eq!(alias_base("9lives"), "t9li");
        assert_eq!(alias_base("7up"), "t7up");
        assert!(alias_base("2024Report").len() <= 4);
    }
}
