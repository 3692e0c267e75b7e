// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Statement text helpers and custom assertions

/// Custom assertion helpers for compiled statement text
pub struct QueryAssertions;

impl QueryAssertions {
    /// Parameter references in order of appearance, marker stripped
    ///
    /// Quoted literals are skipped, so `':p0001'` is not a reference.
    pub fn parameter_references(text: &str, marker: char) -> Vec<String> {
        let mut references = Vec::new();
        let mut in_literal = false;
        let mut chars = text.chars().peekable();
        while let Some(c) = chars.next() {
            if c == '\'' {
                in_literal = !in_literal;
            } else if c == marker && !in_literal {
                let mut name = String::new();
                while let Some(&next) = chars.peek() {
                    if !(next.is_ascii_alphanumeric() || next == '_') {
                        break;
                    }
                    name.push(next);
                    chars.next();
                }
                if !name.is_empty() {
                    references.push(name);
                }
            }
        }
        references
    }

    /// Assert that `text` references exactly `names`, in this order
    pub fn assert_parameters_in_order(text: &str, names: &[&str]) {
        let found = Self::parameter_references(text, ':');
        assert_eq!(
            found, names,
            "Expected parameters {:?} in '{}', found {:?}",
            names, text, found
        );
    }

    /// Assert that parentheses outside literals are balanced
    pub fn assert_balanced_parentheses(text: &str) {
        let mut depth = 0i32;
        let mut in_literal = false;
        for c in text.chars() {
            match c {
                '\'' => in_literal = !in_literal,
                '(' if !in_literal => depth += 1,
                ')' if !in_literal => {
                    depth -= 1;
                    assert!(depth >= 0, "Unbalanced ')' in '{}'", text);
                }
                _ => {}
            }
        }
        assert_eq!(depth, 0, "Unclosed '(' in '{}'", text);
    }

    /// Assert that each keyword occurs and they occur in the given order
    pub fn assert_clause_order(text: &str, clauses: &[&str]) {
        let mut from = 0;
        for clause in clauses {
            match text[from..].find(clause) {
                Some(offset) => from += offset + clause.len(),
                None => panic!("Expected '{}' after position {} in '{}'", clause, from, text),
            }
        }
    }

    /// Assert that no empty parenthesized group was rendered
    pub fn assert_no_empty_group(text: &str) {
        assert!(!text.contains("()"), "Empty group in '{}'", text);
    }
}
