//! Name Casing
//!
//! Converts schema names into the casing a target language expects:
//! type names to PascalCase, members and variants per the render profile.
//! Words are split on separators and on case boundaries, and configured
//! acronyms keep their upper-case spelling.
//!
//! Casing happens before escaping. The escaper only sees the cased name.

use regex::Regex;
use std::sync::LazyLock;

use super::config::{Casing, NamingConfig};
use crate::graph::ShapeId;

static WORDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Z]+[a-z0-9]*|[a-z0-9]+").unwrap());

/// Applies casing conventions to schema names
#[derive(Debug, Clone, Default)]
pub struct NameResolver {
    naming_config: NamingConfig,
}

impl NameResolver {
    pub fn new(naming_config: NamingConfig) -> Self {
        Self { naming_config }
    }

    /// Declared type name for a shape
    pub fn type_name(&self, id: &ShapeId) -> String {
        match self.to_pascal_case(id.name()) {
            name if name.is_empty() => id.name().to_string(),
            name => identifier_start(name),
        }
    }

    /// Apply a casing convention
    pub fn apply(&self, casing: Casing, s: &str) -> String {
        let cased = match casing {
            Casing::PascalCase => self.to_pascal_case(s),
            Casing::CamelCase => self.to_camel_case(s),
            Casing::SnakeCase => self.join_words(s, "_", str::to_lowercase),
            Casing::ScreamingSnakeCase => self.join_words(s, "_", str::to_uppercase),
        };
        identifier_start(cased)
    }

    /// Convert string to PascalCase, respecting acronyms
    pub fn to_pascal_case(&self, s: &str) -> String {
        let preserve = !is_screaming(s);
        split_words(s).iter().map(|w| self.case_word(w, preserve)).collect()
    }

    /// Convert string to camelCase; a leading acronym is lower-cased whole
    pub fn to_camel_case(&self, s: &str) -> String {
        let words = split_words(s);
        let mut iter = words.iter();
        let Some(first) = iter.next() else {
            return String::new();
        };
        let preserve = !is_screaming(s);
        let mut result = first.to_lowercase();
        for word in iter {
            result.push_str(&self.case_word(word, preserve));
        }
        result
    }

    fn join_words(&self, s: &str, separator: &str, case: fn(&str) -> String) -> String {
        split_words(s)
            .iter()
            .map(|w| case(w))
            .collect::<Vec<_>>()
            .join(separator)
    }

    /// Apply casing to a word, preserving acronyms.
    ///
    /// All-caps words are kept only when `preserve` is set; a name written
    /// entirely in SCREAMING_CASE has nothing worth preserving.
    fn case_word(&self, word: &str, preserve: bool) -> String {
        let upper = word.to_uppercase();

        // Check if it's a known acronym
        if self.naming_config.acronyms.contains(&upper) {
            return upper;
        }

        // Check if it's all uppercase (preserve if configured)
        if preserve
            && self.naming_config.preserve_screaming_case
            && word.len() > 1
            && word.chars().all(|c| c.is_ascii_uppercase())
        {
            return word.to_string();
        }

        // Standard PascalCase: first letter upper, rest lower
        let mut chars = word.chars();
        match chars.next() {
            None => String::new(),
            Some(first) => {
                let mut result = first.to_uppercase().to_string();
                for c in chars {
                    result.push(c.to_ascii_lowercase());
                }
                result
            }
        }
    }
}

/// Split a name into words on separators and case boundaries.
///
/// An upper-case run followed by lower-case letters gives up its last
/// capital to the next word: `HTTPServer` is `HTTP` + `Server`.
pub fn split_words(s: &str) -> Vec<&str> {
    let mut words = Vec::new();
    for m in WORDS.find_iter(s) {
        let word = m.as_str();
        let caps = word.chars().take_while(|c| c.is_ascii_uppercase()).count();
        let rest_is_lower = word[caps..].starts_with(|c: char| c.is_ascii_lowercase());
        if caps > 1 && rest_is_lower {
            words.push(&word[..caps - 1]);
            words.push(&word[caps - 1..]);
        } else {
            words.push(word);
        }
    }
    words
}

fn is_screaming(s: &str) -> bool {
    !s.chars().any(|c| c.is_ascii_lowercase())
}

/// Identifiers cannot start with a digit
fn identifier_start(name: String) -> String {
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{}", name)
    } else {
        name
    }
}
