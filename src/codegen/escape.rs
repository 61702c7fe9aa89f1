//! Identifier Escaping
//!
//! Rewrites names that collide with a target language's reserved words.
//! Escaping wraps or decorates the name instead of mangling it, so the
//! original spelling stays readable in generated code. Names that are not
//! reserved pass through unchanged.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::config::{Language, RenderProfile};

/// How a reserved identifier is made legal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscapeStyle {
    /// `` `class` `` (Swift)
    Backticks,
    /// `r#type`; words that cannot be raw identifiers get a `_` suffix (Rust)
    RawPrefix,
    /// Fixed prefix, e.g. `_class`
    Prefix(String),
    /// Fixed suffix, e.g. `class_`
    Suffix(String),
}

/// Rust keywords that are not allowed as raw identifiers
const NON_RAW_RUST: &[&str] = &["self", "Self", "super", "crate"];

/// Escapes reserved identifiers for one target language
#[derive(Debug, Clone)]
pub struct IdentifierEscaper {
    style: EscapeStyle,
    reserved: BTreeSet<String>,
}

impl IdentifierEscaper {
    pub fn new<I, S>(style: EscapeStyle, reserved: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            style,
            reserved: reserved.into_iter().map(Into::into).collect(),
        }
    }

    /// Escaper for a profile's language, plus any extra reserved words
    pub fn for_profile(profile: &RenderProfile, extra: &[String]) -> Self {
        let words = reserved_words(profile.language)
            .iter()
            .map(|w| w.to_string())
            .chain(extra.iter().cloned());
        Self::new(profile.keyword_escape.clone(), words)
    }

    pub fn is_reserved(&self, name: &str) -> bool {
        self.reserved.contains(name)
    }

    /// Escape `name` if it is reserved; otherwise return it unchanged
    pub fn escape(&self, name: &str) -> String {
        if !self.is_reserved(name) {
            return name.to_string();
        }
        match &self.style {
            EscapeStyle::Backticks => format!("`{}`", name),
            EscapeStyle::RawPrefix if NON_RAW_RUST.contains(&name) => format!("{}_", name),
            EscapeStyle::RawPrefix => format!("r#{}", name),
            EscapeStyle::Prefix(prefix) => format!("{}{}", prefix, name),
            EscapeStyle::Suffix(suffix) => format!("{}{}", name, suffix),
        }
    }
}

/// Built-in reserved words for a language
pub fn reserved_words(language: Language) -> &'static [&'static str] {
    match language {
        Language::Swift => SWIFT_KEYWORDS,
        Language::Rust => RUST_KEYWORDS,
        Language::TypeScript => TS_KEYWORDS,
        Language::Python => PYTHON_KEYWORDS,
    }
}

// =============================================================================
// Reserved Words
// =============================================================================

const SWIFT_KEYWORDS: &[&str] = &[
    "Any", "Protocol", "Self", "Type", "as", "associatedtype", "break", "case",
    "catch", "class", "continue", "default", "defer", "deinit", "do", "else",
    "enum", "extension", "fallthrough", "false", "fileprivate", "for", "func",
    "guard", "if", "import", "in", "init", "inout", "internal", "is", "let",
    "nil", "open", "operator", "private", "protocol", "public", "repeat",
    "rethrows", "return", "self", "static", "struct", "subscript", "super",
    "switch", "throw", "throws", "true", "try", "typealias", "var", "where",
    "while",
];

const RUST_KEYWORDS: &[&str] = &[
    "as", "break", "const", "continue", "crate", "else", "enum", "extern",
    "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod",
    "move", "mut", "pub", "ref", "return", "self", "Self", "static", "struct",
    "super", "trait", "true", "type", "unsafe", "use", "where", "while",
    "async", "await", "dyn", "abstract", "become", "box", "do", "final",
    "macro", "override", "priv", "typeof", "unsized", "virtual", "yield",
];

const TS_KEYWORDS: &[&str] = &[
    "break", "case", "catch", "class", "const", "continue", "debugger",
    "default", "delete", "do", "else", "enum", "export", "extends", "false",
    "finally", "for", "function", "if", "import", "in", "instanceof", "new",
    "null", "return", "super", "switch", "this", "throw", "true", "try",
    "typeof", "var", "void", "while", "with", "as", "implements", "interface",
    "let", "package", "private", "protected", "public", "static", "yield",
    "any", "boolean", "constructor", "declare", "get", "module", "require",
    "number", "set", "string", "symbol", "type", "from", "of",
];

const PYTHON_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break",
    "class", "continue", "def", "del", "elif", "else", "except", "finally",
    "for", "from", "global", "if", "import", "in", "is", "lambda", "nonlocal",
    "not", "or", "pass", "raise", "return", "try", "while", "with", "yield",
];
