//! Render Profiles
//!
//! Per-language settings consumed by symbol resolution: primitive type
//! mappings, zero defaults, casing, container syntax and the name of the
//! fallback variant that enums and unions carry for unknown wire values.
//!
//! Key principle: graph passes (normalization, closure, SCC analysis) are
//! profile-free. Only symbol resolution reads a profile.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use super::escape::EscapeStyle;
use crate::graph::PrimitiveKind;

// =============================================================================
// Naming
// =============================================================================

/// Naming configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    /// Acronyms to preserve (e.g., ID, URL, UUID, API)
    pub acronyms: BTreeSet<String>,

    /// Whether to preserve all-caps words
    pub preserve_screaming_case: bool,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            acronyms: ["ID", "URL", "UUID", "API", "HTTP", "JSON", "XML", "SQL", "URI", "UI", "IO"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            preserve_screaming_case: true,
        }
    }
}

// =============================================================================
// Render Profile
// =============================================================================

/// Supported target languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Swift,
    Rust,
    TypeScript,
    Python,
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Swift => "swift",
            Self::Rust => "rust",
            Self::TypeScript => "typescript",
            Self::Python => "python",
        };
        f.write_str(name)
    }
}

/// Casing convention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Casing {
    PascalCase,
    CamelCase,
    SnakeCase,
    ScreamingSnakeCase,
}

/// Primitive type mappings; `None` means the language has no mapping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeMappings {
    pub string: String,
    pub boolean: String,
    pub byte: String,
    pub short: String,
    pub integer: String,
    pub long: String,
    pub float: String,
    pub double: String,
    pub big_integer: Option<String>,
    pub big_decimal: Option<String>,
    pub blob: String,
    pub timestamp: String,
    pub document: String,
}

/// Zero-value literals for primitives that are non-nullable by default
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZeroDefaults {
    pub integer: String,
    pub float: String,
    pub boolean: String,
    pub string: String,
}

/// Language-specific rendering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderProfile {
    pub language: Language,
    pub types: TypeMappings,
    pub defaults: ZeroDefaults,

    /// Casing for record/union member names
    pub member_casing: Casing,
    /// Casing for enum and union variant names
    pub variant_casing: Casing,
    /// Casing for operation names
    pub operation_casing: Casing,

    /// Variant that preserves an unrecognized wire value
    pub fallback_variant: String,

    /// How reserved identifiers are escaped
    pub keyword_escape: EscapeStyle,

    /// Source file extension for declared types
    pub file_extension: String,
}

impl RenderProfile {
    pub fn for_language(language: Language) -> Self {
        match language {
            Language::Swift => Self::swift(),
            Language::Rust => Self::rust(),
            Language::TypeScript => Self::typescript(),
            Language::Python => Self::python(),
        }
    }

    /// Create the default Swift profile
    pub fn swift() -> Self {
        Self {
            language: Language::Swift,
            types: TypeMappings {
                string: "String".to_string(),
                boolean: "Bool".to_string(),
                byte: "Int8".to_string(),
                short: "Int16".to_string(),
                integer: "Int".to_string(),
                long: "Int".to_string(),
                float: "Float".to_string(),
                double: "Double".to_string(),
                big_integer: None,
                big_decimal: None,
                blob: "Data".to_string(),
                timestamp: "Date".to_string(),
                document: "Document".to_string(),
            },
            defaults: ZeroDefaults {
                integer: "0".to_string(),
                float: "0.0".to_string(),
                boolean: "false".to_string(),
                string: "\"\"".to_string(),
            },
            member_casing: Casing::CamelCase,
            variant_casing: Casing::CamelCase,
            operation_casing: Casing::CamelCase,
            fallback_variant: "sdkUnknown".to_string(),
            keyword_escape: EscapeStyle::Backticks,
            file_extension: "swift".to_string(),
        }
    }

    /// Create the default Rust profile
    pub fn rust() -> Self {
        Self {
            language: Language::Rust,
            types: TypeMappings {
                string: "String".to_string(),
                boolean: "bool".to_string(),
                byte: "i8".to_string(),
                short: "i16".to_string(),
                integer: "i32".to_string(),
                long: "i64".to_string(),
                float: "f32".to_string(),
                double: "f64".to_string(),
                big_integer: Some("num_bigint::BigInt".to_string()),
                big_decimal: Some("rust_decimal::Decimal".to_string()),
                blob: "Vec<u8>".to_string(),
                timestamp: "chrono::DateTime<chrono::Utc>".to_string(),
                document: "serde_json::Value".to_string(),
            },
            defaults: ZeroDefaults {
                integer: "0".to_string(),
                float: "0.0".to_string(),
                boolean: "false".to_string(),
                string: "String::new()".to_string(),
            },
            member_casing: Casing::SnakeCase,
            variant_casing: Casing::PascalCase,
            operation_casing: Casing::SnakeCase,
            fallback_variant: "Unknown".to_string(),
            keyword_escape: EscapeStyle::RawPrefix,
            file_extension: "rs".to_string(),
        }
    }

    /// Create the default TypeScript profile
    pub fn typescript() -> Self {
        Self {
            language: Language::TypeScript,
            types: TypeMappings {
                string: "string".to_string(),
                boolean: "boolean".to_string(),
                byte: "number".to_string(),
                short: "number".to_string(),
                integer: "number".to_string(),
                long: "number".to_string(),
                float: "number".to_string(),
                double: "number".to_string(),
                big_integer: Some("bigint".to_string()),
                big_decimal: Some("string".to_string()), // Decimal as string for precision
                blob: "Uint8Array".to_string(),
                timestamp: "Date".to_string(),
                document: "unknown".to_string(), // Prefer unknown over any
            },
            defaults: ZeroDefaults {
                integer: "0".to_string(),
                float: "0".to_string(),
                boolean: "false".to_string(),
                string: "\"\"".to_string(),
            },
            member_casing: Casing::CamelCase,
            variant_casing: Casing::PascalCase,
            operation_casing: Casing::CamelCase,
            fallback_variant: "SdkUnknown".to_string(),
            keyword_escape: EscapeStyle::Prefix("_".to_string()),
            file_extension: "ts".to_string(),
        }
    }

    /// Create the default Python profile
    pub fn python() -> Self {
        Self {
            language: Language::Python,
            types: TypeMappings {
                string: "str".to_string(),
                boolean: "bool".to_string(),
                byte: "int".to_string(),
                short: "int".to_string(),
                integer: "int".to_string(),
                long: "int".to_string(),
                float: "float".to_string(),
                double: "float".to_string(),
                big_integer: Some("int".to_string()),
                big_decimal: Some("decimal.Decimal".to_string()),
                blob: "bytes".to_string(),
                timestamp: "datetime.datetime".to_string(),
                document: "Any".to_string(),
            },
            defaults: ZeroDefaults {
                integer: "0".to_string(),
                float: "0.0".to_string(),
                boolean: "False".to_string(),
                string: "\"\"".to_string(),
            },
            member_casing: Casing::SnakeCase,
            variant_casing: Casing::ScreamingSnakeCase,
            operation_casing: Casing::SnakeCase,
            fallback_variant: "SDK_UNKNOWN".to_string(),
            keyword_escape: EscapeStyle::Suffix("_".to_string()),
            file_extension: "py".to_string(),
        }
    }
}

// =============================================================================
// Render Helpers
// =============================================================================

impl RenderProfile {
    /// Type name for a primitive, if the language maps it
    pub fn primitive_type(&self, kind: PrimitiveKind) -> Option<&str> {
        let t = &self.types;
        match kind {
            PrimitiveKind::String => Some(&t.string),
            PrimitiveKind::Boolean => Some(&t.boolean),
            PrimitiveKind::Byte => Some(&t.byte),
            PrimitiveKind::Short => Some(&t.short),
            PrimitiveKind::Integer => Some(&t.integer),
            PrimitiveKind::Long => Some(&t.long),
            PrimitiveKind::Float => Some(&t.float),
            PrimitiveKind::Double => Some(&t.double),
            PrimitiveKind::BigInteger => t.big_integer.as_deref(),
            PrimitiveKind::BigDecimal => t.big_decimal.as_deref(),
            PrimitiveKind::Blob => Some(&t.blob),
            PrimitiveKind::Timestamp => Some(&t.timestamp),
            PrimitiveKind::Document => Some(&t.document),
        }
    }

    /// Zero default for a primitive; `None` for kinds that default to no value
    pub fn zero_default(&self, kind: PrimitiveKind) -> Option<&str> {
        let d = &self.defaults;
        match kind {
            PrimitiveKind::Byte
            | PrimitiveKind::Short
            | PrimitiveKind::Integer
            | PrimitiveKind::Long => Some(&d.integer),
            PrimitiveKind::Float | PrimitiveKind::Double => Some(&d.float),
            PrimitiveKind::Boolean => Some(&d.boolean),
            PrimitiveKind::String => Some(&d.string),
            PrimitiveKind::BigInteger
            | PrimitiveKind::BigDecimal
            | PrimitiveKind::Blob
            | PrimitiveKind::Timestamp
            | PrimitiveKind::Document => None,
        }
    }

    /// Wrap a type to make it optional
    pub fn wrap_optional(&self, type_str: &str) -> String {
        match self.language {
            Language::Swift => format!("{}?", type_str),
            Language::Rust => format!("Option<{}>", type_str),
            Language::TypeScript => format!("{} | undefined", type_str),
            Language::Python => format!("Optional[{}]", type_str),
        }
    }

    /// Wrap a type in a list
    pub fn wrap_list(&self, type_str: &str) -> String {
        match self.language {
            Language::Swift => format!("[{}]", type_str),
            Language::Rust => format!("Vec<{}>", type_str),
            Language::TypeScript if type_str.contains(' ') => format!("({})[]", type_str),
            Language::TypeScript => format!("{}[]", type_str),
            Language::Python => format!("list[{}]", type_str),
        }
    }

    /// Wrap a type in a set
    pub fn wrap_set(&self, type_str: &str) -> String {
        match self.language {
            Language::Swift => format!("Set<{}>", type_str),
            Language::Rust => format!("std::collections::HashSet<{}>", type_str),
            Language::TypeScript => format!("Set<{}>", type_str),
            Language::Python => format!("set[{}]", type_str),
        }
    }

    /// Wrap key and value types in a map
    pub fn wrap_map(&self, key_type: &str, value_type: &str) -> String {
        match self.language {
            Language::Swift => format!("[{}: {}]", key_type, value_type),
            Language::Rust => format!("std::collections::HashMap<{}, {}>", key_type, value_type),
            Language::TypeScript => format!("Record<{}, {}>", key_type, value_type),
            Language::Python => format!("dict[{}, {}]", key_type, value_type),
        }
    }

    /// Wrap a type in a heap indirection (for recursion)
    pub fn wrap_box(&self, type_str: &str) -> String {
        match self.language {
            Language::Swift => format!("Box<{}>", type_str),
            Language::Rust => format!("Box<{}>", type_str),
            // Reference semantics already; recursion needs nothing
            Language::TypeScript | Language::Python => type_str.to_string(),
        }
    }
}
