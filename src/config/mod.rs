//! Script parsing configuration (sqlscript.toml)

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ScriptError;
use crate::parser::{coerce_attribute, Attributes};

/// File name searched for by [`ScriptConfig::discover`]
pub const CONFIG_FILE_NAME: &str = "sqlscript.toml";

/// Tag comment delimiters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct PatternConfig {
    /// Opening delimiter of a tag comment
    pub open_tag: String,
    /// Closing delimiter of a tag comment
    pub close_tag: String,
    /// Separates the kind from the name inside a tag
    pub name_delimiter: String,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            open_tag: "/*-".to_string(),
            close_tag: "-*/".to_string(),
            name_delimiter: "~".to_string(),
        }
    }
}

/// Lexical options for the statement splitter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct LexerConfig {
    /// Treat `\'` inside single-quoted strings as an escaped quote
    pub backslash_escapes: bool,
    /// Treat `$$ ... $$` as a literal body
    pub dollar_quotes: bool,
}

impl Default for LexerConfig {
    fn default() -> Self {
        Self {
            backslash_escapes: true,
            dollar_quotes: true,
        }
    }
}

/// A user-supplied keyword rule, evaluated before the built-in table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct KindRuleConfig {
    /// Leading keywords, matched case-insensitively
    pub keywords: Vec<String>,
    /// Kind assigned on match
    pub kind: String,
    /// Whether the identifier following the keywords becomes the tag name
    #[serde(default)]
    pub names_object: bool,
}

/// Options for derived (implicit) tags
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct DeriveConfig {
    /// Fallback name when no object can be extracted
    pub default_name: String,
    /// Append ` #<index>` to the fallback name
    pub include_index: bool,
    /// Extra rules evaluated before the built-in table
    pub rules: Vec<KindRuleConfig>,
}

impl Default for DeriveConfig {
    fn default() -> Self {
        Self {
            default_name: "statement".to_string(),
            include_index: true,
            rules: Vec::new(),
        }
    }
}

/// Attribute names coerced to non-text values
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct AttributeTypes {
    pub list: Vec<String>,
    pub float: Vec<String>,
    pub bool: Vec<String>,
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptConfig {
    pub patterns: PatternConfig,
    pub lexer: LexerConfig,
    pub derive: DeriveConfig,
    pub attributes: AttributeTypes,
    /// Default attributes per marker name (`[markers.appendix]`), overridden
    /// by whatever the marker block itself sets
    pub markers: BTreeMap<String, BTreeMap<String, toml::Value>>,
}

/// TOML value as the text it would have inside an attribute block
fn raw_value(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        toml::Value::Array(items) => {
            let items: Vec<String> = items.iter().map(raw_value).collect();
            format!("[{}]", items.join(", "))
        }
        other => other.to_string(),
    }
}

impl ScriptConfig {
    /// Load config from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ScriptError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ScriptError::ConfigReadError {
                path: path.to_path_buf(),
                source: e,
            })?;
        Self::from_toml(&contents)
    }

    /// Load config from a TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ScriptError> {
        let config: ScriptConfig = toml::from_str(toml)?;
        config.validate()?;
        Ok(config)
    }

    /// Find `sqlscript.toml` in `start` or any of its ancestors
    pub fn discover(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(CONFIG_FILE_NAME))
            .find(|candidate| candidate.is_file())
    }

    /// Load the discovered config, or defaults when none exists
    pub fn discover_or_default(start: &Path) -> Result<Self, ScriptError> {
        match Self::discover(start) {
            Some(path) => {
                tracing::debug!(path = %path.display(), "using discovered config");
                Self::from_file(&path)
            }
            None => Ok(Self::default()),
        }
    }

    /// Configured defaults for marker `name`, coerced like block attributes
    pub fn marker_defaults(&self, name: &str) -> Result<Attributes, String> {
        let Some(template) = self.markers.get(name) else {
            return Ok(Attributes::new());
        };
        template
            .iter()
            .map(|(key, value)| {
                let value = coerce_attribute(key, &raw_value(value), &self.attributes)?;
                Ok((key.clone(), value))
            })
            .collect()
    }

    fn validate(&self) -> Result<(), ScriptError> {
        let invalid = |message: &str| {
            Err(ScriptError::ConfigParseError {
                message: message.to_string(),
            })
        };

        if self.patterns.open_tag.is_empty() || self.patterns.close_tag.is_empty() {
            return invalid("patterns.open-tag and patterns.close-tag must not be empty");
        }
        if self.patterns.name_delimiter.is_empty() {
            return invalid("patterns.name-delimiter must not be empty");
        }
        if self.derive.default_name.trim().is_empty() {
            return invalid("derive.default-name must not be empty");
        }
        for rule in &self.derive.rules {
            if rule.keywords.is_empty() || rule.keywords.iter().any(|k| k.trim().is_empty()) {
                return invalid("derive.rules entries need at least one non-empty keyword");
            }
            if rule.kind.trim().is_empty() {
                return invalid("derive.rules entries need a non-empty kind");
            }
        }
        for name in self.markers.keys() {
            if let Err(message) = self.marker_defaults(name) {
                return invalid(&format!("markers.{}: {}", name, message));
            }
        }
        Ok(())
    }
}
