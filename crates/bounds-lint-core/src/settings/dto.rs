//! Deserialization types (DTO layer).
//!
//! These types exist solely for serde deserialization of TOML or JSON
//! configuration. They are converted to model types via the loader.

use std::fmt;
use std::marker::PhantomData;

use serde::de::{IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

/// Top-level configuration document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConfigDto {
    /// Project root used to relativize absolute paths.
    pub root: Option<String>,
    /// Preset name (`recommended` or `strict`).
    pub preset: Option<String>,
    /// Classification settings.
    pub settings: SettingsDto,
    /// Rule configuration keyed by rule name, in document order.
    pub rules: OrderedMap<RuleEntryDto>,
}

/// `[settings]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SettingsDto {
    /// Element type definitions.
    pub elements: Option<Vec<ElementEntryDto>>,
    /// Deprecated name of `elements`.
    pub types: Option<Vec<ElementEntryDto>>,
    /// Paths excluded from classification.
    pub ignore: Vec<String>,
    /// When set, only these paths are classified.
    pub include: Option<Vec<String>>,
    /// Import specifier prefixes rewritten before resolution, in order.
    pub alias: OrderedMap<String>,
}

/// An element definition, either a legacy type name or a full descriptor.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ElementEntryDto {
    /// Legacy form: only the type name.
    Legacy(String),
    /// Full descriptor.
    Descriptor(ElementDto),
}

/// A full element descriptor.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ElementDto {
    /// Element type name.
    #[serde(rename = "type")]
    pub element_type: Option<String>,
    /// One or more glob patterns.
    pub pattern: Option<OneOrMany>,
    /// Optional pattern the path left of the element must match.
    #[serde(rename = "basePattern", alias = "base_pattern")]
    pub base_pattern: Option<String>,
    /// Match mode name.
    pub mode: Option<String>,
    /// Names of pattern captures.
    pub capture: Option<CaptureDto>,
    /// Names of base pattern captures.
    #[serde(rename = "baseCapture", alias = "base_capture")]
    pub base_capture: Option<CaptureDto>,
}

/// A single string or a list of strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    /// A single value.
    One(String),
    /// Several values.
    Many(Vec<String>),
}

impl OneOrMany {
    /// Values as a list.
    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(value) => vec![value],
            Self::Many(values) => values,
        }
    }
}

/// Capture names; anything but a list of strings is kept as invalid.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CaptureDto {
    /// List of capture names.
    List(Vec<String>),
    /// Unusable value.
    Invalid(IgnoredAny),
}

/// Configuration of one rule kind.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RuleEntryDto {
    /// Only a severity (`"error"`, `"warning"`, `"info"`, `"off"`).
    Severity(String),
    /// Severity plus options.
    Options(RuleOptionsDto),
}

/// Rule options table.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuleOptionsDto {
    /// Severity name.
    pub severity: Option<String>,
    /// `"allow"` or `"disallow"`.
    pub default: Option<String>,
    /// Message template used when no rule-specific message applies.
    pub message: Option<String>,
    /// Ordered policy rules.
    pub rules: Option<Vec<RuleDto>>,
    /// Whether uncle dependencies are allowed (`no-private`).
    #[serde(rename = "allowUncles", alias = "allow_uncles")]
    pub allow_uncles: Option<bool>,
}

/// One policy rule.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuleDto {
    /// Selector by referring file.
    pub from: Option<MatcherSpecDto>,
    /// Selector by dependency.
    pub target: Option<MatcherSpecDto>,
    /// Allowed targets.
    pub allow: Option<MatcherSpecDto>,
    /// Disallowed targets.
    pub disallow: Option<MatcherSpecDto>,
    /// Message template for this rule.
    pub message: Option<String>,
}

/// Matcher specification as written.
///
/// `"a"`, `["a", { k = "v" }]` and `["a", ["b", { k = "v" }]]` are accepted;
/// any other shape fails to deserialize.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MatcherSpecDto {
    /// A single pattern.
    Single(String),
    /// A single pattern with capture constraints.
    Pair(String, OrderedMap<ConstraintValueDto>),
    /// Alternatives.
    List(Vec<MatcherItemDto>),
}

/// One alternative in a matcher list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MatcherItemDto {
    /// A pattern.
    Pattern(String),
    /// A pattern with capture constraints.
    Pair(String, OrderedMap<ConstraintValueDto>),
}

/// Constraint value: one pattern or alternatives.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ConstraintValueDto {
    /// One pattern.
    One(String),
    /// Alternative patterns.
    Many(Vec<String>),
}

/// A string-keyed map that keeps document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderedMap<V>(pub Vec<(String, V)>);

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<V> OrderedMap<V> {
    /// Entries in document order.
    #[must_use]
    pub fn entries(&self) -> &[(String, V)] {
        &self.0
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedMapVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedMapVisitor<V> {
            type Value = OrderedMap<V>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map with string keys")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, value)) = map.next_entry::<String, V>()? {
                    entries.push((key, value));
                }
                Ok(OrderedMap(entries))
            }
        }

        deserializer.deserialize_map(OrderedMapVisitor(PhantomData))
    }
}
