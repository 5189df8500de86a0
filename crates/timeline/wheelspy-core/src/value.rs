//! Style values: unit-tagged numbers, declarations and resolved style maps.

use std::fmt;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::TimelineError;
use crate::Result;

/// Resolved style: property name -> CSS value string, in declaration order.
pub type StyleMap = IndexMap<String, String>;

/// Properties that never receive an implicit `px`.
pub const UNITLESS_PROPERTIES: &[&str] = &["opacity", "z-index"];

/// Unit given to a unit-less value of `property`.
#[inline]
pub fn implicit_unit(property: &str) -> &'static str {
    if UNITLESS_PROPERTIES.contains(&property) {
        ""
    } else {
        "px"
    }
}

static UNIT_VALUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?)\s*([^\d\s.+-][^\d\s]*)\s*$")
        .expect("unit value pattern compiles")
});

/// A numeric style value with its unit (`""` for dimensionless values).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnitValue {
    pub value: f64,
    pub unit: String,
}

impl UnitValue {
    pub fn new(value: f64, unit: impl Into<String>) -> Self {
        Self {
            value,
            unit: unit.into(),
        }
    }

    /// Parse `"12px"`, `"-3.5em"`, `"0.4"` and friends.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if let Ok(value) = trimmed.parse::<f64>() {
            if value.is_finite() {
                return Ok(Self::new(value, ""));
            }
        }
        let caps = UNIT_VALUE
            .captures(trimmed)
            .ok_or_else(|| TimelineError::bad_value(raw))?;
        let value = caps[1]
            .parse::<f64>()
            .map_err(|_| TimelineError::bad_value(raw))?;
        Ok(Self::new(value, &caps[2]))
    }

    /// `None` passes through as `None`.
    pub fn parse_opt(raw: Option<&str>) -> Result<Option<Self>> {
        raw.map(Self::parse).transpose()
    }

    /// Give a unit-less value the implicit unit of `property`.
    pub fn with_implicit_unit(mut self, property: &str) -> Self {
        if self.unit.is_empty() {
            self.unit = implicit_unit(property).to_string();
        }
        self
    }

    pub fn to_css(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for UnitValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit)
    }
}

/// One declared value: a bare number or a CSS string.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StyleInput {
    Number(f64),
    Text(String),
}

impl StyleInput {
    /// CSS text for `property`; bare numbers receive the implicit unit.
    pub fn to_css(&self, property: &str) -> String {
        match self {
            StyleInput::Number(n) => format!("{}{}", n, implicit_unit(property)),
            StyleInput::Text(s) => s.clone(),
        }
    }
}

impl From<f64> for StyleInput {
    fn from(v: f64) -> Self {
        StyleInput::Number(v)
    }
}

impl From<i32> for StyleInput {
    fn from(v: i32) -> Self {
        StyleInput::Number(f64::from(v))
    }
}

impl From<&str> for StyleInput {
    fn from(v: &str) -> Self {
        StyleInput::Text(v.to_string())
    }
}

impl From<String> for StyleInput {
    fn from(v: String) -> Self {
        StyleInput::Text(v)
    }
}

/// Compact style declaration as written by the caller of `to()`.
/// Shorthands and camelCase names are allowed here; see [`crate::shorthand`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StyleDecl(pub IndexMap<String, StyleInput>);

impl StyleDecl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, property: &str, value: impl Into<StyleInput>) -> Self {
        self.0.insert(property.to_string(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &StyleInput)> {
        self.0.iter()
    }
}

impl<K: Into<String>, V: Into<StyleInput>> FromIterator<(K, V)> for StyleDecl {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
