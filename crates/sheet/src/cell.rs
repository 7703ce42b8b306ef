use serde::{Deserialize, Serialize};
use std::fmt;

/// A formula stored in a cell together with the last value computed for it.
///
/// The source keeps its leading `=`. The cached value is whatever the file
/// carried; nothing in this crate evaluates formulas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormulaCell {
    pub source: String,
    pub cached: Option<Box<CellValue>>,
}

/// Represents a cell value in a sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Formula(FormulaCell),
}

impl CellValue {
    /// Create a formula cell value. A missing leading `=` is added.
    #[must_use]
    pub fn formula<S: Into<String>>(source: S) -> Self {
        let source = source.into();
        let source = if source.starts_with('=') {
            source
        } else {
            format!("={source}")
        };
        CellValue::Formula(FormulaCell {
            source,
            cached: None,
        })
    }

    /// Create a formula cell value carrying a cached result.
    #[must_use]
    pub fn formula_with_cached<S: Into<String>>(source: S, cached: CellValue) -> Self {
        let mut value = Self::formula(source);
        value.set_cached(cached);
        value
    }

    /// Return the cached value for formulas, or self for non-formulas.
    #[must_use]
    pub fn cached_or_self(&self) -> &CellValue {
        match self {
            CellValue::Formula(formula) => formula.cached.as_deref().unwrap_or(self),
            _ => self,
        }
    }

    /// Set the cached value for a formula.
    pub fn set_cached(&mut self, value: CellValue) {
        if let CellValue::Formula(formula) = self {
            formula.cached = Some(Box::new(value));
        }
    }

    #[must_use]
    pub fn is_formula(&self) -> bool {
        matches!(self, CellValue::Formula(_))
    }

    /// Formula source including the leading `=`, if this is a formula.
    #[must_use]
    pub fn formula_source(&self) -> Option<&str> {
        match self {
            CellValue::Formula(formula) => Some(&formula.source),
            _ => None,
        }
    }

    /// Check if the value is null
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self.cached_or_self(), CellValue::Null)
    }

    /// Try to get the value as a float
    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self.cached_or_self() {
            CellValue::Float(f) => Some(*f),
            CellValue::Int(i) => Some(*i as f64),
            CellValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            CellValue::String(s) => s.parse().ok(),
            CellValue::Null | CellValue::Formula(_) => None,
        }
    }
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Null
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.cached_or_self() {
            CellValue::Null => Ok(()),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Int(i) => write!(f, "{i}"),
            CellValue::Float(fl) => write!(f, "{fl}"),
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Formula(formula) => write!(f, "{}", formula.source),
        }
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Int(i)
    }
}

impl From<i32> for CellValue {
    fn from(i: i32) -> Self {
        CellValue::Int(i64::from(i))
    }
}

impl From<f64> for CellValue {
    fn from(f: f64) -> Self {
        CellValue::Float(f)
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => CellValue::Null,
        }
    }
}
