use serde::{Deserialize, Serialize};

/// Settings shared by every sheet a transformer adapts.
///
/// Missing fields fall back to their defaults when deserialized, so a
/// config file only needs to list what it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformOptions {
    /// Read formula cells as their cached value instead of the formula.
    pub ignore_formulas: bool,
    /// Mirror conditional formatting onto every transformed cell.
    pub copy_conditional_formatting: bool,
    /// Copy the source row height onto the target row.
    pub copy_row_heights: bool,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            ignore_formulas: false,
            copy_conditional_formatting: true,
            copy_row_heights: true,
        }
    }
}

impl TransformOptions {
    #[must_use]
    pub fn with_ignore_formulas(mut self, ignore_formulas: bool) -> Self {
        self.ignore_formulas = ignore_formulas;
        self
    }

    #[must_use]
    pub fn with_conditional_formatting(mut self, copy: bool) -> Self {
        self.copy_conditional_formatting = copy;
        self
    }

    #[must_use]
    pub fn with_row_heights(mut self, copy: bool) -> Self {
        self.copy_row_heights = copy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let options: TransformOptions = serde_yaml::from_str("ignore_formulas: true\n").unwrap();
        assert!(options.ignore_formulas);
        assert!(options.copy_conditional_formatting);
        assert!(options.copy_row_heights);
    }

    #[test]
    fn test_json_round_trip() {
        let options = TransformOptions::default().with_row_heights(false);
        let json = serde_json::to_string(&options).unwrap();
        assert!(json.contains("\"copy_row_heights\":false"));
        let parsed: TransformOptions = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, options);
        assert!(serde_json::from_str::<TransformOptions>("{\"ignore_formulas\": 1}").is_err());
    }

    #[test]
    fn test_builder() {
        let options = TransformOptions::default()
            .with_conditional_formatting(false)
            .with_row_heights(false);
        assert!(!options.copy_conditional_formatting);
        assert!(!options.copy_row_heights);
        assert!(!options.ignore_formulas);
    }
}
