//! Conditional formatting blocks attached to a sheet.
//!
//! A block pairs one or more ranges with an ordered list of rules. Rules are
//! only stored here; whether a rule matches a value is decided by whatever
//! renders the workbook (Excel, LibreOffice, ...).

use crate::error::{Result, SheetError};
use serde::{Deserialize, Serialize};
use sheetplate_primitives::CellRange;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellIsOperator {
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    Equal,
    NotEqual,
    Between,
    NotBetween,
}

impl CellIsOperator {
    /// Whether the operator needs a second operand.
    #[must_use]
    pub fn is_binary_range(self) -> bool {
        matches!(self, CellIsOperator::Between | CellIsOperator::NotBetween)
    }
}

/// What a rule tests.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum RuleKind {
    CellIs {
        operator: CellIsOperator,
        formula1: String,
        formula2: Option<String>,
    },
    Expression {
        formula: String,
    },
    DataBar,
    ColorScale3,
}

/// Partial style applied to a cell when the rule matches. Colors are `0xRRGGBB`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DifferentialFormat {
    pub bold: bool,
    pub italic: bool,
    pub font_color: Option<u32>,
    pub fill_color: Option<u32>,
}

impl DifferentialFormat {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConditionalFormattingRule {
    pub kind: RuleKind,
    pub format: DifferentialFormat,
    pub stop_if_true: bool,
}

impl ConditionalFormattingRule {
    #[must_use]
    pub fn new(kind: RuleKind) -> Self {
        Self {
            kind,
            format: DifferentialFormat::default(),
            stop_if_true: false,
        }
    }

    /// Compare the cell value against a single operand.
    #[must_use]
    pub fn cell_is(operator: CellIsOperator, formula1: impl Into<String>) -> Self {
        Self::new(RuleKind::CellIs {
            operator,
            formula1: formula1.into(),
            formula2: None,
        })
    }

    /// `Between` rule with inclusive bounds.
    #[must_use]
    pub fn between(formula1: impl Into<String>, formula2: impl Into<String>) -> Self {
        Self::new(RuleKind::CellIs {
            operator: CellIsOperator::Between,
            formula1: formula1.into(),
            formula2: Some(formula2.into()),
        })
    }

    /// Rule driven by a boolean formula, relative to the top-left cell of the range.
    #[must_use]
    pub fn expression(formula: impl Into<String>) -> Self {
        Self::new(RuleKind::Expression {
            formula: formula.into(),
        })
    }

    #[must_use]
    pub fn with_format(mut self, format: DifferentialFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn with_stop_if_true(mut self, stop_if_true: bool) -> Self {
        self.stop_if_true = stop_if_true;
        self
    }
}

/// One conditional formatting block: ranges plus the rules applied to them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConditionalFormatting {
    ranges: Vec<CellRange>,
    rules: Vec<ConditionalFormattingRule>,
}

impl ConditionalFormatting {
    #[must_use]
    pub fn ranges(&self) -> &[CellRange] {
        &self.ranges
    }

    #[must_use]
    pub fn rules(&self) -> &[ConditionalFormattingRule] {
        &self.rules
    }

    #[must_use]
    pub fn number_of_rules(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn rule(&self, index: usize) -> Option<&ConditionalFormattingRule> {
        self.rules.get(index)
    }
}

/// All conditional formatting blocks of one sheet, in registration order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SheetConditionalFormatting {
    blocks: Vec<ConditionalFormatting>,
}

impl SheetConditionalFormatting {
    #[must_use]
    pub fn num_conditional_formattings(&self) -> usize {
        self.blocks.len()
    }

    #[must_use]
    pub fn conditional_formatting_at(&self, index: usize) -> Option<&ConditionalFormatting> {
        self.blocks.get(index)
    }

    /// Register a new block with a single rule. Returns the block index.
    pub fn add_conditional_formatting(
        &mut self,
        ranges: &[CellRange],
        rule: ConditionalFormattingRule,
    ) -> Result<usize> {
        self.add_conditional_formatting_rules(ranges, vec![rule])
    }

    /// Register a new block with several rules. Returns the block index.
    pub fn add_conditional_formatting_rules(
        &mut self,
        ranges: &[CellRange],
        rules: Vec<ConditionalFormattingRule>,
    ) -> Result<usize> {
        if ranges.is_empty() {
            return Err(SheetError::EmptyConditionalFormattingRanges);
        }
        if rules.is_empty() {
            return Err(SheetError::EmptyConditionalFormattingRules);
        }
        self.blocks.push(ConditionalFormatting {
            ranges: ranges.iter().map(CellRange::normalized).collect(),
            rules,
        });
        Ok(self.blocks.len() - 1)
    }

    pub fn remove_conditional_formatting(&mut self, index: usize) -> Result<ConditionalFormatting> {
        if index >= self.blocks.len() {
            return Err(SheetError::ConditionalFormattingIndexOutOfBounds {
                index,
                count: self.blocks.len(),
            });
        }
        Ok(self.blocks.remove(index))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ConditionalFormatting> {
        self.blocks.iter()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

impl<'a> IntoIterator for &'a SheetConditionalFormatting {
    type Item = &'a ConditionalFormatting;
    type IntoIter = std::slice::Iter<'a, ConditionalFormatting>;

    fn into_iter(self) -> Self::IntoIter {
        self.blocks.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(a1: &str) -> CellRange {
        CellRange::from_a1(a1).unwrap()
    }

    #[test]
    fn test_add_returns_index_and_keeps_order() {
        let mut cf = SheetConditionalFormatting::default();
        let first = cf
            .add_conditional_formatting(
                &[range("A1:A10")],
                ConditionalFormattingRule::cell_is(CellIsOperator::GreaterThan, "5"),
            )
            .unwrap();
        let second = cf
            .add_conditional_formatting_rules(
                &[range("B1:B10"), range("D1")],
                vec![
                    ConditionalFormattingRule::expression("$B1>$A1"),
                    ConditionalFormattingRule::new(RuleKind::DataBar),
                ],
            )
            .unwrap();

        assert_eq!((first, second), (0, 1));
        assert_eq!(cf.num_conditional_formattings(), 2);
        let block = cf.conditional_formatting_at(1).unwrap();
        assert_eq!(block.ranges().len(), 2);
        assert_eq!(block.number_of_rules(), 2);
        assert_eq!(block.rule(1).unwrap().kind, RuleKind::DataBar);
    }

    #[test]
    fn test_ranges_are_normalized() {
        let mut cf = SheetConditionalFormatting::default();
        cf.add_conditional_formatting(&[range("C3:A1")], ConditionalFormattingRule::expression("TRUE"))
            .unwrap();
        assert_eq!(cf.conditional_formatting_at(0).unwrap().ranges()[0], range("A1:C3"));
    }

    #[test]
    fn test_rejects_empty_ranges_and_rules() {
        let mut cf = SheetConditionalFormatting::default();
        assert!(matches!(
            cf.add_conditional_formatting(&[], ConditionalFormattingRule::expression("TRUE")),
            Err(SheetError::EmptyConditionalFormattingRanges)
        ));
        assert!(matches!(
            cf.add_conditional_formatting_rules(&[range("A1")], Vec::new()),
            Err(SheetError::EmptyConditionalFormattingRules)
        ));
        assert!(cf.is_empty());
    }

    #[test]
    fn test_remove_out_of_bounds() {
        let mut cf = SheetConditionalFormatting::default();
        assert!(matches!(
            cf.remove_conditional_formatting(0),
            Err(SheetError::ConditionalFormattingIndexOutOfBounds { index: 0, count: 0 })
        ));
    }
}
