use sheetplate_primitives::CellRange;
use sheetplate_sheet::{ConditionalFormatting, ConditionalFormattingRule};

/// A conditional formatting block captured from a template sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalFormattingEntry {
    ranges: Vec<CellRange>,
    rules: Vec<ConditionalFormattingRule>,
}

impl ConditionalFormattingEntry {
    pub fn new(ranges: Vec<CellRange>, rules: Vec<ConditionalFormattingRule>) -> Self {
        Self { ranges, rules }
    }

    pub fn ranges(&self) -> &[CellRange] {
        &self.ranges
    }

    pub fn rules(&self) -> &[ConditionalFormattingRule] {
        &self.rules
    }

    /// Ranges of this block that contain the given cell, in block order.
    pub fn matching_ranges(&self, row: u32, col: u32) -> impl Iterator<Item = &CellRange> + '_ {
        self.ranges
            .iter()
            .filter(move |range| range.contains_cell(row, col))
    }

    pub fn matches(&self, row: u32, col: u32) -> bool {
        self.matching_ranges(row, col).next().is_some()
    }
}

impl From<&ConditionalFormatting> for ConditionalFormattingEntry {
    fn from(block: &ConditionalFormatting) -> Self {
        Self::new(block.ranges().to_vec(), block.rules().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetplate_sheet::CellIsOperator;

    #[test]
    fn test_range_bounds_are_inclusive() {
        let entry = ConditionalFormattingEntry::new(
            vec![CellRange::from_bounds(1, 3, 2, 4)],
            vec![ConditionalFormattingRule::cell_is(CellIsOperator::Equal, "1")],
        );
        assert!(entry.matches(1, 2));
        assert!(entry.matches(3, 4));
        assert!(!entry.matches(0, 2));
        assert!(!entry.matches(3, 5));
    }

    #[test]
    fn test_matching_ranges_keeps_order() {
        let first = CellRange::from_bounds(0, 5, 0, 0);
        let second = CellRange::from_bounds(2, 2, 0, 3);
        let entry = ConditionalFormattingEntry::new(
            vec![first, CellRange::from_bounds(9, 9, 9, 9), second],
            vec![ConditionalFormattingRule::expression("=TRUE")],
        );
        let hits: Vec<_> = entry.matching_ranges(2, 0).copied().collect();
        assert_eq!(hits, vec![first, second]);
    }
}
