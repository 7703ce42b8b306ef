use sheetplate_primitives::{CellAddress, CellRange};
use sheetplate_sheet::{
    Book, CellIsOperator, CellValue, ConditionalFormattingRule, DifferentialFormat, RuleKind,
    Sheet, SheetError, XlsxReadOptions,
};
use tempfile::tempdir;

fn invoice() -> Sheet {
    let mut sheet = Sheet::from_data(
        "Invoice",
        vec![
            vec![CellValue::from("Item"), "Qty".into(), "Price".into()],
            vec!["Bolts".into(), 40.into(), 0.15.into()],
            vec!["Nuts".into(), CellValue::Null, 0.1.into()],
        ],
    )
    .unwrap();
    sheet
        .set_a1("D2", CellValue::formula_with_cached("=B2*C2", CellValue::Float(6.0)))
        .unwrap();
    sheet
}

// ===== Sheet Model Tests =====

#[test]
fn test_sheet_from_data() {
    let sheet = invoice();

    assert_eq!(sheet.name(), "Invoice");
    assert_eq!(sheet.last_row_num(), Some(2));
    assert_eq!(sheet.row(0).unwrap().last_cell_num(), 3);
    assert_eq!(sheet.row(1).unwrap().last_cell_num(), 4);
    // nulls leave gaps
    assert_eq!(sheet.row(2).unwrap().physical_cell_count(), 2);
    assert_eq!(sheet.row(2).unwrap().last_cell_num(), 3);
}

#[test]
fn test_cell_bounds() {
    let mut sheet = Sheet::with_name("Bounds");
    assert!(matches!(
        sheet.set_a1("A1048577", 1),
        Err(SheetError::InvalidCellNotation(_))
    ));
    assert!(matches!(
        sheet.set_a1("XFE1", 1),
        Err(SheetError::InvalidCellNotation(_))
    ));
    assert!(matches!(
        sheet.set_cell_value(CellAddress::new(1_048_576, 0), 1),
        Err(SheetError::RowIndexOutOfBounds { .. })
    ));
    assert!(sheet.set_a1("XFD1048576", 1).is_ok());
    assert_eq!(sheet.last_row_num(), Some(1_048_575));
}

// ===== Merged Region Tests =====

#[test]
fn test_merged_regions() {
    let mut sheet = invoice();
    let first = sheet
        .add_merged_region(CellRange::from_a1("C5:A4").unwrap())
        .unwrap();
    assert_eq!(first, 0);
    assert_eq!(sheet.merged_region(0), Some(CellRange::from_a1("A4:C5").unwrap()));

    assert!(matches!(
        sheet.add_merged_region(CellRange::from_a1("B5:D6").unwrap()),
        Err(SheetError::MergedRegionOverlap { .. })
    ));
    assert!(matches!(
        sheet.add_merged_region(CellRange::from_a1("F1").unwrap()),
        Err(SheetError::MergedRegionTooSmall { .. })
    ));

    sheet.add_merged_region(CellRange::from_a1("E1:F1").unwrap()).unwrap();
    assert_eq!(sheet.num_merged_regions(), 2);
    let removed = sheet.remove_merged_region(0).unwrap();
    assert_eq!(removed, CellRange::from_a1("A4:C5").unwrap());
    assert_eq!(sheet.merged_regions(), &[CellRange::from_a1("E1:F1").unwrap()]);
}

// ===== Conditional Formatting Tests =====

#[test]
fn test_conditional_formatting_blocks() {
    let mut sheet = invoice();
    let cf = sheet.conditional_formatting_mut();
    cf.add_conditional_formatting(
        &[CellRange::from_a1("B2:B3").unwrap()],
        ConditionalFormattingRule::cell_is(CellIsOperator::LessThan, "10"),
    )
    .unwrap();
    cf.add_conditional_formatting_rules(
        &[
            CellRange::from_a1("C2:C3").unwrap(),
            CellRange::from_a1("D2").unwrap(),
        ],
        vec![
            ConditionalFormattingRule::between("0", "1"),
            ConditionalFormattingRule::new(RuleKind::DataBar),
        ],
    )
    .unwrap();
    assert!(matches!(
        cf.add_conditional_formatting(&[], ConditionalFormattingRule::expression("=TRUE")),
        Err(SheetError::EmptyConditionalFormattingRanges)
    ));

    let cf = sheet.conditional_formatting();
    assert_eq!(cf.num_conditional_formattings(), 2);
    let block = cf.conditional_formatting_at(1).unwrap();
    assert_eq!(block.ranges().len(), 2);
    assert_eq!(block.number_of_rules(), 2);
    assert_eq!(block.rule(1).unwrap().kind, RuleKind::DataBar);
}

// ===== Book + XLSX Tests =====

#[test]
fn test_xlsx_keeps_layout() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("invoice.xlsx");

    let mut sheet = invoice();
    sheet.add_merged_region(CellRange::from_a1("A5:D5").unwrap()).unwrap();
    sheet.set_column_width(0, 5120).unwrap();
    sheet.create_row(0).unwrap().set_height(Some(28.0));
    sheet
        .conditional_formatting_mut()
        .add_conditional_formatting(
            &[CellRange::from_a1("B2:B3").unwrap()],
            ConditionalFormattingRule::cell_is(CellIsOperator::GreaterThan, "20").with_format(
                DifferentialFormat {
                    bold: true,
                    font_color: Some(0x9C_00_06),
                    ..DifferentialFormat::default()
                },
            ),
        )
        .unwrap();
    let mut book = Book::new();
    book.add_sheet(sheet).unwrap();
    book.create_sheet("Notes").unwrap().set_a1("A1", "paid").unwrap();
    book.save_as_xlsx(&path).unwrap();

    let loaded = Book::from_xlsx(&path).unwrap();
    assert_eq!(loaded.sheet_names(), vec!["Invoice", "Notes"]);
    let invoice = loaded.sheet("Invoice").unwrap();
    assert_eq!(invoice.get_a1("A2").unwrap(), Some(&CellValue::from("Bolts")));
    assert_eq!(
        invoice.get_a1("D2").unwrap().and_then(CellValue::formula_source),
        Some("=B2*C2")
    );
    assert_eq!(invoice.merged_regions(), &[CellRange::from_a1("A5:D5").unwrap()]);
    assert_eq!(invoice.column_width(0), 5120);
    let cf = invoice.conditional_formatting();
    assert_eq!(cf.num_conditional_formattings(), 1);
    let block = cf.conditional_formatting_at(0).unwrap();
    assert_eq!(block.ranges(), &[CellRange::from_a1("B2:B3").unwrap()]);
    assert_eq!(
        block.rule(0).unwrap().format,
        DifferentialFormat {
            bold: true,
            font_color: Some(0x9C_00_06),
            ..DifferentialFormat::default()
        }
    );

    let plain = Book::from_xlsx_with_options(
        &path,
        &XlsxReadOptions::default()
            .with_formulas(false)
            .with_merged_regions(false),
    )
    .unwrap();
    let invoice = plain.sheet("Invoice").unwrap();
    assert_eq!(invoice.num_merged_regions(), 0);
    assert!(!invoice.get_a1("D2").unwrap().is_some_and(CellValue::is_formula));
}
