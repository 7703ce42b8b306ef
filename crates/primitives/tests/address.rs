use sheetplate_primitives::address::{
    cell_range_to_address, cell_to_address, desanitize_sheet_name, sanitize_sheet_name,
    split_sheet_reference,
};
use sheetplate_primitives::{CellAddress, CellRange};

#[test]
fn test_cell_to_address_with_and_without_sheet() {
    let cell = CellAddress::new(4, 27);
    assert_eq!(cell_to_address(None, cell), "AB5");
    assert_eq!(cell_to_address(Some("Data"), cell), "Data!AB5");
}

#[test]
fn test_cell_range_to_address_with_sheet_name() {
    let range = CellRange::new(CellAddress::new(0, 0), CellAddress::new(1, 1));
    let address = cell_range_to_address(Some("Sales Data"), range);
    assert_eq!(address, "'Sales Data'!A1:B2");
}

#[test]
fn test_sanitize_and_desanitize_sheet_names() {
    let name = sanitize_sheet_name(Some("Bob's Sheet")).expect("sanitize");
    assert_eq!(name, "'Bob''s Sheet'");
    let desanitized = desanitize_sheet_name(Some(&name)).expect("desanitize");
    assert_eq!(desanitized, "Bob's Sheet");
}

#[test]
fn test_split_sheet_reference() {
    let (sheet, cell) = split_sheet_reference("'Sales Data'!C3");
    assert_eq!(sheet.as_deref(), Some("Sales Data"));
    assert_eq!(CellAddress::from_a1(cell).unwrap(), CellAddress::new(2, 2));

    let (sheet, cell) = split_sheet_reference("B2");
    assert!(sheet.is_none());
    assert_eq!(cell, "B2");
}
