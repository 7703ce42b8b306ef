//! Expand a small invoice template and save the result as xlsx.
//!
//! Run with: cargo run --example template_demo -p sheetplate-transform

use sheetplate_primitives::CellRange;
use sheetplate_sheet::{Book, CellIsOperator, CellValue, ConditionalFormattingRule, DifferentialFormat};
use sheetplate_transform::{CellRef, SheetData, Transformer};
use std::env;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Template Demo ===\n");

    let mut book = Book::new();
    let template = book.create_sheet("Template")?;
    template.set_a1("A1", "Item")?;
    template.set_a1("B1", "Qty")?;
    template.set_a1("A2", "item")?;
    template.set_a1("B2", 0)?;
    template.set_column_width(0, 20 * 256)?;
    template.add_merged_region(CellRange::from_a1("A4:B4")?)?;
    template.set_a1("A4", "Thank you")?;
    template.conditional_formatting_mut().add_conditional_formatting(
        &[CellRange::from_a1("B2")?],
        ConditionalFormattingRule::cell_is(CellIsOperator::LessThan, "5").with_format(
            DifferentialFormat {
                bold: true,
                fill_color: Some(0xFF_EB_9C),
                ..DifferentialFormat::default()
            },
        ),
    )?;

    let mut transformer = Transformer::new(book);
    let data = transformer.sheet_data("Template")?;
    println!(
        "Adapted '{}': {} rows, {} merged regions, widths {:?}\n",
        data.sheet_name(),
        data.number_of_rows(),
        data.merged_regions().len(),
        data.column_widths()
    );

    // Header, then one row per item, then the footer block.
    let items = [("Bolts", 40), ("Nuts", 3), ("Washers", 12)];
    transformer.transform_area("Template", CellRange::from_a1("A1:B1")?, &CellRef::new("Invoice", 0, 0))?;
    for (i, (name, qty)) in (1u32..).zip(items) {
        transformer.transform(&CellRef::new("Template", 1, 0), &CellRef::new("Invoice", i, 0))?;
        transformer.transform(&CellRef::new("Template", 1, 1), &CellRef::new("Invoice", i, 1))?;
        let invoice = transformer.book_mut().sheet_mut("Invoice")?;
        invoice.set_a1(&format!("A{}", i + 1), name)?;
        invoice.set_a1(&format!("B{}", i + 1), qty)?;
    }
    let footer = items.len() as u32 + 2;
    transformer.transform_area("Template", CellRange::from_a1("A4:B4")?, &CellRef::new("Invoice", footer, 0))?;
    transformer.copy_column_widths("Template", "Invoice")?;

    let invoice = transformer.book().sheet("Invoice")?;
    for (index, row) in invoice.rows() {
        let cells: Vec<String> = row.cells().map(|(_, value)| value.to_string()).collect();
        println!("  row {index}: {}", cells.join(" | "));
    }
    println!(
        "\nInvoice has {} conditional formatting blocks and {} merged regions",
        invoice.conditional_formatting().num_conditional_formattings(),
        invoice.num_merged_regions()
    );
    assert_eq!(invoice.get_a1("B3")?, Some(&CellValue::Int(3)));

    let path = env::temp_dir().join("sheetplate_invoice.xlsx");
    transformer.book().save_as_xlsx(&path)?;
    println!("Saved to {}", path.display());

    Ok(())
}
