//! Worksheet layout calamine does not surface.
//!
//! Column widths and conditional formatting live in the worksheet parts of
//! the package, and the formats applied by conditional rules live in the
//! `<dxfs>` table of `styles.xml`. [`XlsxPackage`] opens the zip container
//! and streams those parts with quick-xml.

use crate::conditional_formatting::{
    CellIsOperator, ConditionalFormattingRule, DifferentialFormat, RuleKind,
};
use crate::error::{Result, SheetError};
use crate::sheet::MAX_COLUMN_WIDTH;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use sheetplate_primitives::address::MAX_COLUMN_COUNT;
use sheetplate_primitives::CellRange;
use std::collections::HashMap;
use std::fmt::Display;
use std::io::{Read, Seek};
use tracing::warn;
use zip::result::ZipError;
use zip::ZipArchive;

/// Pixel width of the widest digit in the default font.
const MAX_DIGIT_WIDTH: f64 = 7.0;
/// Pixels spreadsheet writers add around every column.
const COLUMN_PADDING: f64 = 5.0;

fn xml_error(e: impl Display) -> SheetError {
    SheetError::Xlsx(e.to_string())
}

/// Column widths and conditional formatting read from one worksheet part.
#[derive(Debug, Default, PartialEq)]
pub(crate) struct SheetLayout {
    /// `<sheetFormatPr defaultColWidth>` in 1/256 character units.
    pub default_column_width: Option<u32>,
    /// `(column, width)` pairs in 1/256 character units.
    pub column_widths: Vec<(u32, u32)>,
    /// One entry per `<conditionalFormatting>` element, in document order.
    pub conditional_formatting: Vec<(Vec<CellRange>, Vec<ConditionalFormattingRule>)>,
}

/// An opened xlsx package with its sheet-to-part map and dxf table.
pub(crate) struct XlsxPackage<R> {
    archive: ZipArchive<R>,
    sheet_parts: HashMap<String, String>,
    dxfs: Vec<DifferentialFormat>,
}

impl<R: Read + Seek> XlsxPackage<R> {
    pub fn open(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader).map_err(xml_error)?;

        let targets = match read_part(&mut archive, "xl/_rels/workbook.xml.rels")? {
            Some(xml) => parse_worksheet_targets(&xml)?,
            None => HashMap::new(),
        };
        let sheets = match read_part(&mut archive, "xl/workbook.xml")? {
            Some(xml) => parse_workbook_sheets(&xml)?,
            None => Vec::new(),
        };
        let sheet_parts = sheets
            .into_iter()
            .filter_map(|(name, id)| targets.get(&id).map(|part| (name, part.clone())))
            .collect();
        let dxfs = match read_part(&mut archive, "xl/styles.xml")? {
            Some(xml) => parse_dxfs(&xml)?,
            None => Vec::new(),
        };

        Ok(Self {
            archive,
            sheet_parts,
            dxfs,
        })
    }

    /// Layout of the worksheet named `sheet_name`; empty when the package
    /// has no part for it.
    pub fn sheet_layout(&mut self, sheet_name: &str) -> Result<SheetLayout> {
        let Some(part) = self.sheet_parts.get(sheet_name) else {
            warn!(sheet = %sheet_name, "no worksheet part found, layout not loaded");
            return Ok(SheetLayout::default());
        };
        match read_part(&mut self.archive, part)? {
            Some(xml) => parse_sheet_layout(&xml, &self.dxfs),
            None => {
                warn!(sheet = %sheet_name, %part, "worksheet part missing from package");
                Ok(SheetLayout::default())
            }
        }
    }
}

fn read_part<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<Option<Vec<u8>>> {
    let mut file = match archive.by_name(name) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(xml_error(e)),
    };
    let mut xml = Vec::new();
    file.read_to_end(&mut xml)?;
    Ok(Some(xml))
}

fn attribute(e: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr.map_err(xml_error)?;
        if attr.key.as_ref() == key {
            return Ok(Some(attr.unescape_value().map_err(xml_error)?.into_owned()));
        }
    }
    Ok(None)
}

fn flag(e: &BytesStart<'_>, key: &[u8]) -> Result<bool> {
    Ok(attribute(e, key)?.is_some_and(|value| value == "1" || value == "true"))
}

/// `Relationship Id -> part path` for every worksheet relationship.
fn parse_worksheet_targets(xml: &[u8]) -> Result<HashMap<String, String>> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut targets = HashMap::new();

    loop {
        match reader.read_event_into(&mut buf).map_err(xml_error)? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                let is_worksheet = attribute(&e, b"Type")?
                    .is_some_and(|rel_type| rel_type.ends_with("/worksheet"));
                if let (true, Some(id), Some(target)) =
                    (is_worksheet, attribute(&e, b"Id")?, attribute(&e, b"Target")?)
                {
                    let part = match target.strip_prefix('/') {
                        Some(absolute) => absolute.to_string(),
                        None => format!("xl/{target}"),
                    };
                    targets.insert(id, part);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(targets)
}

/// `(sheet name, relationship id)` in workbook order.
fn parse_workbook_sheets(xml: &[u8]) -> Result<Vec<(String, String)>> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut sheets = Vec::new();

    loop {
        match reader.read_event_into(&mut buf).map_err(xml_error)? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"sheet" => {
                if let (Some(name), Some(id)) = (attribute(&e, b"name")?, attribute(&e, b"r:id")?) {
                    sheets.push((name, id));
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(sheets)
}

/// `FF9C0006` or `9C0006` to `0x9C0006`.
fn parse_rgb(value: &str) -> Option<u32> {
    let hex = value.get(value.len().checked_sub(6)?..)?;
    u32::from_str_radix(hex, 16).ok()
}

/// The `<dxfs>` table of `styles.xml`, indexed by `dxfId`.
fn parse_dxfs(xml: &[u8]) -> Result<Vec<DifferentialFormat>> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut dxfs = Vec::new();
    let mut in_dxfs = false;
    let mut current: Option<DifferentialFormat> = None;
    let (mut in_font, mut in_fill) = (false, false);

    loop {
        match reader.read_event_into(&mut buf).map_err(xml_error)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"dxfs" => in_dxfs = true,
                b"dxf" if in_dxfs => current = Some(DifferentialFormat::default()),
                b"font" => in_font = true,
                b"fill" => in_fill = true,
                _ => {
                    if let Some(format) = current.as_mut() {
                        apply_dxf_element(format, &e, in_font, in_fill)?;
                    }
                }
            },
            Event::Empty(e) => {
                if in_dxfs && e.local_name().as_ref() == b"dxf" {
                    dxfs.push(DifferentialFormat::default());
                } else if let Some(format) = current.as_mut() {
                    apply_dxf_element(format, &e, in_font, in_fill)?;
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"dxfs" => in_dxfs = false,
                b"dxf" => dxfs.extend(current.take()),
                b"font" => in_font = false,
                b"fill" => in_fill = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(dxfs)
}

fn apply_dxf_element(
    format: &mut DifferentialFormat,
    e: &BytesStart<'_>,
    in_font: bool,
    in_fill: bool,
) -> Result<()> {
    let enabled = || -> Result<bool> {
        Ok(!matches!(attribute(e, b"val")?.as_deref(), Some("0" | "false")))
    };
    match e.local_name().as_ref() {
        b"b" if in_font => format.bold = enabled()?,
        b"i" if in_font => format.italic = enabled()?,
        b"color" if in_font => format.font_color = attribute(e, b"rgb")?.as_deref().and_then(parse_rgb),
        // solid dxf fills carry their color in bgColor; fgColor is the fallback
        b"bgColor" if in_fill => {
            if let Some(rgb) = attribute(e, b"rgb")?.as_deref().and_then(parse_rgb) {
                format.fill_color = Some(rgb);
            }
        }
        b"fgColor" if in_fill && format.fill_color.is_none() => {
            format.fill_color = attribute(e, b"rgb")?.as_deref().and_then(parse_rgb);
        }
        _ => {}
    }
    Ok(())
}

/// Convert a stored `<col width>` back to 1/256 character units.
///
/// Writers store `pixels / MAX_DIGIT_WIDTH` where the pixel count includes
/// the padding, so widths round-trip to the nearest pixel.
fn stored_width_to_units(stored: f64) -> Option<u32> {
    if !stored.is_finite() || stored < 0.0 {
        return None;
    }
    let pixels = (stored * MAX_DIGIT_WIDTH).round();
    let chars = if pixels >= MAX_DIGIT_WIDTH + COLUMN_PADDING {
        (pixels - COLUMN_PADDING) / MAX_DIGIT_WIDTH
    } else {
        pixels / (MAX_DIGIT_WIDTH + COLUMN_PADDING)
    };
    Some(((chars * 256.0).round() as u32).min(MAX_COLUMN_WIDTH))
}

fn parse_width(e: &BytesStart<'_>, key: &[u8]) -> Result<Option<u32>> {
    Ok(attribute(e, key)?
        .and_then(|value| value.parse::<f64>().ok())
        .and_then(stored_width_to_units))
}

fn cell_is_operator(name: &str) -> Option<CellIsOperator> {
    Some(match name {
        "greaterThan" => CellIsOperator::GreaterThan,
        "greaterThanOrEqual" => CellIsOperator::GreaterThanOrEqual,
        "lessThan" => CellIsOperator::LessThan,
        "lessThanOrEqual" => CellIsOperator::LessThanOrEqual,
        "equal" => CellIsOperator::Equal,
        "notEqual" => CellIsOperator::NotEqual,
        "between" => CellIsOperator::Between,
        "notBetween" => CellIsOperator::NotBetween,
        _ => return None,
    })
}

/// A `<cfRule>` whose children are still being read.
#[derive(Debug, Default)]
struct PendingRule {
    rule_type: String,
    operator: Option<String>,
    dxf_id: Option<usize>,
    stop_if_true: bool,
    formulas: Vec<String>,
    value_objects: usize,
}

impl PendingRule {
    fn from_element(e: &BytesStart<'_>) -> Result<Self> {
        Ok(Self {
            rule_type: attribute(e, b"type")?.unwrap_or_default(),
            operator: attribute(e, b"operator")?,
            dxf_id: attribute(e, b"dxfId")?.and_then(|id| id.parse().ok()),
            stop_if_true: flag(e, b"stopIfTrue")?,
            ..Self::default()
        })
    }

    fn finish(self, dxfs: &[DifferentialFormat]) -> Option<ConditionalFormattingRule> {
        let mut formulas = self.formulas.into_iter();
        let kind = match self.rule_type.as_str() {
            "cellIs" => {
                let operator = self.operator.as_deref().and_then(cell_is_operator)?;
                let formula1 = formulas.next()?;
                let formula2 = if operator.is_binary_range() {
                    Some(formulas.next()?)
                } else {
                    None
                };
                RuleKind::CellIs {
                    operator,
                    formula1,
                    formula2,
                }
            }
            "expression" => RuleKind::Expression {
                formula: formulas.next()?,
            },
            "dataBar" => RuleKind::DataBar,
            "colorScale" if self.value_objects == 3 => RuleKind::ColorScale3,
            _ => return None,
        };
        let format = self
            .dxf_id
            .and_then(|id| dxfs.get(id))
            .cloned()
            .unwrap_or_default();
        Some(
            ConditionalFormattingRule::new(kind)
                .with_format(format)
                .with_stop_if_true(self.stop_if_true),
        )
    }
}

fn parse_sqref(sqref: &str) -> Option<Vec<CellRange>> {
    sqref
        .split_whitespace()
        .map(|range| CellRange::from_a1(range).ok())
        .collect()
}

/// Read `<sheetFormatPr>`, `<cols>` and `<conditionalFormatting>` from a
/// worksheet part. Anything under `<extLst>` is skipped.
pub(crate) fn parse_sheet_layout(xml: &[u8], dxfs: &[DifferentialFormat]) -> Result<SheetLayout> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut layout = SheetLayout::default();

    let mut ext_depth = 0usize;
    let mut block: Option<(Vec<CellRange>, Vec<ConditionalFormattingRule>)> = None;
    let mut rule: Option<PendingRule> = None;
    let mut formula: Option<String> = None;

    loop {
        let event = reader.read_event_into(&mut buf).map_err(xml_error)?;
        match &event {
            Event::Eof => break,
            Event::Start(e) if e.local_name().as_ref() == b"extLst" => ext_depth += 1,
            Event::End(e) if e.local_name().as_ref() == b"extLst" => {
                ext_depth = ext_depth.saturating_sub(1);
            }
            _ if ext_depth > 0 => {}
            Event::Start(e) | Event::Empty(e) => {
                let is_empty = matches!(event, Event::Empty(_));
                match e.local_name().as_ref() {
                    b"sheetFormatPr" => {
                        layout.default_column_width = parse_width(e, b"defaultColWidth")?;
                    }
                    b"col" => {
                        let min = attribute(e, b"min")?.and_then(|v| v.parse::<u32>().ok());
                        let max = attribute(e, b"max")?.and_then(|v| v.parse::<u32>().ok());
                        if let (Some(min), Some(max), Some(width)) =
                            (min, max, parse_width(e, b"width")?)
                        {
                            let last = max.min(MAX_COLUMN_COUNT);
                            for col in min.max(1)..=last {
                                layout.column_widths.push((col - 1, width));
                            }
                        }
                    }
                    b"conditionalFormatting" if !is_empty => {
                        let sqref = attribute(e, b"sqref")?.unwrap_or_default();
                        match parse_sqref(&sqref) {
                            Some(ranges) if !ranges.is_empty() => {
                                block = Some((ranges, Vec::new()));
                            }
                            _ => warn!(%sqref, "skipping conditional formatting with unreadable ranges"),
                        }
                    }
                    b"cfRule" if block.is_some() => {
                        let pending = PendingRule::from_element(e)?;
                        if is_empty {
                            push_rule(&mut block, pending, dxfs);
                        } else {
                            rule = Some(pending);
                        }
                    }
                    b"formula" if rule.is_some() && !is_empty => formula = Some(String::new()),
                    b"cfvo" => {
                        if let Some(pending) = rule.as_mut() {
                            pending.value_objects += 1;
                        }
                    }
                    _ => {}
                }
            }
            Event::Text(text) => {
                if let Some(formula) = formula.as_mut() {
                    formula.push_str(&text.unescape().map_err(xml_error)?);
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"formula" => {
                    if let (Some(text), Some(pending)) = (formula.take(), rule.as_mut()) {
                        pending.formulas.push(text);
                    }
                }
                b"cfRule" => {
                    if let Some(pending) = rule.take() {
                        push_rule(&mut block, pending, dxfs);
                    }
                }
                b"conditionalFormatting" => {
                    if let Some((ranges, rules)) = block.take() {
                        if !rules.is_empty() {
                            layout.conditional_formatting.push((ranges, rules));
                        }
                    }
                }
                _ => {}
            },
            _ => {}
        }
        buf.clear();
    }
    Ok(layout)
}

fn push_rule(
    block: &mut Option<(Vec<CellRange>, Vec<ConditionalFormattingRule>)>,
    pending: PendingRule,
    dxfs: &[DifferentialFormat],
) {
    let Some((_, rules)) = block.as_mut() else {
        return;
    };
    let rule_type = pending.rule_type.clone();
    match pending.finish(dxfs) {
        Some(rule) => rules.push(rule),
        None => warn!(%rule_type, "skipping unsupported conditional formatting rule"),
    }
}
