use crate::error::{Result, SheetError};
use crate::sheet::Sheet;
use indexmap::IndexMap;

/// A book containing multiple sheets (preserves insertion order)
#[derive(Debug, Clone, Default)]
pub struct Book {
    sheets: IndexMap<String, Sheet>,
}

impl Book {
    /// Create a new empty book
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of sheets
    #[must_use]
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Check if the book is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    /// Get all sheet names in order
    #[must_use]
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.keys().map(String::as_str).collect()
    }

    /// Check if a sheet exists
    #[must_use]
    pub fn has_sheet(&self, name: &str) -> bool {
        self.sheets.contains_key(name)
    }

    // ===== Sheet Access =====

    /// Get a sheet by name
    pub fn sheet(&self, name: &str) -> Result<&Sheet> {
        self.sheets
            .get(name)
            .ok_or_else(|| SheetError::SheetNotFound {
                name: name.to_string(),
            })
    }

    /// Get a mutable sheet by name
    pub fn sheet_mut(&mut self, name: &str) -> Result<&mut Sheet> {
        self.sheets
            .get_mut(name)
            .ok_or_else(|| SheetError::SheetNotFound {
                name: name.to_string(),
            })
    }

    /// Get a sheet by index (0-based)
    pub fn sheet_by_index(&self, index: usize) -> Result<&Sheet> {
        self.sheets
            .get_index(index)
            .map(|(_, sheet)| sheet)
            .ok_or_else(|| SheetError::SheetNotFound {
                name: format!("index {index}"),
            })
    }

    /// Iterate sheets in order
    pub fn sheets(&self) -> impl Iterator<Item = &Sheet> {
        self.sheets.values()
    }

    // ===== Sheet Management =====

    /// Create an empty sheet and return it for population.
    pub fn create_sheet(&mut self, name: &str) -> Result<&mut Sheet> {
        self.add_sheet(Sheet::with_name(name))?;
        self.sheet_mut(name)
    }

    /// Add a sheet to the book under its own name
    pub fn add_sheet(&mut self, sheet: Sheet) -> Result<()> {
        let name = sheet.name().to_string();
        validate_sheet_name(&name)?;
        if self.sheets.contains_key(&name) {
            return Err(SheetError::SheetAlreadyExists { name });
        }
        self.sheets.insert(name, sheet);
        Ok(())
    }

    /// Remove a sheet from the book, keeping the order of the others
    pub fn remove_sheet(&mut self, name: &str) -> Result<Sheet> {
        self.sheets
            .shift_remove(name)
            .ok_or_else(|| SheetError::SheetNotFound {
                name: name.to_string(),
            })
    }

    /// Rename a sheet in place
    pub fn rename_sheet(&mut self, old_name: &str, new_name: &str) -> Result<()> {
        validate_sheet_name(new_name)?;
        if self.sheets.contains_key(new_name) {
            return Err(SheetError::SheetAlreadyExists {
                name: new_name.to_string(),
            });
        }
        let index = self
            .sheets
            .get_index_of(old_name)
            .ok_or_else(|| SheetError::SheetNotFound {
                name: old_name.to_string(),
            })?;
        let (_, mut sheet) = self
            .sheets
            .shift_remove_index(index)
            .ok_or_else(|| SheetError::SheetNotFound {
                name: old_name.to_string(),
            })?;
        sheet.set_name(new_name);
        self.sheets.shift_insert(index, new_name.to_string(), sheet);
        Ok(())
    }
}

/// Excel limits sheet names to 31 characters and forbids a handful of symbols.
fn validate_sheet_name(name: &str) -> Result<()> {
    let invalid = name.is_empty()
        || name.chars().count() > 31
        || name.starts_with('\'')
        || name.ends_with('\'')
        || name.contains(['[', ']', ':', '*', '?', '/', '\\']);
    if invalid {
        return Err(SheetError::InvalidSheetName {
            name: name.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_lookup() {
        let mut book = Book::new();
        book.create_sheet("Data").unwrap().set_a1("A1", 1).unwrap();
        book.create_sheet("Summary").unwrap();

        assert_eq!(book.sheet_count(), 2);
        assert_eq!(book.sheet_names(), vec!["Data", "Summary"]);
        assert_eq!(book.sheet_by_index(1).unwrap().name(), "Summary");
        assert!(book.sheet("Missing").is_err());
    }

    #[test]
    fn test_duplicate_and_invalid_names() {
        let mut book = Book::new();
        book.create_sheet("Data").unwrap();
        assert!(matches!(
            book.create_sheet("Data"),
            Err(SheetError::SheetAlreadyExists { .. })
        ));
        assert!(matches!(
            book.create_sheet("a/b"),
            Err(SheetError::InvalidSheetName { .. })
        ));
        assert!(matches!(
            book.create_sheet(""),
            Err(SheetError::InvalidSheetName { .. })
        ));
    }

    #[test]
    fn test_rename_keeps_position() {
        let mut book = Book::new();
        book.create_sheet("A").unwrap();
        book.create_sheet("B").unwrap();
        book.create_sheet("C").unwrap();

        book.rename_sheet("B", "Middle").unwrap();
        assert_eq!(book.sheet_names(), vec!["A", "Middle", "C"]);
        assert_eq!(book.sheet("Middle").unwrap().name(), "Middle");

        let removed = book.remove_sheet("A").unwrap();
        assert_eq!(removed.name(), "A");
        assert_eq!(book.sheet_names(), vec!["Middle", "C"]);
    }
}
