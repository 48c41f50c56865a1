//! A1 notation for addressing ranges, e.g. `Sheet1!A1:C5`, `'My Sheet'!A:A` or
//! just `Sheet1`. A sheet name by itself refers to all the data in that sheet.

use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use super::types::RangeError;

/// One corner of a cell rectangle. Either part may be open (`A` or `3`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CellRef {
    /// 0-based column
    pub col: Option<u32>,
    /// 0-based row
    pub row: Option<u32>,
}

impl CellRef {
    pub fn new(col: u32, row: u32) -> Self {
        CellRef {
            col: Some(col),
            row: Some(row),
        }
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(col) = self.col {
            write!(f, "{}", column_letter(col))?;
        }
        if let Some(row) = self.row {
            write!(f, "{}", row + 1)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRect {
    pub start: CellRef,
    pub end: Option<CellRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct A1Range {
    pub sheet: Option<String>,
    pub cells: Option<CellRect>,
}

fn cell_ref_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?P<c1>[A-Za-z]{1,3})?(?P<r1>[0-9]+)?(?::(?P<c2>[A-Za-z]{1,3})?(?P<r2>[0-9]+)?)?$")
            .expect("cell reference pattern is valid")
    })
}

impl A1Range {
    /// A range covering a whole sheet
    pub fn sheet(name: impl Into<String>) -> Self {
        A1Range {
            sheet: Some(name.into()),
            cells: None,
        }
    }

    pub fn with_cells(mut self, start: CellRef, end: Option<CellRef>) -> Self {
        self.cells = Some(CellRect { start, end });
        self
    }

    pub fn parse(input: &str) -> Result<Self, RangeError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(RangeError::Empty);
        }

        if let Some(rest) = input.strip_prefix('\'') {
            let (sheet, tail) = split_quoted(rest).ok_or_else(|| RangeError::invalid(input))?;
            return match tail {
                "" => Ok(A1Range::sheet(sheet)),
                _ => match tail.strip_prefix('!') {
                    Some(cells) => Ok(A1Range {
                        sheet: Some(sheet),
                        cells: Some(parse_cells(cells).ok_or_else(|| RangeError::invalid(input))?),
                    }),
                    None => Err(RangeError::invalid(input)),
                },
            };
        }

        match input.rsplit_once('!') {
            Some((sheet, cells)) => {
                if sheet.is_empty() {
                    return Err(RangeError::invalid(input));
                }
                Ok(A1Range {
                    sheet: Some(sheet.to_string()),
                    cells: Some(parse_cells(cells).ok_or_else(|| RangeError::invalid(input))?),
                })
            }
            // Upper-case references without a sheet address the first sheet
            None if is_upper_reference(input) => Ok(A1Range {
                sheet: None,
                cells: parse_cells(input),
            }),
            None => Ok(A1Range::sheet(input)),
        }
    }

    /// 0-based (row, col) of the top-left cell, open parts default to 0.
    pub fn origin(&self) -> (u32, u32) {
        match &self.cells {
            Some(rect) => (rect.start.row.unwrap_or(0), rect.start.col.unwrap_or(0)),
            None => (0, 0),
        }
    }
}

impl FromStr for A1Range {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        A1Range::parse(s)
    }
}

impl fmt::Display for A1Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(sheet) = &self.sheet {
            if needs_quotes(sheet) {
                write!(f, "'{}'", sheet.replace('\'', "''"))?;
            } else {
                write!(f, "{}", sheet)?;
            }
            if self.cells.is_some() {
                write!(f, "!")?;
            }
        }
        if let Some(rect) = &self.cells {
            write!(f, "{}", rect.start)?;
            if let Some(end) = &rect.end {
                write!(f, ":{}", end)?;
            }
        }
        Ok(())
    }
}

/// Split `name'rest` where quotes inside `name` are doubled.
fn split_quoted(s: &str) -> Option<(String, &str)> {
    let mut name = String::new();
    let mut chars = s.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if c == '\'' {
            if let Some((_, '\'')) = chars.peek() {
                chars.next();
                name.push('\'');
                continue;
            }
            if name.is_empty() {
                return None;
            }
            return Some((name, &s[i + 1..]));
        }
        name.push(c);
    }
    None
}

fn parse_cells(s: &str) -> Option<CellRect> {
    let caps = cell_ref_regex().captures(s)?;
    let column = |name: &str| caps.name(name).and_then(|m| column_index(m.as_str()));
    let row = |name: &str| -> Option<u32> {
        caps.name(name)
            .and_then(|m| m.as_str().parse::<u32>().ok())
            .and_then(|n| n.checked_sub(1))
    };

    let start = CellRef {
        col: column("c1"),
        row: row("r1"),
    };
    if start.col.is_none() && start.row.is_none() {
        return None;
    }
    // Rows are 1-based in notation
    if caps.name("r1").is_some() && start.row.is_none() {
        return None;
    }

    let end = if s.contains(':') {
        let end = CellRef {
            col: column("c2"),
            row: row("r2"),
        };
        if end.col.is_none() && end.row.is_none() {
            return None;
        }
        if caps.name("r2").is_some() && end.row.is_none() {
            return None;
        }
        Some(end)
    } else {
        None
    };

    Some(CellRect { start, end })
}

fn is_upper_reference(s: &str) -> bool {
    !s.chars().any(|c| c.is_ascii_lowercase()) && parse_cells(s).is_some()
}

fn needs_quotes(sheet: &str) -> bool {
    !sheet.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') || is_upper_reference(sheet)
}

/// Convert column index (0-based) to a column letter (A, B, ..., Z, AA, AB, ...)
pub fn column_letter(index: u32) -> String {
    let mut result = String::new();
    let mut n = u64::from(index) + 1;

    while n > 0 {
        n -= 1;
        let c = (b'A' + (n % 26) as u8) as char;
        result.insert(0, c);
        n /= 26;
    }

    result
}

/// Inverse of [`column_letter`]; case-insensitive.
pub fn column_index(letters: &str) -> Option<u32> {
    if letters.is_empty() {
        return None;
    }
    let mut n: u64 = 0;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        let digit = u64::from(c.to_ascii_uppercase() as u8 - b'A') + 1;
        n = n.checked_mul(26)?.checked_add(digit)?;
    }
    u32::try_from(n - 1).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_letter() {
        assert_eq!(column_letter(0), "A");
        assert_eq!(column_letter(1), "B");
        assert_eq!(column_letter(25), "Z");
        assert_eq!(column_letter(26), "AA");
        assert_eq!(column_letter(27), "AB");
        assert_eq!(column_letter(51), "AZ");
        assert_eq!(column_letter(52), "BA");
    }

    #[test]
    fn test_column_letter_at_u32_max() {
        let letters = column_letter(u32::MAX);
        assert_eq!(letters, "MWLQKWV");
        assert_eq!(column_index(&letters), Some(u32::MAX));
        assert_eq!(column_index("MWLQKWW"), None);
    }

    #[test]
    fn test_column_index() {
        assert_eq!(column_index("A"), Some(0));
        assert_eq!(column_index("z"), Some(25));
        assert_eq!(column_index("AA"), Some(26));
        assert_eq!(column_index("XFD"), Some(16383));
        assert_eq!(column_index(""), None);
        assert_eq!(column_index("A1"), None);
    }

    #[test]
    fn test_parse_bare_sheet() {
        let range = A1Range::parse("Read").unwrap();
        assert_eq!(range, A1Range::sheet("Read"));
        assert_eq!(range.origin(), (0, 0));
    }

    #[test]
    fn test_parse_sheet_with_rect() {
        let range = A1Range::parse("Sheet1!A1:C5").unwrap();
        assert_eq!(range.sheet.as_deref(), Some("Sheet1"));
        let rect = range.cells.unwrap();
        assert_eq!(rect.start, CellRef::new(0, 0));
        assert_eq!(rect.end, Some(CellRef::new(2, 4)));
    }

    #[test]
    fn test_parse_whole_column() {
        let range = A1Range::parse("Sheet1!B:B").unwrap();
        let rect = range.cells.unwrap();
        assert_eq!(rect.start, CellRef { col: Some(1), row: None });
        assert_eq!(range.origin(), (0, 1));
    }

    #[test]
    fn test_parse_quoted_sheet() {
        let range = A1Range::parse("'Bob''s Sheet'!C3").unwrap();
        assert_eq!(range.sheet.as_deref(), Some("Bob's Sheet"));
        assert_eq!(range.origin(), (2, 2));
        assert_eq!(range.to_string(), "'Bob''s Sheet'!C3");
    }

    #[test]
    fn test_parse_rect_without_sheet() {
        let range = A1Range::parse("A2:B").unwrap();
        assert_eq!(range.sheet, None);
        assert_eq!(range.origin(), (1, 0));
    }

    #[test]
    fn test_parse_invalid() {
        assert!(matches!(A1Range::parse("  "), Err(RangeError::Empty)));
        assert!(matches!(A1Range::parse("Sheet1!1A"), Err(RangeError::Invalid(_))));
        assert!(matches!(A1Range::parse("Sheet1!A0"), Err(RangeError::Invalid(_))));
        assert!(matches!(A1Range::parse("'unterminated"), Err(RangeError::Invalid(_))));
        assert!(matches!(A1Range::parse("!A1"), Err(RangeError::Invalid(_))));
    }

    #[test]
    fn test_display_quotes_when_needed() {
        let range = A1Range::sheet("My Sheet").with_cells(CellRef::new(0, 0), Some(CellRef::new(1, 9)));
        assert_eq!(range.to_string(), "'My Sheet'!A1:B10");
        assert_eq!(A1Range::sheet("Append").to_string(), "Append");
        assert_eq!(A1Range::sheet("AB12").to_string(), "'AB12'");
    }
}
