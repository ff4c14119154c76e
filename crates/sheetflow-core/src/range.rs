//! A1-style range addressing.
//!
//! Ranges are either a single cell (`B3`) or a rectangle (`A1:D10`).
//! Parsing is strict about canonical form: an expression that parses but
//! does not re-serialize to itself (e.g. a leading zero in the row digits)
//! is rejected by [`A1Range::parse_strict`], which is what every caller
//! that requires a range goes through.
//!
//! Open-ended ranges constructed by this crate are bounded by the remote
//! service's practical ceiling: column `ZZZ`, row 10,000,000.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::SheetError;

/// Upper column bound used for "to the end of the sheet" ranges.
pub const MAX_COLUMN_LABEL: &str = "ZZZ";
/// Upper row bound used for "to the end of the sheet" ranges.
pub const MAX_ROW: u32 = 10_000_000;

static A1_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Z]{1,3})([0-9]+)(?::([A-Z]{1,3})([0-9]+))?$")
        .expect("A1 range regex must compile")
});

/// Parsed rectangular range with a 0-based start column and 1-based rows.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct A1Range {
    start_col: u32,
    start_row: u32,
    /// `(end_col, end_row)`; `None` for a single-cell range.
    end: Option<(u32, u32)>,
}

impl A1Range {
    /// Syntactic parse. Rejects malformed notation, row 0, and inverted
    /// bounds, but accepts non-canonical digits (see [`Self::parse_strict`]).
    pub fn parse(expr: &str) -> Result<Self, SheetError> {
        let caps = A1_PATTERN.captures(expr).ok_or_else(|| invalid(expr, "not A1 notation"))?;

        let start_col = column_index(&caps[1]).ok_or_else(|| invalid(expr, "bad column letters"))?;
        let start_row = parse_row(expr, &caps[2])?;

        let end = match (caps.get(3), caps.get(4)) {
            (Some(col), Some(row)) => {
                let end_col =
                    column_index(col.as_str()).ok_or_else(|| invalid(expr, "bad column letters"))?;
                let end_row = parse_row(expr, row.as_str())?;
                if end_col < start_col || end_row < start_row {
                    return Err(invalid(expr, "end cell sits above or left of the start cell"));
                }
                Some((end_col, end_row))
            }
            _ => None,
        };

        Ok(Self {
            start_col,
            start_row,
            end,
        })
    }

    /// Parse and additionally require the expression to be round-trip
    /// stable: serializing the parsed range must reproduce the input.
    pub fn parse_strict(expr: &str) -> Result<Self, SheetError> {
        let range = Self::parse(expr)?;
        if range.to_string() != expr {
            return Err(invalid(expr, "not in canonical form"));
        }
        Ok(range)
    }

    /// Whether `expr` is syntactically valid A1 notation.
    pub fn is_valid(expr: &str) -> bool {
        Self::parse(expr).is_ok()
    }

    /// Whether `expr` parses and re-serializes to itself.
    pub fn is_round_trip_stable(expr: &str) -> bool {
        Self::parse_strict(expr).is_ok()
    }

    /// Single cell in column A.
    pub fn anchor_row(row: u32) -> Self {
        Self {
            start_col: 0,
            start_row: row,
            end: None,
        }
    }

    /// `A1:ZZZ10000000`.
    pub fn full_sheet() -> Self {
        Self::from_row_to_end(1)
    }

    /// `A{row}:ZZZ10000000`.
    pub fn from_row_to_end(row: u32) -> Self {
        Self {
            start_col: 0,
            start_row: row,
            end: Some((max_col(), MAX_ROW)),
        }
    }

    /// `A{row}:ZZZ{row}` — one full-width row.
    pub fn row_span(row: u32) -> Self {
        Self::row_block(row, 1)
    }

    /// `A{row}:ZZZ{row + height - 1}` — a full-width block of rows.
    pub fn row_block(row: u32, height: u32) -> Self {
        debug_assert!(height >= 1);
        Self {
            start_col: 0,
            start_row: row,
            end: Some((max_col(), row + height - 1)),
        }
    }

    /// `A{row}:{label(width - 1)}{row}` — a row limited to `width` columns.
    pub fn row_prefix(row: u32, width: u32) -> Self {
        debug_assert!(width >= 1);
        Self {
            start_col: 0,
            start_row: row,
            end: Some((width - 1, row)),
        }
    }

    /// 0-based starting column.
    pub fn start_col(&self) -> u32 {
        self.start_col
    }

    /// 1-based starting row.
    pub fn start_row(&self) -> u32 {
        self.start_row
    }

    /// 0-based ending column (the start column for a single cell).
    pub fn end_col(&self) -> u32 {
        self.end.map_or(self.start_col, |(col, _)| col)
    }

    /// 1-based ending row (the start row for a single cell).
    pub fn end_row(&self) -> u32 {
        self.end.map_or(self.start_row, |(_, row)| row)
    }

    /// Number of rows spanned (1 for a single cell).
    pub fn height(&self) -> u32 {
        match self.end {
            Some((_, end_row)) => end_row - self.start_row + 1,
            None => 1,
        }
    }

    /// Advance the start row by one and reduce the height by one, for
    /// callers that consume the top row as a header. Returns `None` when
    /// the height is exactly 1: no data rows remain and shrinking would be
    /// degenerate.
    pub fn shrink_top_row(&self) -> Option<Self> {
        let (end_col, end_row) = self.end?;
        if end_row == self.start_row {
            return None;
        }
        Some(Self {
            start_col: self.start_col,
            start_row: self.start_row + 1,
            end: Some((end_col, end_row)),
        })
    }

    /// Fully qualified form: `<sheet>!<range>`.
    pub fn qualified(&self, sheet: &str) -> String {
        format!("{sheet}!{self}")
    }
}

impl fmt::Display for A1Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_label(self.start_col), self.start_row)?;
        if let Some((end_col, end_row)) = self.end {
            write!(f, ":{}{}", column_label(end_col), end_row)?;
        }
        Ok(())
    }
}

fn invalid(expr: &str, reason: &str) -> SheetError {
    SheetError::InvalidRange {
        range: expr.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_row(expr: &str, digits: &str) -> Result<u32, SheetError> {
    let row: u32 = digits
        .parse()
        .map_err(|_| invalid(expr, "row number out of range"))?;
    if row == 0 {
        return Err(invalid(expr, "rows are 1-based"));
    }
    Ok(row)
}

fn max_col() -> u32 {
    column_index(MAX_COLUMN_LABEL).expect("sentinel column label is valid")
}

/// 0-based column index to letters (0 = A, 25 = Z, 26 = AA).
pub fn column_label(mut col: u32) -> String {
    let mut buf = Vec::new();
    loop {
        let rem = (col % 26) as u8;
        buf.push(b'A' + rem);
        col /= 26;
        if col == 0 {
            break;
        }
        col -= 1;
    }
    buf.reverse();
    String::from_utf8(buf).expect("only ASCII A-Z")
}

/// Column letters to 0-based index. `None` for anything but `A`-`Z` runs.
pub fn column_index(letters: &str) -> Option<u32> {
    if letters.is_empty() {
        return None;
    }
    let mut col: u32 = 0;
    for (idx, ch) in letters.bytes().enumerate() {
        if !ch.is_ascii_uppercase() {
            return None;
        }
        col = col.checked_mul(26)?;
        col = col.checked_add((ch - b'A') as u32)?;
        if idx != letters.len() - 1 {
            col = col.checked_add(1)?;
        }
    }
    Some(col)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_cell_and_rectangle() {
        let cell = A1Range::parse("B3").unwrap();
        assert_eq!(cell.start_col(), 1);
        assert_eq!(cell.start_row(), 3);
        assert_eq!(cell.height(), 1);

        let rect = A1Range::parse("A1:D10").unwrap();
        assert_eq!(rect.start_col(), 0);
        assert_eq!(rect.start_row(), 1);
        assert_eq!(rect.height(), 10);
        assert_eq!(rect.to_string(), "A1:D10");
    }

    #[test]
    fn rejects_malformed_expressions() {
        for expr in ["", "1A", "A0", "A1:B", "a1", "A1:A0", "D3:A1", "A1:B2:C3"] {
            assert!(!A1Range::is_valid(expr), "{expr} should be invalid");
        }
    }

    #[test]
    fn round_trip_stability_rejects_non_canonical_forms() {
        assert!(A1Range::is_round_trip_stable("A1:B2"));
        assert!(A1Range::is_round_trip_stable("ZZ99"));
        // Parses, but re-serializes as A1 — rejected.
        assert!(A1Range::is_valid("A01"));
        assert!(!A1Range::is_round_trip_stable("A01"));
    }

    #[test]
    fn shrink_top_row_reduces_height() {
        let range = A1Range::parse("A1:C4").unwrap();
        let shrunk = range.shrink_top_row().unwrap();
        assert_eq!(shrunk.to_string(), "A2:C4");
        assert_eq!(shrunk.height(), 3);
    }

    #[test]
    fn shrink_top_row_is_degenerate_for_height_one() {
        assert!(A1Range::parse("A1:C1").unwrap().shrink_top_row().is_none());
        assert!(A1Range::parse("B2").unwrap().shrink_top_row().is_none());
    }

    #[test]
    fn open_ended_ranges_use_the_sentinel_bound() {
        assert_eq!(A1Range::full_sheet().to_string(), "A1:ZZZ10000000");
        assert_eq!(A1Range::from_row_to_end(4).to_string(), "A4:ZZZ10000000");
        assert_eq!(A1Range::row_span(2).to_string(), "A2:ZZZ2");
        assert_eq!(A1Range::row_block(5, 3).to_string(), "A5:ZZZ7");
        assert_eq!(A1Range::row_prefix(1, 3).to_string(), "A1:C1");
        assert_eq!(A1Range::anchor_row(7).qualified("Sheet1"), "Sheet1!A7");
    }

    #[test]
    fn column_label_roundtrip() {
        for (idx, label) in [(0, "A"), (25, "Z"), (26, "AA"), (27, "AB"), (18277, "ZZZ")] {
            assert_eq!(column_label(idx), label);
            assert_eq!(column_index(label), Some(idx));
        }
        assert_eq!(column_index("a"), None);
        assert_eq!(column_index(""), None);
    }
}
