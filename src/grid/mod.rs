mod csv_grid;

pub use self::csv_grid::CsvGrid;

use crate::error::LayoutError;
use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

/// A spreadsheet column, 0-based internally (`A` = 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Column(pub u16);

impl Column {
    /// Converts letters (`A`, `F`, `AA`, ...) into a column, case-insensitively.
    pub fn from_letters(letters: &str) -> Result<Self, LayoutError> {
        let invalid = || LayoutError::InvalidColumn(letters.to_string());
        let letters = letters.trim();
        if letters.is_empty() || letters.len() > 3 {
            return Err(invalid());
        }
        let mut col: u32 = 0;
        for c in letters.chars() {
            if !c.is_ascii_alphabetic() {
                return Err(invalid());
            }
            col = col * 26 + (c.to_ascii_uppercase() as u32 - 'A' as u32 + 1);
        }
        u16::try_from(col - 1).map(Column).map_err(|_| invalid())
    }

    pub fn index(self) -> usize {
        usize::from(self.0)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut letters = Vec::new();
        let mut n = u32::from(self.0) + 1;
        while n > 0 {
            n -= 1;
            letters.push((n % 26) as u8 + b'A');
            n /= 26;
        }
        letters.reverse();
        f.write_str(&String::from_utf8_lossy(&letters))
    }
}

impl FromStr for Column {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_letters(s)
    }
}

/// A cell position. Rows are 1-based like spreadsheet rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellCoord {
    pub column: Column,
    pub row: u32,
}

impl CellCoord {
    pub fn new(column: Column, row: u32) -> Self {
        CellCoord { column, row }
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.column, self.row)
    }
}

/// The only view of a report grid the placement code needs.
pub trait Grid {
    /// Row of the first cell in `column` holding `date`, scanning from row 1.
    fn lookup_row_by_date(&self, column: Column, date: NaiveDate) -> Option<u32>;

    /// Text of a cell, `None` when the cell is empty.
    fn read_cell(&self, cell: CellCoord) -> Option<&str>;

    fn write_cell(&mut self, cell: CellCoord, value: String);
}
