use super::{CellCoord, Column, Grid};
use crate::error::GridError;
use chrono::NaiveDate;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

/// A report grid stored as CSV: record N is row N, field 0 is column A.
///
/// Blank lines are not records, so an empty spreadsheet row has to be kept
/// as a line of commas (which is what spreadsheet exports produce).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvGrid {
    rows: Vec<Vec<String>>,
}

impl CsvGrid {
    pub fn open(path: &Path) -> Result<Self, GridError> {
        let file = File::open(path).map_err(|e| GridError::from_io(e, path))?;
        Self::read(file)
    }

    pub fn read<R: Read>(reader: R) -> Result<Self, GridError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);
        let mut rows = vec![];
        for record in csv_reader.records() {
            rows.push(record?.iter().map(str::to_string).collect());
        }
        Ok(CsvGrid { rows })
    }

    pub fn write<W: Write>(&self, writer: W) -> Result<(), GridError> {
        let mut csv_writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(writer);
        for row in &self.rows {
            if row.is_empty() {
                // Keep the row; a blank line would be dropped on read.
                csv_writer.write_record([""])?;
            } else {
                csv_writer.write_record(row)?;
            }
        }
        csv_writer.flush()?;
        Ok(())
    }

    /// Writes the grid next to `path` first and moves it into place, so a
    /// failed save leaves the previous file untouched.
    pub fn save(&self, path: &Path) -> Result<(), GridError> {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "grid.csv".to_string());
        let tmp_path = path.with_file_name(format!("{}.tmp", file_name));

        let tmp_file = File::create(&tmp_path).map_err(|e| GridError::from_io(e, path))?;
        if let Err(e) = self.write(tmp_file) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }
        fs::rename(&tmp_path, path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            GridError::from_io(e, path)
        })
    }
}

impl Grid for CsvGrid {
    fn lookup_row_by_date(&self, column: Column, date: NaiveDate) -> Option<u32> {
        self.rows
            .iter()
            .position(|row| {
                row.get(column.index())
                    .and_then(|value| parse_cell_date(value))
                    == Some(date)
            })
            .and_then(|index| u32::try_from(index + 1).ok())
    }

    fn read_cell(&self, cell: CellCoord) -> Option<&str> {
        let index = usize::try_from(cell.row).ok()?.checked_sub(1)?;
        self.rows
            .get(index)?
            .get(cell.column.index())
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    fn write_cell(&mut self, cell: CellCoord, value: String) {
        let Some(index) = (cell.row as usize).checked_sub(1) else {
            return;
        };
        if self.rows.len() <= index {
            self.rows.resize_with(index + 1, Vec::new);
        }
        let row = &mut self.rows[index];
        let col = cell.column.index();
        if row.len() <= col {
            row.resize_with(col + 1, String::new);
        }
        row[col] = value;
    }
}

/// Reads a date cell: `YYYY-MM-DD` or `YYYY/MM/DD`, optionally followed by a
/// time part which is ignored.
fn parse_cell_date(value: &str) -> Option<NaiveDate> {
    let date = value.trim().split([' ', 'T']).next()?;
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(date, "%Y/%m/%d"))
        .ok()
}
