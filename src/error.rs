use chrono::NaiveDate;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or saving a report grid.
#[derive(Debug, Error)]
pub enum GridError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The destination is open in another program.
    #[error("{} is locked by another program; close it and run again", .0.display())]
    Locked(PathBuf),
}

impl GridError {
    /// Wraps an IO error, singling out the "file is held open" case.
    pub fn from_io(err: io::Error, path: impl Into<PathBuf>) -> Self {
        if err.kind() == io::ErrorKind::PermissionDenied {
            GridError::Locked(path.into())
        } else {
            GridError::Io(err)
        }
    }
}

/// Why a maildir file could not be turned into a message.
#[derive(Debug, Error)]
pub enum MessageError {
    #[error("malformed MIME structure: {0}")]
    Mime(#[from] mailparse::MailParseError),

    #[error("no usable Date header")]
    NoDate,

    #[error("cannot render HTML body: {0}")]
    Html(String),
}

/// Errors raised while looking for the block a report belongs to.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlaceError {
    #[error("no date row for {0} in the grid")]
    DateNotFound(NaiveDate),

    /// The date row sits too close to the top for a full block above it.
    #[error("date row {row} for {date} leaves no room for its block")]
    BlockOutOfRange { date: NaiveDate, row: u32 },
}

/// Invalid grid layout configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("invalid column letters: {0:?}")]
    InvalidColumn(String),

    #[error("rows per day must be at least 1")]
    NoRowsPerDay,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_denied_is_locked() {
        let err = GridError::from_io(io::ErrorKind::PermissionDenied.into(), "report.csv");
        assert!(matches!(&err, GridError::Locked(path) if path == &PathBuf::from("report.csv")));
        assert_eq!(
            err.to_string(),
            "report.csv is locked by another program; close it and run again"
        );

        let err = GridError::from_io(io::ErrorKind::NotFound.into(), "report.csv");
        assert!(matches!(err, GridError::Io(ref e) if e.kind() == io::ErrorKind::NotFound));
    }
}
