use crate::error::LayoutError;
use crate::grid::Column;

pub const DEFAULT_ROWS_PER_DAY: u32 = 6;
/// The date row is the fourth row of its block.
pub const DATE_ROW_OFFSET: u32 = 3;
pub const SUMMARY_MAX_LEN: usize = 50;

/// Shape of the monthly report grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridLayout {
    pub date_col: Column,
    pub plan_col: Column,
    pub result_col: Column,
    pub rows_per_day: u32,
    pub date_row_offset: u32,
    pub summary_max_len: usize,
    /// Single writes of results skip the block's first row, which the
    /// report template fills with a formula. Batch placement ignores this.
    pub reserve_first_result_row: bool,
}

impl GridLayout {
    pub fn new(
        date_col: Column,
        plan_col: Column,
        result_col: Column,
        rows_per_day: u32,
    ) -> Result<Self, LayoutError> {
        if rows_per_day == 0 {
            return Err(LayoutError::NoRowsPerDay);
        }
        Ok(GridLayout {
            date_col,
            plan_col,
            result_col,
            rows_per_day,
            date_row_offset: DATE_ROW_OFFSET,
            summary_max_len: SUMMARY_MAX_LEN,
            reserve_first_result_row: true,
        })
    }

    pub fn with_reserved_first_result_row(mut self, reserve: bool) -> Self {
        self.reserve_first_result_row = reserve;
        self
    }
}

impl Default for GridLayout {
    /// Dates in B, plans in C, results in F, six rows per day, first result
    /// row reserved.
    fn default() -> Self {
        GridLayout {
            date_col: Column(1),
            plan_col: Column(2),
            result_col: Column(5),
            rows_per_day: DEFAULT_ROWS_PER_DAY,
            date_row_offset: DATE_ROW_OFFSET,
            summary_max_len: SUMMARY_MAX_LEN,
            reserve_first_result_row: true,
        }
    }
}
