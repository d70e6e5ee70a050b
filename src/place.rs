use crate::error::PlaceError;
use crate::grid::{CellCoord, Column, Grid};
use crate::layout::GridLayout;
use crate::report::ReportKind;
use chrono::NaiveDate;
use tracing::{info, warn};

/// The rows reserved for one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    pub date: NaiveDate,
    pub start_row: u32,
}

/// Next offset to try inside a block, kept separately for each kind so that
/// entries for the same date and kind never race for the same row.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BlockCursor {
    plan: u32,
    result: u32,
}

impl BlockCursor {
    fn get(&self, kind: ReportKind) -> u32 {
        match kind {
            ReportKind::Plan => self.plan,
            ReportKind::Result => self.result,
        }
    }

    fn set(&mut self, kind: ReportKind, offset: u32) {
        match kind {
            ReportKind::Plan => self.plan = offset,
            ReportKind::Result => self.result = offset,
        }
    }
}

/// Where a summary ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Written into an empty cell.
    Written(CellCoord),
    /// The block was full; appended to its last row.
    Appended(CellCoord),
}

impl Placement {
    pub fn cell(&self) -> CellCoord {
        match *self {
            Placement::Written(cell) | Placement::Appended(cell) => cell,
        }
    }
}

pub struct Placer<'a> {
    layout: &'a GridLayout,
}

impl<'a> Placer<'a> {
    pub fn new(layout: &'a GridLayout) -> Self {
        Placer { layout }
    }

    /// Finds the block of `date` from the grid's current date column.
    pub fn locate<G: Grid + ?Sized>(&self, grid: &G, date: NaiveDate) -> Result<Block, PlaceError> {
        let row = grid
            .lookup_row_by_date(self.layout.date_col, date)
            .ok_or(PlaceError::DateNotFound(date))?;
        let start_row = row
            .checked_sub(self.layout.date_row_offset)
            .filter(|&start| start >= 1)
            .ok_or(PlaceError::BlockOutOfRange { date, row })?;
        Ok(Block { date, start_row })
    }

    /// Writes `summary` into the first empty cell of `kind` at or after the
    /// cursor, or appends it to the block's last row when none is left.
    pub fn place<G: Grid + ?Sized>(
        &self,
        grid: &mut G,
        block: &Block,
        kind: ReportKind,
        summary: &str,
        cursor: &mut BlockCursor,
    ) -> Placement {
        let column = self.column(kind);
        for offset in cursor.get(kind)..self.layout.rows_per_day {
            let cell = CellCoord::new(column, block.start_row + offset);
            if grid.read_cell(cell).is_none() {
                grid.write_cell(cell, summary.to_string());
                cursor.set(kind, offset + 1);
                info!("{} {} <- {}", kind, cell, summary);
                return Placement::Written(cell);
            }
        }

        let cell = CellCoord::new(column, block.start_row + self.layout.rows_per_day - 1);
        let value = match grid.read_cell(cell) {
            Some(existing) => format!("{}\n{}", existing, summary),
            None => summary.to_string(),
        };
        grid.write_cell(cell, value);
        warn!("{} block for {} is full, appended to {} <- {}", kind, block.date, cell, summary);
        Placement::Appended(cell)
    }

    /// Places every item of one date in order. Both kinds start from the
    /// block's first row.
    pub fn place_batch<G: Grid + ?Sized>(
        &self,
        grid: &mut G,
        date: NaiveDate,
        items: &[(ReportKind, String)],
    ) -> Result<Vec<Placement>, PlaceError> {
        let block = self.locate(grid, date)?;
        let mut cursor = BlockCursor::default();
        Ok(items
            .iter()
            .map(|(kind, summary)| self.place(grid, &block, *kind, summary, &mut cursor))
            .collect())
    }

    /// Places a lone entry, honoring `reserve_first_result_row`.
    pub fn place_single<G: Grid + ?Sized>(
        &self,
        grid: &mut G,
        date: NaiveDate,
        kind: ReportKind,
        summary: &str,
    ) -> Result<Placement, PlaceError> {
        let block = self.locate(grid, date)?;
        let mut cursor = BlockCursor::default();
        if kind == ReportKind::Result && self.layout.reserve_first_result_row {
            cursor.set(kind, 1);
        }
        Ok(self.place(grid, &block, kind, summary, &mut cursor))
    }

    fn column(&self, kind: ReportKind) -> Column {
        match kind {
            ReportKind::Plan => self.layout.plan_col,
            ReportKind::Result => self.layout.result_col,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::CsvGrid;
    use pretty_assertions::assert_eq;

    const BLOCK_STRIDE: u32 = 8;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Header on row 1, then one block per day with two spacer rows each.
    /// The block of day `n` (0-based) starts at row `2 + 8n`.
    fn sample_grid(days: u32) -> CsvGrid {
        let mut grid = CsvGrid::default();
        grid.write_cell(CellCoord::new(Column(1), 1), "日付".to_string());
        grid.write_cell(CellCoord::new(Column(2), 1), "業務計画".to_string());
        for n in 0..days {
            let date_row = 2 + n * BLOCK_STRIDE + 3;
            let date = ymd(2026, 2, 19 + n);
            grid.write_cell(
                CellCoord::new(Column(1), date_row),
                date.format("%Y-%m-%d").to_string(),
            );
        }
        grid
    }

    fn plan(row: u32) -> CellCoord {
        CellCoord::new(Column(2), row)
    }

    fn result(row: u32) -> CellCoord {
        CellCoord::new(Column(5), row)
    }

    fn items(list: &[(ReportKind, &str)]) -> Vec<(ReportKind, String)> {
        list.iter().map(|(k, s)| (*k, s.to_string())).collect()
    }

    #[test]
    fn test_locate() {
        let layout = GridLayout::default();
        let placer = Placer::new(&layout);
        let grid = sample_grid(3);
        assert_eq!(
            placer.locate(&grid, ymd(2026, 2, 20)),
            Ok(Block {
                date: ymd(2026, 2, 20),
                start_row: 10
            })
        );
        assert_eq!(
            placer.locate(&grid, ymd(2026, 3, 1)),
            Err(PlaceError::DateNotFound(ymd(2026, 3, 1)))
        );
    }

    #[test]
    fn test_block_too_close_to_top() {
        let layout = GridLayout::default();
        let placer = Placer::new(&layout);
        let mut grid = CsvGrid::default();
        grid.write_cell(CellCoord::new(Column(1), 3), "2026-02-19".to_string());
        assert_eq!(
            placer.place_single(&mut grid, ymd(2026, 2, 19), ReportKind::Plan, "x"),
            Err(PlaceError::BlockOutOfRange {
                date: ymd(2026, 2, 19),
                row: 3
            })
        );
    }

    #[test]
    fn test_same_kind_takes_consecutive_rows() {
        let layout = GridLayout::default();
        let placer = Placer::new(&layout);
        let mut grid = sample_grid(2);
        let placements = placer
            .place_batch(
                &mut grid,
                ymd(2026, 2, 20),
                &items(&[
                    (ReportKind::Plan, "設計"),
                    (ReportKind::Result, "試験"),
                    (ReportKind::Plan, "レビュー"),
                ]),
            )
            .unwrap();
        assert_eq!(
            placements,
            vec![
                Placement::Written(plan(10)),
                Placement::Written(result(10)),
                Placement::Written(plan(11)),
            ]
        );
        assert_eq!(grid.read_cell(plan(10)), Some("設計"));
        assert_eq!(grid.read_cell(plan(11)), Some("レビュー"));
        assert_eq!(grid.read_cell(result(10)), Some("試験"));
    }

    #[test]
    fn test_first_fit_skips_occupied_rows() {
        let layout = GridLayout::default();
        let placer = Placer::new(&layout);
        let mut grid = sample_grid(1);
        grid.write_cell(plan(2), "既存1".to_string());
        grid.write_cell(plan(4), "既存2".to_string());
        // Occupied plan cells must not push results down.
        let placements = placer
            .place_batch(
                &mut grid,
                ymd(2026, 2, 19),
                &items(&[
                    (ReportKind::Plan, "a"),
                    (ReportKind::Plan, "b"),
                    (ReportKind::Result, "c"),
                ]),
            )
            .unwrap();
        assert_eq!(
            placements,
            vec![
                Placement::Written(plan(3)),
                Placement::Written(plan(5)),
                Placement::Written(result(2)),
            ]
        );
    }

    #[test]
    fn test_full_block_appends_to_last_row() {
        let layout = GridLayout::default();
        let placer = Placer::new(&layout);
        let mut grid = sample_grid(1);
        for row in 2..8 {
            grid.write_cell(plan(row), format!("既存{}", row));
        }
        let placement = placer
            .place_single(&mut grid, ymd(2026, 2, 19), ReportKind::Plan, "追加")
            .unwrap();
        assert_eq!(placement, Placement::Appended(plan(7)));
        assert_eq!(grid.read_cell(plan(7)), Some("既存7\n追加"));
        // Rows before the last are untouched.
        assert_eq!(grid.read_cell(plan(6)), Some("既存6"));
    }

    #[test]
    fn test_batch_overflow() {
        let layout = GridLayout::default();
        let placer = Placer::new(&layout);
        let mut grid = sample_grid(1);
        let list: Vec<_> = (1..=8)
            .map(|n| (ReportKind::Result, format!("r{}", n)))
            .collect();
        let placements = placer.place_batch(&mut grid, ymd(2026, 2, 19), &list).unwrap();
        assert_eq!(placements[5], Placement::Written(result(7)));
        assert_eq!(placements[6], Placement::Appended(result(7)));
        assert_eq!(placements[7], Placement::Appended(result(7)));
        assert_eq!(grid.read_cell(result(7)), Some("r6\nr7\nr8"));
        assert_eq!(grid.read_cell(result(8)), None);
    }

    #[test]
    fn test_reserved_first_result_row() {
        let layout = GridLayout::default();
        let placer = Placer::new(&layout);
        let mut grid = sample_grid(1);
        let date = ymd(2026, 2, 19);

        assert_eq!(
            placer.place_single(&mut grid, date, ReportKind::Result, "実績"),
            Ok(Placement::Written(result(3)))
        );
        // Plans are not affected.
        assert_eq!(
            placer.place_single(&mut grid, date, ReportKind::Plan, "計画"),
            Ok(Placement::Written(plan(2)))
        );
        // Batches always start from the first row.
        assert_eq!(
            placer.place_batch(&mut grid, date, &items(&[(ReportKind::Result, "まとめ")])),
            Ok(vec![Placement::Written(result(2))])
        );
    }

    #[test]
    fn test_unreserved_single_result() {
        let layout = GridLayout::default().with_reserved_first_result_row(false);
        let placer = Placer::new(&layout);
        let mut grid = sample_grid(1);
        assert_eq!(
            placer.place_single(&mut grid, ymd(2026, 2, 19), ReportKind::Result, "実績"),
            Ok(Placement::Written(result(2)))
        );
    }

    #[test]
    fn test_custom_rows_per_day() {
        let layout = GridLayout::new(Column(1), Column(2), Column(5), 4).unwrap();
        let placer = Placer::new(&layout);
        let mut grid = sample_grid(1);
        let list = items(&[
            (ReportKind::Plan, "1"),
            (ReportKind::Plan, "2"),
            (ReportKind::Plan, "3"),
            (ReportKind::Plan, "4"),
            (ReportKind::Plan, "5"),
        ]);
        let placements = placer.place_batch(&mut grid, ymd(2026, 2, 19), &list).unwrap();
        assert_eq!(placements[3], Placement::Written(plan(5)));
        assert_eq!(placements[4], Placement::Appended(plan(5)));
        assert_eq!(grid.read_cell(plan(5)), Some("4\n5"));
        assert_eq!(grid.read_cell(plan(6)), None);
    }

    #[test]
    fn test_short_block() {
        // Blocks may end above their date row.
        let layout = GridLayout::new(Column(1), Column(2), Column(5), 2).unwrap();
        let placer = Placer::new(&layout);
        let mut grid = sample_grid(1);
        let list = items(&[
            (ReportKind::Plan, "1"),
            (ReportKind::Plan, "2"),
            (ReportKind::Plan, "3"),
        ]);
        assert_eq!(
            placer.place_batch(&mut grid, ymd(2026, 2, 19), &list),
            Ok(vec![
                Placement::Written(plan(2)),
                Placement::Written(plan(3)),
                Placement::Appended(plan(3)),
            ])
        );
        assert_eq!(grid.read_cell(plan(3)), Some("2\n3"));
        assert_eq!(grid.read_cell(plan(4)), None);
    }
}
