use crate::datetime;
use crate::error::LayoutError;
use crate::grid::Column;
use crate::layout::{GridLayout, DEFAULT_ROWS_PER_DAY};
use crate::report::ReportKind;
use chrono::{Datelike, NaiveDate};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Parser)]
#[clap(name = "daily-report")]
#[clap(author, version, about)]
pub struct Args {
    /// Only log warnings and hide progress output.
    #[clap(short, long, global = true)]
    pub quiet: bool,
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Copy reports from relayed chat mails in a maildir into the grid.
    Collect(CollectArgs),
    /// Write a single report into the grid.
    Write(WriteArgs),
}

#[derive(Debug, clap::Args)]
pub struct CollectArgs {
    /// Path to the maildir.
    pub maildir: PathBuf,
    #[clap(flatten)]
    pub grid: GridArgs,
    /// JSON file listing the messages already copied.
    #[clap(long, env = "DAILY_REPORT_STATE", default_value = "processed_mail_ids.json")]
    pub state: PathBuf,
    /// Only take mails received on or after this day (YYYY-MM-DD).
    #[clap(long)]
    pub since: Option<NaiveDate>,
    /// Only take mails received on or before this day (YYYY-MM-DD).
    #[clap(long)]
    pub until: Option<NaiveDate>,
    /// Process mails again even if they are recorded as done. Reports
    /// already in the grid will be written a second time.
    #[clap(long)]
    pub reprocess: bool,
    /// Do everything but save the grid and the state file.
    #[clap(long)]
    pub dry_run: bool,
}

#[derive(Debug, clap::Args)]
pub struct WriteArgs {
    #[clap(flatten)]
    pub grid: GridArgs,
    /// Which column to write into.
    #[clap(long, value_enum)]
    pub mode: Mode,
    /// Text to write, cut to 50 characters.
    #[clap(long)]
    pub summary: String,
    /// Day to write for, as M/D in the current year. Defaults to today.
    #[clap(long)]
    pub date: Option<MonthDay>,
}

#[derive(Debug, clap::Args)]
pub struct GridArgs {
    /// Report grid CSV. `{fiscal_year}`, `{month_folder}` and `{month_name}`
    /// are replaced from today's date.
    #[clap(long, env = "DAILY_REPORT_GRID")]
    pub grid: String,
    /// Column holding the date of each block.
    #[clap(long, env = "DATE_COL", default_value = "B")]
    pub date_col: Column,
    /// Column for plans.
    #[clap(long, env = "PLAN_COL", default_value = "C")]
    pub plan_col: Column,
    /// Column for results.
    #[clap(long, env = "RESULT_COL", default_value = "F")]
    pub result_col: Column,
    /// Rows in each day's block, counted from three rows above the date.
    #[clap(long, env = "ROWS_PER_DAY", default_value_t = DEFAULT_ROWS_PER_DAY)]
    pub rows_per_day: u32,
    /// Keep the first result row of a block free when writing a single
    /// result; the report template holds a formula there.
    #[clap(
        long,
        env = "RESERVE_FIRST_RESULT_ROW",
        action = ArgAction::Set,
        default_value_t = true,
        value_name = "BOOL"
    )]
    pub reserve_first_result_row: bool,
    /// Let single result writes use the first row of the block.
    #[clap(long)]
    pub no_reserve_first_result_row: bool,
}

impl GridArgs {
    pub fn layout(&self) -> Result<GridLayout, LayoutError> {
        Ok(GridLayout::new(
            self.date_col,
            self.plan_col,
            self.result_col,
            self.rows_per_day,
        )?
        .with_reserved_first_result_row(
            self.reserve_first_result_row && !self.no_reserve_first_result_row,
        ))
    }

    pub fn grid_path(&self, today: NaiveDate) -> PathBuf {
        resolve_grid_path(&self.grid, today)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    Plan,
    Result,
}

impl From<Mode> for ReportKind {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Plan => ReportKind::Plan,
            Mode::Result => ReportKind::Result,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthDay {
    pub month: u32,
    pub day: u32,
}

impl FromStr for MonthDay {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        datetime::parse_month_day(s)
            .map(|(month, day)| MonthDay { month, day })
            .ok_or_else(|| format!("expected M/D (e.g. 2/21), got {:?}", s))
    }
}

/// Fills the placeholders of a grid path. The fiscal year starts in April,
/// so `month_folder` runs from `01_4月` to `12_3月`.
fn resolve_grid_path(template: &str, today: NaiveDate) -> PathBuf {
    let month = today.month();
    let (fiscal_year, fiscal_month) = if month >= 4 {
        (today.year(), month - 3)
    } else {
        (today.year() - 1, month + 9)
    };
    let path = template
        .replace("{fiscal_year}", &fiscal_year.to_string())
        .replace("{month_folder}", &format!("{:02}_{}月", fiscal_month, month))
        .replace("{month_name}", &format!("{}月", month));
    PathBuf::from(path)
}
