use crate::args::{CollectArgs, WriteArgs};
use crate::classify;
use crate::collect::{self, MailMessage};
use crate::datetime;
use crate::extract::Extractor;
use crate::grid::{CsvGrid, Grid};
use crate::layout::GridLayout;
use crate::place::{Placement, Placer};
use crate::report::{normalize_summary, ReportKind};
use crate::state::ProcessedIds;
use anyhow::{anyhow, Context};
use chrono::{Local, NaiveDate};
use tracing::{info, warn};

/// Which messages of the maildir to look at.
#[derive(Debug, Default, Clone, Copy)]
pub struct MessageFilter {
    pub since: Option<NaiveDate>,
    pub until: Option<NaiveDate>,
    pub reprocess: bool,
}

impl MessageFilter {
    fn in_range(&self, date: NaiveDate) -> bool {
        self.since.map_or(true, |since| date >= since)
            && self.until.map_or(true, |until| date <= until)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Messages whose reports were placed.
    pub new: usize,
    pub already_processed: usize,
    pub without_reports: usize,
    pub out_of_range: usize,
    /// Entries written or appended.
    pub placed: usize,
    /// Dates skipped because the grid has no block for them.
    pub skipped_dates: usize,
}

/// Places the reports of every message into `grid` and records handled
/// messages in `state`. Messages must be sorted oldest first.
pub fn process_messages<G: Grid + ?Sized>(
    grid: &mut G,
    layout: &GridLayout,
    extractor: &Extractor,
    messages: &[MailMessage],
    state: &mut ProcessedIds,
    filter: &MessageFilter,
) -> RunSummary {
    let placer = Placer::new(layout);
    let mut summary = RunSummary::default();
    for message in messages {
        let received = message.received_date();
        if !filter.in_range(received) {
            summary.out_of_range += 1;
            continue;
        }
        if state.contains(&message.id) && !filter.reprocess {
            summary.already_processed += 1;
            continue;
        }

        let entries = extractor.extract(&message.body, Some(received));
        if entries.is_empty() {
            info!("no reports in {} ({:?})", message.path.display(), message.subject);
            summary.without_reports += 1;
            continue;
        }

        for (date, items) in classify::group_by_date(entries, received) {
            match placer.place_batch(grid, date, &items) {
                Ok(placements) => summary.placed += placements.len(),
                Err(e) => {
                    warn!("{}, skipped {} reports from {}", e, items.len(), message.path.display());
                    summary.skipped_dates += 1;
                }
            }
        }
        state.insert(&message.id);
        summary.new += 1;
    }
    summary
}

pub fn run_collect(args: &CollectArgs, quiet: bool) -> anyhow::Result<()> {
    let layout = args.grid.layout()?;
    let grid_path = args.grid.grid_path(Local::now().date_naive());
    let mut grid = CsvGrid::open(&grid_path)
        .with_context(|| format!("cannot open grid {}", grid_path.display()))?;
    let mut state = ProcessedIds::load(&args.state)
        .with_context(|| format!("cannot load state {}", args.state.display()))?;
    if !state.is_empty() {
        info!("{} messages already processed", state.len());
    }

    let messages = collect::list_messages(&args.maildir, quiet)
        .with_context(|| format!("cannot read maildir {}", args.maildir.display()))?;
    let extractor = Extractor::new(layout.summary_max_len)?;
    let filter = MessageFilter {
        since: args.since,
        until: args.until,
        reprocess: args.reprocess,
    };
    let summary = process_messages(&mut grid, &layout, &extractor, &messages, &mut state, &filter);

    if args.dry_run {
        info!("dry run, nothing saved");
    } else {
        // The state only records what actually reached the grid.
        grid.save(&grid_path)
            .with_context(|| format!("cannot save grid {}", grid_path.display()))?;
        state
            .save(&args.state)
            .with_context(|| format!("cannot save state {}", args.state.display()))?;
    }

    info!(
        placed = summary.placed,
        skipped_dates = summary.skipped_dates,
        "{} new, {} already processed, {} without reports, {} out of range",
        summary.new,
        summary.already_processed,
        summary.without_reports,
        summary.out_of_range
    );
    Ok(())
}

pub fn run_write(args: &WriteArgs) -> anyhow::Result<()> {
    let layout = args.grid.layout()?;
    let today = Local::now().date_naive();
    let date = match args.date {
        Some(md) => datetime::resolve_report_date(md.month, md.day, None)
            .ok_or_else(|| anyhow!("{}/{} is not a valid date", md.month, md.day))?,
        None => today,
    };
    let summary = normalize_summary(&args.summary, layout.summary_max_len);
    if summary.is_empty() {
        return Err(anyhow!("summary is empty"));
    }

    let grid_path = args.grid.grid_path(today);
    let mut grid = CsvGrid::open(&grid_path)
        .with_context(|| format!("cannot open grid {}", grid_path.display()))?;
    let placement = write_single(&mut grid, &layout, date, args.mode.into(), &summary)?;
    grid.save(&grid_path)
        .with_context(|| format!("cannot save grid {}", grid_path.display()))?;
    info!("saved {} ({})", grid_path.display(), placement.cell());
    Ok(())
}

fn write_single<G: Grid + ?Sized>(
    grid: &mut G,
    layout: &GridLayout,
    date: NaiveDate,
    kind: ReportKind,
    summary: &str,
) -> anyhow::Result<Placement> {
    let placement = Placer::new(layout)
        .place_single(grid, date, kind, summary)
        .with_context(|| format!("cannot write {} for {}", kind, date))?;
    Ok(placement)
}
