//! Command dispatch for the `sheet-ranges` binary.

use std::path::Path;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};

use crate::config::{Command, Config, UpdateArgs};
use crate::form::{is_hex_color, parse_optional_coordinate, RangeForm};
use crate::range::{Range, RangeUpdate};
use crate::validation::{validate_workbook, WorkbookReport};
use crate::watch::WorkbookWatcher;
use crate::workbook::{Workbook, WorkbookError};

/// Run one command. Only `check` can finish with a failure status.
pub async fn run(config: &Config, command: Command) -> Result<ExitCode> {
    match command {
        Command::New { file, name, sheets } => {
            if file.exists() {
                bail!("Range file already exists: {}", file.display());
            }
            let name = name
                .or_else(|| file.file_stem().map(|s| s.to_string_lossy().into_owned()))
                .unwrap_or_else(|| "workbook".to_string());
            let sheets = if sheets.is_empty() {
                config.default_sheets.clone()
            } else {
                sheets
            };

            let workbook = Workbook::new(name, sheets);
            workbook.save(&file)?;
            println!(
                "Created {} with {} sheet(s)",
                file.display(),
                workbook.sheets.len()
            );
        }
        Command::Add { file, range } => {
            let mut workbook = Workbook::load(&file)?;
            let proposal = RangeForm::from(range)
                .parse()
                .map_err(anyhow::Error::msg)?;

            let range = workbook
                .add_range(proposal, &config.palette)
                .map_err(report_conflicts)?;
            workbook.save(&file)?;
            println!("Range \"{}\" added as {}", range.name, range.id);
        }
        Command::Remove { file, id, sheet } => {
            let mut workbook = Workbook::load(&file)?;
            match workbook.remove_range(&id, sheet) {
                Some(removed) => {
                    workbook.save(&file)?;
                    println!("Removed range \"{}\" ({})", removed.name, removed.id);
                }
                None => println!("No range {} on sheet {}, nothing removed", id, sheet),
            }
        }
        Command::Update { file, id, changes } => {
            let mut workbook = Workbook::load(&file)?;
            let update = range_update(changes)?;
            if update.is_empty() {
                bail!("Nothing to update for range {}", id);
            }

            let range = workbook
                .update_range(&id, update)
                .map_err(report_conflicts)?;
            workbook.save(&file)?;
            println!("Updated range \"{}\" ({})", range.name, range.id);
        }
        Command::List { file } => {
            let workbook = Workbook::load(&file)?;
            print_workbook(&workbook);
        }
        Command::Check { file, watch } => {
            let workbook = Workbook::load(&file)?;
            let report = validate_workbook(&workbook);
            print_report(&file, &report);

            if !watch {
                return Ok(if report.is_valid() {
                    ExitCode::SUCCESS
                } else {
                    ExitCode::FAILURE
                });
            }

            watch_file(&file).await?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

async fn watch_file(file: &Path) -> Result<()> {
    let mut watcher = WorkbookWatcher::new(file)?;
    let path = watcher.path().to_path_buf();

    loop {
        tokio::select! {
            next = watcher.next_report() => match next {
                Some(Ok(report)) => print_report(&path, &report),
                Some(Err(e)) => eprintln!("{:#}", e),
                None => break,
            },
            signal = tokio::signal::ctrl_c() => {
                signal.context("Failed to listen for Ctrl-C")?;
                break;
            }
        }
    }

    Ok(())
}

fn range_update(changes: UpdateArgs) -> Result<RangeUpdate> {
    let color = match changes.color {
        Some(color) if !is_hex_color(color.trim()) => {
            bail!("Color expects #RRGGBB, got '{}'", color)
        }
        other => other.map(|c| c.trim().to_string()),
    };

    let coordinate = |field: &str, value: Option<String>| {
        parse_optional_coordinate(field, value.as_deref()).map_err(anyhow::Error::msg)
    };

    Ok(RangeUpdate {
        name: changes.name,
        row_start: coordinate("Row Start", changes.row_start)?,
        row_end: coordinate("Row End", changes.row_end)?,
        col_start: coordinate("Column Start", changes.col_start)?,
        col_end: coordinate("Column End", changes.col_end)?,
        sheet_index: changes.sheet,
        color,
    })
}

fn report_conflicts(error: WorkbookError) -> anyhow::Error {
    for range in error.conflicting_ranges() {
        eprintln!("  conflicts with {}", describe(range));
    }
    error.into()
}

fn describe(range: &Range) -> String {
    format!(
        "\"{}\" ({}) sheet {} rows {}-{} cols {}-{}",
        range.name,
        range.id,
        range.sheet_index,
        range.row_start,
        range.row_end,
        range.col_start,
        range.col_end
    )
}

fn print_workbook(workbook: &Workbook) {
    println!("{}", workbook.name);
    for sheet in &workbook.sheets {
        println!(
            "  sheet {} \"{}\": {} range(s)",
            sheet.index,
            sheet.name,
            sheet.ranges.len()
        );
        for range in &sheet.ranges {
            println!(
                "    {}  {:<20} rows {}-{}  cols {}-{}  {} cells  {}",
                range.id,
                range.name,
                range.row_start,
                range.row_end,
                range.col_start,
                range.col_end,
                range
                    .bounds()
                    .cell_count()
                    .map_or_else(|| "too many".to_string(), |n| n.to_string()),
                range.color.as_deref().unwrap_or("-")
            );
        }
    }
}

fn print_report(file: &Path, report: &WorkbookReport) {
    for diagnostic in &report.diagnostics {
        println!("{}", diagnostic);
    }
    println!(
        "{}: {} error(s), {} warning(s)",
        file.display(),
        report.errors().count(),
        report.warnings().count()
    );
}
