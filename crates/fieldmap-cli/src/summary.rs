use anyhow::{Context, Result};
use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use serde_json::json;

use fieldmap_engine::ConfidenceLevel;
use fieldmap_model::ResolutionRecord;

use crate::cli::OutputFormatArg;
use crate::commands::ResolveOutcome;

pub fn print_outcome(outcome: &ResolveOutcome, format: OutputFormatArg) -> Result<()> {
    match format {
        OutputFormatArg::Table => {
            print_tables(outcome);
            Ok(())
        }
        OutputFormatArg::Json => {
            let body = outcome_json(outcome);
            let text = serde_json::to_string_pretty(&body).context("serialize resolution")?;
            println!("{text}");
            Ok(())
        }
    }
}

/// JSON document for `--format json`.
pub fn outcome_json(outcome: &ResolveOutcome) -> serde_json::Value {
    json!({
        "data_domain": outcome.result.data_domain,
        "platform": outcome.result.platform,
        "records": outcome.result.to_records(),
        "summary": outcome.summary,
        "review": outcome.review,
    })
}

fn print_tables(outcome: &ResolveOutcome) {
    let result = &outcome.result;
    match &result.platform {
        Some(platform) => println!("Domain: {} ({platform})", result.data_domain),
        None => println!("Domain: {}", result.data_domain),
    }

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Header"),
        header_cell("Field"),
        header_cell("Confidence"),
        header_cell("Level"),
        header_cell("Method"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Center);
    for record in result.to_records() {
        let level = if record.standard_field_code == fieldmap_model::UNMAPPED {
            None
        } else {
            Some(
                outcome
                    .options
                    .thresholds
                    .categorize(record.confidence)
                    .unwrap_or(ConfidenceLevel::Low),
            )
        };
        table.add_row(record_row(&record, level));
    }
    println!("{table}");

    let summary = &outcome.summary;
    println!(
        "Mapped {}/{} ({:.0}%), high {}, medium {}, low {}, mean confidence {:.2}",
        summary.mapped,
        summary.total,
        summary.mapping_rate * 100.0,
        summary.count(ConfidenceLevel::High),
        summary.count(ConfidenceLevel::Medium),
        summary.count(ConfidenceLevel::Low),
        summary.mean_confidence
    );

    if !outcome.review.is_empty() {
        let mut review = Table::new();
        review.set_header(vec![
            header_cell("Header"),
            header_cell("Key field"),
            header_cell("Confidence"),
        ]);
        apply_table_style(&mut review);
        align_column(&mut review, 2, CellAlignment::Right);
        for item in &outcome.review {
            review.add_row(vec![
                Cell::new(&item.header),
                Cell::new(&item.field_code).fg(Color::Yellow),
                Cell::new(format!("{:.2}", item.confidence)).fg(Color::Yellow),
            ]);
        }
        println!();
        println!("Needs review:");
        println!("{review}");
    }
}

fn record_row(record: &ResolutionRecord, level: Option<ConfidenceLevel>) -> Vec<Cell> {
    match level {
        None => vec![
            Cell::new(&record.header),
            dim_cell(&record.standard_field_code),
            dim_cell("-"),
            dim_cell("-"),
            dim_cell(&record.method),
        ],
        Some(level) => vec![
            Cell::new(&record.header),
            Cell::new(&record.standard_field_code)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(format!("{:.2}", record.confidence)),
            Cell::new(level.as_str()).fg(level_color(level)),
            Cell::new(&record.method),
        ],
    }
}

fn level_color(level: ConfidenceLevel) -> Color {
    match level {
        ConfidenceLevel::High => Color::Green,
        ConfidenceLevel::Medium => Color::Yellow,
        ConfidenceLevel::Low => Color::Red,
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(140);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
