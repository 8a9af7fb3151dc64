use crate::chart::ChartOption;
use crate::types::{FilterSelection, MonthlyAggregate, MonthlyRow, SeriesSummary};
use crate::util::format_number;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

/// Everything needed to reproduce the chart outside the program.
#[derive(Debug, Serialize)]
pub struct ExportDocument<'a> {
    pub generated_at: DateTime<Utc>,
    pub selection: &'a FilterSelection,
    pub series: &'a [MonthlyAggregate],
    pub summary: SeriesSummary,
    pub option: ChartOption,
}

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

/// Table rows for the series; empty months read "No Data".
pub fn monthly_rows(series: &[MonthlyAggregate]) -> Vec<MonthlyRow> {
    series
        .iter()
        .map(|m| MonthlyRow {
            month: m.month.to_string(),
            price: if m.price == 0.0 {
                "No Data".to_string()
            } else {
                format_number(m.price, 2)
            },
        })
        .collect()
}

pub fn render_table<T>(rows: &[T]) -> String
where
    T: Tabled + Clone,
{
    if rows.is_empty() {
        return "(no rows)".to_string();
    }
    Table::new(rows.to_vec()).with(Style::markdown()).to_string()
}

pub fn preview_series(series: &[MonthlyAggregate], summary: &SeriesSummary) {
    println!("{}\n", render_table(&monthly_rows(series)));
    match (summary.min_price, summary.max_price, summary.mean_price) {
        (Some(min), Some(max), Some(mean)) => println!(
            "{} of 12 months with data (min {}, max {}, mean {})\n",
            summary.months_with_data,
            format_number(min, 2),
            format_number(max, 2),
            format_number(mean, 2)
        ),
        _ => println!("No data for this selection.\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{aggregate, summarize};
    use crate::chart::{build_option, ChartStyle};
    use crate::types::Record;

    fn series() -> [MonthlyAggregate; 12] {
        let records = vec![Record {
            country: "India".to_string(),
            year: "2021".to_string(),
            month: "February, 2021".to_string(),
            calendar_day: String::new(),
            product: "Petrol".to_string(),
            city: "Delhi".to_string(),
            price: 1234.5,
        }];
        aggregate(&records, "Delhi", "Petrol", "2021")
    }

    #[test]
    fn test_monthly_rows_mark_empty_months() {
        let rows = monthly_rows(&series());
        assert_eq!(rows.len(), 12);
        assert_eq!(rows[0].price, "No Data");
        assert_eq!(rows[1].price, "1,234.50");
    }

    #[test]
    fn test_render_table_markdown() {
        let table = render_table(&monthly_rows(&series()));
        assert!(table.contains("| Month"));
        assert!(table.contains("February"));
        assert_eq!(render_table::<MonthlyRow>(&[]), "(no rows)");
    }

    #[test]
    fn test_write_csv_and_json() {
        let dir = tempfile::tempdir().unwrap();
        let series = series();

        let csv_path = dir.path().join("series.csv");
        write_csv(&csv_path, &series).unwrap();
        let csv = std::fs::read_to_string(&csv_path).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("month,price"));
        assert_eq!(lines.nth(1), Some("February,1234.5"));

        let selection = FilterSelection {
            city: "Delhi".to_string(),
            fuel: "Petrol".to_string(),
            year: "2021".to_string(),
        };
        let doc = ExportDocument {
            generated_at: Utc::now(),
            selection: &selection,
            series: &series,
            summary: summarize(&series),
            option: build_option(&selection, &series, &ChartStyle::default()),
        };
        let json_path = dir.path().join("series.json");
        write_json(&json_path, &doc).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(value["selection"]["city"], "Delhi");
        assert_eq!(value["summary"]["months_with_data"], 1);
        assert_eq!(value["series"].as_array().map(|a| a.len()), Some(12));
    }
}
