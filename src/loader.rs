use crate::types::{RawRow, Record};
use csv::ReaderBuilder;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported dataset format '{0}' (expected .json or .csv)")]
    UnsupportedFormat(String),
}

#[derive(Debug, Clone)]
pub struct LoadReport {
    pub total_rows: usize,
    pub loaded_rows: usize,
    pub parse_errors: usize,
}

/// Read-only source of records handed to the view.
pub trait DataProvider {
    fn records(&self) -> &[Record];
}

impl DataProvider for Vec<Record> {
    fn records(&self) -> &[Record] {
        self
    }
}

/// A dataset loaded from disk together with how the load went.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub records: Vec<Record>,
    pub report: LoadReport,
}

impl DataProvider for Dataset {
    fn records(&self) -> &[Record] {
        &self.records
    }
}

/// Load a dataset file, choosing the parser from the extension.
pub fn load_dataset(path: &Path) -> Result<Dataset, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let rows: Vec<Result<RawRow, ()>> = match ext.as_str() {
        "json" => {
            // Rows are kept as loose values so one malformed entry does not
            // reject the whole array.
            let values: Vec<serde_json::Value> = serde_json::from_reader(BufReader::new(file))?;
            values
                .into_iter()
                .map(|v| serde_json::from_value::<RawRow>(v).map_err(|_| ()))
                .collect()
        }
        "csv" => {
            let mut rdr = ReaderBuilder::new().flexible(true).from_reader(file);
            // A broken header is fatal; broken rows are only counted.
            rdr.headers()?;
            rdr.deserialize::<RawRow>()
                .map(|r| r.map_err(|_| ()))
                .collect()
        }
        other => return Err(LoadError::UnsupportedFormat(other.to_string())),
    };
    Ok(clean_rows(rows))
}

fn clean_rows(rows: Vec<Result<RawRow, ()>>) -> Dataset {
    let total_rows = rows.len();
    let mut parse_errors = 0usize;
    let mut records: Vec<Record> = Vec::with_capacity(total_rows);

    for row in rows {
        let row = match row {
            Ok(r) => r,
            Err(_) => {
                parse_errors += 1;
                continue;
            }
        };
        let price = match row.price {
            Some(p) if p.is_finite() => p,
            _ => {
                parse_errors += 1;
                continue;
            }
        };
        // Text is kept verbatim: filters match exactly.
        records.push(Record {
            country: row.country.unwrap_or_default(),
            year: row.year.unwrap_or_default(),
            month: row.month.unwrap_or_default(),
            calendar_day: row.calendar_day.unwrap_or_default(),
            product: row.product.unwrap_or_default(),
            city: row.city.unwrap_or_default(),
            price,
        });
    }

    debug!(total_rows, parse_errors, "dataset rows cleaned");
    let report = LoadReport {
        total_rows,
        loaded_rows: records.len(),
        parse_errors,
    };
    Dataset { records, report }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_json_with_original_column_names() {
        let json = r#"[
            {
                "Country": "India",
                "Year": "2021-22",
                "Month": "January, 2022",
                "Calendar Day": "01-01-2022",
                "Products": "Petrol",
                "Metro Cities": "Delhi",
                "Retail Selling Price (Rsp) Of Petrol And Diesel (UOM:INR/L(IndianRupeesperLitre)), Scaling Factor:1": 95.41
            },
            {
                "Country": "India",
                "Year": "2021-22",
                "Month": "January, 2022",
                "Products": "Diesel",
                "Metro Cities": "Delhi"
            },
            "not a row"
        ]"#;
        let file = write_temp(".json", json);
        let dataset = load_dataset(file.path()).unwrap();

        assert_eq!(dataset.report.total_rows, 3);
        assert_eq!(dataset.report.loaded_rows, 1);
        assert_eq!(dataset.report.parse_errors, 2);
        let r = &dataset.records[0];
        assert_eq!(r.city, "Delhi");
        assert_eq!(r.product, "Petrol");
        assert_eq!(r.year, "2021-22");
        assert_eq!(r.calendar_day, "01-01-2022");
        assert_eq!(r.price, 95.41);
    }

    #[test]
    fn test_load_csv_with_aliases() {
        let csv = "country,year,month,calendar_day,product,city,price\n\
                   India,2021,\"March, 2021\",,Diesel,Mumbai,88.5\n\
                   India,2021,\"April, 2021\",,Diesel,Mumbai,not-a-number\n";
        let file = write_temp(".csv", csv);
        let dataset = load_dataset(file.path()).unwrap();

        assert_eq!(dataset.report.total_rows, 2);
        assert_eq!(dataset.report.loaded_rows, 1);
        assert_eq!(dataset.records[0].month, "March, 2021");
        assert_eq!(dataset.records().len(), 1);
    }

    #[test]
    fn test_unsupported_extension() {
        let file = write_temp(".xlsx", "");
        let err = load_dataset(file.path()).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedFormat(ext) if ext == "xlsx"));
    }

    #[test]
    fn test_missing_file() {
        let err = load_dataset(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
