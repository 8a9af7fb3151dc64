use chrono::Month;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// One row of the dataset file exactly as it is stored on disk.
///
/// Column names follow the published fuel price export. Every field is
/// optional so a single bad row can be counted and skipped by the loader
/// instead of failing the whole file.
#[derive(Debug, Deserialize)]
pub struct RawRow {
    #[serde(rename = "Country", alias = "country")]
    pub country: Option<String>,
    #[serde(rename = "Year", alias = "year")]
    pub year: Option<String>,
    #[serde(rename = "Month", alias = "month")]
    pub month: Option<String>,
    #[serde(rename = "Calendar Day", alias = "calendar_day")]
    pub calendar_day: Option<String>,
    #[serde(rename = "Products", alias = "product")]
    pub product: Option<String>,
    #[serde(rename = "Metro Cities", alias = "city")]
    pub city: Option<String>,
    #[serde(
        rename = "Retail Selling Price (Rsp) Of Petrol And Diesel (UOM:INR/L(IndianRupeesperLitre)), Scaling Factor:1",
        alias = "price"
    )]
    pub price: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub country: String,
    pub year: String,
    pub month: String,
    pub calendar_day: String,
    pub product: String,
    pub city: String,
    pub price: f64,
}

/// The user's current choice of city, fuel type and year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterSelection {
    pub city: String,
    pub fuel: String,
    /// Raw year label as found in the data, e.g. `2021-22`.
    pub year: String,
}

pub const DEFAULT_CITY: &str = "Delhi";
pub const DEFAULT_FUEL: &str = "Petrol";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyAggregate {
    pub month: &'static str,
    pub price: f64,
}

#[derive(Debug, Clone, Serialize, Tabled)]
pub struct MonthlyRow {
    #[serde(rename = "Month")]
    #[tabled(rename = "Month")]
    pub month: String,
    #[serde(rename = "AvgPrice")]
    #[tabled(rename = "AvgPrice")]
    pub price: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearOption {
    /// Stored selection value, used verbatim for filtering.
    pub value: String,
    /// What the selector shows.
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SelectorOptions {
    pub cities: Vec<String>,
    pub fuels: Vec<String>,
    pub years: Vec<YearOption>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesSummary {
    pub months_with_data: usize,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub mean_price: Option<f64>,
}

/// The twelve English month names in calendar order.
pub static CANONICAL_MONTHS: Lazy<[&'static str; 12]> = Lazy::new(|| {
    let mut names = [""; 12];
    let mut month = Month::January;
    for slot in names.iter_mut() {
        *slot = month.name();
        month = month.succ();
    }
    names
});
