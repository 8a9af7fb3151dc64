use crate::types::{
    MonthlyAggregate, Record, SelectorOptions, SeriesSummary, YearOption, CANONICAL_MONTHS,
};
use crate::util::average;
use std::collections::{HashMap, HashSet};

/// Average the prices of the records matching `(city, fuel, year)` per
/// calendar month.
///
/// Matching is exact and case-sensitive on all three fields. The month name
/// is whatever precedes the first comma of `Record::month`; names that are not
/// one of the canonical twelve are dropped. Months without data come out as
/// `0.0`, and the result is always January through December.
pub fn aggregate(
    records: &[Record],
    city: &str,
    fuel: &str,
    year: &str,
) -> [MonthlyAggregate; 12] {
    #[derive(Default)]
    struct Acc {
        sum: f64,
        count: usize,
    }

    let mut map: HashMap<&str, Acc> = HashMap::new();
    for r in records
        .iter()
        .filter(|r| r.product == fuel && r.city == city && r.year == year)
    {
        let e = map.entry(month_name(&r.month)).or_default();
        e.sum += r.price;
        e.count += 1;
    }

    let means: HashMap<&str, f64> = map
        .into_iter()
        .map(|(month, acc)| (month, acc.sum / acc.count as f64))
        .collect();

    (*CANONICAL_MONTHS).map(|month| MonthlyAggregate {
        month,
        price: means.get(month).copied().unwrap_or(0.0),
    })
}

/// Text before the first comma, or the whole label.
pub fn month_name(label: &str) -> &str {
    label.split(',').next().unwrap_or(label)
}

/// First run of four ASCII digits in a year label, e.g. `2021` for
/// `2021-22`. Labels without one are returned unchanged.
pub fn year_label(raw: &str) -> &str {
    raw.as_bytes()
        .windows(4)
        .position(|w| w.iter().all(u8::is_ascii_digit))
        .map(|start| &raw[start..start + 4])
        .unwrap_or(raw)
}

pub fn distinct_in_order<'a, I>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen: HashSet<&str> = HashSet::new();
    values
        .into_iter()
        .filter(|v| seen.insert(*v))
        .map(str::to_string)
        .collect()
}

/// Selector contents derived from the whole, unfiltered dataset.
pub fn selector_options(records: &[Record]) -> SelectorOptions {
    let years = distinct_in_order(records.iter().map(|r| r.year.as_str()))
        .into_iter()
        .map(|value| YearOption {
            label: year_label(&value).to_string(),
            value,
        })
        .collect();
    SelectorOptions {
        cities: distinct_in_order(records.iter().map(|r| r.city.as_str())),
        fuels: distinct_in_order(records.iter().map(|r| r.product.as_str())),
        years,
    }
}

/// Statistics over the months that actually carry a price.
pub fn summarize(series: &[MonthlyAggregate]) -> SeriesSummary {
    let priced: Vec<f64> = series
        .iter()
        .map(|m| m.price)
        .filter(|p| *p != 0.0)
        .collect();
    if priced.is_empty() {
        return SeriesSummary {
            months_with_data: 0,
            min_price: None,
            max_price: None,
            mean_price: None,
        };
    }
    SeriesSummary {
        months_with_data: priced.len(),
        min_price: Some(priced.iter().copied().fold(f64::INFINITY, f64::min)),
        max_price: Some(priced.iter().copied().fold(f64::NEG_INFINITY, f64::max)),
        mean_price: Some(average(&priced)),
    }
}
