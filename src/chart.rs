//! Declarative bar chart configuration and the widget boundary.
//!
//! The view never draws anything itself. It builds a [`ChartOption`] and
//! hands it to a [`ChartHandle`] obtained from a [`ChartWidget`]; concrete
//! widgets live in `terminal_chart` and `svg_chart`.

use crate::aggregate::year_label;
use crate::types::{FilterSelection, MonthlyAggregate};
use crate::util::format_number;
use serde::Serialize;
use std::cell::Cell;
use std::rc::Rc;
use thiserror::Error;

pub const DEFAULT_BAR_COLOR: &str = "#5470C6";
pub const DEFAULT_LABEL_ROTATION: i32 = 45;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("chart output failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("chart rendering failed: {0}")]
    Render(String),
}

/// Rendering container a widget is bound to.
///
/// Clones share the same size, so the owner of the surface can change it
/// and the widget picks the new size up on its next `resize()`.
#[derive(Debug, Clone)]
pub struct Surface {
    size: Rc<Cell<(u32, u32)>>,
}

impl Surface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: Rc::new(Cell::new((width, height))),
        }
    }

    pub fn size(&self) -> (u32, u32) {
        self.size.get()
    }

    pub fn set_size(&self, width: u32, height: u32) {
        self.size.set((width, height));
    }
}

/// Factory side of the widget boundary: binds a handle to a surface.
pub trait ChartWidget {
    type Handle: ChartHandle;

    fn init(&mut self, surface: &Surface) -> Result<Self::Handle, ChartError>;
}

/// A live chart bound to a surface.
pub trait ChartHandle {
    /// Replace the whole configuration and redraw.
    fn set_option(&mut self, option: &ChartOption) -> Result<(), ChartError>;
    /// Re-lay-out the current configuration against the surface size.
    fn resize(&mut self) -> Result<(), ChartError>;
    /// Release the underlying resources.
    fn dispose(&mut self);
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartOption {
    pub title: Title,
    pub tooltip: Tooltip,
    pub x_axis: CategoryAxis,
    pub y_axis: ValueAxis,
    pub series: Vec<BarSeries>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Title {
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TooltipTrigger {
    Axis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TooltipFormat {
    /// A zero value reads "No Data" instead of a price.
    ZeroAsNoData,
    Plain,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tooltip {
    pub trigger: TooltipTrigger,
    pub format: TooltipFormat,
}

/// The point under the cursor, as handed to the tooltip formatter.
#[derive(Debug, Clone, PartialEq)]
pub struct TooltipPoint<'a> {
    pub axis_value: &'a str,
    pub value: f64,
}

impl Tooltip {
    pub fn format(&self, point: &TooltipPoint<'_>) -> String {
        let price = match self.format {
            TooltipFormat::ZeroAsNoData if point.value == 0.0 => "No Data".to_string(),
            _ => format_number(point.value, 2),
        };
        format!("{}\nPrice: {}", point.axis_value, price)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryAxis {
    pub categories: Vec<String>,
    pub label_rotation: i32,
    /// 0 shows every label.
    pub label_interval: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueAxis {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesKind {
    Bar,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarSeries {
    #[serde(rename = "type")]
    pub kind: SeriesKind,
    pub values: Vec<f64>,
    pub color: String,
}

/// Presentation settings that do not depend on the data.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartStyle {
    pub color: String,
    pub label_rotation: i32,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            color: DEFAULT_BAR_COLOR.to_string(),
            label_rotation: DEFAULT_LABEL_ROTATION,
        }
    }
}

pub fn chart_title(selection: &FilterSelection) -> String {
    format!(
        "{} Prices in {} ({})",
        selection.fuel,
        selection.city,
        year_label(&selection.year)
    )
}

/// Build the complete configuration for one series. Categories and values
/// are always rebuilt together.
pub fn build_option(
    selection: &FilterSelection,
    series: &[MonthlyAggregate],
    style: &ChartStyle,
) -> ChartOption {
    ChartOption {
        title: Title {
            text: chart_title(selection),
        },
        tooltip: Tooltip {
            trigger: TooltipTrigger::Axis,
            format: TooltipFormat::ZeroAsNoData,
        },
        x_axis: CategoryAxis {
            categories: series.iter().map(|m| m.month.to_string()).collect(),
            label_rotation: style.label_rotation,
            label_interval: 0,
        },
        y_axis: ValueAxis { name: None },
        series: vec![BarSeries {
            kind: SeriesKind::Bar,
            values: series.iter().map(|m| m.price).collect(),
            color: style.color.clone(),
        }],
    }
}

impl ChartOption {
    /// Category/value pairs of the first series.
    pub fn bars(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        let values: &[f64] = self.series.first().map(|s| s.values.as_slice()).unwrap_or(&[]);
        self.x_axis
            .categories
            .iter()
            .map(String::as_str)
            .zip(values.iter().copied())
    }

    pub fn color(&self) -> &str {
        self.series
            .first()
            .map(|s| s.color.as_str())
            .unwrap_or(DEFAULT_BAR_COLOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;

    fn selection(year: &str) -> FilterSelection {
        FilterSelection {
            city: "Delhi".to_string(),
            fuel: "Petrol".to_string(),
            year: year.to_string(),
        }
    }

    #[test]
    fn test_title_uses_four_digit_year() {
        assert_eq!(chart_title(&selection("2021-22")), "Petrol Prices in Delhi (2021)");
        assert_eq!(chart_title(&selection("FY")), "Petrol Prices in Delhi (FY)");
    }

    #[test]
    fn test_tooltip_zero_reads_no_data() {
        let tooltip = Tooltip {
            trigger: TooltipTrigger::Axis,
            format: TooltipFormat::ZeroAsNoData,
        };
        let empty = TooltipPoint {
            axis_value: "March",
            value: 0.0,
        };
        let priced = TooltipPoint {
            axis_value: "January",
            value: 105.0,
        };
        assert_eq!(tooltip.format(&empty), "March\nPrice: No Data");
        assert_eq!(tooltip.format(&priced), "January\nPrice: 105.00");

        let plain = Tooltip {
            format: TooltipFormat::Plain,
            ..tooltip
        };
        assert_eq!(plain.format(&empty), "March\nPrice: 0.00");
    }

    #[test]
    fn test_build_option_pairs_categories_with_values() {
        let series = aggregate(&[], "Delhi", "Petrol", "2021");
        let option = build_option(&selection("2021"), &series, &ChartStyle::default());

        assert_eq!(option.x_axis.categories.len(), 12);
        assert_eq!(option.series.len(), 1);
        assert_eq!(option.series[0].values, vec![0.0; 12]);
        assert_eq!(option.x_axis.label_rotation, 45);
        assert_eq!(option.color(), "#5470C6");
        assert_eq!(option.bars().next(), Some(("January", 0.0)));
    }

    #[test]
    fn test_option_serializes_like_a_chart_config() {
        let series = aggregate(&[], "Delhi", "Petrol", "2021");
        let option = build_option(&selection("2021"), &series, &ChartStyle::default());
        let value = serde_json::to_value(&option).unwrap();

        assert_eq!(value["series"][0]["type"], "bar");
        assert_eq!(value["tooltip"]["trigger"], "axis");
        assert_eq!(value["x_axis"]["categories"][11], "December");
    }

    #[test]
    fn test_surface_clones_share_size() {
        let surface = Surface::new(80, 24);
        let bound = surface.clone();
        surface.set_size(120, 40);
        assert_eq!(bound.size(), (120, 40));
    }
}
