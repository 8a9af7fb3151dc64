//! Selection state and its binding to a chart widget.
//!
//! [`ViewController`] owns the user's filter selection and recomputes the
//! monthly series from scratch whenever the selection or the dataset
//! changes. While a chart is mounted every recomputation is pushed to it as a
//! complete [`ChartOption`]. The chart handle lives in a [`MountedChart`]
//! guard, so it is disposed exactly once however the view goes away.

use crate::aggregate::{aggregate, selector_options};
use crate::chart::{
    build_option, ChartError, ChartHandle, ChartOption, ChartStyle, ChartWidget, Surface,
};
use crate::loader::DataProvider;
use crate::types::{
    FilterSelection, MonthlyAggregate, SelectorOptions, DEFAULT_CITY, DEFAULT_FUEL,
};
use std::fmt;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    City,
    Fuel,
    Year,
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OptionKind::City => "city",
            OptionKind::Fuel => "fuel",
            OptionKind::Year => "year",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum ViewError {
    #[error("'{value}' is not an available {kind}")]
    UnknownOption { kind: OptionKind, value: String },
    #[error(transparent)]
    Chart(#[from] ChartError),
}

/// Initial selection requested by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionDefaults {
    pub city: String,
    pub fuel: String,
    /// `None` picks the first year found in the data.
    pub year: Option<String>,
}

impl Default for SelectionDefaults {
    fn default() -> Self {
        Self {
            city: DEFAULT_CITY.to_string(),
            fuel: DEFAULT_FUEL.to_string(),
            year: None,
        }
    }
}

/// A chart handle bound to its surface. Dropping it disposes the handle.
struct MountedChart {
    handle: Box<dyn ChartHandle>,
    surface: Surface,
}

impl Drop for MountedChart {
    fn drop(&mut self) {
        self.handle.dispose();
        info!(size = ?self.surface.size(), "chart unmounted");
    }
}

pub struct ViewController<P: DataProvider> {
    data: P,
    options: SelectorOptions,
    selection: FilterSelection,
    series: [MonthlyAggregate; 12],
    style: ChartStyle,
    mounted: Option<MountedChart>,
}

impl<P: DataProvider> ViewController<P> {
    pub fn new(data: P, defaults: SelectionDefaults, style: ChartStyle) -> Self {
        let options = selector_options(data.records());
        let selection = resolve_selection(&options, &defaults);
        let series = aggregate(
            data.records(),
            &selection.city,
            &selection.fuel,
            &selection.year,
        );
        Self {
            data,
            options,
            selection,
            series,
            style,
            mounted: None,
        }
    }

    pub fn options(&self) -> &SelectorOptions {
        &self.options
    }

    pub fn selection(&self) -> &FilterSelection {
        &self.selection
    }

    pub fn series(&self) -> &[MonthlyAggregate; 12] {
        &self.series
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.is_some()
    }

    /// The configuration the mounted chart currently shows.
    pub fn chart_option(&self) -> ChartOption {
        build_option(&self.selection, &self.series, &self.style)
    }

    /// Bind a chart to `surface` and push the current series into it.
    ///
    /// A chart that is already mounted is released first. If the first push
    /// fails the new handle is released before the error is returned.
    pub fn mount<W>(&mut self, widget: &mut W, surface: &Surface) -> Result<(), ViewError>
    where
        W: ChartWidget,
        W::Handle: 'static,
    {
        self.unmount();
        let handle = widget.init(surface)?;
        let mut mounted = MountedChart {
            handle: Box::new(handle),
            surface: surface.clone(),
        };
        self.recompute();
        mounted.handle.set_option(&self.chart_option())?;
        info!(size = ?surface.size(), "chart mounted");
        self.mounted = Some(mounted);
        Ok(())
    }

    /// Release the chart. Calling it while unmounted does nothing.
    pub fn unmount(&mut self) {
        self.mounted = None;
    }

    pub fn select_city(&mut self, city: &str) -> Result<(), ViewError> {
        check_option(OptionKind::City, city, &self.options.cities)?;
        self.selection.city = city.to_string();
        self.refresh()
    }

    pub fn select_fuel(&mut self, fuel: &str) -> Result<(), ViewError> {
        check_option(OptionKind::Fuel, fuel, &self.options.fuels)?;
        self.selection.fuel = fuel.to_string();
        self.refresh()
    }

    /// Select a year by its raw label, e.g. `2021-22`, not the displayed `2021`.
    pub fn select_year(&mut self, year: &str) -> Result<(), ViewError> {
        if !self.options.years.iter().any(|y| y.value == year) {
            return Err(ViewError::UnknownOption {
                kind: OptionKind::Year,
                value: year.to_string(),
            });
        }
        self.selection.year = year.to_string();
        self.refresh()
    }

    /// Swap the dataset. Options are re-derived and the current selection is
    /// kept where the new data still offers it.
    pub fn replace_data(&mut self, data: P) -> Result<(), ViewError> {
        self.data = data;
        self.options = selector_options(self.data.records());
        let wanted = SelectionDefaults {
            city: self.selection.city.clone(),
            fuel: self.selection.fuel.clone(),
            year: Some(self.selection.year.clone()),
        };
        self.selection = resolve_selection(&self.options, &wanted);
        self.refresh()
    }

    /// Viewport size changed: re-lay-out the chart without touching the data.
    pub fn on_resize(&mut self) -> Result<(), ViewError> {
        if let Some(mounted) = self.mounted.as_mut() {
            mounted.handle.resize()?;
        }
        Ok(())
    }

    fn recompute(&mut self) {
        self.series = aggregate(
            self.data.records(),
            &self.selection.city,
            &self.selection.fuel,
            &self.selection.year,
        );
    }

    fn refresh(&mut self) -> Result<(), ViewError> {
        self.recompute();
        if self.mounted.is_some() {
            let option = self.chart_option();
            debug!(title = %option.title.text, "pushing chart option");
            if let Some(mounted) = self.mounted.as_mut() {
                mounted.handle.set_option(&option)?;
            }
        }
        Ok(())
    }
}

fn check_option(kind: OptionKind, value: &str, available: &[String]) -> Result<(), ViewError> {
    if available.iter().any(|a| a == value) {
        Ok(())
    } else {
        Err(ViewError::UnknownOption {
            kind,
            value: value.to_string(),
        })
    }
}

/// Keep `wanted` if the data offers it, else fall back to the first option.
/// With no options at all the wanted value is kept as is.
fn clamp_to_options(kind: OptionKind, wanted: &str, available: &[String]) -> String {
    match available.first() {
        Some(first) if !available.iter().any(|a| a == wanted) => {
            warn!(%kind, wanted, fallback = %first, "default not present in dataset");
            first.clone()
        }
        _ => wanted.to_string(),
    }
}

fn resolve_selection(options: &SelectorOptions, defaults: &SelectionDefaults) -> FilterSelection {
    let years: Vec<String> = options.years.iter().map(|y| y.value.clone()).collect();
    let year = match &defaults.year {
        Some(year) => clamp_to_options(OptionKind::Year, year, &years),
        None => years.first().cloned().unwrap_or_default(),
    };
    FilterSelection {
        city: clamp_to_options(OptionKind::City, &defaults.city, &options.cities),
        fuel: clamp_to_options(OptionKind::Fuel, &defaults.fuel, &options.fuels),
        year,
    }
}
