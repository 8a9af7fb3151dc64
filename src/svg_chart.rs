use crate::chart::{ChartError, ChartHandle, ChartOption, ChartWidget, Surface};
use crate::util::parse_hex_color;
use plotters::prelude::*;
use std::path::PathBuf;
use tracing::{debug, info};

/// Widget that renders the bar chart to an SVG file with `plotters`.
#[derive(Debug, Clone)]
pub struct SvgChart {
    path: PathBuf,
}

impl SvgChart {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ChartWidget for SvgChart {
    type Handle = SvgChartHandle;

    fn init(&mut self, surface: &Surface) -> Result<Self::Handle, ChartError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        Ok(SvgChartHandle {
            path: self.path.clone(),
            surface: surface.clone(),
            option: None,
        })
    }
}

#[derive(Debug)]
pub struct SvgChartHandle {
    path: PathBuf,
    surface: Surface,
    option: Option<ChartOption>,
}

impl SvgChartHandle {
    fn draw(&self) -> Result<(), ChartError> {
        let Some(option) = self.option.as_ref() else {
            return Ok(());
        };
        let svg = render_svg(option, self.surface.size())?;
        std::fs::write(&self.path, svg)?;
        debug!(path = %self.path.display(), "svg chart written");
        Ok(())
    }
}

impl ChartHandle for SvgChartHandle {
    fn set_option(&mut self, option: &ChartOption) -> Result<(), ChartError> {
        self.option = Some(option.clone());
        self.draw()
    }

    fn resize(&mut self) -> Result<(), ChartError> {
        self.draw()
    }

    fn dispose(&mut self) {
        if self.option.take().is_some() {
            info!(path = %self.path.display(), "svg chart released");
        }
    }
}

fn render_err<E: std::fmt::Display>(e: E) -> ChartError {
    ChartError::Render(e.to_string())
}

/// Top of the value axis: 10% headroom over the tallest bar.
pub fn y_upper_bound(values: &[f64]) -> f64 {
    let max = values.iter().copied().fold(0.0_f64, f64::max);
    if max > 0.0 {
        max * 1.1
    } else {
        1.0
    }
}

/// Draw `option` as a vertical bar chart of `size` pixels and return the
/// SVG document.
pub fn render_svg(option: &ChartOption, size: (u32, u32)) -> Result<String, ChartError> {
    let categories: Vec<String> = option.x_axis.categories.clone();
    let values: Vec<f64> = option.bars().map(|(_, v)| v).collect();
    let (r, g, b) = parse_hex_color(option.color()).unwrap_or((0x54, 0x70, 0xC6));
    let bar_color = RGBColor(r, g, b);

    let mut buffer = String::new();
    {
        let root = SVGBackend::with_string(&mut buffer, size).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        if !categories.is_empty() {
            let mut chart = ChartBuilder::on(&root)
                .caption(&option.title.text, ("sans-serif", 24))
                .margin(20)
                .x_label_area_size(50)
                .y_label_area_size(60)
                .build_cartesian_2d(
                    (0usize..categories.len()).into_segmented(),
                    0f64..y_upper_bound(&values),
                )
                .map_err(render_err)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_labels(categories.len())
                .x_label_formatter(&|v| match v {
                    SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => {
                        categories.get(*i).cloned().unwrap_or_default()
                    }
                    SegmentValue::Last => String::new(),
                })
                .draw()
                .map_err(render_err)?;

            chart
                .draw_series(
                    Histogram::vertical(&chart)
                        .style(bar_color.filled())
                        .margin(4)
                        .data(values.iter().enumerate().map(|(i, v)| (i, *v))),
                )
                .map_err(render_err)?;
        }

        root.present().map_err(render_err)?;
    }
    Ok(buffer)
}
