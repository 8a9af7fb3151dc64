use crate::chart::{ChartError, ChartHandle, ChartOption, ChartWidget, Surface, TooltipPoint};
use crate::util::format_number;
use std::io::Write;
use tracing::debug;

const BAR_GLYPH: char = '█';
/// Columns taken by the month label and the gap after it.
const LABEL_WIDTH: usize = 11;
/// Columns reserved after the bar for the price text.
const VALUE_WIDTH: usize = 14;

/// Widget that draws horizontal text bars into any writer.
pub struct TerminalChart<W: Write> {
    out: Option<W>,
}

impl<W: Write> TerminalChart<W> {
    pub fn new(out: W) -> Self {
        Self { out: Some(out) }
    }
}

impl<W: Write> ChartWidget for TerminalChart<W> {
    type Handle = TerminalChartHandle<W>;

    fn init(&mut self, surface: &Surface) -> Result<Self::Handle, ChartError> {
        let out = self
            .out
            .take()
            .ok_or_else(|| ChartError::Render("terminal output already bound".to_string()))?;
        Ok(TerminalChartHandle {
            out: Some(out),
            surface: surface.clone(),
            option: None,
        })
    }
}

pub struct TerminalChartHandle<W: Write> {
    out: Option<W>,
    surface: Surface,
    option: Option<ChartOption>,
}

impl<W: Write> TerminalChartHandle<W> {
    fn draw(&mut self) -> Result<(), ChartError> {
        let (Some(out), Some(option)) = (self.out.as_mut(), self.option.as_ref()) else {
            return Ok(());
        };
        let (width, _) = self.surface.size();
        let text = render_text(option, width as usize);
        out.write_all(text.as_bytes())?;
        out.flush()?;
        Ok(())
    }
}

impl<W: Write> ChartHandle for TerminalChartHandle<W> {
    fn set_option(&mut self, option: &ChartOption) -> Result<(), ChartError> {
        self.option = Some(option.clone());
        self.draw()
    }

    fn resize(&mut self) -> Result<(), ChartError> {
        debug!(size = ?self.surface.size(), "terminal chart resize");
        self.draw()
    }

    fn dispose(&mut self) {
        self.option = None;
        self.out = None;
    }
}

/// Lay the chart out as text for a surface `width` columns wide.
///
/// The largest value spans the whole bar area; zero values get no bar and
/// show the tooltip's "No Data" text instead of a price.
pub fn render_text(option: &ChartOption, width: usize) -> String {
    let bar_area = width.saturating_sub(LABEL_WIDTH + VALUE_WIDTH).max(1);
    let max = option
        .bars()
        .map(|(_, v)| v)
        .fold(0.0_f64, f64::max);

    let mut text = String::new();
    text.push_str(&option.title.text);
    text.push('\n');
    text.push_str(&"-".repeat(width.max(option.title.text.chars().count())));
    text.push('\n');

    for (month, value) in option.bars() {
        let len = if max > 0.0 {
            ((value / max) * bar_area as f64).round() as usize
        } else {
            0
        };
        let tooltip = option.tooltip.format(&TooltipPoint {
            axis_value: month,
            value,
        });
        // The tooltip's second line holds the price text.
        let price = tooltip
            .lines()
            .nth(1)
            .and_then(|l| l.strip_prefix("Price: "))
            .map(str::to_string)
            .unwrap_or_else(|| format_number(value, 2));
        let bar: String = std::iter::repeat(BAR_GLYPH).take(len.min(bar_area)).collect();
        text.push_str(&format!(
            "{:<label$} {} {}\n",
            month,
            bar,
            price,
            label = LABEL_WIDTH - 1
        ));
    }
    text
}
