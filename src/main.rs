// Entry point and interactive menu.
//
// The dataset is loaded once and injected into the view controller. The menu
// then drives the three selectors, a resize of the chart surface and an
// export of the current series. Quitting (or reaching end of input)
// unmounts the chart before the process exits.
mod aggregate;
mod chart;
mod cli;
mod config;
mod loader;
mod output;
mod svg_chart;
mod terminal_chart;
mod types;
mod util;
mod view;

use anyhow::{Context, Result};
use chart::Surface;
use chrono::Utc;
use clap::Parser;
use cli::Args;
use config::Config;
use loader::{DataProvider, Dataset};
use std::io::{self, Write};
use std::path::Path;
use svg_chart::SvgChart;
use terminal_chart::TerminalChart;
use tracing::{debug, error, info};
use tracing_subscriber::FmtSubscriber;
use view::ViewController;

fn init_logging(args: &Args) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level())
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Print `prompt` and read one trimmed line. `None` at end of input.
fn read_line(prompt: &str) -> Option<String> {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    match io::stdin().read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

/// Show numbered entries and return the index the user picked.
fn pick(title: &str, entries: &[String], current: &str) -> Option<usize> {
    if entries.is_empty() {
        println!("No {} options in this dataset.\n", title);
        return None;
    }
    println!("Select {}:", title);
    for (i, entry) in entries.iter().enumerate() {
        let marker = if entry == current { " *" } else { "" };
        println!("[{}] {}{}", i + 1, entry, marker);
    }
    let choice = read_line("Enter choice: ")?;
    match choice.parse::<usize>() {
        Ok(n) if (1..=entries.len()).contains(&n) => Some(n - 1),
        _ => {
            println!("Invalid choice.\n");
            None
        }
    }
}

fn handle_select_city<P: DataProvider>(view: &mut ViewController<P>) {
    let cities = view.options().cities.clone();
    let Some(i) = pick("city", &cities, &view.selection().city) else {
        return;
    };
    if let Err(e) = view.select_city(&cities[i]) {
        error!("{}", e);
    }
}

fn handle_select_fuel<P: DataProvider>(view: &mut ViewController<P>) {
    let fuels = view.options().fuels.clone();
    let Some(i) = pick("fuel", &fuels, &view.selection().fuel) else {
        return;
    };
    if let Err(e) = view.select_fuel(&fuels[i]) {
        error!("{}", e);
    }
}

fn handle_select_year<P: DataProvider>(view: &mut ViewController<P>) {
    // Users see the four-digit label; the raw label is what gets selected.
    let years = view.options().years.clone();
    let labels: Vec<String> = years.iter().map(|y| y.label.clone()).collect();
    let current = aggregate::year_label(&view.selection().year).to_string();
    let Some(i) = pick("year", &labels, &current) else {
        return;
    };
    if let Err(e) = view.select_year(&years[i].value) {
        error!("{}", e);
    }
}

fn handle_resize<P: DataProvider>(view: &mut ViewController<P>, surface: &Surface) {
    let (width, height) = surface.size();
    println!("Current size: {} x {}", width, height);
    let parse = |s: Option<String>, fallback: u32| {
        s.and_then(|s| s.parse::<u32>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(fallback)
    };
    let width = parse(read_line("New width: "), width);
    let height = parse(read_line("New height: "), height);
    surface.set_size(width, height);
    if let Err(e) = view.on_resize() {
        error!("{}", e);
    }
}

fn handle_export<P: DataProvider>(view: &ViewController<P>, dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;
    let selection = view.selection();
    let stem = format!(
        "{}_{}_{}",
        selection.fuel,
        selection.city,
        aggregate::year_label(&selection.year)
    )
    .to_lowercase()
    .replace(|c: char| !c.is_ascii_alphanumeric() && c != '_', "-");

    let series = view.series();
    let summary = aggregate::summarize(series);
    let csv_path = dir.join(format!("{}.csv", stem));
    output::write_csv(&csv_path, series)?;

    let doc = output::ExportDocument {
        generated_at: Utc::now(),
        selection,
        series,
        summary: summary.clone(),
        option: view.chart_option(),
    };
    let json_path = dir.join(format!("{}.json", stem));
    output::write_json(&json_path, &doc)?;

    println!("Monthly averages ({})", view.chart_option().title.text);
    output::preview_series(series, &summary);
    println!(
        "(Exported to {} and {})\n",
        csv_path.display(),
        json_path.display()
    );
    info!(csv = %csv_path.display(), json = %json_path.display(), "series exported");
    Ok(())
}

fn run_menu<P: DataProvider>(view: &mut ViewController<P>, surface: &Surface, export_dir: &Path) {
    loop {
        println!("[1] Select city");
        println!("[2] Select fuel");
        println!("[3] Select year");
        println!("[4] Resize chart");
        println!("[5] Export series");
        println!("[0] Exit\n");
        let Some(choice) = read_line("Enter choice: ") else {
            debug!("end of input");
            break;
        };
        match choice.as_str() {
            "1" => handle_select_city(view),
            "2" => handle_select_fuel(view),
            "3" => handle_select_year(view),
            "4" => handle_resize(view, surface),
            "5" => {
                if let Err(e) = handle_export(view, export_dir) {
                    error!("Export failed: {:#}", e);
                }
            }
            "0" => {
                println!("Exiting the program.");
                break;
            }
            _ => println!("Invalid choice. Please enter 0-5.\n"),
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.init_config {
        print!("{}", Config::default_toml());
        return Ok(());
    }

    init_logging(&args);
    info!("fuel-price-chart v{}", env!("CARGO_PKG_VERSION"));

    let mut config = Config::resolve(args.config.as_deref())?;
    config.merge_with_args(&args);
    debug!(?config, "configuration resolved");

    let dataset: Dataset = loader::load_dataset(&config.data.path)
        .with_context(|| format!("failed to load {}", config.data.path.display()))?;
    println!(
        "Processing dataset... ({} rows loaded, {} skipped)\n",
        util::format_int(dataset.report.loaded_rows),
        util::format_int(dataset.report.parse_errors)
    );
    info!(
        total = dataset.report.total_rows,
        loaded = dataset.report.loaded_rows,
        "dataset loaded"
    );

    let mut view = ViewController::new(dataset, config.selection_defaults(), config.chart_style());

    let surface = match &args.svg {
        Some(path) => {
            let surface = Surface::new(config.svg.width, config.svg.height);
            view.mount(&mut SvgChart::new(path), &surface)?;
            println!("Chart rendered to {}\n", path.display());
            surface
        }
        None => {
            let surface = Surface::new(config.chart.width, config.chart.height);
            view.mount(&mut TerminalChart::new(io::stdout()), &surface)?;
            surface
        }
    };

    run_menu(&mut view, &surface, &args.export_dir);
    view.unmount();
    Ok(())
}
