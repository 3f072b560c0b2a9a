use std::path::Path;

use clap::{Parser, Subcommand, ValueEnum};
use log::{error, info};

use traceplot::config::PlotConfig;
use traceplot::export;
use traceplot::fit::{CurveFitter, FitOptions, FIT_N_POINTS, FIT_TRACE_COLOR, FIT_X_MARGIN};
use traceplot::parse::{ColumnLayout, NumericParser};
use traceplot::render::Chart;
use traceplot::style::Color;
use traceplot::trace::style::TraceStyle;
use traceplot::trace::Trace;
use traceplot::TraceList;

#[derive(Parser)]
#[command(name = "traceplot")]
#[command(
    about = "2D chart plotter for numeric text data",
    long_about = "Parses loosely formatted numeric text into traces, lays out axes, \
                  fits curves, and renders figures to SVG."
)]
struct Cli {
    /// Log verbosity level
    #[arg(long, global = true, default_value = "info")]
    log_level: LogLevel,
    /// Write log output to a file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<String>,
    /// Append to log file instead of truncating
    #[arg(long, global = true)]
    append_log: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum LayoutArg {
    /// x, y
    #[value(name = "x_y")]
    XY,
    /// x, y, y uncertainty
    #[value(name = "x_y_yerr")]
    XYYerr,
    /// x, x uncertainty, y
    #[value(name = "x_yerr_y")]
    XYerrY,
    /// x, y, x uncertainty, y uncertainty
    #[value(name = "x_y_xerr_yerr")]
    XYXerrYerr,
}

impl LayoutArg {
    fn to_layout(self) -> ColumnLayout {
        match self {
            LayoutArg::XY => ColumnLayout::XY,
            LayoutArg::XYYerr => ColumnLayout::XYYerr,
            LayoutArg::XYerrY => ColumnLayout::XYerrY,
            LayoutArg::XYXerrYerr => ColumnLayout::XYXerrYerr,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Render one or more data files as an SVG figure
    Plot {
        /// Numeric text files, one trace each
        #[arg(required = true)]
        data: Vec<String>,
        /// Column layout of the input files (defaults to the configured import format)
        #[arg(long, value_enum)]
        layout: Option<LayoutArg>,
        /// Path to plot configuration JSON file
        #[arg(long)]
        config: Option<String>,
        /// Prefix for output files. The figure is written to `<prefix>.svg`.
        #[arg(long, required = true)]
        out_prefix: String,
        /// Force overwrite of existing output files
        #[arg(short, long)]
        force: bool,
    },
    /// Fit an expression to a data file and render data plus fit curve
    Fit {
        /// Numeric text file with the data to fit
        #[arg(required = true)]
        data: String,
        /// Model expression in x with free parameters A-F, e.g. "A*exp(B*x)"
        #[arg(long, required = true)]
        expression: String,
        /// Column layout of the input file
        #[arg(long, value_enum)]
        layout: Option<LayoutArg>,
        /// Path to plot configuration JSON file
        #[arg(long)]
        config: Option<String>,
        /// Solver damping factor
        #[arg(long, default_value_t = 1.5)]
        damping: f64,
        /// Forward-difference step for the Jacobian
        #[arg(long, default_value_t = 0.1)]
        gradient_difference: f64,
        /// Maximum solver iterations
        #[arg(long, default_value_t = 100)]
        max_iterations: usize,
        /// Stop when the sum of squared residuals drops below this
        #[arg(long, default_value_t = 0.01)]
        error_tolerance: f64,
        /// Sample points on the fitted curve
        #[arg(long, default_value_t = FIT_N_POINTS)]
        points: usize,
        /// Extra x span fraction sampled beyond the data on each side
        #[arg(long, default_value_t = FIT_X_MARGIN)]
        margin: f64,
        /// Prefix for output files. The figure is written to `<prefix>.svg`.
        #[arg(long, required = true)]
        out_prefix: String,
        /// Force overwrite of existing output files
        #[arg(short, long)]
        force: bool,
    },
    /// Export a parsed data file as two-column CSV
    Export {
        /// Numeric text file to export
        #[arg(required = true)]
        data: String,
        /// Column layout of the input file
        #[arg(long, value_enum, default_value = "x_y")]
        layout: LayoutArg,
        /// Output CSV path (defaults to `<input stem>.csv`)
        #[arg(long)]
        out: Option<String>,
        /// Force overwrite of existing output files
        #[arg(short, long)]
        force: bool,
    },
}

fn check_output_paths(paths: &[String], force: bool) -> Result<(), std::io::Error> {
    for path in paths {
        let path = Path::new(path);
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                info!("Creating output directory: {:?}", parent);
                std::fs::create_dir_all(parent)?;
            }
        }
        if !force && path.exists() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                format!(
                    "Output file {} already exists. Use --force to overwrite.",
                    path.display()
                ),
            ));
        }
    }
    Ok(())
}

fn load_config(path: &Option<String>) -> Option<PlotConfig> {
    match path {
        Some(p) => match PlotConfig::load(p) {
            Ok(config) => Some(config),
            Err(e) => {
                error!("Error loading plot config {}: {}", p, e);
                None
            }
        },
        None => Some(PlotConfig::default()),
    }
}

fn trace_label(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}

fn load_trace(path: &str, parser: &NumericParser) -> Option<Trace> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            error!("Error reading {}: {}", path, e);
            return None;
        }
    };
    match parser.parse(&raw) {
        Ok(cols) => Some(Trace::new(cols, TraceStyle::default(), trace_label(path))),
        Err(e) => {
            error!("Error parsing {}: {}", path, e);
            None
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let mut log_builder = env_logger::Builder::from_default_env();
    log_builder
        .filter_level(cli.log_level.to_level_filter())
        .format_module_path(false);
    if let Some(ref path) = cli.log_file {
        let file = if cli.append_log {
            std::fs::File::options().create(true).append(true).open(path)
        } else {
            std::fs::File::create(path)
        }
        .unwrap_or_else(|e| panic!("Could not open log file '{}': {}", path, e));
        log_builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    log_builder.init();

    match &cli.command {
        Commands::Plot {
            data,
            layout,
            config,
            out_prefix,
            force,
        } => {
            let out_path = format!("{}.svg", out_prefix);
            if let Err(e) = check_output_paths(std::slice::from_ref(&out_path), *force) {
                error!("{}", e);
                return;
            }
            let Some(config) = load_config(config) else {
                return;
            };
            let layout = layout.map(LayoutArg::to_layout).unwrap_or(config.import_format);
            let parser = NumericParser::new(layout);

            let mut traces = TraceList::new();
            for path in data {
                let Some(trace) = load_trace(path, &parser) else {
                    return;
                };
                traces.add_trace(trace, None);
            }
            info!("loaded {} traces", traces.len());

            let chart = Chart::new(&config);
            let svg = chart.render(&traces);
            if let Err(e) = export::save_svg(&out_path, &svg) {
                error!("Error writing figure: {}", e);
            }
        }
        Commands::Fit {
            data,
            expression,
            layout,
            config,
            damping,
            gradient_difference,
            max_iterations,
            error_tolerance,
            points,
            margin,
            out_prefix,
            force,
        } => {
            let out_path = format!("{}.svg", out_prefix);
            if let Err(e) = check_output_paths(std::slice::from_ref(&out_path), *force) {
                error!("{}", e);
                return;
            }
            let Some(config) = load_config(config) else {
                return;
            };
            let layout = layout.map(LayoutArg::to_layout).unwrap_or(config.import_format);
            let parser = NumericParser::new(layout);
            let Some(trace) = load_trace(data, &parser) else {
                return;
            };

            let options = FitOptions {
                damping: *damping,
                gradient_difference: *gradient_difference,
                max_iterations: *max_iterations,
                error_tolerance: *error_tolerance,
            };
            let mut fitter = CurveFitter::new();
            let result = match fitter.fit(&trace.xy_data(), expression, &options) {
                Ok(result) => result,
                Err(e) => {
                    error!("Error fitting '{}': {}", expression, e);
                    return;
                }
            };
            for (param, value) in &result.parameters {
                info!("{} = {}", param, value);
            }
            info!("sum of squared residuals: {:.4e}", result.sse);

            let fit_trace = match fitter.make_fit_trace(&trace, expression, *points, *margin) {
                Ok(fit_trace) => fit_trace,
                Err(e) => {
                    error!("Error sampling fit curve: {}", e);
                    return;
                }
            };
            let mut traces = TraceList::new();
            traces.add_trace(trace, None);
            traces.add_trace(fit_trace, Some(Color::from(FIT_TRACE_COLOR)));

            let chart = Chart::new(&config);
            let svg = chart.render(&traces);
            if let Err(e) = export::save_svg(&out_path, &svg) {
                error!("Error writing figure: {}", e);
            }
        }
        Commands::Export {
            data,
            layout,
            out,
            force,
        } => {
            let out_path = out
                .clone()
                .unwrap_or_else(|| export::csv_file_name(&trace_label(data)));
            if let Err(e) = check_output_paths(std::slice::from_ref(&out_path), *force) {
                error!("{}", e);
                return;
            }
            let parser = NumericParser::new(layout.to_layout());
            let Some(trace) = load_trace(data, &parser) else {
                return;
            };
            if let Err(e) = export::save_csv(&out_path, &trace) {
                error!("Error writing CSV: {}", e);
            }
        }
    }
}
