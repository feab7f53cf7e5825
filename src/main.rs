use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use tracer::config::TracerConfig;
use tracer::reader::{stdin_file, FileLineReader, LineReader, SourceKind};
#[cfg(feature = "viewer")]
use tracer::trace_look::PlotStyle;
use tracer::{export, IngestionLoop, RenderGate, Result, SeriesLayout, StdoutSink, TracerError};

/// Plot in real time the numeric columns of lines read from standard input or a file.
#[derive(Parser, Debug)]
#[command(name = "tracer", version)]
struct Cli {
    /// Set the delimiter string
    #[arg(long)]
    sep: Option<String>,

    /// Columns to process, separated by commas and the subplots by slashes
    #[arg(short = 'C', long, value_parser = parse_layout)]
    columns: Option<SeriesLayout>,

    /// Process only the lines with NCOLUMNS columns
    #[arg(short = 'n', long)]
    ncolumns: Option<usize>,

    /// Take the first series as abscissa
    #[arg(short, long)]
    abscissa: bool,

    /// Read from the file FILE
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Add a starting offset
    #[arg(short, long)]
    offset: Option<usize>,

    /// Limit the number of data to display
    #[arg(short, long)]
    band: Option<usize>,

    /// Minimum time in seconds between two updates of the window
    #[arg(short, long)]
    rate: Option<f64>,

    /// Silence unprocessed lines
    #[arg(short, long)]
    quiet: bool,

    /// Rewrite the data on standard output
    #[arg(short = 'p', long = "pass")]
    reprint: bool,

    /// Colour cycle for the lines, separated by commas
    #[arg(short = 'c', long, value_delimiter = ',')]
    colors: Option<Vec<String>>,

    /// Loop the colours at each subplot
    #[arg(short = 'l', long = "loop")]
    loop_colors: bool,

    /// Dashed lines, separated by commas
    #[arg(short = 'd', long, value_delimiter = ',')]
    dashed: Vec<usize>,

    /// Dotted lines, separated by commas
    #[arg(short = 't', long, value_delimiter = ',')]
    dotted: Vec<usize>,

    /// Mixed (dash-dot) lines, separated by commas
    #[arg(short = 'm', long, value_delimiter = ',')]
    mixed: Vec<usize>,

    /// Line widths, separated by commas
    #[arg(short = 'w', long = "linewidth", value_delimiter = ',')]
    widths: Vec<f32>,

    /// Subplots where to keep zero in sight (all when no list is given)
    #[arg(short = 'z', long, num_args = 0.., value_delimiter = ',')]
    zero: Option<Vec<usize>>,

    /// Subplots without grid (all when no list is given)
    #[arg(short = 'g', long, num_args = 0.., value_delimiter = ',')]
    nogrid: Option<Vec<usize>>,

    /// Labels for each series, separated by commas
    #[arg(short = 'L', long, value_delimiter = ',')]
    labels: Vec<String>,

    /// Label for the abscissa
    #[arg(short = 'A', long)]
    xlabel: Option<String>,

    /// Titles for each subplot, separated by commas
    #[arg(short = 'T', long, value_delimiter = ',')]
    titles: Option<Vec<String>>,

    /// Plain (light) colours for the figure
    #[arg(short = 'P', long)]
    plain: bool,

    /// JSON file with default ingestion options
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Do not open a window: read to the end and print the retained records
    #[arg(long)]
    no_window: bool,
}

fn parse_layout(s: &str) -> std::result::Result<SeriesLayout, String> {
    s.parse().map_err(|e: TracerError| e.to_string())
}

impl Cli {
    fn tracer_config(&self) -> Result<TracerConfig> {
        let mut cfg = match &self.config {
            Some(path) => TracerConfig::load_json(path)?,
            None => TracerConfig::default(),
        };
        if self.sep.is_some() {
            cfg.sep = self.sep.clone();
        }
        if self.columns.is_some() {
            cfg.columns = self.columns.clone();
        }
        cfg.ncolumns = self.ncolumns.or(cfg.ncolumns);
        cfg.offset = self.offset.or(cfg.offset);
        cfg.band = self.band.or(cfg.band);
        if let Some(rate) = self.rate {
            cfg.rate = rate;
        }
        cfg.abscissa |= self.abscissa;
        cfg.quiet |= self.quiet;
        cfg.reprint |= self.reprint;
        cfg.validate()?;
        Ok(cfg)
    }

    #[cfg(feature = "viewer")]
    fn plot_style(&self) -> PlotStyle {
        let mut style = PlotStyle {
            loop_colors: self.loop_colors,
            dashed: self.dashed.clone(),
            dotted: self.dotted.clone(),
            mixed: self.mixed.clone(),
            widths: self.widths.clone(),
            labels: self.labels.clone(),
            xlabel: self.xlabel.clone(),
            titles: self.titles.clone(),
            nogrid: self.nogrid.clone(),
            zero: self.zero.clone(),
            plain: self.plain,
            ..Default::default()
        };
        if let Some(colors) = &self.colors {
            style.colors = colors.clone();
        }
        style
    }
}

fn init_logging() {
    // stdout carries the echoed lines, so logs go to stderr.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    init_logging();
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("tracer: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let cfg = cli.tracer_config()?;

    let (input, source_name) = match &cli.file {
        Some(path) => {
            let file = File::open(path).map_err(|e| {
                TracerError::Config(format!("can't open '{}': {e}", path.display()))
            })?;
            (file, path.display().to_string())
        }
        None => (stdin_file()?, "stdin".to_string()),
    };
    let kind = SourceKind::of(&input)?;
    let gate = RenderGate::new(cfg.refresh_settings()?, kind == SourceKind::File);
    let ingest = IngestionLoop::new(&cfg, gate.clone(), StdoutSink)
        .with_source_name(source_name.clone());
    let headless = cli.no_window || !cfg!(feature = "viewer");

    match kind {
        SourceKind::File => {
            ingest.run_file(FileLineReader::new(BufReader::new(input)))?;
        }
        SourceKind::Live => {
            let reader = LineReader::new(input)?;
            let handle = std::thread::Builder::new()
                .name("tracer-ingest".to_string())
                .spawn(move || {
                    if let Err(e) = ingest.run_live(reader) {
                        tracing::error!(error = %e, "ingestion aborted");
                        std::process::exit(1);
                    }
                })?;
            if headless && handle.join().is_err() {
                return Err(TracerError::Config("ingestion thread panicked".to_string()));
            }
        }
    }

    if headless {
        let snapshot = gate.get_snapshot_for_save();
        export::write_records(std::io::stdout().lock(), &snapshot)?;
        return Ok(());
    }
    show(gate, &cli, &cfg, source_name)
}

#[cfg(feature = "viewer")]
fn show(gate: RenderGate, cli: &Cli, cfg: &TracerConfig, source_name: String) -> Result<()> {
    let opts = tracer::app::ViewerOptions {
        title: format!("tracer ({source_name})"),
        style: cli.plot_style(),
        abscissa: cfg.abscissa,
        ..Default::default()
    };
    tracer::app::run_tracer(gate, opts).map_err(|e| TracerError::Viewer(e.to_string()))
}

#[cfg(not(feature = "viewer"))]
fn show(_gate: RenderGate, _cli: &Cli, _cfg: &TracerConfig, _source_name: String) -> Result<()> {
    Ok(())
}
