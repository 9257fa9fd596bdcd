//! CLI binary for midnight-pdf.
//!
//! A thin shim over the library crate that maps CLI flags to `ExportConfig`
//! and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use midnight_pdf::{
    dark_output_path, export_to_file, inspect, ExportConfig, ExportProgressCallback, PaperSize,
    ProgressCallback, RecolorPalette,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: renders a live progress bar and per-page log
/// lines using [indicatif].
struct CliProgressCallback {
    /// The single progress bar anchored at the bottom of the terminal.
    bar: ProgressBar,
    /// Per-page wall-clock start times for elapsed reporting.
    start_times: Mutex<HashMap<usize, Instant>>,
}

impl CliProgressCallback {
    /// Create a callback whose progress-bar length is set dynamically
    /// by `on_export_start` (called once the page count is known).
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0); // length set in on_export_start

        // Initial style: spinner only (no counter until we know the total).
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Opening PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            start_times: Mutex::new(HashMap::new()),
        })
    }

    /// Switch to the full progress-bar style once we know `total`.
    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Exporting");
        self.bar.reset_eta();
    }
}

impl ExportProgressCallback for CliProgressCallback {
    fn on_export_start(&self, total_pages: usize) {
        self.activate_bar(total_pages);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Exporting {total_pages} pages to dark mode…"))
        ));
    }

    fn on_page_start(&self, page_num: usize, _total: usize) {
        self.start_times
            .lock()
            .unwrap()
            .insert(page_num, Instant::now());
        self.bar.set_message(format!("page {page_num}"));
    }

    fn on_page_complete(&self, page_num: usize, total: usize) {
        let elapsed_ms = self
            .start_times
            .lock()
            .unwrap()
            .remove(&page_num)
            .map(|t| t.elapsed().as_millis())
            .unwrap_or(0);

        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}",
            green("✓"),
            page_num,
            total,
            dim(&format!("{:.1}s", elapsed_ms as f64 / 1000.0)),
        ));
        self.bar.inc(1);
    }

    fn on_export_complete(&self, total_pages: usize) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {} pages recolored",
            green("✔"),
            bold(&total_pages.to_string())
        );
    }

    fn on_export_error(&self, error: String) {
        self.bar.finish_and_clear();

        // Truncate very long error messages to keep output tidy.
        let first_line = error.lines().next().unwrap_or("");
        let msg = if first_line.len() > 100 {
            format!("{}\u{2026}", &first_line[..99])
        } else {
            first_line.to_string()
        };
        eprintln!("{} {}", red("✘"), red(&msg));
    }

    fn on_export_cancelled(&self, after_pages: usize) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} Export cancelled after {} pages — no output written",
            cyan("⚠"),
            after_pages
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Basic export (writes document-dark.pdf next to the input)
  pdfdark document.pdf

  # Export to an explicit path
  pdfdark document.pdf -o night-copy.pdf

  # Sharper output for small print
  pdfdark --scale 3.0 paper.pdf

  # Encrypted document
  pdfdark --password hunter2 statement.pdf

  # Inspect PDF metadata (no export)
  pdfdark --inspect-only document.pdf

  # Tune the recoloring
  pdfdark --shadow-tint 30,30,40 --glare-softening 20 book.pdf

RECOLORING:
  Each page is rasterised, then every pixel is inverted. Pixels that were
  near-black (all inverted channels above the glare threshold) are softened
  to cut glare; pixels that were near-white page background (all inverted
  channels below the shadow threshold) become the shadow tint instead of
  pure black. Everything else keeps the plain inversion. Text, figures and
  reading order are preserved page-for-page; the output is a raster copy,
  not a re-encoded vector document.

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH       Path to an existing libpdfium shared library
  PDFDARK_OUTPUT        Default output path (same as -o)
  PDFDARK_SCALE         Default rasterisation scale (same as --scale)

SETUP:
  pdfium must be installed and findable by the system loader, or pointed to
  with PDFIUM_LIB_PATH=/path/to/libpdfium.
"#;

/// Export PDF documents as dark-mode copies for low-light reading.
#[derive(Parser, Debug)]
#[command(
    name = "pdfdark",
    version,
    about = "Export PDF documents as dark-mode copies for low-light reading",
    long_about = "Re-render each page of a PDF through a tuned dark-mode color transform and \
assemble the result into a new PDF with the same page count and reading order.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path.
    input: PathBuf,

    /// Write the dark-mode PDF to this path instead of `<input>-dark.pdf`.
    #[arg(short, long, env = "PDFDARK_OUTPUT")]
    output: Option<PathBuf>,

    /// Rasterisation scale applied to each page's point geometry (1.0–4.0).
    #[arg(long, env = "PDFDARK_SCALE", default_value_t = 2.0)]
    scale: f32,

    /// Output paper size.
    #[arg(long, env = "PDFDARK_PAPER", value_enum, default_value = "a4")]
    paper: PaperArg,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PDFDARK_PASSWORD")]
    password: Option<String>,

    /// Title stamped into the output PDF metadata (defaults to the source title).
    #[arg(long)]
    title: Option<String>,

    /// Inverted channels strictly above this are softened (0–255).
    #[arg(long, default_value_t = 220)]
    glare_threshold: u8,

    /// Amount subtracted from softened glare channels.
    #[arg(long, default_value_t = 30)]
    glare_softening: u8,

    /// Inverted channels strictly below this are replaced by the shadow tint.
    #[arg(long, default_value_t = 35)]
    shadow_threshold: u8,

    /// Shadow tint as R,G,B (e.g. 36,40,52).
    #[arg(long, default_value = "36,40,52")]
    shadow_tint: String,

    /// Print PDF metadata only, no export.
    #[arg(long)]
    inspect_only: bool,

    /// Disable progress bar.
    #[arg(long, env = "PDFDARK_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDFDARK_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDFDARK_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum PaperArg {
    A4,
    A3,
    A5,
    Letter,
    Legal,
}

impl From<PaperArg> for PaperSize {
    fn from(v: PaperArg) -> Self {
        match v {
            PaperArg::A4 => PaperSize::A4,
            PaperArg::A3 => PaperSize::A3,
            PaperArg::A5 => PaperSize::A5,
            PaperArg::Letter => PaperSize::Letter,
            PaperArg::Legal => PaperSize::Legal,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let meta = inspect(&cli.input).await.context("Failed to inspect PDF")?;

        println!("File:         {}", cli.input.display());
        if let Some(ref t) = meta.title {
            println!("Title:        {}", t);
        }
        if let Some(ref a) = meta.author {
            println!("Author:       {}", a);
        }
        if let Some(ref s) = meta.subject {
            println!("Subject:      {}", s);
        }
        println!("Pages:        {}", meta.page_count);
        println!("PDF Version:  {}", meta.pdf_version);
        if let Some(ref p) = meta.producer {
            println!("Producer:     {}", p);
        }
        if let Some(ref c) = meta.creator {
            println!("Creator:      {}", c);
        }
        return Ok(());
    }

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new_dynamic();
        Some(cb as Arc<dyn ExportProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, progress_cb)?;
    let output_path = cli
        .output
        .clone()
        .unwrap_or_else(|| dark_output_path(&cli.input));

    // ── Run export ───────────────────────────────────────────────────────
    let stats = export_to_file(&cli.input, &output_path, &config)
        .await
        .context("Export failed")?;

    if !cli.quiet {
        eprintln!(
            "{}  {} pages  {}ms  →  {}",
            green("✔"),
            stats.page_count,
            stats.total_duration_ms,
            bold(&output_path.display().to_string()),
        );
        eprintln!(
            "   {}  {}",
            dim(&format!("{} KiB", stats.output_bytes / 1024)),
            dim(&format!(
                "render {}ms / recolor {}ms / assemble {}ms",
                stats.render_duration_ms, stats.recolor_duration_ms, stats.assemble_duration_ms
            )),
        );
    }

    Ok(())
}

/// Map CLI args to `ExportConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ExportConfig> {
    let palette = RecolorPalette {
        glare_threshold: cli.glare_threshold,
        glare_softening: cli.glare_softening,
        shadow_threshold: cli.shadow_threshold,
        shadow_tint: parse_tint(&cli.shadow_tint)?,
    };

    let mut builder = ExportConfig::builder()
        .render_scale(cli.scale)
        .paper(cli.paper.clone().into())
        .palette(palette);

    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd.clone());
    }
    if let Some(ref title) = cli.title {
        builder = builder.title(title.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Parse `--shadow-tint` "R,G,B" into channel values.
fn parse_tint(s: &str) -> Result<[u8; 3]> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        anyhow::bail!("Invalid tint '{s}': expected three comma-separated values, e.g. 36,40,52");
    }
    let mut tint = [0u8; 3];
    for (slot, part) in tint.iter_mut().zip(&parts) {
        *slot = part
            .parse::<u8>()
            .with_context(|| format!("Invalid tint channel '{part}' (must be 0–255)"))?;
    }
    Ok(tint)
}
