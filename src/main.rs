use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

use mappath::config::ScanConfig;
use mappath::core::{ProjectAnalyzer, ProjectGraph, ProjectRoot};
use mappath::formatters::{JsonCompactFormatter, JsonFormatter, MermaidFormatter};

#[derive(Debug, Clone, Parser)]
#[command(
    name = "mappath",
    version,
    author = "mappath developers",
    about = "File-level dependency graph for TypeScript, JavaScript, Vue, Python, C# and Java projects"
)]
struct Cli {
    /// Project directory to analyze
    #[arg(short, long, value_name = "PATH", default_value = ".")]
    input: PathBuf,

    /// Output file path; stdout when omitted
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Output format: json, json-compact, mermaid
    #[arg(short, long, value_name = "FORMAT", value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Single-line JSON instead of pretty-printed (json)
    #[arg(long)]
    minify: bool,

    /// Include file sizes, the folder tree and colors (json-compact)
    #[arg(long)]
    details: bool,

    /// Flowchart direction (mermaid)
    #[arg(long, value_enum, default_value_t = Direction::TopDown)]
    direction: Direction,

    /// Extra directory name to skip (repeatable)
    #[arg(short, long, value_name = "DIR")]
    exclude: Vec<String>,

    /// Walk up from the input to the nearest project marker before scanning
    #[arg(long)]
    detect_root: bool,

    /// Log level when RUST_LOG is not set
    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    log_level: LogLevel,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
#[value(rename_all = "kebab-case")]
enum OutputFormat {
    Json,
    JsonCompact,
    Mermaid,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum Direction {
    #[value(name = "tb")]
    TopDown,
    #[value(name = "lr")]
    LeftRight,
}

/// Format-specific switches; each only affects its own format.
#[derive(Debug, Copy, Clone)]
struct RenderOptions {
    minify: bool,
    details: bool,
    direction: Direction,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start the async runtime")?;
    runtime.block_on(run(cli))
}

fn init_tracing(level: LogLevel) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let Cli {
        input,
        output,
        format,
        exclude,
        detect_root,
        minify,
        details,
        direction,
        ..
    } = cli;
    let options = RenderOptions {
        minify,
        details,
        direction,
    };

    let start_time = Instant::now();

    let mut root = ProjectRoot::canonicalize(&input)
        .with_context(|| format!("cannot analyze {}", input.display()))?;
    if detect_root {
        root = ProjectRoot::detect(&root);
    }

    let config = ScanConfig::load(&root).with_excludes(exclude);
    let analyzer = ProjectAnalyzer::with_config(config);
    let graph = analyzer
        .analyze_project(&root)
        .await
        .with_context(|| format!("failed to analyze {}", root.display()))?;

    info!(
        "Analysis completed in {:.2}s: {} files, {} edges",
        start_time.elapsed().as_secs_f64(),
        graph.nodes.len(),
        graph.edges.len()
    );

    let rendered = render(&graph, format, options)?;
    match output {
        Some(path) => {
            std::fs::write(&path, rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!("Wrote {}", path.display());
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(rendered.as_bytes())
                .and_then(|_| stdout.write_all(b"\n"))
                .context("failed to write to stdout")?;
        }
    }

    Ok(())
}

fn render(graph: &ProjectGraph, format: OutputFormat, options: RenderOptions) -> Result<String> {
    match format {
        OutputFormat::Json => JsonFormatter::new()
            .with_pretty(!options.minify)
            .format_graph(graph),
        OutputFormat::JsonCompact => {
            let formatter = JsonCompactFormatter::new();
            let formatter = if options.details {
                formatter.with_details()
            } else {
                formatter
            };
            formatter.format_graph(graph)
        }
        OutputFormat::Mermaid => {
            let formatter = MermaidFormatter::new();
            let formatter = match options.direction {
                Direction::TopDown => formatter,
                Direction::LeftRight => formatter.left_to_right(),
            };
            formatter.format_graph(graph)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn empty_graph() -> ProjectGraph {
        ProjectGraph {
            root_path: PathBuf::from("/p"),
            files: Vec::new(),
            nodes: Vec::new(),
            edges: Vec::new(),
            folders: BTreeMap::new(),
            language_colors: mappath::core::graph::language_colors(),
        }
    }

    fn options_from(args: &[&str]) -> (OutputFormat, RenderOptions) {
        let cli = Cli::parse_from(std::iter::once("mappath").chain(args.iter().copied()));
        let options = RenderOptions {
            minify: cli.minify,
            details: cli.details,
            direction: cli.direction,
        };
        (cli.format, options)
    }

    #[test]
    fn format_switches_reach_the_formatters() {
        let graph = empty_graph();

        let (format, options) = options_from(&["-f", "mermaid", "--direction", "lr"]);
        let text = render(&graph, format, options).unwrap();
        assert!(text.starts_with("flowchart LR"));

        let (format, options) = options_from(&["-f", "json-compact", "--details"]);
        let text = render(&graph, format, options).unwrap();
        assert!(text.contains("\"format\":\"detailed\""));

        let (format, options) = options_from(&["--minify"]);
        let text = render(&graph, format, options).unwrap();
        assert!(!text.contains('\n'));
    }

    #[test]
    fn defaults_render_pretty_top_down_compact() {
        let graph = empty_graph();
        let (_, options) = options_from(&[]);

        let pretty = render(&graph, OutputFormat::Json, options).unwrap();
        assert!(pretty.contains('\n'));
        let mermaid = render(&graph, OutputFormat::Mermaid, options).unwrap();
        assert!(mermaid.starts_with("flowchart TB"));
        let compact = render(&graph, OutputFormat::JsonCompact, options).unwrap();
        assert!(compact.contains("\"format\":\"compact\""));
    }
}
