use std::io::{IsTerminal, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use analyzer_common::client::AnalysisClient;
use analyzer_common::model::Category;

use keyword_analyzer::config::Config;
use keyword_analyzer::render;
use keyword_analyzer::session::AnalyzerSession;

#[derive(Parser, Debug)]
#[command(name = "keyword-analyzer", version)]
#[command(about = "Check text against the keyword relevance service and highlight what matched")]
struct Cli {
    /// Text to analyze (read from stdin when omitted)
    text: Option<String>,
    /// Category filter sent to the service
    #[arg(short, long, value_enum, default_value_t = CategoryArg::All)]
    category: CategoryArg,
    /// Report format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Terminal)]
    format: OutputFormat,
    /// Write analyzer_matches.csv after a successful analysis
    #[arg(long)]
    export_csv: bool,
    /// Directory for the CSV export (default: ANALYZER_EXPORT_DIR or the working directory)
    #[arg(long)]
    out_dir: Option<PathBuf>,
    /// Analysis service base URL, overriding ANALYZER_API_BASE
    #[arg(long)]
    api_base: Option<String>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CategoryArg {
    All,
    Diagnostic,
    Endo,
}

impl From<CategoryArg> for Category {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::All => Category::All,
            CategoryArg::Diagnostic => Category::Diagnostic,
            CategoryArg::Endo => Category::Endo,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Terminal,
    Html,
    Json,
}

/// `RUST_LOG` when it parses, otherwise `warn`.
fn log_filter(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("warn"))
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // stdout carries the report, logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let cli = Cli::parse();

    let config = Config::from_env()?.with_overrides(cli.api_base.as_deref(), cli.out_dir.clone());
    info!(
        base_url = %config.client.base_url,
        timeout_ms = config.client.timeout.as_millis(),
        export_dir = %config.export_dir.display(),
        "configuration loaded"
    );
    let client = AnalysisClient::new(config.client.clone())?;

    let text = match cli.text {
        Some(text) => text,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let mut session = AnalyzerSession::new();
    session.set_text(text);
    session.set_category(cli.category.into());

    info!(url = %client.analyze_url(), category = %session.category(), "analyzing");
    if session.analyze(&client).await.is_err() {
        if let Some(message) = session.error() {
            eprintln!("{message}");
        }
        return Ok(ExitCode::FAILURE);
    }

    let (Some(result), Some(spans)) = (session.result(), session.preview()) else {
        return Ok(ExitCode::FAILURE);
    };
    let report = match cli.format {
        OutputFormat::Terminal => {
            render::terminal(&spans, result, std::io::stdout().is_terminal())
        }
        OutputFormat::Html => render::html(&spans, result),
        OutputFormat::Json => render::json(&spans, result)?,
    };
    print!("{report}");
    if !report.ends_with('\n') {
        println!();
    }

    if cli.export_csv {
        session.export_csv(&config.export_dir);
    }

    Ok(ExitCode::SUCCESS)
}
