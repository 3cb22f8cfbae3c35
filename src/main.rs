use clap::Parser;
use log::info;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use financial_report_analyzer::llm::PromptTemplate;
use financial_report_analyzer::server::{self, AppState};
use financial_report_analyzer::{AnalysisSession, AnalyzerConfig, FinancialAnalyzer, ReportFormat};

/// Web front-end for the accounting/financial analyst.
///
/// The OpenAI credential is read from OPENAI_API_KEY (a .env file is honoured).
#[derive(Parser, Debug)]
#[command(name = "financial-report-analyzer", version, about)]
struct Args {
    /// Address to listen on
    #[arg(long, env = "ANALYZER_BIND", default_value = "127.0.0.1:8501")]
    bind: String,

    /// Report format offered for download: xlsx or docx
    #[arg(long, env = "ANALYZER_REPORT_FORMAT", default_value = "xlsx")]
    format: String,

    /// Model override (defaults to OPENAI_MODEL, then gpt-4)
    #[arg(long)]
    model: Option<String>,

    /// Completion endpoint override (defaults to OPENAI_BASE_URL, then api.openai.com)
    #[arg(long)]
    base_url: Option<String>,

    /// Sampling temperature sent with each request (provider default when unset)
    #[arg(long, env = "ANALYZER_TEMPERATURE")]
    temperature: Option<f32>,

    /// File holding a replacement system instruction
    #[arg(long)]
    prompt_file: Option<PathBuf>,

    /// Largest accepted upload, in megabytes
    #[arg(long, default_value = "50")]
    max_upload_mb: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();
    let format: ReportFormat = args.format.parse()?;

    let mut config = AnalyzerConfig::from_env()?;
    if let Some(model) = args.model {
        config = config.with_model(model);
    }
    if let Some(base_url) = args.base_url {
        config = config.with_base_url(base_url);
    }
    if let Some(temperature) = args.temperature {
        config = config.with_temperature(temperature);
    }
    if let Some(path) = args.prompt_file {
        config = config.with_prompt(PromptTemplate::from_file(&path)?);
    }

    let analyzer = FinancialAnalyzer::from_config(&config);
    info!("Using prompt '{}'", analyzer.prompt().name);
    let session = AnalysisSession::new(analyzer, format);
    let state = Arc::new(AppState::new(session, args.max_upload_mb * 1024 * 1024));
    let app = server::router(state);

    let listener = tokio::net::TcpListener::bind(&args.bind).await?;
    info!(
        "Analisador Contábil e Financeiro listening on http://{} (model {}, reports as {})",
        args.bind, config.model, format
    );
    axum::serve(listener, app).await?;

    Ok(())
}
