use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use ledgerlens_api::{AppState, Store};
use ledgerlens_core::{Analyzer, BankStatement, Invoice};
use ledgerlens_ingest::{
    DocumentKind, FileFormat, detect_document_kind, parse_statement_csv, parse_statement_xls,
    pdf_text,
};
use ledgerlens_providers::prompts::{BANK_STATEMENT_PROMPT, INVOICE_PROMPT};
use ledgerlens_providers::{InsightsAgent, extract_document, provider_for};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod chat;
mod config;
mod report_view;
mod state;

#[derive(Parser, Debug)]
#[command(
    name = "ledgerlens",
    version,
    long_version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("LEDGERLENS_BUILD_SHA"), ")"),
    about = "Bank-statement extraction, analytics, and AI insights"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract a statement from a PDF/XLS/CSV file and store it
    Extract {
        /// Statement file (PDF goes through the AI provider, XLS/CSV parse locally)
        file: PathBuf,

        /// Provider override (claude, openai, gemini, groq, openrouter)
        #[arg(long)]
        provider: Option<String>,

        /// Model override
        #[arg(long)]
        model: Option<String>,

        /// Directory holding transactions.json and friends
        #[arg(long, default_value = ".")]
        data_dir: PathBuf,
    },

    /// Analyze the stored statement and generate AI insights
    Analyze {
        #[arg(long, default_value = ".")]
        data_dir: PathBuf,

        /// Skip the AI narration step
        #[arg(long)]
        no_insights: bool,

        #[arg(long)]
        provider: Option<String>,

        #[arg(long)]
        model: Option<String>,
    },

    /// Serve the HTTP API
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        #[arg(long, default_value_t = 8000)]
        port: u16,

        #[arg(long, default_value = ".")]
        data_dir: PathBuf,

        #[arg(long)]
        provider: Option<String>,

        #[arg(long)]
        model: Option<String>,
    },

    /// Chat about the analyzed statement (TTY required)
    Chat {
        #[arg(long, default_value = ".")]
        data_dir: PathBuf,

        #[arg(long)]
        provider: Option<String>,

        #[arg(long)]
        model: Option<String>,
    },

    /// Manage ~/.ledgerlens/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config file
    Init,
    /// Print the effective config
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Extract { file, provider, model, data_dir } => {
            extract(file, provider.as_deref(), model.as_deref(), data_dir).await?;
        }

        Command::Analyze { data_dir, no_insights, provider, model } => {
            analyze(data_dir, no_insights, provider.as_deref(), model.as_deref()).await?;
        }

        Command::Serve { host, port, data_dir, provider, model } => {
            serve(host, port, data_dir, provider.as_deref(), model).await?;
        }

        Command::Chat { data_dir, provider, model } => {
            chat::run_chat(&data_dir, provider.as_deref(), model.as_deref())?;
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => {
                let cfg = config::load_config()?;
                print!("{}", toml::to_string_pretty(&cfg)?);
            }
        },
    }

    Ok(())
}

async fn extract(
    file: PathBuf,
    provider: Option<&str>,
    model: Option<&str>,
    data_dir: PathBuf,
) -> Result<()> {
    if !file.exists() {
        bail!("file not found: {}", file.display());
    }
    let filename = file
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("bad file name: {}", file.display()))?;
    let Some(format) = FileFormat::from_filename(filename) else {
        bail!("unsupported file format: {} (use PDF, XLS, or CSV)", file.display());
    };

    let store = Store::new(&data_dir);

    let statement = match format {
        FileFormat::Xls | FileFormat::Xlsx => parse_statement_xls(&file)?,
        FileFormat::Csv => parse_statement_csv(&file)?,
        FileFormat::Pdf => {
            let cfg = config::load_config()?;
            let kind_cfg = config::resolve_provider(provider, &cfg)?;
            let model = model.or(cfg.provider.model.as_deref());
            let llm = provider_for(kind_cfg, model)?;

            let data = std::fs::read(&file).with_context(|| format!("read {}", file.display()))?;
            let kind = pdf_text(&data)
                .map(|text| detect_document_kind(&text))
                .unwrap_or(DocumentKind::BankStatement);

            println!("Detected document type: {}", kind.as_str());
            println!("Using {} for extraction...", llm.name());

            match kind {
                DocumentKind::Invoice => {
                    let invoice: Invoice =
                        extract_document(llm.as_ref(), &data, INVOICE_PROMPT).await?;
                    report_view::print_invoice(&invoice);
                    return Ok(());
                }
                DocumentKind::BankStatement => {
                    extract_document::<BankStatement>(llm.as_ref(), &data, BANK_STATEMENT_PROMPT)
                        .await?
                }
            }
        }
    };

    report_view::print_statement(&statement);
    store.save_statement(&statement)?;
    println!("Statement saved to {}", store.transactions_path().display());

    Ok(())
}

async fn analyze(
    data_dir: PathBuf,
    no_insights: bool,
    provider: Option<&str>,
    model: Option<&str>,
) -> Result<()> {
    let store = Store::new(&data_dir);
    let Some(statement) = store.load_statement()? else {
        bail!(
            "No transactions found at {}. Run: ledgerlens extract <file>",
            store.transactions_path().display()
        );
    };

    println!("Running quantitative analysis...");
    let report = Analyzer::new(statement).full_report();
    store.save_report(&report)?;

    println!(
        "Processed {} transactions ({} to {})",
        report.transaction_count,
        report.analysis_period.from.as_deref().unwrap_or("?"),
        report.analysis_period.to.as_deref().unwrap_or("?")
    );
    report_view::print_report(&report);
    println!("Report saved to {}", store.report_path().display());

    if no_insights {
        return Ok(());
    }

    let cfg = config::load_config()?;
    let kind = config::resolve_provider(provider, &cfg)?;
    let model = model.or(cfg.provider.model.as_deref());
    let agent = InsightsAgent::new(provider_for(kind, model)?);

    println!("\nGenerating AI insights with {} (this may take a moment)...", agent.provider_name());
    let insights = agent.generate_insights(&report).await?;
    store.save_insights(&insights)?;

    println!("\n{insights}\n");
    println!("Insights saved to {}", store.insights_path().display());

    Ok(())
}

async fn serve(
    host: String,
    port: u16,
    data_dir: PathBuf,
    provider: Option<&str>,
    model: Option<String>,
) -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=info".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = config::load_config()?;
    let kind = config::resolve_provider(provider, &cfg)?;
    let model = model.or(cfg.provider.model.clone());

    println!("ledgerlens API");
    println!("  data dir : {}", data_dir.display());
    println!("  provider : {kind}");
    println!("  endpoint : http://{host}:{port}/api");
    println!("  Ctrl+C to stop\n");

    let state = AppState::new(Store::new(&data_dir), kind, model);
    ledgerlens_api::run_server(state, &host, port).await
}
