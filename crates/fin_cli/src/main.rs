use anyhow::Context;
use clap::Parser;
use fin_chat::{format_reply_lines, ChatSession, IngestOutcome, Ingestor, SendOutcome};
use fin_core::{ChatTurn, Document};
use fin_gateway::config::{DEFAULT_ANALYZE_PATH, DEFAULT_BASE_URL, DEFAULT_UPLOAD_PATH};
use fin_gateway::{BackendConfig, RequestGateway};
use fin_news::{MarketauxClient, NewsCache, NewsParams};
use fin_parsers::{content_to_context, FormatRegistry};
use fin_web::{create_app, AppState};
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

const DEFAULT_BIND: &str = "127.0.0.1:3000";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[arg(long, env = "BACKEND_BASE_URL", default_value = DEFAULT_BASE_URL)]
    backend_url: String,
    #[arg(long, env = "BACKEND_UPLOAD_PATH", default_value = DEFAULT_UPLOAD_PATH)]
    upload_path: String,
    #[arg(long, env = "BACKEND_ANALYZE_PATH", default_value = DEFAULT_ANALYZE_PATH)]
    analyze_path: String,
    /// Send images to the backend for OCR instead of rejecting them
    #[arg(long, env = "FIN_ENABLE_IMAGE_OCR")]
    enable_image_ocr: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run the HTTP proxy and news endpoint
    Serve {
        #[arg(long, env = "FIN_BIND", default_value = DEFAULT_BIND)]
        bind: String,
        #[arg(long, env = "MARKETAUX_API_KEY", hide_env_values = true)]
        api_key: Option<String>,
    },
    /// Print the analysis context extracted from a CSV, XLSX or PDF file
    Parse {
        path: String,
    },
    /// Chat with the analysis service from the terminal
    Chat {
        /// Report to ingest before the first question
        #[arg(long)]
        file: Option<String>,
    },
    /// Fetch the latest financial headlines
    News {
        #[arg(long)]
        q: Option<String>,
        #[arg(long)]
        tickers: Option<String>,
        #[arg(long)]
        limit: Option<String>,
        #[arg(long, env = "MARKETAUX_API_KEY", hide_env_values = true)]
        api_key: Option<String>,
    },
}

impl Cli {
    fn backend_config(&self) -> fin_core::Result<BackendConfig> {
        BackendConfig::new(&self.backend_url, &self.upload_path, &self.analyze_path)
    }
}

/// Reads a file from disk into a [`Document`]; the format is decided later
/// from the extension.
fn load_document(path: &Path) -> anyhow::Result<Document> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .context("Path has no file name")?
        .to_string();
    Ok(Document::new(filename, None, bytes))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn print_reply(turn: &ChatTurn) {
    for line in format_reply_lines(&turn.message) {
        println!("  {}", line);
    }
}

async fn ingest_file(ingestor: &Ingestor, session: &ChatSession, path: &str) -> anyhow::Result<()> {
    let document = load_document(Path::new(path))?;
    info!("📄 Ingesting {}", document.filename);
    let outcome = ingestor.ingest(session, &document).await;
    match &outcome {
        IngestOutcome::Extracted { reply, .. } => print_reply(reply),
        other => println!("  {}", other.message()),
    }
    Ok(())
}

async fn run_chat(cli: &Cli, file: Option<String>) -> anyhow::Result<()> {
    let gateway = RequestGateway::new(cli.backend_config()?);
    let session = ChatSession::new(Arc::new(gateway));
    let ingestor = Ingestor::new(FormatRegistry::new(cli.enable_image_ocr));

    for turn in session.turns() {
        println!("{}", turn.message);
    }
    if let Some(path) = file {
        ingest_file(&ingestor, &session, &path).await?;
    }

    println!("Type a question, /upload <path> to add a report, or /quit.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line == "/quit" {
            break;
        }
        if let Some(path) = line.strip_prefix("/upload ") {
            if let Err(e) = ingest_file(&ingestor, &session, path.trim()).await {
                eprintln!("{:#}", e);
            }
            continue;
        }
        if let SendOutcome::Replied(turn) = session.send_message(line).await {
            print_reply(&turn);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fin_core::logging::init_logging("info");
    let cli = Cli::parse();

    match &cli.command {
        Commands::Serve { bind, api_key } => {
            let state = AppState {
                gateway: Arc::new(RequestGateway::new(cli.backend_config()?)),
                news: Arc::new(NewsCache::new(
                    Arc::new(MarketauxClient::new()),
                    non_empty(api_key.clone()),
                )),
                registry: FormatRegistry::new(cli.enable_image_ocr),
            };
            let listener = tokio::net::TcpListener::bind(bind)
                .await
                .with_context(|| format!("Failed to bind {}", bind))?;
            info!("🚀 Listening on {} (backend {})", bind, cli.backend_url);
            axum::serve(listener, create_app(state)).await?;
        }
        Commands::Parse { path } => {
            let document = load_document(Path::new(path))?;
            let content = FormatRegistry::new(cli.enable_image_ocr).parse(&document)?;
            println!("{}", content_to_context(&content)?);
        }
        Commands::Chat { file } => run_chat(&cli, file.clone()).await?,
        Commands::News { q, tickers, limit, api_key } => {
            let cache =
                NewsCache::new(Arc::new(MarketauxClient::new()), non_empty(api_key.clone()));
            let params = NewsParams {
                q: q.clone(),
                tickers: tickers.clone(),
                limit: limit.clone(),
                ..Default::default()
            };
            let articles = cache.get_articles(&params.into()).await?;
            println!("{}", serde_json::to_string_pretty(&articles)?);
        }
    }

    Ok(())
}
