//! CLI entrypoint for polychat
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use polychat_application::{ChatClient, NoSyncJournal, SendOutcome, SyncConfig, SyncJournal};
use polychat_domain::{Conversation, ConversationId, Model, OutputFormat};
use polychat_infrastructure::{ConfigLoader, HttpSessionGateway, JsonlSyncJournal};
use polychat_presentation::{ChatRepl, Cli, Command, ConsoleFormatter, ReplySpinner, await_search};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Slack added on top of debounce + request timeout when waiting for search
const SEARCH_GRACE: Duration = Duration::from_secs(1);
/// Search wait when no request timeout is configured
const SEARCH_FALLBACK_TIMEOUT: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources();
        return Ok(());
    }

    let _log_guard = init_logging(cli.verbose, cli.log_file.as_deref())?;

    info!("Starting polychat");

    // Load configuration
    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).context("failed to load configuration")?
    };
    if let Some(server) = &cli.server {
        config.server.base_url = server.clone();
    }

    let issues = config.validate();
    for issue in issues.iter().filter(|i| !i.is_error()) {
        warn!("{}", issue.message);
    }
    if let Some(issue) = issues.iter().find(|i| i.is_error()) {
        bail!("Invalid configuration: {}", issue.message);
    }

    if cli.no_color || !config.output.color {
        colored::control::set_override(false);
    }

    let format: OutputFormat = cli
        .output
        .map(Into::into)
        .or(config.output.format)
        .unwrap_or_default();

    // === Dependency Injection ===
    let gateway = HttpSessionGateway::from_config(&config.server)?;
    let expiry = gateway.expiry().clone();

    let journal: Arc<dyn SyncJournal> = match config
        .journal
        .resolved_path()
        .and_then(JsonlSyncJournal::open)
    {
        Some(journal) => {
            info!("Recording sync events to {}", journal.path().display());
            Arc::new(journal)
        }
        None => Arc::new(NoSyncJournal),
    };

    let sync = config.to_sync_config();
    let client = Arc::new(ChatClient::new(Arc::new(gateway), &sync, journal));

    let search_limit = config
        .server
        .request_timeout()
        .map(|t| sync.search_debounce + t + SEARCH_GRACE)
        .unwrap_or(SEARCH_FALLBACK_TIMEOUT);

    let result = run(cli, &sync, search_limit, format, client).await;

    if expiry.is_expired() {
        eprintln!("Session expired. Sign in again and update server.session_cookie.");
    }

    result
}

fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    // RUST_LOG wins over -v
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    });

    let Some(path) = log_file else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
        return Ok(None);
    };

    let file_name = path
        .file_name()
        .with_context(|| format!("--log-file must name a file: {}", path.display()))?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create log directory {}", dir.display()))?;

    let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(writer)
        .init();
    Ok(Some(guard))
}

async fn run(
    cli: Cli,
    sync: &SyncConfig,
    search_limit: Duration,
    format: OutputFormat,
    client: Arc<ChatClient>,
) -> Result<()> {
    let json = format == OutputFormat::Json;

    match cli.command {
        Command::List => {
            client.refresh().await?;
            let list = client.sessions().snapshot();
            if json {
                println!("{}", ConsoleFormatter::conversation_list_json(&list));
            } else {
                print!("{}", ConsoleFormatter::conversation_list(&list));
            }
        }
        Command::Show { id } => {
            client.open(&ConversationId::new(id)).await?;
            let transcript = client
                .reconciler()
                .snapshot()
                .context("conversation closed while loading")?;
            if json {
                println!("{}", ConsoleFormatter::transcript_json(&transcript));
            } else {
                println!("{}", ConsoleFormatter::transcript(&transcript));
            }
        }
        Command::New { title, model } => {
            let effect = client
                .new_conversation(title.as_deref(), model.as_deref().map(Model::from))
                .await?;
            if let Some(conversation) = effect.conversation() {
                print_conversation(conversation, json);
            }
        }
        Command::Rename { id, title } => {
            let effect = client.rename(&ConversationId::new(id), &title).await?;
            match effect.conversation() {
                Some(conversation) => print_conversation(conversation, json),
                None => bail!("Title must not be blank"),
            }
        }
        Command::SetModel { id, model } => {
            let effect = client
                .set_model(&ConversationId::new(id), Model::from(model.as_str()))
                .await?;
            if let Some(conversation) = effect.conversation() {
                print_conversation(conversation, json);
            }
        }
        Command::Delete { id } => {
            let id = ConversationId::new(id);
            client.delete(&id).await?;
            if !cli.quiet {
                println!("Deleted {}", id);
            }
        }
        Command::Search { query } => {
            let query = query.join(" ");
            if query.trim().is_empty() {
                bail!("Nothing to search: query is blank");
            }
            client.on_query_change(&query);
            let Some(results) = await_search(client.search(), search_limit).await else {
                bail!("Search for \"{}\" did not complete", query);
            };
            if json {
                println!("{}", ConsoleFormatter::search_results_json(&query, &results));
            } else {
                print!("{}", ConsoleFormatter::search_results(&query, &results));
            }
        }
        Command::Send { chat, content } => {
            let text = content.join(" ");
            if let Some(id) = chat {
                client.open(&ConversationId::new(id)).await?;
            }
            let label = client
                .reconciler()
                .snapshot()
                .map(|t| t.conversation().model.to_string())
                .unwrap_or_else(|| sync.default_model.to_string());

            let spinner = ReplySpinner::start(&label, cli.quiet || json);
            match client.send(&text).await {
                Ok(SendOutcome::Delivered(pair)) => {
                    spinner.finish();
                    if json {
                        println!("{}", ConsoleFormatter::reply_json(&pair));
                    } else {
                        print!("{}", ConsoleFormatter::reply(&pair));
                    }
                }
                Ok(SendOutcome::Skipped) => {
                    spinner.finish();
                    bail!("Nothing to send: message is blank");
                }
                Err(e) => {
                    spinner.fail("not delivered");
                    return Err(e.into());
                }
            }
        }
        Command::Chat { id } => {
            ChatRepl::new(client)
                .with_quiet(cli.quiet)
                .with_search_timeout(search_limit)
                .run(id.map(ConversationId::new))
                .await?;
        }
    }

    Ok(())
}

fn print_conversation(conversation: &Conversation, json: bool) {
    if json {
        println!("{}", ConsoleFormatter::conversation_json(conversation));
    } else {
        println!("{}", ConsoleFormatter::conversation_line(conversation));
    }
}
