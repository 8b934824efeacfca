//! REPL (Read-Eval-Print Loop) for interactive chat

use crate::chat::command::ReplCommand;
use crate::output::console::ConsoleFormatter;
use crate::progress::ReplySpinner;
use colored::Colorize;
use polychat_application::{ChatClient, SearchDebouncer, SendOutcome, SyncError};
use polychat_domain::util::preview;
use polychat_domain::{Conversation, ConversationId, Model};
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_SEARCH_TIMEOUT: Duration = Duration::from_secs(30);

/// What the loop does after a line has been handled
#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    /// Offer the text again as the next line's initial input
    Restore(String),
    Quit,
}

/// Wait for the search started by the latest query change to finish.
///
/// Returns `None` at once when the query is blank (nothing is scheduled),
/// and otherwise when the search was abandoned, superseded, or did not
/// settle within `limit`.
pub async fn await_search(
    search: &SearchDebouncer,
    limit: Duration,
) -> Option<Vec<Conversation>> {
    let mut rx = search.subscribe();
    if rx.borrow().query().trim().is_empty() {
        return None;
    }
    let mut started = false;
    let waited = tokio::time::timeout(
        limit,
        rx.wait_for(|state| {
            started |= state.is_searching();
            state.is_settled() || (started && !state.is_searching())
        }),
    )
    .await;

    match waited {
        Ok(Ok(state)) if state.is_settled() => Some(state.results().to_vec()),
        _ => None,
    }
}

/// Interactive chat REPL
pub struct ChatRepl {
    client: Arc<ChatClient>,
    quiet: bool,
    search_timeout: Duration,
    history_path: Option<PathBuf>,
}

impl ChatRepl {
    pub fn new(client: Arc<ChatClient>) -> Self {
        Self {
            client,
            quiet: false,
            search_timeout: DEFAULT_SEARCH_TIMEOUT,
            history_path: dirs::data_dir().map(|p| p.join("polychat").join("history.txt")),
        }
    }

    /// Hide the reply spinner
    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Upper bound on waiting for `/search` results
    pub fn with_search_timeout(mut self, timeout: Duration) -> Self {
        self.search_timeout = timeout;
        self
    }

    pub fn with_history_path(mut self, path: Option<PathBuf>) -> Self {
        self.history_path = path;
        self
    }

    /// Run the interactive REPL, optionally opening a conversation first
    pub async fn run(&self, open: Option<ConversationId>) -> RlResult<()> {
        let mut rl = DefaultEditor::new()?;

        if let Some(ref path) = self.history_path {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let _ = rl.load_history(path);
        }

        self.print_welcome();

        if let Some(id) = open {
            if self.open(id).await == Flow::Quit {
                return Ok(());
            }
        }

        let mut restore: Option<String> = None;
        loop {
            let prompt = self.prompt();
            let readline = match restore.take() {
                Some(text) => rl.readline_with_initial(&prompt, (text.as_str(), "")),
                None => rl.readline(&prompt),
            };

            match readline {
                Ok(line) => {
                    let Some(command) = ReplCommand::parse(&line) else {
                        continue;
                    };
                    let _ = rl.add_history_entry(line.trim());

                    match self.handle(command).await {
                        Flow::Continue => {}
                        Flow::Restore(text) => restore = Some(text),
                        Flow::Quit => break,
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("Bye!");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {:?}", err);
                    break;
                }
            }
        }

        if let Some(ref path) = self.history_path {
            let _ = rl.save_history(path);
        }

        Ok(())
    }

    fn print_welcome(&self) {
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│               polychat - Chat               │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        println!("{}", ReplCommand::help());
        println!();
    }

    fn prompt(&self) -> String {
        match self.client.reconciler().snapshot() {
            Some(transcript) => format!("[{}] >>> ", preview(&transcript.conversation().title, 24)),
            None => ">>> ".to_string(),
        }
    }

    async fn handle(&self, command: ReplCommand) -> Flow {
        match command {
            ReplCommand::Send(text) => self.send(text).await,
            ReplCommand::Quit => {
                println!("Bye!");
                Flow::Quit
            }
            ReplCommand::Help => {
                println!("\n{}\n", ReplCommand::help());
                Flow::Continue
            }
            ReplCommand::List => self.list().await,
            ReplCommand::Show => {
                match self.client.reconciler().snapshot() {
                    Some(transcript) => println!("{}", ConsoleFormatter::transcript(&transcript)),
                    None => Self::print_nothing_open(),
                }
                Flow::Continue
            }
            ReplCommand::New(title) => {
                match self.client.new_conversation(title.as_deref(), None).await {
                    Ok(effect) => {
                        if let Some(conversation) = effect.conversation() {
                            println!("{} {}", "Started".green().bold(), conversation.title);
                        }
                        Flow::Continue
                    }
                    Err(e) => Self::report(&e),
                }
            }
            ReplCommand::Open(id) => self.open(ConversationId::new(id)).await,
            ReplCommand::Rename(title) => {
                let Some(id) = self.client.reconciler().open_conversation_id() else {
                    Self::print_nothing_open();
                    return Flow::Continue;
                };
                match self.client.rename(&id, &title).await {
                    Ok(_) => Flow::Continue,
                    Err(e) => Self::report(&e),
                }
            }
            ReplCommand::Model(model) => {
                let Some(id) = self.client.reconciler().open_conversation_id() else {
                    Self::print_nothing_open();
                    return Flow::Continue;
                };
                let model = Model::from(model.as_str());
                match self.client.set_model(&id, model.clone()).await {
                    Ok(_) => {
                        println!("{} {}", "Now answering:".cyan().bold(), model);
                        Flow::Continue
                    }
                    Err(e) => Self::report(&e),
                }
            }
            ReplCommand::Delete => {
                let Some(id) = self.client.reconciler().open_conversation_id() else {
                    Self::print_nothing_open();
                    return Flow::Continue;
                };
                match self.client.delete(&id).await {
                    Ok(_) => {
                        println!("{} {}", "Deleted".yellow().bold(), id);
                        Flow::Continue
                    }
                    Err(e) => Self::report(&e),
                }
            }
            ReplCommand::Search(query) => {
                self.client.on_query_change(&query);
                match await_search(self.client.search(), self.search_timeout).await {
                    Some(results) => {
                        print!("{}", ConsoleFormatter::search_results(&query, &results))
                    }
                    None => println!("{}", "Search did not complete.".red()),
                }
                Flow::Continue
            }
            ReplCommand::Usage(usage) => {
                println!("Usage: {}", usage);
                Flow::Continue
            }
            ReplCommand::Unknown(cmd) => {
                println!("Unknown command: {}", cmd);
                println!("Type /help for available commands");
                Flow::Continue
            }
        }
    }

    async fn send(&self, text: String) -> Flow {
        let label = self
            .client
            .reconciler()
            .snapshot()
            .map(|t| t.conversation().model.to_string())
            .unwrap_or_else(|| "new chat".to_string());

        let spinner = ReplySpinner::start(&label, self.quiet);
        match self.client.send(&text).await {
            Ok(SendOutcome::Delivered(pair)) => {
                spinner.finish();
                println!("{}", ConsoleFormatter::reply(&pair));
                Flow::Continue
            }
            Ok(SendOutcome::Skipped) => {
                spinner.finish();
                Flow::Continue
            }
            Err(e) if e.is_unauthorized() => {
                spinner.fail("session expired");
                Self::report(&e)
            }
            Err(e) => {
                spinner.fail(&e.to_string());
                Flow::Restore(text)
            }
        }
    }

    async fn list(&self) -> Flow {
        match self.client.refresh().await {
            Ok(_) => {
                print!(
                    "{}",
                    ConsoleFormatter::conversation_list(&self.client.sessions().snapshot())
                );
                Flow::Continue
            }
            Err(e) => Self::report(&e),
        }
    }

    async fn open(&self, id: ConversationId) -> Flow {
        match self.client.open(&id).await {
            Ok(()) => {
                if let Some(transcript) = self.client.reconciler().snapshot() {
                    println!("{}", ConsoleFormatter::transcript(&transcript));
                }
                Flow::Continue
            }
            Err(e) => Self::report(&e),
        }
    }

    /// Print an error; an expired session ends the REPL
    fn report(err: &SyncError) -> Flow {
        if err.is_unauthorized() {
            eprintln!(
                "{} {}",
                "Session expired.".red().bold(),
                "Sign in again and update server.session_cookie.".dimmed()
            );
            return Flow::Quit;
        }
        eprintln!("{} {}", "Error:".red().bold(), err);
        Flow::Continue
    }

    fn print_nothing_open() {
        println!("No conversation open. Use /new or /open <id>.");
    }
}
