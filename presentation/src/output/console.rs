//! Console output formatter for conversations and transcripts

use colored::Colorize;
use polychat_domain::util::preview;
use polychat_domain::{
    Conversation, ConversationList, Message, MessagePair, Role, SendStatus, Transcript,
    TranscriptEntry,
};
use serde_json::{Value, json};

const PREVIEW_BYTES: usize = 72;
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Formats session state for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// One line per conversation, newest first
    pub fn conversation_list(list: &ConversationList) -> String {
        if list.is_empty() {
            return format!("{}\n", "No conversations yet.".dimmed());
        }
        let mut output = String::new();
        for conversation in list.iter() {
            output.push_str(&Self::conversation_line(conversation));
            output.push('\n');
        }
        output
    }

    pub fn conversation_line(conversation: &Conversation) -> String {
        format!(
            "{:>6}  {}  {}  {}",
            conversation.id.as_str().yellow(),
            preview(&conversation.title, PREVIEW_BYTES).bold(),
            format!("[{}]", conversation.model).dimmed(),
            format!(
                "{} msgs, {}",
                conversation.message_count,
                conversation.updated_at.format(TIME_FORMAT)
            )
            .dimmed()
        )
    }

    /// Full transcript of the open conversation
    pub fn transcript(transcript: &Transcript) -> String {
        let conversation = transcript.conversation();
        let mut output = String::new();

        output.push_str(&Self::header(&conversation.title));
        output.push('\n');
        output.push_str(&format!(
            "{} {}   {} {}\n",
            "Chat:".cyan().bold(),
            conversation.id,
            "Model:".cyan().bold(),
            conversation.model
        ));

        if transcript.entries().is_empty() {
            output.push_str(&format!("\n{}\n", "(no messages)".dimmed()));
        }
        for entry in transcript.entries() {
            output.push('\n');
            output.push_str(&Self::entry(entry));
        }

        if let SendStatus::RolledBack { reason } = transcript.status() {
            output.push_str(&format!("\n{} {}\n", "Last send failed:".red().bold(), reason));
        }

        output.push_str(&Self::footer());
        output
    }

    /// Reply to a single send
    pub fn reply(pair: &MessagePair) -> String {
        format!("{}\n{}\n", Self::speaker(Role::Assistant, false), pair.assistant.content)
    }

    pub fn search_results(query: &str, results: &[Conversation]) -> String {
        if results.is_empty() {
            return format!("{} {}\n", "No matches for".dimmed(), query.bold());
        }
        let mut output = Self::section_header(&format!("Results for \"{}\"", query));
        for conversation in results {
            output.push_str(&Self::conversation_line(conversation));
            output.push('\n');
        }
        output
    }

    pub fn conversation_list_json(list: &ConversationList) -> String {
        Self::pretty(&Value::Array(list.iter().map(Self::conversation_value).collect()))
    }

    pub fn conversation_json(conversation: &Conversation) -> String {
        Self::pretty(&Self::conversation_value(conversation))
    }

    pub fn transcript_json(transcript: &Transcript) -> String {
        let messages: Vec<Value> = transcript
            .entries()
            .iter()
            .map(|entry| match entry {
                TranscriptEntry::Confirmed(message) => Self::message_value(message),
                TranscriptEntry::Pending(pending) => json!({
                    "local_id": pending.local_id.to_string(),
                    "content": pending.content.as_str(),
                    "role": Role::User.as_str(),
                    "timestamp": pending.timestamp.to_rfc3339(),
                    "pending": true,
                }),
            })
            .collect();
        Self::pretty(&json!({
            "chat": Self::conversation_value(transcript.conversation()),
            "messages": messages,
        }))
    }

    pub fn reply_json(pair: &MessagePair) -> String {
        Self::pretty(&json!({
            "user_message": Self::message_value(&pair.user),
            "ai_message": Self::message_value(&pair.assistant),
        }))
    }

    pub fn search_results_json(query: &str, results: &[Conversation]) -> String {
        Self::pretty(&json!({
            "query": query,
            "results": results.iter().map(Self::conversation_value).collect::<Vec<_>>(),
        }))
    }

    fn entry(entry: &TranscriptEntry) -> String {
        format!(
            "{} {}\n{}\n",
            Self::speaker(entry.role(), entry.is_pending()),
            entry.timestamp().format(TIME_FORMAT).to_string().dimmed(),
            entry.content()
        )
    }

    fn speaker(role: Role, pending: bool) -> String {
        match (role, pending) {
            (Role::User, false) => "You:".green().bold().to_string(),
            (Role::User, true) => "You (sending...):".yellow().bold().to_string(),
            (Role::Assistant, _) => "Assistant:".magenta().bold().to_string(),
        }
    }

    fn conversation_value(conversation: &Conversation) -> Value {
        serde_json::to_value(conversation).unwrap_or(Value::Null)
    }

    fn message_value(message: &Message) -> Value {
        serde_json::to_value(message).unwrap_or(Value::Null)
    }

    fn pretty(value: &Value) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!(
            "{}\n{:^60}\n{}",
            line.cyan(),
            preview(title, 56).bold(),
            line.cyan()
        )
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}
