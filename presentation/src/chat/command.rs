//! Slash commands understood by the chat REPL

/// A parsed line of REPL input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    /// Plain text to send to the open conversation
    Send(String),
    Help,
    Quit,
    List,
    Show,
    New(Option<String>),
    Open(String),
    Rename(String),
    Model(String),
    Delete,
    Search(String),
    /// Known command missing its argument
    Usage(&'static str),
    Unknown(String),
}

impl ReplCommand {
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let Some(rest) = line.strip_prefix('/') else {
            return Some(ReplCommand::Send(line.to_string()));
        };

        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };
        let arg = (!arg.is_empty()).then(|| arg.to_string());

        let command = match (name, arg) {
            ("quit" | "exit" | "q", _) => ReplCommand::Quit,
            ("help" | "h" | "?", _) => ReplCommand::Help,
            ("list" | "ls", _) => ReplCommand::List,
            ("show", _) => ReplCommand::Show,
            ("new", title) => ReplCommand::New(title),
            ("delete", _) => ReplCommand::Delete,
            ("open", Some(id)) => ReplCommand::Open(id),
            ("rename", Some(title)) => ReplCommand::Rename(title),
            ("model", Some(model)) => ReplCommand::Model(model),
            ("search", Some(query)) => ReplCommand::Search(query),
            ("open", None) => ReplCommand::Usage("/open <id>"),
            ("rename", None) => ReplCommand::Usage("/rename <title>"),
            ("model", None) => ReplCommand::Usage("/model <model-id>"),
            ("search", None) => ReplCommand::Usage("/search <text>"),
            _ => ReplCommand::Unknown(line.to_string()),
        };
        Some(command)
    }

    pub fn help() -> &'static str {
        "Commands:
  /new [title]       - Start a new conversation
  /list, /ls         - List conversations
  /open <id>         - Open a conversation
  /show              - Print the open conversation
  /rename <title>    - Rename the open conversation
  /model <model-id>  - Switch the model of the open conversation
  /delete            - Delete the open conversation
  /search <text>     - Search titles and messages
  /help, /h, /?      - Show this help
  /quit, /exit, /q   - Exit chat

Anything else is sent to the open conversation (a new one is created if none is open)."
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_line_is_ignored() {
        assert_eq!(ReplCommand::parse("   "), None);
    }

    #[test]
    fn test_plain_text_is_sent_trimmed() {
        assert_eq!(
            ReplCommand::parse("  hello there \n"),
            Some(ReplCommand::Send("hello there".to_string()))
        );
    }

    #[test]
    fn test_commands_with_arguments() {
        assert_eq!(
            ReplCommand::parse("/rename  Trip plans "),
            Some(ReplCommand::Rename("Trip plans".to_string()))
        );
        assert_eq!(
            ReplCommand::parse("/open 42"),
            Some(ReplCommand::Open("42".to_string()))
        );
        assert_eq!(ReplCommand::parse("/new"), Some(ReplCommand::New(None)));
        assert_eq!(
            ReplCommand::parse("/new Ideas"),
            Some(ReplCommand::New(Some("Ideas".to_string())))
        );
    }

    #[test]
    fn test_missing_argument_reports_usage() {
        assert_eq!(
            ReplCommand::parse("/search"),
            Some(ReplCommand::Usage("/search <text>"))
        );
    }

    #[test]
    fn test_aliases() {
        assert_eq!(ReplCommand::parse("/q"), Some(ReplCommand::Quit));
        assert_eq!(ReplCommand::parse("/?"), Some(ReplCommand::Help));
        assert_eq!(ReplCommand::parse("/ls"), Some(ReplCommand::List));
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(
            ReplCommand::parse("/frobnicate now"),
            Some(ReplCommand::Unknown("/frobnicate now".to_string()))
        );
    }
}
