//! Operator command language.
//!
//! One command per line. Blank lines and `#` comments are ignored so the
//! same parser reads interactive input and scripts.

/// A parsed operator command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Exit,
    Help,
    Medicate,
    Feed,
    Status,
    /// First token did not name a command (lowercased).
    Unknown(String),
}

/// Parse one input line. Returns `None` for blank lines and comments.
///
/// Only the first whitespace-separated token is significant; it is matched
/// case-insensitively. Remaining tokens are ignored.
pub fn parse_line(line: &str) -> Option<Command> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let word = line.split_whitespace().next()?.to_lowercase();
    let command = match word.as_str() {
        "exit" | "quit" | "x" | "q" => Command::Exit,
        "help" | "?" => Command::Help,
        "pills" | "meds" | "medication" => Command::Medicate,
        "food" | "feed" => Command::Feed,
        "status" => Command::Status,
        _ => Command::Unknown(word),
    };
    Some(command)
}

/// Help text, one line per command, name padded to a fixed column.
pub const HELP_LINES: [&str; 5] = [
    "exit         Exit the program.",
    "help         Show this help message.",
    "pills        Administer medication.",
    "food         Administer food.",
    "status       Check status of monitored person.",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_and_comment_lines() {
        assert_eq!(parse_line(""), None);
        assert_eq!(parse_line("   \t "), None);
        assert_eq!(parse_line("# feed the patient"), None);
        assert_eq!(parse_line("   #status"), None);
    }

    #[test]
    fn test_aliases() {
        for word in ["exit", "quit", "x", "q"] {
            assert_eq!(parse_line(word), Some(Command::Exit));
        }
        for word in ["help", "?"] {
            assert_eq!(parse_line(word), Some(Command::Help));
        }
        for word in ["pills", "meds", "medication"] {
            assert_eq!(parse_line(word), Some(Command::Medicate));
        }
        for word in ["food", "feed"] {
            assert_eq!(parse_line(word), Some(Command::Feed));
        }
        assert_eq!(parse_line("status"), Some(Command::Status));
    }

    #[test]
    fn test_case_whitespace_and_extra_args() {
        assert_eq!(parse_line("  FEED  "), Some(Command::Feed));
        assert_eq!(parse_line("Status now please"), Some(Command::Status));
        assert_eq!(parse_line("\tmeds\t2"), Some(Command::Medicate));
    }

    #[test]
    fn test_unknown_command_lowercased() {
        assert_eq!(
            parse_line("Dance wildly"),
            Some(Command::Unknown("dance".to_string()))
        );
    }

    #[test]
    fn test_help_lines_aligned() {
        for line in HELP_LINES {
            assert_eq!(&line[12..13], " ");
            assert_ne!(&line[13..14], " ");
        }
    }
}
