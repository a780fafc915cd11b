//! Command-line parsing for the client loop.

use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List agents, optionally filtered by free text
    Agents(Option<String>),
    /// Jump to a page of the last agent listing
    Page(usize),
    Add(usize),
    Scale(usize),
    Reset,
    Copy,
    Export(Option<PathBuf>),
    Clear,
    Analytics(bool),
    Diagnostics,
    Help,
    Quit,
    /// Anything that is not a command goes to the assistant
    Chat(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("Usage: {0}")]
    Usage(&'static str),
    #[error("Unknown command: {0} (try /help)")]
    Unknown(String),
}

pub const HELP: &str = "\
/agents [query]      list agents matching free text
/page <n>            show page n of the last listing
/add <n>             append n generated agents
/scale <n>           resize the roster to exactly n agents
/reset               empty the roster
/copy                print the last user or assistant message
/export [dir]        write the transcript as JSON
/clear               clear the transcript
/analytics on|off    toggle analytics events
/diag                print diagnostics
/quit                exit
anything else        send to the assistant";

/// Parse one input line. Blank lines yield `Ok(None)`.
pub fn parse(line: &str) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    if !line.starts_with('/') {
        return Ok(Some(Command::Chat(line.to_string())));
    }

    let (name, rest) = match line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (line, ""),
    };
    let arg = (!rest.is_empty()).then(|| rest.to_string());

    let command = match name {
        "/agents" => Command::Agents(arg),
        "/page" => Command::Page(count(rest, "/page <n>")?),
        "/add" => Command::Add(count(rest, "/add <n>")?),
        "/scale" => Command::Scale(count(rest, "/scale <n>")?),
        "/reset" => Command::Reset,
        "/copy" => Command::Copy,
        "/export" => Command::Export(arg.map(PathBuf::from)),
        "/clear" => Command::Clear,
        "/analytics" => match rest {
            "on" => Command::Analytics(true),
            "off" => Command::Analytics(false),
            _ => return Err(CommandError::Usage("/analytics on|off")),
        },
        "/diag" => Command::Diagnostics,
        "/help" => Command::Help,
        "/quit" | "/exit" => Command::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}

fn count(arg: &str, usage: &'static str) -> Result<usize, CommandError> {
    match arg.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(CommandError::Usage(usage)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_chat() {
        assert_eq!(
            parse("  how risky is G1?  ").unwrap(),
            Some(Command::Chat("how risky is G1?".to_string()))
        );
        assert_eq!(parse("   ").unwrap(), None);
    }

    #[test]
    fn test_agents_query_keeps_spaces() {
        assert_eq!(
            parse("/agents Red Team").unwrap(),
            Some(Command::Agents(Some("Red Team".to_string())))
        );
        assert_eq!(parse("/agents").unwrap(), Some(Command::Agents(None)));
    }

    #[test]
    fn test_counts_must_be_positive() {
        assert_eq!(parse("/add 5").unwrap(), Some(Command::Add(5)));
        assert_eq!(parse("/scale 12").unwrap(), Some(Command::Scale(12)));
        assert_eq!(parse("/add 0"), Err(CommandError::Usage("/add <n>")));
        assert_eq!(parse("/page x"), Err(CommandError::Usage("/page <n>")));
        assert!(parse("/scale").is_err());
    }

    #[test]
    fn test_analytics_toggle() {
        assert_eq!(parse("/analytics on").unwrap(), Some(Command::Analytics(true)));
        assert_eq!(parse("/analytics off").unwrap(), Some(Command::Analytics(false)));
        assert!(parse("/analytics maybe").is_err());
    }

    #[test]
    fn test_export_dir() {
        assert_eq!(parse("/export").unwrap(), Some(Command::Export(None)));
        assert_eq!(
            parse("/export /tmp/out").unwrap(),
            Some(Command::Export(Some(PathBuf::from("/tmp/out"))))
        );
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(
            parse("/launch"),
            Err(CommandError::Unknown("/launch".to_string()))
        );
    }
}
