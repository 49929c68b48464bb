//! Line command parsing.

use crate::error::{AppError, AppResult};

pub const HELP: &str = "\
Commands:
  search <query>        filter the symbol universe (empty query shows all)
  suggest               show current suggestions
  add <symbol>          select a symbol exactly as typed (upper-cased)
  pick <input>          select the best universe match for <input>
  remove <symbol>       drop a symbol from the selection
  list                  show the selection
  save                  persist the selection
  start | stop | status control the remote bot
  settings              show settings
  settings save         write settings
  set capital <n>       capital per trade (0 or blank leaves it unset)
  set interval <n>      candle interval in minutes
  set paper on|off      paper trading
  set test on|off       test mode (saved immediately)
  theme                 toggle light/dark
  countdown             time to next candle
  metrics               Prometheus metrics
  help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Empty,
    Search(String),
    Suggest,
    Add(String),
    Pick(String),
    Remove(String),
    List,
    Save,
    Start,
    Stop,
    Status,
    ShowSettings,
    SaveSettings,
    SetCapital(String),
    SetInterval(String),
    SetPaper(bool),
    SetTest(bool),
    Theme,
    Countdown,
    Metrics,
    Help,
    Quit,
}

fn required(verb: &str, arg: &str) -> AppResult<String> {
    if arg.is_empty() {
        return Err(AppError::Command(format!("{verb} needs an argument")));
    }
    Ok(arg.to_string())
}

fn on_off(arg: &str) -> AppResult<bool> {
    match arg.to_ascii_lowercase().as_str() {
        "on" | "true" | "1" => Ok(true),
        "off" | "false" | "0" => Ok(false),
        other => Err(AppError::Command(format!("expected on/off, got '{other}'"))),
    }
}

impl Command {
    pub fn parse(line: &str) -> AppResult<Self> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        let cmd = match verb.to_ascii_lowercase().as_str() {
            "" => Self::Empty,
            "search" | "/" => Self::Search(rest.to_string()),
            "suggest" => Self::Suggest,
            "add" => Self::Add(required("add", rest)?),
            "pick" => Self::Pick(required("pick", rest)?),
            "remove" | "rm" => Self::Remove(required("remove", rest)?),
            "list" | "ls" => Self::List,
            "save" => Self::Save,
            "start" => Self::Start,
            "stop" => Self::Stop,
            "status" => Self::Status,
            "settings" => match rest {
                "" => Self::ShowSettings,
                "save" => Self::SaveSettings,
                other => return Err(AppError::Command(format!("settings {other}"))),
            },
            "set" => {
                let (field, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                let value = value.trim();
                match field {
                    "capital" => Self::SetCapital(value.to_string()),
                    "interval" => Self::SetInterval(value.to_string()),
                    "paper" => Self::SetPaper(on_off(value)?),
                    "test" => Self::SetTest(on_off(value)?),
                    other => {
                        return Err(AppError::Command(format!("unknown setting '{other}'")))
                    }
                }
            }
            "theme" => Self::Theme,
            "countdown" => Self::Countdown,
            "metrics" => Self::Metrics,
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            other => return Err(AppError::Command(format!("unknown command '{other}'"))),
        };
        Ok(cmd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_verbs() {
        assert_eq!(Command::parse("list").unwrap(), Command::List);
        assert_eq!(Command::parse("  START ").unwrap(), Command::Start);
        assert_eq!(Command::parse("").unwrap(), Command::Empty);
        assert_eq!(Command::parse("q").unwrap(), Command::Quit);
    }

    #[test]
    fn test_search_keeps_query_text() {
        assert_eq!(
            Command::parse("search  hdfc bank ").unwrap(),
            Command::Search("hdfc bank".into())
        );
        assert_eq!(Command::parse("search").unwrap(), Command::Search(String::new()));
    }

    #[test]
    fn test_add_requires_argument() {
        assert_eq!(Command::parse("add AAPL").unwrap(), Command::Add("AAPL".into()));
        assert!(matches!(Command::parse("add"), Err(AppError::Command(_))));
    }

    #[test]
    fn test_set_commands() {
        assert_eq!(
            Command::parse("set capital 2500").unwrap(),
            Command::SetCapital("2500".into())
        );
        assert_eq!(Command::parse("set capital").unwrap(), Command::SetCapital(String::new()));
        assert_eq!(Command::parse("set paper on").unwrap(), Command::SetPaper(true));
        assert_eq!(Command::parse("set test OFF").unwrap(), Command::SetTest(false));
        assert!(Command::parse("set test maybe").is_err());
        assert!(Command::parse("set leverage 10").is_err());
    }

    #[test]
    fn test_settings_subcommands() {
        assert_eq!(Command::parse("settings").unwrap(), Command::ShowSettings);
        assert_eq!(Command::parse("settings save").unwrap(), Command::SaveSettings);
        assert!(Command::parse("settings reset").is_err());
    }

    #[test]
    fn test_unknown_command() {
        assert!(matches!(Command::parse("launch"), Err(AppError::Command(_))));
    }
}
