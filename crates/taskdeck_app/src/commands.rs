use taskdeck_core::{LogViewport, Msg, TaskAction};
use thiserror::Error;

pub const HELP: &str = "\
commands:
  refresh | r                 reload the task list
  start <id> | pause <id>     resume or pause a task
  delete <id>                 delete a task
  create <url> <name...>      create a task
  logs <id>                   open the log viewer
  relog                       reload the open log
  close                       close the log viewer
  raw <id>                    print the raw log address
  scroll <top> <visible>      report the log viewport (lines)
  reconnect                   reopen the event stream
  help                        show this text
  quit                        exit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Dispatch(Msg),
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unknown command {0:?}; type `help`")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("not a line number: {0:?}")]
    BadNumber(String),
}

/// Parses one line of user input. Blank lines yield `None`.
pub fn parse(line: &str) -> Result<Option<Command>, CommandError> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };
    let rest: Vec<&str> = words.collect();

    let command = match (head, rest.as_slice()) {
        ("refresh" | "r", []) => Command::Dispatch(Msg::RefreshRequested),
        ("start", [id]) => action(id, TaskAction::Start),
        ("pause", [id]) => action(id, TaskAction::Pause),
        ("delete", [id]) => action(id, TaskAction::Delete),
        ("start", _) => return Err(CommandError::Usage("start <id>")),
        ("pause", _) => return Err(CommandError::Usage("pause <id>")),
        ("delete", _) => return Err(CommandError::Usage("delete <id>")),
        ("create", [url, name @ ..]) if !name.is_empty() => Command::Dispatch(Msg::CreateSubmitted {
            url: (*url).to_string(),
            name: name.join(" "),
        }),
        ("create", _) => return Err(CommandError::Usage("create <url> <name...>")),
        ("logs", [id]) => Command::Dispatch(Msg::LogOpened {
            task_id: (*id).to_string(),
        }),
        ("logs", _) => return Err(CommandError::Usage("logs <id>")),
        ("relog", []) => Command::Dispatch(Msg::LogRefreshRequested),
        ("close", []) => Command::Dispatch(Msg::LogClosed),
        ("raw", [id]) => Command::Dispatch(Msg::RawLogRequested {
            task_id: (*id).to_string(),
        }),
        ("raw", _) => return Err(CommandError::Usage("raw <id>")),
        ("scroll", [top, visible]) => Command::Dispatch(Msg::LogViewportChanged(LogViewport {
            top_line: number(top)?,
            visible_lines: number(visible)?,
        })),
        ("scroll", _) => return Err(CommandError::Usage("scroll <top> <visible>")),
        ("reconnect", []) => Command::Dispatch(Msg::ConnectRequested),
        ("help" | "?", _) => Command::Help,
        ("quit" | "exit" | "q", _) => Command::Quit,
        _ => return Err(CommandError::Unknown(line.trim().to_string())),
    };
    Ok(Some(command))
}

fn action(id: &str, action: TaskAction) -> Command {
    Command::Dispatch(Msg::TaskActionRequested {
        task_id: id.to_string(),
        action,
    })
}

fn number(word: &str) -> Result<usize, CommandError> {
    word.parse()
        .map_err(|_| CommandError::BadNumber(word.to_string()))
}
