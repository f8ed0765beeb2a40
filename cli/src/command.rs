//! Line commands typed at the prompt and the actions they map to.

use std::str::FromStr;

use thiserror::Error;
use todo_core::{Action, FilterMode, TodoId, TodoState};

pub const HELP: &str = "\
commands:
  add <title>         create a todo
  toggle <id>         flip completed
  rm <id>             delete
  edit <id>           enter edit mode for a title
  type <text>         replace the edit buffer
  save | blur | esc   leave edit mode
  rename <id> <title> update a title directly
  all                 toggle all
  clear               clear completed
  filter <all|active|completed>
  dismiss             hide the error
  show | help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add(String),
    Toggle(TodoId),
    Delete(TodoId),
    Edit(TodoId),
    Type(String),
    Save,
    Blur,
    Escape,
    Rename(TodoId, String),
    ToggleAll,
    ClearCompleted,
    Filter(FilterMode),
    Dismiss,
    Show,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command: {0} (try `help`)")]
    Unknown(String),
    #[error("`{0}` needs a todo id")]
    MissingId(&'static str),
    #[error("not a todo id: {0}")]
    BadId(String),
    #[error("{0}")]
    BadFilter(String),
}

fn parse_id(name: &'static str, arg: Option<&str>) -> Result<TodoId, CommandError> {
    let arg = arg.ok_or(CommandError::MissingId(name))?;
    arg.parse().map_err(|_| CommandError::BadId(arg.to_string()))
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim_start();
        let (word, rest) = line.split_once(' ').unwrap_or((line, ""));
        let first_arg = rest.split_whitespace().next();
        match word.trim_end() {
            "add" => Ok(Command::Add(rest.to_string())),
            "toggle" => parse_id("toggle", first_arg).map(Command::Toggle),
            "rm" | "delete" => parse_id("rm", first_arg).map(Command::Delete),
            "edit" => parse_id("edit", first_arg).map(Command::Edit),
            "type" => Ok(Command::Type(rest.to_string())),
            "save" => Ok(Command::Save),
            "blur" => Ok(Command::Blur),
            "esc" | "escape" => Ok(Command::Escape),
            "rename" => {
                let (id, title) = rest.trim_start().split_once(' ').unwrap_or((rest.trim(), ""));
                let id = parse_id("rename", (!id.is_empty()).then_some(id))?;
                Ok(Command::Rename(id, title.to_string()))
            }
            "all" => Ok(Command::ToggleAll),
            "clear" => Ok(Command::ClearCompleted),
            "filter" => first_arg
                .unwrap_or("all")
                .parse()
                .map(Command::Filter)
                .map_err(CommandError::BadFilter),
            "dismiss" => Ok(Command::Dismiss),
            "" | "show" | "ls" => Ok(Command::Show),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

impl Command {
    /// Actions a front end would dispatch for this input. `Show`, `Help` and
    /// `Quit` are handled by the prompt itself and map to nothing.
    pub fn into_actions(self, state: &TodoState) -> Vec<Action> {
        match self {
            Command::Add(title) => vec![Action::SetDraft(title), Action::Add],
            Command::Toggle(id) => {
                let completed = state
                    .todos()
                    .iter()
                    .find(|t| t.id == id)
                    .is_some_and(|t| !t.completed);
                vec![Action::ToggleStatus { id, completed }]
            }
            Command::Delete(id) => vec![Action::Delete(id)],
            Command::Edit(id) => vec![Action::StartEdit(id)],
            Command::Type(text) => vec![Action::EditInput(text)],
            Command::Save => vec![Action::SubmitEdit],
            Command::Blur => vec![Action::BlurEdit],
            Command::Escape => vec![Action::CancelEdit],
            Command::Rename(id, title) => vec![Action::UpdateTitle { id, title }],
            Command::ToggleAll => vec![Action::ToggleAll],
            Command::ClearCompleted => vec![Action::ClearCompleted],
            Command::Filter(mode) => vec![Action::SetFilter(mode)],
            Command::Dismiss => vec![Action::DismissError],
            Command::Show | Command::Help | Command::Quit => Vec::new(),
        }
    }
}
