//! Line-oriented terminal front end.
//!
//! [`Command`] is what a single typed line means when no dialog is open;
//! [`Console`] feeds lines to a [`TodoSession`] and returns the text to print.

use crate::view::{render_collection, render_list, Dialog, TodoSession, ViewError};
use std::str::FromStr;
use thiserror::Error;

/// Help text listing every command
pub const HELP: &str = "\
Commands:
  add <title>    add a new todo
  like <n>       like or unlike todo number n
  save <n>       save or unsave todo number n
  edit <n>       change the title of todo number n
  delete <n>     delete todo number n (asks for confirmation)
  list           show all todos
  liked          show liked todos
  saved          show saved todos
  help           show this help
  quit           leave
";

/// A command typed at the prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Add a todo with this title
    Add(String),
    /// Toggle liked on the n-th todo
    Like(usize),
    /// Toggle saved on the n-th todo
    Save(usize),
    /// Open the edit dialog for the n-th todo
    Edit(usize),
    /// Ask to delete the n-th todo
    Delete(usize),
    /// Show the whole list
    List,
    /// Show the liked view
    Liked,
    /// Show the saved view
    Saved,
    /// Show help
    Help,
    /// Leave the program
    Quit,
}

/// Errors produced while parsing a [`Command`]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandParseError {
    /// Nothing was typed
    #[error("Empty command")]
    Empty,

    /// The first word is not a command
    #[error("Unknown command `{0}`, type `help` for a list")]
    Unknown(String),

    /// The command needs a todo number
    #[error("`{0}` needs a todo number")]
    MissingNumber(&'static str),

    /// The todo number is not a positive integer
    #[error("`{0}` is not a todo number")]
    InvalidNumber(String),
}

impl FromStr for Command {
    type Err = CommandParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(word, rest)| (word, rest.trim()));

        match word.to_ascii_lowercase().as_str() {
            "" => Err(CommandParseError::Empty),
            "add" => Ok(Self::Add(rest.to_string())),
            "like" => number("like", rest).map(Self::Like),
            "save" => number("save", rest).map(Self::Save),
            "edit" => number("edit", rest).map(Self::Edit),
            "delete" | "rm" => number("delete", rest).map(Self::Delete),
            "list" | "ls" => Ok(Self::List),
            "liked" => Ok(Self::Liked),
            "saved" => Ok(Self::Saved),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" => Ok(Self::Quit),
            _ => Err(CommandParseError::Unknown(word.to_string())),
        }
    }
}

fn number(command: &'static str, arg: &str) -> Result<usize, CommandParseError> {
    if arg.is_empty() {
        return Err(CommandParseError::MissingNumber(command));
    }
    arg.parse::<usize>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| CommandParseError::InvalidNumber(arg.to_string()))
}

/// What the caller should do after a line was handled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Print this text and read the next line
    Continue(String),
    /// Stop reading
    Quit,
}

/// Interprets typed lines against a [`TodoSession`]
#[derive(Debug)]
pub struct Console {
    session: TodoSession,
}

impl Console {
    /// Creates a console driving `session`
    #[must_use]
    pub const fn new(session: TodoSession) -> Self {
        Self { session }
    }

    /// The session behind this console
    #[must_use]
    pub const fn session(&self) -> &TodoSession {
        &self.session
    }

    /// Prompt to show before reading the next line
    #[must_use]
    pub fn prompt(&self) -> &'static str {
        match self.session.dialog() {
            Dialog::Closed => "> ",
            Dialog::EditTitle { .. } => "new title> ",
            Dialog::ConfirmDelete { .. } => "delete? [y/N]> ",
        }
    }

    /// Handles one typed line
    pub async fn handle_line(&mut self, line: &str) -> Outcome {
        let result = match self.session.dialog() {
            Dialog::EditTitle { .. } => self.handle_edit(line).await,
            Dialog::ConfirmDelete { .. } => self.handle_confirm(line).await,
            Dialog::Closed => match line.parse::<Command>() {
                Ok(Command::Quit) => return Outcome::Quit,
                Ok(command) => self.run(command).await,
                Err(CommandParseError::Empty) => Ok(String::new()),
                Err(error) => Ok(format!("{error}\n")),
            },
        };

        Outcome::Continue(result.unwrap_or_else(|error| format!("{error}\n")))
    }

    async fn run(&mut self, command: Command) -> Result<String, ViewError> {
        tracing::debug!(?command, "Running command");

        match command {
            Command::Add(title) => {
                self.session.set_draft(title);
                self.session.submit_draft().await?;
                Ok(self.list())
            },
            Command::Like(n) => {
                let id = self.session.id_at(n)?;
                self.session.toggle_liked(id).await?;
                Ok(self.list())
            },
            Command::Save(n) => {
                let id = self.session.id_at(n)?;
                self.session.toggle_saved(id).await?;
                Ok(self.list())
            },
            Command::Edit(n) => {
                let id = self.session.id_at(n)?;
                self.session.begin_edit(id)?;
                let title = self.title_of(n);
                Ok(format!(
                    "Editing \"{title}\". Type the new title, or `cancel` to keep it.\n"
                ))
            },
            Command::Delete(n) => {
                let id = self.session.id_at(n)?;
                self.session.request_delete(id)?;
                let title = self.title_of(n);
                Ok(format!("Delete \"{title}\"? [y/N]\n"))
            },
            Command::List => Ok(self.list()),
            Command::Liked => Ok(render_collection("Liked", self.session.snapshot().liked())),
            Command::Saved => Ok(render_collection("Saved", self.session.snapshot().saved())),
            Command::Help => Ok(HELP.to_string()),
            Command::Quit => Ok(String::new()),
        }
    }

    async fn handle_edit(&mut self, line: &str) -> Result<String, ViewError> {
        if line.trim().eq_ignore_ascii_case("cancel") {
            self.session.cancel_edit()?;
            return Ok("Edit cancelled.\n".to_string());
        }

        self.session.set_edit_value(line.trim())?;
        self.session.submit_edit().await?;
        Ok(self.list())
    }

    async fn handle_confirm(&mut self, line: &str) -> Result<String, ViewError> {
        let answer = line.trim().to_ascii_lowercase();
        if answer == "y" || answer == "yes" {
            self.session.confirm_delete().await?;
            Ok(self.list())
        } else {
            self.session.cancel_delete()?;
            Ok("Delete cancelled.\n".to_string())
        }
    }

    fn list(&self) -> String {
        render_list(&self.session.snapshot())
    }

    fn title_of(&self, position: usize) -> String {
        position
            .checked_sub(1)
            .and_then(|index| {
                self.session
                    .snapshot()
                    .todos()
                    .get(index)
                    .map(|todo| todo.title.clone())
            })
            .unwrap_or_default()
    }
}
