//! REPL commands
//!
//! A line starting with `/` is a command; anything else is sent as a chat
//! turn.

use crate::codegen::export::{sanitize_filename, write_code};
use crate::codegen::CodegenError;
use crate::config::ClientConfig;
use crate::display::DisplaySurface;
use crate::runtime::ChatRuntime;
use crate::state_machine::TransitionError;
use std::path::PathBuf;
use thiserror::Error;

const DEFAULT_EXPORT_FILE: &str = "conversation.html";

pub const HELP: &str = "\
Commands:
  /clear                  start a new conversation
  /code <prompt>          generate a single piece of code
  /save [n] [filename]    save code block #n, or the last generated code
  /export [file.html]     export the conversation as HTML
  /help                   show this help
  /quit                   exit
Anything else is sent to the assistant.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Chat(String),
    Clear,
    Code(String),
    Save {
        /// 1-based code block number as shown on screen
        index: Option<usize>,
        filename: Option<String>,
    },
    Export(Option<String>),
    Help,
    Quit,
}

/// What the REPL should do after a command ran
#[derive(Debug, PartialEq, Eq)]
pub enum Response {
    Continue,
    Message(String),
    Quit,
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Unknown command {0}, try /help")]
    Unknown(String),
    #[error("Code blocks are numbered from 1")]
    ZeroIndex,
    #[error("No code block #{index}, {available} shown so far")]
    NoSuchBlock { index: usize, available: usize },
    #[error("Nothing to save yet, generate code with /code first")]
    NothingToSave,
    #[error(transparent)]
    Busy(#[from] TransitionError),
    #[error(transparent)]
    Codegen(CodegenError),
    #[error("Could not write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let line = line.trim();
        let Some(rest) = line.strip_prefix('/') else {
            return Ok(Command::Chat(line.to_string()));
        };

        let (name, args) = rest
            .split_once(char::is_whitespace)
            .map_or((rest, ""), |(name, args)| (name, args.trim()));

        match name.to_lowercase().as_str() {
            "clear" | "new" => Ok(Command::Clear),
            "code" => Ok(Command::Code(args.to_string())),
            "save" => parse_save(args),
            "export" => Ok(Command::Export(
                Some(args.to_string()).filter(|file| !file.is_empty()),
            )),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            _ => Err(CommandError::Unknown(format!("/{name}"))),
        }
    }
}

fn parse_save(args: &str) -> Result<Command, CommandError> {
    let mut words = args.split_whitespace();
    let first = words.next();
    let (index, filename) = match first.map(str::parse::<usize>) {
        Some(Ok(0)) => return Err(CommandError::ZeroIndex),
        Some(Ok(index)) => (Some(index), words.next()),
        Some(Err(_)) => (None, first),
        None => (None, None),
    };
    Ok(Command::Save {
        index,
        filename: filename.map(str::to_string),
    })
}

/// Run one command against the runtime
pub async fn execute<D: DisplaySurface>(
    runtime: &mut ChatRuntime<D>,
    config: &ClientConfig,
    command: Command,
) -> Result<Response, CommandError> {
    match command {
        Command::Chat(text) => {
            runtime.submit(&text)?;
            Ok(Response::Continue)
        }
        Command::Clear => {
            runtime.clear();
            Ok(Response::Continue)
        }
        Command::Code(prompt) => match runtime.generate_code(&prompt).await {
            // Exchange failures are already on screen as a notice
            Ok(_) | Err(CodegenError::Exchange(_)) => Ok(Response::Continue),
            Err(e) => Err(CommandError::Codegen(e)),
        },
        Command::Save { index, filename } => save(runtime, config, index, filename.as_deref()),
        Command::Export(file) => export(runtime, config, file.as_deref()),
        Command::Help => Ok(Response::Message(HELP.to_string())),
        Command::Quit => Ok(Response::Quit),
    }
}

fn save<D: DisplaySurface>(
    runtime: &ChatRuntime<D>,
    config: &ClientConfig,
    index: Option<usize>,
    filename: Option<&str>,
) -> Result<Response, CommandError> {
    let (code, extension, default_name) = match index {
        Some(index) => {
            let blocks = runtime.display().transcript().code_blocks();
            let available = blocks.len();
            let block = index
                .checked_sub(1)
                .and_then(|i| blocks.into_iter().nth(i))
                .ok_or(CommandError::NoSuchBlock { index, available })?;
            let default_name = format!("code_block_{index}.{}", block.extension);
            (block.code, block.extension, default_name)
        }
        None => match runtime.session().last_code() {
            Some(generated) => (
                generated.code.clone(),
                generated.extension.clone(),
                generated.suggested_filename(),
            ),
            None => {
                let block = runtime
                    .display()
                    .transcript()
                    .code_blocks()
                    .pop()
                    .ok_or(CommandError::NothingToSave)?;
                let default_name = format!("code_block.{}", block.extension);
                (block.code, block.extension, default_name)
            }
        },
    };

    let filename = sanitize_filename(filename.unwrap_or(&default_name), &extension);
    let path = write_code(&config.export_dir, &filename, &code).map_err(|source| {
        CommandError::Write {
            path: config.export_dir.join(&filename),
            source,
        }
    })?;
    Ok(Response::Message(format!("Saved {}", path.display())))
}

fn export<D: DisplaySurface>(
    runtime: &ChatRuntime<D>,
    config: &ClientConfig,
    file: Option<&str>,
) -> Result<Response, CommandError> {
    let filename = sanitize_filename(file.unwrap_or(DEFAULT_EXPORT_FILE), "html");
    let html = runtime.display().transcript().to_html("codechat conversation");
    let path = write_code(&config.export_dir, &filename, &html).map_err(|source| {
        CommandError::Write {
            path: config.export_dir.join(&filename),
            source,
        }
    })?;
    Ok(Response::Message(format!("Exported {}", path.display())))
}
