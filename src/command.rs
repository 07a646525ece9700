use std::str::FromStr;

use thiserror::Error;

use crate::language::Language;

// Commands understood by the interactive shell. Templates are referenced either by
// their 1-based position in the list or by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Templates,
    New,
    Edit(String),
    Name(String),
    Content(String),
    Save,
    Cancel,
    Delete(String),
    Select(Option<String>),
    Vars,
    Set(String, String),
    Topic(String),
    Generate,
    Story,
    Write(String),
    Format,
    Board,
    Scenes,
    Image(usize), // 0-based scene index.
    Optimize(String),
    Lang(Language),
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Empty command")]
    Empty,

    #[error("Unknown command: {0}")]
    Unknown(String),

    #[error("Missing {0}")]
    MissingArgument(&'static str),

    #[error("Invalid {0}: {1}")]
    InvalidArgument(&'static str, String),
}

pub const HELP: &str = "\
templates              list templates
new                    start drafting a new template
edit <template>        load a template into the draft
name <text>            set the draft name
content <text>         set the draft content (\\n for line breaks)
save | cancel          save or discard the draft
delete <template>      delete a template
select <template|none> choose the template for story generation
vars                   show the selected template's variables
set <var> <value>      bind a variable
topic <text>           set the story topic
generate               generate a story from the selected template
story                  show the story
write <text>           replace the story text
format                 auto-format the story
board                  generate the storyboard
scenes                 show the storyboard
image <n>              generate the image for scene n
optimize <template>    auto-optimize a template
lang <en|zh>           switch language
quit";

fn required(rest: &str, what: &'static str) -> Result<String, CommandError> {
    if rest.is_empty() {
        Err(CommandError::MissingArgument(what))
    } else {
        Ok(rest.to_string())
    }
}

fn unescape(text: &str) -> String {
    text.replace("\\n", "\n")
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        if line.is_empty() {
            return Err(CommandError::Empty);
        }
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word.to_lowercase().as_str() {
            "help" | "?" => Command::Help,
            "templates" | "ls" => Command::Templates,
            "new" => Command::New,
            "edit" => Command::Edit(required(rest, "template")?),
            "name" => Command::Name(required(rest, "name")?),
            "content" => Command::Content(unescape(&required(rest, "content")?)),
            "save" => Command::Save,
            "cancel" => Command::Cancel,
            "delete" | "rm" => Command::Delete(required(rest, "template")?),
            "select" => match required(rest, "template")?.as_str() {
                "none" => Command::Select(None),
                reference => Command::Select(Some(reference.to_string())),
            },
            "vars" => Command::Vars,
            "set" => {
                let (name, value) = rest
                    .split_once(char::is_whitespace)
                    .map(|(name, value)| (name, value.trim()))
                    .unwrap_or((rest, ""));
                Command::Set(required(name, "variable")?, value.to_string())
            }
            "topic" => Command::Topic(required(rest, "topic")?),
            "generate" => Command::Generate,
            "story" => Command::Story,
            "write" => Command::Write(unescape(rest)),
            "format" => Command::Format,
            "board" => Command::Board,
            "scenes" => Command::Scenes,
            "image" => {
                let scene = required(rest, "scene number")?;
                match scene.parse::<usize>() {
                    Ok(n) if n > 0 => Command::Image(n - 1),
                    _ => return Err(CommandError::InvalidArgument("scene number", scene)),
                }
            }
            "optimize" => Command::Optimize(required(rest, "template")?),
            "lang" => {
                let tag = required(rest, "language")?;
                Command::Lang(
                    Language::from_str(&tag)
                        .map_err(|_| CommandError::InvalidArgument("language", tag))?,
                )
            }
            "quit" | "exit" | "q" => Command::Quit,
            _ => return Err(CommandError::Unknown(word.to_string())),
        };
        Ok(command)
    }
}
