use derive_more::{Deref, From};
use peacock::Transition;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Child indices leading from the root to a node; empty for the root itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, From, Deref)]
pub struct NodePath(Vec<usize>);

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("root");
        }
        let parts: Vec<String> = self.0.iter().map(usize::to_string).collect();
        f.write_str(&parts.join("."))
    }
}

impl FromStr for NodePath {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("root") {
            return Ok(Self::default());
        }
        s.split('.')
            .map(|part| part.parse::<usize>())
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
            .map_err(|_| CommandError::BadPath(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Toggle(NodePath),
    Open(NodePath, Transition),
    Close(NodePath, Transition),
    Cancel(NodePath),
    Angles(NodePath, f64, f64),
    Radius(NodePath, i32),
    Dump,
    /// Holds further commands until every tween has settled.
    Wait,
    Quit,
}

#[derive(Debug, Error, PartialEq)]
pub enum CommandError {
    #[error("empty line")]
    Empty,
    #[error("unknown command '{0}'")]
    Unknown(String),
    #[error("'{command}' needs a {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },
    #[error("'{0}' is not a node path (try 'root' or '0.2')")]
    BadPath(String),
    #[error("'{0}' is not a number")]
    BadNumber(String),
    #[error("unexpected '{0}'")]
    Trailing(String),
}

fn number<T: FromStr>(
    token: Option<&str>,
    command: &'static str,
    argument: &'static str,
) -> Result<T, CommandError> {
    let token = token.ok_or(CommandError::MissingArgument { command, argument })?;
    token
        .parse()
        .map_err(|_| CommandError::BadNumber(token.to_string()))
}

fn path(token: Option<&str>, command: &'static str) -> Result<NodePath, CommandError> {
    token
        .ok_or(CommandError::MissingArgument {
            command,
            argument: "node path",
        })?
        .parse()
}

fn transition(token: Option<&str>) -> Result<Transition, CommandError> {
    match token {
        None => Ok(Transition::Animated),
        Some(t) if t.eq_ignore_ascii_case("instant") => Ok(Transition::Instant),
        Some(t) if t.eq_ignore_ascii_case("animated") => Ok(Transition::Animated),
        Some(t) => Err(CommandError::Trailing(t.to_string())),
    }
}

impl FromStr for Command {
    type Err = CommandError;

    /// Lines look like `toggle 0.1`, `open root instant` or `angles 0 90 180`.
    /// Anything after a `#` is a comment.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.split('#').next().unwrap_or_default();
        let mut tokens = line.split_whitespace();
        let Some(name) = tokens.next() else {
            return Err(CommandError::Empty);
        };

        let command = match name.to_ascii_lowercase().as_str() {
            "toggle" => Self::Toggle(path(tokens.next(), "toggle")?),
            "open" => Self::Open(path(tokens.next(), "open")?, transition(tokens.next())?),
            "close" => Self::Close(path(tokens.next(), "close")?, transition(tokens.next())?),
            "cancel" => Self::Cancel(path(tokens.next(), "cancel")?),
            "angles" => Self::Angles(
                path(tokens.next(), "angles")?,
                number(tokens.next(), "angles", "start angle")?,
                number(tokens.next(), "angles", "end angle")?,
            ),
            "radius" => Self::Radius(
                path(tokens.next(), "radius")?,
                number(tokens.next(), "radius", "radius")?,
            ),
            "dump" => Self::Dump,
            "wait" => Self::Wait,
            "quit" | "exit" => Self::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };

        match tokens.next() {
            Some(extra) => Err(CommandError::Trailing(extra.to_string())),
            None => Ok(command),
        }
    }
}
