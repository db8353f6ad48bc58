//! Command scripts
//!
//! A script holds one command per line. Blank lines and lines starting with
//! `#` are skipped. Each command runs against a single
//! `AvlTree<i64, String>` and produces a [`Reply`].

use anyhow::{Context, Result, bail};
use avlbst::AvlTree;
use serde::Serialize;
use std::fmt;
use std::io::Write;

use crate::config::OutputFormat;

/// One parsed script line
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Insert { key: i64, value: String },
    Remove(i64),
    Find(i64),
    Get(i64),
    Print,
    List,
    Check,
    Clear,
}

impl Command {
    const fn mutates(&self) -> bool {
        matches!(self, Self::Insert { .. } | Self::Remove(_) | Self::Clear)
    }
}

/// Parses a single line. Returns `None` for blank and comment lines.
pub fn parse_line(line: &str) -> Result<Option<Command>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let (word, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(word, rest)| (word, rest.trim_start()));

    let command = match word {
        "insert" => {
            let (key, value) = rest
                .split_once(char::is_whitespace)
                .map_or((rest, ""), |(key, value)| (key, value.trim()));
            if key.is_empty() || value.is_empty() {
                bail!("insert takes a key and a value");
            }
            Command::Insert {
                key: parse_key(key)?,
                value: value.to_string(),
            }
        }
        "remove" => Command::Remove(single_key(word, rest)?),
        "find" => Command::Find(single_key(word, rest)?),
        "get" => Command::Get(single_key(word, rest)?),
        "print" => nullary(word, rest, Command::Print)?,
        "list" => nullary(word, rest, Command::List)?,
        "check" => nullary(word, rest, Command::Check)?,
        "clear" => nullary(word, rest, Command::Clear)?,
        other => bail!("unknown command `{other}`"),
    };
    Ok(Some(command))
}

/// Parses a whole script, pairing each command with its 1-based line number.
pub fn parse(source: &str) -> Result<Vec<(usize, Command)>> {
    let mut commands = Vec::new();
    for (index, line) in source.lines().enumerate() {
        let number = index + 1;
        if let Some(command) = parse_line(line).with_context(|| format!("line {number}"))? {
            commands.push((number, command));
        }
    }
    Ok(commands)
}

fn parse_key(text: &str) -> Result<i64> {
    text.parse()
        .with_context(|| format!("invalid key `{text}`"))
}

fn single_key(word: &str, rest: &str) -> Result<i64> {
    match rest.split_whitespace().collect::<Vec<_>>().as_slice() {
        [key] => parse_key(key),
        _ => bail!("{word} takes exactly one key"),
    }
}

fn nullary(word: &str, rest: &str, command: Command) -> Result<Command> {
    if !rest.is_empty() {
        bail!("{word} takes no arguments");
    }
    Ok(command)
}

// =============================================================================
// Replies
// =============================================================================

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub key: i64,
    pub value: String,
}

/// Result of running one command
#[derive(Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Reply {
    Insert {
        key: i64,
        previous: Option<String>,
    },
    Remove {
        key: i64,
        removed: Option<String>,
    },
    Find {
        key: i64,
        node: Option<String>,
        balance: Option<i8>,
    },
    Get {
        key: i64,
        value: Option<String>,
        error: Option<String>,
    },
    Print {
        tree: String,
    },
    List {
        entries: Vec<Entry>,
    },
    Check {
        length: usize,
        height: usize,
        equal_paths: bool,
        violation: Option<String>,
    },
    Clear {
        removed: usize,
    },
}

impl fmt::Display for Reply {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Insert {
                key,
                previous: None,
            } => write!(formatter, "inserted {key}"),
            Self::Insert {
                key,
                previous: Some(previous),
            } => write!(formatter, "replaced {key} (was {previous})"),
            Self::Remove { key, removed: None } => write!(formatter, "{key} not present"),
            Self::Remove {
                key,
                removed: Some(value),
            } => write!(formatter, "removed {key}: {value}"),
            Self::Find {
                key,
                node: Some(node),
                balance,
            } => {
                write!(formatter, "found {key} at {node}")?;
                if let Some(balance) = balance {
                    write!(formatter, " (balance {balance})")?;
                }
                Ok(())
            }
            Self::Find { key, node: None, .. } => write!(formatter, "{key} not found"),
            Self::Get {
                key,
                value: Some(value),
                ..
            } => write!(formatter, "{key} = {value}"),
            Self::Get { key, error, .. } => {
                write!(formatter, "get {key}: {}", error.as_deref().unwrap_or("no value"))
            }
            Self::Print { tree } => formatter.write_str(tree),
            Self::List { entries } if entries.is_empty() => formatter.write_str("(empty)"),
            Self::List { entries } => {
                for (index, entry) in entries.iter().enumerate() {
                    if index > 0 {
                        writeln!(formatter)?;
                    }
                    write!(formatter, "{}: {}", entry.key, entry.value)?;
                }
                Ok(())
            }
            Self::Check {
                violation: Some(violation),
                ..
            } => write!(formatter, "invalid: {violation}"),
            Self::Check {
                length,
                height,
                equal_paths,
                violation: None,
            } => write!(
                formatter,
                "ok: {length} nodes, height {height}, equal paths: {}",
                if *equal_paths { "yes" } else { "no" }
            ),
            Self::Clear { removed } => write!(formatter, "cleared {removed} entries"),
        }
    }
}

/// Writes a reply in the configured format, followed by a newline.
pub fn write_reply<W: Write>(out: &mut W, reply: &Reply, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => writeln!(out, "{reply}")?,
        OutputFormat::Json => {
            serde_json::to_writer(&mut *out, reply).context("Failed to encode reply")?;
            writeln!(out)?;
        }
    }
    Ok(())
}

// =============================================================================
// Session
// =============================================================================

/// A tree plus the options that apply to every command run against it
#[derive(Debug, Default)]
pub struct Session {
    tree: AvlTree<i64, String>,
    verify: bool,
}

impl Session {
    pub fn new(verify: bool) -> Self {
        Self {
            tree: AvlTree::new(),
            verify,
        }
    }

    pub const fn tree(&self) -> &AvlTree<i64, String> {
        &self.tree
    }

    /// Runs one command. With verification enabled, a mutating command that
    /// leaves the tree invalid is an error.
    pub fn execute(&mut self, command: Command) -> Result<Reply> {
        tracing::debug!(?command, "executing");
        let mutates = command.mutates();
        let reply = match command {
            Command::Insert { key, value } => Reply::Insert {
                key,
                previous: self.tree.insert(key, value),
            },
            Command::Remove(key) => Reply::Remove {
                key,
                removed: self.tree.remove(&key),
            },
            Command::Find(key) => Reply::Find {
                key,
                node: self.tree.find_node(&key).map(|id| format!("{id:?}")),
                balance: self.tree.balance_of(&key),
            },
            Command::Get(key) => match self.tree.try_get(&key) {
                Ok(value) => Reply::Get {
                    key,
                    value: Some(value.clone()),
                    error: None,
                },
                Err(error) => Reply::Get {
                    key,
                    value: None,
                    error: Some(error.to_string()),
                },
            },
            Command::Print => Reply::Print {
                tree: self.tree.render(),
            },
            Command::List => Reply::List {
                entries: self
                    .tree
                    .iter()
                    .map(|(key, value)| Entry {
                        key: *key,
                        value: value.clone(),
                    })
                    .collect(),
            },
            Command::Check => Reply::Check {
                length: self.tree.len(),
                height: self.tree.height(),
                equal_paths: self.tree.equal_paths(),
                violation: self.tree.validate().err().map(|violation| violation.to_string()),
            },
            Command::Clear => {
                let removed = self.tree.len();
                self.tree.clear();
                Reply::Clear { removed }
            }
        };
        if self.verify && mutates {
            self.tree
                .validate()
                .context("Tree invariants broken after command")?;
        }
        Ok(reply)
    }
}
