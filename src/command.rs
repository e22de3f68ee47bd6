//! Rendering a [`RegistryDiff`] as `reg ADD` / `reg DELETE` commands.
//!
//! A diff is asymmetric in what it asks for: [`ChangesFor::One`] produces the
//! commands that turn snapshot 1 into snapshot 2, [`ChangesFor::Two`] the
//! commands that turn snapshot 2 back into snapshot 1.

use crate::diff::RegistryDiff;
use crate::error::{RegistryError, Result};
use crate::registry::{DataName, Key, Registry, RegistryRoot, Value};
use crate::utils::escape_string;
use crate::value::DataType;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, instrument};

/// Which snapshot the generated commands are meant to be applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChangesFor {
    /// Changes that make snapshot 1 look like snapshot 2.
    #[default]
    One,
    /// Changes that make snapshot 2 look like snapshot 1.
    Two,
}

impl fmt::Display for ChangesFor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangesFor::One => f.write_str("ChangesFor1"),
            ChangesFor::Two => f.write_str("ChangesFor2"),
        }
    }
}

impl FromStr for ChangesFor {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "1" => Ok(ChangesFor::One),
            "2" => Ok(ChangesFor::Two),
            _ => Err(RegistryError::invalid_data(format!(
                "invalid changesFor ('1' or '2'): '{}'",
                s
            ))),
        }
    }
}

/// Options for [`generate_commands`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommandOptions {
    /// Root the snapshot keys are relative to.
    pub root: RegistryRoot,
    /// Direction of the generated changes.
    pub changes_for: ChangesFor,
    /// Append `/f` to every command.
    pub force: bool,
}

/// Command verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    /// `reg ADD`
    Add,
    /// `reg DELETE`
    Delete,
}

impl Verb {
    /// Returns the verb as passed to `reg`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Add => "ADD",
            Verb::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `reg` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    verb: Verb,
    key: String,
    name: Option<DataName>,
    data: Option<(DataType, String)>,
    force: bool,
}

impl Command {
    /// Returns the verb.
    pub fn verb(&self) -> Verb {
        self.verb
    }

    /// Returns the escaped, fully qualified key argument.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the targeted value name, if any.
    pub fn name(&self) -> Option<&DataName> {
        self.name.as_ref()
    }

    /// Returns the `/t` and `/d` arguments, if any.
    pub fn data(&self) -> Option<(DataType, &str)> {
        self.data.as_ref().map(|(t, d)| (*t, d.as_str()))
    }

    /// Returns true if `/f` is appended.
    pub fn force(&self) -> bool {
        self.force
    }

    /// Returns the argument list, starting with the verb.
    ///
    /// The program name (`reg`) is not included.
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![self.verb.to_string(), self.key.clone()];
        match &self.name {
            Some(DataName::Default) => args.push("/ve".to_string()),
            Some(DataName::Named(name)) => {
                args.push("/v".to_string());
                args.push(escape_string(name));
            }
            None => {}
        }
        if let Some((data_type, data)) = &self.data {
            args.push("/t".to_string());
            args.push(data_type.command_name().to_string());
            args.push("/d".to_string());
            args.push(data.clone());
        }
        if self.force {
            args.push("/f".to_string());
        }
        args
    }
}

impl fmt::Display for Command {
    /// Renders a shell-style line with quoted operands, e.g.
    /// `reg ADD "HKEY_LOCAL_MACHINE\\Key" /v "Name" /t REG_DWORD /d "1" /f`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "reg {} \"{}\"", self.verb, self.key)?;
        match &self.name {
            Some(DataName::Default) => f.write_str(" /ve")?,
            Some(DataName::Named(name)) => write!(f, " /v \"{}\"", escape_string(name))?,
            None => {}
        }
        if let Some((data_type, data)) = &self.data {
            write!(f, " /t {} /d \"{}\"", data_type.command_name(), data)?;
        }
        if self.force {
            f.write_str(" /f")?;
        }
        Ok(())
    }
}

/// Renders `diff` as an ordered list of commands.
///
/// ADD commands for keys only on the target side come first, then DELETE
/// commands for keys only on the source side, then ADD commands for changed
/// names. Within each group keys and names are in lexicographic order.
///
/// # Examples
///
/// ```rust
/// use wine_regdiff::{diff, generate_commands, CommandOptions, Data, Registry, Value};
///
/// let reg1 = Registry::new();
/// let reg2 = Registry::new().with("Key", Value::new().with("V", Data::Dword(1)));
/// let commands = generate_commands(&diff(&reg1, &reg2).unwrap(), &CommandOptions::default());
///
/// assert_eq!(commands.len(), 1);
/// assert_eq!(
///     commands[0].args(),
///     vec!["ADD", "HKEY_LOCAL_MACHINE\\\\Key", "/v", "V", "/t", "REG_DWORD", "/d", "1"]
/// );
/// ```
#[instrument(skip(diff), fields(root = %options.root, changes_for = %options.changes_for))]
pub fn generate_commands(diff: &RegistryDiff, options: &CommandOptions) -> Vec<Command> {
    let (add, delete) = match options.changes_for {
        ChangesFor::One => (&diff.registry2_only, &diff.registry1_only),
        ChangesFor::Two => (&diff.registry1_only, &diff.registry2_only),
    };

    let mut commands = Vec::new();
    append_partition(&mut commands, add, Verb::Add, options);
    append_partition(&mut commands, delete, Verb::Delete, options);
    for (key, changed) in &diff.registry_changed {
        let value = match options.changes_for {
            ChangesFor::One => &changed.value2,
            ChangesFor::Two => &changed.value1,
        };
        commands.extend(key_commands(key, value, Verb::Add, options));
    }

    debug!(count = commands.len(), "Generated commands");
    commands
}

fn append_partition(commands: &mut Vec<Command>, registry: &Registry, verb: Verb, options: &CommandOptions) {
    for (key, value) in registry {
        commands.extend(key_commands(key, value, verb, options));
    }
}

/// Commands for one key: a single key-level command when `value` is empty,
/// otherwise one per name.
fn key_commands(key: &Key, value: &Value, verb: Verb, options: &CommandOptions) -> Vec<Command> {
    let key_name = escape_string(&format!("{}\\{}", options.root, key));
    let command = |name: Option<DataName>, data: Option<(DataType, String)>| Command {
        verb,
        key: key_name.clone(),
        name,
        data,
        force: options.force,
    };

    if value.is_empty() {
        return vec![command(None, None)];
    }
    value
        .iter()
        .map(|(name, data)| {
            let data = match verb {
                Verb::Add => Some((data.data_type(), data.command_string())),
                Verb::Delete => None,
            };
            command(Some(name.clone()), data)
        })
        .collect()
}
