use crate::alias::AliasTable;
use crate::env::Environment;
use anyhow::Result;
use std::io::Write;

/// The result of executing one command.
///
/// The interpreter loop terminates exactly when `Stop` is produced; every
/// builtin except `exit` and every external command yields `Continue`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Continue,
    Stop,
}

/// Mutable interpreter state handed to builtin commands.
pub struct ShellState {
    /// Variables and working directory, inherited by spawned children.
    pub env: Environment,
    /// User-defined aliases.
    pub aliases: AliasTable,
    /// `(name, help)` of every registered builtin, in registration order.
    /// Filled by the interpreter so `help` can list the surface.
    pub help_topics: Vec<(&'static str, &'static str)>,
}

impl ShellState {
    /// Captures the process environment and wraps the provided alias table.
    pub fn new(aliases: AliasTable) -> Self {
        Self {
            env: Environment::new(),
            aliases,
            help_topics: Vec::new(),
        }
    }
}

/// Object-safe trait for any command the dispatcher can run in-process.
///
/// Implemented by builtins via a blanket impl in [`crate::builtin`].
pub trait ExecutableCommand {
    /// Executes the command against the shell state, writing normal output
    /// to `stdout`. Returns the loop-control [`Signal`].
    fn execute(self: Box<Self>, state: &mut ShellState, stdout: &mut dyn Write) -> Result<Signal>;
}

/// Factory that tries to create a command from a name and its arguments.
///
/// Returns `None` when the factory doesn't recognize the `name`. The
/// `name`/`help` accessors let the registry be listed without executing
/// anything.
pub trait CommandFactory {
    /// Canonical command name, e.g. "cd".
    fn name(&self) -> &'static str;

    /// One-line help text shown by the `help` builtin.
    fn help(&self) -> &'static str;

    /// Attempt to create a command instance for the provided name and arguments.
    fn try_create(&self, name: &str, args: &[&str]) -> Option<Box<dyn ExecutableCommand>>;
}
