use crate::command::{CommandFactory, ExecutableCommand, ShellState, Signal};
use crate::interpreter::Factory;
use anyhow::{Context, Result, anyhow, bail};
use argh::{EarlyExit, FromArgs};
use std::env;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

/// Built-in commands known to the shell at compile time.
///
/// Builtins are parsed using the [`argh`] crate (`FromArgs`) and executed
/// directly in-process without spawning a child process.
pub(crate) trait BuiltinCommand: Sized + FromArgs {
    /// Canonical name of the command, e.g. "cd" or "alias".
    fn name() -> &'static str;

    /// One-line description shown by `help`.
    fn help() -> &'static str;

    /// Executes the command against the shell state.
    ///
    /// An `Err` is a user-visible failure: it is printed to the error stream
    /// by the dispatch layer and never stops the loop.
    fn execute(self, state: &mut ShellState, stdout: &mut dyn Write) -> Result<Signal>;
}

impl<T: BuiltinCommand> ExecutableCommand for T {
    fn execute(self: Box<Self>, state: &mut ShellState, stdout: &mut dyn Write) -> Result<Signal> {
        match T::execute(*self, state, stdout) {
            Ok(signal) => Ok(signal),
            Err(e) => {
                eprintln!("myshell: {e}");
                Ok(Signal::Continue)
            }
        }
    }
}

/// Adapter for argh early exits: usage errors and `--help` output.
struct InvalidArgs {
    output: String,
    is_error: bool,
}

impl ExecutableCommand for InvalidArgs {
    fn execute(
        self: Box<Self>,
        _state: &mut ShellState,
        stdout: &mut dyn Write,
    ) -> Result<Signal> {
        if self.is_error {
            eprintln!("{}", self.output.trim_end());
        } else {
            writeln!(stdout, "{}", self.output.trim_end())?;
        }
        Ok(Signal::Continue)
    }
}

impl<T: BuiltinCommand + 'static> CommandFactory for Factory<T> {
    fn name(&self) -> &'static str {
        T::name()
    }

    fn help(&self) -> &'static str {
        T::help()
    }

    fn try_create(&self, name: &str, args: &[&str]) -> Option<Box<dyn ExecutableCommand>> {
        if name == T::name() {
            Some(match T::from_args(&[name], args) {
                Ok(cmd) => Box::new(cmd),
                Err(EarlyExit { output, status }) => Box::new(InvalidArgs {
                    output,
                    is_error: status.is_err(),
                }),
            })
        } else {
            None
        }
    }
}

#[derive(FromArgs)]
/// Change the current working directory.
pub struct Cd {
    #[argh(positional)]
    /// directory to switch to; absolute or relative to the current directory
    pub target: String,
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    fn help() -> &'static str {
        "Change directory"
    }

    fn execute(self, state: &mut ShellState, _stdout: &mut dyn Write) -> Result<Signal> {
        let target = PathBuf::from(&self.target);
        let new_dir = if target.is_absolute() {
            target
        } else {
            state.env.current_dir.join(target)
        };

        let canonical = fs::canonicalize(&new_dir)
            .with_context(|| format!("cd: {}", new_dir.display()))?;

        env::set_current_dir(&canonical)
            .with_context(|| format!("cd: can't chdir to {}", canonical.display()))?;
        state.env.current_dir = canonical;
        Ok(Signal::Continue)
    }
}

#[derive(FromArgs)]
/// Exit the shell.
pub struct Exit {
    #[argh(positional, greedy)]
    /// ignored; the shell always terminates with a success status
    pub _args: Vec<String>,
}

impl BuiltinCommand for Exit {
    fn name() -> &'static str {
        "exit"
    }

    fn help() -> &'static str {
        "Exit the shell"
    }

    fn execute(self, _state: &mut ShellState, _stdout: &mut dyn Write) -> Result<Signal> {
        Ok(Signal::Stop)
    }
}

#[derive(FromArgs)]
/// Print a greeting.
pub struct Hello {
    #[argh(positional)]
    /// who to greet; defaults to the world
    pub who: Option<String>,
}

impl BuiltinCommand for Hello {
    fn name() -> &'static str {
        "hello"
    }

    fn help() -> &'static str {
        "Print a greeting"
    }

    fn execute(self, _state: &mut ShellState, stdout: &mut dyn Write) -> Result<Signal> {
        match &self.who {
            Some(who) => writeln!(stdout, "Hello, {who}!")?,
            None => writeln!(stdout, "Hello, world!")?,
        }
        Ok(Signal::Continue)
    }
}

#[derive(FromArgs)]
/// Display the built-in commands.
pub struct Help {}

impl BuiltinCommand for Help {
    fn name() -> &'static str {
        "help"
    }

    fn help() -> &'static str {
        "Display this help information"
    }

    fn execute(self, state: &mut ShellState, stdout: &mut dyn Write) -> Result<Signal> {
        writeln!(stdout, "MyShell built-in commands:")?;
        for (name, help) in &state.help_topics {
            writeln!(stdout, "  {name}\t{help}")?;
        }
        Ok(Signal::Continue)
    }
}

#[derive(FromArgs)]
/// Define a command alias, or list all aliases.
pub struct Alias {
    #[argh(positional, greedy)]
    /// alias specification: `name=value...` or `name value...`; empty to list
    pub spec: Vec<String>,
}

impl BuiltinCommand for Alias {
    fn name() -> &'static str {
        "alias"
    }

    fn help() -> &'static str {
        "Define or list command aliases"
    }

    fn execute(self, state: &mut ShellState, stdout: &mut dyn Write) -> Result<Signal> {
        if self.spec.is_empty() {
            for entry in state.aliases.entries() {
                writeln!(stdout, "alias {}='{}'", entry.name, entry.value)?;
            }
            return Ok(Signal::Continue);
        }
        let (name, value) = parse_alias_spec(&self.spec)?;
        state.aliases.define(name, value)?;
        Ok(Signal::Continue)
    }
}

/// Splits the operands of `alias` into a name and a replacement value.
///
/// `name=value...` splits on the first `=`; when the right-hand side is empty
/// the value is rebuilt by joining the remaining operands with single spaces,
/// otherwise trailing operands are appended the same way. In that form one
/// layer of surrounding quotes is stripped from the final value. `name
/// value...` without a `=` joins the remaining operands; a bare name is a
/// usage error.
fn parse_alias_spec(words: &[String]) -> Result<(String, String)> {
    let (first, rest) = words
        .split_first()
        .ok_or_else(|| anyhow!("alias: usage: alias name=value"))?;

    if let Some((name, rhs)) = first.split_once('=') {
        if name.is_empty() {
            bail!("alias: invalid alias name");
        }
        let value = if rhs.is_empty() {
            rest.join(" ")
        } else if rest.is_empty() {
            rhs.to_string()
        } else {
            format!("{} {}", rhs, rest.join(" "))
        };
        Ok((name.to_string(), strip_outer_quotes(value)))
    } else if rest.is_empty() {
        bail!("alias: usage: alias name=value or alias name value...");
    } else {
        Ok((first.clone(), rest.join(" ")))
    }
}

/// Strips one matching layer of surrounding double quotes, if present.
fn strip_outer_quotes(value: String) -> String {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        value[1..value.len() - 1].to_string()
    } else {
        value
    }
}

#[derive(FromArgs)]
/// Remove a command alias.
pub struct Unalias {
    #[argh(positional)]
    /// name of the alias to remove
    pub name: String,
}

impl BuiltinCommand for Unalias {
    fn name() -> &'static str {
        "unalias"
    }

    fn help() -> &'static str {
        "Remove a command alias"
    }

    fn execute(self, state: &mut ShellState, _stdout: &mut dyn Write) -> Result<Signal> {
        if state.aliases.undefine(&self.name) {
            Ok(Signal::Continue)
        } else {
            Err(anyhow!("unalias: {}: not found", self.name))
        }
    }
}
