use crate::alias::AliasTable;
use crate::builtin::{Alias, Cd, Exit, Hello, Help, Unalias};
use crate::command::{CommandFactory, ShellState, Signal};
use crate::external;
use crate::lexer;
use anyhow::Result;
use std::io::Write;

/// Factory allows creating instances of ExecutableCommand.
///
/// Only supports the builtin commands defined in this crate.
pub(crate) struct Factory<T> {
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

/// Source of user input lines, one per call.
///
/// `Ok(None)` is end of input and terminates the interpreter loop cleanly.
/// The interactive implementation lives in [`crate::readline`]; tests use
/// scripted sources.
pub trait LineSource {
    fn next_line(&mut self) -> Result<Option<String>>;
}

/// The interactive command interpreter.
///
/// Owns the shell state (environment, alias table) and the ordered builtin
/// registry, and resolves each input line with a fixed priority: alias
/// expansion first, then builtins, then external commands.
///
/// Example
/// ```
/// use myshell::alias::AliasTable;
/// use myshell::{Interpreter, Signal};
///
/// let mut sh = Interpreter::new(AliasTable::new());
/// assert_eq!(sh.run_line("hello"), Signal::Continue);
/// assert_eq!(sh.run_line("exit"), Signal::Stop);
/// ```
pub struct Interpreter {
    state: ShellState,
    builtins: Vec<Box<dyn CommandFactory>>,
}

impl Interpreter {
    /// Creates an interpreter around the provided alias table, with the
    /// standard builtin registry: `cd`, `exit`, `hello`, `help`, `alias`,
    /// `unalias`. Registration order is lookup order.
    pub fn new(aliases: AliasTable) -> Self {
        let builtins: Vec<Box<dyn CommandFactory>> = vec![
            Box::new(Factory::<Cd>::default()),
            Box::new(Factory::<Exit>::default()),
            Box::new(Factory::<Hello>::default()),
            Box::new(Factory::<Help>::default()),
            Box::new(Factory::<Alias>::default()),
            Box::new(Factory::<Unalias>::default()),
        ];
        let mut state = ShellState::new(aliases);
        state.help_topics = builtins.iter().map(|f| (f.name(), f.help())).collect();
        Self { state, builtins }
    }

    /// Names of all registered builtins, for tab completion.
    pub fn builtin_names(&self) -> Vec<String> {
        self.builtins.iter().map(|f| f.name().to_string()).collect()
    }

    /// Read-only view of the alias table.
    pub fn aliases(&self) -> &AliasTable {
        &self.state.aliases
    }

    /// Tokenizes one input line and dispatches it.
    pub fn run_line(&mut self, line: &str) -> Signal {
        let args = lexer::split_into_args(line, &self.state.env);
        self.dispatch(&args)
    }

    /// Resolves and executes one tokenized command, builtin output going to
    /// the process stdout.
    pub fn dispatch(&mut self, args: &[String]) -> Signal {
        self.dispatch_with_output(args, &mut std::io::stdout())
    }

    /// Same as [`Self::dispatch`] with builtin output redirected.
    ///
    /// Resolution order, first match wins: an empty line is a no-op; an
    /// alias expands and goes straight to the external launcher (bypassing
    /// the builtin registry even on a name collision, with no recursive
    /// expansion); then the builtin registry is scanned in registration
    /// order; anything else is an external command.
    pub fn dispatch_with_output(&mut self, args: &[String], stdout: &mut dyn Write) -> Signal {
        let Some((name, rest)) = args.split_first() else {
            return Signal::Continue;
        };

        if let Some(value) = self.state.aliases.lookup(name) {
            let expansion = lexer::split_into_args(value, &self.state.env);
            return external::run(&expansion, &self.state.env);
        }

        let rest_refs: Vec<&str> = rest.iter().map(|s| s.as_str()).collect();
        for factory in &self.builtins {
            if let Some(cmd) = factory.try_create(name, &rest_refs) {
                return match cmd.execute(&mut self.state, stdout) {
                    Ok(signal) => signal,
                    Err(e) => {
                        // Write failures on the output stream; the command
                        // itself already handled its own errors.
                        eprintln!("myshell: {name}: {e}");
                        Signal::Continue
                    }
                };
            }
        }

        external::run(args, &self.state.env)
    }

    /// Drives the interpreter until a `Stop` signal or end of input.
    ///
    /// There is exactly one point of suspension per iteration: waiting for
    /// the next line, or (inside dispatch) waiting for a foreground child.
    pub fn repl(&mut self, source: &mut dyn LineSource) -> Result<()> {
        loop {
            match source.next_line()? {
                None => return Ok(()),
                Some(line) => {
                    if self.run_line(&line) == Signal::Stop {
                        return Ok(());
                    }
                }
            }
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new(AliasTable::new())
    }
}
