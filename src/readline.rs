//! Interactive line source backed by rustyline.
//!
//! Owns everything the interpreter core treats as a collaborator: prompt
//! rendering, line editing, tab completion and the on-disk history.

use crate::interpreter::LineSource;
use anyhow::Result;
use rustyline::Helper;
use rustyline::completion::{Completer, FilenameCompleter, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use std::borrow::Cow;
use std::path::PathBuf;

const HISTORY_FILE: &str = ".myshell_history";

/// Completion and prompt support for the editor.
///
/// The first word of a line completes against the registered command names,
/// everything after it against the filesystem.
struct ShellHelper {
    commands: Vec<String>,
    files: FilenameCompleter,
    colored_prompt: String,
}

impl Completer for ShellHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let start = line[..pos].rfind(' ').map_or(0, |i| i + 1);
        if start == 0 {
            let word = &line[..pos];
            let matches: Vec<Pair> = self
                .commands
                .iter()
                .filter(|name| name.starts_with(word))
                .map(|name| Pair {
                    display: name.clone(),
                    replacement: name.clone(),
                })
                .collect();
            if !matches.is_empty() {
                return Ok((0, matches));
            }
        }
        self.files.complete(line, pos, ctx)
    }
}

impl Hinter for ShellHelper {
    type Hint = String;
}

impl Validator for ShellHelper {}

impl Highlighter for ShellHelper {
    fn highlight_prompt<'b, 's: 'b, 'p: 'b>(
        &'s self,
        prompt: &'p str,
        default: bool,
    ) -> Cow<'b, str> {
        if default {
            Cow::Borrowed(&self.colored_prompt)
        } else {
            Cow::Borrowed(prompt)
        }
    }
}

impl Helper for ShellHelper {}

/// Interactive [`LineSource`] with history persisted in `~/.myshell_history`.
pub struct LineEditor {
    rl: rustyline::Editor<ShellHelper, DefaultHistory>,
    history_path: PathBuf,
}

impl LineEditor {
    /// Creates the editor and loads any existing history.
    ///
    /// `commands` are the names offered by first-word tab completion.
    pub fn new(commands: Vec<String>) -> Result<Self> {
        let mut rl: rustyline::Editor<ShellHelper, DefaultHistory> = rustyline::Editor::new()?;
        rl.set_helper(Some(ShellHelper {
            commands,
            files: FilenameCompleter::new(),
            colored_prompt: String::new(),
        }));

        let history_path = home_file(HISTORY_FILE);
        // Missing history just means a first run.
        let _ = rl.load_history(&history_path);

        Ok(Self { rl, history_path })
    }

    /// Writes the accumulated history back to disk.
    pub fn save_history(&mut self) {
        if let Err(e) = self.rl.save_history(&self.history_path) {
            eprintln!("myshell: can't save history: {e}");
        }
    }
}

impl LineSource for LineEditor {
    /// Reads one line, echoing a `user@cwd $` prompt.
    ///
    /// Non-empty lines are appended to the history. An interrupt at the
    /// prompt discards the line and keeps the session alive; end of input
    /// returns `None`.
    fn next_line(&mut self) -> Result<Option<String>> {
        let user = std::env::var("USER").unwrap_or_else(|_| "user".to_string());
        let cwd = std::env::current_dir()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|_| "?".to_string());

        let prompt = format!("{user}@{cwd} $ ");
        if let Some(helper) = self.rl.helper_mut() {
            helper.colored_prompt = format!(
                "\x1b[1;32m{user}\x1b[1;37m@\x1b[1;36m{cwd} \x1b[1;33m$ \x1b[0m"
            );
        }

        match self.rl.readline(&prompt) {
            Ok(line) => {
                if !line.is_empty() {
                    self.rl.add_history_entry(line.as_str())?;
                }
                Ok(Some(line))
            }
            Err(ReadlineError::Interrupted) => Ok(Some(String::new())),
            Err(ReadlineError::Eof) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Resolves a dotfile under `$HOME`, falling back to the working directory.
pub fn home_file(name: &str) -> PathBuf {
    match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(name),
        None => PathBuf::from(name),
    }
}
