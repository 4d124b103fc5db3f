use anyhow::Result;
use myshell::Interpreter;
use myshell::alias::{AliasTable, ConfigFile};
use myshell::readline::LineEditor;

const CONFIG_FILE: &str = ".myshell_config";

fn main() -> Result<()> {
    // Default aliases; overridden by whatever the config file defines.
    let mut aliases = AliasTable::new();
    if let Err(e) = aliases.define("ls", "ls --color=auto") {
        eprintln!("myshell: {e}");
    }
    aliases.attach_store(Box::new(ConfigFile::new(myshell::readline::home_file(
        CONFIG_FILE,
    ))));

    let mut shell = Interpreter::new(aliases);
    let mut editor = LineEditor::new(shell.builtin_names())?;

    println!("Welcome to MyShell! Type 'exit' to quit.");
    shell.repl(&mut editor)?;
    editor.save_history();
    println!("Goodbye!");
    Ok(())
}
