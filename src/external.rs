use crate::command::Signal;
use crate::env::Environment;
use std::process::Command;

/// Spawns `args[0]` as a foreground child process and waits for it.
///
/// The child inherits the parent's standard streams, receives the shell's
/// variable map and working directory, and is resolved through the
/// platform's own executable search (a PATH-style lookup); the shell does
/// not reimplement it. The wait returns only once the child has exited or
/// been killed by a signal — a merely stopped child keeps the shell blocked
/// — so the handle is always fully reaped.
///
/// Always yields [`Signal::Continue`]: a spawn failure (including an
/// executable that can't be found) is reported to the error stream, and the
/// child's exit status is not surfaced beyond whatever the child itself
/// printed. There is no timeout and no cancellation; interrupting a
/// long-running child is left to default OS signal delivery.
pub fn run(args: &[String], env: &Environment) -> Signal {
    let Some((name, rest)) = args.split_first() else {
        return Signal::Continue;
    };

    let mut command = Command::new(name);
    command
        .args(rest)
        .envs(env.vars.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .current_dir(&env.current_dir);

    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(e) => {
            eprintln!("myshell: {name}: {e}");
            return Signal::Continue;
        }
    };

    if let Err(e) = child.wait() {
        eprintln!("myshell: {name}: {e}");
    }
    Signal::Continue
}
