use std::io::Write;
use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result};

use crate::errors::CommandFailed;

fn render(program: &str, args: &[&str]) -> String {
    let mut s = String::from(program);
    for a in args {
        s.push(' ');
        s.push_str(a);
    }
    s
}

fn spawn(dir: &Path, program: &str, args: &[&str], envs: &[(&str, String)]) -> Result<std::process::Output> {
    let mut cmd = Command::new(program);
    cmd.args(args).current_dir(dir);
    for (k, v) in envs {
        cmd.env(k, v);
    }
    cmd.output()
        .with_context(|| format!("run {}", render(program, args)))
}

/// Echoes and runs a command, relaying all of its output to stderr so
/// stdout stays a clean data stream. `envs` is a per-invocation overlay;
/// the global process environment is never mutated.
pub fn logcall(dir: &Path, program: &str, args: &[&str], envs: &[(&str, String)]) -> Result<()> {
    let rendered = render(program, args);
    eprintln!("+ {}$ {}", dir.display(), rendered);

    let out = spawn(dir, program, args, envs)?;
    let mut stderr = std::io::stderr();
    let _ = stderr.write_all(&out.stdout);
    let _ = stderr.write_all(&out.stderr);
    let _ = stderr.flush();

    if !out.status.success() {
        return Err(CommandFailed {
            command: rendered,
            exit_code: out.status.code().unwrap_or(-1),
        }
        .into());
    }
    Ok(())
}

/// Runs a command and returns its trimmed stdout. The command's stderr is
/// relayed to ours. Nonzero exit is a `CommandFailed` error.
pub fn check_output(dir: &Path, program: &str, args: &[&str], envs: &[(&str, String)]) -> Result<String> {
    let out = spawn(dir, program, args, envs)?;
    let mut stderr = std::io::stderr();
    let _ = stderr.write_all(&out.stderr);
    let _ = stderr.flush();

    if !out.status.success() {
        return Err(CommandFailed {
            command: render(program, args),
            exit_code: out.status.code().unwrap_or(-1),
        }
        .into());
    }
    Ok(String::from_utf8_lossy(&out.stdout).trim().to_string())
}

/// Whether `err` is a nonzero exit, as opposed to a spawn failure or
/// anything else. Adapters use this to map "tool said no" onto softer
/// answers (`None`, `false`) where the contract calls for it.
pub fn is_command_failure(err: &anyhow::Error) -> bool {
    err.is::<CommandFailed>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_output_captures_stdout() {
        let dir = std::env::temp_dir();
        let out = check_output(&dir, "echo", &["hello"], &[]).unwrap();
        assert_eq!(out, "hello");
    }

    #[test]
    fn nonzero_exit_is_command_failed() {
        let dir = std::env::temp_dir();
        let err = logcall(&dir, "false", &[], &[]).unwrap_err();
        assert!(is_command_failure(&err));
        let failed = err.downcast_ref::<CommandFailed>().unwrap();
        assert_eq!(failed.exit_code, 1);
    }

    #[test]
    fn env_overlay_reaches_the_child() {
        let dir = std::env::temp_dir();
        let out = check_output(
            &dir,
            "sh",
            &["-c", "printf %s \"$VCBENCH_TEST_VAR\""],
            &[("VCBENCH_TEST_VAR", "overlay".to_string())],
        )
        .unwrap();
        assert_eq!(out, "overlay");
    }
}
