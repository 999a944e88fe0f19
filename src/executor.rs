//! Execution driver - prints or runs one expanded command per item.
//!
//! In dry-run mode every command line goes to the output writer and the run
//! never stops early. In execute mode each command runs through a
//! `CommandRunner`; a non-zero status stops the run unless force is set, in
//! which case the last non-zero status is kept and reported.

use std::io::Write;
use std::process::{Command, ExitStatus};

use crate::error::DofError;
use crate::expand::Template;
use crate::output;
use crate::pipeline::Flags;

/// Status reported when a command cannot be started at all.
pub const SPAWN_FAILED: i32 = 127;

/// Runs a complete command line and returns its exit status.
pub trait CommandRunner {
    fn run(&mut self, command: &str) -> i32;
}

/// Runs commands through `sh -c`, inheriting the standard streams.
#[derive(Debug, Default, Clone, Copy)]
pub struct ShellRunner;

impl CommandRunner for ShellRunner {
    fn run(&mut self, command: &str) -> i32 {
        output::debug(&format!("exec: {}", command));
        match Command::new("sh").arg("-c").arg(command).status() {
            Ok(status) => exit_code(status),
            Err(err) => {
                output::error(&format!("command failed to start: {}: {}", command, err));
                SPAWN_FAILED
            }
        }
    }
}

/// Map a process status to a shell-style exit code (128+N for signal N).
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}

/// Shell-quote a value for safe interpolation.
pub fn shell_quote(s: impl std::fmt::Display) -> String {
    let s = s.to_string();
    if !s.is_empty()
        && s.chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == '.' || c == '/')
    {
        s
    } else {
        format!("'{}'", s.replace('\'', "'\"'\"'"))
    }
}

/// Expands the template per item and prints or runs the result.
pub struct Executor<'a> {
    template: &'a Template,
    flags: Flags,
    runner: &'a mut dyn CommandRunner,
    out: &'a mut dyn Write,
}

impl<'a> Executor<'a> {
    pub fn new(
        template: &'a Template,
        flags: Flags,
        runner: &'a mut dyn CommandRunner,
        out: &'a mut dyn Write,
    ) -> Self {
        Self {
            template,
            flags,
            runner,
            out,
        }
    }

    /// Process `items` in order. Returns 0, or the last non-zero status.
    pub fn run(&mut self, items: &[String]) -> Result<i32, DofError> {
        let mut status = 0;
        for item in items {
            let command = self.template.expand(item);

            if !self.flags.execute {
                writeln!(self.out, "{}", command)?;
                continue;
            }

            self.out.flush()?;
            let code = self.runner.run(&command);
            if code != 0 {
                status = code;
                if !self.flags.force {
                    output::debug(&format!("stopping: '{}' exited with {}", command, code));
                    break;
                }
            }
        }
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records commands; fails those listed in `failing` with their status.
    #[derive(Default)]
    struct Recorder {
        ran: Vec<String>,
        failing: Vec<(String, i32)>,
    }

    impl CommandRunner for Recorder {
        fn run(&mut self, command: &str) -> i32 {
            self.ran.push(command.to_string());
            self.failing
                .iter()
                .find(|(cmd, _)| cmd == command)
                .map_or(0, |(_, code)| *code)
        }
    }

    fn items(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn execute(force: bool) -> Flags {
        Flags {
            execute: true,
            force,
            ..Flags::default()
        }
    }

    #[test]
    fn test_dry_run_prints_each_command() {
        let template = Template::new("echo %b.%e");
        let mut runner = Recorder::default();
        let mut out = Vec::new();
        let status = Executor::new(&template, Flags::default(), &mut runner, &mut out)
            .run(&items(&["1.txt", "2.log"]))
            .unwrap();
        assert_eq!(status, 0);
        assert_eq!(String::from_utf8(out).unwrap(), "echo 1.txt\necho 2.log\n");
        assert!(runner.ran.is_empty());
    }

    #[test]
    fn test_stop_on_first_failure() {
        let template = Template::new("run %f");
        let mut runner = Recorder {
            failing: vec![("run b".into(), 3)],
            ..Default::default()
        };
        let mut out = Vec::new();
        let status = Executor::new(&template, execute(false), &mut runner, &mut out)
            .run(&items(&["a", "b", "c"]))
            .unwrap();
        assert_eq!(status, 3);
        assert_eq!(runner.ran, vec!["run a", "run b"]);
        assert!(out.is_empty());
    }

    #[test]
    fn test_force_runs_everything_and_keeps_failure() {
        let template = Template::new("run %f");
        let mut runner = Recorder {
            failing: vec![("run b".into(), 3)],
            ..Default::default()
        };
        let mut out = Vec::new();
        let status = Executor::new(&template, execute(true), &mut runner, &mut out)
            .run(&items(&["a", "b", "c"]))
            .unwrap();
        assert_eq!(status, 3);
        assert_eq!(runner.ran, vec!["run a", "run b", "run c"]);
    }

    #[test]
    fn test_force_reports_last_non_zero() {
        let template = Template::new("run %f");
        let mut runner = Recorder {
            failing: vec![("run a".into(), 2), ("run c".into(), 5)],
            ..Default::default()
        };
        let mut out = Vec::new();
        let status = Executor::new(&template, execute(true), &mut runner, &mut out)
            .run(&items(&["a", "b", "c", "d"]))
            .unwrap();
        assert_eq!(status, 5);
        assert_eq!(runner.ran.len(), 4);
    }

    #[test]
    fn test_empty_item_list() {
        let template = Template::new("x");
        let mut runner = Recorder::default();
        let mut out = Vec::new();
        let status = Executor::new(&template, execute(false), &mut runner, &mut out)
            .run(&[])
            .unwrap();
        assert_eq!(status, 0);
        assert!(runner.ran.is_empty());
    }

    #[test]
    fn test_shell_runner_status() {
        let mut runner = ShellRunner;
        assert_eq!(runner.run("true"), 0);
        assert_eq!(runner.run("exit 7"), 7);
    }

    #[test]
    fn test_shell_quote() {
        assert_eq!(shell_quote("simple"), "simple");
        assert_eq!(shell_quote("/usr/bin/dof"), "/usr/bin/dof");
        assert_eq!(shell_quote("has space"), "'has space'");
        assert_eq!(shell_quote("has'quote"), "'has'\"'\"'quote'");
        assert_eq!(shell_quote(""), "''");
    }
}
