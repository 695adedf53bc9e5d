//! Command Shell
//!
//! Thin glue over the session: reads lines, tokenizes them, dispatches to
//! the tree operations and renders their results. Domain errors are
//! reported, never fatal. Keeps a bounded command history.
//!
//! [`Shell::execute`] returns the rendered output instead of printing, so
//! the command contract is testable without a TTY.

use crate::error::FsError;
use crate::session::{FsSession, TouchOutcome};
use crate::store::persistence::SnapshotFile;
use crate::store::Entry;
use std::collections::VecDeque;
use std::io::{self, Write};
use tracing::{error, info};

/// Oldest history entries are dropped beyond this many commands.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

const HELP_TEXT: &str = "available commands:
  mkdir <name>        create a directory
  touch <name>        create a file, or refresh an existing one
  ls [-R] [-i]        list contents (-R recursive, -i show entry ids)
  cd [path]           change directory; no argument or '/' jumps to root
  rm <name>           remove a file or an empty directory
  mv <old> <new>      rename an entry
  chmod <name> <mode> change permissions (3 or 9 characters)
  find <name>         search the current subtree by name substring
  history             show command history
  pwd                 print the current directory
  exit, quit          save and leave";

/// Result of dispatching one input line.
pub struct Reply {
    pub output: String,
    pub quit: bool,
}

impl Reply {
    fn text(output: impl Into<String>) -> Self {
        Reply {
            output: output.into(),
            quit: false,
        }
    }
}

fn usage(line: &str) -> Reply {
    Reply::text(format!("usage: {line}"))
}

fn render(cmd: &str, result: Result<String, FsError>) -> Reply {
    match result {
        Ok(output) => Reply::text(output),
        Err(e) => Reply::text(format!("{cmd}: {e}")),
    }
}

fn format_entry(entry: &Entry, with_ids: bool) -> String {
    let mut line = String::new();
    if with_ids {
        line.push_str(&format!("{}\t", entry.id));
    }
    line.push_str(&entry.name);
    if entry.is_directory() {
        line.push('/');
    }
    format!("{line}\t{}\t{} bytes", entry.permissions, entry.size)
}

pub struct Shell {
    session: FsSession,
    snapshot: SnapshotFile,
    history: VecDeque<String>,
    history_limit: usize,
}

impl Shell {
    pub fn new(session: FsSession, snapshot: SnapshotFile) -> Self {
        Shell {
            session,
            snapshot,
            history: VecDeque::new(),
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit.max(1);
        self
    }

    pub fn session(&self) -> &FsSession {
        &self.session
    }

    /// Run the read-eval-print loop until `exit`/`quit` or EOF, then flush
    /// a final snapshot.
    pub fn run(&mut self) -> io::Result<()> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        println!("inofs - type 'help' for available commands");
        loop {
            print!("{} $ ", self.session.pwd());
            stdout.flush()?;

            let mut line = String::new();
            if stdin.read_line(&mut line)? == 0 {
                break;
            }
            let reply = self.execute(&line);
            if !reply.output.is_empty() {
                println!("{}", reply.output);
            }
            if reply.quit {
                break;
            }
        }
        self.flush();
        Ok(())
    }

    /// Persistence flush: serialize the full store to the snapshot file.
    /// A failed save is reported and skipped; the session continues.
    pub fn flush(&self) {
        match self.snapshot.save(self.session.store()) {
            Ok(()) => info!(path = %self.snapshot.path().display(), "state saved"),
            Err(e) => {
                error!(error = %e, "snapshot flush failed");
                eprintln!("warning: could not save filesystem state: {e}");
            }
        }
    }

    /// Execute one input line. Non-empty lines land in the history whether
    /// or not they name a known command.
    pub fn execute(&mut self, line: &str) -> Reply {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Reply::text("");
        }
        self.remember(trimmed);

        let mut tokens = trimmed.split_whitespace();
        let cmd = tokens.next().unwrap_or_default();
        let args: Vec<&str> = tokens.collect();

        match cmd {
            "mkdir" => match args.as_slice() {
                [name] => render(
                    cmd,
                    self.session
                        .mkdir(name)
                        .map(|_| format!("directory '{name}' created")),
                ),
                _ => usage("mkdir <name>"),
            },
            "touch" => match args.as_slice() {
                [name] => match self.session.touch(name) {
                    TouchOutcome::Created(_) => Reply::text(format!("file '{name}' created")),
                    TouchOutcome::Refreshed(_) => Reply::text(format!("file '{name}' updated")),
                },
                _ => usage("touch <name>"),
            },
            "ls" => {
                let recursive = args.contains(&"-R");
                let with_ids = args.contains(&"-i");
                Reply::text(self.render_ls(recursive, with_ids))
            }
            "cd" => {
                // An absent argument jumps to the root, same as `cd /`.
                let path = args.first().copied().unwrap_or("");
                render(cmd, self.session.cd(path).map(|_| String::new()))
            }
            "rm" => match args.as_slice() {
                [name] => render(
                    cmd,
                    self.session.rm(name).map(|_| format!("removed '{name}'")),
                ),
                _ => usage("rm <name>"),
            },
            "mv" => match args.as_slice() {
                [old, new] => render(
                    cmd,
                    self.session
                        .mv(old, new)
                        .map(|_| format!("renamed '{old}' to '{new}'")),
                ),
                _ => usage("mv <old> <new>"),
            },
            "chmod" => match args.as_slice() {
                [name, mode] => render(
                    cmd,
                    self.session
                        .chmod(name, mode)
                        .map(|_| format!("permissions of '{name}' changed to '{mode}'")),
                ),
                _ => usage("chmod <name> <mode>"),
            },
            "find" => match args.as_slice() {
                [pattern] => {
                    let hits = self.session.find(pattern);
                    if hits.is_empty() {
                        Reply::text(format!("no matches for '{pattern}'"))
                    } else {
                        Reply::text(hits.join("\n"))
                    }
                }
                _ => usage("find <name>"),
            },
            "history" => Reply::text(self.render_history()),
            "pwd" => Reply::text(self.session.pwd()),
            "help" => Reply::text(HELP_TEXT),
            "exit" | "quit" => {
                // Explicit flush on top of the one at teardown; both go
                // through the same save routine.
                self.flush();
                Reply {
                    output: String::new(),
                    quit: true,
                }
            }
            other => Reply::text(format!("unrecognized command: {other}")),
        }
    }

    fn remember(&mut self, line: &str) {
        if self.history.len() == self.history_limit {
            self.history.pop_front();
        }
        self.history.push_back(line.to_string());
    }

    fn render_ls(&self, recursive: bool, with_ids: bool) -> String {
        let mut lines = Vec::new();
        if recursive {
            for (depth, id) in self.session.walk() {
                if let Some(entry) = self.session.store().get(id) {
                    lines.push(format!(
                        "{}{}",
                        "  ".repeat(depth),
                        format_entry(entry, with_ids)
                    ));
                }
            }
        } else {
            for entry in self.session.list() {
                lines.push(format_entry(entry, with_ids));
            }
        }
        lines.join("\n")
    }

    fn render_history(&self) -> String {
        self.history
            .iter()
            .enumerate()
            .map(|(i, line)| format!(" {}  {}", i + 1, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn shell_in(dir: &TempDir) -> Shell {
        let snapshot = SnapshotFile::new(dir.path().join("filesystem.dat"));
        Shell::new(FsSession::new(), snapshot)
    }

    #[test]
    fn mkdir_reports_creation_and_collisions() {
        let dir = TempDir::new().unwrap();
        let mut shell = shell_in(&dir);

        assert_eq!(shell.execute("mkdir a").output, "directory 'a' created");
        assert_eq!(shell.execute("mkdir a").output, "mkdir: 'a': file exists");
        assert_eq!(
            shell
                .session()
                .list()
                .filter(|entry| entry.name == "a")
                .count(),
            1
        );
    }

    #[test]
    fn touch_distinguishes_create_from_update() {
        let dir = TempDir::new().unwrap();
        let mut shell = shell_in(&dir);

        assert_eq!(shell.execute("touch f").output, "file 'f' created");
        assert_eq!(shell.execute("touch f").output, "file 'f' updated");
    }

    #[test]
    fn unknown_commands_and_missing_arguments_are_reported() {
        let dir = TempDir::new().unwrap();
        let mut shell = shell_in(&dir);

        assert_eq!(
            shell.execute("frobnicate now").output,
            "unrecognized command: frobnicate"
        );
        assert_eq!(shell.execute("mkdir").output, "usage: mkdir <name>");
        assert_eq!(shell.execute("mv only-one").output, "usage: mv <old> <new>");
        assert!(shell.execute("   ").output.is_empty());
    }

    #[test]
    fn ls_renders_tabbed_columns_and_directory_markers() {
        let dir = TempDir::new().unwrap();
        let mut shell = shell_in(&dir);
        shell.execute("mkdir docs");
        shell.execute("touch note");

        let out = shell.execute("ls").output;
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "docs/\trwxr-xr-x\t0 bytes");
        assert_eq!(lines[1], "note\trwxr-xr-x\t0 bytes");

        let with_ids = shell.execute("ls -i").output;
        assert!(with_ids.lines().next().unwrap().starts_with("1\tdocs/"));
    }

    #[test]
    fn recursive_ls_indents_two_spaces_per_level() {
        let dir = TempDir::new().unwrap();
        let mut shell = shell_in(&dir);
        shell.execute("mkdir a");
        shell.execute("cd a");
        shell.execute("touch deep.txt");
        shell.execute("cd /");

        let out = shell.execute("ls -R").output;
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "/\trwxr-xr-x\t0 bytes");
        assert_eq!(lines[1], "  a/\trwxr-xr-x\t0 bytes");
        assert_eq!(lines[2], "    deep.txt\trwxr-xr-x\t0 bytes");
    }

    #[test]
    fn cd_without_argument_jumps_to_root() {
        let dir = TempDir::new().unwrap();
        let mut shell = shell_in(&dir);
        shell.execute("mkdir docs");
        shell.execute("cd docs");
        assert_eq!(shell.execute("pwd").output, "/docs");
        shell.execute("cd");
        assert_eq!(shell.execute("pwd").output, "/");
        assert_eq!(
            shell.execute("cd ghost").output,
            "cd: 'ghost': no such file or directory"
        );
    }

    #[test]
    fn find_renders_hits_or_a_no_match_message() {
        let dir = TempDir::new().unwrap();
        let mut shell = shell_in(&dir);
        shell.execute("mkdir docs");
        shell.execute("cd docs");
        shell.execute("touch report.txt");
        shell.execute("cd ..");

        assert_eq!(shell.execute("find report").output, "/docs/report.txt");
        assert_eq!(
            shell.execute("find nothing").output,
            "no matches for 'nothing'"
        );
    }

    #[test]
    fn history_is_numbered_and_bounded() {
        let dir = TempDir::new().unwrap();
        let mut shell = shell_in(&dir).with_history_limit(3);
        for i in 0..5 {
            shell.execute(&format!("touch f{i}"));
        }

        // The `history` line itself is remembered before rendering, so it
        // evicts the oldest surviving touch.
        let out = shell.execute("history").output;
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines, vec![" 1  touch f3", " 2  touch f4", " 3  history"]);
    }

    #[test]
    fn exit_flushes_the_snapshot() {
        let dir = TempDir::new().unwrap();
        let mut shell = shell_in(&dir);
        shell.execute("mkdir persisted");

        let reply = shell.execute("exit");
        assert!(reply.quit);
        assert!(dir.path().join("filesystem.dat").exists());
    }
}
