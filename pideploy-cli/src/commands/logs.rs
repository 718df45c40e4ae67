//! `pideploy logs`: tail the detached GUI's log files.
//!
//! A relaunch rotates `gui.log` to `gui.log.1`, so when the live file holds
//! fewer lines than asked for the rest comes from the newest rotated copy.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;

use pideploy_core::paths::{gui_stderr_log_path, gui_stdout_log_path};
use pideploy_launcher::log_rotation::rotated_path;

#[derive(Args, Debug)]
pub struct LogsArgs {
    /// Number of trailing lines to show.
    #[arg(long, default_value_t = 100)]
    pub lines: usize,

    /// Show only the stderr log.
    #[arg(long)]
    pub stderr_only: bool,
}

impl LogsArgs {
    pub fn run(self) -> Result<i32> {
        let home = crate::home_dir()?;
        let mut logs = Vec::with_capacity(2);
        if !self.stderr_only {
            logs.push(("stdout", gui_stdout_log_path(&home)));
        }
        logs.push(("stderr", gui_stderr_log_path(&home)));

        for (stream, path) in logs {
            show_log(&path, self.lines)
                .with_context(|| format!("failed to read GUI {stream} log"))?;
        }
        Ok(0)
    }
}

fn show_log(path: &Path, lines: usize) -> Result<()> {
    let previous = rotated_path(path, 1);
    if !path.exists() && !previous.exists() {
        println!("log file not found: {}", path.display());
        return Ok(());
    }

    let tail = read_tail(path, lines)?;
    if tail.len() < lines {
        let earlier = read_tail(&previous, lines - tail.len())?;
        if !earlier.is_empty() {
            println!("==> {} <==", previous.display());
            for line in earlier {
                println!("{line}");
            }
        }
    }

    println!("==> {} <==", path.display());
    for line in tail {
        println!("{line}");
    }
    Ok(())
}

/// Last `n` lines of `path`; a missing file reads as empty.
fn read_tail(path: &Path, n: usize) -> Result<VecDeque<String>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(VecDeque::new()),
        Err(e) => return Err(e).with_context(|| format!("open {}", path.display())),
    };
    tail_lines(BufReader::new(file), n).with_context(|| format!("read {}", path.display()))
}

fn tail_lines(reader: impl BufRead, n: usize) -> io::Result<VecDeque<String>> {
    let mut tail = VecDeque::with_capacity(n.min(1024));
    if n == 0 {
        return Ok(tail);
    }
    for line in reader.lines() {
        if tail.len() == n {
            tail.pop_front();
        }
        tail.push_back(line?);
    }
    Ok(tail)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn tail_keeps_last_lines() {
        let text = "one\ntwo\nthree\nfour\n";
        let tail = tail_lines(text.as_bytes(), 2).unwrap();
        assert_eq!(tail, ["three", "four"]);
        assert!(tail_lines(text.as_bytes(), 0).unwrap().is_empty());
        assert_eq!(tail_lines(text.as_bytes(), 10).unwrap().len(), 4);
    }

    #[test]
    fn missing_log_reads_empty() {
        let dir = TempDir::new().unwrap();
        assert!(read_tail(&dir.path().join("gui.log"), 5).unwrap().is_empty());
    }

    #[test]
    fn rotated_copy_fills_short_live_log() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("gui.log");
        fs::write(&log, "after relaunch\n").unwrap();
        fs::write(rotated_path(&log, 1), "a\nb\nc\n").unwrap();

        let live = read_tail(&log, 3).unwrap();
        let earlier = read_tail(&rotated_path(&log, 1), 3 - live.len()).unwrap();
        assert_eq!(earlier, ["b", "c"]);
        show_log(&log, 3).unwrap();
    }
}
