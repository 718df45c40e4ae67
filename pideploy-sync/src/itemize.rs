//! Parser for rsync `--itemize-changes` output.
//!
//! Each itemized line is `YXcstpoguax <path>`:
//!
//! - `Y`: update type: `<` sent, `>` received, `c` created locally,
//!   `h` hard link, `.` not updated, `*` message (`*deleting`)
//! - `X`: file type: `f` file, `d` directory, `L` symlink, `D` device, `S` special
//! - the rest: attribute flags; all `+` means the item is new
//!
//! Lines that are not itemized records (warnings, summaries) are ignored.

use std::path::PathBuf;

use pideploy_core::{ChangeFlag, TransferEntry, TransferReport};

const DELETING: &str = "*deleting";

/// Parse rsync's itemized stdout into a [`TransferReport`], preserving order.
pub fn parse(output: &str) -> TransferReport {
    output.lines().filter_map(parse_line).collect()
}

/// Parse one itemized line; `None` for anything else.
pub fn parse_line(line: &str) -> Option<TransferEntry> {
    let line = line.trim_end_matches(['\r', '\n']);

    if let Some(rest) = line.strip_prefix(DELETING) {
        let path = rest.trim_start();
        if path.is_empty() {
            return None;
        }
        return Some(TransferEntry {
            path: PathBuf::from(path),
            flag: ChangeFlag::Deleted,
            is_dir: path.ends_with('/'),
        });
    }

    let mut chars = line.chars();
    let update = chars.next()?;
    let kind = chars.next()?;
    if !matches!(update, '<' | '>' | 'c' | 'h' | '.') {
        return None;
    }
    if !matches!(kind, 'f' | 'd' | 'L' | 'D' | 'S') {
        return None;
    }
    let rest = chars.as_str();

    // With -ii an untouched item prints blank attributes: `.f          path`.
    let (attrs, path) = if rest.starts_with(' ') {
        ("", rest.trim_start())
    } else {
        rest.split_once(' ')?
    };
    if path.is_empty() {
        return None;
    }

    let path = if kind == 'L' {
        path.split_once(" -> ").map(|(p, _)| p).unwrap_or(path)
    } else {
        path
    };

    let flag = if !attrs.is_empty() && attrs.chars().all(|c| c == '+') {
        ChangeFlag::Added
    } else if update == '.' && attrs.chars().all(|c| c == '.') {
        ChangeFlag::Unchanged
    } else {
        ChangeFlag::Updated
    };

    Some(TransferEntry {
        path: PathBuf::from(path),
        flag,
        is_dir: kind == 'd',
    })
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(">f+++++++++ ui/mainwindow.ui", "ui/mainwindow.ui", ChangeFlag::Added, false)]
    #[case(">f.st...... src/main.py", "src/main.py", ChangeFlag::Updated, false)]
    #[case(">f..t...... src/camera.py", "src/camera.py", ChangeFlag::Updated, false)]
    #[case("*deleting   src/old.py", "src/old.py", ChangeFlag::Deleted, false)]
    #[case("*deleting   archive/", "archive/", ChangeFlag::Deleted, true)]
    #[case("cd+++++++++ res/", "res/", ChangeFlag::Added, true)]
    #[case(".d..t...... ./", "./", ChangeFlag::Updated, true)]
    #[case(".f          notes.txt", "notes.txt", ChangeFlag::Unchanged, false)]
    #[case("cL+++++++++ link -> target.py", "link", ChangeFlag::Added, false)]
    #[case(">f+++++++++ my file.ui", "my file.ui", ChangeFlag::Added, false)]
    fn itemized_lines(
        #[case] line: &str,
        #[case] path: &str,
        #[case] flag: ChangeFlag,
        #[case] is_dir: bool,
    ) {
        let entry = parse_line(line).expect("itemized line");
        assert_eq!(entry.path, PathBuf::from(path));
        assert_eq!(entry.flag, flag);
        assert_eq!(entry.is_dir, is_dir);
    }

    #[rstest]
    #[case("")]
    #[case("sending incremental file list")]
    #[case("sent 1,234 bytes  received 56 bytes  2,580.00 bytes/sec")]
    #[case("total size is 98,765  speedup is 76.56 (DRY RUN)")]
    #[case("rsync: [sender] link_stat \"/nope\" failed: No such file or directory (2)")]
    fn non_itemized_lines_are_ignored(#[case] line: &str) {
        assert!(parse_line(line).is_none(), "unexpectedly parsed: {line}");
    }

    #[test]
    fn parse_preserves_order_and_detects_fresh_destination() {
        let out = "cd+++++++++ ./\n\
                   >f+++++++++ main.py\n\
                   cd+++++++++ ui/\n\
                   >f+++++++++ ui/mainwindow.ui\n";
        let report = parse(out);
        assert_eq!(report.len(), 4);
        assert_eq!(report.entries[1].path, PathBuf::from("main.py"));
        assert_eq!(report.entries[3].path, PathBuf::from("ui/mainwindow.ui"));
        assert!(report.destination_created());
        assert_eq!(report.count(ChangeFlag::Added), 4);
    }
}
