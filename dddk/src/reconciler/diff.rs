//! Line diff of pretty-printed JSON, used by `push --diff`.

use colored::Colorize;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line<'a> {
    Same(&'a str),
    Removed(&'a str),
    Added(&'a str),
}

/// Print a colored diff between the snapshot and the new body to stdout.
pub fn print_diff<T: Serialize>(previous: &T, next: &T) {
    let (Ok(old), Ok(new)) = (
        serde_json::to_string_pretty(previous),
        serde_json::to_string_pretty(next),
    ) else {
        return;
    };

    for line in diff_lines(&old, &new) {
        match line {
            Line::Same(l) => println!("  {}", l.dimmed()),
            Line::Removed(l) => println!("{}", format!("- {l}").red()),
            Line::Added(l) => println!("{}", format!("+ {l}").green()),
        }
    }
}

/// Longest-common-subsequence diff over lines.
pub fn diff_lines<'a>(old: &'a str, new: &'a str) -> Vec<Line<'a>> {
    let a: Vec<&str> = old.lines().collect();
    let b: Vec<&str> = new.lines().collect();

    // lcs[i][j] = LCS length of a[i..] and b[j..]
    let mut lcs = vec![vec![0usize; b.len() + 1]; a.len() + 1];
    for i in (0..a.len()).rev() {
        for j in (0..b.len()).rev() {
            lcs[i][j] = if a[i] == b[j] {
                lcs[i + 1][j + 1] + 1
            } else {
                lcs[i + 1][j].max(lcs[i][j + 1])
            };
        }
    }

    let mut out = Vec::with_capacity(a.len().max(b.len()));
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        if a[i] == b[j] {
            out.push(Line::Same(a[i]));
            i += 1;
            j += 1;
        } else if lcs[i + 1][j] >= lcs[i][j + 1] {
            out.push(Line::Removed(a[i]));
            i += 1;
        } else {
            out.push(Line::Added(b[j]));
            j += 1;
        }
    }
    out.extend(a[i..].iter().map(|l| Line::Removed(*l)));
    out.extend(b[j..].iter().map(|l| Line::Added(*l)));
    out
}
