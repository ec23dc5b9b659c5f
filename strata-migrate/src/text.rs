//! Text helpers for comparing migration bodies.

use std::borrow::Cow;

/// Above this many comparison cells the changed middle of a diff is shown
/// as a single replacement.
const MAX_DIFF_CELLS: usize = 4_000_000;

/// Collapse every CRLF sequence to a single LF.
///
/// Bodies are compared after normalization, so a migration checked out
/// with Windows line endings matches the record written from a Unix
/// checkout and vice versa.
pub fn normalize_line_endings(text: &str) -> Cow<'_, str> {
    if text.contains("\r\n") {
        Cow::Owned(text.replace("\r\n", "\n"))
    } else {
        Cow::Borrowed(text)
    }
}

/// Check whether two bodies are equal after line-ending normalization.
pub fn bodies_match(recorded: &str, source: &str) -> bool {
    normalize_line_endings(recorded) == normalize_line_endings(source)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Equal,
    Delete,
    Insert,
}

/// Character-level diff from `old` to `new`.
///
/// Unchanged text is copied through, removed text is wrapped as `[-...-]`
/// and added text as `{+...+}`.
///
/// Marker sequences occurring in the bodies themselves are escaped with a
/// backslash (`\[-`, `\{+`, `-\]`, `+\}`), as is the backslash itself, so
/// every unescaped marker in the output delimits a change.
pub fn character_diff(old: &str, new: &str) -> String {
    let a: Vec<char> = old.chars().collect();
    let b: Vec<char> = new.chars().collect();

    let prefix = a.iter().zip(&b).take_while(|(x, y)| x == y).count();
    let suffix = a[prefix..]
        .iter()
        .rev()
        .zip(b[prefix..].iter().rev())
        .take_while(|(x, y)| x == y)
        .count();

    let a_mid = &a[prefix..a.len() - suffix];
    let b_mid = &b[prefix..b.len() - suffix];

    let mut runs: Vec<(Op, String)> = Vec::new();
    push_str(&mut runs, Op::Equal, &a[..prefix]);

    if (a_mid.len() + 1).saturating_mul(b_mid.len() + 1) > MAX_DIFF_CELLS {
        push_str(&mut runs, Op::Delete, a_mid);
        push_str(&mut runs, Op::Insert, b_mid);
    } else {
        for (op, c) in lcs_ops(a_mid, b_mid) {
            push(&mut runs, op, c);
        }
    }

    push_str(&mut runs, Op::Equal, &a[a.len() - suffix..]);
    render(&runs)
}

fn lcs_ops(a: &[char], b: &[char]) -> Vec<(Op, char)> {
    let (n, m) = (a.len(), b.len());
    let width = m + 1;
    // table[i * width + j] = LCS length of a[i..] and b[j..]
    let mut table = vec![0u32; (n + 1) * width];

    for i in (0..n).rev() {
        for j in (0..m).rev() {
            table[i * width + j] = if a[i] == b[j] {
                table[(i + 1) * width + j + 1] + 1
            } else {
                table[(i + 1) * width + j].max(table[i * width + j + 1])
            };
        }
    }

    let mut ops = Vec::with_capacity(n + m);
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if a[i] == b[j] {
            ops.push((Op::Equal, a[i]));
            i += 1;
            j += 1;
        } else if table[(i + 1) * width + j] >= table[i * width + j + 1] {
            ops.push((Op::Delete, a[i]));
            i += 1;
        } else {
            ops.push((Op::Insert, b[j]));
            j += 1;
        }
    }
    ops.extend(a[i..].iter().map(|&c| (Op::Delete, c)));
    ops.extend(b[j..].iter().map(|&c| (Op::Insert, c)));
    ops
}

fn push(runs: &mut Vec<(Op, String)>, op: Op, c: char) {
    match runs.last_mut() {
        Some((last, text)) if *last == op => text.push(c),
        _ => runs.push((op, c.to_string())),
    }
}

fn push_str(runs: &mut Vec<(Op, String)>, op: Op, chars: &[char]) {
    for &c in chars {
        push(runs, op, c);
    }
}

fn render(runs: &[(Op, String)]) -> String {
    let mut out = String::new();
    for (op, text) in runs {
        match op {
            Op::Equal => escape_into(&mut out, text),
            Op::Delete => {
                out.push_str("[-");
                escape_into(&mut out, text);
                out.push_str("-]");
            }
            Op::Insert => {
                out.push_str("{+");
                escape_into(&mut out, text);
                out.push_str("+}");
            }
        }
    }
    out
}

fn escape_into(out: &mut String, text: &str) {
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match (c, chars.peek().copied()) {
            ('\\', _) => out.push_str("\\\\"),
            ('[', Some('-')) | ('{', Some('+')) => {
                out.push('\\');
                out.push(c);
            }
            ('-', Some(']')) | ('+', Some('}')) => {
                out.push(c);
                out.push('\\');
            }
            _ => out.push(c),
        }
    }
}
