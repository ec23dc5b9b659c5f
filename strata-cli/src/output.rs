//! Styled terminal output utilities.

use owo_colors::OwoColorize;
use std::iter::Peekable;
use std::str::Chars;

/// Print a header/title
pub fn header(text: &str) {
    println!();
    println!("{}", text.bold().cyan());
    println!("{}", "─".repeat(text.chars().count()).dimmed());
    println!();
}

/// Print a section header
pub fn section(text: &str) {
    println!("{}", text.bold().white());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

/// Print a success message
pub fn success(text: &str) {
    println!("{} {}", "✔".green().bold(), text.green());
}

/// Print an info message
pub fn info(text: &str) {
    println!("{} {}", "ℹ".blue().bold(), text);
}

/// Print an error message
pub fn error(text: &str) {
    eprintln!("{} {}", "✖".red().bold(), text.red());
}

/// Print a step indicator
pub fn step(current: usize, total: usize, text: &str) {
    println!("{} {}", format!("[{}/{}]", current, total).dimmed(), text);
}

/// Print a list item
pub fn list_item(text: &str) {
    println!("  {} {}", "•".dimmed(), text);
}

/// Print a newline
pub fn newline() {
    println!();
}

/// Print dimmed text
pub fn dim(text: &str) {
    println!("{}", text.dimmed());
}

/// Print a character diff to stderr, removals red and additions green
pub fn diff(diff: &str) {
    eprintln!();
    for line in colorize_diff(diff).lines() {
        eprintln!("  {}", line);
    }
    eprintln!();
}

/// Color each change run, honoring backslash escapes inside the text.
fn colorize_diff(diff: &str) -> String {
    let mut out = String::with_capacity(diff.len());
    let mut chars = diff.chars().peekable();

    while let Some(c) = chars.next() {
        let (mark, bracket) = match (c, chars.peek().copied()) {
            ('\\', Some(next)) => {
                out.push(c);
                out.push(next);
                chars.next();
                continue;
            }
            ('[', Some('-')) => ('-', ']'),
            ('{', Some('+')) => ('+', '}'),
            _ => {
                out.push(c);
                continue;
            }
        };
        chars.next();

        let (body, closed) = take_run(&mut chars, mark, bracket);
        let run = format!("{}{}{}", c, mark, body);
        if !closed {
            out.push_str(&run);
        } else if mark == '-' {
            out.push_str(&format!("{}{}{}", run, mark, bracket).red().to_string());
        } else {
            out.push_str(&format!("{}{}{}", run, mark, bracket).green().to_string());
        }
    }

    out
}

/// Consume a change run up to its unescaped closing marker.
fn take_run(chars: &mut Peekable<Chars<'_>>, mark: char, bracket: char) -> (String, bool) {
    let mut body = String::new();
    while let Some(c) = chars.next() {
        if c == '\\' {
            body.push(c);
            if let Some(next) = chars.next() {
                body.push(next);
            }
        } else if c == mark && chars.peek() == Some(&bracket) {
            chars.next();
            return (body, true);
        } else {
            body.push(c);
        }
    }
    (body, false)
}

/// Style text as success (green)
pub fn style_success(text: &str) -> String {
    text.green().to_string()
}

/// Style text as pending (yellow)
pub fn style_pending(text: &str) -> String {
    text.yellow().to_string()
}
