//! Java `.properties` documents.

use std::fmt::Write;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Line {
    Comment(String),
    Blank,
    Entry(String, String),
}

/// An ordered `.properties` file.
///
/// Entries render in insertion order; no sorting, no timestamp header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    lines: Vec<Line>,
}

impl Properties {
    pub fn new() -> Self {
        Properties::default()
    }

    /// Add a `# comment` line.
    pub fn comment(mut self, text: impl Into<String>) -> Self {
        self.lines.push(Line::Comment(text.into()));
        self
    }

    pub fn blank(mut self) -> Self {
        self.lines.push(Line::Blank);
        self
    }

    /// Add a `key=value` entry. An empty value is written as `key=`.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.lines.push(Line::Entry(key.into(), value.into()));
        self
    }

    /// Value of the last entry with this key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.lines.iter().rev().find_map(|line| match line {
            Line::Entry(k, v) if k == key => Some(v.as_str()),
            _ => None,
        })
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            let _ = match line {
                Line::Comment(text) => writeln!(out, "# {}", text),
                Line::Blank => writeln!(out),
                Line::Entry(key, value) => {
                    writeln!(out, "{}={}", escape_key(key), escape_value(value))
                }
            };
        }
        out
    }
}

fn escape_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for c in key.chars() {
        match c {
            '=' | ':' | ' ' | '#' | '!' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

fn escape_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for (i, c) in value.chars().enumerate() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            ' ' if i == 0 => out.push_str("\\ "),
            _ => out.push(c),
        }
    }
    out
}
