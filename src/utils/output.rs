//! Terminal output helpers for CLI commands

use colored::*;
use std::fmt::Display;

/// Format a number with thousands separators
pub fn format_number<T: Display>(n: T) -> String {
    let s = n.to_string();

    let (is_negative, digits) = if let Some(stripped) = s.strip_prefix('-') {
        (true, stripped)
    } else {
        (false, s.as_str())
    };

    let mut result = String::new();
    for (i, c) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    if is_negative {
        result.push('-');
    }

    result.chars().rev().collect()
}

pub fn section_header(title: &str) {
    println!();
    println!("{}", title.bold().underline());
}

/// One line of a tree listing
pub fn tree_item(last: bool, key: &str, value: Option<&str>) {
    let prefix = if last { "└─" } else { "├─" };
    match value {
        Some(value) => println!("{} {}: {}", prefix, key, value.bold()),
        None => println!("{} {}", prefix, key),
    }
}

pub fn warning(msg: &str) {
    eprintln!("{} {}", "⚠".yellow(), msg.yellow());
}

pub fn info(msg: &str) {
    eprintln!("{} {}", "ℹ".blue(), msg);
}

pub fn success(msg: &str) {
    eprintln!("{} {}", "✓".green(), msg.green());
}
