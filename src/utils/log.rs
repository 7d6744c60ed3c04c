// src/utils/log.rs

//! Console output for the CLI.
//!
//! Human-facing report lines go to stdout with a timestamp prefix.
//! Diagnostics go through the `log` facade instead.

use chrono::Local;

const RULE_WIDTH: usize = 60;

/// Prefix a line with the local wall-clock time.
fn stamp(message: &str) -> String {
    format!("[{}] {}", Local::now().format("%Y-%m-%d %H:%M:%S"), message)
}

fn header_lines(title: &str) -> Vec<String> {
    let border = "═".repeat(RULE_WIDTH);
    vec![border.clone(), format!("  {}", title), border]
}

fn summary_lines(title: &str, items: &[(&str, String)]) -> Vec<String> {
    let mut lines = vec![format!("[SUMMARY] {}", title)];
    lines.extend(items.iter().map(|(key, value)| format!("    {}: {}", key, value)));
    lines
}

/// Log a header
pub fn header(title: &str) {
    for line in header_lines(title) {
        println!("{}", stamp(&line));
    }
}

/// Log a sub-item (indented)
pub fn sub_item(message: &str) {
    println!("{}", stamp(&format!("    {}", message)));
}

/// Log a success message
pub fn success(message: &str) {
    println!("{}", stamp(&format!("[OK] {}", message)));
}

/// Log a summary section
pub fn summary(title: &str, items: &[(&str, String)]) {
    println!();
    for line in summary_lines(title, items) {
        println!("{}", stamp(&line));
    }
}
