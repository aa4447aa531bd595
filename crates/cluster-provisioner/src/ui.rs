//! Console output for the provisioner.
//!
//! Status lines go to stdout, failures to stderr.

use colored::Colorize;

const RULE_WIDTH: usize = 60;

/// Heading between workflow phases.
pub fn print_section(title: &str) {
    let rule = "─".repeat(RULE_WIDTH);
    println!("\n{}\n  {}\n{}\n", rule.dimmed(), title.bold(), rule.dimmed());
}

/// Numbered workflow step, e.g. `(3/6) Creating Kubernetes cluster`.
pub fn print_progress_step(current: u8, total: u8, message: &str) {
    println!("{} {}", format!("({current}/{total})").cyan(), message.bold());
}

pub fn print_success(message: &str) {
    println!("  {} {message}", "ok".green().bold());
}

pub fn print_warning(message: &str) {
    println!("  {} {}", "warn".yellow().bold(), message.yellow());
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", "error:".red().bold(), message);
}

pub fn print_info(message: &str) {
    println!("  {} {message}", "--".blue());
}

/// One line of the prerequisites report. `detail` follows the name when set.
pub fn print_check_result(name: &str, passed: bool, detail: Option<&str>) {
    let mark = if passed { "found".green() } else { "missing".red() };
    match detail {
        Some(detail) => println!("  [{mark}] {name} ({})", detail.dimmed()),
        None => println!("  [{mark}] {name}"),
    }
}

/// Aligned `key: value` line for summaries.
pub fn print_kv(key: &str, value: &str) {
    println!("  {:<12} {}", format!("{key}:").dimmed(), value.bold());
}

pub fn print_list_item(item: &str) {
    println!("    - {item}");
}
