//! Output formatting for CLI

use crate::pipeline::TrainingResult;

/// Print a section header
pub fn print_section(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("{title}");
    println!("{}", "=".repeat(60));
}

/// Print a subsection header
pub fn print_subsection(title: &str) {
    println!("\n{title}");
    println!("{}", "-".repeat(40));
}

/// Format a number with thousands separators
pub fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.insert(0, ',');
        }
        result.insert(0, c);
    }
    result
}

/// Format a count with its share of `total`
pub fn format_share(count: usize, total: usize) -> String {
    if total == 0 {
        format_number(count)
    } else {
        format!(
            "{} ({:.1}%)",
            format_number(count),
            count as f64 / total as f64 * 100.0
        )
    }
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:20} {}", format!("{}:", key), value);
}

/// Print the outcome breakdown of a pipeline run
pub fn print_run_result(result: &TrainingResult) {
    print_kv("Episodes", &format_number(result.episodes));
    print_kv("Steps", &format_number(result.total_steps));
    print_kv("Captured", &format_share(result.captures, result.episodes));
    print_kv("Blocked", &format_share(result.blocked, result.episodes));
    print_kv("Step limit", &format_share(result.timeouts, result.episodes));
    print_kv("Escape steps", &format_number(result.escape_steps));
    print_kv("Mean return", &format!("{:.2}", result.mean_return));
    print_kv("Table states", &format_number(result.table_size));
}
