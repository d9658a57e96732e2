//! Terminal styling utilities for the dashboard output

use console::{style, Emoji};
use std::path::Path;

// Emoji icons with fallbacks for terminals that don't support them
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "[*] ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", ">> ");
pub static CHART: Emoji<'_, '_> = Emoji("📊 ", "");
pub static FOLDER: Emoji<'_, '_> = Emoji("📂 ", "");
pub static CALENDAR: Emoji<'_, '_> = Emoji("📅 ", "");
pub static SAVE: Emoji<'_, '_> = Emoji("💾 ", "");
pub static FILTER: Emoji<'_, '_> = Emoji("🔎 ", "");

/// Print the application banner
pub fn print_banner(version: &str) {
    let banner = r#"
    ┌─┐┌─┐┬─┐┌─┐┌─┐┬  ┬  ┬┬┌─┐┬ ┬
    ├─┘├─┤├┬┘│  ├┤ │  └┐┌┘│├┤ │││
    ┴  ┴ ┴┴└─└─┘└─┘┴─┘ └┘ ┴└─┘└┴┘
    "#;

    println!();
    println!("{}", style(banner).cyan().bold());
    println!(
        "    {}",
        style("Outbound parcel analysis dashboards").dim()
    );
    println!("    {}", style(format!("v{}", version)).dim());
    println!("    {}", style("━".repeat(50)).dim());
    println!();
}

/// Inputs and selections for one dashboard run.
pub struct RunCard<'a> {
    pub title: &'a str,
    pub inputs: Vec<&'a Path>,
    pub date_range: String,
    pub filters: Vec<String>,
    pub output: Option<&'a Path>,
}

/// Print configuration card
pub fn print_config(card: &RunCard<'_>) {
    let box_width = 56;
    let line = "─".repeat(box_width - 2);

    println!("    ┌{}┐", line);
    println!(
        "    │ {:<width$}│",
        style(format!("⚙️  {}", card.title)).cyan().bold(),
        width = box_width - 3
    );
    println!("    ├{}┤", line);
    for input in &card.inputs {
        println!(
            "    │  {} Input:   {:<38}│",
            FOLDER,
            truncate_path(input, 37)
        );
    }
    if let Some(output) = card.output {
        println!(
            "    │  {} Output:  {:<38}│",
            SAVE,
            truncate_path(output, 37)
        );
    }
    println!("    ├{}┤", line);
    println!(
        "    │  {} Dates:   {:<38}│",
        CALENDAR,
        style(truncate_string(&card.date_range, 37)).yellow()
    );
    for filter in &card.filters {
        println!(
            "    │  {} Filter:  {:<38}│",
            FILTER,
            style(truncate_string(filter, 37)).yellow()
        );
    }
    println!("    └{}┘", line);
    println!();
}

/// Print a step header with styling
pub fn print_step_header(step_num: u8, title: &str) {
    println!();
    println!(
        "    {} {} {}",
        style(format!("STEP {}", step_num)).cyan().bold(),
        style("│").dim(),
        style(title).white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
}

/// Print a view header: title plus the view's command-line name
pub fn print_view_header(title: &str, name: &str) {
    println!();
    println!(
        "    {}{} {}",
        CHART,
        style(title).white().bold(),
        style(format!("[{}]", name)).dim()
    );
    println!("    {}", style("─".repeat(50)).dim());
}

pub fn print_success(message: &str) {
    println!("    {} {}", style("✓").green().bold(), style(message).green());
}

pub fn print_warning(message: &str) {
    println!("    {} {}", style("!").yellow().bold(), style(message).yellow());
}

pub fn print_info(message: &str) {
    println!("    {} {}", INFO, message);
}

/// Print the final completion message
pub fn print_completion(message: &str) {
    println!();
    println!("    {} {}", ROCKET, style(message).green().bold());
    println!();
}

// Helper functions

fn truncate_path(path: &Path, max_len: usize) -> String {
    let path_str = path.display().to_string();
    truncate_string(&path_str, max_len)
}

fn truncate_string(s: &str, max_len: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= max_len {
        s.to_string()
    } else {
        let tail: String = chars[chars.len() - (max_len - 3)..].iter().collect();
        format!("...{}", tail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_keeps_tail() {
        assert_eq!(truncate_string("short", 10), "short");
        assert_eq!(truncate_string("abcdefghijkl", 8), "...hijkl");
    }
}
