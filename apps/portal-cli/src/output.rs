//! Output formatting for the CLI.

use clap::ValueEnum;
use serde::Serialize;

/// Output format.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Print `value` as pretty JSON, or run `text` to print it for humans.
pub fn render<T, F>(value: &T, format: &OutputFormat, text: F) -> anyhow::Result<()>
where
    T: Serialize + ?Sized,
    F: FnOnce(&T),
{
    match format {
        OutputFormat::Text => text(value),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
    }
    Ok(())
}

/// Print a success message.
pub fn print_success(message: &str, format: &OutputFormat) {
    match format {
        OutputFormat::Text => println!("{}", message),
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({ "status": "success", "message": message })
            );
        }
    }
}

/// Print an error message.
pub fn print_error(message: &str, format: &OutputFormat) {
    match format {
        OutputFormat::Text => eprintln!("Error: {}", message),
        OutputFormat::Json => {
            eprintln!(
                "{}",
                serde_json::json!({ "status": "error", "message": message })
            );
        }
    }
}

/// Print a warning that does not stop the command.
pub fn print_warning(message: &str, format: &OutputFormat) {
    if let OutputFormat::Text = format {
        eprintln!("Warning: {}", message);
    }
}

/// Print a table row.
pub fn print_row(label: &str, value: &str) {
    println!("  {:<16} {}", format!("{}:", label), value);
}

/// Print a divider line.
pub fn print_divider() {
    println!("{}", "-".repeat(50));
}

/// Print a heading.
pub fn print_heading(text: &str) {
    println!("\n{}", text);
    print_divider();
}
