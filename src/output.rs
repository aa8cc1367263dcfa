//! Table and JSON output formatting for CLI commands.

use serde::Serialize;
use tabled::{Table, Tabled};

use alextras::Element;
use alextras_core::events::LifecycleEvent;
use alextras_module::CycleReport;

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON output
    Json,
}

/// Print a list of items in the selected format
pub fn print_list<T: Serialize + Tabled>(items: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if items.is_empty() {
                println!("No results found.");
            } else {
                println!("{}", Table::new(items));
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(items).unwrap_or_else(|_| "[]".to_string());
            println!("{json}");
        }
    }
}

/// Print a single JSON-serializable value
pub fn print_json<T: Serialize>(item: &T) {
    let json = serde_json::to_string_pretty(item).unwrap_or_else(|_| "null".to_string());
    println!("{json}");
}

/// Print a success message
pub fn print_success(msg: &str) {
    println!("✓ {msg}");
}

/// Print a warning message
pub fn print_warning(msg: &str) {
    println!("⚠ {msg}");
}

/// Print an error message
pub fn print_error(msg: &str) {
    eprintln!("✗ {msg}");
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:<24} {}", format!("{key}:"), value);
}

#[derive(Debug, Serialize, Tabled)]
struct OutcomeRow {
    module: String,
    outcome: String,
}

/// Print the per-module outcomes of a cycle
pub fn print_report(report: &CycleReport, format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            print_kv("Page", report.current_page.as_str());
            print_kv("Generation", &report.generation.to_string());
            let rows: Vec<OutcomeRow> = report
                .outcomes
                .iter()
                .map(|(module, outcome)| OutcomeRow {
                    module: module.clone(),
                    outcome: format!("{outcome:?}"),
                })
                .collect();
            print_list(&rows, format);
        }
        OutputFormat::Json => print_json(report),
    }
}

#[derive(Debug, Serialize, Tabled)]
struct ElementRow {
    element: String,
    text: String,
    href: String,
}

/// Print the elements modules inserted into the page
pub fn print_overlay(elements: &[(String, Element)], format: OutputFormat) {
    let rows: Vec<ElementRow> = elements
        .iter()
        .map(|(id, element)| ElementRow {
            element: id.clone(),
            text: element.text.clone(),
            href: element.href.clone().unwrap_or_default(),
        })
        .collect();
    print_list(&rows, format);
}

/// Print one lifecycle event on a single line
pub fn print_event(event: &LifecycleEvent, format: OutputFormat) {
    let payload = serde_json::to_string(&event.payload).unwrap_or_default();
    match format {
        OutputFormat::Table => println!("[{}] {payload}", event.surface),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string(event).unwrap_or(payload));
        }
    }
}
