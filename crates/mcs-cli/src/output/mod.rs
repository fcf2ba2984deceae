//! Output formatting utilities for the CLI

use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use tabled::{settings::Style, Table, Tabled};

use mcs_core::OperatorEntry;

/// Format the operator list as a table, in list order
pub fn format_operators(operators: &[OperatorEntry]) -> String {
    if operators.is_empty() {
        return "No operators configured".to_string();
    }

    #[derive(Tabled)]
    struct OperatorRow {
        #[tabled(rename = "#")]
        index: usize,
        #[tabled(rename = "NAME")]
        name: String,
        #[tabled(rename = "LEVEL")]
        level: u8,
        #[tabled(rename = "UUID")]
        uuid: String,
    }

    let rows: Vec<OperatorRow> = operators
        .iter()
        .enumerate()
        .map(|(i, op)| OperatorRow {
            index: i + 1,
            name: op.name.clone(),
            level: op.level,
            uuid: op.uuid.clone().unwrap_or_else(|| "-".to_string()),
        })
        .collect();

    Table::new(rows).with(Style::rounded()).to_string()
}

/// Write `msg` behind a colored status marker
fn write_status<W: std::io::Write>(
    out: &mut W,
    color: Color,
    marker: &str,
    msg: &str,
) -> std::io::Result<()> {
    crossterm::execute!(
        out,
        SetForegroundColor(color),
        Print(marker),
        Print(' '),
        ResetColor,
        Print(msg),
        Print('\n')
    )
}

/// Print a success message to stdout
pub fn print_success(msg: &str) {
    let _ = write_status(&mut std::io::stdout(), Color::Green, "✓", msg);
}

/// Print an error message to stderr
pub fn print_error(msg: &str) {
    let _ = write_status(&mut std::io::stderr(), Color::Red, "✗", msg);
}

/// Print a warning to stderr
pub fn print_warning(msg: &str) {
    let _ = write_status(&mut std::io::stderr(), Color::Yellow, "⚠", msg);
}

/// Print an informational line to stdout
pub fn print_info(msg: &str) {
    let _ = write_status(&mut std::io::stdout(), Color::Cyan, "ℹ", msg);
}
