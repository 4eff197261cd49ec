use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};
use owo_colors::OwoColorize;

use crate::status::LiveStatus;

const PLACEHOLDER: &str = "-";

fn or_placeholder<T: ToString>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

fn state_text(running: Option<bool>, use_color: bool) -> String {
    match (running, use_color) {
        (None, _) => PLACEHOLDER.to_string(),
        (Some(true), true) => format!("{} {}", "\u{25cf}".green(), "running".green()),
        (Some(false), true) => format!("{} {}", "\u{25cf}".red(), "stopped".red()),
        (Some(true), false) => "\u{25cf} running".to_string(),
        (Some(false), false) => "\u{25cf} stopped".to_string(),
    }
}

/// Render the fleet status table.
pub fn render_status_table(rows: &[LiveStatus], use_color: bool) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Tenant"),
        Cell::new("Port").set_alignment(CellAlignment::Right),
        Cell::new("State").set_alignment(CellAlignment::Center),
        Cell::new("PID").set_alignment(CellAlignment::Right),
        Cell::new("Memory").set_alignment(CellAlignment::Right),
        Cell::new("Autostart").set_alignment(CellAlignment::Center),
        Cell::new("Pairing"),
    ]);

    for row in rows {
        let memory = row
            .resident_memory_mb
            .map(|mb| format!("{mb} MB"))
            .unwrap_or_else(|| PLACEHOLDER.to_string());
        let autostart = match row.autostart {
            Some(true) => "yes",
            Some(false) => "no",
            None => PLACEHOLDER,
        };
        table.add_row(vec![
            Cell::new(&row.tenant_id),
            Cell::new(row.port).set_alignment(CellAlignment::Right),
            Cell::new(state_text(row.running, use_color)),
            Cell::new(or_placeholder(row.pid)).set_alignment(CellAlignment::Right),
            Cell::new(memory).set_alignment(CellAlignment::Right),
            Cell::new(autostart).set_alignment(CellAlignment::Center),
            Cell::new(or_placeholder(row.pairing_token.as_deref())),
        ]);
    }

    let mut out = String::new();
    // Indent the table by 2 spaces
    for line in table.to_string().lines() {
        out.push_str("  ");
        out.push_str(line);
        out.push('\n');
    }
    // Tenants whose state is unknown are left out of the running count.
    let running = rows.iter().filter(|r| r.running == Some(true)).count();
    let known = rows.iter().filter(|r| r.running.is_some()).count();
    let unknown = rows.len() - known;
    if unknown > 0 {
        out.push_str(&format!(
            "\n  {running} of {known} tenants running ({unknown} unknown)\n"
        ));
    } else {
        out.push_str(&format!("\n  {running} of {known} tenants running\n"));
    }
    out
}

/// One `tenant  token` line per row, then a count of tenants with a token.
/// Tenants without a token show `-`.
pub fn render_pairing_lines(rows: &[LiveStatus]) -> String {
    let width = rows.iter().map(|r| r.tenant_id.len()).max().unwrap_or(0);
    let mut out: String = rows
        .iter()
        .map(|r| {
            format!(
                "{:<width$}  {}\n",
                r.tenant_id,
                or_placeholder(r.pairing_token.as_deref())
            )
        })
        .collect();
    let with_token = rows.iter().filter(|r| r.pairing_token.is_some()).count();
    out.push_str(&format!(
        "\n{with_token} of {} tenants have a pairing token\n",
        rows.len()
    ));
    out
}
