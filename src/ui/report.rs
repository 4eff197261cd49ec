use owo_colors::OwoColorize;

use crate::batch::BatchReport;

/// One line per tenant followed by a failure summary.
///
/// `describe` renders a successful outcome; failures show the full error
/// chain.
pub fn render_report<T>(
    report: &BatchReport<T>,
    describe: impl Fn(&T) -> String,
    use_color: bool,
) -> String {
    let width = report
        .entries
        .iter()
        .map(|e| e.identity.id.len())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for entry in &report.entries {
        let (tag, detail) = match &entry.outcome {
            Ok(value) => {
                let tag = if use_color {
                    "[ok]".green().to_string()
                } else {
                    "[ok]".to_string()
                };
                (tag, describe(value))
            }
            Err(e) => {
                let tag = if use_color {
                    "[!!]".red().to_string()
                } else {
                    "[!!]".to_string()
                };
                (tag, format!("{e:#}"))
            }
        };
        out.push_str(&format!(
            "  {} {:<width$}  {}\n",
            tag, entry.identity.id, detail
        ));
    }

    out.push('\n');
    out.push_str(&summary_line(report.failures(), report.len(), use_color));
    out
}

pub fn summary_line(failures: usize, total: usize, use_color: bool) -> String {
    let text = format!("{failures} of {total} tenants failed");
    if failures > 0 && use_color {
        format!("  {}\n", text.red())
    } else {
        format!("  {text}\n")
    }
}
