pub mod report;
pub mod status;

use is_terminal::IsTerminal;

/// Colorize only when stdout is an interactive terminal.
pub fn use_color() -> bool {
    std::io::stdout().is_terminal()
}
