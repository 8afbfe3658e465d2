//! Terminal color policy.
//!
//! Follows NO_COLOR (https://no-color.org/) and the CLICOLOR conventions:
//! - `NO_COLOR` set to anything: never color
//! - `CLICOLOR_FORCE` non-zero: always color, even when piped
//! - `CLICOLOR=0`: never color
//! - otherwise color only when stdout is a terminal
use colored::control;

/// Configure `colored` for the whole process. Call once, early in `main`.
pub fn init_colors() {
    let enabled = should_colorize(
        std::env::var_os("NO_COLOR").is_some(),
        std::env::var("CLICOLOR").ok().as_deref(),
        std::env::var("CLICOLOR_FORCE").ok().as_deref(),
        std::io::IsTerminal::is_terminal(&std::io::stdout()),
    );
    control::set_override(enabled);
}

fn should_colorize(
    no_color: bool,
    clicolor: Option<&str>,
    clicolor_force: Option<&str>,
    is_tty: bool,
) -> bool {
    if no_color {
        return false;
    }
    if clicolor_force.is_some_and(|v| v != "0") {
        return true;
    }
    if clicolor == Some("0") {
        return false;
    }
    is_tty
}

#[cfg(test)]
mod tests {
    use super::should_colorize;

    #[test]
    fn test_no_color_beats_force() {
        assert!(!should_colorize(true, None, Some("1"), true));
    }

    #[test]
    fn test_force_beats_clicolor_and_tty() {
        assert!(should_colorize(false, Some("0"), Some("1"), false));
        assert!(!should_colorize(false, Some("0"), Some("0"), true));
    }

    #[test]
    fn test_defaults_to_tty() {
        assert!(should_colorize(false, None, None, true));
        assert!(!should_colorize(false, None, None, false));
        assert!(should_colorize(false, Some("1"), None, true));
    }
}
