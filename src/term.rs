//! Terminal session helpers.
//!
//! WezTerm user-var escapes and xterm window manipulation sequences
//! emitted around a presentation. Terminals that do not recognize the
//! sequences ignore them, so emission is always best-effort.
use std::io::{self, Write};

use base64::Engine as _;

/// User var a WezTerm config can react to (see [`wezterm_snippet`]).
const PRESENTATION_VAR: &str = "termdeck_presentation";

/// Build the OSC 1337 `SetUserVar` sequence for `name` = `value`.
fn set_user_var_sequence(name: &str, value: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(value);
    format!("\x1b]1337;SetUserVar={name}={encoded}\x07")
}

/// Announce presentation mode and ask the window manager to maximize.
pub fn enter_presentation_mode() {
    let mut stdout = io::stdout();
    let _ = stdout.write_all(set_user_var_sequence(PRESENTATION_VAR, "1").as_bytes());
    // CSI 9;1t = maximize window
    let _ = stdout.write_all(b"\x1b[9;1t");
    let _ = stdout.flush();
}

/// Clear the presentation var and restore the window state.
pub fn exit_presentation_mode() {
    let mut stdout = io::stdout();
    let _ = stdout.write_all(set_user_var_sequence(PRESENTATION_VAR, "0").as_bytes());
    // CSI 9;0t = restore window
    let _ = stdout.write_all(b"\x1b[9;0t");
    let _ = stdout.flush();
}

/// Ready-to-paste `~/.wezterm.lua` handler reacting to the presentation
/// user var.
pub fn wezterm_snippet() -> String {
    format!(
        "\nAdd this to your ~/.wezterm.lua to enable presentation mode (hide tab bar):\n\n\
-- termdeck presentation mode: hide tab bar when {PRESENTATION_VAR} user var is set\n\
wezterm.on('user-var-changed', function(window, pane, name, value)\n\
  if name == '{PRESENTATION_VAR}' then\n\
    local overrides = window:get_config_overrides() or {{}}\n\
    if value == '1' then\n\
      overrides.enable_tab_bar = false\n\
      overrides.window_padding = {{ left = 0, right = 0, top = 0, bottom = 0 }}\n\
    else\n\
      overrides.enable_tab_bar = nil\n\
      overrides.window_padding = nil\n\
    end\n\
    window:set_config_overrides(overrides)\n\
  end\n\
end)\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enter_sequence_encodes_one() {
        let seq = set_user_var_sequence(PRESENTATION_VAR, "1");
        assert_eq!(seq, "\x1b]1337;SetUserVar=termdeck_presentation=MQ==\x07");
    }

    #[test]
    fn test_exit_sequence_encodes_zero() {
        let seq = set_user_var_sequence(PRESENTATION_VAR, "0");
        assert_eq!(seq, "\x1b]1337;SetUserVar=termdeck_presentation=MA==\x07");
    }

    #[test]
    fn test_wezterm_snippet_reacts_to_our_var() {
        let snippet = wezterm_snippet();
        assert!(snippet.contains("user-var-changed"));
        assert!(snippet.contains(PRESENTATION_VAR));
        assert!(snippet.contains("enable_tab_bar = false"));
    }
}
