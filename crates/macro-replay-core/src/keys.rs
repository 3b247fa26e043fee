//! Canonical key names.
//!
//! A key is stored as either a single printable character (`"a"`, `"/"`) or a
//! lower-case symbolic name for non-printable keys (`"esc"`, `"enter"`,
//! `"shift"`). Listeners produce these names and injectors consume them, so
//! this is the one place that decides what a key is called.

/// Canonical name of the key that stops capture and playback.
pub const ABORT_KEY: &str = "esc";

/// Human-readable label of the abort key for prompts and logs.
pub const ABORT_KEY_LABEL: &str = "ESC";

/// Prefix used by older recordings for symbolic keys (`Key.esc`, `Key.enter`).
const LEGACY_PREFIX: &str = "Key.";

/// Normalize a stored or user-supplied key name to its canonical form.
///
/// Single characters are kept verbatim (case matters for printable keys).
/// Symbolic names lose the legacy `Key.` prefix and are lower-cased, with a
/// few common aliases folded together.
pub fn canonical_key_name(raw: &str) -> String {
    let name = raw.strip_prefix(LEGACY_PREFIX).unwrap_or(raw);

    if name.chars().count() == 1 {
        return name.to_string();
    }

    let lower = name.to_ascii_lowercase();
    match lower.as_str() {
        "escape" => "esc".to_string(),
        "return" => "enter".to_string(),
        "control" => "ctrl".to_string(),
        "cmd" | "super" | "meta" | "win" => "cmd".to_string(),
        "del" => "delete".to_string(),
        "pgup" => "page_up".to_string(),
        "pgdn" => "page_down".to_string(),
        _ => lower,
    }
}

/// Whether two key names refer to the same key once canonicalized.
pub fn same_key(a: &str, b: &str) -> bool {
    canonical_key_name(a) == canonical_key_name(b)
}
