//! Keyboard shortcut registry and documentation.

/// A keyboard shortcut definition.
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: &'static str,
    pub ctrl: bool,
    pub description: &'static str,
}

impl Shortcut {
    pub const fn new(key: &'static str, ctrl: bool, description: &'static str) -> Self {
        Self { key, ctrl, description }
    }

    /// Format the shortcut for display (e.g., "Ctrl+E").
    pub fn format(&self) -> String {
        if self.ctrl {
            format!("Ctrl+{}", self.key)
        } else {
            self.key.to_string()
        }
    }
}

/// Registry of all keyboard shortcuts.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    /// Get all registered shortcuts.
    pub fn all() -> Vec<Shortcut> {
        vec![
            Shortcut::new("Space", false, "Hold to pan temporarily"),
            Shortcut::new("V", false, "Select tool"),
            Shortcut::new("H", false, "Pan tool"),
            Shortcut::new("A", false, "Add well"),
            Shortcut::new("Delete", false, "Remove selected (or last) well"),
            Shortcut::new("D", false, "Duplicate last well"),
            Shortcut::new("G", false, "Toggle grid"),
            Shortcut::new("L", false, "Toggle labels"),
            Shortcut::new("Escape", false, "Clear selection / cancel edit"),
            Shortcut::new("Z", true, "Undo"),
            Shortcut::new("Y", true, "Redo"),
            Shortcut::new("E", true, "Export to PNG"),
            Shortcut::new("Ctrl+Wheel", false, "Zoom at cursor"),
            Shortcut::new("Shift+Drag", false, "Rotate the north marker"),
        ]
    }

    /// Print all shortcuts to the log.
    pub fn log_all() {
        for shortcut in Self::all() {
            log::info!("  {:12} {}", shortcut.format(), shortcut.description);
        }
    }
}
