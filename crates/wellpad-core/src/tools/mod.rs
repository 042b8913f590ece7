//! Interaction tools and the temporary spacebar pan override.

use serde::{Deserialize, Serialize};

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ToolKind {
    #[default]
    Select,
    Pan,
}

impl ToolKind {
    pub fn name(self) -> &'static str {
        match self {
            ToolKind::Select => "Select",
            ToolKind::Pan => "Pan",
        }
    }
}

/// Tracks the active tool and the tool to restore after a spacebar pan.
#[derive(Debug, Clone, Default)]
pub struct ToolManager {
    /// Currently active tool.
    pub current_tool: ToolKind,
    /// Tool active before the spacebar override, while it is held.
    previous_tool: Option<ToolKind>,
}

impl ToolManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the tool explicitly (toolbar or shortcut).
    ///
    /// An explicit change during a spacebar pan wins: releasing Space
    /// afterwards keeps the tool chosen here.
    pub fn set_tool(&mut self, tool: ToolKind) {
        if self.current_tool != tool {
            log::info!("Tool changed to {}", tool.name());
        }
        self.current_tool = tool;
        self.previous_tool = None;
    }

    /// Space pressed: switch to pan and remember the current tool.
    /// Key repeat while already overriding is ignored.
    pub fn begin_temporary_pan(&mut self) -> bool {
        if self.previous_tool.is_some() {
            return false;
        }
        self.previous_tool = Some(self.current_tool);
        self.current_tool = ToolKind::Pan;
        true
    }

    /// Space released: restore the remembered tool, if the override is still active.
    pub fn end_temporary_pan(&mut self) -> bool {
        match self.previous_tool.take() {
            Some(previous) => {
                self.current_tool = previous;
                true
            }
            None => false,
        }
    }

    pub fn is_panning_tool(&self) -> bool {
        self.current_tool == ToolKind::Pan
    }
}
