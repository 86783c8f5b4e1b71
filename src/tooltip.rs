//! Tooltip state for hover details on widgets
//!
//! Transitions return a new state and never touch the old one.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TooltipState {
    pub visible: bool,
    pub content: String,
    pub x: f64,
    pub y: f64,
}

impl TooltipState {
    pub fn hidden() -> Self {
        Self::default()
    }

    /// Show `content` anchored at (x, y)
    pub fn show(&self, content: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            visible: true,
            content: content.into(),
            x,
            y,
        }
    }

    /// Hide, keeping the last content and position
    pub fn hide(&self) -> Self {
        Self {
            visible: false,
            ..self.clone()
        }
    }

    /// Follow the pointer; a hidden tooltip stays hidden
    pub fn move_to(&self, x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            ..self.clone()
        }
    }
}
