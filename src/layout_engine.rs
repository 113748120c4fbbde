pub mod geometry;
pub mod manager;
pub mod projection;
pub mod tree;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use geometry::LayoutRect;
pub use manager::{LayoutManager, WorkspaceLayoutState};
pub use projection::TAB_STRIP_ROWS;
pub use tree::{BspTree, NodeId, NodeKind, Orientation};

use crate::model::session::SessionId;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("viewport must be at least 1x1 cells, got {width}x{height}")]
    InvalidViewport { width: u16, height: u16 },
    #[error("rectangle must be at least 1x1 cells, got {width}x{height}")]
    InvalidRect { width: u16, height: u16 },
    #[error("workspace id must be in 1..=9, got {0}")]
    InvalidWorkspaceId(u8),
}

/// Layout discipline of a workspace.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LayoutMode {
    /// Binary-tree tiling; every session is visible in its own pane.
    #[default]
    Tiled,
    /// One full-screen session at a time, selected by cycling the stack.
    Monocle,
    /// One session below a tab strip, selected by index.
    Floating,
}

/// Where each session of a workspace sits on screen after a layout pass.
/// Hidden sessions keep an entry with `visible = false` so the renderer can
/// unmount them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionLayout {
    pub session_id: SessionId,
    pub rect: LayoutRect,
    pub visible: bool,
    pub focused: bool,
    /// Position in the tab strip; only set in tab mode.
    pub tab_index: Option<usize>,
}

/// Step direction for cycling the monocle stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleDirection {
    Next,
    Prev,
}

/// Sign applied to a split-ratio adjustment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeDirection {
    Grow,
    Shrink,
}
