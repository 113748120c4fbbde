use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::common::config::Settings;
use crate::layout_engine::geometry::LayoutRect;
use crate::layout_engine::tree::BspTree;
use crate::layout_engine::{
    CycleDirection, LayoutError, LayoutMode, ResizeDirection, SessionLayout, projection,
};
use crate::model::session::SessionId;
use crate::model::workspace::{WORKSPACE_COUNT, Workspace, WorkspaceId};

pub const DEFAULT_VIEWPORT_WIDTH: u16 = 80;
pub const DEFAULT_VIEWPORT_HEIGHT: u16 = 24;

/// Presentation bookkeeping for one workspace. The tree, the stack order and
/// the tab cursor all stay live regardless of the current mode, so switching
/// modes and back restores the previous arrangement exactly.
#[derive(Debug, Serialize, Deserialize)]
pub struct WorkspaceLayoutState {
    mode: LayoutMode,
    tree: BspTree,
    stack_order: Vec<SessionId>,
    stack_index: usize,
    tab_index: usize,
    /// Cached result of the last layout pass. Cleared by every mutation,
    /// rebuilt lazily by the next `apply_layout`; never authoritative.
    #[serde(skip)]
    last_layouts: Vec<SessionLayout>,
    last_modified: SystemTime,
}

impl Default for WorkspaceLayoutState {
    fn default() -> Self {
        Self {
            mode: LayoutMode::default(),
            tree: BspTree::new(),
            stack_order: Vec::new(),
            stack_index: 0,
            tab_index: 0,
            last_layouts: Vec::new(),
            last_modified: SystemTime::now(),
        }
    }
}

impl WorkspaceLayoutState {
    pub fn mode(&self) -> LayoutMode { self.mode }

    pub fn tree(&self) -> &BspTree { &self.tree }

    pub fn stack_order(&self) -> &[SessionId] { &self.stack_order }

    pub fn stack_index(&self) -> usize { self.stack_index }

    pub fn tab_index(&self) -> usize { self.tab_index }

    pub fn last_modified(&self) -> SystemTime { self.last_modified }

    fn invalidate(&mut self) {
        self.last_layouts.clear();
        self.last_modified = SystemTime::now();
    }
}

/// Owns the layout state of all nine workspaces plus the viewport, and turns
/// membership into geometry via the projection rules.
///
/// Membership truth lives in [`Workspace`]; everything here is a dependent
/// presentation structure. Callers apply each membership change to both
/// before the next `apply_layout` for that workspace.
#[derive(Debug, Serialize, Deserialize)]
pub struct LayoutManager {
    states: [WorkspaceLayoutState; WORKSPACE_COUNT],
    viewport: LayoutRect,
}

impl Default for LayoutManager {
    fn default() -> Self { Self::new() }
}

impl LayoutManager {
    pub fn new() -> Self {
        Self {
            states: std::array::from_fn(|_| WorkspaceLayoutState::default()),
            viewport: LayoutRect {
                x: 0,
                y: 0,
                width: DEFAULT_VIEWPORT_WIDTH,
                height: DEFAULT_VIEWPORT_HEIGHT,
            },
        }
    }

    pub fn with_settings(settings: &Settings) -> Self {
        let mut manager = Self::new();
        manager.viewport.width = settings.layout.viewport_width;
        manager.viewport.height = settings.layout.viewport_height;
        for state in &mut manager.states {
            state.mode = settings.layout.default_mode;
        }
        manager
    }

    pub fn viewport(&self) -> LayoutRect { self.viewport }

    pub fn state(&self, workspace: WorkspaceId) -> &WorkspaceLayoutState {
        &self.states[workspace.index()]
    }

    fn state_mut(&mut self, workspace: WorkspaceId) -> &mut WorkspaceLayoutState {
        &mut self.states[workspace.index()]
    }

    /// Computes (or serves from cache) the rectangle of every session in the
    /// workspace under its current mode.
    pub fn apply_layout(&mut self, workspace: &Workspace, force_recalc: bool) -> Vec<SessionLayout> {
        let viewport = self.viewport;
        let state = &mut self.states[workspace.id().index()];
        if !force_recalc && !state.last_layouts.is_empty() {
            return state.last_layouts.clone();
        }

        debug!(workspace = %workspace.id(), mode = %workspace.layout_mode(), "recomputing layout");
        let focused = workspace.focused_session();
        let layouts = match workspace.layout_mode() {
            LayoutMode::Tiled => {
                Self::sync_tree(state, workspace.session_ids());
                let rects = projection::project(&state.tree, viewport);
                workspace
                    .session_ids()
                    .iter()
                    .map(|&session_id| SessionLayout {
                        session_id,
                        rect: rects.get(&session_id).copied().unwrap_or(viewport),
                        visible: true,
                        focused: focused == Some(session_id),
                        tab_index: None,
                    })
                    .collect()
            }
            LayoutMode::Monocle => {
                Self::sync_stack(state, workspace.session_ids());
                projection::stack_layouts(&state.stack_order, state.stack_index, viewport, focused)
            }
            LayoutMode::Floating => {
                state.tab_index = state
                    .tab_index
                    .min(workspace.session_ids().len().saturating_sub(1));
                projection::tab_layouts(workspace.session_ids(), state.tab_index, viewport, focused)
            }
        };
        state.last_layouts = layouts.clone();
        layouts
    }

    /// Drops sessions that left the workspace and tiles newcomers, so the
    /// tree matches membership even if a caller skipped a layout update.
    fn sync_tree(state: &mut WorkspaceLayoutState, sessions: &[SessionId]) {
        for session in state.tree.sessions() {
            if !sessions.contains(&session) {
                state.tree.remove_node(session);
            }
        }
        for &session in sessions {
            if !state.tree.contains(session) {
                state.tree.insert_spiral(session);
            }
        }
    }

    /// Drops stale ids preserving relative order, appends newcomers at the
    /// end, and keeps the cursor on a live entry.
    fn sync_stack(state: &mut WorkspaceLayoutState, sessions: &[SessionId]) {
        state.stack_order.retain(|session| sessions.contains(session));
        for &session in sessions {
            if !state.stack_order.contains(&session) {
                state.stack_order.push(session);
            }
        }
        state.stack_index = state
            .stack_index
            .min(state.stack_order.len().saturating_sub(1));
    }

    pub fn set_viewport_size(&mut self, width: u16, height: u16) -> Result<(), LayoutError> {
        if width < 1 || height < 1 {
            return Err(LayoutError::InvalidViewport { width, height });
        }
        self.viewport = LayoutRect { x: 0, y: 0, width, height };
        // all geometry depends on the viewport
        for state in &mut self.states {
            state.invalidate();
        }
        Ok(())
    }

    /// Registers a session with every per-mode structure of the workspace,
    /// so whichever mode is selected next is already consistent.
    pub fn add_session_to_layout(&mut self, workspace: WorkspaceId, session: SessionId) -> bool {
        let state = self.state_mut(workspace);
        let tiled = state.tree.insert_spiral(session);
        let stacked = if state.stack_order.contains(&session) {
            false
        } else {
            state.stack_order.push(session);
            true
        };
        if tiled || stacked {
            state.invalidate();
        }
        tiled || stacked
    }

    pub fn remove_session_from_layout(&mut self, workspace: WorkspaceId, session: SessionId) -> bool {
        let state = self.state_mut(workspace);
        let untiled = state.tree.remove_node(session);
        let unstacked = match state.stack_order.iter().position(|&s| s == session) {
            Some(index) => {
                state.stack_order.remove(index);
                state.stack_index = state
                    .stack_index
                    .min(state.stack_order.len().saturating_sub(1));
                true
            }
            None => false,
        };
        if untiled || unstacked {
            state.invalidate();
        }
        untiled || unstacked
    }

    /// Moves the monocle cursor one step through the stack, wrapping at
    /// either end. Only meaningful in monocle mode.
    pub fn cycle_stack(&mut self, workspace: WorkspaceId, direction: CycleDirection) -> bool {
        let state = self.state_mut(workspace);
        if state.mode != LayoutMode::Monocle {
            warn!(workspace = %workspace, "cycle_stack outside monocle mode");
            return false;
        }
        let len = state.stack_order.len();
        if len == 0 {
            return false;
        }
        state.stack_index = match direction {
            CycleDirection::Next => (state.stack_index + 1) % len,
            CycleDirection::Prev => (state.stack_index + len - 1) % len,
        };
        state.invalidate();
        true
    }

    /// Selects a tab by position. The index is bounds-checked against the
    /// live membership on the next `apply_layout`, which clamps it.
    pub fn switch_tab(&mut self, workspace: WorkspaceId, index: usize) -> bool {
        let state = self.state_mut(workspace);
        state.tab_index = index;
        state.invalidate();
        true
    }

    /// Switches the workspace's layout discipline. Entering monocle or tab
    /// mode rewinds its cursor; the tiling tree is never reset, so returning
    /// to tiled mode restores the previous arrangement.
    pub fn change_layout_mode(&mut self, workspace: WorkspaceId, mode: LayoutMode) -> bool {
        let state = self.state_mut(workspace);
        if state.mode == mode {
            return true;
        }
        state.mode = mode;
        match mode {
            LayoutMode::Monocle => state.stack_index = 0,
            LayoutMode::Floating => state.tab_index = 0,
            LayoutMode::Tiled => {}
        }
        state.invalidate();
        true
    }

    /// Grows or shrinks the focused session's pane by adjusting its parent
    /// split. Only meaningful in tiled mode.
    pub fn adjust_split(
        &mut self,
        workspace: &Workspace,
        direction: ResizeDirection,
        delta: f32,
    ) -> bool {
        let state = &mut self.states[workspace.id().index()];
        if state.mode != LayoutMode::Tiled {
            warn!(workspace = %workspace.id(), "adjust_split outside tiled mode");
            return false;
        }
        let Some(focused) = workspace.focused_session() else {
            return false;
        };
        let signed = match direction {
            ResizeDirection::Grow => delta,
            ResizeDirection::Shrink => -delta,
        };
        let adjusted = state.tree.rebalance_subtree(focused, signed);
        if adjusted {
            state.invalidate();
        }
        adjusted
    }

    /// Exchanges two panes in the workspace's tiling tree.
    pub fn swap_sessions(&mut self, workspace: WorkspaceId, a: SessionId, b: SessionId) -> bool {
        let state = self.state_mut(workspace);
        let swapped = state.tree.swap_panes(a, b);
        if swapped {
            state.invalidate();
        }
        swapped
    }

    pub fn focused_session_layout(&mut self, workspace: &Workspace) -> Option<SessionLayout> {
        let focused = workspace.focused_session()?;
        self.apply_layout(workspace, false)
            .into_iter()
            .find(|layout| layout.session_id == focused)
    }
}
