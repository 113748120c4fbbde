use std::fmt;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::common::collections::HashMap;
use crate::common::config::Settings;
use crate::layout_engine::{LayoutError, LayoutMode};
use crate::model::session::SessionId;

pub const WORKSPACE_COUNT: usize = 9;

/// One of the nine fixed workspace slots, numbered 1..=9. Validated at
/// construction so downstream code can index arrays without rechecking.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct WorkspaceId(u8);

impl WorkspaceId {
    pub fn new(raw: u8) -> Result<Self, LayoutError> {
        if !(1..=WORKSPACE_COUNT as u8).contains(&raw) {
            return Err(LayoutError::InvalidWorkspaceId(raw));
        }
        Ok(Self(raw))
    }

    pub fn raw(self) -> u8 { self.0 }

    pub(crate) fn index(self) -> usize { usize::from(self.0) - 1 }

    pub fn all() -> impl Iterator<Item = WorkspaceId> {
        (1..=WORKSPACE_COUNT as u8).map(WorkspaceId)
    }
}

impl TryFrom<u8> for WorkspaceId {
    type Error = LayoutError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> { Self::new(raw) }
}

impl From<WorkspaceId> for u8 {
    fn from(id: WorkspaceId) -> u8 { id.0 }
}

impl fmt::Display for WorkspaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

/// Membership truth for one workspace: which sessions it holds, in what
/// order, and which of them has focus. The session list's insertion order is
/// the tab order and the seed order for the monocle stack.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Workspace {
    id: WorkspaceId,
    name: String,
    session_ids: Vec<SessionId>,
    focused_session: Option<SessionId>,
    layout_mode: LayoutMode,
    created_at: SystemTime,
    modified_at: SystemTime,
}

impl Workspace {
    pub(crate) fn new(id: WorkspaceId, name: String) -> Self {
        let now = SystemTime::now();
        Self {
            id,
            name,
            session_ids: Vec::new(),
            focused_session: None,
            layout_mode: LayoutMode::default(),
            created_at: now,
            modified_at: now,
        }
    }

    pub fn id(&self) -> WorkspaceId { self.id }

    pub fn name(&self) -> &str { &self.name }

    pub fn session_ids(&self) -> &[SessionId] { &self.session_ids }

    pub fn focused_session(&self) -> Option<SessionId> { self.focused_session }

    pub fn layout_mode(&self) -> LayoutMode { self.layout_mode }

    pub fn created_at(&self) -> SystemTime { self.created_at }

    pub fn modified_at(&self) -> SystemTime { self.modified_at }

    pub fn session_count(&self) -> usize { self.session_ids.len() }

    pub fn is_empty(&self) -> bool { self.session_ids.is_empty() }

    pub fn contains_session(&self, session: SessionId) -> bool {
        self.session_ids.contains(&session)
    }

    /// Appends the session if it is not already a member.
    pub fn add_session(&mut self, session: SessionId) -> bool {
        if self.session_ids.contains(&session) {
            return false;
        }
        self.session_ids.push(session);
        self.touch();
        true
    }

    /// Removes the session if present. When the focused session is removed,
    /// focus falls to the member now occupying its index, or the last member
    /// when it was at the end, or nothing when the workspace emptied.
    pub fn remove_session(&mut self, session: SessionId) -> bool {
        let Some(index) = self.session_ids.iter().position(|&s| s == session) else {
            return false;
        };
        self.session_ids.remove(index);
        if self.focused_session == Some(session) {
            self.focused_session = if self.session_ids.is_empty() {
                None
            } else {
                Some(self.session_ids[index.min(self.session_ids.len() - 1)])
            };
        }
        self.touch();
        true
    }

    /// `None` always clears focus; a concrete session must be a member.
    pub fn set_focus(&mut self, session: Option<SessionId>) -> bool {
        match session {
            None => {
                self.focused_session = None;
                self.touch();
                true
            }
            Some(s) if self.session_ids.contains(&s) => {
                self.focused_session = Some(s);
                self.touch();
                true
            }
            Some(s) => {
                warn!(session = %s, workspace = %self.id, "cannot focus a non-member session");
                false
            }
        }
    }

    pub fn set_layout_mode(&mut self, mode: LayoutMode) {
        if self.layout_mode != mode {
            self.layout_mode = mode;
            self.touch();
        }
    }

    pub fn rename(&mut self, name: String) {
        self.name = name;
        self.touch();
    }

    fn touch(&mut self) { self.modified_at = SystemTime::now(); }
}

/// Totals over the whole manager, for status surfaces.
#[derive(Clone, Debug)]
pub struct WorkspaceStats {
    pub total_sessions: usize,
    pub occupied_workspaces: usize,
    pub session_counts: HashMap<WorkspaceId, usize>,
}

/// The nine workspaces, pre-created for the life of the process, plus the
/// active-workspace cursor. Session ids are assumed unique across the whole
/// manager; the session backend guarantees that.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkspaceManager {
    workspaces: [Workspace; WORKSPACE_COUNT],
    active_workspace: WorkspaceId,
}

impl Default for WorkspaceManager {
    fn default() -> Self { Self::new() }
}

impl WorkspaceManager {
    pub fn new() -> Self {
        let workspaces = std::array::from_fn(|i| {
            let id = WorkspaceId(i as u8 + 1);
            Workspace::new(id, format!("{}", i + 1))
        });
        Self {
            workspaces,
            active_workspace: WorkspaceId(1),
        }
    }

    /// Applies configured workspace names and the default layout mode.
    pub fn with_settings(settings: &Settings) -> Self {
        let mut manager = Self::new();
        for (i, workspace) in manager.workspaces.iter_mut().enumerate() {
            if let Some(name) = settings.workspace.names.get(i) {
                workspace.name = name.clone();
            }
            workspace.layout_mode = settings.layout.default_mode;
        }
        manager
    }

    pub fn workspace(&self, id: WorkspaceId) -> &Workspace { &self.workspaces[id.index()] }

    pub fn workspace_mut(&mut self, id: WorkspaceId) -> &mut Workspace {
        &mut self.workspaces[id.index()]
    }

    pub fn workspaces(&self) -> impl Iterator<Item = &Workspace> { self.workspaces.iter() }

    pub fn active_workspace(&self) -> WorkspaceId { self.active_workspace }

    pub fn set_active_workspace(&mut self, id: WorkspaceId) { self.active_workspace = id; }

    /// Adds the session; a previously empty workspace focuses it.
    pub fn add_session_to_workspace(&mut self, id: WorkspaceId, session: SessionId) -> bool {
        let workspace = &mut self.workspaces[id.index()];
        let was_empty = workspace.is_empty();
        let added = workspace.add_session(session);
        if added && was_empty {
            workspace.set_focus(Some(session));
        }
        added
    }

    /// Moves a session between workspaces. All preconditions are checked
    /// before either side mutates, so a failed move changes nothing.
    pub fn move_session(&mut self, session: SessionId, from: WorkspaceId, to: WorkspaceId) -> bool {
        if from == to {
            return false;
        }
        if !self.workspaces[from.index()].contains_session(session) {
            warn!(session = %session, from = %from, "cannot move a session that is not a member");
            return false;
        }
        self.workspaces[from.index()].remove_session(session);
        let target = &mut self.workspaces[to.index()];
        let was_empty = target.is_empty();
        target.add_session(session);
        if was_empty {
            target.set_focus(Some(session));
        }
        true
    }

    /// Drops a terminated session from whichever workspace holds it.
    pub fn remove_session(&mut self, session: SessionId) -> Option<WorkspaceId> {
        let id = self.session_workspace(session)?;
        self.workspaces[id.index()].remove_session(session);
        Some(id)
    }

    pub fn session_workspace(&self, session: SessionId) -> Option<WorkspaceId> {
        self.workspaces
            .iter()
            .find(|w| w.contains_session(session))
            .map(|w| w.id())
    }

    pub fn next_workspace(&self, skip_empty: bool) -> WorkspaceId {
        self.neighbor_workspace(1, skip_empty)
    }

    pub fn prev_workspace(&self, skip_empty: bool) -> WorkspaceId {
        self.neighbor_workspace(WORKSPACE_COUNT - 1, skip_empty)
    }

    fn neighbor_workspace(&self, step: usize, skip_empty: bool) -> WorkspaceId {
        let start = self.active_workspace.index();
        for i in 1..=WORKSPACE_COUNT {
            let candidate = &self.workspaces[(start + i * step) % WORKSPACE_COUNT];
            if !skip_empty || !candidate.is_empty() {
                return candidate.id();
            }
        }
        self.active_workspace
    }

    pub fn stats(&self) -> WorkspaceStats {
        let mut session_counts = HashMap::default();
        for workspace in &self.workspaces {
            session_counts.insert(workspace.id(), workspace.session_count());
        }
        WorkspaceStats {
            total_sessions: self.workspaces.iter().map(|w| w.session_count()).sum(),
            occupied_workspaces: self.workspaces.iter().filter(|w| !w.is_empty()).count(),
            session_counts,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn s(raw: u64) -> SessionId { SessionId::new(raw) }

    fn ws(raw: u8) -> WorkspaceId { WorkspaceId::new(raw).unwrap() }

    #[test]
    fn workspace_ids_are_validated() {
        assert!(WorkspaceId::new(0).is_err());
        assert!(WorkspaceId::new(10).is_err());
        assert_eq!(WorkspaceId::new(9).unwrap().raw(), 9);
        assert_eq!(WorkspaceId::all().count(), WORKSPACE_COUNT);
    }

    #[test]
    fn manager_starts_with_nine_empty_workspaces() {
        let manager = WorkspaceManager::new();
        assert_eq!(manager.workspaces().count(), WORKSPACE_COUNT);
        assert!(manager.workspaces().all(|w| w.is_empty()));
        assert_eq!(manager.active_workspace(), ws(1));
    }

    #[test]
    fn adding_sessions_is_idempotent_and_ordered() {
        let mut manager = WorkspaceManager::new();
        assert!(manager.add_session_to_workspace(ws(1), s(1)));
        assert!(manager.add_session_to_workspace(ws(1), s(2)));
        assert!(!manager.add_session_to_workspace(ws(1), s(1)));
        assert_eq!(manager.workspace(ws(1)).session_ids(), &[s(1), s(2)]);
    }

    #[test]
    fn first_session_in_an_empty_workspace_takes_focus() {
        let mut manager = WorkspaceManager::new();
        manager.add_session_to_workspace(ws(1), s(1));
        assert_eq!(manager.workspace(ws(1)).focused_session(), Some(s(1)));

        manager.add_session_to_workspace(ws(1), s(2));
        assert_eq!(manager.workspace(ws(1)).focused_session(), Some(s(1)));
    }

    #[test]
    fn removing_the_focused_session_refocuses_its_successor() {
        let mut manager = WorkspaceManager::new();
        for raw in 1..=3 {
            manager.add_session_to_workspace(ws(1), s(raw));
        }
        let workspace = manager.workspace_mut(ws(1));
        workspace.set_focus(Some(s(2)));

        assert!(workspace.remove_session(s(2)));
        assert_eq!(workspace.focused_session(), Some(s(3)));

        workspace.set_focus(Some(s(3)));
        assert!(workspace.remove_session(s(3)));
        assert_eq!(workspace.focused_session(), Some(s(1)));

        assert!(workspace.remove_session(s(1)));
        assert_eq!(workspace.focused_session(), None);
        assert!(workspace.is_empty());
    }

    #[test]
    fn removing_an_unfocused_session_keeps_focus() {
        let mut manager = WorkspaceManager::new();
        for raw in 1..=3 {
            manager.add_session_to_workspace(ws(1), s(raw));
        }
        let workspace = manager.workspace_mut(ws(1));
        workspace.set_focus(Some(s(3)));
        assert!(workspace.remove_session(s(1)));
        assert_eq!(workspace.focused_session(), Some(s(3)));
    }

    #[test]
    fn focus_requires_membership() {
        let mut manager = WorkspaceManager::new();
        manager.add_session_to_workspace(ws(1), s(1));
        let workspace = manager.workspace_mut(ws(1));

        assert!(!workspace.set_focus(Some(s(9))));
        assert_eq!(workspace.focused_session(), Some(s(1)));
        assert!(workspace.set_focus(None));
        assert_eq!(workspace.focused_session(), None);
    }

    #[test]
    fn move_session_transfers_membership_and_focus() {
        let mut manager = WorkspaceManager::new();
        manager.add_session_to_workspace(ws(1), s(1));
        manager.add_session_to_workspace(ws(1), s(2));

        assert!(manager.move_session(s(2), ws(1), ws(3)));
        assert_eq!(manager.workspace(ws(1)).session_ids(), &[s(1)]);
        assert_eq!(manager.workspace(ws(3)).session_ids(), &[s(2)]);
        // the move filled an empty workspace, so the session takes focus there
        assert_eq!(manager.workspace(ws(3)).focused_session(), Some(s(2)));
    }

    #[test]
    fn failed_move_leaves_both_workspaces_untouched() {
        let mut manager = WorkspaceManager::new();
        manager.add_session_to_workspace(ws(1), s(1));
        manager.add_session_to_workspace(ws(2), s(2));

        assert!(!manager.move_session(s(9), ws(1), ws(2)));
        assert_eq!(manager.workspace(ws(1)).session_ids(), &[s(1)]);
        assert_eq!(manager.workspace(ws(2)).session_ids(), &[s(2)]);
    }

    #[test]
    fn session_workspace_scans_in_slot_order() {
        let mut manager = WorkspaceManager::new();
        manager.add_session_to_workspace(ws(4), s(7));
        assert_eq!(manager.session_workspace(s(7)), Some(ws(4)));
        assert_eq!(manager.session_workspace(s(8)), None);

        assert_eq!(manager.remove_session(s(7)), Some(ws(4)));
        assert_eq!(manager.remove_session(s(7)), None);
    }

    #[test]
    fn workspace_cycling_wraps_and_can_skip_empties() {
        let mut manager = WorkspaceManager::new();
        manager.add_session_to_workspace(ws(3), s(1));
        manager.add_session_to_workspace(ws(7), s(2));

        assert_eq!(manager.next_workspace(false), ws(2));
        assert_eq!(manager.next_workspace(true), ws(3));
        assert_eq!(manager.prev_workspace(true), ws(7));

        manager.set_active_workspace(ws(9));
        assert_eq!(manager.next_workspace(false), ws(1));
        assert_eq!(manager.next_workspace(true), ws(3));
    }

    #[test]
    fn settings_apply_names_up_to_the_slot_count() {
        let settings = Settings::parse("[workspace]\nnames = [\"term\", \"edit\"]\n").unwrap();
        let manager = WorkspaceManager::with_settings(&settings);
        assert_eq!(manager.workspace(ws(1)).name(), "term");
        assert_eq!(manager.workspace(ws(2)).name(), "edit");
        assert_eq!(manager.workspace(ws(3)).name(), "3");
    }

    #[test]
    fn stats_count_sessions_per_workspace() {
        let mut manager = WorkspaceManager::new();
        manager.add_session_to_workspace(ws(1), s(1));
        manager.add_session_to_workspace(ws(1), s(2));
        manager.add_session_to_workspace(ws(5), s(3));

        let stats = manager.stats();
        assert_eq!(stats.total_sessions, 3);
        assert_eq!(stats.occupied_workspaces, 2);
        assert_eq!(stats.session_counts[&ws(1)], 2);
        assert_eq!(stats.session_counts[&ws(9)], 0);
    }
}
