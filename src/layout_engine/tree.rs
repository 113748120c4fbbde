use serde::{Deserialize, Serialize};
use slotmap::{SlotMap, new_key_type};
use tracing::warn;

use crate::common::collections::HashMap;
use crate::model::session::SessionId;

new_key_type! {
    pub struct NodeId;
}

/// Axis of a split. `Vertical` runs the divider vertically, placing the
/// children side by side; `Horizontal` runs it horizontally, stacking them
/// top over bottom.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Vertical,
    Horizontal,
}

pub const DEFAULT_SPLIT_RATIO: f32 = 0.5;
pub const MIN_SPLIT_RATIO: f32 = 0.1;
pub const MAX_SPLIT_RATIO: f32 = 0.9;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum NodeKind {
    Leaf(SessionId),
    Split {
        orientation: Orientation,
        ratio: f32,
        first: NodeId,
        second: NodeId,
    },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BspNode {
    pub parent: Option<NodeId>,
    pub kind: NodeKind,
}

/// Binary space partition over the sessions of one workspace. Leaves carry
/// sessions, splits carry an axis and a ratio. A split always has exactly two
/// live children, so a tree with N sessions holds N-1 splits.
///
/// `session_to_node` mirrors the leaf set for O(1) lookup; its key set is
/// kept identical to the sessions reachable from the root.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct BspTree {
    nodes: SlotMap<NodeId, BspNode>,
    root: Option<NodeId>,
    session_to_node: HashMap<SessionId, NodeId>,
    /// Parity decides the axis of the next split; only ever counts up.
    splits_created: u64,
}

impl BspTree {
    pub fn new() -> Self { Self::default() }

    pub fn root(&self) -> Option<NodeId> { self.root }

    pub fn node_kind(&self, node: NodeId) -> Option<&NodeKind> {
        self.nodes.get(node).map(|n| &n.kind)
    }

    pub fn node_for_session(&self, session: SessionId) -> Option<NodeId> {
        self.session_to_node.get(&session).copied()
    }

    pub fn contains(&self, session: SessionId) -> bool {
        self.session_to_node.contains_key(&session)
    }

    pub fn session_count(&self) -> usize { self.session_to_node.len() }

    pub fn is_empty(&self) -> bool { self.session_to_node.is_empty() }

    /// Splits the most recently created pane in half and gives the new
    /// session the second half, alternating the split axis per insertion.
    /// Returns false if the session is already tiled.
    pub fn insert_spiral(&mut self, session: SessionId) -> bool {
        if self.session_to_node.contains_key(&session) {
            warn!(%session, "session is already in the tree");
            return false;
        }

        let Some(root) = self.root else {
            let leaf = self.nodes.insert(BspNode {
                parent: None,
                kind: NodeKind::Leaf(session),
            });
            self.root = Some(leaf);
            self.session_to_node.insert(session, leaf);
            return true;
        };

        let orientation = if self.splits_created % 2 == 0 {
            Orientation::Vertical
        } else {
            Orientation::Horizontal
        };
        self.splits_created += 1;

        let target = self.newest_leaf(root);
        let old_session = match self.nodes[target].kind {
            NodeKind::Leaf(s) => s,
            NodeKind::Split { .. } => unreachable!("newest_leaf returned a split"),
        };

        let first = self.nodes.insert(BspNode {
            parent: Some(target),
            kind: NodeKind::Leaf(old_session),
        });
        let second = self.nodes.insert(BspNode {
            parent: Some(target),
            kind: NodeKind::Leaf(session),
        });
        self.nodes[target].kind = NodeKind::Split {
            orientation,
            ratio: DEFAULT_SPLIT_RATIO,
            first,
            second,
        };
        self.session_to_node.insert(old_session, first);
        self.session_to_node.insert(session, second);
        true
    }

    /// The most recently created pane: second children are always the newer
    /// half of a split, so the rightmost descent finds it.
    fn newest_leaf(&self, start: NodeId) -> NodeId {
        let mut node = start;
        loop {
            match self.nodes[node].kind {
                NodeKind::Leaf(_) => return node,
                NodeKind::Split { second, .. } => node = second,
            }
        }
    }

    /// Removes a session's leaf and collapses its parent split by promoting
    /// the sibling's contents onto the parent node. Children are moved rather
    /// than copied, so node ids deeper in the sibling subtree stay valid.
    pub fn remove_node(&mut self, session: SessionId) -> bool {
        let Some(node) = self.session_to_node.remove(&session) else {
            return false;
        };

        let Some(parent) = self.nodes[node].parent else {
            // sole leaf at the root
            self.clear();
            return true;
        };

        let (first, second) = match self.nodes[parent].kind {
            NodeKind::Split { first, second, .. } => (first, second),
            NodeKind::Leaf(_) => unreachable!("parent of a leaf must be a split"),
        };
        let sibling = if first == node { second } else { first };

        let sibling_kind = self.nodes[sibling].kind.clone();
        self.nodes.remove(node);
        self.nodes.remove(sibling);

        match sibling_kind {
            NodeKind::Leaf(s) => {
                self.nodes[parent].kind = NodeKind::Leaf(s);
                self.session_to_node.insert(s, parent);
            }
            NodeKind::Split {
                orientation,
                ratio,
                first,
                second,
            } => {
                self.nodes[parent].kind = NodeKind::Split {
                    orientation,
                    ratio,
                    first,
                    second,
                };
                self.nodes[first].parent = Some(parent);
                self.nodes[second].parent = Some(parent);
            }
        }
        true
    }

    /// Adjusts the ratio of the split directly above the session's pane,
    /// clamped to [MIN_SPLIT_RATIO, MAX_SPLIT_RATIO]. Ancestors are left
    /// untouched.
    pub fn rebalance_subtree(&mut self, session: SessionId, delta: f32) -> bool {
        let Some(&node) = self.session_to_node.get(&session) else {
            return false;
        };
        let Some(parent) = self.nodes[node].parent else {
            return false;
        };
        if let NodeKind::Split { ratio, .. } = &mut self.nodes[parent].kind {
            *ratio = (*ratio + delta).clamp(MIN_SPLIT_RATIO, MAX_SPLIT_RATIO);
            true
        } else {
            false
        }
    }

    /// Exchanges the sessions of two panes in place. Tree topology is
    /// untouched; only the leaf payloads and the lookup map change.
    pub fn swap_panes(&mut self, a: SessionId, b: SessionId) -> bool {
        if a == b {
            return false;
        }
        let (Some(&node_a), Some(&node_b)) =
            (self.session_to_node.get(&a), self.session_to_node.get(&b))
        else {
            return false;
        };
        self.nodes[node_a].kind = NodeKind::Leaf(b);
        self.nodes[node_b].kind = NodeKind::Leaf(a);
        self.session_to_node.insert(a, node_b);
        self.session_to_node.insert(b, node_a);
        true
    }

    /// All tiled sessions in left-to-right pane order.
    pub fn sessions(&self) -> Vec<SessionId> {
        let mut out = Vec::with_capacity(self.session_to_node.len());
        if let Some(root) = self.root {
            self.collect_sessions(root, &mut out);
        }
        out
    }

    fn collect_sessions(&self, node: NodeId, out: &mut Vec<SessionId>) {
        match self.nodes[node].kind {
            NodeKind::Leaf(s) => out.push(s),
            NodeKind::Split { first, second, .. } => {
                self.collect_sessions(first, out);
                self.collect_sessions(second, out);
            }
        }
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.session_to_node.clear();
        self.splits_created = 0;
    }

    pub fn draw_tree(&self) -> String {
        fn write_node(tree: &BspTree, node: NodeId, out: &mut String, indent: usize) {
            for _ in 0..indent {
                out.push_str("  ");
            }
            match tree.nodes[node].kind {
                NodeKind::Leaf(s) => out.push_str(&format!("Leaf {s}\n")),
                NodeKind::Split {
                    orientation,
                    ratio,
                    first,
                    second,
                } => {
                    out.push_str(&format!("Split {orientation:?} {ratio:.2}\n"));
                    write_node(tree, first, out, indent + 1);
                    write_node(tree, second, out, indent + 1);
                }
            }
        }
        match self.root {
            Some(root) => {
                let mut s = String::new();
                write_node(self, root, &mut s, 0);
                s
            }
            None => "<empty tree>".to_string(),
        }
    }
}
