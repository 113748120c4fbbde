//! Pure geometry: turns per-workspace layout structures into screen
//! rectangles. Nothing here mutates state or knows about workspaces.

use crate::common::collections::HashMap;
use crate::layout_engine::SessionLayout;
use crate::layout_engine::geometry::LayoutRect;
use crate::layout_engine::tree::{BspTree, NodeId, NodeKind, Orientation};
use crate::model::session::SessionId;

/// Rows reserved at the top of the viewport for the tab strip in tab mode.
pub const TAB_STRIP_ROWS: u16 = 1;

/// Walks the tree, dividing `viewport` along each split's axis by its ratio,
/// and yields one rectangle per pane. An empty tree yields no entries; a
/// single leaf gets the whole viewport.
pub fn project(tree: &BspTree, viewport: LayoutRect) -> HashMap<SessionId, LayoutRect> {
    let mut out = HashMap::default();
    if let Some(root) = tree.root() {
        project_node(tree, root, viewport, &mut out);
    }
    out
}

fn project_node(
    tree: &BspTree,
    node: NodeId,
    rect: LayoutRect,
    out: &mut HashMap<SessionId, LayoutRect>,
) {
    match tree.node_kind(node) {
        Some(&NodeKind::Leaf(session)) => {
            out.insert(session, rect);
        }
        Some(&NodeKind::Split {
            orientation,
            ratio,
            first,
            second,
        }) => match orientation {
            Orientation::Vertical => {
                let (first_width, second_width) = split_extent(rect.width, ratio);
                let left = LayoutRect {
                    width: first_width,
                    ..rect
                };
                let right = LayoutRect {
                    x: rect.x + first_width,
                    width: second_width,
                    ..rect
                };
                project_node(tree, first, left, out);
                project_node(tree, second, right, out);
            }
            Orientation::Horizontal => {
                let (first_height, second_height) = split_extent(rect.height, ratio);
                let top = LayoutRect {
                    height: first_height,
                    ..rect
                };
                let bottom = LayoutRect {
                    y: rect.y + first_height,
                    height: second_height,
                    ..rect
                };
                project_node(tree, first, top, out);
                project_node(tree, second, bottom, out);
            }
        },
        None => {}
    }
}

/// floor(ratio * total) for the first side, the remainder for the second.
/// Both sides keep at least one cell; a one-cell extent degenerates to
/// overlapping unit cells rather than an invalid empty rectangle.
fn split_extent(total: u16, ratio: f32) -> (u16, u16) {
    let first = (f32::from(total) * ratio).floor() as u16;
    let first = first.clamp(1, total.saturating_sub(1).max(1));
    (first, (total - first).max(1))
}

/// Stack mode: every member occupies the full viewport, but only the session
/// under the stack cursor is visible. Hidden members keep their entry so the
/// renderer can unmount them.
pub fn stack_layouts(
    stack_order: &[SessionId],
    stack_index: usize,
    viewport: LayoutRect,
    focused: Option<SessionId>,
) -> Vec<SessionLayout> {
    let visible_index = stack_index.min(stack_order.len().saturating_sub(1));
    stack_order
        .iter()
        .enumerate()
        .map(|(i, &session_id)| SessionLayout {
            session_id,
            rect: viewport,
            visible: i == visible_index,
            focused: focused == Some(session_id),
            tab_index: None,
        })
        .collect()
}

/// Tab mode: the top row belongs to the tab strip, every member gets the
/// remaining area, and only the session under the tab cursor is visible.
/// Each entry carries its position in the strip.
pub fn tab_layouts(
    session_ids: &[SessionId],
    tab_index: usize,
    viewport: LayoutRect,
    focused: Option<SessionId>,
) -> Vec<SessionLayout> {
    let visible_index = tab_index.min(session_ids.len().saturating_sub(1));
    let body = LayoutRect {
        x: viewport.x,
        y: viewport.y + TAB_STRIP_ROWS,
        width: viewport.width,
        height: viewport.height.saturating_sub(TAB_STRIP_ROWS).max(1),
    };
    session_ids
        .iter()
        .enumerate()
        .map(|(i, &session_id)| SessionLayout {
            session_id,
            rect: body,
            visible: i == visible_index,
            focused: focused == Some(session_id),
            tab_index: Some(i),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn s(raw: u64) -> SessionId { SessionId::new(raw) }

    fn viewport(width: u16, height: u16) -> LayoutRect {
        LayoutRect::new(0, 0, width, height).unwrap()
    }

    fn rect(x: u16, y: u16, width: u16, height: u16) -> LayoutRect {
        LayoutRect { x, y, width, height }
    }

    #[test]
    fn empty_tree_projects_nothing() {
        assert!(project(&BspTree::new(), viewport(80, 24)).is_empty());
    }

    #[test]
    fn single_pane_fills_the_viewport() {
        let mut tree = BspTree::new();
        tree.insert_spiral(s(1));
        let rects = project(&tree, viewport(80, 24));
        assert_eq!(rects.get(&s(1)), Some(&viewport(80, 24)));
    }

    #[test]
    fn even_vertical_split_halves_the_width() {
        let mut tree = BspTree::new();
        tree.insert_spiral(s(1));
        tree.insert_spiral(s(2));
        let rects = project(&tree, viewport(100, 40));
        assert_eq!(rects.get(&s(1)), Some(&rect(0, 0, 50, 40)));
        assert_eq!(rects.get(&s(2)), Some(&rect(50, 0, 50, 40)));
    }

    #[test]
    fn rebalanced_ratio_moves_the_divider() {
        let mut tree = BspTree::new();
        tree.insert_spiral(s(1));
        tree.insert_spiral(s(2));
        tree.rebalance_subtree(s(1), -0.25);
        let rects = project(&tree, viewport(100, 40));
        assert_eq!(rects.get(&s(1)), Some(&rect(0, 0, 25, 40)));
        assert_eq!(rects.get(&s(2)), Some(&rect(25, 0, 75, 40)));
    }

    #[test]
    fn three_panes_partition_the_viewport_exactly() {
        let mut tree = BspTree::new();
        for raw in 1..=3 {
            tree.insert_spiral(s(raw));
        }
        let vp = viewport(80, 24);
        let rects = project(&tree, vp);
        assert_eq!(rects.len(), 3);
        let total_area: u32 = rects.values().map(|r| r.area()).sum();
        assert_eq!(total_area, vp.area());
        for r in rects.values() {
            assert!(vp.contains(*r));
            assert!(r.width >= 1 && r.height >= 1);
        }
    }

    #[test]
    fn panes_never_collapse_below_one_cell() {
        let mut tree = BspTree::new();
        for raw in 1..=4 {
            tree.insert_spiral(s(raw));
        }
        let rects = project(&tree, viewport(3, 2));
        for r in rects.values() {
            assert!(r.width >= 1 && r.height >= 1);
        }
    }

    #[test]
    fn stack_layouts_show_exactly_one_session() {
        let order = [s(1), s(2), s(3)];
        let vp = viewport(80, 24);
        let layouts = stack_layouts(&order, 1, vp, Some(s(2)));
        assert_eq!(layouts.len(), 3);
        assert_eq!(
            layouts.iter().filter(|l| l.visible).count(),
            1,
            "stack mode shows one session"
        );
        for layout in &layouts {
            assert_eq!(layout.rect, vp);
            assert_eq!(layout.tab_index, None);
        }
        assert!(layouts[1].visible && layouts[1].focused);
    }

    #[test]
    fn tab_layouts_reserve_the_strip_row() {
        let ids = [s(1), s(2)];
        let layouts = tab_layouts(&ids, 0, viewport(80, 24), None);
        assert_eq!(layouts.len(), 2);
        for (i, layout) in layouts.iter().enumerate() {
            assert_eq!(layout.rect, rect(0, 1, 80, 23));
            assert_eq!(layout.tab_index, Some(i));
        }
        assert!(layouts[0].visible);
        assert!(!layouts[1].visible);
    }

    #[test]
    fn tab_body_keeps_one_row_on_a_one_row_viewport() {
        let layouts = tab_layouts(&[s(1)], 0, viewport(80, 1), None);
        assert_eq!(layouts[0].rect.height, 1);
    }
}
