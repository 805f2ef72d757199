use slotmap::{SlotMap, new_key_type};
use smol_str::SmolStr;

use crate::pointer::Point;

new_key_type! {
    pub struct NodeKey;
}

/// An axis-aligned rectangle in client coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }
}

/// Scroll bookkeeping for a node that scrolls its own content.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollState {
    pub offset: Point,
    /// Total content size; the scrollable range per axis is
    /// `content - span`, floored at zero.
    pub content: Point,
}

#[derive(Clone, Debug, Default)]
pub struct Node {
    pub parent: Option<NodeKey>,
    pub name: Option<SmolStr>,
    pub rect: Rect,
    pub scroll: Option<ScrollState>,
}

/// A resolved scroll container: the top-level viewport or a scene node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollContainer {
    Viewport,
    Node(NodeKey),
}

/// Node arena plus the top-level viewport.
///
/// This is the geometry provider the controllers consume: containment-chain
/// walks for resume targeting, client rectangles and scroll offsets for edge
/// detection, and clamped scroll application. Hosts with their own scene
/// graph mirror it into one of these.
#[derive(Debug, Default)]
pub struct SceneTree {
    nodes: SlotMap<NodeKey, Node>,
    viewport_size: Point,
    viewport_scroll: Point,
    viewport_content: Point,
}

impl SceneTree {
    pub fn new(viewport_size: Point) -> Self {
        Self {
            nodes: SlotMap::with_key(),
            viewport_size,
            viewport_scroll: Point::ZERO,
            viewport_content: viewport_size,
        }
    }

    /// Sets the size of the viewport's scrollable document.
    pub fn set_viewport_content(&mut self, content: Point) {
        self.viewport_content = content;
    }

    pub fn add_node(&mut self, parent: Option<NodeKey>, rect: Rect) -> NodeKey {
        self.nodes.insert(Node {
            parent,
            rect,
            ..Node::default()
        })
    }

    pub fn set_name(&mut self, key: NodeKey, name: impl Into<SmolStr>) {
        if let Some(node) = self.nodes.get_mut(key) {
            node.name = Some(name.into());
        }
    }

    /// Marks a node as scrollable with the given content size.
    pub fn set_scrollable(&mut self, key: NodeKey, content: Point) {
        if let Some(node) = self.nodes.get_mut(key) {
            node.scroll = Some(ScrollState {
                offset: Point::ZERO,
                content,
            });
        }
    }

    pub fn node(&self, key: NodeKey) -> Option<&Node> {
        self.nodes.get(key)
    }

    pub fn parent(&self, key: NodeKey) -> Option<NodeKey> {
        self.nodes.get(key).and_then(|node| node.parent)
    }

    /// True when `node` is `ancestor` or lies inside it.
    pub fn contains(&self, ancestor: NodeKey, node: NodeKey) -> bool {
        let mut current = Some(node);

        while let Some(key) = current {
            if key == ancestor {
                return true;
            }
            current = self.parent(key);
        }

        false
    }

    /// Resolves a named container against an element: `"parent"` is the
    /// element's parent, anything else matches the closest ancestor
    /// (including the element itself) with that name.
    pub fn resolve_name(&self, name: &str, element: NodeKey) -> Option<NodeKey> {
        if name == "parent" {
            return self.parent(element);
        }

        let mut current = Some(element);
        while let Some(key) = current {
            let node = self.nodes.get(key)?;
            if node.name.as_deref() == Some(name) {
                return Some(key);
            }
            current = node.parent;
        }

        None
    }

    pub fn viewport_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.viewport_size.x, self.viewport_size.y)
    }

    pub fn client_rect(&self, key: NodeKey) -> Rect {
        self.nodes.get(key).map(|node| node.rect).unwrap_or_default()
    }

    pub fn scroll_offset(&self, container: ScrollContainer) -> Point {
        match container {
            ScrollContainer::Viewport => self.viewport_scroll,
            ScrollContainer::Node(key) => self
                .nodes
                .get(key)
                .and_then(|node| node.scroll)
                .map(|scroll| scroll.offset)
                .unwrap_or_default(),
        }
    }

    /// Total scrollable content size of a container.
    pub fn scroll_size(&self, container: ScrollContainer) -> Point {
        match container {
            ScrollContainer::Viewport => self.viewport_content,
            ScrollContainer::Node(key) => self
                .nodes
                .get(key)
                .and_then(|node| node.scroll)
                .map(|scroll| scroll.content)
                .unwrap_or_default(),
        }
    }

    /// Scrolls a container by `delta`, clamped to its own limits. Callers
    /// observe how much actually applied by re-reading the offset.
    pub fn scroll_by(&mut self, container: ScrollContainer, delta: Point) {
        match container {
            ScrollContainer::Viewport => {
                self.viewport_scroll = clamp_offset(
                    self.viewport_scroll + delta,
                    self.viewport_content,
                    self.viewport_size,
                );
            }
            ScrollContainer::Node(key) => {
                if let Some(node) = self.nodes.get_mut(key)
                    && let Some(scroll) = &mut node.scroll
                {
                    let span = Point::new(node.rect.width(), node.rect.height());
                    scroll.offset = clamp_offset(scroll.offset + delta, scroll.content, span);
                }
            }
        }
    }

    /// Directly positions a container's scroll offset (clamped).
    pub fn set_scroll_offset(&mut self, container: ScrollContainer, offset: Point) {
        let current = self.scroll_offset(container);
        self.scroll_by(container, offset - current);
    }
}

fn clamp_offset(offset: Point, content: Point, span: Point) -> Point {
    let max_x = (content.x - span.x).max(0.0);
    let max_y = (content.y - span.y).max(0.0);

    Point::new(offset.x.clamp(0.0, max_x), offset.y.clamp(0.0, max_y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn containment_chain_walk() {
        let mut scene = SceneTree::new(Point::new(800.0, 600.0));
        let root = scene.add_node(None, Rect::new(0.0, 0.0, 800.0, 600.0));
        let mid = scene.add_node(Some(root), Rect::new(10.0, 10.0, 400.0, 300.0));
        let leaf = scene.add_node(Some(mid), Rect::new(20.0, 20.0, 100.0, 100.0));
        let other = scene.add_node(Some(root), Rect::new(500.0, 10.0, 700.0, 300.0));

        assert!(scene.contains(root, leaf));
        assert!(scene.contains(mid, leaf));
        assert!(scene.contains(leaf, leaf));
        assert!(!scene.contains(other, leaf));
    }

    #[test]
    fn named_resolution_climbs_ancestors() {
        let mut scene = SceneTree::new(Point::new(800.0, 600.0));
        let root = scene.add_node(None, Rect::default());
        let pane = scene.add_node(Some(root), Rect::default());
        let leaf = scene.add_node(Some(pane), Rect::default());
        scene.set_name(pane, "pane");

        assert_eq!(scene.resolve_name("pane", leaf), Some(pane));
        assert_eq!(scene.resolve_name("parent", leaf), Some(pane));
        assert_eq!(scene.resolve_name("missing", leaf), None);
    }

    #[test]
    fn scroll_clamps_to_limits() {
        let mut scene = SceneTree::new(Point::new(800.0, 600.0));
        scene.set_viewport_content(Point::new(2000.0, 600.0));

        scene.scroll_by(ScrollContainer::Viewport, Point::new(-50.0, -50.0));
        assert_eq!(scene.scroll_offset(ScrollContainer::Viewport), Point::ZERO);

        scene.scroll_by(ScrollContainer::Viewport, Point::new(5000.0, 10.0));
        assert_eq!(
            scene.scroll_offset(ScrollContainer::Viewport),
            Point::new(1200.0, 0.0)
        );
    }

    #[test]
    fn element_scroll_uses_its_own_span() {
        let mut scene = SceneTree::new(Point::new(800.0, 600.0));
        let pane = scene.add_node(None, Rect::new(0.0, 0.0, 200.0, 100.0));
        scene.set_scrollable(pane, Point::new(500.0, 100.0));

        scene.scroll_by(ScrollContainer::Node(pane), Point::new(1000.0, 50.0));
        assert_eq!(
            scene.scroll_offset(ScrollContainer::Node(pane)),
            Point::new(300.0, 0.0)
        );
    }
}
