use crate::error::MenuError;
use crate::geometry::{ArcSpan, Point, Rect, Size};
use crate::host::ViewId;
use crate::style::{ArcStyle, RadiusPolicy};
use derive_more::{Display, From, Into};
use serde::Serialize;
use strum::Display as StrumDisplay;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Display, From, Into,
)]
#[display("node#{_0}")]
pub struct NodeId(usize);

crate::impl_id_newtype!(NodeId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, StrumDisplay)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Status {
    #[default]
    Closed,
    Open,
    Playing,
}

#[derive(Debug, Clone)]
pub struct MenuNode {
    pub view: ViewId,
    pub size: Size,
    /// Top-left of this node's frame inside its parent's ring, as last laid out.
    pub position: Point,
    pub arc: ArcSpan,
    pub radius_policy: RadiusPolicy,
    /// Radius last used to lay out this node's children.
    pub radius: i32,
    /// Set while this node is the expanded branch of its level; ancestor sweeps leave it alone.
    pub active: bool,
    status: Status,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl MenuNode {
    pub fn new(view: ViewId, size: Size, style: &ArcStyle) -> Self {
        Self {
            view,
            size,
            position: Point::default(),
            arc: style.span(),
            radius_policy: style.radius_policy(),
            radius: style.radius.unwrap_or_default(),
            active: false,
            status: Status::Closed,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn target_frame(&self) -> Rect {
        Rect::new(self.position, self.size)
    }
}

/// Arena holding every node of one menu; ids stay stable across removals.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Option<MenuNode>>,
    root: NodeId,
}

impl Tree {
    pub fn new(root: MenuNode) -> Self {
        Self {
            nodes: vec![Some(root)],
            root: NodeId::new(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn get(&self, id: NodeId) -> Result<&MenuNode, MenuError> {
        self.nodes
            .get(id.index())
            .and_then(Option::as_ref)
            .ok_or(MenuError::UnknownNode(id))
    }

    pub fn get_mut(&mut self, id: NodeId) -> Result<&mut MenuNode, MenuError> {
        self.nodes
            .get_mut(id.index())
            .and_then(Option::as_mut)
            .ok_or(MenuError::UnknownNode(id))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_ok()
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.is_some())
            .map(|(i, _)| NodeId::new(i))
    }

    pub fn child(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.get(id).ok()?.children.get(index).copied()
    }

    pub fn insert_child(
        &mut self,
        parent: NodeId,
        mut node: MenuNode,
    ) -> Result<NodeId, MenuError> {
        self.get(parent)?;
        let id = NodeId::new(self.nodes.len());
        node.parent = Some(parent);
        self.nodes.push(Some(node));
        self.get_mut(parent)?.children.push(id);
        Ok(id)
    }

    /// Unlinks `id` and everything below it, returning the removed ids in post-order.
    pub fn remove_subtree(&mut self, id: NodeId) -> Result<Vec<NodeId>, MenuError> {
        if id == self.root {
            return Err(MenuError::RootRemoval);
        }
        let removed = self.post_order(id)?;
        let parent = self.get(id)?.parent;
        if let Some(parent) = parent {
            self.get_mut(parent)?.children.retain(|&c| c != id);
        }
        for &gone in &removed {
            self.nodes[gone.index()] = None;
        }
        Ok(removed)
    }

    /// `id` and its descendants, children before parents.
    pub fn post_order(&self, id: NodeId) -> Result<Vec<NodeId>, MenuError> {
        let mut out = Vec::new();
        self.collect_post_order(id, &mut out)?;
        Ok(out)
    }

    fn collect_post_order(&self, id: NodeId, out: &mut Vec<NodeId>) -> Result<(), MenuError> {
        for &child in &self.get(id)?.children {
            self.collect_post_order(child, out)?;
        }
        out.push(id);
        Ok(())
    }

    pub fn siblings(&self, id: NodeId) -> Result<Vec<NodeId>, MenuError> {
        let Some(parent) = self.get(id)?.parent else {
            return Ok(Vec::new());
        };
        Ok(self
            .get(parent)?
            .children
            .iter()
            .copied()
            .filter(|&c| c != id)
            .collect())
    }

    pub fn has_active_child(&self, id: NodeId) -> Result<bool, MenuError> {
        let node = self.get(id)?;
        Ok(node
            .children
            .iter()
            .any(|&c| self.get(c).is_ok_and(|child| child.active)))
    }

    /// A node can't report itself closed while one of its children is still expanded.
    pub fn set_status(&mut self, id: NodeId, status: Status) -> Result<Status, MenuError> {
        let effective = if status == Status::Closed && self.has_active_child(id)? {
            Status::Open
        } else {
            status
        };
        self.get_mut(id)?.status = effective;
        Ok(effective)
    }
}
