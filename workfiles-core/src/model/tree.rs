//! Group → folder → file hierarchy owned by the aggregator.
//!
//! Nodes live in an arena and are addressed by [`NodeId`]. Clearing the tree
//! bumps its generation, so ids handed out before a refresh never resolve
//! against the new contents.

use std::fmt;

use workfiles_model::{ChildBreakdown, EntityRef, FileKey, SearchStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    generation: u32,
    index: u32,
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.generation, self.index)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Group,
    Folder,
    File,
}

/// One search request's branch of the tree.
#[derive(Debug, Clone)]
pub struct GroupNode {
    pub label: String,
    status: SearchStatus,
    message: Option<String>,
    children: Vec<NodeId>,
}

impl GroupNode {
    pub fn status(&self) -> SearchStatus {
        self.status
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Placeholder for a child entity, created before any results arrive.
#[derive(Debug, Clone)]
pub struct FolderNode {
    pub label: String,
    pub entity: Option<EntityRef>,
    parent: NodeId,
    children: Vec<NodeId>,
}

impl FolderNode {
    pub fn parent(&self) -> NodeId {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Leaf pointing at one version held in the file cache.
#[derive(Debug, Clone)]
pub struct FileNode {
    pub key: FileKey,
    pub version: u32,
    parent: NodeId,
}

impl FileNode {
    pub fn parent(&self) -> NodeId {
        self.parent
    }
}

#[derive(Debug, Clone)]
pub enum Node {
    Group(GroupNode),
    Folder(FolderNode),
    File(FileNode),
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Group(_) => NodeKind::Group,
            Node::Folder(_) => NodeKind::Folder,
            Node::File(_) => NodeKind::File,
        }
    }

    pub fn as_group(&self) -> Option<&GroupNode> {
        match self {
            Node::Group(group) => Some(group),
            _ => None,
        }
    }

    pub fn as_folder(&self) -> Option<&FolderNode> {
        match self {
            Node::Folder(folder) => Some(folder),
            _ => None,
        }
    }

    pub fn as_file(&self) -> Option<&FileNode> {
        match self {
            Node::File(file) => Some(file),
            _ => None,
        }
    }

    pub fn children(&self) -> &[NodeId] {
        match self {
            Node::Group(group) => &group.children,
            Node::Folder(folder) => &folder.children,
            Node::File(_) => &[],
        }
    }

    fn children_mut(&mut self) -> Option<&mut Vec<NodeId>> {
        match self {
            Node::Group(group) => Some(&mut group.children),
            Node::Folder(folder) => Some(&mut folder.children),
            Node::File(_) => None,
        }
    }
}

/// Rejected group status transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTransitionError {
    UnknownGroup,
    AlreadyTerminal(SearchStatus),
}

#[derive(Debug, Default)]
pub struct ResultTree {
    generation: u32,
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
}

impl ResultTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every node. Ids issued before this call stop resolving.
    pub fn clear(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.nodes.clear();
        self.roots.clear();
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn groups(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        if id.generation != self.generation {
            return None;
        }
        self.nodes.get(id.index as usize)
    }

    fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        if id.generation != self.generation {
            return None;
        }
        self.nodes.get_mut(id.index as usize)
    }

    pub fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.get(id).map(Node::kind)
    }

    pub fn group(&self, id: NodeId) -> Option<&GroupNode> {
        self.get(id).and_then(Node::as_group)
    }

    pub fn folder(&self, id: NodeId) -> Option<&FolderNode> {
        self.get(id).and_then(Node::as_folder)
    }

    pub fn file(&self, id: NodeId) -> Option<&FileNode> {
        self.get(id).and_then(Node::as_file)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(Node::children).unwrap_or(&[])
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        match self.get(id)? {
            Node::Group(_) => None,
            Node::Folder(folder) => Some(folder.parent),
            Node::File(file) => Some(file.parent),
        }
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId {
            generation: self.generation,
            index: self.nodes.len() as u32,
        };
        self.nodes.push(node);
        id
    }

    pub fn add_group(&mut self, label: impl Into<String>) -> NodeId {
        let id = self.push(Node::Group(GroupNode {
            label: label.into(),
            status: SearchStatus::Searching,
            message: None,
            children: Vec::new(),
        }));
        self.roots.push(id);
        id
    }

    pub fn add_folder(
        &mut self,
        group: NodeId,
        child: &ChildBreakdown,
    ) -> Option<NodeId> {
        self.group(group)?;
        let id = self.push(Node::Folder(FolderNode {
            label: child.name.clone(),
            entity: child.entity.clone(),
            parent: group,
            children: Vec::new(),
        }));
        self.attach(group, id);
        Some(id)
    }

    /// Add a file leaf under `parent`, which must be a group or folder.
    pub fn add_file(
        &mut self,
        parent: NodeId,
        key: FileKey,
        version: u32,
    ) -> Option<NodeId> {
        match self.kind(parent)? {
            NodeKind::Group | NodeKind::Folder => {}
            NodeKind::File => return None,
        }
        let id = self.push(Node::File(FileNode {
            key,
            version,
            parent,
        }));
        self.attach(parent, id);
        Some(id)
    }

    fn attach(&mut self, parent: NodeId, child: NodeId) {
        if let Some(children) =
            self.get_mut(parent).and_then(Node::children_mut)
        {
            children.push(child);
        }
    }

    /// Folder under `group` created for `entity`, if any.
    pub fn folder_for_entity(
        &self,
        group: NodeId,
        entity: &EntityRef,
    ) -> Option<NodeId> {
        self.children(group).iter().copied().find(|&child| {
            self.folder(child)
                .and_then(|folder| folder.entity.as_ref())
                .is_some_and(|folder_entity| folder_entity == entity)
        })
    }

    /// Every file leaf below `id`, depth first.
    pub fn file_descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> =
            self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            match self.get(next) {
                Some(Node::File(_)) => out.push(next),
                Some(node) => stack.extend(node.children().iter().rev()),
                None => {}
            }
        }
        out
    }

    /// Move a group from `Searching` to a terminal status.
    pub fn set_group_status(
        &mut self,
        id: NodeId,
        status: SearchStatus,
        message: Option<String>,
    ) -> Result<(), StatusTransitionError> {
        let Some(Node::Group(group)) = self.get_mut(id) else {
            return Err(StatusTransitionError::UnknownGroup);
        };
        if group.status.is_terminal() {
            return Err(StatusTransitionError::AlreadyTerminal(group.status));
        }
        group.status = status;
        group.message = message;
        Ok(())
    }
}
