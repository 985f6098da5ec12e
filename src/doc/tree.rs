// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Immutable markup tree
//!
//! An index arena instead of a pointer graph: nodes are appended during
//! parsing and never mutated afterwards, so the tree can be shared freely
//! within one pipeline invocation without locking.

/// Index of a node within a [`MarkupTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Raw index value
    pub fn as_usize(&self) -> usize {
        self.0
    }
}

/// Node type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Element,
    Text,
    Comment,
    Doctype,
}

/// Node payload
#[derive(Debug, Clone)]
pub struct NodeData {
    pub kind: NodeKind,
    /// Tag name, lowercased (elements only)
    pub tag_name: Option<String>,
    /// Text content (text/comment nodes)
    pub text: Option<String>,
    /// Attributes in source order (elements only)
    pub attributes: Vec<(String, String)>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl NodeData {
    pub fn document() -> Self {
        Self {
            kind: NodeKind::Document,
            tag_name: None,
            text: None,
            attributes: Vec::new(),
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn element(tag_name: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::Element,
            tag_name: Some(tag_name.into().to_lowercase()),
            text: None,
            attributes: Vec::new(),
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::Text,
            tag_name: None,
            text: Some(content.into()),
            attributes: Vec::new(),
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn comment(content: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::Comment,
            tag_name: None,
            text: Some(content.into()),
            attributes: Vec::new(),
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn doctype() -> Self {
        Self {
            kind: NodeKind::Doctype,
            tag_name: None,
            text: None,
            attributes: Vec::new(),
            parent: None,
            children: Vec::new(),
        }
    }

    /// Get an attribute value by name (case-insensitive name match)
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Check whether an attribute is present
    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }
}

/// Parsed markup tree
#[derive(Debug, Clone)]
pub struct MarkupTree {
    nodes: Vec<NodeData>,
    root: NodeId,
}

impl MarkupTree {
    /// Create a tree holding only the document root
    pub fn new() -> Self {
        Self {
            nodes: vec![NodeData::document()],
            root: NodeId(0),
        }
    }

    /// Root node id
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes (including the root)
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree holds anything beyond the root
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Append a node under `parent`, returning its id
    pub(crate) fn push_node(&mut self, mut data: NodeData, parent: NodeId) -> NodeId {
        let id = NodeId(self.nodes.len());
        data.parent = Some(parent);
        self.nodes.push(data);
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Get node data by id
    pub fn get(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0]
    }

    /// All element ids in document order (depth-first)
    pub fn elements(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.walk(self.root, &mut |id, data| {
            if data.kind == NodeKind::Element {
                out.push(id);
            }
        });
        out
    }

    /// Element ids with the given tag name, in document order
    pub fn elements_by_tag(&self, tag: &str) -> Vec<NodeId> {
        let tag = tag.to_lowercase();
        let mut out = Vec::new();
        self.walk(self.root, &mut |id, data| {
            if data.kind == NodeKind::Element && data.tag_name.as_deref() == Some(tag.as_str()) {
                out.push(id);
            }
        });
        out
    }

    /// Descendant element ids of `id` with the given tag name
    pub fn descendants_by_tag(&self, id: NodeId, tag: &str) -> Vec<NodeId> {
        let tag = tag.to_lowercase();
        let mut out = Vec::new();
        for &child in &self.get(id).children {
            self.walk(child, &mut |cid, data| {
                if data.kind == NodeKind::Element
                    && data.tag_name.as_deref() == Some(tag.as_str())
                {
                    out.push(cid);
                }
            });
        }
        out
    }

    /// All text node ids in document order
    pub fn text_nodes(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.walk(self.root, &mut |id, data| {
            if data.kind == NodeKind::Text {
                out.push(id);
            }
        });
        out
    }

    /// Concatenated text content of a subtree
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.walk(id, &mut |_, data| {
            if data.kind == NodeKind::Text {
                if let Some(ref t) = data.text {
                    out.push_str(t);
                }
            }
        });
        out
    }

    fn walk(&self, id: NodeId, visit: &mut impl FnMut(NodeId, &NodeData)) {
        let data = self.get(id);
        visit(id, data);
        for &child in &data.children {
            self.walk(child, visit);
        }
    }
}

impl Default for MarkupTree {
    fn default() -> Self {
        Self::new()
    }
}
