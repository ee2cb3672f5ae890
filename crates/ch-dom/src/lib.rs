//! Arena DOM for chrome manipulation.
//!
//! Parses the subset of HTML a static site's shell needs and exposes the
//! queries and mutations the chrome controllers perform: lookups by
//! id/class/tag, ancestor walks, attribute and class edits, fragment
//! injection, and node removal. Nodes are addressed by [`NodeId`] into a
//! flat arena; removal detaches a subtree without reclaiming slots, so ids
//! handed out earlier stay stable for the lifetime of the document.

mod parser;
mod text;

pub use text::collapse_whitespace;
pub use text::decode_entities;

/// ID used to address nodes in the DOM arena.
pub type NodeId = usize;

/// A single arena slot.
#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) data: NodeData,
}

/// Payload of an arena node.
#[derive(Debug, Clone)]
pub enum NodeData {
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
    },
    Text(String),
}

/// Parsed page document.
#[derive(Debug, Clone)]
pub struct Document {
    pub(crate) nodes: Vec<Node>,
    root: NodeId,
}

impl Document {
    /// Parses a full HTML document. Never fails: malformed markup degrades
    /// to whatever tree the recovery rules produce, as in any browser.
    pub fn parse(source: &str) -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            root: 0,
        };
        let root = doc.push_node(None, NodeData::element("document"));
        doc.root = root;
        parser::parse_into(&mut doc, root, source);
        doc
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub(crate) fn push_node(&mut self, parent: Option<NodeId>, data: NodeData) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node {
            parent,
            children: Vec::new(),
            data,
        });
        if let Some(parent) = parent {
            if let Some(node) = self.nodes.get_mut(parent) {
                node.children.push(id);
            }
        }
        id
    }

    /// Tag name for element nodes, `None` for text nodes and bad ids.
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match self.nodes.get(id).map(|node| &node.data) {
            Some(NodeData::Element { tag, .. }) => Some(tag.as_str()),
            _ => None,
        }
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        match self.nodes.get(id).map(|node| &node.data) {
            Some(NodeData::Element { attrs, .. }) => attrs
                .iter()
                .find(|(attr_name, _)| attr_name.eq_ignore_ascii_case(name))
                .map(|(_, value)| value.as_str()),
            _ => None,
        }
    }

    /// Sets an attribute, replacing an existing value of the same name.
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        let Some(NodeData::Element { attrs, .. }) = self.nodes.get_mut(id).map(|node| &mut node.data)
        else {
            return;
        };

        for (attr_name, attr_value) in attrs.iter_mut() {
            if attr_name.eq_ignore_ascii_case(name) {
                *attr_value = value.to_owned();
                return;
            }
        }
        attrs.push((name.to_ascii_lowercase(), value.to_owned()));
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) {
        let Some(NodeData::Element { attrs, .. }) = self.nodes.get_mut(id).map(|node| &mut node.data)
        else {
            return;
        };
        attrs.retain(|(attr_name, _)| !attr_name.eq_ignore_ascii_case(name));
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.attr(id, "class")
            .is_some_and(|value| value.split_ascii_whitespace().any(|token| token == class))
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) {
        if self.has_class(id, class) {
            return;
        }
        let merged = match self.attr(id, "class") {
            Some(existing) if !existing.trim().is_empty() => format!("{existing} {class}"),
            _ => class.to_owned(),
        };
        self.set_attr(id, "class", &merged);
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) {
        let Some(existing) = self.attr(id, "class") else {
            return;
        };
        let kept = existing
            .split_ascii_whitespace()
            .filter(|token| *token != class)
            .collect::<Vec<_>>()
            .join(" ");
        self.set_attr(id, "class", &kept);
    }

    /// First element in document order with the given `id` attribute.
    pub fn element_by_id(&self, value: &str) -> Option<NodeId> {
        self.descendant_elements(self.root)
            .into_iter()
            .find(|&id| self.attr(id, "id") == Some(value))
    }

    pub fn first_element_by_class(&self, class: &str) -> Option<NodeId> {
        self.descendant_elements(self.root)
            .into_iter()
            .find(|&id| self.has_class(id, class))
    }

    pub fn elements_by_class_in(&self, scope: NodeId, class: &str) -> Vec<NodeId> {
        self.descendant_elements(scope)
            .into_iter()
            .filter(|&id| self.has_class(id, class))
            .collect()
    }

    pub fn elements_by_tag(&self, tag: &str) -> Vec<NodeId> {
        self.elements_by_tag_in(self.root, tag)
    }

    pub fn elements_by_tag_in(&self, scope: NodeId, tag: &str) -> Vec<NodeId> {
        self.descendant_elements(scope)
            .into_iter()
            .filter(|&id| self.tag(id).is_some_and(|name| name.eq_ignore_ascii_case(tag)))
            .collect()
    }

    /// Element descendants of `scope` in document order, excluding `scope`.
    pub fn descendant_elements(&self, scope: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = match self.nodes.get(scope) {
            Some(node) => node.children.iter().rev().copied().collect::<Vec<_>>(),
            None => Vec::new(),
        };

        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            if matches!(node.data, NodeData::Element { .. }) {
                out.push(id);
            }
            for child in node.children.iter().rev() {
                stack.push(*child);
            }
        }

        out
    }

    /// Nearest ancestor (including `id` itself) matching the predicate.
    pub fn closest(&self, id: NodeId, matches: impl Fn(&Self, NodeId) -> bool) -> Option<NodeId> {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if self.tag(current).is_some() && matches(self, current) {
                return Some(current);
            }
            cursor = self.nodes.get(current).and_then(|node| node.parent);
        }
        None
    }

    pub fn closest_with_class(&self, id: NodeId, class: &str) -> Option<NodeId> {
        self.closest(id, |doc, candidate| doc.has_class(candidate, class))
    }

    /// True when `node` sits inside `ancestor` (or is `ancestor`).
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.nodes.get(current).and_then(|node| node.parent);
        }
        false
    }

    /// Concatenated text content of a subtree, script/style excluded.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };

        match &node.data {
            NodeData::Text(text) => out.push_str(text),
            NodeData::Element { tag, .. } => {
                if matches!(tag.as_str(), "script" | "style" | "noscript") {
                    return;
                }
                for child in &node.children {
                    self.collect_text(*child, out);
                }
            }
        }
    }

    /// Replaces the children of `id` with a single text node.
    pub fn set_text(&mut self, id: NodeId, text: &str) {
        if self.tag(id).is_none() {
            return;
        }
        self.detach_children(id);
        let child = self.push_node(None, NodeData::Text(text.to_owned()));
        self.attach(id, child);
    }

    /// Parses `html` as a fragment and replaces the children of `id` with it.
    pub fn set_inner_html(&mut self, id: NodeId, html: &str) {
        if self.tag(id).is_none() {
            return;
        }
        self.detach_children(id);
        parser::parse_into(self, id, html);
    }

    /// Detaches a subtree from its parent. The arena slot survives but the
    /// subtree is no longer reachable from the root.
    pub fn remove(&mut self, id: NodeId) {
        let Some(parent) = self.nodes.get(id).and_then(|node| node.parent) else {
            return;
        };
        if let Some(parent_node) = self.nodes.get_mut(parent) {
            parent_node.children.retain(|child| *child != id);
        }
        if let Some(node) = self.nodes.get_mut(id) {
            node.parent = None;
        }
    }

    fn detach_children(&mut self, id: NodeId) {
        let children = match self.nodes.get_mut(id) {
            Some(node) => std::mem::take(&mut node.children),
            None => return,
        };
        for child in children {
            if let Some(node) = self.nodes.get_mut(child) {
                node.parent = None;
            }
        }
    }

    fn attach(&mut self, parent: NodeId, child: NodeId) {
        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.push(child);
        }
    }
}

impl NodeData {
    fn element(tag: &str) -> Self {
        Self::Element {
            tag: tag.to_owned(),
            attrs: Vec::new(),
        }
    }
}
