//! Arena-backed DOM tree used by the page controllers.

use fw_core::WikiError;
use fw_core::WikiResult;

/// ID used to address nodes in the DOM arena.
pub type NodeId = usize;

const NO_CHILDREN: &[NodeId] = &[];

/// Payload of a single DOM node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    Element(ElementData),
    Text(String),
}

/// Element payload: lowercased tag name plus ordered attribute list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    data: NodeData,
}

/// Document model holding the node arena and the page title.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub title: String,
    nodes: Vec<Node>,
    root: Option<NodeId>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push_node(NodeData::Element(ElementData {
            tag: tag.to_ascii_lowercase(),
            attributes: Vec::new(),
        }))
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push_node(NodeData::Text(text.to_owned()))
    }

    pub fn set_root(&mut self, node: NodeId) -> WikiResult<()> {
        if !self.is_element(node) {
            return Err(WikiError::new(
                "dom.root.not_element",
                format!("node {node} cannot act as document root"),
            ));
        }

        self.root = Some(node);
        Ok(())
    }

    pub fn is_element(&self, node: NodeId) -> bool {
        matches!(
            self.node(node).map(|entry| &entry.data),
            Some(NodeData::Element(_))
        )
    }

    pub fn tag(&self, node: NodeId) -> Option<&str> {
        match self.node(node).map(|entry| &entry.data) {
            Some(NodeData::Element(element)) => Some(element.tag.as_str()),
            _ => None,
        }
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).and_then(|entry| entry.parent)
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.node(node)
            .map(|entry| entry.children.as_slice())
            .unwrap_or(NO_CHILDREN)
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> WikiResult<()> {
        if self.node(parent).is_none() || self.node(child).is_none() {
            return Err(WikiError::new(
                "dom.node.unknown",
                format!("append_child({parent}, {child}) references a missing node"),
            ));
        }

        if !self.is_element(parent) {
            return Err(WikiError::new(
                "dom.append.into_text",
                format!("node {parent} is a text run and cannot take children"),
            ));
        }

        if self.node(child).and_then(|entry| entry.parent).is_some() {
            return Err(WikiError::new(
                "dom.append.attached",
                format!("node {child} is already attached to a parent"),
            ));
        }

        if parent == child || self.is_ancestor(child, parent) {
            return Err(WikiError::new(
                "dom.append.cycle",
                format!("appending node {child} under {parent} would create a cycle"),
            ));
        }

        if let Some(entry) = self.nodes.get_mut(parent) {
            entry.children.push(child);
        }
        if let Some(entry) = self.nodes.get_mut(child) {
            entry.parent = Some(parent);
        }

        Ok(())
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        match self.node(node).map(|entry| &entry.data) {
            Some(NodeData::Element(element)) => element
                .attributes
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value.as_str()),
            _ => None,
        }
    }

    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> WikiResult<()> {
        let element = self.element_mut(node)?;
        let name = name.to_ascii_lowercase();

        if let Some(slot) = element
            .attributes
            .iter_mut()
            .find(|(key, _)| *key == name)
        {
            slot.1 = value.to_owned();
        } else {
            element.attributes.push((name, value.to_owned()));
        }

        Ok(())
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.attribute(node, "class")
            .map(|classes| classes.split_whitespace().any(|entry| entry == class))
            .unwrap_or(false)
    }

    pub fn add_class(&mut self, node: NodeId, class: &str) -> WikiResult<()> {
        if self.has_class(node, class) {
            return Ok(());
        }

        let merged = match self.attribute(node, "class") {
            Some(existing) if !existing.trim().is_empty() => format!("{existing} {class}"),
            _ => class.to_owned(),
        };

        self.set_attribute(node, "class", &merged)
    }

    pub fn remove_class(&mut self, node: NodeId, class: &str) -> WikiResult<()> {
        let remaining = self
            .attribute(node, "class")
            .map(|classes| {
                classes
                    .split_whitespace()
                    .filter(|entry| *entry != class)
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .unwrap_or_default();

        self.set_attribute(node, "class", &remaining)
    }

    /// Concatenated text of the node and its descendants, in document order.
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node, &mut out);
        out
    }

    /// Replaces the element's children with a single text run.
    pub fn set_text_content(&mut self, node: NodeId, text: &str) -> WikiResult<()> {
        self.element_mut(node)?;

        let old_children = self
            .nodes
            .get_mut(node)
            .map(|entry| std::mem::take(&mut entry.children))
            .unwrap_or_default();
        for child in old_children {
            if let Some(entry) = self.nodes.get_mut(child) {
                entry.parent = None;
            }
        }

        let text_node = self.create_text(text);
        if let Some(entry) = self.nodes.get_mut(text_node) {
            entry.parent = Some(node);
        }
        if let Some(entry) = self.nodes.get_mut(node) {
            entry.children.push(text_node);
        }

        Ok(())
    }

    /// All nodes strictly below `scope`, in document order.
    pub fn descendants(&self, scope: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        for child in self.children(scope) {
            self.collect_subtree(*child, &mut out);
        }
        out
    }

    pub fn elements_with_class(&self, class: &str) -> Vec<NodeId> {
        let Some(root) = self.root else {
            return Vec::new();
        };

        let mut out = Vec::new();
        if self.has_class(root, class) {
            out.push(root);
        }
        out.extend(
            self.descendants(root)
                .into_iter()
                .filter(|node| self.has_class(*node, class)),
        );
        out
    }

    pub fn elements_with_class_in(&self, scope: NodeId, class: &str) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|node| self.has_class(*node, class))
            .collect()
    }

    pub fn elements_with_tag_in(&self, scope: NodeId, tag: &str) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|node| self.tag(*node) == Some(tag))
            .collect()
    }

    pub fn first_with_tag_and_class(&self, tag: &str, class: &str) -> Option<NodeId> {
        let root = self.root?;
        if self.tag(root) == Some(tag) && self.has_class(root, class) {
            return Some(root);
        }

        self.descendants(root)
            .into_iter()
            .find(|node| self.tag(*node) == Some(tag) && self.has_class(*node, class))
    }

    fn push_node(&mut self, data: NodeData) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            data,
        });
        id
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    fn element_mut(&mut self, id: NodeId) -> WikiResult<&mut ElementData> {
        match self.nodes.get_mut(id).map(|entry| &mut entry.data) {
            Some(NodeData::Element(element)) => Ok(element),
            Some(NodeData::Text(_)) => Err(WikiError::new(
                "dom.attr.not_element",
                format!("node {id} is a text run"),
            )),
            None => Err(WikiError::new(
                "dom.node.unknown",
                format!("node {id} does not exist"),
            )),
        }
    }

    fn is_ancestor(&self, candidate: NodeId, node: NodeId) -> bool {
        let mut cursor = self.parent(node);
        while let Some(current) = cursor {
            if current == candidate {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    fn collect_subtree(&self, node: NodeId, out: &mut Vec<NodeId>) {
        out.push(node);
        for child in self.children(node) {
            self.collect_subtree(*child, out);
        }
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        match self.node(node).map(|entry| &entry.data) {
            Some(NodeData::Text(text)) => out.push_str(text),
            Some(NodeData::Element(_)) => {
                for child in self.children(node) {
                    self.collect_text(*child, out);
                }
            }
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Document;

    fn sample_tree() -> (Document, super::NodeId, super::NodeId, super::NodeId) {
        let mut doc = Document::new();
        let root = doc.create_element("html");
        let section = doc.create_element("section");
        let link = doc.create_element("a");
        let text = doc.create_text("docs");

        assert!(doc.set_root(root).is_ok());
        assert!(doc.append_child(root, section).is_ok());
        assert!(doc.append_child(section, link).is_ok());
        assert!(doc.append_child(link, text).is_ok());

        (doc, root, section, link)
    }

    #[test]
    fn collects_descendant_text() {
        let (mut doc, _, section, link) = sample_tree();
        let extra = doc.create_text(" and more");
        assert!(doc.append_child(section, extra).is_ok());

        assert_eq!(doc.text_content(section), "docs and more");
        assert_eq!(doc.text_content(link), "docs");
    }

    #[test]
    fn class_list_operations_are_idempotent() {
        let (mut doc, _, _, link) = sample_tree();

        assert!(doc.add_class(link, "external").is_ok());
        assert!(doc.add_class(link, "external").is_ok());
        assert_eq!(doc.attribute(link, "class"), Some("external"));

        assert!(doc.add_class(link, "visited").is_ok());
        assert!(doc.has_class(link, "external"));
        assert!(doc.has_class(link, "visited"));

        assert!(doc.remove_class(link, "external").is_ok());
        assert!(!doc.has_class(link, "external"));
        assert!(doc.has_class(link, "visited"));
    }

    #[test]
    fn set_attribute_replaces_existing_value() {
        let (mut doc, _, _, link) = sample_tree();

        assert!(doc.set_attribute(link, "target", "_self").is_ok());
        assert!(doc.set_attribute(link, "TARGET", "_blank").is_ok());
        assert_eq!(doc.attribute(link, "target"), Some("_blank"));
    }

    #[test]
    fn rejects_cyclic_and_duplicate_attachment() {
        let (mut doc, root, _, link) = sample_tree();

        // The root is the only unattached ancestor, so it exercises the
        // cycle check rather than the re-attachment check.
        let cycle = doc.append_child(link, root);
        assert!(cycle.is_err_and(|error| error.code == "dom.append.cycle"));

        let reattach = doc.append_child(root, link);
        assert!(reattach.is_err_and(|error| error.code == "dom.append.attached"));

        let missing = doc.append_child(root, 999);
        assert!(missing.is_err_and(|error| error.code == "dom.node.unknown"));
    }

    #[test]
    fn set_text_content_drops_previous_children() {
        let (mut doc, _, _, link) = sample_tree();

        assert!(doc.set_text_content(link, "replaced").is_ok());
        assert_eq!(doc.text_content(link), "replaced");
        assert_eq!(doc.children(link).len(), 1);
    }

    #[test]
    fn queries_walk_in_document_order() {
        let (mut doc, root, section, link) = sample_tree();
        assert!(doc.add_class(section, "main").is_ok());
        let second = doc.create_element("a");
        assert!(doc.append_child(section, second).is_ok());

        assert_eq!(doc.elements_with_tag_in(root, "a"), vec![link, second]);
        assert_eq!(doc.first_with_tag_and_class("section", "main"), Some(section));
        assert!(doc.first_with_tag_and_class("section", "sidebar").is_none());
    }
}
