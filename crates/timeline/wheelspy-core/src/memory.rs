//! Headless in-memory [`StyleHost`].
//!
//! A small element tree with inline styles and a computed-style resolver good
//! enough for unit measurement: absolute units, `em`/`rem`, viewport units and
//! percentages of the containing node. Used by tests and non-browser hosts.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::host::StyleHost;
use crate::ids::{IdAllocator, NodeId};
use crate::value::{StyleMap, UnitValue};

pub const ROOT_FONT_SIZE_PX: f64 = 16.0;
pub const DEFAULT_VIEWPORT: (f64, f64) = (1280.0, 720.0);

/// Properties whose percentages resolve against the parent's height.
const VERTICAL_PERCENT: &[&str] = &["top", "bottom", "height", "min-height", "max-height"];

#[derive(Debug, Clone)]
struct Node {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    style: StyleMap,
    probe: bool,
}

impl Node {
    fn new(tag: &str, id: Option<&str>, classes: &[&str], parent: Option<NodeId>) -> Self {
        Self {
            tag: tag.to_string(),
            id: id.map(str::to_string),
            classes: classes.iter().map(|c| c.to_string()).collect(),
            parent,
            children: Vec::new(),
            style: StyleMap::new(),
            probe: false,
        }
    }

    fn matches(&self, selector: &str) -> bool {
        if let Some(id) = selector.strip_prefix('#') {
            self.id.as_deref() == Some(id)
        } else if let Some(class) = selector.strip_prefix('.') {
            self.classes.iter().any(|c| c == class)
        } else {
            self.tag == selector
        }
    }
}

/// Serializable description of a document, used by JSON fixtures.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DocumentSpec {
    #[serde(default)]
    pub viewport: Option<[f64; 2]>,
    #[serde(default)]
    pub style: StyleMap,
    #[serde(default)]
    pub children: Vec<NodeSpec>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NodeSpec {
    #[serde(default = "default_tag")]
    pub tag: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub style: StyleMap,
    #[serde(default)]
    pub children: Vec<NodeSpec>,
}

fn default_tag() -> String {
    "div".to_string()
}

#[derive(Debug)]
pub struct MemoryHost {
    ids: IdAllocator,
    nodes: HashMap<NodeId, Node>,
    root: NodeId,
    viewport: (f64, f64),
    notices: Vec<String>,
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryHost {
    /// Empty document with a `body` root.
    pub fn new() -> Self {
        let mut ids = IdAllocator::new();
        let root = ids.alloc_node();
        let mut nodes = HashMap::new();
        nodes.insert(root, Node::new("body", None, &[], None));
        Self {
            ids,
            nodes,
            root,
            viewport: DEFAULT_VIEWPORT,
            notices: Vec::new(),
        }
    }

    pub fn with_viewport(mut self, width: f64, height: f64) -> Self {
        self.viewport = (width, height);
        self
    }

    pub fn from_spec(spec: &DocumentSpec) -> Self {
        let mut host = Self::new();
        if let Some([w, h]) = spec.viewport {
            host.viewport = (w, h);
        }
        let root = host.root;
        for (property, value) in &spec.style {
            host.set_style(root, property, value);
        }
        for child in &spec.children {
            host.build(root, child);
        }
        host
    }

    fn build(&mut self, parent: NodeId, spec: &NodeSpec) {
        let classes: Vec<&str> = spec.classes.iter().map(String::as_str).collect();
        let node = self.append(parent, &spec.tag, spec.id.as_deref(), &classes);
        for (property, value) in &spec.style {
            self.set_style(node, property, value);
        }
        for child in &spec.children {
            self.build(node, child);
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn append(
        &mut self,
        parent: NodeId,
        tag: &str,
        id: Option<&str>,
        classes: &[&str],
    ) -> NodeId {
        let node = self.ids.alloc_node();
        self.nodes
            .insert(node, Node::new(tag, id, classes, Some(parent)));
        if let Some(p) = self.nodes.get_mut(&parent) {
            p.children.push(node);
        }
        node
    }

    /// Inline value as last written, before resolution.
    pub fn inline_style(&self, node: NodeId, property: &str) -> Option<&str> {
        self.nodes
            .get(&node)
            .and_then(|n| n.style.get(property))
            .map(String::as_str)
    }

    /// Probe elements currently attached to the tree.
    pub fn probe_count(&self) -> usize {
        self.nodes.values().filter(|n| n.probe).count()
    }

    pub fn notices(&self) -> &[String] {
        &self.notices
    }

    fn parent_of(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(&node).and_then(|n| n.parent)
    }

    fn font_size_px(&self, node: NodeId) -> f64 {
        self.computed_style(node, "font-size")
            .and_then(|raw| UnitValue::parse(&raw).ok())
            .map(|v| v.value)
            .unwrap_or(ROOT_FONT_SIZE_PX)
    }

    /// Pixel basis for a percentage of `property` on `node`.
    fn percent_basis(&self, node: NodeId, property: &str) -> Option<f64> {
        let parent = self.parent_of(node)?;
        let basis_property = if property == "font-size" {
            "font-size"
        } else if VERTICAL_PERCENT.contains(&property) {
            "height"
        } else {
            "width"
        };
        let raw = self.computed_style(parent, basis_property)?;
        let v = UnitValue::parse(&raw).ok()?;
        (v.unit == "px").then_some(v.value)
    }

    /// Resolve one declared value into px where the unit allows it.
    fn resolve(&self, node: NodeId, property: &str, raw: &str) -> String {
        let Ok(v) = UnitValue::parse(raw) else {
            return raw.to_string();
        };
        let font_node = if property == "font-size" {
            self.parent_of(node)
        } else {
            Some(node)
        };
        // the root's own font-size is the rem basis, so it resolves against the default
        let rem_px = if property == "font-size" && node == self.root {
            ROOT_FONT_SIZE_PX
        } else {
            self.font_size_px(self.root)
        };
        let px = match v.unit.as_str() {
            "px" => Some(v.value),
            "em" => Some(
                v.value
                    * font_node
                        .map(|n| self.font_size_px(n))
                        .unwrap_or(ROOT_FONT_SIZE_PX),
            ),
            "rem" => Some(v.value * rem_px),
            "pt" => Some(v.value * 96.0 / 72.0),
            "pc" => Some(v.value * 16.0),
            "in" => Some(v.value * 96.0),
            "cm" => Some(v.value * 96.0 / 2.54),
            "mm" => Some(v.value * 96.0 / 25.4),
            "vw" => Some(v.value * self.viewport.0 / 100.0),
            "vh" => Some(v.value * self.viewport.1 / 100.0),
            "%" => self
                .percent_basis(node, property)
                .map(|basis| v.value * basis / 100.0),
            _ => None,
        };
        match px {
            Some(px) => format!("{px}px"),
            None => raw.to_string(),
        }
    }
}

impl StyleHost for MemoryHost {
    fn query(&self, selector: &str) -> Option<NodeId> {
        let selector = selector.trim();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let node = self.nodes.get(&id)?;
            if !node.probe && node.matches(selector) {
                return Some(id);
            }
            stack.extend(node.children.iter().rev().copied());
        }
        None
    }

    fn computed_style(&self, node: NodeId, property: &str) -> Option<String> {
        let n = self.nodes.get(&node)?;
        match n.style.get(property) {
            Some(raw) => Some(self.resolve(node, property, raw)),
            None if property == "font-size" => Some(format!(
                "{}px",
                n.parent
                    .map(|p| self.font_size_px(p))
                    .unwrap_or(ROOT_FONT_SIZE_PX)
            )),
            None if property == "opacity" => Some("1".to_string()),
            None => None,
        }
    }

    fn set_style(&mut self, node: NodeId, property: &str, value: &str) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.style.insert(property.to_string(), value.to_string());
        }
    }

    fn offset_parent(&self, node: NodeId) -> NodeId {
        self.parent_of(node).unwrap_or(self.root)
    }

    fn create_probe(&mut self, parent: NodeId) -> NodeId {
        let probe = self.append(parent, "div", None, &[]);
        if let Some(n) = self.nodes.get_mut(&probe) {
            n.probe = true;
        }
        probe
    }

    fn remove_node(&mut self, node: NodeId) {
        if let Some(removed) = self.nodes.remove(&node) {
            if let Some(parent) = removed.parent.and_then(|p| self.nodes.get_mut(&p)) {
                parent.children.retain(|c| *c != node);
            }
            for child in removed.children {
                self.remove_node(child);
            }
        }
    }

    fn notify(&mut self, message: &str) {
        log::warn!("{message}");
        self.notices.push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_finds_first_match_in_document_order() {
        let mut host = MemoryHost::new();
        let root = host.root();
        let a = host.append(root, "div", Some("a"), &["item"]);
        let b = host.append(root, "div", Some("b"), &["item"]);
        let inner = host.append(a, "span", None, &["item"]);
        assert_eq!(host.query("#b"), Some(b));
        assert_eq!(host.query(".item"), Some(a));
        assert_eq!(host.query("span"), Some(inner));
        assert_eq!(host.query("#missing"), None);
    }

    #[test]
    fn resolves_relative_units() {
        let mut host = MemoryHost::new().with_viewport(1000.0, 500.0);
        let root = host.root();
        host.set_style(root, "width", "400px");
        let node = host.append(root, "div", None, &[]);
        host.set_style(node, "font-size", "2em");
        host.set_style(node, "left", "50%");
        host.set_style(node, "top", "10vh");
        host.set_style(node, "width", "3em");
        assert_eq!(host.computed_style(node, "font-size").unwrap(), "32px");
        assert_eq!(host.computed_style(node, "left").unwrap(), "200px");
        assert_eq!(host.computed_style(node, "top").unwrap(), "50px");
        assert_eq!(host.computed_style(node, "width").unwrap(), "96px");
    }

    #[test]
    fn root_font_size_in_rem_or_em_uses_the_default() {
        let mut host = MemoryHost::new();
        let root = host.root();
        host.set_style(root, "font-size", "2rem");
        assert_eq!(host.computed_style(root, "font-size").unwrap(), "32px");
        let node = host.append(root, "div", None, &[]);
        host.set_style(node, "width", "1rem");
        assert_eq!(host.computed_style(node, "width").unwrap(), "32px");

        host.set_style(root, "font-size", "1.5em");
        assert_eq!(host.computed_style(root, "font-size").unwrap(), "24px");
        assert_eq!(host.computed_style(node, "font-size").unwrap(), "24px");
    }

    #[test]
    fn defaults_for_unset_properties() {
        let host = MemoryHost::new();
        let root = host.root();
        assert_eq!(host.computed_style(root, "opacity").unwrap(), "1");
        assert_eq!(host.computed_style(root, "font-size").unwrap(), "16px");
        assert_eq!(host.computed_style(root, "left"), None);
    }

    #[test]
    fn probes_are_hidden_from_queries_and_removable() {
        let mut host = MemoryHost::new();
        let root = host.root();
        let probe = host.create_probe(root);
        assert_eq!(host.probe_count(), 1);
        assert_eq!(host.query("div"), None);
        host.remove_node(probe);
        assert_eq!(host.probe_count(), 0);
    }

    #[test]
    fn builds_from_spec() {
        let spec: DocumentSpec = serde_json::from_str(
            r##"{
                "viewport": [800, 600],
                "style": {"width": "800px"},
                "children": [
                    {"id": "box", "style": {"left": "10px"}, "children": [{"tag": "span"}]}
                ]
            }"##,
        )
        .unwrap();
        let host = MemoryHost::from_spec(&spec);
        let node = host.query("#box").unwrap();
        assert_eq!(host.inline_style(node, "left"), Some("10px"));
        assert!(host.query("span").is_some());
    }
}
