//! Host traits: the element tree, computed style and optional tween engine.
//!
//! Adapters (browser bindings, the in-memory [`crate::memory::MemoryHost`])
//! implement these and hand them to a [`crate::Timeline`].

use crate::ids::NodeId;
use crate::shorthand;
use crate::value::StyleMap;

/// Element tree and style access used by the engine.
pub trait StyleHost {
    /// First element matching `selector`.
    fn query(&self, selector: &str) -> Option<NodeId>;

    /// Computed value of `property` (`None` when unset).
    fn computed_style(&self, node: NodeId, property: &str) -> Option<String>;

    /// Inline-style write of one property.
    fn set_style(&mut self, node: NodeId, property: &str, value: &str);

    /// Apply a whole resolved style in one go.
    fn apply_style(&mut self, node: NodeId, style: &StyleMap) {
        for (property, value) in style {
            self.set_style(node, property, value);
        }
    }

    /// Layout parent used to host measurement probes.
    fn offset_parent(&self, node: NodeId) -> NodeId;

    /// Append an invisible, absolutely positioned probe element to `parent`.
    fn create_probe(&mut self, parent: NodeId) -> NodeId;

    fn remove_node(&mut self, node: NodeId);

    /// Whether the host understands `property` at all.
    fn supports_property(&self, property: &str) -> bool {
        shorthand::is_known_property(property)
    }

    /// User-visible notice (an `alert` in a browser).
    fn notify(&mut self, message: &str) {
        log::warn!("{message}");
    }
}

/// Applies a computed style as a timed transition instead of an immediate write.
pub trait TweenEngine {
    fn tween(&mut self, node: NodeId, seconds: f64, style: &StyleMap);
}
