//! Declaration expansion: camelCase names, implicit units and the box
//! shorthands (`margin`, `padding`, `border-width`, `border-radius`).

use crate::host::StyleHost;
use crate::value::{StyleDecl, StyleMap};

/// Animatable properties a host is assumed to understand.
pub const KNOWN_PROPERTIES: &[&str] = &[
    "opacity",
    "top",
    "right",
    "bottom",
    "left",
    "width",
    "height",
    "min-width",
    "min-height",
    "max-width",
    "max-height",
    "font-size",
    "line-height",
    "letter-spacing",
    "word-spacing",
    "text-indent",
    "margin",
    "margin-top",
    "margin-right",
    "margin-bottom",
    "margin-left",
    "padding",
    "padding-top",
    "padding-right",
    "padding-bottom",
    "padding-left",
    "border-width",
    "border-top-width",
    "border-right-width",
    "border-bottom-width",
    "border-left-width",
    "border-radius",
    "border-top-left-radius",
    "border-top-right-radius",
    "border-bottom-right-radius",
    "border-bottom-left-radius",
    "outline-width",
    "outline-offset",
    "z-index",
];

pub fn is_known_property(property: &str) -> bool {
    KNOWN_PROPERTIES.contains(&property)
}

/// `marginTop` -> `margin-top`. Already kebab-cased names pass through.
pub fn to_kebab_case(property: &str) -> String {
    let mut out = String::with_capacity(property.len() + 4);
    for ch in property.trim().chars() {
        if ch.is_ascii_uppercase() {
            out.push('-');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Split a 1-4 value shorthand into (top, right, bottom, left).
/// Values past the fourth are ignored.
pub fn four_sides(value: &str) -> Option<[String; 4]> {
    let parts: Vec<&str> = value.split_whitespace().collect();
    let first = *parts.first()?;
    let top = first;
    let right = parts.get(1).copied().unwrap_or(first);
    let bottom = parts.get(2).copied().unwrap_or(first);
    let left = parts.get(3).copied().unwrap_or(right);
    Some([
        top.to_string(),
        right.to_string(),
        bottom.to_string(),
        left.to_string(),
    ])
}

/// Longhand names for a box shorthand, in top/right/bottom/left order.
fn longhands(shorthand: &str) -> Option<[String; 4]> {
    const SIDES: [&str; 4] = ["top", "right", "bottom", "left"];
    const CORNERS: [&str; 4] = ["top-left", "top-right", "bottom-right", "bottom-left"];
    match shorthand {
        "margin" | "padding" => Some(SIDES.map(|s| format!("{shorthand}-{s}"))),
        "border-width" => Some(SIDES.map(|s| format!("border-{s}-width"))),
        "border-radius" => Some(CORNERS.map(|c| format!("border-{c}-radius"))),
        _ => None,
    }
}

/// Expand a declaration into longhand CSS text.
///
/// Properties the host does not support are dropped without error.
pub fn expand<H: StyleHost + ?Sized>(host: &H, decl: &StyleDecl) -> StyleMap {
    let mut style = StyleMap::new();
    for (name, value) in decl.iter() {
        let property = to_kebab_case(name);
        if !host.supports_property(&property) {
            log::debug!("dropping unsupported property '{name}'");
            continue;
        }
        let css = value.to_css(&property);
        style.insert(property, css);
    }

    for shorthand in ["margin", "padding", "border-width", "border-radius"] {
        let Some(value) = style.shift_remove(shorthand) else {
            continue;
        };
        let (Some(names), Some(values)) = (longhands(shorthand), four_sides(&value)) else {
            continue;
        };
        for (name, value) in names.into_iter().zip(values) {
            style.insert(name, value);
        }
    }
    style
}
