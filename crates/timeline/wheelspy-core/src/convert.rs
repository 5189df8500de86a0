//! CSS unit conversion by comparison measurement.
//!
//! Two probe elements are appended to the element's offset parent, one styled
//! `12<from>` and one `12<to>`. The ratio of their computed pixel values scales
//! the original number. `em` is resolved against the element's own font size.

use crate::error::TimelineError;
use crate::host::StyleHost;
use crate::ids::NodeId;
use crate::value::UnitValue;
use crate::Result;

/// Magnitude written into each probe.
pub const PROBE_MAGNITUDE: f64 = 12.0;

/// A probe element that is removed when dropped.
struct Probe<'h, H: StyleHost + ?Sized> {
    host: &'h mut H,
    node: NodeId,
}

impl<'h, H: StyleHost + ?Sized> Probe<'h, H> {
    fn create(host: &'h mut H, parent: NodeId) -> Self {
        let node = host.create_probe(parent);
        Self { host, node }
    }

    /// Pixel value of `PROBE_MAGNITUDE<unit>` for `property`, if the host reports one.
    fn measure_px(&mut self, property: &str, unit: &str) -> Option<f64> {
        self.host
            .set_style(self.node, property, &format!("{PROBE_MAGNITUDE}{unit}"));
        let raw = self.host.computed_style(self.node, property)?;
        let measured = UnitValue::parse(&raw).ok()?;
        matches!(measured.unit.as_str(), "" | "px").then_some(measured.value)
    }
}

impl<H: StyleHost + ?Sized> Drop for Probe<'_, H> {
    fn drop(&mut self) {
        self.host.remove_node(self.node);
    }
}

fn measure<H: StyleHost + ?Sized>(
    host: &mut H,
    parent: NodeId,
    property: &str,
    unit: &str,
) -> Option<f64> {
    Probe::create(host, parent).measure_px(property, unit)
}

/// Scale factor turning a `from` quantity into a `to` quantity.
pub fn probe_ratio<H: StyleHost + ?Sized>(
    host: &mut H,
    node: NodeId,
    property: &str,
    from: &str,
    to: &str,
) -> Result<f64> {
    let parent = host.offset_parent(node);
    let a = measure(host, parent, property, from);
    let b = measure(host, parent, property, to);
    let ratio = match (a, b) {
        (Some(a), Some(b)) => a / b,
        _ => f64::NAN,
    };
    if !ratio.is_finite() {
        log::debug!("degenerate {from}->{to} ratio for {property} on {node}");
        return Err(TimelineError::Measurement {
            property: property.to_string(),
            node,
        });
    }
    Ok(ratio)
}

/// Computed font size of `node` in px; unreadable or zero sizes count as 1.
fn font_size_px<H: StyleHost + ?Sized>(host: &H, node: NodeId) -> f64 {
    host.computed_style(node, "font-size")
        .and_then(|raw| UnitValue::parse(&raw).ok())
        .map(|v| v.value)
        .filter(|v| v.is_finite() && *v != 0.0)
        .unwrap_or(1.0)
}

fn to_px<H: StyleHost + ?Sized>(
    host: &mut H,
    node: NodeId,
    property: &str,
    origin: &UnitValue,
) -> Result<f64> {
    match origin.unit.as_str() {
        "px" => Ok(origin.value),
        "em" => Ok(origin.value * font_size_px(host, node)),
        unit => Ok(origin.value * probe_ratio(host, node, property, unit, "px")?),
    }
}

/// Convert `property` of `node` into `target_unit`.
///
/// `value` overrides the element's computed value. Unset, empty and `auto`
/// values read as `0`.
pub fn convert_unit<H: StyleHost + ?Sized>(
    host: &mut H,
    node: NodeId,
    property: &str,
    target_unit: &str,
    value: Option<&str>,
) -> Result<UnitValue> {
    let raw = match value {
        Some(v) => Some(v.to_string()),
        None => host.computed_style(node, property),
    };
    let raw = match raw.as_deref().map(str::trim) {
        None | Some("") | Some("auto") => "0".to_string(),
        Some(v) => v.to_string(),
    };
    let origin = UnitValue::parse(&raw)?.with_implicit_unit(property);

    if origin.unit == target_unit {
        return Ok(UnitValue::new(origin.value, target_unit));
    }

    if target_unit == "em" {
        let px = to_px(host, node, property, &origin)?;
        return Ok(UnitValue::new(px / font_size_px(host, node), "em"));
    }

    if origin.unit == "em" {
        let px = to_px(host, node, property, &origin)?;
        if target_unit == "px" {
            return Ok(UnitValue::new(px, "px"));
        }
        let ratio = probe_ratio(host, node, property, "px", target_unit)?;
        return Ok(UnitValue::new(px * ratio, target_unit));
    }

    let ratio = probe_ratio(host, node, property, &origin.unit, target_unit)?;
    Ok(UnitValue::new(origin.value * ratio, target_unit))
}
