//! Style interpolation between a begin and a final style map.
//!
//! Begin values are resolved lazily from the live element the first time a
//! property is rendered and cached in the begin map afterwards.

pub mod functions;

use crate::convert::convert_unit;
use crate::host::StyleHost;
use crate::ids::NodeId;
use crate::value::{StyleMap, UnitValue};
use crate::Result;

use functions::{clamp_percent, lerp_f64};

/// Style for `node` at `percent` of the way from `begin` to `fin`.
///
/// Every property of `fin` that parses yields one entry, expressed in the
/// final value's unit. `begin` is filled in (and re-expressed in the final
/// unit) as a side effect.
pub fn interpolate_style<H: StyleHost + ?Sized>(
    host: &mut H,
    node: NodeId,
    begin: &mut StyleMap,
    fin: &StyleMap,
    percent: f64,
) -> Result<StyleMap> {
    let percent = clamp_percent(percent);
    let mut style = StyleMap::with_capacity(fin.len());

    for (property, raw_final) in fin {
        let target = match UnitValue::parse(raw_final) {
            Ok(v) => v.with_implicit_unit(property),
            Err(err) => {
                log::warn!("skipping {property} on {node}: {err}");
                continue;
            }
        };

        let start = match begin.get(property) {
            Some(cached) if !cached.trim().is_empty() => UnitValue::parse(cached)?,
            _ => {
                let seeded = convert_unit(host, node, property, &target.unit, None)?;
                begin.insert(property.clone(), seeded.to_css());
                seeded
            }
        };

        let start = if start.unit == target.unit {
            start
        } else {
            let cached = start.to_css();
            let converted =
                convert_unit(host, node, property, &target.unit, Some(cached.as_str()))?;
            begin.insert(property.clone(), converted.to_css());
            converted
        };

        let value = lerp_f64(start.value, target.value, percent);
        style.insert(property.clone(), UnitValue::new(value, &target.unit).to_css());
    }
    Ok(style)
}
