//! Accessible tooltips for elements carrying a `data-tooltip` description.

use crate::surface::{Node, Surface};

pub const TOOLTIP_ATTR: &str = "data-tooltip";
const READY_ATTR: &str = "data-tooltip-ready";

/// Replace native `title` tooltips with an accessible child tooltip.
/// Already enhanced elements are skipped. Returns the ids enhanced now.
pub fn enhance_tooltips<S: Surface + ?Sized>(surface: &mut S) -> Vec<String> {
    let mut enhanced = Vec::new();
    for id in surface.query_attribute(TOOLTIP_ATTR) {
        if surface.attribute(&id, READY_ATTR).is_some() {
            continue;
        }
        let Some(description) = surface.attribute(&id, TOOLTIP_ATTR) else {
            continue;
        };
        let tip_id = format!("{id}-tooltip");
        let tip = Node::new("span")
            .id(tip_id.clone())
            .class("viz-tooltip")
            .attr("role", "tooltip")
            .text(description);
        let ok = surface.append_child(&id, tip).is_ok()
            && surface.set_attribute(&id, "aria-describedby", &tip_id).is_ok()
            && surface.set_attribute(&id, "tabindex", "0").is_ok()
            && surface.remove_attribute(&id, "title").is_ok()
            && surface.set_attribute(&id, READY_ATTR, "true").is_ok();
        if ok {
            enhanced.push(id);
        }
    }
    if !enhanced.is_empty() {
        log::debug!("enhanced {} tooltips", enhanced.len());
    }
    enhanced
}
