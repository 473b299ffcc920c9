//! Static HTML serialization of [`Node`] trees.

use std::fmt::Write;

use crate::surface::Node;

/// Prefix of ids generated for nodes inserted without one. Omitted on export.
pub const AUTO_ID_PREFIX: &str = "dl-node-";

const VOID_TAGS: &[&str] = &["br", "hr", "img", "input", "meta", "link"];

pub fn to_html(node: &Node) -> String {
    let mut out = String::new();
    write_node(node, &mut out);
    out
}

fn write_node(node: &Node, out: &mut String) {
    let _ = write!(out, "<{}", node.tag);
    if let Some(id) = node.id.as_deref().filter(|id| !id.starts_with(AUTO_ID_PREFIX)) {
        let _ = write!(out, " id=\"{}\"", escape(id));
    }
    if !node.classes.is_empty() {
        let _ = write!(out, " class=\"{}\"", escape(&node.classes.join(" ")));
    }
    for (name, value) in &node.attributes {
        let _ = write!(out, " {}=\"{}\"", name, escape(value));
    }
    if !node.style.is_empty() {
        let css = node
            .style
            .iter()
            .map(|(k, v)| format!("{k}: {v}"))
            .collect::<Vec<_>>()
            .join("; ");
        let _ = write!(out, " style=\"{}\"", escape(&css));
    }
    out.push('>');

    if VOID_TAGS.contains(&node.tag.as_str()) {
        return;
    }
    if let Some(text) = &node.text {
        out.push_str(&escape(text));
    }
    for child in &node.children {
        write_node(child, out);
    }
    let _ = write!(out, "</{}>", node.tag);
}

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
