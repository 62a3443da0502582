//! Markup serializer for sanitized documents.
//!
//! Comments and processing instructions are not written. Namespace
//! declarations are emitted on the element that introduces them, in a
//! stable order, so serializing a serialized document reproduces it
//! byte-for-byte.

use log::trace;
use roxmltree::{Attribute, Node};

use super::sanitize;

pub(super) const SVG_NS: &str = "http://www.w3.org/2000/svg";
const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

/// Attribute overrides applied to the root element only.
#[derive(Debug, Default)]
pub(super) struct RootAttributes<'a> {
    /// Un-namespaced attributes removed from the root.
    pub(super) replaced: &'a [&'a str],

    /// Attributes written after the root's remaining attributes.
    pub(super) appended: Vec<(&'static str, String)>,
}

/// Serializes `root` and its kept subtree.
pub(super) fn write_document(root: Node<'_, '_>, overrides: &RootAttributes<'_>) -> String {
    let mut out = String::with_capacity(4096);
    write_element(&mut out, root, Some(overrides));
    out
}

fn write_element(out: &mut String, node: Node<'_, '_>, root: Option<&RootAttributes<'_>>) {
    let name = element_name(node);

    out.push('<');
    out.push_str(&name);
    write_namespace_declarations(out, node, root.is_some());

    for attr in node.attributes() {
        let replaced = root.is_some_and(|overrides| {
            attr.namespace().is_none() && overrides.replaced.contains(&attr.name())
        });
        if replaced {
            continue;
        }
        if !sanitize::keep_attribute(&attr) {
            trace!(element = node.tag_name().name(), attribute = attr.name(); "Dropping attribute");
            continue;
        }
        if let Some(attr_name) = attribute_name(node, &attr) {
            write_attribute(out, &attr_name, attr.value());
        }
    }

    if let Some(overrides) = root {
        for (attr_name, value) in &overrides.appended {
            write_attribute(out, attr_name, value);
        }
    }

    let children: Vec<Node<'_, '_>> = node
        .children()
        .filter(|child| child.is_text() || (child.is_element() && keep(*child)))
        .collect();

    if children.is_empty() {
        out.push_str("/>");
        return;
    }

    out.push('>');
    for child in children {
        if child.is_element() {
            write_element(out, child, None);
        } else if let Some(text) = child.text() {
            push_escaped(out, text, false);
        }
    }
    out.push_str("</");
    out.push_str(&name);
    out.push('>');
}

fn keep(node: Node<'_, '_>) -> bool {
    let kept = sanitize::keep_element(node);
    if !kept {
        trace!(element = node.tag_name().name(); "Dropping element");
    }
    kept
}

fn write_namespace_declarations(out: &mut String, node: Node<'_, '_>, is_root: bool) {
    let parent = if is_root { None } else { node.parent_element() };

    let mut declared: Vec<(Option<&str>, &str)> = node
        .namespaces()
        .filter(|ns| ns.name() != Some("xml"))
        .filter(|ns| {
            parent.is_none_or(|parent| {
                !parent
                    .namespaces()
                    .any(|inherited| inherited.name() == ns.name() && inherited.uri() == ns.uri())
            })
        })
        .map(|ns| (ns.name(), ns.uri()))
        .collect();

    if is_root && node.tag_name().namespace().is_none() {
        declared.retain(|(prefix, _)| prefix.is_some());
        declared.push((None, SVG_NS));
    }

    declared.sort_by(|a, b| a.0.cmp(&b.0));
    declared.dedup_by(|a, b| a.0 == b.0);

    for (prefix, uri) in declared {
        match prefix {
            None => write_attribute(out, "xmlns", uri),
            Some(prefix) => write_attribute(out, &format!("xmlns:{prefix}"), uri),
        }
    }
}

fn element_name(node: Node<'_, '_>) -> String {
    let tag = node.tag_name();
    let Some(uri) = tag.namespace() else {
        return tag.name().to_string();
    };

    let is_default = node
        .namespaces()
        .any(|ns| ns.name().is_none() && ns.uri() == uri);
    if is_default {
        return tag.name().to_string();
    }

    match node
        .namespaces()
        .find(|ns| ns.uri() == uri)
        .and_then(|ns| ns.name())
    {
        Some(prefix) => format!("{prefix}:{}", tag.name()),
        None => tag.name().to_string(),
    }
}

fn attribute_name(node: Node<'_, '_>, attr: &Attribute<'_, '_>) -> Option<String> {
    match attr.namespace() {
        None => Some(attr.name().to_string()),
        Some(XML_NS) => Some(format!("xml:{}", attr.name())),
        Some(uri) => node
            .namespaces()
            .find(|ns| ns.uri() == uri && ns.name().is_some())
            .and_then(|ns| ns.name())
            .map(|prefix| format!("{prefix}:{}", attr.name())),
    }
}

fn write_attribute(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    push_escaped(out, value, true);
    out.push('"');
}

fn push_escaped(out: &mut String, text: &str, attribute: bool) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            '\n' if attribute => out.push_str("&#10;"),
            '\r' if attribute => out.push_str("&#13;"),
            '\t' if attribute => out.push_str("&#9;"),
            _ => out.push(c),
        }
    }
}
