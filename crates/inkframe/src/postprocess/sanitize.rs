//! Content policy for embedded vector markup.
//!
//! Elements that execute code or pull in other documents are dropped along
//! with their subtree. Attributes are dropped when they register event
//! handlers or reference anything other than a fragment of the same
//! document.

use std::borrow::Cow;

use roxmltree::{Attribute, Node};

const FORBIDDEN_ELEMENTS: &[&str] = &[
    "script", "iframe", "frame", "frameset", "object", "embed", "applet", "base", "link", "meta",
];

const FORBIDDEN_ATTRIBUTES: &[&str] = &[
    "src",
    "srcset",
    "action",
    "formaction",
    "background",
    "poster",
    "ping",
];

/// Returns true if the element (and its subtree) may be kept.
pub(super) fn keep_element(node: Node<'_, '_>) -> bool {
    let name = node.tag_name().name().to_ascii_lowercase();

    if FORBIDDEN_ELEMENTS.contains(&name.as_str()) {
        return false;
    }

    match name.as_str() {
        "style" => {
            let css: String = node
                .children()
                .filter_map(|child| child.text())
                .collect();
            !references_external(&css)
        }
        // Animations can rewrite an href after sanitizing.
        "set" | "animate" => node
            .attributes()
            .find(|attr| attr.name() == "attributeName")
            .is_none_or(|attr| !attr.value().ends_with("href")),
        _ => true,
    }
}

/// Returns true if the attribute may be kept.
pub(super) fn keep_attribute(attr: &Attribute<'_, '_>) -> bool {
    let name = attr.name().to_ascii_lowercase();

    if name.starts_with("on") || FORBIDDEN_ATTRIBUTES.contains(&name.as_str()) {
        return false;
    }

    if name == "href" {
        return attr.value().trim_start().starts_with('#');
    }

    !references_external(attr.value())
}

/// CSS functions whose arguments name a resource to fetch.
const FETCHING_FUNCTIONS: &[&str] = &["url(", "src(", "image-set(", "image(", "cross-fade("];

/// Returns true if a CSS or attribute value can fetch another resource.
///
/// CSS escapes are decoded first, so `u\72l(` is screened like `url(`.
/// Every target named inside a fetching function must be a `#id` fragment
/// or an inline `data:image/` payload.
pub(super) fn references_external(value: &str) -> bool {
    let css = decode_escapes(value).to_ascii_lowercase();

    if css.contains("@import") || css.contains("javascript:") {
        return true;
    }

    FETCHING_FUNCTIONS.iter().any(|function| {
        css.match_indices(function).any(|(index, _)| {
            let args = &css[index + function.len()..];
            let args = args.split(')').next().unwrap_or(args);
            function_targets(function, args)
                .into_iter()
                .any(|target| !is_local_target(target))
        })
    })
}

fn is_local_target(target: &str) -> bool {
    let target = target.trim();
    target.is_empty() || target.starts_with('#') || target.starts_with("data:image/")
}

/// Quoted strings in `args`, plus the bare token of `url(` and `src(`.
fn function_targets<'a>(function: &str, args: &'a str) -> Vec<&'a str> {
    let mut targets = Vec::new();
    let mut rest = args;
    while let Some(open) = rest.find(['"', '\'']) {
        let quote = &rest[open..=open];
        let body = &rest[open + 1..];
        match body.find(quote) {
            Some(close) => {
                targets.push(&body[..close]);
                rest = &body[close + 1..];
            }
            None => {
                targets.push(body);
                break;
            }
        }
    }

    let bare = args.trim();
    if matches!(function, "url(" | "src(") && !bare.starts_with(['"', '\'']) {
        targets.push(bare);
    }
    targets
}

/// Decodes CSS escapes: `\` plus up to six hex digits (and one optional
/// whitespace terminator), an escaped newline, or an escaped literal.
fn decode_escapes(value: &str) -> Cow<'_, str> {
    if !value.contains('\\') {
        return Cow::Borrowed(value);
    }

    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }

        let mut hex = String::new();
        while hex.len() < 6 {
            match chars.peek() {
                Some(digit) if digit.is_ascii_hexdigit() => {
                    hex.push(*digit);
                    chars.next();
                }
                _ => break,
            }
        }

        if hex.is_empty() {
            match chars.next() {
                Some('\n') | None => {}
                Some(literal) => out.push(literal),
            }
            continue;
        }

        if chars.peek().is_some_and(char::is_ascii_whitespace) {
            chars.next();
        }
        let decoded = u32::from_str_radix(&hex, 16)
            .ok()
            .and_then(char::from_u32)
            .filter(|decoded| *decoded != '\0')
            .unwrap_or(char::REPLACEMENT_CHARACTER);
        out.push(decoded);
    }
    Cow::Owned(out)
}
