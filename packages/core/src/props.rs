//! The property writer: translates a `Props` diff into calls on
//! [`Document`]. Dispatches each name through an open-union `PropValue`
//! (attribute, property, style, or listener) rather than a fixed
//! per-tag attribute table.

use crate::document::{is_custom_property, Document};
use crate::vnode::{Props, PropValue, StyleDecl, StyleValue};

/// CSS properties that take a bare number, never a `px` suffix.
const UNITLESS_STYLE_PROPS: &[&str] = &[
    "animationIterationCount",
    "columnCount",
    "fillOpacity",
    "flexGrow",
    "flexShrink",
    "fontWeight",
    "gridColumn",
    "gridRow",
    "lineHeight",
    "opacity",
    "order",
    "orphans",
    "strokeOpacity",
    "tabSize",
    "widows",
    "zIndex",
    "zoom",
];

fn is_unitless(name: &str) -> bool {
    UNITLESS_STYLE_PROPS.contains(&name)
}

/// Properties written as live DOM properties rather than attributes on the
/// default (non-SVG) namespace, regardless of diff equality.
fn is_always_write_property(name: &str) -> bool {
    name == "value" || name == "checked"
}

thread_local! {
    /// Event names come from a small, closed vocabulary (`click`,
    /// `pointerDown`, ...); interning them once and handing out `&'static`
    /// references avoids leaking a fresh allocation on every differing
    /// listener prop while still satisfying [`Document::set_listener`]'s
    /// bound.
    static EVENT_NAME_INTERNER: std::cell::RefCell<rustc_hash::FxHashSet<&'static str>> =
        std::cell::RefCell::new(rustc_hash::FxHashSet::default());
}

fn intern_event_name(name: String) -> &'static str {
    EVENT_NAME_INTERNER.with(|interner| {
        let mut interner = interner.borrow_mut();
        if let Some(existing) = interner.get(name.as_str()) {
            return *existing;
        }
        let leaked: &'static str = Box::leak(name.into_boxed_str());
        interner.insert(leaked);
        leaked
    })
}

/// `onClick` -> `"click"`; anything not matching the `on` + uppercase
/// convention is not a listener name.
fn event_name_from_prop(name: &str) -> Option<String> {
    let rest = name.strip_prefix("on")?;
    let mut chars = rest.chars();
    let first = chars.next()?;
    if !first.is_uppercase() {
        return None;
    }
    Some(first.to_lowercase().collect::<String>() + chars.as_str())
}

/// Builds the canonical prop-map key for the bare event name `"click"` used
/// by both [`crate::vnode::ElementBuilder::on`] and any hand-built `Props`
///.
pub fn on_prop_name(event_name: &str) -> String {
    let mut out = String::with_capacity(event_name.len() + 2);
    out.push_str("on");
    let mut chars = event_name.chars();
    if let Some(first) = chars.next() {
        out.extend(first.to_uppercase());
    }
    out.push_str(chars.as_str());
    out
}

fn rename_dom_attribute(name: &str) -> &str {
    match name {
        "className" => "class",
        "htmlFor" => "for",
        other => other,
    }
}

fn style_number_text(name: &str, value: f64) -> String {
    if is_unitless(name) {
        format!("{value}")
    } else {
        format!("{value}px")
    }
}

fn write_style_decl<D: Document>(doc: &D, el: &D::Node, name: &str, decl: &StyleDecl) {
    let text;
    let value = match decl {
        StyleDecl::Text(s) => s.as_ref(),
        StyleDecl::Number(n) => {
            text = style_number_text(name, *n);
            text.as_str()
        }
    };
    if is_custom_property(name) {
        doc.set_custom_style_property(el, name, value);
    } else {
        doc.set_style_property(el, name, value);
    }
}

fn write_style<D: Document>(doc: &D, el: &D::Node, new: &StyleValue, old: Option<&StyleValue>) {
    match new {
        StyleValue::Text(css) => doc.set_css_text(el, css),
        StyleValue::Map(new_map) => {
            if let Some(StyleValue::Text(_)) = old {
                doc.set_css_text(el, "");
            }
            let old_map: &[(std::borrow::Cow<'static, str>, StyleDecl)] = match old {
                Some(StyleValue::Map(m)) => m,
                _ => &[],
            };
            for (name, _) in old_map {
                if !new_map.iter().any(|(n, _)| n == name) {
                    doc.remove_style_property(el, name);
                }
            }
            for (name, decl) in new_map {
                let unchanged = old_map.iter().any(|(n, d)| n == name && d == decl);
                if !unchanged {
                    write_style_decl(doc, el, name, decl);
                }
            }
        }
    }
}

/// Assigns (or clears) one differing property. `svg` is true while diffing
/// inside an `<svg>` subtree. `old_value` is the previous render's value for
/// `name`, if any — only `style` currently looks at it, to know which style
/// keys dropped out of a style map.
fn write_one<D: Document>(
    doc: &D,
    el: &D::Node,
    name: &str,
    value: Option<&PropValue<D>>,
    old_value: Option<&PropValue<D>>,
    svg: bool,
) {
    if name == "children" || name == "key" || name == "ref" {
        return;
    }

    if let Some(event_name) = event_name_from_prop(name) {
        let handler = match value {
            Some(PropValue::Listener(f)) => Some(f.clone()),
            Some(_) => {
                log::error!("willow: prop `{name}` looks like a listener name but holds a non-listener value");
                return;
            }
            None => None,
        };
        doc.set_listener(el, intern_event_name(event_name), handler);
        return;
    }

    if name == "style" {
        let old_style = match old_value {
            Some(PropValue::Style(s)) => Some(s),
            _ => None,
        };
        match value {
            Some(PropValue::Style(s)) => write_style(doc, el, s, old_style),
            None => doc.set_css_text(el, ""),
            Some(_) => log::error!("willow: `style` prop must be `PropValue::Style`"),
        }
        return;
    }

    if name == "dangerouslySetInnerHTML" {
        match value {
            Some(PropValue::DangerouslySetInnerHtml(html)) => doc.set_inner_html(el, html),
            None => doc.set_inner_html(el, ""),
            Some(_) => log::error!("willow: `dangerouslySetInnerHTML` prop must hold its dedicated variant"),
        }
        return;
    }

    if svg {
        write_svg_attribute(doc, el, name, value);
        return;
    }

    if !is_always_write_property(name) {
        let dom_name = rename_dom_attribute(name);
        write_default_attribute(doc, el, dom_name, value);
        return;
    }

    match value {
        Some(PropValue::Text(s)) => doc.set_property_string(el, name, s),
        Some(PropValue::Number(n)) => doc.set_property_string(el, name, &n.to_string()),
        Some(PropValue::Bool(b)) => doc.set_property_bool(el, name, *b),
        None => doc.set_property_string(el, name, ""),
        Some(_) => log::error!("willow: prop `{name}` holds an unsupported value kind"),
    }
}

fn write_svg_attribute<D: Document>(doc: &D, el: &D::Node, name: &str, value: Option<&PropValue<D>>) {
    let dom_name = rename_dom_attribute(name);
    match value {
        Some(PropValue::Bool(true)) => doc.set_attribute(el, dom_name, ""),
        Some(PropValue::Bool(false)) | None => doc.remove_attribute(el, dom_name),
        Some(PropValue::Text(s)) => doc.set_attribute(el, dom_name, s),
        Some(PropValue::Number(n)) => doc.set_attribute(el, dom_name, &n.to_string()),
        Some(_) => log::error!("willow: prop `{name}` holds an unsupported value kind for SVG"),
    }
}

fn write_default_attribute<D: Document>(doc: &D, el: &D::Node, name: &str, value: Option<&PropValue<D>>) {
    match value {
        Some(PropValue::Bool(true)) => doc.set_attribute(el, name, ""),
        Some(PropValue::Bool(false)) | None => doc.remove_attribute(el, name),
        Some(PropValue::Text(s)) => doc.set_attribute(el, name, s),
        Some(PropValue::Number(n)) => doc.set_attribute(el, name, &n.to_string()),
        Some(_) => log::error!("willow: prop `{name}` holds an unsupported value kind"),
    }
}

fn same_value<D: Document>(a: &PropValue<D>, b: &PropValue<D>) -> bool {
    match (a, b) {
        (PropValue::Text(x), PropValue::Text(y)) => x == y,
        (PropValue::Number(x), PropValue::Number(y)) => x == y || (x.is_nan() && y.is_nan()),
        (PropValue::Bool(x), PropValue::Bool(y)) => x == y,
        (PropValue::Style(StyleValue::Text(x)), PropValue::Style(StyleValue::Text(y))) => x == y,
        (PropValue::Style(StyleValue::Map(x)), PropValue::Style(StyleValue::Map(y))) => x == y,
        (PropValue::DangerouslySetInnerHtml(x), PropValue::DangerouslySetInnerHtml(y)) => x == y,
        // Listeners always "differ" by identity in the DOM-mutation sense —
        // the mapping handles rebinds without touching `set_listener` at all
        //, but the
        // property writer still needs to re-run so the backing mapping
        // entry picks up the new closure.
        (PropValue::Listener(_), PropValue::Listener(_)) => false,
        _ => false,
    }
}

/// The full diff entry point used by the diff engine when writing an
/// intrinsic element's props.
pub(crate) fn diff_props<D: Document>(doc: &D, el: &D::Node, new: &Props<D>, old: &Props<D>, svg: bool) {
    for (name, old_value) in old.iter() {
        if new.get(name).is_none() {
            write_one(doc, el, name, None, Some(old_value), svg);
        }
    }
    for (name, value) in new.iter() {
        let always = !svg && is_always_write_property(name);
        let old_value = old.get(name);
        let changed = match old_value {
            Some(old_value) => !same_value(value, old_value),
            None => true,
        };
        if always || changed {
            write_one(doc, el, name, Some(value), old_value, svg);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_name_from_prop_lowercases_remainder() {
        assert_eq!(event_name_from_prop("onClick").as_deref(), Some("click"));
        assert_eq!(event_name_from_prop("onPointerDown").as_deref(), Some("pointerDown"));
        assert_eq!(event_name_from_prop("online"), None);
        assert_eq!(event_name_from_prop("class"), None);
    }

    #[test]
    fn on_prop_name_round_trips() {
        assert_eq!(on_prop_name("click"), "onClick");
        assert_eq!(event_name_from_prop(&on_prop_name("pointerDown")).as_deref(), Some("pointerDown"));
    }

    #[test]
    fn unitless_style_props_get_no_suffix() {
        assert_eq!(style_number_text("opacity", 0.5), "0.5");
        assert_eq!(style_number_text("width", 10.0), "10px");
    }

    #[test]
    fn renames_class_and_for() {
        assert_eq!(rename_dom_attribute("className"), "class");
        assert_eq!(rename_dom_attribute("htmlFor"), "for");
        assert_eq!(rename_dom_attribute("id"), "id");
    }
}
