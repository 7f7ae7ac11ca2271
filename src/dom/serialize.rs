use crate::dom::node::{Document, NodeId, NodeKind};
use crate::dom::parser::{is_raw_text_element, is_void_element};
use crate::dom::query::is_checkable_input;

/// Serialize the document back to HTML.
///
/// Control state assigned by script is written into markup: input `value`
/// and `checked` attributes, option `selected`, textarea content. The output
/// therefore shows the form as filled.
pub fn to_html(doc: &Document) -> String {
    let mut out = String::new();
    let mut stack: Vec<Step<'_>> = doc
        .children(doc.root())
        .iter()
        .rev()
        .map(|&child| Step::Node(child))
        .collect();

    while let Some(step) = stack.pop() {
        match step {
            Step::Node(id) => write_node(doc, id, &mut out, &mut stack),
            Step::EndTag(name) => {
                out.push_str("</");
                out.push_str(name);
                out.push('>');
            }
        }
    }
    out
}

/// Pending serializer work: a node to open, or an end tag to emit once its
/// children are written.
enum Step<'a> {
    Node(NodeId),
    EndTag(&'a str),
}

fn write_node<'a>(doc: &'a Document, id: NodeId, out: &mut String, stack: &mut Vec<Step<'a>>) {
    let Some(node) = doc.node(id) else {
        return;
    };
    match &node.kind {
        NodeKind::Document => {
            stack.extend(node.children.iter().rev().map(|&child| Step::Node(child)));
        }
        NodeKind::Doctype(name) => {
            out.push_str("<!DOCTYPE ");
            out.push_str(if name.is_empty() { "html" } else { name });
            out.push('>');
        }
        NodeKind::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
        NodeKind::Text(text) => {
            let raw_parent = doc
                .parent(id)
                .and_then(|p| doc.tag_name(p))
                .is_some_and(|t| matches!(t, "script" | "style"));
            if raw_parent {
                out.push_str(text);
            } else {
                out.push_str(&escape_text(text));
            }
        }
        NodeKind::Element(el) => {
            out.push('<');
            out.push_str(&el.name);
            for (name, value) in reflected_attrs(doc, id) {
                out.push(' ');
                out.push_str(&name);
                if !value.is_empty() {
                    out.push_str("=\"");
                    out.push_str(&escape_attr(&value));
                    out.push('"');
                }
            }
            out.push('>');

            if is_void_element(&el.name) {
                return;
            }

            stack.push(Step::EndTag(&el.name));
            if el.name == "textarea" {
                out.push_str(&escape_text(&doc.value(id)));
            } else if is_raw_text_element(&el.name) && el.name != "title" {
                out.push_str(&doc.text_content(id));
            } else {
                stack.extend(node.children.iter().rev().map(|&child| Step::Node(child)));
            }
        }
    }
}

/// Attributes of an element with live control state folded in.
fn reflected_attrs(doc: &Document, id: NodeId) -> Vec<(String, String)> {
    let Some(el) = doc.element(id) else {
        return Vec::new();
    };
    let mut attrs: Vec<(String, String)> = el
        .attrs
        .iter()
        .map(|a| (a.name.clone(), a.value.clone()))
        .collect();

    let mut set = |name: &str, value: Option<String>| {
        attrs.retain(|(n, _)| n != name);
        if let Some(v) = value {
            attrs.push((name.to_string(), v));
        }
    };

    match el.name.as_str() {
        "input" if is_checkable_input(doc, id) => {
            if el.state.checked.is_some() {
                set("checked", doc.checked(id).then(String::new));
            }
        }
        "input" => {
            if let Some(v) = &el.state.value {
                set("value", Some(v.clone()));
            }
        }
        "option" => {
            let touched = doc
                .closest_ancestor(id, "select")
                .and_then(|s| doc.element(s))
                .is_some_and(|s| s.state.selection != Default::default());
            if touched {
                set("selected", doc.is_option_selected(id).then(String::new));
            }
        }
        _ => {}
    }
    attrs
}

pub fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

pub fn escape_attr(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}
