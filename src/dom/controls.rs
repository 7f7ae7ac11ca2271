//! Form-control properties (`value`, `checked`, select selectedness) with
//! the same read/write rules a browser applies.

use crate::dom::node::{Document, NodeId, Selection, normalize_whitespace};
use crate::dom::query::{form_owner, input_type};

impl Document {
    // -- value ----------------------------------------------------------------

    /// The `value` property of an input, textarea or select.
    pub fn value(&self, id: NodeId) -> String {
        let Some(el) = self.element(id) else {
            return String::new();
        };
        match el.name.as_str() {
            "input" => {
                if let Some(v) = &el.state.value {
                    return v.clone();
                }
                match el.attr("value") {
                    Some(v) => v.to_string(),
                    None if matches!(input_type(self, id).as_str(), "checkbox" | "radio") => {
                        "on".to_string()
                    }
                    None => String::new(),
                }
            }
            "textarea" => el
                .state
                .value
                .clone()
                .unwrap_or_else(|| self.text_content(id)),
            "select" => self
                .selected_option(id)
                .map(|opt| self.option_value(opt))
                .unwrap_or_default(),
            "option" => self.option_value(id),
            _ => String::new(),
        }
    }

    /// Assign the `value` property. For a select, this selects the first
    /// option with a matching value, or no option at all.
    pub fn set_value(&mut self, id: NodeId, value: &str) {
        match self.tag_name(id) {
            Some("input") | Some("textarea") => {
                if let Some(el) = self.element_mut(id) {
                    el.state.value = Some(value.to_string());
                }
            }
            Some("select") => {
                let selection = self
                    .select_options(id)
                    .into_iter()
                    .find(|&opt| self.option_value(opt) == value)
                    .map(Selection::Option)
                    .unwrap_or(Selection::Nothing);
                if let Some(el) = self.element_mut(id) {
                    el.state.selection = selection;
                }
            }
            _ => {}
        }
    }

    // -- checkedness ----------------------------------------------------------

    pub fn checked(&self, id: NodeId) -> bool {
        self.element(id)
            .map(|el| el.state.checked.unwrap_or_else(|| el.has_attr("checked")))
            .unwrap_or(false)
    }

    /// Assign the `checked` property. Checking a radio unchecks the other
    /// radios of its group (same name, same form owner).
    pub fn set_checked(&mut self, id: NodeId, checked: bool) {
        if checked && input_type(self, id) == "radio" {
            for other in self.radio_group(id) {
                if other != id {
                    if let Some(el) = self.element_mut(other) {
                        el.state.checked = Some(false);
                    }
                }
            }
        }
        if let Some(el) = self.element_mut(id) {
            el.state.checked = Some(checked);
        }
    }

    /// Radios sharing `id`'s name within the same form owner, including `id`.
    pub fn radio_group(&self, id: NodeId) -> Vec<NodeId> {
        let Some(name) = self.non_empty_attr(id, "name") else {
            return vec![id];
        };
        let owner = form_owner(self, id);
        self.descendant_elements(self.root(), "input")
            .filter(|&n| {
                input_type(self, n) == "radio"
                    && self.attr(n, "name") == Some(name)
                    && form_owner(self, n) == owner
            })
            .collect()
    }

    // -- select options -------------------------------------------------------

    /// `<option>` elements of a select, including those inside optgroups.
    pub fn select_options(&self, select: NodeId) -> Vec<NodeId> {
        self.descendant_elements(select, "option").collect()
    }

    /// Option label text with whitespace collapsed (the `text` property).
    pub fn option_text(&self, option: NodeId) -> String {
        normalize_whitespace(&self.text_content(option))
    }

    /// The `value` attribute of an option, or its text when absent.
    pub fn option_value(&self, option: NodeId) -> String {
        match self.attr(option, "value") {
            Some(v) => v.to_string(),
            None => self.option_text(option),
        }
    }

    pub fn selected_option(&self, select: NodeId) -> Option<NodeId> {
        let state = self.element(select)?.state.selection;
        match state {
            Selection::Option(opt) => Some(opt),
            Selection::Nothing => None,
            Selection::Default => {
                let options = self.select_options(select);
                let explicit = options
                    .iter()
                    .copied()
                    .find(|&opt| self.has_attr(opt, "selected"));
                if explicit.is_some() || self.has_attr(select, "multiple") {
                    explicit
                } else {
                    options.first().copied()
                }
            }
        }
    }

    pub fn is_option_selected(&self, option: NodeId) -> bool {
        match self.closest_ancestor(option, "select") {
            Some(select) => self.selected_option(select) == Some(option),
            None => self.has_attr(option, "selected"),
        }
    }
}
