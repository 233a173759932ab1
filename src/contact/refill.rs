//! Puts a rejected submission back into the contact form, so the visitor
//! can correct it and send again without retyping.

use crate::html;

use super::fields::FIELDS;
use super::Submission;

/// Write the posted values into the controls of form `form_id`: `value` on
/// inputs, the text of textareas, `selected` on the matching option. All
/// values are escaped. The page comes back unchanged when the form is
/// missing.
pub fn refill_form(page: &str, form_id: &str, data: &Submission) -> String {
    let Some(form) = html::find_element(page, form_id) else {
        return page.to_string();
    };

    let mut controls = page[form.inner.clone()].to_string();
    for field in FIELDS {
        if let Some(value) = data.get(field.name) {
            controls = fill_control(&controls, field.name, value);
        }
    }

    html::splice(page, form.inner, &controls)
}

fn fill_control(markup: &str, name: &str, value: &str) -> String {
    if let Some(input) = html::find_named(markup, "input", name) {
        let open = input.open_tag();
        let tag = html::set_attr(&markup[open.clone()], "value", Some(value));
        return html::splice(markup, open, &tag);
    }

    if let Some(textarea) = html::find_named(markup, "textarea", name) {
        return html::splice(markup, textarea.inner, &html::escape(value));
    }

    if let Some(select) = html::find_named(markup, "select", name) {
        let options = html::rewrite_open_tags(&markup[select.inner.clone()], "option", |tag| {
            if html::attr(tag, "value") == Some(value) {
                html::set_attr(tag, "selected", None)
            } else {
                html::remove_attr(tag, "selected")
            }
        });
        return html::splice(markup, select.inner, &options);
    }

    markup.to_string()
}
