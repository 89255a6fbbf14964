//! Small helpers over `scraper` for selector-driven extraction.
//!
//! Selectors that fail to parse simply match nothing, so a typo in one
//! profile degrades that field instead of failing the page.

use scraper::{ElementRef, Html, Selector};

use crate::parse::collapse_whitespace;

pub(crate) fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

pub(crate) fn select_first<'a>(doc: &'a Html, css: &str) -> Option<ElementRef<'a>> {
    let sel = selector(css)?;
    doc.select(&sel).next()
}

pub(crate) fn select_all<'a>(doc: &'a Html, css: &str) -> Vec<ElementRef<'a>> {
    selector(css).map_or_else(Vec::new, |sel| doc.select(&sel).collect())
}

pub(crate) fn select_within<'a>(el: ElementRef<'a>, css: &str) -> Vec<ElementRef<'a>> {
    selector(css).map_or_else(Vec::new, |sel| el.select(&sel).collect())
}

pub(crate) fn first_within<'a>(el: ElementRef<'a>, css: &str) -> Option<ElementRef<'a>> {
    let sel = selector(css)?;
    el.select(&sel).next()
}

/// Concatenated text of `el`, skipping `<script>`/`<style>` bodies, with
/// whitespace collapsed. Adjacent inline nodes are joined without a gap, so
/// `<span>1,299</span><span>.00</span>` stays `1,299.00`.
pub(crate) fn element_text(el: ElementRef<'_>) -> String {
    collapse_whitespace(&raw_text(el, ""))
}

/// Like [`element_text`] but separates every text node with a space; used
/// for bullet lists and descriptions.
pub(crate) fn spaced_text(el: ElementRef<'_>) -> String {
    collapse_whitespace(&raw_text(el, " "))
}

fn raw_text(el: ElementRef<'_>, separator: &str) -> String {
    let mut out = String::new();
    for node in el.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let in_code = node
            .parent()
            .and_then(|p| p.value().as_element().map(scraper::node::Element::name))
            .is_some_and(|name| matches!(name, "script" | "style" | "noscript"));
        if !in_code {
            out.push_str(text);
            out.push_str(separator);
        }
    }
    out
}

/// Text of the first selector that yields non-empty text.
pub(crate) fn first_text(doc: &Html, selectors: &[&str]) -> Option<String> {
    selectors.iter().find_map(|css| {
        select_all(doc, css)
            .into_iter()
            .map(element_text)
            .find(|t| !t.is_empty())
    })
}

/// Value of `attr` on the first element matching `css` that carries it.
pub(crate) fn first_attr(doc: &Html, css: &str, attr: &str) -> Option<String> {
    select_all(doc, css).into_iter().find_map(|el| attr_value(el, attr))
}

pub(crate) fn attr_value(el: ElementRef<'_>, attr: &str) -> Option<String> {
    el.value()
        .attr(attr)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

/// `content` of `<meta property=key>` or `<meta name=key>`.
pub(crate) fn meta_content(doc: &Html, key: &str) -> Option<String> {
    first_attr(doc, &format!(r#"meta[property="{key}"]"#), "content")
        .or_else(|| first_attr(doc, &format!(r#"meta[name="{key}"]"#), "content"))
}

/// Texts of every element matching any of `selectors`, in document order per
/// selector.
pub(crate) fn all_texts(doc: &Html, selectors: &[&str]) -> Vec<String> {
    selectors
        .iter()
        .flat_map(|css| select_all(doc, css))
        .map(element_text)
        .filter(|t| !t.is_empty())
        .collect()
}

/// Page language from `<html lang>`.
pub(crate) fn document_lang(doc: &Html) -> Option<String> {
    attr_value(doc.root_element(), "lang")
}

/// Text content of an HTML fragment such as a JSON-LD description.
pub(crate) fn strip_tags(fragment: &str) -> String {
    if !fragment.contains('<') {
        return collapse_whitespace(fragment);
    }
    let parsed = Html::parse_fragment(fragment);
    spaced_text(parsed.root_element())
}

/// Turns a detail-table label into a `raw_fields` key: `"Item Weight:"` →
/// `"item_weight"`.
pub(crate) fn field_key(label: &str) -> String {
    let mut key = String::with_capacity(label.len());
    for c in label.trim().trim_end_matches(':').chars() {
        if c.is_alphanumeric() {
            key.extend(c.to_lowercase());
        } else if !key.ends_with('_') && !key.is_empty() {
            key.push('_');
        }
    }
    key.trim_end_matches('_').to_owned()
}

/// First `max` characters of `text`, never splitting a character.
pub(crate) fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].trim_end().to_owned(),
        None => text.to_owned(),
    }
}
