//! Small text helpers shared by the flattener and the custom-field
//! extractor.

use scraper::Html;

/// Derives a human-readable label from an API field name: underscores
/// become spaces and each word is capitalized.
///
/// `agent_group_visibility` -> `Agent Group Visibility`.
pub fn field_label(key: &str) -> String {
    key.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Strips HTML markup from a rich-text value, decoding entities and
/// collapsing runs of whitespace (including non-breaking spaces) into
/// single spaces.
pub fn strip_html(input: &str) -> String {
    let fragment = Html::parse_fragment(input);
    let text: String = fragment.root_element().text().collect();
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
