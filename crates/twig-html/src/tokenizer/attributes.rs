use std::sync::LazyLock;

use regex::Regex;
use twig_dom::AttributesMap;

/// `name="value"` or a bare `name`. Names are runs of word characters.
const ATTRIBUTE_PATTERN: &str = r#"(\w+)(?:="([^"]*)")?"#;

static ATTRIBUTE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(ATTRIBUTE_PATTERN).expect("attribute pattern is valid"));

/// Extract attributes from the raw segment of a start tag.
///
/// Matches are taken left to right without overlap. Quoted values are kept
/// verbatim; a bare name maps to `""`. The map keeps source order; when a
/// name repeats, the later value wins but the name stays where it first
/// appeared. Fragments that fit neither shape contribute nothing, so this never
/// fails.
#[must_use]
pub fn extract_attributes(raw: &str) -> AttributesMap {
    let mut attrs = AttributesMap::new();
    attrs.extend(ATTRIBUTE_RE.captures_iter(raw).filter_map(|caps| {
        let name = caps.get(1)?.as_str().to_string();
        let value = caps.get(2).map_or("", |m| m.as_str()).to_string();
        Some((name, value))
    }));
    attrs
}
