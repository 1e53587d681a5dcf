//! Inline `@arch` tag parsing.
//!
//! Files opt into an architecture with a marker anywhere in their text
//! (conventionally a header comment):
//!
//! ```text
//! // @arch http-handler +legacy-io +audited
//! ```
//!
//! The first marker wins. Mixin tokens must share the marker's line.

use regex::Regex;

/// A parsed per-file architecture marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchTag {
    pub arch_id: String,
    pub inline_mixins: Vec<String>,
}

/// Scan source text for the first `@arch` marker.
pub fn parse_arch_tag(source: &str) -> Option<ArchTag> {
    let marker = Regex::new(r"@arch[ \t]+([A-Za-z0-9_./-]+)((?:[ \t]+\+[A-Za-z0-9_./-]+)*)")
        .expect("arch tag regex");
    let captures = marker.captures(source)?;
    let arch_id = captures.get(1)?.as_str().to_string();
    let inline_mixins = captures
        .get(2)
        .map(|group| {
            group
                .as_str()
                .split_whitespace()
                .filter_map(|token| token.strip_prefix('+'))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    Some(ArchTag {
        arch_id,
        inline_mixins,
    })
}
