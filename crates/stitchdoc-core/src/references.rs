//! Element id allocation
//!
//! Section ids are derived from their titles (`== Section One` gives
//! `_section_one`) unless the author supplied one with `[[id]]` or `[#id]`.
//! Derived ids that are already taken get a `_2`, `_3`, ... suffix, in the
//! order sections are encountered. Every id is recorded with its title so
//! renderers can print cross-reference labels.

use once_cell::sync::Lazy;
use regex::Regex;
use stitchdoc_ast::{DocumentAttributes, ElementAttributes, ElementReferences, Inline};
use tracing::trace;

use crate::config::AssemblyConfig;
use crate::location::substitute;

static NON_ALPHANUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("valid slug pattern"));

/// Allocates unique element ids for one assembly pass
#[derive(Debug, Clone, Default)]
pub struct ReferenceRegistry {
    config: AssemblyConfig,
    references: ElementReferences,
}

impl ReferenceRegistry {
    pub fn new(config: AssemblyConfig) -> Self {
        Self {
            config,
            references: ElementReferences::new(),
        }
    }

    /// Resolve the id of an element and record it with its title.
    ///
    /// Custom ids are used verbatim and replace any earlier entry. Otherwise
    /// an id already present in `attrs` (or derived from the title) is made
    /// unique with the first free `_N` suffix.
    pub fn resolve_id(
        &mut self,
        attrs: &ElementAttributes,
        title: &[Inline],
        doc_attrs: &DocumentAttributes,
    ) -> String {
        if attrs.has_custom_id() {
            if let Some(id) = attrs.id() {
                trace!(id, "registering custom id");
                self.references.insert(id.to_string(), title.to_vec());
                return id.to_string();
            }
        }

        let base = match attrs.id() {
            Some(id) => id.to_string(),
            None => format!(
                "{}{}",
                self.config.id_prefix(doc_attrs),
                slugify(&plain_text(title, doc_attrs))
            ),
        };
        let mut id = base.clone();
        let mut suffix = 2;
        while self.references.contains_key(&id) {
            id = format!("{}_{}", base, suffix);
            suffix += 1;
        }
        trace!(id = id.as_str(), "registering generated id");
        self.references.insert(id.clone(), title.to_vec());
        id
    }

    /// Title registered for `id`
    pub fn get(&self, id: &str) -> Option<&[Inline]> {
        self.references.get(id).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.references.len()
    }

    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }

    /// Forget every registered id
    pub fn reset(&mut self) {
        self.references.clear();
    }

    /// Hand over the table, leaving the registry empty
    pub fn take_references(&mut self) -> ElementReferences {
        std::mem::take(&mut self.references)
    }
}

/// Flatten inline content to the text used for ids.
///
/// Formatting markers are dropped, links contribute their target followed by
/// their label, footnotes contribute nothing and known attribute
/// placeholders are substituted.
pub fn plain_text(inlines: &[Inline], attrs: &DocumentAttributes) -> String {
    let mut text = String::new();
    push_plain_text(&mut text, inlines, attrs);
    text
}

fn push_plain_text(text: &mut String, inlines: &[Inline], attrs: &DocumentAttributes) {
    for inline in inlines {
        match inline {
            Inline::Text(content) => text.push_str(content),
            Inline::Format(_, inner) => push_plain_text(text, inner, attrs),
            Inline::Link(link) => {
                text.push_str(&substitute(&link.location, attrs));
                push_plain_text(text, &link.text, attrs);
            }
            Inline::AttributeSubstitution(name) => match attrs.get(name) {
                Some(value) => text.push_str(value),
                None => {
                    text.push('{');
                    text.push_str(name);
                    text.push('}');
                }
            },
            Inline::UserMacro(user_macro) => text.push_str(&user_macro.value),
            Inline::Break => text.push(' '),
            Inline::Footnote(_) => {}
        }
    }
}

/// Lower-case `text` and collapse everything outside `[a-z0-9]` into single
/// underscores, trimmed at both ends
pub fn slugify(text: &str) -> String {
    let lower = text.to_lowercase();
    NON_ALPHANUMERIC
        .replace_all(&lower, "_")
        .trim_matches('_')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use stitchdoc_ast::{Footnote, FormatType, Link, Location};

    fn link_title() -> Vec<Inline> {
        vec![
            Inline::text("a link to "),
            Inline::Link(Link {
                location: Location::from_text("https://foo.com"),
                text: vec![],
            }),
        ]
    }

    #[test]
    fn test_simple_title() {
        let mut registry = ReferenceRegistry::default();
        let id = registry.resolve_id(
            &ElementAttributes::new(),
            &[Inline::text("foo")],
            &DocumentAttributes::new(),
        );
        assert_eq!(id, "_foo");
        assert_eq!(registry.get("_foo"), Some(&[Inline::text("foo")][..]));
    }

    #[test]
    fn test_title_with_link_keeps_scheme_collapsed() {
        let mut registry = ReferenceRegistry::default();
        let id = registry.resolve_id(
            &ElementAttributes::new(),
            &link_title(),
            &DocumentAttributes::new(),
        );
        assert_eq!(id, "_a_link_to_https_foo_com");
    }

    #[test]
    fn test_custom_prefix_attribute() {
        let mut registry = ReferenceRegistry::default();
        let attrs: DocumentAttributes = [("idprefix", "custom_")].into_iter().collect();
        let id = registry.resolve_id(&ElementAttributes::new(), &link_title(), &attrs);
        assert_eq!(id, "custom_a_link_to_https_foo_com");
    }

    #[test]
    fn test_custom_id_verbatim() {
        let mut registry = ReferenceRegistry::default();
        let attrs: DocumentAttributes = [("idprefix", "custom_")].into_iter().collect();
        let id = registry.resolve_id(
            &ElementAttributes::with_custom_id("bar"),
            &[Inline::text("foo")],
            &attrs,
        );
        assert_eq!(id, "bar");
    }

    #[test]
    fn test_collisions_get_suffixes_in_order() {
        let mut registry = ReferenceRegistry::default();
        let doc_attrs = DocumentAttributes::new();
        let title = [Inline::text("section 1")];
        let ids: Vec<String> = (0..3)
            .map(|_| registry.resolve_id(&ElementAttributes::new(), &title, &doc_attrs))
            .collect();
        assert_eq!(ids, vec!["_section_1", "_section_1_2", "_section_1_3"]);
    }

    #[test]
    fn test_suffix_skips_taken_ids() {
        let mut registry = ReferenceRegistry::default();
        let doc_attrs = DocumentAttributes::new();
        registry.resolve_id(
            &ElementAttributes::with_custom_id("_intro_2"),
            &[Inline::text("custom")],
            &doc_attrs,
        );
        let first = registry.resolve_id(&ElementAttributes::new(), &[Inline::text("Intro")], &doc_attrs);
        let second = registry.resolve_id(&ElementAttributes::new(), &[Inline::text("Intro")], &doc_attrs);
        assert_eq!(first, "_intro");
        assert_eq!(second, "_intro_3");
    }

    #[test]
    fn test_custom_id_overwrites_entry() {
        let mut registry = ReferenceRegistry::default();
        let doc_attrs = DocumentAttributes::new();
        registry.resolve_id(&ElementAttributes::new(), &[Inline::text("dup")], &doc_attrs);
        let id = registry.resolve_id(
            &ElementAttributes::with_custom_id("_dup"),
            &[Inline::text("other")],
            &doc_attrs,
        );
        assert_eq!(id, "_dup");
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("_dup"), Some(&[Inline::text("other")][..]));
    }

    #[test]
    fn test_plain_text_strips_markup_and_footnotes() {
        let title = vec![
            Inline::text("section "),
            Inline::Format(FormatType::Bold, vec![Inline::text("One")]),
            Inline::Footnote(Footnote::new(vec![Inline::text("note")])),
            Inline::AttributeSubstitution("version".to_string()),
        ];
        let attrs: DocumentAttributes = [("version", " v2")].into_iter().collect();
        assert_eq!(plain_text(&title, &attrs), "section One v2");
        assert_eq!(slugify(&plain_text(&title, &attrs)), "section_one_v2");
    }

    #[test]
    fn test_link_label_follows_target() {
        let title = vec![Inline::Link(Link {
            location: Location::from_text("https://foo.com"),
            text: vec![Inline::text("content")],
        })];
        assert_eq!(
            plain_text(&title, &DocumentAttributes::new()),
            "https://foo.comcontent"
        );
    }

    #[test]
    fn test_slugify_trims_and_collapses() {
        assert_eq!(slugify("  Hello,   World!  "), "hello_world");
        assert_eq!(slugify("Café au lait"), "caf_au_lait");
        assert_eq!(slugify("***"), "");
    }

    #[test]
    fn test_reset() {
        let mut registry = ReferenceRegistry::default();
        registry.resolve_id(&ElementAttributes::new(), &[Inline::text("a")], &DocumentAttributes::new());
        registry.reset();
        assert!(registry.is_empty());
    }
}
