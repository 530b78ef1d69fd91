//! # Sandbox Host
//!
//! The host side of the isolated rendering context. A [`Sandbox`] wraps one
//! assembled, instrumented document: it answers DOM and computed-style
//! queries over the rendered markup, buffers console and navigation messages
//! delivered from the sandboxed context, and evaluates assertion snippets
//! against the document scope (see [`eval`]).
//!
//! One sandbox serves exactly one grading run; instances are never reused,
//! so no state can leak between attempts. The sandboxed side may run
//! arbitrary script and mutate its own DOM, but it reaches the host only
//! through the message channel — and every inbound message is treated as
//! untrusted data, pattern-matched on its `type` and never evaluated.

pub mod error;
pub mod eval;
pub mod stylesheet;

use assembler::bridge::{self, ConsoleMethod, SandboxMessage};
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

pub use error::SandboxError;
pub use eval::{EvalError, Outcome};
pub use stylesheet::Stylesheet;

/// One buffered console call from the sandboxed context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleEntry {
    pub method: ConsoleMethod,
    pub args: Vec<String>,
}

/// Result of a computed-style lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StyleLookup {
    /// No element matches the selector.
    NoMatch,
    /// The element exists but nothing sets the property.
    Unset,
    /// The cascaded value.
    Value(String),
}

/// Host-side handle on one rendered, instrumented document.
///
/// The document is held as text and parsed per query; `scraper`'s parsed DOM
/// is not thread-safe, and keeping the handle `Send + Sync` lets grading run
/// on an async executor without ceremony.
#[derive(Debug)]
pub struct Sandbox {
    document: String,
    stylesheet: Stylesheet,
    console: Vec<ConsoleEntry>,
    navigations: Vec<String>,
}

impl Sandbox {
    /// Create a fresh sandbox for one assembled document.
    ///
    /// Refuses a document that does not carry the instrumentation payload:
    /// without the bridge there is no message channel and no isolation
    /// guarantee, so initialization fails rather than grading blind.
    pub fn new(assembled: &str) -> Result<Self, SandboxError> {
        if !assembled.contains(bridge::INSTRUMENTATION_MARKER) {
            return Err(SandboxError::MissingInstrumentation);
        }
        let dom = Html::parse_document(assembled);
        let style_selector = Selector::parse("style").expect("static selector");
        let css: String = dom
            .select(&style_selector)
            .map(|el| el.text().collect::<String>())
            .collect::<Vec<_>>()
            .join("\n");
        Ok(Self {
            document: assembled.to_string(),
            stylesheet: Stylesheet::parse(&css),
            console: Vec::new(),
            navigations: Vec::new(),
        })
    }

    pub(crate) fn document_html(&self) -> &str {
        &self.document
    }

    pub(crate) fn stylesheet(&self) -> &Stylesheet {
        &self.stylesheet
    }

    /// Deliver one raw inbound message from the rendering context.
    ///
    /// Messages are buffered in arrival order. Unknown types and malformed
    /// payloads are ignored.
    pub fn deliver(&mut self, raw: &str) {
        match bridge::parse_message(raw) {
            Some(SandboxMessage::Console { method, args }) => {
                let args = args
                    .iter()
                    .map(|value| match value {
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect();
                self.console.push(ConsoleEntry { method, args });
            }
            Some(SandboxMessage::Navigation { path }) => {
                debug!(%path, "navigation attempt captured");
                self.navigations.push(path);
            }
            None => {}
        }
    }

    /// Buffered console entries, in arrival order.
    pub fn console(&self) -> &[ConsoleEntry] {
        &self.console
    }

    /// Captured in-document navigation attempts, in arrival order.
    pub fn navigations(&self) -> &[String] {
        &self.navigations
    }

    /// The engine-captured output string: console arguments joined by
    /// spaces, one line per call.
    pub fn console_text(&self) -> String {
        self.console
            .iter()
            .map(|entry| entry.args.join(" "))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Whether any element matches the selector.
    pub fn exists(&self, selector: &str) -> Result<bool, SandboxError> {
        let dom = Html::parse_document(&self.document);
        let parsed = parse_selector(selector)?;
        Ok(dom.select(&parsed).next().is_some())
    }

    /// Text content of the first match, if any.
    pub fn first_text(&self, selector: &str) -> Result<Option<String>, SandboxError> {
        let dom = Html::parse_document(&self.document);
        let parsed = parse_selector(selector)?;
        Ok(dom
            .select(&parsed)
            .next()
            .map(|el| el.text().collect::<String>()))
    }

    /// Cascaded value of `property` on the first match of `selector`.
    pub fn computed_style(
        &self,
        selector: &str,
        property: &str,
    ) -> Result<StyleLookup, SandboxError> {
        let dom = Html::parse_document(&self.document);
        let parsed = parse_selector(selector)?;
        let Some(element) = dom.select(&parsed).next() else {
            return Ok(StyleLookup::NoMatch);
        };
        Ok(match self.stylesheet.computed_of(&dom, element, property) {
            Some(value) => StyleLookup::Value(value),
            None => StyleLookup::Unset,
        })
    }

    /// Evaluate an assertion snippet against this sandbox's scope.
    pub fn eval_snippet(&self, snippet: &str, gas_limit: u64) -> Result<Outcome, EvalError> {
        eval::evaluate(snippet, self, gas_limit)
    }

    /// Emulate a click on the first match of `selector`, applying the
    /// bridge's anchor-interception rule.
    ///
    /// Returns `true` when the click was intercepted (exactly one navigation
    /// message is buffered), `false` when the bridge would have let the
    /// event through (external link, fragment, or no enclosing anchor).
    pub fn click(&mut self, selector: &str) -> Result<bool, SandboxError> {
        let dom = Html::parse_document(&self.document);
        let parsed = parse_selector(selector)?;
        let Some(target) = dom.select(&parsed).next() else {
            return Err(SandboxError::NoSuchElement(selector.to_string()));
        };
        let Some(anchor) = enclosing_anchor(target) else {
            return Ok(false);
        };
        let Some(href) = anchor.value().attr("href") else {
            return Ok(false);
        };
        match bridge::intercept_href(href) {
            Some(path) => {
                self.navigations.push(path);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

fn enclosing_anchor<'a>(element: ElementRef<'a>) -> Option<ElementRef<'a>> {
    if element.value().name() == "a" {
        return Some(element);
    }
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "a")
}

fn parse_selector(selector: &str) -> Result<Selector, SandboxError> {
    Selector::parse(selector)
        .map_err(|err| SandboxError::Selector(selector.to_string(), err.to_string()))
}
