//! Sandbox bridge: instrumentation payload and message protocol.
//!
//! The payload is injected into every assembled document immediately after
//! the opening head marker. Inside the sandboxed context it overrides the
//! console channels, installs a global error handler, and intercepts clicks
//! on in-document links, forwarding everything to the host as JSON messages.
//!
//! The host side of the channel lives here too: [`SandboxMessage`] is the
//! full set of recognized message shapes, and [`parse_message`] pattern
//! matches untrusted inbound text against it. Unknown message types are
//! ignored, never an error, and nothing inbound is ever evaluated as code.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Attribute marking the injected instrumentation script. The sandbox host
/// refuses to render a document that does not carry it.
pub const INSTRUMENTATION_MARKER: &str = "data-sandbox-bridge";

/// The instrumentation script injected into every assembled document.
///
/// Non-destructive console override (the original channel is still invoked),
/// a global error handler that also fills an `#error-display` element when
/// one exists, and in-document link interception so the sandboxed page never
/// navigates away from its isolated context.
const BRIDGE_SCRIPT: &str = r##"(function () {
  var post = function (message) {
    if (window.parent && window.parent !== window) {
      window.parent.postMessage(message, "*");
    }
  };
  ["log", "error", "warn"].forEach(function (method) {
    var original = console[method];
    console[method] = function () {
      var args = Array.prototype.slice.call(arguments).map(function (arg) {
        try {
          return typeof arg === "object" ? JSON.stringify(arg) : String(arg);
        } catch (err) {
          return String(arg);
        }
      });
      post({ type: "console", method: method, args: args });
      original.apply(console, arguments);
    };
  });
  window.addEventListener("error", function (event) {
    post({ type: "console", method: "error", args: [String(event.message)] });
    var banner = document.getElementById("error-display");
    if (banner) {
      banner.textContent = "Error: " + event.message;
    }
  });
  document.addEventListener("click", function (event) {
    var anchor = event.target && event.target.closest ? event.target.closest("a") : null;
    if (!anchor) {
      return;
    }
    var href = anchor.getAttribute("href");
    if (!href || href.charAt(0) === "#") {
      return;
    }
    if (href.indexOf("//") === 0 || /^[a-zA-Z][a-zA-Z0-9+.-]*:/.test(href)) {
      return;
    }
    event.preventDefault();
    post({ type: "navigation", path: href });
  });
})();"##;

/// Inject the instrumentation payload immediately after the opening head
/// marker, or prepend it when the document has no head.
pub fn instrument(document: &str) -> String {
    let payload = format!("<script {INSTRUMENTATION_MARKER}>\n{BRIDGE_SCRIPT}\n</script>");
    match find_open_tag_end(document, "head") {
        Some(idx) => {
            let mut out = String::with_capacity(document.len() + payload.len() + 1);
            out.push_str(&document[..idx]);
            out.push('\n');
            out.push_str(&payload);
            out.push_str(&document[idx..]);
            out
        }
        None => format!("{payload}\n{document}"),
    }
}

/// Byte offset just past the end of an opening `<tag ...>` (case-insensitive),
/// if present.
pub(crate) fn find_open_tag_end(document: &str, tag: &str) -> Option<usize> {
    let lower = document.to_ascii_lowercase();
    let needle = format!("<{tag}");
    let mut search_from = 0;
    while let Some(rel) = lower[search_from..].find(&needle) {
        let start = search_from + rel;
        let after = start + needle.len();
        // Must be a real opening tag, not a prefix of another tag name.
        let boundary = lower[after..].chars().next();
        if matches!(boundary, Some('>') | Some(' ') | Some('\t') | Some('\n') | Some('\r')) {
            if let Some(close_rel) = lower[after..].find('>') {
                return Some(after + close_rel + 1);
            }
        }
        search_from = after;
    }
    None
}

/// Byte offset of a closing `</tag>` marker (case-insensitive), if present.
pub(crate) fn find_close_tag(document: &str, tag: &str) -> Option<usize> {
    let lower = document.to_ascii_lowercase();
    lower.find(&format!("</{tag}>"))
}

/// Console channels the bridge forwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleMethod {
    Log,
    Error,
    Warn,
}

impl std::fmt::Display for ConsoleMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConsoleMethod::Log => write!(f, "log"),
            ConsoleMethod::Error => write!(f, "error"),
            ConsoleMethod::Warn => write!(f, "warn"),
        }
    }
}

/// A recognized message from the sandboxed context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SandboxMessage {
    Console {
        method: ConsoleMethod,
        args: Vec<serde_json::Value>,
    },
    Navigation {
        path: String,
    },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Incoming {
    Known(SandboxMessage),
    // Any other JSON shape is ignored rather than erroring the host.
    Other(serde_json::Value),
}

/// Parse one inbound message. Unknown types and malformed payloads yield
/// `None`; the host never treats inbound text as anything but data.
pub fn parse_message(raw: &str) -> Option<SandboxMessage> {
    match serde_json::from_str::<Incoming>(raw) {
        Ok(Incoming::Known(message)) => Some(message),
        Ok(Incoming::Other(value)) => {
            debug!(?value, "ignoring unrecognized sandbox message");
            None
        }
        Err(err) => {
            warn!(%err, "discarding malformed sandbox message");
            None
        }
    }
}

/// The interception decision applied to anchor clicks inside the sandbox.
///
/// Absolute-external hrefs (scheme-prefixed or protocol-relative) and
/// same-document fragments are left alone; anything else is cancelled and
/// reported to the host as a navigation attempt with the given path.
pub fn intercept_href(href: &str) -> Option<String> {
    if href.is_empty() || href.starts_with('#') {
        return None;
    }
    if href.starts_with("//") {
        return None;
    }
    // A scheme prefix (e.g. "https:", "mailto:") marks the href external.
    let mut chars = href.chars();
    if let Some(first) = chars.next() {
        if first.is_ascii_alphabetic() {
            for ch in chars {
                match ch {
                    ':' => return None,
                    c if c.is_ascii_alphanumeric() || matches!(c, '+' | '.' | '-') => continue,
                    _ => break,
                }
            }
        }
    }
    Some(href.to_string())
}
