//! # Project Assembler
//!
//! Merges a learner's source files into one self-contained renderable
//! document under a chosen [`CompositionMode`], then injects the sandbox
//! bridge payload (see [`bridge`]).
//!
//! Assembly is a pure function of its inputs: the same source and mode
//! always yield byte-identical output, so a single render can be trusted to
//! represent exactly the document the learner is editing. Style and script
//! files are merged in sorted path order, which keeps later files able to
//! override earlier ones deterministically.

pub mod bridge;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use vfs::{FileLanguage, Vfs, is_component_script};

/// Fixed root path where the multi-file modes look for the markup entry.
pub const ROOT_MARKUP_PATH: &str = "/index.html";

/// Minimal shell used when the expected markup file is missing, so a single
/// missing file degrades the preview instead of blocking the whole run.
const FALLBACK_MARKUP: &str =
    "<!DOCTYPE html>\n<html>\n<head></head>\n<body><div id=\"root\"></div></body>\n</html>";

/// Bootstrap tags prepended in component-runtime mode: the component
/// runtime, its DOM renderer, and the in-browser transformer.
const RUNTIME_BOOTSTRAP: &str = concat!(
    "<script src=\"https://unpkg.com/react@18/umd/react.development.js\"></script>\n",
    "<script src=\"https://unpkg.com/react-dom@18/umd/react-dom.development.js\"></script>\n",
    "<script src=\"https://unpkg.com/@babel/standalone/babel.min.js\"></script>"
);

/// How source files are located and merged into one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompositionMode {
    /// The markup source is already a complete document; used verbatim.
    PlainMarkup,
    /// Markup at the fixed root path; every style and plain script file in
    /// the project is merged in.
    MultiFileMerge,
    /// Multi-file merge plus runtime bootstrap tags, with all script content
    /// wrapped in a single deferred, try/caught execution block.
    ComponentRuntimeMerge,
}

/// A flat `{html, css, js}` submission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceTriple {
    pub html: String,
    pub css: String,
    pub js: String,
}

impl SourceTriple {
    pub fn new(
        html: impl Into<String>,
        css: impl Into<String>,
        js: impl Into<String>,
    ) -> Self {
        Self {
            html: html.into(),
            css: css.into(),
            js: js.into(),
        }
    }
}

/// Either input shape accepted by the assembler and the grading engine.
#[derive(Debug, Clone, PartialEq)]
pub enum ProjectSource {
    Triple(SourceTriple),
    Snapshot(Vfs),
}

impl From<SourceTriple> for ProjectSource {
    fn from(triple: SourceTriple) -> Self {
        ProjectSource::Triple(triple)
    }
}

impl From<Vfs> for ProjectSource {
    fn from(vfs: Vfs) -> Self {
        ProjectSource::Snapshot(vfs)
    }
}

/// Assemble one self-contained, instrumented document.
pub fn assemble(source: &ProjectSource, mode: CompositionMode) -> String {
    let merged = match mode {
        CompositionMode::PlainMarkup => markup_of(source),
        CompositionMode::MultiFileMerge => merge(source, false),
        CompositionMode::ComponentRuntimeMerge => merge(source, true),
    };
    bridge::instrument(&merged)
}

fn markup_of(source: &ProjectSource) -> String {
    match source {
        ProjectSource::Triple(triple) => triple.html.clone(),
        ProjectSource::Snapshot(vfs) => match vfs.get(ROOT_MARKUP_PATH) {
            Some(file) => file.content.clone(),
            None => {
                warn!(path = ROOT_MARKUP_PATH, "markup entry missing, using fallback shell");
                FALLBACK_MARKUP.to_string()
            }
        },
    }
}

fn merge(source: &ProjectSource, component_runtime: bool) -> String {
    let markup = markup_of(source);
    let (styles, scripts) = collect_sources(source, component_runtime);
    debug!(
        styles = styles.len(),
        scripts = scripts.len(),
        component_runtime,
        "merging project sources"
    );

    let mut document = inject_styles(&markup, &styles);
    if component_runtime {
        document = inject_runtime_bootstrap(&document);
    }
    inject_scripts(&document, &scripts, component_runtime)
}

/// Style and script contents in merge order (sorted path order for a
/// snapshot). Component scripts are excluded from the plain merge and
/// included only when the runtime is present to execute them.
fn collect_sources(source: &ProjectSource, component_runtime: bool) -> (Vec<String>, Vec<String>) {
    match source {
        ProjectSource::Triple(triple) => {
            let styles = if triple.css.is_empty() {
                Vec::new()
            } else {
                vec![triple.css.clone()]
            };
            let scripts = if triple.js.is_empty() {
                Vec::new()
            } else {
                vec![triple.js.clone()]
            };
            (styles, scripts)
        }
        ProjectSource::Snapshot(vfs) => {
            let styles = vfs
                .files_with_language(FileLanguage::Style)
                .map(|(_, file)| file.content.clone())
                .collect();
            let scripts = vfs
                .files_with_language(FileLanguage::Script)
                .filter(|(_, file)| component_runtime || !is_component_script(&file.name))
                .map(|(_, file)| file.content.clone())
                .collect();
            (styles, scripts)
        }
    }
}

fn inject_styles(markup: &str, styles: &[String]) -> String {
    if styles.is_empty() {
        return markup.to_string();
    }
    let block = styles
        .iter()
        .map(|css| format!("<style>\n{css}\n</style>"))
        .collect::<Vec<_>>()
        .join("\n");
    match bridge::find_close_tag(markup, "head") {
        Some(idx) => format!("{}{block}\n{}", &markup[..idx], &markup[idx..]),
        None => format!("{block}\n{markup}"),
    }
}

fn inject_scripts(markup: &str, scripts: &[String], component_runtime: bool) -> String {
    if scripts.is_empty() {
        return markup.to_string();
    }
    let block = if component_runtime {
        // One deferred block: a thrown error in user code surfaces through
        // the bridge's console override instead of aborting document parsing.
        format!(
            "<script type=\"text/babel\" data-presets=\"react\">\n\
             document.addEventListener('DOMContentLoaded', function () {{\n\
             try {{\n{}\n}} catch (err) {{\n\
             console.error(err && err.message ? err.message : String(err));\n\
             }}\n}});\n</script>",
            scripts.join("\n")
        )
    } else {
        scripts
            .iter()
            .map(|js| format!("<script>\n{js}\n</script>"))
            .collect::<Vec<_>>()
            .join("\n")
    };
    match bridge::find_close_tag(markup, "body") {
        Some(idx) => format!("{}{block}\n{}", &markup[..idx], &markup[idx..]),
        None => format!("{markup}\n{block}"),
    }
}

fn inject_runtime_bootstrap(markup: &str) -> String {
    match bridge::find_open_tag_end(markup, "head") {
        Some(idx) => format!(
            "{}\n{RUNTIME_BOOTSTRAP}{}",
            &markup[..idx],
            &markup[idx..]
        ),
        None => format!("{RUNTIME_BOOTSTRAP}\n{markup}"),
    }
}
