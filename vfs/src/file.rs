//! File entries and language classification.

use serde::{Deserialize, Serialize};

/// The language of a stored file, inferred from its extension.
///
/// Drives how the assembler treats the file: markup becomes the document
/// body, styles are concatenated into `<style>` blocks, and scripts are
/// appended as `<script>` blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileLanguage {
    Markup,
    Style,
    Script,
    Plaintext,
}

impl FileLanguage {
    /// Classify a file name by extension. Unknown extensions are plaintext.
    pub fn from_name(name: &str) -> Self {
        let lower = name.to_ascii_lowercase();
        if lower.ends_with(".html") || lower.ends_with(".htm") {
            FileLanguage::Markup
        } else if lower.ends_with(".css") {
            FileLanguage::Style
        } else if lower.ends_with(".js") || lower.ends_with(".jsx") {
            FileLanguage::Script
        } else {
            FileLanguage::Plaintext
        }
    }
}

/// Whether a script file needs a component runtime to execute.
///
/// These are excluded from the plain multi-file merge and only picked up by
/// the component-runtime composition mode.
pub fn is_component_script(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(".jsx")
}

/// A single named text file.
///
/// Owned exclusively by the store entry that indexes it by absolute path.
/// Content is only ever replaced wholesale; there are no partial patches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VirtualFile {
    pub name: String,
    pub language: FileLanguage,
    pub content: String,
}

impl VirtualFile {
    /// Create a file, inferring its language from the name.
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        let name = name.into();
        let language = FileLanguage::from_name(&name);
        Self {
            name,
            language,
            content: content.into(),
        }
    }
}
