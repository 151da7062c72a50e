//! Edit-plan types handed from the engine to the host editor.

use crate::range::SourceRange;
use serde::{Deserialize, Serialize};

/// Kind of a single text edit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EditType {
    Insert,
    Replace,
}

/// One text edit the host is expected to apply.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TextEdit {
    pub edit_type: EditType,
    /// Where the edit applies; empty for insertions.
    pub location: SourceRange,
    pub new_text: String,
    /// Higher-priority edits apply first.
    pub priority: u32,
    pub description: String,
}

/// One discovered dependency of the selection, destined to become a
/// prop of the extracted component.
///
/// Uniqueness is keyed by `name`: discovering the same name twice
/// collapses to a single entry, since the synthesized parameter list
/// must not declare the same binding twice.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedProperty {
    pub name: String,
    /// Formatted type string; `"any"` when nothing better is known.
    pub type_descriptor: String,
    /// Captured via a JSX spread attribute rather than a named binding.
    pub is_spread: bool,
}

/// The two pieces of text produced by one extraction run.
///
/// The plan's lifecycle ends once converted to edits and handed to the
/// host; the engine holds no further state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionPlan {
    /// The new component (and its type declaration, when emitted),
    /// inserted at the end of the document.
    pub insertion_text: String,
    /// The invocation that replaces the original selection.
    pub replacement_text: String,
}

impl ExtractionPlan {
    /// Convert the plan into concrete edits: an insertion at the end of
    /// the document and a replacement of the original selection.
    pub fn into_edits(self, selection: SourceRange, end_of_document: SourceRange) -> Vec<TextEdit> {
        vec![
            TextEdit {
                edit_type: EditType::Insert,
                location: end_of_document,
                new_text: self.insertion_text,
                priority: 100,
                description: "Insert extracted component".to_string(),
            },
            TextEdit {
                edit_type: EditType::Replace,
                location: selection,
                new_text: self.replacement_text,
                priority: 90,
                description: "Replace selection with component invocation".to_string(),
            },
        ]
    }
}
