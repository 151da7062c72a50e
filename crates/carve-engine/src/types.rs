//! Type descriptor resolution for extracted props.
//!
//! Two estimates are computed per dependency and reconciled: a
//! declared estimate (written annotation or initializer shape) and a
//! structural estimate derived from destructuring shape. Either can be
//! unusable; the reconciliation prefers the shorter usable string and
//! bottoms out at `any`.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::analyze::Dependency;
use crate::semantic::{Binding, DestructureInfo, PatternContainer};

/// Ceiling on synthesized type text; anything longer degrades to
/// `any` so declarations stay readable.
pub const MAX_TYPE_LENGTH: usize = 500;

/// The elision marker a type formatter inserts into deeply-structured
/// types; its presence means the text is lossy.
static TRUNCATION_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.\.\. \d+ more \.\.\.").expect("valid regex"));

const OPEN_INDEX_SIGNATURE: &str = "{ [key: string]: any }";

/// Outcome of one estimation strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeEstimate {
    Resolved(String),
    Unusable,
}

impl TypeEstimate {
    fn from_text(text: &str) -> TypeEstimate {
        let text = text.trim();
        if text.is_empty()
            || text == "any"
            || text.len() > MAX_TYPE_LENGTH
            || TRUNCATION_MARKER.is_match(text)
        {
            TypeEstimate::Unusable
        } else {
            TypeEstimate::Resolved(text.to_string())
        }
    }

    pub fn usable(&self) -> Option<&str> {
        match self {
            TypeEstimate::Resolved(text) => Some(text),
            TypeEstimate::Unusable => None,
        }
    }
}

/// Estimate from what the declaration wrote down: the annotation on
/// the binding itself, else the shape of its initializer.
pub fn declared_estimate(binding: &Binding) -> TypeEstimate {
    binding
        .annotation
        .as_deref()
        .or(binding.inferred.as_deref())
        .map(TypeEstimate::from_text)
        .unwrap_or(TypeEstimate::Unusable)
}

/// Estimate from destructuring shape: element types are derived from
/// the annotated type of the parent pattern.
pub fn structural_estimate(dep: &Dependency) -> TypeEstimate {
    let Some(info) = &dep.binding.destructure else {
        return TypeEstimate::Unusable;
    };
    let parent = info
        .parent_type
        .as_deref()
        .map(TypeEstimate::from_text)
        .unwrap_or(TypeEstimate::Unusable);
    let Some(parent) = parent.usable() else {
        // Rest and spread elements still denote "the remaining keys",
        // so an open index signature is an honest fallback for them.
        return if info.is_rest || dep.is_spread {
            TypeEstimate::from_text(OPEN_INDEX_SIGNATURE)
        } else {
            TypeEstimate::Unusable
        };
    };
    let text = match info.container {
        PatternContainer::Array => {
            if info.is_rest {
                parent.to_string()
            } else {
                array_element_type(parent)
            }
        }
        PatternContainer::Object => {
            if info.is_rest {
                omit_type(parent, info)
            } else {
                match &info.key {
                    Some(key) => format!("{parent}['{key}']"),
                    None => return TypeEstimate::Unusable,
                }
            }
        }
    };
    TypeEstimate::from_text(&text)
}

/// `T[]` and `Array<T>` unwrap to `T`; anything else falls back to an
/// indexed-access form.
fn array_element_type(parent: &str) -> String {
    if let Some(inner) = parent.strip_suffix("[]") {
        return inner.to_string();
    }
    if let Some(inner) = parent
        .strip_prefix("Array<")
        .and_then(|rest| rest.strip_suffix('>'))
    {
        return inner.to_string();
    }
    format!("{parent}[number]")
}

/// A rest element's type excludes exactly the keys destructured out
/// alongside it.
fn omit_type(parent: &str, info: &DestructureInfo) -> String {
    if info.sibling_keys.is_empty() {
        return parent.to_string();
    }
    let keys = info
        .sibling_keys
        .iter()
        .map(|key| format!("'{key}'"))
        .collect::<Vec<_>>()
        .join(" | ");
    format!("Omit<{parent}, {keys}>")
}

/// Reconcile the two estimates: one usable wins outright, two usable
/// prefer the shorter text, none degrades to `any`.
pub fn choose_adequate_type(declared: TypeEstimate, structural: TypeEstimate) -> String {
    match (declared.usable(), structural.usable()) {
        (Some(d), Some(s)) => {
            if s.len() < d.len() {
                s.to_string()
            } else {
                d.to_string()
            }
        }
        (Some(d), None) => d.to_string(),
        (None, Some(s)) => s.to_string(),
        (None, None) => "any".to_string(),
    }
}

/// The type descriptor of one dependency.
pub fn resolve_type(dep: &Dependency) -> String {
    choose_adequate_type(declared_estimate(&dep.binding), structural_estimate(dep))
}
