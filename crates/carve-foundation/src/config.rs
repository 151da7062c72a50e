//! Generation configuration, validated once at the host boundary.
//!
//! Hosts hand configuration over as a loosely-typed JSON bag; it is
//! converted into this closed struct exactly once, so fallback defaults
//! live in a single place and the engine never re-derives them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Declaration form of the synthesized component.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum DeclarationForm {
    #[default]
    Function,
    Arrow,
}

/// How the props type is declared.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum TypeForm {
    #[default]
    Interface,
    Type,
    /// No named declaration; the member list is embedded inline as the
    /// parameter's type expression.
    Inline,
}

/// Style switches for the synthesized component.
///
/// Read-only input to one extraction run; the engine never mutates or
/// persists it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerationConfig {
    pub declaration_form: DeclarationForm,
    pub type_form: TypeForm,
    /// Destructure props in the parameter list, or take a single
    /// bundled `props` parameter and rewrite internal references.
    pub destructure_params: bool,
    /// Arrow bodies only: block with an explicit `return` instead of a
    /// parenthesized expression body.
    pub explicit_return_statement: bool,
    /// Annotate the arrow form with a `React.FC<Props>` signature.
    pub wrap_with_typed_signature: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            declaration_form: DeclarationForm::Function,
            type_form: TypeForm::Interface,
            destructure_params: true,
            explicit_return_statement: false,
            wrap_with_typed_signature: false,
        }
    }
}

impl GenerationConfig {
    /// Parse a host configuration bag, falling back to the documented
    /// defaults for unrecognized or malformed fields.
    pub fn from_value(value: &Value) -> Self {
        let defaults = Self::default();
        let Value::Object(map) = value else {
            return defaults;
        };
        Self {
            declaration_form: map
                .get("declarationForm")
                .and_then(|v| serde_json::from_value(v.clone()).ok())
                .unwrap_or(defaults.declaration_form),
            type_form: map
                .get("typeForm")
                .and_then(|v| serde_json::from_value(v.clone()).ok())
                .unwrap_or(defaults.type_form),
            destructure_params: map
                .get("destructureParams")
                .and_then(Value::as_bool)
                .unwrap_or(defaults.destructure_params),
            explicit_return_statement: map
                .get("explicitReturnStatement")
                .and_then(Value::as_bool)
                .unwrap_or(defaults.explicit_return_statement),
            wrap_with_typed_signature: map
                .get("wrapWithTypedSignature")
                .and_then(Value::as_bool)
                .unwrap_or(defaults.wrap_with_typed_signature),
        }
    }
}
