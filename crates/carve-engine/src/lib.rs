//! JSX/TSX component extraction engine.
//!
//! Source-to-source refactoring: given a selection of markup inside a
//! React component, synthesize a standalone component from it,
//! thread the selection's free variables through as typed props, and
//! replace the selection with an invocation. The engine is pure text
//! in, edits out; everything editor-shaped lives behind the
//! `carve-host-api` traits.
//!
//! The pipeline is: parse ([`parse`]), validate the selection
//! ([`selection`]), resolve its free variables against lexical scopes
//! ([`semantic`], [`analyze`]), resolve prop types ([`types`]), and
//! render the extracted unit ([`synthesize`]).

pub mod analyze;
pub mod parse;
pub mod selection;
pub mod semantic;
pub mod synthesize;
pub mod types;

pub use carve_foundation::{
    DeclarationForm, EditType, ExtractError, ExtractResult, ExtractedProperty, ExtractionPlan,
    GenerationConfig, SourceRange, TextEdit, TypeForm,
};

use carve_host_api::{ApiResult, EditorDocument, EditorHost};
use tracing::debug;

use crate::parse::ParsedFile;
use crate::synthesize::sanitize_component_name;

/// Configuration namespace the engine reads its generation settings
/// from.
pub const CONFIG_NAMESPACE: &str = "carve";

/// Default name offered by the component-name prompt.
pub const DEFAULT_COMPONENT_NAME: &str = "Component";

/// Whether a selection can be extracted as a component: it must
/// resolve to at least one complete JSX element or fragment. Parse
/// failures make the selection invalid rather than erroring; this is
/// the cheap predicate hosts poll while the user moves the cursor.
pub fn is_valid_selection(source: &str, file_name: &str, selection: &SourceRange) -> bool {
    match ParsedFile::parse(source, file_name) {
        Ok(pf) => selection::analyze_selection(&pf, selection).is_extractable(),
        Err(_) => false,
    }
}

/// Run the whole pipeline over plain text and produce an extraction
/// plan. `Err(InvalidSelection)` when the selection does not resolve
/// to markup, `Err(Parse)` when the file does not parse.
pub fn plan_extract_component(
    source: &str,
    file_name: &str,
    selection: &SourceRange,
    component_name: &str,
    config: &GenerationConfig,
) -> ExtractResult<ExtractionPlan> {
    let pf = ParsedFile::parse(source, file_name)?;
    let info = selection::analyze_selection(&pf, selection);
    if !info.is_extractable() {
        return Err(ExtractError::InvalidSelection);
    }
    debug!(
        markup = info.topmost_markup,
        children = info.topmost_children,
        "selection validated"
    );
    let analysis = analyze::analyze_dependencies(&pf, selection);
    Ok(synthesize::synthesize_plan(
        &pf,
        selection,
        component_name,
        config,
        &analysis,
        info.needs_grouping_wrapper(),
    ))
}

/// The interactive entry point: validate, prompt for a name, plan,
/// and hand the edits to the host. `Ok(None)` means the request was a
/// no-op: the selection was not extractable, or the user cancelled or
/// cleared the name prompt.
pub async fn extract_component(
    host: &dyn EditorHost,
    document: &dyn EditorDocument,
    selection: SourceRange,
) -> ApiResult<Option<ExtractionPlan>> {
    let pf = ParsedFile::parse(document.text(), document.file_name())
        .map_err(carve_host_api::HostApiError::from)?;
    let info = selection::analyze_selection(&pf, &selection);
    if !info.is_extractable() {
        debug!("selection is not extractable, ignoring request");
        return Ok(None);
    }

    let Some(raw_name) = host.prompt_for_name(DEFAULT_COMPONENT_NAME).await? else {
        return Ok(None);
    };
    let Some(name) = sanitize_component_name(&raw_name) else {
        return Ok(None);
    };

    let config = GenerationConfig::from_value(&host.read_configuration(CONFIG_NAMESPACE));
    let analysis = analyze::analyze_dependencies(&pf, &selection);
    let plan = synthesize::synthesize_plan(
        &pf,
        &selection,
        &name,
        &config,
        &analysis,
        info.needs_grouping_wrapper(),
    );

    let edits = plan.clone().into_edits(selection, pf.end_of_document());
    if !host.apply_edits(&edits).await? {
        return Err(carve_host_api::HostApiError::edit_rejected(
            "host declined the extraction edits",
        ));
    }
    Ok(Some(plan))
}
