//! Synthesis of the extracted unit and its invocation.
//!
//! Renders the props type declaration, the component in the configured
//! declaration form, and the single-line invocation that replaces the
//! selection. When props arrive bundled instead of destructured, every
//! dependency reference inside the moved body is rewritten to go
//! through the bundle.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use carve_foundation::{
    DeclarationForm, ExtractedProperty, ExtractionPlan, GenerationConfig, SourceRange, TypeForm,
};

use crate::analyze::{Analysis, UseForm};
use crate::parse::ParsedFile;
use crate::types::resolve_type;

static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\W").expect("valid regex"));

/// Normalize a user-entered component name: strip non-word characters
/// and capitalize the first letter. An empty result means there is
/// nothing usable to name the component with.
pub fn sanitize_component_name(raw: &str) -> Option<String> {
    let cleaned = NON_WORD.replace_all(raw, "");
    let mut chars = cleaned.chars();
    let first = chars.next()?;
    Some(first.to_uppercase().chain(chars).collect())
}

/// Build the full extraction plan for a validated selection.
pub fn synthesize_plan(
    pf: &ParsedFile,
    selection: &SourceRange,
    name: &str,
    config: &GenerationConfig,
    analysis: &Analysis,
    needs_wrapper: bool,
) -> ExtractionPlan {
    let mut props: Vec<ExtractedProperty> = analysis
        .dependencies
        .iter()
        .map(|dep| ExtractedProperty {
            name: dep.binding.name.clone(),
            type_descriptor: resolve_type(dep),
            is_spread: dep.is_spread,
        })
        .collect();
    // Named props sort lexicographically; spreads go last so the rest
    // element lands where the grammar requires it.
    props.sort_by(|a, b| a.is_spread.cmp(&b.is_spread).then(a.name.cmp(&b.name)));

    debug!(component = name, props = props.len(), "synthesizing extracted unit");

    let bundled = !config.destructure_params && !props.is_empty();
    let body = moved_body(pf, selection, analysis, bundled);
    ExtractionPlan {
        insertion_text: render_unit(name, &props, config, pf.is_typescript, &body, needs_wrapper),
        replacement_text: render_invocation(name, &props),
    }
}

/// The selection text, with dependency references rewritten through
/// the `props` bundle when parameters are not destructured.
fn moved_body(
    pf: &ParsedFile,
    selection: &SourceRange,
    analysis: &Analysis,
    bundled: bool,
) -> String {
    let (sel_start, sel_end) = pf.range_offsets(selection);
    let source = pf.source();
    if !bundled {
        return source[sel_start..sel_end].to_string();
    }
    let mut out = String::new();
    let mut cursor = sel_start;
    for site in &analysis.uses {
        if site.start < cursor || site.end > sel_end {
            continue;
        }
        out.push_str(&source[cursor..site.start]);
        match site.form {
            UseForm::Plain => {
                out.push_str("props.");
                out.push_str(&site.name);
            }
            UseForm::Shorthand => {
                out.push_str(&site.name);
                out.push_str(": props.");
                out.push_str(&site.name);
            }
            // `{...rest}` becomes `{...props}`.
            UseForm::JsxSpread => out.push_str("props"),
        }
        cursor = site.end;
    }
    out.push_str(&source[cursor..sel_end]);
    out
}

struct PropsType {
    /// Standalone declaration emitted before the unit, if any.
    declaration: Option<String>,
    /// Text to annotate the parameter with.
    reference: String,
}

fn render_props_type(name: &str, props: &[ExtractedProperty], form: TypeForm) -> PropsType {
    let members: Vec<String> = props
        .iter()
        .filter(|p| !p.is_spread)
        .map(|p| format!("  {}: {};", p.name, p.type_descriptor))
        .collect();
    let spread_types: Vec<&str> = props
        .iter()
        .filter(|p| p.is_spread)
        .map(|p| p.type_descriptor.as_str())
        .collect();

    match form {
        TypeForm::Interface => {
            let extends = if spread_types.is_empty() {
                String::new()
            } else {
                format!(" extends {}", spread_types.join(", "))
            };
            let body = if members.is_empty() {
                "{}".to_string()
            } else {
                format!("{{\n{}\n}}", members.join("\n"))
            };
            PropsType {
                declaration: Some(format!("interface {name}Props{extends} {body}")),
                reference: format!("{name}Props"),
            }
        }
        TypeForm::Type => {
            let mut parts = spread_types
                .iter()
                .map(|t| t.to_string())
                .collect::<Vec<_>>();
            if !members.is_empty() {
                parts.push(format!("{{\n{}\n}}", members.join("\n")));
            }
            let rhs = if parts.is_empty() {
                "{}".to_string()
            } else {
                parts.join(" & ")
            };
            PropsType {
                declaration: Some(format!("type {name}Props = {rhs};")),
                reference: format!("{name}Props"),
            }
        }
        TypeForm::Inline => {
            let mut parts = spread_types
                .iter()
                .map(|t| t.to_string())
                .collect::<Vec<_>>();
            if !members.is_empty() {
                let inline = props
                    .iter()
                    .filter(|p| !p.is_spread)
                    .map(|p| format!("{}: {}", p.name, p.type_descriptor))
                    .collect::<Vec<_>>()
                    .join("; ");
                parts.push(format!("{{ {inline} }}"));
            }
            let reference = if parts.is_empty() {
                "{}".to_string()
            } else {
                parts.join(" & ")
            };
            PropsType {
                declaration: None,
                reference,
            }
        }
    }
}

fn render_params(
    props: &[ExtractedProperty],
    config: &GenerationConfig,
    annotation: Option<&str>,
) -> String {
    if props.is_empty() {
        return "()".to_string();
    }
    let pattern = if config.destructure_params {
        let mut parts: Vec<String> = props
            .iter()
            .map(|p| {
                if p.is_spread {
                    format!("...{}", p.name)
                } else {
                    p.name.clone()
                }
            })
            .collect();
        parts.sort_by_key(|part| part.starts_with("..."));
        format!("{{ {} }}", parts.join(", "))
    } else if props.iter().any(|p| p.is_spread) {
        // Spread props keep their spread shape only if the bundle is
        // itself assembled from a rest pattern.
        "{ ...props }".to_string()
    } else {
        "props".to_string()
    };
    match annotation {
        Some(ann) => format!("({pattern}: {ann})"),
        None => format!("({pattern})"),
    }
}

fn render_unit(
    name: &str,
    props: &[ExtractedProperty],
    config: &GenerationConfig,
    is_typescript: bool,
    raw_body: &str,
    needs_wrapper: bool,
) -> String {
    let typed = is_typescript && !props.is_empty();
    let props_type = typed.then(|| render_props_type(name, props, config.type_form));

    // React.FC moves the annotation onto the binding; only an arrow
    // can carry it.
    let as_fc = config.wrap_with_typed_signature
        && config.declaration_form == DeclarationForm::Arrow
        && typed;

    let annotation = match &props_type {
        Some(pt) if !as_fc => Some(pt.reference.as_str()),
        _ => None,
    };
    let params = render_params(props, config, annotation);

    let unit = match config.declaration_form {
        DeclarationForm::Function => {
            let body = indent_body(raw_body, needs_wrapper, "    ");
            format!("function {name}{params} {{\n  return (\n{body}\n  );\n}}")
        }
        DeclarationForm::Arrow => {
            let lhs = if as_fc {
                let reference = &props_type.as_ref().expect("typed implies props type").reference;
                format!("const {name}: React.FC<{reference}> = ")
            } else {
                format!("const {name} = ")
            };
            if config.explicit_return_statement {
                let body = indent_body(raw_body, needs_wrapper, "    ");
                format!("{lhs}{params} => {{\n  return (\n{body}\n  );\n}};")
            } else {
                let body = indent_body(raw_body, needs_wrapper, "  ");
                format!("{lhs}{params} => (\n{body}\n);")
            }
        }
    };

    let mut insertion = String::from("\n\n");
    if let Some(declaration) = props_type.as_ref().and_then(|pt| pt.declaration.as_deref()) {
        insertion.push_str(declaration);
        insertion.push_str("\n\n");
    }
    insertion.push_str(&unit);
    insertion.push('\n');
    insertion
}

/// Re-indent the moved markup: flatten it to its own relative
/// indentation, wrap sibling nodes in a fragment when needed, then
/// indent every line to the unit body's depth.
fn indent_body(raw: &str, needs_wrapper: bool, base: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut iter = raw.lines();
    if let Some(first) = iter.next() {
        lines.push(first.trim_start().to_string());
    }
    let rest: Vec<&str> = iter.collect();
    let min_indent = rest
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);
    for line in rest {
        if line.trim().is_empty() {
            lines.push(String::new());
        } else {
            lines.push(line[min_indent..].to_string());
        }
    }

    if needs_wrapper {
        let mut wrapped = Vec::with_capacity(lines.len() + 2);
        wrapped.push("<>".to_string());
        for line in lines {
            if line.is_empty() {
                wrapped.push(line);
            } else {
                wrapped.push(format!("  {line}"));
            }
        }
        wrapped.push("</>".to_string());
        lines = wrapped;
    }

    lines
        .iter()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{base}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_invocation(name: &str, props: &[ExtractedProperty]) -> String {
    if props.is_empty() {
        return format!("<{name} />");
    }
    let attrs = props
        .iter()
        .map(|p| {
            if p.is_spread {
                format!("{{...{}}}", p.name)
            } else {
                format!("{}={{{}}}", p.name, p.name)
            }
        })
        .collect::<Vec<_>>()
        .join(" ");
    format!("<{name} {attrs} />")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::analyze_dependencies;
    use crate::selection::analyze_selection;
    use pretty_assertions::assert_eq;

    fn plan_with(source: &str, selected: &str, config: &GenerationConfig) -> ExtractionPlan {
        let file_name = if source.contains(": ") || source.contains("interface ") {
            "test.tsx"
        } else {
            "test.jsx"
        };
        let pf = ParsedFile::parse(source, file_name).expect("fixture should parse");
        let start = pf.source().find(selected).expect("selection text in fixture");
        let (start_line, start_col) = pf.position_of(start);
        let (end_line, end_col) = pf.position_of(start + selected.len());
        let selection = SourceRange::new(start_line, start_col, end_line, end_col);
        let info = analyze_selection(&pf, &selection);
        assert!(info.is_extractable(), "fixture selection must be markup");
        let analysis = analyze_dependencies(&pf, &selection);
        synthesize_plan(
            &pf,
            &selection,
            "Extracted",
            config,
            &analysis,
            info.needs_grouping_wrapper(),
        )
    }

    const TWO_PROPS: &str = "\
function Component() {
  const anotherClass: string = 'my-class';
  const baseClass: string = 'my-class-2';

  return (
    <div className={baseClass}>
      <div className={anotherClass}>Test</div>
    </div>
  );
}
";
    const TWO_PROPS_SELECTION: &str =
        "<div className={baseClass}>\n      <div className={anotherClass}>Test</div>\n    </div>";

    #[test]
    fn function_form_with_interface() {
        let plan = plan_with(TWO_PROPS, TWO_PROPS_SELECTION, &GenerationConfig::default());
        assert_eq!(
            plan.insertion_text,
            "\n\ninterface ExtractedProps {\n  anotherClass: string;\n  baseClass: string;\n}\n\n\
             function Extracted({ anotherClass, baseClass }: ExtractedProps) {\n  return (\n    \
             <div className={baseClass}>\n      <div className={anotherClass}>Test</div>\n    </div>\n  );\n}\n"
        );
        assert_eq!(
            plan.replacement_text,
            "<Extracted anotherClass={anotherClass} baseClass={baseClass} />"
        );
    }

    #[test]
    fn type_form_arrow_without_explicit_return() {
        let config = GenerationConfig {
            declaration_form: DeclarationForm::Arrow,
            type_form: TypeForm::Type,
            ..GenerationConfig::default()
        };
        let plan = plan_with(TWO_PROPS, TWO_PROPS_SELECTION, &config);
        assert_eq!(
            plan.insertion_text,
            "\n\ntype ExtractedProps = {\n  anotherClass: string;\n  baseClass: string;\n};\n\n\
             const Extracted = ({ anotherClass, baseClass }: ExtractedProps) => (\n  \
             <div className={baseClass}>\n    <div className={anotherClass}>Test</div>\n  </div>\n);\n"
        );
    }

    #[test]
    fn arrow_with_explicit_return_statement() {
        let config = GenerationConfig {
            declaration_form: DeclarationForm::Arrow,
            explicit_return_statement: true,
            ..GenerationConfig::default()
        };
        let plan = plan_with(TWO_PROPS, TWO_PROPS_SELECTION, &config);
        assert!(plan
            .insertion_text
            .contains("const Extracted = ({ anotherClass, baseClass }: ExtractedProps) => {\n  return (\n"));
        assert!(plan.insertion_text.ends_with("  );\n};\n"));
    }

    #[test]
    fn react_fc_signature_moves_the_annotation() {
        let config = GenerationConfig {
            declaration_form: DeclarationForm::Arrow,
            wrap_with_typed_signature: true,
            ..GenerationConfig::default()
        };
        let plan = plan_with(TWO_PROPS, TWO_PROPS_SELECTION, &config);
        assert!(plan
            .insertion_text
            .contains("const Extracted: React.FC<ExtractedProps> = ({ anotherClass, baseClass }) => (\n"));
    }

    #[test]
    fn spread_dependency_extends_the_interface() {
        let source = "\
function Component({ a, ...rest }: Props) {
  return <section title={a} {...rest} />;
}
";
        let plan = plan_with(
            source,
            "<section title={a} {...rest} />",
            &GenerationConfig::default(),
        );
        assert_eq!(
            plan.insertion_text,
            "\n\ninterface ExtractedProps extends Omit<Props, 'a'> {\n  a: Props['a'];\n}\n\n\
             function Extracted({ a, ...rest }: ExtractedProps) {\n  return (\n    \
             <section title={a} {...rest} />\n  );\n}\n"
        );
        assert_eq!(plan.replacement_text, "<Extracted a={a} {...rest} />");
    }

    #[test]
    fn bundled_params_rewrite_references() {
        let config = GenerationConfig {
            destructure_params: false,
            ..GenerationConfig::default()
        };
        let source = "\
function Component() {
  const size: number = 12;
  const label: string = 'x';
  return <Chip width={size} model={{ label }} />;
}
";
        let plan = plan_with(source, "<Chip width={size} model={{ label }} />", &config);
        assert!(plan
            .insertion_text
            .contains("function Extracted(props: ExtractedProps) {"));
        assert!(plan
            .insertion_text
            .contains("<Chip width={props.size} model={{ label: props.label }} />"));
        assert_eq!(
            plan.replacement_text,
            "<Extracted label={label} size={size} />"
        );
    }

    #[test]
    fn bundled_params_with_spread_use_a_rest_pattern() {
        let config = GenerationConfig {
            destructure_params: false,
            ..GenerationConfig::default()
        };
        let source = "\
function Component({ a, ...rest }: Props) {
  return <section title={a} {...rest} />;
}
";
        let plan = plan_with(source, "<section title={a} {...rest} />", &config);
        assert!(plan
            .insertion_text
            .contains("function Extracted({ ...props }: ExtractedProps) {"));
        assert!(plan
            .insertion_text
            .contains("<section title={props.a} {...props} />"));
        assert_eq!(plan.replacement_text, "<Extracted a={a} {...rest} />");
    }

    #[test]
    fn sibling_markup_is_wrapped_in_a_fragment() {
        let source = "\
function Component() {
  return (
    <ul>
      <li>a</li>
      <li>b</li>
    </ul>
  );
}
";
        let plan = plan_with(
            source,
            "<li>a</li>\n      <li>b</li>",
            &GenerationConfig::default(),
        );
        assert!(plan
            .insertion_text
            .contains("  return (\n    <>\n      <li>a</li>\n      <li>b</li>\n    </>\n  );"));
        assert_eq!(plan.replacement_text, "<Extracted />");
    }

    #[test]
    fn inline_type_form_annotates_the_parameter_directly() {
        let config = GenerationConfig {
            type_form: TypeForm::Inline,
            ..GenerationConfig::default()
        };
        let plan = plan_with(TWO_PROPS, TWO_PROPS_SELECTION, &config);
        assert!(!plan.insertion_text.contains("interface"));
        assert!(plan.insertion_text.contains(
            "function Extracted({ anotherClass, baseClass }: { anotherClass: string; baseClass: string }) {"
        ));
    }

    #[test]
    fn javascript_files_get_no_type_annotations() {
        let source = "\
function Component() {
  const label = compute();
  return <div title={label}>hi</div>;
}
";
        let plan = plan_with(source, "<div title={label}>hi</div>", &GenerationConfig::default());
        assert!(!plan.insertion_text.contains("interface"));
        assert!(plan
            .insertion_text
            .contains("function Extracted({ label }) {"));
    }

    #[test]
    fn no_dependencies_means_no_params_and_no_type() {
        let source = "\
function Component() {
  return <div className=\"static\">Test</div>;
}
";
        let plan = plan_with(
            source,
            "<div className=\"static\">Test</div>",
            &GenerationConfig::default(),
        );
        assert!(!plan.insertion_text.contains("interface"));
        assert!(plan.insertion_text.contains("function Extracted() {"));
        assert_eq!(plan.replacement_text, "<Extracted />");
    }

    #[test]
    fn component_names_are_sanitized() {
        assert_eq!(sanitize_component_name("my widget!"), Some("Mywidget".to_string()));
        assert_eq!(sanitize_component_name("extracted"), Some("Extracted".to_string()));
        assert_eq!(sanitize_component_name("Card"), Some("Card".to_string()));
        assert_eq!(sanitize_component_name("---"), None);
        assert_eq!(sanitize_component_name(""), None);
    }
}
