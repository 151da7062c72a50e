//! Lexical scope model: declaration sites and their kinds.
//!
//! The dependency analyzer resolves every identifier use against a
//! stack of these scopes instead of querying a type checker. Only a
//! closed set of declaration kinds may become props; the rest (class
//! members, for-loop counters, catch parameters, imports) are excluded
//! by construction so behavior stays predictable.

use carve_foundation::SourceRange;
use std::collections::HashMap;
use swc_common::{Span, Spanned};
use swc_ecma_ast::*;

use crate::parse::ParsedFile;

/// Kind tag of a declaration site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    /// Plain `var`/`let`/`const` declarator.
    Var,
    /// Function declaration.
    Func,
    /// Function or arrow parameter bound as a plain identifier.
    Param,
    /// Element of a destructuring pattern (parameter or variable).
    DestructureElement,
    /// Imported name; available to the extracted unit unchanged.
    Import,
    /// Catch-clause parameter.
    CatchParam,
    /// Binding introduced by a `for`/`for-in`/`for-of` head.
    ForInit,
    /// Class declaration.
    Class,
}

impl DeclKind {
    /// Whether a binding of this kind is meaningful as a prop.
    pub fn passable(self) -> bool {
        matches!(
            self,
            DeclKind::Var | DeclKind::Func | DeclKind::Param | DeclKind::DestructureElement
        )
    }
}

/// Pattern container of a destructuring element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternContainer {
    Object,
    Array,
}

/// Shape information for a binding introduced by destructuring,
/// the raw material of the structural type heuristic.
#[derive(Debug, Clone)]
pub struct DestructureInfo {
    pub container: PatternContainer,
    /// Written annotation of the immediate parent pattern, if any.
    pub parent_type: Option<String>,
    /// Property key within an object pattern.
    pub key: Option<String>,
    /// Non-rest sibling keys destructured alongside a rest element.
    pub sibling_keys: Vec<String>,
    pub is_rest: bool,
}

/// The resolved declaration site of an identifier.
#[derive(Debug, Clone)]
pub struct Binding {
    pub name: String,
    pub kind: DeclKind,
    /// Range of the declaration site, tested against the selection.
    pub decl_range: SourceRange,
    /// Written type annotation on the binding itself.
    pub annotation: Option<String>,
    /// Type implied by a literal or `as`-asserted initializer.
    pub inferred: Option<String>,
    pub destructure: Option<DestructureInfo>,
}

/// One lexical scope; the bottom of the stack is the module scope,
/// whose bindings stay visible to the extracted unit and are never
/// threaded as props.
#[derive(Debug, Default)]
pub struct Scope {
    bindings: HashMap<String, Binding>,
}

impl Scope {
    pub fn insert(&mut self, binding: Binding) {
        self.bindings.insert(binding.name.clone(), binding);
    }

    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.bindings.get(name)
    }
}

fn prop_name_text(name: &PropName) -> Option<String> {
    match name {
        PropName::Ident(ident) => Some(ident.sym.to_string()),
        PropName::Str(s) => Some(s.value.to_string_lossy().into_owned()),
        PropName::Num(n) => Some(n.value.to_string()),
        _ => None,
    }
}

fn annotation_text(pf: &ParsedFile, ann: Option<&TsTypeAnn>) -> Option<String> {
    ann.map(|a| pf.span_text(a.type_ann.span()).trim().to_string())
}

/// Type implied by an initializer expression, used where no annotation
/// was written down.
pub fn initializer_type(pf: &ParsedFile, init: &Expr) -> Option<String> {
    match init {
        Expr::Lit(Lit::Str(_)) => Some("string".to_string()),
        Expr::Lit(Lit::Num(_)) => Some("number".to_string()),
        Expr::Lit(Lit::Bool(_)) => Some("boolean".to_string()),
        Expr::Tpl(_) => Some("string".to_string()),
        Expr::TsAs(as_expr) => Some(pf.span_text(as_expr.type_ann.span()).trim().to_string()),
        Expr::TsSatisfies(sat) => Some(pf.span_text(sat.type_ann.span()).trim().to_string()),
        Expr::Paren(paren) => initializer_type(pf, &paren.expr),
        _ => None,
    }
}

/// Collect every binding a pattern introduces.
///
/// `top_kind` tags a plain-identifier pattern; destructuring elements
/// are tagged `element_kind` (callers pass `DestructureElement` for
/// parameters and variables, and keep the excluded kind for catch
/// clauses and for-heads so those stay excluded all the way down).
pub fn collect_pattern_bindings(
    pf: &ParsedFile,
    pat: &Pat,
    top_kind: DeclKind,
    element_kind: DeclKind,
    decl_span: Span,
    init: Option<&Expr>,
    out: &mut Vec<Binding>,
) {
    match pat {
        Pat::Ident(binding_ident) => {
            out.push(Binding {
                name: binding_ident.id.sym.to_string(),
                kind: top_kind,
                decl_range: pf.span_to_range(decl_span),
                annotation: annotation_text(pf, binding_ident.type_ann.as_deref()),
                inferred: init.and_then(|e| initializer_type(pf, e)),
                destructure: None,
            });
        }
        Pat::Assign(assign) => {
            collect_pattern_bindings(pf, &assign.left, top_kind, element_kind, decl_span, None, out);
        }
        Pat::Object(object) => {
            collect_object_pattern(pf, object, element_kind, out);
        }
        Pat::Array(array) => {
            collect_array_pattern(pf, array, element_kind, out);
        }
        Pat::Rest(rest) => {
            collect_pattern_bindings(pf, &rest.arg, top_kind, element_kind, decl_span, None, out);
        }
        Pat::Expr(_) | Pat::Invalid(_) => {}
    }
}

fn collect_object_pattern(
    pf: &ParsedFile,
    object: &ObjectPat,
    element_kind: DeclKind,
    out: &mut Vec<Binding>,
) {
    let parent_type = annotation_text(pf, object.type_ann.as_deref());
    let named_keys: Vec<String> = object
        .props
        .iter()
        .filter_map(|prop| match prop {
            ObjectPatProp::KeyValue(kv) => prop_name_text(&kv.key),
            ObjectPatProp::Assign(assign) => Some(assign.key.id.sym.to_string()),
            ObjectPatProp::Rest(_) => None,
        })
        .collect();

    for prop in &object.props {
        match prop {
            ObjectPatProp::KeyValue(kv) => match kv.value.as_ref() {
                Pat::Ident(binding_ident) => out.push(Binding {
                    name: binding_ident.id.sym.to_string(),
                    kind: element_kind,
                    decl_range: pf.span_to_range(binding_ident.id.span),
                    annotation: annotation_text(pf, binding_ident.type_ann.as_deref()),
                    inferred: None,
                    destructure: Some(DestructureInfo {
                        container: PatternContainer::Object,
                        parent_type: parent_type.clone(),
                        key: prop_name_text(&kv.key),
                        sibling_keys: Vec::new(),
                        is_rest: false,
                    }),
                }),
                // Nested pattern: `{ a: { b } }` — recurse; the inner
                // pattern carries no written annotation of its own.
                nested => collect_pattern_bindings(
                    pf,
                    nested,
                    element_kind,
                    element_kind,
                    nested.span(),
                    None,
                    out,
                ),
            },
            ObjectPatProp::Assign(assign) => out.push(Binding {
                name: assign.key.id.sym.to_string(),
                kind: element_kind,
                decl_range: pf.span_to_range(assign.key.id.span),
                annotation: None,
                inferred: None,
                destructure: Some(DestructureInfo {
                    container: PatternContainer::Object,
                    parent_type: parent_type.clone(),
                    key: Some(assign.key.id.sym.to_string()),
                    sibling_keys: Vec::new(),
                    is_rest: false,
                }),
            }),
            ObjectPatProp::Rest(rest) => {
                if let Pat::Ident(binding_ident) = rest.arg.as_ref() {
                    out.push(Binding {
                        name: binding_ident.id.sym.to_string(),
                        kind: element_kind,
                        decl_range: pf.span_to_range(binding_ident.id.span),
                        annotation: None,
                        inferred: None,
                        destructure: Some(DestructureInfo {
                            container: PatternContainer::Object,
                            parent_type: parent_type.clone(),
                            key: None,
                            sibling_keys: named_keys.clone(),
                            is_rest: true,
                        }),
                    });
                }
            }
        }
    }
}

fn collect_array_pattern(
    pf: &ParsedFile,
    array: &ArrayPat,
    element_kind: DeclKind,
    out: &mut Vec<Binding>,
) {
    let parent_type = annotation_text(pf, array.type_ann.as_deref());
    for elem in array.elems.iter().flatten() {
        match elem {
            Pat::Ident(binding_ident) => out.push(Binding {
                name: binding_ident.id.sym.to_string(),
                kind: element_kind,
                decl_range: pf.span_to_range(binding_ident.id.span),
                annotation: annotation_text(pf, binding_ident.type_ann.as_deref()),
                inferred: None,
                destructure: Some(DestructureInfo {
                    container: PatternContainer::Array,
                    parent_type: parent_type.clone(),
                    key: None,
                    sibling_keys: Vec::new(),
                    is_rest: false,
                }),
            }),
            Pat::Rest(rest) => {
                if let Pat::Ident(binding_ident) = rest.arg.as_ref() {
                    out.push(Binding {
                        name: binding_ident.id.sym.to_string(),
                        kind: element_kind,
                        decl_range: pf.span_to_range(binding_ident.id.span),
                        annotation: None,
                        inferred: None,
                        destructure: Some(DestructureInfo {
                            container: PatternContainer::Array,
                            parent_type: parent_type.clone(),
                            key: None,
                            sibling_keys: Vec::new(),
                            is_rest: true,
                        }),
                    });
                }
            }
            nested => collect_pattern_bindings(
                pf,
                nested,
                element_kind,
                element_kind,
                nested.span(),
                None,
                out,
            ),
        }
    }
}

/// Bindings introduced by a function's parameter list.
pub fn collect_param_bindings(pf: &ParsedFile, params: &[Param], scope: &mut Scope) {
    for param in params {
        let mut out = Vec::new();
        collect_pattern_bindings(
            pf,
            &param.pat,
            DeclKind::Param,
            DeclKind::DestructureElement,
            param.span,
            None,
            &mut out,
        );
        for binding in out {
            scope.insert(binding);
        }
    }
}

/// Bindings introduced by an arrow's parameter list (bare patterns).
pub fn collect_arrow_param_bindings(pf: &ParsedFile, params: &[Pat], scope: &mut Scope) {
    for pat in params {
        let mut out = Vec::new();
        collect_pattern_bindings(
            pf,
            pat,
            DeclKind::Param,
            DeclKind::DestructureElement,
            pat.span(),
            None,
            &mut out,
        );
        for binding in out {
            scope.insert(binding);
        }
    }
}

fn collect_var_decl(pf: &ParsedFile, var: &VarDecl, scope: &mut Scope) {
    for declarator in &var.decls {
        let mut out = Vec::new();
        collect_pattern_bindings(
            pf,
            &declarator.name,
            DeclKind::Var,
            DeclKind::DestructureElement,
            declarator.span,
            declarator.init.as_deref(),
            &mut out,
        );
        for binding in out {
            scope.insert(binding);
        }
    }
}

fn collect_decl(pf: &ParsedFile, decl: &Decl, scope: &mut Scope) {
    match decl {
        Decl::Var(var) => collect_var_decl(pf, var, scope),
        Decl::Fn(fn_decl) => scope.insert(Binding {
            name: fn_decl.ident.sym.to_string(),
            kind: DeclKind::Func,
            decl_range: pf.span_to_range(fn_decl.function.span),
            annotation: None,
            inferred: None,
            destructure: None,
        }),
        Decl::Class(class_decl) => scope.insert(Binding {
            name: class_decl.ident.sym.to_string(),
            kind: DeclKind::Class,
            decl_range: pf.span_to_range(class_decl.class.span),
            annotation: None,
            inferred: None,
            destructure: None,
        }),
        _ => {}
    }
}

/// Hoisted declarations of a statement list (one block or function
/// body). Nested blocks get their own scopes during the walk.
pub fn collect_stmt_bindings(pf: &ParsedFile, stmts: &[Stmt], scope: &mut Scope) {
    for stmt in stmts {
        if let Stmt::Decl(decl) = stmt {
            collect_decl(pf, decl, scope);
        }
    }
}

/// Hoisted declarations of the module scope, imports included.
pub fn collect_module_bindings(pf: &ParsedFile, items: &[ModuleItem], scope: &mut Scope) {
    for item in items {
        match item {
            ModuleItem::Stmt(Stmt::Decl(decl)) => collect_decl(pf, decl, scope),
            ModuleItem::Stmt(_) => {}
            ModuleItem::ModuleDecl(ModuleDecl::Import(import)) => {
                for specifier in &import.specifiers {
                    let local = match specifier {
                        ImportSpecifier::Named(named) => &named.local,
                        ImportSpecifier::Default(default) => &default.local,
                        ImportSpecifier::Namespace(namespace) => &namespace.local,
                    };
                    scope.insert(Binding {
                        name: local.sym.to_string(),
                        kind: DeclKind::Import,
                        decl_range: pf.span_to_range(import.span),
                        annotation: None,
                        inferred: None,
                        destructure: None,
                    });
                }
            }
            ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(export)) => {
                collect_decl(pf, &export.decl, scope)
            }
            ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultDecl(export)) => {
                match &export.decl {
                    DefaultDecl::Fn(fn_expr) => {
                        if let Some(ident) = &fn_expr.ident {
                            scope.insert(Binding {
                                name: ident.sym.to_string(),
                                kind: DeclKind::Func,
                                decl_range: pf.span_to_range(fn_expr.function.span),
                                annotation: None,
                                inferred: None,
                                destructure: None,
                            });
                        }
                    }
                    DefaultDecl::Class(class_expr) => {
                        if let Some(ident) = &class_expr.ident {
                            scope.insert(Binding {
                                name: ident.sym.to_string(),
                                kind: DeclKind::Class,
                                decl_range: pf.span_to_range(class_expr.class.span),
                                annotation: None,
                                inferred: None,
                                destructure: None,
                            });
                        }
                    }
                    DefaultDecl::TsInterfaceDecl(_) => {}
                }
            }
            ModuleItem::ModuleDecl(_) => {}
        }
    }
}

/// Bindings introduced by a `for`/`for-in`/`for-of` head; tagged as
/// loop bindings so they stay excluded from props.
pub fn collect_for_head_bindings(pf: &ParsedFile, var: &VarDecl, scope: &mut Scope) {
    for declarator in &var.decls {
        let mut out = Vec::new();
        collect_pattern_bindings(
            pf,
            &declarator.name,
            DeclKind::ForInit,
            DeclKind::ForInit,
            declarator.span,
            None,
            &mut out,
        );
        for binding in out {
            scope.insert(binding);
        }
    }
}

/// Bindings introduced by a catch clause parameter.
pub fn collect_catch_bindings(pf: &ParsedFile, param: &Pat, scope: &mut Scope) {
    let mut out = Vec::new();
    collect_pattern_bindings(
        pf,
        param,
        DeclKind::CatchParam,
        DeclKind::CatchParam,
        param.span(),
        None,
        &mut out,
    );
    for binding in out {
        scope.insert(binding);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> ParsedFile {
        ParsedFile::parse(source, "test.tsx").expect("fixture should parse")
    }

    fn module_scope(pf: &ParsedFile) -> Scope {
        let mut scope = Scope::default();
        collect_module_bindings(pf, &pf.module.body, &mut scope);
        scope
    }

    #[test]
    fn annotated_variable_binding() {
        let pf = parse("const x: string = compute();\n");
        let scope = module_scope(&pf);
        let binding = scope.get("x").expect("x should be declared");
        assert_eq!(binding.kind, DeclKind::Var);
        assert_eq!(binding.annotation.as_deref(), Some("string"));
    }

    #[test]
    fn literal_initializer_infers_primitive_types() {
        let pf = parse("const a = 'hi';\nconst b = 42;\nconst c = true;\nconst d = `t${a}`;\n");
        let scope = module_scope(&pf);
        assert_eq!(scope.get("a").unwrap().inferred.as_deref(), Some("string"));
        assert_eq!(scope.get("b").unwrap().inferred.as_deref(), Some("number"));
        assert_eq!(scope.get("c").unwrap().inferred.as_deref(), Some("boolean"));
        assert_eq!(scope.get("d").unwrap().inferred.as_deref(), Some("string"));
    }

    #[test]
    fn as_assertion_initializer_uses_asserted_type() {
        let pf = parse("const user = load() as User;\n");
        let scope = module_scope(&pf);
        assert_eq!(scope.get("user").unwrap().inferred.as_deref(), Some("User"));
    }

    #[test]
    fn object_pattern_elements_carry_parent_and_keys() {
        let pf = parse("function C({ a, b: renamed, ...rest }: Props) { return null; }\n");
        let mut scope = Scope::default();
        let ModuleItem::Stmt(Stmt::Decl(Decl::Fn(fn_decl))) = &pf.module.body[0] else {
            panic!("expected a function declaration");
        };
        collect_param_bindings(&pf, &fn_decl.function.params, &mut scope);

        let a = scope.get("a").expect("a is bound");
        let info = a.destructure.as_ref().expect("a is a pattern element");
        assert_eq!(info.container, PatternContainer::Object);
        assert_eq!(info.parent_type.as_deref(), Some("Props"));
        assert_eq!(info.key.as_deref(), Some("a"));
        assert!(!info.is_rest);

        let renamed = scope.get("renamed").expect("renamed is bound");
        assert_eq!(
            renamed.destructure.as_ref().unwrap().key.as_deref(),
            Some("b")
        );
        assert!(scope.get("b").is_none(), "the key side is not a binding");

        let rest = scope.get("rest").expect("rest is bound");
        let rest_info = rest.destructure.as_ref().unwrap();
        assert!(rest_info.is_rest);
        assert_eq!(rest_info.sibling_keys, vec!["a", "b"]);
    }

    #[test]
    fn string_keyed_pattern_elements_keep_the_literal_key() {
        let pf = parse("const { 'data-id': id, ...rest }: Attrs = attrs;\n");
        let scope = module_scope(&pf);
        let id = scope.get("id").expect("id is bound");
        let info = id.destructure.as_ref().expect("id is a pattern element");
        assert_eq!(info.key.as_deref(), Some("data-id"));
        let rest = scope.get("rest").expect("rest is bound");
        assert_eq!(
            rest.destructure.as_ref().unwrap().sibling_keys,
            vec!["data-id"]
        );
    }

    #[test]
    fn array_pattern_elements() {
        let pf = parse("const [first, ...more]: number[] = xs;\n");
        let scope = module_scope(&pf);
        let first = scope.get("first").unwrap();
        let info = first.destructure.as_ref().unwrap();
        assert_eq!(info.container, PatternContainer::Array);
        assert_eq!(info.parent_type.as_deref(), Some("number[]"));
        let more = scope.get("more").unwrap();
        assert!(more.destructure.as_ref().unwrap().is_rest);
    }

    #[test]
    fn imports_are_tagged_import() {
        let pf = parse("import React, { useState } from 'react';\n");
        let scope = module_scope(&pf);
        assert_eq!(scope.get("React").unwrap().kind, DeclKind::Import);
        assert_eq!(scope.get("useState").unwrap().kind, DeclKind::Import);
        assert!(!scope.get("useState").unwrap().kind.passable());
    }
}
