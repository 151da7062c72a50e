//! Dependency analysis: which outer bindings the selected markup uses.
//!
//! A single walk maintains a stack of lexical scopes (module scope at
//! the bottom) and resolves every identifier use inside the selection
//! against it. A use becomes a prop when it resolves to a passable
//! binding in a non-module scope declared outside the selection.
//! Module-scope bindings, imports, globals, and bindings the selection
//! itself declares stay as they are.

use carve_foundation::SourceRange;
use indexmap::IndexMap;
use swc_ecma_ast::*;
use swc_ecma_visit::{Visit, VisitWith};
use tracing::debug;

use crate::parse::ParsedFile;
use crate::semantic::{
    collect_arrow_param_bindings, collect_catch_bindings, collect_for_head_bindings,
    collect_module_bindings, collect_param_bindings, collect_stmt_bindings, Binding, Scope,
};

/// An outer binding the extracted unit depends on.
#[derive(Debug, Clone)]
pub struct Dependency {
    pub binding: Binding,
    /// Whether the use site is a JSX spread attribute over the bare
    /// identifier, i.e. `{...name}`.
    pub is_spread: bool,
}

/// Syntactic position of one dependency use inside the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UseForm {
    Plain,
    /// Object-literal shorthand standing for `name: name`.
    Shorthand,
    /// Operand of a JSX spread attribute.
    JsxSpread,
}

/// One occurrence of a dependency inside the selection, as byte
/// offsets into the source. The synthesizer rewrites these when props
/// arrive bundled instead of destructured.
#[derive(Debug, Clone)]
pub struct UseSite {
    pub name: String,
    pub form: UseForm,
    pub start: usize,
    pub end: usize,
}

/// Dependencies of a selection plus every use site that produced one.
#[derive(Debug, Clone, Default)]
pub struct Analysis {
    /// First-use order; later uses of a name override earlier ones.
    pub dependencies: Vec<Dependency>,
    /// Source order.
    pub uses: Vec<UseSite>,
}

/// Resolve every identifier use inside the selection and collect the
/// outer bindings it depends on.
pub fn analyze_dependencies(pf: &ParsedFile, selection: &SourceRange) -> Analysis {
    let mut module_scope = Scope::default();
    collect_module_bindings(pf, &pf.module.body, &mut module_scope);

    let mut collector = DependencyCollector {
        pf,
        selection: *selection,
        scopes: vec![module_scope],
        deps: IndexMap::new(),
        uses: Vec::new(),
        in_jsx_spread: false,
        in_shorthand: false,
    };
    pf.module.visit_with(&mut collector);

    debug!(
        count = collector.deps.len(),
        uses = collector.uses.len(),
        "resolved selection dependencies"
    );
    let mut uses = collector.uses;
    uses.sort_by_key(|site| site.start);
    Analysis {
        dependencies: collector.deps.into_values().collect(),
        uses,
    }
}

struct DependencyCollector<'a> {
    pf: &'a ParsedFile,
    selection: SourceRange,
    scopes: Vec<Scope>,
    deps: IndexMap<String, Dependency>,
    uses: Vec<UseSite>,
    in_jsx_spread: bool,
    in_shorthand: bool,
}

impl DependencyCollector<'_> {
    fn scoped(&mut self, fill: impl FnOnce(&ParsedFile, &mut Scope), walk: impl FnOnce(&mut Self)) {
        let mut scope = Scope::default();
        fill(self.pf, &mut scope);
        self.scopes.push(scope);
        walk(self);
        self.scopes.pop();
    }

    fn record_use(&mut self, ident: &Ident) {
        let range = self.pf.span_to_range(ident.span);
        if !self.selection.contains(&range) {
            return;
        }
        let name = ident.sym.as_ref();
        if name == "undefined" {
            return;
        }
        let resolved = self
            .scopes
            .iter()
            .enumerate()
            .rev()
            .find_map(|(idx, scope)| scope.get(name).map(|b| (idx, b.clone())));
        let Some((scope_idx, binding)) = resolved else {
            // Unresolved names are ambient globals (React, console).
            return;
        };
        if scope_idx == 0 || !binding.kind.passable() {
            return;
        }
        if self.selection.intersects(&binding.decl_range) {
            // Declared by the selection itself; moves along with it.
            return;
        }
        self.deps.insert(
            name.to_string(),
            Dependency {
                binding,
                is_spread: self.in_jsx_spread,
            },
        );
        let (start, end) = self.pf.span_offsets(ident.span);
        let form = if self.in_jsx_spread {
            UseForm::JsxSpread
        } else if self.in_shorthand {
            UseForm::Shorthand
        } else {
            UseForm::Plain
        };
        self.uses.push(UseSite {
            name: name.to_string(),
            form,
            start,
            end,
        });
    }
}

impl Visit for DependencyCollector<'_> {
    fn visit_ident(&mut self, node: &Ident) {
        self.record_use(node);
    }

    // Declaration-side identifiers (patterns, assignment targets) are
    // never uses.
    fn visit_binding_ident(&mut self, _node: &BindingIdent) {}

    // Tag names, closing tags, labels, and type positions do not
    // reference runtime values the extracted unit would need.
    fn visit_jsx_element_name(&mut self, _node: &JSXElementName) {}
    fn visit_jsx_closing_element(&mut self, _node: &JSXClosingElement) {}
    fn visit_ts_type(&mut self, _node: &TsType) {}
    fn visit_ts_type_ann(&mut self, _node: &TsTypeAnn) {}
    fn visit_ts_type_alias_decl(&mut self, _node: &TsTypeAliasDecl) {}
    fn visit_ts_interface_decl(&mut self, _node: &TsInterfaceDecl) {}
    fn visit_ts_enum_decl(&mut self, _node: &TsEnumDecl) {}
    fn visit_break_stmt(&mut self, _node: &BreakStmt) {}
    fn visit_continue_stmt(&mut self, _node: &ContinueStmt) {}

    fn visit_prop(&mut self, node: &Prop) {
        if let Prop::Shorthand(ident) = node {
            self.in_shorthand = true;
            ident.visit_with(self);
            self.in_shorthand = false;
        } else {
            node.visit_children_with(self);
        }
    }

    fn visit_labeled_stmt(&mut self, node: &LabeledStmt) {
        node.body.visit_with(self);
    }

    // Function and class names are declarations; only their bodies can
    // contain uses.
    fn visit_fn_decl(&mut self, node: &FnDecl) {
        node.function.visit_with(self);
    }

    fn visit_fn_expr(&mut self, node: &FnExpr) {
        node.function.visit_with(self);
    }

    fn visit_class_decl(&mut self, node: &ClassDecl) {
        node.class.visit_with(self);
    }

    fn visit_class_expr(&mut self, node: &ClassExpr) {
        node.class.visit_with(self);
    }

    fn visit_function(&mut self, node: &Function) {
        self.scoped(
            |pf, scope| collect_param_bindings(pf, &node.params, scope),
            |collector| node.visit_children_with(collector),
        );
    }

    fn visit_arrow_expr(&mut self, node: &ArrowExpr) {
        self.scoped(
            |pf, scope| collect_arrow_param_bindings(pf, &node.params, scope),
            |collector| node.visit_children_with(collector),
        );
    }

    fn visit_block_stmt(&mut self, node: &BlockStmt) {
        self.scoped(
            |pf, scope| collect_stmt_bindings(pf, &node.stmts, scope),
            |collector| node.visit_children_with(collector),
        );
    }

    fn visit_for_stmt(&mut self, node: &ForStmt) {
        self.scoped(
            |pf, scope| {
                if let Some(VarDeclOrExpr::VarDecl(var)) = &node.init {
                    collect_for_head_bindings(pf, var, scope);
                }
            },
            |collector| node.visit_children_with(collector),
        );
    }

    fn visit_for_in_stmt(&mut self, node: &ForInStmt) {
        self.scoped(
            |pf, scope| {
                if let ForHead::VarDecl(var) = &node.left {
                    collect_for_head_bindings(pf, var, scope);
                }
            },
            |collector| node.visit_children_with(collector),
        );
    }

    fn visit_for_of_stmt(&mut self, node: &ForOfStmt) {
        self.scoped(
            |pf, scope| {
                if let ForHead::VarDecl(var) = &node.left {
                    collect_for_head_bindings(pf, var, scope);
                }
            },
            |collector| node.visit_children_with(collector),
        );
    }

    fn visit_catch_clause(&mut self, node: &CatchClause) {
        self.scoped(
            |pf, scope| {
                if let Some(param) = &node.param {
                    collect_catch_bindings(pf, param, scope);
                }
            },
            |collector| node.visit_children_with(collector),
        );
    }

    // Attribute spreads over a bare identifier keep their spread shape
    // when threaded through props; anything else is a plain use.
    fn visit_jsx_opening_element(&mut self, node: &JSXOpeningElement) {
        for attr in &node.attrs {
            match attr {
                JSXAttrOrSpread::JSXAttr(attr) => attr.visit_with(self),
                JSXAttrOrSpread::SpreadElement(spread) => {
                    let bare = matches!(spread.expr.as_ref(), Expr::Ident(_));
                    self.in_jsx_spread = bare;
                    spread.expr.visit_with(self);
                    self.in_jsx_spread = false;
                }
            }
        }
    }
}
