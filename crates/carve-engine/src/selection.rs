//! Selection validation and fragment-grouping analysis.
//!
//! A selection is extractable when at least one topmost node fully
//! inside it is JSX markup. "Topmost" means no other contained node
//! encloses it; a statement whose span coincides with its expression
//! (no trailing semicolon) is transparent so that selecting a bare
//! `<div />` line still resolves to the element itself.

use carve_foundation::SourceRange;
use swc_common::{Span, Spanned};
use swc_ecma_ast::*;
use swc_ecma_visit::{Visit, VisitWith};

use crate::parse::ParsedFile;

/// Outcome of walking a module against one selection.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectionInfo {
    /// Topmost contained nodes that are JSX elements or fragments.
    pub topmost_markup: usize,
    /// All topmost contained children, markup, expression containers,
    /// and non-blank text runs included.
    pub topmost_children: usize,
}

impl SelectionInfo {
    /// A selection is extractable when it resolves to markup.
    pub fn is_extractable(&self) -> bool {
        self.topmost_markup >= 1
    }

    /// More than one topmost child cannot be returned as a single
    /// expression and needs a `<>...</>` wrapper.
    pub fn needs_grouping_wrapper(&self) -> bool {
        self.topmost_children > 1
    }
}

/// Walk the parsed module and classify the topmost nodes contained in
/// `selection`. An empty or whitespace-only selection is rejected
/// before walking.
pub fn analyze_selection(pf: &ParsedFile, selection: &SourceRange) -> SelectionInfo {
    if pf.range_text(selection).trim().is_empty() {
        return SelectionInfo::default();
    }
    let mut walker = TopmostJsxWalker {
        pf,
        selection: *selection,
        depth: 0,
        info: SelectionInfo::default(),
    };
    pf.module.visit_with(&mut walker);
    walker.info
}

struct TopmostJsxWalker<'a> {
    pf: &'a ParsedFile,
    selection: SourceRange,
    /// Number of enclosing nodes already fully contained in the
    /// selection; anything below depth 0 is not topmost.
    depth: u32,
    info: SelectionInfo,
}

impl TopmostJsxWalker<'_> {
    fn is_contained(&self, span: Span) -> bool {
        self.selection.contains(&self.pf.span_to_range(span))
    }

    fn enter_container(&mut self, span: Span, walk: impl FnOnce(&mut Self)) {
        let contained = self.is_contained(span);
        if contained {
            self.depth += 1;
        }
        walk(self);
        if contained {
            self.depth -= 1;
        }
    }

    fn enter_markup(&mut self, span: Span, children: &[JSXElementChild], walk: impl FnOnce(&mut Self)) {
        let contained = self.is_contained(span);
        if contained && self.depth == 0 {
            self.info.topmost_markup += 1;
            self.info.topmost_children += 1;
        }
        if !contained && self.depth == 0 {
            // The element straddles the selection edge: its contained
            // children become the topmost nodes. Non-blank text runs
            // count toward grouping even though they are not markup.
            for child in children {
                if let JSXElementChild::JSXText(text) = child {
                    if self.is_contained(text.span) && !text.value.trim().is_empty() {
                        self.info.topmost_children += 1;
                    }
                }
            }
        }
        self.enter_container(span, walk);
    }
}

impl Visit for TopmostJsxWalker<'_> {
    // Any contained expression that is not itself markup shadows the
    // markup inside it: a template literal, an `as` expression, a
    // call, a ternary. Markup expressions stay transparent so their
    // own visit methods classify them.
    fn visit_expr(&mut self, node: &Expr) {
        match node {
            Expr::JSXElement(_) | Expr::JSXFragment(_) => node.visit_children_with(self),
            _ => self.enter_container(node.span(), |walker| node.visit_children_with(walker)),
        }
    }

    // A statement covering exactly its expression has no semicolon of
    // its own and must not shadow the expression as the topmost node.
    fn visit_stmt(&mut self, node: &Stmt) {
        if let Stmt::Expr(expr_stmt) = node {
            let stmt_span = self.pf.span_offsets(expr_stmt.span);
            let expr_span = self.pf.span_offsets(expr_stmt.expr.span());
            if stmt_span == expr_span {
                node.visit_children_with(self);
                return;
            }
        }
        self.enter_container(node.span(), |walker| node.visit_children_with(walker));
    }

    fn visit_var_declarator(&mut self, node: &VarDeclarator) {
        self.enter_container(node.span, |walker| node.visit_children_with(walker));
    }

    fn visit_jsx_attr(&mut self, node: &JSXAttr) {
        self.enter_container(node.span, |walker| node.visit_children_with(walker));
    }

    // A contained `{expr}` child is a topmost node that is not markup:
    // it counts toward the grouping decision, not toward validity.
    fn visit_jsx_expr_container(&mut self, node: &JSXExprContainer) {
        if self.depth == 0 && self.is_contained(node.span) {
            self.info.topmost_children += 1;
        }
        self.enter_container(node.span, |walker| node.visit_children_with(walker));
    }

    fn visit_jsx_element(&mut self, node: &JSXElement) {
        self.enter_markup(node.span, &node.children, |walker| {
            node.visit_children_with(walker)
        });
    }

    fn visit_jsx_fragment(&mut self, node: &JSXFragment) {
        self.enter_markup(node.span, &node.children, |walker| {
            node.visit_children_with(walker)
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carve_foundation::SourceRange;

    fn analyze(source: &str, selected: &str) -> SelectionInfo {
        let pf = ParsedFile::parse(source, "test.tsx").expect("fixture should parse");
        let start = pf.source().find(selected).expect("selection text in fixture");
        let (start_line, start_col) = pf.position_of(start);
        let (end_line, end_col) = pf.position_of(start + selected.len());
        analyze_selection(&pf, &SourceRange::new(start_line, start_col, end_line, end_col))
    }

    #[test]
    fn single_element_selection_is_extractable() {
        let info = analyze(
            "const v = <div className=\"a\" />;\n",
            "<div className=\"a\" />",
        );
        assert!(info.is_extractable());
        assert!(!info.needs_grouping_wrapper());
    }

    #[test]
    fn returned_element_is_extractable() {
        let source = "function C() {\n  return (\n    <div>hi</div>\n  );\n}\n";
        let info = analyze(source, "<div>hi</div>");
        assert!(info.is_extractable());
    }

    #[test]
    fn bare_jsx_statement_without_semicolon_is_extractable() {
        // The statement span equals the element span, so the statement
        // is transparent and the element is topmost.
        let source = "const f = () => {\n  <div>hi</div>\n};\n";
        let info = analyze(source, "<div>hi</div>");
        assert!(info.is_extractable());
    }

    #[test]
    fn non_jsx_expression_is_rejected() {
        let info = analyze("const v = foo + bar;\n", "foo + bar");
        assert!(!info.is_extractable());
    }

    #[test]
    fn template_literal_around_markup_is_rejected() {
        let info = analyze("const v = `a${<div />}b`;\n", "`a${<div />}b`");
        assert!(!info.is_extractable(), "the topmost node is the template");
    }

    #[test]
    fn as_expression_around_markup_is_rejected() {
        let info = analyze("const v = <div /> as any;\n", "<div /> as any");
        assert!(!info.is_extractable(), "the topmost node is the assertion");
    }

    #[test]
    fn trailing_semicolon_in_the_selection_is_rejected() {
        let source = "const f = () => {\n  <div>hi</div>;\n};\n";
        let info = analyze(source, "<div>hi</div>;");
        assert!(!info.is_extractable(), "the topmost node is the statement");
    }

    #[test]
    fn empty_selection_is_rejected() {
        let pf = ParsedFile::parse("const v = <div />;\n", "test.tsx").unwrap();
        let info = analyze_selection(&pf, &SourceRange::at(0, 5));
        assert!(!info.is_extractable());
    }

    #[test]
    fn sibling_elements_need_a_grouping_wrapper() {
        let source = "const v = <ul>\n  <li>a</li>\n  <li>b</li>\n</ul>;\n";
        let info = analyze(source, "<li>a</li>\n  <li>b</li>");
        assert!(info.is_extractable());
        assert_eq!(info.topmost_markup, 2);
        assert!(info.needs_grouping_wrapper());
    }

    #[test]
    fn text_between_selected_elements_counts_toward_grouping() {
        let source = "const v = <p>\n  <b>a</b> and <b>b</b>\n</p>;\n";
        let info = analyze(source, "<b>a</b> and <b>b</b>");
        assert!(info.is_extractable());
        assert!(info.needs_grouping_wrapper());
    }

    #[test]
    fn element_inside_another_selected_element_is_not_topmost() {
        let source = "const v = <div>\n  <span>x</span>\n</div>;\n";
        let info = analyze(source, "<div>\n  <span>x</span>\n</div>");
        assert_eq!(info.topmost_markup, 1);
        assert!(!info.needs_grouping_wrapper());
    }

    #[test]
    fn expression_container_alone_is_not_markup() {
        let source = "const v = <div>{label}</div>;\n";
        let info = analyze(source, "{label}");
        assert!(!info.is_extractable());
        assert_eq!(info.topmost_children, 1);
    }
}
