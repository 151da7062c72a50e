//! SWC-backed parsing and span bookkeeping.
//!
//! Every extraction request parses the whole file fresh; the parsed
//! module and its derived line index are read-only for the lifetime of
//! the request.

use carve_foundation::{ExtractError, ExtractResult, SourceRange};
use std::path::PathBuf;
use swc_common::{sync::Lrc, FileName, FilePathMapping, SourceMap, Span};
use swc_ecma_ast::Module;
use swc_ecma_parser::{lexer::Lexer, Parser, StringInput, Syntax, TsSyntax};

/// Whether the file is a typed dialect (drives type-declaration
/// emission in the synthesizer).
pub fn is_typescript(file_name: &str) -> bool {
    file_name.ends_with(".ts") || file_name.ends_with(".tsx")
}

fn is_jsx_dialect(file_name: &str) -> bool {
    file_name.ends_with(".tsx") || file_name.ends_with(".jsx")
}

/// One parsed source file: the SWC module plus the line index used to
/// convert between spans, line/column ranges, and text slices.
pub struct ParsedFile {
    pub module: Module,
    pub is_typescript: bool,
    source: String,
    line_starts: Vec<usize>,
    /// Byte position of the file start inside the SWC source map;
    /// spans are absolute within the map, not relative to the source.
    file_start: u32,
}

impl ParsedFile {
    /// Parse `source` as a TypeScript/JavaScript module, with JSX
    /// enabled for `.tsx`/`.jsx` files.
    pub fn parse(source: &str, file_name: &str) -> ExtractResult<Self> {
        let cm = Lrc::new(SourceMap::new(FilePathMapping::empty()));
        let fm = cm.new_source_file(
            Lrc::new(FileName::Real(PathBuf::from(file_name))),
            source.to_string(),
        );
        let lexer = Lexer::new(
            Syntax::Typescript(TsSyntax {
                tsx: is_jsx_dialect(file_name),
                decorators: false,
                dts: false,
                no_early_errors: true,
                disallow_ambiguous_jsx_like: true,
            }),
            Default::default(),
            StringInput::from(&*fm),
            None,
        );
        let mut parser = Parser::new_from(lexer);
        let module = parser
            .parse_module()
            .map_err(|e| ExtractError::parse(format!("failed to parse module: {:?}", e)))?;

        let mut line_starts = vec![0usize];
        for (idx, byte) in source.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(idx + 1);
            }
        }

        Ok(Self {
            module,
            is_typescript: is_typescript(file_name),
            source: source.to_string(),
            line_starts,
            file_start: fm.start_pos.0,
        })
    }

    /// The full source text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Byte offsets of a span within the source text.
    pub fn span_offsets(&self, span: Span) -> (usize, usize) {
        let lo = span.lo.0.saturating_sub(self.file_start) as usize;
        let hi = span.hi.0.saturating_sub(self.file_start) as usize;
        (lo.min(self.source.len()), hi.min(self.source.len()))
    }

    /// Source text covered by a span.
    pub fn span_text(&self, span: Span) -> &str {
        let (lo, hi) = self.span_offsets(span);
        &self.source[lo..hi.max(lo)]
    }

    /// Convert a byte offset into a 0-based (line, column) pair.
    pub fn position_of(&self, offset: usize) -> (u32, u32) {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        (line as u32, (offset - self.line_starts[line]) as u32)
    }

    /// Convert a 0-based (line, column) position into a byte offset,
    /// clamped to the source length.
    pub fn offset_of(&self, line: u32, col: u32) -> usize {
        match self.line_starts.get(line as usize) {
            Some(start) => (start + col as usize).min(self.source.len()),
            None => self.source.len(),
        }
    }

    /// Convert a span into a line/column range.
    pub fn span_to_range(&self, span: Span) -> SourceRange {
        let (lo, hi) = self.span_offsets(span);
        let (start_line, start_col) = self.position_of(lo);
        let (end_line, end_col) = self.position_of(hi);
        SourceRange::new(start_line, start_col, end_line, end_col)
    }

    /// Byte offsets of a line/column range.
    pub fn range_offsets(&self, range: &SourceRange) -> (usize, usize) {
        (
            self.offset_of(range.start_line, range.start_col),
            self.offset_of(range.end_line, range.end_col),
        )
    }

    /// Source text covered by a line/column range.
    pub fn range_text(&self, range: &SourceRange) -> &str {
        let (lo, hi) = self.range_offsets(range);
        &self.source[lo..hi.max(lo)]
    }

    /// Position just past the last character of the document.
    pub fn end_of_document(&self) -> SourceRange {
        let (line, col) = self.position_of(self.source.len());
        SourceRange::at(line, col)
    }
}
