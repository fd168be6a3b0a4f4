//! Error definitions for the glue code of `sprig`

use sprig_codegen::CodegenError;
use sprig_rectify::RectifyError;
use swc_core::common::{Span, Spanned};

/// Failure to parse the intermediate source.
///
/// The generator must only ever emit syntactically valid text, so this
/// surfacing is a programming-error signal, not bad template input.
#[derive(Debug)]
pub struct ParseError {
    pub kind: swc_ecma_parser::error::SyntaxError,
    pub span: Span,
}

impl From<swc_ecma_parser::error::Error> for ParseError {
    fn from(value: swc_ecma_parser::error::Error) -> ParseError {
        let span = value.span();

        ParseError {
            kind: value.into_kind(),
            span,
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Any failure of the compilation pipeline. Compilation is all-or-nothing:
/// whichever stage fails first aborts the run, partial buffers are
/// discarded and the original failure is surfaced unchanged.
#[derive(Debug)]
pub enum CompileError {
    /// An error during generation of the intermediate source.
    ///
    /// This can be due to:
    /// - an unsupported construct (doctype, mixin, filter);
    /// - an interpolation with unbalanced delimiters;
    /// - an unparseable attribute expression.
    Codegen(CodegenError),

    /// The intermediate source did not parse.
    Parse(ParseError),

    /// The rectifier rejected the intermediate AST.
    Rectify(RectifyError),
}

impl std::fmt::Display for CompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompileError::Codegen(e) => write!(f, "{}", e),
            CompileError::Parse(e) => write!(f, "{}", e),
            CompileError::Rectify(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CompileError {}

impl From<CodegenError> for CompileError {
    fn from(value: CodegenError) -> Self {
        Self::Codegen(value)
    }
}

impl From<ParseError> for CompileError {
    fn from(value: ParseError) -> Self {
        Self::Parse(value)
    }
}

impl From<RectifyError> for CompileError {
    fn from(value: RectifyError) -> Self {
        Self::Rectify(value)
    }
}
