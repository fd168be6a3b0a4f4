/// Errors raised while generating intermediate source.
///
/// Every error is fatal: the whole compilation is abandoned and no partial
/// output is surfaced.
#[derive(Debug)]
pub enum CodegenError {
    /// Doctype, mixin and filter nodes are permanently unsupported.
    UnsupportedConstruct(&'static str),
    /// An interpolation whose expression never closes its delimiters.
    MalformedInterpolation { text: String },
    /// An attribute value that does not parse as an expression.
    BadExpression { source: String },
}

impl std::fmt::Display for CodegenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CodegenError::UnsupportedConstruct(kind) => {
                write!(f, "{} is not supported", kind)
            }
            CodegenError::MalformedInterpolation { text } => {
                write!(f, "unbalanced interpolation in {:?}", text)
            }
            CodegenError::BadExpression { source } => {
                write!(f, "could not parse expression {:?}", source)
            }
        }
    }
}

impl std::error::Error for CodegenError {}
