/// Malformed sentinel usage discovered during rectification.
///
/// The generator only ever produces well-formed sentinel calls, so any of
/// these surfacing means the intermediate source did not come out of the
/// generator unchanged.
#[derive(Debug)]
pub enum RectifyError {
    /// An element-construction sentinel not followed by its children block.
    MissingElementBlock,
    /// A sentinel call with an unexpected number of arguments.
    BadArity { sentinel: &'static str, found: usize },
}

impl std::fmt::Display for RectifyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RectifyError::MissingElementBlock => {
                write!(f, "element sentinel is not followed by a block")
            }
            RectifyError::BadArity { sentinel, found } => {
                write!(f, "sentinel {} called with {} arguments", sentinel, found)
            }
        }
    }
}

impl std::error::Error for RectifyError {}
