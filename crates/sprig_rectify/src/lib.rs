//! Rectification of intermediate source.
//!
//! The generator emits statement-oriented source where reserved sentinel
//! calls stand in for operations that only get their final form here:
//! element construction, escaped text emission and raw output. This crate
//! consumes the parsed intermediate script and rewrites every sentinel
//! call site into the rendering runtime's calls, leaving helper calls and
//! temp variables (which carry their own definitions) untouched.

mod error;
mod rewrite;

#[cfg(test)]
mod test_utils;

pub use error::RectifyError;

use swc_core::ecma::ast::Script;

/// Rewrites every sentinel call in `script` into its final semantic form.
///
/// The pass is total over well-formed sentinel usage; malformed usage
/// (an element sentinel without its children block, a sentinel call with
/// the wrong arity) is an error that aborts the whole compilation.
pub fn rectify(script: Script) -> Result<Script, RectifyError> {
    rewrite::rectify_script(script)
}
