mod helpers;
mod structs;

pub use helpers::*;
pub use structs::*;

/// String atom shared between the codegen and rectification crates.
pub type SprigAtom = swc_core::ecma::atoms::JsWord;
