#[macro_use]
extern crate lazy_static;

mod attributes;
mod comments;
mod context;
mod control_flow;
mod elements;
mod error;
mod helpers;
mod interpolation;
mod text;
mod utils;

pub use context::CodegenContext;
pub use error::CodegenError;
pub use interpolation::{interpolate, Segment, SegmentVec};
