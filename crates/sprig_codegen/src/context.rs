use fxhash::FxHashSet;
use sprig_core::{HelperSet, SUFFIX, TMP_PREFIX};

use crate::error::CodegenError;

/// Mutable state of one compilation run.
///
/// A context is created fresh when generation begins and discarded once the
/// intermediate source has been produced; it is never shared between runs.
#[derive(Debug)]
pub struct CodegenContext {
    /// Append-only list of source fragments, flattened once at the end.
    buf: Vec<String>,
    /// Current nesting level. Starts below zero and is bracket-incremented
    /// around every node visit, so it is non-negative while a handler runs
    /// and returns to its pre-call value afterwards.
    pub(crate) depth: i32,
    /// Depths whose temp variable has already been declared.
    tmpvars: FxHashSet<i32>,
    /// Helpers whose source has already been emitted.
    pub(crate) helpers: HelperSet,
    /// Helper sources in emission order.
    pub(crate) helper_sources: Vec<&'static str>,
}

impl Default for CodegenContext {
    fn default() -> CodegenContext {
        CodegenContext {
            buf: Vec::new(),
            depth: -1,
            tmpvars: FxHashSet::default(),
            helpers: HelperSet::default(),
            helper_sources: Vec::new(),
        }
    }
}

impl CodegenContext {
    pub fn new() -> CodegenContext {
        CodegenContext::default()
    }

    pub(crate) fn push(&mut self, fragment: impl Into<String>) {
        self.buf.push(fragment.into());
    }

    /// Flattened intermediate source accumulated so far.
    pub fn source(&self) -> String {
        self.buf.concat()
    }

    /// Consumes the context, returning the intermediate source and the
    /// helper sources in emission order.
    pub fn into_parts(self) -> (String, Vec<&'static str>) {
        (self.buf.concat(), self.helper_sources)
    }

    /// Runs `f` against a fresh buffer and returns what it emitted,
    /// restoring the previous buffer afterwards. Used for fragments that
    /// are assembled in expression position (function bodies of the
    /// iteration helper).
    pub(crate) fn capture<F>(&mut self, f: F) -> Result<String, CodegenError>
    where
        F: FnOnce(&mut CodegenContext) -> Result<(), CodegenError>,
    {
        let saved = std::mem::take(&mut self.buf);
        let result = f(self);
        let captured = std::mem::replace(&mut self.buf, saved);
        result.map(|_| captured.concat())
    }

    /// Returns the temp variable of the current depth, declaring it on
    /// first use. A second request at the same depth reuses the variable:
    /// with an initializer this emits an assignment, not a redeclaration.
    pub(crate) fn getvar(&mut self, init: Option<&str>) -> String {
        let name = format!("{}{}{}", TMP_PREFIX, self.depth, SUFFIX);
        if self.tmpvars.contains(&self.depth) {
            if let Some(init) = init {
                self.push(format!("{}={};\n", name, init));
            }
        } else {
            match init {
                Some(init) => self.push(format!("var {}={};\n", name, init)),
                None => self.push(format!("var {};\n", name)),
            }
            self.tmpvars.insert(self.depth);
        }
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_declares_tmpvar_once_per_depth() {
        let mut ctx = CodegenContext::new();
        ctx.depth = 0;

        let first = ctx.getvar(Some("foo"));
        let second = ctx.getvar(Some("bar"));

        assert_eq!(first, "ǃtmp0＿");
        assert_eq!(first, second);
        assert_eq!(ctx.source(), "var ǃtmp0＿=foo;\nǃtmp0＿=bar;\n");
    }

    #[test]
    fn it_declares_separate_tmpvars_per_depth() {
        let mut ctx = CodegenContext::new();
        ctx.depth = 0;
        let outer = ctx.getvar(Some("a"));
        ctx.depth = 2;
        let inner = ctx.getvar(Some("b"));

        assert_ne!(outer, inner);
        assert_eq!(ctx.source(), "var ǃtmp0＿=a;\nvar ǃtmp2＿=b;\n");
    }

    #[test]
    fn it_declares_without_initializer() {
        let mut ctx = CodegenContext::new();
        ctx.depth = 1;
        ctx.getvar(None);
        assert_eq!(ctx.source(), "var ǃtmp1＿;\n");
    }

    #[test]
    fn it_captures_into_a_sub_buffer() {
        let mut ctx = CodegenContext::new();
        ctx.push("before;\n");
        let captured = ctx
            .capture(|ctx| {
                ctx.push("inner;\n");
                Ok(())
            })
            .unwrap();

        assert_eq!(captured, "inner;\n");
        assert_eq!(ctx.source(), "before;\n");
    }
}
