use sprig_core::Helper;

use crate::context::CodegenContext;

impl CodegenContext {
    /// Records a helper reference. The helper's source is queued for
    /// emission the first time it is referenced; later references are
    /// no-ops.
    pub fn add_helper(&mut self, helper: Helper) {
        if self.helpers.contains(helper) {
            return;
        }
        self.helpers |= helper;
        self.helper_sources.push(helper.source());
    }

    pub fn get_and_add_helper(&mut self, helper: Helper) -> &'static str {
        self.add_helper(helper);
        helper.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_emits_each_helper_source_once() {
        let mut ctx = CodegenContext::new();

        ctx.add_helper(Helper::Map);
        ctx.add_helper(Helper::Attrs);
        ctx.add_helper(Helper::Map);
        ctx.add_helper(Helper::Attrs);

        assert_eq!(ctx.helper_sources.len(), 2);
        assert_eq!(ctx.helper_sources[0], Helper::Map.source());
        assert_eq!(ctx.helper_sources[1], Helper::Attrs.source());
    }

    #[test]
    fn it_keeps_emission_order() {
        let mut ctx = CodegenContext::new();

        ctx.add_helper(Helper::Attrs);
        ctx.add_helper(Helper::Map);

        assert_eq!(ctx.helper_sources[0], Helper::Attrs.source());
        assert_eq!(ctx.helper_sources[1], Helper::Map.source());
    }

    #[test]
    fn it_returns_the_sentinel_name() {
        let mut ctx = CodegenContext::new();
        assert_eq!(ctx.get_and_add_helper(Helper::Map), "ǃmap＿");
    }
}
