use sprig_core::{Block, CaseNode, EachNode, Helper, TemplateNode, WhenNode};

use crate::context::CodegenContext;
use crate::error::CodegenError;

impl CodegenContext {
    /// Dispatches on the node variant, bracketing the handler with the
    /// depth counter.
    pub fn generate_node(&mut self, node: &TemplateNode) -> Result<(), CodegenError> {
        self.depth += 1;
        let result = self.generate_node_inner(node);
        self.depth -= 1;
        result
    }

    fn generate_node_inner(&mut self, node: &TemplateNode) -> Result<(), CodegenError> {
        match node {
            TemplateNode::Tag(tag) => self.generate_tag(tag),
            TemplateNode::Text(text) => self.generate_text(text),
            TemplateNode::Code(code) => self.generate_code(code),
            TemplateNode::Case(case) => self.generate_case(case),
            TemplateNode::When(when) => self.generate_when(when),
            TemplateNode::Block(block) => self.generate_block_nodes(block),
            TemplateNode::MixinBlock => {
                self.generate_mixin_block();
                Ok(())
            }
            TemplateNode::Comment(comment) => {
                self.generate_comment(comment);
                Ok(())
            }
            TemplateNode::BlockComment(comment) => self.generate_block_comment(comment),
            TemplateNode::Literal(literal) => {
                self.generate_literal(literal);
                Ok(())
            }
            TemplateNode::Each(each) => self.generate_each(each).map(|_| ()),

            // Permanently unsupported constructs: fail before any output.
            TemplateNode::Doctype => Err(CodegenError::UnsupportedConstruct("doctype")),
            TemplateNode::Mixin => Err(CodegenError::UnsupportedConstruct("mixin")),
            TemplateNode::Filter => Err(CodegenError::UnsupportedConstruct("filter")),
        }
    }

    /// Visits a child block as its own tree level.
    pub(crate) fn visit_block(&mut self, block: &Block) -> Result<(), CodegenError> {
        self.depth += 1;
        let result = self.generate_block_nodes(block);
        self.depth -= 1;
        result
    }

    fn generate_block_nodes(&mut self, block: &Block) -> Result<(), CodegenError> {
        for node in &block.nodes {
            self.generate_node(node)?;
        }
        Ok(())
    }

    /// Generates `switch` over a temp variable caching the scrutinee.
    fn generate_case(&mut self, case: &CaseNode) -> Result<(), CodegenError> {
        let name = self.getvar(Some(&case.expr));
        self.push(format!("switch({}){{\n", name));
        self.visit_block(&case.block)?;
        self.push("}\n");
        Ok(())
    }

    /// Generates a `case <label>:` (or `default:`) clause. A clause with a
    /// block always terminates with `break`.
    fn generate_when(&mut self, when: &WhenNode) -> Result<(), CodegenError> {
        if when.expr == "default" {
            self.push("default:\n");
        } else {
            self.push(format!("case {}:\n", when.expr));
        }
        if let Some(block) = &when.block {
            self.visit_block(block)?;
            self.push("break;\n");
        }
        Ok(())
    }

    /// Generates an iteration helper call:
    /// `ǃmap＿(<obj>, function(<val>, <key>) { ... }, function() { ... })`.
    ///
    /// The fragment is appended to the buffer as an expression statement
    /// and also returned, so it stays usable in expression position.
    pub fn generate_each(&mut self, each: &EachNode) -> Result<String, CodegenError> {
        let helper = self.get_and_add_helper(Helper::Map);

        let body = self.capture(|ctx| ctx.visit_block(&each.block))?;
        let mut src = format!(
            "{}({},function({},{}){{\n{}}}",
            helper, each.obj, each.val, each.key, body
        );

        if let Some(alternative) = &each.alternative {
            let alt = self.capture(|ctx| ctx.visit_block(alternative))?;
            src.push_str(&format!(",function(){{\n{}}}", alt));
        }

        src.push(')');
        self.push(format!("{};\n", src));
        Ok(src)
    }
}

#[cfg(test)]
mod tests {
    use sprig_core::{TextNode, WhenNode};

    use super::*;

    fn text(value: &str) -> TemplateNode {
        TemplateNode::Text(TextNode {
            value: value.into(),
        })
    }

    fn case_node(expr: &str, whens: Vec<TemplateNode>) -> TemplateNode {
        TemplateNode::Case(CaseNode {
            expr: expr.into(),
            block: Block { nodes: whens },
        })
    }

    fn when(expr: &str, nodes: Vec<TemplateNode>) -> TemplateNode {
        TemplateNode::When(WhenNode {
            expr: expr.into(),
            block: Some(Block { nodes }),
        })
    }

    #[test]
    fn it_generates_switch_over_a_tmpvar() {
        // case status
        //   when 1
        //     | one
        //   default
        //     | other
        let mut ctx = CodegenContext::new();
        ctx.generate_node(&case_node(
            "status",
            vec![
                when("1", vec![text("one")]),
                when("default", vec![text("other")]),
            ],
        ))
        .unwrap();

        assert_eq!(
            ctx.source(),
            "var ǃtmp0＿=status;\n\
             switch(ǃtmp0＿){\n\
             case 1:\nǃtext＿(\"one\");\nbreak;\n\
             default:\nǃtext＿(\"other\");\nbreak;\n\
             }\n"
        );
    }

    #[test]
    fn it_reuses_the_tmpvar_for_sibling_cases() {
        let mut ctx = CodegenContext::new();
        let root = TemplateNode::Block(Block {
            nodes: vec![case_node("a", vec![]), case_node("b", vec![])],
        });
        ctx.generate_node(&root).unwrap();

        // One declaration, one reassignment.
        assert_eq!(
            ctx.source(),
            "var ǃtmp1＿=a;\nswitch(ǃtmp1＿){\n}\nǃtmp1＿=b;\nswitch(ǃtmp1＿){\n}\n"
        );
    }

    #[test]
    fn it_generates_when_without_block_as_fallthrough() {
        let mut ctx = CodegenContext::new();
        ctx.generate_node(&case_node(
            "x",
            vec![
                TemplateNode::When(WhenNode {
                    expr: "1".into(),
                    block: None,
                }),
                when("2", vec![text("both")]),
            ],
        ))
        .unwrap();

        assert_eq!(
            ctx.source(),
            "var ǃtmp0＿=x;\nswitch(ǃtmp0＿){\ncase 1:\ncase 2:\nǃtext＿(\"both\");\nbreak;\n}\n"
        );
    }

    #[test]
    fn it_generates_each_with_compiled_block() {
        let mut ctx = CodegenContext::new();
        let each = EachNode {
            obj: "items".into(),
            val: "item".into(),
            key: "i".into(),
            block: Block {
                nodes: vec![text("row")],
            },
            alternative: None,
        };

        let src = ctx.generate_each(&each).unwrap();
        assert_eq!(src, "ǃmap＿(items,function(item,i){\nǃtext＿(\"row\");\n})");
        assert_eq!(ctx.source(), "ǃmap＿(items,function(item,i){\nǃtext＿(\"row\");\n});\n");
    }

    #[test]
    fn it_generates_each_with_alternative() {
        let mut ctx = CodegenContext::new();
        let each = EachNode {
            obj: "items".into(),
            val: "item".into(),
            key: "i".into(),
            block: Block {
                nodes: vec![text("row")],
            },
            alternative: Some(Block {
                nodes: vec![text("empty")],
            }),
        };

        let src = ctx.generate_each(&each).unwrap();
        assert_eq!(
            src,
            "ǃmap＿(items,function(item,i){\nǃtext＿(\"row\");\n},function(){\nǃtext＿(\"empty\");\n})"
        );
    }

    #[test]
    fn it_emits_the_iteration_helper_once_for_two_each_blocks() {
        let mut ctx = CodegenContext::new();
        let each = EachNode {
            obj: "xs".into(),
            val: "x".into(),
            key: "i".into(),
            block: Block::default(),
            alternative: None,
        };

        ctx.generate_each(&each).unwrap();
        ctx.generate_each(&each).unwrap();

        assert_eq!(ctx.helper_sources.len(), 1);
    }

    #[test]
    fn it_fails_fast_on_unsupported_constructs() {
        for node in [TemplateNode::Doctype, TemplateNode::Mixin, TemplateNode::Filter] {
            let mut ctx = CodegenContext::new();
            let err = ctx.generate_node(&node).unwrap_err();
            assert!(matches!(err, CodegenError::UnsupportedConstruct(_)));
            assert_eq!(ctx.source(), "");
        }
    }

    #[test]
    fn it_restores_depth_after_errors() {
        let mut ctx = CodegenContext::new();
        let root = TemplateNode::Block(Block {
            nodes: vec![text("ok"), TemplateNode::Doctype],
        });
        assert!(ctx.generate_node(&root).is_err());
        assert_eq!(ctx.depth, -1);
    }
}
