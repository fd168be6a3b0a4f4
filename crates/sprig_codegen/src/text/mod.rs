use sprig_core::{CodeNode, LiteralNode, TextNode, TEXT, UNESCAPE};

use crate::context::CodegenContext;
use crate::error::CodegenError;
use crate::interpolation::interpolate;

impl CodegenContext {
    /// Scans the text payload for interpolations and emits one statement
    /// per resulting segment.
    pub fn generate_text(&mut self, text: &TextNode) -> Result<(), CodegenError> {
        for segment in interpolate(&text.value)? {
            self.push(format!("{};\n", segment.to_source()));
        }
        Ok(())
    }

    /// Emits embedded code. Output-producing code becomes an emission
    /// sentinel call; plain code is emitted verbatim. An attached block is
    /// wrapped in braces only for non-buffered code — buffered code is a
    /// single expression, not a control construct.
    pub fn generate_code(&mut self, code: &CodeNode) -> Result<(), CodegenError> {
        if code.buffer {
            if code.escape {
                self.push(format!("{}({});\n", TEXT, code.value));
            } else {
                self.push(format!("{}({});\n", UNESCAPE, code.value));
            }
        } else {
            self.push(format!("{}\n", code.value));
        }

        if let Some(block) = &code.block {
            if !code.buffer {
                self.push("{\n");
            }
            self.visit_block(block)?;
            if !code.buffer {
                self.push("}\n");
            }
        }
        Ok(())
    }

    /// Emits raw source verbatim.
    pub fn generate_literal(&mut self, literal: &LiteralNode) {
        self.push(format!("{}\n", literal.text));
    }

    /// Emits a conditional invocation of the implicit `block` reference.
    pub fn generate_mixin_block(&mut self) {
        self.push("block ? block() : null;\n");
    }
}

#[cfg(test)]
mod tests {
    use sprig_core::{Block, TemplateNode};

    use super::*;

    #[test]
    fn it_emits_one_statement_per_segment() {
        let mut ctx = CodegenContext::new();
        ctx.generate_text(&TextNode {
            value: "a #{1+1} b".into(),
        })
        .unwrap();

        assert_eq!(
            ctx.source(),
            "ǃtext＿(\"a \");\nǃtext＿(1+1);\nǃtext＿(\" b\");\n"
        );
    }

    #[test]
    fn it_emits_escaped_buffered_code() {
        let mut ctx = CodegenContext::new();
        ctx.generate_code(&CodeNode {
            value: "user.name".into(),
            buffer: true,
            escape: true,
            block: None,
        })
        .unwrap();
        assert_eq!(ctx.source(), "ǃtext＿(user.name);\n");
    }

    #[test]
    fn it_emits_raw_buffered_code() {
        let mut ctx = CodegenContext::new();
        ctx.generate_code(&CodeNode {
            value: "html".into(),
            buffer: true,
            escape: false,
            block: None,
        })
        .unwrap();
        assert_eq!(ctx.source(), "ǃunescape＿(html);\n");
    }

    #[test]
    fn it_braces_blocks_of_unbuffered_code() {
        // if (list.length)
        //   | some
        let mut ctx = CodegenContext::new();
        ctx.generate_code(&CodeNode {
            value: "if (list.length)".into(),
            buffer: false,
            escape: false,
            block: Some(Block {
                nodes: vec![TemplateNode::Text(TextNode {
                    value: "some".into(),
                })],
            }),
        })
        .unwrap();

        assert_eq!(
            ctx.source(),
            "if (list.length)\n{\nǃtext＿(\"some\");\n}\n"
        );
    }

    #[test]
    fn it_does_not_brace_blocks_of_buffered_code() {
        let mut ctx = CodegenContext::new();
        ctx.generate_code(&CodeNode {
            value: "title".into(),
            buffer: true,
            escape: true,
            block: Some(Block {
                nodes: vec![TemplateNode::Text(TextNode {
                    value: "sub".into(),
                })],
            }),
        })
        .unwrap();

        assert_eq!(ctx.source(), "ǃtext＿(title);\nǃtext＿(\"sub\");\n");
    }

    #[test]
    fn it_emits_mixin_block_invocation() {
        let mut ctx = CodegenContext::new();
        ctx.generate_mixin_block();
        assert_eq!(ctx.source(), "block ? block() : null;\n");
    }
}
