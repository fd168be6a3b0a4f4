use sprig_core::{BlockCommentNode, CommentNode};

use crate::context::CodegenContext;
use crate::error::CodegenError;

impl CodegenContext {
    /// Emits a line comment, but only when the comment is marked as
    /// output-visible.
    pub fn generate_comment(&mut self, comment: &CommentNode) {
        if comment.buffer {
            self.push(format!("//{}\n", comment.value));
        }
    }

    /// Emits the child block between block-comment delimiters.
    pub fn generate_block_comment(&mut self, comment: &BlockCommentNode) -> Result<(), CodegenError> {
        if !comment.buffer {
            return Ok(());
        }
        self.push(format!("/*{}\n", comment.value));
        self.visit_block(&comment.block)?;
        self.push("*/\n");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use sprig_core::{Block, TemplateNode, TextNode};

    use super::*;

    #[test]
    fn it_skips_unbuffered_comments() {
        let mut ctx = CodegenContext::new();
        ctx.generate_comment(&CommentNode {
            value: " internal".into(),
            buffer: false,
        });
        assert_eq!(ctx.source(), "");
    }

    #[test]
    fn it_emits_buffered_comments() {
        let mut ctx = CodegenContext::new();
        ctx.generate_comment(&CommentNode {
            value: " visible".into(),
            buffer: true,
        });
        assert_eq!(ctx.source(), "// visible\n");
    }

    #[test]
    fn it_wraps_block_comments_around_their_children() {
        let mut ctx = CodegenContext::new();
        ctx.generate_block_comment(&BlockCommentNode {
            value: " begin".into(),
            buffer: true,
            block: Block {
                nodes: vec![TemplateNode::Text(TextNode {
                    value: "inside".into(),
                })],
            },
        })
        .unwrap();

        assert_eq!(ctx.source(), "/* begin\nǃtext＿(\"inside\");\n*/\n");
    }

    #[test]
    fn it_skips_unbuffered_block_comments() {
        let mut ctx = CodegenContext::new();
        ctx.generate_block_comment(&BlockCommentNode {
            value: " hidden".into(),
            buffer: false,
            block: Block::default(),
        })
        .unwrap();
        assert_eq!(ctx.source(), "");
    }
}
