use sprig_core::{TagNode, DOM};

use crate::context::CodegenContext;
use crate::error::CodegenError;
use crate::utils::{is_js_ident, json_quote};

impl CodegenContext {
    /// Generates an element-construction sentinel call followed by a
    /// lexical block holding the tag's children:
    ///
    /// ```js
    /// ǃDOM＿(div, {"id":x});
    /// {
    ///   /* attached code, children */
    /// }
    /// ```
    pub fn generate_tag(&mut self, tag: &TagNode) -> Result<(), CodegenError> {
        let attrs = self.generate_attributes(&tag.attrs)?;

        // Valid identifiers stay bare so the rectifier can tell DOM tags
        // and component references apart; anything else is quoted.
        let name = if is_js_ident(&tag.name) {
            tag.name.clone()
        } else {
            json_quote(&tag.name)
        };

        self.push(format!("{}({},{});\n{{\n", DOM, name, attrs));

        if let Some(code) = &tag.code {
            self.generate_code(code)?;
        }
        self.visit_block(&tag.block)?;

        self.push("}\n");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use sprig_core::{Attribute, Block, CodeNode, TemplateNode, TextNode};

    use super::*;

    fn tag(name: &str, attrs: Vec<Attribute>, children: Vec<TemplateNode>) -> TagNode {
        TagNode {
            name: name.into(),
            attrs,
            code: None,
            block: Block { nodes: children },
        }
    }

    #[test]
    fn it_generates_attrless_childless_tags() {
        let mut ctx = CodegenContext::new();
        ctx.generate_tag(&tag("br", vec![], vec![])).unwrap();
        assert_eq!(ctx.source(), "ǃDOM＿(br,null);\n{\n}\n");
    }

    #[test]
    fn it_generates_tag_with_attributes_and_children() {
        // span(id=key) hello
        let mut ctx = CodegenContext::new();
        ctx.generate_tag(&tag(
            "span",
            vec![Attribute::new("id", "key")],
            vec![TemplateNode::Text(TextNode {
                value: "hello".into(),
            })],
        ))
        .unwrap();

        assert_eq!(
            ctx.source(),
            "ǃDOM＿(span,{\"id\":key});\n{\nǃtext＿(\"hello\");\n}\n"
        );
    }

    #[test]
    fn it_quotes_non_identifier_tag_names() {
        let mut ctx = CodegenContext::new();
        ctx.generate_tag(&tag("my-widget", vec![], vec![])).unwrap();
        assert_eq!(ctx.source(), "ǃDOM＿(\"my-widget\",null);\n{\n}\n");
    }

    #[test]
    fn it_emits_attached_code_before_children() {
        // p= user.name
        let mut ctx = CodegenContext::new();
        ctx.generate_tag(&TagNode {
            name: "p".into(),
            attrs: vec![],
            code: Some(CodeNode {
                value: "user.name".into(),
                buffer: true,
                escape: true,
                block: None,
            }),
            block: Block::default(),
        })
        .unwrap();

        assert_eq!(
            ctx.source(),
            "ǃDOM＿(p,null);\n{\nǃtext＿(user.name);\n}\n"
        );
    }
}
