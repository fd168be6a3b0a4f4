//! The main public crate of the `sprig` project.
//!
//! `sprig` compiles a parsed markup-template tree into JavaScript for a
//! React-style rendering runtime. Compilation is a two-stage pipeline:
//! the generator first emits intermediate source where reserved sentinel
//! calls stand in for not-yet-resolved operations, then the rectifier
//! re-parses that source and rewrites every sentinel call site into the
//! runtime's calls. The result is serialized, optionally through a
//! restricted minification pass, and followed by the runtime helpers the
//! template referenced.
//!
//! ```
//! use sprig::{Block, CompileOptions, Compiler, TagNode, TemplateNode, TextNode};
//!
//! let tree = TemplateNode::Tag(TagNode {
//!     name: "p".into(),
//!     attrs: vec![],
//!     code: None,
//!     block: Block {
//!         nodes: vec![TemplateNode::Text(TextNode {
//!             value: "hello".into(),
//!         })],
//!     },
//! });
//!
//! let mut compiler = Compiler::new(tree);
//! let js = compiler.compile(&CompileOptions::default()).unwrap();
//! assert!(js.contains("React.createElement(\"p\""));
//! ```

mod errors;
mod minify;
mod parse;
mod serialize;

pub use errors::{CompileError, ParseError};
pub use minify::MinifyConfig;
pub use sprig_core::*;

use sprig_codegen::CodegenContext;
use swc_core::ecma::ast::Script;

/// Options of one `compile` call.
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    /// Print the minified AST with indentation instead of the plain
    /// pretty-printer output.
    pub beautify: bool,
    /// Restricted transform set used by the minification stage.
    pub minify: MinifyConfig,
}

/// One compilation of one template tree.
///
/// The pipeline stages are memoized per instance: `generate` and `rectify`
/// run at most once, minification is attempted once per `compile` call and
/// kept for subsequent calls. Separate compilations share no mutable
/// state.
pub struct Compiler {
    node: TemplateNode,
    buf: Option<String>,
    helpers: Vec<&'static str>,
    ast: Option<Script>,
    minified: Option<Script>,
}

impl Compiler {
    pub fn new(node: TemplateNode) -> Compiler {
        Compiler {
            node,
            buf: None,
            helpers: Vec::new(),
            ast: None,
            minified: None,
        }
    }

    /// Compiles the tree to final source text: the serialized main source
    /// followed by every referenced helper source, newline-joined.
    pub fn compile(&mut self, options: &CompileOptions) -> Result<String, CompileError> {
        self.rectify()?;
        self.minify(&options.minify);

        let ast = if options.beautify {
            self.minified.as_ref().or(self.ast.as_ref())
        } else {
            self.ast.as_ref()
        };
        let js = ast
            .map(|ast| serialize::stringify(ast, false))
            .unwrap_or_default();

        let mut out = Vec::with_capacity(1 + self.helpers.len());
        out.push(js);
        out.extend(self.helpers.iter().map(|helper| helper.to_string()));
        Ok(out.join("\n"))
    }

    /// Generates the intermediate source. A second call short-circuits.
    pub fn generate(&mut self) -> Result<(), CompileError> {
        if self.buf.is_some() {
            return Ok(());
        }

        let mut ctx = CodegenContext::new();
        ctx.generate_node(&self.node)?;

        let (buf, helpers) = ctx.into_parts();
        self.buf = Some(buf);
        self.helpers = helpers;
        Ok(())
    }

    /// Parses the intermediate source and rectifies the sentinel calls.
    /// A second call short-circuits.
    pub fn rectify(&mut self) -> Result<(), CompileError> {
        if self.ast.is_some() {
            return Ok(());
        }
        self.generate()?;

        let buf = self.buf.as_deref().unwrap_or_default();
        let script = parse::parse_script(buf)?;
        self.ast = Some(sprig_rectify::rectify(script)?);
        Ok(())
    }

    fn minify(&mut self, config: &MinifyConfig) {
        if self.minified.is_some() {
            return;
        }
        if let Some(ast) = &self.ast {
            self.minified = Some(minify::minify(ast, config));
        }
    }
}

/// Compiles `node` in one call with a throwaway [`Compiler`].
pub fn compile(node: TemplateNode, options: &CompileOptions) -> Result<String, CompileError> {
    Compiler::new(node).compile(options)
}

#[cfg(test)]
mod tests {
    use sprig_codegen::CodegenError;

    use super::*;

    fn text(value: &str) -> TemplateNode {
        TemplateNode::Text(TextNode {
            value: value.into(),
        })
    }

    fn tag(name: &str, attrs: Vec<Attribute>, children: Vec<TemplateNode>) -> TemplateNode {
        TemplateNode::Tag(TagNode {
            name: name.into(),
            attrs,
            code: None,
            block: Block { nodes: children },
        })
    }

    fn each(obj: &str, children: Vec<TemplateNode>) -> TemplateNode {
        TemplateNode::Each(EachNode {
            obj: obj.into(),
            val: "item".into(),
            key: "i".into(),
            block: Block { nodes: children },
            alternative: None,
        })
    }

    #[test]
    fn it_compiles_a_simple_tag() {
        let js = compile(
            tag("p", vec![], vec![text("hello")]),
            &CompileOptions::default(),
        )
        .unwrap();
        assert!(js.contains("React.createElement(\"p\", null, \"hello\")"));
    }

    #[test]
    fn it_compiles_attributes() {
        let js = compile(
            tag(
                "label",
                vec![
                    Attribute::new("for", "\"field\""),
                    Attribute::new("class", "[\"a\",\"b\"]"),
                ],
                vec![],
            ),
            &CompileOptions::default(),
        )
        .unwrap();
        assert!(js.contains("htmlFor"));
        assert!(js.contains("className"));
    }

    #[test]
    fn it_appends_the_iteration_helper_once_for_two_each_blocks() {
        let root = TemplateNode::Block(Block {
            nodes: vec![
                each("xs", vec![tag("li", vec![], vec![])]),
                each("ys", vec![tag("li", vec![], vec![])]),
            ],
        });

        let js = compile(root, &CompileOptions::default()).unwrap();
        assert_eq!(js.matches("function ǃmap＿").count(), 1);
        assert_eq!(js.matches("ǃmap＿(xs").count(), 1);
        assert_eq!(js.matches("ǃmap＿(ys").count(), 1);
    }

    #[test]
    fn it_reuses_one_tmpvar_for_sibling_cases() {
        let case = |expr: &str| {
            TemplateNode::Case(CaseNode {
                expr: expr.into(),
                block: Block {
                    nodes: vec![TemplateNode::When(WhenNode {
                        expr: "1".into(),
                        block: Some(Block {
                            nodes: vec![text("one")],
                        }),
                    })],
                },
            })
        };
        let root = TemplateNode::Block(Block {
            nodes: vec![case("a"), case("b")],
        });

        let js = compile(root, &CompileOptions::default()).unwrap();
        assert_eq!(js.matches("var ǃtmp").count(), 1);
        assert_eq!(js.matches("ǃtmp1＿ = b").count(), 1);
    }

    #[test]
    fn it_fails_on_doctype_before_any_output() {
        let mut compiler = Compiler::new(TemplateNode::Doctype);
        let err = compiler.compile(&CompileOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            CompileError::Codegen(CodegenError::UnsupportedConstruct("doctype"))
        ));
        assert!(compiler.buf.is_none());
    }

    #[test]
    fn it_memoizes_stages_across_compile_calls() {
        let mut compiler = Compiler::new(tag("p", vec![], vec![text("x")]));
        let first = compiler.compile(&CompileOptions::default()).unwrap();
        let second = compiler.compile(&CompileOptions::default()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn it_beautifies_with_hoisted_vars() {
        let case = TemplateNode::Case(CaseNode {
            expr: "status".into(),
            block: Block {
                nodes: vec![TemplateNode::When(WhenNode {
                    expr: "1".into(),
                    block: Some(Block {
                        nodes: vec![text("one")],
                    }),
                })],
            },
        });
        let root = TemplateNode::Block(Block { nodes: vec![case] });

        let mut compiler = Compiler::new(root);
        let plain = compiler
            .compile(&CompileOptions {
                beautify: false,
                minify: MinifyConfig::default(),
            })
            .unwrap();
        let beautified = compiler
            .compile(&CompileOptions {
                beautify: true,
                minify: MinifyConfig::default(),
            })
            .unwrap();

        // Same resolved calls either way; the hoisted form declares the
        // temp variable without an initializer.
        assert!(plain.contains("var ǃtmp1＿ = status"));
        assert!(beautified.contains("ǃtmp1＿ = status"));
        assert_eq!(
            plain.matches("ǃel＿.push").count(),
            beautified.matches("ǃel＿.push").count()
        );
    }

    #[test]
    fn it_compiles_mixin_blocks_to_conditional_invocations() {
        let js = compile(
            tag("div", vec![], vec![TemplateNode::MixinBlock]),
            &CompileOptions::default(),
        )
        .unwrap();
        assert!(js.contains("block ? block() : null"));
    }
}
