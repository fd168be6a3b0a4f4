/// A TemplateNode is one node of the parsed template document tree.
/// The tree is produced by an external template parser; this workspace
/// only consumes it.
///
/// ### `Tag`
/// A markup element with a name, attributes, an optional piece of
/// attached inline code (`p= user.name`) and a child block.
///
/// ### `Text`
/// A text leaf. The payload may contain `#{...}` and `!{...}`
/// interpolation markers which are resolved by the generator.
///
/// ### `Code`
/// A line of embedded script. `buffer` marks output-producing code,
/// `escape` selects escaped vs. raw output for buffered code.
///
/// ### `Case` / `When`
/// A `case` construct over a scrutinee expression with `when` clauses;
/// a `When` whose expression is `"default"` is the default clause.
///
/// ### `Each`
/// Iteration over a collection, with an optional alternative block for
/// the empty-collection case.
///
/// ### `Doctype`, `Mixin`, `Filter`
/// Permanently unsupported constructs. Visiting one of these aborts the
/// compilation.
#[derive(Debug, Clone)]
pub enum TemplateNode {
    Tag(TagNode),
    Text(TextNode),
    Code(CodeNode),
    Case(CaseNode),
    When(WhenNode),
    Block(Block),
    MixinBlock,
    Comment(CommentNode),
    BlockComment(BlockCommentNode),
    Literal(LiteralNode),
    Each(EachNode),
    Doctype,
    Mixin,
    Filter,
}

/// An ordered sequence of child nodes.
#[derive(Debug, Clone, Default)]
pub struct Block {
    pub nodes: Vec<TemplateNode>,
}

#[derive(Debug, Clone)]
pub struct TagNode {
    pub name: String,
    pub attrs: Vec<Attribute>,
    /// Inline code attached to the tag, e.g. `p= user.name`.
    pub code: Option<CodeNode>,
    pub block: Block,
}

#[derive(Debug, Clone)]
pub struct TextNode {
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct CodeNode {
    /// Raw expression or statement source.
    pub value: String,
    /// `true` when the code produces output (`=` / `!=` forms).
    pub buffer: bool,
    /// `true` when buffered output must be escaped (`=` form).
    pub escape: bool,
    pub block: Option<Block>,
}

#[derive(Debug, Clone)]
pub struct CaseNode {
    /// Scrutinee expression, evaluated once into a temp variable.
    pub expr: String,
    pub block: Block,
}

#[derive(Debug, Clone)]
pub struct WhenNode {
    /// Case label expression, or `"default"` for the default clause.
    pub expr: String,
    pub block: Option<Block>,
}

#[derive(Debug, Clone)]
pub struct CommentNode {
    pub value: String,
    /// Only buffered comments appear in the output.
    pub buffer: bool,
}

#[derive(Debug, Clone)]
pub struct BlockCommentNode {
    pub value: String,
    pub buffer: bool,
    pub block: Block,
}

#[derive(Debug, Clone)]
pub struct LiteralNode {
    /// Emitted verbatim as raw source.
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct EachNode {
    /// Collection expression being iterated.
    pub obj: String,
    /// Name bound to each value.
    pub val: String,
    /// Name bound to each key / index.
    pub key: String,
    pub block: Block,
    /// Rendered instead of the block when the collection is empty.
    pub alternative: Option<Block>,
}

/// A single attribute of a [`TagNode`].
///
/// When `spread` is set, `value` is an arbitrary expression whose keys are
/// merged wholesale at runtime and `name` is unused; otherwise `name`/`value`
/// form one named attribute.
#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: String,
    /// Raw expression source of the attribute value.
    pub value: String,
    pub spread: bool,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Attribute {
        Attribute {
            name: name.into(),
            value: value.into(),
            spread: false,
        }
    }

    pub fn spread(value: impl Into<String>) -> Attribute {
        Attribute {
            name: String::new(),
            value: value.into(),
            spread: true,
        }
    }
}
