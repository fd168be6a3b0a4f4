use sprig_core::{is_sentinel, Helper, CHILDREN, DOM, TEXT, UNESCAPE};
use swc_core::{
    common::DUMMY_SP,
    ecma::{
        ast::{
            ArrayLit, BindingIdent, BlockStmt, CallExpr, Callee, Decl, Expr, ExprOrSpread,
            ExprStmt, FnExpr, Function, Ident, KeyValueProp, Lit, MemberExpr, MemberProp,
            ObjectLit, ParenExpr, Pat, Prop, PropName, PropOrSpread, ReturnStmt, Script, Stmt,
            Str, VarDecl, VarDeclKind, VarDeclarator,
        },
        atoms::JsWord,
    },
};

use crate::error::RectifyError;

const RUNTIME: &str = "React";
const CREATE_ELEMENT: &str = "createElement";
const RAW_WRAPPER_TAG: &str = "span";
const RAW_HTML_PROP: &str = "dangerouslySetInnerHTML";
const RAW_HTML_KEY: &str = "__html";

/// A statement after rectification: either a child expression (an element,
/// a text value, an iteration result) or a structural statement that only
/// shapes control flow around children.
enum Rectified {
    Child(Box<Expr>),
    Plain(Stmt),
}

pub fn rectify_script(mut script: Script) -> Result<Script, RectifyError> {
    let parts = rectify_stmts(std::mem::take(&mut script.body))?;

    script.body = if parts.iter().all(is_child) {
        parts
            .into_iter()
            .map(|part| match part {
                Rectified::Child(expr) => Stmt::Expr(ExprStmt {
                    span: DUMMY_SP,
                    expr,
                }),
                Rectified::Plain(stmt) => stmt,
            })
            .collect()
    } else {
        // Structural statements in child position force the accumulator
        // wrapper so their nested children are not lost.
        vec![Stmt::Expr(ExprStmt {
            span: DUMMY_SP,
            expr: Box::new(iife(parts)),
        })]
    };

    Ok(script)
}

fn is_child(part: &Rectified) -> bool {
    matches!(part, Rectified::Child(_))
}

/// Rectifies one statement list. Element sentinels consume the block
/// statement that follows them; nested statement lists inside structural
/// statements are rewritten in accumulator-push form.
fn rectify_stmts(stmts: Vec<Stmt>) -> Result<Vec<Rectified>, RectifyError> {
    let mut out = Vec::with_capacity(stmts.len());
    let mut iter = stmts.into_iter().peekable();

    while let Some(stmt) = iter.next() {
        let expr_stmt = match stmt {
            Stmt::Expr(expr_stmt) => expr_stmt,
            other => {
                out.push(Rectified::Plain(rewrite_structural(other)?));
                continue;
            }
        };

        match classify(*expr_stmt.expr)? {
            Classified::Dom(call) => {
                if !matches!(iter.peek(), Some(Stmt::Block(_))) {
                    return Err(RectifyError::MissingElementBlock);
                }
                let Some(Stmt::Block(block)) = iter.next() else {
                    return Err(RectifyError::MissingElementBlock);
                };
                out.push(Rectified::Child(Box::new(create_element(call, block)?)));
            }
            Classified::Child(expr) => out.push(Rectified::Child(expr)),
            Classified::Plain(expr) => out.push(Rectified::Plain(Stmt::Expr(ExprStmt {
                span: expr_stmt.span,
                expr,
            }))),
        }
    }

    Ok(out)
}

enum Classified {
    Dom(CallExpr),
    Child(Box<Expr>),
    Plain(Box<Expr>),
}

enum SentinelKind {
    Dom,
    Text,
    Unescape,
    Map,
    Other,
}

fn sentinel_kind(call: &CallExpr) -> SentinelKind {
    let Callee::Expr(callee) = &call.callee else {
        return SentinelKind::Other;
    };
    let Expr::Ident(ident) = callee.as_ref() else {
        return SentinelKind::Other;
    };

    let sym: &str = &ident.sym;
    if !is_sentinel(sym) {
        return SentinelKind::Other;
    }

    if sym == DOM {
        SentinelKind::Dom
    } else if sym == TEXT {
        SentinelKind::Text
    } else if sym == UNESCAPE {
        SentinelKind::Unescape
    } else if sym == Helper::Map.as_str() {
        SentinelKind::Map
    } else {
        SentinelKind::Other
    }
}

fn classify(expr: Expr) -> Result<Classified, RectifyError> {
    match expr {
        Expr::Call(call) => match sentinel_kind(&call) {
            SentinelKind::Dom => Ok(Classified::Dom(call)),
            SentinelKind::Text => Ok(Classified::Child(single_arg(call, TEXT)?)),
            SentinelKind::Unescape => {
                let arg = single_arg(call, UNESCAPE)?;
                Ok(Classified::Child(Box::new(raw_html_element(arg))))
            }
            SentinelKind::Map => Ok(Classified::Child(Box::new(Expr::Call(rectify_map_call(
                call,
            )?)))),
            SentinelKind::Other => Ok(Classified::Plain(Box::new(Expr::Call(call)))),
        },

        // `block ? block() : null` and friends already are child values.
        Expr::Cond(cond) => Ok(Classified::Child(Box::new(Expr::Cond(cond)))),

        other => Ok(Classified::Plain(Box::new(other))),
    }
}

fn single_arg(mut call: CallExpr, sentinel: &'static str) -> Result<Box<Expr>, RectifyError> {
    if call.args.len() != 1 || call.args[0].spread.is_some() {
        return Err(RectifyError::BadArity {
            sentinel,
            found: call.args.len(),
        });
    }
    Ok(call.args.remove(0).expr)
}

/// `ǃDOM＿(tag, attrs);` + `{ ...children }` becomes
/// `React.createElement(tag', attrs, ...children)`.
///
/// A lowercase identifier is a DOM tag and becomes a string literal; any
/// other tag expression (a component reference, an already-quoted name)
/// is kept as-is.
fn create_element(mut call: CallExpr, block: BlockStmt) -> Result<Expr, RectifyError> {
    if call.args.len() != 2 || call.args.iter().any(|arg| arg.spread.is_some()) {
        return Err(RectifyError::BadArity {
            sentinel: DOM,
            found: call.args.len(),
        });
    }

    let attrs = call.args.pop();
    let tag = call.args.pop();
    let (Some(attrs), Some(tag)) = (attrs, tag) else {
        return Err(RectifyError::BadArity {
            sentinel: DOM,
            found: 0,
        });
    };

    let children = children_exprs(rectify_stmts(block.stmts)?);

    let mut args = Vec::with_capacity(2 + children.len());
    args.push(ExprOrSpread {
        spread: None,
        expr: rectify_tag_name(tag.expr),
    });
    args.push(ExprOrSpread {
        spread: None,
        expr: attrs.expr,
    });
    for child in children {
        args.push(ExprOrSpread {
            spread: None,
            expr: child,
        });
    }

    Ok(Expr::Call(CallExpr {
        span: call.span,
        ctxt: Default::default(),
        callee: runtime_callee(),
        args,
        type_args: None,
    }))
}

fn rectify_tag_name(tag: Box<Expr>) -> Box<Expr> {
    match *tag {
        Expr::Ident(ident)
            if ident
                .sym
                .chars()
                .next()
                .map_or(false, |ch| ch.is_ascii_lowercase()) =>
        {
            Box::new(Expr::Lit(Lit::Str(Str {
                span: ident.span,
                value: ident.sym,
                raw: None,
            })))
        }
        other => Box::new(other),
    }
}

/// Rewrites the inline function bodies of an iteration-helper call so the
/// rectified children become each function's return value. The helper call
/// itself is kept: its definition is emitted alongside the output.
fn rectify_map_call(mut call: CallExpr) -> Result<CallExpr, RectifyError> {
    if call.args.len() < 2 || call.args.len() > 3 {
        return Err(RectifyError::BadArity {
            sentinel: Helper::Map.as_str(),
            found: call.args.len(),
        });
    }

    for arg in call.args.iter_mut().skip(1) {
        if let Expr::Fn(fn_expr) = arg.expr.as_mut() {
            if let Some(body) = fn_expr.function.body.as_mut() {
                let parts = rectify_stmts(std::mem::take(&mut body.stmts))?;
                body.stmts = return_children(parts);
            }
        }
    }

    Ok(call)
}

/// Collapses rectified statements into child expressions: either the
/// children directly, or a single accumulator wrapper when structural
/// statements are interleaved.
fn children_exprs(parts: Vec<Rectified>) -> Vec<Box<Expr>> {
    if parts.iter().all(is_child) {
        parts
            .into_iter()
            .filter_map(|part| match part {
                Rectified::Child(expr) => Some(expr),
                Rectified::Plain(_) => None,
            })
            .collect()
    } else {
        vec![Box::new(iife(parts))]
    }
}

/// Function-body form of [`children_exprs`]: children become the return
/// value.
fn return_children(parts: Vec<Rectified>) -> Vec<Stmt> {
    if parts.iter().all(is_child) {
        let mut exprs: Vec<Box<Expr>> = parts
            .into_iter()
            .filter_map(|part| match part {
                Rectified::Child(expr) => Some(expr),
                Rectified::Plain(_) => None,
            })
            .collect();

        match exprs.len() {
            0 => Vec::new(),
            1 => vec![return_stmt(exprs.remove(0))],
            _ => vec![return_stmt(Box::new(array_expr(exprs)))],
        }
    } else {
        accumulator_body(parts)
    }
}

/// `var ǃel＿ = []; ...; return ǃel＿;` with every child pushed onto the
/// accumulator in order.
fn accumulator_body(parts: Vec<Rectified>) -> Vec<Stmt> {
    let mut stmts = Vec::with_capacity(parts.len() + 2);

    // var ǃel＿ = [];
    stmts.push(Stmt::Decl(Decl::Var(Box::new(VarDecl {
        span: DUMMY_SP,
        ctxt: Default::default(),
        kind: VarDeclKind::Var,
        declare: false,
        decls: vec![VarDeclarator {
            span: DUMMY_SP,
            name: Pat::Ident(BindingIdent {
                id: ident(CHILDREN),
                type_ann: None,
            }),
            init: Some(Box::new(array_expr(Vec::new()))),
            definite: false,
        }],
    }))));

    for part in parts {
        match part {
            Rectified::Child(expr) => stmts.push(push_stmt(expr)),
            Rectified::Plain(stmt) => stmts.push(stmt),
        }
    }

    stmts.push(return_stmt(Box::new(Expr::Ident(ident(CHILDREN)))));
    stmts
}

/// Rewrites the statement lists nested inside a structural statement so
/// children found there are pushed onto the nearest accumulator.
fn rewrite_structural(stmt: Stmt) -> Result<Stmt, RectifyError> {
    match stmt {
        Stmt::Block(mut block) => {
            block.stmts = pushed_stmts(block.stmts)?;
            Ok(Stmt::Block(block))
        }
        Stmt::If(mut if_stmt) => {
            if_stmt.cons = rewrite_nested(if_stmt.cons)?;
            if_stmt.alt = match if_stmt.alt {
                Some(alt) => Some(rewrite_nested(alt)?),
                None => None,
            };
            Ok(Stmt::If(if_stmt))
        }
        Stmt::Switch(mut switch) => {
            for case in switch.cases.iter_mut() {
                case.cons = pushed_stmts(std::mem::take(&mut case.cons))?;
            }
            Ok(Stmt::Switch(switch))
        }
        Stmt::While(mut while_stmt) => {
            while_stmt.body = rewrite_nested(while_stmt.body)?;
            Ok(Stmt::While(while_stmt))
        }
        Stmt::DoWhile(mut do_while) => {
            do_while.body = rewrite_nested(do_while.body)?;
            Ok(Stmt::DoWhile(do_while))
        }
        Stmt::For(mut for_stmt) => {
            for_stmt.body = rewrite_nested(for_stmt.body)?;
            Ok(Stmt::For(for_stmt))
        }
        Stmt::ForIn(mut for_in) => {
            for_in.body = rewrite_nested(for_in.body)?;
            Ok(Stmt::ForIn(for_in))
        }
        Stmt::ForOf(mut for_of) => {
            for_of.body = rewrite_nested(for_of.body)?;
            Ok(Stmt::ForOf(for_of))
        }
        other => Ok(other),
    }
}

fn pushed_stmts(stmts: Vec<Stmt>) -> Result<Vec<Stmt>, RectifyError> {
    Ok(rectify_stmts(stmts)?
        .into_iter()
        .map(|part| match part {
            Rectified::Child(expr) => push_stmt(expr),
            Rectified::Plain(stmt) => stmt,
        })
        .collect())
}

fn rewrite_nested(body: Box<Stmt>) -> Result<Box<Stmt>, RectifyError> {
    let mut stmts = pushed_stmts(vec![*body])?;
    if stmts.len() == 1 {
        Ok(Box::new(stmts.remove(0)))
    } else {
        Ok(Box::new(Stmt::Block(BlockStmt {
            span: DUMMY_SP,
            ctxt: Default::default(),
            stmts,
        })))
    }
}

/// `(function () { var ǃel＿ = []; ...; return ǃel＿; })()`
fn iife(parts: Vec<Rectified>) -> Expr {
    Expr::Call(CallExpr {
        span: DUMMY_SP,
        ctxt: Default::default(),
        callee: Callee::Expr(Box::new(Expr::Paren(ParenExpr {
            span: DUMMY_SP,
            expr: Box::new(Expr::Fn(FnExpr {
                ident: None,
                function: Box::new(Function {
                    params: vec![],
                    decorators: vec![],
                    span: DUMMY_SP,
                    ctxt: Default::default(),
                    body: Some(BlockStmt {
                        span: DUMMY_SP,
                        ctxt: Default::default(),
                        stmts: accumulator_body(parts),
                    }),
                    is_generator: false,
                    is_async: false,
                    type_params: None,
                    return_type: None,
                }),
            })),
        }))),
        args: vec![],
        type_args: None,
    })
}

/// `React.createElement("span", { dangerouslySetInnerHTML: { __html: expr } })`
fn raw_html_element(expr: Box<Expr>) -> Expr {
    let inner = ObjectLit {
        span: DUMMY_SP,
        props: vec![PropOrSpread::Prop(Box::new(Prop::KeyValue(KeyValueProp {
            key: PropName::Ident(ident(RAW_HTML_KEY).into()),
            value: expr,
        })))],
    };
    let attrs = ObjectLit {
        span: DUMMY_SP,
        props: vec![PropOrSpread::Prop(Box::new(Prop::KeyValue(KeyValueProp {
            key: PropName::Ident(ident(RAW_HTML_PROP).into()),
            value: Box::new(Expr::Object(inner)),
        })))],
    };

    Expr::Call(CallExpr {
        span: DUMMY_SP,
        ctxt: Default::default(),
        callee: runtime_callee(),
        args: vec![
            ExprOrSpread {
                spread: None,
                expr: Box::new(Expr::Lit(Lit::Str(Str {
                    span: DUMMY_SP,
                    value: JsWord::from(RAW_WRAPPER_TAG),
                    raw: None,
                }))),
            },
            ExprOrSpread {
                spread: None,
                expr: Box::new(Expr::Object(attrs)),
            },
        ],
        type_args: None,
    })
}

fn runtime_callee() -> Callee {
    Callee::Expr(Box::new(Expr::Member(MemberExpr {
        span: DUMMY_SP,
        obj: Box::new(Expr::Ident(ident(RUNTIME))),
        prop: MemberProp::Ident(ident(CREATE_ELEMENT).into()),
    })))
}

/// `ǃel＿.push(expr);`
fn push_stmt(expr: Box<Expr>) -> Stmt {
    Stmt::Expr(ExprStmt {
        span: DUMMY_SP,
        expr: Box::new(Expr::Call(CallExpr {
            span: DUMMY_SP,
            ctxt: Default::default(),
            callee: Callee::Expr(Box::new(Expr::Member(MemberExpr {
                span: DUMMY_SP,
                obj: Box::new(Expr::Ident(ident(CHILDREN))),
                prop: MemberProp::Ident(ident("push").into()),
            }))),
            args: vec![ExprOrSpread { spread: None, expr }],
            type_args: None,
        })),
    })
}

fn return_stmt(arg: Box<Expr>) -> Stmt {
    Stmt::Return(ReturnStmt {
        span: DUMMY_SP,
        arg: Some(arg),
    })
}

fn array_expr(elems: Vec<Box<Expr>>) -> Expr {
    Expr::Array(ArrayLit {
        span: DUMMY_SP,
        elems: elems
            .into_iter()
            .map(|expr| Some(ExprOrSpread { spread: None, expr }))
            .collect(),
    })
}

fn ident(sym: &str) -> Ident {
    Ident {
        span: DUMMY_SP,
        sym: JsWord::from(sym),
        optional: false,
    }
}

#[cfg(test)]
mod tests {
    use crate::test_utils::{parse, to_str};

    use super::*;

    fn run(src: &str) -> String {
        let script = parse(src);
        let rectified = rectify_script(script).unwrap();
        to_str(rectified)
    }

    #[test]
    fn it_rectifies_a_simple_element() {
        let out = run("ǃDOM＿(div,null);\n{\nǃtext＿(\"hi\");\n}\n");
        assert_eq!(out, "React.createElement(\"div\",null,\"hi\");");
    }

    #[test]
    fn it_rectifies_nested_elements() {
        let out = run(concat!(
            "ǃDOM＿(ul,null);\n{\n",
            "ǃDOM＿(li,null);\n{\nǃtext＿(\"one\");\n}\n",
            "ǃDOM＿(li,null);\n{\nǃtext＿(\"two\");\n}\n",
            "}\n",
        ));
        assert_eq!(
            out,
            "React.createElement(\"ul\",null,\
             React.createElement(\"li\",null,\"one\"),\
             React.createElement(\"li\",null,\"two\"));"
        );
    }

    #[test]
    fn it_keeps_component_references_as_identifiers() {
        let out = run("ǃDOM＿(Widget,{\"id\":1});\n{\n}\n");
        assert_eq!(out, "React.createElement(Widget,{\"id\":1});");
    }

    #[test]
    fn it_wraps_raw_output_in_a_dangerous_span() {
        let out = run("ǃunescape＿(html);\n");
        assert_eq!(
            out,
            "React.createElement(\"span\",{dangerouslySetInnerHTML:{__html:html}});"
        );
    }

    #[test]
    fn it_keeps_attribute_merge_calls() {
        let out = run("ǃDOM＿(div,ǃattrs＿({\"id\":1},props));\n{\n}\n");
        assert_eq!(
            out,
            "React.createElement(\"div\",ǃattrs＿({\"id\":1},props));"
        );
    }

    #[test]
    fn it_accumulates_children_around_structural_statements() {
        let out = run(concat!(
            "ǃDOM＿(div,null);\n{\n",
            "var ǃtmp2＿=status;\n",
            "switch(ǃtmp2＿){\n",
            "case 1:\nǃtext＿(\"one\");\nbreak;\n",
            "default:\nǃtext＿(\"other\");\nbreak;\n",
            "}\n",
            "}\n",
        ));

        // The switch forces the accumulator wrapper; each case pushes its
        // children onto it.
        assert!(out.starts_with("React.createElement(\"div\",null,(function(){"));
        assert!(out.contains("var ǃel＿=[]"));
        assert!(out.contains("ǃel＿.push(\"one\")"));
        assert!(out.contains("ǃel＿.push(\"other\")"));
        assert!(out.contains("return ǃel＿"));
    }

    #[test]
    fn it_rewrites_map_callbacks_to_return_children() {
        let out = run(concat!(
            "ǃmap＿(items,function(item,i){\n",
            "ǃDOM＿(li,null);\n{\nǃtext＿(item);\n}\n",
            "});\n",
        ));
        assert!(out.starts_with("ǃmap＿(items,function(item,i){return React.createElement(\"li\",null,item)"));
        assert!(out.ends_with("});"));
    }

    #[test]
    fn it_returns_child_arrays_from_map_callbacks() {
        let out = run(concat!(
            "ǃmap＿(items,function(item,i){\n",
            "ǃtext＿(item);\nǃtext＿(\",\");\n",
            "});\n",
        ));
        assert!(out.starts_with("ǃmap＿(items,function(item,i){return"));
        assert!(out.contains("[item,\",\"]"));
    }

    #[test]
    fn it_keeps_conditional_children() {
        let out = run("ǃDOM＿(div,null);\n{\nblock ? block() : null;\n}\n");
        assert_eq!(
            out,
            "React.createElement(\"div\",null,block?block():null);"
        );
    }

    #[test]
    fn it_rejects_an_element_without_a_block() {
        let script = parse("ǃDOM＿(div,null);\n");
        let err = rectify_script(script).unwrap_err();
        assert!(matches!(err, RectifyError::MissingElementBlock));
    }

    #[test]
    fn it_rejects_wrong_sentinel_arity() {
        let script = parse("ǃtext＿(a,b);\n");
        let err = rectify_script(script).unwrap_err();
        assert!(matches!(err, RectifyError::BadArity { .. }));
    }

    #[test]
    fn it_rectifies_children_inside_if_statements() {
        let out = run(concat!(
            "ǃDOM＿(div,null);\n{\n",
            "if (show)\n{\nǃtext＿(\"yes\");\n}\n",
            "}\n",
        ));
        assert!(out.contains("if(show)"));
        assert!(out.contains("ǃel＿.push(\"yes\")"));
    }
}
