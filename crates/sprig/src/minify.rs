use swc_core::ecma::{
    ast::{
        AssignExpr, AssignOp, Decl, EmptyStmt, Expr, ExprStmt, Function, Ident, Pat, PatOrExpr,
        Script, SeqExpr, Stmt, VarDecl, VarDeclKind, VarDeclarator,
    },
    visit::{VisitMut, VisitMutWith},
};

/// Restricted transform set used for output compaction.
///
/// Rectified code may carry side effects in any call position, so only
/// transforms that cannot alter control flow, eliminate side effects or
/// reorder evaluation are representable here. The value is immutable and
/// injected per compilation; runs never share mutable configuration.
#[derive(Debug, Clone)]
pub struct MinifyConfig {
    /// Hoist `var` declarations to the top of their function (or script),
    /// leaving initializers in place as assignments.
    pub hoist_vars: bool,
}

impl Default for MinifyConfig {
    fn default() -> MinifyConfig {
        MinifyConfig { hoist_vars: true }
    }
}

/// Applies the restricted minification pass to a copy of `script`.
pub fn minify(script: &Script, config: &MinifyConfig) -> Script {
    let mut minified = script.clone();
    if config.hoist_vars {
        minified.visit_mut_with(&mut Hoister);
    }
    minified
}

struct Hoister;

impl VisitMut for Hoister {
    fn visit_mut_script(&mut self, script: &mut Script) {
        // Inner functions first, then this scope.
        script.visit_mut_children_with(self);
        hoist_stmts(&mut script.body);
    }

    fn visit_mut_function(&mut self, function: &mut Function) {
        function.visit_mut_children_with(self);
        if let Some(body) = function.body.as_mut() {
            hoist_stmts(&mut body.stmts);
        }
    }
}

/// Hoists every `var` declaration in statement position (not crossing
/// function boundaries) to one declaration list at the top of the scope.
fn hoist_stmts(stmts: &mut Vec<Stmt>) {
    let mut names: Vec<Ident> = Vec::new();
    for stmt in stmts.iter_mut() {
        hoist_in_stmt(stmt, &mut names);
    }

    if names.is_empty() {
        return;
    }

    names.dedup_by(|a, b| a.sym == b.sym);

    let decls = names
        .into_iter()
        .map(|id| VarDeclarator {
            span: id.span,
            name: Pat::Ident(id.into()),
            init: None,
            definite: false,
        })
        .collect();

    stmts.insert(
        0,
        Stmt::Decl(Decl::Var(Box::new(VarDecl {
            span: swc_core::common::DUMMY_SP,
            kind: VarDeclKind::Var,
            declare: false,
            decls,
        }))),
    );
}

fn hoist_in_stmt(stmt: &mut Stmt, names: &mut Vec<Ident>) {
    match stmt {
        Stmt::Decl(Decl::Var(var_decl)) if var_decl.kind == VarDeclKind::Var => {
            // Destructuring declarations stay where they are.
            let all_plain = var_decl
                .decls
                .iter()
                .all(|decl| matches!(decl.name, Pat::Ident(_)));
            if !all_plain {
                return;
            }

            let span = var_decl.span;
            let mut assigns: Vec<Box<Expr>> = Vec::new();

            for declarator in var_decl.decls.drain(..) {
                let Pat::Ident(binding) = declarator.name else {
                    continue;
                };
                names.push(binding.id.clone());

                if let Some(init) = declarator.init {
                    assigns.push(Box::new(Expr::Assign(AssignExpr {
                        span: declarator.span,
                        op: AssignOp::Assign,
                        left: PatOrExpr::Pat(Box::new(Pat::Ident(binding))),
                        right: init,
                    })));
                }
            }

            *stmt = match assigns.len() {
                0 => Stmt::Empty(EmptyStmt { span }),
                1 => Stmt::Expr(ExprStmt {
                    span,
                    expr: assigns.remove(0),
                }),
                _ => Stmt::Expr(ExprStmt {
                    span,
                    expr: Box::new(Expr::Seq(SeqExpr {
                        span,
                        exprs: assigns,
                    })),
                }),
            };
        }

        Stmt::Block(block) => {
            for stmt in block.stmts.iter_mut() {
                hoist_in_stmt(stmt, names);
            }
        }
        Stmt::If(if_stmt) => {
            hoist_in_stmt(&mut if_stmt.cons, names);
            if let Some(alt) = if_stmt.alt.as_mut() {
                hoist_in_stmt(alt, names);
            }
        }
        Stmt::Switch(switch) => {
            for case in switch.cases.iter_mut() {
                for stmt in case.cons.iter_mut() {
                    hoist_in_stmt(stmt, names);
                }
            }
        }
        Stmt::While(while_stmt) => hoist_in_stmt(&mut while_stmt.body, names),
        Stmt::DoWhile(do_while) => hoist_in_stmt(&mut do_while.body, names),
        Stmt::For(for_stmt) => hoist_in_stmt(&mut for_stmt.body, names),
        Stmt::ForIn(for_in) => hoist_in_stmt(&mut for_in.body, names),
        Stmt::ForOf(for_of) => hoist_in_stmt(&mut for_of.body, names),
        Stmt::Labeled(labeled) => hoist_in_stmt(&mut labeled.body, names),

        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use crate::parse::parse_script;
    use crate::serialize::stringify;

    use super::*;

    fn run(src: &str) -> String {
        let script = parse_script(src).unwrap();
        stringify(&minify(&script, &MinifyConfig::default()), true)
    }

    #[test]
    fn it_hoists_var_declarations() {
        let out = run("a();\nvar x = 1;\nb(x);\nvar y = 2;\n");
        assert!(out.starts_with("var x,y;"));
        assert!(out.contains("x=1"));
        assert!(out.contains("y=2"));
        assert!(!out.contains("var x=1"));
        assert!(!out.contains("var y=2"));
    }

    #[test]
    fn it_hoists_from_nested_blocks() {
        let out = run("if (c) { var x = 1; use(x); }\n");
        assert!(out.starts_with("var x;"));
        assert!(out.contains("if(c)"));
        assert!(out.contains("x=1"));
    }

    #[test]
    fn it_hoists_per_function_scope() {
        let out = run("function f() { var x = 1; return x; }\nvar y = 2;\n");
        // `x` stays inside `f`, `y` moves to the top of the script.
        assert!(out.starts_with("var y;"));
        assert!(out.contains("function f(){var x;"));
    }

    #[test]
    fn it_keeps_evaluation_order() {
        let out = run("var x = a();\nvar y = b();\n");
        let a = out.find("x=a()").unwrap();
        let b = out.find("y=b()").unwrap();
        assert!(a < b);
    }

    #[test]
    fn it_can_be_disabled() {
        let script = parse_script("var x = 1;\n").unwrap();
        let config = MinifyConfig { hoist_vars: false };
        assert_eq!(stringify(&minify(&script, &config), true), "var x=1;");
    }
}
