use regex::Regex;
use smallvec::SmallVec;
use sprig_core::{Attribute, Helper};
use swc_core::ecma::ast::{Expr, Lit};

use crate::context::CodegenContext;
use crate::error::CodegenError;
use crate::utils::{json_quote, parse_expr, stringify_expr, to_camelcase};

lazy_static! {
    /// Names that pass through the key normalization unchanged.
    static ref ARIA_DATA_RE: Regex = Regex::new(r"^(aria|data)-").unwrap();
}

type ClassList = SmallVec<[String; 4]>;

impl CodegenContext {
    /// Compiles a tag's attributes into one expression:
    ///
    /// - spread attributes present: every operand (a pre-compiled object
    ///   literal for the static attributes, then each spread expression)
    ///   is merged through the attribute-merge helper;
    /// - only static attributes: a plain object literal;
    /// - nothing: `null`.
    pub fn generate_attributes(&mut self, attrs: &[Attribute]) -> Result<String, CodegenError> {
        let named: Vec<&Attribute> = attrs.iter().filter(|it| !it.spread).collect();
        let spreads: Vec<&Attribute> = attrs.iter().filter(|it| it.spread).collect();

        if !spreads.is_empty() {
            let mut operands: Vec<String> = Vec::with_capacity(spreads.len() + 1);
            if !named.is_empty() {
                operands.push(self.compile_attrs_object(&named)?);
            }
            operands.extend(spreads.iter().map(|it| it.value.clone()));

            let helper = self.get_and_add_helper(Helper::Attrs);
            Ok(format!("{}({})", helper, operands.join(",")))
        } else if !named.is_empty() {
            self.compile_attrs_object(&named)
        } else {
            Ok("null".to_owned())
        }
    }

    /// Builds the object-literal source for static attributes, applying
    /// the key normalization rules: `class` values are collected into a
    /// separate class list, `for` becomes `htmlFor`, `aria-*`/`data-*`
    /// pass through, all other hyphenated names are camel-cased.
    fn compile_attrs_object(&self, attrs: &[&Attribute]) -> Result<String, CodegenError> {
        let mut classes = ClassList::new();
        let mut entries: Vec<String> = Vec::with_capacity(attrs.len());

        for attr in attrs {
            let key = match attr.name.as_str() {
                "class" => {
                    self.collect_classes(&attr.value, &mut classes)?;
                    continue;
                }
                "for" => "htmlFor".to_owned(),
                name if ARIA_DATA_RE.is_match(name) => name.to_owned(),
                name => to_camelcase(name),
            };

            entries.push(format!("{}:{}", json_quote(&key), attr.value));
        }

        if !classes.is_empty() {
            entries.push(format!("className:{}", classes.join(" + \" \" + ")));
        }

        Ok(format!("{{{}}}", entries.join(",")))
    }

    /// Accumulates one `class` attribute value. Array expressions are
    /// flattened into individual entries; `null` and empty-string literals
    /// are dropped; everything else is appended as-is.
    fn collect_classes(&self, value: &str, classes: &mut ClassList) -> Result<(), CodegenError> {
        let parsed = parse_expr(value).map_err(|_| CodegenError::BadExpression {
            source: value.to_owned(),
        })?;

        match *parsed {
            Expr::Array(array) => {
                for element in array.elems.into_iter().flatten() {
                    classes.push(stringify_expr(&element.expr));
                }
            }
            Expr::Lit(Lit::Null(_)) => {}
            Expr::Lit(Lit::Str(ref s)) if s.value.is_empty() => {}
            _ => classes.push(value.to_owned()),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(attrs: Vec<Attribute>) -> String {
        CodegenContext::new().generate_attributes(&attrs).unwrap()
    }

    #[test]
    fn it_compiles_no_attributes_to_null() {
        assert_eq!(compile(vec![]), "null");
    }

    #[test]
    fn it_compiles_class_array_and_id() {
        // {class: ["a", "b"], id: "x"} => className "a b", id "x"
        let out = compile(vec![
            Attribute::new("class", "[\"a\",\"b\"]"),
            Attribute::new("id", "\"x\""),
        ]);
        assert_eq!(out, "{\"id\":\"x\",className:\"a\" + \" \" + \"b\"}");
    }

    #[test]
    fn it_keeps_expression_classes() {
        let out = compile(vec![Attribute::new("class", "active ? 'on' : 'off'")]);
        assert_eq!(out, "{className:active ? 'on' : 'off'}");
    }

    #[test]
    fn it_drops_null_and_empty_classes() {
        assert_eq!(compile(vec![Attribute::new("class", "null")]), "{}");
        assert_eq!(compile(vec![Attribute::new("class", "\"\"")]), "{}");
    }

    #[test]
    fn it_renames_for_to_html_for() {
        let out = compile(vec![Attribute::new("for", "\"field\"")]);
        assert_eq!(out, "{\"htmlFor\":\"field\"}");
    }

    #[test]
    fn it_passes_aria_and_data_names_through() {
        let out = compile(vec![
            Attribute::new("data-foo", "1"),
            Attribute::new("aria-foo", "2"),
        ]);
        assert_eq!(out, "{\"data-foo\":1,\"aria-foo\":2}");
    }

    #[test]
    fn it_camelcases_other_hyphenated_names() {
        let out = compile(vec![Attribute::new("http-equiv", "\"refresh\"")]);
        assert_eq!(out, "{\"httpEquiv\":\"refresh\"}");
    }

    #[test]
    fn it_merges_spreads_through_the_helper() {
        let mut ctx = CodegenContext::new();
        let out = ctx
            .generate_attributes(&[
                Attribute::new("id", "\"x\""),
                Attribute::spread("props"),
                Attribute::spread("more"),
            ])
            .unwrap();

        assert_eq!(out, "ǃattrs＿({\"id\":\"x\"},props,more)");
        assert_eq!(ctx.helper_sources, vec![Helper::Attrs.source()]);
    }

    #[test]
    fn it_merges_spreads_without_static_attributes() {
        let mut ctx = CodegenContext::new();
        let out = ctx.generate_attributes(&[Attribute::spread("props")]).unwrap();
        assert_eq!(out, "ǃattrs＿(props)");
    }

    #[test]
    fn it_rejects_unparseable_class_values() {
        let mut ctx = CodegenContext::new();
        let err = ctx
            .generate_attributes(&[Attribute::new("class", "][")])
            .unwrap_err();
        assert!(matches!(err, CodegenError::BadExpression { .. }));
    }
}
