use swc_core::common::sync::Lrc;
use swc_core::common::{BytePos, SourceMap};
use swc_core::ecma::ast::Expr;
use swc_ecma_codegen::{text_writer::JsWriter, Emitter, Node};
use swc_ecma_parser::{lexer::Lexer, Parser, StringInput, Syntax};

/// `JSON.stringify` for a string: quotes and escapes `text`.
pub fn json_quote(text: &str) -> String {
    serde_json::to_string(text).unwrap()
}

/// Camel-cases a hyphenated name: the first segment is kept as-is,
/// subsequent segments are upper-cased at their first character.
pub fn to_camelcase(s: &str) -> String {
    let mut buf = String::with_capacity(s.len());
    for (idx, word) in s.split('-').enumerate() {
        if idx == 0 {
            buf.push_str(word);
            continue;
        }

        let first_char = word.chars().next();
        if let Some(ch) = first_char {
            for ch_component in ch.to_uppercase() {
                buf.push(ch_component);
            }
            buf.push_str(&word[ch.len_utf8()..]);
        }
    }
    buf
}

/// Whether `name` can be emitted as a bare ECMAScript identifier.
pub fn is_js_ident(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(ch) if ch.is_ascii_alphabetic() || ch == '_' || ch == '$' => {}
        _ => return false,
    }
    chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '$')
}

pub fn parse_expr(raw: &str) -> Result<Box<Expr>, swc_ecma_parser::error::Error> {
    let lexer = Lexer::new(
        // We want to parse ecmascript
        Syntax::Es(Default::default()),
        // EsVersion defaults to es5
        Default::default(),
        StringInput::new(raw, BytePos(0), BytePos(raw.len() as u32)),
        None,
    );

    let mut parser = Parser::new_from(lexer);
    parser.parse_expr()
}

/// Prints an expression back to compact source text.
pub fn stringify_expr(expr: &Expr) -> String {
    let cm: Lrc<SourceMap> = Default::default();
    let mut buff: Vec<u8> = Vec::with_capacity(128);
    let writer: JsWriter<&mut Vec<u8>> = JsWriter::new(cm.clone(), "\n", &mut buff, None);

    let mut emitter_cfg = swc_ecma_codegen::Config::default();
    emitter_cfg.minify = true;

    let mut emitter = Emitter {
        cfg: emitter_cfg,
        comments: None,
        wr: writer,
        cm,
    };

    let _ = expr.emit_with(&mut emitter);

    String::from_utf8(buff).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_camelcases_hyphenated_names() {
        assert_eq!(to_camelcase("http-equiv"), "httpEquiv");
        assert_eq!(to_camelcase("accept-charset"), "acceptCharset");
        assert_eq!(to_camelcase("a-b-c"), "aBC");
        assert_eq!(to_camelcase("plain"), "plain");
    }

    #[test]
    fn it_quotes_json_strings() {
        assert_eq!(json_quote("a b"), "\"a b\"");
        assert_eq!(json_quote("say \"hi\""), "\"say \\\"hi\\\"\"");
    }

    #[test]
    fn it_detects_js_identifiers() {
        assert!(is_js_ident("div"));
        assert!(is_js_ident("MyWidget"));
        assert!(is_js_ident("$el"));
        assert!(!is_js_ident("my-tag"));
        assert!(!is_js_ident("2fast"));
        assert!(!is_js_ident(""));
    }

    #[test]
    fn it_round_trips_expressions() {
        let expr = parse_expr("a + \"x\"").unwrap();
        assert_eq!(stringify_expr(&expr), "a+\"x\"");
    }
}
