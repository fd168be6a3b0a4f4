use swc_core::common::BytePos;
use swc_core::ecma::ast::Script;
use swc_ecma_parser::{lexer::Lexer, Parser, StringInput, Syntax};

use crate::errors::ParseError;

/// Parses intermediate source into a script AST.
pub fn parse_script(raw: &str) -> Result<Script, ParseError> {
    let lexer = Lexer::new(
        // We want to parse ecmascript
        Syntax::Es(Default::default()),
        // EsVersion defaults to es5
        Default::default(),
        StringInput::new(raw, BytePos(0), BytePos(raw.len() as u32)),
        None,
    );

    let mut parser = Parser::new_from(lexer);
    parser.parse_script().map_err(ParseError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_parses_sentinel_identifiers() {
        let script = parse_script("ǃDOM＿(div,null);\n{\nǃtext＿(\"hi\");\n}\n").unwrap();
        assert_eq!(script.body.len(), 2);
    }

    #[test]
    fn it_reports_syntax_errors() {
        assert!(parse_script("function (").is_err());
    }
}
