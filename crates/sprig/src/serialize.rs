use swc_core::common::SourceMap;
use swc_ecma_codegen::{text_writer::JsWriter, Emitter, Node};

/// Serializes an AST node to source text.
pub fn stringify(item: &impl Node, minify: bool) -> String {
    // Emitting the result requires some setup with SWC
    let cm: swc_core::common::sync::Lrc<SourceMap> = Default::default();
    let mut buff: Vec<u8> = Vec::new();
    let writer: JsWriter<&mut Vec<u8>> = JsWriter::new(cm.clone(), "\n", &mut buff, None);

    let mut emitter_cfg = swc_ecma_codegen::Config::default();
    emitter_cfg.minify = minify;

    let mut emitter = Emitter {
        cfg: emitter_cfg,
        comments: None,
        wr: writer,
        cm,
    };

    let _ = item.emit_with(&mut emitter);

    String::from_utf8(buff).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use crate::parse::parse_script;

    use super::*;

    #[test]
    fn it_prints_compact_source() {
        let script = parse_script("foo( 1 , 2 );\n").unwrap();
        assert_eq!(stringify(&script, true), "foo(1,2);");
    }

    #[test]
    fn it_prints_readable_source() {
        let script = parse_script("foo(1);bar(2);").unwrap();
        let out = stringify(&script, false);
        assert!(out.contains("foo(1);"));
        assert!(out.contains("bar(2);"));
    }
}
