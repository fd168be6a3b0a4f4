use crate::SprigAtom;
use flagset::{flags, FlagSet};
use strum_macros::{AsRefStr, IntoStaticStr};

/// Call sentinel for element construction: `ǃDOM＿(tag, attrs)`.
pub const DOM: &str = "ǃDOM＿";
/// Call sentinel for escaped text output: `ǃtext＿(expr)`.
pub const TEXT: &str = "ǃtext＿";
/// Call sentinel for raw (unescaped) output: `ǃunescape＿(expr)`.
pub const UNESCAPE: &str = "ǃunescape＿";
/// Prefix of depth-scoped temp variables: `ǃtmp0＿`, `ǃtmp1＿`, ...
pub const TMP_PREFIX: &str = "ǃtmp";
/// Child accumulator used by the rectifier inside wrapper functions.
pub const CHILDREN: &str = "ǃel＿";

/// Common suffix of every sentinel identifier.
pub const SUFFIX: char = '＿';

/// Sentinel identifiers live in a reserved lexical namespace: they start
/// with `ǃ` (U+01C3) and end with `＿` (U+FF3F). Both are valid ECMAScript
/// identifier characters, but neither can appear in an identifier written
/// by the template author, so a later pass can always tell sentinels and
/// user code apart.
pub fn is_sentinel(ident: &str) -> bool {
    ident.starts_with('ǃ') && ident.ends_with(SUFFIX)
}

flags! {
    /// Runtime helpers referenced by generated code. Each helper's source
    /// is appended to the compiled output at most once.
    #[derive(AsRefStr, IntoStaticStr)]
    pub enum Helper: u8 {
        #[strum(serialize = "ǃmap＿")]
        Map,
        #[strum(serialize = "ǃattrs＿")]
        Attrs,
    }
}

impl Helper {
    #[inline]
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    #[inline]
    pub fn as_atom(self) -> SprigAtom {
        self.as_str().into()
    }

    /// Fixed JavaScript source of the helper, emitted alongside the
    /// compiled template.
    pub fn source(self) -> &'static str {
        match self {
            Helper::Map => MAP_SOURCE,
            Helper::Attrs => ATTRS_SOURCE,
        }
    }
}

pub type HelperSet = FlagSet<Helper>;

/// Iteration helper. Array-likes are mapped by index; other objects are
/// iterated over their enumerable keys. The optional third argument is
/// invoked instead when key iteration produced nothing.
const MAP_SOURCE: &str = r#"function ǃmap＿(obj, each, alt) {
  if (typeof obj.length === "number") return [].map.call(obj, each);
  var result = [], key;
  for (key in obj) result.push(each(obj[key], key));
  return !alt || result.length ? result : alt();
}"#;

/// Attribute-merge helper. Applies the same key normalization as the
/// static attribute compiler, at evaluation time.
const ATTRS_SOURCE: &str = r#"function ǃattrs＿() {
  var merged = {};
  var classes = [];
  [].slice.call(arguments).forEach(function (it) {
    for (var key in it) {
      var val = it[key];
      if (key === "class" || key === "className") {
        if (Array.isArray(val)) classes = classes.concat(val);
        else if (val != null && val !== "") classes.push(val);
        continue;
      }
      if (key === "for") {
        merged.htmlFor = val;
        continue;
      }
      if (/^data-/.test(key)) {
        if (val == null) continue;
        merged[key] = typeof val === "string" ? val : JSON.stringify(val);
        continue;
      }
      if (/^aria-/.test(key)) {
        merged[key] = val;
        continue;
      }
      var parts = key.split("-");
      merged[parts[0] + parts.slice(1).map(function (p) {
        return p.charAt(0).toUpperCase() + p.substr(1);
      }).join("")] = val;
    }
  });
  if (classes.length) merged.className = classes.join(" ");
  return merged;
}"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_maps_helpers_to_sentinel_names() {
        assert_eq!(Helper::Map.as_str(), "ǃmap＿");
        assert_eq!(Helper::Attrs.as_str(), "ǃattrs＿");
    }

    #[test]
    fn it_recognizes_sentinels() {
        assert!(is_sentinel(DOM));
        assert!(is_sentinel(TEXT));
        assert!(is_sentinel(UNESCAPE));
        assert!(is_sentinel(CHILDREN));
        assert!(is_sentinel("ǃtmp0＿"));
        assert!(!is_sentinel("tmp0"));
        assert!(!is_sentinel("block"));
    }

    #[test]
    fn helper_sources_define_their_own_names() {
        assert!(Helper::Map.source().starts_with("function ǃmap＿"));
        assert!(Helper::Attrs.source().starts_with("function ǃattrs＿"));
    }
}
