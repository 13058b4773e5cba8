//! Version tag extraction from Python sources built on Tree-sitter.
//!
//! Only plain assignments count (`__version__ = "1.0"`, also chained
//! `a = __version__ = "1.0"`). Annotated and augmented assignments are not
//! version declarations. The first assignment to the tag in document order
//! decides the result: when its value is not a string literal the file has
//! no version, even if a later assignment would have one.

use std::path::Path;

use tree_sitter::{Language, Node, Parser};

use crate::safe_io::read_text;

/// Extracts the string assigned to a version tag identifier.
pub struct VersionExtractor {
    /// Python language handle for Tree-sitter.
    language: Language,
    /// Identifier to look for, e.g. `__version__`.
    version_tag: String,
}

impl VersionExtractor {
    pub fn new(version_tag: &str) -> Self {
        Self {
            language: tree_sitter_python::LANGUAGE.into(),
            version_tag: version_tag.to_string(),
        }
    }

    /// Read `file_path` and extract the version.
    ///
    /// Unreadable or non-UTF-8 files yield `None`.
    pub fn extract_from_file(&self, file_path: &Path) -> Option<String> {
        let content = read_text(file_path).ok()?;
        self.extract_from_source(&content)
    }

    /// Extract the version from Python source text.
    ///
    /// Sources with syntax errors yield `None`.
    pub fn extract_from_source(&self, content: &str) -> Option<String> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);

        let mut parser = Parser::new();
        parser.set_language(&self.language).ok()?;
        let tree = parser.parse(content, None)?;
        let node_root = tree.root_node();
        if node_root.has_error() {
            return None;
        }
        let bytes = content.as_bytes();

        // Pre-order walk == document order.
        let mut cursor = node_root.walk();
        loop {
            let node = cursor.node();
            if node.kind() == "assignment"
                && let Some(version) = self.match_assignment(node, bytes)
            {
                return version;
            }

            if cursor.goto_first_child() {
                continue;
            }
            loop {
                if cursor.goto_next_sibling() {
                    break;
                }
                if !cursor.goto_parent() {
                    return None;
                }
            }
        }
    }

    /// `Some(value)` when `node` assigns to the tag, `None` otherwise.
    fn match_assignment(&self, node: Node<'_>, bytes: &[u8]) -> Option<Option<String>> {
        let mut b_targets_tag = false;
        let mut node_current = node;
        loop {
            // `x: T = v` is an annotation, not a plain assignment.
            if node_current.child_by_field_name("type").is_some() {
                return None;
            }
            let node_left = node_current.child_by_field_name("left")?;
            if node_left.kind() == "identifier"
                && node_left.utf8_text(bytes).ok() == Some(self.version_tag.as_str())
            {
                b_targets_tag = true;
            }

            let node_right = node_current.child_by_field_name("right")?;
            if node_right.kind() == "assignment" {
                node_current = node_right;
                continue;
            }
            if !b_targets_tag {
                return None;
            }
            return Some(eval_string_literal(node_right, bytes));
        }
    }
}

/// Convenience wrapper around [`VersionExtractor::extract_from_file`].
pub fn extract_version_from_file(file_path: &Path, version_tag: &str) -> Option<String> {
    VersionExtractor::new(version_tag).extract_from_file(file_path)
}

////////////////////////////////////////////////////////////////////////////////
// #region StringLiterals

/// Value of a `str` literal expression; `None` for anything else
/// (numbers, names, calls, bytes, f-strings).
fn eval_string_literal(node: Node<'_>, bytes: &[u8]) -> Option<String> {
    match node.kind() {
        "string" => decode_string_token(node.utf8_text(bytes).ok()?),
        "concatenated_string" => {
            let mut cursor = node.walk();
            let mut out = String::new();
            for node_part in node.named_children(&mut cursor) {
                if node_part.kind() == "comment" {
                    continue;
                }
                if node_part.kind() != "string" {
                    return None;
                }
                out.push_str(&decode_string_token(node_part.utf8_text(bytes).ok()?)?);
            }
            Some(out)
        }
        "parenthesized_expression" => {
            let mut cursor = node.walk();
            let node_inner = node
                .named_children(&mut cursor)
                .find(|n| n.kind() != "comment")?;
            eval_string_literal(node_inner, bytes)
        }
        _ => None,
    }
}

/// Decode one Python string token including prefix and quotes.
fn decode_string_token(token: &str) -> Option<String> {
    let n_prefix = token.find(['\'', '"'])?;
    let prefix = token[..n_prefix].to_ascii_lowercase();
    if prefix.contains('b') || prefix.contains('f') || prefix.contains('t') {
        return None;
    }

    let quoted = &token[n_prefix..];
    let n_quote = if quoted.starts_with("\"\"\"") || quoted.starts_with("'''") {
        3
    } else {
        1
    };
    if quoted.len() < 2 * n_quote {
        return None;
    }
    let body = &quoted[n_quote..quoted.len() - n_quote];

    if prefix.contains('r') {
        Some(body.to_string())
    } else {
        Some(unescape_python(body))
    }
}

/// Resolve Python backslash escapes; unknown escapes are kept verbatim.
fn unescape_python(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut iter_chars = body.chars().peekable();

    while let Some(ch) = iter_chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        let Some(ch_escape) = iter_chars.next() else {
            out.push('\\');
            break;
        };
        match ch_escape {
            '\n' => {}
            '\r' => {
                if iter_chars.peek() == Some(&'\n') {
                    iter_chars.next();
                }
            }
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            'a' => out.push('\u{07}'),
            'b' => out.push('\u{08}'),
            'f' => out.push('\u{0c}'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'v' => out.push('\u{0b}'),
            '0'..='7' => {
                let mut n_code = ch_escape.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match iter_chars.peek().and_then(|c| c.to_digit(8)) {
                        Some(n_digit) => {
                            n_code = n_code * 8 + n_digit;
                            iter_chars.next();
                        }
                        None => break,
                    }
                }
                out.extend(char::from_u32(n_code));
            }
            'x' | 'u' | 'U' => {
                let n_digits = match ch_escape {
                    'x' => 2,
                    'u' => 4,
                    _ => 8,
                };
                let hex = iter_chars.clone().take(n_digits).collect::<String>();
                match (hex.len() == n_digits)
                    .then(|| u32::from_str_radix(&hex, 16).ok())
                    .flatten()
                    .and_then(char::from_u32)
                {
                    Some(ch_decoded) => {
                        out.push(ch_decoded);
                        for _ in 0..n_digits {
                            iter_chars.next();
                        }
                    }
                    None => {
                        out.push('\\');
                        out.push(ch_escape);
                    }
                }
            }
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }
    out
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::{VersionExtractor, extract_version_from_file};

    fn extract(content: &str) -> Option<String> {
        VersionExtractor::new("__version__").extract_from_source(content)
    }

    #[test]
    fn extracts_single_and_double_quoted_versions() {
        assert_eq!(extract("__version__ = \"1.2.3\"\n"), Some("1.2.3".into()));
        assert_eq!(extract("__version__ = '1.0.0'\n"), Some("1.0.0".into()));
        assert_eq!(extract("__version__   =   '1.0.0'   \n"), Some("1.0.0".into()));
    }

    #[test]
    fn extracts_custom_tag() {
        let extractor = VersionExtractor::new("VERSION");
        assert_eq!(
            extractor.extract_from_source("__version__ = '1'\nVERSION = '2.0'\n"),
            Some("2.0".into())
        );
    }

    #[test]
    fn skips_other_assignments() {
        let src = "\nx = \"not_version\"\n__version__ = \"1.5.0\"\ny = \"also_not_version\"\n";
        assert_eq!(extract(src), Some("1.5.0".into()));
        assert_eq!(extract("# No version here\n"), None);
        assert_eq!(extract(""), None);
    }

    #[test]
    fn non_string_value_yields_none() {
        assert_eq!(extract("__version__ = 123\n"), None);
        assert_eq!(extract("__version__ = get_version()\n"), None);
        assert_eq!(extract("__version__ = b'1.0'\n"), None);
        assert_eq!(extract("v = '1'\n__version__ = f'{v}.0'\n"), None);
    }

    #[test]
    fn first_assignment_decides_even_when_not_a_string() {
        assert_eq!(extract("__version__ = 1\n__version__ = '2.0'\n"), None);
        assert_eq!(extract("__version__ = '1.0'\n__version__ = '2.0'\n"), Some("1.0".into()));
    }

    #[test]
    fn annotated_assignment_is_not_a_declaration() {
        assert_eq!(
            extract("__version__: str = '1.0'\n__version__ = '2.0'\n"),
            Some("2.0".into())
        );
    }

    #[test]
    fn finds_nested_and_chained_assignments() {
        let src = "import sys\nif sys.version_info > (3,):\n    __version__ = '3.1'\n";
        assert_eq!(extract(src), Some("3.1".into()));
        assert_eq!(extract("VERSION = __version__ = '0.9'\n"), Some("0.9".into()));
    }

    #[test]
    fn decodes_literal_forms() {
        assert_eq!(extract("__version__ = \"\"\"1.0\"\"\"\n"), Some("1.0".into()));
        assert_eq!(extract("__version__ = r'1\\.0'\n"), Some("1\\.0".into()));
        assert_eq!(extract("__version__ = '1.0' '-beta'\n"), Some("1.0-beta".into()));
        assert_eq!(extract("__version__ = ('2.0')\n"), Some("2.0".into()));
        assert_eq!(extract("__version__ = 'caf\\xe9\\t1'\n"), Some("café\t1".into()));
        assert_eq!(extract("__version__ = u'1.0'\n"), Some("1.0".into()));
    }

    #[test]
    fn syntax_error_yields_none() {
        assert_eq!(extract("this is not valid python !!!\n"), None);
        assert_eq!(extract("__version__ = '1.0'\ndef broken(:\n"), None);
    }

    #[test]
    fn file_level_extraction() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("__init__.py");
        fs::write(&path, "# -*- coding: utf-8 -*-\n__version__ = \"1.0.0\"\n").expect("write");
        assert_eq!(
            extract_version_from_file(&path, "__version__"),
            Some("1.0.0".into())
        );

        let path_bom = tmp.path().join("bom.py");
        fs::write(&path_bom, "\u{feff}__version__ = '4.0'\n").expect("write");
        assert_eq!(
            extract_version_from_file(&path_bom, "__version__"),
            Some("4.0".into())
        );

        assert_eq!(
            extract_version_from_file(&tmp.path().join("missing.py"), "__version__"),
            None
        );

        let path_latin1 = tmp.path().join("latin1.py");
        fs::write(&path_latin1, b"__version__ = '1.0' # caf\xe9\n").expect("write");
        assert_eq!(extract_version_from_file(&path_latin1, "__version__"), None);
    }
}
