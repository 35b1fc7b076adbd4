//! Inline script scanning
//!
//! Album pages carry their image list as an object literal assigned to a
//! variable named `images` somewhere in an inline `<script>`. The script is
//! parsed as JavaScript, the declarator is located in the syntax tree, and the
//! source text covered by its initializer, minus any enclosing parentheses,
//! is decoded as JSON.

use oxc_allocator::Allocator;
use oxc_ast::Visit;
use oxc_ast::ast::{BindingPatternKind, VariableDeclarator};
use oxc_ast::visit::walk;
use oxc_parser::Parser;
use oxc_span::{GetSpan, SourceType, Span};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Name of the variable holding the album manifest
pub const MANIFEST_VARIABLE: &str = "images";

/// Scan one script block for the manifest declaration
///
/// Returns `Ok(None)` when the script declares no `images` variable, or when
/// its initializer decodes to something other than a JSON object. Returns
/// [`Error::ScriptParse`] when the script is not valid JavaScript or the
/// initializer is not valid JSON. If several declarations match, the last one
/// in source order wins.
pub fn scan_script(source: &str) -> Result<Option<Map<String, Value>>> {
    let allocator = Allocator::default();
    let parsed = Parser::new(&allocator, source, SourceType::cjs()).parse();

    if parsed.panicked || !parsed.errors.is_empty() {
        let message = parsed
            .errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        return Err(Error::ScriptParse(if message.is_empty() {
            "parser gave up".to_string()
        } else {
            message
        }));
    }

    let mut finder = DeclarationFinder::new(MANIFEST_VARIABLE);
    finder.visit_program(&parsed.program);

    let Some(span) = finder.initializer else {
        return Ok(None);
    };
    let text = source
        .get(span.start as usize..span.end as usize)
        .ok_or_else(|| {
            Error::ScriptParse(format!(
                "initializer range {}..{} is outside the script",
                span.start, span.end
            ))
        })?;

    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(object)) => Ok(Some(object)),
        Ok(_) => Ok(None),
        Err(e) => Err(Error::ScriptParse(format!(
            "`{MANIFEST_VARIABLE}` initializer is not JSON: {e}"
        ))),
    }
}

/// Like [`scan_script`], with failures folded into "nothing found"
pub fn extract_images(source: &str) -> Option<Map<String, Value>> {
    scan_script(source).ok().flatten()
}

/// Records the initializer span of every declarator binding `name`
struct DeclarationFinder<'n> {
    name: &'n str,
    initializer: Option<Span>,
}

impl<'n> DeclarationFinder<'n> {
    fn new(name: &'n str) -> Self {
        Self {
            name,
            initializer: None,
        }
    }
}

impl<'a> Visit<'a> for DeclarationFinder<'_> {
    fn visit_variable_declarator(&mut self, declarator: &VariableDeclarator<'a>) {
        if let BindingPatternKind::BindingIdentifier(ident) = &declarator.id.kind
            && ident.name.as_str() == self.name
            && let Some(init) = &declarator.init
        {
            self.initializer = Some(init.without_parentheses().span());
        }
        walk::walk_variable_declarator(self, declarator);
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const TWO_IMAGES: &str = r#"var images = {"count":2,"images":[{"hash":"abc","ext":".jpg","size":100},{"hash":"def","ext":".png","size":200}]};"#;

    #[test]
    fn finds_top_level_declaration() {
        let object = scan_script(TWO_IMAGES).unwrap().unwrap();

        assert_eq!(object["count"], json!(2));
        let images = object["images"].as_array().unwrap();
        assert_eq!(images.len(), 2);
        assert_eq!(images[0]["hash"], "abc");
        assert_eq!(images[0]["ext"], ".jpg");
        assert_eq!(images[0]["size"], 100);
        assert_eq!(images[1]["hash"], "def");
        assert_eq!(images[1]["ext"], ".png");
        assert_eq!(images[1]["size"], 200);
    }

    #[test]
    fn finds_declaration_among_other_code() {
        let script = r#"
            window.runSlots = { _: 1 };
            var album = "héllo wörld";
            (function () {
                var widgetFactory = { mergeConfig: function (a, b) { return a; } };
                var images      = {"count":1,"images":[{"hash":"zz","ext":".gif","size":5}],"album_layout":"b"};
                widgetFactory.mergeConfig('gallery', { images: images });
            })();
        "#;

        let object = scan_script(script).unwrap().unwrap();
        assert_eq!(object["count"], json!(1));
        assert_eq!(object["album_layout"], "b");
    }

    #[test]
    fn handles_multiple_declarators() {
        let script = r#"var a = 1, images = {"count":0,"images":[]}, b = 2;"#;
        let object = scan_script(script).unwrap().unwrap();
        assert_eq!(object["count"], json!(0));
    }

    #[test]
    fn last_declaration_wins() {
        let script = r#"
            var images = {"count":0,"images":[]};
            let images2 = {"count":9};
            images = null;
            var images = {"count":1,"images":[{"hash":"x","ext":".jpg","size":1}]};
        "#;
        let object = scan_script(script).unwrap().unwrap();
        assert_eq!(object["count"], json!(1));
    }

    #[test]
    fn missing_declaration_is_none() {
        assert_eq!(scan_script("var album = {\"count\": 1};").unwrap(), None);
        assert_eq!(scan_script("").unwrap(), None);
        assert_eq!(scan_script("var images;").unwrap(), None);
        assert_eq!(extract_images("console.log(images);"), None);
    }

    #[test]
    fn parenthesized_initializer_is_unwrapped() {
        let object = scan_script(r#"var images = ({"count":0,"images":[]});"#)
            .unwrap()
            .unwrap();
        assert_eq!(object["count"], json!(0));

        let object = scan_script(r#"var images = (({"count":1}));"#).unwrap().unwrap();
        assert_eq!(object["count"], json!(1));
    }

    #[test]
    fn non_object_initializer_is_none() {
        assert_eq!(scan_script("var images = [1, 2, 3];").unwrap(), None);
        assert_eq!(scan_script("var images = \"none\";").unwrap(), None);
    }

    #[test]
    fn invalid_syntax_is_a_parse_error() {
        let script = "var images = {\"count\": 1,, ;";
        assert!(matches!(scan_script(script), Err(Error::ScriptParse(_))));
        assert_eq!(extract_images(script), None);
    }

    #[test]
    fn javascript_only_literal_is_a_parse_error() {
        let script = "var images = {count: 1, images: [], built: Date.now()};";
        match scan_script(script) {
            Err(Error::ScriptParse(message)) => assert!(message.contains("not JSON")),
            other => panic!("expected ScriptParse, got {other:?}"),
        }
        assert_eq!(extract_images(script), None);
    }
}
