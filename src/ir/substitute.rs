//! Flat `{{ name }}` substitution for target templates.
//!
//! Each reference is replaced by its value from the scope exactly once.
//! Replacement text is never scanned again, so values containing braces are
//! emitted verbatim and expansion cannot recurse. An opening `{{` without a
//! closing `}}` is kept as literal text. Ninja's own `$var` syntax is left
//! untouched.

use std::collections::BTreeMap;

use super::GraphError;

/// Variable bindings visible to a template.
pub type Scope = BTreeMap<String, String>;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Replace every `{{ name }}` in `template` with its value from `scope`.
///
/// # Errors
///
/// Returns [`GraphError::UnresolvedVariable`] when a referenced name has no
/// binding.
pub(crate) fn substitute(template: &str, scope: &Scope) -> Result<String, GraphError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some((before, after_open)) = rest.split_once(OPEN) {
        out.push_str(before);
        let Some((inner, after_close)) = after_open.split_once(CLOSE) else {
            out.push_str(OPEN);
            rest = after_open;
            break;
        };
        let name = inner.trim();
        let value = scope
            .get(name)
            .ok_or_else(|| GraphError::UnresolvedVariable {
                name: name.to_owned(),
                template: template.to_owned(),
            })?;
        out.push_str(value);
        rest = after_close;
    }
    out.push_str(rest);
    Ok(out)
}

/// Substitute each template in `templates`, preserving order.
pub(crate) fn substitute_all(templates: &[String], scope: &Scope) -> Result<Vec<String>, GraphError> {
    templates.iter().map(|t| substitute(t, scope)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn scope() -> Scope {
        Scope::from([
            ("name".to_owned(), "oils_cpp".to_owned()),
            ("variant_tag".to_owned(), "cxx.dbg".to_owned()),
            ("braces".to_owned(), "{{ name }}".to_owned()),
        ])
    }

    #[rstest]
    #[case("_gen/bin/{{name}}.mycpp", "_gen/bin/oils_cpp.mycpp")]
    #[case("_bin/{{ variant_tag }}/{{ name }}", "_bin/cxx.dbg/oils_cpp")]
    #[case("no references", "no references")]
    #[case("cc -o $out $in", "cc -o $out $in")]
    #[case("unterminated {{ name", "unterminated {{ name")]
    fn substitutes_references(scope: Scope, #[case] template: &str, #[case] expected: &str) {
        assert_eq!(substitute(template, &scope).expect("substitute"), expected);
    }

    #[rstest]
    fn replacement_is_not_rescanned(scope: Scope) {
        assert_eq!(
            substitute("x{{braces}}y", &scope).expect("substitute"),
            "x{{ name }}y"
        );
    }

    #[rstest]
    fn unknown_reference_is_an_error(scope: Scope) {
        let err = substitute("{{ name }}-{{ missing }}", &scope).expect_err("unresolved");
        match err {
            GraphError::UnresolvedVariable { name, template } => {
                assert_eq!(name, "missing");
                assert_eq!(template, "{{ name }}-{{ missing }}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[rstest]
    fn substitute_all_keeps_order(scope: Scope) {
        let templates = vec!["b/{{name}}".to_owned(), "a".to_owned(), "b/{{name}}".to_owned()];
        let out = substitute_all(&templates, &scope).expect("substitute");
        assert_eq!(out, ["b/oils_cpp", "a", "b/oils_cpp"]);
    }
}
