//! Field binding and `{{placeholder}}` substitution

use crate::data::Row;
use crate::schema::TextElement;
use std::borrow::Cow;

/// A `{{name}}` token found in text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Token<'a> {
    /// Byte range of the whole token including braces
    start: usize,
    end: usize,
    /// Trimmed name between the braces
    name: &'a str,
}

fn tokens(text: &str) -> impl Iterator<Item = Token<'_>> {
    let mut cursor = 0;
    std::iter::from_fn(move || loop {
        let open = cursor + text.get(cursor..)?.find("{{")?;
        let inner_start = open + 2;
        let close = inner_start + text[inner_start..].find("}}")?;
        let inner = &text[inner_start..close];

        // `{{a {{b}}` restarts at the inner opening
        if let Some(nested) = inner.rfind("{{") {
            cursor = inner_start + nested;
            continue;
        }

        cursor = close + 2;
        let name = inner.trim();
        if name.is_empty() || name.contains(|c: char| matches!(c, '{' | '}' | '\n')) {
            continue;
        }

        return Some(Token {
            start: open,
            end: close + 2,
            name,
        });
    })
}

/// Names of all `{{name}}` placeholders in `text`, in order of appearance
pub fn placeholders(text: &str) -> Vec<&str> {
    tokens(text).map(|t| t.name).collect()
}

/// Replace each `{{name}}` with `lookup(name)`
///
/// Tokens for which `lookup` returns `None` are left exactly as written.
pub fn substitute_with<'a, F>(text: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<Cow<'a, str>>,
{
    let mut out = String::with_capacity(text.len());
    let mut last = 0;

    for token in tokens(text) {
        if let Some(value) = lookup(token.name) {
            out.push_str(&text[last..token.start]);
            out.push_str(&value);
            last = token.end;
        }
    }

    out.push_str(&text[last..]);
    out
}

/// Replace `{{column}}` placeholders with values from `row`
pub fn substitute_placeholders(text: &str, row: &Row) -> String {
    substitute_with(text, |name| row.get(name).map(Cow::Borrowed))
}

/// The text a text element renders for `row`
///
/// A dynamic element whose bound column exists in the row renders that
/// value verbatim. Otherwise the literal content is rendered with its
/// placeholders substituted.
pub fn resolve_text(element: &TextElement, row: &Row) -> String {
    if element.is_dynamic {
        if let Some(value) = element.data_field.as_deref().and_then(|f| row.get(f)) {
            return value.to_string();
        }
    }

    substitute_placeholders(&element.content, row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ElementKind;
    use crate::schema::{Element, ElementId};
    use pretty_assertions::assert_eq;

    fn text(content: &str) -> TextElement {
        match ElementKind::Text.default_element(ElementId::from("t")) {
            Element::Text(mut t) => {
                t.content = content.to_string();
                t
            }
            _ => unreachable!(),
        }
    }

    fn row(pairs: &[(&str, &str)]) -> Row {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(placeholders("Hi {{ name }} of {{course}}"), vec!["name", "course"]);
        assert_eq!(placeholders("{{}} {{ }} {name}"), Vec::<&str>::new());
        assert_eq!(placeholders("{{a {{b}}"), vec!["b"]);
    }

    #[test]
    fn test_substitution() {
        let r = row(&[("name", "Ana"), ("grade", "")]);
        assert_eq!(
            substitute_placeholders("Dear {{ name }}, grade: {{grade}}.", &r),
            "Dear Ana, grade: ."
        );
    }

    #[test]
    fn test_unknown_tokens_stay_visible() {
        let r = row(&[("name", "Ana")]);
        assert_eq!(
            substitute_placeholders("{{name}} / {{ missing }}", &r),
            "Ana / {{ missing }}"
        );
    }

    #[test]
    fn test_dynamic_binding_wins() {
        let mut element = text("{{name}} static");
        element.is_dynamic = true;
        element.data_field = Some("full".to_string());

        let r = row(&[("full", "Ana {{name}}"), ("name", "x")]);
        // value used verbatim, no further expansion
        assert_eq!(resolve_text(&element, &r), "Ana {{name}}");
    }

    #[test]
    fn test_dynamic_falls_back_to_content() {
        let mut element = text("Hello {{name}}");
        element.is_dynamic = true;
        element.data_field = Some("absent".to_string());
        assert_eq!(resolve_text(&element, &row(&[("name", "Bo")])), "Hello Bo");
    }

    #[test]
    fn test_data_field_ignored_unless_dynamic() {
        let mut element = text("Literal");
        element.data_field = Some("name".to_string());
        assert_eq!(resolve_text(&element, &row(&[("name", "Bo")])), "Literal");
    }

    #[test]
    fn test_literal_text_is_row_independent() {
        let element = text("Certificate of Completion");
        let a = resolve_text(&element, &row(&[("name", "Ana")]));
        let b = resolve_text(&element, &row(&[("name", "Bo")]));
        assert_eq!(a, b);
        assert_eq!(a, "Certificate of Completion");
    }

    #[test]
    fn test_substitute_with_custom_lookup() {
        let out = substitute_with("cert-{{index}}-{{name}}", |name| match name {
            "index" => Some(Cow::Owned(7.to_string())),
            _ => None,
        });
        assert_eq!(out, "cert-7-{{name}}");
    }
}
