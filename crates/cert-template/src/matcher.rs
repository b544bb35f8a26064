//! Smart positioning: match data columns to template fields
//!
//! Fields are detected from placeholders in text content, matched to data
//! headers by exact name and then by a synonym table, and headers left over
//! get new dynamic text elements placed below the existing layout.

use crate::schema::{Element, Template, TextElement};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Left placement column in mm
pub const LEFT_COLUMN_MM: f64 = 20.0;
/// Right placement column in mm
pub const RIGHT_COLUMN_MM: f64 = 110.0;
/// Vertical gap below the lowest element in mm
pub const ROW_GAP_MM: f64 = 30.0;
/// Where placement restarts after running off the page
pub const TOP_MARGIN_MM: f64 = 30.0;
pub const BOTTOM_MARGIN_MM: f64 = 20.0;

/// Placeholder delimiters, longest first
const DELIMITERS: [(&str, &str); 4] = [("{{", "}}"), ("{", "}"), ("[", "]"), ("<", ">")];

/// Header spellings accepted for each well-known field
const SYNONYMS: &[(&str, &[&str])] = &[
    (
        "name",
        &[
            "name",
            "fullname",
            "full_name",
            "full name",
            "student_name",
            "student name",
            "recipient",
            "recipient_name",
        ],
    ),
    ("email", &["email", "email_address", "e-mail", "mail"]),
    (
        "date",
        &["date", "completion_date", "issue_date", "issued", "date_completed"],
    ),
    (
        "course",
        &["course", "course_name", "program", "training", "subject"],
    ),
    ("grade", &["grade", "score", "result", "mark"]),
];

/// How a binding proposal was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Exact,
    Fuzzy,
    None,
}

/// A proposed column for a template field, not yet written to the template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BindingProposal {
    pub template_field: String,
    pub matched_header: Option<String>,
    pub confidence: Confidence,
}

/// A placeholder in any of the accepted syntaxes
#[derive(Debug, Clone, PartialEq, Eq)]
struct FieldToken {
    start: usize,
    end: usize,
    /// Lower-cased, trimmed name
    name: String,
}

fn is_field_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == ' '
}

/// Whether `inner` is a field name between `open` and its closing delimiter
///
/// `{{...}}` takes any name substitution accepts, so headers written back by
/// [`apply_bindings`] (`{{e-mail}}`) are detected again.
fn is_field_name(open: &str, inner: &str) -> bool {
    if open == "{{" {
        !inner.contains(|c: char| matches!(c, '{' | '}' | '\n'))
    } else {
        inner.chars().all(is_field_char)
    }
}

/// Scan `text` left to right for `{{x}}`, `{x}`, `[x]` and `<x>`
fn field_tokens(text: &str) -> Vec<FieldToken> {
    let mut found = Vec::new();
    let mut i = 0;

    'scan: while i < text.len() {
        let rest = &text[i..];
        for (open, close) in DELIMITERS {
            if !rest.starts_with(open) {
                continue;
            }
            let inner_start = i + open.len();
            let Some(len) = text[inner_start..].find(close) else {
                continue;
            };
            let inner = &text[inner_start..inner_start + len];
            let name = inner.trim();
            if !name.is_empty() && is_field_name(open, inner) {
                let end = inner_start + len + close.len();
                found.push(FieldToken {
                    start: i,
                    end,
                    name: name.to_lowercase(),
                });
                i = end;
                continue 'scan;
            }
        }

        i += rest.chars().next().map_or(1, char::len_utf8);
    }

    found
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

fn synonyms_of(field: &str) -> Option<&'static [&'static str]> {
    SYNONYMS
        .iter()
        .find(|(canonical, group)| *canonical == field || group.contains(&field))
        .map(|(_, group)| *group)
}

/// Field names used as placeholders in text element content
///
/// Names are returned lower-cased.
pub fn detect_fields(elements: &[Element]) -> BTreeSet<String> {
    elements
        .iter()
        .filter_map(Element::as_text)
        .flat_map(|text| field_tokens(&text.content))
        .map(|token| token.name)
        .collect()
}

fn match_with_confidence<H, F>(headers: &[H], fields: F) -> BTreeMap<String, (String, Confidence)>
where
    H: AsRef<str>,
    F: IntoIterator,
    F::Item: AsRef<str>,
{
    let fields: BTreeSet<String> = fields
        .into_iter()
        .map(|f| f.as_ref().to_string())
        .collect();
    let normalized: Vec<String> = headers.iter().map(|h| normalize(h.as_ref())).collect();

    let mut used = vec![false; headers.len()];
    let mut matches = BTreeMap::new();

    // exact, case-insensitive
    for field in &fields {
        let wanted = normalize(field);
        if let Some(i) = (0..headers.len()).find(|&i| !used[i] && normalized[i] == wanted) {
            used[i] = true;
            matches.insert(
                field.clone(),
                (headers[i].as_ref().to_string(), Confidence::Exact),
            );
        }
    }

    // synonyms, never overwriting an exact match
    for field in &fields {
        if matches.contains_key(field) {
            continue;
        }
        let Some(group) = synonyms_of(&normalize(field)) else {
            continue;
        };
        if let Some(i) =
            (0..headers.len()).find(|&i| !used[i] && group.contains(&normalized[i].as_str()))
        {
            used[i] = true;
            matches.insert(
                field.clone(),
                (headers[i].as_ref().to_string(), Confidence::Fuzzy),
            );
        }
    }

    matches
}

/// Map template fields to data headers
///
/// Exact case-insensitive matches are made first; remaining fields are
/// matched through the synonym table. Each header is used at most once.
pub fn match_headers<H, F>(headers: &[H], fields: F) -> BTreeMap<String, String>
where
    H: AsRef<str>,
    F: IntoIterator,
    F::Item: AsRef<str>,
{
    match_with_confidence(headers, fields)
        .into_iter()
        .map(|(field, (header, _))| (field, header))
        .collect()
}

/// One proposal per field, sorted by field name
pub fn propose_bindings<H, F>(headers: &[H], fields: F) -> Vec<BindingProposal>
where
    H: AsRef<str>,
    F: IntoIterator,
    F::Item: AsRef<str>,
{
    let fields: BTreeSet<String> = fields
        .into_iter()
        .map(|f| f.as_ref().to_string())
        .collect();
    let mut matches = match_with_confidence(headers, &fields);

    fields
        .into_iter()
        .map(|field| match matches.remove(&field) {
            Some((header, confidence)) => BindingProposal {
                template_field: field,
                matched_header: Some(header),
                confidence,
            },
            None => BindingProposal {
                template_field: field,
                matched_header: None,
                confidence: Confidence::None,
            },
        })
        .collect()
}

/// Headers not used by any match, in data source order
pub fn unmatched_headers<H: AsRef<str>>(
    headers: &[H],
    matches: &BTreeMap<String, String>,
) -> Vec<String> {
    let used: HashSet<&str> = matches.values().map(String::as_str).collect();
    headers
        .iter()
        .map(|h| h.as_ref())
        .filter(|h| !used.contains(h))
        .map(str::to_string)
        .collect()
}

fn slot_key(x: f64, y: f64) -> (i64, i64) {
    (x.round() as i64, y.round() as i64)
}

/// Add a dynamic text element for each unmatched header
///
/// Headers are placed in order, each 30mm below the lowest element, in the
/// left column or, if that rounded slot is taken, the right column. Past the
/// bottom margin placement wraps to the top. Existing elements are never
/// moved or removed.
pub fn place_unmatched<H: AsRef<str>>(template: &Template, unmatched: &[H]) -> Template {
    let mut result = template.clone();
    let (_, page_height) = result.page_size_mm();
    let limit = page_height - BOTTOM_MARGIN_MM;
    let max_attempts = 2 * ((page_height / ROW_GAP_MM).ceil() as usize + 1);

    let mut used: HashSet<(i64, i64)> = result
        .elements
        .iter()
        .map(|e| {
            let (x, y) = e.position();
            slot_key(x, y)
        })
        .collect();

    for header in unmatched {
        let header = header.as_ref();
        let lowest = result
            .elements
            .iter()
            .map(Element::bottom_mm)
            .fold(0.0, f64::max);

        let mut y = lowest + ROW_GAP_MM;
        let mut slot = None;
        for _ in 0..max_attempts {
            if y > limit {
                y = TOP_MARGIN_MM;
            }
            if let Some(x) = [LEFT_COLUMN_MM, RIGHT_COLUMN_MM]
                .into_iter()
                .find(|&x| !used.contains(&slot_key(x, y)))
            {
                slot = Some((x, y));
                break;
            }
            y += ROW_GAP_MM;
        }
        let (x, y) = slot.unwrap_or((LEFT_COLUMN_MM, y.min(limit)));

        let mut element = crate::ElementKind::Text.default_element(Default::default());
        element.set_position(x, y);
        if let Some(text) = element.as_text_mut() {
            text.content = format!("{{{{{header}}}}}");
            text.is_dynamic = true;
            text.data_field = Some(header.to_string());
        }

        used.insert(slot_key(x, y));
        let id = result.push_element(element);
        log::debug!("Placed column '{header}' as {id} at ({x}, {y})");
    }

    result
}

fn bind_text(text: &mut TextElement, matches: &BTreeMap<String, String>) -> bool {
    let tokens = field_tokens(&text.content);
    if tokens.is_empty() {
        return false;
    }

    let trimmed = text.content.trim();
    if tokens.len() == 1 && tokens[0].end - tokens[0].start == trimmed.len() {
        let Some(header) = matches.get(&tokens[0].name) else {
            return false;
        };
        text.is_dynamic = true;
        text.data_field = Some(header.clone());
        text.content = format!("{{{{{header}}}}}");
        return true;
    }

    // mixed literal text: rewrite matched placeholders to `{{header}}`
    let mut rewritten = String::with_capacity(text.content.len());
    let mut last = 0;
    let mut changed = false;
    for token in &tokens {
        if let Some(header) = matches.get(&token.name) {
            rewritten.push_str(&text.content[last..token.start]);
            rewritten.push_str(&format!("{{{{{header}}}}}"));
            last = token.end;
            changed = true;
        }
    }
    if changed {
        rewritten.push_str(&text.content[last..]);
        text.content = rewritten;
    }
    changed
}

/// Accept matches by writing them onto text elements
///
/// A text element consisting of a single matched placeholder becomes a
/// dynamic element bound to the header. Placeholders inside longer text are
/// rewritten to `{{header}}` so substitution picks them up. Returns the
/// number of elements changed.
pub fn apply_bindings(template: &mut Template, matches: &BTreeMap<String, String>) -> usize {
    template
        .elements
        .iter_mut()
        .filter_map(Element::as_text_mut)
        .filter(|text| !text.is_dynamic)
        .map(|text| bind_text(text, matches))
        .filter(|&changed| changed)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ElementKind;
    use crate::schema::ElementId;
    use pretty_assertions::assert_eq;

    fn text_element(id: &str, content: &str, y: f64) -> Element {
        let mut element = ElementKind::Text.default_element(ElementId::from(id));
        element.set_position(20.0, y);
        if let Some(text) = element.as_text_mut() {
            text.content = content.to_string();
        }
        element
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_detect_all_syntaxes() {
        let elements = vec![
            text_element("a", "Hello {{name}}, your grade is {grade}", 10.0),
            text_element("b", "[Course] on <DATE>", 20.0),
        ];
        assert_eq!(
            detect_fields(&elements),
            set(&["course", "date", "grade", "name"])
        );
    }

    #[test]
    fn test_detect_ignores_non_identifiers() {
        let elements = vec![text_element("a", "{a-b} [] {{ }} <p/>", 10.0)];
        assert!(detect_fields(&elements).is_empty());
    }

    #[test]
    fn test_detect_keeps_spaces_inside() {
        let elements = vec![text_element("a", "{{ Full Name }}", 10.0)];
        assert_eq!(detect_fields(&elements), set(&["full name"]));
    }

    #[test]
    fn test_match_headers_synonyms() {
        let matches = match_headers(&["Full Name", "email_address"], ["name", "email"]);
        assert_eq!(matches.get("name").map(String::as_str), Some("Full Name"));
        assert_eq!(matches.get("email").map(String::as_str), Some("email_address"));
    }

    #[test]
    fn test_exact_match_not_overwritten() {
        // "Name" matches exactly; "full_name" may not steal the field
        let matches = match_headers(&["full_name", " Name "], ["name"]);
        assert_eq!(matches.get("name").map(String::as_str), Some(" Name "));
    }

    #[test]
    fn test_header_used_once() {
        let matches = match_headers(&["score"], ["grade", "result"]);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches.get("grade").map(String::as_str), Some("score"));
    }

    #[test]
    fn test_propose_bindings() {
        let proposals = propose_bindings(&["Name", "Program"], ["name", "course", "grade"]);
        assert_eq!(
            proposals,
            vec![
                BindingProposal {
                    template_field: "course".to_string(),
                    matched_header: Some("Program".to_string()),
                    confidence: Confidence::Fuzzy,
                },
                BindingProposal {
                    template_field: "grade".to_string(),
                    matched_header: None,
                    confidence: Confidence::None,
                },
                BindingProposal {
                    template_field: "name".to_string(),
                    matched_header: Some("Name".to_string()),
                    confidence: Confidence::Exact,
                },
            ]
        );
    }

    #[test]
    fn test_unmatched_headers_keep_order() {
        let headers = ["id", "Name", "city", "email"];
        let matches = match_headers(&headers, ["name", "email"]);
        assert_eq!(unmatched_headers(&headers, &matches), vec!["id", "city"]);
    }

    #[test]
    fn test_place_unmatched_below_lowest() {
        let mut template = Template::new("t");
        template.push_element(text_element("title", "Certificate", 40.0));

        let placed = place_unmatched(&template, &["city", "id"]);
        assert_eq!(placed.elements.len(), 3);
        assert_eq!(placed.elements[0], template.elements[0]);

        // title bottom = 40 + 8
        let city = placed.elements[1].as_text().unwrap();
        assert_eq!((city.x, city.y), (20.0, 78.0));
        assert!(city.is_dynamic);
        assert_eq!(city.data_field.as_deref(), Some("city"));
        assert_eq!(city.content, "{{city}}");

        let id = placed.elements[2].as_text().unwrap();
        assert_eq!((id.x, id.y), (20.0, 116.0));
    }

    #[test]
    fn test_place_unmatched_uses_right_column_on_collision() {
        let mut template = Template::new("t");
        template.push_element(text_element("top", "Header", TOP_MARGIN_MM));
        let mut rect = ElementKind::Rectangle.default_element(ElementId::from("r"));
        rect.set_position(150.0, 140.0);
        template.push_element(rect);

        // both rows wrap to the top, where (20, 30) is taken
        let placed = place_unmatched(&template, &["a", "b"]);
        let a = placed.elements[2].as_text().unwrap();
        assert_eq!((a.x, a.y), (RIGHT_COLUMN_MM, TOP_MARGIN_MM));
        let b = placed.elements[3].as_text().unwrap();
        assert_eq!((b.x, b.y), (LEFT_COLUMN_MM, TOP_MARGIN_MM + ROW_GAP_MM));
    }

    #[test]
    fn test_place_unmatched_wraps_to_top() {
        let mut template = Template::new("t");
        // landscape A4 is 210mm tall; bottom at 180 puts the next row past 190
        let mut rect = ElementKind::Rectangle.default_element(ElementId::from("r"));
        rect.set_position(150.0, 140.0);
        template.push_element(rect);

        let placed = place_unmatched(&template, &["a"]);
        let a = placed.elements[1].as_text().unwrap();
        assert_eq!((a.x, a.y), (LEFT_COLUMN_MM, TOP_MARGIN_MM));
    }

    #[test]
    fn test_place_unmatched_is_deterministic() {
        let template = Template::new("t");
        let headers = ["a", "b", "c", "d", "e", "f", "g", "h"];
        let first = place_unmatched(&template, &headers);
        let second = place_unmatched(&template, &headers);
        assert_eq!(first, second);

        let slots: HashSet<_> = first
            .elements
            .iter()
            .map(|e| {
                let (x, y) = e.position();
                slot_key(x, y)
            })
            .collect();
        assert_eq!(slots.len(), headers.len());
    }

    #[test]
    fn test_detect_rebound_headers() {
        let elements = vec![text_element("a", "Contact: {{E-Mail}}, {e-mail}", 10.0)];
        assert_eq!(detect_fields(&elements), set(&["e-mail"]));
    }

    #[test]
    fn test_bind_then_place_adds_each_header_once() {
        let headers = ["e-mail", "City"];
        let mut template = Template::new("t");
        template.push_element(text_element("a", "Contact: {email}", 10.0));

        let matches = match_headers(&headers, detect_fields(&template.elements));
        assert_eq!(apply_bindings(&mut template, &matches), 1);
        assert_eq!(template.elements[0].as_text().unwrap().content, "Contact: {{e-mail}}");

        // matching again on the rewritten template still finds the bound header
        let matches = match_headers(&headers, detect_fields(&template.elements));
        let unmatched = unmatched_headers(&headers, &matches);
        assert_eq!(unmatched, vec!["City"]);

        let placed = place_unmatched(&template, &unmatched);
        assert_eq!(placed.elements.len(), 2);
        let city = placed.elements[1].as_text().unwrap();
        assert_eq!(city.data_field.as_deref(), Some("City"));
    }

    #[test]
    fn test_apply_bindings() {
        let mut template = Template::new("t");
        template.push_element(text_element("a", "{{name}}", 10.0));
        template.push_element(text_element("b", "Awarded for [course] on {date}", 20.0));
        template.push_element(text_element("c", "No fields here", 30.0));

        let matches: BTreeMap<String, String> = [
            ("name".to_string(), "Full Name".to_string()),
            ("course".to_string(), "Program".to_string()),
        ]
        .into_iter()
        .collect();

        assert_eq!(apply_bindings(&mut template, &matches), 2);

        let a = template.elements[0].as_text().unwrap();
        assert!(a.is_dynamic);
        assert_eq!(a.data_field.as_deref(), Some("Full Name"));

        let b = template.elements[1].as_text().unwrap();
        assert!(!b.is_dynamic);
        assert_eq!(b.content, "Awarded for {{Program}} on {date}");
    }
}
