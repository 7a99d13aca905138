use std::collections::BTreeMap;
use std::io::BufRead;
use std::sync::Arc;

use super::cursor::TagCursor;
use super::error::DocumentError;
use super::names::{attr, el};
use crate::model::Annotations;
use crate::string_pool::StringPool;

/// Read an optional `<note category=N>` followed by `<annotation name=K>`
/// elements. Returns the shared empty instance when neither is present.
pub(crate) fn read_annotations<R: BufRead>(
    cursor: &mut TagCursor<R>,
    pool: &mut StringPool,
) -> Result<Arc<Annotations>, DocumentError> {
    let mut note = None;
    let mut color = 0;
    if cursor.is_start_element(el::NOTE) {
        color = cursor.int_attribute(attr::CATEGORY)?;
        note = Some(cursor.read_element_text()?);
    }

    let mut values = BTreeMap::new();
    while cursor.is_start_element(el::ANNOTATION) {
        let name = cursor
            .attribute(attr::NAME)
            .map(|name| pool.intern(name))
            .ok_or(DocumentError::MalformedAnnotation)?;
        let value = cursor.read_element_text()?;
        values.insert(name, value);
    }

    Ok(Annotations::from_parts(note, color, values))
}

/// Enter a result row, read its annotations and step past it
pub(crate) fn read_row_annotations<R: BufRead>(
    cursor: &mut TagCursor<R>,
    pool: &mut StringPool,
) -> Result<Arc<Annotations>, DocumentError> {
    cursor.enter_element()?;
    let annotations = read_annotations(cursor, pool)?;
    cursor.exit_element()?;
    Ok(annotations)
}

/// Remove a numeric score annotation, returning its value when it parses.
///
/// Unparseable text is dropped from the annotations and the score is left
/// unchanged.
pub(crate) fn take_score_annotation(
    annotations: Arc<Annotations>,
    name: &str,
    score: &mut Option<f32>,
) -> Arc<Annotations> {
    match annotations.get(name) {
        None | Some("") => annotations,
        Some(text) => {
            if let Ok(value) = text.trim().parse::<f64>() {
                *score = Some(value as f32);
            }
            annotations.without(name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::ErrorKind;

    fn read(xml: &str) -> Result<Arc<Annotations>, DocumentError> {
        let mut cursor = TagCursor::new(xml.as_bytes())?;
        cursor.enter_element()?;
        let mut pool = StringPool::new();
        read_annotations(&mut cursor, &mut pool)
    }

    #[test]
    fn test_note_and_annotations() {
        let annotations = read(
            r#"<p><note category="3">check &amp; fix</note>
                <annotation name="Tissue">liver</annotation>
                <annotation name="Batch">2</annotation></p>"#,
        )
        .unwrap();
        assert_eq!(annotations.note(), Some("check & fix"));
        assert_eq!(annotations.color(), 3);
        assert_eq!(annotations.get("Tissue"), Some("liver"));
        assert_eq!(annotations.len(), 2);
    }

    #[test]
    fn test_text_whitespace_is_kept() {
        let annotations = read(
            "<p><note category=\"0\">  two\n lines </note>\n\
                <annotation name=\"Comment\"> padded </annotation></p>",
        )
        .unwrap();
        assert_eq!(annotations.note(), Some("  two\n lines "));
        assert_eq!(annotations.get("Comment"), Some(" padded "));
    }

    #[test]
    fn test_nothing_gives_shared_empty() {
        let annotations = read("<p><other/></p>").unwrap();
        assert!(Annotations::is_shared_empty(&annotations));
    }

    #[test]
    fn test_nameless_annotation_is_fatal() {
        let err = read("<p><annotation>value</annotation></p>").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedAnnotation);
    }

    #[test]
    fn test_annotation_names_are_interned() {
        let mut pool = StringPool::new();
        let xml = r#"<r><a><annotation name="QValue">1</annotation></a>
            <a><annotation name="QValue">2</annotation></a></r>"#;
        let mut cursor = TagCursor::new(xml.as_bytes()).unwrap();
        cursor.enter_element().unwrap();
        let first = read_row_annotations(&mut cursor, &mut pool).unwrap();
        let second = read_row_annotations(&mut cursor, &mut pool).unwrap();
        let name = |a: &Arc<Annotations>| a.values().next().map(|(k, _)| k.as_ptr());
        assert_eq!(name(&first), name(&second));
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_take_score_annotation() {
        let mut values = BTreeMap::new();
        values.insert(Arc::from("QValue"), "0.05".to_string());
        values.insert(Arc::from("Other"), "x".to_string());
        let annotations = Annotations::from_parts(None, 0, values);
        let mut qvalue = None;
        let rest = take_score_annotation(annotations, "QValue", &mut qvalue);
        assert_eq!(qvalue, Some(0.05));
        assert_eq!(rest.get("QValue"), None);
        assert_eq!(rest.get("Other"), Some("x"));
    }
}
