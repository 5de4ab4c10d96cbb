use crate::provider::TranscriptPayload;

/// Flat transcript text and the number of segments it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub text: String,
    pub segments: usize,
}

/// Flatten a payload into space-joined text.
///
/// Snippet lists and non-empty item sequences join each segment's text with a
/// single space, preserving provider order. An empty item sequence and an
/// opaque payload both become one segment holding the payload's string form.
pub fn normalize(payload: &TranscriptPayload) -> Normalized {
    match payload {
        TranscriptPayload::Snippets(snippets) => Normalized {
            text: snippets
                .iter()
                .map(|snippet| snippet.text.as_str())
                .collect::<Vec<_>>()
                .join(" "),
            segments: snippets.len(),
        },
        TranscriptPayload::Items(items) if !items.is_empty() => Normalized {
            text: items
                .iter()
                .map(|item| item.text())
                .collect::<Vec<_>>()
                .join(" "),
            segments: items.len(),
        },
        TranscriptPayload::Items(_) | TranscriptPayload::Opaque(_) => Normalized {
            text: payload.to_string(),
            segments: 1,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{SegmentItem, Snippet};
    use serde_json::json;

    #[test]
    fn test_snippets_join_in_order() {
        let payload = TranscriptPayload::Snippets(vec![
            Snippet::new("b"),
            Snippet::new("a"),
            Snippet::new("b"),
        ]);
        assert_eq!(
            normalize(&payload),
            Normalized { text: "b a b".to_string(), segments: 3 }
        );
    }

    #[test]
    fn test_snippet_timing_is_ignored() {
        let payload = TranscriptPayload::Snippets(vec![
            Snippet::timed("later", 12.5, 2.0),
            Snippet::timed("earlier", 1.0, 3.25),
        ]);
        assert_eq!(
            normalize(&payload),
            Normalized { text: "later earlier".to_string(), segments: 2 }
        );
    }

    #[test]
    fn test_mapping_items_use_text_key() {
        let items = [json!({"text": "hello"}), json!({"text": "world"})]
            .into_iter()
            .filter_map(|v| match v {
                serde_json::Value::Object(map) => Some(SegmentItem::Mapping(map)),
                _ => None,
            })
            .collect();
        assert_eq!(
            normalize(&TranscriptPayload::Items(items)),
            Normalized { text: "hello world".to_string(), segments: 2 }
        );
    }

    #[test]
    fn test_plain_string_items() {
        let payload = TranscriptPayload::Items(vec![
            SegmentItem::Plain("first".into()),
            SegmentItem::Plain("second".into()),
        ]);
        assert_eq!(normalize(&payload).text, "first second");
    }

    #[test]
    fn test_mixed_items() {
        let payload = TranscriptPayload::Items(vec![
            SegmentItem::Snippet(Snippet::new("one")),
            SegmentItem::Plain("two".into()),
        ]);
        assert_eq!(normalize(&payload).segments, 2);
        assert_eq!(normalize(&payload).text, "one two");
    }

    #[test]
    fn test_opaque_is_single_segment() {
        let payload = TranscriptPayload::Opaque("whole transcript".into());
        assert_eq!(
            normalize(&payload),
            Normalized { text: "whole transcript".to_string(), segments: 1 }
        );
    }

    #[test]
    fn test_empty_items_fall_through_to_string_form() {
        assert_eq!(
            normalize(&TranscriptPayload::Items(vec![])),
            Normalized { text: "[]".to_string(), segments: 1 }
        );
    }

    #[test]
    fn test_empty_snippets_keep_zero_count() {
        assert_eq!(
            normalize(&TranscriptPayload::Snippets(vec![])),
            Normalized { text: String::new(), segments: 0 }
        );
    }
}
