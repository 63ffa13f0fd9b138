use fieldmap_text::{fragments, normalize, strip_annotations};
use proptest::prelude::*;

proptest! {
    #[test]
    fn normalize_is_idempotent(raw in "\\PC*") {
        let once = normalize(&raw);
        prop_assert_eq!(normalize(&once), once);
    }

    #[test]
    fn normalized_text_has_no_whitespace(raw in "\\PC*") {
        prop_assert!(!normalize(&raw).chars().any(char::is_whitespace));
    }

    #[test]
    fn fragment_spans_stay_inside_content(raw in "[a-zA-Z0-9 _\u{4e00}-\u{4e20}]{0,24}") {
        let frags = fragments(&raw);
        for fragment in &frags.items {
            prop_assert!(fragment.span.start < fragment.span.end);
            prop_assert_eq!(fragment.text.chars().count(), fragment.span.len());
        }
    }

    #[test]
    fn stripping_annotations_never_grows(raw in "\\PC{0,40}") {
        prop_assert!(strip_annotations(&raw).len() <= raw.len());
    }
}

#[test]
fn mixed_header_forms_agree() {
    let forms = ["Order ID", "order_id", "ORDER-ID", "Ｏｒｄｅｒ　ＩＤ", "order.id"];
    for form in forms {
        assert_eq!(normalize(form), "orderid", "{form}");
    }
}

#[test]
fn stripped_stem_normalizes_like_the_bare_header() {
    assert_eq!(normalize(&strip_annotations("销售额 (元)")), normalize("销售额"));
    assert_eq!(normalize(&strip_annotations("Unit Price [USD]")), "unitprice");
}
