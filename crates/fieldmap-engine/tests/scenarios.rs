//! End-to-end resolution against the shipped dictionary.

use std::collections::BTreeMap;

use fieldmap_catalog::{Catalog, load_default_catalog};
use fieldmap_engine::{ConfidenceLevel, FieldResolver, ResolutionStats};
use fieldmap_model::{CanonicalField, MatchMethod, RawHeader, SemanticCategory, ValueKind};

fn resolver() -> FieldResolver {
    let catalog = load_default_catalog().expect("load shipped dictionary");
    FieldResolver::new(catalog)
}

fn rows(header: &str, values: &[&str]) -> Vec<BTreeMap<String, String>> {
    values
        .iter()
        .map(|value| BTreeMap::from([(header.to_string(), (*value).to_string())]))
        .collect()
}

#[test]
fn product_sheet_maps_known_headers_and_leaves_the_rest() {
    let resolver = resolver();
    let result = resolver.resolve_headers(
        &["商品ID", "Product Name", "库存", "随机列X"],
        "products",
        None,
        None,
    );

    let id = result.get("商品ID").unwrap().assignment().unwrap();
    assert_eq!(id.field_code, "product_id");
    assert_eq!(id.confidence, 1.0);
    assert_eq!(id.method, MatchMethod::ExactMatch);

    assert_eq!(result.field_for("Product Name"), Some("product_name"));
    assert_eq!(result.field_for("库存"), Some("stock"));

    let unknown = result.get("随机列X").unwrap();
    assert!(unknown.is_unmapped());
    assert_eq!(unknown.confidence(), 0.0);
    assert_eq!(unknown.method_label(), "no_match");
    assert_eq!(result.unmapped_headers(), vec!["随机列X"]);
}

#[test]
fn exact_header_beats_a_vaguer_one_for_the_same_field() {
    let resolver = resolver();
    let result = resolver.resolve_headers(&["商品", "商品名称"], "products", None, None);

    let exact = result.get("商品名称").unwrap().assignment().unwrap();
    assert_eq!(exact.field_code, "product_name");
    assert_eq!(exact.confidence, 1.0);

    let vague = result.get("商品").unwrap();
    assert_ne!(vague.field_code(), Some("product_name"));
    if let Some(assignment) = vague.assignment() {
        assert!(assignment.fallback);
        assert!(assignment.method_label().ends_with("_fallback"));
        assert!(assignment.confidence < 0.85);
    }
}

#[test]
fn displaced_header_falls_back_to_product_id() {
    let resolver = resolver();
    let result = resolver.resolve_headers(&["商品", "商品名称"], "products", None, None);
    let fallback = result.get("商品").unwrap().assignment().unwrap();
    assert_eq!(fallback.field_code, "product_id");
    assert!((fallback.confidence - 0.765).abs() < 1e-6);
    assert_eq!(fallback.method_label(), "contains_match_fallback");
    assert!(fallback.rationale.as_deref().unwrap().contains("商品名称"));
}

#[test]
fn currency_samples_resolve_an_unknown_fee_header() {
    let resolver = resolver();
    let samples = rows("运费", &["12.50", "8.00", "15.30"]);
    let result = resolver.resolve_headers(&["运费"], "orders", None, Some(&samples));

    let fee = result.get("运费").unwrap().assignment().unwrap();
    assert_eq!(fee.field_code, "shipping_fee");
    assert_eq!(fee.confidence, 0.82);
    assert_eq!(fee.method, MatchMethod::ValuePattern(ValueKind::Currency));
    assert_eq!(fee.method_label(), "value_pattern_currency");
}

#[test]
fn fee_header_without_samples_stays_unmapped() {
    let resolver = resolver();
    let result = resolver.resolve_headers(&["运费"], "orders", None, None);
    assert!(result.get("运费").unwrap().is_unmapped());
}

#[test]
fn grouped_amounts_resolve_an_unknown_fee_header() {
    let resolver = resolver();
    let samples = rows("运费", &["1,234.50", "2,000.00", "15.30"]);
    let result = resolver.resolve_headers(&["运费"], "orders", None, Some(&samples));

    let fee = result.get("运费").unwrap().assignment().unwrap();
    assert_eq!(fee.field_code, "shipping_fee");
    assert_eq!(fee.method, MatchMethod::ValuePattern(ValueKind::Currency));
}

#[test]
fn unit_annotation_resolves_like_the_bare_header() {
    let resolver = resolver();
    let bare = resolver.resolve_headers(&["商品价格"], "orders", None, None);
    let annotated = resolver.resolve_headers(&["商品价格（元）"], "orders", None, None);

    let bare = bare.get("商品价格").unwrap().assignment().unwrap();
    let annotated = annotated.get("商品价格（元）").unwrap().assignment().unwrap();
    assert_eq!(annotated.field_code, "item_name");
    assert_eq!(annotated.field_code, bare.field_code);
    assert_eq!(annotated.method, MatchMethod::KeywordSimilarity);
    assert_eq!(annotated.method, bare.method);
    assert_eq!(annotated.confidence, bare.confidence);
}

#[test]
fn mixed_case_platform_keys_feed_fuzzy_matching() {
    let catalog = Catalog::from_fields([CanonicalField::new(
        "seller_discount",
        "orders",
        SemanticCategory::Amount,
    )
    .with_name("zh", "卖家优惠")
    .with_name("en", "Seller Discount")
    .with_platform_synonyms("Shopee", ["Seller Voucher Total"])]);
    let resolver = FieldResolver::new(catalog);

    let header = "Seller Vouchr Total";
    let result = resolver.resolve_headers(&[header], "orders", Some("shopee"), None);
    let entry = result.get(header).unwrap().assignment().unwrap();
    assert_eq!(entry.field_code, "seller_discount");
    assert_eq!(entry.method, MatchMethod::FuzzyMatch);
    assert_eq!(entry.confidence, 0.85);

    let other = resolver.resolve_headers(&[header], "orders", Some("lazada"), None);
    assert!(other.get(header).unwrap().is_unmapped());
}

#[test]
fn blank_header_is_unmapped_even_with_samples() {
    let resolver = resolver();
    let header = RawHeader::new("").with_samples(["12.50", "8.00", "15.30"]);
    let result = resolver.resolve(&[header], "orders", None);

    let entry = result.get("").unwrap();
    assert!(entry.is_unmapped());
    assert_eq!(entry.confidence(), 0.0);
    assert_eq!(entry.method_label(), "no_match");
}

#[test]
fn platform_synonyms_apply_only_to_their_platform() {
    let resolver = resolver();
    let shopee = resolver.resolve_headers(&["Order SN"], "orders", Some("Shopee"), None);
    assert_eq!(shopee.field_for("Order SN"), Some("order_id"));
    assert_eq!(shopee.platform.as_deref(), Some("Shopee"));

    let lazada = resolver.resolve_headers(&["Order SN"], "orders", Some("lazada"), None);
    let entry = lazada.get("Order SN").unwrap();
    assert_ne!(
        entry.assignment().map(|a| a.method),
        Some(MatchMethod::ExactMatch)
    );
}

#[test]
fn general_fields_are_visible_in_every_domain() {
    let resolver = resolver();
    let result = resolver.resolve_headers(&["店铺ID", "访客数"], "traffic", None, None);
    assert_eq!(result.field_for("店铺ID"), Some("shop_id"));
    assert_eq!(result.field_for("访客数"), Some("visitors"));
}

#[test]
fn unknown_domain_leaves_everything_unmapped() {
    let resolver = resolver();
    let result = resolver.resolve_headers(&["商品ID", "订单号"], "refunds", None, None);
    assert_eq!(result.len(), 2);
    assert!(result.iter().all(|entry| entry.resolution.is_unmapped()));
    assert_eq!(result.data_domain, "refunds");
}

#[test]
fn empty_catalog_leaves_everything_unmapped() {
    let resolver = FieldResolver::new(Catalog::empty());
    let result = resolver.resolve_headers(&["商品ID", ""], "products", None, None);
    assert_eq!(result.len(), 2);
    assert_eq!(result.unmapped_headers(), vec!["商品ID", ""]);
}

#[test]
fn duplicate_headers_keep_one_entry_each() {
    let resolver = resolver();
    let result = resolver.resolve_headers(&["订单号", "订单号"], "orders", None, None);
    assert_eq!(result.len(), 2);
    let mapped: Vec<_> = result.mapped().map(|(_, a)| a.field_code.as_str()).collect();
    assert_eq!(mapped.iter().filter(|code| **code == "order_id").count(), 1);
}

#[test]
fn weak_key_fields_are_flagged_for_review() {
    let resolver = resolver();
    let result = resolver.resolve_headers(&["商品", "商品名称"], "products", None, None);
    let review = resolver.review_required(&result, "products");
    assert_eq!(review.len(), 1);
    assert_eq!(review[0].header, "商品");
    assert_eq!(review[0].field_code, "product_id");

    let clean = resolver.resolve_headers(&["商品ID", "商品名称"], "products", None, None);
    assert!(resolver.review_required(&clean, "products").is_empty());
}

#[test]
fn summary_counts_levels() {
    let resolver = resolver();
    let samples = rows("运费", &["12.50", "8.00", "15.30"]);
    let result = resolver.resolve_headers(
        &["订单号", "运费", "备注"],
        "orders",
        None,
        Some(&samples),
    );
    let summary = result.summary();
    assert_eq!(summary.total, 3);
    assert_eq!(summary.mapped, 2);
    assert_eq!(summary.unmapped, 1);
    assert_eq!(summary.count(ConfidenceLevel::High), 1);
    assert_eq!(summary.count(ConfidenceLevel::Medium), 1);
    assert_eq!(summary.count(ConfidenceLevel::Low), 0);
}

#[test]
fn reload_swaps_the_catalog_for_later_calls() {
    let resolver = resolver();
    let before = resolver.resolve_headers(&["商品ID"], "products", None, None);
    assert_eq!(before.field_for("商品ID"), Some("product_id"));

    let previous = resolver.reload(Catalog::empty());
    assert!(previous.has_domain("products"));
    let after = resolver.resolve_headers(&["商品ID"], "products", None, None);
    assert!(after.get("商品ID").unwrap().is_unmapped());
}

#[test]
fn concurrent_calls_see_a_whole_catalog() {
    let resolver = resolver();
    let headers = ["商品ID", "Product Name", "库存"];
    std::thread::scope(|scope| {
        let workers: Vec<_> = (0..4)
            .map(|_| {
                scope.spawn(|| {
                    (0..20)
                        .map(|_| resolver.resolve_headers(&headers, "products", None, None))
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        resolver.reload(Catalog::empty());
        for worker in workers {
            for result in worker.join().unwrap() {
                let mapped = result.mapped().count();
                assert!(mapped == 0 || mapped == headers.len(), "torn result: {result:?}");
            }
        }
    });
}
