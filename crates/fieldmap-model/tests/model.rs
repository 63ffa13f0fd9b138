//! Tests for fieldmap-model types.

use fieldmap_model::{
    CanonicalField, FieldAssignment, FieldResolution, MatchCandidate, MatchMethod,
    ResolutionResult, SemanticCategory, UNMAPPED, ValueKind,
};

fn stock_field() -> CanonicalField {
    CanonicalField::new("stock", "products", SemanticCategory::Quantity)
        .with_name("zh", "库存")
        .with_name("en", "Stock")
        .with_synonyms(["库存数", "inventory", "库存数"])
        .with_platform_synonyms("shopee", ["可售库存"])
        .required(true)
}

#[test]
fn category_accepts_dictionary_data_types() {
    assert_eq!(
        "currency".parse::<SemanticCategory>().unwrap(),
        SemanticCategory::Amount
    );
    assert_eq!(
        " Integer ".parse::<SemanticCategory>().unwrap(),
        SemanticCategory::Quantity
    );
    assert_eq!(
        "date".parse::<SemanticCategory>().unwrap(),
        SemanticCategory::Datetime
    );
    assert!("blob".parse::<SemanticCategory>().is_err());
}

#[test]
fn untyped_decimals_are_not_money() {
    for name in ["decimal", "float", "Numeric"] {
        assert_eq!(
            name.parse::<SemanticCategory>().unwrap(),
            SemanticCategory::Quantity
        );
    }
    assert_eq!(
        "money".parse::<SemanticCategory>().unwrap(),
        SemanticCategory::Amount
    );
}

#[test]
fn builder_deduplicates_synonyms() {
    let field = stock_field();
    assert_eq!(field.synonyms, vec!["库存数", "inventory"]);
    assert_eq!(field.synonyms_for_platform("shopee"), ["可售库存"]);
    assert!(field.synonyms_for_platform("tiktok").is_empty());
    assert_eq!(field.display_name(), "库存");
}

#[test]
fn general_fields_are_visible_everywhere() {
    let shop = CanonicalField::new("shop_id", "general", SemanticCategory::Dimension);
    assert!(shop.is_visible_in("orders"));
    assert!(shop.is_visible_in("products"));
    assert!(stock_field().is_visible_in("products"));
    assert!(!stock_field().is_visible_in("orders"));
}

#[test]
fn validate_rejects_sentinel_and_blank_codes() {
    assert!(stock_field().validate().is_ok());
    let blank = CanonicalField::new("  ", "orders", SemanticCategory::Text);
    assert!(blank.validate().is_err());
    let sentinel = CanonicalField::new(UNMAPPED, "orders", SemanticCategory::Text);
    assert!(sentinel.validate().is_err());
}

#[test]
fn candidate_confidence_is_clamped() {
    let high = MatchCandidate::new("h", "f", 1.4, MatchMethod::FuzzyMatch);
    let nan = MatchCandidate::new("h", "f", f32::NAN, MatchMethod::FuzzyMatch);
    assert_eq!(high.confidence, 1.0);
    assert_eq!(nan.confidence, 0.0);
}

#[test]
fn records_report_fallback_and_unmapped() {
    let mut result = ResolutionResult::new("orders", None);
    result.push(
        "运费",
        FieldResolution::Mapped(FieldAssignment {
            field_code: "shipping_fee".to_string(),
            confidence: 0.82,
            method: MatchMethod::ValuePattern(ValueKind::Currency),
            fallback: false,
            rationale: None,
        }),
    );
    result.push(
        "商品",
        FieldResolution::Mapped(FieldAssignment {
            field_code: "product_id".to_string(),
            confidence: 0.765,
            method: MatchMethod::ContainsMatch,
            fallback: true,
            rationale: None,
        }),
    );
    result.push("随机列X", FieldResolution::Unmapped);

    let records = result.to_records();
    assert_eq!(records[0].method, "value_pattern_currency");
    assert_eq!(records[1].method, "contains_match_fallback");
    assert_eq!(records[2].standard_field_code, UNMAPPED);
    assert_eq!(records[2].method, "no_match");
    assert_eq!(records[2].confidence, 0.0);
    assert_eq!(result.field_for("运费"), Some("shipping_fee"));
    assert_eq!(result.unmapped_headers(), vec!["随机列X"]);
    assert_eq!(result.mapped().count(), 2);
}

#[test]
fn result_serializes() {
    let mut result = ResolutionResult::new("products", Some("shopee".to_string()));
    result.push("随机列X", FieldResolution::Unmapped);
    let json = serde_json::to_string(&result).expect("serialize result");
    assert!(json.contains("\"status\":\"unmapped\""));
    let round: ResolutionResult = serde_json::from_str(&json).expect("deserialize result");
    assert_eq!(round, result);
}
