//! Field inference from the shape of sample values.
//!
//! Each detector checks what share of the samples look like one value kind
//! (date, currency amount, integer quantity, ratio). The kind alone does not
//! say which field a column is, so a detector also needs a header keyword
//! that names a specific target field. Without one it stays silent.

use std::sync::LazyLock;

use regex::Regex;

use fieldmap_catalog::CatalogView;
use fieldmap_model::{MatchCandidate, MatchMethod, RawHeader, SemanticCategory, ValueKind};
use fieldmap_text::normalize;

use crate::options::EngineOptions;

static DATE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"^(?:\d{4}[-/.]\d{1,2}[-/.]\d{1,2}|\d{1,2}[-/]\d{1,2}[-/]\d{4}|\d{4}年\d{1,2}月\d{1,2}日)",
    )
    .ok()
});

static CURRENCY: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"(?ix)^(?:
            (?:R\$|US\$|S\$|RM|Rp|[$¥￥€£₱฿₫])\s*-?[\d,]+(?:\.\d+)?
          | (?:USD|CNY|RMB|SGD|BRL|MYR|THB|IDR|PHP|VND|EUR)\s*-?[\d,]+(?:\.\d+)?
          | -?[\d,]+(?:\.\d+)?\s*(?:元|USD|CNY|RMB|SGD|BRL|MYR)
          | -?[\d,]+\.\d{2}
        )$",
    )
    .ok()
});

static INTEGER: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^(?:\d{1,3}(?:,\d{3})*|\d+)$").ok());

static RATIO: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^(?:\d+(?:\.\d+)?%|0\.\d+)$").ok());

fn matches(pattern: &LazyLock<Option<Regex>>, value: &str) -> bool {
    pattern.as_ref().is_some_and(|re| re.is_match(value))
}

/// Header keywords that point a detected kind at one field.
struct TargetRule {
    any: &'static [&'static str],
    /// When non-empty, one of these must also appear.
    also: &'static [&'static str],
    field_code: &'static str,
}

const fn rule(any: &'static [&'static str], field_code: &'static str) -> TargetRule {
    TargetRule {
        any,
        also: &[],
        field_code,
    }
}

struct Detector {
    kind: ValueKind,
    confidence: f32,
    /// Minimum share of inspected samples that must match.
    min_share: f32,
    pattern: &'static LazyLock<Option<Regex>>,
    /// Header must contain one of these before any rule is tried.
    /// Empty means the target rules alone decide.
    gate: &'static [&'static str],
    rules: &'static [TargetRule],
    /// Fall back to the only field of the matching category in view.
    sole_field_fallback: bool,
}

const DATE_RULES: &[TargetRule] = &[
    rule(&["付款", "支付", "payment", "paid", "pay"], "payment_date"),
    rule(&["发货", "ship"], "ship_date"),
    rule(&["上架", "listing", "listed"], "listing_date"),
    rule(&["下单", "订单", "创建", "order", "created"], "order_date"),
    rule(&["统计", "日期", "date", "day"], "metric_date"),
];

const AMOUNT_KEYWORDS: &[&str] = &[
    "金额", "价格", "价", "费", "优惠", "折扣", "额", "税", "amount", "price", "fee", "discount",
    "voucher", "cost", "total", "payment", "paid", "gmv", "revenue", "tax",
];

const CURRENCY_RULES: &[TargetRule] = &[
    rule(
        &["运费", "邮费", "物流", "shipping", "freight", "delivery"],
        "shipping_fee",
    ),
    TargetRule {
        any: &["优惠", "折扣", "discount", "voucher"],
        also: &["平台", "platform"],
        field_code: "platform_discount",
    },
    rule(&["优惠", "折扣", "discount", "voucher"], "seller_discount"),
    rule(&["税", "tax", "vat"], "tax_amount"),
    rule(&["实付", "支付", "付款", "paid", "payment"], "paid_amount"),
    rule(&["成本", "进货", "cost"], "cost_price"),
    rule(&["单价", "unitprice"], "unit_price"),
    rule(&["单价", "价格", "售价", "price"], "price"),
    rule(&["小计", "subtotal"], "subtotal"),
    rule(&["销售额", "成交", "gmv", "revenue", "sales"], "sales_amount"),
    rule(&["总", "合计", "订单金额", "total", "orderamount"], "total_amount"),
];

const QUANTITY_RULES: &[TargetRule] = &[
    rule(&["库存", "stock", "inventory"], "stock"),
    rule(&["访客", "visitor", "uv"], "visitors"),
    rule(&["浏览", "view", "pv"], "page_views"),
    rule(&["销量", "售出", "sold", "salesvolume"], "sales_volume"),
    rule(&["评论", "评价", "review"], "review_count"),
    rule(&["加购", "cart"], "add_to_cart"),
    rule(&["数量", "件数", "quantity", "qty"], "quantity"),
];

const RATIO_KEYWORDS: &[&str] = &["率", "比例", "占比", "rate", "ratio", "cvr", "ctr", "%"];

const RATIO_RULES: &[TargetRule] = &[
    rule(&["点击", "click", "ctr"], "click_through_rate"),
    rule(&["跳失", "跳出", "bounce"], "bounce_rate"),
    rule(&["转化", "conversion", "cvr"], "conversion_rate"),
];

static DETECTORS: [Detector; 4] = [
    Detector {
        kind: ValueKind::Date,
        confidence: 0.85,
        min_share: 0.7,
        pattern: &DATE,
        gate: &[],
        rules: DATE_RULES,
        sole_field_fallback: true,
    },
    Detector {
        kind: ValueKind::Currency,
        confidence: 0.82,
        min_share: 0.5,
        pattern: &CURRENCY,
        gate: AMOUNT_KEYWORDS,
        rules: CURRENCY_RULES,
        sole_field_fallback: false,
    },
    Detector {
        kind: ValueKind::Quantity,
        confidence: 0.80,
        min_share: 0.8,
        pattern: &INTEGER,
        gate: &[],
        rules: QUANTITY_RULES,
        sole_field_fallback: false,
    },
    Detector {
        kind: ValueKind::Ratio,
        confidence: 0.78,
        min_share: 0.6,
        pattern: &RATIO,
        gate: RATIO_KEYWORDS,
        rules: RATIO_RULES,
        sole_field_fallback: false,
    },
];

fn category_for(kind: ValueKind) -> SemanticCategory {
    match kind {
        ValueKind::Date => SemanticCategory::Datetime,
        ValueKind::Currency => SemanticCategory::Amount,
        ValueKind::Quantity => SemanticCategory::Quantity,
        ValueKind::Ratio => SemanticCategory::Ratio,
    }
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| text.contains(kw))
}

/// Infer a field for a header from its sample values.
///
/// Returns `None` when there are too few non-empty samples, no detector
/// reaches its share, or no header keyword picks a target field.
pub fn detect(
    view: &CatalogView<'_>,
    header: &RawHeader,
    options: &EngineOptions,
) -> Option<MatchCandidate> {
    let normalized = normalize(&header.text);
    if normalized.is_empty() {
        return None;
    }
    let samples: Vec<&str> = header
        .non_empty_samples()
        .take(options.max_sample_values.max(1))
        .collect();
    if samples.len() < options.min_sample_values.max(1) {
        return None;
    }

    DETECTORS
        .iter()
        .find_map(|detector| run_detector(detector, view, &header.text, &normalized, &samples))
}

fn run_detector(
    detector: &Detector,
    view: &CatalogView<'_>,
    raw: &str,
    normalized: &str,
    samples: &[&str],
) -> Option<MatchCandidate> {
    let hits = samples
        .iter()
        .filter(|value| matches(detector.pattern, value))
        .count();
    let share = hits as f32 / samples.len() as f32;
    if share < detector.min_share {
        return None;
    }
    if !detector.gate.is_empty() && !contains_any(normalized, detector.gate) {
        return None;
    }

    let category = category_for(detector.kind);
    let accepts = |code: &str| {
        view.field(code)
            .filter(|field| field.semantic_category == category)
    };
    let target = detector
        .rules
        .iter()
        .filter(|rule| contains_any(normalized, rule.any))
        .filter(|rule| rule.also.is_empty() || contains_any(normalized, rule.also))
        .find_map(|rule| accepts(rule.field_code))
        .or_else(|| {
            if !detector.sole_field_fallback {
                return None;
            }
            let mut of_kind = view
                .fields()
                .filter(|field| field.semantic_category == category);
            match (of_kind.next(), of_kind.next()) {
                (Some(only), None) => Some(only),
                _ => None,
            }
        })?;

    Some(
        MatchCandidate::new(
            raw,
            target.field_code.as_str(),
            detector.confidence,
            MatchMethod::ValuePattern(detector.kind),
        )
        .with_rationale(format!(
            "{} pattern in {hits}/{} samples",
            detector.kind,
            samples.len()
        )),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldmap_catalog::Catalog;
    use fieldmap_model::CanonicalField;

    fn catalog() -> Catalog {
        Catalog::from_fields([
            CanonicalField::new("order_date", "orders", SemanticCategory::Datetime),
            CanonicalField::new("shipping_fee", "orders", SemanticCategory::Amount),
            CanonicalField::new("platform_discount", "orders", SemanticCategory::Amount),
            CanonicalField::new("seller_discount", "orders", SemanticCategory::Amount),
            CanonicalField::new("quantity", "orders", SemanticCategory::Quantity),
            CanonicalField::new("conversion_rate", "orders", SemanticCategory::Ratio),
            CanonicalField::new("stock", "orders", SemanticCategory::Text),
        ])
    }

    fn run(header: &str, samples: &[&str]) -> Option<MatchCandidate> {
        let catalog = catalog();
        let view = catalog.view("orders", None).unwrap();
        let header = RawHeader::new(header).with_samples(samples.iter().copied());
        detect(&view, &header, &EngineOptions::default())
    }

    #[test]
    fn patterns_compile() {
        for pattern in [&DATE, &CURRENCY, &INTEGER, &RATIO] {
            assert!(pattern.is_some());
        }
    }

    #[test]
    fn currency_with_shipping_keyword() {
        let hit = run("运费", &["12.50", "8.00", "15.30"]).unwrap();
        assert_eq!(hit.field_code, "shipping_fee");
        assert_eq!(hit.confidence, 0.82);
        assert_eq!(hit.method.as_str(), "value_pattern_currency");
    }

    #[test]
    fn grouped_thousands_count_as_currency() {
        let hit = run("运费", &["1,234.50", "2,000.00", "15.30"]).unwrap();
        assert_eq!(hit.field_code, "shipping_fee");
        assert_eq!(hit.method, MatchMethod::ValuePattern(ValueKind::Currency));
    }

    #[test]
    fn discount_target_depends_on_platform_keyword() {
        let samples = ["¥5", "¥10.00", "¥2.5"];
        assert_eq!(run("平台优惠", &samples).unwrap().field_code, "platform_discount");
        assert_eq!(run("店铺优惠券", &samples).unwrap().field_code, "seller_discount");
    }

    #[test]
    fn currency_without_amount_keyword_is_silent() {
        assert!(run("备注", &["12.50", "8.00", "15.30"]).is_none());
    }

    #[test]
    fn dates_fall_back_to_the_only_date_field() {
        let hit = run("时间", &["2024-09-25", "2024/09/26", "25/09/2024"]).unwrap();
        assert_eq!(hit.field_code, "order_date");
        assert_eq!(hit.confidence, 0.85);
    }

    #[test]
    fn quantity_needs_a_target_of_the_right_category() {
        let samples = ["1", "2", "1,200", "30"];
        assert_eq!(run("购买数量", &samples).unwrap().field_code, "quantity");
        // stock exists but is not a quantity field here
        assert!(run("库存", &samples).is_none());
    }

    #[test]
    fn ratio_requires_matching_rule() {
        let samples = ["5%", "0.12", "3.5%"];
        assert_eq!(run("转化率", &samples).unwrap().field_code, "conversion_rate");
        assert!(run("退款率", &samples).is_none());
    }

    #[test]
    fn too_few_samples_or_blank_header() {
        assert!(run("运费", &["12.50", "", "  "]).is_none());
        assert!(run("", &["12.50", "8.00", "15.30"]).is_none());
    }

    #[test]
    fn share_below_threshold_is_rejected() {
        assert!(run("运费", &["12.50", "n/a", "free", "tbd"]).is_none());
    }
}
