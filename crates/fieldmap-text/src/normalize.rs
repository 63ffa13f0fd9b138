//! Canonical form for header text.
//!
//! Every comparison the resolver makes runs on the output of [`normalize`]:
//! compatibility-folded (full-width to ASCII), lowercased, Latin diacritics
//! removed, whitespace and separator punctuation dropped.

use unicode_normalization::UnicodeNormalization;

// `to_lowercase` can emit combining marks (U+0130) and NFKC can emit
// uppercase (U+1D2C), so one pass is not always a fixed point.
const MAX_PASSES: usize = 8;

/// Normalize a header into its canonical comparison form.
///
/// Idempotent: `normalize(&normalize(x)) == normalize(x)`. Blank input
/// yields an empty string.
pub fn normalize(text: &str) -> String {
    let mut current = normalize_pass(text);
    for _ in 1..MAX_PASSES {
        let next = normalize_pass(&current);
        if next == current {
            break;
        }
        current = next;
    }
    current
}

fn normalize_pass(text: &str) -> String {
    fold(text).chars().filter(|c| keep_char(*c)).collect()
}

/// NFKC + lowercase + diacritic removal, separators left in place.
pub(crate) fn fold(text: &str) -> String {
    let lowered = text.nfkc().collect::<String>().to_lowercase();
    strip_diacritics(&lowered)
}

pub(crate) fn strip_diacritics(text: &str) -> String {
    text.nfkd().filter(|c| !is_latin_diacritic(*c)).nfkc().collect()
}

/// Combining Diacritical Marks block only; kana voicing marks stay.
fn is_latin_diacritic(c: char) -> bool {
    ('\u{0300}'..='\u{036F}').contains(&c)
}

fn keep_char(c: char) -> bool {
    if c.is_whitespace() || c.is_control() {
        return false;
    }
    !matches!(
        c,
        '-' | '_'
            | '/'
            | '\\'
            | '('
            | ')'
            | '['
            | ']'
            | '{'
            | '}'
            | '.'
            | ','
            | ':'
            | ';'
            | '|'
            | '\''
            | '"'
            | '`'
            | '*'
            | '\u{200B}'
            | '\u{200C}'
            | '\u{200D}'
            | '\u{2060}'
            | '\u{FEFF}'
            | '\u{00B7}'
            | '\u{2010}'..='\u{2015}'
            | '\u{2018}'..='\u{201F}'
            | '\u{3001}'
            | '\u{3002}'
            | '\u{3008}'..='\u{3011}'
            | '\u{3014}'..='\u{301B}'
            | '\u{30FB}'
    )
}

const OPEN_BRACKETS: [char; 5] = ['(', '[', '\u{3010}', '\u{FF08}', '\u{FF3B}'];
const CLOSE_BRACKETS: [char; 5] = [')', ']', '\u{3011}', '\u{FF09}', '\u{FF3D}'];

/// Remove bracketed annotations such as units: `销售额(元)` -> `销售额`.
///
/// An opening bracket that is never closed is kept as literal text.
pub fn strip_annotations(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending = String::new();
    let mut depth = 0usize;
    for c in raw.chars() {
        if OPEN_BRACKETS.contains(&c) {
            depth += 1;
            pending.push(c);
        } else if CLOSE_BRACKETS.contains(&c) && depth > 0 {
            depth -= 1;
            if depth == 0 {
                pending.clear();
            } else {
                pending.push(c);
            }
        } else if depth > 0 {
            pending.push(c);
        } else {
            out.push(c);
        }
    }
    out.push_str(&pending);
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_drops_separators() {
        assert_eq!(normalize("Product Name"), "productname");
        assert_eq!(normalize("product_name"), "productname");
        assert_eq!(normalize(" Order-ID "), "orderid");
        assert_eq!(normalize("a/b\\c.d"), "abcd");
    }

    #[test]
    fn folds_full_width_forms() {
        assert_eq!(normalize("ＳＫＵ"), "sku");
        assert_eq!(normalize("商品（ID）"), "商品id");
        assert_eq!(normalize("转化率％"), "转化率%");
        assert_eq!(normalize("订单【状态】"), "订单状态");
    }

    #[test]
    fn removes_latin_diacritics() {
        assert_eq!(normalize("Préço Unitário"), "precounitario");
        assert_eq!(normalize("Número do Pedido"), "numerodopedido");
    }

    #[test]
    fn keeps_kana_voicing() {
        assert_eq!(normalize("ガ"), "ガ");
    }

    #[test]
    fn blank_input_is_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \t\u{3000}"), "");
        assert_eq!(normalize("\u{FEFF}"), "");
    }

    #[test]
    fn problem_characters_reach_a_fixed_point() {
        for raw in ["İstanbul", "\u{1D2C}BC", "㎒", "Ⅻ"] {
            let once = normalize(raw);
            assert_eq!(normalize(&once), once, "{raw}");
        }
    }

    #[test]
    fn strips_bracketed_annotations() {
        assert_eq!(strip_annotations("销售额(元)"), "销售额");
        assert_eq!(strip_annotations("Price [USD]"), "Price");
        assert_eq!(strip_annotations("GMV（含税）"), "GMV");
        assert_eq!(strip_annotations("【新】商品ID"), "商品ID");
        assert_eq!(strip_annotations("a(b(c)d)e"), "ae");
    }

    #[test]
    fn unclosed_bracket_is_literal() {
        assert_eq!(strip_annotations("价格(元"), "价格(元");
        assert_eq!(strip_annotations("价格)"), "价格)");
    }
}
