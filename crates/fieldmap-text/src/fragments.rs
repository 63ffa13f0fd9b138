//! Short keyword fragments used by the keyword index.
//!
//! Latin text is split into words (on separators, camelCase and
//! letter/digit boundaries). CJK runs have no word boundaries, so every
//! 2 to 4 character window of a run is emitted instead.

use std::ops::Range;

use unicode_normalization::UnicodeNormalization;

use crate::normalize::strip_diacritics;

const MIN_WORD_LEN: usize = 2;
const MIN_GRAM: usize = 2;
const MAX_GRAM: usize = 4;

/// One keyword fragment and the character span it covers in the folded text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub text: String,
    pub span: Range<usize>,
}

/// Fragments of a text plus the number of characters that carry meaning
/// (CJK characters and accepted words), used as the coverage denominator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragments {
    pub items: Vec<Fragment>,
    pub content_len: usize,
}

impl Fragments {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|fragment| fragment.text.as_str())
    }
}

/// True for Han ideographs, kana and Hangul syllables.
pub fn is_cjk(c: char) -> bool {
    matches!(
        c,
        '\u{3040}'..='\u{30FF}'
            | '\u{3400}'..='\u{4DBF}'
            | '\u{4E00}'..='\u{9FFF}'
            | '\u{AC00}'..='\u{D7AF}'
            | '\u{F900}'..='\u{FAFF}'
    ) && c != '\u{30FB}'
}

/// Display-ish width: CJK characters count double.
pub fn text_width(text: &str) -> usize {
    text.chars().map(|c| if is_cjk(c) { 2 } else { 1 }).sum()
}

/// Split text into keyword fragments.
pub fn fragments(text: &str) -> Fragments {
    let folded = strip_diacritics(&text.nfkc().collect::<String>());
    let chars: Vec<char> = folded.chars().collect();
    let mut out = Fragments::default();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if is_cjk(c) {
            let start = i;
            while i < chars.len() && is_cjk(chars[i]) {
                i += 1;
            }
            push_grams(&chars, start..i, &mut out);
            out.content_len += i - start;
        } else if c.is_alphanumeric() {
            let start = i;
            i += 1;
            while i < chars.len()
                && chars[i].is_alphanumeric()
                && !is_cjk(chars[i])
                && !is_word_boundary(chars[i - 1], chars[i])
            {
                i += 1;
            }
            let word: String = chars[start..i].iter().collect::<String>().to_lowercase();
            if accept_word(&word) {
                out.content_len += i - start;
                out.items.push(Fragment {
                    text: word,
                    span: start..i,
                });
            }
        } else {
            i += 1;
        }
    }
    out
}

fn push_grams(chars: &[char], run: Range<usize>, out: &mut Fragments) {
    let run_len = run.end - run.start;
    for size in MIN_GRAM..=MAX_GRAM.min(run_len) {
        for start in run.start..=run.end - size {
            out.items.push(Fragment {
                text: chars[start..start + size].iter().collect(),
                span: start..start + size,
            });
        }
    }
}

fn is_word_boundary(prev: char, next: char) -> bool {
    (prev.is_lowercase() && next.is_uppercase())
        || (prev.is_alphabetic() && next.is_numeric())
        || (prev.is_numeric() && next.is_alphabetic())
}

fn accept_word(word: &str) -> bool {
    word.chars().count() >= MIN_WORD_LEN
        && !word.chars().all(|c| c.is_numeric())
        && !is_stopword(word)
}

fn is_stopword(token: &str) -> bool {
    matches!(
        token,
        "of" | "and"
            | "the"
            | "to"
            | "for"
            | "in"
            | "on"
            | "at"
            | "with"
            | "by"
            | "from"
            | "or"
            | "an"
            | "per"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(text: &str) -> Vec<String> {
        fragments(text).texts().map(str::to_string).collect()
    }

    #[test]
    fn splits_latin_words() {
        assert_eq!(texts("Product Name"), vec!["product", "name"]);
        assert_eq!(texts("unitPrice"), vec!["unit", "price"]);
        assert_eq!(texts("top10_items"), vec!["top", "items"]);
    }

    #[test]
    fn drops_stopwords_and_single_letters() {
        let frags = fragments("Number of X");
        assert_eq!(
            frags.texts().collect::<Vec<_>>(),
            vec!["number"]
        );
        assert_eq!(frags.content_len, 6);
    }

    #[test]
    fn emits_cjk_windows() {
        let frags = fragments("商品名称");
        let grams: Vec<&str> = frags.texts().collect();
        assert_eq!(
            grams,
            vec!["商品", "品名", "名称", "商品名", "品名称", "商品名称"]
        );
        assert_eq!(frags.content_len, 4);
        assert_eq!(frags.items[2].span, 2..4);
    }

    #[test]
    fn single_cjk_char_counts_as_content_only() {
        let frags = fragments("率");
        assert!(frags.is_empty());
        assert_eq!(frags.content_len, 1);
    }

    #[test]
    fn mixed_scripts() {
        let frags = fragments("商品ID");
        assert_eq!(frags.texts().collect::<Vec<_>>(), vec!["商品", "id"]);
        assert_eq!(frags.content_len, 4);
    }

    #[test]
    fn width_counts_cjk_double() {
        assert_eq!(text_width("sku"), 3);
        assert_eq!(text_width("运费"), 4);
    }
}
