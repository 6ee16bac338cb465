//! Text normalization for tolerant substring search.
//!
//! Hangul syllable blocks are split into their lead, vowel and trailing
//! compatibility jamo, and compound jamo are split further into their simple
//! parts, so `카ㅍ` typed mid-word still matches the stored text of `카페`.
//! Whitespace is dropped and every other character is kept as is.

use crate::domain::types::PlaceLabel;

const SYLLABLE_BASE: u32 = 0xAC00;
const SYLLABLE_LAST: u32 = 0xD7A3;
const VOWEL_COUNT: u32 = 21;
const TAIL_COUNT: u32 = 28;

const LEADS: [char; 19] = [
    'ㄱ', 'ㄲ', 'ㄴ', 'ㄷ', 'ㄸ', 'ㄹ', 'ㅁ', 'ㅂ', 'ㅃ', 'ㅅ', 'ㅆ', 'ㅇ', 'ㅈ', 'ㅉ', 'ㅊ', 'ㅋ',
    'ㅌ', 'ㅍ', 'ㅎ',
];

const VOWELS: [char; 21] = [
    'ㅏ', 'ㅐ', 'ㅑ', 'ㅒ', 'ㅓ', 'ㅔ', 'ㅕ', 'ㅖ', 'ㅗ', 'ㅘ', 'ㅙ', 'ㅚ', 'ㅛ', 'ㅜ', 'ㅝ', 'ㅞ',
    'ㅟ', 'ㅠ', 'ㅡ', 'ㅢ', 'ㅣ',
];

// Index 0 is "no trailing consonant".
const TAILS: [Option<char>; 28] = [
    None,
    Some('ㄱ'),
    Some('ㄲ'),
    Some('ㄳ'),
    Some('ㄴ'),
    Some('ㄵ'),
    Some('ㄶ'),
    Some('ㄷ'),
    Some('ㄹ'),
    Some('ㄺ'),
    Some('ㄻ'),
    Some('ㄼ'),
    Some('ㄽ'),
    Some('ㄾ'),
    Some('ㄿ'),
    Some('ㅀ'),
    Some('ㅁ'),
    Some('ㅂ'),
    Some('ㅄ'),
    Some('ㅅ'),
    Some('ㅆ'),
    Some('ㅇ'),
    Some('ㅈ'),
    Some('ㅊ'),
    Some('ㅋ'),
    Some('ㅌ'),
    Some('ㅍ'),
    Some('ㅎ'),
];

fn split_compound(jamo: char) -> Option<[char; 2]> {
    let parts = match jamo {
        'ㄳ' => ['ㄱ', 'ㅅ'],
        'ㄵ' => ['ㄴ', 'ㅈ'],
        'ㄶ' => ['ㄴ', 'ㅎ'],
        'ㄺ' => ['ㄹ', 'ㄱ'],
        'ㄻ' => ['ㄹ', 'ㅁ'],
        'ㄼ' => ['ㄹ', 'ㅂ'],
        'ㄽ' => ['ㄹ', 'ㅅ'],
        'ㄾ' => ['ㄹ', 'ㅌ'],
        'ㄿ' => ['ㄹ', 'ㅍ'],
        'ㅀ' => ['ㄹ', 'ㅎ'],
        'ㅄ' => ['ㅂ', 'ㅅ'],
        'ㅘ' => ['ㅗ', 'ㅏ'],
        'ㅙ' => ['ㅗ', 'ㅐ'],
        'ㅚ' => ['ㅗ', 'ㅣ'],
        'ㅝ' => ['ㅜ', 'ㅓ'],
        'ㅞ' => ['ㅜ', 'ㅔ'],
        'ㅟ' => ['ㅜ', 'ㅣ'],
        'ㅢ' => ['ㅡ', 'ㅣ'],
        _ => return None,
    };
    Some(parts)
}

fn push_jamo(out: &mut String, jamo: char) {
    match split_compound(jamo) {
        Some(parts) => out.extend(parts),
        None => out.push(jamo),
    }
}

fn push_char(out: &mut String, ch: char) {
    let code = ch as u32;
    if !(SYLLABLE_BASE..=SYLLABLE_LAST).contains(&code) {
        push_jamo(out, ch);
        return;
    }

    let index = code - SYLLABLE_BASE;
    let lead = index / (VOWEL_COUNT * TAIL_COUNT);
    let vowel = (index % (VOWEL_COUNT * TAIL_COUNT)) / TAIL_COUNT;
    let tail = index % TAIL_COUNT;

    push_jamo(out, LEADS[lead as usize]);
    push_jamo(out, VOWELS[vowel as usize]);
    if let Some(tail) = TAILS[tail as usize] {
        push_jamo(out, tail);
    }
}

/// Strips whitespace and decomposes Hangul into simple jamo.
///
/// Total and idempotent: the output only contains characters this function
/// maps to themselves.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len() * 2);
    for ch in text.chars().filter(|ch| !ch.is_whitespace()) {
        push_char(&mut out, ch);
    }
    out
}

/// Builds the stored search text of a place.
pub fn place_query(
    name: &str,
    label: PlaceLabel,
    address: &str,
    description: Option<&str>,
) -> String {
    let mut text = String::with_capacity(name.len() + address.len() + 16);
    text.push_str(name);
    text.push_str(label.as_str());
    text.push_str(address);
    if let Some(description) = description {
        text.push_str(description);
    }
    normalize(&text)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn empty_input_gives_empty_output() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize(" \t\n"), "");
    }

    #[test]
    fn decomposes_syllables_with_and_without_tail() {
        assert_eq!(normalize("카페"), "ㅋㅏㅍㅔ");
        assert_eq!(normalize("한글"), "ㅎㅏㄴㄱㅡㄹ");
    }

    #[test]
    fn splits_compound_vowels_and_tails() {
        // 닭 = ㄷ + ㅏ + ㄺ, 왜 = ㅇ + ㅙ
        assert_eq!(normalize("닭"), "ㄷㅏㄹㄱ");
        assert_eq!(normalize("왜"), "ㅇㅗㅐ");
        assert_eq!(normalize("ㄳ"), "ㄱㅅ");
    }

    #[test]
    fn keeps_latin_digits_and_punctuation() {
        assert_eq!(normalize("Cafe A-1, 2F"), "CafeA-1,2F");
    }

    #[test]
    fn partial_syllable_matches_normalized_text() {
        let stored = normalize("스타벅스 강남점");
        assert!(!"스타벅스 강남점".contains("스타벅ㅅ"));
        assert!(stored.contains(&normalize("스타벅ㅅ")));
        assert!(stored.contains(&normalize("강남")));
    }

    #[test]
    fn place_query_concatenates_fields_in_order() {
        let query = place_query("카페 A", PlaceLabel::Cafe, "서울 1", Some("new"));
        assert_eq!(query, "ㅋㅏㅍㅔACAFEㅅㅓㅇㅜㄹ1new");
    }

    proptest! {
        #[test]
        fn normalize_is_idempotent(text in "\\PC*") {
            let once = normalize(&text);
            prop_assert_eq!(normalize(&once), once);
        }

        #[test]
        fn normalize_handles_every_hangul_syllable(code in SYLLABLE_BASE..=SYLLABLE_LAST) {
            let ch = char::from_u32(code).unwrap();
            let out = normalize(&ch.to_string());
            prop_assert!(out.chars().count() >= 2);
            prop_assert!(out.chars().all(|c| split_compound(c).is_none()));
        }

        #[test]
        fn normalize_drops_all_whitespace(text in "[a-z 가-힣\t]{0,40}") {
            prop_assert!(!normalize(&text).chars().any(char::is_whitespace));
        }
    }
}
