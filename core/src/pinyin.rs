//! Syllable identifiers and the pinyin entry model.
//!
//! A Mandarin syllable is identified by a `(sheng, yun)` pair of small ids
//! drawn from the closed tables below. `YUN_ZERO` marks an initial-only
//! (incomplete) syllable. The parser emits `Pinyin` entries; the dictionary
//! is keyed by id sequences.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const SHENG_ZERO: u8 = 0;
pub const SHENG_B: u8 = 1;
pub const SHENG_C: u8 = 2;
pub const SHENG_CH: u8 = 3;
pub const SHENG_D: u8 = 4;
pub const SHENG_F: u8 = 5;
pub const SHENG_G: u8 = 6;
pub const SHENG_H: u8 = 7;
pub const SHENG_J: u8 = 8;
pub const SHENG_K: u8 = 9;
pub const SHENG_L: u8 = 10;
pub const SHENG_M: u8 = 11;
pub const SHENG_N: u8 = 12;
pub const SHENG_P: u8 = 13;
pub const SHENG_Q: u8 = 14;
pub const SHENG_R: u8 = 15;
pub const SHENG_S: u8 = 16;
pub const SHENG_SH: u8 = 17;
pub const SHENG_T: u8 = 18;
pub const SHENG_W: u8 = 19;
pub const SHENG_X: u8 = 20;
pub const SHENG_Y: u8 = 21;
pub const SHENG_Z: u8 = 22;
pub const SHENG_ZH: u8 = 23;

/// Sentinel final of an initial-only syllable.
pub const YUN_ZERO: u8 = 0;
pub const YUN_A: u8 = 1;
pub const YUN_AI: u8 = 2;
pub const YUN_AN: u8 = 3;
pub const YUN_ANG: u8 = 4;
pub const YUN_AO: u8 = 5;
pub const YUN_E: u8 = 6;
pub const YUN_EI: u8 = 7;
pub const YUN_EN: u8 = 8;
pub const YUN_ENG: u8 = 9;
pub const YUN_ER: u8 = 10;
pub const YUN_I: u8 = 11;
pub const YUN_IA: u8 = 12;
pub const YUN_IAN: u8 = 13;
pub const YUN_IANG: u8 = 14;
pub const YUN_IAO: u8 = 15;
pub const YUN_IE: u8 = 16;
pub const YUN_IN: u8 = 17;
pub const YUN_ING: u8 = 18;
pub const YUN_IONG: u8 = 19;
pub const YUN_IU: u8 = 20;
pub const YUN_O: u8 = 21;
pub const YUN_ONG: u8 = 22;
pub const YUN_OU: u8 = 23;
pub const YUN_U: u8 = 24;
pub const YUN_UA: u8 = 25;
pub const YUN_UAI: u8 = 26;
pub const YUN_UAN: u8 = 27;
pub const YUN_UANG: u8 = 28;
pub const YUN_UE: u8 = 29;
pub const YUN_UI: u8 = 30;
pub const YUN_UN: u8 = 31;
pub const YUN_UO: u8 = 32;
pub const YUN_V: u8 = 33;

/// Latin spelling of each initial, indexed by sheng id.
pub const SHENG_TEXT: [&str; 24] = [
    "", "b", "c", "ch", "d", "f", "g", "h", "j", "k", "l", "m", "n", "p", "q", "r", "s", "sh",
    "t", "w", "x", "y", "z", "zh",
];

/// Latin spelling of each final, indexed by yun id. Index 0 is the
/// incomplete-syllable sentinel and renders empty.
pub const YUN_TEXT: [&str; 34] = [
    "", "a", "ai", "an", "ang", "ao", "e", "ei", "en", "eng", "er", "i", "ia", "ian", "iang",
    "iao", "ie", "in", "ing", "iong", "iu", "o", "ong", "ou", "u", "ua", "uai", "uan", "uang",
    "ue", "ui", "un", "uo", "v",
];

static SHENG_BY_TEXT: Lazy<HashMap<&'static str, u8>> = Lazy::new(|| {
    SHENG_TEXT
        .iter()
        .enumerate()
        .skip(1)
        .map(|(i, s)| (*s, i as u8))
        .collect()
});

static YUN_BY_TEXT: Lazy<HashMap<&'static str, u8>> = Lazy::new(|| {
    let mut m: HashMap<&'static str, u8> = YUN_TEXT
        .iter()
        .enumerate()
        .skip(1)
        .map(|(i, s)| (*s, i as u8))
        .collect();
    // spelling alias after j/q/x/y and n/l
    m.insert("ve", YUN_UE);
    m
});

/// One syllable identifier pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PinyinId {
    pub sheng: u8,
    pub yun: u8,
}

impl PinyinId {
    pub const fn new(sheng: u8, yun: u8) -> Self {
        Self { sheng, yun }
    }

    pub fn sheng_text(&self) -> &'static str {
        SHENG_TEXT[self.sheng as usize]
    }

    pub fn yun_text(&self) -> &'static str {
        YUN_TEXT[self.yun as usize]
    }
}

/// One recognized syllable occurrence in the input.
///
/// `ids[0]` is the exact identifier; `ids[1]` and `ids[2]` are fuzzy
/// alternatives the parser derived (a copy of `ids[0]` when there is none).
/// `len` counts input characters this entry consumed, including syllable
/// separators (full pinyin) or trailing tone marks (Bopomofo keys).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pinyin {
    pub text: String,
    pub bopomofo: String,
    pub len: usize,
    pub ids: [PinyinId; 3],
}

impl Pinyin {
    /// Build an entry for an exact syllable with no alternatives yet.
    pub fn new(sheng: u8, yun: u8, len: usize) -> Self {
        let id = PinyinId::new(sheng, yun);
        Self {
            text: format!("{}{}", id.sheng_text(), id.yun_text()),
            bopomofo: crate::bopomofo::bopomofo_of(sheng, yun),
            len,
            ids: [id; 3],
        }
    }

    pub fn id(&self) -> PinyinId {
        self.ids[0]
    }

    pub fn sheng_text(&self) -> &'static str {
        self.ids[0].sheng_text()
    }

    pub fn yun_text(&self) -> &'static str {
        self.ids[0].yun_text()
    }
}

/// Look up an initial spelling ("zh", "n", ...) alone.
pub fn initial_id(text: &str) -> Option<u8> {
    SHENG_BY_TEXT.get(text).copied()
}

/// Decompose one complete syllable spelling into `(sheng, yun)`.
///
/// Two-letter initials win over one-letter prefixes ("chang" is `ch+ang`,
/// never `c+hang`); a spelling with no initial is looked up as a bare final.
pub fn syllable_ids(text: &str) -> Option<PinyinId> {
    if !text.is_ascii() {
        return None;
    }
    for init_len in [2usize, 1] {
        if text.len() > init_len {
            if let Some(&sheng) = SHENG_BY_TEXT.get(&text[..init_len]) {
                if let Some(&yun) = YUN_BY_TEXT.get(&text[init_len..]) {
                    return Some(PinyinId::new(sheng, yun));
                }
            }
        }
    }
    YUN_BY_TEXT
        .get(text)
        .map(|&yun| PinyinId::new(SHENG_ZERO, yun))
}

/// Decompose a whole-phrase spelling with `'` or space separators,
/// e.g. `"ni'hao"` or `"zhong guo"`.
pub fn sequence_ids(text: &str) -> Option<Vec<PinyinId>> {
    let mut out = Vec::new();
    for part in text.split(|c| c == '\'' || c == ' ') {
        if part.is_empty() {
            continue;
        }
        out.push(syllable_ids(part)?);
    }
    if out.is_empty() {
        None
    } else {
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decompose_prefers_long_initial() {
        assert_eq!(syllable_ids("chang"), Some(PinyinId::new(SHENG_CH, YUN_ANG)));
        assert_eq!(syllable_ids("zha"), Some(PinyinId::new(SHENG_ZH, YUN_A)));
        assert_eq!(syllable_ids("ni"), Some(PinyinId::new(SHENG_N, YUN_I)));
    }

    #[test]
    fn decompose_zero_initial() {
        assert_eq!(syllable_ids("an"), Some(PinyinId::new(SHENG_ZERO, YUN_AN)));
        assert_eq!(syllable_ids("er"), Some(PinyinId::new(SHENG_ZERO, YUN_ER)));
        assert_eq!(syllable_ids("xq"), None);
    }

    #[test]
    fn sequence_with_separators() {
        let ids = sequence_ids("ni'hao").unwrap();
        assert_eq!(ids.len(), 2);
        assert_eq!(ids[0], PinyinId::new(SHENG_N, YUN_I));
        assert_eq!(ids[1], PinyinId::new(SHENG_H, YUN_AO));
        assert_eq!(sequence_ids("zhong guo").unwrap().len(), 2);
        assert_eq!(sequence_ids("q'x"), None);
    }

    #[test]
    fn id_text_roundtrip() {
        let id = PinyinId::new(SHENG_SH, YUN_UANG);
        assert_eq!(id.sheng_text(), "sh");
        assert_eq!(id.yun_text(), "uang");
        let p = Pinyin::new(SHENG_SH, YUN_UANG, 6);
        assert_eq!(p.text, "shuang");
    }
}
