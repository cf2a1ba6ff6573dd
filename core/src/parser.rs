//! Syllable parser contract and a greedy reference implementation.
//!
//! The contexts depend only on the `SyllableParser` trait; segmentation
//! quality is the parser's business. `GreedyParser` is a longest-match
//! segmenter over the built-in syllable tables, good enough for tests,
//! tools and simple embeddings.

use crate::bopomofo::{self, is_tone};
use crate::pinyin::{self, Pinyin, PinyinId, YUN_ZERO};
use crate::PINYIN_INCOMPLETE_PINYIN;

/// Segments raw input into pinyin entries.
///
/// Both entry points consume `input[..valid_len]` at most, emit up to
/// `max_len` entries, and return the entries plus the number of input
/// characters actually consumed (which may be less than `valid_len` when the
/// tail is unparseable). Each entry's `len` counts consumed characters
/// including syllable separators (full pinyin) or trailing tone marks
/// (Bopomofo); the sum of entry lengths equals the returned count.
///
/// `ids[0]` of every entry is the exact identifier; implementations may fill
/// `ids[1]`/`ids[2]` with fuzzy alternatives (`c`↔`ch` and friends) for the
/// query layer to expand. Unfilled alternatives stay equal to `ids[0]`.
pub trait SyllableParser: Send + Sync {
    /// Segment lowercase Latin text (apostrophe allowed as separator).
    fn parse(&self, text: &str, valid_len: usize, option: u32, max_len: usize)
        -> (Vec<Pinyin>, usize);

    /// Segment a Bopomofo glyph-id sequence (one id per typed key).
    fn parse_bopomofo(
        &self,
        glyphs: &[u8],
        valid_len: usize,
        option: u32,
        max_len: usize,
    ) -> (Vec<Pinyin>, usize);
}

/// Fuzzy partners of an initial, in alternative-slot order.
fn sheng_partners(sheng: u8) -> &'static [u8] {
    use crate::pinyin::*;
    match sheng {
        SHENG_C => &[SHENG_CH],
        SHENG_CH => &[SHENG_C],
        SHENG_Z => &[SHENG_ZH],
        SHENG_ZH => &[SHENG_Z],
        SHENG_S => &[SHENG_SH],
        SHENG_SH => &[SHENG_S],
        SHENG_L => &[SHENG_N, SHENG_R],
        SHENG_N => &[SHENG_L],
        SHENG_R => &[SHENG_L],
        SHENG_F => &[SHENG_H],
        SHENG_H => &[SHENG_F],
        SHENG_K => &[SHENG_G],
        SHENG_G => &[SHENG_K],
        _ => &[],
    }
}

/// Fuzzy partner of a final, if any.
fn yun_partner(yun: u8) -> Option<u8> {
    use crate::pinyin::*;
    match yun {
        YUN_AN => Some(YUN_ANG),
        YUN_ANG => Some(YUN_AN),
        YUN_EN => Some(YUN_ENG),
        YUN_ENG => Some(YUN_EN),
        YUN_IN => Some(YUN_ING),
        YUN_ING => Some(YUN_IN),
        YUN_IAN => Some(YUN_IANG),
        YUN_IANG => Some(YUN_IAN),
        YUN_UAN => Some(YUN_UANG),
        YUN_UANG => Some(YUN_UAN),
        _ => None,
    }
}

fn fill_alternatives(p: &mut Pinyin) {
    let id = p.ids[0];
    let partners = sheng_partners(id.sheng);
    let s1 = partners.first().copied().unwrap_or(id.sheng);
    let s2 = partners.get(1).copied().unwrap_or(id.sheng);
    let y1 = yun_partner(id.yun).unwrap_or(id.yun);
    p.ids[1] = PinyinId::new(s1, y1);
    p.ids[2] = PinyinId::new(s2, id.yun);
}

fn make_entry(id: PinyinId, len: usize) -> Pinyin {
    let mut p = Pinyin::new(id.sheng, id.yun, len);
    fill_alternatives(&mut p);
    p
}

/// Greedy longest-match segmenter over the built-in syllable table.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyParser;

impl GreedyParser {
    pub fn new() -> Self {
        Self
    }
}

const MAX_SYLLABLE_TEXT: usize = 6;
const MAX_INITIAL_TEXT: usize = 2;

impl SyllableParser for GreedyParser {
    fn parse(
        &self,
        text: &str,
        valid_len: usize,
        option: u32,
        max_len: usize,
    ) -> (Vec<Pinyin>, usize) {
        let end = valid_len.min(text.len());
        let text = &text[..end];
        let bytes = text.as_bytes();
        let mut out: Vec<Pinyin> = Vec::new();
        let mut pos = 0;

        while pos < bytes.len() && out.len() < max_len {
            let remaining = bytes.len() - pos;
            let mut matched: Option<(usize, PinyinId)> = None;

            for l in (1..=remaining.min(MAX_SYLLABLE_TEXT)).rev() {
                let slice = &text[pos..pos + l];
                if !slice.bytes().all(|b| b.is_ascii_lowercase()) {
                    continue;
                }
                if let Some(id) = pinyin::syllable_ids(slice) {
                    matched = Some((l, id));
                    break;
                }
            }

            if matched.is_none() && option & PINYIN_INCOMPLETE_PINYIN != 0 {
                for l in (1..=remaining.min(MAX_INITIAL_TEXT)).rev() {
                    let slice = &text[pos..pos + l];
                    if let Some(sheng) = pinyin::initial_id(slice) {
                        matched = Some((l, PinyinId::new(sheng, YUN_ZERO)));
                        break;
                    }
                }
            }

            let Some((l, id)) = matched else { break };
            let mut len = l;
            pos += l;
            // separators attach to the syllable they follow
            while pos < bytes.len() && bytes[pos] == b'\'' {
                pos += 1;
                len += 1;
            }
            out.push(make_entry(id, len));
        }

        (out, pos)
    }

    fn parse_bopomofo(
        &self,
        glyphs: &[u8],
        valid_len: usize,
        option: u32,
        max_len: usize,
    ) -> (Vec<Pinyin>, usize) {
        let end = valid_len.min(glyphs.len());
        let glyphs = &glyphs[..end];
        let mut out: Vec<Pinyin> = Vec::new();
        let mut pos = 0;

        while pos < glyphs.len() && out.len() < max_len {
            let start = pos;
            let mut sheng = None;
            if initial_of_glyph(glyphs[pos]).is_some() {
                sheng = initial_of_glyph(glyphs[pos]);
                pos += 1;
            }

            let g1 = glyphs.get(pos).copied();
            let g2 = glyphs.get(pos + 1).copied();
            let syllable = match sheng {
                Some(s) => match final_ids(s, g1, g2) {
                    Some((yun, used)) => {
                        pos += used;
                        Some((s, yun))
                    }
                    None if option & PINYIN_INCOMPLETE_PINYIN != 0 => Some((s, YUN_ZERO)),
                    None => {
                        pos = start;
                        None
                    }
                },
                None => match zero_initial_ids(g1, g2) {
                    Some((s, yun, used)) => {
                        pos += used;
                        Some((s, yun))
                    }
                    None => None,
                },
            };

            let Some((s, yun)) = syllable else { break };
            let glyph_text: String = glyphs[start..pos]
                .iter()
                .map(|&g| bopomofo::glyph_char(g))
                .collect();
            // a trailing tone mark belongs to this syllable's span
            if pos < glyphs.len() && is_tone(glyphs[pos]) {
                pos += 1;
            }
            let mut entry = make_entry(PinyinId::new(s, yun), pos - start);
            entry.bopomofo = glyph_text;
            out.push(entry);
        }

        (out, pos)
    }
}

fn initial_of_glyph(glyph: u8) -> Option<u8> {
    use crate::bopomofo::*;
    use crate::pinyin::*;
    let s = match glyph {
        BOPOMOFO_B => SHENG_B,
        BOPOMOFO_P => SHENG_P,
        BOPOMOFO_M => SHENG_M,
        BOPOMOFO_F => SHENG_F,
        BOPOMOFO_D => SHENG_D,
        BOPOMOFO_T => SHENG_T,
        BOPOMOFO_N => SHENG_N,
        BOPOMOFO_L => SHENG_L,
        BOPOMOFO_G => SHENG_G,
        BOPOMOFO_K => SHENG_K,
        BOPOMOFO_H => SHENG_H,
        BOPOMOFO_J => SHENG_J,
        BOPOMOFO_Q => SHENG_Q,
        BOPOMOFO_X => SHENG_X,
        BOPOMOFO_ZH => SHENG_ZH,
        BOPOMOFO_CH => SHENG_CH,
        BOPOMOFO_SH => SHENG_SH,
        BOPOMOFO_R => SHENG_R,
        BOPOMOFO_Z => SHENG_Z,
        BOPOMOFO_C => SHENG_C,
        BOPOMOFO_S => SHENG_S,
        _ => return None,
    };
    Some(s)
}

/// Final for a syllable that has an initial: `(yun, glyphs consumed)`.
fn final_ids(sheng: u8, g1: Option<u8>, g2: Option<u8>) -> Option<(u8, usize)> {
    use crate::bopomofo::*;
    use crate::pinyin::*;
    let g1 = g1?;
    let jqx = matches!(sheng, SHENG_J | SHENG_Q | SHENG_X);

    if let Some(g2) = g2 {
        let pair = match (g1, g2) {
            (BOPOMOFO_I, BOPOMOFO_A) => Some(YUN_IA),
            (BOPOMOFO_I, BOPOMOFO_AN) => Some(YUN_IAN),
            (BOPOMOFO_I, BOPOMOFO_ANG) => Some(YUN_IANG),
            (BOPOMOFO_I, BOPOMOFO_AU) => Some(YUN_IAO),
            (BOPOMOFO_I, BOPOMOFO_E2) => Some(YUN_IE),
            (BOPOMOFO_I, BOPOMOFO_EN) => Some(YUN_IN),
            (BOPOMOFO_I, BOPOMOFO_ENG) => Some(YUN_ING),
            (BOPOMOFO_I, BOPOMOFO_OU) => Some(YUN_IU),
            (BOPOMOFO_U, BOPOMOFO_A) => Some(YUN_UA),
            (BOPOMOFO_U, BOPOMOFO_AI) => Some(YUN_UAI),
            (BOPOMOFO_U, BOPOMOFO_AN) => Some(YUN_UAN),
            (BOPOMOFO_U, BOPOMOFO_ANG) => Some(YUN_UANG),
            (BOPOMOFO_U, BOPOMOFO_EI) => Some(YUN_UI),
            (BOPOMOFO_U, BOPOMOFO_EN) => Some(YUN_UN),
            (BOPOMOFO_U, BOPOMOFO_ENG) => Some(YUN_ONG),
            (BOPOMOFO_U, BOPOMOFO_O) => Some(YUN_UO),
            (BOPOMOFO_V, BOPOMOFO_E2) => Some(YUN_UE),
            (BOPOMOFO_V, BOPOMOFO_AN) if jqx => Some(YUN_UAN),
            (BOPOMOFO_V, BOPOMOFO_EN) if jqx => Some(YUN_UN),
            (BOPOMOFO_V, BOPOMOFO_ENG) if jqx => Some(YUN_IONG),
            _ => None,
        };
        if let Some(yun) = pair {
            return Some((yun, 2));
        }
    }

    let single = match g1 {
        BOPOMOFO_A => YUN_A,
        BOPOMOFO_O => YUN_O,
        BOPOMOFO_E => YUN_E,
        BOPOMOFO_E2 => YUN_E,
        BOPOMOFO_AI => YUN_AI,
        BOPOMOFO_EI => YUN_EI,
        BOPOMOFO_AU => YUN_AO,
        BOPOMOFO_OU => YUN_OU,
        BOPOMOFO_AN => YUN_AN,
        BOPOMOFO_EN => YUN_EN,
        BOPOMOFO_ANG => YUN_ANG,
        BOPOMOFO_ENG => YUN_ENG,
        BOPOMOFO_ER => YUN_ER,
        BOPOMOFO_I => YUN_I,
        BOPOMOFO_U => YUN_U,
        BOPOMOFO_V if jqx => YUN_U,
        BOPOMOFO_V => YUN_V,
        _ => return None,
    };
    Some((single, 1))
}

/// Syllable with no initial glyph: `(sheng, yun, glyphs consumed)`.
/// Leading `ㄧ`/`ㄨ`/`ㄩ` surface as the `y`/`w` spellings.
fn zero_initial_ids(g1: Option<u8>, g2: Option<u8>) -> Option<(u8, u8, usize)> {
    use crate::bopomofo::*;
    use crate::pinyin::*;
    let g1 = g1?;
    match g1 {
        BOPOMOFO_I => {
            if let Some(g2) = g2 {
                let yun = match g2 {
                    BOPOMOFO_A => Some(YUN_A),
                    BOPOMOFO_AN => Some(YUN_AN),
                    BOPOMOFO_ANG => Some(YUN_ANG),
                    BOPOMOFO_AU => Some(YUN_AO),
                    BOPOMOFO_E2 => Some(YUN_E),
                    BOPOMOFO_EN => Some(YUN_IN),
                    BOPOMOFO_ENG => Some(YUN_ING),
                    BOPOMOFO_OU => Some(YUN_OU),
                    _ => None,
                };
                if let Some(yun) = yun {
                    return Some((SHENG_Y, yun, 2));
                }
            }
            Some((SHENG_Y, YUN_I, 1))
        }
        BOPOMOFO_U => {
            if let Some(g2) = g2 {
                let yun = match g2 {
                    BOPOMOFO_A => Some(YUN_A),
                    BOPOMOFO_AI => Some(YUN_AI),
                    BOPOMOFO_AN => Some(YUN_AN),
                    BOPOMOFO_ANG => Some(YUN_ANG),
                    BOPOMOFO_EI => Some(YUN_EI),
                    BOPOMOFO_EN => Some(YUN_EN),
                    BOPOMOFO_ENG => Some(YUN_ENG),
                    BOPOMOFO_O => Some(YUN_O),
                    _ => None,
                };
                if let Some(yun) = yun {
                    return Some((SHENG_W, yun, 2));
                }
            }
            Some((SHENG_W, YUN_U, 1))
        }
        BOPOMOFO_V => {
            if let Some(g2) = g2 {
                let yun = match g2 {
                    BOPOMOFO_E2 => Some(YUN_UE),
                    BOPOMOFO_AN => Some(YUN_UAN),
                    BOPOMOFO_EN => Some(YUN_UN),
                    BOPOMOFO_ENG => Some(YUN_ONG),
                    _ => None,
                };
                if let Some(yun) = yun {
                    return Some((SHENG_Y, yun, 2));
                }
            }
            Some((SHENG_Y, YUN_U, 1))
        }
        BOPOMOFO_A => Some((SHENG_ZERO, YUN_A, 1)),
        BOPOMOFO_O => Some((SHENG_ZERO, YUN_O, 1)),
        BOPOMOFO_E => Some((SHENG_ZERO, YUN_E, 1)),
        BOPOMOFO_AI => Some((SHENG_ZERO, YUN_AI, 1)),
        BOPOMOFO_EI => Some((SHENG_ZERO, YUN_EI, 1)),
        BOPOMOFO_AU => Some((SHENG_ZERO, YUN_AO, 1)),
        BOPOMOFO_OU => Some((SHENG_ZERO, YUN_OU, 1)),
        BOPOMOFO_AN => Some((SHENG_ZERO, YUN_AN, 1)),
        BOPOMOFO_EN => Some((SHENG_ZERO, YUN_EN, 1)),
        BOPOMOFO_ANG => Some((SHENG_ZERO, YUN_ANG, 1)),
        BOPOMOFO_ENG => Some((SHENG_ZERO, YUN_ENG, 1)),
        BOPOMOFO_ER => Some((SHENG_ZERO, YUN_ER, 1)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bopomofo::*;
    use crate::pinyin::*;
    use crate::MAX_PHRASE_LEN;

    #[test]
    fn parse_nihao() {
        let parser = GreedyParser::new();
        let (entries, consumed) = parser.parse("nihao", 5, 0, MAX_PHRASE_LEN);
        assert_eq!(consumed, 5);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].text, "ni");
        assert_eq!(entries[0].len, 2);
        assert_eq!(entries[1].text, "hao");
        assert_eq!(entries[1].ids[0], PinyinId::new(SHENG_H, YUN_AO));
        assert_eq!(entries.iter().map(|p| p.len).sum::<usize>(), consumed);
    }

    #[test]
    fn parse_with_separator() {
        let parser = GreedyParser::new();
        let (entries, consumed) = parser.parse("xi'an", 5, 0, MAX_PHRASE_LEN);
        assert_eq!(consumed, 5);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].text, "xi");
        assert_eq!(entries[0].len, 3); // apostrophe attaches to "xi"
        assert_eq!(entries[1].text, "an");
    }

    #[test]
    fn incomplete_needs_option() {
        let parser = GreedyParser::new();
        let (entries, consumed) = parser.parse("zh", 2, 0, MAX_PHRASE_LEN);
        assert!(entries.is_empty());
        assert_eq!(consumed, 0);

        let (entries, consumed) = parser.parse("zh", 2, crate::PINYIN_INCOMPLETE_PINYIN, MAX_PHRASE_LEN);
        assert_eq!(consumed, 2);
        assert_eq!(entries[0].ids[0], PinyinId::new(SHENG_ZH, YUN_ZERO));
    }

    #[test]
    fn parse_stops_at_garbage() {
        let parser = GreedyParser::new();
        let (entries, consumed) = parser.parse("haoq", 4, 0, MAX_PHRASE_LEN);
        assert_eq!(entries.len(), 1);
        assert_eq!(consumed, 3);
    }

    #[test]
    fn fuzzy_alternatives_populated() {
        let parser = GreedyParser::new();
        let (entries, _) = parser.parse("ci", 2, 0, MAX_PHRASE_LEN);
        assert_eq!(entries[0].ids[0].sheng, SHENG_C);
        assert_eq!(entries[0].ids[1].sheng, SHENG_CH);
        let (entries, _) = parser.parse("lan", 3, 0, MAX_PHRASE_LEN);
        assert_eq!(entries[0].ids[1], PinyinId::new(SHENG_N, YUN_ANG));
        assert_eq!(entries[0].ids[2], PinyinId::new(SHENG_R, YUN_AN));
    }

    #[test]
    fn parse_bopomofo_nihao() {
        let parser = GreedyParser::new();
        let glyphs = [
            BOPOMOFO_N,
            BOPOMOFO_I,
            BOPOMOFO_TONE_3,
            BOPOMOFO_H,
            BOPOMOFO_AU,
            BOPOMOFO_TONE_3,
        ];
        let (entries, consumed) = parser.parse_bopomofo(&glyphs, 6, 0, MAX_PHRASE_LEN);
        assert_eq!(consumed, 6);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].text, "ni");
        assert_eq!(entries[0].bopomofo, "ㄋㄧ");
        assert_eq!(entries[0].len, 3); // includes the tone key
        assert_eq!(entries[1].bopomofo, "ㄏㄠ");
        assert_eq!(entries[1].ids[0], PinyinId::new(SHENG_H, YUN_AO));
    }

    #[test]
    fn parse_bopomofo_medials() {
        let parser = GreedyParser::new();
        let glyphs = [BOPOMOFO_ZH, BOPOMOFO_U, BOPOMOFO_ENG];
        let (entries, consumed) = parser.parse_bopomofo(&glyphs, 3, 0, MAX_PHRASE_LEN);
        assert_eq!(consumed, 3);
        assert_eq!(entries[0].text, "zhong");

        let glyphs = [BOPOMOFO_I, BOPOMOFO_EN];
        let (entries, _) = parser.parse_bopomofo(&glyphs, 2, 0, MAX_PHRASE_LEN);
        assert_eq!(entries[0].text, "yin");
    }
}
