//! Bopomofo glyphs and keyboard layouts.
//!
//! Glyph ids are small integers; `BOPOMOFO_CHAR` maps them to the Zhuyin
//! characters. Each keyboard schema is a `(key, glyph)` table sorted by key
//! and searched by binary search: a key with no entry maps to
//! `BOPOMOFO_ZERO` and is rejected by the Bopomofo context.

pub const BOPOMOFO_ZERO: u8 = 0;
pub const BOPOMOFO_B: u8 = 1;
pub const BOPOMOFO_P: u8 = 2;
pub const BOPOMOFO_M: u8 = 3;
pub const BOPOMOFO_F: u8 = 4;
pub const BOPOMOFO_D: u8 = 5;
pub const BOPOMOFO_T: u8 = 6;
pub const BOPOMOFO_N: u8 = 7;
pub const BOPOMOFO_L: u8 = 8;
pub const BOPOMOFO_G: u8 = 9;
pub const BOPOMOFO_K: u8 = 10;
pub const BOPOMOFO_H: u8 = 11;
pub const BOPOMOFO_J: u8 = 12;
pub const BOPOMOFO_Q: u8 = 13;
pub const BOPOMOFO_X: u8 = 14;
pub const BOPOMOFO_ZH: u8 = 15;
pub const BOPOMOFO_CH: u8 = 16;
pub const BOPOMOFO_SH: u8 = 17;
pub const BOPOMOFO_R: u8 = 18;
pub const BOPOMOFO_Z: u8 = 19;
pub const BOPOMOFO_C: u8 = 20;
pub const BOPOMOFO_S: u8 = 21;
pub const BOPOMOFO_I: u8 = 22;
pub const BOPOMOFO_U: u8 = 23;
pub const BOPOMOFO_V: u8 = 24;
pub const BOPOMOFO_A: u8 = 25;
pub const BOPOMOFO_O: u8 = 26;
pub const BOPOMOFO_E: u8 = 27;
pub const BOPOMOFO_E2: u8 = 28;
pub const BOPOMOFO_AI: u8 = 29;
pub const BOPOMOFO_EI: u8 = 30;
pub const BOPOMOFO_AU: u8 = 31;
pub const BOPOMOFO_OU: u8 = 32;
pub const BOPOMOFO_AN: u8 = 33;
pub const BOPOMOFO_EN: u8 = 34;
pub const BOPOMOFO_ANG: u8 = 35;
pub const BOPOMOFO_ENG: u8 = 36;
pub const BOPOMOFO_ER: u8 = 37;
pub const BOPOMOFO_TONE_2: u8 = 38;
pub const BOPOMOFO_TONE_3: u8 = 39;
pub const BOPOMOFO_TONE_4: u8 = 40;
pub const BOPOMOFO_TONE_5: u8 = 41;

pub const BOPOMOFO_CHAR: [char; 42] = [
    '\0', 'ㄅ', 'ㄆ', 'ㄇ', 'ㄈ', 'ㄉ', 'ㄊ', 'ㄋ', 'ㄌ', 'ㄍ', 'ㄎ', 'ㄏ', 'ㄐ', 'ㄑ', 'ㄒ',
    'ㄓ', 'ㄔ', 'ㄕ', 'ㄖ', 'ㄗ', 'ㄘ', 'ㄙ', 'ㄧ', 'ㄨ', 'ㄩ', 'ㄚ', 'ㄛ', 'ㄜ', 'ㄝ', 'ㄞ',
    'ㄟ', 'ㄠ', 'ㄡ', 'ㄢ', 'ㄣ', 'ㄤ', 'ㄥ', 'ㄦ', 'ˊ', 'ˇ', 'ˋ', '˙',
];

// Keyboard schemas, in the order exposed through the context property.
pub const BOPOMOFO_KEYBOARD_STANDARD: u32 = 0;
pub const BOPOMOFO_KEYBOARD_HSU: u32 = 1;
pub const BOPOMOFO_KEYBOARD_IBM: u32 = 2;
pub const BOPOMOFO_KEYBOARD_GINYIEH: u32 = 3;
pub const BOPOMOFO_KEYBOARD_ETEN: u32 = 4;
pub const BOPOMOFO_KEYBOARD_ETEN26: u32 = 5;
pub const BOPOMOFO_KEYBOARD_LAST: u32 = 6;

type KeyTable = &'static [(u8, u8)];

static KEYBOARD_STANDARD: KeyTable = &[
    (b',', BOPOMOFO_E2),
    (b'-', BOPOMOFO_ER),
    (b'.', BOPOMOFO_OU),
    (b'/', BOPOMOFO_ENG),
    (b'0', BOPOMOFO_AN),
    (b'1', BOPOMOFO_B),
    (b'2', BOPOMOFO_D),
    (b'3', BOPOMOFO_TONE_3),
    (b'4', BOPOMOFO_TONE_4),
    (b'5', BOPOMOFO_ZH),
    (b'6', BOPOMOFO_TONE_2),
    (b'7', BOPOMOFO_TONE_5),
    (b'8', BOPOMOFO_A),
    (b'9', BOPOMOFO_AI),
    (b';', BOPOMOFO_ANG),
    (b'a', BOPOMOFO_M),
    (b'b', BOPOMOFO_R),
    (b'c', BOPOMOFO_H),
    (b'd', BOPOMOFO_K),
    (b'e', BOPOMOFO_G),
    (b'f', BOPOMOFO_Q),
    (b'g', BOPOMOFO_SH),
    (b'h', BOPOMOFO_C),
    (b'i', BOPOMOFO_O),
    (b'j', BOPOMOFO_U),
    (b'k', BOPOMOFO_E),
    (b'l', BOPOMOFO_AU),
    (b'm', BOPOMOFO_V),
    (b'n', BOPOMOFO_S),
    (b'o', BOPOMOFO_EI),
    (b'p', BOPOMOFO_EN),
    (b'q', BOPOMOFO_P),
    (b'r', BOPOMOFO_J),
    (b's', BOPOMOFO_N),
    (b't', BOPOMOFO_CH),
    (b'u', BOPOMOFO_I),
    (b'v', BOPOMOFO_X),
    (b'w', BOPOMOFO_T),
    (b'x', BOPOMOFO_L),
    (b'y', BOPOMOFO_Z),
    (b'z', BOPOMOFO_F),
];

static KEYBOARD_HSU: KeyTable = &[
    (b'\'', BOPOMOFO_EN),
    (b',', BOPOMOFO_E2),
    (b'-', BOPOMOFO_AU),
    (b'0', BOPOMOFO_EI),
    (b'2', BOPOMOFO_TONE_2),
    (b'3', BOPOMOFO_TONE_3),
    (b'4', BOPOMOFO_TONE_4),
    (b'7', BOPOMOFO_TONE_5),
    (b'8', BOPOMOFO_E),
    (b'9', BOPOMOFO_AI),
    (b';', BOPOMOFO_AN),
    (b'=', BOPOMOFO_OU),
    (b'[', BOPOMOFO_ANG),
    (b']', BOPOMOFO_ENG),
    (b'`', BOPOMOFO_ER),
    (b'a', BOPOMOFO_A),
    (b'b', BOPOMOFO_B),
    (b'c', BOPOMOFO_X),
    (b'd', BOPOMOFO_D),
    (b'e', BOPOMOFO_I),
    (b'f', BOPOMOFO_F),
    (b'g', BOPOMOFO_G),
    (b'h', BOPOMOFO_H),
    (b'i', BOPOMOFO_V),
    (b'j', BOPOMOFO_J),
    (b'k', BOPOMOFO_K),
    (b'l', BOPOMOFO_L),
    (b'm', BOPOMOFO_M),
    (b'n', BOPOMOFO_N),
    (b'o', BOPOMOFO_O),
    (b'p', BOPOMOFO_P),
    (b'q', BOPOMOFO_ZH),
    (b'r', BOPOMOFO_R),
    (b's', BOPOMOFO_S),
    (b't', BOPOMOFO_T),
    (b'u', BOPOMOFO_U),
    (b'v', BOPOMOFO_Q),
    (b'w', BOPOMOFO_CH),
    (b'x', BOPOMOFO_C),
    (b'y', BOPOMOFO_SH),
    (b'z', BOPOMOFO_Z),
];

static KEYBOARD_IBM: KeyTable = &[
    (b',', BOPOMOFO_TONE_2),
    (b'-', BOPOMOFO_TONE_5),
    (b'.', BOPOMOFO_TONE_3),
    (b'/', BOPOMOFO_TONE_4),
    (b'0', BOPOMOFO_K),
    (b'1', BOPOMOFO_B),
    (b'2', BOPOMOFO_P),
    (b'3', BOPOMOFO_M),
    (b'4', BOPOMOFO_F),
    (b'5', BOPOMOFO_D),
    (b'6', BOPOMOFO_T),
    (b'7', BOPOMOFO_N),
    (b'8', BOPOMOFO_L),
    (b'9', BOPOMOFO_G),
    (b';', BOPOMOFO_EI),
    (b'a', BOPOMOFO_S),
    (b'b', BOPOMOFO_ANG),
    (b'c', BOPOMOFO_AN),
    (b'd', BOPOMOFO_U),
    (b'e', BOPOMOFO_Q),
    (b'f', BOPOMOFO_V),
    (b'g', BOPOMOFO_A),
    (b'h', BOPOMOFO_O),
    (b'i', BOPOMOFO_R),
    (b'j', BOPOMOFO_E),
    (b'k', BOPOMOFO_E2),
    (b'l', BOPOMOFO_AI),
    (b'm', BOPOMOFO_ER),
    (b'n', BOPOMOFO_ENG),
    (b'o', BOPOMOFO_Z),
    (b'p', BOPOMOFO_C),
    (b'q', BOPOMOFO_H),
    (b'r', BOPOMOFO_X),
    (b's', BOPOMOFO_I),
    (b't', BOPOMOFO_ZH),
    (b'u', BOPOMOFO_SH),
    (b'v', BOPOMOFO_EN),
    (b'w', BOPOMOFO_J),
    (b'x', BOPOMOFO_OU),
    (b'y', BOPOMOFO_CH),
    (b'z', BOPOMOFO_AU),
];

static KEYBOARD_GINYIEH: KeyTable = &[
    (b'\'', BOPOMOFO_TONE_3),
    (b',', BOPOMOFO_E2),
    (b'-', BOPOMOFO_ER),
    (b'.', BOPOMOFO_OU),
    (b'/', BOPOMOFO_ENG),
    (b'0', BOPOMOFO_AN),
    (b'2', BOPOMOFO_B),
    (b'3', BOPOMOFO_D),
    (b'4', BOPOMOFO_G),
    (b'5', BOPOMOFO_Q),
    (b'6', BOPOMOFO_SH),
    (b'7', BOPOMOFO_S),
    (b'8', BOPOMOFO_A),
    (b'9', BOPOMOFO_AI),
    (b';', BOPOMOFO_ANG),
    (b'=', BOPOMOFO_TONE_5),
    (b'[', BOPOMOFO_TONE_2),
    (b']', BOPOMOFO_TONE_4),
    (b'b', BOPOMOFO_CH),
    (b'c', BOPOMOFO_L),
    (b'd', BOPOMOFO_N),
    (b'e', BOPOMOFO_T),
    (b'f', BOPOMOFO_H),
    (b'g', BOPOMOFO_ZH),
    (b'h', BOPOMOFO_Z),
    (b'i', BOPOMOFO_O),
    (b'j', BOPOMOFO_U),
    (b'k', BOPOMOFO_E),
    (b'l', BOPOMOFO_AU),
    (b'm', BOPOMOFO_V),
    (b'n', BOPOMOFO_C),
    (b'o', BOPOMOFO_EI),
    (b'p', BOPOMOFO_EN),
    (b'r', BOPOMOFO_K),
    (b's', BOPOMOFO_M),
    (b't', BOPOMOFO_X),
    (b'u', BOPOMOFO_I),
    (b'v', BOPOMOFO_J),
    (b'w', BOPOMOFO_P),
    (b'x', BOPOMOFO_F),
    (b'y', BOPOMOFO_R),
];

static KEYBOARD_ETEN: KeyTable = &[
    (b'\'', BOPOMOFO_EN),
    (b',', BOPOMOFO_E2),
    (b'-', BOPOMOFO_AU),
    (b'0', BOPOMOFO_EI),
    (b'2', BOPOMOFO_TONE_2),
    (b'3', BOPOMOFO_TONE_3),
    (b'4', BOPOMOFO_TONE_4),
    (b'7', BOPOMOFO_TONE_5),
    (b'8', BOPOMOFO_A),
    (b'9', BOPOMOFO_AI),
    (b';', BOPOMOFO_AN),
    (b'=', BOPOMOFO_OU),
    (b'[', BOPOMOFO_ANG),
    (b']', BOPOMOFO_ENG),
    (b'`', BOPOMOFO_ER),
    (b'a', BOPOMOFO_C),
    (b'b', BOPOMOFO_B),
    (b'c', BOPOMOFO_CH),
    (b'd', BOPOMOFO_D),
    (b'e', BOPOMOFO_I),
    (b'f', BOPOMOFO_F),
    (b'g', BOPOMOFO_G),
    (b'h', BOPOMOFO_H),
    (b'i', BOPOMOFO_E),
    (b'j', BOPOMOFO_J),
    (b'k', BOPOMOFO_K),
    (b'l', BOPOMOFO_L),
    (b'm', BOPOMOFO_M),
    (b'n', BOPOMOFO_N),
    (b'o', BOPOMOFO_O),
    (b'p', BOPOMOFO_P),
    (b'q', BOPOMOFO_Q),
    (b'r', BOPOMOFO_R),
    (b's', BOPOMOFO_S),
    (b't', BOPOMOFO_T),
    (b'u', BOPOMOFO_U),
    (b'v', BOPOMOFO_SH),
    (b'w', BOPOMOFO_ZH),
    (b'x', BOPOMOFO_X),
    (b'y', BOPOMOFO_V),
    (b'z', BOPOMOFO_Z),
];

static KEYBOARD_ETEN26: KeyTable = &[
    (b'\'', BOPOMOFO_EN),
    (b',', BOPOMOFO_E2),
    (b'-', BOPOMOFO_AU),
    (b'0', BOPOMOFO_EI),
    (b'2', BOPOMOFO_TONE_2),
    (b'3', BOPOMOFO_TONE_3),
    (b'4', BOPOMOFO_TONE_4),
    (b'7', BOPOMOFO_TONE_5),
    (b'8', BOPOMOFO_V),
    (b'9', BOPOMOFO_AI),
    (b';', BOPOMOFO_AN),
    (b'=', BOPOMOFO_OU),
    (b'[', BOPOMOFO_ANG),
    (b']', BOPOMOFO_ENG),
    (b'`', BOPOMOFO_ER),
    (b'a', BOPOMOFO_A),
    (b'b', BOPOMOFO_B),
    (b'c', BOPOMOFO_X),
    (b'd', BOPOMOFO_D),
    (b'e', BOPOMOFO_E),
    (b'f', BOPOMOFO_F),
    (b'g', BOPOMOFO_G),
    (b'h', BOPOMOFO_H),
    (b'i', BOPOMOFO_I),
    (b'j', BOPOMOFO_J),
    (b'k', BOPOMOFO_K),
    (b'l', BOPOMOFO_L),
    (b'm', BOPOMOFO_M),
    (b'n', BOPOMOFO_N),
    (b'o', BOPOMOFO_O),
    (b'p', BOPOMOFO_P),
    (b'q', BOPOMOFO_S),
    (b'r', BOPOMOFO_R),
    (b's', BOPOMOFO_SH),
    (b't', BOPOMOFO_T),
    (b'u', BOPOMOFO_U),
    (b'v', BOPOMOFO_Q),
    (b'w', BOPOMOFO_CH),
    (b'x', BOPOMOFO_ZH),
    (b'y', BOPOMOFO_C),
    (b'z', BOPOMOFO_Z),
];

fn keyboard_table(schema: u32) -> KeyTable {
    match schema {
        BOPOMOFO_KEYBOARD_STANDARD => KEYBOARD_STANDARD,
        BOPOMOFO_KEYBOARD_HSU => KEYBOARD_HSU,
        BOPOMOFO_KEYBOARD_IBM => KEYBOARD_IBM,
        BOPOMOFO_KEYBOARD_GINYIEH => KEYBOARD_GINYIEH,
        BOPOMOFO_KEYBOARD_ETEN => KEYBOARD_ETEN,
        BOPOMOFO_KEYBOARD_ETEN26 => KEYBOARD_ETEN26,
        _ => KEYBOARD_STANDARD,
    }
}

/// Map a typed key to a Bopomofo glyph under the given schema.
/// Returns `BOPOMOFO_ZERO` for unmapped keys.
pub fn keyval_to_bopomofo(schema: u32, key: char) -> u8 {
    if !key.is_ascii() {
        return BOPOMOFO_ZERO;
    }
    let table = keyboard_table(schema);
    match table.binary_search_by_key(&(key as u8), |&(k, _)| k) {
        Ok(i) => table[i].1,
        Err(_) => BOPOMOFO_ZERO,
    }
}

pub fn glyph_char(id: u8) -> char {
    BOPOMOFO_CHAR[id as usize]
}

pub fn is_tone(id: u8) -> bool {
    (BOPOMOFO_TONE_2..=BOPOMOFO_TONE_5).contains(&id)
}

/// Initial glyph of a sheng id. `None` for the zero initial and for `w`/`y`,
/// which surface as the medials `ㄨ`/`ㄧ` instead.
pub(crate) fn initial_glyph(sheng: u8) -> Option<u8> {
    use crate::pinyin::*;
    let g = match sheng {
        SHENG_B => BOPOMOFO_B,
        SHENG_P => BOPOMOFO_P,
        SHENG_M => BOPOMOFO_M,
        SHENG_F => BOPOMOFO_F,
        SHENG_D => BOPOMOFO_D,
        SHENG_T => BOPOMOFO_T,
        SHENG_N => BOPOMOFO_N,
        SHENG_L => BOPOMOFO_L,
        SHENG_G => BOPOMOFO_G,
        SHENG_K => BOPOMOFO_K,
        SHENG_H => BOPOMOFO_H,
        SHENG_J => BOPOMOFO_J,
        SHENG_Q => BOPOMOFO_Q,
        SHENG_X => BOPOMOFO_X,
        SHENG_ZH => BOPOMOFO_ZH,
        SHENG_CH => BOPOMOFO_CH,
        SHENG_SH => BOPOMOFO_SH,
        SHENG_R => BOPOMOFO_R,
        SHENG_Z => BOPOMOFO_Z,
        SHENG_C => BOPOMOFO_C,
        SHENG_S => BOPOMOFO_S,
        _ => return None,
    };
    Some(g)
}

/// Final glyph sequence of a yun id.
pub(crate) fn final_glyphs(yun: u8) -> &'static [u8] {
    use crate::pinyin::*;
    match yun {
        YUN_A => &[BOPOMOFO_A],
        YUN_AI => &[BOPOMOFO_AI],
        YUN_AN => &[BOPOMOFO_AN],
        YUN_ANG => &[BOPOMOFO_ANG],
        YUN_AO => &[BOPOMOFO_AU],
        YUN_E => &[BOPOMOFO_E],
        YUN_EI => &[BOPOMOFO_EI],
        YUN_EN => &[BOPOMOFO_EN],
        YUN_ENG => &[BOPOMOFO_ENG],
        YUN_ER => &[BOPOMOFO_ER],
        YUN_I => &[BOPOMOFO_I],
        YUN_IA => &[BOPOMOFO_I, BOPOMOFO_A],
        YUN_IAN => &[BOPOMOFO_I, BOPOMOFO_AN],
        YUN_IANG => &[BOPOMOFO_I, BOPOMOFO_ANG],
        YUN_IAO => &[BOPOMOFO_I, BOPOMOFO_AU],
        YUN_IE => &[BOPOMOFO_I, BOPOMOFO_E2],
        YUN_IN => &[BOPOMOFO_I, BOPOMOFO_EN],
        YUN_ING => &[BOPOMOFO_I, BOPOMOFO_ENG],
        YUN_IONG => &[BOPOMOFO_V, BOPOMOFO_ENG],
        YUN_IU => &[BOPOMOFO_I, BOPOMOFO_OU],
        YUN_O => &[BOPOMOFO_O],
        YUN_ONG => &[BOPOMOFO_U, BOPOMOFO_ENG],
        YUN_OU => &[BOPOMOFO_OU],
        YUN_U => &[BOPOMOFO_U],
        YUN_UA => &[BOPOMOFO_U, BOPOMOFO_A],
        YUN_UAI => &[BOPOMOFO_U, BOPOMOFO_AI],
        YUN_UAN => &[BOPOMOFO_U, BOPOMOFO_AN],
        YUN_UANG => &[BOPOMOFO_U, BOPOMOFO_ANG],
        YUN_UE => &[BOPOMOFO_V, BOPOMOFO_E2],
        YUN_UI => &[BOPOMOFO_U, BOPOMOFO_EI],
        YUN_UN => &[BOPOMOFO_U, BOPOMOFO_EN],
        YUN_UO => &[BOPOMOFO_U, BOPOMOFO_O],
        YUN_V => &[BOPOMOFO_V],
        _ => &[],
    }
}

/// Bopomofo rendering of a `(sheng, yun)` pair, tone marks excluded.
pub fn bopomofo_of(sheng: u8, yun: u8) -> String {
    use crate::pinyin::*;
    let mut out = String::new();
    match sheng {
        SHENG_W => {
            out.push(glyph_char(BOPOMOFO_U));
            if yun != YUN_U {
                for &g in final_glyphs(yun) {
                    out.push(glyph_char(g));
                }
            }
            return out;
        }
        SHENG_Y => {
            // yi/yin/ying keep the ㄧ medial; yu-forms switch to ㄩ.
            let glyphs: &[u8] = match yun {
                YUN_I => &[BOPOMOFO_I],
                YUN_IN => &[BOPOMOFO_I, BOPOMOFO_EN],
                YUN_ING => &[BOPOMOFO_I, BOPOMOFO_ENG],
                YUN_U => &[BOPOMOFO_V],
                YUN_UE => &[BOPOMOFO_V, BOPOMOFO_E2],
                YUN_UAN => &[BOPOMOFO_V, BOPOMOFO_AN],
                YUN_UN => &[BOPOMOFO_V, BOPOMOFO_EN],
                _ => {
                    out.push(glyph_char(BOPOMOFO_I));
                    final_glyphs(yun)
                }
            };
            for &g in glyphs {
                out.push(glyph_char(g));
            }
            return out;
        }
        _ => {}
    }
    if let Some(g) = initial_glyph(sheng) {
        out.push(glyph_char(g));
    }
    let finals: &[u8] = if matches!(sheng, SHENG_J | SHENG_Q | SHENG_X) {
        // u after j/q/x is ü
        match yun {
            YUN_U => &[BOPOMOFO_V],
            YUN_UE => &[BOPOMOFO_V, BOPOMOFO_E2],
            YUN_UAN => &[BOPOMOFO_V, BOPOMOFO_AN],
            YUN_UN => &[BOPOMOFO_V, BOPOMOFO_EN],
            _ => final_glyphs(yun),
        }
    } else {
        final_glyphs(yun)
    };
    for &g in finals {
        out.push(glyph_char(g));
    }
    out
}
