//! pyzy-core
//!
//! Editing and candidate-generation core for Chinese phonetic input: a user
//! types Latin keys (full Hanyu Pinyin or Bopomofo-keyboard keys) into an
//! editable buffer; the core segments the buffer into syllables, queries a
//! phrase dictionary, and exposes derived texts plus an ordered candidate
//! list after every keystroke. Committed candidates feed a learning user
//! dictionary that re-ranks future queries.
//!
//! Storage uses FST for the read-only main dictionary index, bincode for
//! phrase payloads, and redb for the persisted user dictionary.
//!
//! Public API:
//! - `FullPinyinContext` / `BopomofoContext` - the two input state machines
//! - `ContextObserver` - per-context notification sink
//! - `Dictionary` - main + user phrase store with deferred backup
//! - `PhraseEditor` - prefix-commit composition over a pinyin array
//! - `SpecialPhraseTable` - static and dynamic (templated) candidates
//! - `SyllableParser` - contract of the external segmentation parser, with
//!   `GreedyParser` as a reference implementation
//! - `Config` - per-context option snapshot
use serde::{Deserialize, Serialize};

pub mod pinyin;
pub use pinyin::{Pinyin, PinyinId, YUN_ZERO};

pub mod phrase;
pub use phrase::Phrase;

pub mod bopomofo;
pub use bopomofo::{
    BOPOMOFO_KEYBOARD_ETEN, BOPOMOFO_KEYBOARD_ETEN26, BOPOMOFO_KEYBOARD_GINYIEH,
    BOPOMOFO_KEYBOARD_HSU, BOPOMOFO_KEYBOARD_IBM, BOPOMOFO_KEYBOARD_LAST,
    BOPOMOFO_KEYBOARD_STANDARD,
};

pub mod parser;
pub use parser::{GreedyParser, SyllableParser};

pub mod simptrad;
pub use simptrad::{Passthrough, SimpTradConverter};

pub mod dictionary;
pub use dictionary::{DictError, DictOptions, Dictionary, MainDictBuilder};

pub mod query;
pub use query::Query;

pub mod phrase_editor;
pub use phrase_editor::PhraseEditor;

pub mod special_phrase;
pub use special_phrase::{DynamicSpecialPhrase, LocalTime, SpecialPhrase, SpecialPhraseTable};

pub mod context;
pub use context::{Candidate, CommitType, ContextObserver, PhoneticContext, PreeditText};

pub mod full_pinyin;
pub use full_pinyin::FullPinyinContext;

pub mod bopomofo_context;
pub use bopomofo_context::BopomofoContext;

/// Longest phrase, in syllables, the dictionary stores or learns.
pub const MAX_PHRASE_LEN: usize = 16;

/// Capacity of the raw input buffer, in typed characters. The same bound
/// applies to full-pinyin Latin text and Bopomofo key text.
pub const MAX_PINYIN_LEN: usize = 64;

// Fuzzy-initial option bits. Each direction is its own flag: `C_CH` widens a
// typed `c` to also match `ch`, `CH_C` the reverse.
pub const PINYIN_FUZZY_C_CH: u32 = 1 << 0;
pub const PINYIN_FUZZY_CH_C: u32 = 1 << 1;
pub const PINYIN_FUZZY_Z_ZH: u32 = 1 << 2;
pub const PINYIN_FUZZY_ZH_Z: u32 = 1 << 3;
pub const PINYIN_FUZZY_S_SH: u32 = 1 << 4;
pub const PINYIN_FUZZY_SH_S: u32 = 1 << 5;
pub const PINYIN_FUZZY_L_N: u32 = 1 << 6;
pub const PINYIN_FUZZY_N_L: u32 = 1 << 7;
pub const PINYIN_FUZZY_F_H: u32 = 1 << 8;
pub const PINYIN_FUZZY_H_F: u32 = 1 << 9;
pub const PINYIN_FUZZY_L_R: u32 = 1 << 10;
pub const PINYIN_FUZZY_R_L: u32 = 1 << 11;
pub const PINYIN_FUZZY_K_G: u32 = 1 << 12;
pub const PINYIN_FUZZY_G_K: u32 = 1 << 13;

// Fuzzy-final option bits.
pub const PINYIN_FUZZY_AN_ANG: u32 = 1 << 14;
pub const PINYIN_FUZZY_ANG_AN: u32 = 1 << 15;
pub const PINYIN_FUZZY_EN_ENG: u32 = 1 << 16;
pub const PINYIN_FUZZY_ENG_EN: u32 = 1 << 17;
pub const PINYIN_FUZZY_IN_ING: u32 = 1 << 18;
pub const PINYIN_FUZZY_ING_IN: u32 = 1 << 19;
pub const PINYIN_FUZZY_IAN_IANG: u32 = 1 << 20;
pub const PINYIN_FUZZY_IANG_IAN: u32 = 1 << 21;
pub const PINYIN_FUZZY_UAN_UANG: u32 = 1 << 22;
pub const PINYIN_FUZZY_UANG_UAN: u32 = 1 << 23;

/// All fuzzy flags, both directions.
pub const PINYIN_FUZZY_ALL: u32 = 0x00ff_ffff;

/// Keep querying on an initial-only trailing syllable, and let contexts skip
/// re-parsing while the cursor is far past the parsed prefix.
pub const PINYIN_INCOMPLETE_PINYIN: u32 = 1 << 24;

/// Immutable per-context configuration snapshot, taken at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// OR of the `PINYIN_FUZZY_*` flags and `PINYIN_INCOMPLETE_PINYIN`.
    pub option: u32,
    /// When false, dictionary phrases are rendered through the Simp→Trad
    /// converter before display; they are stored and learned unconverted.
    pub mode_simp: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            option: PINYIN_INCOMPLETE_PINYIN,
            mode_simp: true,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<std::path::Path>>(
        path: P,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save_toml<P: AsRef<std::path::Path>>(
        &self,
        path: P,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Build a config from textual fuzzy pairs like `"c=ch"` or `"an=ang"`.
    /// Each rule enables one direction; unknown pairs are ignored.
    pub fn with_fuzzy_rules(rules: &[&str]) -> Self {
        let mut option = PINYIN_INCOMPLETE_PINYIN;
        for rule in rules {
            if let Some((a, b)) = rule.split_once('=') {
                option |= fuzzy_rule_bit(a.trim(), b.trim());
            }
        }
        Self {
            option,
            mode_simp: true,
        }
    }
}

fn fuzzy_rule_bit(from: &str, to: &str) -> u32 {
    match (from, to) {
        ("c", "ch") => PINYIN_FUZZY_C_CH,
        ("ch", "c") => PINYIN_FUZZY_CH_C,
        ("z", "zh") => PINYIN_FUZZY_Z_ZH,
        ("zh", "z") => PINYIN_FUZZY_ZH_Z,
        ("s", "sh") => PINYIN_FUZZY_S_SH,
        ("sh", "s") => PINYIN_FUZZY_SH_S,
        ("l", "n") => PINYIN_FUZZY_L_N,
        ("n", "l") => PINYIN_FUZZY_N_L,
        ("f", "h") => PINYIN_FUZZY_F_H,
        ("h", "f") => PINYIN_FUZZY_H_F,
        ("l", "r") => PINYIN_FUZZY_L_R,
        ("r", "l") => PINYIN_FUZZY_R_L,
        ("k", "g") => PINYIN_FUZZY_K_G,
        ("g", "k") => PINYIN_FUZZY_G_K,
        ("an", "ang") => PINYIN_FUZZY_AN_ANG,
        ("ang", "an") => PINYIN_FUZZY_ANG_AN,
        ("en", "eng") => PINYIN_FUZZY_EN_ENG,
        ("eng", "en") => PINYIN_FUZZY_ENG_EN,
        ("in", "ing") => PINYIN_FUZZY_IN_ING,
        ("ing", "in") => PINYIN_FUZZY_ING_IN,
        ("ian", "iang") => PINYIN_FUZZY_IAN_IANG,
        ("iang", "ian") => PINYIN_FUZZY_IANG_IAN,
        ("uan", "uang") => PINYIN_FUZZY_UAN_UANG,
        ("uang", "uan") => PINYIN_FUZZY_UANG_UAN,
        _ => 0,
    }
}
