//! Dictionary phrase record.

use crate::pinyin::PinyinId;
use crate::MAX_PHRASE_LEN;

/// A phrase with its syllable ids and frequencies.
///
/// `freq` comes from the main dictionary; `user_freq` counts how often the
/// user committed the phrase (0 for rows that only exist in the main table).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Phrase {
    pub text: String,
    pub freq: u32,
    pub user_freq: u32,
    pub ids: Vec<PinyinId>,
}

impl Phrase {
    pub fn new(text: impl Into<String>, freq: u32, ids: Vec<PinyinId>) -> Self {
        assert!(ids.len() <= MAX_PHRASE_LEN);
        Self {
            text: text.into(),
            freq,
            user_freq: 0,
            ids,
        }
    }

    /// Length in syllables.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Extend with another phrase. Panics when the combined length would
    /// exceed `MAX_PHRASE_LEN`.
    pub fn append(&mut self, other: &Phrase) {
        assert!(self.len() + other.len() <= MAX_PHRASE_LEN);
        self.text.push_str(&other.text);
        self.ids.extend_from_slice(&other.ids);
    }

    /// Concatenate a non-empty sequence of phrases. The result carries
    /// `freq = 0`: a learned multi-segment composition has no main-table
    /// frequency of its own.
    pub fn concat(phrases: &[Phrase]) -> Phrase {
        let mut out = Phrase::default();
        for p in phrases {
            out.append(p);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pinyin::{sequence_ids, syllable_ids};

    #[test]
    fn append_concatenates_text_and_ids() {
        let mut a = Phrase::new("你", 100, vec![syllable_ids("ni").unwrap()]);
        let b = Phrase::new("好", 90, vec![syllable_ids("hao").unwrap()]);
        a.append(&b);
        assert_eq!(a.text, "你好");
        assert_eq!(a.len(), 2);
        assert_eq!(a.freq, 100);
    }

    #[test]
    fn concat_has_zero_freq() {
        let a = Phrase::new("你好", 100, sequence_ids("ni hao").unwrap());
        let b = Phrase::new("吗", 50, vec![syllable_ids("ma").unwrap()]);
        let c = Phrase::concat(&[a, b]);
        assert_eq!(c.text, "你好吗");
        assert_eq!(c.len(), 3);
        assert_eq!(c.freq, 0);
        assert_eq!(c.user_freq, 0);
    }

    #[test]
    #[should_panic]
    fn append_past_limit_panics() {
        let one = Phrase::new("一", 1, vec![syllable_ids("yi").unwrap()]);
        let mut long = Phrase::default();
        for _ in 0..MAX_PHRASE_LEN {
            long.append(&one);
        }
        long.append(&one);
    }
}
