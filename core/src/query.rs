//! Lazy, bounded cursor over candidate phrases.
//!
//! A `Query` is fixed to one starting offset in the pinyin array and walks
//! phrase lengths downward: it drains every match of the current length
//! before opening the next shorter prefix, so candidates come out
//! longest-first, which is the order the phrase editor wants.

use crate::dictionary::Dictionary;
use crate::phrase::Phrase;
use crate::pinyin::Pinyin;
use crate::MAX_PHRASE_LEN;
use std::collections::VecDeque;
use std::sync::Arc;

pub struct Query {
    dict: Arc<Dictionary>,
    pinyin: Vec<Pinyin>,
    begin: usize,
    len: usize,
    option: u32,
    current: Option<VecDeque<Phrase>>,
}

impl Query {
    pub fn new(
        dict: Arc<Dictionary>,
        pinyin: Vec<Pinyin>,
        begin: usize,
        max_len: usize,
        option: u32,
    ) -> Self {
        assert!(begin < pinyin.len());
        assert!(max_len >= 1 && begin + max_len <= pinyin.len());
        assert!(max_len <= MAX_PHRASE_LEN);
        Self {
            dict,
            pinyin,
            begin,
            len: max_len,
            option,
            current: None,
        }
    }

    /// Phrase length currently being drained; 0 once exhausted.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Append up to `count` rows to `out`. Returns how many were appended;
    /// 0 means the cursor is exhausted.
    pub fn fill(&mut self, out: &mut Vec<Phrase>, count: usize) -> usize {
        let mut filled = 0;
        while self.len > 0 && filled < count {
            let mut rows = match self.current.take() {
                Some(rows) => rows,
                None => self
                    .dict
                    .query(&self.pinyin, self.begin, self.len, None, self.option)
                    .into(),
            };
            while filled < count {
                match rows.pop_front() {
                    Some(phrase) => {
                        out.push(phrase);
                        filled += 1;
                    }
                    None => break,
                }
            }
            if rows.is_empty() {
                self.len -= 1;
            } else {
                self.current = Some(rows);
            }
        }
        filled
    }
}
