//! Prefix-commit composition over a pinyin array.
//!
//! The editor consumes the segmented pinyin left to right: every selection
//! covers the next syllables after the already-chosen prefix, and the cached
//! candidate list always describes the position right after that prefix.

use crate::dictionary::Dictionary;
use crate::phrase::Phrase;
use crate::pinyin::Pinyin;
use crate::query::Query;
use crate::simptrad::SimpTradConverter;
use crate::{Config, MAX_PHRASE_LEN};
use std::collections::HashSet;
use std::sync::Arc;

/// Rows pulled from the query cursor per refill.
const FILL_GRANULARITY: usize = 6;

/// Candidates materialized eagerly after each position change.
const CANDIDATE_PREFETCH: usize = 12;

pub struct PhraseEditor {
    dict: Arc<Dictionary>,
    converter: Arc<dyn SimpTradConverter>,
    config: Config,
    pinyin: Vec<Pinyin>,
    cursor: usize,
    selected: Vec<Phrase>,
    candidates: Vec<Phrase>,
    seen: HashSet<String>,
    query: Option<Query>,
}

impl PhraseEditor {
    pub fn new(dict: Arc<Dictionary>, converter: Arc<dyn SimpTradConverter>, config: Config) -> Self {
        Self {
            dict,
            converter,
            config,
            pinyin: Vec::new(),
            cursor: 0,
            selected: Vec::new(),
            candidates: Vec::new(),
            seen: HashSet::new(),
            query: None,
        }
    }

    pub fn pinyin(&self) -> &[Pinyin] {
        &self.pinyin
    }

    /// Syllables consumed by the selected prefix.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Input characters consumed by the selected prefix.
    pub fn cursor_in_chars(&self) -> usize {
        self.pinyin[..self.cursor].iter().map(|p| p.len).sum()
    }

    pub fn selected(&self) -> &[Phrase] {
        &self.selected
    }

    pub fn candidates(&self) -> &[Phrase] {
        &self.candidates
    }

    pub fn candidate(&self, index: usize) -> Option<&Phrase> {
        self.candidates.get(index)
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty() && self.pinyin.is_empty()
    }

    /// Replace the working pinyin. Selections are dropped and candidates are
    /// rebuilt from offset 0.
    pub fn update(&mut self, pinyin: Vec<Pinyin>) {
        self.pinyin = pinyin;
        self.cursor = 0;
        self.selected.clear();
        self.rebuild_candidates();
    }

    fn rebuild_candidates(&mut self) {
        self.candidates.clear();
        self.seen.clear();
        self.query = None;
        if self.cursor >= self.pinyin.len() {
            return;
        }
        let max_len = MAX_PHRASE_LEN.min(self.pinyin.len() - self.cursor);
        self.query = Some(Query::new(
            Arc::clone(&self.dict),
            self.pinyin.clone(),
            self.cursor,
            max_len,
            self.config.option,
        ));
        self.fill_candidates(CANDIDATE_PREFETCH);
    }

    /// Pull up to `count` more rows from the query cursor, deduplicating by
    /// phrase text (first occurrence wins). Returns whether anything new
    /// appeared.
    pub fn fill_candidates(&mut self, count: usize) -> bool {
        let Some(mut query) = self.query.take() else {
            return false;
        };
        let before = self.candidates.len();
        let target = before + count;
        let mut exhausted = false;
        let mut batch = Vec::new();
        while self.candidates.len() < target && !exhausted {
            batch.clear();
            if query.fill(&mut batch, FILL_GRANULARITY) == 0 {
                exhausted = true;
            }
            for phrase in batch.drain(..) {
                if self.seen.insert(phrase.text.clone()) {
                    self.candidates.push(phrase);
                }
            }
        }
        if !exhausted {
            self.query = Some(query);
        }
        self.candidates.len() > before
    }

    /// Materialize candidates lazily until `index` exists.
    pub fn ensure_candidate(&mut self, index: usize) -> bool {
        while self.candidates.len() <= index {
            if !self.fill_candidates(FILL_GRANULARITY) {
                break;
            }
        }
        index < self.candidates.len()
    }

    /// Choose a candidate: it becomes part of the selected prefix and the
    /// candidate view moves past its syllables.
    pub fn select(&mut self, index: usize) -> bool {
        if !self.ensure_candidate(index) {
            return false;
        }
        let phrase = self.candidates[index].clone();
        self.cursor += phrase.len();
        debug_assert!(self.cursor <= self.pinyin.len());
        self.selected.push(phrase);
        self.rebuild_candidates();
        true
    }

    /// Pop the last selection, restoring the preceding candidate view.
    pub fn unselect(&mut self) -> bool {
        match self.selected.pop() {
            Some(phrase) => {
                self.cursor -= phrase.len();
                self.rebuild_candidates();
                true
            }
            None => false,
        }
    }

    pub fn reset(&mut self) {
        self.pinyin.clear();
        self.cursor = 0;
        self.selected.clear();
        self.candidates.clear();
        self.seen.clear();
        self.query = None;
    }

    /// Record the selected phrases in the user dictionary, then reset.
    pub fn commit(&mut self) {
        if !self.selected.is_empty() {
            self.dict.commit(&self.selected);
        }
        self.reset();
    }

    /// Concatenated selection text, converted to Traditional forms when the
    /// context is not in Simplified mode.
    pub fn selected_string(&self) -> String {
        let mut out = String::new();
        for phrase in &self.selected {
            out.push_str(&phrase.text);
        }
        if self.config.mode_simp || out.is_empty() {
            out
        } else {
            self.converter.simp_to_trad(&out)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::{DictOptions, MainDictBuilder};
    use crate::parser::{GreedyParser, SyllableParser};
    use crate::pinyin::sequence_ids;
    use crate::simptrad::Passthrough;
    use std::path::PathBuf;

    fn temp_dir(tag: &str) -> PathBuf {
        let mut p = std::env::temp_dir();
        p.push(format!(
            "pyzy_editor_{}_{}_{}",
            tag,
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        std::fs::create_dir_all(&p).unwrap();
        p
    }

    fn editor(tag: &str) -> PhraseEditor {
        let dir = temp_dir(tag);
        let mut builder = MainDictBuilder::new();
        builder.insert(&sequence_ids("ni hao").unwrap(), "你好", 8000);
        builder.insert(&sequence_ids("ni").unwrap(), "你", 9000);
        builder.insert(&sequence_ids("ni").unwrap(), "尼", 500);
        builder.insert(&sequence_ids("hao").unwrap(), "好", 7000);
        let fst = dir.join("main.fst");
        builder.write(&fst).unwrap();
        let dict = Arc::new(
            Dictionary::open(DictOptions::new(dir.join("user")).with_main(fst)).unwrap(),
        );
        PhraseEditor::new(dict, Arc::new(Passthrough), Config::default())
    }

    fn pinyin_of(text: &str) -> Vec<Pinyin> {
        GreedyParser::new().parse(text, text.len(), 0, MAX_PHRASE_LEN).0
    }

    #[test]
    fn candidates_longest_first() {
        let mut ed = editor("longest");
        ed.update(pinyin_of("nihao"));
        let texts: Vec<_> = ed.candidates().iter().map(|p| p.text.as_str()).collect();
        assert_eq!(texts, vec!["你好", "你", "尼"]);
    }

    #[test]
    fn select_advances_and_consumes() {
        let mut ed = editor("select");
        ed.update(pinyin_of("nihao"));
        assert!(ed.select(1)); // "你"
        assert_eq!(ed.cursor(), 1);
        assert_eq!(ed.cursor_in_chars(), 2);
        assert_eq!(ed.candidates()[0].text, "好");

        assert!(ed.select(0));
        assert_eq!(ed.cursor(), 2);
        assert!(ed.candidates().is_empty());
        assert_eq!(ed.selected_string(), "你好");
    }

    #[test]
    fn unselect_restores_previous_view() {
        let mut ed = editor("unselect");
        ed.update(pinyin_of("nihao"));
        assert!(ed.select(1));
        assert!(ed.unselect());
        assert_eq!(ed.cursor(), 0);
        assert_eq!(ed.candidates()[0].text, "你好");
        assert!(!ed.unselect());
    }

    #[test]
    fn commit_learns_selection() {
        let mut ed = editor("commit");
        ed.update(pinyin_of("nihao"));
        ed.select(1);
        ed.select(0);
        let dict = Arc::clone(&ed.dict);
        ed.commit();
        assert!(ed.is_empty());

        // the concatenation was learned as a single phrase
        let pinyin = pinyin_of("nihao");
        let rows = dict.query(&pinyin, 0, 2, None, 0);
        assert!(rows.iter().any(|p| p.text == "你好" && p.user_freq >= 1));
    }
}
