//! Shared phonetic-context state: buffer, cursor, candidate cache, derived
//! texts and observer notification batching.
//!
//! The two input variants (`FullPinyinContext`, `BopomofoContext`) own one
//! `PhoneticContext` each and layer their key acceptance, parsing and
//! rendering on top; there is no inheritance, only composition.

use crate::dictionary::Dictionary;
use crate::phrase::Phrase;
use crate::phrase_editor::PhraseEditor;
use crate::pinyin::Pinyin;
use crate::simptrad::SimpTradConverter;
use crate::special_phrase::SpecialPhraseTable;
use crate::Config;
use std::sync::Arc;

/// What `commit` emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitType {
    /// Selected phrases plus the unconverted tail.
    Converted,
    /// The raw key buffer.
    Raw,
    /// The Bopomofo transliteration of the buffer.
    Phonetic,
}

/// Composition text split into its three non-overlapping fragments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreeditText {
    pub selected_text: String,
    pub candidate_text: String,
    pub rest_text: String,
}

impl PreeditText {
    pub fn is_empty(&self) -> bool {
        self.selected_text.is_empty()
            && self.candidate_text.is_empty()
            && self.rest_text.is_empty()
    }

    /// The three fragments joined, exactly what a renderer displays.
    pub fn text(&self) -> String {
        let mut out =
            String::with_capacity(self.selected_text.len() + self.candidate_text.len() + self.rest_text.len());
        out.push_str(&self.selected_text);
        out.push_str(&self.candidate_text);
        out.push_str(&self.rest_text);
        out
    }
}

/// One entry of the flat candidate list: special phrases come first, then
/// dictionary phrases.
#[derive(Debug, Clone, PartialEq)]
pub enum Candidate {
    Special(String),
    Phrase(Phrase),
}

impl Candidate {
    pub fn text(&self) -> &str {
        match self {
            Candidate::Special(s) => s,
            Candidate::Phrase(p) => &p.text,
        }
    }
}

/// Notification sink of one context.
///
/// After every public operation the context flushes its dirty channels, each
/// at most once, in the order these methods are declared. All methods have
/// no-op defaults so observers implement only what they render.
pub trait ContextObserver {
    fn commit_text(&mut self, text: &str) {
        let _ = text;
    }
    fn input_text_changed(&mut self, text: &str) {
        let _ = text;
    }
    fn cursor_changed(&mut self, cursor: usize) {
        let _ = cursor;
    }
    fn preedit_text_changed(&mut self, preedit: &PreeditText) {
        let _ = preedit;
    }
    fn auxiliary_text_changed(&mut self, text: &str) {
        let _ = text;
    }
    fn candidates_changed(&mut self, candidates: &[Candidate]) {
        let _ = candidates;
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Dirty {
    input_text: bool,
    cursor: bool,
    preedit: bool,
    auxiliary: bool,
    candidates: bool,
}

impl Dirty {
    fn all() -> Self {
        Self {
            input_text: true,
            cursor: true,
            preedit: true,
            auxiliary: true,
            candidates: true,
        }
    }
}

/// State shared by both context variants.
pub struct PhoneticContext {
    pub(crate) text: String,
    pub(crate) cursor: usize,
    pub(crate) pinyin: Vec<Pinyin>,
    pub(crate) pinyin_len: usize,
    pub(crate) editor: PhraseEditor,
    pub(crate) special_table: Arc<SpecialPhraseTable>,
    pub(crate) special_phrases: Vec<String>,
    pub(crate) selected_special_phrase: Option<String>,
    pub(crate) focused_candidate: usize,
    pub(crate) candidates: Vec<Candidate>,
    pub(crate) input_text: String,
    pub(crate) preedit_text: PreeditText,
    pub(crate) auxiliary_text: String,
    pub(crate) config: Config,
    pub(crate) converter: Arc<dyn SimpTradConverter>,
    observer: Box<dyn ContextObserver>,
    pending_commit: Option<String>,
    dirty: Dirty,
}

impl PhoneticContext {
    pub(crate) fn new(
        dict: Arc<Dictionary>,
        special_table: Arc<SpecialPhraseTable>,
        converter: Arc<dyn SimpTradConverter>,
        config: Config,
        observer: Box<dyn ContextObserver>,
    ) -> Self {
        Self {
            text: String::new(),
            cursor: 0,
            pinyin: Vec::new(),
            pinyin_len: 0,
            editor: PhraseEditor::new(dict, Arc::clone(&converter), config),
            special_table,
            special_phrases: Vec::new(),
            selected_special_phrase: None,
            focused_candidate: 0,
            candidates: Vec::new(),
            input_text: String::new(),
            preedit_text: PreeditText::default(),
            auxiliary_text: String::new(),
            config,
            converter,
            observer,
            pending_commit: None,
            dirty: Dirty::default(),
        }
    }

    pub fn input_text(&self) -> &str {
        &self.input_text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn preedit_text(&self) -> &PreeditText {
        &self.preedit_text
    }

    pub fn auxiliary_text(&self) -> &str {
        &self.auxiliary_text
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn focused_candidate(&self) -> usize {
        self.focused_candidate
    }

    pub fn selected_special_phrase(&self) -> Option<&str> {
        self.selected_special_phrase.as_deref()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub(crate) fn update_input_text(&mut self) {
        self.input_text = self.text.clone();
        self.dirty.input_text = true;
    }

    pub(crate) fn update_cursor(&mut self) {
        self.dirty.cursor = true;
    }

    pub(crate) fn set_preedit(&mut self, preedit: PreeditText) {
        self.preedit_text = preedit;
        self.dirty.preedit = true;
    }

    pub(crate) fn set_auxiliary(&mut self, text: String) {
        self.auxiliary_text = text;
        self.dirty.auxiliary = true;
    }

    /// Input between the selected prefix and the cursor; this is the trigger
    /// the special-phrase table is keyed by.
    pub(crate) fn special_trigger(&self) -> &str {
        let begin = self.editor.cursor_in_chars();
        if begin <= self.cursor {
            &self.text[begin..self.cursor]
        } else {
            ""
        }
    }

    /// Refresh static special-phrase suggestions. Returns whether the
    /// suggestion list changed.
    pub(crate) fn update_special_phrases(&mut self) -> bool {
        let suggestions = if self.selected_special_phrase.is_none() {
            let trigger = self.special_trigger();
            if trigger.is_empty() {
                Vec::new()
            } else {
                self.special_table.lookup(trigger)
            }
        } else {
            Vec::new()
        };
        if suggestions == self.special_phrases {
            return false;
        }
        self.special_phrases = suggestions;
        true
    }

    fn rebuild_flat(&mut self) {
        self.candidates.clear();
        if self.selected_special_phrase.is_none() {
            for s in &self.special_phrases {
                self.candidates.push(Candidate::Special(s.clone()));
            }
            for p in self.editor.candidates() {
                self.candidates.push(Candidate::Phrase(p.clone()));
            }
        }
        self.dirty.candidates = true;
    }

    /// Rebuild the flat candidate cache and move focus back to the head.
    pub(crate) fn refresh_candidates(&mut self) {
        self.focused_candidate = 0;
        self.rebuild_flat();
    }

    pub(crate) fn update_phrase_editor(&mut self) {
        self.editor.update(self.pinyin.clone());
    }

    /// True when a candidate exists at `index`, pulling lazily from the
    /// query cursor as needed.
    pub(crate) fn has_candidate(&mut self, index: usize) -> bool {
        if self.selected_special_phrase.is_some() {
            return false;
        }
        let specials = self.special_phrases.len();
        if index < specials {
            return true;
        }
        let before = self.editor.candidates().len();
        let ok = self.editor.ensure_candidate(index - specials);
        if self.editor.candidates().len() != before {
            self.rebuild_flat();
        }
        ok
    }

    pub(crate) fn focus_candidate_inner(&mut self, index: usize) -> bool {
        if !self.has_candidate(index) {
            return false;
        }
        self.focused_candidate = index;
        true
    }

    /// Shared half of candidate selection. Special phrases set the
    /// ready-to-commit prefix; dictionary phrases go through the editor.
    pub(crate) fn select_candidate_inner(&mut self, index: usize) -> bool {
        if !self.has_candidate(index) {
            return false;
        }
        let specials = self.special_phrases.len();
        if index < specials {
            self.selected_special_phrase = Some(self.special_phrases[index].clone());
            self.focused_candidate = 0;
            self.rebuild_flat();
            true
        } else if self.editor.select(index - specials) {
            self.refresh_candidates();
            true
        } else {
            false
        }
    }

    /// Byte offset of the input past the first `n_words` syllables.
    pub(crate) fn offset_after_words(&self, n_words: usize) -> usize {
        self.pinyin[..n_words.min(self.pinyin.len())]
            .iter()
            .map(|p| p.len)
            .sum()
    }

    pub(crate) fn text_after_words(&self, n_words: usize) -> &str {
        &self.text[self.offset_after_words(n_words)..]
    }

    /// Input past the parsed prefix.
    pub(crate) fn text_after_parsed(&self) -> &str {
        &self.text[self.pinyin_len..]
    }

    pub(crate) fn text_after_cursor(&self) -> &str {
        &self.text[self.cursor..]
    }

    pub(crate) fn reset_context(&mut self) {
        self.text.clear();
        self.cursor = 0;
        self.pinyin.clear();
        self.pinyin_len = 0;
        self.editor.reset();
        self.special_phrases.clear();
        self.selected_special_phrase = None;
        self.focused_candidate = 0;
        self.candidates.clear();
        self.input_text.clear();
        self.preedit_text = PreeditText::default();
        self.auxiliary_text.clear();
        self.dirty = Dirty::all();
    }

    pub(crate) fn queue_commit(&mut self, text: String) {
        self.pending_commit = Some(text);
    }

    /// Deliver batched notifications, each dirty channel exactly once.
    pub(crate) fn flush(&mut self) {
        self.check_invariants();
        if let Some(text) = self.pending_commit.take() {
            self.observer.commit_text(&text);
        }
        if self.dirty.input_text {
            self.observer.input_text_changed(&self.input_text);
        }
        if self.dirty.cursor {
            self.observer.cursor_changed(self.cursor);
        }
        if self.dirty.preedit {
            self.observer.preedit_text_changed(&self.preedit_text);
        }
        if self.dirty.auxiliary {
            self.observer.auxiliary_text_changed(&self.auxiliary_text);
        }
        if self.dirty.candidates {
            self.observer.candidates_changed(&self.candidates);
        }
        self.dirty = Dirty::default();
    }

    #[cfg(debug_assertions)]
    fn check_invariants(&self) {
        debug_assert!(self.cursor <= self.text.len());
        debug_assert!(self.pinyin_len <= self.text.len());
        debug_assert_eq!(
            self.pinyin.iter().map(|p| p.len).sum::<usize>(),
            self.pinyin_len
        );
        debug_assert!(self.editor.cursor() <= self.pinyin.len());
        debug_assert_eq!(
            self.editor
                .selected()
                .iter()
                .map(|p| p.len())
                .sum::<usize>(),
            self.editor.cursor()
        );
    }

    #[cfg(not(debug_assertions))]
    fn check_invariants(&self) {}
}
