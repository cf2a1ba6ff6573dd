//! Bopomofo-keyboard input context.
//!
//! The buffer stores the typed keys; every rendering step maps them through
//! the active keyboard schema's glyph table.

use crate::bopomofo::{
    glyph_char, is_tone, keyval_to_bopomofo, BOPOMOFO_KEYBOARD_LAST, BOPOMOFO_KEYBOARD_STANDARD,
    BOPOMOFO_ZERO,
};
use crate::context::{CommitType, ContextObserver, PhoneticContext, PreeditText};
use crate::dictionary::Dictionary;
use crate::parser::SyllableParser;
use crate::simptrad::SimpTradConverter;
use crate::special_phrase::SpecialPhraseTable;
use crate::{Config, MAX_PHRASE_LEN, MAX_PINYIN_LEN, PINYIN_INCOMPLETE_PINYIN};
use std::sync::Arc;

pub struct BopomofoContext {
    ctx: PhoneticContext,
    parser: Arc<dyn SyllableParser>,
    schema: u32,
}

impl BopomofoContext {
    pub fn new(
        dict: Arc<Dictionary>,
        parser: Arc<dyn SyllableParser>,
        special_table: Arc<SpecialPhraseTable>,
        converter: Arc<dyn SimpTradConverter>,
        config: Config,
        observer: Box<dyn ContextObserver>,
    ) -> Self {
        Self {
            ctx: PhoneticContext::new(dict, special_table, converter, config, observer),
            parser,
            schema: BOPOMOFO_KEYBOARD_STANDARD,
        }
    }

    pub fn context(&self) -> &PhoneticContext {
        &self.ctx
    }

    pub fn input_text(&self) -> &str {
        self.ctx.input_text()
    }

    pub fn cursor(&self) -> usize {
        self.ctx.cursor()
    }

    pub fn preedit_text(&self) -> &PreeditText {
        self.ctx.preedit_text()
    }

    pub fn auxiliary_text(&self) -> &str {
        self.ctx.auxiliary_text()
    }

    pub fn candidates(&self) -> &[crate::context::Candidate] {
        self.ctx.candidates()
    }

    pub fn focused_candidate(&self) -> usize {
        self.ctx.focused_candidate()
    }

    pub fn bopomofo_schema(&self) -> u32 {
        self.schema
    }

    /// Switch the keyboard layout. Out-of-range values are rejected and the
    /// state is left unchanged.
    pub fn set_bopomofo_schema(&mut self, schema: u32) -> bool {
        if schema >= BOPOMOFO_KEYBOARD_LAST {
            return false;
        }
        self.schema = schema;
        true
    }

    pub fn insert(&mut self, ch: char) -> bool {
        if keyval_to_bopomofo(self.schema, ch) == BOPOMOFO_ZERO {
            return false;
        }
        if self.ctx.text.len() >= MAX_PINYIN_LEN {
            return true;
        }

        self.ctx.text.insert(self.ctx.cursor, ch);
        self.ctx.cursor += 1;
        self.ctx.update_input_text();
        self.ctx.update_cursor();

        if self.ctx.config.option & PINYIN_INCOMPLETE_PINYIN == 0
            || self.ctx.cursor <= self.ctx.pinyin_len + 2
        {
            self.ctx.update_special_phrases();
            self.update_pinyin();
        } else if self.ctx.update_special_phrases() {
            self.refresh_views();
        } else {
            self.update_preedit_text();
            self.update_auxiliary_text();
        }
        self.ctx.flush();
        true
    }

    pub fn remove_char_before(&mut self) -> bool {
        if self.ctx.cursor == 0 {
            return false;
        }
        self.ctx.cursor -= 1;
        self.ctx.text.remove(self.ctx.cursor);
        self.ctx.update_input_text();
        self.ctx.update_cursor();
        self.ctx.update_special_phrases();
        self.update_pinyin();
        self.ctx.flush();
        true
    }

    pub fn remove_char_after(&mut self) -> bool {
        if self.ctx.cursor == self.ctx.text.len() {
            return false;
        }
        self.ctx.text.remove(self.ctx.cursor);
        self.ctx.update_input_text();
        self.update_preedit_text();
        self.update_auxiliary_text();
        self.ctx.flush();
        true
    }

    pub fn remove_word_before(&mut self) -> bool {
        if self.ctx.cursor == 0 {
            return false;
        }

        let cursor = if self.ctx.cursor > self.ctx.pinyin_len {
            self.ctx.pinyin_len
        } else {
            match self.ctx.pinyin.pop() {
                Some(p) => {
                    self.ctx.pinyin_len -= p.len;
                    self.ctx.cursor - p.len
                }
                None => 0,
            }
        };

        self.ctx.text.replace_range(cursor..self.ctx.cursor, "");
        self.ctx.cursor = cursor;
        self.ctx.update_input_text();
        self.ctx.update_cursor();
        self.ctx.update_special_phrases();
        self.ctx.update_phrase_editor();
        self.refresh_views();
        self.ctx.flush();
        true
    }

    /// Erases from the cursor to the end of the buffer.
    pub fn remove_word_after(&mut self) -> bool {
        if self.ctx.cursor == self.ctx.text.len() {
            return false;
        }
        self.ctx.text.truncate(self.ctx.cursor);
        self.ctx.update_input_text();
        self.update_preedit_text();
        self.update_auxiliary_text();
        self.ctx.flush();
        true
    }

    pub fn move_cursor_left(&mut self) -> bool {
        if self.ctx.cursor == 0 {
            return false;
        }
        self.ctx.cursor -= 1;
        self.ctx.update_cursor();
        self.ctx.update_special_phrases();
        self.update_pinyin();
        self.ctx.flush();
        true
    }

    pub fn move_cursor_right(&mut self) -> bool {
        if self.ctx.cursor == self.ctx.text.len() {
            return false;
        }
        self.ctx.cursor += 1;
        self.ctx.update_cursor();
        self.ctx.update_special_phrases();
        self.update_pinyin();
        self.ctx.flush();
        true
    }

    pub fn move_cursor_left_by_word(&mut self) -> bool {
        if self.ctx.cursor == 0 {
            return false;
        }

        if self.ctx.cursor > self.ctx.pinyin_len {
            self.ctx.cursor = self.ctx.pinyin_len;
            self.ctx.update_cursor();
            self.ctx.flush();
            return true;
        }

        if let Some(p) = self.ctx.pinyin.pop() {
            self.ctx.cursor -= p.len;
            self.ctx.pinyin_len -= p.len;
        }
        self.ctx.update_cursor();
        self.ctx.update_special_phrases();
        self.ctx.update_phrase_editor();
        self.refresh_views();
        self.ctx.flush();
        true
    }

    pub fn move_cursor_right_by_word(&mut self) -> bool {
        self.move_cursor_to_end()
    }

    pub fn move_cursor_to_begin(&mut self) -> bool {
        if self.ctx.cursor == 0 {
            return false;
        }
        self.ctx.cursor = 0;
        self.ctx.pinyin.clear();
        self.ctx.pinyin_len = 0;
        self.ctx.update_cursor();
        self.ctx.update_special_phrases();
        self.ctx.update_phrase_editor();
        self.refresh_views();
        self.ctx.flush();
        true
    }

    pub fn move_cursor_to_end(&mut self) -> bool {
        if self.ctx.cursor == self.ctx.text.len() {
            return false;
        }
        self.ctx.cursor = self.ctx.text.len();
        self.ctx.update_cursor();
        self.ctx.update_special_phrases();
        self.update_pinyin();
        self.ctx.flush();
        true
    }

    pub fn focus_candidate(&mut self, index: usize) -> bool {
        if !self.ctx.focus_candidate_inner(index) {
            return false;
        }
        self.update_preedit_text();
        self.update_auxiliary_text();
        self.ctx.flush();
        true
    }

    pub fn focus_candidate_prev(&mut self) -> bool {
        if self.ctx.focused_candidate == 0 {
            return false;
        }
        self.focus_candidate(self.ctx.focused_candidate - 1)
    }

    pub fn focus_candidate_next(&mut self) -> bool {
        self.focus_candidate(self.ctx.focused_candidate + 1)
    }

    pub fn select_candidate(&mut self, index: usize) -> bool {
        if !self.ctx.select_candidate_inner(index) {
            return false;
        }
        self.update_preedit_text();
        self.update_auxiliary_text();
        self.ctx.flush();
        true
    }

    /// Pop the last phrase-editor selection.
    pub fn unselect_candidate(&mut self) -> bool {
        if !self.ctx.editor.unselect() {
            return false;
        }
        self.refresh_views();
        self.ctx.flush();
        true
    }

    pub fn reset(&mut self) {
        self.ctx.reset_context();
        self.ctx.flush();
    }

    pub fn commit(&mut self, commit_type: CommitType) {
        if self.ctx.text.is_empty() && self.ctx.editor.is_empty() {
            return;
        }

        let mut out = String::new();
        match commit_type {
            CommitType::Converted => {
                if self.ctx.selected_special_phrase.is_none()
                    && self.ctx.editor.cursor() < self.ctx.pinyin.len()
                    && self.ctx.has_candidate(self.ctx.focused_candidate)
                {
                    self.ctx.select_candidate_inner(self.ctx.focused_candidate);
                }
                out.push_str(&self.ctx.editor.selected_string());
                let tail = match self.ctx.selected_special_phrase.clone() {
                    None => {
                        let consumed = self.ctx.editor.cursor();
                        self.ctx.text_after_words(consumed).to_string()
                    }
                    Some(special) => {
                        out.push_str(&special);
                        self.ctx.text_after_cursor().to_string()
                    }
                };
                out.push_str(&self.transliterate(&tail));
                self.ctx.editor.commit();
            }
            CommitType::Phonetic => {
                let text = self.ctx.text.clone();
                out.push_str(&self.transliterate(&text));
            }
            CommitType::Raw => {
                out.push_str(&self.ctx.text);
                self.ctx.editor.reset();
            }
        }

        self.ctx.reset_context();
        self.ctx.queue_commit(out);
        self.ctx.flush();
    }

    /// Map typed keys to their Bopomofo glyphs under the current schema.
    fn transliterate(&self, keys: &str) -> String {
        let mut out = String::new();
        for ch in keys.chars() {
            let glyph = keyval_to_bopomofo(self.schema, ch);
            if glyph != BOPOMOFO_ZERO {
                out.push(glyph_char(glyph));
            }
        }
        out
    }

    fn update_pinyin(&mut self) {
        if self.ctx.text.is_empty() {
            self.ctx.pinyin.clear();
            self.ctx.pinyin_len = 0;
        } else {
            let glyphs: Vec<u8> = self
                .ctx
                .text
                .chars()
                .map(|ch| keyval_to_bopomofo(self.schema, ch))
                .collect();
            let (pinyin, consumed) = self.parser.parse_bopomofo(
                &glyphs,
                self.ctx.cursor,
                self.ctx.config.option,
                MAX_PHRASE_LEN,
            );
            self.ctx.pinyin = pinyin;
            self.ctx.pinyin_len = consumed;
        }
        self.ctx.update_phrase_editor();
        self.refresh_views();
    }

    fn refresh_views(&mut self) {
        self.ctx.refresh_candidates();
        self.update_preedit_text();
        self.update_auxiliary_text();
    }

    fn update_preedit_text(&mut self) {
        if self.ctx.editor.is_empty() && self.ctx.text.is_empty() {
            self.ctx.set_preedit(PreeditText::default());
            return;
        }

        let mut preedit = PreeditText {
            selected_text: self.ctx.editor.selected_string(),
            ..PreeditText::default()
        };

        if let Some(special) = self.ctx.selected_special_phrase.clone() {
            preedit.selected_text.push_str(&special);
            preedit.rest_text = self.ctx.text_after_cursor().to_string();
            self.ctx.set_preedit(preedit);
            return;
        }

        if self.ctx.has_candidate(0) {
            let index = self.ctx.focused_candidate;
            let specials = self.ctx.special_phrases.len();
            if index < specials {
                preedit.candidate_text = self.ctx.special_phrases[index].clone();
                preedit.rest_text = self.ctx.text_after_cursor().to_string();
            } else if let Some(candidate) = self.ctx.editor.candidate(index - specials).cloned() {
                if self.ctx.cursor == self.ctx.text.len() {
                    preedit.candidate_text = if self.ctx.config.mode_simp {
                        candidate.text.clone()
                    } else {
                        self.ctx.converter.simp_to_trad(&candidate.text)
                    };
                    preedit.rest_text = self.transliterate(self.ctx.text_after_parsed());
                } else {
                    // cursor inside the buffer: show the whole glyph stream
                    // with a gap at the cursor
                    let mut s = String::new();
                    let cursor = self.ctx.cursor;
                    let text = self.ctx.text.clone();
                    for (i, ch) in text.chars().enumerate() {
                        if i == cursor {
                            s.push(' ');
                        }
                        let glyph = keyval_to_bopomofo(self.schema, ch);
                        if glyph != BOPOMOFO_ZERO {
                            s.push(glyph_char(glyph));
                        }
                    }
                    preedit.candidate_text = s;
                }
            }
        } else {
            preedit.rest_text = self.transliterate(self.ctx.text_after_parsed());
        }
        self.ctx.set_preedit(preedit);
    }

    /// aux = unconsumed syllables as glyphs (with their tone marks) joined
    /// by commas, then the unparsed tail with a cursor marker.
    fn update_auxiliary_text(&mut self) {
        if self.ctx.text.is_empty() {
            self.ctx.set_auxiliary(String::new());
            return;
        }

        if self.ctx.selected_special_phrase.is_some() {
            let mut buffer = String::new();
            if self.ctx.cursor < self.ctx.text.len() {
                buffer.push('|');
                buffer.push_str(self.ctx.text_after_cursor());
            }
            self.ctx.set_auxiliary(buffer);
            return;
        }

        if !self.ctx.has_candidate(0) {
            self.ctx.set_auxiliary(String::new());
            return;
        }

        let mut buffer = String::new();
        let editor_cursor = self.ctx.editor.cursor();
        let bytes = self.ctx.text.as_bytes();
        let mut si = self.ctx.offset_after_words(editor_cursor);
        for (i, p) in self.ctx.pinyin[editor_cursor..].iter().enumerate() {
            if i > 0 {
                buffer.push(',');
            }
            buffer.push_str(&p.bopomofo);
            si += p.bopomofo.chars().count();
            if si < bytes.len() {
                let glyph = keyval_to_bopomofo(self.schema, bytes[si] as char);
                if is_tone(glyph) {
                    buffer.push(glyph_char(glyph));
                    si += 1;
                }
            }
        }

        for i in self.ctx.pinyin_len..bytes.len() {
            if self.ctx.cursor == i {
                buffer.push('|');
            }
            let glyph = keyval_to_bopomofo(self.schema, bytes[i] as char);
            if glyph != BOPOMOFO_ZERO {
                buffer.push(glyph_char(glyph));
            }
        }
        if self.ctx.cursor == self.ctx.text.len() {
            buffer.push('|');
        }
        self.ctx.set_auxiliary(buffer);
    }
}
