//! End-to-end tests of the full-Pinyin context.

mod common;

use common::*;
use pyzy_core::{Candidate, CommitType, Config, MAX_PINYIN_LEN};

#[test]
fn converted_commit_emits_focused_candidate() {
    let dir = temp_dir("converted");
    let (mut ctx, rec) = full_context(&dir, Config::default());
    type_text(&mut ctx, "nihao");

    assert_eq!(ctx.candidates()[0].text(), "你好");
    assert_eq!(ctx.focused_candidate(), 0);

    ctx.commit(CommitType::Converted);
    let rec = rec.lock().unwrap();
    assert_eq!(rec.commits, vec!["你好".to_string()]);

    // context is back to the empty state
    assert_eq!(ctx.input_text(), "");
    assert_eq!(ctx.cursor(), 0);
    assert!(ctx.preedit_text().is_empty());
    assert_eq!(ctx.auxiliary_text(), "");
    assert!(ctx.candidates().is_empty());
}

#[test]
fn raw_commit_emits_buffer_verbatim() {
    let dir = temp_dir("raw");
    let (mut ctx, rec) = full_context(&dir, Config::default());
    type_text(&mut ctx, "nihao");
    ctx.commit(CommitType::Raw);
    assert_eq!(rec.lock().unwrap().commits, vec!["nihao".to_string()]);
    assert_eq!(ctx.input_text(), "");
}

#[test]
fn auxiliary_shows_segmentation_and_cursor() {
    let dir = temp_dir("aux");
    let (mut ctx, _) = full_context(&dir, Config::default());
    type_text(&mut ctx, "nihao");
    assert_eq!(ctx.auxiliary_text(), "ni hao|");
}

#[test]
fn preedit_shows_focused_candidate_at_end() {
    let dir = temp_dir("preedit");
    let (mut ctx, _) = full_context(&dir, Config::default());
    type_text(&mut ctx, "nihao");
    let preedit = ctx.preedit_text();
    assert_eq!(preedit.selected_text, "");
    assert_eq!(preedit.candidate_text, "你好");
    assert_eq!(preedit.rest_text, "");
}

#[test]
fn select_then_commit_partial() {
    let dir = temp_dir("partial");
    let (mut ctx, rec) = full_context(&dir, Config::default());
    type_text(&mut ctx, "nihao");

    // pick the single-syllable "你" first
    let index = ctx
        .candidates()
        .iter()
        .position(|c| c.text() == "你")
        .unwrap();
    assert!(ctx.select_candidate(index));
    assert_eq!(ctx.preedit_text().selected_text, "你");
    assert_eq!(ctx.candidates()[0].text(), "好");

    ctx.commit(CommitType::Converted);
    assert_eq!(rec.lock().unwrap().commits, vec!["你好".to_string()]);
}

#[test]
fn rejected_key_leaves_state_untouched() {
    let dir = temp_dir("reject");
    let (mut ctx, rec) = full_context(&dir, Config::default());
    type_text(&mut ctx, "ni");
    let before = rec.lock().unwrap().channels.len();

    assert!(!ctx.insert('A'));
    assert!(!ctx.insert('1'));
    assert_eq!(ctx.input_text(), "ni");
    assert_eq!(rec.lock().unwrap().channels.len(), before);
}

#[test]
fn insert_at_capacity_returns_true_without_mutation() {
    let dir = temp_dir("capacity");
    let (mut ctx, _) = full_context(&dir, Config::default());
    for _ in 0..MAX_PINYIN_LEN {
        assert!(ctx.insert('a'));
    }
    assert_eq!(ctx.input_text().len(), MAX_PINYIN_LEN);
    assert!(ctx.insert('a'));
    assert_eq!(ctx.input_text().len(), MAX_PINYIN_LEN);
}

#[test]
fn insert_remove_roundtrip_restores_empty_state() {
    let dir = temp_dir("roundtrip");
    let (mut ctx, _) = full_context(&dir, Config::default());
    type_text(&mut ctx, "nihao");
    for _ in 0..5 {
        assert!(ctx.remove_char_before());
    }
    assert!(!ctx.remove_char_before());
    assert_eq!(ctx.input_text(), "");
    assert_eq!(ctx.cursor(), 0);
    assert!(ctx.preedit_text().is_empty());
    assert_eq!(ctx.auxiliary_text(), "");
    assert!(ctx.candidates().is_empty());
}

#[test]
fn cursor_moves_are_inverses_in_the_interior() {
    let dir = temp_dir("cursor");
    let (mut ctx, _) = full_context(&dir, Config::default());
    type_text(&mut ctx, "nihao");

    assert!(ctx.move_cursor_left());
    assert!(ctx.move_cursor_left());
    let cursor = ctx.cursor();
    let aux = ctx.auxiliary_text().to_string();

    assert!(ctx.move_cursor_left());
    assert!(ctx.move_cursor_right());
    assert_eq!(ctx.cursor(), cursor);
    assert_eq!(ctx.auxiliary_text(), aux);
}

#[test]
fn cursor_moves_fail_at_extremes() {
    let dir = temp_dir("extremes");
    let (mut ctx, _) = full_context(&dir, Config::default());
    assert!(!ctx.move_cursor_left());
    assert!(!ctx.move_cursor_right());
    type_text(&mut ctx, "ni");
    assert!(!ctx.move_cursor_right());
    assert!(ctx.move_cursor_to_begin());
    assert!(!ctx.move_cursor_left());
    assert!(ctx.move_cursor_to_end());
    assert!(!ctx.move_cursor_to_end());
}

#[test]
fn reset_matches_fresh_context() {
    let dir = temp_dir("reset");
    let (mut ctx, _) = full_context(&dir, Config::default());
    type_text(&mut ctx, "nihao");
    ctx.select_candidate(0);
    ctx.reset();

    assert_eq!(ctx.input_text(), "");
    assert_eq!(ctx.cursor(), 0);
    assert!(ctx.preedit_text().is_empty());
    assert_eq!(ctx.auxiliary_text(), "");
    assert!(ctx.candidates().is_empty());
    assert_eq!(ctx.focused_candidate(), 0);

    // and it is usable again
    type_text(&mut ctx, "nihao");
    assert_eq!(ctx.candidates()[0].text(), "你好");
}

#[test]
fn remove_word_before_drops_last_syllable() {
    let dir = temp_dir("word");
    let (mut ctx, _) = full_context(&dir, Config::default());
    type_text(&mut ctx, "nihao");
    assert!(ctx.remove_word_before());
    assert_eq!(ctx.input_text(), "ni");
    assert_eq!(ctx.cursor(), 2);
    assert!(ctx.remove_word_before());
    assert_eq!(ctx.input_text(), "");
    assert!(!ctx.remove_word_before());
}

#[test]
fn remove_word_after_erases_to_end() {
    let dir = temp_dir("wordafter");
    let (mut ctx, _) = full_context(&dir, Config::default());
    type_text(&mut ctx, "nihao");
    ctx.move_cursor_left();
    ctx.move_cursor_left();
    ctx.move_cursor_left();
    assert!(ctx.remove_word_after());
    assert_eq!(ctx.input_text(), "ni");
    assert!(!ctx.remove_word_after());
}

#[test]
fn unselect_restores_candidate_view() {
    let dir = temp_dir("unselect");
    let (mut ctx, _) = full_context(&dir, Config::default());
    type_text(&mut ctx, "nihao");
    let index = ctx
        .candidates()
        .iter()
        .position(|c| c.text() == "你")
        .unwrap();
    ctx.select_candidate(index);
    assert!(ctx.unselect_candidate());
    assert_eq!(ctx.preedit_text().selected_text, "");
    assert_eq!(ctx.candidates()[0].text(), "你好");
    assert!(!ctx.unselect_candidate());
}

#[test]
fn focus_navigation_is_bounded() {
    let dir = temp_dir("focus");
    let (mut ctx, _) = full_context(&dir, Config::default());
    type_text(&mut ctx, "nihao");
    assert!(!ctx.focus_candidate_prev());
    assert!(ctx.focus_candidate_next());
    assert_eq!(ctx.focused_candidate(), 1);
    assert!(ctx.focus_candidate_prev());
    assert_eq!(ctx.focused_candidate(), 0);
    assert!(!ctx.focus_candidate(1000));
}

#[test]
fn commit_on_empty_context_is_a_noop() {
    let dir = temp_dir("emptycommit");
    let (mut ctx, rec) = full_context(&dir, Config::default());
    ctx.commit(CommitType::Converted);
    ctx.commit(CommitType::Raw);
    assert!(rec.lock().unwrap().commits.is_empty());
}

#[test]
fn unparsable_tail_takes_the_fast_path() {
    let dir = temp_dir("fastpath");
    let (mut ctx, _) = full_context(&dir, Config::default());
    // apostrophes never parse, so the cursor runs ahead of the parsed
    // prefix and later inserts skip the re-parse
    for _ in 0..4 {
        assert!(ctx.insert('\''));
    }
    assert_eq!(ctx.input_text(), "''''");
    assert!(ctx.candidates().is_empty());
    assert_eq!(ctx.auxiliary_text(), "");
    ctx.commit(CommitType::Raw);
    assert_eq!(ctx.input_text(), "");
}

#[test]
fn notifications_flush_in_channel_order() {
    let dir = temp_dir("order");
    let (mut ctx, rec) = full_context(&dir, Config::default());
    rec.lock().unwrap().channels.clear();
    ctx.insert('n');

    let channels = rec.lock().unwrap().channels.clone();
    let expected = ["input_text", "cursor", "preedit", "auxiliary", "candidates"];
    assert_eq!(channels, expected);
}

#[test]
fn candidates_flow_through_observer() {
    let dir = temp_dir("observer");
    let (mut ctx, rec) = full_context(&dir, Config::default());
    type_text(&mut ctx, "nihao");
    let rec = rec.lock().unwrap();
    assert_eq!(rec.last_candidates.first().map(String::as_str), Some("你好"));
    assert_eq!(rec.last_auxiliary, "ni hao|");
    assert!(matches!(ctx.candidates()[0], Candidate::Phrase(_)));
}
