//! End-to-end tests of the Bopomofo context on the standard keyboard.

mod common;

use common::*;
use pyzy_core::{
    CommitType, Config, BOPOMOFO_KEYBOARD_HSU, BOPOMOFO_KEYBOARD_LAST, BOPOMOFO_KEYBOARD_STANDARD,
};

#[test]
fn auxiliary_shows_glyphs_with_tones() {
    let dir = temp_dir("bpmf_aux");
    let (mut ctx, _) = bopomofo_context(&dir, Config::default());
    type_keys(&mut ctx, "su3cl3");
    assert_eq!(ctx.auxiliary_text(), "ㄋㄧˇ,ㄏㄠˇ|");
}

#[test]
fn converted_commit_emits_focused_candidate() {
    let dir = temp_dir("bpmf_commit");
    let (mut ctx, rec) = bopomofo_context(&dir, Config::default());
    type_keys(&mut ctx, "su3cl3");
    assert_eq!(ctx.candidates()[0].text(), "你好");
    ctx.commit(CommitType::Converted);
    assert_eq!(rec.lock().unwrap().commits, vec!["你好".to_string()]);
    assert_eq!(ctx.input_text(), "");
}

#[test]
fn phonetic_commit_emits_transliteration() {
    let dir = temp_dir("bpmf_phonetic");
    let (mut ctx, rec) = bopomofo_context(&dir, Config::default());
    type_keys(&mut ctx, "su3cl3");
    ctx.commit(CommitType::Phonetic);
    assert_eq!(rec.lock().unwrap().commits, vec!["ㄋㄧˇㄏㄠˇ".to_string()]);
}

#[test]
fn raw_commit_emits_keys() {
    let dir = temp_dir("bpmf_raw");
    let (mut ctx, rec) = bopomofo_context(&dir, Config::default());
    type_keys(&mut ctx, "su3cl3");
    ctx.commit(CommitType::Raw);
    assert_eq!(rec.lock().unwrap().commits, vec!["su3cl3".to_string()]);
}

#[test]
fn input_text_is_the_key_buffer() {
    let dir = temp_dir("bpmf_input");
    let (mut ctx, _) = bopomofo_context(&dir, Config::default());
    type_keys(&mut ctx, "su3");
    assert_eq!(ctx.input_text(), "su3");
}

#[test]
fn unmapped_key_is_rejected() {
    let dir = temp_dir("bpmf_reject");
    let (mut ctx, rec) = bopomofo_context(&dir, Config::default());
    assert!(!ctx.insert('!'));
    assert!(!ctx.insert('A'));
    assert_eq!(ctx.input_text(), "");
    assert!(rec.lock().unwrap().channels.is_empty());
}

#[test]
fn schema_property_rejects_out_of_range() {
    let dir = temp_dir("bpmf_schema");
    let (mut ctx, _) = bopomofo_context(&dir, Config::default());
    assert_eq!(ctx.bopomofo_schema(), BOPOMOFO_KEYBOARD_STANDARD);
    assert!(!ctx.set_bopomofo_schema(BOPOMOFO_KEYBOARD_LAST));
    assert!(!ctx.set_bopomofo_schema(BOPOMOFO_KEYBOARD_LAST + 7));
    assert_eq!(ctx.bopomofo_schema(), BOPOMOFO_KEYBOARD_STANDARD);
    assert!(ctx.set_bopomofo_schema(BOPOMOFO_KEYBOARD_HSU));
    assert_eq!(ctx.bopomofo_schema(), BOPOMOFO_KEYBOARD_HSU);
}

#[test]
fn schema_changes_key_acceptance() {
    let dir = temp_dir("bpmf_accept");
    let (mut ctx, _) = bopomofo_context(&dir, Config::default());
    // '1' maps to ㄅ on the standard layout but to nothing on HSU
    assert!(ctx.insert('1'));
    ctx.reset();
    ctx.set_bopomofo_schema(BOPOMOFO_KEYBOARD_HSU);
    assert!(!ctx.insert('1'));
    assert!(ctx.insert('b'));
}

#[test]
fn backspace_roundtrip() {
    let dir = temp_dir("bpmf_roundtrip");
    let (mut ctx, _) = bopomofo_context(&dir, Config::default());
    type_keys(&mut ctx, "su3cl3");
    for _ in 0..6 {
        assert!(ctx.remove_char_before());
    }
    assert!(!ctx.remove_char_before());
    assert_eq!(ctx.input_text(), "");
    assert!(ctx.preedit_text().is_empty());
    assert_eq!(ctx.auxiliary_text(), "");
    assert!(ctx.candidates().is_empty());
}
