#![allow(dead_code)]

use pyzy_core::dictionary::{DictOptions, Dictionary, MainDictBuilder};
use pyzy_core::pinyin::sequence_ids;
use pyzy_core::{
    BopomofoContext, Candidate, Config, ContextObserver, FullPinyinContext, GreedyParser,
    Passthrough, PreeditText, SimpTradConverter, SpecialPhraseTable,
};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

pub fn temp_dir(tag: &str) -> PathBuf {
    let mut p = std::env::temp_dir();
    p.push(format!(
        "pyzy_it_{}_{}_{}",
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

pub fn build_main_dict(dir: &Path) -> PathBuf {
    let mut builder = MainDictBuilder::new();
    builder.insert(&sequence_ids("ni hao").unwrap(), "你好", 8000);
    builder.insert(&sequence_ids("ni hao").unwrap(), "拟好", 100);
    builder.insert(&sequence_ids("ni").unwrap(), "你", 9000);
    builder.insert(&sequence_ids("ni").unwrap(), "尼", 500);
    builder.insert(&sequence_ids("hao").unwrap(), "好", 7000);
    builder.insert(&sequence_ids("ci").unwrap(), "次", 3000);
    builder.insert(&sequence_ids("chi").unwrap(), "吃", 2000);
    builder.insert(&sequence_ids("zhong guo").unwrap(), "中国", 9500);
    let fst = dir.join("main.fst");
    builder.write(&fst).unwrap();
    fst
}

pub fn open_dict(dir: &Path) -> Arc<Dictionary> {
    let fst = build_main_dict(dir);
    Arc::new(Dictionary::open(DictOptions::new(dir.join("user")).with_main(fst)).unwrap())
}

/// Records every notification a context delivers.
#[derive(Debug, Default)]
pub struct Recorded {
    pub commits: Vec<String>,
    pub channels: Vec<&'static str>,
    pub last_preedit: PreeditText,
    pub last_auxiliary: String,
    pub last_candidates: Vec<String>,
}

pub struct Recorder {
    inner: Arc<Mutex<Recorded>>,
}

impl Recorder {
    pub fn new() -> (Box<dyn ContextObserver>, Arc<Mutex<Recorded>>) {
        let inner = Arc::new(Mutex::new(Recorded::default()));
        (
            Box::new(Recorder {
                inner: Arc::clone(&inner),
            }),
            inner,
        )
    }
}

impl ContextObserver for Recorder {
    fn commit_text(&mut self, text: &str) {
        let mut rec = self.inner.lock().unwrap();
        rec.channels.push("commit");
        rec.commits.push(text.to_string());
    }

    fn input_text_changed(&mut self, _text: &str) {
        self.inner.lock().unwrap().channels.push("input_text");
    }

    fn cursor_changed(&mut self, _cursor: usize) {
        self.inner.lock().unwrap().channels.push("cursor");
    }

    fn preedit_text_changed(&mut self, preedit: &PreeditText) {
        let mut rec = self.inner.lock().unwrap();
        rec.channels.push("preedit");
        rec.last_preedit = preedit.clone();
    }

    fn auxiliary_text_changed(&mut self, text: &str) {
        let mut rec = self.inner.lock().unwrap();
        rec.channels.push("auxiliary");
        rec.last_auxiliary = text.to_string();
    }

    fn candidates_changed(&mut self, candidates: &[Candidate]) {
        let mut rec = self.inner.lock().unwrap();
        rec.channels.push("candidates");
        rec.last_candidates = candidates.iter().map(|c| c.text().to_string()).collect();
    }
}

pub fn full_context_with(
    dict: Arc<Dictionary>,
    table: Arc<SpecialPhraseTable>,
    converter: Arc<dyn SimpTradConverter>,
    config: Config,
) -> (FullPinyinContext, Arc<Mutex<Recorded>>) {
    let (observer, recorded) = Recorder::new();
    let ctx = FullPinyinContext::new(
        dict,
        Arc::new(GreedyParser::new()),
        table,
        converter,
        config,
        observer,
    );
    (ctx, recorded)
}

pub fn full_context(dir: &Path, config: Config) -> (FullPinyinContext, Arc<Mutex<Recorded>>) {
    full_context_with(
        open_dict(dir),
        Arc::new(SpecialPhraseTable::new()),
        Arc::new(Passthrough),
        config,
    )
}

pub fn bopomofo_context(dir: &Path, config: Config) -> (BopomofoContext, Arc<Mutex<Recorded>>) {
    let (observer, recorded) = Recorder::new();
    let ctx = BopomofoContext::new(
        open_dict(dir),
        Arc::new(GreedyParser::new()),
        Arc::new(SpecialPhraseTable::new()),
        Arc::new(Passthrough),
        config,
        observer,
    );
    (ctx, recorded)
}

pub fn type_text(ctx: &mut FullPinyinContext, text: &str) {
    for ch in text.chars() {
        assert!(ctx.insert(ch), "insert {:?} rejected", ch);
    }
}

pub fn type_keys(ctx: &mut BopomofoContext, keys: &str) {
    for ch in keys.chars() {
        assert!(ctx.insert(ch), "insert {:?} rejected", ch);
    }
}
