//! Main + user phrase store.
//!
//! The read-only main dictionary is a pair of files: an FST index mapping
//! byte-encoded syllable id sequences to payload indices, and a bincode
//! payload vector of phrase rows. The user dictionary lives in memory and is
//! persisted to a redb file by a deferred backup job: learning writes arm a
//! one-shot timer, and once the store has been quiet for the timeout the
//! worker writes a complete temp file and atomically renames it over the
//! persisted one.

use crate::phrase::Phrase;
use crate::pinyin::{Pinyin, PinyinId, YUN_ZERO};
use crate::MAX_PHRASE_LEN;
use fst::{Automaton, IntoStreamer, Map, MapBuilder, Streamer};
use redb::{ReadableTable, TableDefinition};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// File name of the persisted user dictionary inside the user data dir.
pub const USER_DICTIONARY_FILE: &str = "user-1.0.db";

/// Quiet period before a learning write is persisted.
pub const DB_BACKUP_TIMEOUT: Duration = Duration::from_secs(60);

const USER_DB_VERSION: &str = "1.2.0";

/// Metadata table of the persisted user dictionary.
pub const DESC_TABLE: TableDefinition<&str, &str> = TableDefinition::new("desc");

/// Phrase table of the persisted user dictionary: encoded id-sequence key to
/// bincode `Vec<UserRecord>`.
pub const PHRASE_TABLE: TableDefinition<&[u8], &[u8]> = TableDefinition::new("phrases");

#[derive(Debug, thiserror::Error)]
pub enum DictError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("main dictionary index: {0}")]
    Fst(#[from] fst::Error),
    #[error("phrase payload encoding: {0}")]
    Encode(#[from] bincode::Error),
    #[error("user dictionary: {0}")]
    UserDb(#[from] redb::Error),
    #[error("no main dictionary found in any probed location")]
    MainNotFound,
}

/// One row of the main-dictionary payload file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MainRecord {
    pub text: String,
    pub freq: u32,
}

/// One row of the user dictionary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub text: String,
    pub freq: u32,
    pub user_freq: u32,
}

/// Key layout: `[len, s0, y0, s1, y1, ...]`. The length prefix keeps keys of
/// different phrase lengths from shadowing each other's prefixes.
pub(crate) fn phrase_key(ids: &[PinyinId]) -> Vec<u8> {
    let mut key = Vec::with_capacity(1 + ids.len() * 2);
    key.push(ids.len() as u8);
    for id in ids {
        key.push(id.sheng);
        key.push(id.yun);
    }
    key
}

fn key_ids(key: &[u8]) -> Vec<PinyinId> {
    key[1..]
        .chunks_exact(2)
        .map(|c| PinyinId::new(c[0], c[1]))
        .collect()
}

/// Up to three allowed ids at one position (exact + fuzzy alternatives).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdSet {
    ids: [u8; 3],
    n: u8,
}

impl IdSet {
    fn push(&mut self, id: u8) {
        if !self.contains(id) {
            self.ids[self.n as usize] = id;
            self.n += 1;
        }
    }

    pub fn contains(&self, id: u8) -> bool {
        self.ids[..self.n as usize].contains(&id)
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.ids[..self.n as usize]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PositionCond {
    sheng: IdSet,
    /// `None` matches any final (incomplete syllable).
    yun: Option<IdSet>,
}

/// Per-position match sets for one query, built once and evaluated against
/// both the main and the user store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryConstraints {
    positions: Vec<PositionCond>,
}

impl QueryConstraints {
    pub fn build(pinyin: &[Pinyin], begin: usize, len: usize, option: u32) -> Self {
        let mut positions = Vec::with_capacity(len);
        for p in &pinyin[begin..begin + len] {
            let exact = p.ids[0];
            let mut sheng = IdSet::default();
            sheng.push(exact.sheng);
            if sheng_fuzzy_enabled(option, exact.sheng, p.ids[1].sheng) {
                sheng.push(p.ids[1].sheng);
            }
            if sheng_fuzzy_enabled(option, exact.sheng, p.ids[2].sheng) {
                sheng.push(p.ids[2].sheng);
            }
            let yun = if exact.yun == YUN_ZERO {
                None
            } else {
                let mut set = IdSet::default();
                set.push(exact.yun);
                if yun_fuzzy_enabled(option, exact.yun, p.ids[1].yun) {
                    set.push(p.ids[1].yun);
                }
                Some(set)
            };
            positions.push(PositionCond { sheng, yun });
        }
        Self { positions }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Allowed initials at a position.
    pub fn sheng_candidates(&self, i: usize) -> &[u8] {
        self.positions[i].sheng.as_slice()
    }

    /// Allowed finals at a position; `None` means any final matches.
    pub fn yun_candidates(&self, i: usize) -> Option<&[u8]> {
        self.positions[i].yun.as_ref().map(|s| s.as_slice())
    }

    fn key_len(&self) -> usize {
        1 + 2 * self.positions.len()
    }

    fn matches_key(&self, key: &[u8]) -> bool {
        if key.len() != self.key_len() || key[0] as usize != self.positions.len() {
            return false;
        }
        for (i, cond) in self.positions.iter().enumerate() {
            if !cond.sheng.contains(key[1 + 2 * i]) {
                return false;
            }
            if let Some(yun) = &cond.yun {
                if !yun.contains(key[2 + 2 * i]) {
                    return false;
                }
            }
        }
        true
    }
}

fn sheng_fuzzy_enabled(option: u32, id: u8, fid: u8) -> bool {
    use crate::pinyin::*;
    let bit = match (id, fid) {
        (SHENG_C, SHENG_CH) => crate::PINYIN_FUZZY_C_CH,
        (SHENG_CH, SHENG_C) => crate::PINYIN_FUZZY_CH_C,
        (SHENG_Z, SHENG_ZH) => crate::PINYIN_FUZZY_Z_ZH,
        (SHENG_ZH, SHENG_Z) => crate::PINYIN_FUZZY_ZH_Z,
        (SHENG_S, SHENG_SH) => crate::PINYIN_FUZZY_S_SH,
        (SHENG_SH, SHENG_S) => crate::PINYIN_FUZZY_SH_S,
        (SHENG_L, SHENG_N) => crate::PINYIN_FUZZY_L_N,
        (SHENG_N, SHENG_L) => crate::PINYIN_FUZZY_N_L,
        (SHENG_F, SHENG_H) => crate::PINYIN_FUZZY_F_H,
        (SHENG_H, SHENG_F) => crate::PINYIN_FUZZY_H_F,
        (SHENG_L, SHENG_R) => crate::PINYIN_FUZZY_L_R,
        (SHENG_R, SHENG_L) => crate::PINYIN_FUZZY_R_L,
        (SHENG_K, SHENG_G) => crate::PINYIN_FUZZY_K_G,
        (SHENG_G, SHENG_K) => crate::PINYIN_FUZZY_G_K,
        _ => return false,
    };
    option & bit != 0
}

fn yun_fuzzy_enabled(option: u32, id: u8, fid: u8) -> bool {
    use crate::pinyin::*;
    let bit = match (id, fid) {
        (YUN_AN, YUN_ANG) => crate::PINYIN_FUZZY_AN_ANG,
        (YUN_ANG, YUN_AN) => crate::PINYIN_FUZZY_ANG_AN,
        (YUN_EN, YUN_ENG) => crate::PINYIN_FUZZY_EN_ENG,
        (YUN_ENG, YUN_EN) => crate::PINYIN_FUZZY_ENG_EN,
        (YUN_IN, YUN_ING) => crate::PINYIN_FUZZY_IN_ING,
        (YUN_ING, YUN_IN) => crate::PINYIN_FUZZY_ING_IN,
        (YUN_IAN, YUN_IANG) => crate::PINYIN_FUZZY_IAN_IANG,
        (YUN_IANG, YUN_IAN) => crate::PINYIN_FUZZY_IANG_IAN,
        (YUN_UAN, YUN_UANG) => crate::PINYIN_FUZZY_UAN_UANG,
        (YUN_UANG, YUN_UAN) => crate::PINYIN_FUZZY_UANG_UAN,
        _ => return false,
    };
    option & bit != 0
}

/// FST automaton walking only keys the constraints allow. State is the byte
/// offset into the key, `None` once a byte falls outside its match set.
struct KeyMask<'a>(&'a QueryConstraints);

impl Automaton for KeyMask<'_> {
    type State = Option<usize>;

    fn start(&self) -> Option<usize> {
        Some(0)
    }

    fn is_match(&self, state: &Option<usize>) -> bool {
        *state == Some(self.0.key_len())
    }

    fn can_match(&self, state: &Option<usize>) -> bool {
        state.is_some()
    }

    fn accept(&self, state: &Option<usize>, byte: u8) -> Option<usize> {
        let pos = (*state)?;
        if pos >= self.0.key_len() {
            return None;
        }
        let ok = if pos == 0 {
            byte as usize == self.0.positions.len()
        } else {
            let cond = &self.0.positions[(pos - 1) / 2];
            if (pos - 1) % 2 == 0 {
                cond.sheng.contains(byte)
            } else {
                cond.yun.as_ref().map_or(true, |set| set.contains(byte))
            }
        };
        if ok {
            Some(pos + 1)
        } else {
            None
        }
    }
}

#[derive(Debug, Default)]
struct MainDict {
    index: Option<Map<Vec<u8>>>,
    payloads: Vec<Vec<MainRecord>>,
}

impl MainDict {
    /// Load the `.fst` index plus its sibling `.phrases` payload file.
    fn load(fst_path: &Path) -> Result<Self, DictError> {
        let index = Map::new(std::fs::read(fst_path)?)?;
        let payload_path = fst_path.with_extension("phrases");
        let payloads: Vec<Vec<MainRecord>> = bincode::deserialize(&std::fs::read(&payload_path)?)?;
        Ok(Self {
            index: Some(index),
            payloads,
        })
    }

    fn search(&self, constraints: &QueryConstraints, out: &mut Vec<Phrase>) {
        let Some(index) = &self.index else { return };
        let mut stream = index.search(KeyMask(constraints)).into_stream();
        while let Some((key, idx)) = stream.next() {
            let ids = key_ids(key);
            if let Some(bucket) = self.payloads.get(idx as usize) {
                for row in bucket {
                    out.push(Phrase {
                        text: row.text.clone(),
                        freq: row.freq,
                        user_freq: 0,
                        ids: ids.clone(),
                    });
                }
            }
        }
    }
}

/// Builds the main-dictionary file pair. Used by the dictionary build tool
/// and by tests.
#[derive(Debug, Default)]
pub struct MainDictBuilder {
    buckets: BTreeMap<Vec<u8>, Vec<MainRecord>>,
}

impl MainDictBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, ids: &[PinyinId], text: &str, freq: u32) {
        assert!(!ids.is_empty() && ids.len() <= MAX_PHRASE_LEN);
        let bucket = self.buckets.entry(phrase_key(ids)).or_default();
        match bucket.iter_mut().find(|r| r.text == text) {
            Some(row) => row.freq = row.freq.max(freq),
            None => bucket.push(MainRecord {
                text: text.to_string(),
                freq,
            }),
        }
    }

    /// Write `<fst_path>` and the sibling `.phrases` payload file.
    pub fn write(&self, fst_path: &Path) -> Result<(), DictError> {
        let mut builder = MapBuilder::new(Vec::new())?;
        let mut payloads: Vec<Vec<MainRecord>> = Vec::with_capacity(self.buckets.len());
        for (key, bucket) in &self.buckets {
            let mut rows = bucket.clone();
            rows.sort_by(|a, b| b.freq.cmp(&a.freq));
            builder.insert(key, payloads.len() as u64)?;
            payloads.push(rows);
        }
        if let Some(dir) = fst_path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(fst_path, builder.into_inner()?)?;
        std::fs::write(
            fst_path.with_extension("phrases"),
            bincode::serialize(&payloads)?,
        )?;
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
struct UserTables {
    rows: BTreeMap<Vec<u8>, Vec<UserRecord>>,
}

impl UserTables {
    fn search(&self, constraints: &QueryConstraints, out: &mut Vec<Phrase>) {
        let len = constraints.len() as u8;
        for (key, rows) in self.rows.range(vec![len]..vec![len + 1]) {
            if !constraints.matches_key(key) {
                continue;
            }
            let ids = key_ids(key);
            for row in rows {
                out.push(Phrase {
                    text: row.text.clone(),
                    freq: row.freq,
                    user_freq: row.user_freq,
                    ids: ids.clone(),
                });
            }
        }
    }

    fn learn(&mut self, phrase: &Phrase) {
        let rows = self.rows.entry(phrase_key(&phrase.ids)).or_default();
        match rows.iter_mut().find(|r| r.text == phrase.text) {
            Some(row) => row.user_freq += 1,
            None => rows.push(UserRecord {
                text: phrase.text.clone(),
                freq: phrase.freq,
                user_freq: 1,
            }),
        }
    }

    fn remove(&mut self, phrase: &Phrase) {
        let key = phrase_key(&phrase.ids);
        if let Some(rows) = self.rows.get_mut(&key) {
            rows.retain(|r| r.text != phrase.text);
            if rows.is_empty() {
                self.rows.remove(&key);
            }
        }
    }
}

#[derive(Debug, Default)]
struct BackupState {
    last_modified: Option<Instant>,
    armed: bool,
    shutdown: bool,
}

struct DictInner {
    main: MainDict,
    user: Mutex<UserTables>,
    desc: Mutex<BTreeMap<String, String>>,
    user_data_dir: PathBuf,
    user_db_path: PathBuf,
    backup_timeout: Duration,
    backup: Mutex<BackupState>,
    cv: Condvar,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// Where and how to open the store.
#[derive(Debug, Clone)]
pub struct DictOptions {
    /// `.fst` paths probed in order; the first loadable pair wins.
    pub main_locations: Vec<PathBuf>,
    /// Directory holding `user-1.0.db`, created `0750` when absent.
    pub user_data_dir: PathBuf,
    /// Quiet period of the backup job.
    pub backup_timeout: Duration,
}

impl DictOptions {
    pub fn new(user_data_dir: impl Into<PathBuf>) -> Self {
        let user_data_dir = user_data_dir.into();
        Self {
            main_locations: vec![
                user_data_dir.join("db/local.fst"),
                user_data_dir.join("db/open-phrase.fst"),
                PathBuf::from("main.fst"),
            ],
            user_data_dir,
            backup_timeout: DB_BACKUP_TIMEOUT,
        }
    }

    pub fn with_main(mut self, fst_path: impl Into<PathBuf>) -> Self {
        self.main_locations = vec![fst_path.into()];
        self
    }

    pub fn with_backup_timeout(mut self, timeout: Duration) -> Self {
        self.backup_timeout = timeout;
        self
    }
}

/// The phrase store: read-only main tables, in-memory user tables, and the
/// backup worker. One value is shared (`Arc`) by all contexts of a process.
pub struct Dictionary {
    inner: Arc<DictInner>,
    worker: Option<thread::JoinHandle<()>>,
}

impl std::fmt::Debug for Dictionary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dictionary")
            .field("user_db_path", &self.inner.user_db_path)
            .finish()
    }
}

impl Dictionary {
    /// Open the store. Fails with `MainNotFound` when no probed location
    /// holds a loadable main dictionary.
    pub fn open(options: DictOptions) -> Result<Self, DictError> {
        let main = Self::probe_main(&options.main_locations)?;
        Ok(Self::assemble(main, options))
    }

    /// Open without a main dictionary: queries only see user rows. This is
    /// the degraded mode for installations whose packaged data is missing.
    pub fn open_user_only(user_data_dir: impl Into<PathBuf>) -> Self {
        Self::assemble(MainDict::default(), DictOptions::new(user_data_dir))
    }

    /// Same as `open_user_only` but with explicit options (test hook for
    /// short backup timeouts).
    pub fn open_user_only_with(options: DictOptions) -> Self {
        Self::assemble(MainDict::default(), options)
    }

    fn probe_main(locations: &[PathBuf]) -> Result<MainDict, DictError> {
        for path in locations {
            if !path.is_file() {
                continue;
            }
            match MainDict::load(path) {
                Ok(main) => {
                    debug!(path = %path.display(), "opened main dictionary");
                    return Ok(main);
                }
                Err(e) => warn!(path = %path.display(), error = %e, "skipping main dictionary"),
            }
        }
        Err(DictError::MainNotFound)
    }

    fn assemble(main: MainDict, options: DictOptions) -> Self {
        let user_db_path = options.user_data_dir.join(USER_DICTIONARY_FILE);
        let (user, desc) = load_user_db(&user_db_path);
        let inner = Arc::new(DictInner {
            main,
            user: Mutex::new(user),
            desc: Mutex::new(desc),
            user_data_dir: options.user_data_dir,
            user_db_path,
            backup_timeout: options.backup_timeout,
            backup: Mutex::new(BackupState::default()),
            cv: Condvar::new(),
        });
        let worker = {
            let inner = Arc::clone(&inner);
            thread::Builder::new()
                .name("pyzy-userdb-backup".into())
                .spawn(move || backup_worker(inner))
                .ok()
        };
        Self { inner, worker }
    }

    /// Candidate query over `pinyin[begin..begin+len]`. Results are grouped
    /// by phrase text and ordered by `(user_freq desc, freq desc)`;
    /// `limit = None` returns every match.
    pub fn query(
        &self,
        pinyin: &[Pinyin],
        begin: usize,
        len: usize,
        limit: Option<usize>,
        option: u32,
    ) -> Vec<Phrase> {
        assert!(begin < pinyin.len());
        assert!(len >= 1 && begin + len <= pinyin.len());
        assert!(len <= MAX_PHRASE_LEN);

        let constraints = QueryConstraints::build(pinyin, begin, len, option);
        let mut rows = Vec::new();
        self.inner.main.search(&constraints, &mut rows);
        lock(&self.inner.user).search(&constraints, &mut rows);

        let mut index: HashMap<String, usize> = HashMap::new();
        let mut merged: Vec<Phrase> = Vec::new();
        for row in rows {
            match index.get(&row.text) {
                Some(&i) => {
                    let current = &mut merged[i];
                    if (row.user_freq, row.freq) > (current.user_freq, current.freq) {
                        *current = row;
                    }
                }
                None => {
                    index.insert(row.text.clone(), merged.len());
                    merged.push(row);
                }
            }
        }
        merged.sort_by(|a, b| (b.user_freq, b.freq).cmp(&(a.user_freq, a.freq)));
        if let Some(limit) = limit {
            merged.truncate(limit);
        }
        merged
    }

    /// Record committed phrases. A batch of more than one phrase also learns
    /// the concatenation, so frequent compositions become single candidates.
    pub fn commit(&self, phrases: &[Phrase]) {
        if phrases.is_empty() {
            return;
        }
        {
            let mut user = lock(&self.inner.user);
            for p in phrases {
                user.learn(p);
            }
            if phrases.len() > 1 {
                user.learn(&Phrase::concat(phrases));
            }
        }
        self.modified();
    }

    /// Delete the exact `(ids, text)` row from the user dictionary.
    pub fn remove(&self, phrase: &Phrase) {
        lock(&self.inner.user).remove(phrase);
        self.modified();
    }

    fn modified(&self) {
        let mut state = lock(&self.inner.backup);
        state.last_modified = Some(Instant::now());
        state.armed = true;
        self.inner.cv.notify_all();
    }
}

impl Drop for Dictionary {
    fn drop(&mut self) {
        let armed = {
            let mut state = lock(&self.inner.backup);
            state.shutdown = true;
            self.inner.cv.notify_all();
            state.armed
        };
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
        if armed {
            if let Err(e) = save_user_db(&self.inner) {
                warn!(error = %e, "final user dictionary backup failed");
            }
        }
    }
}

fn backup_worker(inner: Arc<DictInner>) {
    let mut state = lock(&inner.backup);
    loop {
        if state.shutdown {
            return;
        }
        if !state.armed {
            state = match inner.cv.wait(state) {
                Ok(guard) => guard,
                Err(e) => e.into_inner(),
            };
            continue;
        }
        let deadline = state.last_modified.unwrap_or_else(Instant::now) + inner.backup_timeout;
        let now = Instant::now();
        if now < deadline {
            state = match inner.cv.wait_timeout(state, deadline - now) {
                Ok((guard, _)) => guard,
                Err(e) => e.into_inner().0,
            };
            continue;
        }

        let snapshot = state.last_modified;
        drop(state);
        let saved = match save_user_db(&inner) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "user dictionary backup failed; will retry");
                false
            }
        };
        state = lock(&inner.backup);
        if saved {
            if state.last_modified == snapshot {
                state.armed = false;
                state.last_modified = None;
            }
        } else {
            state.last_modified = Some(Instant::now());
        }
    }
}

fn now_string() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_default()
}

fn default_desc() -> BTreeMap<String, String> {
    let mut desc = BTreeMap::new();
    desc.insert("version".into(), USER_DB_VERSION.into());
    desc.insert("uuid".into(), uuid::Uuid::new_v4().to_string());
    desc.insert(
        "hostname".into(),
        std::env::var("HOSTNAME").unwrap_or_default(),
    );
    desc.insert(
        "username".into(),
        std::env::var("USERNAME")
            .or_else(|_| std::env::var("USER"))
            .unwrap_or_default(),
    );
    desc.insert("create-time".into(), now_string());
    desc
}

fn load_user_db(path: &Path) -> (UserTables, BTreeMap<String, String>) {
    let mut desc = default_desc();
    let mut tables = UserTables::default();
    if path.is_file() {
        if let Err(e) = read_user_db(path, &mut desc, &mut tables) {
            warn!(path = %path.display(), error = %e, "user dictionary restore failed; starting empty");
            tables = UserTables::default();
        }
    }
    desc.insert("attach-time".into(), now_string());
    (tables, desc)
}

fn read_user_db(
    path: &Path,
    desc: &mut BTreeMap<String, String>,
    tables: &mut UserTables,
) -> Result<(), DictError> {
    let db = redb::Database::open(path).map_err(redb::Error::from)?;
    let tx = db.begin_read().map_err(redb::Error::from)?;

    // a file predating either table is upgraded by the next backup
    match tx.open_table(DESC_TABLE) {
        Ok(table) => {
            let mut iter = table.iter().map_err(redb::Error::from)?;
            while let Some(item) = iter.next() {
                let (k, v) = item.map_err(redb::Error::from)?;
                desc.insert(k.value().to_string(), v.value().to_string());
            }
        }
        Err(redb::TableError::TableDoesNotExist(_)) => {}
        Err(e) => return Err(DictError::UserDb(e.into())),
    }

    match tx.open_table(PHRASE_TABLE) {
        Ok(table) => {
            let mut iter = table.iter().map_err(redb::Error::from)?;
            while let Some(item) = iter.next() {
                let (k, v) = item.map_err(redb::Error::from)?;
                let rows: Vec<UserRecord> = bincode::deserialize(v.value())?;
                tables.rows.insert(k.value().to_vec(), rows);
            }
        }
        Err(redb::TableError::TableDoesNotExist(_)) => {}
        Err(e) => return Err(DictError::UserDb(e.into())),
    }
    Ok(())
}

fn ensure_user_data_dir(dir: &Path) -> std::io::Result<()> {
    if dir.is_dir() {
        return Ok(());
    }
    let mut builder = std::fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o750);
    }
    builder.create(dir)
}

fn save_user_db(inner: &DictInner) -> Result<(), DictError> {
    ensure_user_data_dir(&inner.user_data_dir)?;

    let mut tmp = inner.user_db_path.as_os_str().to_owned();
    tmp.push("-tmp");
    let tmp = PathBuf::from(tmp);
    let _ = std::fs::remove_file(&tmp);

    let user = lock(&inner.user).clone();
    let desc = lock(&inner.desc).clone();

    {
        let db = redb::Database::create(&tmp).map_err(redb::Error::from)?;
        let tx = db.begin_write().map_err(redb::Error::from)?;
        {
            let mut table = tx.open_table(DESC_TABLE).map_err(redb::Error::from)?;
            for (k, v) in &desc {
                table
                    .insert(k.as_str(), v.as_str())
                    .map_err(redb::Error::from)?;
            }
            let mut table = tx.open_table(PHRASE_TABLE).map_err(redb::Error::from)?;
            for (key, rows) in &user.rows {
                let value = bincode::serialize(rows)?;
                table
                    .insert(key.as_slice(), value.as_slice())
                    .map_err(redb::Error::from)?;
            }
        }
        tx.commit().map_err(redb::Error::from)?;
    }

    std::fs::rename(&tmp, &inner.user_db_path)?;
    debug!(path = %inner.user_db_path.display(), "user dictionary backed up");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{GreedyParser, SyllableParser};
    use crate::pinyin::sequence_ids;
    use crate::{PINYIN_FUZZY_C_CH, PINYIN_INCOMPLETE_PINYIN};

    fn temp_dir(tag: &str) -> PathBuf {
        let mut p = std::env::temp_dir();
        p.push(format!(
            "pyzy_{}_{}_{}",
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

    fn build_main(dir: &Path) -> PathBuf {
        let mut builder = MainDictBuilder::new();
        builder.insert(&sequence_ids("ni hao").unwrap(), "你好", 8000);
        builder.insert(&sequence_ids("ni hao").unwrap(), "拟好", 100);
        builder.insert(&sequence_ids("ni").unwrap(), "你", 9000);
        builder.insert(&sequence_ids("ni").unwrap(), "尼", 500);
        builder.insert(&sequence_ids("hao").unwrap(), "好", 7000);
        builder.insert(&sequence_ids("ci").unwrap(), "次", 3000);
        builder.insert(&sequence_ids("chi").unwrap(), "吃", 2000);
        let fst = dir.join("main.fst");
        builder.write(&fst).unwrap();
        fst
    }

    fn parse(text: &str, option: u32) -> Vec<Pinyin> {
        GreedyParser::new().parse(text, text.len(), option, MAX_PHRASE_LEN).0
    }

    fn open_dict(dir: &Path) -> Dictionary {
        let fst = build_main(dir);
        Dictionary::open(
            DictOptions::new(dir.join("user"))
                .with_main(fst)
                .with_backup_timeout(Duration::from_millis(50)),
        )
        .unwrap()
    }

    #[test]
    fn query_orders_by_freq() {
        let dir = temp_dir("query");
        let dict = open_dict(&dir);
        let pinyin = parse("nihao", 0);
        let rows = dict.query(&pinyin, 0, 2, None, 0);
        assert_eq!(rows[0].text, "你好");
        assert_eq!(rows[1].text, "拟好");
        let rows = dict.query(&pinyin, 0, 1, Some(1), 0);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].text, "你");
    }

    #[test]
    fn fuzzy_widens_initial() {
        let dir = temp_dir("fuzzy");
        let dict = open_dict(&dir);
        let pinyin = parse("ci", 0);

        let constraints = QueryConstraints::build(&pinyin, 0, 1, PINYIN_FUZZY_C_CH);
        assert_eq!(
            constraints.sheng_candidates(0),
            &[crate::pinyin::SHENG_C, crate::pinyin::SHENG_CH]
        );

        let exact: Vec<_> = dict.query(&pinyin, 0, 1, None, 0);
        assert!(exact.iter().all(|p| p.text != "吃"));
        let fuzzy = dict.query(&pinyin, 0, 1, None, PINYIN_FUZZY_C_CH);
        assert!(fuzzy.iter().any(|p| p.text == "吃"));
    }

    #[test]
    fn incomplete_matches_any_final() {
        let dir = temp_dir("incomplete");
        let dict = open_dict(&dir);
        let pinyin = parse("n", PINYIN_INCOMPLETE_PINYIN);
        assert_eq!(pinyin[0].ids[0].yun, YUN_ZERO);
        let rows = dict.query(&pinyin, 0, 1, None, PINYIN_INCOMPLETE_PINYIN);
        assert!(rows.iter().any(|p| p.text == "你"));
    }

    #[test]
    fn learning_reorders_candidates() {
        let dir = temp_dir("learn");
        let dict = open_dict(&dir);
        let pinyin = parse("ni", 0);
        let rows = dict.query(&pinyin, 0, 1, None, 0);
        assert_eq!(rows[0].text, "你");

        let ni = rows.iter().find(|p| p.text == "尼").unwrap().clone();
        dict.commit(&[ni]);
        let rows = dict.query(&pinyin, 0, 1, None, 0);
        assert_eq!(rows[0].text, "尼");
        assert!(rows[0].user_freq >= 1);
    }

    #[test]
    fn batch_commit_learns_concatenation() {
        let dir = temp_dir("concat");
        let dict = open_dict(&dir);
        let pinyin = parse("nihao", 0);
        let ni = dict.query(&pinyin, 0, 1, Some(1), 0).remove(0);
        let hao = dict.query(&pinyin, 1, 1, Some(1), 0).remove(0);
        dict.commit(&[ni, hao]);

        let rows = dict.query(&pinyin, 0, 2, None, 0);
        let learned = rows.iter().find(|p| p.text == "你好").unwrap();
        assert!(learned.user_freq >= 1);
    }

    #[test]
    fn remove_deletes_user_row() {
        let dir = temp_dir("remove");
        let dict = open_dict(&dir);
        let pinyin = parse("ni", 0);
        let ni = dict.query(&pinyin, 0, 1, Some(1), 0).remove(0);
        dict.commit(&[ni.clone()]);
        assert!(dict.query(&pinyin, 0, 1, None, 0)[0].user_freq >= 1);

        dict.remove(&ni);
        assert_eq!(dict.query(&pinyin, 0, 1, None, 0)[0].user_freq, 0);
    }

    #[test]
    fn backup_survives_reopen() {
        let dir = temp_dir("backup");
        let user_dir = dir.join("user");
        {
            let fst = build_main(&dir);
            let dict = Dictionary::open(
                DictOptions::new(&user_dir)
                    .with_main(fst)
                    .with_backup_timeout(Duration::from_secs(60)),
            )
            .unwrap();
            let pinyin = parse("nihao", 0);
            let rows = dict.query(&pinyin, 0, 2, None, 0);
            dict.commit(&[rows[0].clone()]);
            // drop forces the final backup
        }
        assert!(user_dir.join(USER_DICTIONARY_FILE).is_file());

        // no main dictionary this time: only userdb rows can match
        let dict = Dictionary::open_user_only(&user_dir);
        let pinyin = parse("nihao", 0);
        let rows = dict.query(&pinyin, 0, 2, None, 0);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].text, "你好");
        assert!(rows[0].user_freq >= 1);
    }

    #[test]
    fn backup_timer_fires_after_quiet_period() {
        let dir = temp_dir("timer");
        let dict = open_dict(&dir);
        let pinyin = parse("ni", 0);
        let ni = dict.query(&pinyin, 0, 1, Some(1), 0).remove(0);
        dict.commit(&[ni]);
        let path = dir.join("user").join(USER_DICTIONARY_FILE);
        assert!(!path.is_file());
        std::thread::sleep(Duration::from_millis(400));
        assert!(path.is_file());
        drop(dict);
    }

    #[test]
    fn missing_main_reports_failure() {
        let dir = temp_dir("nomain");
        let err = Dictionary::open(DictOptions::new(dir.join("user"))).err().unwrap();
        assert!(matches!(err, DictError::MainNotFound));
    }

    #[test]
    fn desc_metadata_written() {
        let dir = temp_dir("desc");
        let user_dir = dir.join("user");
        {
            let dict = Dictionary::open_user_only(&user_dir);
            let pinyin = parse("ni", 0);
            dict.commit(&[Phrase::new("你", 0, vec![pinyin[0].ids[0]])]);
        }
        let db = redb::Database::open(user_dir.join(USER_DICTIONARY_FILE)).unwrap();
        let tx = db.begin_read().unwrap();
        let table = tx.open_table(DESC_TABLE).unwrap();
        for key in ["version", "uuid", "create-time", "attach-time"] {
            assert!(table.get(key).unwrap().is_some(), "missing {}", key);
        }
        assert_eq!(table.get("version").unwrap().unwrap().value(), "1.2.0");
    }
}
