//! Special phrases: non-dictionary candidates bound to input triggers.
//!
//! A static entry is a fixed replacement string. A dynamic entry is a
//! template whose `${name}` placeholders are substituted with the wall
//! clock at render time; rendering is parameterized over a `LocalTime`
//! value so callers (and tests) can pin the clock.

use std::collections::HashMap;
use time::OffsetDateTime;

/// A broken-down local timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalTime {
    pub year: i32,
    /// 1..=12
    pub month: u8,
    /// 1..=31
    pub day: u8,
    /// Days since Sunday, 0..=6.
    pub weekday: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl LocalTime {
    /// Current wall clock; falls back to UTC when the local offset cannot
    /// be determined.
    pub fn now() -> Self {
        OffsetDateTime::now_local()
            .unwrap_or_else(|_| OffsetDateTime::now_utc())
            .into()
    }
}

impl From<OffsetDateTime> for LocalTime {
    fn from(t: OffsetDateTime) -> Self {
        Self {
            year: t.year(),
            month: u8::from(t.month()),
            day: t.day(),
            weekday: t.weekday().number_days_from_sunday(),
            hour: t.hour(),
            minute: t.minute(),
            second: t.second(),
        }
    }
}

/// A template with `${name}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamicSpecialPhrase {
    template: String,
}

impl DynamicSpecialPhrase {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Render against the current wall clock.
    pub fn text(&self) -> String {
        self.render(&LocalTime::now())
    }

    /// Render against a fixed timestamp. An unterminated `${` and any
    /// unrecognized `${name}` are emitted literally.
    pub fn render(&self, t: &LocalTime) -> String {
        let mut result = String::new();
        let mut rest = self.template.as_str();
        loop {
            match rest.find("${") {
                None => {
                    result.push_str(rest);
                    break;
                }
                Some(i) => {
                    result.push_str(&rest[..i]);
                    let after = &rest[i + 2..];
                    match after.find('}') {
                        None => {
                            result.push_str("${");
                            result.push_str(after);
                            break;
                        }
                        Some(j) => {
                            result.push_str(&variable(&after[..j], t));
                            rest = &after[j + 1..];
                        }
                    }
                }
            }
        }
        result
    }
}

fn variable(name: &str, t: &LocalTime) -> String {
    match name {
        "year" => t.year.to_string(),
        "year_yy" => format!("{:02}", t.year.rem_euclid(100)),
        "month" => t.month.to_string(),
        "month_mm" => format!("{:02}", t.month),
        "day" => t.day.to_string(),
        "day_dd" => format!("{:02}", t.day),
        "weekday" => (t.weekday + 1).to_string(),
        "fullhour" => format!("{:02}", t.hour),
        // "falfhour" is the misspelled alias existing templates rely on
        "falfhour" | "halfhour" => format!("{:02}", t.hour % 12),
        "ampm" => (if t.hour < 12 { "AM" } else { "PM" }).to_string(),
        "minute" => format!("{:02}", t.minute),
        "second" => format!("{:02}", t.second),
        "year_cn" => year_cn(t.year, false),
        "year_yy_cn" => year_cn(t.year, true),
        "month_cn" => MONTH_CN[(t.month - 1) as usize].to_string(),
        "day_cn" => day_cn(t.day),
        "weekday_cn" => WEEKDAY_CN[t.weekday as usize].to_string(),
        "fullhour_cn" => HOUR_CN[t.hour as usize].to_string(),
        "halfhour_cn" => HOUR_CN[(t.hour % 12) as usize].to_string(),
        "ampm_cn" => (if t.hour < 12 { "上午" } else { "下午" }).to_string(),
        "minute_cn" => minsec_cn(t.minute),
        "second_cn" => minsec_cn(t.second),
        _ => format!("${{{}}}", name),
    }
}

const MONTH_CN: [&str; 12] = [
    "一", "二", "三", "四", "五", "六", "七", "八", "九", "十", "十一", "十二",
];

const WEEKDAY_CN: [&str; 7] = ["日", "一", "二", "三", "四", "五", "六"];

const HOUR_CN: [&str; 24] = [
    "零", "一", "二", "三", "四", "五", "六", "七", "八", "九", "十", "十一", "十二", "十三",
    "十四", "十五", "十六", "十七", "十八", "十九", "二十", "二十一", "二十二", "二十三",
];

// indices 0..=9 are units, 10..=13 the tens prefix; an empty tens prefix
// leaves just the units
const DAY_CN: [&str; 14] = [
    "", "一", "二", "三", "四", "五", "六", "七", "八", "九", "", "十", "二十", "三十",
];

const MINSEC_CN: [&str; 17] = [
    "", "一", "二", "三", "四", "五", "六", "七", "八", "九", "零", "十", "二十", "三十",
    "四十", "五十", "六十",
];

fn year_cn(year: i32, yy: bool) -> String {
    const DIGITS: [&str; 10] = ["〇", "一", "二", "三", "四", "五", "六", "七", "八", "九"];
    let mut year = year;
    let mut bit = 0i32;
    if yy {
        year = year.rem_euclid(100);
        bit = 2;
    }
    let mut out = String::new();
    while year != 0 || bit > 0 {
        out.insert_str(0, DIGITS[(year % 10) as usize]);
        year /= 10;
        bit -= 1;
    }
    out
}

fn day_cn(day: u8) -> String {
    format!(
        "{}{}",
        DAY_CN[(day / 10 + 10) as usize],
        DAY_CN[(day % 10) as usize]
    )
}

fn minsec_cn(value: u8) -> String {
    format!(
        "{}{}",
        MINSEC_CN[(value / 10 + 10) as usize],
        MINSEC_CN[(value % 10) as usize]
    )
}

/// One special-phrase entry.
#[derive(Debug, Clone)]
pub enum SpecialPhrase {
    Static(String),
    Dynamic(DynamicSpecialPhrase),
}

impl SpecialPhrase {
    pub fn render(&self, t: &LocalTime) -> String {
        match self {
            SpecialPhrase::Static(s) => s.clone(),
            SpecialPhrase::Dynamic(d) => d.render(t),
        }
    }
}

/// Trigger → replacement suggestions. The table is loaded by the embedding
/// (file format is its business) and shared read-only by contexts.
#[derive(Debug, Default)]
pub struct SpecialPhraseTable {
    map: HashMap<String, Vec<SpecialPhrase>>,
}

impl SpecialPhraseTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, trigger: impl Into<String>, phrase: SpecialPhrase) {
        self.map.entry(trigger.into()).or_default().push(phrase);
    }

    pub fn insert_static(&mut self, trigger: impl Into<String>, text: impl Into<String>) {
        self.insert(trigger, SpecialPhrase::Static(text.into()));
    }

    pub fn insert_dynamic(&mut self, trigger: impl Into<String>, template: impl Into<String>) {
        self.insert(
            trigger,
            SpecialPhrase::Dynamic(DynamicSpecialPhrase::new(template)),
        );
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Suggestions for a trigger, rendered against the current clock.
    pub fn lookup(&self, trigger: &str) -> Vec<String> {
        self.lookup_at(trigger, &LocalTime::now())
    }

    pub fn lookup_at(&self, trigger: &str, t: &LocalTime) -> Vec<String> {
        match self.map.get(trigger) {
            Some(entries) => entries.iter().map(|e| e.render(t)).collect(),
            None => Vec::new(),
        }
    }
}
