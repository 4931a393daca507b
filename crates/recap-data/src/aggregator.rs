//! Statistics over a filtered conversation set.
//!
//! Every message contributes to the totals and rankings. Only messages
//! with a resolvable instant (their own, or their conversation's)
//! contribute to time buckets, streaks and peaks; all bucketing happens on
//! the configured local calendar.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use chrono::{DateTime, Datelike, NaiveDate, Timelike, Utc};
use chrono_tz::Tz;
use recap_core::config::RunConfig;
use recap_core::formatting::{format_count, format_ratio};
use recap_core::models::{Conversation, Message, Role};
use recap_core::time_utils::{add_months, week_start, LocalCalendar};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Weekday labels, Monday first.
pub const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Longest excerpt kept, in characters, before the ellipsis.
pub const EXCERPT_CHARS: usize = 360;

/// Length of the top words and top bigrams lists.
pub const TOP_TERMS: usize = 30;

// ── Result types ──────────────────────────────────────────────────────────────

/// A labelled count: one bucket, one peak, or one ranked model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountEntry {
    pub label: String,
    pub count: usize,
}

impl CountEntry {
    pub fn new(label: impl Into<String>, count: usize) -> Self {
        Self {
            label: label.into(),
            count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    /// Conversations with at least one in-scope message.
    pub conversation_count: usize,
    pub message_count: usize,
    /// Sum of per-message content lengths.
    pub content_chars: usize,
    pub total_words: usize,
    /// Rounded to two decimals.
    pub words_per_message: f64,
    /// Message count per role name; only roles present appear.
    pub role_counts: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Distribution {
    /// Seven buckets, Monday first.
    pub by_weekday: Vec<CountEntry>,
    /// 24 buckets labelled `"00"`..`"23"`.
    pub by_hour: Vec<CountEntry>,
    /// Keyed `"%Y-%m"`.
    pub by_month: BTreeMap<String, usize>,
    /// Keyed `"%Y-%m-%d"`.
    pub by_day: BTreeMap<String, usize>,
}

/// A run of consecutive active days, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Streak {
    pub days: usize,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Streaks {
    pub active_days: usize,
    /// Earliest-starting run among the longest.
    pub longest: Option<Streak>,
    /// The run ending at the latest active day.
    pub current: Option<Streak>,
}

/// Busiest buckets; ties go to the earliest bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Peaks {
    pub busiest_day: Option<CountEntry>,
    /// Labelled with the Monday that starts the week.
    pub busiest_week: Option<CountEntry>,
    pub busiest_hour: Option<CountEntry>,
    pub busiest_month: Option<CountEntry>,
    pub busiest_weekday: Option<CountEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationRank {
    pub id: String,
    pub title: String,
    pub messages: usize,
}

/// One month of the trend line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    /// `"%Y-%m"`.
    pub month: String,
    pub messages: usize,
    /// Difference from the previous month; zero for the first.
    pub change: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Excerpt {
    pub conversation_id: String,
    pub title: String,
    pub role: Role,
    pub timestamp: Option<DateTime<Utc>>,
    pub text: String,
}

/// Everything the aggregator derives from one filtered record set.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    pub totals: Totals,
    pub distribution: Distribution,
    pub streaks: Streaks,
    pub peaks: Peaks,
    pub top_models: Vec<CountEntry>,
    pub top_conversations: Vec<ConversationRank>,
    pub top_words: Vec<CountEntry>,
    pub top_bigrams: Vec<CountEntry>,
    pub trend: Vec<TrendPoint>,
    pub first_message: Option<DateTime<Utc>>,
    pub last_message: Option<DateTime<Utc>>,
    pub excerpts: Vec<Excerpt>,
    pub fun_facts: Vec<String>,
    /// Messages counted in totals but absent from every time bucket.
    pub untimed_messages: usize,
    /// Messages bucketed by their conversation's time for lack of their own.
    pub conversation_timed_messages: usize,
}

// ── StatsAggregator ───────────────────────────────────────────────────────────

struct Entry<'a> {
    conversation: usize,
    message: &'a Message,
    at: Option<DateTime<Utc>>,
}

/// Counts per key, remembering first-seen order for tie-breaks.
struct Ranking<K> {
    index: HashMap<K, usize>,
    counts: Vec<(K, usize)>,
}

impl<K: Hash + Eq + Clone> Ranking<K> {
    fn new() -> Self {
        Self {
            index: HashMap::new(),
            counts: Vec::new(),
        }
    }

    fn add(&mut self, key: K) {
        match self.index.get(&key) {
            Some(&i) => self.counts[i].1 += 1,
            None => {
                self.index.insert(key.clone(), self.counts.len());
                self.counts.push((key, 1));
            }
        }
    }

    /// Count descending, first-seen order on ties.
    fn top(mut self, n: usize) -> Vec<(K, usize)> {
        self.counts.sort_by(|a, b| b.1.cmp(&a.1));
        self.counts.truncate(n);
        self.counts
    }
}

/// Local-time buckets over the timed entries.
#[derive(Default)]
struct Buckets {
    days: BTreeMap<NaiveDate, usize>,
    weeks: BTreeMap<NaiveDate, usize>,
    months: BTreeMap<(i32, u32), usize>,
    hours: [usize; 24],
    weekdays: [usize; 7],
}

impl Buckets {
    fn distribution(&self) -> Distribution {
        Distribution {
            by_weekday: WEEKDAYS
                .iter()
                .zip(self.weekdays)
                .map(|(label, n)| CountEntry::new(*label, n))
                .collect(),
            by_hour: self
                .hours
                .iter()
                .enumerate()
                .map(|(h, &n)| CountEntry::new(format!("{:02}", h), n))
                .collect(),
            by_month: self
                .months
                .iter()
                .map(|(&(y, m), &n)| (month_label(y, m), n))
                .collect(),
            by_day: self
                .days
                .iter()
                .map(|(d, &n)| (day_label(*d), n))
                .collect(),
        }
    }

    fn peaks(&self) -> Peaks {
        Peaks {
            busiest_day: peak(self.days.iter().map(|(d, &n)| (day_label(*d), n))),
            busiest_week: peak(self.weeks.iter().map(|(d, &n)| (day_label(*d), n))),
            busiest_hour: peak(
                self.hours
                    .iter()
                    .enumerate()
                    .map(|(h, &n)| (format!("{:02}", h), n)),
            ),
            busiest_month: peak(self.months.iter().map(|(&(y, m), &n)| (month_label(y, m), n))),
            busiest_weekday: peak(
                self.weekdays
                    .iter()
                    .enumerate()
                    .map(|(d, &n)| (WEEKDAYS[d].to_string(), n)),
            ),
        }
    }
}

/// Computes an [`Aggregation`] on one local calendar.
#[derive(Debug, Clone)]
pub struct StatsAggregator {
    calendar: LocalCalendar,
    top_n: usize,
    max_excerpts: usize,
}

impl StatsAggregator {
    pub fn new(timezone: Tz, top_n: usize, max_excerpts: usize) -> Self {
        Self {
            calendar: LocalCalendar::new(timezone),
            top_n,
            max_excerpts,
        }
    }

    pub fn from_config(config: &RunConfig) -> Self {
        Self::new(config.timezone, config.top_n, config.max_excerpts)
    }

    /// Aggregate `conversations`. Pure and deterministic.
    pub fn aggregate(&self, conversations: &[Conversation]) -> Aggregation {
        let mut entries: Vec<Entry<'_>> = conversations
            .iter()
            .enumerate()
            .flat_map(|(i, conv)| {
                conv.messages.iter().map(move |message| Entry {
                    conversation: i,
                    message,
                    at: conv.message_time(message),
                })
            })
            .collect();
        entries.sort_by_key(|e| (e.at.is_none(), e.at));

        let totals = totals(conversations, &entries);
        let buckets = self.bucket(&entries);
        let streaks = longest_and_current(&buckets.days);
        let peaks = buckets.peaks();

        let mut models = Ranking::new();
        let mut ranked_conversations = Ranking::new();
        let mut words = Ranking::new();
        let mut bigrams = Ranking::new();
        for entry in &entries {
            if let Some(model) = entry.message.model.as_deref() {
                models.add(model);
            }
            ranked_conversations.add(entry.conversation);
            let terms = &entry.message.terms;
            for term in terms {
                words.add(term.as_str());
            }
            for pair in terms.windows(2) {
                bigrams.add(format!("{} {}", pair[0], pair[1]));
            }
        }
        let top_models = counted(models.top(self.top_n));
        let top_words = counted(words.top(TOP_TERMS));
        let top_bigrams = counted(bigrams.top(TOP_TERMS));
        let top_conversations = ranked_conversations
            .top(self.top_n)
            .into_iter()
            .map(|(i, messages)| ConversationRank {
                id: conversations[i].id.clone(),
                title: conversations[i].title.clone(),
                messages,
            })
            .collect();

        let timed: Vec<DateTime<Utc>> = entries.iter().filter_map(|e| e.at).collect();
        let untimed_messages = entries.len() - timed.len();
        let conversation_timed_messages = entries
            .iter()
            .filter(|e| e.message.timestamp.is_none() && e.at.is_some())
            .count();
        let excerpts = self.excerpts(conversations, &entries);
        let fun_facts = fun_facts(&totals, &streaks, &peaks);

        debug!(
            "Aggregated {} messages ({} untimed, {} on conversation time) over {} active days",
            totals.message_count, untimed_messages, conversation_timed_messages, streaks.active_days
        );

        Aggregation {
            totals,
            distribution: buckets.distribution(),
            streaks,
            peaks,
            top_models,
            top_conversations,
            top_words,
            top_bigrams,
            trend: trend(&buckets.months),
            first_message: timed.first().copied(),
            last_message: timed.last().copied(),
            excerpts,
            fun_facts,
            untimed_messages,
            conversation_timed_messages,
        }
    }

    fn bucket(&self, entries: &[Entry<'_>]) -> Buckets {
        let mut buckets = Buckets::default();
        for at in entries.iter().filter_map(|e| e.at) {
            let local = self.calendar.local(at);
            let date = local.date_naive();
            *buckets.days.entry(date).or_default() += 1;
            *buckets.weeks.entry(week_start(date)).or_default() += 1;
            *buckets.months.entry((date.year(), date.month())).or_default() += 1;
            buckets.hours[local.hour() as usize] += 1;
            buckets.weekdays[date.weekday().num_days_from_monday() as usize] += 1;
        }
        buckets
    }

    fn excerpts(&self, conversations: &[Conversation], entries: &[Entry<'_>]) -> Vec<Excerpt> {
        let mut excerpts = Vec::new();
        for entry in entries {
            if excerpts.len() >= self.max_excerpts {
                break;
            }
            let text = snippet(&entry.message.text);
            if text.is_empty() {
                continue;
            }
            let conv = &conversations[entry.conversation];
            excerpts.push(Excerpt {
                conversation_id: conv.id.clone(),
                title: conv.title.clone(),
                role: entry.message.role,
                timestamp: entry.at,
                text,
            });
        }
        excerpts
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn totals(conversations: &[Conversation], entries: &[Entry<'_>]) -> Totals {
    let mut role_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut content_chars = 0;
    let mut total_words = 0;
    for entry in entries {
        *role_counts
            .entry(entry.message.role.as_str().to_string())
            .or_default() += 1;
        content_chars += entry.message.content_length;
        total_words += entry.message.word_count;
    }
    let message_count = entries.len();
    let words_per_message = if message_count == 0 {
        0.0
    } else {
        (total_words as f64 / message_count as f64 * 100.0).round() / 100.0
    };

    Totals {
        conversation_count: conversations.iter().filter(|c| !c.messages.is_empty()).count(),
        message_count,
        content_chars,
        total_words,
        words_per_message,
        role_counts,
    }
}

fn counted<K: Into<String>>(ranked: Vec<(K, usize)>) -> Vec<CountEntry> {
    ranked
        .into_iter()
        .map(|(label, count)| CountEntry::new(label, count))
        .collect()
}

fn month_label(year: i32, month: u32) -> String {
    format!("{:04}-{:02}", year, month)
}

fn day_label(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// The highest non-zero bucket; the first wins ties.
fn peak(buckets: impl IntoIterator<Item = (String, usize)>) -> Option<CountEntry> {
    let mut best: Option<CountEntry> = None;
    for (label, count) in buckets {
        if count == 0 {
            continue;
        }
        if best.as_ref().map_or(true, |b| count > b.count) {
            best = Some(CountEntry::new(label, count));
        }
    }
    best
}

fn longest_and_current(days: &BTreeMap<NaiveDate, usize>) -> Streaks {
    let mut longest: Option<Streak> = None;
    let mut run: Option<Streak> = None;

    for &date in days.keys() {
        run = match run {
            Some(r) if (date - r.end).num_days() == 1 => Some(Streak {
                days: r.days + 1,
                end: date,
                ..r
            }),
            Some(r) => {
                if longest.map_or(true, |l| r.days > l.days) {
                    longest = Some(r);
                }
                Some(Streak {
                    days: 1,
                    start: date,
                    end: date,
                })
            }
            None => Some(Streak {
                days: 1,
                start: date,
                end: date,
            }),
        };
    }
    if let Some(r) = run {
        if longest.map_or(true, |l| r.days > l.days) {
            longest = Some(r);
        }
    }

    Streaks {
        active_days: days.len(),
        longest,
        current: run,
    }
}

fn trend(months: &BTreeMap<(i32, u32), usize>) -> Vec<TrendPoint> {
    let (Some(&(y0, m0)), Some(&last)) = (months.keys().next(), months.keys().next_back()) else {
        return Vec::new();
    };
    let mut points = Vec::new();
    let mut previous: Option<usize> = None;
    let mut step = 0;
    loop {
        let (y, m) = add_months(y0, m0, step);
        let messages = months.get(&(y, m)).copied().unwrap_or(0);
        points.push(TrendPoint {
            month: month_label(y, m),
            messages,
            change: previous.map_or(0, |p| messages as i64 - p as i64),
        });
        previous = Some(messages);
        if (y, m) >= last {
            break;
        }
        step += 1;
    }
    points
}

/// Whitespace-normalised text, cut at [`EXCERPT_CHARS`] characters.
fn snippet(text: &str) -> String {
    let normalised = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n");
    if normalised.chars().count() > EXCERPT_CHARS {
        let mut cut: String = normalised.chars().take(EXCERPT_CHARS).collect();
        cut.push('…');
        cut
    } else {
        normalised
    }
}

fn fun_facts(totals: &Totals, streaks: &Streaks, peaks: &Peaks) -> Vec<String> {
    let mut facts = Vec::new();
    if let Some(month) = &peaks.busiest_month {
        facts.push(format!("Most chatty month: {}", month.label));
    }
    if let Some(weekday) = &peaks.busiest_weekday {
        facts.push(format!("Favorite weekday: {}", weekday.label));
    }
    if let Some(hour) = &peaks.busiest_hour {
        facts.push(format!("Peak hour (local): {}:00", hour.label));
    }
    if let Some(day) = &peaks.busiest_day {
        facts.push(format!(
            "Busiest day: {} ({} messages)",
            day.label,
            format_count(day.count)
        ));
    }
    if let Some(longest) = &streaks.longest {
        let unit = if longest.days == 1 { "day" } else { "days" };
        facts.push(format!("Longest streak: {} {}", longest.days, unit));
    }
    if totals.message_count > 0 {
        facts.push(format!(
            "Average message length: {} words",
            format_ratio(totals.words_per_message)
        ));
    }
    facts
}

// ── Tests ─────────────────────────────────────────────────────────────────────
