//! Self-contained HTML year-in-review report.

use recap_core::error::Result;
use recap_core::formatting::{format_count, format_ratio};
use recap_data::aggregator::CountEntry;
use recap_data::summary::AggregationSummary;

use crate::json::to_script_json;
use crate::text::{escape, push_line};
use crate::theme::Theme;

/// Facts listed in the report before the rest are dropped.
const MAX_FACTS: usize = 8;

const STYLE: &str = r#"
    body { margin: 0; background: var(--bg); color: var(--text);
           font-family: ui-sans-serif, system-ui, -apple-system, "Segoe UI", Roboto, Helvetica, Arial, sans-serif; }
    header, main { max-width: 1100px; margin: 0 auto; padding: 18px; }
    h1 { margin: 0 0 8px 0; font-size: 24px; }
    h2 { margin: 0 0 10px 0; font-size: 15px; color: var(--muted); font-weight: 600; }
    .subtitle { color: var(--muted); font-size: 14px; }
    main { display: grid; grid-template-columns: 1fr 1fr; gap: 14px; }
    @media (max-width: 900px) { main { grid-template-columns: 1fr; } }
    .card { background: var(--card); border: 1px solid var(--border); border-radius: 14px; padding: 14px; }
    .wide { grid-column: 1 / -1; }
    .kvs { display: grid; grid-template-columns: repeat(4, 1fr); gap: 10px; }
    .kv .k { color: var(--muted); font-size: 12px; }
    .kv .v { font-size: 20px; font-weight: 700; }
    table { width: 100%; border-collapse: collapse; font-size: 14px; }
    td { padding: 4px 0; border-bottom: 1px solid var(--border); }
    td.num { text-align: right; font-variant-numeric: tabular-nums; }
    .bar { display: grid; grid-template-columns: 64px 1fr 56px; gap: 8px; align-items: center; font-size: 12px; }
    .bar .track { background: var(--border); border-radius: 4px; height: 8px; }
    .bar .fill { background: var(--accent); border-radius: 4px; height: 8px; }
    .bar .n { text-align: right; color: var(--muted); }
    .facts li { margin: 4px 0; }
    .excerpt .meta { color: var(--muted); font-size: 12px; }
    .excerpt pre { white-space: pre-wrap; font-family: ui-monospace, Menlo, Consolas, monospace; font-size: 13px; }
    .muted { color: var(--muted); }
"#;

/// Rows shown per term table.
const MAX_TERMS: usize = 15;

/// Render the full report page.
pub fn render_report(summary: &AggregationSummary, theme: &Theme) -> Result<String> {
    let data = to_script_json(summary)?;
    let meta = &summary.metadata;
    let year_label = meta
        .year
        .map_or_else(|| "All time".to_string(), |y| y.to_string());

    let mut html = String::new();
    html.push_str("<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\" />\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\" />\n");
    push_line(&mut html, format_args!(
        "<title>Your Year With Chat: Year in Review ({})</title>",
        escape(&year_label)
    ));
    push_line(&mut html, format_args!(
        "<style>\n    :root {{ --bg: {}; --card: {}; --border: {}; --text: {}; --muted: {}; --accent: {}; }}{}</style>",
        theme.bg_dark,
        theme.bg_mid,
        theme.border,
        theme.text_primary,
        theme.text_secondary,
        theme.accent_cyan,
        STYLE
    ));
    html.push_str("</head>\n<body>\n");

    // ── Header ────────────────────────────────────────────────────────────────
    let scope = meta.role_scope.as_ref().map_or_else(
        || "all roles".to_string(),
        |roles| {
            roles
                .iter()
                .map(|r| r.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        },
    );
    push_line(&mut html, format_args!(
        "<header><h1>Your Year With Chat · {}</h1><div class=\"subtitle\">{} export · {} · {}{}</div></header>",
        escape(&year_label),
        escape(meta.source_format.as_str()),
        escape(&meta.timezone),
        escape(&scope),
        if meta.redacted { " · redacted" } else { "" }
    ));
    html.push_str("<main>\n");

    // ── Headline numbers ──────────────────────────────────────────────────────
    let totals = &summary.totals;
    let mut kvs = vec![
        ("Conversations", format_count(totals.conversation_count)),
        ("Messages", format_count(totals.message_count)),
        ("Words", format_count(totals.total_words)),
        ("Words / message", format_ratio(totals.words_per_message)),
        ("Characters", format_count(totals.content_chars)),
        ("Active days", format_count(summary.streaks.active_days)),
        (
            "Longest streak",
            summary
                .streaks
                .longest
                .map_or_else(|| "–".to_string(), |s| format!("{} days", s.days)),
        ),
        (
            "Current streak",
            summary
                .streaks
                .current
                .map_or_else(|| "–".to_string(), |s| format!("{} days", s.days)),
        ),
    ];
    for (label, role) in [("User messages", "user"), ("Assistant messages", "assistant")] {
        kvs.push((
            label,
            format_count(totals.role_counts.get(role).copied().unwrap_or(0)),
        ));
    }
    kvs.push((
        "Top word",
        summary
            .top_words
            .first()
            .map_or_else(|| "–".to_string(), |w| w.label.clone()),
    ));
    html.push_str("<section class=\"card wide\"><div class=\"kvs\">");
    for (k, v) in &kvs {
        html.push_str(&format!(
            "<div class=\"kv\"><div class=\"k\">{}</div><div class=\"v\">{}</div></div>",
            escape(k),
            escape(v)
        ));
    }
    html.push_str("</div></section>\n");

    // ── Tables ────────────────────────────────────────────────────────────────
    let model_rows: Vec<(String, usize)> = summary
        .top_models
        .iter()
        .map(|e| (e.label.clone(), e.count))
        .collect();
    html.push_str(&table("Top models", &model_rows, "No model data in export"));
    let conversation_rows: Vec<(String, usize)> = summary
        .top_conversations
        .iter()
        .map(|c| (c.title.clone(), c.messages))
        .collect();
    html.push_str(&table("Longest conversations", &conversation_rows, "No conversations"));
    html.push_str(&table("Top words", &term_rows(&summary.top_words), "No words"));
    html.push_str(&table("Top bigrams", &term_rows(&summary.top_bigrams), "No word pairs"));

    // ── Distributions ─────────────────────────────────────────────────────────
    html.push_str(&bars("Messages by weekday", &summary.distribution.by_weekday));
    html.push_str(&bars("Messages by hour (local)", &summary.distribution.by_hour));
    let months: Vec<CountEntry> = summary
        .trend
        .iter()
        .map(|p| CountEntry::new(p.month.clone(), p.messages))
        .collect();
    html.push_str(&bars("Messages by month", &months));

    let peaks = [
        ("Busiest day", &summary.peaks.busiest_day),
        ("Busiest week (from)", &summary.peaks.busiest_week),
        ("Busiest hour", &summary.peaks.busiest_hour),
        ("Busiest month", &summary.peaks.busiest_month),
    ];
    let peak_rows: Vec<(String, usize)> = peaks
        .iter()
        .filter_map(|(name, peak)| {
            peak.as_ref()
                .map(|p| (format!("{}: {}", name, p.label), p.count))
        })
        .collect();
    html.push_str(&table("Peaks", &peak_rows, "No timed messages"));

    // ── Fun facts ─────────────────────────────────────────────────────────────
    if !summary.fun_facts.is_empty() {
        html.push_str("<section class=\"card\"><h2>Fun facts</h2><ul class=\"facts\">");
        for fact in summary.fun_facts.iter().take(MAX_FACTS) {
            html.push_str(&format!("<li>{}</li>", escape(fact)));
        }
        html.push_str("</ul></section>\n");
    }

    // ── Excerpts ──────────────────────────────────────────────────────────────
    if !summary.excerpts.is_empty() {
        html.push_str("<section class=\"card wide\"><h2>Excerpts</h2>");
        for ex in &summary.excerpts {
            let when = ex
                .timestamp
                .map_or_else(|| "undated".to_string(), |t| t.to_rfc3339());
            html.push_str(&format!(
                "<div class=\"excerpt\"><div class=\"meta\">{} · {} · {}</div><pre>{}</pre></div>",
                escape(&when),
                escape(ex.role.as_str()),
                escape(&ex.title),
                escape(&ex.text)
            ));
        }
        html.push_str("</section>\n");
    }

    // ── Bookkeeping ───────────────────────────────────────────────────────────
    push_line(&mut html, format_args!(
        "<section class=\"card wide muted\">{} conversations and {} messages in export · \
         {} malformed records skipped · {} empty messages · {} unknown roles · \
         {} untimed messages · {} dated by their conversation · \
         {} outside the role scope · {} outside the year · \
         {} undated excluded by the year window</section>",
        format_count(meta.conversations_in_export),
        format_count(meta.messages_in_export),
        format_count(meta.skipped_count),
        format_count(meta.empty_messages),
        format_count(meta.unknown_role_messages),
        format_count(meta.untimed_messages),
        format_count(meta.conversation_timed_messages),
        format_count(meta.out_of_scope_messages),
        format_count(meta.out_of_year_messages),
        format_count(meta.excluded_untimed_messages)
    ));

    html.push_str("</main>\n");
    push_line(&mut html, format_args!(
        "<script id=\"summary-data\" type=\"application/json\">{}</script>",
        data
    ));
    html.push_str("</body>\n</html>\n");
    Ok(html)
}

fn term_rows(entries: &[CountEntry]) -> Vec<(String, usize)> {
    entries
        .iter()
        .take(MAX_TERMS)
        .map(|e| (e.label.clone(), e.count))
        .collect()
}

fn table(title: &str, rows: &[(String, usize)], empty: &str) -> String {
    let mut out = format!("<section class=\"card\"><h2>{}</h2>", escape(title));
    if rows.is_empty() {
        out.push_str(&format!("<p class=\"muted\">{}</p>", escape(empty)));
    } else {
        out.push_str("<table><tbody>");
        for (label, count) in rows {
            out.push_str(&format!(
                "<tr><td>{}</td><td class=\"num\">{}</td></tr>",
                escape(label),
                format_count(*count)
            ));
        }
        out.push_str("</tbody></table>");
    }
    out.push_str("</section>\n");
    out
}

fn bars(title: &str, entries: &[CountEntry]) -> String {
    let max = entries.iter().map(|e| e.count).max().unwrap_or(0).max(1);
    let mut out = format!("<section class=\"card\"><h2>{}</h2>", escape(title));
    for entry in entries {
        let pct = entry.count as f64 / max as f64 * 100.0;
        out.push_str(&format!(
            "<div class=\"bar\"><span>{}</span><div class=\"track\"><div class=\"fill\" style=\"width:{:.1}%\"></div></div><span class=\"n\">{}</span></div>",
            escape(&entry.label),
            pct,
            format_count(entry.count)
        ));
    }
    out.push_str("</section>\n");
    out
}
