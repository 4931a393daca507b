//! 1200×630 SVG share card.

use recap_core::formatting::format_count;
use recap_data::aggregator::CountEntry;
use recap_data::summary::AggregationSummary;

use crate::text::{escape, push_line, truncate_to_width};
use crate::theme::Theme;

pub const CARD_WIDTH: u32 = 1200;
pub const CARD_HEIGHT: u32 = 630;

/// Most months drawn in the month chart; older ones are dropped.
const MAX_MONTH_BARS: usize = 24;
/// Model rows per column in the models panel.
const MODEL_ROWS: usize = 5;
/// Display columns for a model name.
const MODEL_NAME_WIDTH: usize = 18;

const MONTH_INITIALS: [&str; 12] = ["J", "F", "M", "A", "M", "J", "J", "A", "S", "O", "N", "D"];

/// Geometry of one bar chart.
struct ChartArea {
    x: u32,
    y: u32,
    width: u32,
    height: u32,
}

/// Render the share card.
pub fn render_share_card(summary: &AggregationSummary, theme: &Theme) -> String {
    let meta = &summary.metadata;
    let year_label = meta
        .year
        .map_or_else(|| "All time".to_string(), |y| y.to_string());

    let mut svg = String::new();
    push_line(
        &mut svg,
        format_args!(
            "<svg xmlns='http://www.w3.org/2000/svg' width='{w}' height='{h}' viewBox='0 0 {w} {h}'>",
            w = CARD_WIDTH,
            h = CARD_HEIGHT
        ),
    );
    push_line(
        &mut svg,
        format_args!(
            "<defs>\
             <linearGradient id='bg' x1='0' y1='0' x2='1' y2='1'><stop offset='0' stop-color='{}'/><stop offset='1' stop-color='{}'/></linearGradient>\
             <linearGradient id='barGradient' x1='0' y1='0' x2='1' y2='0'><stop offset='0' stop-color='{}'/><stop offset='1' stop-color='{}'/></linearGradient>\
             <linearGradient id='emeraldGradient' x1='0' y1='1' x2='0' y2='0'><stop offset='0' stop-color='{}'/><stop offset='1' stop-color='{}'/></linearGradient>\
             </defs>",
            theme.bg_dark,
            theme.bg_mid,
            theme.accent_cyan,
            theme.accent_violet,
            theme.accent_emerald,
            theme.accent_cyan
        ),
    );
    push_line(
        &mut svg,
        format_args!(
            "<style>\
             text {{ font-family: ui-sans-serif, system-ui, -apple-system, 'Segoe UI', Roboto, Helvetica, Arial, sans-serif; }}\
             .title {{ font-size: 40px; font-weight: 800; fill: {primary}; }}\
             .subtitle {{ font-size: 18px; fill: {secondary}; }}\
             .statValue {{ font-size: 34px; font-weight: 800; fill: {primary}; }}\
             .statLabel {{ font-size: 15px; fill: {secondary}; }}\
             .chartTitle {{ font-size: 16px; font-weight: 600; fill: {secondary}; }}\
             .axisLabel {{ font-size: 12px; fill: {muted}; }}\
             .modelName {{ font-size: 15px; fill: {primary}; }}\
             .modelCount {{ font-size: 14px; fill: {secondary}; }}\
             .bodyMuted {{ font-size: 16px; fill: {muted}; }}\
             </style>",
            primary = theme.text_primary,
            secondary = theme.text_secondary,
            muted = theme.text_muted
        ),
    );
    push_line(
        &mut svg,
        format_args!(
            "<rect width='{}' height='{}' fill='url(#bg)'/>",
            CARD_WIDTH, CARD_HEIGHT
        ),
    );

    // ── Title ─────────────────────────────────────────────────────────────────
    push_line(
        &mut svg,
        format_args!(
            "<text class='title' x='60' y='80'>Your Year With Chat · {}</text>",
            escape(&year_label)
        ),
    );
    push_line(
        &mut svg,
        format_args!(
            "<text class='subtitle' x='60' y='112'>{} export · {}{}</text>",
            escape(meta.source_format.as_str()),
            escape(&meta.timezone),
            if meta.redacted { " · redacted" } else { "" }
        ),
    );

    // ── Stat cards ────────────────────────────────────────────────────────────
    let longest = summary.streaks.longest.map_or(0, |s| s.days);
    let stats = [
        ("Messages", format_count(summary.totals.message_count), theme.accent_cyan),
        (
            "Conversations",
            format_count(summary.totals.conversation_count),
            theme.accent_emerald,
        ),
        ("Active days", format_count(summary.streaks.active_days), theme.accent_violet),
        ("Longest streak (days)", format_count(longest), theme.accent_rose),
    ];
    for (i, (label, value, color)) in stats.iter().enumerate() {
        svg.push_str(&stat_card(60 + i as u32 * 275, 136, 255, 110, label, value, color, theme));
    }

    // ── Charts ────────────────────────────────────────────────────────────────
    let hours: Vec<usize> = summary.distribution.by_hour.iter().map(|e| e.count).collect();
    svg.push_str(&hour_chart(
        &ChartArea {
            x: 60,
            y: 300,
            width: 520,
            height: 130,
        },
        &hours,
    ));

    let start = summary.trend.len().saturating_sub(MAX_MONTH_BARS);
    let months: Vec<CountEntry> = summary.trend[start..]
        .iter()
        .map(|p| CountEntry::new(p.month.clone(), p.messages))
        .collect();
    svg.push_str(&month_chart(
        &ChartArea {
            x: 620,
            y: 300,
            width: 520,
            height: 130,
        },
        &months,
        theme,
    ));

    // ── Models ────────────────────────────────────────────────────────────────
    svg.push_str(&models_panel(60, 470, 1080, &summary.top_models, theme));

    svg.push_str("</svg>\n");
    svg
}

#[allow(clippy::too_many_arguments)]
fn stat_card(
    x: u32,
    y: u32,
    w: u32,
    h: u32,
    label: &str,
    value: &str,
    color: &str,
    theme: &Theme,
) -> String {
    format!(
        "<g transform='translate({x}, {y})'>\
         <rect width='{w}' height='{h}' rx='16' fill='{surface}' fill-opacity='0.6'/>\
         <circle cx='24' cy='24' r='6' fill='{color}' fill-opacity='0.8'/>\
         <text class='statValue' x='24' y='{value_y}'>{value}</text>\
         <text class='statLabel' x='24' y='{label_y}'>{label}</text>\
         </g>\n",
        surface = theme.surface,
        value_y = h - 42,
        label_y = h - 20,
        value = escape(value),
        label = escape(label),
    )
}

/// Pixel height of a bar for `value` out of `max` within `inner` pixels.
fn bar_height(value: usize, max: usize, inner: u32) -> u32 {
    let scaled = (value as f64 / max.max(1) as f64 * f64::from(inner)).round() as u32;
    scaled.max(2)
}

fn hour_chart(area: &ChartArea, values: &[usize]) -> String {
    let pad = 16;
    let gap = 2;
    let inner_w = area.width - pad * 2;
    let inner_h = area.height - 24;
    let bar_w = ((inner_w - 23 * gap) / 24).max(4);
    let max = values.iter().copied().max().unwrap_or(0);

    let mut out = format!(
        "<text class='chartTitle' x='{}' y='{}'>Activity by hour</text>\n",
        area.x,
        area.y - 10
    );
    for hour in 0..24u32 {
        let value = values.get(hour as usize).copied().unwrap_or(0);
        let h = bar_height(value, max, inner_h);
        let bx = area.x + pad + hour * (bar_w + gap);
        let by = area.y + area.height - 12 - h;
        push_line(
            &mut out,
            format_args!(
                "<rect x='{}' y='{}' width='{}' height='{}' rx='3' fill='url(#emeraldGradient)'/>",
                bx, by, bar_w, h
            ),
        );
    }
    for tick in [0u32, 6, 12, 18, 23] {
        let tx = f64::from(area.x + pad + tick * (bar_w + gap)) + f64::from(bar_w) / 2.0;
        push_line(
            &mut out,
            format_args!(
                "<text class='axisLabel' x='{:.1}' y='{}' text-anchor='middle'>{}</text>",
                tx,
                area.y + area.height + 4,
                tick
            ),
        );
    }
    out
}

fn month_chart(area: &ChartArea, months: &[CountEntry], theme: &Theme) -> String {
    let mut out = format!(
        "<text class='chartTitle' x='{}' y='{}'>Activity by month</text>\n",
        area.x,
        area.y - 10
    );
    if months.is_empty() {
        push_line(
            &mut out,
            format_args!(
                "<text class='bodyMuted' x='{}' y='{}'>No dated messages</text>",
                area.x,
                area.y + area.height / 2
            ),
        );
        return out;
    }

    let n = months.len() as u32;
    let pad = 16;
    let gap = if n <= 12 { 4 } else { 2 };
    let inner_w = area.width - pad * 2;
    let inner_h = area.height - 24;
    let bar_w = (inner_w.saturating_sub((n - 1) * gap) / n).max(4);
    let max = months.iter().map(|m| m.count).max().unwrap_or(0);

    for (i, month) in months.iter().enumerate() {
        let i = i as u32;
        let h = bar_height(month.count, max, inner_h);
        let bx = area.x + pad + i * (bar_w + gap);
        let by = area.y + area.height - 12 - h;
        push_line(
            &mut out,
            format_args!(
                "<rect x='{}' y='{}' width='{}' height='{}' rx='{}' fill='{}'/>",
                bx,
                by,
                bar_w,
                h,
                (bar_w / 2).min(4),
                theme.heat_color(month.count, max)
            ),
        );
        if n <= 12 || i % (n / 4).max(1) == 0 {
            let label = if n <= 12 {
                month_initial(&month.label).to_string()
            } else {
                month.label.clone()
            };
            let tx = f64::from(bx) + f64::from(bar_w) / 2.0;
            push_line(
                &mut out,
                format_args!(
                    "<text class='axisLabel' x='{:.1}' y='{}' text-anchor='middle'>{}</text>",
                    tx,
                    area.y + area.height + 4,
                    escape(&label)
                ),
            );
        }
    }
    out
}

/// Initial of a `"%Y-%m"` label's month, or `"?"`.
fn month_initial(label: &str) -> &'static str {
    label
        .rsplit('-')
        .next()
        .and_then(|m| m.parse::<usize>().ok())
        .and_then(|m| MONTH_INITIALS.get(m.wrapping_sub(1)))
        .copied()
        .unwrap_or("?")
}

fn models_panel(x: u32, y: u32, w: u32, models: &[CountEntry], theme: &Theme) -> String {
    let mut out = format!(
        "<rect x='{}' y='{}' width='{}' height='{}' rx='20' fill='{}' fill-opacity='0.5'/>\n\
         <text class='chartTitle' x='{}' y='{}'>Top models</text>\n",
        x,
        y,
        w,
        CARD_HEIGHT - y - 20,
        theme.surface,
        x + 24,
        y + 32
    );
    if models.is_empty() {
        push_line(
            &mut out,
            format_args!(
                "<text class='bodyMuted' x='{}' y='{}'>No model data in export</text>",
                x + 24,
                y + 72
            ),
        );
        return out;
    }

    let items = &models[..models.len().min(MODEL_ROWS * 2)];
    let half = (items.len() + 1) / 2;
    let col_w = (w - 48) / 2;
    let bar_w = 160u32.min(col_w.saturating_sub(200));
    let bar_h = 6;
    let max = items.iter().map(|m| m.count).max().unwrap_or(0).max(1);

    for (idx, model) in items.iter().enumerate() {
        let (col, row) = if idx < half { (0, idx) } else { (1, idx - half) };
        let x0 = x + 24 + col * col_w;
        let y0 = y + 64 + row as u32 * 26;
        let fill = ((model.count as f64 / max as f64) * f64::from(bar_w)).round() as u32;
        let bar_x = x0 + 190;
        push_line(
            &mut out,
            format_args!(
                "<text class='modelName' x='{x0}' y='{y0}'>{name}</text>\
                 <rect x='{bar_x}' y='{bar_y}' width='{bar_w}' height='{bar_h}' rx='3' fill='{track}' fill-opacity='0.4'/>\
                 <rect x='{bar_x}' y='{bar_y}' width='{fill}' height='{bar_h}' rx='3' fill='url(#barGradient)'/>\
                 <text class='modelCount' x='{count_x}' y='{y0}'>{count}</text>",
                name = escape(&truncate_to_width(&model.label, MODEL_NAME_WIDTH)),
                bar_y = y0 - 5,
                track = theme.border,
                fill = fill.max(4),
                count_x = bar_x + bar_w + 10,
                count = format_count(model.count),
            ),
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_summary;

    #[test]
    fn test_card_dimensions_and_closing_tag() {
        let svg = render_share_card(&sample_summary(), &Theme::dark());
        assert!(svg.starts_with("<svg xmlns='http://www.w3.org/2000/svg' width='1200' height='630'"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_card_draws_24_hour_bars() {
        let svg = render_share_card(&sample_summary(), &Theme::dark());
        assert_eq!(svg.matches("fill='url(#emeraldGradient)'").count(), 24);
    }

    #[test]
    fn test_card_lists_models_or_placeholder() {
        let mut summary = sample_summary();
        let svg = render_share_card(&summary, &Theme::dark());
        assert!(svg.contains(">gpt-4o</text>"));
        assert!(!svg.contains("No model data in export"));

        summary.top_models.clear();
        let svg = render_share_card(&summary, &Theme::dark());
        assert!(svg.contains("No model data in export"));
    }

    #[test]
    fn test_card_truncates_and_escapes_model_names() {
        let mut summary = sample_summary();
        summary.top_models = vec![CountEntry::new("<a-very-long-model-identifier>", 3)];
        let svg = render_share_card(&summary, &Theme::dark());
        assert!(svg.contains("&lt;a-very-long-mode…"));
        assert!(!svg.contains("<a-very"));
    }

    #[test]
    fn test_month_initial() {
        assert_eq!(month_initial("2025-03"), "M");
        assert_eq!(month_initial("2025-12"), "D");
        assert_eq!(month_initial("garbage"), "?");
        assert_eq!(month_initial("2025-00"), "?");
    }

    #[test]
    fn test_bar_height_has_minimum() {
        assert_eq!(bar_height(0, 0, 100), 2);
        assert_eq!(bar_height(5, 10, 100), 50);
        assert_eq!(bar_height(10, 10, 100), 100);
    }
}
