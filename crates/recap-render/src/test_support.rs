use chrono_tz::Tz;
use recap_core::config::RunConfig;
use recap_data::reader::ExportDocument;
use recap_data::summary::AggregationSummary;
use serde_json::json;

/// A small ChatGPT export run through the real pipeline.
pub(crate) fn sample_summary() -> AggregationSummary {
    let conversation = json!({
        "id": "c1",
        "title": "Planning a garden",
        "create_time": 1_740_816_000.0,
        "mapping": {
            "a": {"parent": null, "children": ["b"], "message": {
                "id": "m1", "author": {"role": "user"}, "create_time": 1_740_816_000.0,
                "content": {"content_type": "text", "parts": ["Which vegetables grow well in shade?"]}
            }},
            "b": {"parent": "a", "children": [], "message": {
                "id": "m2", "author": {"role": "assistant"}, "create_time": 1_740_819_600.0,
                "content": {"content_type": "text", "parts": ["Leafy greens such as lettuce and spinach."]},
                "metadata": {"model_slug": "gpt-4o"}
            }}
        }
    });
    let documents = vec![ExportDocument::new("conversations.json", json!([conversation]))];
    let config = RunConfig {
        year: Some(2025),
        timezone: Tz::Europe__London,
        ..RunConfig::default()
    };
    recap_data::analyze_export(&documents, &config).expect("sample export is valid")
}
