use serde_json::Value;

use crate::fetch::Payload;

pub const NO_DATA_MESSAGE: &str = "No data processed.";

/// Summarize a todo payload. Missing keys fall back to placeholder values.
pub fn process_data_util(data: &Payload) -> String {
    tracing::debug!(data = ?data, "received data for processing");

    if data.is_empty() {
        tracing::warn!("received empty data map");
        return NO_DATA_MESSAGE.to_string();
    }

    let user_id = field_or(data, "userId", "Unknown");
    let item_id = field_or(data, "id", "Unknown");
    let title = field_or(data, "title", "No Title");
    let completed = data
        .get("completed")
        .map(render)
        .unwrap_or_else(|| false.to_string());

    tracing::info!(
        item_id = %item_id,
        user_id = %user_id,
        title = %title,
        completed = %completed,
        "processing item"
    );

    let summary = format!("Processed item {item_id} (User: {user_id}, Completed: {completed})");
    tracing::debug!("data processing finished");
    summary
}

fn field_or(data: &Payload, key: &str, default: &str) -> String {
    data.get(key)
        .map(render)
        .unwrap_or_else(|| default.to_string())
}

/// Strings render bare; everything else renders as JSON text.
fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::CapturedLogs;
    use serde_json::json;

    fn payload(value: Value) -> Payload {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn empty_payload_returns_sentinel_and_warns() {
        let logs = CapturedLogs::default();
        let summary = tracing::dispatcher::with_default(&logs.dispatch(), || {
            process_data_util(&Payload::new())
        });
        assert_eq!(summary, "No data processed.");

        let out = logs.contents();
        assert!(out.contains("WARN"), "{out}");
        assert!(out.contains("received empty data map"), "{out}");
    }

    #[test]
    fn full_payload_is_summarized() {
        let data = payload(json!({
            "userId": 7,
            "id": 42,
            "title": "write tests",
            "completed": true,
        }));
        assert_eq!(
            process_data_util(&data),
            "Processed item 42 (User: 7, Completed: true)"
        );
    }

    #[test]
    fn missing_keys_use_defaults() {
        let data = payload(json!({"title": "orphan"}));
        assert_eq!(
            process_data_util(&data),
            "Processed item Unknown (User: Unknown, Completed: false)"
        );
    }

    #[test]
    fn string_ids_render_without_quotes() {
        let data = payload(json!({"userId": "u-1", "id": "a-9"}));
        assert_eq!(
            process_data_util(&data),
            "Processed item a-9 (User: u-1, Completed: false)"
        );
    }

    #[test]
    fn title_default_is_logged() {
        let logs = CapturedLogs::default();
        let data = payload(json!({"id": 1}));
        tracing::dispatcher::with_default(&logs.dispatch(), || process_data_util(&data));
        assert!(logs.contents().contains("No Title"));
    }
}
