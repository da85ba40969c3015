//! Classification of raw GitLab webhook payloads.

use serde::Deserialize;
use serde_json::Value;

use crate::base::types::{MrAction, MrEvent};

/// Typed mirror of the few webhook fields the relay consumes.
///
/// Every field is optional so that absent or unexpected shapes classify as
/// "no event" instead of failing deserialization.
#[derive(Debug, Deserialize)]
struct WebhookPayload {
    event_type: Option<String>,
    object_attributes: Option<ObjectAttributes>,
}

#[derive(Debug, Deserialize)]
struct ObjectAttributes {
    noteable_type: Option<String>,
    url: Option<String>,
    action: Option<String>,
}

/// Turns a webhook payload into an actionable merge-request event, or
/// `None` when there is nothing to do.
///
/// Total over well-formed JSON: unknown event families, notes on objects
/// other than merge requests, and non-actionable state changes all yield
/// `None`.
pub fn classify(payload: &Value) -> Option<MrEvent> {
    let payload: WebhookPayload = serde_json::from_value(payload.clone()).ok()?;
    let attributes = payload.object_attributes?;

    match payload.event_type.as_deref()? {
        "note" => classify_note(attributes),
        "merge_request" => classify_merge_request(attributes),
        _ => None,
    }
}

/// A note is only actionable when it targets a merge request. The in-page
/// anchor (`#note_...`) is stripped so the URL matches the form the merge
/// request was announced with.
fn classify_note(attributes: ObjectAttributes) -> Option<MrEvent> {
    if attributes.noteable_type.as_deref()? != "MergeRequest" {
        return None;
    }

    let url = attributes.url?;
    let url = url.split('#').next().unwrap_or(&url).to_string();

    Some(MrEvent { url, action: MrAction::Comment })
}

/// Only three of GitLab's merge-request state changes are actionable;
/// "open", "close", "update" and the rest are ignored. The URL is taken
/// verbatim here, without fragment stripping.
fn classify_merge_request(attributes: ObjectAttributes) -> Option<MrEvent> {
    let action = match attributes.action.as_deref()? {
        "approved" => MrAction::Approve,
        "unapproved" => MrAction::Unapprove,
        "merge" => MrAction::Merge,
        _ => return None,
    };

    Some(MrEvent { url: attributes.url?, action })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn note_payload(noteable_type: &str, url: &str) -> Value {
        json!({
            "event_type": "note",
            "object_attributes": {
                "noteable_type": noteable_type,
                "url": url,
                "note": "some comment text",
            }
        })
    }

    fn merge_request_payload(action: &str, url: &str) -> Value {
        json!({
            "event_type": "merge_request",
            "object_attributes": {
                "action": action,
                "url": url,
                "state": "opened",
            }
        })
    }

    #[test]
    fn unknown_event_family_yields_no_event() {
        let payload = json!({"event_type": "pipeline", "object_attributes": {"url": "https://x/y"}});
        assert_eq!(classify(&payload), None);
    }

    #[test]
    fn missing_event_type_yields_no_event() {
        let payload = json!({"object_kind": "note", "object_attributes": {"url": "https://x/y"}});
        assert_eq!(classify(&payload), None);
    }

    #[test]
    fn missing_object_attributes_yields_no_event() {
        assert_eq!(classify(&json!({"event_type": "note"})), None);
    }

    #[test]
    fn non_object_payload_yields_no_event() {
        assert_eq!(classify(&json!("just a string")), None);
        assert_eq!(classify(&json!([1, 2, 3])), None);
    }

    #[test]
    fn note_on_other_object_yields_no_event() {
        let payload = note_payload("Issue", "https://x/y#note_1");
        assert_eq!(classify(&payload), None);
    }

    #[test]
    fn mr_note_strips_fragment_and_classifies_as_comment() {
        let payload = note_payload("MergeRequest", "https://x/y#note_1");
        assert_eq!(
            classify(&payload),
            Some(MrEvent { url: "https://x/y".to_string(), action: MrAction::Comment })
        );
    }

    #[test]
    fn mr_note_without_fragment_is_unchanged() {
        let payload = note_payload("MergeRequest", "https://x/y");
        assert_eq!(
            classify(&payload),
            Some(MrEvent { url: "https://x/y".to_string(), action: MrAction::Comment })
        );
    }

    #[test]
    fn approved_unapproved_and_merge_are_actionable() {
        let cases = [
            ("approved", MrAction::Approve),
            ("unapproved", MrAction::Unapprove),
            ("merge", MrAction::Merge),
        ];

        for (action, expected) in cases {
            let payload = merge_request_payload(action, "https://x/y");
            assert_eq!(
                classify(&payload),
                Some(MrEvent { url: "https://x/y".to_string(), action: expected }),
                "action string {action:?}"
            );
        }
    }

    #[test]
    fn other_merge_request_actions_yield_no_event() {
        for action in ["opened", "open", "close", "update", "reopen"] {
            let payload = merge_request_payload(action, "https://x/y");
            assert_eq!(classify(&payload), None, "action string {action:?}");
        }
    }

    #[test]
    fn merge_request_url_keeps_fragment_verbatim() {
        // Fragment stripping only applies to note events; state changes take
        // the URL exactly as delivered.
        let payload = merge_request_payload("approved", "https://x/y#frag");
        assert_eq!(
            classify(&payload),
            Some(MrEvent { url: "https://x/y#frag".to_string(), action: MrAction::Approve })
        );
    }
}
