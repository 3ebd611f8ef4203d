//! Wire record shapes for the newline-delimited JSON feed.

use serde::Deserialize;

use super::{FeedData, FeedEvent};

/// One decoded feed record.
///
/// The feed mixes record kinds on one stream; the two the engine cares
/// about carry `text` or `limit`. Anything else decodes to an empty record.
#[derive(Debug, Clone, Deserialize)]
pub struct PostRecord {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub limit: Option<LimitNotice>,
}

/// Provider drop notice payload.
#[derive(Debug, Clone, Deserialize)]
pub struct LimitNotice {
    pub track: u64,
}

/// Decode one line from the feed.
///
/// A blank line is the protocol keep-alive. A record carrying both fields
/// counts as text. Valid records carrying neither refresh liveness only, so
/// they map to [`FeedEvent::Ping`] as well.
pub fn decode_line(line: &str) -> Result<FeedEvent, serde_json::Error> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(FeedEvent::Ping);
    }
    let record: PostRecord = serde_json::from_str(line)?;
    Ok(match record {
        PostRecord {
            text: Some(text), ..
        } => FeedEvent::Data(FeedData::Text(text)),
        PostRecord {
            limit: Some(limit), ..
        } => FeedEvent::Data(FeedData::Limit(limit.track)),
        _ => FeedEvent::Ping,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_text_record() {
        let event = decode_line(r#"{"text":"alpha test"}"#).unwrap();
        assert_eq!(event, FeedEvent::Data(FeedData::Text("alpha test".to_string())));
    }

    #[test]
    fn test_decode_limit_record() {
        let event = decode_line(r#"{"limit":{"track":3}}"#).unwrap();
        assert_eq!(event, FeedEvent::Data(FeedData::Limit(3)));
    }

    #[test]
    fn test_text_wins_over_limit() {
        let event = decode_line(r#"{"text":"x","limit":{"track":9}}"#).unwrap();
        assert_eq!(event, FeedEvent::Data(FeedData::Text("x".to_string())));
    }

    #[test]
    fn test_blank_line_is_keepalive() {
        assert_eq!(decode_line("").unwrap(), FeedEvent::Ping);
        assert_eq!(decode_line("  \n").unwrap(), FeedEvent::Ping);
    }

    #[test]
    fn test_unclassified_record_is_keepalive() {
        let event = decode_line(r#"{"delete":{"status":{"id":12}}}"#).unwrap();
        assert_eq!(event, FeedEvent::Ping);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(decode_line("not json").is_err());
    }
}
