//! Wire codec for [`VolumeEvent`] messages.
//!
//! The canonical encoding is line-oriented text: `key:value` lines
//! separated by `\n`, one message per connection. Field order is not
//! significant on decode; unknown keys are ignored so older daemons keep
//! working when clients grow new fields.
//!
//! A structured JSON encoding of the same field set is available as
//! [`WireFormat::Json`] for compatibility with older deployments. Both
//! endpoints must be configured with the same format.

use serde::{Deserialize, Serialize};

use crate::event::{DeviceType, MuteState, VolumeEvent, VolumeState};

/// Receive buffer cap. Messages longer than this are truncated by the
/// reader, never rejected; decode tolerates a corrupted trailing line.
pub const MAX_MESSAGE_BYTES: usize = 4096;

/// Selects how events are encoded on the socket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WireFormat {
    /// Canonical `key:value` text lines.
    #[default]
    Lines,
    /// One JSON object per connection, same field set.
    Json,
}

impl WireFormat {
    /// Resolve a config token (`"lines"` or `"json"`).
    pub fn from_config(token: &str) -> Option<Self> {
        match token {
            "lines" => Some(WireFormat::Lines),
            "json" => Some(WireFormat::Json),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WireFormat::Lines => "lines",
            WireFormat::Json => "json",
        }
    }
}

/// Errors produced by [`decode`].
///
/// Individual malformed lines are ignored during line-oriented decode
/// (forward compatibility); only a whole-payload failure or a missing
/// device name rejects the message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("message is missing a device name")]
    MissingName,

    #[error("malformed message payload: {0}")]
    Malformed(String),
}

/// Encode an event in the given wire format.
pub fn encode(event: &VolumeEvent, format: WireFormat) -> Vec<u8> {
    match format {
        WireFormat::Lines => encode_lines(event).into_bytes(),
        WireFormat::Json => encode_json(event),
    }
}

/// Decode an event from raw socket bytes.
///
/// Line decode never fails on individual bad lines; the only hard error
/// for well-formed transports is a missing or empty `name`. Absent keys
/// take their defaults: `type` → output, `volume` → level 0, `muted` →
/// unmuted.
pub fn decode(bytes: &[u8], format: WireFormat) -> Result<VolumeEvent, DecodeError> {
    match format {
        WireFormat::Lines => decode_lines(bytes),
        WireFormat::Json => decode_json(bytes),
    }
}

fn encode_lines(event: &VolumeEvent) -> String {
    let volume = match event.volume {
        VolumeState::Level(level) => level.to_string(),
        VolumeState::Unsupported => "unsupported".to_string(),
    };
    let mut lines = vec![
        format!("name:{}", event.device_name),
        format!("type:{}", event.device_type.as_str()),
        format!("volume:{volume}"),
        format!("muted:{}", event.muted.as_str()),
    ];
    if let Some(error) = &event.error {
        lines.push(format!("error:{error}"));
    }
    lines.join("\n")
}

fn decode_lines(bytes: &[u8]) -> Result<VolumeEvent, DecodeError> {
    // Truncation can split a multi-byte character; lossy conversion keeps
    // the intact prefix decodable.
    let text = String::from_utf8_lossy(bytes);

    let mut name: Option<String> = None;
    let mut event = VolumeEvent::new(String::new());

    for line in text.split('\n') {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        // Lines without a separator are malformed; skip them rather than
        // failing the whole message (a truncated trailing field lands here).
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        match key.trim() {
            "name" => {
                if !value.is_empty() {
                    name = Some(value.to_string());
                }
            }
            "type" => event.device_type = DeviceType::parse(value),
            "volume" => event.volume = VolumeState::parse(value),
            "muted" => event.muted = MuteState::parse(value),
            "error" => {
                if !value.is_empty() {
                    event.error = Some(value.to_string());
                }
            }
            // Unknown keys are ignored for forward compatibility.
            _ => {}
        }
    }

    event.device_name = name.ok_or(DecodeError::MissingName)?;
    Ok(event)
}

/// JSON wire shape. Lenient on decode: `volume` accepts a number or the
/// `"unsupported"` token, `muted` accepts a bool or a token string.
#[derive(Serialize, Deserialize)]
struct JsonEvent {
    #[serde(default)]
    name: Option<String>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    device_type: Option<String>,

    #[serde(default)]
    volume: Option<serde_json::Value>,

    #[serde(default)]
    muted: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn encode_json(event: &VolumeEvent) -> Vec<u8> {
    let volume = match event.volume {
        VolumeState::Level(level) => serde_json::Value::from(level as f64),
        VolumeState::Unsupported => serde_json::Value::from("unsupported"),
    };
    let wire = JsonEvent {
        name: Some(event.device_name.clone()),
        device_type: Some(event.device_type.as_str().to_string()),
        volume: Some(volume),
        muted: Some(serde_json::Value::from(event.muted.as_str())),
        error: event.error.clone(),
    };
    // Serialization of a plain struct cannot fail.
    serde_json::to_vec(&wire).unwrap_or_default()
}

fn decode_json(bytes: &[u8]) -> Result<VolumeEvent, DecodeError> {
    let wire: JsonEvent =
        serde_json::from_slice(bytes).map_err(|e| DecodeError::Malformed(e.to_string()))?;

    let name = wire
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or(DecodeError::MissingName)?
        .to_string();

    let mut event = VolumeEvent::new(name);
    if let Some(token) = wire.device_type.as_deref() {
        event.device_type = DeviceType::parse(token.trim());
    }
    event.volume = match wire.volume {
        Some(serde_json::Value::Number(n)) => {
            VolumeState::level(n.as_f64().unwrap_or(1.0) as f32)
        }
        Some(serde_json::Value::String(s)) => VolumeState::parse(s.trim()),
        Some(_) => VolumeState::Level(1.0),
        None => VolumeState::Level(0.0),
    };
    event.muted = match wire.muted {
        Some(serde_json::Value::Bool(true)) => MuteState::Muted,
        Some(serde_json::Value::Bool(false)) => MuteState::Unmuted,
        Some(serde_json::Value::String(s)) => MuteState::parse(s.trim()),
        _ => MuteState::Unmuted,
    };
    event.error = wire.error.map(|e| e.trim().to_string()).filter(|e| !e.is_empty());
    Ok(event)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_event() -> VolumeEvent {
        let mut event = VolumeEvent::new("Speakers");
        event.volume = VolumeState::Level(0.75);
        event
    }

    #[test]
    fn test_encode_lines_exact_bytes() {
        let bytes = encode(&sample_event(), WireFormat::Lines);
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "name:Speakers\ntype:output\nvolume:0.75\nmuted:false"
        );
    }

    #[test]
    fn test_lines_round_trip() {
        let mut event = VolumeEvent::new("MacBook Pro Microphone");
        event.device_type = DeviceType::Input;
        event.volume = VolumeState::Level(0.4);
        event.muted = MuteState::Muted;

        let bytes = encode(&event, WireFormat::Lines);
        let decoded = decode(&bytes, WireFormat::Lines).unwrap();
        assert_eq!(decoded, event);
    }

    #[test]
    fn test_lines_round_trip_unsupported_volume() {
        let mut event = VolumeEvent::new("HDMI Display");
        event.volume = VolumeState::Unsupported;
        event.muted = MuteState::Unsupported;

        let bytes = encode(&event, WireFormat::Lines);
        let decoded = decode(&bytes, WireFormat::Lines).unwrap();
        assert_eq!(decoded.volume, VolumeState::Unsupported);
        assert_eq!(decoded.muted, MuteState::Unsupported);
    }

    #[test]
    fn test_lines_round_trip_error_message() {
        let mut event = sample_event();
        event.error = Some("Device disconnected".to_string());

        let bytes = encode(&event, WireFormat::Lines);
        let decoded = decode(&bytes, WireFormat::Lines).unwrap();
        assert_eq!(decoded, event);
    }

    #[test]
    fn test_decode_field_order_is_insignificant() {
        let decoded = decode(
            b"muted:true\nvolume:0.25\nname:Speakers\ntype:output",
            WireFormat::Lines,
        )
        .unwrap();
        assert_eq!(decoded.device_name, "Speakers");
        assert_eq!(decoded.volume, VolumeState::Level(0.25));
        assert_eq!(decoded.muted, MuteState::Muted);
    }

    #[test]
    fn test_decode_clamps_out_of_range_volume() {
        let decoded = decode(b"name:S\nvolume:1.5", WireFormat::Lines).unwrap();
        assert_eq!(decoded.volume, VolumeState::Level(1.0));

        let decoded = decode(b"name:S\nvolume:-0.2", WireFormat::Lines).unwrap();
        assert_eq!(decoded.volume, VolumeState::Level(0.0));
    }

    #[test]
    fn test_decode_garbage_volume_falls_back_to_full() {
        let decoded = decode(b"name:S\nvolume:eleven", WireFormat::Lines).unwrap();
        assert_eq!(decoded.volume, VolumeState::Level(1.0));
    }

    #[test]
    fn test_decode_absent_muted_defaults_to_unmuted() {
        let decoded = decode(b"name:S\nvolume:0.5", WireFormat::Lines).unwrap();
        assert_eq!(decoded.muted, MuteState::Unmuted);
    }

    #[test]
    fn test_decode_missing_name_rejected() {
        assert_eq!(
            decode(b"volume:0.5\nmuted:true", WireFormat::Lines),
            Err(DecodeError::MissingName)
        );
    }

    #[test]
    fn test_decode_whitespace_only_name_rejected() {
        assert_eq!(
            decode(b"name:   \nvolume:0.5", WireFormat::Lines),
            Err(DecodeError::MissingName)
        );
    }

    #[test]
    fn test_decode_trims_name() {
        let decoded = decode(b"name:  Speakers  \nvolume:0.5", WireFormat::Lines).unwrap();
        assert_eq!(decoded.device_name, "Speakers");
    }

    #[test]
    fn test_decode_ignores_unknown_keys_and_blank_lines() {
        let decoded = decode(
            b"\nname:Speakers\n\ncolor:blue\nvolume:0.5\n",
            WireFormat::Lines,
        )
        .unwrap();
        assert_eq!(decoded.device_name, "Speakers");
        assert_eq!(decoded.volume, VolumeState::Level(0.5));
    }

    #[test]
    fn test_decode_tolerates_truncated_trailing_line() {
        // A message cut mid-field must not reject the intact prefix.
        let decoded = decode(b"name:Speakers\nvolume:0.5\nmut", WireFormat::Lines).unwrap();
        assert_eq!(decoded.device_name, "Speakers");
        assert_eq!(decoded.muted, MuteState::Unmuted);
    }

    #[test]
    fn test_decode_value_may_contain_separator() {
        let decoded = decode(b"name:USB-C Dock: Rear", WireFormat::Lines).unwrap();
        assert_eq!(decoded.device_name, "USB-C Dock: Rear");
    }

    // ── JSON variant ─────────────────────────────────────────────────

    #[test]
    fn test_json_round_trip() {
        let mut event = VolumeEvent::new("Speakers");
        event.volume = VolumeState::Level(0.75);
        event.muted = MuteState::Muted;

        let bytes = encode(&event, WireFormat::Json);
        let decoded = decode(&bytes, WireFormat::Json).unwrap();
        assert_eq!(decoded, event);
    }

    #[test]
    fn test_json_round_trip_unsupported_volume() {
        let mut event = VolumeEvent::new("HDMI Display");
        event.volume = VolumeState::Unsupported;

        let bytes = encode(&event, WireFormat::Json);
        let decoded = decode(&bytes, WireFormat::Json).unwrap();
        assert_eq!(decoded.volume, VolumeState::Unsupported);
    }

    #[test]
    fn test_json_accepts_bool_muted() {
        let decoded = decode(br#"{"name":"S","muted":true}"#, WireFormat::Json).unwrap();
        assert_eq!(decoded.muted, MuteState::Muted);
    }

    #[test]
    fn test_json_missing_name_rejected() {
        assert_eq!(
            decode(br#"{"volume":0.5}"#, WireFormat::Json),
            Err(DecodeError::MissingName)
        );
    }

    #[test]
    fn test_json_malformed_payload_rejected() {
        assert!(matches!(
            decode(b"{not json", WireFormat::Json),
            Err(DecodeError::Malformed(_))
        ));
    }

    #[test]
    fn test_wire_format_from_config() {
        assert_eq!(WireFormat::from_config("lines"), Some(WireFormat::Lines));
        assert_eq!(WireFormat::from_config("json"), Some(WireFormat::Json));
        assert_eq!(WireFormat::from_config("msgpack"), None);
    }
}
