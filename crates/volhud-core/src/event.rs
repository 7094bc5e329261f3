//! Volume-change event model shared by the daemon and the notify client.

/// Whether an event concerns an output or an input device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeviceType {
    /// Speakers, headphones, HDMI audio.
    #[default]
    Output,
    /// Microphones and other capture devices.
    Input,
}

impl DeviceType {
    /// Parse a wire token. Anything other than `input` is treated as
    /// `output`, matching the lenient decode rules.
    pub fn parse(token: &str) -> Self {
        match token {
            "input" => DeviceType::Input,
            _ => DeviceType::Output,
        }
    }

    /// The wire token for this device type.
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceType::Output => "output",
            DeviceType::Input => "input",
        }
    }
}

/// A device's volume axis: a level in `[0, 1]`, or not controllable at all.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VolumeState {
    /// Volume level, clamped to `[0, 1]`.
    Level(f32),
    /// The device does not support volume control.
    Unsupported,
}

impl VolumeState {
    /// A level clamped into `[0, 1]`. Out-of-range values are clamped,
    /// not rejected.
    pub fn level(value: f32) -> Self {
        VolumeState::Level(value.clamp(0.0, 1.0))
    }

    /// Parse a wire token.
    ///
    /// `unsupported` maps to [`VolumeState::Unsupported`]; numeric tokens
    /// are clamped into range. Anything else falls back to full volume —
    /// the daemon and client must agree on this leniency, so it lives here
    /// rather than in either endpoint.
    pub fn parse(token: &str) -> Self {
        if token == "unsupported" {
            return VolumeState::Unsupported;
        }
        match token.parse::<f32>() {
            Ok(value) if value.is_finite() => VolumeState::level(value),
            _ => VolumeState::Level(1.0),
        }
    }
}

/// A device's mute axis, independent of its volume axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MuteState {
    Muted,
    #[default]
    Unmuted,
    /// The device does not support muting.
    Unsupported,
}

impl MuteState {
    /// Parse a wire token. Unknown tokens (and an absent key) fall back
    /// to `Unmuted`.
    pub fn parse(token: &str) -> Self {
        match token {
            "true" => MuteState::Muted,
            "unsupported" => MuteState::Unsupported,
            _ => MuteState::Unmuted,
        }
    }

    /// The wire token for this mute state.
    pub fn as_str(&self) -> &'static str {
        match self {
            MuteState::Muted => "true",
            MuteState::Unmuted => "false",
            MuteState::Unsupported => "unsupported",
        }
    }
}

/// One volume-change notification, as carried over the wire.
///
/// `device_name` is always trimmed and non-empty; decode rejects messages
/// that fail this. `volume` and `muted` are independent axes.
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeEvent {
    pub device_name: String,
    pub device_type: DeviceType,
    pub volume: VolumeState,
    pub muted: MuteState,
    /// Free-form device error to display instead of volume state
    /// (e.g. "Device disconnected").
    pub error: Option<String>,
}

impl VolumeEvent {
    /// A default output-device event for the given name.
    pub fn new(device_name: impl Into<String>) -> Self {
        Self {
            device_name: device_name.into(),
            device_type: DeviceType::Output,
            volume: VolumeState::Level(0.0),
            muted: MuteState::Unmuted,
            error: None,
        }
    }

    /// Derive the single display message for this event.
    ///
    /// Precedence is fixed: device error, then unsupported volume, then
    /// unsupported mute, then muted, then the percentage. When several
    /// conditions hold at once, only the highest-precedence message is
    /// shown.
    pub fn display_message(&self) -> String {
        if let Some(error) = &self.error {
            return format!("{} — {error}", self.device_name);
        }
        let level = match self.volume {
            VolumeState::Unsupported => {
                return format!("{} does not support volume", self.device_name);
            }
            VolumeState::Level(level) => level,
        };
        if self.muted == MuteState::Unsupported {
            return format!("{} does not support muting", self.device_name);
        }
        if self.muted == MuteState::Muted {
            return format!("{} — Muted", self.device_name);
        }
        format!("{} — {}%", self.device_name, (level * 100.0).round() as u32)
    }
}
