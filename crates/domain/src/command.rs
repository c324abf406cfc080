//! Motor commands — the three tokens accepted by the controller.
//!
//! Commands enter through two ingress channels (the HTTP surface and the
//! store subscription) and the automation engine. Parsing is the ingress
//! boundary: an unknown token never becomes a [`MotorCommandKind`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::time::Millis;

/// The kind of motor command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MotorCommandKind {
    /// Run the motor until the line is extended.
    Extend,
    /// Run the motor until the line is retracted.
    Retract,
    /// Stop the motor where it is.
    Idle,
}

impl MotorCommandKind {
    /// Canonical upper-case token.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Extend => "EXTEND",
            Self::Retract => "RETRACT",
            Self::Idle => "IDLE",
        }
    }
}

impl fmt::Display for MotorCommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MotorCommandKind {
    type Err = ValidationError;

    /// Parse a token case-insensitively, ignoring surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        if token.eq_ignore_ascii_case("EXTEND") {
            Ok(Self::Extend)
        } else if token.eq_ignore_ascii_case("RETRACT") {
            Ok(Self::Retract)
        } else if token.eq_ignore_ascii_case("IDLE") {
            Ok(Self::Idle)
        } else {
            Err(ValidationError::InvalidCommand(s.to_string()))
        }
    }
}

/// Which ingress channel a command arrived through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandSource {
    /// `POST /command/{kind}` on the HTTP surface.
    Http,
    /// A change observed on the store's command path.
    Store,
    /// Issued by the automation decision engine.
    Automation,
}

impl CommandSource {
    /// Whether the controller should mirror the command back into the store.
    ///
    /// Store-originated commands are already there.
    #[must_use]
    pub fn needs_acknowledgment(self) -> bool {
        !matches!(self, Self::Store)
    }
}

impl fmt::Display for CommandSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http => f.write_str("http"),
            Self::Store => f.write_str("store"),
            Self::Automation => f.write_str("automation"),
        }
    }
}

/// A command on its way to the motor controller. Not retained once processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotorCommand {
    pub kind: MotorCommandKind,
    pub source: CommandSource,
    pub issued_at_ms: Millis,
}

impl MotorCommand {
    #[must_use]
    pub fn new(kind: MotorCommandKind, source: CommandSource, issued_at_ms: Millis) -> Self {
        Self {
            kind,
            source,
            issued_at_ms,
        }
    }
}

/// The value held at the store's `command` path.
///
/// Writers merge this object so unrelated keys survive. Readers use
/// [`CommandRecord::command_kind`] which tolerates junk values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandRecord {
    pub motor: MotorCommandKind,
    #[serde(rename = "updatedAt")]
    pub updated_at: Millis,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl CommandRecord {
    #[must_use]
    pub fn new(motor: MotorCommandKind, updated_at: Millis) -> Self {
        Self {
            motor,
            updated_at,
            source: None,
        }
    }

    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Serialize as a JSON object ready to be merged into the store.
    ///
    /// `source` is always present, `null` when absent, so a merge clears the
    /// tag left behind by the previous writer.
    #[must_use]
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "motor": self.motor.as_str(),
            "updatedAt": self.updated_at,
            "source": self.source,
        })
    }

    /// The `updatedAt` stamp of a raw `command` path value, if it has one.
    #[must_use]
    pub fn stamp(value: &serde_json::Value) -> Option<Millis> {
        value.get("updatedAt").and_then(serde_json::Value::as_i64)
    }

    /// Extract the command kind from a raw `command` path value.
    ///
    /// Returns `None` for anything that is not an object with a recognised
    /// string `motor` field.
    #[must_use]
    pub fn command_kind(value: &serde_json::Value) -> Option<MotorCommandKind> {
        value
            .get("motor")
            .and_then(serde_json::Value::as_str)
            .and_then(|token| token.parse().ok())
    }
}
