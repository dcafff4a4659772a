//! Caption effects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Visual effect applied to captions. Everything but `None` is premium.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Effect {
    /// Plain white-on-black captions.
    #[default]
    None,
    /// Soft halo behind the caption outline.
    Glow,
    /// Gold fill with a brown outline.
    Golden,
}

impl Effect {
    /// Whether using this effect requires pro status or a credit.
    pub fn is_premium(self) -> bool {
        !matches!(self, Effect::None)
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Effect::None => write!(f, "none"),
            Effect::Glow => write!(f, "glow"),
            Effect::Golden => write!(f, "golden"),
        }
    }
}

impl FromStr for Effect {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(Effect::None),
            "glow" => Ok(Effect::Glow),
            "golden" => Ok(Effect::Golden),
            other => Err(Error::validation_field(
                "effect",
                format!("unknown effect '{other}' (expected none, glow, or golden)"),
            )),
        }
    }
}
