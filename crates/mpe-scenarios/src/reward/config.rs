//! Reward configuration.

use mpe::{MpeError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Reward regime selected once per environment
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardMode {
    /// Per-agent shaping around a target distance to the nearest landmark
    #[default]
    Individual,
    /// Team reward
    Shared,
    /// Blend of an individual and a team term
    PartiallyShared,
    /// Legacy cooperative-navigation reward
    Original,
}

impl RewardMode {
    pub const ALL: [RewardMode; 4] = [
        RewardMode::Individual,
        RewardMode::Shared,
        RewardMode::PartiallyShared,
        RewardMode::Original,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RewardMode::Individual => "individual",
            RewardMode::Shared => "shared",
            RewardMode::PartiallyShared => "partially_shared",
            RewardMode::Original => "original",
        }
    }

    /// One-line description for listings
    pub fn describe(&self) -> &'static str {
        match self {
            RewardMode::Individual => "shaped distance to the nearest landmark, minus collisions",
            RewardMode::Shared => "team progress toward landmarks, minus collisions",
            RewardMode::PartiallyShared => "blend of individual distance and team progress/coverage",
            RewardMode::Original => "negative landmark coverage distance, minus collisions",
        }
    }
}

impl fmt::Display for RewardMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RewardMode {
    type Err = MpeError;

    fn from_str(s: &str) -> Result<Self> {
        RewardMode::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| MpeError::Config(format!("Unknown reward_type: {}", s)))
    }
}

/// Formula used by [`RewardMode::Individual`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndividualForm {
    /// Bonus inside a band around `ideal_dist`, penalties outside it
    #[default]
    IdealBand,
    /// Negated sum over landmarks of the closest agent's distance
    MinDistanceSum,
}

/// Formula used by [`RewardMode::Shared`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SharedForm {
    /// Reduction of the aggregate agent-landmark distance since the last step
    #[default]
    Progress,
    /// Mean over agents of the legacy reward; no cross-step state
    Snapshot,
}

/// Formula used by [`RewardMode::PartiallyShared`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendForm {
    /// `0.6 * -d_nearest + 0.4 * (progress + 0.1 * coverage)`
    #[default]
    ProgressCoverage,
    /// `0.5 * individual + 0.5 * shared snapshot`
    EvenSnapshot,
}

macro_rules! snake_case_from_str {
    ($ty:ty, $what:literal, { $($name:literal => $variant:expr),+ $(,)? }) => {
        impl FromStr for $ty {
            type Err = MpeError;

            fn from_str(s: &str) -> Result<Self> {
                match s {
                    $($name => Ok($variant),)+
                    other => Err(MpeError::Config(format!(concat!("Unknown ", $what, ": {}"), other))),
                }
            }
        }
    };
}

snake_case_from_str!(IndividualForm, "individual form", {
    "ideal_band" => IndividualForm::IdealBand,
    "min_distance_sum" => IndividualForm::MinDistanceSum,
});

snake_case_from_str!(SharedForm, "shared form", {
    "progress" => SharedForm::Progress,
    "snapshot" => SharedForm::Snapshot,
});

snake_case_from_str!(BlendForm, "blend form", {
    "progress_coverage" => BlendForm::ProgressCoverage,
    "even_snapshot" => BlendForm::EvenSnapshot,
});

/// Constants of the ideal-band individual reward
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Shaping {
    /// Target distance to the nearest landmark
    pub ideal_dist: f64,
    /// Half-width of the bonus band around `ideal_dist`
    pub tolerance: f64,
    pub bonus: f64,
    pub penalty_close: f64,
    pub penalty_far: f64,
    /// Added once per colliding neighbour
    pub collision_penalty: f64,
}

impl Default for Shaping {
    fn default() -> Self {
        Self {
            ideal_dist: 0.25,
            tolerance: 0.1,
            bonus: 1.0,
            penalty_close: -1.0,
            penalty_far: -0.5,
            collision_penalty: -1.0,
        }
    }
}

/// Complete reward configuration; immutable once the scenario is built.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    pub mode: RewardMode,
    pub individual_form: IndividualForm,
    pub shared_form: SharedForm,
    pub blend: BlendForm,
    pub shaping: Shaping,
}

impl RewardConfig {
    /// Default variants for `mode`
    pub fn new(mode: RewardMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    /// Parse the mode from its string name
    pub fn from_mode_str(mode: &str) -> Result<Self> {
        Ok(Self::new(mode.parse()?))
    }

    /// Whether the selected formula reads the cross-step progress state
    pub fn uses_progress(&self) -> bool {
        match self.mode {
            RewardMode::Shared => self.shared_form == SharedForm::Progress,
            RewardMode::PartiallyShared => self.blend == BlendForm::ProgressCoverage,
            RewardMode::Individual | RewardMode::Original => false,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let s = &self.shaping;
        let values = [
            ("ideal_dist", s.ideal_dist),
            ("tolerance", s.tolerance),
            ("bonus", s.bonus),
            ("penalty_close", s.penalty_close),
            ("penalty_far", s.penalty_far),
            ("collision_penalty", s.collision_penalty),
        ];
        if let Some((name, v)) = values.iter().find(|(_, v)| !v.is_finite()) {
            return Err(MpeError::Config(format!("shaping.{} must be finite, got {}", name, v)));
        }
        if s.ideal_dist < 0.0 || s.tolerance < 0.0 {
            return Err(MpeError::Config(
                "shaping.ideal_dist and shaping.tolerance must be non-negative".to_string(),
            ));
        }
        Ok(())
    }
}
