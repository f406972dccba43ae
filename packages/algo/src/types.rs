//! Common Types and Constants
//!
//! Shared data structures used across the memory model and the aligner.

use serde::{Deserialize, Serialize};

// ==================== Constants ====================

/// Lowest value stability or difficulty may take once stored
pub const MEMORY_FLOOR: f64 = 1e-4;

/// Difficulty lower bound
pub const DIFFICULTY_MIN: f64 = 1.0;

/// Difficulty upper bound
pub const DIFFICULTY_MAX: f64 = 10.0;

/// Forgetting curve decay exponent
pub const DECAY: f64 = -0.5;

/// Forgetting curve factor, chosen so that R(S) = 0.9
pub const FACTOR: f64 = 19.0 / 81.0;

/// Number of model weights
pub const WEIGHT_COUNT: usize = 17;

// ==================== Review Types ====================

/// Learner's self-assessed recall quality
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    Again = 1,
    Hard = 2,
    Good = 3,
    Easy = 4,
}

impl Rating {
    pub const ALL: [Rating; 4] = [Rating::Again, Rating::Hard, Rating::Good, Rating::Easy];

    /// Case-insensitive parse of `again|hard|good|easy`
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "again" => Some(Self::Again),
            "hard" => Some(Self::Hard),
            "good" => Some(Self::Good),
            "easy" => Some(Self::Easy),
            _ => None,
        }
    }

    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            1 => Some(Self::Again),
            2 => Some(Self::Hard),
            3 => Some(Self::Good),
            4 => Some(Self::Easy),
            _ => None,
        }
    }

    pub fn as_i64(self) -> i64 {
        self as i64
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Again => "again",
            Self::Hard => "hard",
            Self::Good => "good",
            Self::Easy => "easy",
        }
    }

    /// Whether the item was recalled at all
    pub fn is_pass(self) -> bool {
        self != Self::Again
    }
}

/// Memory state of a card
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryState {
    Learning = 1,
    Review = 2,
    Relearning = 3,
}

impl MemoryState {
    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            1 => Some(Self::Learning),
            2 => Some(Self::Review),
            3 => Some(Self::Relearning),
            _ => None,
        }
    }

    pub fn as_i64(self) -> i64 {
        self as i64
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Learning => "learning",
            Self::Review => "review",
            Self::Relearning => "relearning",
        }
    }
}

/// Per-word memory record as seen by the model
///
/// `stability` and `difficulty` are both `None` until the first review.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MemoryCard {
    pub state: MemoryState,
    pub step: u32,
    pub stability: Option<f64>,
    pub difficulty: Option<f64>,
}

impl MemoryCard {
    /// A freshly added, never reviewed card
    pub fn new() -> Self {
        Self {
            state: MemoryState::Learning,
            step: 0,
            stability: None,
            difficulty: None,
        }
    }

    pub fn is_new(&self) -> bool {
        self.stability.is_none() || self.difficulty.is_none()
    }
}

impl Default for MemoryCard {
    fn default() -> Self {
        Self::new()
    }
}

/// Scheduler configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SchedulerParams {
    /// Model weights w0..w16
    pub w: [f64; WEIGHT_COUNT],
    /// Target probability of recall at the due date
    pub desired_retention: f64,
    /// Successful steps needed to leave `Learning`
    pub learning_steps: u32,
    /// Successful steps needed to leave `Relearning`
    pub relearning_steps: u32,
    /// Interval floor in days
    pub minimum_interval_days: f64,
    /// Interval ceiling in days
    pub maximum_interval_days: f64,
}

impl Default for SchedulerParams {
    fn default() -> Self {
        Self {
            w: [
                0.4, 0.6, 2.4, 5.8, // w0-w3: initial stability per rating
                4.93, 0.94, 0.86, 0.01, 1.49, // w4-w8
                0.14, 0.94, 2.18, 0.05, 0.34, // w9-w13
                1.26, 0.29, 2.61, // w14-w16
            ],
            desired_retention: 0.9,
            learning_steps: 2,
            relearning_steps: 1,
            minimum_interval_days: 1.0,
            maximum_interval_days: 36500.0,
        }
    }
}

/// Outcome of applying one rating to a card
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScheduledReview {
    /// Card after the review; stability and difficulty always set
    pub card: MemoryCard,
    /// Days until the card is due again
    pub interval_days: f64,
    /// Retrievability at the moment of review (1.0 on first review)
    pub retrievability: f64,
}
