//! Decay weighting schemes
//!
//! Each scheme maps a transaction's age in months to a weight in `[0, 1]`.
//! Older months weigh less, so the weighted average tracks recent spending.
//!
//! - `Linear`: flat at 1.0 until `decline_start`, then a straight line down
//!   to `min_weight` at the oldest month of the horizon
//! - `Exponential`: `exp(-age / scale)`
//! - `Quadratic`: `max(1 - (age / scale)^2, 0)`
//!
//! Schemes are selected with [`DecayScheme`] and evaluated through the
//! [`DecayWeight`] trait, so the statistics builder never knows which one
//! it is using.

use std::fmt;
use std::str::FromStr;

/// Default age (in months) where linear decay starts declining
pub const DEFAULT_DECLINE_START: usize = 13;
/// Default weight of the oldest month under linear decay
pub const DEFAULT_MIN_WEIGHT: f64 = 0.01;
/// Default scale (in months) for exponential and quadratic decay
pub const DEFAULT_SCALE: f64 = 13.0;

/// Maps an age in months to a weight
pub trait DecayWeight {
    /// Weight for a bucket `age` months old. Negative ages weigh like age 0.
    fn weight(&self, age: i32) -> f64;
}

/// Selectable scheme names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemeKind {
    Linear,
    Exponential,
    Quadratic,
}

impl SchemeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Exponential => "exponential",
            Self::Quadratic => "quadratic",
        }
    }
}

impl fmt::Display for SchemeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SchemeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "linear" => Ok(Self::Linear),
            "exponential" | "exp" => Ok(Self::Exponential),
            "quadratic" => Ok(Self::Quadratic),
            _ => Err(format!(
                "Unknown decay scheme: {}. Available: linear, exponential, quadratic",
                s
            )),
        }
    }
}

/// A fully parameterized decay scheme
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DecayScheme {
    Linear {
        decline_start: usize,
        min_weight: f64,
    },
    Exponential {
        scale: f64,
    },
    Quadratic {
        scale: f64,
    },
}

impl Default for DecayScheme {
    fn default() -> Self {
        Self::Linear {
            decline_start: DEFAULT_DECLINE_START,
            min_weight: DEFAULT_MIN_WEIGHT,
        }
    }
}

impl DecayScheme {
    /// Build a scheme of the given kind, taking only the parameters it uses
    pub fn from_kind(kind: SchemeKind, decline_start: usize, min_weight: f64, scale: f64) -> Self {
        match kind {
            SchemeKind::Linear => Self::Linear {
                decline_start,
                min_weight,
            },
            SchemeKind::Exponential => Self::Exponential { scale },
            SchemeKind::Quadratic => Self::Quadratic { scale },
        }
    }

    pub fn kind(&self) -> SchemeKind {
        match self {
            Self::Linear { .. } => SchemeKind::Linear,
            Self::Exponential { .. } => SchemeKind::Exponential,
            Self::Quadratic { .. } => SchemeKind::Quadratic,
        }
    }

    /// Header label for the weighted-average column
    pub fn column_label(&self) -> &'static str {
        match self {
            Self::Linear { .. } => "linear_decay",
            Self::Exponential { .. } => "exponential_decay",
            Self::Quadratic { .. } => "quadratic_decay",
        }
    }

    /// Prepare the scheme for a run covering `horizon` months
    ///
    /// Only linear decay depends on the horizon; it precomputes its table
    /// once here so each lookup is an index.
    pub fn build(&self, horizon: usize) -> Box<dyn DecayWeight> {
        match *self {
            Self::Linear {
                decline_start,
                min_weight,
            } => Box::new(LinearDecay::new(horizon, decline_start, min_weight)),
            Self::Exponential { scale } => Box::new(ExponentialDecay::new(scale)),
            Self::Quadratic { scale } => Box::new(QuadraticDecay::new(scale)),
        }
    }
}

/// Piecewise-linear decay with a flat head, backed by a precomputed table
#[derive(Debug, Clone, PartialEq)]
pub struct LinearDecay {
    weights: Vec<f64>,
}

impl LinearDecay {
    pub fn new(horizon: usize, decline_start: usize, min_weight: f64) -> Self {
        Self {
            weights: linear_decay_weights(horizon.max(1), decline_start, min_weight),
        }
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }
}

impl DecayWeight for LinearDecay {
    fn weight(&self, age: i32) -> f64 {
        let idx = (age.max(0) as usize).min(self.weights.len().saturating_sub(1));
        self.weights.get(idx).copied().unwrap_or(1.0)
    }
}

/// Exponential decay, `exp(-age / scale)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExponentialDecay {
    scale: f64,
}

impl ExponentialDecay {
    pub fn new(scale: f64) -> Self {
        Self { scale }
    }
}

impl DecayWeight for ExponentialDecay {
    fn weight(&self, age: i32) -> f64 {
        (-(age.max(0) as f64) / self.scale).exp()
    }
}

/// Quadratic decay floored at zero, `max(1 - (age / scale)^2, 0)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadraticDecay {
    scale: f64,
}

impl QuadraticDecay {
    pub fn new(scale: f64) -> Self {
        Self { scale }
    }
}

impl DecayWeight for QuadraticDecay {
    fn weight(&self, age: i32) -> f64 {
        let ratio = age.max(0) as f64 / self.scale;
        (1.0 - ratio * ratio).max(0.0)
    }
}

/// Weight table of length `n` for piecewise-linear decay
///
/// Ages below `decline_start` weigh 1.0. The remaining `n - decline_start`
/// ages are evenly spaced samples from 1.0 down to `min_weight`, both
/// endpoints included. A single remaining sample is 1.0.
pub fn linear_decay_weights(n: usize, decline_start: usize, min_weight: f64) -> Vec<f64> {
    let mut weights = vec![1.0; n];
    if n <= decline_start {
        return weights;
    }

    let steps = n - decline_start;
    if steps == 1 {
        return weights;
    }

    let delta = (min_weight - 1.0) / (steps - 1) as f64;
    for (i, w) in weights[decline_start..].iter_mut().enumerate() {
        *w = if i == steps - 1 {
            min_weight
        } else {
            1.0 + delta * i as f64
        };
    }
    weights
}
