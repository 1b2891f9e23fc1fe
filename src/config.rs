//! Layout and learner tuning parsed from environment variables.
//!
//! DESIGN
//! ======
//! Every knob has a compiled-in default matching the values the upstream
//! generator is prompted with (450 between columns, 200 between stacked
//! nodes). Environment overrides exist for experimentation; an unparsable
//! value silently falls back to the default, while a parsable but
//! nonsensical value is caught by [`SwimlaneConfig::validate`].

use std::time::Duration;

use crate::error::ErrorCode;

pub const DEFAULT_POOL_HEADER_WIDTH: f64 = 30.0;
pub const DEFAULT_PADDING_X: f64 = 200.0;
pub const DEFAULT_PADDING_Y: f64 = 180.0;
pub const DEFAULT_NODE_V_SPACING: f64 = 200.0;
pub const DEFAULT_COLUMN_H_SPACING: f64 = 450.0;
pub const DEFAULT_MIN_LANE_HEIGHT: f64 = 400.0;
pub const DEFAULT_LAYOUT_COLUMN_THRESHOLD: f64 = 75.0;
pub const DEFAULT_MOVE_EPSILON: f64 = 1.0;

pub const DEFAULT_LEARN_COLUMN_THRESHOLD: f64 = 40.0;
pub const DEFAULT_LEARNED_H_SPACING: f64 = 220.0;
pub const DEFAULT_LEARNED_V_PADDING: f64 = 70.0;
pub const DEFAULT_LEARN_DEBOUNCE_MS: u64 = 2000;

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{key} must be finite and positive, got {value}")]
    NotPositive { key: &'static str, value: f64 },
    #[error("column threshold {threshold} must be smaller than column spacing {spacing}")]
    ThresholdTooWide { threshold: f64, spacing: f64 },
}

impl ErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotPositive { .. } => "E_CONFIG_NOT_POSITIVE",
            Self::ThresholdTooWide { .. } => "E_CONFIG_THRESHOLD",
        }
    }
}

// =============================================================================
// LAYOUT
// =============================================================================

/// Constants used by the layout pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    /// Width of the vertical title band on the left of the pool.
    pub pool_header_width: f64,
    /// Empty space between a lane's left/right edge and the outermost column.
    pub padding_x: f64,
    /// Empty space above and below the tallest column group in a lane.
    pub padding_y: f64,
    /// Gap between nodes stacked in the same column and lane.
    pub node_v_spacing: f64,
    /// Gap between adjacent columns.
    pub column_h_spacing: f64,
    pub min_lane_height: f64,
    /// Max distance between a node center and a column's running average.
    pub column_threshold: f64,
    /// Nodes closer than this to their target position are left alone.
    pub move_epsilon: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            pool_header_width: DEFAULT_POOL_HEADER_WIDTH,
            padding_x: DEFAULT_PADDING_X,
            padding_y: DEFAULT_PADDING_Y,
            node_v_spacing: DEFAULT_NODE_V_SPACING,
            column_h_spacing: DEFAULT_COLUMN_H_SPACING,
            min_lane_height: DEFAULT_MIN_LANE_HEIGHT,
            column_threshold: DEFAULT_LAYOUT_COLUMN_THRESHOLD,
            move_epsilon: DEFAULT_MOVE_EPSILON,
        }
    }
}

impl LayoutConfig {
    /// Build layout config from environment variables.
    ///
    /// Optional:
    /// - `LAYOUT_POOL_HEADER_WIDTH`: default 30
    /// - `LAYOUT_PADDING_X`: default 200
    /// - `LAYOUT_PADDING_Y`: default 180
    /// - `LAYOUT_NODE_V_SPACING`: default 200
    /// - `LAYOUT_COLUMN_H_SPACING`: default 450
    /// - `LAYOUT_MIN_LANE_HEIGHT`: default 400
    /// - `LAYOUT_COLUMN_THRESHOLD`: default 75
    /// - `LAYOUT_MOVE_EPSILON`: default 1
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            pool_header_width: env_parse("LAYOUT_POOL_HEADER_WIDTH", DEFAULT_POOL_HEADER_WIDTH),
            padding_x: env_parse("LAYOUT_PADDING_X", DEFAULT_PADDING_X),
            padding_y: env_parse("LAYOUT_PADDING_Y", DEFAULT_PADDING_Y),
            node_v_spacing: env_parse("LAYOUT_NODE_V_SPACING", DEFAULT_NODE_V_SPACING),
            column_h_spacing: env_parse("LAYOUT_COLUMN_H_SPACING", DEFAULT_COLUMN_H_SPACING),
            min_lane_height: env_parse("LAYOUT_MIN_LANE_HEIGHT", DEFAULT_MIN_LANE_HEIGHT),
            column_threshold: env_parse("LAYOUT_COLUMN_THRESHOLD", DEFAULT_LAYOUT_COLUMN_THRESHOLD),
            move_epsilon: env_parse("LAYOUT_MOVE_EPSILON", DEFAULT_MOVE_EPSILON),
        }
    }
}

// =============================================================================
// LEARNER
// =============================================================================

/// Constants used by the preference learner and its debounce.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LearnerConfig {
    /// Tighter than the layout threshold: hand placement is less uniform.
    pub column_threshold: f64,
    pub default_h_spacing: f64,
    pub default_v_padding: f64,
    /// Quiet period after the last edit before the learner runs.
    pub debounce: Duration,
}

impl Default for LearnerConfig {
    fn default() -> Self {
        Self {
            column_threshold: DEFAULT_LEARN_COLUMN_THRESHOLD,
            default_h_spacing: DEFAULT_LEARNED_H_SPACING,
            default_v_padding: DEFAULT_LEARNED_V_PADDING,
            debounce: Duration::from_millis(DEFAULT_LEARN_DEBOUNCE_MS),
        }
    }
}

impl LearnerConfig {
    /// Build learner config from environment variables.
    ///
    /// Optional:
    /// - `LEARN_COLUMN_THRESHOLD`: default 40
    /// - `LEARN_DEFAULT_H_SPACING`: default 220
    /// - `LEARN_DEFAULT_V_PADDING`: default 70
    /// - `LEARN_DEBOUNCE_MS`: default 2000
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            column_threshold: env_parse("LEARN_COLUMN_THRESHOLD", DEFAULT_LEARN_COLUMN_THRESHOLD),
            default_h_spacing: env_parse("LEARN_DEFAULT_H_SPACING", DEFAULT_LEARNED_H_SPACING),
            default_v_padding: env_parse("LEARN_DEFAULT_V_PADDING", DEFAULT_LEARNED_V_PADDING),
            debounce: Duration::from_millis(env_parse("LEARN_DEBOUNCE_MS", DEFAULT_LEARN_DEBOUNCE_MS)),
        }
    }
}

// =============================================================================
// AGGREGATE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SwimlaneConfig {
    pub layout: LayoutConfig,
    pub learner: LearnerConfig,
}

impl SwimlaneConfig {
    /// Build the full config from environment variables and validate it.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if an override is non-positive or the layout
    /// clustering threshold would merge adjacent columns.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self { layout: LayoutConfig::from_env(), learner: LearnerConfig::from_env() };
        config.validate()?;
        Ok(config)
    }

    /// Check that every spacing is usable by the layout and learner passes.
    ///
    /// # Errors
    ///
    /// Returns the first offending value as a [`ConfigError`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        let layout = &self.layout;
        let learner = &self.learner;
        let positive = [
            ("pool_header_width", layout.pool_header_width),
            ("padding_x", layout.padding_x),
            ("padding_y", layout.padding_y),
            ("node_v_spacing", layout.node_v_spacing),
            ("column_h_spacing", layout.column_h_spacing),
            ("min_lane_height", layout.min_lane_height),
            ("column_threshold", layout.column_threshold),
            ("move_epsilon", layout.move_epsilon),
            ("learn_column_threshold", learner.column_threshold),
            ("default_h_spacing", learner.default_h_spacing),
            ("default_v_padding", learner.default_v_padding),
        ];
        for (key, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::NotPositive { key, value });
            }
        }
        if layout.column_threshold >= layout.column_h_spacing {
            return Err(ConfigError::ThresholdTooWide {
                threshold: layout.column_threshold,
                spacing: layout.column_h_spacing,
            });
        }
        Ok(())
    }
}

fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
