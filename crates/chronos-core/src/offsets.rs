//! Year offsets: slider bounds, batch presets and display labels.

use serde::{Deserialize, Serialize};

pub const SLIDER_MIN: i32 = -30;
pub const SLIDER_MAX: i32 = 60;
pub const SLIDER_STEP: i32 = 5;
/// Slider value on a fresh session.
pub const DEFAULT_OFFSET: i32 = 20;

/// Offsets offered for multi-select batches.
pub const PRESET_OFFSETS: [i32; 8] = [-20, -10, 10, 20, 30, 40, 50, 60];

/// Named life stages relative to the portrait's current age.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgeStage {
    Child,
    Teen,
    Adult,
    MiddleAge,
    Elderly,
    Ancient,
}

impl AgeStage {
    pub const ALL: [AgeStage; 6] = [
        Self::Child,
        Self::Teen,
        Self::Adult,
        Self::MiddleAge,
        Self::Elderly,
        Self::Ancient,
    ];

    pub const fn offset(self) -> i32 {
        match self {
            Self::Child => -20,
            Self::Teen => -10,
            Self::Adult => 0,
            Self::MiddleAge => 15,
            Self::Elderly => 40,
            Self::Ancient => 60,
        }
    }

    pub fn from_offset(offset: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|stage| stage.offset() == offset)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Child => "child",
            Self::Teen => "teen",
            Self::Adult => "adult",
            Self::MiddleAge => "middle-age",
            Self::Elderly => "elderly",
            Self::Ancient => "ancient",
        }
    }

    /// Case-insensitive lookup by [`name`](Self::name).
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|stage| stage.name().eq_ignore_ascii_case(name))
    }
}

/// Clamps to the slider range and rounds to the nearest step.
pub fn snap_to_slider(value: i32) -> i32 {
    let clamped = value.clamp(SLIDER_MIN, SLIDER_MAX);
    let steps = ((clamped - SLIDER_MIN) as f64 / SLIDER_STEP as f64).round() as i32;
    (SLIDER_MIN + steps * SLIDER_STEP).min(SLIDER_MAX)
}

/// `+30`, `-20`, `0`.
pub fn signed(offset: i32) -> String {
    if offset > 0 {
        format!("+{offset}")
    } else {
        offset.to_string()
    }
}

/// Slider caption: `Current Age`, `+30 Years`, `-20 Years`.
pub fn offset_label(offset: i32) -> String {
    if offset == 0 {
        "Current Age".to_string()
    } else {
        format!("{} Years", signed(offset))
    }
}

/// Preset chip caption.
pub fn preset_hint(offset: i32) -> &'static str {
    if offset > 0 { "Future" } else { "Past" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_carry_sign() {
        assert_eq!(offset_label(0), "Current Age");
        assert_eq!(offset_label(30), "+30 Years");
        assert_eq!(offset_label(-20), "-20 Years");
        assert_eq!(signed(-5), "-5");
    }

    #[test]
    fn slider_snaps_to_step_within_range() {
        assert_eq!(snap_to_slider(22), 20);
        assert_eq!(snap_to_slider(23), 25);
        assert_eq!(snap_to_slider(-100), SLIDER_MIN);
        assert_eq!(snap_to_slider(999), SLIDER_MAX);
        assert_eq!(snap_to_slider(-12), -10);
    }

    #[test]
    fn stages_map_back_from_offsets() {
        assert_eq!(AgeStage::from_offset(40), Some(AgeStage::Elderly));
        assert_eq!(AgeStage::from_offset(7), None);
        assert_eq!(AgeStage::Adult.offset(), 0);
    }

    #[test]
    fn stages_parse_by_name() {
        assert_eq!(AgeStage::from_name("Middle-Age"), Some(AgeStage::MiddleAge));
        assert_eq!(AgeStage::from_name(" ancient "), Some(AgeStage::Ancient));
        assert_eq!(AgeStage::from_name("toddler"), None);
        for stage in AgeStage::ALL {
            assert_eq!(AgeStage::from_name(stage.name()), Some(stage));
        }
    }

    #[test]
    fn preset_hints_split_past_and_future() {
        assert_eq!(preset_hint(-10), "Past");
        assert_eq!(preset_hint(10), "Future");
    }

    #[test]
    fn presets_are_within_slider_bounds() {
        for offset in PRESET_OFFSETS {
            assert_eq!(snap_to_slider(offset), offset);
        }
    }
}
