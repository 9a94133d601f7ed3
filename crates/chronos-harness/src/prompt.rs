//! Natural-language instructions sent with the source portrait.

use std::fmt;

/// Which way in time an offset points.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Past,
    Future,
}

impl Direction {
    /// Negative offsets look back; zero and positive offsets look ahead.
    pub fn from_offset(offset: i32) -> Self {
        if offset < 0 { Self::Past } else { Self::Future }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Past => "past",
            Self::Future => "future",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builds the instruction for a signed year offset.
///
/// Identity features are always kept; only age-correlated attributes move.
pub fn build_instruction(offset: i32) -> String {
    let years = offset.unsigned_abs();
    match Direction::from_offset(offset) {
        Direction::Future => format!(
            "Predict and visualize how this person will look in exactly {years} years. \
             Focus on realistic aging signs like skin texture, hair color changes, and subtle \
             structural facial shifts while strictly preserving their unique identity and facial \
             features. Background should remain consistent but can be slightly aged."
        ),
        Direction::Past => format!(
            "Predict and visualize how this person looked exactly {years} years ago. \
             Focus on de-aging characteristics like smoother skin, more youthful facial fullness, \
             and hair color restoration while strictly preserving their unique identity."
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn future_instruction_embeds_magnitude() {
        let text = build_instruction(30);
        assert!(text.contains("in exactly 30 years"));
        assert!(text.contains("preserving their unique identity"));
        assert!(text.contains("skin texture"));
    }

    #[test]
    fn past_instruction_uses_absolute_value() {
        let text = build_instruction(-20);
        assert!(text.contains("exactly 20 years ago"));
        assert!(!text.contains("-20"));
        assert!(text.contains("hair color restoration"));
    }

    #[test]
    fn zero_offset_is_a_future_request() {
        assert_eq!(Direction::from_offset(0), Direction::Future);
        assert!(build_instruction(0).contains("in exactly 0 years"));
    }
}
