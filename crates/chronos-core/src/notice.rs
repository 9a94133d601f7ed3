//! Notices shown to the user before a portrait is uploaded.

/// A titled notice with supporting points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Notice {
    pub title: &'static str,
    pub subtitle: Option<&'static str>,
    pub body: &'static str,
    pub points: &'static [&'static str],
}

/// Shown once when a session starts.
pub const PRIVACY_NOTICE: Notice = Notice {
    title: "Identity Secure",
    subtitle: Some("Privacy Protocols Active"),
    body: "ChronosLens utilizes edge-to-edge AI processing to ensure your biological data remains yours.",
    points: &[
        "Images are processed transiently via Gemini Vision Transformers.",
        "We do not archive or index biometric signatures.",
        "Processing history is local to your current session.",
    ],
};

/// Shown next to the upload area.
pub const ETHICS_NOTICE: Notice = Notice {
    title: "AI Ethics Notice",
    subtitle: None,
    body: "Our temporal algorithms are designed to visualize biological progression while strictly respecting your unique identity.",
    points: &[],
};

/// Label of the button that dismisses the privacy notice.
pub const PRIVACY_ACKNOWLEDGE: &str = "Initialize Engine";
