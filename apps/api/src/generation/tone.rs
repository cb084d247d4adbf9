//! Tone calibration for generative tasks (cover letters, bios).
//!
//! The caller picks a tone; the prompt receives the matching register,
//! formality level and phrasing to steer away from.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tone {
    #[default]
    Professional,
    Casual,
    Enthusiastic,
}

/// Register and phrasing calibrated to a specific tone.
#[derive(Debug, Clone)]
pub struct ToneGuide {
    pub register: &'static str,
    pub formality: &'static str,
    pub avoid: Vec<&'static str>,
}

/// Returns the guide for the requested tone.
pub fn get_tone_guide(tone: Tone) -> ToneGuide {
    match tone {
        Tone::Professional => ToneGuide {
            register: "formal, confident and concise",
            formality: "Use complete sentences, no contractions, no slang.",
            avoid: vec!["exclamation marks", "emojis", "first-name greetings"],
        },
        Tone::Casual => ToneGuide {
            register: "friendly, relaxed and approachable",
            formality: "Contractions and plain everyday wording are fine; stay respectful.",
            avoid: vec!["corporate jargon", "stiff formal openings", "emojis"],
        },
        Tone::Enthusiastic => ToneGuide {
            register: "energetic, warm and optimistic",
            formality: "Semi-formal; let genuine excitement for the work show.",
            avoid: vec!["hedging language", "self-deprecation", "more than one exclamation mark"],
        },
    }
}

/// Renders the guide as a prompt block.
pub fn render_tone_instruction(tone: Tone) -> String {
    let guide = get_tone_guide(tone);
    format!(
        "TONE: {:?}. Write in a {} voice. {} Avoid: {}.",
        tone,
        guide.register,
        guide.formality,
        guide.avoid.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tone_is_professional() {
        assert_eq!(Tone::default(), Tone::Professional);
    }

    #[test]
    fn test_tone_deserializes_from_frontend_labels() {
        let tone: Tone = serde_json::from_str("\"Enthusiastic\"").unwrap();
        assert_eq!(tone, Tone::Enthusiastic);
        assert!(serde_json::from_str::<Tone>("\"Sarcastic\"").is_err());
    }

    #[test]
    fn test_each_tone_renders_a_distinct_instruction() {
        let professional = render_tone_instruction(Tone::Professional);
        let casual = render_tone_instruction(Tone::Casual);
        let enthusiastic = render_tone_instruction(Tone::Enthusiastic);

        assert_ne!(professional, casual);
        assert_ne!(casual, enthusiastic);
        assert!(professional.contains("no contractions"));
        assert!(casual.contains("Contractions"));
    }
}
