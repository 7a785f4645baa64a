//! Prompt composition.
//!
//! `compose` は純粋関数: 同じ brief からは常に同じ文字列。
//! 空のフィールドは省略し、残った行を `". "` で連結します。

use crate::domain::{Brief, MediaClass};
use crate::domain::brief::DEFAULT_STYLE;

/// Wording of one prompt flavour.
#[derive(Debug, Clone, Copy)]
pub struct PromptTemplate {
    content: &'static str,
    headline: &'static str,
    secondary: &'static str,
    cta: &'static str,
    style_suffix: &'static str,
    format: &'static str,
    requirements: &'static str,
}

impl PromptTemplate {
    pub const IMAGE: PromptTemplate = PromptTemplate {
        content: "Image content",
        headline: "Headline",
        secondary: "Secondary text",
        cta: "Call-to-action",
        style_suffix: "advertisement design",
        format: "Format: Professional marketing advertisement with clean layout and readable text placement",
        requirements: "Requirements: High-quality, eye-catching design suitable for digital marketing",
    };

    pub const VIDEO: PromptTemplate = PromptTemplate {
        content: "Video content",
        headline: "Headline text overlay",
        secondary: "Secondary text",
        cta: "Call-to-action text",
        style_suffix: "video advertisement",
        format: "Format: Professional marketing video advertisement with engaging visuals",
        requirements: "Requirements: High-quality, attention-grabbing video suitable for digital marketing campaigns",
    };

    pub fn for_media(media: MediaClass) -> Self {
        match media {
            MediaClass::Image => Self::IMAGE,
            MediaClass::Video => Self::VIDEO,
        }
    }

    pub fn render(&self, brief: &Brief) -> String {
        let mut lines = Vec::with_capacity(5);

        let description = brief.description.trim();
        if !description.is_empty() {
            lines.push(format!("{}: {description}", self.content));
        }

        let overlays: Vec<String> = [
            (self.headline, brief.headline.trim()),
            (self.secondary, brief.secondary_text.trim()),
            (self.cta, brief.cta.trim()),
        ]
        .into_iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(label, value)| format!("{label}: \"{value}\""))
        .collect();
        if !overlays.is_empty() {
            lines.push(format!("Text overlays needed: {}", overlays.join(", ")));
        }

        let style = match brief.style.trim() {
            "" => DEFAULT_STYLE,
            style => style,
        };
        lines.push(format!("Style: {style} {}", self.style_suffix));
        lines.push(self.format.to_string());
        lines.push(self.requirements.to_string());

        lines.join(". ")
    }
}

/// Composes the image prompt for a brief.
pub fn compose(brief: &Brief) -> String {
    PromptTemplate::IMAGE.render(brief)
}

/// Composes the prompt with the template of the given media class.
pub fn compose_for(media: MediaClass, brief: &Brief) -> String {
    PromptTemplate::for_media(media).render(brief)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn composes_exact_image_prompt() {
        let brief = Brief::new("google-gemini")
            .with_headline("Sale")
            .with_cta("Buy")
            .with_style("bold");

        assert_eq!(
            compose(&brief),
            "Text overlays needed: Headline: \"Sale\", Call-to-action: \"Buy\". \
             Style: bold advertisement design. \
             Format: Professional marketing advertisement with clean layout and readable text placement. \
             Requirements: High-quality, eye-catching design suitable for digital marketing"
        );
    }

    #[test]
    fn composes_description_and_headline_with_default_style() {
        let brief = Brief::new("google-gemini")
            .with_description("x")
            .with_headline("H");

        assert_eq!(
            compose(&brief),
            "Image content: x. Text overlays needed: Headline: \"H\". Style: modern-marketing advertisement design. Format: Professional marketing advertisement with clean layout and readable text placement. Requirements: High-quality, eye-catching design suitable for digital marketing"
        );
    }

    #[test]
    fn composes_full_image_prompt() {
        let brief = Brief::new("google-gemini")
            .with_description("red sneakers on concrete")
            .with_headline("Run Free")
            .with_secondary_text("New season")
            .with_cta("Shop now");

        assert_eq!(
            compose(&brief),
            "Image content: red sneakers on concrete. \
             Text overlays needed: Headline: \"Run Free\", Secondary text: \"New season\", Call-to-action: \"Shop now\". \
             Style: modern-marketing advertisement design. \
             Format: Professional marketing advertisement with clean layout and readable text placement. \
             Requirements: High-quality, eye-catching design suitable for digital marketing"
        );
    }

    #[test]
    fn composes_video_prompt() {
        let brief = Brief::new("veo-3-fast")
            .with_description("drone shot of a city")
            .with_headline("Fly")
            .with_style("cinematic");

        assert_eq!(
            compose_for(MediaClass::Video, &brief),
            "Video content: drone shot of a city. \
             Text overlays needed: Headline text overlay: \"Fly\". \
             Style: cinematic video advertisement. \
             Format: Professional marketing video advertisement with engaging visuals. \
             Requirements: High-quality, attention-grabbing video suitable for digital marketing campaigns"
        );
    }

    #[rstest]
    #[case::whitespace_only("   ", "  ", "\t")]
    #[case::empty("", "", "")]
    fn blank_fields_are_omitted(#[case] headline: &str, #[case] secondary: &str, #[case] cta: &str) {
        let brief = Brief::new("google-gemini")
            .with_description("a lamp")
            .with_headline(headline)
            .with_secondary_text(secondary)
            .with_cta(cta);

        let prompt = compose(&brief);
        assert!(prompt.starts_with("Image content: a lamp. Style: "));
        assert!(!prompt.contains("Text overlays needed"));
        assert!(!prompt.contains("\"\""));
    }

    #[test]
    fn compose_is_deterministic_across_snapshots() {
        let brief = Brief::new("google-gemini")
            .with_description("coffee")
            .with_headline("Wake up");
        let snapshot: Brief =
            serde_json::from_str(&serde_json::to_string(&brief).unwrap()).unwrap();

        assert_eq!(compose(&brief), compose(&snapshot));
        assert_eq!(compose(&brief), compose(&brief));
    }
}
