//! Theme synthesis: turns three seed colors into a full light + dark preset.
//!
//! Only the accent hue is taken from the site verbatim. Surfaces, text and
//! borders come from a fixed near-neutral ladder, faintly tinted with the
//! page's own hue, so that both modes stay readable no matter how unusual the
//! source palette is. The accent and focus ring carry the sampled hue at a
//! fixed lightness and chroma per mode.

use crate::classify::Classification;
use crate::color::Rgb;
use crate::models::{ThemeColors, ThemePreset, ThemePreview};

/// Identifier of every preset produced by extraction.
pub const CLONED_THEME_ID: &str = "custom-cloned";

/// Builds the preset for a classified site.
pub fn synthesize(seeds: &Classification, site_name: &str) -> ThemePreset {
    let accent_hue = hue_degrees(seeds.accent);
    let primary_hue = if seeds.background.is_neutral() {
        accent_hue
    } else {
        hue_degrees(seeds.background)
    };

    ThemePreset {
        id: CLONED_THEME_ID.to_string(),
        name: site_name.to_string(),
        description: format!("Inspired by {}", site_name),
        preview: ThemePreview {
            primary: if seeds.is_dark { Rgb::WHITE } else { Rgb::BLACK }.to_hex(),
            accent: seeds.accent.to_hex(),
            bg: seeds.background.to_hex(),
        },
        light: light_tokens(primary_hue, accent_hue),
        dark: dark_tokens(primary_hue, accent_hue),
    }
}

/// Rounded HSL hue, always in `0..360`.
fn hue_degrees(color: Rgb) -> u16 {
    (color.hue().round() as u16) % 360
}

fn light_tokens(p: u16, a: u16) -> ThemeColors {
    ThemeColors {
        background: format!("oklch(0.99 0.005 {p})"),
        foreground: format!("oklch(0.15 0.01 {p})"),
        card: "oklch(1 0 0)".to_string(),
        card_foreground: format!("oklch(0.15 0.01 {p})"),
        popover: "oklch(1 0 0)".to_string(),
        popover_foreground: format!("oklch(0.15 0.01 {p})"),
        primary: format!("oklch(0.20 0.01 {p})"),
        primary_foreground: format!("oklch(0.99 0.005 {p})"),
        secondary: format!("oklch(0.96 0.005 {p})"),
        secondary_foreground: format!("oklch(0.20 0.01 {p})"),
        muted: format!("oklch(0.96 0.005 {p})"),
        muted_foreground: format!("oklch(0.50 0.01 {p})"),
        accent: format!("oklch(0.55 0.20 {a})"),
        accent_foreground: format!("oklch(0.99 0.01 {a})"),
        border: format!("oklch(0.91 0.005 {p})"),
        input: format!("oklch(0.91 0.005 {p})"),
        ring: format!("oklch(0.55 0.20 {a})"),
    }
}

fn dark_tokens(p: u16, a: u16) -> ThemeColors {
    ThemeColors {
        background: format!("oklch(0.10 0.005 {p})"),
        foreground: format!("oklch(0.96 0.005 {p})"),
        card: format!("oklch(0.14 0.005 {p})"),
        card_foreground: format!("oklch(0.96 0.005 {p})"),
        popover: format!("oklch(0.14 0.005 {p})"),
        popover_foreground: format!("oklch(0.96 0.005 {p})"),
        primary: format!("oklch(0.96 0.005 {p})"),
        primary_foreground: format!("oklch(0.10 0.005 {p})"),
        secondary: format!("oklch(0.20 0.005 {p})"),
        secondary_foreground: format!("oklch(0.96 0.005 {p})"),
        muted: format!("oklch(0.20 0.005 {p})"),
        muted_foreground: format!("oklch(0.65 0.01 {p})"),
        accent: format!("oklch(0.65 0.18 {a})"),
        accent_foreground: format!("oklch(0.10 0.02 {a})"),
        border: format!("oklch(0.22 0.005 {p})"),
        input: format!("oklch(0.22 0.005 {p})"),
        ring: format!("oklch(0.65 0.18 {a})"),
    }
}

/// Display name for a host: first label after any `www.`, capitalized.
///
/// `www.stripe.com` → `Stripe`, `docs.rs` → `Docs`.
pub fn site_display_name(host: &str) -> String {
    let host = host.strip_prefix("www.").unwrap_or(host);
    let label = host.split('.').next().unwrap_or_default();
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    fn seeds(is_dark: bool, background: &str, accent: &str) -> Classification {
        Classification {
            is_dark,
            background: Rgb::from_hex(background).unwrap(),
            foreground: if is_dark { Rgb::WHITE } else { Rgb::BLACK },
            accent: Rgb::from_hex(accent).unwrap(),
        }
    }

    fn assert_valid_tokens(colors: &ThemeColors) {
        let pattern = Regex::new(r"^oklch\(([0-9.]+) ([0-9.]+) ([0-9]+)\)$").unwrap();
        for (name, value) in colors.tokens() {
            let caps = pattern
                .captures(value)
                .unwrap_or_else(|| panic!("{name} is not an oklch token: {value}"));
            let l: f64 = caps[1].parse().unwrap();
            let c: f64 = caps[2].parse().unwrap();
            let h: u32 = caps[3].parse().unwrap();
            assert!((0.0..=1.0).contains(&l), "{name}: L out of range");
            assert!(c >= 0.0, "{name}: negative chroma");
            assert!(h < 360, "{name}: hue out of range");
        }
    }

    #[test]
    fn test_accent_tokens_carry_accent_hue() {
        let theme = synthesize(&seeds(true, "#101010", "#ff6600"), "Acme");
        assert_eq!(theme.light.accent, "oklch(0.55 0.20 24)");
        assert_eq!(theme.light.ring, "oklch(0.55 0.20 24)");
        assert_eq!(theme.dark.accent, "oklch(0.65 0.18 24)");
        assert_eq!(theme.dark.ring, "oklch(0.65 0.18 24)");
        assert!(theme.dark.accent_foreground.ends_with(" 24)"));
    }

    #[test]
    fn test_neutral_background_borrows_accent_hue() {
        let theme = synthesize(&seeds(false, "#ffffff", "#0000ff"), "Acme");
        assert_eq!(theme.light.background, "oklch(0.99 0.005 240)");
        assert_eq!(theme.dark.background, "oklch(0.10 0.005 240)");
    }

    #[test]
    fn test_tinted_background_sets_primary_hue() {
        // Pale green page, red accent.
        let theme = synthesize(&seeds(false, "#e0ffe0", "#ff0000"), "Acme");
        assert_eq!(theme.light.background, "oklch(0.99 0.005 120)");
        assert_eq!(theme.light.accent, "oklch(0.55 0.20 0)");
    }

    #[test]
    fn test_every_token_is_valid() {
        for (dark, bg, accent) in [
            (true, "#101010", "#ff6600"),
            (false, "#ffffff", "#2563eb"),
            (false, "#fff0f5", "#ff00aa"),
        ] {
            let theme = synthesize(&seeds(dark, bg, accent), "Acme");
            assert_valid_tokens(&theme.light);
            assert_valid_tokens(&theme.dark);
        }
    }

    #[test]
    fn test_preset_identity_and_preview() {
        let theme = synthesize(&seeds(true, "#101010", "#ff6600"), "Acme");
        assert_eq!(theme.id, "custom-cloned");
        assert_eq!(theme.name, "Acme");
        assert_eq!(theme.description, "Inspired by Acme");
        assert_eq!(theme.preview.primary, "#ffffff");
        assert_eq!(theme.preview.accent, "#ff6600");
        assert_eq!(theme.preview.bg, "#101010");

        let light = synthesize(&seeds(false, "#ffffff", "#2563eb"), "Acme");
        assert_eq!(light.preview.primary, "#000000");
    }

    #[test]
    fn test_serializes_camel_case_tokens() {
        let theme = synthesize(&seeds(false, "#ffffff", "#2563eb"), "Acme");
        let json = serde_json::to_value(&theme).unwrap();
        assert_eq!(json["light"].as_object().unwrap().len(), 17);
        assert!(json["dark"]["cardForeground"].is_string());
        assert!(json["light"]["accentForeground"].is_string());
        assert_eq!(json["preview"]["bg"], "#ffffff");
    }

    #[test]
    fn test_site_display_name() {
        assert_eq!(site_display_name("www.stripe.com"), "Stripe");
        assert_eq!(site_display_name("linear.app"), "Linear");
        assert_eq!(site_display_name("docs.rs"), "Docs");
        assert_eq!(site_display_name("localhost"), "Localhost");
        assert_eq!(site_display_name(""), "");
    }
}
