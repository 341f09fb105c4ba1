//! Data types flowing through the extraction pipeline.
//!
//! Scan-time evidence ([`ColorInventory`], [`CssVariableMap`]) lives only for
//! the duration of one extraction. The output types ([`ThemePreset`],
//! [`ExtractionResult`]) serialize to the camelCase JSON contract consumed by
//! the web UI.

use indexmap::IndexMap;
use serde::Serialize;

use crate::color::Rgb;

/// Custom properties declared in `:root`, `html` or `body` blocks, keyed by
/// lowercase name without the leading `--`.
pub type CssVariableMap = IndexMap<String, String>;

/// Every color seen during a scan, with occurrence counts, plus the
/// context-tagged evidence lists.
///
/// `counts` iterates in discovery order. The three buckets keep duplicates:
/// they are evidence, not sets. Every bucket entry is also a key of `counts`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColorInventory {
    pub counts: IndexMap<Rgb, usize>,
    pub backgrounds: Vec<Rgb>,
    pub foregrounds: Vec<Rgb>,
    pub accents: Vec<Rgb>,
}

impl ColorInventory {
    pub fn record(&mut self, color: Rgb) {
        *self.counts.entry(color).or_insert(0) += 1;
    }

    pub fn count(&self, color: &Rgb) -> usize {
        self.counts.get(color).copied().unwrap_or(0)
    }

    /// Number of distinct colors.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// One mode's worth of design tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeColors {
    pub background: String,
    pub foreground: String,
    pub card: String,
    pub card_foreground: String,
    pub popover: String,
    pub popover_foreground: String,
    pub primary: String,
    pub primary_foreground: String,
    pub secondary: String,
    pub secondary_foreground: String,
    pub muted: String,
    pub muted_foreground: String,
    pub accent: String,
    pub accent_foreground: String,
    pub border: String,
    pub input: String,
    pub ring: String,
}

#[cfg(test)]
impl ThemeColors {
    /// All 17 tokens as `(json name, value)` pairs, in declaration order.
    pub(crate) fn tokens(&self) -> [(&'static str, &str); 17] {
        [
            ("background", self.background.as_str()),
            ("foreground", self.foreground.as_str()),
            ("card", self.card.as_str()),
            ("cardForeground", self.card_foreground.as_str()),
            ("popover", self.popover.as_str()),
            ("popoverForeground", self.popover_foreground.as_str()),
            ("primary", self.primary.as_str()),
            ("primaryForeground", self.primary_foreground.as_str()),
            ("secondary", self.secondary.as_str()),
            ("secondaryForeground", self.secondary_foreground.as_str()),
            ("muted", self.muted.as_str()),
            ("mutedForeground", self.muted_foreground.as_str()),
            ("accent", self.accent.as_str()),
            ("accentForeground", self.accent_foreground.as_str()),
            ("border", self.border.as_str()),
            ("input", self.input.as_str()),
            ("ring", self.ring.as_str()),
        ]
    }
}

/// Three swatches shown in the theme picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThemePreview {
    pub primary: String,
    pub accent: String,
    pub bg: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThemePreset {
    pub id: String,
    pub name: String,
    pub description: String,
    pub preview: ThemePreview,
    pub light: ThemeColors,
    pub dark: ThemeColors,
}

/// A seed color as sampled from the site, with its perceptual encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeedColor {
    pub hex: String,
    pub oklch: String,
}

impl From<Rgb> for SeedColor {
    fn from(color: Rgb) -> Self {
        Self {
            hex: color.to_hex(),
            oklch: color.to_oklch().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Seeds {
    pub background: SeedColor,
    pub foreground: SeedColor,
    pub accent: SeedColor,
}

/// Evidence sizes reported alongside a theme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionDebug {
    pub backgrounds_found: usize,
    pub foregrounds_found: usize,
    pub accents_found: usize,
    pub css_vars_found: usize,
    pub seeds: Seeds,
}

/// Successful response body of `POST /api/extract-theme`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    pub success: bool,
    pub theme: ThemePreset,
    pub fonts: Vec<String>,
    pub colors_found: usize,
    pub is_dark: bool,
    pub debug: ExtractionDebug,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inventory_counts_in_discovery_order() {
        let mut inv = ColorInventory::default();
        let red = Rgb::new(255, 0, 0);
        let blue = Rgb::new(0, 0, 255);
        inv.record(blue);
        inv.record(red);
        inv.record(blue);
        assert_eq!(inv.len(), 2);
        assert_eq!(inv.count(&blue), 2);
        assert_eq!(inv.count(&red), 1);
        assert_eq!(inv.count(&Rgb::BLACK), 0);
        let order: Vec<Rgb> = inv.counts.keys().copied().collect();
        assert_eq!(order, vec![blue, red]);
    }

    #[test]
    fn test_seed_color_serializes_hex_and_oklch() {
        let seed = SeedColor::from(Rgb::BLACK);
        let json = serde_json::to_value(&seed).unwrap();
        assert_eq!(json["hex"], "#000000");
        assert_eq!(json["oklch"], "oklch(0.00 0.00 0)");
    }
}
