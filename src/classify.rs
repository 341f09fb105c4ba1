//! Light/dark detection and seed color selection.
//!
//! Consumes the evidence gathered by [`crate::extract`] and decides three
//! things: whether the site is dark, which background and foreground it
//! actually paints with, and which saturated color reads as its brand accent.
//! Every threshold is a named constant so the heuristics can be recalibrated
//! without touching control flow.

use crate::color::Rgb;
use crate::models::{ColorInventory, CssVariableMap};

/// A background below this brightness counts as dark evidence.
pub const DARK_BACKGROUND_MAX: f64 = 50.0;
/// A background above this brightness counts as light evidence.
pub const LIGHT_BACKGROUND_MIN: f64 = 200.0;

/// Dark themes take the darkest background below this.
pub const DARK_PAGE_BACKGROUND_MAX: f64 = 60.0;
/// Dark themes take the lightest foreground above this.
pub const DARK_PAGE_FOREGROUND_MIN: f64 = 180.0;
/// Light themes take the lightest background above this.
pub const LIGHT_PAGE_BACKGROUND_MIN: f64 = 200.0;
/// Light themes take the darkest foreground below this.
pub const LIGHT_PAGE_FOREGROUND_MAX: f64 = 80.0;

/// Tagged accents on a dark page must be brighter than this to stay visible.
pub const DARK_ACCENT_MIN: f64 = 80.0;
/// Tagged accents on a light page must be darker than this.
pub const LIGHT_ACCENT_MAX: f64 = 200.0;
/// Brightness band for inventory-wide accent fallback on dark pages.
pub const DARK_FALLBACK_ACCENT_BAND: (f64, f64) = (80.0, 220.0);
/// Brightness band for inventory-wide accent fallback on light pages.
pub const LIGHT_FALLBACK_ACCENT_BAND: (f64, f64) = (40.0, 200.0);

pub const DEFAULT_DARK_ACCENT: Rgb = Rgb::new(0x3b, 0x82, 0xf6);
pub const DEFAULT_LIGHT_ACCENT: Rgb = Rgb::new(0x25, 0x63, 0xeb);
pub const DEFAULT_DARK_BACKGROUND: Rgb = Rgb::new(0x0a, 0x0a, 0x0a);
pub const DEFAULT_DARK_FOREGROUND: Rgb = Rgb::new(0xfa, 0xfa, 0xfa);
pub const DEFAULT_LIGHT_BACKGROUND: Rgb = Rgb::new(0xff, 0xff, 0xff);
pub const DEFAULT_LIGHT_FOREGROUND: Rgb = Rgb::new(0x17, 0x17, 0x17);

/// Substrings that mark a custom-property value as black.
const BLACK_LITERALS: &[&str] = &["0 0 0", "#000", "rgb(0"];

/// Outcome of classification: orientation plus the three seed colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub is_dark: bool,
    pub background: Rgb,
    pub foreground: Rgb,
    pub accent: Rgb,
}

pub fn classify(inventory: &ColorInventory, css_vars: &CssVariableMap) -> Classification {
    let is_dark = detect_dark_theme(inventory, css_vars);
    Classification {
        is_dark,
        background: pick_background(&inventory.backgrounds, is_dark),
        foreground: pick_foreground(&inventory.foregrounds, is_dark),
        accent: find_accent_color(&inventory.accents, inventory, is_dark),
    }
}

/// Decides whether the page is dark.
///
/// In order: a background-ish custom property holding black wins outright;
/// otherwise more dark than light background evidence means dark; failing
/// that, the first (most prominent) background decides; no evidence means
/// light.
pub fn detect_dark_theme(inventory: &ColorInventory, css_vars: &CssVariableMap) -> bool {
    let black_background_var = css_vars
        .iter()
        .filter(|(name, _)| is_background_hint(name))
        .any(|(_, value)| BLACK_LITERALS.iter().any(|lit| value.contains(*lit)));
    if black_background_var {
        return true;
    }

    let backgrounds = &inventory.backgrounds;
    let dark = backgrounds
        .iter()
        .filter(|c| c.brightness() < DARK_BACKGROUND_MAX)
        .count();
    let light = backgrounds
        .iter()
        .filter(|c| c.brightness() > LIGHT_BACKGROUND_MIN)
        .count();
    if dark > light {
        return true;
    }

    backgrounds
        .first()
        .is_some_and(|c| c.brightness() < DARK_BACKGROUND_MAX)
}

fn is_background_hint(name: &str) -> bool {
    name.contains("background") || name.split(['-', '_']).any(|part| part == "bg")
}

/// Picks the brand accent.
///
/// Tagged accents are tried first, then the most frequent saturated color in
/// the whole inventory inside a mode-specific brightness band, then a fixed
/// default blue.
pub fn find_accent_color(accents: &[Rgb], inventory: &ColorInventory, is_dark: bool) -> Rgb {
    let visible = |c: &Rgb| {
        if is_dark {
            c.brightness() > DARK_ACCENT_MIN
        } else {
            c.brightness() < LIGHT_ACCENT_MAX
        }
    };
    if let Some(accent) = accents.iter().find(|c| !c.is_neutral() && visible(*c)) {
        return *accent;
    }

    let (low, high) = if is_dark {
        DARK_FALLBACK_ACCENT_BAND
    } else {
        LIGHT_FALLBACK_ACCENT_BAND
    };
    let mut candidates: Vec<(Rgb, usize)> = inventory
        .counts
        .iter()
        .filter(|(c, _)| !c.is_neutral())
        .filter(|(c, _)| (low..=high).contains(&c.brightness()))
        .map(|(c, n)| (*c, *n))
        .collect();
    // Stable: equal counts keep discovery order.
    candidates.sort_by(|a, b| b.1.cmp(&a.1));

    match candidates.first() {
        Some((accent, _)) => *accent,
        None if is_dark => DEFAULT_DARK_ACCENT,
        None => DEFAULT_LIGHT_ACCENT,
    }
}

/// Darkest qualifying background on dark pages, lightest on light pages.
pub fn pick_background(backgrounds: &[Rgb], is_dark: bool) -> Rgb {
    if is_dark {
        extreme(backgrounds, |b| b < DARK_PAGE_BACKGROUND_MAX, Extreme::Darkest)
            .unwrap_or(DEFAULT_DARK_BACKGROUND)
    } else {
        extreme(backgrounds, |b| b > LIGHT_PAGE_BACKGROUND_MIN, Extreme::Lightest)
            .unwrap_or(DEFAULT_LIGHT_BACKGROUND)
    }
}

/// Lightest qualifying foreground on dark pages, darkest on light pages.
pub fn pick_foreground(foregrounds: &[Rgb], is_dark: bool) -> Rgb {
    if is_dark {
        extreme(foregrounds, |b| b > DARK_PAGE_FOREGROUND_MIN, Extreme::Lightest)
            .unwrap_or(DEFAULT_DARK_FOREGROUND)
    } else {
        extreme(foregrounds, |b| b < LIGHT_PAGE_FOREGROUND_MAX, Extreme::Darkest)
            .unwrap_or(DEFAULT_LIGHT_FOREGROUND)
    }
}

#[derive(Clone, Copy)]
enum Extreme {
    Darkest,
    Lightest,
}

/// First candidate with the most extreme brightness among those passing
/// `qualifies`.
fn extreme(candidates: &[Rgb], qualifies: impl Fn(f64) -> bool, which: Extreme) -> Option<Rgb> {
    let mut best: Option<(Rgb, f64)> = None;
    for c in candidates {
        let b = c.brightness();
        if !qualifies(b) {
            continue;
        }
        let better = match (best, which) {
            (None, _) => true,
            (Some((_, cur)), Extreme::Darkest) => b < cur,
            (Some((_, cur)), Extreme::Lightest) => b > cur,
        };
        if better {
            best = Some((*c, b));
        }
    }
    best.map(|(c, _)| c)
}
