//! Regex-driven color, custom-property and font extraction from HTML and CSS.
//!
//! No DOM or CSS parser is involved. Everything here is a pattern scan over
//! raw text, which is fast and tolerant of broken markup at the cost of an
//! occasional missed declaration. The downstream heuristics all have
//! fallbacks, so a miss degrades the theme rather than failing it.
//!
//! # Passes
//!
//! | Pass | Source | Output |
//! |------|--------|--------|
//! | hex / `rgb()` discovery | HTML + CSS | [`ColorInventory::counts`] |
//! | `background` declarations | CSS | [`ColorInventory::backgrounds`] |
//! | bare `color` declarations | CSS | [`ColorInventory::foregrounds`] |
//! | button / link / brand blocks | CSS | [`ColorInventory::accents`] |
//! | `--name: value` in `:root`/`html`/`body` | CSS | [`CssVariableMap`] |
//! | `font-family` | CSS | font shortlist (max [`MAX_FONTS`]) |

use std::sync::LazyLock;

use regex::Regex;

use crate::color::{expand_shorthand, Rgb};
use crate::models::{ColorInventory, CssVariableMap};

/// Maximum number of font families reported.
pub const MAX_FONTS: usize = 3;

/// Generic CSS family keywords and global values that never name a real font.
const GENERIC_FONT_KEYWORDS: &[&str] = &[
    "serif",
    "sans-serif",
    "monospace",
    "cursive",
    "fantasy",
    "math",
    "emoji",
    "fangsong",
    "inherit",
    "initial",
    "unset",
];

/// Platform default fonts that show up in nearly every system font stack.
const PLATFORM_FONT_MARKERS: &[&str] = &["apple", "segoe", "roboto"];

static COLOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"#([A-Fa-f0-9]{6}|[A-Fa-f0-9]{3})\b|(?i:rgba?)\(\s*(\d+)\s*,\s*(\d+)\s*,\s*(\d+)")
        .expect("color pattern is valid")
});

static COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").expect("comment pattern is valid"));

static BACKGROUND_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|[^-\w])background(?:-color)?\s*:\s*([^;}]+)")
        .expect("background pattern is valid")
});

// The leading class keeps `background-color` and `border-color` out.
static COLOR_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|[^-\w])color\s*:\s*([^;}]+)").expect("color declaration pattern is valid")
});

// Selectors never contain `;`, so statements and attribute values before a
// rule stay out of its selector.
static RULE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([^{};]+)\{([^{}]*)\}").expect("rule block pattern is valid"));

static ACCENT_SELECTOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)btn|button|link|brand|accent|primary|cta").expect("accent selector pattern is valid")
});

static CUSTOM_PROPERTY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"--([A-Za-z0-9_-]+)\s*:\s*([^;}]+)").expect("custom property pattern is valid")
});

static FONT_FAMILY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)font-family\s*:\s*([^;}\n]+)").expect("font-family pattern is valid")
});

static STYLE_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<style[^>]*>(.*?)</style>").expect("style block pattern is valid")
});

static STYLE_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)style="([^"]+)""#).expect("style attribute pattern is valid"));

static STYLESHEET_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<link[^>]+href=["']([^"']+\.css[^"']*)["']"#).expect("stylesheet link pattern is valid")
});

/// Everything one scan pass learns about a page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub inventory: ColorInventory,
    pub css_vars: CssVariableMap,
    pub fonts: Vec<String>,
}

/// Runs every pass over a page's HTML and its assembled CSS.
pub fn extract(html: &str, css: &str) -> Extraction {
    Extraction {
        inventory: extract_colors(html, css),
        css_vars: extract_css_variables(css),
        fonts: extract_fonts(css),
    }
}

/// Colors in `text`, in order of appearance, already normalized.
pub fn colors_in(text: &str) -> impl Iterator<Item = Rgb> + '_ {
    COLOR.captures_iter(text).filter_map(move |caps| {
        if let Some(hex) = caps.get(1) {
            // `&#039;` is a character reference, not a color.
            if text[..hex.start() - 1].ends_with('&') {
                return None;
            }
            let digits = hex.as_str();
            let expanded = if digits.len() == 3 {
                expand_shorthand(digits)
            } else {
                digits.to_string()
            };
            return Rgb::from_hex(&expanded).ok();
        }
        let channel = |i: usize| {
            caps.get(i)
                .map(|m| m.as_str().parse::<u32>().unwrap_or(u32::MAX))
        };
        Some(Rgb::from_rgb_channels(channel(2)?, channel(3)?, channel(4)?))
    })
}

/// Counts every color in the HTML and CSS and tags the CSS ones by the
/// declaration context they appear in.
pub fn extract_colors(html: &str, css: &str) -> ColorInventory {
    let mut inventory = ColorInventory::default();
    for color in colors_in(html).chain(colors_in(css)) {
        inventory.record(color);
    }

    let css = strip_comments(css);
    inventory.backgrounds = declared_colors(&BACKGROUND_DECL, &css);
    inventory.foregrounds = declared_colors(&COLOR_DECL, &css);

    for caps in RULE_BLOCK.captures_iter(&css) {
        if !ACCENT_SELECTOR.is_match(&caps[1]) {
            continue;
        }
        let body = &caps[2];
        inventory.accents.extend(declared_colors(&BACKGROUND_DECL, body));
        inventory.accents.extend(declared_colors(&COLOR_DECL, body));
    }

    inventory
}

fn declared_colors(declaration: &Regex, css: &str) -> Vec<Rgb> {
    declaration
        .captures_iter(css)
        .flat_map(|caps| colors_in(caps.get(1).map_or("", |m| m.as_str())).collect::<Vec<_>>())
        .collect()
}

fn strip_comments(css: &str) -> String {
    COMMENT.replace_all(css, " ").into_owned()
}

/// Custom properties declared in `:root`, `html` or `body` rule blocks.
/// Later declarations of the same name overwrite earlier ones.
pub fn extract_css_variables(css: &str) -> CssVariableMap {
    let css = strip_comments(css);
    let mut vars = CssVariableMap::new();
    for caps in RULE_BLOCK.captures_iter(&css) {
        if !is_document_scope(&caps[1]) {
            continue;
        }
        for decl in CUSTOM_PROPERTY.captures_iter(&caps[2]) {
            vars.insert(decl[1].to_lowercase(), decl[2].trim().to_string());
        }
    }
    vars
}

/// True when any selector in the list targets `:root`, `html` or `body`
/// (optionally refined, as in `html.dark` or `:root[data-theme]`).
fn is_document_scope(selector_list: &str) -> bool {
    selector_list.split(',').any(|selector| {
        let selector = selector.trim().to_ascii_lowercase();
        [":root", "html", "body"].iter().any(|scope| {
            selector.strip_prefix(*scope).is_some_and(|rest| {
                rest.chars()
                    .next()
                    .is_none_or(|c| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
            })
        })
    })
}

/// Up to [`MAX_FONTS`] distinct font families, in first-seen order, with
/// generic keywords and platform defaults removed.
pub fn extract_fonts(css: &str) -> Vec<String> {
    let mut fonts: Vec<String> = Vec::new();
    for caps in FONT_FAMILY.captures_iter(css) {
        for family in caps[1].split(',') {
            let family = family
                .replace(['"', '\''], "")
                .replace("!important", "")
                .trim()
                .to_string();
            if is_noise_font(&family) || fonts.contains(&family) {
                continue;
            }
            fonts.push(family);
            if fonts.len() == MAX_FONTS {
                return fonts;
            }
        }
    }
    fonts
}

fn is_noise_font(family: &str) -> bool {
    let lower = family.to_lowercase();
    lower.is_empty()
        || GENERIC_FONT_KEYWORDS.contains(&lower.as_str())
        || lower.contains("system")
        || lower.starts_with("ui-")
        || lower.contains("var(")
        || PLATFORM_FONT_MARKERS.iter().any(|m| lower.contains(m))
}

/// Bodies of `<style>` elements followed by inline `style="…"` attribute
/// values, one per line. Attribute values are closed with `;`.
pub fn inline_css(html: &str) -> String {
    let mut css = String::new();
    for m in STYLE_BLOCK.captures_iter(html).filter_map(|c| c.get(1)) {
        css.push_str(m.as_str());
        css.push('\n');
    }
    for m in STYLE_ATTR.captures_iter(html).filter_map(|c| c.get(1)) {
        css.push_str(m.as_str());
        css.push_str(";\n");
    }
    css
}

/// Raw `href` values of `<link>` tags that point at `.css` resources, in
/// document order.
pub fn stylesheet_hrefs(html: &str) -> Vec<String> {
    STYLESHEET_LINK
        .captures_iter(html)
        .map(|caps| caps[1].to_string())
        .collect()
}
