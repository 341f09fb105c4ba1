//! # Theme Extractor
//!
//! Derives a coordinated light/dark UI theme from an existing website.
//!
//! Given a URL, the extractor fetches the page and up to a handful of its
//! stylesheets, scans them for colors and fonts, decides whether the site is
//! light or dark, picks a background, foreground and brand accent, and emits
//! a 17-token `oklch()` palette for each mode.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌───────────┐   ┌────────────┐   ┌─────────────┐
//! │  fetch   │──▶│  extract  │──▶│  classify  │──▶│    synth    │
//! │ HTML+CSS │   │ regex scan│   │ dark/seeds │   │ ThemePreset │
//! └──────────┘   └───────────┘   └────────────┘   └──────┬──────┘
//!                                                        │
//!                      ┌─────────────────────────────────┤
//!                      ▼                                 ▼
//!                 ┌──────────┐                     ┌──────────┐
//!                 │   CLI    │                     │   HTTP   │
//!                 │ (themex) │                     │  server  │
//!                 └──────────┘                     └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! themex extract https://example.com --pretty   # one-off extraction
//! themex analyze --html page.html --css site.css  # offline, saved files
//! themex serve                                    # POST /api/extract-theme
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`color`] | sRGB descriptors and the approximate `oklch()` encoding |
//! | [`extract`] | Color, custom-property and font scanning |
//! | [`classify`] | Dark detection and seed color selection |
//! | [`synth`] | Light/dark token synthesis |
//! | [`fetch`] | Page retrieval |
//! | [`pipeline`] | Stage orchestration |
//! | [`server`] | HTTP server |
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Data types |

pub mod classify;
pub mod color;
pub mod config;
pub mod extract;
pub mod fetch;
pub mod models;
pub mod pipeline;
pub mod server;
pub mod synth;
