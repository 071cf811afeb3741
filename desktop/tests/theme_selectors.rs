#![cfg(test)]
/*!
Selector lint for the shared theme.

The KPI tile and the demo dashboard emit these class names from Rust
(`NodeRole::css_class` and `views/dashboard.rs`). A rename on either side
without the other silently drops styling in packaged desktop builds, so the
selectors are checked by substring against the embedded theme.
*/

const THEME_CSS: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../ui/assets/theme/main.css"
));

const REQUIRED_SELECTORS: &[&str] = &[
    ":root",
    "body {",
    ".page {",
    ".dashboard__controls",
    ".dashboard__window",
    ".dashboard__error",
    ".dashboard__tile",
    ".popkpi {",
    ".popkpi__big-value",
    ".popkpi__comparison",
    ".popkpi__cell",
    ".popkpi__cell--previous",
    ".popkpi__cell--percent",
    ".popkpi__error",
    "@media (prefers-color-scheme: dark)",
];

#[test]
fn theme_contains_required_selectors() {
    let missing: Vec<_> = REQUIRED_SELECTORS
        .iter()
        .filter(|sel| !THEME_CSS.contains(*sel))
        .collect();
    assert!(missing.is_empty(), "missing selectors: {missing:?}");
}
