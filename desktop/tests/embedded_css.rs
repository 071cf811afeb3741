#![cfg(test)]
//! The desktop host inlines `ui/assets/theme/main.css`; a broken path or a
//! truncated theme would only show up at runtime, so guard it here.
//!
//! If the theme moves, update both this test and the `include_str!` constant
//! in `desktop/src/main.rs`.

const EMBEDDED_CSS: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../ui/assets/theme/main.css"
));

#[test]
fn embedded_css_file_exists_and_is_not_empty() {
    assert!(!EMBEDDED_CSS.trim().is_empty(), "embedded theme is empty");
}

#[test]
fn embedded_css_defines_theme_variables() {
    for token in ["--color-bg", "--color-text", "--color-error", "--grid-unit", "body {"] {
        assert!(EMBEDDED_CSS.contains(token), "token `{token}` missing from embedded CSS");
    }
}

#[test]
fn braces_are_balanced() {
    let open = EMBEDDED_CSS.matches('{').count();
    let close = EMBEDDED_CSS.matches('}').count();
    assert_eq!(open, close);
}

/// The startup line must be emitted from inside the app, after `launch` has
/// installed the subscriber; before that it is silently dropped.
#[test]
fn startup_log_is_emitted_after_launch() {
    const HOST_SOURCE: &str = include_str!("../src/main.rs");
    let app = HOST_SOURCE.find("fn App()").expect("desktop App component");
    let log = HOST_SOURCE.find("tracing::info!").expect("startup log line");
    assert!(log > app, "startup log runs before the subscriber is installed");
}
