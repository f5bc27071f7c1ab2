//! Typeset code fences.
//!
//! Fenced blocks tagged with a math language are rendered by the same
//! engine as inline segments. The fence meta string carries `key=value`
//! options, e.g. `eval=false` after the language on a ```` ```typst ```` fence.

use std::collections::HashMap;

use rw_doctree::CodeBlock;

/// What a typeset fence contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FenceKind {
    /// ```` ```math ````: a bare math expression, rendered in display mode.
    Math,
    /// ```` ```typst ````: a complete engine document, passed through as-is.
    Document,
}

impl FenceKind {
    /// Parse a fence language identifier.
    #[must_use]
    pub fn parse(lang: &str) -> Option<Self> {
        match lang {
            "math" => Some(Self::Math),
            "typst" => Some(Self::Document),
            _ => None,
        }
    }
}

/// Parsed fence meta options.
///
/// # Example
///
/// ```
/// use rw_math::FenceMeta;
///
/// let meta = FenceMeta::parse(r#"eval=false title="Euler""#);
/// assert!(!meta.eval());
/// assert_eq!(meta.get("title"), Some("Euler"));
/// assert!(FenceMeta::parse("").eval());
/// ```
#[derive(Debug, Default, PartialEq, Eq)]
pub struct FenceMeta {
    attrs: HashMap<String, String>,
}

impl FenceMeta {
    /// Parse `key=value` pairs separated by whitespace.
    ///
    /// Values may be bare, single-quoted or double-quoted. Tokens without `=`
    /// are ignored.
    #[must_use]
    pub fn parse(meta: &str) -> Self {
        let mut attrs = HashMap::new();
        let mut remaining = meta.trim();

        while !remaining.is_empty() {
            let Some(eq) = remaining.find('=') else {
                break;
            };
            let key_part = &remaining[..eq];
            // A bare token before the key is skipped.
            let key = key_part
                .rsplit(char::is_whitespace)
                .next()
                .unwrap_or_default();
            let rest = &remaining[eq + 1..];

            let (value, rest) = match rest.chars().next() {
                Some(quote @ ('"' | '\'')) => {
                    let body = &rest[1..];
                    match body.find(quote) {
                        Some(end) => (&body[..end], &body[end + 1..]),
                        None => (body, ""),
                    }
                }
                _ => {
                    let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
                    (&rest[..end], &rest[end..])
                }
            };

            if !key.is_empty() {
                attrs.insert(key.to_owned(), value.to_owned());
            }
            remaining = rest.trim_start();
        }

        Self { attrs }
    }

    /// Get an option value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    /// Whether the fence should be rendered (`eval`, default `true`).
    #[must_use]
    pub fn eval(&self) -> bool {
        match self.get("eval") {
            None | Some("true") => true,
            Some("false") => false,
            Some(other) => {
                tracing::warn!(value = other, "Unknown eval value in fence meta, using true");
                true
            }
        }
    }
}

/// Classify a code block as a typeset fence that should be rendered.
///
/// Returns `None` for other languages and for fences with `eval=false`.
#[must_use]
pub fn typeset_fence(code: &CodeBlock) -> Option<FenceKind> {
    let kind = FenceKind::parse(code.lang.as_deref()?)?;
    let eval = code
        .meta
        .as_deref()
        .is_none_or(|meta| FenceMeta::parse(meta).eval());
    eval.then_some(kind)
}
