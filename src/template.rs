//! Filename templates
//!
//! A template is a plain string with `{placeholder}` markers:
//!
//! | placeholder | value |
//! |-------------|-------|
//! | `{url}` | address without scheme, made filesystem safe |
//! | `{stub}` | path after the host, made filesystem safe; `home` for the root |
//! | `{width}`, `{height}`, `{quality}` | resolved numbers |
//! | `{full}`, `{fit}` | `full` for full-page shots, `fit` otherwise |
//!
//! Unknown placeholders are left as written. Substituted values are never
//! expanded again.

use url::Url;

/// Marker that turns an explicit name into a one-off template.
pub const PLACEHOLDER_OPEN: char = '{';

const SEPARATOR: char = '-';

/// Values a template can refer to.
#[derive(Debug, Clone, Copy)]
pub struct TemplateFields<'a> {
    pub url: &'a str,
    pub width: u32,
    pub height: u32,
    pub quality: u8,
    pub full_page: bool,
}

/// Whether a name should be rendered as a template rather than used literally.
pub fn is_template(name: &str) -> bool {
    name.contains(PLACEHOLDER_OPEN)
}

/// Render `template` in a single left-to-right pass.
///
/// ```
/// use pageshots::template::{render, TemplateFields};
/// let fields = TemplateFields { url: "https://x.com/a", width: 800, height: 600, quality: 90, full_page: false };
/// assert_eq!(render("{url}-{width}-{fit}-{nope}", &fields), "x-com-a-800-fit-{nope}");
/// ```
pub fn render(template: &str, fields: &TemplateFields<'_>) -> String {
    let mut out = String::with_capacity(template.len() + 16);
    let mut rest = template;

    while let Some(open) = rest.find(PLACEHOLDER_OPEN) {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            out.push_str(&rest[open..]);
            return out;
        };
        let key = &after[..close];
        if key.contains(PLACEHOLDER_OPEN) {
            // `{{url}}`: emit the stray brace and retry from the inner one
            out.push(PLACEHOLDER_OPEN);
            rest = after;
            continue;
        }
        match expand(key, fields) {
            Some(value) => out.push_str(&value),
            None => {
                out.push(PLACEHOLDER_OPEN);
                out.push_str(key);
                out.push('}');
            }
        }
        rest = &after[close + 1..];
    }
    out.push_str(rest);
    out
}

fn expand(key: &str, fields: &TemplateFields<'_>) -> Option<String> {
    let value = match key {
        "url" => url_slug(fields.url),
        "stub" => stub(fields.url),
        "width" => fields.width.to_string(),
        "height" => fields.height.to_string(),
        "quality" => fields.quality.to_string(),
        "full" | "fit" => mode_label(fields.full_page).to_string(),
        _ => return None,
    };
    Some(value)
}

fn mode_label(full_page: bool) -> &'static str {
    if full_page {
        "full"
    } else {
        "fit"
    }
}

/// Address with its scheme removed, reduced to a safe filename fragment.
pub fn url_slug(address: &str) -> String {
    sanitize(strip_scheme(address))
}

/// Path portion of the address, reduced to a safe filename fragment.
pub fn stub(address: &str) -> String {
    let path = match Url::parse(address) {
        Ok(url) => url.path().to_string(),
        Err(_) => {
            let rest = strip_scheme(address);
            rest.find('/').map(|i| rest[i..].to_string()).unwrap_or_default()
        }
    };
    let slug = sanitize(&path);
    if slug.is_empty() {
        "home".to_string()
    } else {
        slug
    }
}

/// Replace characters that are unsafe in filenames (and dots, so no spurious
/// extension appears) with `-`, collapse runs and trim the ends.
pub fn sanitize(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        let ch = if is_unsafe(ch) { SEPARATOR } else { ch };
        if ch == SEPARATOR && out.ends_with(SEPARATOR) {
            continue;
        }
        out.push(ch);
    }
    out.trim_matches(SEPARATOR).to_string()
}

fn is_unsafe(ch: char) -> bool {
    ch.is_control() || matches!(ch, '/' | '\\' | '?' | '<' | '>' | ':' | '*' | '|' | '"' | '.')
}

/// `scheme://rest` => `rest`; anything else is returned unchanged.
pub(crate) fn strip_scheme(address: &str) -> &str {
    match scheme_len(address) {
        Some(len) => &address[len..],
        None => address,
    }
}

/// Length of a leading `scheme://`, if the address has one.
pub(crate) fn scheme_len(address: &str) -> Option<usize> {
    let idx = address.find("://")?;
    let scheme = &address[..idx];
    let mut chars = scheme.chars();
    let first_ok = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    let rest_ok = chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    (first_ok && rest_ok).then_some(idx + 3)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(url: &str) -> TemplateFields<'_> {
        TemplateFields {
            url,
            width: 1000,
            height: 900,
            quality: 100,
            full_page: true,
        }
    }

    #[test]
    fn url_placeholder_strips_scheme_and_dots() {
        assert_eq!(url_slug("https://example.com"), "example-com");
        assert_eq!(url_slug("http://x.com/contact"), "x-com-contact");
        assert_eq!(url_slug("https://www.x.com//a..b/?q=1"), "www-x-com-a-b-q=1");
        assert_eq!(url_slug("https://x.com/"), "x-com");
    }

    #[test]
    fn stub_placeholder() {
        assert_eq!(stub("https://x.com"), "home");
        assert_eq!(stub("https://x.com/"), "home");
        assert_eq!(stub("https://x.com/about/team/"), "about-team");
        assert_eq!(stub("https://x.com/docs/index.html"), "docs-index-html");
    }

    #[test]
    fn renders_numeric_placeholders() {
        let name = render("{url}-{width}-{height}-{quality}", &fields("http://x.com/contact"));
        assert_eq!(name, "x-com-contact-1000-900-100");
    }

    #[test]
    fn full_and_fit_share_the_mode_label() {
        let mut f = fields("https://x.com");
        assert_eq!(render("{full}/{fit}", &f), "full/full");
        f.full_page = false;
        assert_eq!(render("{full}/{fit}", &f), "fit/fit");
    }

    #[test]
    fn unknown_and_unclosed_placeholders_are_verbatim() {
        let f = fields("https://x.com");
        assert_eq!(render("{nope}-{url}", &f), "{nope}-x-com");
        assert_eq!(render("shot-{url", &f), "shot-{url");
        assert_eq!(render("{{url}}", &f), "{x-com}");
    }

    #[test]
    fn substituted_values_are_not_expanded_again() {
        let f = fields("https://x.com/{width}");
        // the `{`/`}` survive sanitizing but are not re-read as a placeholder
        assert_eq!(render("{url}", &f), "x-com-{width}");
    }

    #[test]
    fn scheme_detection() {
        assert_eq!(scheme_len("https://x"), Some(8));
        assert_eq!(scheme_len("file:///tmp"), Some(7));
        assert_eq!(scheme_len("x.com/a://b"), None);
        assert_eq!(scheme_len("/p"), None);
    }
}
