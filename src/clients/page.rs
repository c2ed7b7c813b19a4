use anyhow::Result;
use regex::Regex;
use reqwest::Client;
use std::borrow::Cow;
use std::sync::OnceLock;
use tracing::debug;

/// Matches one element by tag name, class token, or both.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ElementMatcher {
    tag: Option<String>,
    class: Option<String>,
}

impl ElementMatcher {
    fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        let (tag, class) = match raw.split_once('.') {
            Some((tag, class)) => (tag, Some(class)),
            None => (raw, None),
        };

        let valid = |s: &str| {
            !s.is_empty()
                && s
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        };

        if !tag.is_empty() && !valid(tag) {
            anyhow::bail!("Invalid tag name in selector: '{raw}'");
        }
        if let Some(class) = class
            && !valid(class)
        {
            anyhow::bail!("Invalid class name in selector: '{raw}'");
        }
        if tag.is_empty() && class.is_none() {
            anyhow::bail!("Selector part cannot be empty");
        }

        Ok(Self {
            tag: (!tag.is_empty()).then(|| tag.to_ascii_lowercase()),
            class: class.map(str::to_string),
        })
    }

    fn matches(&self, tag: &str, attrs: &str) -> bool {
        if let Some(expected) = &self.tag
            && expected != tag
        {
            return false;
        }

        self.class.as_ref().is_none_or(|expected| {
            class_attribute(attrs).is_some_and(|classes| {
                classes.split_whitespace().any(|c| c == expected)
            })
        })
    }
}

/// A small structural selector: `[tag][.class]`, optionally followed by
/// `> child` where the child uses the same grammar.
///
/// `>` is a direct-child combinator. When a child is given, the text of the
/// first matching direct child of each parent is taken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentSelector {
    element: ElementMatcher,
    child: Option<ElementMatcher>,
}

impl FragmentSelector {
    pub fn parse(raw: &str) -> Result<Self> {
        let parts: Vec<&str> = raw.split('>').collect();
        match parts.as_slice() {
            [element] => Ok(Self {
                element: ElementMatcher::parse(element)?,
                child: None,
            }),
            [element, child] => Ok(Self {
                element: ElementMatcher::parse(element)?,
                child: Some(ElementMatcher::parse(child)?),
            }),
            _ => anyhow::bail!("Selector supports at most one '>' combinator: '{raw}'"),
        }
    }

    /// Plain-text fragments for every match in `html`, in document order.
    /// Comments and `<script>`/`<style>` bodies are ignored. Empty fragments
    /// are dropped.
    #[must_use]
    pub fn extract(&self, html: &str) -> Vec<String> {
        let visible = strip_hidden(html);

        matching_elements(&visible, &self.element, false)
            .into_iter()
            .filter_map(|inner| match &self.child {
                Some(child) => matching_elements(inner, child, true).into_iter().next(),
                None => Some(inner),
            })
            .map(to_text)
            .filter(|text| !text.is_empty())
            .collect()
    }
}

struct PageRegex {
    tag: Regex,
    class_attr: Regex,
    hidden: Regex,
}

impl PageRegex {
    fn get() -> Option<&'static Self> {
        static INSTANCE: OnceLock<Option<PageRegex>> = OnceLock::new();
        INSTANCE
            .get_or_init(|| {
                Some(Self {
                    // Quoted attribute values may contain '>'.
                    tag: Regex::new(
                        r#"<(/)?([A-Za-z][A-Za-z0-9-]*)((?:[^>"']|"[^"]*"|'[^']*')*)>"#,
                    )
                    .ok()?,
                    class_attr: Regex::new(
                        r#"(?i)\bclass\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#,
                    )
                    .ok()?,
                    hidden: Regex::new(
                        r"(?is)<!--.*?-->|<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>",
                    )
                    .ok()?,
                })
            })
            .as_ref()
    }
}

/// Elements that never take a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

fn strip_hidden(html: &str) -> Cow<'_, str> {
    PageRegex::get().map_or(Cow::Borrowed(html), |re| re.hidden.replace_all(html, ""))
}

fn class_attribute(attrs: &str) -> Option<&str> {
    let re = PageRegex::get()?;
    let caps = re.class_attr.captures(attrs)?;
    caps.get(1)
        .or_else(|| caps.get(2))
        .or_else(|| caps.get(3))
        .map(|m| m.as_str())
}

struct Tag<'a> {
    start: usize,
    end: usize,
    closing: bool,
    self_closing: bool,
    name: String,
    attrs: &'a str,
}

impl Tag<'_> {
    fn opens_element(&self) -> bool {
        !self.closing && !self.self_closing && !VOID_ELEMENTS.contains(&self.name.as_str())
    }
}

fn scan_tags(html: &str) -> Vec<Tag<'_>> {
    let Some(re) = PageRegex::get() else {
        return Vec::new();
    };

    re.tag
        .captures_iter(html)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let attrs = caps.get(3).map_or("", |m| m.as_str());
            Some(Tag {
                start: whole.start(),
                end: whole.end(),
                closing: caps.get(1).is_some(),
                self_closing: attrs.trim_end().ends_with('/'),
                name: caps.get(2)?.as_str().to_ascii_lowercase(),
                attrs,
            })
        })
        .collect()
}

/// Index of the tag closing the element opened at `open`, pairing nested
/// same-named tags.
fn closing_index(tags: &[Tag<'_>], open: usize) -> Option<usize> {
    let name = &tags[open].name;
    let mut depth = 0usize;
    for (j, tag) in tags.iter().enumerate().skip(open + 1) {
        if &tag.name != name || tag.self_closing {
            continue;
        }
        if !tag.closing {
            depth += 1;
        } else if depth == 0 {
            return Some(j);
        } else {
            depth -= 1;
        }
    }
    None
}

/// Inner markup of every element matching `matcher`. Scanning resumes after
/// each matched element, so matches nested inside a match are skipped.
///
/// With `direct_only`, only elements at the top level of `html` qualify.
/// Unclosed tags are tolerated: a closing tag pops back to its opener.
fn matching_elements<'a>(html: &'a str, matcher: &ElementMatcher, direct_only: bool) -> Vec<&'a str> {
    let tags = scan_tags(html);
    let mut found = Vec::new();
    let mut open_names: Vec<&str> = Vec::new();
    let mut i = 0;

    while i < tags.len() {
        let tag = &tags[i];

        if tag.closing {
            if let Some(pos) = open_names.iter().rposition(|name| *name == tag.name) {
                open_names.truncate(pos);
            }
            i += 1;
            continue;
        }

        let eligible = !direct_only || open_names.is_empty();
        if eligible
            && tag.opens_element()
            && matcher.matches(&tag.name, tag.attrs)
            && let Some(j) = closing_index(&tags, i)
        {
            found.push(&html[tag.end..tags[j].start]);
            i = j + 1;
            continue;
        }

        if tag.opens_element() {
            open_names.push(&tag.name);
        }
        i += 1;
    }

    found
}

fn to_text(inner_html: &str) -> String {
    let stripped = PageRegex::get().map_or_else(
        || inner_html.to_string(),
        |re| re.tag.replace_all(inner_html, " ").into_owned(),
    );
    let decoded = html_escape::decode_html_entities(&stripped);
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Fetches HTML pages for ingestion.
#[derive(Clone)]
pub struct PageClient {
    client: Client,
}

impl PageClient {
    #[must_use]
    pub const fn with_shared_client(client: Client) -> Self {
        Self { client }
    }

    /// GETs `url` and returns the body. Non-success statuses are errors.
    pub async fn fetch(&self, url: &str) -> Result<String> {
        debug!("Fetching page {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("{url} responded with status {status}");
        }

        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRONT_PAGE: &str = r#"
        <table>
          <tr class="athing">
            <td class="title"><span class="titleline"><a href="https://a.example">Rust 2024 &amp; beyond</a><span class="sitebit comhead"> (<a href="from?site=a.example"><span class="sitestr">a.example</span></a>)</span></span></td>
          </tr>
          <tr class="athing">
            <td class="title"><span class="titleline"><a href="https://b.example">Show HN:
                a   tiny <b>search</b> engine</a></span></td>
          </tr>
          <tr><td class="subtext"><a href="item?id=1">12 comments</a></td></tr>
        </table>
    "#;

    #[test]
    fn test_parse_selector() {
        assert!(FragmentSelector::parse(".titleline > a").is_ok());
        assert!(FragmentSelector::parse("span.titleline").is_ok());
        assert!(FragmentSelector::parse("a").is_ok());
        assert!(FragmentSelector::parse("").is_err());
        assert!(FragmentSelector::parse(".a > b > c").is_err());
        assert!(FragmentSelector::parse(".bad class").is_err());
        assert!(FragmentSelector::parse(" > a").is_err());
    }

    #[test]
    fn test_extract_child_links() {
        let selector = FragmentSelector::parse(".titleline > a").unwrap();
        let fragments = selector.extract(FRONT_PAGE);
        assert_eq!(
            fragments,
            vec![
                "Rust 2024 & beyond".to_string(),
                "Show HN: a tiny search engine".to_string(),
            ]
        );
    }

    #[test]
    fn test_extract_pairs_nested_closing_tags() {
        let selector = FragmentSelector::parse("span.titleline").unwrap();
        let fragments = selector.extract(FRONT_PAGE);
        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[0], "Rust 2024 & beyond ( a.example )");
    }

    #[test]
    fn test_extract_class_token_match_only() {
        let html = r#"<div class="titleline-wide">no</div><div class='x titleline'>yes</div>"#;
        let selector = FragmentSelector::parse(".titleline").unwrap();
        assert_eq!(selector.extract(html), vec!["yes".to_string()]);
    }

    #[test]
    fn test_extract_no_matches() {
        let selector = FragmentSelector::parse(".storylink").unwrap();
        assert!(selector.extract(FRONT_PAGE).is_empty());
        assert!(selector.extract("").is_empty());
    }

    #[test]
    fn test_extract_ignores_comments_and_scripts() {
        let html = r#"
            <!-- <span class="titleline"><a>ghost</a></span> -->
            <script>var s = '<span class="titleline"><a>script</a></span>';</script>
            <style>.titleline > a { color: red }</style>
            <span class="titleline"><a href="x">real</a></span>
        "#;
        let selector = FragmentSelector::parse(".titleline > a").unwrap();
        assert_eq!(selector.extract(html), vec!["real".to_string()]);
    }

    #[test]
    fn test_extract_quoted_gt_in_attribute() {
        let html = r#"<span class="titleline"><a title="a > b" href="x">Real title</a></span>"#;
        let selector = FragmentSelector::parse(".titleline > a").unwrap();
        assert_eq!(selector.extract(html), vec!["Real title".to_string()]);
    }

    #[test]
    fn test_child_combinator_skips_grandchildren() {
        let html = r#"
            <span class="titleline"><span><a>site.example</a></span></span>
            <span class="titleline"><span>(<a>nested</a>)</span><a>direct</a></span>
        "#;
        let selector = FragmentSelector::parse(".titleline > a").unwrap();
        assert_eq!(selector.extract(html), vec!["direct".to_string()]);
    }

    #[test]
    fn test_child_combinator_after_void_element() {
        let html = r#"<span class="titleline"><img src="icon.png"><br><a>after void</a></span>"#;
        let selector = FragmentSelector::parse(".titleline > a").unwrap();
        assert_eq!(selector.extract(html), vec!["after void".to_string()]);
    }

    #[test]
    fn test_extract_drops_empty_fragments() {
        let html = r#"<span class="t"><a href="x"> </a></span><span class="t"><a>ok</a></span>"#;
        let selector = FragmentSelector::parse(".t > a").unwrap();
        assert_eq!(selector.extract(html), vec!["ok".to_string()]);
    }
}
