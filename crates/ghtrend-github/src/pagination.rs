//! GitHub page-number pagination via the `Link` response header.
//!
//! Search responses carry links to adjacent pages; the next page number is
//! the `page` query parameter of the `rel="next"` link:
//!
//! ```text
//! <https://api.github.com/search/repositories?q=stars%3A%3E1000&page=2>; rel="next",
//! <https://api.github.com/search/repositories?q=stars%3A%3E1000&page=10>; rel="last"
//! ```
//!
//! The search API stops at 1000 results, so the last page never links onward
//! even when `total_count` is larger.

/// Extracts the page number of the `rel="next"` link, if any.
///
/// Returns `None` when the header is absent, has no next relation, or the
/// next URL carries no numeric `page` parameter.
#[must_use]
pub fn extract_next_page(link_header: Option<&str>) -> Option<u32> {
    let header = link_header?;

    header
        .split(',')
        .map(str::trim)
        .find(|segment| segment.contains(r#"rel="next""#))
        .and_then(extract_angle_bracket_url)
        .and_then(|url| extract_query_param(url, "page"))
        .and_then(|page| page.parse().ok())
}

fn extract_angle_bracket_url(segment: &str) -> Option<&str> {
    let start = segment.find('<')? + 1;
    let end = segment.find('>')?;
    if start >= end {
        return None;
    }
    Some(&segment[start..end])
}

fn extract_query_param<'a>(url: &'a str, param: &str) -> Option<&'a str> {
    let query = &url[url.find('?')? + 1..];
    let query = query.split('#').next().unwrap_or(query);

    query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        (key == param && !value.is_empty()).then_some(value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_none_without_header() {
        assert!(extract_next_page(None).is_none());
        assert!(extract_next_page(Some("")).is_none());
    }

    #[test]
    fn extracts_next_from_next_and_last() {
        let header = concat!(
            r#"<https://api.github.com/search/repositories?q=stars%3A%3E1000&per_page=100&page=2>; rel="next", "#,
            r#"<https://api.github.com/search/repositories?q=stars%3A%3E1000&per_page=100&page=10>; rel="last""#
        );
        assert_eq!(extract_next_page(Some(header)), Some(2));
    }

    #[test]
    fn extracts_next_when_prev_comes_first() {
        let header = concat!(
            r#"<https://api.github.com/search/repositories?page=3&q=x>; rel="prev", "#,
            r#"<https://api.github.com/search/repositories?page=5&q=x>; rel="next""#
        );
        assert_eq!(extract_next_page(Some(header)), Some(5));
    }

    #[test]
    fn last_page_has_no_next() {
        let header = concat!(
            r#"<https://api.github.com/search/repositories?q=x&page=1>; rel="first", "#,
            r#"<https://api.github.com/search/repositories?q=x&page=9>; rel="prev""#
        );
        assert!(extract_next_page(Some(header)).is_none());
    }

    #[test]
    fn per_page_is_not_mistaken_for_page() {
        let header = r#"<https://api.github.com/search/repositories?per_page=100>; rel="next""#;
        assert!(extract_next_page(Some(header)).is_none());
    }

    #[test]
    fn non_numeric_page_is_ignored() {
        let header = r#"<https://api.github.com/search/repositories?page=abc>; rel="next""#;
        assert!(extract_next_page(Some(header)).is_none());
    }
}
