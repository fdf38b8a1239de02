use crate::error::ExportError;
use url::Url;

/// Name of the response header that carries pagination directives
pub const LINK_HEADER: &str = "Link";

/// Determines the last page index from the first page's `Link` header.
///
/// A missing header means the collection fits in a single page. A present header
/// must contain a `rel="last"` directive with a positive numeric `page` query
/// parameter; anything else is reported instead of silently truncating the fetch.
pub fn resolve_last_page(link_header: Option<&str>) -> Result<u32, ExportError> {
    let Some(header) = link_header else {
        return Ok(1);
    };

    let failed = |reason: &str| ExportError::PaginationParseFailed {
        header: header.to_string(),
        reason: reason.to_string(),
    };

    let last_url = header
        .split(',')
        .filter_map(parse_directive)
        .find(|directive| directive.has_relation("last"))
        .map(|directive| directive.url)
        .ok_or_else(|| failed("no directive with rel=\"last\""))?;

    let base = Url::parse("http://localhost/").map_err(|e| failed(&e.to_string()))?;
    let parsed = base
        .join(last_url)
        .map_err(|e| failed(&format!("invalid URL `{last_url}`: {e}")))?;

    let page = parsed
        .query_pairs()
        .find(|(key, _)| key == "page")
        .map(|(_, value)| value.into_owned())
        .ok_or_else(|| failed("last-page URL has no `page` parameter"))?;

    match page.trim().parse::<u32>() {
        Ok(0) => Err(failed("`page` parameter must be at least 1")),
        Ok(last_page) => Ok(last_page),
        Err(_) => Err(failed(&format!("`page` parameter `{page}` is not a number"))),
    }
}

/// One `<URL>; key="value"; ...` entry of a Link header
#[derive(Debug, PartialEq)]
struct LinkDirective<'a> {
    url: &'a str,
    params: Vec<(&'a str, &'a str)>,
}

impl LinkDirective<'_> {
    fn has_relation(&self, relation: &str) -> bool {
        self.params
            .iter()
            .filter(|(key, _)| key.eq_ignore_ascii_case("rel"))
            .any(|(_, value)| value.split_whitespace().any(|rel| rel == relation))
    }
}

/// Parses one directive; returns None for fragments without a `<URL>` target
fn parse_directive(raw: &str) -> Option<LinkDirective<'_>> {
    let mut parts = raw.split(';');
    let target = parts.next()?.trim();
    let url = target.strip_prefix('<')?.strip_suffix('>')?.trim();

    let params = parts
        .filter_map(|param| {
            let (key, value) = param.split_once('=')?;
            Some((key.trim(), value.trim().trim_matches('"')))
        })
        .collect();

    Some(LinkDirective { url, params })
}
