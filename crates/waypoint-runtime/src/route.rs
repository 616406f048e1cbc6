#![forbid(unsafe_code)]

//! Application URL parsing and "is this route active" matching.
//!
//! URLs are app-relative: `/path;matrix=1/more?query=2#fragment`. A target
//! URL is active against the current one when
//!
//! - the paths are equal segment by segment,
//! - each segment carries exactly the same matrix parameters,
//! - every target query parameter is present in the current URL,
//! - the fragments are equal.

/// One path segment and its matrix parameters.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UrlSegment {
    pub path: String,
    pub params: Vec<(String, String)>,
}

impl UrlSegment {
    fn params_match(&self, other: &Self) -> bool {
        self.params.len() == other.params.len()
            && self.params.iter().all(|p| other.params.contains(p))
    }
}

/// A parsed application URL.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UrlTree {
    pub segments: Vec<UrlSegment>,
    pub query: Vec<(String, String)>,
    pub fragment: Option<String>,
}

fn split_pair(pair: &str) -> (String, String) {
    match pair.split_once('=') {
        Some((key, value)) => (key.to_owned(), value.to_owned()),
        None => (pair.to_owned(), String::new()),
    }
}

impl UrlTree {
    /// Parse an app-relative URL. Never fails; malformed pieces are kept
    /// verbatim.
    pub fn parse(url: &str) -> Self {
        let (rest, fragment) = match url.split_once('#') {
            Some((rest, fragment)) => (rest, Some(fragment.to_owned())),
            None => (url, None),
        };
        let (path, query) = rest.split_once('?').unwrap_or((rest, ""));

        let segments = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|raw| {
                let mut parts = raw.split(';');
                let path = parts.next().unwrap_or_default().to_owned();
                let params = parts.filter(|p| !p.is_empty()).map(split_pair).collect();
                UrlSegment { path, params }
            })
            .collect();

        let query = query
            .split('&')
            .filter(|p| !p.is_empty())
            .map(split_pair)
            .collect();

        Self {
            segments,
            query,
            fragment,
        }
    }

    /// Whether `target` is active given that `self` is the current URL.
    pub fn is_active(&self, target: &UrlTree) -> bool {
        self.segments.len() == target.segments.len()
            && self
                .segments
                .iter()
                .zip(&target.segments)
                .all(|(current, wanted)| current.path == wanted.path && current.params_match(wanted))
            && target.query.iter().all(|pair| self.query.contains(pair))
            && self.fragment == target.fragment
    }
}

/// Convenience over [`UrlTree::is_active`] for raw strings.
pub fn is_url_active(current: &str, target: &str) -> bool {
    UrlTree::parse(current).is_active(&UrlTree::parse(target))
}
