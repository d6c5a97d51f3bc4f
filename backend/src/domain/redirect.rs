//! Redirect-target sanitization and link parameter helpers.
//!
//! All link rewriting is plain query-parameter arithmetic on URLs; nothing
//! here inspects markup.

use url::Url;

use crate::domain::filter::GroupFilterParams;
use crate::domain::group::GroupRef;

/// Query parameters that must not survive a completed or rejected batch.
///
/// Stripping them from the return location is what makes reload and
/// back-navigation unable to re-trigger the mutation.
const TRANSIENT_PARAMS: &[&str] = &[
    "users",
    "users[]",
    "join_group",
    "leave_group",
    "replay_token",
    "joined",
    "left",
];

/// Base used to interpret relative return URLs. Only the path and query of
/// the result are emitted for those, so the base never leaks.
const RELATIVE_BASE: &str = "http://relative.invalid/";

/// A sanitized redirect target plus the paging continuation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    /// Where to send the caller.
    pub location: String,
    /// Page number the caller was on.
    pub page: u32,
}

impl Redirect {
    /// Build a redirect from a raw return URL, stripping one-time mutation
    /// markers.
    ///
    /// Unparseable input falls back to the bare path `/`, never a
    /// passthrough of the raw value.
    pub fn sanitized(return_url: &str, page: u32) -> Self {
        Self {
            location: sanitize_return_url(return_url),
            page,
        }
    }

    /// Append mutation tally notice parameters to the location.
    pub fn with_result_params(mut self, joined: u32, left: u32) -> Self {
        self.location = append_params(
            &self.location,
            &[("joined", joined.to_string()), ("left", left.to_string())],
        );
        self
    }
}

/// Strip transient mutation parameters from a return URL.
///
/// Relative URLs are supported; for those only path and query are
/// returned. Anything unparseable degrades to `/`.
pub fn sanitize_return_url(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(url) => strip_transient(url).to_string(),
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(RELATIVE_BASE)
            .ok()
            .and_then(|base| base.join(raw).ok())
            .map_or_else(|| "/".to_owned(), |url| path_and_query(&strip_transient(url))),
        Err(_) => "/".to_owned(),
    }
}

/// Add the current group filter parameters to a link, so that filtered
/// views survive navigation. This is a pure URL transformation; clients
/// render the result themselves.
pub fn with_filter_params(raw: &str, params: &GroupFilterParams) -> String {
    let Some(group) = params.group() else {
        return raw.to_owned();
    };
    let mut pairs = vec![("group_id", group.to_raw().to_string())];
    if params.include_hierarchy() && matches!(group, GroupRef::Group(_)) {
        pairs.push(("include_hierarchy", "true".to_owned()));
    }
    append_params(raw, &pairs)
}

fn strip_transient(mut url: Url) -> Url {
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(name, _)| !TRANSIENT_PARAMS.contains(&name.as_ref()))
        .map(|(name, value)| (name.into_owned(), value.into_owned()))
        .collect();
    if kept.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(kept).finish();
    }
    url
}

fn path_and_query(url: &Url) -> String {
    match url.query() {
        Some(query) => format!("{}?{query}", url.path()),
        None => url.path().to_owned(),
    }
}

fn append_params<N: AsRef<str>, V: AsRef<str>>(raw: &str, pairs: &[(N, V)]) -> String {
    let absolute = Url::parse(raw);
    let (mut url, relative) = match absolute {
        Ok(url) => (url, false),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            match Url::parse(RELATIVE_BASE).ok().and_then(|b| b.join(raw).ok()) {
                Some(url) => (url, true),
                None => return raw.to_owned(),
            }
        }
        Err(_) => return raw.to_owned(),
    };
    url.query_pairs_mut()
        .extend_pairs(pairs.iter().map(|(n, v)| (n.as_ref(), v.as_ref())))
        .finish();
    if relative {
        path_and_query(&url)
    } else {
        url.to_string()
    }
}
