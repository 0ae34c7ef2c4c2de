//! Upstream URL rewriting.
//!
//! Only `scheme://authority` of the request URL is replaced. The path and
//! query are copied byte for byte: no dot-segment removal, no percent
//! encoding or decoding, no re-ordering.

use url::Url;

use crate::error::DispatchError;

/// Replace the scheme, host and port of `original_url` with `selected_base_url`.
///
/// The path is always kept. The query is appended only when it is non-empty
/// and the fragment is dropped. Relative request URLs (`/orders?id=1`) are
/// taken as path and query as they stand.
pub fn rewrite(selected_base_url: &str, original_url: &str) -> Result<String, DispatchError> {
    let target = request_target(original_url)?;
    let target = match target.find('#') {
        Some(fragment) => &target[..fragment],
        None => target,
    };
    let (path, query) = match target.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (target, None),
    };

    let base = selected_base_url.trim_end_matches('/');
    let mut rewritten = String::with_capacity(base.len() + target.len() + 1);
    rewritten.push_str(base);
    if !path.is_empty() && !path.starts_with('/') {
        rewritten.push('/');
    }
    rewritten.push_str(path);
    if let Some(query) = query.filter(|q| !q.is_empty()) {
        rewritten.push('?');
        rewritten.push_str(query);
    }
    Ok(rewritten)
}

/// The part of `original_url` after `scheme://authority`, or all of it when
/// it carries no scheme. The authority is checked but never rewritten.
fn request_target(original_url: &str) -> Result<&str, DispatchError> {
    let Some((scheme, rest)) = original_url.split_once("://") else {
        return Ok(original_url);
    };
    if !is_scheme(scheme) {
        return Ok(original_url);
    }

    let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    Url::parse(&original_url[..scheme.len() + 3 + end]).map_err(|e| DispatchError::InvalidUrl {
        url: original_url.to_string(),
        reason: e.to_string(),
    })?;
    Ok(&rest[end..])
}

fn is_scheme(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}
