use crate::types::IdentityTriple;

/// Parse a navigation route into an identity triple.
///
/// Supported patterns:
/// - `/<workspace>/projects/<project>/cycles/<cycle>`
/// - the same path behind `https://<host>` or `http://<host>`
///
/// Trailing segments after the cycle id are ignored. Query strings
/// (`?peekIssueId=..`) and fragments are stripped before parsing. A route
/// that stops early (`/<workspace>/projects/<project>/cycles`) yields a triple
/// with the missing members absent; that is a valid, not-yet-ready identity.
///
/// Returns `None` for paths that are not workspace routes at all.
pub fn parse_route(route: &str) -> Option<IdentityTriple> {
    let path = match route
        .strip_prefix("https://")
        .or_else(|| route.strip_prefix("http://"))
    {
        Some(after_scheme) => after_scheme.split_once('/').map_or("", |(_, p)| p),
        None => route,
    };

    // Strip query string and fragment before splitting into segments.
    let path = path.split_once('?').map_or(path, |(p, _)| p);
    let path = path.split_once('#').map_or(path, |(p, _)| p);

    let mut segments = path.split('/').filter(|s| !s.is_empty());
    let workspace = segments.next()?;

    let mut triple = IdentityTriple {
        workspace: Some(workspace.to_owned()),
        project: None,
        cycle: None,
    };
    match segments.next() {
        None => return Some(triple),
        Some("projects") => {}
        Some(_) => return None,
    }
    triple.project = segments.next().map(str::to_owned);
    match segments.next() {
        None | Some("cycles") => {}
        Some(_) => return None,
    }
    triple.cycle = segments.next().map(str::to_owned);
    Some(triple)
}
