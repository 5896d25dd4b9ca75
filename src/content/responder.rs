use tracing::{debug, info, warn};

use crate::content::listing::DirectoryListing;
use crate::content::resolver::{PathKind, ResolvedPath, Sandbox};
use crate::http::request::{Method, RequestHead};
use crate::http::response::Response;

/// Builds the response for a parsed request.
///
/// Only GET reaches the filesystem. Every failure past this point is
/// answered with the fixed 400 page.
pub async fn respond(sandbox: &Sandbox, head: &RequestHead) -> Response {
    if let Method::Unsupported(token) = &head.method {
        debug!(method = %token, "unsupported method");
        return Response::bad_request();
    }

    let resolved = match sandbox.resolve(&head.target).await {
        Ok(resolved) => resolved,
        Err(e) => {
            warn!(uri = %head.target, "{}", e);
            return Response::bad_request();
        }
    };

    debug!(
        uri = %resolved.target,
        path = %resolved.absolute.display(),
        kind = ?resolved.kind,
        "resolved request target"
    );

    match resolved.kind {
        PathKind::File => respond_file(&resolved).await,
        PathKind::Directory => respond_directory(&resolved).await,
        PathKind::Missing | PathKind::Other => {
            info!(path = %resolved.absolute.display(), kind = ?resolved.kind, "nothing to serve");
            Response::bad_request()
        }
    }
}

async fn respond_file(resolved: &ResolvedPath) -> Response {
    match tokio::fs::read(&resolved.absolute).await {
        Ok(contents) => Response::ok(contents),
        Err(e) => {
            warn!(path = %resolved.absolute.display(), error = %e, "cannot read file");
            Response::bad_request()
        }
    }
}

async fn respond_directory(resolved: &ResolvedPath) -> Response {
    match DirectoryListing::build(&resolved.target, &resolved.absolute).await {
        Ok(listing) => {
            debug!(entries = listing.children().len(), "built directory listing");
            let title = resolved.absolute.to_string_lossy();
            Response::ok(listing.render(&title))
        }
        Err(e) => {
            warn!(path = %resolved.absolute.display(), error = %e, "cannot list directory");
            Response::bad_request()
        }
    }
}
