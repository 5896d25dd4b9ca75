use std::fs;

use tempfile::{TempDir, tempdir};
use warden::content::{PathKind, ResolveError, Sandbox};

fn sandbox_with_files() -> (TempDir, Sandbox) {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("docs/img")).unwrap();
    fs::write(dir.path().join("index.html"), "<h1>hi</h1>").unwrap();
    fs::write(dir.path().join("docs/readme.txt"), "read me").unwrap();
    let sandbox = Sandbox::new(dir.path()).unwrap();
    (dir, sandbox)
}

#[test]
fn test_sandbox_root_is_canonical() {
    let (dir, sandbox) = sandbox_with_files();
    assert_eq!(sandbox.root(), fs::canonicalize(dir.path()).unwrap());
}

#[test]
fn test_sandbox_missing_root() {
    let dir = tempdir().unwrap();
    assert!(Sandbox::new(dir.path().join("nope")).is_err());
}

#[tokio::test]
async fn test_resolve_root_directory() {
    let (_dir, sandbox) = sandbox_with_files();
    let resolved = sandbox.resolve("/").await.unwrap();

    assert_eq!(resolved.kind, PathKind::Directory);
    assert_eq!(resolved.target, "/");
    assert_eq!(resolved.relative, "");
    assert_eq!(resolved.absolute, sandbox.root());
}

#[tokio::test]
async fn test_resolve_file() {
    let (_dir, sandbox) = sandbox_with_files();
    let resolved = sandbox.resolve("/docs/readme.txt").await.unwrap();

    assert_eq!(resolved.kind, PathKind::File);
    assert_eq!(resolved.relative, "docs/readme.txt");
    assert_eq!(resolved.absolute, sandbox.root().join("docs/readme.txt"));
}

#[tokio::test]
async fn test_resolve_nested_directory() {
    let (_dir, sandbox) = sandbox_with_files();
    let resolved = sandbox.resolve("/docs/img").await.unwrap();

    assert_eq!(resolved.kind, PathKind::Directory);
}

#[tokio::test]
async fn test_resolve_missing() {
    let (_dir, sandbox) = sandbox_with_files();
    let resolved = sandbox.resolve("/missing-file").await.unwrap();

    assert_eq!(resolved.kind, PathKind::Missing);
    assert!(resolved.absolute.starts_with(sandbox.root()));
}

#[tokio::test]
async fn test_resolve_dot_segments_inside_root() {
    let (_dir, sandbox) = sandbox_with_files();
    let resolved = sandbox.resolve("/docs/img/../readme.txt").await.unwrap();

    assert_eq!(resolved.kind, PathKind::File);
    assert_eq!(resolved.target, "/docs/img/../readme.txt");
    assert_eq!(resolved.relative, "docs/readme.txt");
}

#[tokio::test]
async fn test_resolve_rejects_traversal() {
    let (_dir, sandbox) = sandbox_with_files();

    for target in ["/..", "/../", "/../etc/passwd", "/docs/../../secret", "/a/b/../../../c"] {
        let err = sandbox.resolve(target).await.unwrap_err();
        assert_eq!(
            err,
            ResolveError::Escape {
                target: target.to_string()
            }
        );
    }
}

#[cfg(unix)]
#[tokio::test]
async fn test_resolve_rejects_symlink_out_of_root() {
    let outside = tempdir().unwrap();
    fs::write(outside.path().join("secret.txt"), "top secret").unwrap();

    let (dir, sandbox) = sandbox_with_files();
    std::os::unix::fs::symlink(outside.path(), dir.path().join("escape")).unwrap();

    let err = sandbox.resolve("/escape/secret.txt").await.unwrap_err();
    assert!(matches!(err, ResolveError::Escape { .. }));
}

#[cfg(unix)]
#[tokio::test]
async fn test_resolve_symlink_within_root() {
    let (dir, sandbox) = sandbox_with_files();
    std::os::unix::fs::symlink(dir.path().join("docs"), dir.path().join("alias")).unwrap();

    let resolved = sandbox.resolve("/alias/readme.txt").await.unwrap();
    assert_eq!(resolved.kind, PathKind::File);
    assert_eq!(resolved.absolute, sandbox.root().join("docs/readme.txt"));
}

#[cfg(unix)]
#[tokio::test]
async fn test_resolve_symlink_loop_is_other() {
    let (dir, sandbox) = sandbox_with_files();
    std::os::unix::fs::symlink(dir.path().join("loop"), dir.path().join("loop")).unwrap();

    let resolved = sandbox.resolve("/loop").await.unwrap();
    assert_eq!(resolved.kind, PathKind::Other);
}

#[cfg(unix)]
#[tokio::test]
async fn test_resolve_socket_is_other() {
    let (dir, sandbox) = sandbox_with_files();
    let _socket = std::os::unix::net::UnixListener::bind(dir.path().join("sock")).unwrap();

    let resolved = sandbox.resolve("/sock").await.unwrap();
    assert_eq!(resolved.kind, PathKind::Other);
}

#[tokio::test]
async fn test_resolve_percent_encoded_name() {
    let (dir, sandbox) = sandbox_with_files();
    fs::write(dir.path().join("docs/a b.txt"), "spaced").unwrap();

    let resolved = sandbox.resolve("/docs/a%20b.txt").await.unwrap();

    assert_eq!(resolved.kind, PathKind::File);
    assert_eq!(resolved.target, "/docs/a%20b.txt");
    assert_eq!(resolved.relative, "docs/a b.txt");
}

#[tokio::test]
async fn test_resolve_rejects_encoded_traversal() {
    let (_dir, sandbox) = sandbox_with_files();

    for target in ["/%2e%2e/etc/passwd", "/docs/%2E%2E/%2e%2e/secret", "/..%2fsecret"] {
        let err = sandbox.resolve(target).await.unwrap_err();
        assert!(matches!(err, ResolveError::Escape { .. }), "target {}", target);
    }
}
