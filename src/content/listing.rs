//! Directory listing pages.
//!
//! Children are listed in the order the filesystem enumerates them. That
//! order differs between platforms and may change between calls.

use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    File,
    Directory,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DirectoryEntry {
    pub name: String,
    pub kind: EntryKind,
    pub href: String,
}

/// `.` and `..` followed by the directory's children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryListing {
    pub entries: Vec<DirectoryEntry>,
}

/// Link for the `..` entry: the target minus its final `/` segment, or `/`
/// when that would leave nothing.
pub fn parent_href(target: &str) -> String {
    match target.rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(i) => target[..i].to_string(),
    }
}

/// Link for a child named `name` of the directory at `target`.
///
/// `target` is already in wire form; only the name gets percent-encoded.
pub fn child_href(target: &str, name: &str) -> String {
    if target == "/" {
        format!("/{}", UrlEncoded(name))
    } else {
        format!("{}/{}", target, UrlEncoded(name))
    }
}

impl DirectoryListing {
    /// Enumerates `dir`, linking every entry relative to `target`.
    pub async fn build(target: &str, dir: &Path) -> std::io::Result<Self> {
        let mut entries = vec![
            DirectoryEntry {
                name: ".".to_string(),
                kind: EntryKind::Directory,
                href: target.to_string(),
            },
            DirectoryEntry {
                name: "..".to_string(),
                kind: EntryKind::Directory,
                href: parent_href(target),
            },
        ];

        let mut read_dir = tokio::fs::read_dir(dir).await?;
        while let Some(entry) = read_dir.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name == "." || name == ".." {
                continue;
            }
            // file_type does not follow symlinks
            let kind = match entry.file_type().await {
                Ok(ft) if ft.is_dir() => EntryKind::Directory,
                _ => EntryKind::File,
            };
            let href = child_href(target, &name);
            entries.push(DirectoryEntry { name, kind, href });
        }

        Ok(Self { entries })
    }

    /// Children only, without the `.` and `..` links.
    pub fn children(&self) -> &[DirectoryEntry] {
        self.entries.get(2..).unwrap_or_default()
    }

    /// Wraps the listing in an HTML document titled `title`.
    pub fn render(&self, title: &str) -> String {
        format!(
            "<!DOCTYPE html><html><head><title>{}</title>\
            <meta http-equiv=\"Content-Type\" content=\"text/html; charset=utf-8\" />\
            </head><body>{}</body></html>",
            HtmlEscaped(title),
            Anchors(&self.entries),
        )
    }
}

struct Anchors<'a>(&'a [DirectoryEntry]);

impl fmt::Display for Anchors<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in self.0 {
            match entry.kind {
                EntryKind::Directory => write!(
                    f,
                    "<a href=\"{}\" style=\"color:red;\">{}</a><br/>",
                    HtmlEscaped(&entry.href),
                    HtmlEscaped(&entry.name)
                )?,
                EntryKind::File => write!(
                    f,
                    "<a href=\"{}\">{}</a><br/>",
                    HtmlEscaped(&entry.href),
                    HtmlEscaped(&entry.name)
                )?,
            }
        }
        Ok(())
    }
}

/// Percent-encodes everything but RFC 3986 unreserved characters.
pub struct UrlEncoded<'a>(pub &'a str);

impl fmt::Display for UrlEncoded<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in self.0.chars() {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '~') {
                write!(f, "{}", c)?;
            } else {
                let mut buf = [0; 4];
                for b in c.encode_utf8(&mut buf).as_bytes() {
                    write!(f, "%{:02X}", b)?;
                }
            }
        }
        Ok(())
    }
}

/// Escape < > & ' " into HTML entities.
pub struct HtmlEscaped<'a>(pub &'a str);

impl fmt::Display for HtmlEscaped<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in self.0.chars() {
            match c {
                '<' => f.write_str("&lt;")?,
                '>' => f.write_str("&gt;")?,
                '&' => f.write_str("&amp;")?,
                '\'' => f.write_str("&apos;")?,
                '"' => f.write_str("&quot;")?,
                c => write!(f, "{}", c)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parent_href_works() {
        assert_eq!(parent_href("/"), "/");
        assert_eq!(parent_href("/docs"), "/");
        assert_eq!(parent_href("/docs/img"), "/docs");
        assert_eq!(parent_href("/docs/"), "/docs");
    }

    #[test]
    fn child_href_avoids_double_slash_at_root() {
        assert_eq!(child_href("/", "a.txt"), "/a.txt");
        assert_eq!(child_href("/docs", "a.txt"), "/docs/a.txt");
    }

    #[test]
    fn child_href_percent_encodes_name() {
        assert_eq!(child_href("/", "a b.txt"), "/a%20b.txt");
        assert_eq!(child_href("/docs", "x#y"), "/docs/x%23y");
        assert_eq!(child_href("/docs", "crab\u{1F980}"), "/docs/crab%F0%9F%A6%80");
    }

    #[test]
    fn url_encoded_works() {
        assert_eq!(
            UrlEncoded("escape(this)name\tcrab\u{1F980}").to_string(),
            "escape%28this%29name%09crab%F0%9F%A6%80"
        );
    }

    #[test]
    fn html_escaped_works() {
        assert_eq!(
            HtmlEscaped("foo<>&'\"").to_string(),
            "foo&lt;&gt;&amp;&apos;&quot;"
        );
    }

    #[test]
    fn file_and_directory_anchors_differ() {
        let listing = DirectoryListing {
            entries: vec![
                DirectoryEntry {
                    name: "sub".into(),
                    kind: EntryKind::Directory,
                    href: "/sub".into(),
                },
                DirectoryEntry {
                    name: "f".into(),
                    kind: EntryKind::File,
                    href: "/f".into(),
                },
            ],
        };
        let html = listing.render("t");
        assert!(html.contains("<a href=\"/sub\" style=\"color:red;\">sub</a><br/>"));
        assert!(html.contains("<a href=\"/f\">f</a><br/>"));
    }
}
