//! The object-key scheme binding the builder and the edge proxy.
//!
//! Both components run independently with no shared database, so the only
//! coordination point is agreement on the canonical key format:
//! `builds/<project>/<relative_path>`, forward slashes, case-sensitive.

use crate::project::ProjectId;
use crate::{BUILDS_PREFIX, INDEX_DOCUMENT};
use std::path::Path;

/// Compute the object key the builder publishes a file under.
///
/// `relative` is the file's path relative to the build output root. Host
/// path separators are normalized to `/`; components like `..` or a root
/// prefix are rejected so a hostile output tree cannot write outside the
/// project prefix.
pub fn artifact_key(project: &ProjectId, relative: &Path) -> crate::Result<String> {
    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            std::path::Component::Normal(part) => {
                let part = part.to_str().ok_or_else(|| {
                    crate::Error::InvalidRelativePath(format!(
                        "non-unicode path component in {relative:?}"
                    ))
                })?;
                parts.push(part);
            }
            _ => {
                return Err(crate::Error::InvalidRelativePath(format!(
                    "unsafe path component in {relative:?}"
                )));
            }
        }
    }
    if parts.is_empty() {
        return Err(crate::Error::InvalidRelativePath(
            "relative path is empty".to_string(),
        ));
    }
    Ok(format!("{BUILDS_PREFIX}/{project}/{}", parts.join("/")))
}

/// Compute the object key the proxy looks up for an incoming request path.
///
/// A request for exactly `/` is rewritten to the index document. All other
/// paths pass through unchanged, including extensionless ones: `/about`
/// looks up the literal key `about`, never `about.html`.
pub fn request_key(project: &ProjectId, path: &str) -> String {
    let effective = if path == "/" {
        INDEX_DOCUMENT
    } else {
        path.trim_start_matches('/')
    };
    format!("{BUILDS_PREFIX}/{project}/{effective}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn project(id: &str) -> ProjectId {
        ProjectId::new(id).unwrap()
    }

    #[test]
    fn artifact_key_uses_forward_slashes() {
        let key = artifact_key(&project("acme"), &PathBuf::from("js").join("app.js")).unwrap();
        assert_eq!(key, "builds/acme/js/app.js");
    }

    #[test]
    fn artifact_key_rejects_traversal() {
        assert!(artifact_key(&project("acme"), Path::new("../escape")).is_err());
        assert!(artifact_key(&project("acme"), Path::new("/abs/path")).is_err());
        assert!(artifact_key(&project("acme"), Path::new("")).is_err());
    }

    #[test]
    fn root_rewrites_to_index_document() {
        assert_eq!(request_key(&project("acme"), "/"), "builds/acme/index.html");
    }

    #[test]
    fn non_root_paths_pass_through_unchanged() {
        assert_eq!(request_key(&project("acme"), "/about"), "builds/acme/about");
        assert_eq!(
            request_key(&project("acme"), "/js/app.js"),
            "builds/acme/js/app.js"
        );
    }

    #[test]
    fn builder_and_proxy_agree_on_keys() {
        // The contract the whole system hangs on: publish and lookup
        // produce byte-identical keys for the same relative path.
        let p = project("acme");
        for rel in ["index.html", "js/app.js", "assets/logo.svg"] {
            let published = artifact_key(&p, Path::new(rel)).unwrap();
            let requested = request_key(&p, &format!("/{rel}"));
            assert_eq!(published, requested);
        }
    }
}
