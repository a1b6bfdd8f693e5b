//! URI ↔ filesystem path conversion and normalization utilities.
//!
//! This crate provides consistent URI handling for the GSX language server ecosystem,
//! including:
//!
//! - Converting between `file://` URIs and filesystem paths
//! - Windows drive-letter normalization
//! - Percent encoding/decoding
//! - Special scheme handling (`untitled:`, etc.)
//!
//! # Platform Support
//!
//! Most functions are not available on `wasm32` targets since they require
//! filesystem access.
//!
//! # Examples
//!
//! ```
//! # #[cfg(not(target_arch = "wasm32"))]
//! # fn main() {
//! use gsx_uri::{uri_to_fs_path, fs_path_to_uri};
//!
//! // Convert a URI to a path
//! let path = uri_to_fs_path("file:///tmp/test.gsx");
//! assert!(path.is_some());
//!
//! // Convert a path to a URI
//! let uri = fs_path_to_uri("/tmp/test.gsx");
//! assert!(uri.is_ok());
//! # }
//! # #[cfg(target_arch = "wasm32")]
//! # fn main() {}
//! ```

use url::Url;

/// Suffix appended to a `.gsx` URI's stem to name its in-memory virtual host
/// file (never written to disk).
const VIRTUAL_SUFFIX: &str = "_gsx_generated.go";

/// Suffix appended to a `.gsx` URI's stem to name the on-disk generated host
/// file produced by the external code generator.
const DISK_SUFFIX: &str = "_gsx.go";

/// Convert a DSL URI (`path/name.gsx`) to its virtual host-file URI
/// (`path/name_gsx_generated.go`), per the naming convention in §4.F/§6.
///
/// Returns `None` if `uri` does not end in `.gsx`.
///
/// # Examples
///
/// ```
/// use gsx_uri::dsl_to_virtual_uri;
///
/// assert_eq!(
///     dsl_to_virtual_uri("file:///app/pages/home.gsx"),
///     Some("file:///app/pages/home_gsx_generated.go".to_string())
/// );
/// assert_eq!(dsl_to_virtual_uri("file:///app/pages/home.go"), None);
/// ```
pub fn dsl_to_virtual_uri(uri: &str) -> Option<String> {
    let stem = uri.strip_suffix(".gsx")?;
    Some(format!("{stem}{VIRTUAL_SUFFIX}"))
}

/// Convert a DSL URI to the on-disk generated host-file URI
/// (`path/name_gsx.go`) produced by the external code generator.
///
/// # Examples
///
/// ```
/// use gsx_uri::dsl_to_disk_uri;
///
/// assert_eq!(
///     dsl_to_disk_uri("file:///app/pages/home.gsx"),
///     Some("file:///app/pages/home_gsx.go".to_string())
/// );
/// ```
pub fn dsl_to_disk_uri(uri: &str) -> Option<String> {
    let stem = uri.strip_suffix(".gsx")?;
    Some(format!("{stem}{DISK_SUFFIX}"))
}

/// Classification of a host-language-server URI relative to the DSL↔host
/// naming convention, used by the proxy to decide how to translate or
/// filter incoming diagnostics (§4.F, §4.G).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostUriKind {
    /// `path/name_gsx_generated.go` — the in-memory virtual file opened
    /// against the host-language server. Diagnostics on this URI are
    /// dropped; they duplicate the disk-generated file's diagnostics.
    Virtual,
    /// `path/name_gsx.go` — the real, on-disk generated host file.
    /// Diagnostics on this URI are translated back to the DSL source map.
    Disk,
    /// Anything else (an external host-language file the host server
    /// opened on its own, unrelated to a GSX document).
    Other,
}

/// Classify a host-language-server URI by suffix (§4.F, §6).
///
/// Reverse translation is by suffix match, exactly as a forward-looking
/// code generator would expect: we never need to know which DSL file
/// produced a given host URI ahead of time, only recognize the shape.
///
/// # Examples
///
/// ```
/// use gsx_uri::{classify_host_uri, HostUriKind};
///
/// assert_eq!(
///     classify_host_uri("file:///app/pages/home_gsx_generated.go"),
///     HostUriKind::Virtual
/// );
/// assert_eq!(classify_host_uri("file:///app/pages/home_gsx.go"), HostUriKind::Disk);
/// assert_eq!(classify_host_uri("file:///app/other.go"), HostUriKind::Other);
/// ```
pub fn classify_host_uri(uri: &str) -> HostUriKind {
    if uri.ends_with(VIRTUAL_SUFFIX) {
        HostUriKind::Virtual
    } else if uri.ends_with(DISK_SUFFIX) {
        HostUriKind::Disk
    } else {
        HostUriKind::Other
    }
}

/// Recover the DSL URI (`path/name.gsx`) from a virtual or disk host-file
/// URI, by stripping whichever suffix matches. Returns `None` for
/// [`HostUriKind::Other`].
///
/// # Examples
///
/// ```
/// use gsx_uri::host_uri_to_dsl_uri;
///
/// assert_eq!(
///     host_uri_to_dsl_uri("file:///app/pages/home_gsx_generated.go"),
///     Some("file:///app/pages/home.gsx".to_string())
/// );
/// assert_eq!(
///     host_uri_to_dsl_uri("file:///app/pages/home_gsx.go"),
///     Some("file:///app/pages/home.gsx".to_string())
/// );
/// assert_eq!(host_uri_to_dsl_uri("file:///app/other.go"), None);
/// ```
pub fn host_uri_to_dsl_uri(uri: &str) -> Option<String> {
    if let Some(stem) = uri.strip_suffix(VIRTUAL_SUFFIX) {
        Some(format!("{stem}.gsx"))
    } else if let Some(stem) = uri.strip_suffix(DISK_SUFFIX) {
        Some(format!("{stem}.gsx"))
    } else {
        None
    }
}

/// Convert a `file://` URI to a filesystem path.
///
/// Properly handles percent-encoding and works with spaces, Windows paths,
/// and non-ASCII characters. Returns `None` if the URI is not a valid `file://` URI.
///
/// # Examples
///
/// ```
/// # #[cfg(not(target_arch = "wasm32"))]
/// # fn main() {
/// use gsx_uri::uri_to_fs_path;
///
/// // Basic file URI
/// let path = uri_to_fs_path("file:///tmp/test.gsx");
/// assert!(path.is_some());
///
/// // URI with percent-encoded spaces
/// let path = uri_to_fs_path("file:///tmp/path%20with%20spaces/test.gsx");
/// assert!(path.is_some());
///
/// // Non-file URIs return None
/// let path = uri_to_fs_path("https://example.com");
/// assert!(path.is_none());
/// # }
/// # #[cfg(target_arch = "wasm32")]
/// # fn main() {}
/// ```
///
/// # Platform Support
///
/// This function is not available on `wasm32` targets (no filesystem).
#[cfg(not(target_arch = "wasm32"))]
pub fn uri_to_fs_path(uri: &str) -> Option<std::path::PathBuf> {
    // Parse the URI
    let url = Url::parse(uri).ok()?;

    // Only handle file:// URIs
    if url.scheme() != "file" {
        return None;
    }

    // Convert to filesystem path using the url crate's built-in method
    url.to_file_path().ok()
}

/// Convert a filesystem path to a `file://` URI.
///
/// Properly handles percent-encoding and works with spaces, Windows paths,
/// and non-ASCII characters.
///
/// # Examples
///
/// ```
/// # #[cfg(not(target_arch = "wasm32"))]
/// # fn main() {
/// use gsx_uri::fs_path_to_uri;
///
/// // Absolute path
/// let uri = fs_path_to_uri("/tmp/test.gsx").unwrap();
/// assert!(uri.starts_with("file:///"));
///
/// // Path with spaces gets percent-encoded
/// let uri = fs_path_to_uri("/tmp/path with spaces/test.gsx").unwrap();
/// assert!(uri.contains("%20"));
/// # }
/// # #[cfg(target_arch = "wasm32")]
/// # fn main() {}
/// ```
///
/// # Errors
///
/// Returns an error if the path cannot be converted to an absolute path
/// or if the conversion to a URI fails.
///
/// # Platform Support
///
/// This function is not available on `wasm32` targets (no filesystem).
#[cfg(not(target_arch = "wasm32"))]
pub fn fs_path_to_uri<P: AsRef<std::path::Path>>(path: P) -> Result<String, String> {
    let path = path.as_ref();

    // Convert to absolute path if relative
    let abs_path = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|e| format!("Failed to get current directory: {}", e))?
            .join(path)
    };

    // Use the url crate's built-in method to create a proper file:// URI
    Url::from_file_path(&abs_path)
        .map(|url| url.to_string())
        .map_err(|_| format!("Failed to convert path to URI: {}", abs_path.display()))
}

/// Normalize a URI to a consistent form.
///
/// This function handles various URI formats and normalizes them:
/// - Valid URIs are parsed and re-serialized
/// - File paths are converted to `file://` URIs
/// - Malformed `file://` URIs are reconstructed
/// - Special URIs (e.g., `untitled:`) are preserved as-is
///
/// # Examples
///
/// ```
/// # #[cfg(not(target_arch = "wasm32"))]
/// # fn main() {
/// use gsx_uri::normalize_uri;
///
/// // Already valid URI
/// let uri = normalize_uri("file:///tmp/test.gsx");
/// assert_eq!(uri, "file:///tmp/test.gsx");
///
/// // Special schemes preserved
/// let uri = normalize_uri("untitled:Untitled-1");
/// assert_eq!(uri, "untitled:Untitled-1");
/// # }
/// # #[cfg(target_arch = "wasm32")]
/// # fn main() {}
/// ```
///
/// # Platform Support
///
/// The full implementation is only available on non-`wasm32` targets.
/// On `wasm32`, only URI parsing is performed without filesystem operations.
#[cfg(not(target_arch = "wasm32"))]
pub fn normalize_uri(uri: &str) -> String {
    // Try to parse as URL first
    if let Ok(url) = Url::parse(uri) {
        // Already a valid URI, return as-is
        return url.to_string();
    }

    // If not a valid URI, try to treat as a file path
    let path = std::path::Path::new(uri);

    // Try to convert path to URI using our helper function
    if let Ok(uri_string) = fs_path_to_uri(path) {
        return uri_string;
    }

    // Last resort: if it looks like a file:// URI but is malformed,
    // try to extract the path and reconstruct properly
    if uri.starts_with("file://")
        && let Some(fs_path) = uri_to_fs_path(uri)
        && let Ok(normalized) = fs_path_to_uri(&fs_path)
    {
        return normalized;
    }

    // Final fallback: return as-is for special URIs like untitled:
    uri.to_string()
}

/// Normalize a URI to a consistent form (wasm32 version - no filesystem).
#[cfg(target_arch = "wasm32")]
pub fn normalize_uri(uri: &str) -> String {
    // On wasm32, just try to parse as URL or return as-is
    if let Ok(url) = Url::parse(uri) { url.to_string() } else { uri.to_string() }
}

/// Normalize a URI to a consistent key for lookups.
///
/// This function handles platform-specific differences to ensure consistent
/// lookups across different systems, particularly for Windows drive letters.
///
/// # Windows Drive Letter Normalization
///
/// On Windows, drive letters in URIs may be uppercase or lowercase.
/// This function normalizes them to lowercase for consistent lookups:
/// - `file:///C:/foo` → `file:///c:/foo`
/// - `file:///D:/bar` → `file:///d:/bar`
///
/// # Examples
///
/// ```
/// use gsx_uri::uri_key;
///
/// // Standard URI
/// let key = uri_key("file:///tmp/test.gsx");
/// assert_eq!(key, "file:///tmp/test.gsx");
///
/// // Windows URI with uppercase drive
/// let key = uri_key("file:///C:/Users/test.gsx");
/// assert_eq!(key, "file:///c:/Users/test.gsx");
///
/// // Invalid URI returned as-is
/// let key = uri_key("not-a-uri");
/// assert_eq!(key, "not-a-uri");
/// ```
pub fn uri_key(uri: &str) -> String {
    if let Ok(u) = Url::parse(uri) {
        let s = u.as_str().to_string();
        if let Some(rest) = s.strip_prefix("file:///") {
            // Check for Windows drive letter pattern: single letter followed by colon
            if rest.len() > 1
                && rest.as_bytes()[1] == b':'
                && rest.as_bytes()[0].is_ascii_alphabetic()
            {
                // Normalize drive letter to lowercase
                return format!("file:///{}{}", rest[0..1].to_ascii_lowercase(), &rest[1..]);
            }
        }
        s
    } else {
        uri.to_string()
    }
}

/// Check if a URI uses the `file://` scheme.
///
/// # Examples
///
/// ```
/// use gsx_uri::is_file_uri;
///
/// assert!(is_file_uri("file:///tmp/test.gsx"));
/// assert!(!is_file_uri("https://example.com"));
/// assert!(!is_file_uri("untitled:Untitled-1"));
/// ```
pub fn is_file_uri(uri: &str) -> bool {
    uri.starts_with("file://")
}

/// Check if a URI uses a special scheme (not `file://`).
///
/// Special schemes include:
/// - `untitled:` - Unsaved documents
/// - `vscode-notebook:` - VS Code notebooks
/// - `git:` - Git diff views
/// - etc.
///
/// # Examples
///
/// ```
/// use gsx_uri::is_special_scheme;
///
/// assert!(is_special_scheme("untitled:Untitled-1"));
/// assert!(is_special_scheme("git:/foo/bar"));
/// assert!(!is_special_scheme("file:///tmp/test.gsx"));
/// ```
pub fn is_special_scheme(uri: &str) -> bool {
    if let Ok(url) = Url::parse(uri) {
        url.scheme() != "file"
    } else {
        // If it can't be parsed as a URL, check for common special prefixes
        uri.starts_with("untitled:")
            || uri.starts_with("git:")
            || uri.starts_with("vscode-notebook:")
            || uri.starts_with("vscode-vfs:")
    }
}

/// Extract the file extension from a URI.
///
/// # Examples
///
/// ```
/// use gsx_uri::uri_extension;
///
/// assert_eq!(uri_extension("file:///tmp/test.gsx"), Some("gsx"));
/// assert_eq!(uri_extension("file:///tmp/layout.gsx"), Some("gsx"));
/// assert_eq!(uri_extension("file:///tmp/no-extension"), None);
/// ```
pub fn uri_extension(uri: &str) -> Option<&str> {
    // Find the last path segment
    let path_part = uri.rsplit('/').next()?;
    // Remove query string and fragment
    let path_part = path_part.split('?').next()?;
    let path_part = path_part.split('#').next()?;
    // Find the extension
    let dot_pos = path_part.rfind('.')?;
    let ext = &path_part[dot_pos + 1..];
    if ext.is_empty() { None } else { Some(ext) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn virtual_and_disk_uri_roundtrip() {
        let dsl = "file:///app/pages/home.gsx";
        let virt = dsl_to_virtual_uri(dsl).expect("gsx suffix");
        let disk = dsl_to_disk_uri(dsl).expect("gsx suffix");
        assert_eq!(classify_host_uri(&virt), HostUriKind::Virtual);
        assert_eq!(classify_host_uri(&disk), HostUriKind::Disk);
        assert_eq!(host_uri_to_dsl_uri(&virt).as_deref(), Some(dsl));
        assert_eq!(host_uri_to_dsl_uri(&disk).as_deref(), Some(dsl));
    }

    #[test]
    fn non_gsx_uri_has_no_virtual_form() {
        assert_eq!(dsl_to_virtual_uri("file:///app/pages/home.go"), None);
        assert_eq!(classify_host_uri("file:///app/other.go"), HostUriKind::Other);
        assert_eq!(host_uri_to_dsl_uri("file:///app/other.go"), None);
    }

    #[test]
    fn test_uri_key_basic() {
        assert_eq!(uri_key("file:///tmp/test.gsx"), "file:///tmp/test.gsx");
    }

    #[test]
    fn test_uri_key_windows_drive() {
        assert_eq!(uri_key("file:///C:/Users/test.gsx"), "file:///c:/Users/test.gsx");
        assert_eq!(uri_key("file:///D:/foo/bar.gsx"), "file:///d:/foo/bar.gsx");
    }

    #[test]
    fn test_uri_key_invalid() {
        assert_eq!(uri_key("not-a-uri"), "not-a-uri");
    }

    #[test]
    fn test_is_file_uri() {
        assert!(is_file_uri("file:///tmp/test.gsx"));
        assert!(!is_file_uri("https://example.com"));
        assert!(!is_file_uri("untitled:Untitled-1"));
    }

    #[test]
    fn test_is_special_scheme() {
        assert!(is_special_scheme("untitled:Untitled-1"));
        assert!(!is_special_scheme("file:///tmp/test.gsx"));
    }

    #[test]
    fn test_uri_extension() {
        assert_eq!(uri_extension("file:///tmp/test.gsx"), Some("gsx"));
        assert_eq!(uri_extension("file:///tmp/layout.gsx"), Some("gsx"));
        assert_eq!(uri_extension("file:///tmp/script.gsx"), Some("gsx"));
        assert_eq!(uri_extension("file:///tmp/no-extension"), None);
        assert_eq!(uri_extension("file:///tmp/file.gsx?query=1"), Some("gsx"));
    }

    #[cfg(not(target_arch = "wasm32"))]
    mod filesystem_tests {
        use super::*;

        #[test]
        fn test_uri_to_fs_path_basic() {
            let path = uri_to_fs_path("file:///tmp/test.gsx");
            assert!(path.is_some());
            let path = path.unwrap();
            assert!(path.ends_with("test.gsx"));
        }

        #[test]
        fn test_uri_to_fs_path_non_file() {
            assert!(uri_to_fs_path("https://example.com").is_none());
            assert!(uri_to_fs_path("untitled:Untitled-1").is_none());
        }

        #[test]
        fn test_uri_to_fs_path_with_spaces() {
            let path = uri_to_fs_path("file:///tmp/path%20with%20spaces/test.gsx");
            assert!(path.is_some());
            let path = path.unwrap();
            let path_str = path.to_string_lossy();
            assert!(path_str.contains("path with spaces"));
        }

        #[test]
        fn test_fs_path_to_uri_basic() {
            let uri = fs_path_to_uri("/tmp/test.gsx").unwrap();
            assert!(uri.starts_with("file:///"));
            assert!(uri.contains("test.gsx"));
        }

        #[test]
        fn test_fs_path_to_uri_with_spaces() {
            let uri = fs_path_to_uri("/tmp/path with spaces/test.gsx").unwrap();
            assert!(uri.contains("%20") || uri.contains("path with spaces"));
        }

        #[test]
        fn test_normalize_uri_valid() {
            let uri = normalize_uri("file:///tmp/test.gsx");
            assert_eq!(uri, "file:///tmp/test.gsx");
        }

        #[test]
        fn test_normalize_uri_special() {
            let uri = normalize_uri("untitled:Untitled-1");
            assert_eq!(uri, "untitled:Untitled-1");
        }

        #[test]
        fn test_roundtrip() {
            let original = "/tmp/roundtrip-test.gsx";
            let uri = fs_path_to_uri(original).unwrap();
            let path = uri_to_fs_path(&uri).unwrap();
            assert!(path.ends_with("roundtrip-test.gsx"));
        }
    }
}
