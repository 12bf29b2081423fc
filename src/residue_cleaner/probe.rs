use std::collections::HashSet;
use std::env;
use std::path::Path;
use std::process::Command;

use super::classify::url_scheme;
use super::types::RuleKind;

/// Host capability that knows which URL schemes can be opened.
///
/// The core only asks; dispatching URLs is the host's business.
pub trait SchemeRegistry {
    /// `url` is the full rule string, e.g. `Filza://`.
    fn can_open(&self, url: &str) -> bool;
}

impl<T: SchemeRegistry + ?Sized> SchemeRegistry for &T {
    fn can_open(&self, url: &str) -> bool {
        (**self).can_open(url)
    }
}

/// Fixed set of schemes known to be registered, for hosts that already track them.
#[derive(Debug, Clone, Default)]
pub struct StaticSchemeRegistry {
    schemes: HashSet<String>,
}

impl StaticSchemeRegistry {
    pub fn new<I, S>(schemes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            schemes: schemes
                .into_iter()
                .map(|s| s.as_ref().to_ascii_lowercase())
                .collect(),
        }
    }
}

impl SchemeRegistry for StaticSchemeRegistry {
    fn can_open(&self, url: &str) -> bool {
        // Schemes are case-insensitive.
        url_scheme(url)
            .map(|scheme| self.schemes.contains(&scheme.to_ascii_lowercase()))
            .unwrap_or(false)
    }
}

/// Asks the desktop environment for a registered handler (`xdg-mime`).
pub struct DesktopSchemeRegistry {
    xdg_mime_available: bool,
}

impl DesktopSchemeRegistry {
    pub fn new() -> Self {
        let xdg_mime_available = cfg!(all(feature = "scheme-query", target_os = "linux"))
            && !is_scheme_query_disabled()
            && Command::new("which")
                .arg("xdg-mime")
                .output()
                .map(|o| o.status.success())
                .unwrap_or(false);

        Self { xdg_mime_available }
    }

    fn query_handler(&self, scheme: &str) -> bool {
        let mime = format!("x-scheme-handler/{}", scheme.to_ascii_lowercase());
        match Command::new("xdg-mime")
            .arg("query")
            .arg("default")
            .arg(&mime)
            .output()
        {
            Ok(output) if output.status.success() => {
                !String::from_utf8_lossy(&output.stdout).trim().is_empty()
            }
            Ok(output) => {
                log::warn!(
                    "xdg-mime query for {} failed (status {:?}): {}",
                    mime,
                    output.status.code(),
                    String::from_utf8_lossy(&output.stderr)
                );
                false
            }
            Err(err) => {
                log::warn!("Failed to execute xdg-mime for {}: {}", mime, err);
                false
            }
        }
    }
}

impl Default for DesktopSchemeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemeRegistry for DesktopSchemeRegistry {
    fn can_open(&self, url: &str) -> bool {
        if !self.xdg_mime_available {
            return false;
        }
        match url_scheme(url) {
            Some(scheme) => self.query_handler(scheme),
            None => false,
        }
    }
}

fn is_scheme_query_disabled() -> bool {
    env::var(crate::config::DISABLE_SCHEME_QUERY_ENV)
        .map(|value| {
            let lowercase = value.trim().to_ascii_lowercase();
            lowercase == "1" || lowercase == "true" || lowercase == "yes"
        })
        .unwrap_or(false)
}

/// Exists and the process may write to it. Missing permission is just `false`.
pub fn path_is_writable(path: &Path) -> bool {
    if !path.exists() {
        return false;
    }
    has_write_access(path)
}

#[cfg(unix)]
fn has_write_access(path: &Path) -> bool {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    let Ok(c_path) = CString::new(path.as_os_str().as_bytes()) else {
        return false;
    };
    // SAFETY: `c_path` is a valid NUL-terminated string that outlives the call.
    unsafe { libc::access(c_path.as_ptr(), libc::W_OK) == 0 }
}

#[cfg(not(unix))]
fn has_write_access(path: &Path) -> bool {
    std::fs::metadata(path)
        .map(|m| !m.permissions().readonly())
        .unwrap_or(false)
}

/// Existence check for one rule, according to its kind. Never fails.
pub(crate) fn probe(path: &str, kind: RuleKind, registry: &dyn SchemeRegistry) -> bool {
    match kind {
        RuleKind::FilePath => path_is_writable(Path::new(path)),
        RuleKind::UrlScheme => registry.can_open(path),
        RuleKind::Unclassifiable => false,
    }
}
