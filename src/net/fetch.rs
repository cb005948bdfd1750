use std::path::Path;
use std::time::Duration;

use url::Url;

use crate::error::SiteError;

/// Page markup and the location relative asset paths resolve against.
#[derive(Debug, Clone)]
pub struct LoadedPage {
    pub markup: String,
    pub base: Url,
    /// HTTP status for fetched pages, `None` for local files.
    pub status: Option<u16>,
}

/// Resolve an asset reference (`assets/images/hero1.jpg`, `/x.png`,
/// absolute URL) against the page location.
pub fn resolve_asset(base: &Url, reference: &str) -> Option<Url> {
    base.join(reference.trim()).ok()
}

fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Load page markup from a file path or an `http(s)` URL (blocking).
pub fn load_page(location: &str) -> Result<LoadedPage, SiteError> {
    if is_remote(location) {
        fetch_url(location)
    } else {
        read_file(Path::new(location))
    }
}

fn read_file(path: &Path) -> Result<LoadedPage, SiteError> {
    let io_err = |source| SiteError::Io {
        path: path.display().to_string(),
        source,
    };
    let markup = std::fs::read_to_string(path).map_err(io_err)?;
    let abs = std::fs::canonicalize(path).map_err(io_err)?;
    let base = Url::from_file_path(&abs)
        .or_else(|_| Url::parse(&format!("file://{}", abs.display())))
        .map_err(|source| SiteError::InvalidUrl {
            location: abs.display().to_string(),
            source,
        })?;

    log::debug!("read {} bytes from {}", markup.len(), base);
    Ok(LoadedPage {
        markup,
        base,
        status: None,
    })
}

pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::blocking::Client, reqwest::Error> {
    reqwest::blocking::Client::builder()
        .user_agent(concat!("mountmagic/", env!("CARGO_PKG_VERSION")))
        .timeout(timeout)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
}

fn fetch_url(location: &str) -> Result<LoadedPage, SiteError> {
    let parsed = Url::parse(location).map_err(|source| SiteError::InvalidUrl {
        location: location.to_string(),
        source,
    })?;
    let http_err = |source| SiteError::Http {
        url: parsed.to_string(),
        source,
    };

    let client = http_client(Duration::from_secs(15)).map_err(http_err)?;
    let response = client
        .get(parsed.as_str())
        .header(
            "Accept",
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        )
        .send()
        .map_err(http_err)?;

    let status = response.status();
    if !status.is_success() {
        return Err(SiteError::HttpStatus {
            url: parsed.to_string(),
            status: status.as_u16(),
        });
    }

    // redirects may have moved the page; assets resolve against where it ended up
    let base = response.url().clone();
    let markup = response.text().map_err(http_err)?;

    log::debug!("fetched {} ({} bytes)", base, markup.len());
    Ok(LoadedPage {
        markup,
        base,
        status: Some(status.as_u16()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_local_file_with_file_base() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.html");
        std::fs::write(&path, "<html><title>MountMagic</title></html>").unwrap();

        let page = load_page(path.to_str().unwrap()).unwrap();
        assert!(page.markup.contains("MountMagic"));
        assert_eq!(page.base.scheme(), "file");
        assert!(page.base.path().ends_with("/index.html"));
        assert_eq!(page.status, None);

        let asset = resolve_asset(&page.base, "assets/images/hero1.jpg").unwrap();
        assert_eq!(asset.scheme(), "file");
        assert!(asset.path().ends_with("/assets/images/hero1.jpg"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.html");
        let err = load_page(path.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, SiteError::Io { .. }));
    }

    #[test]
    fn malformed_remote_location_is_rejected() {
        let err = load_page("http://").unwrap_err();
        assert!(matches!(err, SiteError::InvalidUrl { .. }));
    }

    #[test]
    fn resolves_against_remote_base() {
        let base = Url::parse("https://mountmagic.example/tours/index.html").unwrap();
        assert_eq!(
            resolve_asset(&base, "assets/images/package1.jpg").unwrap().as_str(),
            "https://mountmagic.example/tours/assets/images/package1.jpg"
        );
        assert_eq!(
            resolve_asset(&base, "https://cdn.example/x.png").unwrap().as_str(),
            "https://cdn.example/x.png"
        );
    }
}
