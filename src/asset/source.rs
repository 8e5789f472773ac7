use std::path::{Path, PathBuf};

use reqwest::Url;
use tokio::io::AsyncReadExt;

use super::progress::{LoadProgress, ProgressTracker};
use crate::error::LoadError;

const FILE_CHUNK_SIZE: usize = 64 * 1024;

/// Where the model should be loaded from, as given by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    raw: String,
}

impl LoadRequest {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn location(&self) -> Result<Location, LoadError> {
        Location::parse(&self.raw)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Remote(Url),
    Local(PathBuf),
}

impl Location {
    /// `http(s)://` and `file://` are URLs, anything else is a filesystem path.
    pub fn parse(raw: &str) -> Result<Self, LoadError> {
        let invalid = |reason: &str| LoadError::InvalidLocation {
            location: raw.to_string(),
            reason: reason.to_string(),
        };

        let lower = raw.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            let url = Url::parse(raw).map_err(|e| invalid(&e.to_string()))?;
            return Ok(Location::Remote(url));
        }
        if lower.starts_with("file://") {
            let url = Url::parse(raw).map_err(|e| invalid(&e.to_string()))?;
            let path = url
                .to_file_path()
                .map_err(|()| invalid("not a local file URL"))?;
            return Ok(Location::Local(path));
        }
        if raw.trim().is_empty() {
            return Err(invalid("empty location"));
        }
        Ok(Location::Local(PathBuf::from(raw)))
    }

    /// Resolve a relative URI (an external buffer) next to this location.
    pub fn sibling(&self, uri: &str) -> Result<Location, LoadError> {
        match self {
            Location::Remote(base) => base
                .join(uri)
                .map(Location::Remote)
                .map_err(|e| LoadError::InvalidLocation {
                    location: uri.to_string(),
                    reason: e.to_string(),
                }),
            Location::Local(path) => {
                let dir = path.parent().unwrap_or_else(|| Path::new(""));
                Ok(Location::Local(dir.join(uri)))
            }
        }
    }

    pub fn display_name(&self) -> String {
        match self {
            Location::Remote(url) => url.to_string(),
            Location::Local(path) => path.display().to_string(),
        }
    }
}

/// An opened byte stream with an optional known length.
pub enum ByteSource {
    File {
        path: PathBuf,
        file: tokio::fs::File,
        total: u64,
        buf: Box<[u8]>,
    },
    Http {
        url: Url,
        response: reqwest::Response,
    },
}

impl ByteSource {
    pub async fn open(location: &Location) -> Result<Self, LoadError> {
        match location {
            Location::Local(path) => {
                let file = tokio::fs::File::open(path)
                    .await
                    .map_err(|e| LoadError::io(path, e))?;
                let total = file
                    .metadata()
                    .await
                    .map_err(|e| LoadError::io(path, e))?
                    .len();
                Ok(ByteSource::File {
                    path: path.clone(),
                    file,
                    total,
                    buf: vec![0u8; FILE_CHUNK_SIZE].into_boxed_slice(),
                })
            }
            Location::Remote(url) => {
                let response = reqwest::get(url.clone())
                    .await
                    .map_err(|e| LoadError::network(url.as_str(), e))?;
                let status = response.status();
                if !status.is_success() {
                    return Err(LoadError::HttpStatus {
                        url: url.to_string(),
                        status: status.as_u16(),
                    });
                }
                Ok(ByteSource::Http {
                    url: url.clone(),
                    response,
                })
            }
        }
    }

    /// Size announced by the source, if any.
    pub fn total_len(&self) -> Option<u64> {
        match self {
            ByteSource::File { total, .. } => Some(*total),
            ByteSource::Http { response, .. } => response.content_length(),
        }
    }

    /// Append the next chunk to `out`. Returns the number of bytes read, 0 at end of stream.
    pub async fn read_chunk(&mut self, out: &mut Vec<u8>) -> Result<usize, LoadError> {
        match self {
            ByteSource::File { path, file, buf, .. } => {
                let n = file.read(buf).await.map_err(|e| LoadError::io(&*path, e))?;
                out.extend_from_slice(&buf[..n]);
                Ok(n)
            }
            ByteSource::Http { url, response } => {
                match response
                    .chunk()
                    .await
                    .map_err(|e| LoadError::network(url.as_str(), e))?
                {
                    Some(chunk) => {
                        out.extend_from_slice(&chunk);
                        Ok(chunk.len())
                    }
                    None => Ok(0),
                }
            }
        }
    }
}

/// Drain `source`, reporting progress whenever the percentage increases.
pub async fn read_to_end(
    mut source: ByteSource,
    mut on_progress: impl FnMut(LoadProgress),
) -> Result<Vec<u8>, LoadError> {
    let total = source.total_len();
    let mut tracker = ProgressTracker::new(total);
    let mut data = Vec::with_capacity(total.unwrap_or(0).min(256 * 1024 * 1024) as usize);

    loop {
        let n = source.read_chunk(&mut data).await?;
        if n == 0 {
            break;
        }
        if let Some(progress) = tracker.advance(n) {
            on_progress(progress);
        }
    }
    Ok(data)
}

pub async fn fetch(
    location: &Location,
    on_progress: impl FnMut(LoadProgress),
) -> Result<Vec<u8>, LoadError> {
    let source = ByteSource::open(location).await?;
    read_to_end(source, on_progress).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_distinguishes_urls_and_paths() {
        assert!(matches!(
            Location::parse("https://cdn.example.com/m/inflation.glb"),
            Ok(Location::Remote(_))
        ));
        assert_eq!(
            Location::parse("./inflation.glb").ok(),
            Some(Location::Local(PathBuf::from("./inflation.glb")))
        );
        assert!(Location::parse("").is_err());
    }

    #[test]
    fn sibling_resolves_next_to_request() {
        let remote = Location::parse("https://cdn.example.com/m/scene.gltf").unwrap();
        assert_eq!(
            remote.sibling("scene.bin").unwrap().display_name(),
            "https://cdn.example.com/m/scene.bin"
        );

        let local = Location::parse("assets/scene.gltf").unwrap();
        assert_eq!(
            local.sibling("scene.bin").unwrap(),
            Location::Local(PathBuf::from("assets/scene.bin"))
        );
    }

    #[tokio::test]
    async fn missing_file_is_an_io_error() {
        let location = Location::Local(PathBuf::from("definitely/not/here.glb"));
        let err = fetch(&location, |_| {}).await.unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
