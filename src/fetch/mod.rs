//! Reading the three sources from local files or HTTP, with optional gzip.

mod basic;
mod client;

pub use basic::BasicClient;
pub use client::HttpClient;

use flate2::read::GzDecoder;
use std::io::Read;
use tracing::{debug, info};

use crate::error::{BrtError, Result};
use crate::loader::RawSources;

/// Where each table comes from: a file path or an `http(s)://` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocations {
    pub load: String,
    pub critical: String,
    pub stations: String,
}

/// Downloads `url` with `client`.
pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Vec<u8>> {
    let url = reqwest::Url::parse(url).map_err(|e| BrtError::InvalidSource {
        location: url.to_string(),
        message: e.to_string(),
    })?;
    let bytes = client.get_bytes(url).await?;
    debug!(bytes = bytes.len(), "Fetched source");
    Ok(bytes)
}

/// Decompresses `bytes` when `location` names a `.gz` file.
pub fn maybe_decompress(location: &str, bytes: Vec<u8>) -> Result<Vec<u8>> {
    if !location.ends_with(".gz") {
        return Ok(bytes);
    }
    let mut out = Vec::new();
    GzDecoder::new(bytes.as_slice()).read_to_end(&mut out)?;
    debug!(location, compressed = bytes.len(), decompressed = out.len(), "Decompressed source");
    Ok(out)
}

/// Loads one source from a local file path or fetches it over HTTP.
#[tracing::instrument(skip(client))]
pub async fn read_source<C: HttpClient>(client: &C, location: &str) -> Result<Vec<u8>> {
    let bytes = if location.starts_with("http://") || location.starts_with("https://") {
        fetch_bytes(client, location).await?
    } else {
        tokio::fs::read(location).await?
    };
    maybe_decompress(location, bytes)
}

/// Reads all three sources.
pub async fn fetch_sources<C: HttpClient>(
    client: &C,
    locations: &SourceLocations,
) -> Result<RawSources> {
    let (load, critical, stations) = tokio::try_join!(
        read_source(client, &locations.load),
        read_source(client, &locations.critical),
        read_source(client, &locations.stations),
    )?;

    info!(
        load_bytes = load.len(),
        critical_bytes = critical.len(),
        stations_bytes = stations.len(),
        "Sources read"
    );

    Ok(RawSources {
        load,
        critical,
        stations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;

    fn temp_path(name: &str) -> String {
        format!("{}/{}", std::env::temp_dir().display(), name)
    }

    #[test]
    fn test_plain_source_passes_through() {
        let bytes = b"stop_name,lat\n".to_vec();
        assert_eq!(maybe_decompress("brt_stations.csv", bytes.clone()).unwrap(), bytes);
    }

    #[test]
    fn test_gzip_source_is_decompressed() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"stop_name,lat\n").unwrap();
        let compressed = encoder.finish().unwrap();

        let out = maybe_decompress("brt_stations.csv.gz", compressed).unwrap();
        assert_eq!(out, b"stop_name,lat\n");
    }

    #[test]
    fn test_corrupt_gzip_is_error() {
        assert!(maybe_decompress("x.csv.gz", vec![1, 2, 3]).is_err());
    }

    #[tokio::test]
    async fn test_read_local_file() {
        let path = temp_path("brt_analytics_test_source.csv");
        std::fs::write(&path, "a,b\n1,2\n").unwrap();

        let bytes = read_source(&BasicClient::new(), &path).await.unwrap();
        assert_eq!(bytes, b"a,b\n1,2\n");

        std::fs::remove_file(&path).unwrap();
    }

    #[tokio::test]
    async fn test_missing_local_file() {
        let err = read_source(&BasicClient::new(), "/nonexistent/brt.csv")
            .await
            .unwrap_err();
        assert!(matches!(err, BrtError::Io(_)));
    }

    #[tokio::test]
    async fn test_invalid_url() {
        let err = fetch_bytes(&BasicClient::new(), "http://").await.unwrap_err();
        assert!(matches!(err, BrtError::InvalidSource { .. }));
    }
}
