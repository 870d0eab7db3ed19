//! Recording finalization
//!
//! Joins the buffered chunks into a single file named after the time the
//! recording finished, and builds the asset URL the webview uses to reach it.

use super::media::Chunk;
use chrono::{DateTime, Utc};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Where finished recordings go
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTarget {
    pub dir: PathBuf,
    /// File name prefix, e.g. `babxrec`
    pub prefix: String,
}

/// `<prefix>-YYYY-MM-DDTHH-MM-SS.<ext>`
pub fn recording_file_name(prefix: &str, extension: &str, at: DateTime<Utc>) -> String {
    format!("{}-{}.{}", prefix, at.format("%Y-%m-%dT%H-%M-%S"), extension)
}

/// Pick a path in `dir` that does not exist yet
fn unique_path(dir: &Path, file_name: &str) -> PathBuf {
    let candidate = dir.join(file_name);
    if !candidate.exists() {
        return candidate;
    }

    let (stem, ext) = match file_name.rsplit_once('.') {
        Some((stem, ext)) => (stem, Some(ext)),
        None => (file_name, None),
    };
    (1..)
        .map(|n| match ext {
            Some(ext) => dir.join(format!("{}-{}.{}", stem, n, ext)),
            None => dir.join(format!("{}-{}", stem, n)),
        })
        .find(|p| !p.exists())
        .unwrap_or(candidate)
}

/// Concatenate chunks in order and write them to a new file
///
/// Returns the written path and its size.
pub fn write_recording(
    chunks: &[Chunk],
    target: &OutputTarget,
    extension: &str,
    at: DateTime<Utc>,
) -> io::Result<(PathBuf, u64)> {
    fs::create_dir_all(&target.dir)?;

    let file_name = recording_file_name(&target.prefix, extension, at);
    let path = unique_path(&target.dir, &file_name);

    let mut file = File::create(&path)?;
    let mut size = 0u64;
    for chunk in chunks {
        file.write_all(chunk)?;
        size += chunk.len() as u64;
    }
    file.sync_all()?;

    if size == 0 {
        tracing::warn!("Recording {:?} is empty", path);
    }
    tracing::info!("Wrote recording {:?} ({} bytes)", path, size);

    Ok((path, size))
}

/// URL for a local file served by Tauri's asset protocol
pub fn asset_url(path: &Path) -> String {
    let encoded = urlencoding::encode(&path.to_string_lossy()).into_owned();
    if cfg!(any(target_os = "windows", target_os = "android")) {
        format!("http://asset.localhost/{}", encoded)
    } else {
        format!("asset://localhost/{}", encoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap()
    }

    #[test]
    fn test_file_name_has_no_colons() {
        let name = recording_file_name("babxrec", "webm", at());
        assert_eq!(name, "babxrec-2024-03-05T14-07-09.webm");
    }

    #[test]
    fn test_chunks_concatenated_in_order() {
        let dir = tempdir().unwrap();
        let target = OutputTarget {
            dir: dir.path().join("out"),
            prefix: "recording".to_string(),
        };
        let chunks = vec![b"abc".to_vec(), b"def".to_vec(), b"g".to_vec()];

        let (path, size) = write_recording(&chunks, &target, "webm", at()).unwrap();
        assert_eq!(size, 7);
        assert_eq!(fs::read(&path).unwrap(), b"abcdefg");
        assert_eq!(
            path.file_name().unwrap().to_string_lossy(),
            "recording-2024-03-05T14-07-09.webm"
        );
    }

    #[test]
    fn test_same_second_does_not_overwrite() {
        let dir = tempdir().unwrap();
        let target = OutputTarget {
            dir: dir.path().to_path_buf(),
            prefix: "babxrec".to_string(),
        };

        let (first, _) = write_recording(&[b"1".to_vec()], &target, "webm", at()).unwrap();
        let (second, _) = write_recording(&[b"2".to_vec()], &target, "webm", at()).unwrap();
        assert_ne!(first, second);
        assert!(second.to_string_lossy().ends_with("-1.webm"));
        assert_eq!(fs::read(&first).unwrap(), b"1");
    }

    #[test]
    fn test_asset_url_is_encoded() {
        let url = asset_url(Path::new("/tmp/my recordings/a.webm"));
        assert!(url.contains("localhost/"));
        assert!(url.contains("my%20recordings"));
    }
}
