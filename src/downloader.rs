use std::{
    io::{self, ErrorKind},
    path::{Path, PathBuf},
};

use futures_util::StreamExt;
use reqwest::Client;
use tokio::{
    fs::{File, OpenOptions},
    io::AsyncWriteExt,
    sync::mpsc::UnboundedSender,
};
use tracing::{debug, info, warn};

use crate::{
    error::DownloadError,
    model::{DownloadRequest, DownloadUpdate},
    progress::progress_fraction,
    sanitize::sanitize_file_name,
};

/// Runs one download to completion, reporting progress and the final outcome on `updates`.
pub async fn spawn_download(
    client: Client,
    request: DownloadRequest,
    download_folder: PathBuf,
    updates: UnboundedSender<DownloadUpdate>,
) {
    let update = match download_to(&client, &request, &download_folder, &updates).await {
        Ok(path) => {
            info!(path = %path.display(), "download finished");
            DownloadUpdate::Finished(path)
        }
        Err(err) => {
            warn!(url = %request.url, error = %err, "download failed");
            DownloadUpdate::Failed(err.to_string())
        }
    };
    let _ = updates.send(update);
}

/// Streams `request.url` into `folder` and returns the written path.
///
/// The final name is reserved with an empty placeholder while the body goes to
/// `<name>.part`, which is renamed over it once complete. On any failure both are
/// removed. An existing file is never overwritten: the name gets a ` (1)`, ` (2)`, ...
/// suffix instead.
pub async fn download_to(
    client: &Client,
    request: &DownloadRequest,
    folder: &Path,
    updates: &UnboundedSender<DownloadUpdate>,
) -> Result<PathBuf, DownloadError> {
    tokio::fs::create_dir_all(folder).await?;

    let resp = client.get(&request.url).send().await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(DownloadError::Status(status));
    }

    let path = reserve_name(folder, &sanitize_file_name(&request.file_name)).await?;
    let part = part_path(&path);
    info!(url = %request.url, path = %path.display(), "starting download");

    let written: Result<(), DownloadError> = async {
        let file = File::create(&part).await?;
        write_body(resp, file, updates).await?;
        tokio::fs::rename(&part, &path).await?;
        Ok(())
    }
    .await;

    if let Err(err) = written {
        for leftover in [&part, &path] {
            if let Err(rm) = tokio::fs::remove_file(leftover).await {
                debug!(path = %leftover.display(), error = %rm, "could not remove partial download");
            }
        }
        return Err(err);
    }
    Ok(path)
}

async fn write_body(
    resp: reqwest::Response,
    mut file: File,
    updates: &UnboundedSender<DownloadUpdate>,
) -> Result<(), DownloadError> {
    let total = resp.content_length();
    let mut stream = resp.bytes_stream();
    let mut received = 0u64;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        received += chunk.len() as u64;
        if let Some(fraction) = progress_fraction(received, total) {
            let _ = updates.send(DownloadUpdate::Progress(fraction));
        }
    }
    file.flush().await?;

    if let Some(expected) = total {
        if received < expected {
            return Err(DownloadError::Truncated { expected, received });
        }
    }
    debug!(received, "download body complete");
    Ok(())
}

const MAX_NAME_ATTEMPTS: u32 = 1000;

/// Creates an empty placeholder at the first free `name`, `name (1)`, ... in `folder`.
///
/// `create_new` makes the reservation atomic, so concurrent downloads of the same
/// variant end up with distinct names.
async fn reserve_name(folder: &Path, file_name: &str) -> Result<PathBuf, DownloadError> {
    for n in 0..MAX_NAME_ATTEMPTS {
        let path = folder.join(numbered_name(file_name, n));
        match OpenOptions::new().write(true).create_new(true).open(&path).await {
            Ok(_) => return Ok(path),
            Err(err) if err.kind() == ErrorKind::AlreadyExists => continue,
            Err(err) => return Err(err.into()),
        }
    }
    Err(io::Error::new(ErrorKind::AlreadyExists, format!("no free name for {}", file_name)).into())
}

fn part_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".part");
    path.with_file_name(name)
}

/// `clip.mp4` → `clip (n).mp4`; `n == 0` leaves the name unchanged.
fn numbered_name(file_name: &str, n: u32) -> String {
    if n == 0 {
        return file_name.to_string();
    }
    match file_name.rfind('.') {
        Some(dot) if dot > 0 => format!("{} ({}){}", &file_name[..dot], n, &file_name[dot..]),
        _ => format!("{} ({})", file_name, n),
    }
}
