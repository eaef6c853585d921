// saver.rs — 图片下载与保存
// 负责推断扩展名、修正目标路径、创建父目录并写入文件

use crate::error::PotdError;
use crate::http::{FetchRequest, Fetcher};
use rust_i18n::t;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;
use url::Url;

/// 能识别的图片扩展名，其余一律不认
pub const IMAGE_EXTENSIONS: [&str; 5] = [".jpg", ".jpeg", ".png", ".gif", ".webp"];

/// 扩展名（不区分大小写，不带点）是否为可识别的图片扩展名
fn recognized(ext: &str) -> Option<&'static str> {
    let ext = ext.to_ascii_lowercase();
    IMAGE_EXTENSIONS
        .iter()
        .copied()
        .find(|known| known[1..] == ext)
}

/// 推断图片扩展名
///
/// 优先看 URL 路径的后缀，其次看 Content-Type，都不行就用 `.jpg`
pub fn detect_extension(url: &str, content_type: Option<&str>) -> &'static str {
    let from_path = Url::parse(url).ok().and_then(|parsed| {
        Path::new(parsed.path())
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(recognized)
    });
    if let Some(ext) = from_path {
        return ext;
    }

    if let Some(content_type) = content_type {
        let content_type = content_type.to_ascii_lowercase();
        if content_type.contains("jpeg") || content_type.contains("jpg") {
            return ".jpg";
        } else if content_type.contains("png") {
            return ".png";
        } else if content_type.contains("gif") {
            return ".gif";
        } else if content_type.contains("webp") {
            return ".webp";
        }
    }

    ".jpg"
}

/// 目标路径已带可识别的图片扩展名时原样返回，否则替换为 `detected`
pub fn resolve_target(target: &Path, detected: &str) -> PathBuf {
    let keep = target
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(recognized)
        .is_some();

    if keep {
        target.to_path_buf()
    } else {
        target.with_extension(detected.trim_start_matches('.'))
    }
}

/// 与目标文件同目录的临时文件：`<name>.part`
fn partial_path(target: &Path) -> PathBuf {
    let mut name: OsString = target.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}

/// 下载图片并保存到 `target`，返回最终写入的路径
///
/// `headers` 会原样附加到图片请求上（Wikimedia 要求 User-Agent）。
/// 先写 `.part` 临时文件再重命名，目标路径上不会出现写了一半的文件。
pub async fn save(
    fetcher: &Fetcher,
    url: &str,
    target: &Path,
    headers: &[(String, String)],
) -> Result<PathBuf, PotdError> {
    if fetcher.verbose() {
        info!("Downloading image from {url}");
    }

    let request = FetchRequest::new(url).headers(headers);
    let response = fetcher.fetch(&request).await?;
    if fetcher.verbose() {
        info!(
            "Received {} bytes (HTTP {})",
            response.body.len(),
            response.status
        );
    }

    let detected = detect_extension(url, response.content_type.as_deref());
    let final_path = resolve_target(target, detected);
    if fetcher.verbose() && final_path != target {
        info!("Auto-detected extension: {detected}");
    }

    let io_error = |source| PotdError::Io {
        path: final_path.clone(),
        source,
    };

    if let Some(parent) = final_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await.map_err(io_error)?;
    }

    if fetcher.verbose() {
        info!("Saving image to {}", final_path.display());
    }

    let partial = partial_path(&final_path);
    if let Err(err) = fs::write(&partial, &response.body).await {
        let _ = fs::remove_file(&partial).await;
        return Err(io_error(err));
    }
    if let Err(err) = fs::rename(&partial, &final_path).await {
        let _ = fs::remove_file(&partial).await;
        return Err(io_error(err));
    }

    println!("{}", t!("download_done", path => final_path.display()));
    Ok(final_path)
}
