//! `CompilerInstaller` (spec §4.5): atomic download → extract → rename of a
//! compiler archive, with a directory rename as the single commit point.

use std::path::{Path, PathBuf};

use tokio::task;

use crate::app::layout::InstallLayout;
use crate::app::network::Downloader;
use crate::types::{ArchiveExt, ZigupError};

pub struct CompilerInstaller<'a> {
    downloader: &'a Downloader,
    layout: &'a InstallLayout,
}

impl<'a> CompilerInstaller<'a> {
    pub fn new(downloader: &'a Downloader, layout: &'a InstallLayout) -> Self {
        CompilerInstaller { downloader, layout }
    }

    /// Installs `id` from `url`. A no-op if already installed (idempotent
    /// per spec §3's invariant). Any failure after step 2 leaves only the
    /// `.installing` shadow behind, reclaimed unconditionally on retry.
    pub async fn install(&self, id: &str, url: &str) -> Result<(), ZigupError> {
        if self.layout.is_installed(id) {
            tracing::debug!(target: "zigup::installer", "{id} already installed, skipping");
            return Ok(());
        }

        let basename = url.rsplit('/').next().unwrap_or(url).to_string();
        let ext = ArchiveExt::from_basename(&basename)
            .ok_or_else(|| ZigupError::UnknownArchiveExtension(basename.clone()))?;

        let installing = self.layout.installing_dir(id);
        if installing.exists() {
            tokio::fs::remove_dir_all(&installing).await?;
        }
        tokio::fs::create_dir_all(&installing).await?;

        if let Err(e) = self.download_and_extract(url, &installing, &basename, ext).await {
            let _ = tokio::fs::remove_dir_all(&installing).await;
            return Err(e);
        }

        let compiler_dir = self.layout.compiler_dir(id);
        if let Some(parent) = compiler_dir.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::rename(&installing, &compiler_dir).await?;

        tracing::info!(target: "zigup::installer", "installed {id}");
        Ok(())
    }

    async fn download_and_extract(
        &self,
        url: &str,
        installing: &Path,
        basename: &str,
        ext: ArchiveExt,
    ) -> Result<(), ZigupError> {
        let archive_path = installing.join(basename);

        {
            let mut file = tokio::fs::File::create(&archive_path).await?;
            self.downloader.download(url, &mut file).await.map_err(ZigupError::DownloadFailed)?;
            // Dropping `file` here (end of block) closes the handle before
            // anything below deletes or renames its parent directory.
        }

        let archive_root = strip_archive_ext(basename, ext);
        let extract_dest = installing.to_path_buf();
        let archive_path_owned = archive_path.clone();
        task::spawn_blocking(move || extract(&archive_path_owned, &extract_dest, ext))
            .await
            .map_err(|e| ZigupError::General(color_eyre::eyre::eyre!("extraction task panicked: {e}")))??;

        let extracted_root = installing.join(&archive_root);
        let files_dir = installing.join("files");
        tokio::fs::rename(&extracted_root, &files_dir).await.map_err(|source| {
            ZigupError::General(color_eyre::eyre::eyre!(
                "archive root {} not found after extraction: {source}",
                extracted_root.display()
            ))
        })?;

        tokio::fs::remove_file(&archive_path).await?;
        Ok(())
    }
}

fn strip_archive_ext(basename: &str, ext: ArchiveExt) -> String {
    let suffix = match ext {
        ArchiveExt::TarXz => ".tar.xz",
        ArchiveExt::Zip => ".zip",
    };
    basename.strip_suffix(suffix).unwrap_or(basename).to_string()
}

/// Extracts the archive at `archive_path` into `dest`, selected strictly by
/// `ext` (never by sniffing, per spec §4.5 step 5/§9).
fn extract(archive_path: &Path, dest: &Path, ext: ArchiveExt) -> Result<(), ZigupError> {
    match ext {
        ArchiveExt::TarXz => extract_tar_xz(archive_path, dest),
        ArchiveExt::Zip => extract_zip(archive_path, dest),
    }
}

fn extract_tar_xz(archive_path: &Path, dest: &Path) -> Result<(), ZigupError> {
    let file = std::fs::File::open(archive_path)?;
    let decoder = xz2::read::XzDecoder::new(file);
    let mut archive = tar::Archive::new(decoder);
    archive.unpack(dest)?;
    Ok(())
}

fn extract_zip(archive_path: &Path, dest: &Path) -> Result<(), ZigupError> {
    let file = std::fs::File::open(archive_path)?;
    let mut zip = zip::ZipArchive::new(file)
        .map_err(|e| ZigupError::General(color_eyre::eyre::eyre!("failed to read zip archive: {e}")))?;

    for i in 0..zip.len() {
        let mut entry = zip
            .by_index(i)
            .map_err(|e| ZigupError::General(color_eyre::eyre::eyre!("failed to read zip entry: {e}")))?;
        let Some(out_path) = entry.enclosed_name().map(|p| dest.join(p)) else {
            continue;
        };

        if entry.is_dir() {
            std::fs::create_dir_all(&out_path)?;
            continue;
        }
        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut out = std::fs::File::create(&out_path)?;
        std::io::copy(&mut entry, &mut out)?;

        #[cfg(unix)]
        if let Some(mode) = entry.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&out_path, std::fs::Permissions::from_mode(mode))?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_ext_removes_known_suffixes() {
        assert_eq!(
            strip_archive_ext("zig-linux-x86_64-0.13.0.tar.xz", ArchiveExt::TarXz),
            "zig-linux-x86_64-0.13.0"
        );
        assert_eq!(
            strip_archive_ext("zig-windows-x86_64-0.13.0.zip", ArchiveExt::Zip),
            "zig-windows-x86_64-0.13.0"
        );
    }
}
