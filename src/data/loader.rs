// ============================================================
// Layer 4 — Pair Loader
// ============================================================
// Finds training pairs on disk.
//
// Layout expected:
//   image_dir/    home.png  checkout.jpg  about.jpeg  notes.txt
//   saliency_dir/ home.png  checkout.png
//
// An image counts only if `saliency_dir/<stem>.png` exists.
// Images without a map are skipped with a debug log; they are a
// normal part of a partially labelled corpus, not an error.
// Non-image files are ignored. A missing directory IS an error:
// it almost always means a typo on the command line.
//
// Results are sorted by file name so that a fixed seed gives the
// same train/validation split on every machine.
//
// Reference: Rust Book §9 (Error Handling)
//            std::fs documentation

use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::data::dataset::SaliencyItem;
use crate::domain::error::CritiqueError;

/// Extensions accepted as design images (compared case-insensitively).
pub const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

pub fn is_image_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| IMAGE_EXTENSIONS.iter().any(|ok| e.eq_ignore_ascii_case(ok)))
            .unwrap_or(false)
}

/// All image files directly inside `dir`, sorted by file name.
pub fn list_images(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(CritiqueError::config(format!(
            "directory '{}' does not exist",
            dir.display()
        ))
        .into());
    }

    let mut images = Vec::new();
    for entry in fs::read_dir(dir)
        .with_context(|| format!("Cannot read directory '{}'", dir.display()))?
    {
        let path = entry?.path();
        if is_image_file(&path) {
            images.push(path);
        }
    }
    images.sort();
    Ok(images)
}

/// Pairs images with same-named ground-truth saliency maps.
pub struct PairLoader {
    image_dir:    PathBuf,
    saliency_dir: PathBuf,
}

impl PairLoader {
    pub fn new(image_dir: impl Into<PathBuf>, saliency_dir: impl Into<PathBuf>) -> Self {
        Self {
            image_dir:    image_dir.into(),
            saliency_dir: saliency_dir.into(),
        }
    }

    pub fn load_pairs(&self) -> Result<Vec<SaliencyItem>> {
        if !self.saliency_dir.is_dir() {
            return Err(CritiqueError::config(format!(
                "saliency directory '{}' does not exist",
                self.saliency_dir.display()
            ))
            .into());
        }

        let mut pairs   = Vec::new();
        let mut skipped = 0usize;

        for image_path in list_images(&self.image_dir)? {
            let Some(stem) = image_path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let saliency_path = self.saliency_dir.join(format!("{stem}.png"));

            if saliency_path.is_file() {
                pairs.push(SaliencyItem::new(image_path, saliency_path));
            } else {
                tracing::debug!("No saliency map for '{}', skipping", image_path.display());
                skipped += 1;
            }
        }

        tracing::info!(
            "Found {} image-saliency pairs ({} unpaired images skipped)",
            pairs.len(),
            skipped
        );
        Ok(pairs)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn touch(path: &Path) {
        fs::write(path, b"x").unwrap();
    }

    #[test]
    fn test_unpaired_images_are_skipped() {
        let root = tempdir().unwrap();
        let images   = root.path().join("images");
        let saliency = root.path().join("saliency");
        fs::create_dir_all(&images).unwrap();
        fs::create_dir_all(&saliency).unwrap();

        touch(&images.join("b.png"));
        touch(&images.join("a.JPG"));
        touch(&images.join("lonely.jpeg"));
        touch(&images.join("readme.txt"));
        touch(&saliency.join("a.png"));
        touch(&saliency.join("b.png"));
        touch(&saliency.join("orphan.png"));

        let pairs = PairLoader::new(&images, &saliency).load_pairs().unwrap();
        let stems: Vec<String> = pairs.iter().map(|p| p.stem()).collect();
        assert_eq!(stems, vec!["a", "b"]);
        assert_eq!(pairs[0].saliency_path, saliency.join("a.png"));
    }

    #[test]
    fn test_missing_directory_is_config_error() {
        let root = tempdir().unwrap();
        let err  = PairLoader::new(root.path().join("nope"), root.path())
            .load_pairs()
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CritiqueError>(),
            Some(CritiqueError::Config(_))
        ));
    }

    #[test]
    fn test_empty_directory_gives_no_pairs() {
        let root = tempdir().unwrap();
        let pairs = PairLoader::new(root.path(), root.path()).load_pairs().unwrap();
        assert!(pairs.is_empty());
    }
}
