//! Expansion of command line sources into upload descriptors

use anyhow::{Context, Result};
use sendq_client::path;
use sendq_types::FileDescriptor;
use std::path::{Component, Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Describe every file and directory under `sources`, placed below `remote_dir`
///
/// Directories are walked in name order, each directory ahead of its contents. Directory
/// descriptors end in `/.` so that their parent path is the directory itself.
pub fn collect(sources: &[PathBuf], remote_dir: &str) -> Result<Vec<FileDescriptor>> {
    let mut descriptors = Vec::new();

    for source in sources {
        let metadata = std::fs::metadata(source)
            .with_context(|| format!("Cannot read {}", source.display()))?;
        let remote = path::join(remote_dir, &source_name(source)?);

        if metadata.is_dir() {
            collect_directory(source, &remote, &mut descriptors)?;
        } else {
            descriptors.push(FileDescriptor::file(source, remote, metadata.len()));
        }
    }

    Ok(descriptors)
}

fn collect_directory(
    source: &Path,
    remote_base: &str,
    descriptors: &mut Vec<FileDescriptor>,
) -> Result<()> {
    for entry in WalkDir::new(source).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to walk {}", source.display()))?;
        let relative = entry.path().strip_prefix(source)?;
        let remote = if relative.as_os_str().is_empty() {
            remote_base.to_string()
        } else {
            path::join(remote_base, &to_remote(relative))
        };

        let file_type = entry.file_type();
        if file_type.is_dir() {
            descriptors.push(FileDescriptor::directory(entry.path(), format!("{}/.", remote)));
        } else if file_type.is_file() {
            let size = entry
                .metadata()
                .with_context(|| format!("Cannot read {}", entry.path().display()))?
                .len();
            descriptors.push(FileDescriptor::file(entry.path(), remote, size));
        } else {
            debug!("Skipping special file {}", entry.path().display());
        }
    }

    Ok(())
}

fn source_name(source: &Path) -> Result<String> {
    let name = match source.file_name() {
        Some(name) => name.to_os_string(),
        None => source
            .canonicalize()?
            .file_name()
            .map(ToOwned::to_owned)
            .with_context(|| format!("Cannot upload {} as a whole", source.display()))?,
    };
    Ok(name.to_string_lossy().into_owned())
}

fn to_remote(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
