// FUSE mount management
//
// Provides functions to mount and unmount the posts filesystem via FUSE.

use super::{FilesystemInterface, FuseAdapter};
use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tokio::runtime::Runtime;

/// Mount options for FUSE filesystem
#[derive(Debug, Clone)]
pub struct MountOptions {
    /// Allow other users to access the filesystem
    pub allow_other: bool,

    /// Allow root to access the filesystem
    pub allow_root: bool,

    /// Mount as read-only
    pub read_only: bool,

    /// Filesystem name (for mtab)
    pub fsname: Option<String>,

    /// Auto-unmount on process exit
    pub auto_unmount: bool,
}

impl Default for MountOptions {
    fn default() -> Self {
        Self {
            allow_other: false,
            allow_root: false,
            read_only: false,
            fsname: Some("postfs".to_string()),
            auto_unmount: false,
        }
    }
}

impl MountOptions {
    /// Convert to fuser mount options
    fn to_fuser_options(&self) -> Vec<fuser::MountOption> {
        let mut options = Vec::new();

        if self.allow_other {
            options.push(fuser::MountOption::AllowOther);
        }

        if self.allow_root {
            options.push(fuser::MountOption::AllowRoot);
        }

        if self.read_only {
            options.push(fuser::MountOption::RO);
        }

        if let Some(ref fsname) = self.fsname {
            options.push(fuser::MountOption::FSName(fsname.clone()));
        }

        if self.auto_unmount {
            options.push(fuser::MountOption::AutoUnmount);
        }

        options
    }
}

/// Mount a filesystem backend via FUSE
///
/// # Arguments
/// * `backend` - Filesystem implementation served at the mount point
/// * `mountpoint` - Directory to mount at
/// * `options` - Mount options
/// * `runtime` - Runtime the backend futures are driven on
///
/// # Returns
/// A session handle that keeps the filesystem mounted until dropped
pub fn mount(
    backend: Arc<dyn FilesystemInterface>,
    mountpoint: impl AsRef<Path>,
    options: MountOptions,
    runtime: Arc<Runtime>,
) -> Result<fuser::BackgroundSession> {
    let mountpoint = mountpoint.as_ref();

    check_mountpoint(mountpoint)?;

    let adapter = FuseAdapter::with_runtime(backend, runtime);

    let fuser_options = options.to_fuser_options();

    tracing::info!(
        mountpoint = %mountpoint.display(),
        read_only = options.read_only,
        allow_other = options.allow_other,
        "Mounting posts filesystem"
    );

    // Mount filesystem in background
    let session = fuser::spawn_mount2(adapter, mountpoint, &fuser_options)
        .context("Failed to mount filesystem")?;

    tracing::info!("Filesystem mounted successfully");

    Ok(session)
}

fn check_mountpoint(mountpoint: &Path) -> Result<()> {
    if !mountpoint.exists() {
        anyhow::bail!("Mount point does not exist: {}", mountpoint.display());
    }

    if !mountpoint.is_dir() {
        anyhow::bail!("Mount point is not a directory: {}", mountpoint.display());
    }

    Ok(())
}

/// Unmount a FUSE filesystem
///
/// Note: This is automatically handled when the BackgroundSession is dropped,
/// but this function can be used for explicit unmounting.
pub fn unmount(mountpoint: impl AsRef<Path>) -> Result<()> {
    let mountpoint = mountpoint.as_ref();

    tracing::info!(mountpoint = %mountpoint.display(), "Unmounting filesystem");

    #[cfg(target_os = "linux")]
    let mut command = std::process::Command::new("fusermount");
    #[cfg(target_os = "linux")]
    command.arg("-u");

    #[cfg(not(target_os = "linux"))]
    let mut command = std::process::Command::new("umount");

    let output = command.arg(mountpoint).output().context("Failed to execute unmount command")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!("Failed to unmount: {}", stderr);
    }

    tracing::info!("Filesystem unmounted successfully");

    Ok(())
}
