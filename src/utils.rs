//! Utility functions for path naming, directory creation and disk space

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Characters NTFS does not accept in file names
const ILLEGAL_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Appended to a base name each time it is shortened
const ELLIPSIS: &str = "...";

/// Number of characters removed from the base name per shortening step
const SHORTEN_BY: usize = 4;

/// Turn arbitrary text into a single-line, filesystem-legal name fragment
///
/// Trims, turns newlines into spaces, deletes `< > : " / \ | ? *` and control
/// characters (0x00-0x1F), then collapses whitespace runs into single spaces.
/// The result may be empty. Applying it twice gives the same result as once.
///
/// # Examples
///
/// ```
/// use imgur_dl::utils::sanitize_path;
///
/// assert_eq!(sanitize_path("Foo/Bar: Baz"), "FooBar Baz");
/// assert_eq!(sanitize_path("  two\nlines  "), "two lines");
/// assert_eq!(sanitize_path("<>?*"), "");
/// ```
#[must_use]
pub fn sanitize_path(text: &str) -> String {
    let cleaned: String = text
        .trim()
        .chars()
        .map(|c| if c == '\n' { ' ' } else { c })
        .filter(|c| !ILLEGAL_CHARS.contains(c) && u32::from(*c) >= 0x20)
        .collect();

    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Create the output directory for an album
///
/// With an empty `base_name` the directory is named after `album_id` alone.
/// Otherwise `"{base_name} - {album_id}"` is tried; while the OS rejects the
/// name as too long, the last four characters of the base name are replaced by
/// `...` and creation is retried. Once nothing but the marker would remain the
/// identifier-only name is used.
///
/// Exactly one directory is created on success. Existing directories are never
/// reused: any failure other than "name too long" is returned as
/// [`Error::DirectoryCreate`].
pub fn allocate_album_dir(parent: &Path, base_name: &str, album_id: &str) -> Result<PathBuf> {
    let mut base = base_name.to_string();

    loop {
        if base.is_empty() {
            let path = parent.join(album_id);
            return match std::fs::create_dir(&path) {
                Ok(()) => Ok(path),
                Err(source) => Err(Error::DirectoryCreate { path, source }),
            };
        }

        let path = parent.join(format!("{base} - {album_id}"));
        match std::fs::create_dir(&path) {
            Ok(()) => return Ok(path),
            Err(e) if is_name_too_long(&e) => {
                base = shorten(&base);
                tracing::debug!(album_id, base = %base, "directory name too long, shortening");
            }
            Err(source) => return Err(Error::DirectoryCreate { path, source }),
        }
    }
}

/// Drop the last characters of `base` and mark the cut; empty once nothing is left
fn shorten(base: &str) -> String {
    let keep = base.chars().count().saturating_sub(SHORTEN_BY);
    let stem: String = base.chars().take(keep).collect();
    if stem.is_empty() {
        String::new()
    } else {
        format!("{stem}{ELLIPSIS}")
    }
}

/// Whether a directory creation failed because the name exceeds the filesystem limit
fn is_name_too_long(error: &std::io::Error) -> bool {
    #[cfg(unix)]
    {
        if error.raw_os_error() == Some(libc::ENAMETOOLONG) {
            return true;
        }
    }

    error.kind() == std::io::ErrorKind::InvalidFilename
}

/// Get available disk space for a given path
///
/// Uses platform-specific APIs to query filesystem statistics:
/// - Linux: statvfs
/// - macOS: statvfs
/// - Windows: GetDiskFreeSpaceExW
///
/// # Returns
///
/// Returns the available disk space in bytes, or an IO error if the check fails.
pub fn get_available_space(path: &Path) -> std::io::Result<u64> {
    #[cfg(unix)]
    {
        use std::ffi::CString;
        use std::os::unix::ffi::OsStrExt;

        let c_path = CString::new(path.as_os_str().as_bytes())
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

        // SAFETY: c_path is a valid, null-terminated C string, stat is zeroed before
        // the call and only read after statvfs reports success.
        unsafe {
            let mut stat: libc::statvfs = std::mem::zeroed();
            if libc::statvfs(c_path.as_ptr(), &mut stat) != 0 {
                return Err(std::io::Error::last_os_error());
            }

            // f_bavail is available blocks for unprivileged users
            #[allow(clippy::unnecessary_cast)]
            let available_bytes = (stat.f_bavail as u64).saturating_mul(stat.f_frsize as u64);
            Ok(available_bytes)
        }
    }

    #[cfg(windows)]
    {
        use std::os::windows::ffi::OsStrExt;
        use winapi::um::fileapi::GetDiskFreeSpaceExW;

        let wide_path: Vec<u16> = path
            .as_os_str()
            .encode_wide()
            .chain(std::iter::once(0))
            .collect();

        // SAFETY: wide_path is null-terminated and every output pointer refers to a
        // live, aligned u64; outputs are only read after a successful call.
        unsafe {
            let mut free_bytes_available: u64 = 0;
            let mut _total_bytes: u64 = 0;
            let mut _total_free_bytes: u64 = 0;

            if GetDiskFreeSpaceExW(
                wide_path.as_ptr(),
                &mut free_bytes_available as *mut u64 as *mut _,
                &mut _total_bytes as *mut u64 as *mut _,
                &mut _total_free_bytes as *mut u64 as *mut _,
            ) == 0
            {
                return Err(std::io::Error::last_os_error());
            }

            Ok(free_bytes_available)
        }
    }

    #[cfg(not(any(unix, windows)))]
    {
        let _ = path;
        Err(std::io::Error::new(
            std::io::ErrorKind::Unsupported,
            "Disk space checking is not supported on this platform",
        ))
    }
}
