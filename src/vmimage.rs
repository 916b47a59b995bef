//! VM disk image external collaborator: shells out to `guestfish` (from
//! libguestfs) to list and extract the filesystem(s) inside a VM disk image.
//!
//! Linux-only. Requires a readable kernel image under `/boot/vmlinuz-*`,
//! which libguestfs needs to boot its helper appliance.

use std::{
    env, fs,
    path::{Path, PathBuf},
    process::Command,
};

use compress_tools::{uncompress_archive, Ownership};
use tempfile::Builder;

use crate::error::Error;

/// Environment variable overriding discovery of the `guestfish` binary.
pub const EXTRACTCODE_GUESTFISH_PATH_ENVVAR: &str = "EXTRACTCODE_GUESTFISH_PATH";

const SKIP_PARTITIONS: &[&str] = &["swap"];

/// A VM disk image opened for extraction via `guestfish`.
#[derive(Debug, Clone)]
pub struct VmImage {
    location: PathBuf,
    image_format: &'static str,
    guestfish_command: PathBuf,
}

fn extension_format(extension: &str) -> Option<&'static str> {
    match extension {
        ".qcow2" | ".qcow2c" | ".qcow" | ".img" => Some("qcow2"),
        ".vmdk" => Some("vmdk"),
        ".vdi" => Some("vdi"),
        _ => None,
    }
}

fn file_extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
}

/// Check that at least one kernel image under `/boot/vmlinuz-*` exists and is
/// readable. Only enforced on Linux, where libguestfs needs it.
fn check_linux_kernel_is_readable() -> Result<(), Error> {
    if !cfg!(target_os = "linux") {
        return Ok(());
    }
    let boot = Path::new("/boot");
    let kernels: Vec<PathBuf> = fs::read_dir(boot)
        .into_iter()
        .flatten()
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.file_name()
                .map(|n| n.to_string_lossy().starts_with("vmlinuz-"))
                .unwrap_or(false)
        })
        .collect();

    if kernels.is_empty() {
        return Err(Error::KernelUnreadable);
    }
    for kernel in &kernels {
        if fs::File::open(kernel).is_err() {
            return Err(Error::KernelUnreadable);
        }
    }
    Ok(())
}

/// Resolve the `guestfish` command from the environment override, falling
/// back to a `PATH` search.
fn resolve_guestfish_command() -> Result<PathBuf, Error> {
    if let Ok(path) = env::var(EXTRACTCODE_GUESTFISH_PATH_ENVVAR) {
        let candidate = PathBuf::from(&path);
        if candidate.exists() {
            return Ok(candidate);
        }
    }
    which_guestfish().ok_or_else(|| Error::GuestfishNotFound {
        path: PathBuf::from("guestfish"),
    })
}

fn which_guestfish() -> Option<PathBuf> {
    let path_var = env::var_os("PATH")?;
    env::split_paths(&path_var)
        .map(|dir| dir.join("guestfish"))
        .find(|p| p.is_file())
}

impl VmImage {
    /// Build a new `VmImage` from the file at `location`.
    pub fn from_file(location: &Path) -> Result<Self, Error> {
        if !cfg!(target_os = "linux") {
            return Err(Error::NotLinux);
        }
        check_linux_kernel_is_readable()?;

        let abs_location = fs::canonicalize(location).unwrap_or_else(|_| location.to_path_buf());
        if !abs_location.exists() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("the system cannot find the path specified: {abs_location:?}"),
            )));
        }

        let extension = file_extension(&abs_location)
            .ok_or_else(|| Error::NotSupported { path: abs_location.clone() })?;
        let image_format = extension_format(&extension)
            .ok_or_else(|| Error::NotSupported { path: abs_location.clone() })?;

        let guestfish_command = resolve_guestfish_command()?;

        Ok(Self {
            location: abs_location,
            image_format,
            guestfish_command,
        })
    }

    /// List `(partition, fstype)` pairs for every non-swap filesystem in the image.
    pub fn listfs(&self) -> Result<Vec<(String, Option<String>)>, Error> {
        let format_arg = format!("--format={}", self.image_format);
        let location = self.location.to_string_lossy().to_string();
        let args = [
            "--ro",
            &format_arg,
            "--add",
            &location,
            "run",
            ":",
            "list-filesystems",
        ];
        let stdout = self.run_guestfish(&args)?;

        let mut filesystems = Vec::new();
        for entry in stdout.lines() {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }
            let (partition, fstype) = match entry.split_once(':') {
                Some((p, t)) => (p.trim().to_string(), Some(t.trim().to_string())),
                None => (entry.to_string(), None),
            };
            if SKIP_PARTITIONS.iter().any(|skip| partition.contains(skip)) {
                continue;
            }
            filesystems.push((partition, fstype));
        }
        Ok(filesystems)
    }

    /// Extract the whole image to `target_tarball` as a gzip-compressed tarball.
    pub fn extract_image(&self, target_tarball: &Path) -> Result<(), Error> {
        let format_arg = format!("--format={}", self.image_format);
        let location = self.location.to_string_lossy().to_string();
        let tarball = target_tarball.to_string_lossy().to_string();
        let args = [
            "--ro",
            "--inspector",
            &format_arg,
            "--add",
            &location,
            "tar-out",
            "/",
            &tarball,
            "compress:gzip",
        ];
        self.run_guestfish(&args).map(|_| ())
    }

    /// Mount a single partition read-only at `/` and extract it to `target_tarball`.
    pub fn extract_partition(&self, partition: &str, target_tarball: &Path) -> Result<(), Error> {
        let format_arg = format!("--format={}", self.image_format);
        let location = self.location.to_string_lossy().to_string();
        let tarball = target_tarball.to_string_lossy().to_string();
        let args = [
            "--ro",
            &format_arg,
            "--add",
            &location,
            "run",
            ":",
            "mount",
            partition,
            "/",
            ":",
            "tar-out",
            "/",
            &tarball,
            "compress:gzip",
        ];
        self.run_guestfish(&args).map(|_| ())
    }

    fn run_guestfish(&self, args: &[&str]) -> Result<String, Error> {
        let output = Command::new(&self.guestfish_command).args(args).output()?;
        if !output.status.success() {
            return Err(Error::GuestfishFailed {
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

fn extract_tarball(tarball: &Path, target_dir: &Path) -> Result<(), Error> {
    let mut file = fs::File::open(tarball)?;
    uncompress_archive(&mut file, target_dir, Ownership::Ignore)?;
    Ok(())
}

fn staging_dir(as_tarballs: bool, target_dir: &Path) -> Result<PathBuf, Error> {
    if as_tarballs {
        Ok(target_dir.to_path_buf())
    } else {
        Ok(Builder::new().prefix("extractcode-vmimage").tempdir()?.into_path())
    }
}

/// Extract all files from the VM image at `source` into `target_dir`.
///
/// Tries a single-tree extraction first; on failure, falls back to listing
/// filesystems and extracting one tarball per non-swap partition. With a
/// single partition the tarball is placed at the target root; with multiple
/// partitions, each is extracted under a subdirectory named after the
/// partition (slashes replaced with dashes).
pub fn extract_with_options(
    source: &Path,
    target_dir: &Path,
    as_tarballs: bool,
) -> Result<Vec<String>, Error> {
    let vmimage = VmImage::from_file(source)?;
    let mut warnings = Vec::new();
    let filename = source
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let single_tree: Result<(), Error> = (|| {
        let tdir = staging_dir(as_tarballs, target_dir)?;
        let target_tarball = tdir.join(format!("{filename}.tar.gz"));
        vmimage.extract_image(&target_tarball)?;
        if !as_tarballs {
            extract_tarball(&target_tarball, target_dir)?;
        }
        Ok(())
    })();

    if let Err(single_tree_error) = single_tree {
        warnings.push(format!(
            "Cannot extract VM Image filesystems as a single file tree:\n{single_tree_error}"
        ));

        let partitions = vmimage.listfs()?;
        if partitions.is_empty() {
            return Err(single_tree_error);
        }

        if partitions.len() == 1 {
            let (partition, _) = &partitions[0];
            let tdir = staging_dir(as_tarballs, target_dir)?;
            let target_tarball = tdir.join(format!("{filename}.tar.gz"));
            vmimage.extract_partition(partition, &target_tarball)?;
            if !as_tarballs {
                extract_tarball(&target_tarball, target_dir)?;
            }
        } else {
            for (partition, _) in &partitions {
                let base_name = partition.replace('/', "-");
                let tdir = staging_dir(as_tarballs, target_dir)?;
                let partition_tarball = tdir.join(format!("{filename}-{base_name}.tar.gz"));
                vmimage.extract_partition(partition, &partition_tarball)?;
                if !as_tarballs {
                    let partition_target_dir = target_dir.join(&base_name);
                    fs::create_dir_all(&partition_target_dir)?;
                    extract_tarball(&partition_tarball, &partition_target_dir)?;
                }
            }
        }
    }

    Ok(warnings)
}

/// Handler entry point: extract a VM image to its final directory tree.
pub fn extract(source: &Path, target_dir: &Path) -> Result<Vec<String>, Error> {
    extract_with_options(source, target_dir, false)
}
