//! Patch decomposer: treats a unified-diff file as a container of one
//! virtual file per patched target.

use std::{
    fs,
    path::{Path, PathBuf},
};

use patch::{Line, Patch};

use crate::error::Error;
use crate::path_utils::{safe_path, EXTRACT_SUFFIX};

/// Extract each patch item of the patch file at `source` into `target_dir`,
/// mimicking the directory structure the patch would apply against.
pub fn extract(source: &Path, target_dir: &Path) -> Result<Vec<String>, Error> {
    let content = fs::read_to_string(source)?;
    let patches = Patch::from_multiple(&content)
        .map_err(|_| Error::PatchParse { path: source.to_path_buf() })?;

    if patches.is_empty() {
        return Err(Error::PatchParse { path: source.to_path_buf() });
    }

    for ptch in &patches {
        // Prefer the target path for naming the subfile, unless the target
        // is a deletion (/dev/null), in which case use the source path.
        let chosen = if ptch.new.path.contains("/dev/null") {
            ptch.old.path.as_ref()
        } else {
            ptch.new.path.as_ref()
        };

        let relative = safe_path(chosen, true);
        let parent = relative.parent().unwrap_or_else(|| Path::new(""));
        fs::create_dir_all(target_dir.join(parent))?;

        let base_subfile_path = target_dir.join(&relative);
        let subfile_path = unique_subfile_path(base_subfile_path);

        fs::write(&subfile_path, render_patch_text(ptch))?;
    }

    Ok(Vec::new())
}

/// Walk a counter starting at 0, appending `_{N}` to the base path, until
/// neither the bare candidate nor its `EXTRACT_SUFFIX`-appended form exists.
fn unique_subfile_path(base_subfile_path: PathBuf) -> PathBuf {
    let mut counter = 0u32;
    let mut candidate = base_subfile_path.clone();
    while candidate.exists() || with_suffix(&candidate, EXTRACT_SUFFIX).exists() {
        candidate = PathBuf::from(format!("{}_{counter}", base_subfile_path.display()));
        counter += 1;
    }
    with_suffix(&candidate, EXTRACT_SUFFIX)
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut s = path.as_os_str().to_os_string();
    s.push(suffix);
    PathBuf::from(s)
}

/// Regenerate a patch item as unified-diff text: `---`/`+++` file lines, the
/// `@@ … @@` hunk header, then the hunk body lines.
///
/// The `patch` crate's parsed `Patch` does not retain any header text that
/// preceded the `---` line (e.g. `diff --git` lines, commit metadata), so a
/// multi-item patch file with per-item headers loses that text on
/// regeneration. Only the `---`/`+++`/`@@` lines and hunk bodies survive.
fn render_patch_text(ptch: &Patch<'_>) -> String {
    let mut out = String::new();
    out.push_str(&format!("--- {}\n", ptch.old.path));
    out.push_str(&format!("+++ {}\n", ptch.new.path));
    for hunk in &ptch.hunks {
        out.push_str(&format!(
            "@@ -{},{} +{},{} @@ {}\n",
            hunk.old_range.start,
            hunk.old_range.count,
            hunk.new_range.start,
            hunk.new_range.count,
            hunk.range_hint,
        ));
        for line in &hunk.lines {
            match line {
                Line::Add(text) => out.push_str(&format!("+{text}\n")),
                Line::Remove(text) => out.push_str(&format!("-{text}\n")),
                Line::Context(text) => out.push_str(&format!(" {text}\n")),
            }
        }
    }
    out
}

#[cfg(test)]
mod test {
    use super::*;
    use tempfile::tempdir;

    const SAMPLE_PATCH: &str = "\
--- a/src/lib.rs
+++ b/src/lib.rs
@@ -1,3 +1,3 @@
 fn main() {
-    println!(\"old\");
+    println!(\"new\");
 }
";

    #[test]
    fn extracts_a_single_patch_item() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("fix.patch");
        fs::write(&source, SAMPLE_PATCH).unwrap();
        let target_dir = dir.path().join("fix.patch-extract");
        fs::create_dir(&target_dir).unwrap();

        let warnings = extract(&source, &target_dir).unwrap();
        assert!(warnings.is_empty());

        let written = target_dir.join("src/lib.rs-extract");
        assert!(written.exists());
        let content = fs::read_to_string(&written).unwrap();
        assert!(content.contains("--- a/src/lib.rs"));
        assert!(content.contains("+++ b/src/lib.rs"));
        assert!(content.contains("@@ -1,3 +1,3 @@"));
    }

    #[test]
    fn rejects_unparseable_patch() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("garbage.patch");
        fs::write(&source, "not a patch at all").unwrap();
        let target_dir = dir.path().join("garbage.patch-extract");
        fs::create_dir(&target_dir).unwrap();

        let result = extract(&source, &target_dir);
        assert!(matches!(result, Err(Error::PatchParse { .. })));
    }

    #[test]
    fn deletion_target_uses_source_path() {
        let deletion_patch = "\
--- a/removed.rs
+++ /dev/null
@@ -1,1 +0,0 @@
-gone
";
        let dir = tempdir().unwrap();
        let source = dir.path().join("del.patch");
        fs::write(&source, deletion_patch).unwrap();
        let target_dir = dir.path().join("del.patch-extract");
        fs::create_dir(&target_dir).unwrap();

        extract(&source, &target_dir).unwrap();
        assert!(target_dir.join("removed.rs-extract").exists());
    }
}
