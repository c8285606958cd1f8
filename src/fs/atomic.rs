//! 原子写入工具。
//!
//! 先写同目录下的临时文件并 fsync，成功后 rename 覆盖目标文件。
//! 写入失败时目标文件保持原样，临时文件被清理。

use std::ffi::OsStr;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// 原子写文件，已存在的目标会被覆盖。
pub fn write_atomic<F>(target: &Path, write_fn: F) -> io::Result<()>
where
    F: FnOnce(&mut File) -> io::Result<()>,
{
    let parent = match target.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        Some(_) => Path::new("."),
        None => {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("no parent directory for {}", target.display()),
            ));
        }
    };

    let tmp_path = tmp_path_for(parent, target.file_name());
    let mut tmp_file = File::create(&tmp_path)?;

    let written = write_fn(&mut tmp_file).and_then(|()| tmp_file.sync_all());
    drop(tmp_file);

    if let Err(err) = written {
        let _ = fs::remove_file(&tmp_path);
        return Err(err);
    }

    // Windows 上 rename 不会覆盖已存在的文件
    #[cfg(windows)]
    {
        if target.exists() {
            fs::remove_file(target)?;
        }
    }

    if let Err(err) = fs::rename(&tmp_path, target) {
        let _ = fs::remove_file(&tmp_path);
        return Err(err);
    }

    Ok(())
}

fn tmp_path_for(parent: &Path, file_name: Option<&OsStr>) -> PathBuf {
    let base_name = file_name
        .map(OsStr::to_string_lossy)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "imgvault-output".into());

    let counter = TMP_COUNTER.fetch_add(1, Ordering::Relaxed);

    parent.join(format!(
        ".{base_name}.tmp-{}-{counter}",
        std::process::id()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn overwrites_existing_target() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.bin");
        fs::write(&target, b"old contents").unwrap();

        write_atomic(&target, |f| f.write_all(b"new")).unwrap();

        assert_eq!(fs::read(&target).unwrap(), b"new");
    }

    #[test]
    fn failed_write_leaves_target_and_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.bin");
        fs::write(&target, b"keep me").unwrap();

        let result = write_atomic(&target, |_| Err(io::Error::other("boom")));

        assert!(result.is_err());
        assert_eq!(fs::read(&target).unwrap(), b"keep me");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
