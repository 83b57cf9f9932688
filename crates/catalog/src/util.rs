use std::fs;
use std::io;
use std::io::ErrorKind;
use std::path::Path;

/// Replaces the file at `path` atomically via a temporary sibling and rename.
/// 透過臨時檔案與 rename 原子性地覆寫 `path` 指向的檔案。
pub fn write_atomic(path: &Path, data: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, data)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Removes a file, treating an already-absent file as success.
/// 移除檔案；檔案原本就不存在時視為成功。
pub fn remove_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err),
    }
}
