use std::fmt;
use std::fs;
use std::io;
use std::io::ErrorKind;
use std::path::{Path, PathBuf, MAIN_SEPARATOR_STR};

/// A filesystem location as the catalog sees it.
/// 目錄系統中代表檔案位置的值型別。
///
/// Trailing separators are normalized away at construction, so
/// `file_name` and `parent` behave uniformly regardless of how the
/// caller spelled the path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsPath {
    path: PathBuf,
}

impl FsPath {
    /// Wraps and normalizes a path value.
    /// 包裝並正規化路徑值。
    pub fn new(path: impl Into<PathBuf>) -> Self {
        // Collecting the components drops trailing and doubled separators
        // while leaving a bare root untouched.
        let path: PathBuf = path.into().components().collect();
        Self { path }
    }

    /// Borrows the underlying standard-library path.
    /// 借出底層的標準函式庫路徑。
    pub fn as_path(&self) -> &Path {
        &self.path
    }

    /// Clones the underlying path buffer.
    /// 複製底層的路徑緩衝。
    pub fn to_path_buf(&self) -> PathBuf {
        self.path.clone()
    }

    /// Appends a child segment with exactly one separator.
    /// 以單一分隔符號銜接子路徑。
    pub fn concat(&self, child: impl AsRef<Path>) -> FsPath {
        let child = child.as_ref();
        // A leading separator on the child would make `join` replace the
        // base outright; treat it as a relative segment instead.
        match child.strip_prefix(MAIN_SEPARATOR_STR) {
            Ok(relative) => FsPath::new(self.path.join(relative)),
            Err(_) => FsPath::new(self.path.join(child)),
        }
    }

    /// Strips the last segment; a filesystem root is its own parent.
    /// 去除最後一段路徑；根目錄的上層仍是根目錄本身。
    pub fn parent(&self) -> FsPath {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => FsPath::new(parent.to_path_buf()),
            _ => self.clone(),
        }
    }

    /// Returns the last path segment, empty only for a bare root.
    /// 取得最後一段路徑名稱；僅根目錄會得到空字串。
    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default()
    }

    /// Checks whether any filesystem entry (file or directory) is present.
    /// 檢查檔案系統中是否存在任何對應項目（檔案或目錄皆可）。
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Moves the entry to a sibling name, updating the stored value only on
    /// success. An existing target is refused up front so a rename can never
    /// clobber a sibling entry.
    /// 將項目改名為同層的新名稱；僅在成功時更新內部值，且預先拒絕已存在的
    /// 目標名稱，避免覆蓋其他項目。
    pub fn rename(&mut self, new_leaf: &str) -> io::Result<()> {
        let target = self.parent().concat(new_leaf);
        if target.exists() {
            return Err(io::Error::new(
                ErrorKind::AlreadyExists,
                format!("rename target {} already exists", target),
            ));
        }
        fs::rename(&self.path, target.as_path())?;
        self.path = target.path;
        Ok(())
    }
}

impl fmt::Display for FsPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.path.display().fmt(f)
    }
}

impl AsRef<Path> for FsPath {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

/// A path known to denote a container of catalog entries.
/// 已知指向容器（目錄）的路徑。
///
/// Wraps an [`FsPath`] by composition and adds enumeration and lifecycle
/// operations for directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directory {
    path: FsPath,
}

impl Directory {
    /// Binds a directory abstraction to the given location.
    /// 將目錄抽象綁定到指定位置。
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: FsPath::new(path),
        }
    }

    /// Borrows the wrapped path value.
    /// 借出內部的路徑值。
    pub fn path(&self) -> &FsPath {
        &self.path
    }

    /// Returns the directory's own name (the last path segment).
    /// 取得目錄自身的名稱（最後一段路徑）。
    pub fn name(&self) -> &str {
        self.path.file_name()
    }

    /// Checks whether the entry is present on disk.
    /// 檢查此項目是否存在於磁碟。
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Builds the path of an entry inside this directory.
    /// 組合出此目錄內某個項目的路徑。
    pub fn concat(&self, child: impl AsRef<Path>) -> FsPath {
        self.path.concat(child)
    }

    /// Creates the directory (and any missing ancestors).
    /// 建立此目錄（含缺少的上層目錄）。
    pub fn create(&self) -> io::Result<()> {
        fs::create_dir_all(self.path.as_path())
    }

    /// Renames the directory in place; see [`FsPath::rename`].
    /// 就地重新命名目錄；行為同 [`FsPath::rename`]。
    pub fn rename(&mut self, new_leaf: &str) -> io::Result<()> {
        self.path.rename(new_leaf)
    }

    /// Lists the immediate child directories in filesystem enumeration
    /// order. Plain files are filtered out; nothing is sorted.
    /// 依檔案系統列舉順序取得直接子目錄；過濾一般檔案，不做排序。
    pub fn sub_directories(&self) -> io::Result<Vec<Directory>> {
        let mut subs = Vec::new();
        for entry in fs::read_dir(self.path.as_path())? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                subs.push(Directory::new(entry.path()));
            }
        }
        Ok(subs)
    }

    /// Removes the directory tree; any constituent failure surfaces.
    /// 遞迴刪除整個目錄樹；任何子項目刪除失敗都會回報錯誤。
    pub fn delete_recursively(&self) -> io::Result<()> {
        fs::remove_dir_all(self.path.as_path())
    }
}

impl From<FsPath> for Directory {
    fn from(path: FsPath) -> Self {
        Self { path }
    }
}

impl fmt::Display for Directory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.path.fmt(f)
    }
}
