use std::fs;
use std::io;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::component::{Component, ComponentError, ASSETS_DIR, IMAGES_DIR};
use crate::paths::Directory;
use crate::property::{Property, PROP_NAME};
use crate::util::write_atomic;

/// Workspace manifest file at the root of a catalog.
pub const WORKSPACE_MANIFEST_FILE: &str = "PartCat.pcw";
/// Directory holding one sub-directory per component.
pub const COMPONENTS_DIR: &str = "components";

/// Errors raised by workspace operations.
/// 工作區操作可能出現的錯誤。
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("workspace IO error: {0}")]
    Io(#[from] io::Error),
    #[error("workspace root {} does not exist", .0.display())]
    RootNotFound(PathBuf),
    #[error("workspace root {} already exists", .0.display())]
    AlreadyExists(PathBuf),
    #[error("workspace is not open")]
    NotOpen,
    #[error("component index {index} is out of range ({len} components)")]
    ComponentIndexOutOfRange { index: usize, len: usize },
    #[error(transparent)]
    Component(#[from] ComponentError),
}

/// The root container of one catalog: a directory of component
/// sub-directories plus workspace-level properties.
/// 單一目錄系統的根容器：由元件子目錄與工作區層級屬性組成。
///
/// The component snapshot is only valid while the workspace is open; every
/// accessor fails with [`WorkspaceError::NotOpen`] on a closed workspace
/// rather than handing out stale data. The last root is retained across
/// `close` so `refresh` can re-open it.
#[derive(Debug, Default)]
pub struct Workspace {
    directory: Option<Directory>,
    properties: Vec<Property>,
    components: Vec<Component>,
    opened: bool,
}

impl Workspace {
    /// Creates a closed, empty workspace.
    /// 建立關閉且空白的工作區。
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a workspace skeleton on disk: the root, a `components/`
    /// directory, an `assets/images/` directory, and an empty manifest.
    /// 在磁碟上建立工作區骨架：根目錄、`components/`、`assets/images/`
    /// 以及空白 manifest。
    pub fn create(path: impl AsRef<Path>) -> Result<(), WorkspaceError> {
        let root = Directory::new(path.as_ref());
        if root.exists() {
            return Err(WorkspaceError::AlreadyExists(root.path().to_path_buf()));
        }
        root.create()?;
        Directory::from(root.concat(COMPONENTS_DIR)).create()?;
        Directory::from(root.concat(ASSETS_DIR).concat(IMAGES_DIR)).create()?;
        write_atomic(root.concat(WORKSPACE_MANIFEST_FILE).as_path(), b"")?;
        Ok(())
    }

    /// Opens a workspace from its root directory or from the path of its
    /// `PartCat.pcw` manifest (the file a picker dialog would hand over).
    /// On any failure the workspace is left closed.
    /// 從根目錄或 `PartCat.pcw` 檔案路徑開啟工作區；失敗時工作區維持關閉。
    pub fn open(&mut self, path: impl AsRef<Path>) -> Result<(), WorkspaceError> {
        self.close();

        let root = Directory::new(resolve_root(path.as_ref()));
        if !root.exists() {
            return Err(WorkspaceError::RootNotFound(root.path().to_path_buf()));
        }

        let properties = load_workspace_properties(&root)?;
        let components_dir = Directory::from(root.concat(COMPONENTS_DIR));
        let mut components = Vec::new();
        for sub in components_dir.sub_directories()? {
            components.push(Component::load(sub)?);
        }

        self.directory = Some(root);
        self.properties = properties;
        self.components = components;
        self.opened = true;
        Ok(())
    }

    /// Closes the workspace, discarding the component snapshot and the
    /// workspace properties. Idempotent.
    /// 關閉工作區並丟棄元件快照與工作區屬性；可重複呼叫。
    pub fn close(&mut self) {
        self.opened = false;
        self.properties.clear();
        self.components.clear();
    }

    /// Re-opens the retained root, rebuilding every component from disk
    /// and discarding unsaved in-memory edits.
    /// 重新開啟先前的根目錄，自磁碟重建所有元件並捨棄未儲存的修改。
    pub fn refresh(&mut self) -> Result<(), WorkspaceError> {
        let Some(root) = self.directory.clone() else {
            return Err(WorkspaceError::NotOpen);
        };
        self.close();
        self.open(root.path().as_path())
    }

    /// True while the workspace holds a valid snapshot.
    /// 工作區持有有效快照時回傳 `true`。
    pub fn is_open(&self) -> bool {
        self.opened
    }

    /// Borrows the workspace root, if one has ever been opened.
    /// 借出工作區根目錄（若曾經開啟過）。
    pub fn directory(&self) -> Option<&Directory> {
        self.directory.as_ref()
    }

    /// Returns the `components/` directory of the current root.
    /// 取得目前根目錄下的 `components/` 目錄。
    pub fn components_directory(&self) -> Result<Directory, WorkspaceError> {
        match &self.directory {
            Some(root) => Ok(Directory::from(root.concat(COMPONENTS_DIR))),
            None => Err(WorkspaceError::NotOpen),
        }
    }

    /// Returns the display name: the declared `Name` property when the
    /// manifest carries one, otherwise the root directory's leaf name.
    /// 取得顯示名稱：manifest 宣告的 `Name` 屬性優先，否則採用根目錄名稱。
    pub fn name(&self) -> Option<&str> {
        let declared = self
            .properties
            .iter()
            .find(|prop| prop.name() == PROP_NAME)
            .map(Property::value);
        declared.or_else(|| self.directory.as_ref().map(Directory::name))
    }

    /// Returns the workspace-level properties in manifest order.
    /// 依 manifest 順序取得工作區層級屬性。
    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    /// Returns the component snapshot; fails while closed.
    /// 取得元件快照；工作區關閉時回傳錯誤。
    pub fn components(&self) -> Result<&[Component], WorkspaceError> {
        if !self.opened {
            return Err(WorkspaceError::NotOpen);
        }
        Ok(&self.components)
    }

    /// Bounds-checked component lookup; out-of-range indices are an
    /// explicit error, and callers decide whether that is fatal.
    /// 具邊界檢查的元件查詢；索引超出範圍時回傳明確錯誤。
    pub fn component(&self, index: usize) -> Result<&Component, WorkspaceError> {
        let components = self.components()?;
        components
            .get(index)
            .ok_or(WorkspaceError::ComponentIndexOutOfRange {
                index,
                len: components.len(),
            })
    }

    /// Mutable counterpart of [`Workspace::component`].
    /// [`Workspace::component`] 的可變版本。
    pub fn component_mut(&mut self, index: usize) -> Result<&mut Component, WorkspaceError> {
        if !self.opened {
            return Err(WorkspaceError::NotOpen);
        }
        let len = self.components.len();
        self.components
            .get_mut(index)
            .ok_or(WorkspaceError::ComponentIndexOutOfRange { index, len })
    }

    /// Finds a component's snapshot index by name; `None` when the
    /// workspace is closed or no component matches.
    /// 依名稱尋找元件在快照中的索引；工作區關閉或查無元件時回傳 `None`。
    pub fn component_named(&self, name: &str) -> Option<usize> {
        if !self.opened {
            return None;
        }
        self.components
            .iter()
            .position(|component| component.name() == name)
    }

    /// Takes a component out of the snapshot, transferring ownership to
    /// the caller — the step before deleting it or saving it elsewhere.
    /// The snapshot order of the remaining components is preserved.
    /// 自快照中取出元件並移轉所有權（通常用於刪除或另存），其餘元件維持
    /// 原本順序。
    pub fn take_component(&mut self, index: usize) -> Result<Component, WorkspaceError> {
        if !self.opened {
            return Err(WorkspaceError::NotOpen);
        }
        let len = self.components.len();
        if index >= len {
            return Err(WorkspaceError::ComponentIndexOutOfRange { index, len });
        }
        Ok(self.components.remove(index))
    }
}

fn resolve_root(path: &Path) -> PathBuf {
    if path.is_file() {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => path.to_path_buf(),
        }
    } else {
        path.to_path_buf()
    }
}

fn load_workspace_properties(root: &Directory) -> Result<Vec<Property>, WorkspaceError> {
    match fs::read_to_string(root.concat(WORKSPACE_MANIFEST_FILE)) {
        Ok(contents) => {
            let mut properties = Vec::new();
            for line in contents.lines() {
                // Same leniency as component manifests.
                if let Ok(prop) = Property::parse_line(line) {
                    properties.push(prop);
                }
            }
            Ok(properties)
        }
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(Vec::new()),
        Err(err) => Err(WorkspaceError::Io(err)),
    }
}
