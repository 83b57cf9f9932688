use std::fs;
use std::io;
use std::io::ErrorKind;
use std::path::PathBuf;

use thiserror::Error;

use crate::paths::Directory;
use crate::property::{Property, PROP_CATEGORY, PROP_PACKAGE, PROP_SUB_CATEGORY};
use crate::util::{remove_if_exists, write_atomic};

/// Manifest file holding a component's property lines.
pub const MANIFEST_FILE: &str = "MANIFEST";
/// File holding the stock quantity as text.
pub const QUANTITY_FILE: &str = "QUANTITY";
/// Optional file holding the base name of the component's image.
pub const IMAGE_FILE: &str = "IMAGE";
/// Optional free-text notes file.
pub const NOTES_FILE: &str = "notes.txt";
/// Optional datasheet stored inside the component directory.
pub const DATASHEET_FILE: &str = "datasheet.pdf";
/// Workspace-level asset directory, two levels above a component.
pub const ASSETS_DIR: &str = "assets";
/// Image directory inside the asset directory.
pub const IMAGES_DIR: &str = "images";
/// Extension of resolvable image files.
const IMAGE_EXTENSION: &str = "bmp";

/// Errors raised by component operations.
/// 元件操作可能出現的錯誤。
#[derive(Debug, Error)]
pub enum ComponentError {
    #[error("component IO error: {0}")]
    Io(#[from] io::Error),
    #[error("'{0}' is not a valid component name")]
    InvalidName(String),
    #[error("component '{0}' already exists")]
    AlreadyExists(String),
    #[error("component is already named '{0}'")]
    SameName(String),
    #[error("property index {index} is out of range ({len} properties)")]
    PropertyIndexOutOfRange { index: usize, len: usize },
}

/// One cataloged part, backed by a directory on disk.
/// 單一元件，由磁碟上的一個目錄作為後盾。
///
/// The component name always mirrors the directory's leaf name. Properties
/// keep their manifest order; notes are read from and written to their side
/// file on demand rather than cached here.
#[derive(Debug, Clone)]
pub struct Component {
    directory: Directory,
    name: String,
    quantity: u32,
    properties: Vec<Property>,
}

impl Component {
    /// Loads a component from its backing directory.
    /// 從元件的目錄載入其內容。
    ///
    /// A missing manifest yields an empty property list and a missing or
    /// unparsable quantity file yields 0; manifest lines that fail to parse
    /// are skipped. Only unexpected I/O failures abort the load, so the
    /// worst case for damaged data is a partially-populated component.
    pub fn load(directory: Directory) -> Result<Self, ComponentError> {
        let name = directory.name().to_string();

        let mut properties = Vec::new();
        match fs::read_to_string(directory.concat(MANIFEST_FILE)) {
            Ok(contents) => {
                for line in contents.lines() {
                    // Malformed lines are skipped, never fatal.
                    if let Ok(prop) = Property::parse_line(line) {
                        properties.push(prop);
                    }
                }
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => return Err(ComponentError::Io(err)),
        }

        let quantity = match fs::read_to_string(directory.concat(QUANTITY_FILE)) {
            Ok(contents) => contents.trim().parse().unwrap_or(0),
            Err(err) if err.kind() == ErrorKind::NotFound => 0,
            Err(err) => return Err(ComponentError::Io(err)),
        };

        Ok(Self {
            directory,
            name,
            quantity,
            properties,
        })
    }

    /// Creates a new, empty component directory under the components root:
    /// an empty manifest and a quantity of 0.
    /// 在元件根目錄下建立全新的空元件：空 manifest 與數量 0。
    pub fn create(components_root: &Directory, name: &str) -> Result<(), ComponentError> {
        validate_name(name)?;
        let target = components_root.concat(name);
        if target.exists() {
            return Err(ComponentError::AlreadyExists(name.to_string()));
        }
        fs::create_dir_all(target.as_path())?;
        write_atomic(target.concat(MANIFEST_FILE).as_path(), b"")?;
        write_atomic(target.concat(QUANTITY_FILE).as_path(), b"0\n")?;
        Ok(())
    }

    /// Returns the component name (the backing directory's leaf name).
    /// 取得元件名稱（即目錄的名稱）。
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Borrows the backing directory.
    /// 借出元件的目錄。
    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    /// Returns the stock quantity.
    /// 取得庫存數量。
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Updates the stock quantity in memory; `save` persists it.
    /// 更新記憶體中的庫存數量；需呼叫 `save` 寫回磁碟。
    pub fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity;
    }

    /// Reads the notes side file on demand; a missing file is empty notes.
    /// 即時讀取備註檔案；檔案不存在視為空備註。
    pub fn notes(&self) -> io::Result<String> {
        match fs::read_to_string(self.directory.concat(NOTES_FILE)) {
            Ok(text) => Ok(text),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(String::new()),
            Err(err) => Err(err),
        }
    }

    /// Writes the notes side file; empty notes remove the file so a
    /// note-less component looks exactly like a freshly created one.
    /// 寫入備註檔案；空備註會移除檔案，使其與新建立的元件一致。
    pub fn save_notes(&self, notes: &str) -> io::Result<()> {
        let path = self.directory.concat(NOTES_FILE);
        if notes.is_empty() {
            remove_if_exists(path.as_path())
        } else {
            write_atomic(path.as_path(), notes.as_bytes())
        }
    }

    /// Returns the properties in manifest order.
    /// 依 manifest 順序取得屬性。
    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    /// Finds the first property with the given storage name.
    /// 依儲存名稱尋找第一個相符的屬性。
    pub fn get_property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|prop| prop.name() == name)
    }

    /// Returns the `Category` property value, if any.
    /// 取得 `Category` 屬性值（如果有）。
    pub fn category(&self) -> Option<&str> {
        self.get_property(PROP_CATEGORY).map(Property::value)
    }

    /// Returns the `Sub-Category` property value, if any.
    /// 取得 `Sub-Category` 屬性值（如果有）。
    pub fn sub_category(&self) -> Option<&str> {
        self.get_property(PROP_SUB_CATEGORY).map(Property::value)
    }

    /// Appends a property; duplicate names are permitted.
    /// 追加一個屬性；允許重複名稱。
    pub fn add_property(&mut self, property: Property) {
        self.properties.push(property);
    }

    /// Borrows a property by position for editing.
    /// 依位置借出屬性以便編輯。
    pub fn property_mut(&mut self, index: usize) -> Result<&mut Property, ComponentError> {
        let len = self.properties.len();
        self.properties
            .get_mut(index)
            .ok_or(ComponentError::PropertyIndexOutOfRange { index, len })
    }

    /// Removes a property by position, returning it. Out-of-range indices
    /// are an explicit error; callers decide whether that is fatal.
    /// 依位置移除並回傳屬性；索引超出範圍時回傳明確錯誤，由呼叫端決定
    /// 嚴重程度。
    pub fn remove_property(&mut self, index: usize) -> Result<Property, ComponentError> {
        let len = self.properties.len();
        if index >= len {
            return Err(ComponentError::PropertyIndexOutOfRange { index, len });
        }
        Ok(self.properties.remove(index))
    }

    /// Resolves the component image: the base name comes from the first
    /// line of the `IMAGE` reference file when present, otherwise from the
    /// `Package` property, and is looked up under `assets/images/` two
    /// levels above the component directory. Missing candidates simply
    /// yield `None` so hosts can show a placeholder.
    /// 解析元件圖片：優先採用 `IMAGE` 參照檔第一行的名稱，否則退回
    /// `Package` 屬性值，再到元件目錄上兩層的 `assets/images/` 尋找。
    /// 找不到時回傳 `None`，供呼叫端顯示預設圖。
    pub fn image(&self) -> Option<PathBuf> {
        let base = match fs::read_to_string(self.directory.concat(IMAGE_FILE)) {
            Ok(contents) => {
                let first = contents.lines().next().unwrap_or("").trim();
                if first.is_empty() {
                    None
                } else {
                    Some(first.to_string())
                }
            }
            Err(_) => None,
        };
        let base = base.or_else(|| self.get_property(PROP_PACKAGE).map(|p| p.value().to_string()))?;

        let candidate = self
            .directory
            .path()
            .parent()
            .parent()
            .concat(ASSETS_DIR)
            .concat(IMAGES_DIR)
            .concat(format!("{base}.{IMAGE_EXTENSION}"));
        candidate.exists().then(|| candidate.to_path_buf())
    }

    /// Returns the datasheet path when one is stored with the component.
    /// 元件目錄中存有規格書時回傳其路徑。
    pub fn datasheet(&self) -> Option<PathBuf> {
        let path = self.directory.concat(DATASHEET_FILE);
        path.exists().then(|| path.to_path_buf())
    }

    /// Persists the manifest and quantity files into the backing
    /// directory, each replaced atomically. The two files are still
    /// separate writes: a failure between them leaves the earlier file in
    /// place, and callers learn the true on-disk state by refreshing.
    /// 將 manifest 與數量檔案原子性地寫回元件目錄。兩個檔案仍是獨立寫入；
    /// 中途失敗時先前寫入的檔案會保留，呼叫端需重新整理以得知實際狀態。
    pub fn save(&self) -> Result<(), ComponentError> {
        self.write_state_to(&self.directory)?;
        Ok(())
    }

    /// Saves the component under a new sibling name, carrying the notes
    /// file along, then retargets the in-memory name and directory in one
    /// step. An unchanged name is rejected before anything touches disk.
    /// 以新名稱另存元件（連同備註檔案），成功後一次更新記憶體中的名稱與
    /// 目錄。名稱未變更時在碰觸磁碟前即拒絕。
    pub fn save_as(&mut self, new_name: &str) -> Result<(), ComponentError> {
        validate_name(new_name)?;
        if new_name == self.name {
            return Err(ComponentError::SameName(new_name.to_string()));
        }
        let target = self.directory.path().parent().concat(new_name);
        if target.exists() {
            return Err(ComponentError::AlreadyExists(new_name.to_string()));
        }

        let notes = self.notes()?;
        let target = Directory::from(target);
        target.create()?;
        self.write_state_to(&target)?;

        self.name = new_name.to_string();
        self.directory = target;
        if !notes.is_empty() {
            self.save_notes(&notes)?;
        }
        Ok(())
    }

    /// Renames the backing directory; the cached name and directory update
    /// together on success, so they can never be observed disagreeing.
    /// 重新命名元件目錄；成功時同時更新快取的名稱與目錄，不會出現兩者
    /// 不一致的狀態。
    pub fn rename(&mut self, new_name: &str) -> Result<(), ComponentError> {
        validate_name(new_name)?;
        self.directory.rename(new_name).map_err(|err| {
            if err.kind() == ErrorKind::AlreadyExists {
                ComponentError::AlreadyExists(new_name.to_string())
            } else {
                ComponentError::Io(err)
            }
        })?;
        self.name = new_name.to_string();
        Ok(())
    }

    /// Deletes the backing directory tree, consuming the component. Any
    /// constituent deletion failure surfaces as the error.
    /// 刪除元件的整個目錄樹並消耗此元件；任何子項目刪除失敗都會回報。
    pub fn delete(self) -> Result<(), ComponentError> {
        self.directory.delete_recursively()?;
        Ok(())
    }

    fn write_state_to(&self, directory: &Directory) -> Result<(), ComponentError> {
        let mut manifest = String::new();
        for prop in &self.properties {
            manifest.push_str(&prop.to_line());
            manifest.push('\n');
        }
        write_atomic(directory.concat(MANIFEST_FILE).as_path(), manifest.as_bytes())?;
        write_atomic(
            directory.concat(QUANTITY_FILE).as_path(),
            format!("{}\n", self.quantity).as_bytes(),
        )?;
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<(), ComponentError> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(ComponentError::InvalidName(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::tempdir;

    fn seed_component(root: &Path, name: &str, manifest: &str, quantity: Option<&str>) -> Directory {
        let dir = root.join("components").join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(MANIFEST_FILE), manifest).unwrap();
        if let Some(quantity) = quantity {
            fs::write(dir.join(QUANTITY_FILE), quantity).unwrap();
        }
        Directory::new(dir)
    }

    #[test]
    fn load_reads_manifest_quantity_and_skips_bad_lines() {
        let root = tempdir().unwrap();
        let dir = seed_component(
            root.path(),
            "R1",
            "Category: Resistors\r\nthis line is noise\nValue-Tolerance: 5%\n",
            Some("47\n"),
        );

        let component = Component::load(dir).unwrap();
        assert_eq!(component.name(), "R1");
        assert_eq!(component.quantity(), 47);
        assert_eq!(component.properties().len(), 2);
        assert_eq!(component.category(), Some("Resistors"));
        let tolerance = component.get_property("Value-Tolerance").unwrap();
        assert_eq!(tolerance.human_name(), "Tolerance");
        assert_eq!(tolerance.value(), "5%");
    }

    #[test]
    fn load_tolerates_missing_and_garbled_side_files() {
        let root = tempdir().unwrap();
        let dir = root.path().join("components").join("bare");
        fs::create_dir_all(&dir).unwrap();

        let component = Component::load(Directory::new(&dir)).unwrap();
        assert_eq!(component.quantity(), 0);
        assert!(component.properties().is_empty());
        assert_eq!(component.notes().unwrap(), "");

        fs::write(dir.join(QUANTITY_FILE), "many\n").unwrap();
        let component = Component::load(Directory::new(&dir)).unwrap();
        assert_eq!(component.quantity(), 0);
    }

    #[test]
    fn duplicate_properties_resolve_to_the_first_match() {
        let root = tempdir().unwrap();
        let dir = seed_component(
            root.path(),
            "dup",
            "Category: First\nCategory: Second\n",
            None,
        );

        let component = Component::load(dir).unwrap();
        assert_eq!(component.properties().len(), 2);
        assert_eq!(component.category(), Some("First"));
    }

    #[test]
    fn save_round_trips_properties_and_quantity() {
        let root = tempdir().unwrap();
        let dir = seed_component(root.path(), "C1", "", Some("0\n"));

        let mut component = Component::load(dir.clone()).unwrap();
        component.set_quantity(12);
        component.add_property(Property::new("Category", "Capacitors"));
        let mut tolerance = Property::empty();
        tolerance.set_human_name("Tolerance");
        tolerance.set_value("10%");
        component.add_property(tolerance);
        component.save().unwrap();

        let reloaded = Component::load(dir).unwrap();
        assert_eq!(reloaded.quantity(), 12);
        assert_eq!(reloaded.category(), Some("Capacitors"));
        assert_eq!(
            reloaded.get_property("Value-Tolerance").map(Property::value),
            Some("10%")
        );
    }

    #[test]
    fn notes_round_trip_and_empty_notes_remove_the_file() {
        let root = tempdir().unwrap();
        let dir = seed_component(root.path(), "noted", "", None);
        let component = Component::load(dir.clone()).unwrap();

        component.save_notes("hand-matched pair\n").unwrap();
        assert_eq!(component.notes().unwrap(), "hand-matched pair\n");

        component.save_notes("").unwrap();
        assert!(!dir.concat(NOTES_FILE).exists());
        assert_eq!(component.notes().unwrap(), "");
    }

    #[test]
    fn remove_property_is_bounds_checked() {
        let root = tempdir().unwrap();
        let dir = seed_component(root.path(), "props", "Category: X\n", None);
        let mut component = Component::load(dir).unwrap();

        let removed = component.remove_property(0).unwrap();
        assert_eq!(removed.name(), "Category");
        let err = component.remove_property(0).unwrap_err();
        assert!(matches!(
            err,
            ComponentError::PropertyIndexOutOfRange { index: 0, len: 0 }
        ));
    }

    #[test]
    fn image_resolves_reference_file_before_package() {
        let root = tempdir().unwrap();
        let images = root.path().join("assets").join("images");
        fs::create_dir_all(&images).unwrap();
        fs::write(images.join("TO-92.bmp"), b"bmp").unwrap();
        fs::write(images.join("custom.bmp"), b"bmp").unwrap();

        let dir = seed_component(root.path(), "Q1", "Package: TO-92\n", None);
        let component = Component::load(dir.clone()).unwrap();
        assert_eq!(component.image(), Some(images.join("TO-92.bmp")));

        fs::write(dir.concat(IMAGE_FILE).as_path(), "custom\n").unwrap();
        let component = Component::load(dir).unwrap();
        assert_eq!(component.image(), Some(images.join("custom.bmp")));
    }

    #[test]
    fn image_is_absent_when_nothing_resolves() {
        let root = tempdir().unwrap();
        let dir = seed_component(root.path(), "mystery", "Package: unknown\n", None);
        let component = Component::load(dir).unwrap();
        // The referenced file does not exist under assets/images.
        assert_eq!(component.image(), None);

        let plain = seed_component(root.path(), "plain", "", None);
        assert_eq!(Component::load(plain).unwrap().image(), None);
    }

    #[test]
    fn datasheet_is_reported_only_when_present() {
        let root = tempdir().unwrap();
        let dir = seed_component(root.path(), "doc", "", None);
        let component = Component::load(dir.clone()).unwrap();
        assert_eq!(component.datasheet(), None);

        fs::write(dir.concat(DATASHEET_FILE).as_path(), b"%PDF").unwrap();
        assert_eq!(
            component.datasheet(),
            Some(dir.concat(DATASHEET_FILE).to_path_buf())
        );
    }

    #[test]
    fn create_builds_an_empty_component() {
        let root = tempdir().unwrap();
        let components = Directory::new(root.path().join("components"));
        components.create().unwrap();

        Component::create(&components, "NE555").unwrap();
        let component =
            Component::load(Directory::new(root.path().join("components").join("NE555"))).unwrap();
        assert_eq!(component.quantity(), 0);
        assert!(component.properties().is_empty());

        let err = Component::create(&components, "NE555").unwrap_err();
        assert!(matches!(err, ComponentError::AlreadyExists(_)));
        let err = Component::create(&components, "bad/name").unwrap_err();
        assert!(matches!(err, ComponentError::InvalidName(_)));
    }

    #[test]
    fn rename_updates_name_and_directory_together() {
        let root = tempdir().unwrap();
        let dir = seed_component(root.path(), "R2", "Category: Resistors\n", None);
        let mut component = Component::load(dir).unwrap();

        component.rename("R2_low_noise").unwrap();
        assert_eq!(component.name(), "R2_low_noise");
        assert_eq!(component.directory().name(), "R2_low_noise");
        assert!(root
            .path()
            .join("components")
            .join("R2_low_noise")
            .join(MANIFEST_FILE)
            .exists());
    }

    #[test]
    fn rename_onto_existing_component_fails_and_changes_nothing() {
        let root = tempdir().unwrap();
        let dir = seed_component(root.path(), "R2", "Category: Resistors\n", None);
        seed_component(root.path(), "R2_new", "", None);
        let mut component = Component::load(dir).unwrap();

        let err = component.rename("R2_new").unwrap_err();
        assert!(matches!(err, ComponentError::AlreadyExists(_)));
        assert_eq!(component.name(), "R2");
        assert_eq!(component.directory().name(), "R2");
        assert!(root.path().join("components").join("R2").exists());
    }

    #[test]
    fn save_as_rejects_unchanged_name_before_touching_disk() {
        let root = tempdir().unwrap();
        let dir = seed_component(root.path(), "U1", "Category: ICs\n", None);
        let mut component = Component::load(dir).unwrap();

        let err = component.save_as("U1").unwrap_err();
        assert!(matches!(err, ComponentError::SameName(_)));
        assert_eq!(component.name(), "U1");
    }

    #[test]
    fn save_as_copies_state_and_notes_to_the_new_directory() {
        let root = tempdir().unwrap();
        let dir = seed_component(root.path(), "U1", "Category: ICs\n", Some("3\n"));
        let mut component = Component::load(dir).unwrap();
        component.save_notes("original notes").unwrap();

        component.save_as("U1_spare").unwrap();
        assert_eq!(component.name(), "U1_spare");
        assert_eq!(component.directory().name(), "U1_spare");
        assert_eq!(component.notes().unwrap(), "original notes");

        let copy =
            Component::load(Directory::new(root.path().join("components").join("U1_spare")))
                .unwrap();
        assert_eq!(copy.quantity(), 3);
        assert_eq!(copy.category(), Some("ICs"));
        // The original stays behind untouched.
        assert!(root.path().join("components").join("U1").exists());
    }

    #[test]
    fn delete_removes_the_directory_tree() {
        let root = tempdir().unwrap();
        let dir = seed_component(root.path(), "gone", "Category: X\n", Some("1\n"));
        let component = Component::load(dir).unwrap();

        component.delete().unwrap();
        assert!(!root.path().join("components").join("gone").exists());
    }
}
