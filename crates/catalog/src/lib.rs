//! File-backed data model for the PartCat component catalog.
//! PartCat 元件目錄的檔案後端資料模型。
//!
//! A workspace is a directory of component sub-directories; every
//! descriptive attribute is one `Name: Value` line in a small text
//! manifest. This crate owns the path/directory abstraction, the property
//! line format, the component and workspace entities, and the category
//! grouping used to build the display hierarchy. Hosts (GUI or CLI) stay
//! on top of the API exported here.

mod util;

pub mod category;
pub mod component;
pub mod paths;
pub mod property;
pub mod workspace;

pub use category::{build_category_tree, CategoryNode, CategoryTree, SubCategoryNode};
pub use component::{
    Component, ComponentError, ASSETS_DIR, DATASHEET_FILE, IMAGES_DIR, IMAGE_FILE, MANIFEST_FILE,
    NOTES_FILE, QUANTITY_FILE,
};
pub use paths::{Directory, FsPath};
pub use property::{
    Property, PropertyParseError, PROP_CATEGORY, PROP_NAME, PROP_PACKAGE, PROP_SUB_CATEGORY,
    VALUE_PREFIX,
};
pub use workspace::{Workspace, WorkspaceError, COMPONENTS_DIR, WORKSPACE_MANIFEST_FILE};
