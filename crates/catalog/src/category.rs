use serde::Serialize;

use crate::component::Component;

/// One sub-category group inside a category node.
/// 分類節點中的單一子分類群組。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubCategoryNode {
    /// The exact `Sub-Category` value (an empty string is a real name).
    pub name: String,
    /// Member indices into the component list, in list order.
    pub members: Vec<usize>,
}

/// One category node of the derived display hierarchy.
/// 衍生顯示階層中的單一分類節點。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryNode {
    /// The exact `Category` value (an empty string is a real name).
    pub name: String,
    /// Sub-category groups in discovery order.
    pub sub_categories: Vec<SubCategoryNode>,
    /// Members of this category that carry no `Sub-Category` property;
    /// rendered after the sub-category groups.
    pub unsorted: Vec<usize>,
}

impl CategoryNode {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            sub_categories: Vec::new(),
            unsorted: Vec::new(),
        }
    }

    /// The ordered, deduplicated sub-category names of this node.
    /// 此節點去重後依發現順序排列的子分類名稱。
    pub fn sub_category_names(&self) -> impl Iterator<Item = &str> {
        self.sub_categories.iter().map(|sub| sub.name.as_str())
    }
}

/// The two-level category hierarchy derived from a component list.
/// 由元件清單衍生出的兩層分類階層。
///
/// Built transiently for display and never persisted. The uncategorized
/// bucket is kept apart from the named categories so a genuine category
/// called "Uncategorized" cannot collide with it; hosts render the bucket
/// as the final top-level node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategoryTree {
    /// Category nodes in first-appearance order.
    pub categories: Vec<CategoryNode>,
    /// Indices of components with no `Category` property, in list order.
    pub uncategorized: Vec<usize>,
}

impl CategoryTree {
    /// True when the input component list was empty.
    /// 輸入的元件清單為空時回傳 `true`。
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty() && self.uncategorized.is_empty()
    }
}

/// Derives the category tree from a component list, read-only.
/// 以唯讀方式從元件清單推導分類樹。
///
/// Category node order is first-appearance order (no sorting); the same
/// holds for sub-category groups within a node. Every component lands in
/// exactly one leaf group: a sub-category group, its category's unsorted
/// group, or the uncategorized bucket. Matching is exact and
/// case-sensitive, and an empty-string category or sub-category value is a
/// present (if unusual) name, distinct from the property being absent.
pub fn build_category_tree(components: &[Component]) -> CategoryTree {
    let mut tree = CategoryTree::default();

    // First pass: flag uncategorized components and collect the distinct
    // category names in discovery order.
    for (index, component) in components.iter().enumerate() {
        match component.category() {
            None => tree.uncategorized.push(index),
            Some(name) => {
                if !tree.categories.iter().any(|node| node.name == name) {
                    tree.categories.push(CategoryNode::new(name));
                }
            }
        }
    }

    // Second pass, per category: collect sub-category groups in discovery
    // order and the members that have no sub-category.
    for node in &mut tree.categories {
        for (index, component) in components.iter().enumerate() {
            if component.category() != Some(node.name.as_str()) {
                continue;
            }
            match component.sub_category() {
                Some(sub) => {
                    if let Some(group) = node
                        .sub_categories
                        .iter_mut()
                        .find(|group| group.name == sub)
                    {
                        group.members.push(index);
                    } else {
                        node.sub_categories.push(SubCategoryNode {
                            name: sub.to_string(),
                            members: vec![index],
                        });
                    }
                }
                None => node.unsorted.push(index),
            }
        }
    }

    tree
}
