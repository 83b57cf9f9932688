use std::fmt;

use thiserror::Error;

/// Reserved property key for declared names.
pub const PROP_NAME: &str = "Name";
/// Reserved property key selecting a component's category.
pub const PROP_CATEGORY: &str = "Category";
/// Reserved property key selecting a component's sub-category.
pub const PROP_SUB_CATEGORY: &str = "Sub-Category";
/// Reserved property key naming a component's package.
pub const PROP_PACKAGE: &str = "Package";
/// Storage prefix applied to non-reserved property keys.
pub const VALUE_PREFIX: &str = "Value-";

/// Keys that are stored verbatim, without the `Value-` prefix.
/// 不加上 `Value-` 前綴、原樣儲存的保留鍵。
const UNPREFIXED_KEYS: [&str; 3] = [PROP_CATEGORY, PROP_SUB_CATEGORY, PROP_PACKAGE];

/// Errors raised while parsing a manifest line.
/// 解析 manifest 行時可能出現的錯誤。
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PropertyParseError {
    #[error("manifest line has no ':' separator")]
    MissingSeparator,
    #[error("manifest line has an empty name before the ':' separator")]
    EmptyName,
}

/// A single `Name: Value` attribute of a component or workspace.
/// 元件或工作區的單一 `Name: Value` 屬性。
///
/// Properties keep their manifest order and duplicate names are allowed;
/// lookups resolve to the first match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    name: String,
    value: String,
}

impl Property {
    /// Builds a property from raw (storage-form) name and value.
    /// 以原始（儲存格式）名稱與值建立屬性。
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Builds the empty sentinel used for not-yet-filled-in properties.
    /// 建立代表「尚未填寫」的空白屬性。
    pub fn empty() -> Self {
        Self {
            name: String::new(),
            value: String::new(),
        }
    }

    /// Parses one manifest line. The split happens at the first `:`; the
    /// value keeps its trailing whitespace but loses exactly one leading
    /// space when present. A missing separator or an empty name fails the
    /// parse so callers can skip the line.
    /// 解析一行 manifest。以第一個 `:` 分割；值保留尾端空白，僅去除開頭的
    /// 一個空格。缺少分隔符號或名稱為空時回傳錯誤，由呼叫端跳過該行。
    pub fn parse_line(line: &str) -> Result<Self, PropertyParseError> {
        let line = line.strip_suffix('\r').unwrap_or(line);
        let (name, value) = line
            .split_once(':')
            .ok_or(PropertyParseError::MissingSeparator)?;
        if name.is_empty() {
            return Err(PropertyParseError::EmptyName);
        }
        let value = value.strip_prefix(' ').unwrap_or(value);
        Ok(Self {
            name: name.to_string(),
            value: value.to_string(),
        })
    }

    /// Returns the stored (storage-form) name.
    /// 取得儲存格式的名稱。
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Overwrites the stored name verbatim.
    /// 直接覆寫儲存格式的名稱。
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Returns the property value.
    /// 取得屬性值。
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Overwrites the property value.
    /// 覆寫屬性值。
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    /// True for the "not yet filled in" sentinel (empty name).
    /// 名稱為空（代表尚未填寫）時回傳 `true`。
    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
    }

    /// Returns the user-facing name: the `Value-` prefix is stripped and
    /// dashes become spaces.
    /// 取得使用者看到的名稱：去除 `Value-` 前綴並把連字號轉為空格。
    pub fn human_name(&self) -> String {
        let stripped = self.name.strip_prefix(VALUE_PREFIX).unwrap_or(&self.name);
        stripped.replace('-', " ")
    }

    /// Sets the name from its user-facing form: spaces become dashes and
    /// the `Value-` prefix is re-added unless the result is one of the
    /// unprefixed reserved keys. Exact inverse of [`Property::human_name`]
    /// for every prefixed or reserved name.
    /// 以使用者輸入的名稱設定屬性：空格轉為連字號，若結果不是保留鍵則補上
    /// `Value-` 前綴。對所有帶前綴或保留鍵名稱而言是 [`Property::human_name`]
    /// 的精確反函數。
    pub fn set_human_name(&mut self, human: &str) {
        let dashed = human.replace(' ', "-");
        self.name = if UNPREFIXED_KEYS.contains(&dashed.as_str()) {
            dashed
        } else {
            format!("{VALUE_PREFIX}{dashed}")
        };
    }

    /// Serializes the property to its canonical manifest form.
    /// 序列化為標準的 manifest 格式。
    pub fn to_line(&self) -> String {
        format!("{}: {}", self.name, self.value)
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.value)
    }
}
