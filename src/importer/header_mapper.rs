// ==========================================
// 配方原料库存系统 - 表头映射器
// ==========================================
// 职责: 源表头（罗马尼亚语 / 英语）→ 标准字段
// 规则: TRIM + 大写后查别名表，未识别的列静默丢弃
// ==========================================

use crate::domain::ingredient::CanonicalField;
use crate::importer::error::{ImportError, ImportResult};

const UTF8_BOM: char = '\u{feff}';

/// 表头别名表（大写、已去空白）
const HEADER_ALIASES: &[(&str, CanonicalField)] = &[
    ("FURNIZOR", CanonicalField::SupplierName),
    ("SUPPLIER", CanonicalField::SupplierName),
    ("INGREDIENTE", CanonicalField::Name),
    ("INGREDIENT", CanonicalField::Name),
    ("NAME", CanonicalField::Name),
    ("INCI", CanonicalField::Inci),
    ("MQO", CanonicalField::Moq),
    ("MOQ", CanonicalField::Moq),
    ("LEI", CanonicalField::Price),
    ("PRICE", CanonicalField::Price),
    ("FUNCTIE", CanonicalField::Description),
    ("FUNCTION", CanonicalField::Description),
    ("DESCRIPTION", CanonicalField::Description),
    ("MOSTRA DISPONIBILA", CanonicalField::IsSample),
    ("SAMPLE AVAILABLE", CanonicalField::IsSample),
];

/// 查找单个表头对应的标准字段
pub fn lookup_header(raw: &str) -> Option<CanonicalField> {
    let normalized = raw.trim_start_matches(UTF8_BOM).trim().to_uppercase();
    HEADER_ALIASES
        .iter()
        .find(|(alias, _)| *alias == normalized)
        .map(|(_, field)| *field)
}

// ==========================================
// ColumnMap - 列号 → 标准字段
// ==========================================
// 每次导入从表头行构建一次，按列顺序保存
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    columns: Vec<(usize, CanonicalField)>,
}

impl ColumnMap {
    /// 从表头单元格构建
    ///
    /// # 错误
    /// - InvalidFormat: 表头为空（空文件 / 首行全空）
    /// - MissingRequiredColumn: 没有任何列映射到 name
    pub fn from_headers<S: AsRef<str>>(headers: &[S]) -> ImportResult<Self> {
        let is_empty = headers
            .iter()
            .all(|h| h.as_ref().trim_start_matches(UTF8_BOM).trim().is_empty());
        if is_empty {
            return Err(ImportError::InvalidFormat);
        }

        let columns: Vec<(usize, CanonicalField)> = headers
            .iter()
            .enumerate()
            .filter_map(|(idx, h)| lookup_header(h.as_ref()).map(|field| (idx, field)))
            .collect();

        let map = Self { columns };
        if !map.contains(CanonicalField::Name) {
            return Err(ImportError::MissingRequiredColumn);
        }
        Ok(map)
    }

    pub fn contains(&self, field: CanonicalField) -> bool {
        self.columns.iter().any(|(_, f)| *f == field)
    }

    /// 按列顺序迭代 (列号, 字段)
    pub fn iter(&self) -> impl Iterator<Item = (usize, CanonicalField)> + '_ {
        self.columns.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aliases_map_case_insensitively() {
        assert_eq!(lookup_header(" furnizor "), Some(CanonicalField::SupplierName));
        assert_eq!(lookup_header("Ingrediente"), Some(CanonicalField::Name));
        assert_eq!(lookup_header("mqo"), Some(CanonicalField::Moq));
        assert_eq!(lookup_header("Lei"), Some(CanonicalField::Price));
        assert_eq!(lookup_header("Functie"), Some(CanonicalField::Description));
        assert_eq!(
            lookup_header("Mostra disponibila"),
            Some(CanonicalField::IsSample)
        );
        assert_eq!(lookup_header("Sample Available"), Some(CanonicalField::IsSample));
        assert_eq!(lookup_header("Notes"), None);
    }

    #[test]
    fn test_unknown_columns_are_dropped() {
        let map = ColumnMap::from_headers(&["Supplier", "Notes", "Name", "Price"]).unwrap();
        let columns: Vec<_> = map.iter().collect();
        assert_eq!(
            columns,
            vec![
                (0, CanonicalField::SupplierName),
                (2, CanonicalField::Name),
                (3, CanonicalField::Price),
            ]
        );
    }

    #[test]
    fn test_leading_bom_is_ignored() {
        let map = ColumnMap::from_headers(&["\u{feff}INGREDIENT", "INCI"]).unwrap();
        assert_eq!(map.len(), 2);
        assert!(map.contains(CanonicalField::Name));
    }

    #[test]
    fn test_missing_name_column_is_rejected() {
        let err = ColumnMap::from_headers(&["SUPPLIER", "PRICE"]).unwrap_err();
        assert!(matches!(err, ImportError::MissingRequiredColumn));
    }

    #[test]
    fn test_empty_header_is_invalid_format() {
        let empty: [&str; 0] = [];
        assert!(matches!(
            ColumnMap::from_headers(&empty),
            Err(ImportError::InvalidFormat)
        ));
        assert!(matches!(
            ColumnMap::from_headers(&["", "  "]),
            Err(ImportError::InvalidFormat)
        ));
    }
}
