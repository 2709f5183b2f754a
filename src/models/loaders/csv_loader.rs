use std::path::Path;

use crate::error::{AppError, AppResult, FileError};
use crate::models::product::Product;

/// 从 Shopify 导出 CSV 加载产品列表
///
/// 逐行反序列化；单行解析失败只告警跳过，不中断整体加载。
pub fn load_products_csv(csv_path: &Path) -> AppResult<Vec<Product>> {
    if !csv_path.exists() {
        return Err(AppError::File(FileError::NotFound {
            path: csv_path.display().to_string(),
        }));
    }

    let mut reader = csv::Reader::from_path(csv_path)
        .map_err(|e| AppError::csv_parse_failed(csv_path.display().to_string(), e))?;

    let mut products = Vec::new();

    for (row_index, result) in reader.deserialize::<Product>().enumerate() {
        match result {
            Ok(product) => products.push(product),
            Err(e) => {
                tracing::warn!("第 {} 行解析失败，已跳过: {}", row_index + 1, e);
            }
        }
    }

    tracing::info!("✓ 从 {} 加载了 {} 个产品", csv_path.display(), products.len());

    Ok(products)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_products_csv() {
        let dir = tempfile::tempdir().expect("创建临时目录失败");
        let path = dir.path().join("products.csv");

        let mut file = std::fs::File::create(&path).expect("创建CSV失败");
        writeln!(file, "Handle,Title,Body HTML,Variant Price,Vendor,Tags").unwrap();
        writeln!(
            file,
            "serum-vitamina-c,Serum Vitamina C 20%,<p>Sérum concentrado</p>,45.99,SkinLab,serum"
        )
        .unwrap();
        writeln!(file, "crema-retinol,Crema Retinol 0.3%,,,,").unwrap();

        let products = load_products_csv(&path).expect("加载CSV失败");
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].handle, "serum-vitamina-c");
        assert_eq!(products[0].variant_price, Some(45.99));
        assert_eq!(products[0].vendor, "SkinLab");
        assert_eq!(products[1].handle, "crema-retinol");
        assert_eq!(products[1].variant_price, None);
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_products_csv(Path::new("no_existe.csv"));
        assert!(matches!(
            result,
            Err(AppError::File(FileError::NotFound { .. }))
        ));
    }
}
