use regex::Regex;
use serde::{Deserialize, Serialize};

/// 产品记录
///
/// 对应 Shopify 导出 CSV 的一行。`Handle` 与 `Title` 为必填，
/// 其余字段按可用情况参与画像分析。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "Handle")]
    pub handle: String,

    #[serde(rename = "Title")]
    pub title: String,

    #[serde(rename = "Body HTML", alias = "Body (HTML)", default)]
    pub body_html: String,

    #[serde(rename = "Variant Price", default)]
    pub variant_price: Option<f64>,

    #[serde(rename = "Vendor", default)]
    pub vendor: String,

    #[serde(rename = "Tags", default)]
    pub tags: String,
}

impl Product {
    /// 产品价格（缺失时视为 0）
    pub fn price(&self) -> f64 {
        self.variant_price.unwrap_or(0.0)
    }

    /// 去除 HTML 标签后的纯文本描述
    pub fn description_text(&self) -> String {
        strip_html(&self.body_html)
    }
}

/// 去除 HTML 标签并折叠空白
pub fn strip_html(html: &str) -> String {
    let tag_re = Regex::new(r"<[^>]*>").expect("内置正则必须合法");
    let text = tag_re.replace_all(html, " ");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_html() {
        let html = "<p>Sérum  concentrado con <b>vitamina C</b>.</p>";
        assert_eq!(strip_html(html), "Sérum concentrado con vitamina C .");
    }

    #[test]
    fn test_strip_html_empty() {
        assert_eq!(strip_html(""), "");
    }

    #[test]
    fn test_price_defaults_to_zero() {
        let product = Product {
            handle: "serum-vitamina-c".to_string(),
            title: "Serum Vitamina C 20%".to_string(),
            body_html: String::new(),
            variant_price: None,
            vendor: String::new(),
            tags: String::new(),
        };
        assert_eq!(product.price(), 0.0);
    }
}
