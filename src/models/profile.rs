//! 产品画像与买家画像
//!
//! 产品画像由 LLM 深度分析产出（JSON），解析失败时退回关键词推断的基础画像。
//! 买家画像是固定的五种人群档案，决定回答的语言风格与深度。

use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::models::product::Product;

/// 产品画像 - LLM 深度分析结果
///
/// 字段名对应分析提示词中约定的 JSON 键，
/// 全部带默认值，容忍 LLM 返回不完整的结构。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductProfile {
    #[serde(rename = "tipo_producto", default = "default_product_type")]
    pub product_type: String,

    #[serde(rename = "categoria_principal", default = "default_category")]
    pub main_category: String,

    #[serde(rename = "subcategorias", default)]
    pub subcategories: Vec<String>,

    #[serde(rename = "ingredientes_clave", default)]
    pub key_ingredients: Vec<String>,

    #[serde(rename = "beneficios_principales", default)]
    pub main_benefits: Vec<String>,

    #[serde(rename = "tipo_piel_objetivo", default = "default_skin_types")]
    pub target_skin_types: Vec<String>,

    #[serde(rename = "rango_edad", default = "default_all")]
    pub age_range: String,

    #[serde(rename = "nivel_precio", default = "default_price_tier")]
    pub price_tier: String,

    #[serde(rename = "complejidad_uso", default = "default_complexity")]
    pub usage_complexity: String,

    #[serde(rename = "tiempo_resultados", default = "default_time_to_results")]
    pub time_to_results: String,

    #[serde(rename = "momento_aplicacion", default = "default_moments")]
    pub application_moments: Vec<String>,

    #[serde(rename = "textura", default = "default_texture")]
    pub texture: String,

    #[serde(rename = "tecnologia_exclusiva", default)]
    pub exclusive_technology: String,

    #[serde(rename = "puntos_dolor_cliente", default)]
    pub customer_pain_points: Vec<String>,

    #[serde(rename = "objeciones_compra", default)]
    pub purchase_objections: Vec<String>,
}

fn default_product_type() -> String {
    "cosmético".to_string()
}

fn default_category() -> String {
    "tratamiento".to_string()
}

fn default_skin_types() -> Vec<String> {
    vec!["todos".to_string()]
}

fn default_all() -> String {
    "todos".to_string()
}

fn default_price_tier() -> String {
    "premium".to_string()
}

fn default_complexity() -> String {
    "simple".to_string()
}

fn default_time_to_results() -> String {
    "2-4 semanas".to_string()
}

fn default_moments() -> Vec<String> {
    vec!["mañana".to_string(), "noche".to_string()]
}

fn default_texture() -> String {
    "ligera".to_string()
}

impl ProductProfile {
    /// 基础画像 - LLM 分析失败时的退路
    ///
    /// 仅依据标题关键词和价格做粗粒度推断。
    pub fn basic_fallback(product: &Product) -> Self {
        let title = product.title.to_lowercase();
        let price = product.price();

        let product_type = if title.contains("serum") || title.contains("sérum") {
            "serum"
        } else if title.contains("crema") || title.contains("cream") {
            "crema"
        } else if title.contains("limpiador") || title.contains("cleanser") {
            "limpiador"
        } else {
            "tratamiento"
        };

        Self {
            product_type: product_type.to_string(),
            main_category: if price > 50.0 {
                "tratamiento".to_string()
            } else {
                "cuidado básico".to_string()
            },
            subcategories: Vec::new(),
            key_ingredients: Vec::new(),
            main_benefits: Vec::new(),
            target_skin_types: default_skin_types(),
            age_range: default_all(),
            price_tier: if price > 80.0 {
                "premium".to_string()
            } else {
                "medio".to_string()
            },
            usage_complexity: default_complexity(),
            time_to_results: default_time_to_results(),
            application_moments: default_moments(),
            texture: default_texture(),
            exclusive_technology: String::new(),
            customer_pain_points: Vec::new(),
            purchase_objections: Vec::new(),
        }
    }
}

/// 买家画像
///
/// 决定回答的语言风格和信息深度，每个产品随机选取一种。
#[derive(Debug, Clone, Copy)]
pub struct BuyerPersona {
    pub id: &'static str,
    /// 该人群关注的核心问题
    pub concerns: &'static [&'static str],
    /// 语言风格
    pub language: &'static str,
    /// 信息深度
    pub depth: &'static str,
}

/// 固定的五种买家画像
pub const BUYER_PERSONAS: &[BuyerPersona] = &[
    BuyerPersona {
        id: "experto",
        concerns: &["composición química", "concentraciones", "pH", "estudios clínicos"],
        language: "técnico",
        depth: "muy alta",
    },
    BuyerPersona {
        id: "principiante",
        concerns: &["facilidad de uso", "resultados visibles", "precio-valor", "seguridad"],
        language: "simple",
        depth: "media",
    },
    BuyerPersona {
        id: "luxury",
        concerns: &["exclusividad", "experiencia sensorial", "packaging", "prestigio"],
        language: "sofisticado",
        depth: "alta",
    },
    BuyerPersona {
        id: "consciente",
        concerns: &["sostenibilidad", "cruelty-free", "ingredientes naturales", "ética"],
        language: "informativo",
        depth: "alta",
    },
    BuyerPersona {
        id: "problemático",
        concerns: &["solución específica", "compatibilidad", "irritación", "resultados rápidos"],
        language: "empático",
        depth: "muy alta",
    },
];

impl BuyerPersona {
    /// 随机选取一种买家画像
    pub fn pick(rng: &mut impl Rng) -> &'static BuyerPersona {
        BUYER_PERSONAS
            .choose(rng)
            .unwrap_or(&BUYER_PERSONAS[0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_product(title: &str, price: Option<f64>) -> Product {
        Product {
            handle: "test".to_string(),
            title: title.to_string(),
            body_html: String::new(),
            variant_price: price,
            vendor: String::new(),
            tags: String::new(),
        }
    }

    #[test]
    fn test_basic_fallback_detects_serum() {
        let profile = ProductProfile::basic_fallback(&sample_product("Sérum Vitamina C", Some(45.0)));
        assert_eq!(profile.product_type, "serum");
        assert_eq!(profile.main_category, "cuidado básico");
        assert_eq!(profile.price_tier, "medio");
    }

    #[test]
    fn test_basic_fallback_premium_cream() {
        let profile = ProductProfile::basic_fallback(&sample_product("Crema Retinol 0.3%", Some(89.0)));
        assert_eq!(profile.product_type, "crema");
        assert_eq!(profile.main_category, "tratamiento");
        assert_eq!(profile.price_tier, "premium");
    }

    #[test]
    fn test_profile_parses_partial_json() {
        let json = r#"{
            "tipo_producto": "serum",
            "ingredientes_clave": ["retinol", "ácido hialurónico"],
            "nivel_precio": "lujo"
        }"#;
        let profile: ProductProfile = serde_json::from_str(json).expect("应能解析不完整画像");
        assert_eq!(profile.product_type, "serum");
        assert_eq!(profile.key_ingredients.len(), 2);
        assert_eq!(profile.price_tier, "lujo");
        // 缺省字段回填默认值
        assert_eq!(profile.main_category, "tratamiento");
        assert_eq!(profile.application_moments, vec!["mañana", "noche"]);
    }

    #[test]
    fn test_buyer_personas_complete() {
        assert_eq!(BUYER_PERSONAS.len(), 5);
        for persona in BUYER_PERSONAS {
            assert!(!persona.concerns.is_empty());
            assert!(!persona.language.is_empty());
        }
    }
}
