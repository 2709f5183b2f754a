//! 问题模板库 - 业务能力层
//!
//! 固定的 8 个主题类别，每类若干西语问题模板与变量词表。
//! 每次尝试随机抽取 5 个不同类别，实例化模板并做画像个性化。
//! 历史存储只作软过滤：某类别的全部变体都出现过时，
//! 退回最后生成的变体照常使用（接受重复），绝不让尝试失败。

use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;

use crate::models::product::Product;
use crate::models::profile::ProductProfile;
use crate::services::history_store::HistoryStore;

/// 问题类别：模板 + 变量词表
pub struct QuestionCategory {
    pub name: &'static str,
    pub templates: &'static [&'static str],
    pub variables: &'static [(&'static str, &'static [&'static str])],
}

/// 候选问题
#[derive(Debug, Clone)]
pub struct CandidateQuestion {
    /// 来源类别
    pub category: &'static str,
    pub text: String,
}

/// 固定的问题模板库
pub const QUESTION_BANK: &[QuestionCategory] = &[
    QuestionCategory {
        name: "eficacia",
        templates: &[
            "¿Cuánto tarda {producto} en mostrar resultados visibles en {problema_especifico}?",
            "¿Qué porcentaje de mejora puedo esperar con {producto} en {timeframe}?",
            "¿Cómo maximizo la efectividad de {producto} para {objetivo}?",
            "¿Los resultados de {producto} son permanentes o reversibles?",
            "¿Existe un período de purga al comenzar con {producto}?",
            "¿Qué estudios respaldan la eficacia de {producto}?",
            "¿Cómo sé si {producto} está funcionando correctamente en mi piel?",
            "¿Puedo acelerar los resultados de {producto} de alguna manera?",
        ],
        variables: &[
            ("problema_especifico", &["manchas oscuras", "líneas finas", "poros dilatados", "textura irregular", "opacidad"]),
            ("timeframe", &["2 semanas", "1 mes", "3 meses", "6 meses"]),
            ("objetivo", &["anti-edad", "luminosidad", "hidratación profunda", "control de grasa"]),
        ],
    },
    QuestionCategory {
        name: "tecnica_aplicacion",
        templates: &[
            "¿Cuál es la cantidad exacta de {producto} que debo aplicar?",
            "¿Qué técnica de masaje optimiza la absorción de {producto}?",
            "¿Debo aplicar {producto} con las manos o con herramientas?",
            "¿Importa la dirección de aplicación de {producto}?",
            "¿Cuánto tiempo espero entre {producto} y el siguiente paso?",
            "¿{producto} se aplica en piel húmeda o seca?",
            "¿Puedo mezclar {producto} con otros productos?",
            "¿Necesito preparar mi piel antes de aplicar {producto}?",
        ],
        variables: &[],
    },
    QuestionCategory {
        name: "compatibilidad_avanzada",
        templates: &[
            "¿Puedo usar {producto} si estoy en tratamiento con {tratamiento}?",
            "¿{producto} es compatible con {ingrediente_activo}?",
            "¿Interfiere {producto} con procedimientos estéticos como {procedimiento}?",
            "¿Cómo incorporo {producto} si ya uso {rutina_existente}?",
            "¿Hay algún ingrediente que neutralice la acción de {producto}?",
            "¿Puedo usar {producto} en {condicion_piel} activa?",
            "¿{producto} altera la eficacia de mi {otro_producto}?",
            "¿Qué pH debe tener mi piel para usar {producto}?",
        ],
        variables: &[
            ("tratamiento", &["retinoides", "antibióticos tópicos", "corticoides", "isotretinoína"]),
            ("ingrediente_activo", &["vitamina C", "niacinamida", "AHA/BHA", "retinol"]),
            ("procedimiento", &["láser", "peeling", "microagujas", "botox"]),
            ("rutina_existente", &["ácidos diarios", "vitamina C", "retinol nocturno"]),
            ("condicion_piel", &["rosácea", "dermatitis", "acné", "melasma"]),
            ("otro_producto", &["protector solar", "maquillaje", "sérum", "tratamiento médico"]),
        ],
    },
    QuestionCategory {
        name: "ciencia_ingredientes",
        templates: &[
            "¿Qué concentración de {ingrediente} contiene {producto} y por qué?",
            "¿Cómo penetra {ingrediente} de {producto} en las capas de la piel?",
            "¿El {ingrediente} en {producto} es de origen {origen}?",
            "¿Qué tecnología de encapsulación usa {producto} para {ingrediente}?",
            "¿A qué pH está formulado {producto} y cómo afecta su eficacia?",
            "¿Qué tamaño molecular tiene el {ingrediente} en {producto}?",
            "¿{producto} contiene {ingrediente} en su forma más biodisponible?",
            "¿Cómo protege {producto} la estabilidad de {ingrediente}?",
        ],
        variables: &[
            ("ingrediente", &["ácido hialurónico", "vitamina C", "retinol", "péptidos", "niacinamida"]),
            ("origen", &["marino", "botánico", "sintético", "biotecnológico"]),
        ],
    },
    QuestionCategory {
        name: "experiencia_sensorial",
        templates: &[
            "¿Qué textura exacta tiene {producto} y cómo se siente?",
            "¿{producto} deja algún residuo o finish en la piel?",
            "¿Tiene {producto} fragancia y de qué tipo?",
            "¿Cómo es la experiencia completa de usar {producto}?",
            "¿El color de {producto} es normal o indica algo?",
            "¿Por qué {producto} tiene esa consistencia específica?",
            "¿Es normal que {producto} produzca {sensacion}?",
            "¿Cambia la textura de {producto} con la temperatura?",
        ],
        variables: &[
            ("sensacion", &["hormigueo", "calor", "frescor", "tensión"]),
        ],
    },
    QuestionCategory {
        name: "situaciones_especificas",
        templates: &[
            "¿Puedo usar {producto} en {clima} extremo?",
            "¿Cómo adapto el uso de {producto} durante {estacion}?",
            "¿{producto} es seguro durante {condicion_especial}?",
            "¿Puedo llevar {producto} en {situacion_viaje}?",
            "¿Afecta {factor_externo} la eficacia de {producto}?",
            "¿Necesito ajustar {producto} según mi {factor_personal}?",
            "¿Cómo conservo {producto} en {condicion_almacenamiento}?",
            "¿{producto} requiere cuidados especiales en {escenario}?",
        ],
        variables: &[
            ("clima", &["húmedo", "seco", "frío", "caluroso"]),
            ("estacion", &["verano", "invierno", "primavera", "otoño"]),
            ("condicion_especial", &["embarazo", "lactancia", "menopausia", "adolescencia"]),
            ("situacion_viaje", &["cabina de avión", "equipaje facturado", "climas extremos"]),
            ("factor_externo", &["contaminación", "agua dura", "exposición solar", "aire acondicionado"]),
            ("factor_personal", &["edad", "tipo de piel", "sensibilidad", "medicación"]),
            ("condicion_almacenamiento", &["baño húmedo", "nevera", "calor extremo"]),
            ("escenario", &["post-procedimiento", "piel sensibilizada", "brote activo"]),
        ],
    },
    QuestionCategory {
        name: "comparacion_inteligente",
        templates: &[
            "¿En qué se diferencia {producto} de versiones anteriores?",
            "¿Por qué {producto} cuesta más que alternativas similares?",
            "¿Qué hace único a {producto} frente a {competencia}?",
            "¿Vale la pena cambiar de {producto_anterior} a {producto}?",
            "¿Qué ventaja tecnológica tiene {producto} sobre otros?",
            "¿Por qué elegir {producto} si ya uso {alternativa}?",
            "¿Qué problema resuelve {producto} que otros no?",
            "¿Cómo justifico la inversión en {producto}?",
        ],
        variables: &[
            ("competencia", &["productos genéricos", "otras marcas premium", "versiones anteriores"]),
            ("producto_anterior", &["mi sérum actual", "mi crema habitual", "tratamientos caseros"]),
            ("alternativa", &["productos médicos", "tratamientos en cabina", "otras marcas"]),
        ],
    },
    QuestionCategory {
        name: "troubleshooting",
        templates: &[
            "¿Qué hago si {producto} me causa {reaccion}?",
            "¿Por qué {producto} no muestra resultados después de {tiempo}?",
            "¿Es normal que {producto} {cambio_inesperado}?",
            "¿Cómo sé si {producto} se ha estropeado?",
            "¿Por qué mi piel reacciona así a {producto}?",
            "¿Debo suspender {producto} si {situacion}?",
            "¿Cómo minimizo {efecto_secundario} de {producto}?",
            "¿Qué indica {sintoma} al usar {producto}?",
        ],
        variables: &[
            ("reaccion", &["rojez", "descamación", "granitos", "picor"]),
            ("tiempo", &["2 semanas", "1 mes", "3 meses"]),
            ("cambio_inesperado", &["cambia de color", "se separa", "huele diferente", "cristaliza"]),
            ("situacion", &["tengo un evento importante", "mi piel está irritada", "empiezo otro tratamiento"]),
            ("efecto_secundario", &["sequedad inicial", "purga", "sensibilidad"]),
            ("sintoma", &["hormigueo", "tirantez", "brillo excesivo", "absorción lenta"]),
        ],
    },
];

/// 每次尝试抽取的类别数（等于一组 FAQ 的条数）
const CATEGORIES_PER_ATTEMPT: usize = 5;

/// 问题生成器
pub struct QuestionBank;

impl QuestionBank {
    pub fn new() -> Self {
        Self
    }

    /// 为一个产品生成一组候选问题
    ///
    /// # 参数
    /// - `product`: 产品记录
    /// - `profile`: 产品画像（用于个性化替换）
    /// - `store`: 问题历史，用于避开重复问题（软过滤）
    ///
    /// # 返回
    /// 每个被抽中的类别各产出一个问题，新问题当场登记进历史
    pub fn generate_questions(
        &self,
        product: &Product,
        profile: &ProductProfile,
        store: &mut HistoryStore,
        rng: &mut impl Rng,
    ) -> Vec<CandidateQuestion> {
        let mut category_order: Vec<usize> = (0..QUESTION_BANK.len()).collect();
        category_order.shuffle(rng);

        let mut questions = Vec::with_capacity(CATEGORIES_PER_ATTEMPT);

        for &index in category_order.iter().take(CATEGORIES_PER_ATTEMPT) {
            let category = &QUESTION_BANK[index];

            // 模板按随机顺序尝试，优先选历史中没出现过的问题
            let mut template_order: Vec<&&str> = category.templates.iter().collect();
            template_order.shuffle(rng);

            let mut last_candidate: Option<String> = None;
            let mut chosen: Option<String> = None;

            for template in template_order {
                let candidate = self.instantiate(template, category, product, rng);
                if !store.is_known(&candidate) {
                    chosen = Some(candidate);
                    break;
                }
                last_candidate = Some(candidate);
            }

            // 所有变体都出现过：退回最后一个候选，接受重复
            let Some(question) = chosen.or(last_candidate) else {
                continue;
            };

            store.remember(&question);

            let personalized = self.personalize(question, profile, rng);
            questions.push(CandidateQuestion {
                category: category.name,
                text: personalized,
            });
        }

        questions
    }

    /// 实例化模板：替换产品占位符和类别变量
    fn instantiate(
        &self,
        template: &str,
        category: &QuestionCategory,
        product: &Product,
        rng: &mut impl Rng,
    ) -> String {
        let mut question = template.replace("{producto}", &product.title);

        for (variable, options) in category.variables {
            let placeholder = format!("{{{}}}", variable);
            if question.contains(&placeholder) {
                if let Some(option) = options.choose(rng) {
                    question = question.replace(&placeholder, option);
                }
            }
        }

        question
    }

    /// 按产品画像个性化问题
    fn personalize(
        &self,
        mut question: String,
        profile: &ProductProfile,
        rng: &mut impl Rng,
    ) -> String {
        let lower = question.to_lowercase();

        // 奢侈价位产品的价格问题补充定位语境
        if profile.price_tier == "lujo" && lower.contains("precio") {
            question = question.replace('?', " considerando su posicionamiento premium?");
        }

        // 有关键成分时，把通用的"ingrediente activo"换成具体成分
        if !profile.key_ingredients.is_empty() && lower.contains("ingrediente") {
            let pool = &profile.key_ingredients[..profile.key_ingredients.len().min(3)];
            if let Some(ingredient) = pool.choose(rng) {
                question = question.replace("ingrediente activo", ingredient);
            }
        }

        // 有痛点信息时，把"problema específico"换成具体痛点
        if !profile.customer_pain_points.is_empty() && lower.contains("problema") {
            if let Some(pain_point) = profile.customer_pain_points.choose(rng) {
                question = question.replace("problema específico", pain_point);
            }
        }

        question
    }
}

impl Default for QuestionBank {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::profile::ProductProfile;

    fn sample_product() -> Product {
        Product {
            handle: "serum-retinol".to_string(),
            title: "Retinol Serum 0.3%".to_string(),
            body_html: "<p>Sérum de noche con retinol.</p>".to_string(),
            variant_price: Some(67.99),
            vendor: "Premium Cosmetics".to_string(),
            tags: "retinol, noche".to_string(),
        }
    }

    fn empty_store() -> HistoryStore {
        let dir = tempfile::tempdir().expect("创建临时目录失败");
        // 只在内存中使用，不落盘
        HistoryStore::new(dir.path().to_str().unwrap())
    }

    #[test]
    fn test_generates_five_questions_from_distinct_categories() {
        let bank = QuestionBank::new();
        let product = sample_product();
        let profile = ProductProfile::basic_fallback(&product);
        let mut store = empty_store();
        let mut rng = rand::rng();

        let questions = bank.generate_questions(&product, &profile, &mut store, &mut rng);

        assert_eq!(questions.len(), 5);
        let categories: std::collections::HashSet<&str> =
            questions.iter().map(|q| q.category).collect();
        assert_eq!(categories.len(), 5);
    }

    #[test]
    fn test_questions_are_instantiated() {
        let bank = QuestionBank::new();
        let product = sample_product();
        let profile = ProductProfile::basic_fallback(&product);
        let mut store = empty_store();
        let mut rng = rand::rng();

        for question in bank.generate_questions(&product, &profile, &mut store, &mut rng) {
            // 模板占位符必须全部替换完毕
            assert!(!question.text.contains('{'), "存在未替换的占位符: {}", question.text);
            assert!(!question.text.contains('}'));
            assert!(question.text.starts_with('¿'));
            assert!(question.text.ends_with('?'));
        }
    }

    #[test]
    fn test_questions_registered_in_history() {
        let bank = QuestionBank::new();
        let product = sample_product();
        let profile = ProductProfile::basic_fallback(&product);
        let mut store = empty_store();
        let mut rng = rand::rng();

        assert!(store.is_empty());
        bank.generate_questions(&product, &profile, &mut store, &mut rng);
        assert_eq!(store.len(), 5);
    }

    #[test]
    fn test_exhausted_history_still_yields_five() {
        // 反复生成直至历史淹没所有变体，生成依然照常产出 5 个问题
        let bank = QuestionBank::new();
        let product = sample_product();
        let profile = ProductProfile::basic_fallback(&product);
        let mut store = empty_store();
        let mut rng = rand::rng();

        for _ in 0..200 {
            let questions = bank.generate_questions(&product, &profile, &mut store, &mut rng);
            assert_eq!(questions.len(), 5);
        }
    }
}
