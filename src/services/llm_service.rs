//! LLM 服务 - 业务能力层
//!
//! 只负责"调用 LLM 生成内容"能力，不关心重试流程
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型
//! - 兼容 OpenAI API 的服务（如 Azure, Gemini, Doubao 等）
//!
//! "扮演某类领域专家再回答"的调用统一走一个多态的专家咨询入口：
//! 传入专家身份即可，不为每种专家单开代码路径。

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::GenerationError;
use crate::models::product::Product;
use crate::models::profile::{BuyerPersona, ProductProfile};
use crate::services::question_bank::CandidateQuestion;

/// 专家身份
///
/// 决定咨询调用的系统提示词（角色设定）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpertPersona {
    /// 配方师：负责产品深度分析
    Formulador,
    /// 皮肤科医生：负责面向客户的回答
    Dermatologo,
    /// 市场专家
    Marketing,
    /// 化妆品化学家
    Quimico,
    /// 趋势分析师
    Tendencias,
}

impl ExpertPersona {
    pub fn id(&self) -> &'static str {
        match self {
            ExpertPersona::Formulador => "formulador",
            ExpertPersona::Dermatologo => "dermatólogo",
            ExpertPersona::Marketing => "marketing",
            ExpertPersona::Quimico => "químico",
            ExpertPersona::Tendencias => "tendencias",
        }
    }

    /// 角色设定（系统提示词）
    pub fn system_prompt(&self) -> &'static str {
        match self {
            ExpertPersona::Formulador => {
                "Eres un formulador experto en análisis de productos cosméticos. \
                 Extraes perfiles completos y coherentes a partir de información parcial."
            }
            ExpertPersona::Dermatologo => {
                "Experto dermatólogo con 20 años de experiencia. \
                 Respuestas precisas y específicas."
            }
            ExpertPersona::Marketing => {
                "Eres un experto en marketing digital de cosmética premium. \
                 Conoces el posicionamiento y los argumentos de venta del sector."
            }
            ExpertPersona::Quimico => {
                "Eres un químico cosmético especializado en formulación y estabilidad \
                 de ingredientes activos."
            }
            ExpertPersona::Tendencias => {
                "Eres un analista de tendencias del mercado de belleza. \
                 Identificas qué busca el consumidor actual."
            }
        }
    }
}

/// 内容合成器
///
/// 重试控制器依赖的生成能力边界：实现方可能因网络/额度失败，
/// 调用方必须按失败种类处理，绝不能让单条失败拖垮整组。
#[async_trait]
pub trait ContentSynthesizer {
    /// 深度分析产品，产出画像
    async fn analyze_product(&self, product: &Product) -> Result<ProductProfile, GenerationError>;

    /// 为单个问题生成回答
    async fn generate_answer(
        &self,
        question: &CandidateQuestion,
        product: &Product,
        profile: &ProductProfile,
        persona: &BuyerPersona,
    ) -> Result<String, GenerationError>;
}

/// LLM 服务
///
/// 职责：
/// - 调用 LLM API 生成画像与回答
/// - 提供通用的专家咨询接口
/// - 只处理单次调用
/// - 不出现 Vec<Product>
/// - 不关心重试顺序
pub struct LlmService {
    client: Client<OpenAIConfig>,
    model_name: String,
}

impl LlmService {
    /// 创建新的 LLM 服务
    pub fn new(config: &Config) -> Self {
        // 配置 OpenAI 客户端（兼容 OpenAI API 的服务）
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        let client = Client::with_config(openai_config);

        Self {
            client,
            model_name: config.llm_model_name.clone(),
        }
    }

    /// 通用的 LLM 调用函数
    ///
    /// 这是最基础的 LLM 调用接口，其他所有生成能力都基于此函数。
    ///
    /// # 参数
    /// - `user_message`: 用户消息内容
    /// - `system_message`: 系统消息（可选）
    /// - `temperature`: 采样温度
    /// - `max_tokens`: 生成上限
    ///
    /// # 返回
    /// 返回 LLM 的响应内容（字符串）
    pub async fn send_to_llm(
        &self,
        user_message: &str,
        system_message: Option<&str>,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, GenerationError> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", user_message.len());

        // 构建消息列表
        let mut messages = Vec::new();

        // 添加系统消息（如果提供）
        if let Some(sys_msg) = system_message {
            let system_msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(sys_msg)
                .build()
                .map_err(|e| self.api_error(e))?;
            messages.push(ChatCompletionRequestMessage::System(system_msg));
        }

        // 添加用户消息
        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(user_message)
            .build()
            .map_err(|e| self.api_error(e))?;
        messages.push(ChatCompletionRequestMessage::User(user_msg));

        // 构建请求
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .temperature(temperature)
            .max_tokens(max_tokens)
            .build()
            .map_err(|e| self.api_error(e))?;

        // 调用 API
        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            self.api_error(e)
        })?;

        debug!("LLM API 调用成功");

        // 提取响应内容
        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| GenerationError::EmptyContent {
                model: self.model_name.clone(),
            })?;

        Ok(content.trim().to_string())
    }

    /// 专家咨询
    ///
    /// 统一的多态入口：传入专家身份和咨询内容，返回该专家的意见文本。
    pub async fn consult_expert(
        &self,
        persona: ExpertPersona,
        user_prompt: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, GenerationError> {
        debug!("咨询专家: {}", persona.id());
        self.send_to_llm(user_prompt, Some(persona.system_prompt()), temperature, max_tokens)
            .await
    }

    fn api_error(&self, source: impl std::error::Error + Send + Sync + 'static) -> GenerationError {
        GenerationError::ApiCall {
            model: self.model_name.clone(),
            source: Box::new(source),
        }
    }

    /// 构建产品分析提示词
    fn build_analysis_prompt(&self, product: &Product) -> String {
        let description = product.description_text();
        let description_excerpt: String = description.chars().take(1000).collect();

        format!(
            r#"Analiza este producto cosmético en profundidad y extrae un perfil COMPLETO:

Producto: {}
Marca: {}
Precio: {}€
Descripción: {}
Tags: {}

Devuelve un JSON con TODOS estos campos (inventa datos coherentes si no están explícitos):
{{
    "tipo_producto": "serum/crema/limpiador/etc",
    "categoria_principal": "antiedad/hidratante/tratamiento/etc",
    "subcategorias": ["lista de subcategorías"],
    "ingredientes_clave": ["lista de ingredientes principales"],
    "beneficios_principales": ["lista de beneficios específicos"],
    "tipo_piel_objetivo": ["normal", "seca", "grasa", "mixta", "sensible"],
    "rango_edad": "25-35/35-45/45+/todos",
    "nivel_precio": "premium/lujo/accesible",
    "complejidad_uso": "simple/moderada/avanzada",
    "tiempo_resultados": "inmediato/2-4 semanas/1-3 meses",
    "momento_aplicacion": ["mañana", "noche", "ambos"],
    "textura": "descripción específica",
    "tecnologia_exclusiva": "nombre o descripción de tecnología patentada",
    "puntos_dolor_cliente": ["preocupaciones que resuelve"],
    "objeciones_compra": ["posibles dudas del cliente"]
}}

Responde SOLO con el JSON, sin texto adicional."#,
            product.title, product.vendor, product.price(), description_excerpt, product.tags
        )
    }

    /// 构建回答生成提示词
    fn build_answer_prompt(
        &self,
        question: &CandidateQuestion,
        product: &Product,
        profile: &ProductProfile,
        persona: &BuyerPersona,
    ) -> String {
        let ingredients = profile
            .key_ingredients
            .iter()
            .take(3)
            .cloned()
            .collect::<Vec<_>>()
            .join(", ");
        let benefits = profile
            .main_benefits
            .iter()
            .take(3)
            .cloned()
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            r#"Eres un dermatólogo experto respondiendo a un cliente {}.

PRODUCTO: {}
PRECIO: {}€
PERFIL: {} - {}
INGREDIENTES CLAVE: {}
BENEFICIOS: {}

PREGUNTA: {}
CATEGORÍA: {}

INSTRUCCIONES CRÍTICAS:
1. Responde en EXACTAMENTE 220-320 caracteres (4-5 frases)
2. Incluye MÍNIMO 3 de estos elementos:
   - Dato numérico específico (%, mg, días, etc.)
   - Instrucción práctica paso a paso
   - Referencia a ingrediente con su acción
   - Comparación o diferenciación
   - Consejo profesional basado en experiencia

3. Usa lenguaje {}
4. NO uses palabras genéricas: cosa, algo, etc, básicamente
5. Sé ULTRA-ESPECÍFICO para ESTE producto exacto
6. Incluye detalles que solo un experto conocería

Responde SOLO con el texto de la respuesta, sin comillas ni formato."#,
            persona.id,
            product.title,
            product.price(),
            profile.product_type,
            profile.main_category,
            ingredients,
            benefits,
            question.text,
            question.category,
            persona.language,
        )
    }
}

#[async_trait]
impl ContentSynthesizer for LlmService {
    /// 深度分析产品
    ///
    /// 通过配方师身份的专家咨询获得 JSON 画像；
    /// 解析失败作为类型化错误上抛，由流程层决定退路。
    async fn analyze_product(&self, product: &Product) -> Result<ProductProfile, GenerationError> {
        let prompt = self.build_analysis_prompt(product);
        let response = self
            .consult_expert(ExpertPersona::Formulador, &prompt, 0.3, 1024)
            .await?;

        let json_text = strip_code_fences(&response);
        let profile: ProductProfile = serde_json::from_str(json_text)
            .map_err(|e| GenerationError::ProfileParse { source: e })?;

        Ok(profile)
    }

    /// 为单个问题生成回答
    async fn generate_answer(
        &self,
        question: &CandidateQuestion,
        product: &Product,
        profile: &ProductProfile,
        persona: &BuyerPersona,
    ) -> Result<String, GenerationError> {
        let prompt = self.build_answer_prompt(question, product, profile, persona);
        self.consult_expert(ExpertPersona::Dermatologo, &prompt, 0.8, 150)
            .await
    }
}

/// 剥离 LLM 偶尔附加的 Markdown 代码围栏
fn strip_code_fences(response: &str) -> &str {
    let trimmed = response.trim();
    let without_open = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    without_open
        .strip_suffix("```")
        .unwrap_or(without_open)
        .trim()
}
