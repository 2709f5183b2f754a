//! 文本指标 - 业务能力层
//!
//! 对单条回答文本计算词法指标的纯函数集合。
//! 全部确定性计算，不触网、不落盘。

use std::collections::HashSet;

use phf::phf_set;
use regex::Regex;

/// 专业术语词表（不区分大小写，子串匹配）
static TECHNICAL_TERMS: phf::Set<&'static str> = phf_set! {
    "dermatológicamente",
    "clínicamente",
    "activos",
    "penetración",
    "biodisponible",
    "encapsulado",
};

/// 泛指填充词词表（出现越多，回答越不具体）
static GENERIC_FILLERS: phf::Set<&'static str> = phf_set! {
    "cosa",
    "algo",
    "producto",
    "esto",
};

/// 文本指标计算器
///
/// 正则在构造时编译一次，之后按次复用。
pub struct TextMetrics {
    numeric_re: Regex,
    instruction_re: Regex,
    comparison_re: Regex,
}

impl TextMetrics {
    pub fn new() -> Self {
        Self {
            numeric_re: Regex::new(r"\d+[%\s]*(mg|ml|%|días?|semanas?|meses?|€)")
                .expect("内置正则必须合法"),
            instruction_re: Regex::new(r"(aplica|usa|masajea|espera|evita|combina)")
                .expect("内置正则必须合法"),
            comparison_re: Regex::new(r"(mejor que|a diferencia de|mientras que|frente a)")
                .expect("内置正则必须合法"),
        }
    }

    /// 带单位的数字数据个数
    ///
    /// 匹配"数字 + 计量单位/百分号/货币符号"的组合
    pub fn numeric_data_count(&self, text: &str) -> usize {
        self.numeric_re.find_iter(text).count()
    }

    /// 命中的专业术语个数（每个词最多计一次）
    pub fn technical_term_count(&self, text: &str) -> usize {
        let lower = text.to_lowercase();
        TECHNICAL_TERMS
            .iter()
            .filter(|term| lower.contains(*term))
            .count()
    }

    /// 是否包含使用指引动词
    pub fn has_instruction(&self, text: &str) -> bool {
        self.instruction_re.is_match(&text.to_lowercase())
    }

    /// 具体性比率
    ///
    /// 1 - 出现的填充词种类数 / 总词数。空文本按完全具体（1.0）处理。
    pub fn specificity_ratio(&self, text: &str) -> f64 {
        let lower = text.to_lowercase();
        let word_count = lower.split_whitespace().count();
        if word_count == 0 {
            return 1.0;
        }

        let filler_count = GENERIC_FILLERS
            .iter()
            .filter(|filler| lower.contains(*filler))
            .count();

        1.0 - filler_count as f64 / word_count as f64
    }

    /// 词汇多样性
    ///
    /// 去重后的小写词数 / 总词数。空文本为 0。
    pub fn lexical_diversity(&self, text: &str) -> f64 {
        let lower = text.to_lowercase();
        let words: Vec<&str> = lower.split_whitespace().collect();
        if words.is_empty() {
            return 0.0;
        }

        let unique: HashSet<&str> = words.iter().copied().collect();
        unique.len() as f64 / words.len() as f64
    }

    /// 是否包含对比表述
    pub fn has_comparison(&self, text: &str) -> bool {
        self.comparison_re.is_match(&text.to_lowercase())
    }

    /// 问句格式是否规范（以起始问号开头、结束问号结尾）
    pub fn well_formed_question(&self, text: &str, open_mark: &str, close_mark: &str) -> bool {
        text.starts_with(open_mark) && text.ends_with(close_mark)
    }

    /// 词数统计
    pub fn word_count(&self, text: &str) -> usize {
        text.split_whitespace().count()
    }
}

impl Default for TextMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_data_count() {
        let metrics = TextMetrics::new();
        assert_eq!(metrics.numeric_data_count("Aplica 2 ml y espera 28 días."), 2);
        assert_eq!(metrics.numeric_data_count("Contiene retinol al 3%."), 1);
        assert_eq!(metrics.numeric_data_count("Cuesta 45 €, dura 2 meses."), 2);
        assert_eq!(metrics.numeric_data_count("Sin datos concretos."), 0);
        assert_eq!(metrics.numeric_data_count(""), 0);
    }

    #[test]
    fn test_technical_term_count() {
        let metrics = TextMetrics::new();
        let text = "Clínicamente probado, sus activos de alta penetración actúan rápido.";
        assert_eq!(metrics.technical_term_count(text), 3);
        // 同一个术语重复出现只计一次
        assert_eq!(metrics.technical_term_count("activos y más activos"), 1);
        assert_eq!(metrics.technical_term_count(""), 0);
    }

    #[test]
    fn test_has_instruction() {
        let metrics = TextMetrics::new();
        assert!(metrics.has_instruction("Aplica una capa fina."));
        assert!(metrics.has_instruction("Evita el contorno de ojos."));
        assert!(!metrics.has_instruction("Textura ligera y fresca."));
    }

    #[test]
    fn test_specificity_ratio_bounds() {
        let metrics = TextMetrics::new();
        // 空文本按完全具体处理
        assert_eq!(metrics.specificity_ratio(""), 1.0);
        assert_eq!(metrics.specificity_ratio("retinol al tres por ciento"), 1.0);

        let vague = "esto es algo como una cosa";
        let ratio = metrics.specificity_ratio(vague);
        assert!(ratio < 1.0);
        assert!((0.0..=1.0).contains(&ratio));
    }

    #[test]
    fn test_lexical_diversity() {
        let metrics = TextMetrics::new();
        assert_eq!(metrics.lexical_diversity(""), 0.0);
        // 全不重复的词序列多样性为 1.0
        assert_eq!(metrics.lexical_diversity("uno dos tres cuatro"), 1.0);
        // 大小写视为同一个词
        assert_eq!(metrics.lexical_diversity("Piel piel"), 0.5);
    }

    #[test]
    fn test_has_comparison() {
        let metrics = TextMetrics::new();
        assert!(metrics.has_comparison("Es mejor que las cremas genéricas."));
        assert!(metrics.has_comparison("A diferencia de otros sérums, no irrita."));
        assert!(!metrics.has_comparison("Hidrata en profundidad."));
    }

    #[test]
    fn test_well_formed_question() {
        let metrics = TextMetrics::new();
        assert!(metrics.well_formed_question("¿Cómo se aplica?", "¿", "?"));
        assert!(!metrics.well_formed_question("Cómo se aplica?", "¿", "?"));
        assert!(!metrics.well_formed_question("¿Cómo se aplica", "¿", "?"));
        // 标记可按目标语言配置
        assert!(metrics.well_formed_question("How does it work?", "H", "?"));
    }
}
