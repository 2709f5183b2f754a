//! 回答整形 - 业务能力层
//!
//! 生成的回答落在目标长度区间之外时做后处理：
//! 过短的追加画像衍生的补充句，过长的按句子价值贪心裁剪。

use rand::seq::IndexedRandom;
use rand::Rng;
use regex::Regex;

use crate::models::profile::ProductProfile;

/// 目标长度区间（字符数）
pub const ANSWER_MIN_LEN: usize = 220;
pub const ANSWER_MAX_LEN: usize = 320;

/// 裁剪时标记高信息密度句子的短语
const CONFIDENCE_PHRASES: &[&str] = &["específicamente", "clínicamente", "demostrado"];

/// 回答整形器
pub struct AnswerShaper {
    digit_re: Regex,
}

impl AnswerShaper {
    pub fn new() -> Self {
        Self {
            digit_re: Regex::new(r"\d").expect("内置正则必须合法"),
        }
    }

    /// 将回答整形到目标长度区间
    pub fn shape(&self, answer: String, profile: &ProductProfile, rng: &mut impl Rng) -> String {
        let length = answer.chars().count();
        if length < ANSWER_MIN_LEN {
            self.expand(answer, profile, rng)
        } else if length > ANSWER_MAX_LEN {
            self.compress(&answer)
        } else {
            answer
        }
    }

    /// 扩充过短的回答
    ///
    /// 反复追加随机补充句直到达到下限，超出上限则截断。
    fn expand(&self, mut answer: String, profile: &ProductProfile, rng: &mut impl Rng) -> String {
        while answer.chars().count() < ANSWER_MIN_LEN {
            answer.push_str(&self.expansion_clause(profile, rng));
        }

        if answer.chars().count() > ANSWER_MAX_LEN {
            answer.chars().take(ANSWER_MAX_LEN).collect()
        } else {
            answer
        }
    }

    /// 生成一条画像衍生的补充句
    fn expansion_clause(&self, profile: &ProductProfile, rng: &mut impl Rng) -> String {
        match rng.random_range(0..4) {
            0 => {
                let pool = &profile.main_benefits[..profile.main_benefits.len().min(2)];
                let benefit = pool
                    .choose(rng)
                    .map(|b| b.as_str())
                    .unwrap_or("mejora visible de la piel");
                format!(" Específicamente, {}.", benefit)
            }
            1 => format!(
                " Los estudios confirman resultados en {} semanas.",
                rng.random_range(2..=8)
            ),
            2 => {
                let skin = profile
                    .target_skin_types
                    .choose(rng)
                    .map(|s| s.as_str())
                    .unwrap_or("todo tipo de piel");
                format!(" Recomendado especialmente para {}.", skin)
            }
            _ => {
                let technology = if profile.exclusive_technology.is_empty() {
                    "avanzada"
                } else {
                    profile.exclusive_technology.as_str()
                };
                format!(" Su tecnología {} garantiza máxima eficacia.", technology)
            }
        }
    }

    /// 压缩过长的回答
    ///
    /// 按信息价值给句子打分（含数字 +2，含可信度短语 +1），
    /// 稳定排序后贪心保留，装不下的整句丢弃。
    fn compress(&self, answer: &str) -> String {
        let sentences = split_sentences(answer);

        let mut ranked: Vec<(&str, i32)> = sentences
            .iter()
            .map(|sentence| {
                let mut points = 0;
                if self.digit_re.is_match(sentence) {
                    points += 2;
                }
                let lower = sentence.to_lowercase();
                if CONFIDENCE_PHRASES.iter().any(|p| lower.contains(p)) {
                    points += 1;
                }
                (*sentence, points)
            })
            .collect();

        // 稳定排序：同分句子保持原有先后
        ranked.sort_by_key(|(_, points)| std::cmp::Reverse(*points));

        let mut compressed = String::new();
        for (sentence, _) in ranked {
            if compressed.chars().count() + sentence.chars().count() <= ANSWER_MAX_LEN {
                compressed.push_str(sentence);
                compressed.push(' ');
            } else {
                break;
            }
        }

        compressed.trim_end().to_string()
    }
}

impl Default for AnswerShaper {
    fn default() -> Self {
        Self::new()
    }
}

/// 按句末标点切分句子（句末标点后跟空白处断开）
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((index, c)) = chars.next() {
        if matches!(c, '.' | '!' | '?') {
            if let Some(&(_, next)) = chars.peek() {
                if next.is_whitespace() {
                    let end = index + c.len_utf8();
                    sentences.push(text[start..end].trim_start());
                    start = end;
                }
            }
        }
    }

    let tail = text[start..].trim_start();
    if !tail.is_empty() {
        sentences.push(tail);
    }

    sentences
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::product::Product;

    fn sample_profile() -> ProductProfile {
        let product = Product {
            handle: "crema-retinol".to_string(),
            title: "Crema Retinol 0.3%".to_string(),
            body_html: String::new(),
            variant_price: Some(89.0),
            vendor: String::new(),
            tags: String::new(),
        };
        ProductProfile::basic_fallback(&product)
    }

    #[test]
    fn test_split_sentences() {
        let text = "Primera frase. Segunda con 20 mg. ¿Tercera?";
        let sentences = split_sentences(text);
        assert_eq!(sentences.len(), 3);
        assert_eq!(sentences[0], "Primera frase.");
        assert_eq!(sentences[1], "Segunda con 20 mg.");
        assert_eq!(sentences[2], "¿Tercera?");
    }

    #[test]
    fn test_shape_keeps_in_band_answer() {
        let shaper = AnswerShaper::new();
        let answer = "a".repeat(250);
        let mut rng = rand::rng();
        assert_eq!(shaper.shape(answer.clone(), &sample_profile(), &mut rng), answer);
    }

    #[test]
    fn test_expand_reaches_band() {
        let shaper = AnswerShaper::new();
        let mut rng = rand::rng();
        let shaped = shaper.shape(
            "Hidrata en profundidad.".to_string(),
            &sample_profile(),
            &mut rng,
        );
        let length = shaped.chars().count();
        assert!((ANSWER_MIN_LEN..=ANSWER_MAX_LEN).contains(&length), "长度越界: {}", length);
    }

    #[test]
    fn test_compress_prefers_numeric_sentences() {
        let shaper = AnswerShaper::new();
        let filler = "Esta frase alargada no aporta ningún dato concreto y solo rellena espacio describiendo sensaciones generales de uso cotidiano. ";
        let numeric = "Reduce las arrugas un 23% en 28 días según el panel de prueba.";
        let long_answer = format!("{}{}{}{}", filler, filler, filler, numeric);
        assert!(long_answer.chars().count() > ANSWER_MAX_LEN);

        let compressed = shaper.compress(&long_answer);
        assert!(compressed.chars().count() <= ANSWER_MAX_LEN);
        // 含数字的句子优先保留
        assert!(compressed.contains("23%"));
    }

    #[test]
    fn test_compress_keeps_stable_order_on_ties(){
        let shaper = AnswerShaper::new();
        let answer = "Uno dos tres. Cuatro cinco seis. Siete ocho nueve.";
        // 全部同分时按原文顺序保留
        let compressed = shaper.compress(answer);
        assert_eq!(compressed, "Uno dos tres. Cuatro cinco seis. Siete ocho nueve.");
    }
}
