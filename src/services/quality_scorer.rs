//! 质量评分 - 业务能力层
//!
//! 对一组 5 条 FAQ 做逐条打分与整组聚合，输出完整指标。
//! 纯函数：同样的输入永远得到同样的评分。

use std::collections::HashSet;

use crate::config::Config;
use crate::models::faq::{BatchMetrics, Faq, FaqBatch, FaqMetrics, QualityTier};
use crate::services::text_metrics::TextMetrics;

/// 主题分类关键词表
///
/// 顺序即匹配优先级：一个问题命中首个含关键词的主题后不再继续。
const TOPIC_BUCKETS: &[(&str, &[&str])] = &[
    ("aplicacion", &["aplicar", "usar", "cantidad", "técnica", "masaje"]),
    ("ingredientes", &["ingrediente", "activo", "concentración", "fórmula", "contiene"]),
    ("resultados", &["resultado", "tiempo", "mejora", "cambio", "efecto"]),
    ("compatibilidad", &["combinar", "mezclar", "compatible", "interferir", "junto"]),
    ("seguridad", &["seguro", "irritación", "alergia", "sensible", "reacción"]),
];

/// 整组校验阈值
const MIN_VALID_AVERAGE: f64 = 9.0;
const MAX_REPETITION_RATIO: f64 = 0.15;
const MIN_TOPICAL_DIVERSITY: f64 = 0.7;

/// 质量评分器
pub struct QualityScorer {
    metrics: TextMetrics,
    question_open_mark: String,
    question_close_mark: String,
}

impl QualityScorer {
    pub fn new(config: &Config) -> Self {
        Self {
            metrics: TextMetrics::new(),
            question_open_mark: config.question_open_mark.clone(),
            question_close_mark: config.question_close_mark.clone(),
        }
    }

    /// 对一组 FAQ 评分
    pub fn score_batch(&self, batch: &FaqBatch) -> BatchMetrics {
        let per_faq: Vec<FaqMetrics> = batch.iter().map(|faq| self.score_faq(faq)).collect();

        let total_score: f64 = per_faq.iter().map(|m| m.score).sum();
        let average_score = total_score / FaqBatch::SIZE as f64;

        let repetition_ratio = self.repetition_ratio(batch);
        let topical_diversity = self.topical_diversity(batch);
        let quality_tier = QualityTier::from_average(average_score);

        let is_valid = average_score >= MIN_VALID_AVERAGE
            && repetition_ratio < MAX_REPETITION_RATIO
            && topical_diversity > MIN_TOPICAL_DIVERSITY;

        BatchMetrics {
            per_faq,
            total_score,
            average_score,
            quality_tier,
            repetition_ratio,
            topical_diversity,
            is_valid,
        }
    }

    /// 单条 FAQ 评分
    ///
    /// 各项加分按固定顺序累计，顺序不可调换以保持同分时的可复现性。
    fn score_faq(&self, faq: &Faq) -> FaqMetrics {
        let answer = &faq.answer;
        let answer_length = answer.chars().count();

        let numeric_data_count = self.metrics.numeric_data_count(answer);
        let technical_term_count = self.metrics.technical_term_count(answer);
        let has_instruction = self.metrics.has_instruction(answer);
        let specificity_ratio = self.metrics.specificity_ratio(answer);
        let lexical_diversity = self.metrics.lexical_diversity(answer);
        let has_comparison = self.metrics.has_comparison(answer);
        let well_formed_question = self.metrics.well_formed_question(
            &faq.question,
            &self.question_open_mark,
            &self.question_close_mark,
        );

        // 1. 长度区间
        let mut score: f64 = match answer_length {
            220..=320 => 3.0,
            200..=350 => 2.0,
            _ => 1.0,
        };

        // 2. 数字数据（封顶 6 分）
        score += (numeric_data_count as f64 * 2.0).min(6.0);

        // 3. 专业术语（封顶 4 分）
        score += (technical_term_count as f64 * 1.5).min(4.0);

        // 4. 使用指引
        if has_instruction {
            score += 2.0;
        }

        // 5. 高具体性
        if specificity_ratio > 0.95 {
            score += 3.0;
        }

        // 6. 词汇多样性
        if lexical_diversity > 0.6 {
            score += 2.0;
        }

        // 7. 对比表述
        if has_comparison {
            score += 2.0;
        }

        // 8. 问句格式
        if well_formed_question {
            score += 1.0;
        }

        FaqMetrics {
            answer_length,
            question_word_count: self.metrics.word_count(&faq.question),
            numeric_data_count,
            technical_term_count,
            has_instruction,
            specificity_ratio,
            lexical_diversity,
            has_comparison,
            well_formed_question,
            score,
        }
    }

    /// 句子重复率
    ///
    /// 五条回答拼接后按句号切分，1 - 去重句数/总句数。
    /// 没有句子时记 0（视为未检出重复）。
    fn repetition_ratio(&self, batch: &FaqBatch) -> f64 {
        let joined = batch
            .iter()
            .map(|faq| faq.answer.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        let segments: Vec<&str> = joined.split('.').collect();
        if segments.is_empty() {
            return 0.0;
        }

        let unique: HashSet<&str> = segments.iter().copied().collect();
        1.0 - unique.len() as f64 / segments.len() as f64
    }

    /// 主题多样性
    ///
    /// 每个问题按关键词归入首个命中的主题（无命中归入 otro），
    /// 多样性 = 不同主题数 / 5。
    fn topical_diversity(&self, batch: &FaqBatch) -> f64 {
        let mut topics: HashSet<&str> = HashSet::new();

        for faq in batch.iter() {
            let question = faq.question.to_lowercase();
            let mut detected = "otro";
            for &(topic, keywords) in TOPIC_BUCKETS {
                if keywords.iter().any(|kw| question.contains(kw)) {
                    detected = topic;
                    break;
                }
            }
            topics.insert(detected);
        }

        topics.len() as f64 / FaqBatch::SIZE as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::faq::Faq;

    /// 创建测试用的评分器
    fn create_scorer() -> QualityScorer {
        QualityScorer::new(&Config::default())
    }

    /// 主题各异的 5 个标准问题
    fn sample_questions() -> [&'static str; 5] {
        [
            "¿Cuál es la cantidad exacta que debo aplicar?",
            "¿Qué concentración de retinol contiene la fórmula?",
            "¿Cuándo veré el primer resultado en mi piel?",
            "¿Puedo combinar el sérum con vitamina C?",
            "¿Es seguro para pieles con rosácea sensible?",
        ]
    }

    /// 结构完整、各项加分全中的回答（单条得分 23）
    fn perfect_answer(ml: u32, pct: u32, dias: u32, skin: &str) -> String {
        format!(
            "Aplica {ml} ml cada noche sobre el rostro limpio; clínicamente demostrado, \
             sus activos de retinol al {pct}% mejoran la firmeza visible en {dias} días. \
             A diferencia de otras fórmulas, su penetración dérmica es gradual y respeta \
             la barrera cutánea incluso en pieles {skin}."
        )
    }

    fn perfect_batch() -> FaqBatch {
        let params = [(2, 3, 28, "sensibles"), (3, 5, 30, "reactivas"), (4, 10, 21, "secas"), (1, 8, 14, "mixtas"), (5, 12, 45, "maduras")];
        let faqs: Vec<Faq> = sample_questions()
            .iter()
            .zip(params)
            .map(|(q, (ml, pct, dias, skin))| Faq {
                question: q.to_string(),
                answer: perfect_answer(ml, pct, dias, skin),
            })
            .collect();
        FaqBatch::from_faqs(faqs).expect("必须是 5 条")
    }

    #[test]
    fn test_perfect_batch_scores_maximum() {
        let scorer = create_scorer();
        let metrics = scorer.score_batch(&perfect_batch());

        for faq_metrics in &metrics.per_faq {
            assert_eq!(faq_metrics.score, 23.0);
            assert!((0.0..=23.0).contains(&faq_metrics.score));
        }
        assert_eq!(metrics.average_score, 23.0);
        assert_eq!(metrics.total_score, 115.0);
        assert_eq!(metrics.quality_tier, QualityTier::Legendaria);
        // 回答两两不同、主题各异：整组校验通过
        assert_eq!(metrics.repetition_ratio, 0.0);
        assert_eq!(metrics.topical_diversity, 1.0);
        assert!(metrics.is_valid);
    }

    #[test]
    fn test_scoring_is_deterministic() {
        let scorer = create_scorer();
        let first = scorer.score_batch(&perfect_batch());
        let second = scorer.score_batch(&perfect_batch());
        assert_eq!(first.average_score, second.average_score);
        assert_eq!(first.quality_tier, second.quality_tier);
        assert_eq!(first.repetition_ratio, second.repetition_ratio);
        assert_eq!(first.topical_diversity, second.topical_diversity);
    }

    #[test]
    fn test_repetition_invalidates_high_scores() {
        // 五条完全相同的高分回答：平均分依旧很高，但重复率超限，整组无效
        let scorer = create_scorer();
        let answer = perfect_answer(2, 3, 28, "sensibles");
        let faqs: Vec<Faq> = sample_questions()
            .iter()
            .map(|q| Faq {
                question: q.to_string(),
                answer: answer.clone(),
            })
            .collect();
        let batch = FaqBatch::from_faqs(faqs).expect("必须是 5 条");

        let metrics = scorer.score_batch(&batch);
        assert_eq!(metrics.average_score, 23.0);
        assert!(metrics.repetition_ratio >= 0.15);
        assert!(!metrics.is_valid);
        // 拼接后 11 个句段中只剩 4 个不同
        assert!((metrics.repetition_ratio - (1.0 - 4.0 / 11.0)).abs() < 1e-9);
    }

    #[test]
    fn test_length_band_boundary() {
        // 219 与 220 字符的回答只差长度档位：2 分档 vs 3 分档
        let scorer = create_scorer();
        let base = "bb bc bd bf bg bh bj bk bl bm bn bp bq br bt bv bw bx by bz cb cc cd cf cg ch cj ck cl cm cn cp cq cr ct cv cw cx cy cz db dc dd df dg dh dj dk dl dm dn dp dq dr dt dv dw dx dy dz fb fc fd ff fg fh fj fk fl fm fn fp fq ";
        let answer_219: String = base.chars().take(219).collect();
        let answer_220: String = base.chars().take(219).collect::<String>() + "f";
        assert_eq!(answer_219.chars().count(), 219);
        assert_eq!(answer_220.chars().count(), 220);

        let question = "¿Sirve este tratamiento para pieles grasas?".to_string();
        let score_of = |answer: String| {
            let faqs = vec![
                Faq { question: question.clone(), answer },
                Faq { question: "¿Qué concentración contiene la fórmula?".to_string(), answer: "Vacío".to_string() },
                Faq { question: "¿Cuándo veré el primer resultado?".to_string(), answer: "Vacío".to_string() },
                Faq { question: "¿Puedo combinar el sérum con retinol?".to_string(), answer: "Vacío".to_string() },
                Faq { question: "¿Es seguro en pieles sensibles?".to_string(), answer: "Vacío".to_string() },
            ];
            let batch = FaqBatch::from_faqs(faqs).expect("必须是 5 条");
            scorer.score_batch(&batch).per_faq[0].score
        };

        // 219 字符落在宽松档 [200,350] → 2 分；220 进入理想档 [220,320] → 3 分
        assert_eq!(score_of(answer_219), 8.0);
        assert_eq!(score_of(answer_220), 9.0);
    }

    #[test]
    fn test_average_is_mean_of_five() {
        let scorer = create_scorer();
        let metrics = scorer.score_batch(&perfect_batch());
        let sum: f64 = metrics.per_faq.iter().map(|m| m.score).sum();
        assert_eq!(metrics.per_faq.len(), 5);
        assert!((metrics.average_score - sum / 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_topical_diversity_single_topic() {
        // 五个问题全部落在同一主题时多样性为 1/5
        let scorer = create_scorer();
        let faqs: Vec<Faq> = (0..5)
            .map(|i| Faq {
                question: format!("¿Qué cantidad debo aplicar el día {i}?"),
                answer: "Una capa fina.".to_string(),
            })
            .collect();
        let batch = FaqBatch::from_faqs(faqs).expect("必须是 5 条");
        let metrics = scorer.score_batch(&batch);
        assert!((metrics.topical_diversity - 0.2).abs() < 1e-9);
        assert!(!metrics.is_valid);
    }
}
