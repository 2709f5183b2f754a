//! 运行级统计
//!
//! 批处理驱动逐行累计的计数、评级分布与耗时，
//! 同时收集行级错误，供最终报告与 JSON 摘要使用。

use chrono::{DateTime, Local};
use serde::Serialize;
use serde_json::{json, Value};

use crate::models::faq::QualityTier;

/// 行级错误描述
#[derive(Debug, Clone, Serialize)]
pub struct RowError {
    /// 产品 Handle（缺失时为占位文本）
    pub handle: String,
    /// 产品名称
    pub product: String,
    /// 人类可读的错误说明
    pub error: String,
}

/// 运行统计
#[derive(Debug, Clone)]
pub struct RunStats {
    pub total_products: usize,
    pub processed: usize,
    pub successful: usize,
    pub failed: usize,
    tier_counts: [usize; 6],
    score_sum: f64,
    pub started_at: DateTime<Local>,
    finished_at: Option<DateTime<Local>>,
}

impl RunStats {
    /// 开始一次新的运行统计
    pub fn start(total_products: usize) -> Self {
        Self {
            total_products,
            processed: 0,
            successful: 0,
            failed: 0,
            tier_counts: [0; 6],
            score_sum: 0.0,
            started_at: Local::now(),
            finished_at: None,
        }
    }

    /// 记录一行成功
    pub fn record_success(&mut self, tier: QualityTier, average_score: f64) {
        self.processed += 1;
        self.successful += 1;
        self.tier_counts[tier as usize] += 1;
        self.score_sum += average_score;
    }

    /// 记录一行失败
    pub fn record_failure(&mut self) {
        self.processed += 1;
        self.failed += 1;
    }

    /// 运行结束，锁定耗时
    pub fn finish(&mut self) {
        self.finished_at = Some(Local::now());
    }

    /// 某一评级的产品数量
    pub fn tier_count(&self, tier: QualityTier) -> usize {
        self.tier_counts[tier as usize]
    }

    /// 成功产品的平均质量分
    pub fn average_score(&self) -> f64 {
        if self.successful > 0 {
            self.score_sum / self.successful as f64
        } else {
            0.0
        }
    }

    /// 成功率（百分比）
    pub fn success_rate(&self) -> f64 {
        if self.total_products > 0 {
            self.successful as f64 / self.total_products as f64 * 100.0
        } else {
            0.0
        }
    }

    /// 总耗时（秒）
    pub fn elapsed_seconds(&self) -> i64 {
        let end = self.finished_at.unwrap_or_else(Local::now);
        end.signed_duration_since(self.started_at).num_seconds()
    }

    /// 可读的耗时文本
    pub fn elapsed_display(&self) -> String {
        let secs = self.elapsed_seconds();
        if secs < 60 {
            format!("{} segundos", secs)
        } else if secs < 3600 {
            format!("{} minutos", secs / 60)
        } else {
            format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
        }
    }

    /// 机器可读的运行摘要
    pub fn to_summary_json(&self, errors: &[RowError]) -> Value {
        let mut distribution = serde_json::Map::new();
        for tier in QualityTier::ALL_DESCENDING {
            distribution.insert(tier.label().to_string(), json!(self.tier_count(tier)));
        }

        json!({
            "total_productos": self.total_products,
            "procesados": self.processed,
            "exitosos": self.successful,
            "errores": self.failed,
            "calidad_promedio": (self.average_score() * 100.0).round() / 100.0,
            "distribucion_calidad": Value::Object(distribution),
            "tiempo_inicio": self.started_at.to_rfc3339(),
            "tiempo_total": self.elapsed_display(),
            "detalle_errores": errors,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_accumulation() {
        let mut stats = RunStats::start(3);
        stats.record_success(QualityTier::Legendaria, 18.5);
        stats.record_success(QualityTier::Buena, 9.5);
        stats.record_failure();

        assert_eq!(stats.processed, 3);
        assert_eq!(stats.successful, 2);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.tier_count(QualityTier::Legendaria), 1);
        assert_eq!(stats.tier_count(QualityTier::Buena), 1);
        assert_eq!(stats.tier_count(QualityTier::Excelente), 0);
        assert!((stats.average_score() - 14.0).abs() < 1e-9);
    }

    #[test]
    fn test_stats_empty_run() {
        let stats = RunStats::start(0);
        assert_eq!(stats.average_score(), 0.0);
        assert_eq!(stats.success_rate(), 0.0);
    }

    #[test]
    fn test_summary_json_shape() {
        let mut stats = RunStats::start(1);
        stats.record_success(QualityTier::Excepcional, 15.2);
        stats.finish();

        let errors = vec![RowError {
            handle: "crema-x".to_string(),
            product: "Crema X".to_string(),
            error: "sin resultado".to_string(),
        }];
        let summary = stats.to_summary_json(&errors);

        assert_eq!(summary["exitosos"], 1);
        assert_eq!(summary["distribucion_calidad"]["EXCEPCIONAL"], 1);
        assert_eq!(summary["detalle_errores"][0]["handle"], "crema-x");
    }
}
