//! 结果导出 - 业务能力层
//!
//! 将一次运行的产物写入输出目录：
//! - `faqs_shopify.csv`：可直接导入 Shopify 的元字段 CSV
//! - `reporte_calidad.txt`：面向运营的质量报告
//! - `resumen_ejecucion.json`：机器可读的运行摘要

use std::fs;
use std::path::PathBuf;

use chrono::Local;
use serde::Serialize;
use tracing::info;

use crate::config::Config;
use crate::error::{AppError, AppResult, FileError};
use crate::models::faq::{FaqBatch, QualityTier};
use crate::models::stats::{RowError, RunStats};

const CSV_FILE_NAME: &str = "faqs_shopify.csv";
const REPORT_FILE_NAME: &str = "reporte_calidad.txt";
const SUMMARY_FILE_NAME: &str = "resumen_ejecucion.json";

/// Shopify 导入 CSV 的一行
///
/// 列名遵循 Shopify 元字段导入约定，不可改动。
#[derive(Debug, Clone, Serialize)]
pub struct FaqExportRow {
    #[serde(rename = "Handle")]
    pub handle: String,

    #[serde(rename = "Metafield: custom.faq1question [single_line_text_field]")]
    pub faq1_question: String,
    #[serde(rename = "Metafield: custom.faq1answer [multi_line_text_field]")]
    pub faq1_answer: String,

    #[serde(rename = "Metafield: custom.faq2question [single_line_text_field]")]
    pub faq2_question: String,
    #[serde(rename = "Metafield: custom.faq2answer [multi_line_text_field]")]
    pub faq2_answer: String,

    #[serde(rename = "Metafield: custom.faq3question [single_line_text_field]")]
    pub faq3_question: String,
    #[serde(rename = "Metafield: custom.faq3answer [multi_line_text_field]")]
    pub faq3_answer: String,

    #[serde(rename = "Metafield: custom.faq4question [single_line_text_field]")]
    pub faq4_question: String,
    #[serde(rename = "Metafield: custom.faq4answer [multi_line_text_field]")]
    pub faq4_answer: String,

    #[serde(rename = "Metafield: custom.faq5question [single_line_text_field]")]
    pub faq5_question: String,
    #[serde(rename = "Metafield: custom.faq5answer [multi_line_text_field]")]
    pub faq5_answer: String,
}

impl FaqExportRow {
    /// 从一组 FAQ 构建导出行
    pub fn from_batch(handle: &str, batch: &FaqBatch) -> Self {
        let faqs = batch.faqs();
        Self {
            handle: handle.to_string(),
            faq1_question: faqs[0].question.clone(),
            faq1_answer: faqs[0].answer.clone(),
            faq2_question: faqs[1].question.clone(),
            faq2_answer: faqs[1].answer.clone(),
            faq3_question: faqs[2].question.clone(),
            faq3_answer: faqs[2].answer.clone(),
            faq4_question: faqs[3].question.clone(),
            faq4_answer: faqs[3].answer.clone(),
            faq5_question: faqs[4].question.clone(),
            faq5_answer: faqs[4].answer.clone(),
        }
    }
}

/// 结果导出服务
pub struct ReportWriter {
    output_dir: PathBuf,
}

impl ReportWriter {
    pub fn new(config: &Config) -> Self {
        Self {
            output_dir: PathBuf::from(&config.output_dir),
        }
    }

    /// 写出全部产物
    pub fn write_all(
        &self,
        rows: &[FaqExportRow],
        stats: &RunStats,
        errors: &[RowError],
    ) -> AppResult<()> {
        fs::create_dir_all(&self.output_dir).map_err(|e| {
            AppError::File(FileError::DirectoryCreateFailed {
                path: self.output_dir.display().to_string(),
                source: Box::new(e),
            })
        })?;

        self.write_shopify_csv(rows)?;
        self.write_quality_report(stats, errors)?;
        self.write_run_summary(stats, errors)?;

        info!("✓ 导出完成，产物位于 {}", self.output_dir.display());

        Ok(())
    }

    /// 写出 Shopify 元字段 CSV
    fn write_shopify_csv(&self, rows: &[FaqExportRow]) -> AppResult<()> {
        let path = self.output_dir.join(CSV_FILE_NAME);

        let mut writer = csv::Writer::from_path(&path)
            .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;

        for row in rows {
            writer
                .serialize(row)
                .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;
        }

        writer
            .flush()
            .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;

        info!("✓ 已写出 {} 行至 {}", rows.len(), path.display());

        Ok(())
    }

    /// 写出质量报告
    fn write_quality_report(&self, stats: &RunStats, errors: &[RowError]) -> AppResult<()> {
        let path = self.output_dir.join(REPORT_FILE_NAME);

        let mut report = format!(
            "REPORTE DE GENERACIÓN DE FAQs\n\
             =============================\n\
             Fecha: {}\n\n\
             RESUMEN EJECUTIVO\n\
             -----------------\n\
             Total de productos procesados: {}\n\
             Productos exitosos: {}\n\
             Productos con errores: {}\n\
             Tasa de éxito: {:.1}%\n\n\
             CALIDAD DE FAQs GENERADAS\n\
             -------------------------\n\
             Puntuación promedio: {:.2}/20\n\n\
             Distribución de calidad:\n",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            stats.total_products,
            stats.successful,
            stats.failed,
            stats.success_rate(),
            stats.average_score(),
        );

        for tier in QualityTier::ALL_DESCENDING {
            let count = stats.tier_count(tier);
            if count > 0 {
                let percentage = if stats.successful > 0 {
                    count as f64 / stats.successful as f64 * 100.0
                } else {
                    0.0
                };
                report.push_str(&format!(
                    "  • {}: {} productos ({:.1}%)\n",
                    tier.label(),
                    count,
                    percentage
                ));
            }
        }

        report.push_str(&format!(
            "\nTiempo total de procesamiento: {}\n",
            stats.elapsed_display()
        ));

        if !errors.is_empty() {
            report.push_str("\nERRORES ENCONTRADOS\n-------------------\n");
            for error in errors {
                report.push_str(&format!(
                    "• {} (Handle: {})\n  Error: {}\n\n",
                    error.product, error.handle, error.error
                ));
            }
        }

        fs::write(&path, report)
            .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;

        Ok(())
    }

    /// 写出机器可读摘要
    fn write_run_summary(&self, stats: &RunStats, errors: &[RowError]) -> AppResult<()> {
        let path = self.output_dir.join(SUMMARY_FILE_NAME);

        let summary = stats.to_summary_json(errors);
        let content = serde_json::to_string_pretty(&summary)
            .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;

        fs::write(&path, content)
            .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::faq::Faq;

    fn sample_batch() -> FaqBatch {
        let faqs: Vec<Faq> = (1..=5)
            .map(|i| Faq {
                question: format!("¿Pregunta {i}?"),
                answer: format!("Respuesta {i}."),
            })
            .collect();
        FaqBatch::from_faqs(faqs).expect("必须是 5 条")
    }

    fn writer_into(dir: &std::path::Path) -> ReportWriter {
        let config = Config {
            output_dir: dir.display().to_string(),
            ..Config::default()
        };
        ReportWriter::new(&config)
    }

    #[test]
    fn test_export_row_columns() {
        let row = FaqExportRow::from_batch("serum-retinol", &sample_batch());

        let mut csv_writer = csv::Writer::from_writer(Vec::new());
        csv_writer.serialize(&row).expect("序列化失败");
        let bytes = csv_writer.into_inner().expect("取出缓冲失败");
        let output = String::from_utf8(bytes).expect("非 UTF-8 输出");

        assert!(output.contains("Handle"));
        assert!(output.contains("Metafield: custom.faq1question [single_line_text_field]"));
        assert!(output.contains("Metafield: custom.faq5answer [multi_line_text_field]"));
        assert!(output.contains("serum-retinol"));
        assert!(output.contains("¿Pregunta 3?"));
    }

    #[test]
    fn test_write_all_produces_three_artifacts() {
        let dir = tempfile::tempdir().expect("创建临时目录失败");
        let writer = writer_into(dir.path());

        let mut stats = RunStats::start(2);
        stats.record_success(QualityTier::Excepcional, 15.4);
        stats.record_failure();
        stats.finish();

        let rows = vec![FaqExportRow::from_batch("serum-retinol", &sample_batch())];
        let errors = vec![RowError {
            handle: "crema-x".to_string(),
            product: "Crema X".to_string(),
            error: "No se pudo generar FAQs después de todos los intentos".to_string(),
        }];

        writer.write_all(&rows, &stats, &errors).expect("导出失败");

        let report = fs::read_to_string(dir.path().join(REPORT_FILE_NAME)).unwrap();
        assert!(report.contains("REPORTE DE GENERACIÓN DE FAQs"));
        assert!(report.contains("EXCEPCIONAL: 1 productos"));
        assert!(report.contains("Crema X"));

        let summary: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join(SUMMARY_FILE_NAME)).unwrap())
                .unwrap();
        assert_eq!(summary["exitosos"], 1);
        assert_eq!(summary["errores"], 1);

        let csv_content = fs::read_to_string(dir.path().join(CSV_FILE_NAME)).unwrap();
        assert!(csv_content.contains("serum-retinol"));
    }
}
