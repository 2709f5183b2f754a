pub mod answer_shaper;
pub mod history_store;
pub mod llm_service;
pub mod quality_scorer;
pub mod question_bank;
pub mod report_writer;
pub mod text_metrics;

pub use answer_shaper::AnswerShaper;
pub use history_store::HistoryStore;
pub use llm_service::{ContentSynthesizer, ExpertPersona, LlmService};
pub use quality_scorer::QualityScorer;
pub use question_bank::{CandidateQuestion, QuestionBank};
pub use report_writer::{FaqExportRow, ReportWriter};
pub use text_metrics::TextMetrics;
