pub mod faq;
pub mod loaders;
pub mod product;
pub mod profile;
pub mod stats;

pub use faq::{AttemptRecord, BatchMetrics, Faq, FaqBatch, FaqMetrics, QualityTier};
pub use loaders::load_products_csv;
pub use product::Product;
pub use profile::{BuyerPersona, ProductProfile, BUYER_PERSONAS};
pub use stats::{RowError, RunStats};
