pub mod faq_flow;
pub mod product_ctx;
pub mod progress;

pub use faq_flow::{FaqFlow, FaqOutcome, FlowResult};
pub use product_ctx::ProductCtx;
pub use progress::{LogProgress, ProgressReporter};
