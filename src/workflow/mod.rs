pub mod grading_flow;
pub mod submission_ctx;
pub mod submission_flow;

pub use grading_flow::GradingFlow;
pub use submission_ctx::SubmissionCtx;
pub use submission_flow::SubmissionFlow;
