pub mod dimension_grader;
pub mod text_extraction;

pub use dimension_grader::{parse_grading_response, DimensionGrader, GradingFailure};
pub use text_extraction::TextExtractor;
