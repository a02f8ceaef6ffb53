pub mod grade;
pub mod loaders;
pub mod rubric;
pub mod submission;

pub use grade::{DimensionResult, Grade, GradeRecord, GradingReport, Score};
pub use loaders::{load_all_manifests, load_submission_manifest};
pub use rubric::{catalog, RubricDimension, RUBRIC_CATALOG};
pub use submission::{
    Author, AuthorSummary, EssaySummary, ImageUpload, NewSubmission, StoredEssay,
    SubmissionManifest, SubmissionOutcome, SubmissionRequest,
};
