pub mod batch;
pub mod difficulty;
pub mod generation;
pub mod question;
pub mod roadmap;
pub mod video;
pub use batch::{BatchEntry, BatchFailure, BatchReport, BatchSummary};
pub use difficulty::Difficulty;
pub use generation::{
    AttemptRecord, GenerationMetadata, GenerationRequest, GenerationResult, GenerationStatus,
    UnitError, UnitErrorKind, UnitKind,
};
pub use question::{Question, QuestionOption, QuestionSet, OPTIONS_PER_QUESTION};
pub use roadmap::{Roadmap, RoadmapStep};
pub use video::{VideoResource, VideoResources};
