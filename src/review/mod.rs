pub mod session;
pub mod state;

pub use session::{ReviewSummary, TrainingFlag, TranscriptReview};
pub use state::{
    apply_correction, initial_states, ReviewAction, ReviewStatus, ReviewerId, WordReviewState,
};
