pub mod alignment;
pub mod annotator;
pub mod key_lock;
pub mod scheduler;
pub mod translation;
pub mod vocabulary;

pub use alignment::{AlignmentEngine, AlignmentError};
pub use annotator::VocabularyAnnotator;
pub use scheduler::SpacedRepetitionScheduler;
pub use translation::{TextAlignment, TranslationOutput, TranslationPipeline, TranslationRequest};
pub use vocabulary::VocabularyService;
