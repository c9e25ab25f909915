use keyshift_input::{InputError, PunctuationEngine};

/// The switching service's handle on punctuation substitution.
pub trait PunctuationControl: Send + Sync {
    fn enable(&self) -> Result<(), InputError>;
    fn disable(&self);
    fn is_active(&self) -> bool;
}

impl PunctuationControl for PunctuationEngine {
    fn enable(&self) -> Result<(), InputError> {
        PunctuationEngine::enable(self)
    }

    fn disable(&self) {
        PunctuationEngine::disable(self)
    }

    fn is_active(&self) -> bool {
        PunctuationEngine::is_active(self)
    }
}
