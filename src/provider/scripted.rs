//! A provider that replays a fixed sequence of replies.
//!
//! Used for offline runs and for driving the simulation loop in tests.
//! Every call consumes one reply; once the script runs out each call fails
//! with a format error, so the loop ends up forfeiting the seat's turns.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::core::{GameAction, MoveProposal, PublicGameState};

use super::{MoveProvider, ProviderError};

/// Instructions received per call, shared with the test that built the provider.
pub type Transcript = Rc<RefCell<Vec<String>>>;

#[derive(Debug)]
pub struct ScriptedProvider {
    model: String,
    replies: VecDeque<Result<MoveProposal, ProviderError>>,
    transcript: Transcript,
}

impl ScriptedProvider {
    #[must_use]
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            replies: VecDeque::new(),
            transcript: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Queue a move with a rationale.
    #[must_use]
    pub fn then_move(mut self, rationale: impl Into<String>, action: GameAction) -> Self {
        self.replies.push_back(Ok(MoveProposal::new(rationale, action)));
        self
    }

    /// Queue a failure.
    #[must_use]
    pub fn then_fail(mut self, error: ProviderError) -> Self {
        self.replies.push_back(Err(error));
        self
    }

    /// Queue the same failure `count` times.
    #[must_use]
    pub fn then_fail_times(mut self, error: ProviderError, count: usize) -> Self {
        for _ in 0..count {
            self.replies.push_back(Err(error.clone()));
        }
        self
    }

    /// Handle onto the instructions this provider has been sent.
    #[must_use]
    pub fn transcript(&self) -> Transcript {
        Rc::clone(&self.transcript)
    }

    /// Replies not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.replies.len()
    }
}

impl MoveProvider for ScriptedProvider {
    fn model(&self) -> &str {
        &self.model
    }

    fn propose_move(
        &mut self,
        _state: &PublicGameState,
        instructions: &str,
    ) -> Result<MoveProposal, ProviderError> {
        self.transcript.borrow_mut().push(instructions.to_string());
        self.replies
            .pop_front()
            .unwrap_or_else(|| Err(ProviderError::format("script exhausted")))
    }
}
