//! Continue-reading prompt
//!
//! One-shot offer to resume from a saved page, evaluated once per book open.
//!
//! ```text
//! Idle ──evaluate(page > 0)──▶ Offered ──accept──▶ Resumed
//!                                  └─────decline──▶ Dismissed
//! ```

use thiserror::Error;

use crate::progress::ResolvedPosition;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptState {
    Idle,
    Offered(ResolvedPosition),
    Resumed { page: u32 },
    Dismissed,
}

impl PromptState {
    fn name(&self) -> &'static str {
        match self {
            PromptState::Idle => "idle",
            PromptState::Offered(_) => "offered",
            PromptState::Resumed { .. } => "resumed",
            PromptState::Dismissed => "dismissed",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PromptError {
    #[error("No resume offer is open (prompt is {0})")]
    NotOffered(&'static str),
}

/// Resume offer state for one book-open session
#[derive(Debug)]
pub struct ContinuePrompt {
    state: PromptState,
    evaluated: bool,
}

impl Default for ContinuePrompt {
    fn default() -> Self {
        Self::new()
    }
}

impl ContinuePrompt {
    pub fn new() -> Self {
        Self {
            state: PromptState::Idle,
            evaluated: false,
        }
    }

    pub fn state(&self) -> &PromptState {
        &self.state
    }

    pub fn is_offered(&self) -> bool {
        matches!(self.state, PromptState::Offered(_))
    }

    /// Page currently on offer
    pub fn offered_page(&self) -> Option<u32> {
        match &self.state {
            PromptState::Offered(position) => Some(position.page),
            _ => None,
        }
    }

    /// Decide whether to offer a resume. Only the first call has any effect.
    pub fn evaluate(&mut self, resolved: Option<&ResolvedPosition>) -> bool {
        if self.evaluated {
            return false;
        }
        self.evaluated = true;

        match resolved {
            Some(position) if position.page > 0 => {
                self.state = PromptState::Offered(position.clone());
                true
            }
            _ => false,
        }
    }

    /// Reader accepts; returns the page to fetch
    pub fn accept(&mut self) -> Result<u32, PromptError> {
        let page = self
            .offered_page()
            .ok_or(PromptError::NotOffered(self.state.name()))?;
        self.state = PromptState::Resumed { page };
        Ok(page)
    }

    /// Reader declines and stays on page 0
    pub fn decline(&mut self) -> Result<(), PromptError> {
        if !self.is_offered() {
            return Err(PromptError::NotOffered(self.state.name()));
        }
        self.state = PromptState::Dismissed;
        Ok(())
    }
}
