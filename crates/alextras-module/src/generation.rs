//! Navigation generations and their cancellation tokens.
//!
//! Every detected navigation advances the clock. The token handed to the
//! cycle of the previous navigation is cancelled at that instant, and every
//! module task checks its token before committing a `load`.

use std::sync::{Mutex, PoisonError};

use tokio_util::sync::CancellationToken;

#[derive(Debug)]
struct ClockState {
    generation: u64,
    cancel: CancellationToken,
}

/// Mints one [`GenerationToken`] per navigation.
#[derive(Debug)]
pub struct GenerationClock {
    state: Mutex<ClockState>,
}

impl GenerationClock {
    /// Create a clock at generation 0.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ClockState {
                generation: 0,
                cancel: CancellationToken::new(),
            }),
        }
    }

    /// Start a new generation, superseding the current one.
    pub fn advance(&self) -> GenerationToken {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.cancel.cancel();
        state.generation += 1;
        state.cancel = CancellationToken::new();
        GenerationToken {
            generation: state.generation,
            cancel: state.cancel.clone(),
        }
    }

    /// The live generation number.
    pub fn current(&self) -> u64 {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .generation
    }
}

impl Default for GenerationClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Identifies the navigation a piece of work belongs to.
#[derive(Debug, Clone)]
pub struct GenerationToken {
    generation: u64,
    cancel: CancellationToken,
}

impl GenerationToken {
    /// A token that is never superseded, for surfaces without client routing.
    pub fn detached() -> Self {
        Self {
            generation: 0,
            cancel: CancellationToken::new(),
        }
    }

    /// The generation number.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether no newer navigation has started.
    pub fn is_current(&self) -> bool {
        !self.cancel.is_cancelled()
    }

    /// Resolves once a newer navigation starts.
    pub async fn superseded(&self) {
        self.cancel.cancelled().await
    }
}
