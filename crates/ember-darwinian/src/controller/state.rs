//! Generation state machine states and pure transitions

use std::fmt;

use crate::selection::GenomeAssignment;

/// Where the controller is in the experiment
///
/// ```text
/// Initializing ─► LivePhase(0) ─► Logging(0) ─┬─► Breeding(g+1) ─► Mutating(g+1) ─► LivePhase(g+1) ─► Logging(g+1) ─┐
///                                              └─► Done ◄──────────────────────────────────────────────────────────────┘
/// any non-terminal state ─► Stopped (interrupt)
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationState {
    /// Generation 0 only: every bot gets a random genome
    Initializing,
    /// Select winners from the previous generation and breed assignments
    Breeding { generation: u32 },
    /// Apply assignments, then let every bot mutate itself
    Mutating {
        generation: u32,
        assignments: Vec<GenomeAssignment>,
    },
    /// Reset every bot and monitor until the generation time is up
    LivePhase { generation: u32 },
    /// Final poll, appended to the experiment log
    Logging { generation: u32 },
    /// Every configured generation is logged
    Done,
    /// Interrupted while working on `generation`
    Stopped { generation: u32 },
}

impl GenerationState {
    /// Generation the state belongs to; `None` once finished
    pub fn generation(&self) -> Option<u32> {
        match self {
            GenerationState::Initializing => Some(0),
            GenerationState::Breeding { generation }
            | GenerationState::Mutating { generation, .. }
            | GenerationState::LivePhase { generation }
            | GenerationState::Logging { generation } => Some(*generation),
            GenerationState::Done | GenerationState::Stopped { .. } => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, GenerationState::Done | GenerationState::Stopped { .. })
    }

    /// Successor of a completed Logging step
    pub fn after_logging(generation: u32, total_generations: u32) -> GenerationState {
        if generation + 1 < total_generations {
            GenerationState::Breeding {
                generation: generation + 1,
            }
        } else {
            GenerationState::Done
        }
    }

    /// Successor when an interrupt arrives; terminal states are kept
    pub fn interrupted(self) -> GenerationState {
        match self.generation() {
            Some(generation) => GenerationState::Stopped { generation },
            None => self,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            GenerationState::Initializing => "initializing",
            GenerationState::Breeding { .. } => "breeding",
            GenerationState::Mutating { .. } => "mutating",
            GenerationState::LivePhase { .. } => "live",
            GenerationState::Logging { .. } => "logging",
            GenerationState::Done => "done",
            GenerationState::Stopped { .. } => "stopped",
        }
    }
}

impl fmt::Display for GenerationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.generation() {
            Some(generation) => write!(f, "{}(gen {})", self.name(), generation),
            None => f.write_str(self.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_after_logging() {
        assert_eq!(
            GenerationState::after_logging(0, 3),
            GenerationState::Breeding { generation: 1 }
        );
        assert_eq!(GenerationState::after_logging(2, 3), GenerationState::Done);
        assert_eq!(GenerationState::after_logging(0, 1), GenerationState::Done);
    }

    #[test]
    fn test_interrupt_from_any_state() {
        let states = vec![
            GenerationState::Initializing,
            GenerationState::Breeding { generation: 2 },
            GenerationState::Mutating {
                generation: 2,
                assignments: Vec::new(),
            },
            GenerationState::LivePhase { generation: 2 },
            GenerationState::Logging { generation: 2 },
        ];
        for state in states {
            let expected = state.generation().unwrap();
            let stopped = state.interrupted();
            assert_eq!(stopped, GenerationState::Stopped { generation: expected });
            assert!(stopped.is_terminal());
        }

        assert_eq!(GenerationState::Done.interrupted(), GenerationState::Done);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            GenerationState::LivePhase { generation: 4 }.to_string(),
            "live(gen 4)"
        );
        assert_eq!(GenerationState::Done.to_string(), "done");
    }
}
