//! Client-side view state for a roundtable run.
//!
//! [`RoundtableState::apply`] folds wire events into the slices a UI
//! renders: per-agent status and text, the debate transcript, the
//! synthesized prompt, the shot list and overall progress. It returns the
//! [`Pacing`] the consumer should wait before showing the next update.

use std::time::Duration;

use serde::Serialize;

use super::events::{RoundtableEvent, Shot, Stage};
use crate::types::DbId;

/// Pause after an agent finishes a message or a debate turn.
pub const SHORT_PAUSE: Duration = Duration::from_millis(800);

/// Pause after the synthesized prompt or the shot list completes.
pub const LONG_PAUSE: Duration = Duration::from_millis(1500);

/// How long to hold the UI after applying an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pacing {
    None,
    Short,
    Long,
}

/// Concrete delays for each [`Pacing`] level.
#[derive(Debug, Clone, Copy)]
pub struct PacingConfig {
    pub short: Duration,
    pub long: Duration,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            short: SHORT_PAUSE,
            long: LONG_PAUSE,
        }
    }
}

impl PacingConfig {
    /// No artificial delays.
    pub fn instant() -> Self {
        Self {
            short: Duration::ZERO,
            long: Duration::ZERO,
        }
    }

    pub fn delay(&self, pacing: Pacing) -> Duration {
        match pacing {
            Pacing::None => Duration::ZERO,
            Pacing::Short => self.short,
            Pacing::Long => self.long,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    Idle,
    Typing,
    Spoke,
    Debating,
    Debated,
}

/// One agent's seat at the table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentView {
    pub agent: String,
    pub status: AgentStatus,
    /// Round-one analysis text, accumulated from chunks.
    pub message: String,
}

/// One turn in the debate round.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DebateEntry {
    pub agent: String,
    pub text: String,
    pub complete: bool,
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    Complete {
        segment_id: DbId,
        prompt: String,
        shot_list: String,
    },
    Failed {
        message: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RoundtableState {
    /// Agents in the order they first appeared in the stream.
    pub agents: Vec<AgentView>,
    pub debate: Vec<DebateEntry>,
    pub synthesis: String,
    pub synthesizing: bool,
    pub shot_list: String,
    pub shots: Vec<Shot>,
    pub progress: u8,
    pub stage: Option<Stage>,
    pub status_message: Option<String>,
    pub outcome: Option<Outcome>,
}

impl RoundtableState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn agent(&self, name: &str) -> Option<&AgentView> {
        self.agents.iter().find(|a| a.agent == name)
    }

    fn agent_mut(&mut self, name: &str) -> &mut AgentView {
        let idx = match self.agents.iter().position(|a| a.agent == name) {
            Some(idx) => idx,
            None => {
                self.agents.push(AgentView {
                    agent: name.to_string(),
                    status: AgentStatus::Idle,
                    message: String::new(),
                });
                self.agents.len() - 1
            }
        };
        &mut self.agents[idx]
    }

    /// The open (incomplete) debate turn for `agent`, creating one if the
    /// stream skipped `debate_start`.
    fn open_turn(&mut self, agent: &str) -> &mut DebateEntry {
        let idx = match self
            .debate
            .iter()
            .rposition(|e| e.agent == agent && !e.complete)
        {
            Some(idx) => idx,
            None => {
                self.debate.push(DebateEntry {
                    agent: agent.to_string(),
                    text: String::new(),
                    complete: false,
                });
                self.debate.len() - 1
            }
        };
        &mut self.debate[idx]
    }

    fn advance_stage(&mut self, stage: Stage) {
        self.stage = Some(stage);
    }

    fn raise_progress(&mut self, progress: u8) {
        self.progress = self.progress.max(progress.min(100));
    }

    /// Fold one event into the state. Events after a terminal event are
    /// ignored.
    pub fn apply(&mut self, event: &RoundtableEvent) -> Pacing {
        if self.is_finished() {
            return Pacing::None;
        }

        match event {
            RoundtableEvent::Status {
                message,
                progress,
                stage,
            } => {
                self.status_message = Some(message.clone());
                self.raise_progress(*progress);
                self.advance_stage(*stage);
                Pacing::None
            }
            RoundtableEvent::TypingStart { agent } => {
                let view = self.agent_mut(agent);
                view.status = AgentStatus::Typing;
                view.message.clear();
                Pacing::None
            }
            RoundtableEvent::MessageChunk { agent, chunk } => {
                let view = self.agent_mut(agent);
                if view.status == AgentStatus::Idle {
                    view.status = AgentStatus::Typing;
                }
                view.message.push_str(chunk);
                Pacing::None
            }
            RoundtableEvent::MessageComplete { agent, message } => {
                let view = self.agent_mut(agent);
                view.status = AgentStatus::Spoke;
                view.message.clone_from(message);
                Pacing::Short
            }
            RoundtableEvent::DebateStart { agent } => {
                self.agent_mut(agent).status = AgentStatus::Debating;
                self.open_turn(agent);
                if self.stage != Some(Stage::Debate) {
                    self.advance_stage(Stage::Debate);
                }
                Pacing::None
            }
            RoundtableEvent::DebateChunk { agent, chunk } => {
                self.open_turn(agent).text.push_str(chunk);
                Pacing::None
            }
            RoundtableEvent::DebateComplete { agent, message } => {
                let turn = self.open_turn(agent);
                turn.text.clone_from(message);
                turn.complete = true;
                self.agent_mut(agent).status = AgentStatus::Debated;
                Pacing::Short
            }
            RoundtableEvent::SynthesisStart {} => {
                self.synthesizing = true;
                self.synthesis.clear();
                self.advance_stage(Stage::Synthesis);
                Pacing::None
            }
            RoundtableEvent::SynthesisChunk { chunk } => {
                self.synthesis.push_str(chunk);
                Pacing::None
            }
            RoundtableEvent::SynthesisComplete { prompt } => {
                self.synthesis.clone_from(prompt);
                self.synthesizing = false;
                Pacing::Long
            }
            RoundtableEvent::ShotsStart {} => {
                self.shot_list.clear();
                self.shots.clear();
                self.advance_stage(Stage::Shots);
                Pacing::None
            }
            RoundtableEvent::ShotsChunk { chunk } => {
                self.shot_list.push_str(chunk);
                Pacing::None
            }
            RoundtableEvent::ShotsComplete { shot_list, shots } => {
                self.shot_list.clone_from(shot_list);
                self.shots.clone_from(shots);
                Pacing::Long
            }
            RoundtableEvent::Complete {
                segment_id,
                prompt,
                shot_list,
            } => {
                self.raise_progress(100);
                self.advance_stage(Stage::Complete);
                self.synthesizing = false;
                self.outcome = Some(Outcome::Complete {
                    segment_id: *segment_id,
                    prompt: prompt.clone(),
                    shot_list: shot_list.clone(),
                });
                Pacing::None
            }
            RoundtableEvent::Error { message } => {
                self.synthesizing = false;
                self.outcome = Some(Outcome::Failed {
                    message: message.clone(),
                });
                Pacing::None
            }
        }
    }
}
