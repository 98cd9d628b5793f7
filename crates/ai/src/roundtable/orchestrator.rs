//! Drives one roundtable run and reports it as events.

use scenra_core::roundtable::{RoundtableEvent, Shot, Stage};
use serde::Serialize;
use tokio::sync::mpsc;

use super::agents::{Agent, AGENTS};
use super::brief::RoundtableBrief;
use crate::error::AiError;
use crate::json::parse_model_json;
use crate::types::{LlmChat, Message};

/// Words per `*_chunk` event.
pub const CHUNK_WORDS: usize = 4;

const AGENT_MAX_TOKENS: u32 = 600;
const SYNTHESIS_MAX_TOKENS: u32 = 800;
const SHOTS_MAX_TOKENS: u32 = 1200;

const ANALYSIS_START: u8 = 5;
const DEBATE_START: u8 = 40;
const SYNTHESIS_START: u8 = 70;
const SHOTS_START: u8 = 85;

const SYNTHESIS_SYSTEM: &str = "You are the showrunner closing a creative roundtable. Merge the \
team's ideas into one video generation prompt. Resolve disagreements decisively.";

const SHOTS_SYSTEM: &str = "You are a first assistant director. You turn a finished generation \
prompt into a numbered shot list. Reply with a JSON array and nothing else.";

#[derive(Debug, thiserror::Error)]
pub enum RoundtableError {
    #[error(transparent)]
    Ai(#[from] AiError),

    /// The event receiver was dropped before the run finished.
    #[error("roundtable cancelled")]
    Cancelled,
}

/// One agent turn, kept for the segment's transcript column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptEntry {
    pub round: Stage,
    pub agent: String,
    pub message: String,
}

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundtableOutcome {
    pub prompt: String,
    pub shot_list: String,
    pub shots: Vec<Shot>,
    pub transcript: Vec<TranscriptEntry>,
}

/// Split `text` into groups of `words_per_chunk` words.
///
/// Whitespace stays attached to the preceding word, so joining the chunks
/// gives back `text` exactly.
pub fn chunk_words(text: &str, words_per_chunk: usize) -> Vec<&str> {
    let n = words_per_chunk.max(1);
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut words = 0;
    let mut prev_ws = true;

    for (i, c) in text.char_indices() {
        let ws = c.is_whitespace();
        if prev_ws && !ws {
            if words == n {
                chunks.push(&text[start..i]);
                start = i;
                words = 0;
            }
            words += 1;
        }
        prev_ws = ws;
    }
    if start < text.len() {
        chunks.push(&text[start..]);
    }
    chunks
}

/// Event sink that turns a closed channel into [`RoundtableError::Cancelled`].
struct Emitter<'a> {
    tx: &'a mpsc::Sender<RoundtableEvent>,
}

impl Emitter<'_> {
    async fn send(&self, event: RoundtableEvent) -> Result<(), RoundtableError> {
        self.tx
            .send(event)
            .await
            .map_err(|_| RoundtableError::Cancelled)
    }

    async fn status(
        &self,
        message: String,
        progress: u8,
        stage: Stage,
    ) -> Result<(), RoundtableError> {
        self.send(RoundtableEvent::status(message, progress, stage))
            .await
    }

    /// Fail fast before spending a model call on a client that left.
    fn ensure_open(&self) -> Result<(), RoundtableError> {
        if self.tx.is_closed() {
            Err(RoundtableError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Run the full roundtable for `brief`, streaming progress into `tx`.
///
/// Emits everything up to and including `shots_complete`. The caller
/// persists the outcome and sends the terminal `complete` or `error` event.
pub async fn run_roundtable(
    llm: &dyn LlmChat,
    brief: &RoundtableBrief,
    tx: &mpsc::Sender<RoundtableEvent>,
) -> Result<RoundtableOutcome, RoundtableError> {
    let out = Emitter { tx };
    let brief_text = brief.render();
    let mut transcript = Vec::with_capacity(AGENTS.len() * 2);

    // -- Round one: independent analysis --------------------------------------

    tracing::info!(segment = %brief.segment_title, "Roundtable analysis round");
    out.status(
        "The team is reviewing the brief".into(),
        ANALYSIS_START,
        Stage::Analysis,
    )
    .await?;

    for (i, agent) in AGENTS.iter().enumerate() {
        out.ensure_open()?;
        out.send(RoundtableEvent::TypingStart {
            agent: agent.key.into(),
        })
        .await?;

        let prompt = format!(
            "{brief_text}\nGive your initial analysis of how this segment should look and \
             play, from your discipline only. Keep it under 150 words."
        );
        let message = ask_agent(llm, agent, prompt).await?;

        for chunk in chunk_words(&message, CHUNK_WORDS) {
            out.send(RoundtableEvent::MessageChunk {
                agent: agent.key.into(),
                chunk: chunk.into(),
            })
            .await?;
        }
        out.send(RoundtableEvent::MessageComplete {
            agent: agent.key.into(),
            message: message.clone(),
        })
        .await?;
        out.status(
            format!("{} shared their analysis", agent.display_name),
            step_progress(ANALYSIS_START, DEBATE_START, i),
            Stage::Analysis,
        )
        .await?;

        transcript.push(TranscriptEntry {
            round: Stage::Analysis,
            agent: agent.key.into(),
            message,
        });
    }

    // -- Round two: debate ----------------------------------------------------

    tracing::info!(segment = %brief.segment_title, "Roundtable debate round");
    out.status("Debate round".into(), DEBATE_START, Stage::Debate)
        .await?;
    let round_one = render_transcript(&transcript);

    for (i, agent) in AGENTS.iter().enumerate() {
        out.ensure_open()?;
        out.send(RoundtableEvent::DebateStart {
            agent: agent.key.into(),
        })
        .await?;

        let prompt = format!(
            "{brief_text}\nROUND ONE:\n{round_one}\nRespond to your colleagues. Agree, \
             challenge or refine specific points and say what you would change. Keep it under \
             120 words."
        );
        let message = ask_agent(llm, agent, prompt).await?;

        for chunk in chunk_words(&message, CHUNK_WORDS) {
            out.send(RoundtableEvent::DebateChunk {
                agent: agent.key.into(),
                chunk: chunk.into(),
            })
            .await?;
        }
        out.send(RoundtableEvent::DebateComplete {
            agent: agent.key.into(),
            message: message.clone(),
        })
        .await?;
        out.status(
            format!("{} weighed in", agent.display_name),
            step_progress(DEBATE_START, SYNTHESIS_START, i),
            Stage::Debate,
        )
        .await?;

        transcript.push(TranscriptEntry {
            round: Stage::Debate,
            agent: agent.key.into(),
            message,
        });
    }

    // -- Synthesis ------------------------------------------------------------

    tracing::info!(segment = %brief.segment_title, "Roundtable synthesis");
    out.status(
        "Synthesizing the final prompt".into(),
        SYNTHESIS_START,
        Stage::Synthesis,
    )
    .await?;
    out.send(RoundtableEvent::SynthesisStart {}).await?;
    out.ensure_open()?;

    let discussion = render_transcript(&transcript);
    let prompt_request = format!(
        "{brief_text}\nDISCUSSION:\n{discussion}\nWrite the final video generation prompt: one \
         paragraph, present tense, under 120 words, concrete visual detail only. Name characters \
         by their appearance, not just their names. Reply with the prompt text only."
    );
    let prompt = llm
        .chat(
            SYNTHESIS_MAX_TOKENS,
            SYNTHESIS_SYSTEM,
            &[Message::user(prompt_request)],
        )
        .await?
        .text();
    if prompt.is_empty() {
        return Err(AiError::InvalidOutput("synthesis returned an empty prompt".into()).into());
    }

    for chunk in chunk_words(&prompt, CHUNK_WORDS) {
        out.send(RoundtableEvent::SynthesisChunk {
            chunk: chunk.into(),
        })
        .await?;
    }
    out.send(RoundtableEvent::SynthesisComplete {
        prompt: prompt.clone(),
    })
    .await?;

    // -- Shot list ------------------------------------------------------------

    tracing::info!(segment = %brief.segment_title, "Roundtable shot list");
    out.status("Building the shot list".into(), SHOTS_START, Stage::Shots)
        .await?;
    out.send(RoundtableEvent::ShotsStart {}).await?;
    out.ensure_open()?;

    let shots_request = format!(
        "FINAL PROMPT:\n{prompt}\n\nSegment length: {:.1} seconds.\nReturn a JSON array of \
         shots, each with number (1-based), shot_type, description, camera_movement and \
         duration_secs. Shot durations should add up to the segment length.",
        brief.duration_secs
    );
    let reply = llm
        .chat(
            SHOTS_MAX_TOKENS,
            SHOTS_SYSTEM,
            &[Message::user(shots_request)],
        )
        .await?
        .text();

    let (shot_list, shots) = match parse_model_json::<Vec<Shot>>(&reply) {
        Ok(shots) if !shots.is_empty() => (format_shot_list(&shots), shots),
        _ => {
            tracing::warn!(
                segment = %brief.segment_title,
                "Shot list reply was not a JSON array of shots, keeping raw text"
            );
            (reply, Vec::new())
        }
    };

    for chunk in chunk_words(&shot_list, CHUNK_WORDS) {
        out.send(RoundtableEvent::ShotsChunk {
            chunk: chunk.into(),
        })
        .await?;
    }
    out.send(RoundtableEvent::ShotsComplete {
        shot_list: shot_list.clone(),
        shots: shots.clone(),
    })
    .await?;

    Ok(RoundtableOutcome {
        prompt,
        shot_list,
        shots,
        transcript,
    })
}

async fn ask_agent(llm: &dyn LlmChat, agent: &Agent, prompt: String) -> Result<String, AiError> {
    let system = format!(
        "{} You are part of a four-person creative roundtable planning one AI-generated video \
         segment. Speak in the first person, plainly, without headings.",
        agent.persona
    );
    let text = llm
        .chat(AGENT_MAX_TOKENS, &system, &[Message::user(prompt)])
        .await?
        .text();
    tracing::debug!(agent = agent.key, chars = text.len(), "Agent replied");
    Ok(text)
}

/// Progress after agent `index` finishes a round spanning `from..to`.
fn step_progress(from: u8, to: u8, index: usize) -> u8 {
    let span = usize::from(to - from);
    let done = span * (index + 1) / AGENTS.len();
    from + u8::try_from(done).unwrap_or(to - from)
}

fn render_transcript(entries: &[TranscriptEntry]) -> String {
    entries
        .iter()
        .map(|e| {
            let name = Agent::find(&e.agent).map_or(e.agent.as_str(), |a| a.display_name);
            format!("{name}: {}\n", e.message)
        })
        .collect()
}

fn format_shot_list(shots: &[Shot]) -> String {
    shots
        .iter()
        .map(|shot| {
            let mut line = format!("{}. {}: {}", shot.number, shot.shot_type, shot.description);
            if let Some(movement) = shot.camera_movement.as_deref().filter(|m| !m.is_empty()) {
                line.push_str(&format!(" [{movement}]"));
            }
            if let Some(secs) = shot.duration_secs {
                line.push_str(&format!(" ({secs}s)"));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}
