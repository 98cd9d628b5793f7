//! Sequential consumer loop for a roundtable response body.
//!
//! Pulls chunks one at a time, decodes them, folds each event into a
//! [`RoundtableState`], notifies the caller and then waits out the pacing
//! delay. Cancelling the token drops the stream, which releases the
//! underlying connection.

use futures::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;

use super::decoder::NdjsonDecoder;
use super::events::RoundtableEvent;
use super::reducer::{Outcome, PacingConfig, RoundtableState};

/// Why [`consume`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumeEnd {
    /// A `complete` event arrived.
    Completed,
    /// An `error` event arrived.
    Failed,
    /// The cancellation token fired.
    Cancelled,
    /// The body ended without a terminal event.
    EndOfStream,
}

/// Drive `state` from `stream` until a terminal event, cancellation or end
/// of input.
///
/// `on_update` runs after every applied event. Malformed lines are logged
/// and skipped; a transport error from the stream is returned as-is.
pub async fn consume<S, B, E, F>(
    stream: S,
    state: &mut RoundtableState,
    pacing: PacingConfig,
    cancel: &CancellationToken,
    mut on_update: F,
) -> Result<ConsumeEnd, E>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    F: FnMut(&RoundtableState),
{
    let mut decoder = NdjsonDecoder::new();
    let mut stream = std::pin::pin!(stream);

    loop {
        let next = tokio::select! {
            biased;
            () = cancel.cancelled() => return Ok(ConsumeEnd::Cancelled),
            next = stream.next() => next,
        };

        let (results, exhausted) = match next {
            Some(chunk) => (decoder.push(chunk?.as_ref()), false),
            None => (decoder.finish().into_iter().collect(), true),
        };

        for result in results {
            let event = match result {
                Ok(event) => event,
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping undecodable roundtable line");
                    continue;
                }
            };
            if let Some(end) = apply_and_pace(&event, state, pacing, cancel, &mut on_update).await
            {
                return Ok(end);
            }
        }

        if exhausted {
            return Ok(ConsumeEnd::EndOfStream);
        }
    }
}

async fn apply_and_pace<F>(
    event: &RoundtableEvent,
    state: &mut RoundtableState,
    pacing: PacingConfig,
    cancel: &CancellationToken,
    on_update: &mut F,
) -> Option<ConsumeEnd>
where
    F: FnMut(&RoundtableState),
{
    let delay = pacing.delay(state.apply(event));
    on_update(state);

    if let Some(outcome) = &state.outcome {
        return Some(match outcome {
            Outcome::Complete { .. } => ConsumeEnd::Completed,
            Outcome::Failed { .. } => ConsumeEnd::Failed,
        });
    }

    if !delay.is_zero() {
        tokio::select! {
            biased;
            () = cancel.cancelled() => return Some(ConsumeEnd::Cancelled),
            () = tokio::time::sleep(delay) => {}
        }
    }
    None
}
