//! Channel read loop.

use super::error::ChannelError;
use super::protocol::{ChannelMessage, Incoming, classify};
use actiongate_application::ApprovalGate;
use actiongate_domain::ActionId;
use async_trait::async_trait;
use futures::StreamExt;
use std::sync::Arc;
use tokio::io::AsyncRead;
use tokio::task::{JoinError, JoinSet};
use tokio_util::codec::{FramedRead, LinesCodec, LinesCodecError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

/// Longest accepted frame; longer lines are dropped.
const MAX_FRAME_LENGTH: usize = 1024 * 1024;

/// Receiver of approval decisions.
#[async_trait]
pub trait ResponseSink: Send + Sync {
    async fn on_action_response(&self, action_id: &ActionId, approved: bool);
}

#[async_trait]
impl ResponseSink for ApprovalGate {
    async fn on_action_response(&self, action_id: &ActionId, approved: bool) {
        // Outcome is logged by the gate; nothing to send back
        self.handle_response(action_id, approved).await;
    }
}

/// Counters for one served channel.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ChannelStats {
    pub frames: usize,
    pub responses: usize,
    pub ignored: usize,
    pub malformed: usize,
}

pub struct PushChannel {
    sink: Arc<dyn ResponseSink>,
}

impl PushChannel {
    pub fn new(sink: Arc<dyn ResponseSink>) -> Self {
        Self { sink }
    }

    /// Read frames until EOF or `cancel` fires.
    ///
    /// Bad frames are logged and skipped; only a read error ends the loop
    /// with `Err`. Each response runs on its own task so a slow execution
    /// never holds up the frames behind it. Responses still in flight when
    /// the loop ends are awaited, not aborted.
    pub async fn serve<R>(&self, reader: R, cancel: CancellationToken) -> Result<ChannelStats, ChannelError>
    where
        R: AsyncRead + Unpin,
    {
        let mut frames = FramedRead::new(reader, LinesCodec::new_with_max_length(MAX_FRAME_LENGTH));
        let mut stats = ChannelStats::default();
        let mut in_flight = JoinSet::new();
        let mut outcome: Result<(), ChannelError> = Ok(());
        // FramedRead yields one `None` after a decode error, then resumes
        let mut resuming = false;

        loop {
            let next = tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Channel cancelled");
                    break;
                }
                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                    reap(joined);
                    continue;
                }
                next = frames.next() => next,
            };

            let line = match next {
                None if resuming => {
                    resuming = false;
                    continue;
                }
                None => break,
                Some(Ok(line)) => line,
                Some(Err(LinesCodecError::MaxLineLengthExceeded)) => {
                    warn!(max = MAX_FRAME_LENGTH, "Dropping oversized frame");
                    stats.malformed += 1;
                    resuming = true;
                    continue;
                }
                Some(Err(LinesCodecError::Io(e))) => {
                    outcome = Err(e.into());
                    break;
                }
            };

            if line.trim().is_empty() {
                continue;
            }
            stats.frames += 1;
            if let Some((action_id, approved)) = Self::dispatch(&line, &mut stats) {
                let sink = Arc::clone(&self.sink);
                in_flight.spawn(async move {
                    sink.on_action_response(&action_id, approved).await;
                });
            }
        }

        if !in_flight.is_empty() {
            debug!(pending = in_flight.len(), "Waiting for in-flight responses");
        }
        while let Some(joined) = in_flight.join_next().await {
            reap(joined);
        }

        info!(
            frames = stats.frames,
            responses = stats.responses,
            malformed = stats.malformed,
            "Channel closed"
        );
        outcome.map(|()| stats)
    }

    /// Classify one frame; returns the decision to hand to the sink.
    fn dispatch(line: &str, stats: &mut ChannelStats) -> Option<(ActionId, bool)> {
        let incoming = ChannelMessage::parse(line).and_then(classify);
        match incoming {
            Ok(Incoming::ActionResponse { action_id, approved }) => {
                debug!(action_id = %action_id, approved, "Action response received");
                stats.responses += 1;
                return Some((action_id, approved));
            }
            Ok(Incoming::Terminal) => {
                trace!("Ignoring terminal frame");
                stats.ignored += 1;
            }
            Ok(Incoming::Unknown(kind)) => {
                trace!(kind = %kind, "Ignoring unknown frame type");
                stats.ignored += 1;
            }
            Err(e) => {
                warn!(error = %e, "Skipping malformed frame");
                stats.malformed += 1;
            }
        }
        None
    }
}

fn reap(joined: Result<(), JoinError>) {
    if let Err(e) = joined {
        error!(error = %e, "Action response task failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::{Duration, Instant};
    use tokio::io::AsyncWriteExt;

    // ==================== Test Mocks ====================

    #[derive(Default)]
    struct RecordingSink {
        responses: Mutex<Vec<(ActionId, bool)>>,
    }

    #[async_trait]
    impl ResponseSink for RecordingSink {
        async fn on_action_response(&self, action_id: &ActionId, approved: bool) {
            self.responses.lock().unwrap().push((action_id.clone(), approved));
        }
    }

    /// Takes a fixed time per decision, like an approved command running.
    #[derive(Default)]
    struct SlowSink {
        inner: RecordingSink,
    }

    const SINK_DELAY: Duration = Duration::from_millis(200);

    #[async_trait]
    impl ResponseSink for SlowSink {
        async fn on_action_response(&self, action_id: &ActionId, approved: bool) {
            tokio::time::sleep(SINK_DELAY).await;
            self.inner.on_action_response(action_id, approved).await;
        }
    }

    fn response(id: &str, approved: bool) -> String {
        format!(
            r#"{{"type":"action:response","payload":{{"actionId":"{}","approved":{}}}}}"#,
            id, approved
        )
    }

    async fn serve(input: &str) -> (ChannelStats, Vec<(ActionId, bool)>) {
        let sink = Arc::new(RecordingSink::default());
        let channel = PushChannel::new(sink.clone());
        let stats = channel
            .serve(input.as_bytes(), CancellationToken::new())
            .await
            .unwrap();
        let responses = sink.responses.lock().unwrap().clone();
        (stats, responses)
    }

    #[tokio::test]
    async fn test_every_response_reaches_sink() {
        let input = format!("{}\n{}\n", response("a", true), response("b", false));
        let (stats, mut responses) = serve(&input).await;
        responses.sort();
        assert_eq!(stats.responses, 2);
        assert_eq!(
            responses,
            vec![(ActionId::from("a"), true), (ActionId::from("b"), false)]
        );
    }

    #[tokio::test]
    async fn test_slow_responses_run_concurrently() {
        let sink = Arc::new(SlowSink::default());
        let channel = PushChannel::new(sink.clone());
        let input = format!(
            "{}\n{}\n{}\n",
            response("a", true),
            response("b", true),
            response("c", false)
        );

        let started = Instant::now();
        let stats = channel
            .serve(input.as_bytes(), CancellationToken::new())
            .await
            .unwrap();
        let elapsed = started.elapsed();

        assert_eq!(stats.responses, 3);
        assert_eq!(sink.inner.responses.lock().unwrap().len(), 3);
        assert!(elapsed >= SINK_DELAY);
        assert!(elapsed < SINK_DELAY * 2, "responses ran serially: {:?}", elapsed);
    }

    #[tokio::test]
    async fn test_cancel_waits_for_in_flight_responses() {
        let sink = Arc::new(SlowSink::default());
        let channel = PushChannel::new(sink.clone());
        let cancel = CancellationToken::new();
        let (mut writer, reader) = tokio::io::duplex(1024);

        writer
            .write_all(format!("{}\n", response("a", true)).as_bytes())
            .await
            .unwrap();
        let stop = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            stop.cancel();
        });

        let stats = channel.serve(reader, cancel).await.unwrap();

        assert_eq!(stats.responses, 1);
        assert_eq!(
            *sink.inner.responses.lock().unwrap(),
            vec![(ActionId::from("a"), true)]
        );
        drop(writer);
    }

    #[tokio::test]
    async fn test_malformed_frame_does_not_close_channel() {
        let input = concat!(
            "not json\n",
            r#"{"type":"action:response","payload":{}}"#,
            "\n",
            r#"{"type":"action:response","payload":{"actionId":"c","approved":true}}"#,
            "\n",
        );
        let (stats, responses) = serve(input).await;
        assert_eq!(stats.malformed, 2);
        assert_eq!(responses, vec![(ActionId::from("c"), true)]);
    }

    #[tokio::test]
    async fn test_oversized_frame_is_skipped() {
        let input = format!(
            "{}\n{}\n",
            "x".repeat(MAX_FRAME_LENGTH + 16),
            r#"{"type":"action:response","payload":{"actionId":"d","approved":false}}"#
        );
        let (stats, responses) = serve(&input).await;
        assert_eq!(stats.malformed, 1);
        assert_eq!(responses, vec![(ActionId::from("d"), false)]);
    }

    #[tokio::test]
    async fn test_terminal_and_unknown_are_ignored() {
        let input = concat!(
            r#"{"type":"terminal:data","sessionId":"s","payload":"dir\r"}"#,
            "\n\n",
            r#"{"type":"terminal:resize","payload":{"cols":80,"rows":24}}"#,
            "\n",
            r#"{"type":"something:else","payload":null}"#,
        );
        let (stats, responses) = serve(input).await;
        assert_eq!(stats.frames, 3);
        assert_eq!(stats.ignored, 3);
        assert!(responses.is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let sink = Arc::new(RecordingSink::default());
        let channel = PushChannel::new(sink.clone());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let (_writer, reader) = tokio::io::duplex(64);
        let stats = channel.serve(reader, cancel).await.unwrap();
        assert_eq!(stats, ChannelStats::default());
    }
}
