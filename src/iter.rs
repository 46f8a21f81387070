//! The channel-backed cursor shared by the keyed and indexed variants.

use tokio::sync::{RwLock, mpsc};
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// At most one element is in flight between producer and consumer.
const CHANNEL_CAPACITY: usize = 1;

/// Single-consumer cursor over a stream of pairs.
///
/// Wraps exactly one channel plus the most recently received pair. The
/// protocol is pull-style: the consumer calls [`Iter::advance`] to block for
/// the next pair and [`Iter::current`] to read it. Cancellation and
/// exhaustion both surface as `advance` returning `false`, and once it has
/// returned `false` it returns `false` forever.
///
/// One task is expected to drive `advance` at a time. Concurrent readers of
/// the current pair are fine; concurrent advancers serialize on the internal
/// lock but observe an unspecified interleaving.
pub struct Iter<P> {
    state: RwLock<State<P>>,
}

struct State<P> {
    /// `None` once exhausted or cancelled. The terminal state never resets.
    rx: Option<mpsc::Receiver<P>>,
    current: Option<P>,
}

impl<P> Iter<P> {
    /// Wraps an already-connected receiver.
    pub fn new(rx: mpsc::Receiver<P>) -> Self {
        Self {
            state: RwLock::new(State {
                rx: Some(rx),
                current: None,
            }),
        }
    }

    /// Creates a connected sender/cursor pair for [`Source`] implementors.
    ///
    /// The producer must select on its cancellation token while sending; the
    /// channel itself closes when the sender drops, which covers every exit
    /// path (completion, cancellation, consumer gone).
    ///
    /// [`Source`]: crate::map::Source
    pub fn channel() -> (mpsc::Sender<P>, Self) {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        (tx, Self::new(rx))
    }

    /// Blocks until the next pair is latched (`true`), the producer finishes
    /// (`false`), or `cancel` fires (`false`).
    ///
    /// The cancellation branch is biased: a fired token wins over a pending
    /// pair, so cancellation cuts the stream off promptly even when the
    /// producer is ahead of the consumer.
    pub async fn advance(&self, cancel: &CancellationToken) -> bool {
        {
            let state = self.state.read().await;
            if state.rx.is_none() {
                return false;
            }
        }

        let mut state = self.state.write().await;
        let Some(rx) = state.rx.as_mut() else {
            return false;
        };
        let received = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                trace!("advance observed cancellation, latching terminal state");
                None
            }
            received = rx.recv() => received,
        };
        match received {
            Some(pair) => {
                state.current = Some(pair);
                true
            }
            None => {
                state.rx = None;
                false
            }
        }
    }

    /// Clone of the most recently latched pair.
    ///
    /// `None` before the first successful [`advance`](Iter::advance). After
    /// `advance` has returned `false` the content is unspecified; callers
    /// should not read it.
    pub async fn current(&self) -> Option<P>
    where
        P: Clone,
    {
        self.state.read().await.current.clone()
    }

    /// Converts the cursor into a stream of pairs.
    ///
    /// The stream ends when the producer closes the channel. Cancellation
    /// still applies on the producer side through the token given at iterate
    /// time; the stream itself carries no token.
    pub fn into_stream(self) -> ReceiverStream<P> {
        let state = self.state.into_inner();
        let rx = state.rx.unwrap_or_else(|| mpsc::channel(CHANNEL_CAPACITY).1);
        ReceiverStream::new(rx)
    }
}

/// Spawns a producer task that feeds `items` through a fresh channel,
/// honoring `cancel` between sends, and returns the consuming cursor.
pub(crate) fn spawn_producer<I, P>(cancel: &CancellationToken, items: I) -> Iter<P>
where
    I: Iterator<Item = P> + Send + 'static,
    P: Send + 'static,
{
    let (tx, iter) = Iter::channel();
    let cancel = cancel.clone();
    tokio::spawn(async move {
        for pair in items {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    trace!("producer cancelled mid-iteration");
                    return;
                }
                sent = tx.send(pair) => {
                    if sent.is_err() {
                        // Consumer dropped the cursor; nothing left to feed.
                        return;
                    }
                }
            }
        }
    });
    iter
}
