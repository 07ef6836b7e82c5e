//! Snippet playback control
//!
//! A timed state machine around an abstract audio source. Each guessing
//! attempt unlocks a longer snippet of the same track; every snippet replays
//! from one fixed, randomly chosen start offset and only the end time moves.
//!
//! Two tokio tasks run while a snippet plays: a progress tick that reports
//! elapsed-fraction through a watch channel, and a hard-stop timer that
//! bounds the snippet even if position polling never observes the end. Both
//! are owned by the controller and are always cancelled together — on user
//! pause, on natural snippet end, and on teardown — so a replaced controller
//! can never fire into a newer session.

use rand::Rng;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time;
use tracing::debug;

/// Snippet length in seconds for attempts 0-5
pub const SNIPPET_DURATIONS: [f64; 6] = [1.0, 2.0, 4.0, 7.0, 11.0, 16.0];

/// Longest snippet in the schedule; bounds the random start offset
pub const MAX_SNIPPET_SECS: f64 = 16.0;

/// How often playing progress is re-reported
const PROGRESS_TICK_MS: u64 = 100;

/// Slack added to the hard-stop timer beyond the snippet duration
const HARD_STOP_MARGIN_MS: u64 = 250;

/// Snippet length for an attempt index (indexes past the schedule clamp
/// to the final, longest snippet)
pub fn snippet_duration(attempt: usize) -> f64 {
    SNIPPET_DURATIONS[attempt.min(SNIPPET_DURATIONS.len() - 1)]
}

/// Extra listening time a skip buys, `None` on the last attempt
pub fn added_seconds_on_skip(attempt: usize) -> Option<f64> {
    if attempt + 1 < SNIPPET_DURATIONS.len() {
        Some(SNIPPET_DURATIONS[attempt + 1] - SNIPPET_DURATIONS[attempt])
    } else {
        None
    }
}

/// Audio backend seam.
///
/// Implemented by the embedding layer over whatever actually plays sound
/// (an HTML audio element behind a bridge, a native output, a test mock).
/// `duration` may be `None` until the source's metadata is ready.
pub trait AudioSource: Send + Sync {
    fn play(&self);
    fn pause(&self);
    fn seek(&self, position_secs: f64);
    fn position(&self) -> f64;
    fn duration(&self) -> Option<f64>;
}

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Idle,
    Playing,
    Stopped,
}

impl std::fmt::Display for PlayerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlayerState::Idle => write!(f, "idle"),
            PlayerState::Playing => write!(f, "playing"),
            PlayerState::Stopped => write!(f, "stopped"),
        }
    }
}

#[derive(Default)]
struct TimerPair {
    poll: Option<JoinHandle<()>>,
    hard_stop: Option<JoinHandle<()>>,
}

struct PlayerInner {
    source: Arc<dyn AudioSource>,
    state: Mutex<PlayerState>,
    start_offset: Mutex<Option<f64>>,
    progress_tx: watch::Sender<f32>,
    timers: Mutex<TimerPair>,
}

/// Per-song snippet playback controller.
///
/// Created together with a game session and replaced with it; dropping the
/// controller cancels any outstanding timers.
pub struct SnippetPlayer {
    inner: Arc<PlayerInner>,
}

impl SnippetPlayer {
    pub fn new(source: Arc<dyn AudioSource>) -> Self {
        let (progress_tx, _) = watch::channel(0.0);
        Self {
            inner: Arc::new(PlayerInner {
                source,
                state: Mutex::new(PlayerState::Idle),
                start_offset: Mutex::new(None),
                progress_tx,
                timers: Mutex::new(TimerPair::default()),
            }),
        }
    }

    /// Current state
    pub fn state(&self) -> PlayerState {
        *self.inner.state.lock().unwrap()
    }

    pub fn is_playing(&self) -> bool {
        self.state() == PlayerState::Playing
    }

    /// Subscribe to progress updates (percent of the current snippet, 0-100)
    pub fn progress(&self) -> watch::Receiver<f32> {
        self.inner.progress_tx.subscribe()
    }

    /// The fixed snippet start offset, once chosen
    pub fn start_offset(&self) -> Option<f64> {
        *self.inner.start_offset.lock().unwrap()
    }

    /// Start playing the snippet for the given attempt.
    ///
    /// `Idle`/`Stopped` transition to `Playing`; a call while already
    /// `Playing` is a no-op. The first play of a song fixes the snippet
    /// start offset for all later attempts.
    pub fn play(&self, attempt: usize) {
        {
            let mut state = self.inner.state.lock().unwrap();
            if *state == PlayerState::Playing {
                return;
            }
            *state = PlayerState::Playing;
        }

        let duration = snippet_duration(attempt);
        let offset = self.inner.ensure_offset();

        // old timers must be gone before any new playback state exists
        self.inner.cancel_timers();

        self.inner.source.seek(offset);
        self.inner.source.play();
        let _ = self.inner.progress_tx.send(0.0);
        debug!(attempt, duration, offset, "Snippet playback started");

        let poll = tokio::spawn({
            let inner = Arc::clone(&self.inner);
            async move {
                let mut tick = time::interval(Duration::from_millis(PROGRESS_TICK_MS));
                // the first tick completes immediately
                tick.tick().await;
                loop {
                    tick.tick().await;
                    let position = inner.source.position();
                    let elapsed = (position - offset).max(0.0);
                    let percent = ((elapsed / duration) * 100.0).clamp(0.0, 100.0) as f32;
                    let _ = inner.progress_tx.send(percent);
                    if position >= offset + duration {
                        inner.finish_snippet();
                        break;
                    }
                }
            }
        });

        let hard_stop = tokio::spawn({
            let inner = Arc::clone(&self.inner);
            let deadline =
                Duration::from_millis((duration * 1000.0) as u64 + HARD_STOP_MARGIN_MS);
            async move {
                time::sleep(deadline).await;
                inner.finish_snippet();
            }
        });

        *self.inner.timers.lock().unwrap() = TimerPair {
            poll: Some(poll),
            hard_stop: Some(hard_stop),
        };
    }

    /// User-initiated pause while `Playing`.
    ///
    /// Cancels both timers, rewinds to the snippet start and reports 0%.
    pub fn pause(&self) {
        {
            let mut state = self.inner.state.lock().unwrap();
            if *state != PlayerState::Playing {
                return;
            }
            *state = PlayerState::Idle;
        }

        self.inner.cancel_timers();
        self.inner.source.pause();
        if let Some(offset) = *self.inner.start_offset.lock().unwrap() {
            self.inner.source.seek(offset);
        }
        let _ = self.inner.progress_tx.send(0.0);
        debug!("Snippet playback paused by user");
    }

    /// Tear down playback entirely (game over, play-again, new game).
    pub fn stop(&self) {
        self.inner.cancel_timers();
        self.inner.source.pause();
        *self.inner.state.lock().unwrap() = PlayerState::Idle;
    }
}

impl Drop for SnippetPlayer {
    fn drop(&mut self) {
        self.inner.cancel_timers();
    }
}

impl PlayerInner {
    /// Choose the snippet start offset on first use, then keep it.
    ///
    /// Uniform in `[0, track duration - longest snippet]`; 0 when the
    /// source's duration is not (yet) known.
    fn ensure_offset(&self) -> f64 {
        let mut slot = self.start_offset.lock().unwrap();
        if let Some(offset) = *slot {
            return offset;
        }

        let max_start = self
            .source
            .duration()
            .map(|total| (total - MAX_SNIPPET_SECS).max(0.0))
            .unwrap_or(0.0);
        let offset = if max_start > 0.0 {
            rand::thread_rng().gen_range(0.0..=max_start)
        } else {
            0.0
        };

        *slot = Some(offset);
        offset
    }

    /// Natural end of a snippet, from either timer.
    fn finish_snippet(&self) {
        {
            let mut state = self.state.lock().unwrap();
            if *state != PlayerState::Playing {
                return;
            }
            *state = PlayerState::Stopped;
        }

        self.cancel_timers();
        self.source.pause();
        let _ = self.progress_tx.send(100.0);
        debug!("Snippet finished");
    }

    /// Abort both timer tasks. Always called as a pair; an orphaned timer
    /// must never outlive the playback state it was armed for.
    fn cancel_timers(&self) {
        let mut timers = self.timers.lock().unwrap();
        if let Some(handle) = timers.poll.take() {
            handle.abort();
        }
        if let Some(handle) = timers.hard_stop.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct MockState {
        playing: bool,
        position: f64,
        duration: Option<f64>,
        seeks: Vec<f64>,
    }

    struct MockSource {
        state: Mutex<MockState>,
    }

    impl MockSource {
        fn new(duration: Option<f64>) -> Arc<Self> {
            Arc::new(Self {
                state: Mutex::new(MockState {
                    duration,
                    ..MockState::default()
                }),
            })
        }

        fn set_position(&self, position: f64) {
            self.state.lock().unwrap().position = position;
        }

        fn is_playing(&self) -> bool {
            self.state.lock().unwrap().playing
        }

        fn seeks(&self) -> Vec<f64> {
            self.state.lock().unwrap().seeks.clone()
        }
    }

    impl AudioSource for MockSource {
        fn play(&self) {
            self.state.lock().unwrap().playing = true;
        }

        fn pause(&self) {
            self.state.lock().unwrap().playing = false;
        }

        fn seek(&self, position_secs: f64) {
            let mut state = self.state.lock().unwrap();
            state.position = position_secs;
            state.seeks.push(position_secs);
        }

        fn position(&self) -> f64 {
            self.state.lock().unwrap().position
        }

        fn duration(&self) -> Option<f64> {
            self.state.lock().unwrap().duration
        }
    }

    #[test]
    fn schedule_is_ascending() {
        for pair in SNIPPET_DURATIONS.windows(2) {
            assert!(pair[0] < pair[1]);
        }
        assert_eq!(snippet_duration(0), 1.0);
        assert_eq!(snippet_duration(5), 16.0);
        assert_eq!(snippet_duration(99), 16.0);
    }

    #[test]
    fn skip_gain() {
        assert_eq!(added_seconds_on_skip(0), Some(1.0));
        assert_eq!(added_seconds_on_skip(4), Some(5.0));
        assert_eq!(added_seconds_on_skip(5), None);
    }

    #[tokio::test(start_paused = true)]
    async fn hard_stop_ends_snippet() {
        let source = MockSource::new(Some(200.0));
        let player = SnippetPlayer::new(source.clone());

        player.play(0); // 1s snippet
        assert_eq!(player.state(), PlayerState::Playing);
        assert!(source.is_playing());

        // position never advances; only the hard stop can end this snippet
        time::sleep(Duration::from_millis(1500)).await;

        assert_eq!(player.state(), PlayerState::Stopped);
        assert!(!source.is_playing());
        assert_eq!(*player.progress().borrow(), 100.0);
    }

    #[tokio::test(start_paused = true)]
    async fn poll_detects_end_of_snippet() {
        let source = MockSource::new(Some(200.0));
        let player = SnippetPlayer::new(source.clone());

        player.play(0);
        let offset = player.start_offset().unwrap();
        source.set_position(offset + 1.05);

        time::sleep(Duration::from_millis(300)).await;

        assert_eq!(player.state(), PlayerState::Stopped);
        assert!(!source.is_playing());
        assert_eq!(*player.progress().borrow(), 100.0);
    }

    #[tokio::test(start_paused = true)]
    async fn progress_tracks_elapsed_fraction() {
        let source = MockSource::new(Some(200.0));
        let player = SnippetPlayer::new(source.clone());

        player.play(2); // 4s snippet
        let offset = player.start_offset().unwrap();
        source.set_position(offset + 1.0);

        time::sleep(Duration::from_millis(250)).await;

        let percent = *player.progress().borrow();
        assert!((percent - 25.0).abs() < 1.0, "got {percent}");
        assert_eq!(player.state(), PlayerState::Playing);
    }

    #[tokio::test(start_paused = true)]
    async fn user_pause_rewinds_and_cancels_timers() {
        let source = MockSource::new(Some(200.0));
        let player = SnippetPlayer::new(source.clone());

        player.play(2); // 4s snippet
        let offset = player.start_offset().unwrap();
        source.set_position(offset + 0.5);
        time::sleep(Duration::from_millis(150)).await;

        player.pause();
        assert_eq!(player.state(), PlayerState::Idle);
        assert!(!source.is_playing());
        assert_eq!(*player.progress().borrow(), 0.0);
        assert_eq!(source.seeks().last().copied(), Some(offset));

        // long past the would-be hard stop: nothing fires
        time::sleep(Duration::from_secs(10)).await;
        assert_eq!(player.state(), PlayerState::Idle);
        assert_eq!(*player.progress().borrow(), 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn offset_fixed_across_attempts() {
        let source = MockSource::new(Some(300.0));
        let player = SnippetPlayer::new(source.clone());

        player.play(0);
        let first = player.start_offset().unwrap();
        assert!((0.0..=300.0 - MAX_SNIPPET_SECS).contains(&first));

        time::sleep(Duration::from_millis(120)).await;
        player.pause();
        player.play(1);
        assert_eq!(player.start_offset(), Some(first));
        // both plays seeked to the same point
        assert!(source.seeks().iter().all(|s| (s - first).abs() < f64::EPSILON));
    }

    #[tokio::test(start_paused = true)]
    async fn short_track_starts_at_zero() {
        let source = MockSource::new(Some(10.0));
        let player = SnippetPlayer::new(source.clone());
        player.play(0);
        assert_eq!(player.start_offset(), Some(0.0));
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_duration_starts_at_zero() {
        let source = MockSource::new(None);
        let player = SnippetPlayer::new(source.clone());
        player.play(0);
        assert_eq!(player.start_offset(), Some(0.0));
    }

    #[tokio::test(start_paused = true)]
    async fn replaced_player_never_fires_into_new_session() {
        let source = MockSource::new(Some(200.0));

        let old_player = SnippetPlayer::new(source.clone());
        old_player.play(0); // hard stop pending at ~1.25s
        old_player.stop();

        let new_player = SnippetPlayer::new(source.clone());
        new_player.play(5); // 16s snippet
        let mut progress = new_player.progress();

        // run well past the old player's hard-stop deadline
        time::sleep(Duration::from_secs(3)).await;

        // the new session is still playing and its progress was never
        // forced to 100 by the stale timer
        assert_eq!(new_player.state(), PlayerState::Playing);
        assert!(source.is_playing());
        assert!(*progress.borrow_and_update() < 100.0);
    }

    #[tokio::test(start_paused = true)]
    async fn drop_cancels_pending_timers() {
        let source = MockSource::new(Some(200.0));

        {
            let player = SnippetPlayer::new(source.clone());
            player.play(0);
        } // dropped with timers pending

        time::sleep(Duration::from_secs(2)).await;
        // the stale hard stop would have paused the source
        assert!(source.is_playing());
    }
}
