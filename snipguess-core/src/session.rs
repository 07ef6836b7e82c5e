//! Game session
//!
//! Per-song orchestration: the six-slot attempt sequence, guess and skip
//! handling, and the end-of-game reveal. Playback is delegated to the
//! snippet controller; matching to the guess evaluator. A session is
//! created per song and replaced wholesale on play-again.

use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::album::display_name;
use crate::catalog::SongRecord;
use crate::guess::is_correct;
use crate::playback::{snippet_duration, AudioSource, PlayerState, SnippetPlayer};

/// Number of guessing attempts per song
pub const MAX_ATTEMPTS: usize = 6;

/// Terminal state of one attempt slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    Untouched,
    Correct,
    Wrong,
    Skipped,
}

/// How a finished game ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    /// Guessed correctly; `attempts_used` counts the winning attempt (1-6)
    Won { attempts_used: usize },
    Lost,
}

/// Result of a guess submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuessOutcome {
    /// Blank input or game already over; no attempt consumed
    Ignored,
    /// Correct guess, game won
    Correct,
    /// Wrong guess, attempts remain
    Wrong,
    /// Wrong guess on the final attempt, game lost
    Lost,
}

/// Result of skipping an attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipOutcome {
    /// Game already over; nothing happened
    Ignored,
    /// Attempt skipped, game continues
    Skipped,
    /// Final attempt skipped, game lost
    Lost,
}

/// Everything shown to the player once the game is over
#[derive(Debug, Clone, PartialEq)]
pub struct SongReveal {
    pub title: String,
    pub artists: String,
    pub album: String,
    /// Catalog-formatted duration, measured from the audio source when the
    /// catalog omitted it, or "Unknown"
    pub duration: String,
    pub track_titles: Vec<String>,
}

/// One song's guessing game.
pub struct GameSession {
    song: SongRecord,
    attempts: [AttemptOutcome; MAX_ATTEMPTS],
    attempt_index: usize,
    outcome: Option<GameOutcome>,
    player: SnippetPlayer,
    source: Arc<dyn AudioSource>,
}

impl std::fmt::Debug for GameSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameSession")
            .field("song", &self.song)
            .field("attempts", &self.attempts)
            .field("attempt_index", &self.attempt_index)
            .field("outcome", &self.outcome)
            .finish_non_exhaustive()
    }
}

impl GameSession {
    pub fn new(song: SongRecord, source: Arc<dyn AudioSource>) -> Self {
        info!(title = %song.title, "New game session");
        Self {
            song,
            attempts: [AttemptOutcome::Untouched; MAX_ATTEMPTS],
            attempt_index: 0,
            outcome: None,
            player: SnippetPlayer::new(Arc::clone(&source)),
            source,
        }
    }

    /// Catalog path of the song in play (for building the audio URL)
    pub fn song_path(&self) -> &str {
        &self.song.path
    }

    /// Current attempt index (0-5)
    pub fn attempt_index(&self) -> usize {
        self.attempt_index
    }

    /// The six attempt slots
    pub fn attempts(&self) -> &[AttemptOutcome; MAX_ATTEMPTS] {
        &self.attempts
    }

    /// Snippet length unlocked for the current attempt
    pub fn current_snippet_secs(&self) -> f64 {
        snippet_duration(self.attempt_index)
    }

    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn outcome(&self) -> Option<GameOutcome> {
        self.outcome
    }

    /// Playback state of the snippet controller
    pub fn player_state(&self) -> PlayerState {
        self.player.state()
    }

    /// Subscribe to snippet progress (percent, 0-100)
    pub fn progress(&self) -> watch::Receiver<f32> {
        self.player.progress()
    }

    /// Play/pause toggle for the current attempt's snippet.
    ///
    /// Ignored once the game is over.
    pub fn toggle_playback(&self) {
        if self.is_over() {
            return;
        }
        if self.player.is_playing() {
            self.player.pause();
        } else {
            self.player.play(self.attempt_index);
        }
    }

    /// Submit a guess for the current attempt.
    ///
    /// Blank input is a no-op and consumes nothing. A correct guess wins
    /// immediately, leaving the remaining slots untouched; a wrong guess
    /// consumes the slot, and the sixth wrong guess loses the game.
    pub fn submit_guess(&mut self, text: &str) -> GuessOutcome {
        if self.is_over() {
            return GuessOutcome::Ignored;
        }
        let guess = text.trim();
        if guess.is_empty() {
            return GuessOutcome::Ignored;
        }

        if is_correct(guess, &self.song) {
            self.attempts[self.attempt_index] = AttemptOutcome::Correct;
            self.end_game(GameOutcome::Won {
                attempts_used: self.attempt_index + 1,
            });
            GuessOutcome::Correct
        } else {
            debug!(attempt = self.attempt_index, "Wrong guess");
            self.attempts[self.attempt_index] = AttemptOutcome::Wrong;
            if self.advance() {
                GuessOutcome::Wrong
            } else {
                GuessOutcome::Lost
            }
        }
    }

    /// Skip the current attempt unconditionally.
    pub fn skip(&mut self) -> SkipOutcome {
        if self.is_over() {
            return SkipOutcome::Ignored;
        }

        self.attempts[self.attempt_index] = AttemptOutcome::Skipped;
        if self.advance() {
            SkipOutcome::Skipped
        } else {
            SkipOutcome::Lost
        }
    }

    /// The full reveal, available only once the game is over.
    pub fn reveal(&self) -> Option<SongReveal> {
        self.outcome?;

        let duration = match &self.song.length {
            Some(length) => length.clone(),
            None => match self.source.duration() {
                Some(secs) => format_track_time(secs),
                None => "Unknown".to_string(),
            },
        };

        Some(SongReveal {
            title: self.song.title.clone(),
            artists: self.song.artists.clone(),
            album: display_name(self.song.era.as_deref()),
            duration,
            track_titles: self.song.track_titles.clone(),
        })
    }

    /// Move to the next attempt; returns false when attempts ran out.
    fn advance(&mut self) -> bool {
        self.attempt_index += 1;
        if self.attempt_index >= MAX_ATTEMPTS {
            self.end_game(GameOutcome::Lost);
            false
        } else {
            true
        }
    }

    fn end_game(&mut self, outcome: GameOutcome) {
        info!(?outcome, title = %self.song.title, "Game over");
        self.outcome = Some(outcome);
        self.player.stop();
    }
}

/// Format whole seconds as "m:ss" for the reveal display.
pub fn format_track_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "Unknown".to_string();
    }
    let total = seconds.floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}
