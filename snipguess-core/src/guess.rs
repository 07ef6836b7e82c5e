//! Guess evaluation
//!
//! A guess is correct when its normalized form equals the normalized
//! primary title or any normalized alternate title. Equality is exact after
//! normalization; there is no fuzzy matching. Blank guesses are the
//! caller's problem and never reach this module.

use crate::catalog::SongRecord;
use crate::normalize::normalize;

/// Check a guess against a song's primary and alternate titles.
pub fn is_correct(guess: &str, song: &SongRecord) -> bool {
    let normalized_guess = normalize(guess);

    if normalized_guess == normalize(&song.title) {
        return true;
    }

    song.track_titles
        .iter()
        .any(|alt| normalize(alt) == normalized_guess)
}
