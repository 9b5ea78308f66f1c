//! Score controller
//!
//! Reacts to the win notification: shows the win banner, counts the score up
//! and reveals the star burst after a delay. The running score survives scene
//! reloads through prefs and is cleared when the application quits.

use serde::{Deserialize, Serialize};

use crate::persistence::{Prefs, PrefsError};
use crate::scene::WinObserver;
use crate::settings::Settings;

/// Prefs key holding the score carried across reloads
pub const SCORE_KEY: &str = "CurrentScore";

/// Linear count-up from one score to another
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct CountUp {
    from: u32,
    to: u32,
    elapsed: f32,
    duration: f32,
}

/// Score and win presentation state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreBoard {
    /// Displayed score (mid-animation values included)
    pub score: u32,
    win_active: bool,
    count_up: Option<CountUp>,
    /// Win banner opacity, 0..=1
    pub banner_alpha: f32,
    banner_elapsed: f32,
    /// Stars are shown once the delay after the win has passed
    pub stars_visible: bool,
    stars_elapsed: f32,

    win_score: u32,
    score_count_secs: f32,
    banner_fade_secs: f32,
    stars_delay_secs: f32,
}

impl ScoreBoard {
    pub fn new(settings: &Settings) -> Self {
        Self {
            score: 0,
            win_active: false,
            count_up: None,
            banner_alpha: 0.0,
            banner_elapsed: 0.0,
            stars_visible: false,
            stars_elapsed: 0.0,
            win_score: settings.win_score,
            score_count_secs: settings.score_count_secs,
            banner_fade_secs: settings.banner_fade_secs,
            stars_delay_secs: settings.stars_delay_secs,
        }
    }

    /// Create a board starting from the score saved before the last reload
    pub fn load(settings: &Settings, prefs: &dyn Prefs) -> Self {
        let mut board = Self::new(settings);
        if let Some(saved) = prefs.get_int(SCORE_KEY) {
            board.score = u32::try_from(saved).unwrap_or(0);
            log::info!("Restored score {}", board.score);
        }
        board
    }

    pub fn is_win_active(&self) -> bool {
        self.win_active
    }

    /// Whether the score is still counting up
    pub fn is_animating(&self) -> bool {
        self.count_up.is_some()
    }

    /// Score the current animation will land on
    pub fn target_score(&self) -> u32 {
        self.count_up.map(|c| c.to).unwrap_or(self.score)
    }

    pub fn label(&self) -> String {
        format!("Score: {}", self.score)
    }

    /// Advance animations by `dt` seconds
    pub fn update(&mut self, dt: f32) {
        if !self.win_active {
            return;
        }

        if let Some(mut count) = self.count_up {
            count.elapsed += dt;
            let progress = progress(count.elapsed, count.duration);
            // Truncate, like an integer lerp
            self.score = (count.from as f32 + (count.to - count.from) as f32 * progress) as u32;
            if progress >= 1.0 {
                self.score = count.to;
                self.count_up = None;
            } else {
                self.count_up = Some(count);
            }
        }

        if self.banner_alpha < 1.0 {
            self.banner_elapsed += dt;
            self.banner_alpha = progress(self.banner_elapsed, self.banner_fade_secs);
        }

        if !self.stars_visible {
            self.stars_elapsed += dt;
            if self.stars_elapsed >= self.stars_delay_secs {
                self.stars_visible = true;
            }
        }
    }

    /// Save the score so the next scene instance picks it up
    pub fn carry_over(&self, prefs: &mut dyn Prefs) -> Result<(), PrefsError> {
        prefs.set_int(SCORE_KEY, i64::from(self.target_score()));
        prefs.flush()
    }

    /// Forget the carried score (application quit)
    pub fn clear(prefs: &mut dyn Prefs) -> Result<(), PrefsError> {
        prefs.remove(SCORE_KEY);
        prefs.flush()
    }
}

impl WinObserver for ScoreBoard {
    fn on_win(&mut self) {
        if self.win_active {
            return;
        }
        self.win_active = true;
        self.banner_alpha = 0.0;
        self.banner_elapsed = 0.0;
        // The saved score comes from an editable prefs file
        let to = self.score.saturating_add(self.win_score);
        self.count_up = Some(CountUp {
            from: self.score,
            to,
            elapsed: 0.0,
            duration: self.score_count_secs,
        });
        log::info!("Win! Score {} -> {}", self.score, to);
    }

    fn update(&mut self, dt: f32) {
        ScoreBoard::update(self, dt);
    }
}

/// Fraction of `duration` covered by `elapsed`, clamped to 0..=1
fn progress(elapsed: f32, duration: f32) -> f32 {
    if duration <= 0.0 {
        1.0
    } else {
        (elapsed / duration).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryPrefs;

    #[test]
    fn test_win_counts_up() {
        let settings = Settings::default();
        let mut board = ScoreBoard::new(&settings);
        board.on_win();
        assert!(board.is_win_active());
        assert_eq!(board.target_score(), settings.win_score);

        board.update(settings.score_count_secs / 2.0);
        assert!(board.score > 0 && board.score < settings.win_score);

        board.update(settings.score_count_secs);
        assert_eq!(board.score, settings.win_score);
        assert!(!board.is_animating());
        assert_eq!(board.label(), format!("Score: {}", settings.win_score));
    }

    #[test]
    fn test_second_win_ignored() {
        let settings = Settings::default();
        let mut board = ScoreBoard::new(&settings);
        board.on_win();
        board.update(10.0);
        board.on_win();
        board.update(10.0);
        assert_eq!(board.score, settings.win_score);
    }

    #[test]
    fn test_banner_and_stars() {
        let settings = Settings::default();
        let mut board = ScoreBoard::new(&settings);
        board.update(5.0);
        assert_eq!(board.banner_alpha, 0.0);

        board.on_win();
        board.update(settings.stars_delay_secs / 2.0);
        assert!(!board.stars_visible);
        assert!(board.banner_alpha > 0.0 && board.banner_alpha < 1.0);

        board.update(settings.banner_fade_secs);
        assert!(board.stars_visible);
        assert_eq!(board.banner_alpha, 1.0);
    }

    #[test]
    fn test_carry_over_and_clear() {
        let settings = Settings::default();
        let mut prefs = MemoryPrefs::new();

        let mut board = ScoreBoard::load(&settings, &prefs);
        assert_eq!(board.score, 0);
        board.on_win();
        // Carry-over mid-animation stores the final value
        board.carry_over(&mut prefs).unwrap();

        let next = ScoreBoard::load(&settings, &prefs);
        assert_eq!(next.score, settings.win_score);
        assert!(!next.is_win_active());

        ScoreBoard::clear(&mut prefs).unwrap();
        assert_eq!(ScoreBoard::load(&settings, &prefs).score, 0);
    }

    #[test]
    fn test_win_saturates_near_max_score() {
        let settings = Settings::default();
        let mut prefs = MemoryPrefs::new();
        prefs.set_int(SCORE_KEY, i64::from(u32::MAX - 10));

        let mut board = ScoreBoard::load(&settings, &prefs);
        board.on_win();
        assert_eq!(board.target_score(), u32::MAX);

        board.update(settings.score_count_secs * 0.5);
        assert!(board.score >= u32::MAX - 10);
        board.update(10.0);
        assert_eq!(board.score, u32::MAX);
        assert_eq!(board.label(), format!("Score: {}", u32::MAX));
    }
}
