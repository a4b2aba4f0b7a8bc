//! Frame-driven game session
//!
//! Owns one engine plus its collaborators. Each frame the engine advances by
//! the wall-clock delta, then every queued event is routed: sounds to the
//! audio sink, stats to the achievement tracker, game over to the store.

use serde::Serialize;

use crate::achievements::{AchievementTracker, Progress};
use crate::audio::AudioSink;
use crate::error::ArcadeError;
use crate::persistence::{Backend, GameStats, Store};
use crate::settings::Settings;
use crate::sim::{Action, Engine, GameEvent, GameKind, GameView, Sound, build_engine};

/// Player commands after key mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Act(Action),
    TogglePause,
    Restart,
    Menu,
}

/// What the caller should do after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// Tear the session down and show the menu
    Menu,
}

/// Result of a finished run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GameOverSummary {
    pub score: u64,
    pub high_score: u64,
    pub new_high_score: bool,
    pub stats: GameStats,
}

/// Overlay data handed to renderers with the game view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hud {
    pub score: u64,
    pub high_score: u64,
    pub paused: bool,
    pub game_over: Option<GameOverSummary>,
}

/// Read-only consumer of the current state, called once per frame
pub trait Renderer {
    fn render(&mut self, view: GameView<'_>, hud: &Hud);
}

pub struct Session<B: Backend, A: AudioSink> {
    kind: GameKind,
    engine: Box<dyn Engine>,
    store: Store<B>,
    audio: A,
    tracker: AchievementTracker,
    settings: Settings,
    paused: bool,
    last_frame_ms: Option<f64>,
    run_time_ms: f64,
    summary: Option<GameOverSummary>,
}

impl<B: Backend, A: AudioSink> Session<B, A> {
    /// Build a session for `kind` using the stored difficulty
    pub fn new(
        kind: GameKind,
        store: Store<B>,
        audio: A,
        seed: u64,
    ) -> Result<Self, ArcadeError> {
        let settings = store.settings();
        let engine = build_engine(kind, settings.difficulty, seed)?;
        log::info!(
            "Starting {} on {} (seed {})",
            kind,
            settings.difficulty.as_str(),
            seed
        );
        Ok(Self::with_engine(engine, store, audio))
    }

    /// Same as `new`, selecting the game by name
    pub fn start_by_name(
        name: &str,
        store: Store<B>,
        audio: A,
        seed: u64,
    ) -> Result<Self, ArcadeError> {
        let kind = name.parse::<GameKind>()?;
        Self::new(kind, store, audio, seed)
    }

    /// Wrap an already built engine
    pub fn with_engine(engine: Box<dyn Engine>, store: Store<B>, mut audio: A) -> Self {
        let kind = engine.kind();
        let settings = store.settings();
        let tracker = AchievementTracker::load(kind, &store);
        audio.set_volume(settings.effective_sfx_volume());
        Self {
            kind,
            engine,
            store,
            audio,
            tracker,
            settings,
            paused: false,
            last_frame_ms: None,
            run_time_ms: 0.0,
            summary: None,
        }
    }

    pub fn kind(&self) -> GameKind {
        self.kind
    }

    pub fn score(&self) -> u64 {
        self.engine.score()
    }

    pub fn high_score(&self) -> u64 {
        self.store.high_score(self.kind)
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_game_over(&self) -> bool {
        self.engine.is_game_over()
    }

    pub fn summary(&self) -> Option<&GameOverSummary> {
        self.summary.as_ref()
    }

    pub fn view(&self) -> GameView<'_> {
        self.engine.view()
    }

    pub fn tracker(&self) -> &AchievementTracker {
        &self.tracker
    }

    pub fn progress(&self) -> Progress {
        self.tracker.progress()
    }

    pub fn store(&self) -> &Store<B> {
        &self.store
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Persist new settings. Difficulty applies from the next session.
    pub fn set_settings(&mut self, settings: Settings) {
        self.store.set_settings(&settings);
        self.audio.set_volume(settings.effective_sfx_volume());
        self.settings = settings;
    }

    /// Hand the store back when the session ends
    pub fn into_store(self) -> Store<B> {
        self.store
    }

    /// Drive one animation frame at `timestamp_ms`.
    ///
    /// The first frame, and the first after a resume, advances by zero.
    pub fn frame(&mut self, timestamp_ms: f64) {
        if self.paused {
            return;
        }
        let dt = match self.last_frame_ms {
            Some(last) => (timestamp_ms - last).max(0.0),
            None => 0.0,
        };
        self.last_frame_ms = Some(timestamp_ms);
        self.update(dt);
    }

    /// Advance the engine by `dt_ms` and route its events
    pub fn update(&mut self, dt_ms: f64) {
        if self.paused || self.engine.is_game_over() {
            return;
        }
        self.run_time_ms += dt_ms;
        self.engine.update(dt_ms);
        self.route_events();
    }

    /// Apply a player intent. Ignored while paused or after game over.
    pub fn input(&mut self, action: Action) {
        if self.paused || self.engine.is_game_over() {
            return;
        }
        self.engine.apply(action);
        self.route_events();
    }

    pub fn pause(&mut self) {
        if !self.paused && !self.engine.is_game_over() {
            self.paused = true;
            log::debug!("Paused");
        }
    }

    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            self.last_frame_ms = None;
            log::debug!("Resumed");
        }
    }

    pub fn toggle_pause(&mut self) {
        if self.paused {
            self.resume();
        } else {
            self.pause();
        }
    }

    /// Fresh run of the same game. Pending engine timers are discarded.
    pub fn restart(&mut self) {
        self.engine.reset();
        self.engine.drain_events();
        self.tracker.reset();
        self.paused = false;
        self.last_frame_ms = None;
        self.run_time_ms = 0.0;
        self.summary = None;
        log::info!("Restarting {}", self.kind);
    }

    pub fn handle(&mut self, command: Command) -> Flow {
        match command {
            Command::Act(action) => self.input(action),
            Command::TogglePause => self.toggle_pause(),
            Command::Restart => self.restart(),
            Command::Menu => return Flow::Menu,
        }
        Flow::Continue
    }

    pub fn hud(&self) -> Hud {
        Hud {
            score: self.engine.score(),
            high_score: self.high_score(),
            paused: self.paused,
            game_over: self.summary,
        }
    }

    pub fn render<R: Renderer + ?Sized>(&self, renderer: &mut R) {
        renderer.render(self.engine.view(), &self.hud());
    }

    fn play(&mut self, sound: Sound) {
        if self.settings.sound_enabled {
            self.audio.play(sound);
        }
    }

    fn route_events(&mut self) {
        for event in self.engine.drain_events() {
            match event {
                GameEvent::Sound(sound) => self.play(sound),
                GameEvent::Stat { stat, value } => {
                    for achievement in self.tracker.check(stat, value, &mut self.store) {
                        self.play(Sound::Achievement);
                        self.audio.achievement_unlocked(&achievement);
                    }
                }
                GameEvent::GameOver { score } => self.finish(score),
            }
        }
    }

    fn finish(&mut self, score: u64) {
        let seconds = (self.run_time_ms / 1000.0).floor() as u64;
        let stats = self.store.record_game(self.kind, score, seconds);
        let new_high_score = self.store.set_high_score(self.kind, score);
        let high_score = self.store.high_score(self.kind);

        if new_high_score {
            log::info!("New {} high score: {}", self.kind, score);
        }
        log::info!(
            "{} over after {}s: score {} (best {})",
            self.kind,
            seconds,
            score,
            high_score
        );

        self.summary = Some(GameOverSummary {
            score,
            high_score,
            new_high_score,
            stats,
        });
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;
    use crate::audio::Recorder;
    use crate::menu::{self, MenuAction};
    use crate::persistence::MemoryBackend;
    use crate::sim::{SnakeGame, Stat};
    use crate::tuning::{Difficulty, SnakeConfig};

    /// Engine that replays a fixed list of event batches, one per update
    struct Scripted {
        batches: VecDeque<Vec<GameEvent>>,
        queued: Vec<GameEvent>,
        applied: Vec<Action>,
        score: u64,
        over: bool,
        board: SnakeGame,
    }

    impl Scripted {
        fn new(batches: Vec<Vec<GameEvent>>) -> Self {
            Self {
                batches: batches.into(),
                queued: Vec::new(),
                applied: Vec::new(),
                score: 0,
                over: false,
                board: SnakeGame::new(SnakeConfig::default(), 0).unwrap(),
            }
        }
    }

    impl Engine for Scripted {
        fn kind(&self) -> GameKind {
            GameKind::Snake
        }

        fn update(&mut self, _dt_ms: f64) {
            let Some(batch) = self.batches.pop_front() else {
                return;
            };
            for event in &batch {
                match event {
                    GameEvent::Stat {
                        stat: Stat::Score,
                        value,
                    } => self.score = *value,
                    GameEvent::GameOver { .. } => self.over = true,
                    _ => {}
                }
            }
            self.queued.extend(batch);
        }

        fn apply(&mut self, action: Action) {
            self.applied.push(action);
        }

        fn is_game_over(&self) -> bool {
            self.over
        }

        fn reset(&mut self) {
            self.over = false;
            self.score = 0;
        }

        fn score(&self) -> u64 {
            self.score
        }

        fn drain_events(&mut self) -> Vec<GameEvent> {
            std::mem::take(&mut self.queued)
        }

        fn view(&self) -> GameView<'_> {
            GameView::Snake(&self.board)
        }
    }

    fn scripted(batches: Vec<Vec<GameEvent>>) -> Session<MemoryBackend, Recorder> {
        Session::with_engine(
            Box::new(Scripted::new(batches)),
            Store::new(MemoryBackend::default()),
            Recorder::default(),
        )
    }

    fn stat(stat: Stat, value: u64) -> GameEvent {
        GameEvent::Stat { stat, value }
    }

    #[test]
    fn test_unknown_game_name_is_an_error() {
        let result = Session::start_by_name(
            "pong",
            Store::new(MemoryBackend::default()),
            Recorder::default(),
            1,
        );
        assert!(matches!(result, Err(ArcadeError::UnknownGame(name)) if name == "pong"));
    }

    #[test]
    fn test_difficulty_read_from_settings() {
        let mut store = Store::new(MemoryBackend::default());
        store.set_settings(&Settings {
            difficulty: Difficulty::Hard,
            ..Settings::default()
        });
        let session = Session::new(GameKind::Snake, store, Recorder::default(), 3).unwrap();
        match session.view() {
            GameView::Snake(snake) => assert_eq!(snake.step_interval_ms(), 100),
            GameView::Tetris(_) => panic!("expected snake"),
        }
    }

    #[test]
    fn test_events_routed() {
        let mut session = scripted(vec![vec![
            GameEvent::Sound(Sound::Food),
            stat(Stat::First, 1),
            stat(Stat::Score, 10),
        ]]);
        session.update(16.0);

        assert_eq!(
            session.audio().sounds,
            vec![Sound::Food, Sound::Achievement]
        );
        assert_eq!(session.audio().notifications, vec!["first_food"]);
        assert!(session.tracker().is_unlocked("first_food"));
        assert_eq!(
            session.store().unlocked_achievements(GameKind::Snake),
            vec!["first_food".to_string()]
        );
    }

    #[test]
    fn test_achievement_reported_once() {
        let mut session = scripted(vec![
            vec![stat(Stat::Score, 99)],
            vec![stat(Stat::Score, 100)],
            vec![stat(Stat::Score, 110)],
        ]);
        session.update(16.0);
        assert!(session.audio().notifications.is_empty());
        session.update(16.0);
        session.update(16.0);
        assert_eq!(session.audio().notifications, vec!["score_100"]);
    }

    #[test]
    fn test_sound_disabled_mutes_cues_not_unlocks() {
        let mut store = Store::new(MemoryBackend::default());
        store.set_settings(&Settings {
            sound_enabled: false,
            ..Settings::default()
        });
        let mut session = Session::with_engine(
            Box::new(Scripted::new(vec![vec![
                GameEvent::Sound(Sound::Food),
                stat(Stat::Length, 20),
            ]])),
            store,
            Recorder::default(),
        );
        session.update(16.0);
        assert!(session.audio().sounds.is_empty());
        assert_eq!(session.audio().notifications, vec!["length_20"]);
    }

    #[test]
    fn test_sound_toggled_mid_game() {
        let mut session = scripted(vec![
            vec![GameEvent::Sound(Sound::Food)],
            vec![GameEvent::Sound(Sound::Food)],
        ]);
        session.update(16.0);

        let muted = menu::updated(session.settings().clone(), MenuAction::ToggleSound);
        session.set_settings(muted);
        session.update(16.0);

        assert_eq!(session.audio().sounds, vec![Sound::Food]);
        assert!(!session.store().settings().sound_enabled);
    }

    #[test]
    fn test_game_over_bookkeeping() {
        let mut session = scripted(vec![
            vec![stat(Stat::Score, 40)],
            vec![GameEvent::GameOver { score: 40 }],
        ]);
        session.update(1500.0);
        session.update(1000.0);

        assert!(session.is_game_over());
        let summary = *session.summary().unwrap();
        assert_eq!(summary.score, 40);
        assert!(summary.new_high_score);
        assert_eq!(summary.high_score, 40);
        assert_eq!(summary.stats.games_played, 1);
        assert_eq!(summary.stats.total_time, 2);
        assert_eq!(session.high_score(), 40);

        // Frozen until restart
        session.input(Action::Rotate);
        session.update(16.0);
        assert_eq!(session.summary(), Some(&summary));

        session.restart();
        assert!(!session.is_game_over());
        assert!(session.summary().is_none());
        assert_eq!(session.hud().high_score, 40);
    }

    #[test]
    fn test_lower_score_is_not_a_new_high() {
        let mut store = Store::new(MemoryBackend::default());
        store.set_high_score(GameKind::Snake, 500);
        let mut session = Session::with_engine(
            Box::new(Scripted::new(vec![vec![GameEvent::GameOver { score: 70 }]])),
            store,
            Recorder::default(),
        );
        session.update(16.0);
        let summary = session.summary().unwrap();
        assert!(!summary.new_high_score);
        assert_eq!(summary.high_score, 500);
    }

    #[test]
    fn test_pause_blocks_updates_and_input() {
        let mut session = scripted(vec![vec![GameEvent::Sound(Sound::Food)]]);
        session.handle(Command::TogglePause);
        assert!(session.is_paused());

        session.update(16.0);
        session.input(Action::MoveLeft);
        assert!(session.audio().sounds.is_empty());

        session.handle(Command::TogglePause);
        session.update(16.0);
        assert_eq!(session.audio().sounds, vec![Sound::Food]);
    }

    #[test]
    fn test_frame_deltas() {
        let mut session = Session::new(
            GameKind::Snake,
            Store::new(MemoryBackend::default()),
            Recorder::default(),
            5,
        )
        .unwrap();
        let head = |s: &Session<MemoryBackend, Recorder>| match s.view() {
            GameView::Snake(snake) => snake.head(),
            GameView::Tetris(_) => unreachable!(),
        };
        let start = head(&session);

        // First frame is a zero delta regardless of the timestamp
        session.frame(10_000.0);
        assert_eq!(head(&session), start);

        session.frame(10_150.0);
        assert_ne!(head(&session), start);
        let moved = head(&session);

        // A long pause does not turn into one huge delta
        session.pause();
        session.frame(20_000.0);
        session.resume();
        session.frame(60_000.0);
        assert_eq!(head(&session), moved);
    }

    #[test]
    fn test_menu_command() {
        let mut session = scripted(vec![]);
        assert_eq!(session.handle(Command::Menu), Flow::Menu);
        assert_eq!(session.handle(Command::Restart), Flow::Continue);
    }

    #[test]
    fn test_real_snake_runs_into_wall() {
        let mut session = Session::new(
            GameKind::Snake,
            Store::new(MemoryBackend::default()),
            Recorder::default(),
            9,
        )
        .unwrap();
        let mut frames = 0;
        while !session.is_game_over() && frames < 100 {
            session.update(150.0);
            frames += 1;
        }
        assert!(session.is_game_over());
        assert_eq!(session.audio().sounds.last(), Some(&Sound::Collision));
        let stats = session.store().stats(GameKind::Snake);
        assert_eq!(stats.games_played, 1);
        assert_eq!(stats.best_game, session.score());
    }

    struct CountingRenderer {
        frames: usize,
        last: Option<Hud>,
    }

    impl Renderer for CountingRenderer {
        fn render(&mut self, _view: GameView<'_>, hud: &Hud) {
            self.frames += 1;
            self.last = Some(*hud);
        }
    }

    #[test]
    fn test_render_passes_hud() {
        let mut session = scripted(vec![vec![stat(Stat::Score, 30)]]);
        session.update(16.0);
        let mut renderer = CountingRenderer {
            frames: 0,
            last: None,
        };
        session.render(&mut renderer);
        assert_eq!(renderer.frames, 1);
        assert_eq!(renderer.last.unwrap().score, 30);
    }
}
