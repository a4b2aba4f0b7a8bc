//! Snake engine
//!
//! Grid movement runs on a fixed step interval. Power-up spawns, expiry and
//! effect restoration are deferred events on the engine's own clock.

use std::collections::VecDeque;

use glam::IVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::engine::{Action, Engine, GameKind, GamePhase, GameView};
use super::events::{GameEvent, Sound, Stat};
use super::timers::Timers;
use crate::error::ArcadeError;
use crate::tuning::{
    MAX_SNAKE_INTERVAL_MS, MIN_SNAKE_INTERVAL_MS, POINTS_POWER_UP_SCORE,
    POWER_UP_INTERVAL_DELTA_MS, SLOW_POWER_UP_SCORE, SPEED_POWER_UP_SCORE, SnakeConfig,
};

/// Grid cell, in cell units
pub type Segment = IVec2;

/// Rejection-sampling attempts before falling back to a free-cell scan
const PLACEMENT_ATTEMPTS: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// One-cell offset (y grows downward)
    pub fn delta(self) -> IVec2 {
        match self {
            Direction::Up => IVec2::new(0, -1),
            Direction::Down => IVec2::new(0, 1),
            Direction::Left => IVec2::new(-1, 0),
            Direction::Right => IVec2::new(1, 0),
        }
    }
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerUpKind {
    /// Shorter step interval for a while
    Speed,
    /// Instant bonus
    Points,
    /// Longer step interval for a while
    Slow,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 3] = [PowerUpKind::Speed, PowerUpKind::Points, PowerUpKind::Slow];

    pub fn bonus(&self) -> u64 {
        match self {
            PowerUpKind::Speed => SPEED_POWER_UP_SCORE,
            PowerUpKind::Points => POINTS_POWER_UP_SCORE,
            PowerUpKind::Slow => SLOW_POWER_UP_SCORE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerUp {
    pub id: u32,
    pub position: Segment,
    pub kind: PowerUpKind,
    /// Engine clock reading at which it disappears
    pub expires_at_ms: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum SnakeTimer {
    SpawnPowerUp,
    ExpirePowerUp { id: u32 },
    RestoreInterval,
}

pub struct SnakeGame {
    config: SnakeConfig,
    rng: Pcg32,
    /// Head first
    body: VecDeque<Segment>,
    facing: Direction,
    pending: Direction,
    food: Segment,
    power_up: Option<PowerUp>,
    step_interval_ms: u32,
    /// Interval captured before the first of the overlapping timed effects
    interval_before_effects: Option<u32>,
    active_effects: u32,
    accumulator_ms: f64,
    timers: Timers<SnakeTimer>,
    score: u64,
    food_eaten: u64,
    power_ups_collected: u64,
    phase: GamePhase,
    next_power_up_id: u32,
    events: Vec<GameEvent>,
}

impl std::fmt::Debug for SnakeGame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnakeGame")
            .field("body", &self.body)
            .field("facing", &self.facing)
            .field("food", &self.food)
            .field("power_up", &self.power_up)
            .field("score", &self.score)
            .field("phase", &self.phase)
            .finish()
    }
}

impl SnakeGame {
    pub fn new(config: SnakeConfig, seed: u64) -> Result<Self, ArcadeError> {
        config.validate()?;
        let mut game = Self {
            step_interval_ms: config.step_interval_ms,
            config,
            rng: Pcg32::seed_from_u64(seed),
            body: VecDeque::new(),
            facing: Direction::Right,
            pending: Direction::Right,
            food: IVec2::ZERO,
            power_up: None,
            interval_before_effects: None,
            active_effects: 0,
            accumulator_ms: 0.0,
            timers: Timers::new(),
            score: 0,
            food_eaten: 0,
            power_ups_collected: 0,
            phase: GamePhase::Playing,
            next_power_up_id: 1,
            events: Vec::new(),
        };
        game.start_run();
        Ok(game)
    }

    /// Lay out the body, place food and schedule the first power-up
    fn start_run(&mut self) {
        let start = IVec2::new(self.config.columns / 2, self.config.rows / 2);
        self.body = (0..self.config.initial_length as i32)
            .map(|i| start - IVec2::new(i, 0))
            .collect();
        self.facing = Direction::Right;
        self.pending = Direction::Right;
        self.power_up = None;
        self.step_interval_ms = self.config.step_interval_ms;
        self.interval_before_effects = None;
        self.active_effects = 0;
        self.accumulator_ms = 0.0;
        self.score = 0;
        self.food_eaten = 0;
        self.power_ups_collected = 0;
        self.phase = GamePhase::Playing;
        self.events.clear();

        // Validation guarantees at least one free cell here
        self.food = self.free_cell(false).unwrap_or(IVec2::ZERO);

        self.timers.clear();
        self.timers
            .schedule(self.config.power_up_spawn_delay_ms, SnakeTimer::SpawnPowerUp);
    }

    pub fn body(&self) -> &VecDeque<Segment> {
        &self.body
    }

    pub fn head(&self) -> Segment {
        self.body.front().copied().unwrap_or(IVec2::ZERO)
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn facing(&self) -> Direction {
        self.facing
    }

    /// Direction that will be committed on the next step
    pub fn pending_direction(&self) -> Direction {
        self.pending
    }

    pub fn food(&self) -> Segment {
        self.food
    }

    pub fn power_up(&self) -> Option<&PowerUp> {
        self.power_up.as_ref()
    }

    pub fn step_interval_ms(&self) -> u32 {
        self.step_interval_ms
    }

    pub fn food_eaten(&self) -> u64 {
        self.food_eaten
    }

    pub fn power_ups_collected(&self) -> u64 {
        self.power_ups_collected
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn columns(&self) -> i32 {
        self.config.columns
    }

    pub fn rows(&self) -> i32 {
        self.config.rows
    }

    /// Engine clock, advanced only by `update`
    pub fn clock_ms(&self) -> f64 {
        self.timers.now_ms()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Queue a turn for the next step.
    ///
    /// A reversal of the committed facing is ignored, as is anything after
    /// game over. The latest accepted turn wins.
    pub fn set_direction(&mut self, direction: Direction) -> bool {
        if self.phase == GamePhase::GameOver || direction == self.facing.opposite() {
            return false;
        }
        self.pending = direction;
        true
    }

    fn in_bounds(&self, cell: Segment) -> bool {
        cell.x >= 0 && cell.x < self.config.columns && cell.y >= 0 && cell.y < self.config.rows
    }

    fn is_blocked(&self, cell: Segment, include_food: bool) -> bool {
        self.body.contains(&cell)
            || self.power_up.is_some_and(|p| p.position == cell)
            || (include_food && cell == self.food)
    }

    /// Uniformly random cell clear of the body and the power-up (and the
    /// food when `include_food`). `None` only when the grid is full.
    fn free_cell(&mut self, include_food: bool) -> Option<Segment> {
        for _ in 0..PLACEMENT_ATTEMPTS {
            let cell = IVec2::new(
                self.rng.random_range(0..self.config.columns),
                self.rng.random_range(0..self.config.rows),
            );
            if !self.is_blocked(cell, include_food) {
                return Some(cell);
            }
        }

        // Crowded grid: pick among the cells that are actually free
        let (columns, rows) = (self.config.columns, self.config.rows);
        let free: Vec<Segment> = (0..rows)
            .flat_map(|y| (0..columns).map(move |x| IVec2::new(x, y)))
            .filter(|&cell| !self.is_blocked(cell, include_food))
            .collect();
        if free.is_empty() {
            return None;
        }
        Some(free[self.rng.random_range(0..free.len())])
    }

    fn add_score(&mut self, points: u64) {
        self.score += points;
        self.events.push(GameEvent::Stat {
            stat: Stat::Score,
            value: self.score,
        });
    }

    fn game_over(&mut self) {
        if self.phase == GamePhase::GameOver {
            return;
        }
        self.phase = GamePhase::GameOver;
        self.timers.clear();
        self.events.push(GameEvent::Sound(Sound::Collision));
        self.events.push(GameEvent::GameOver { score: self.score });
        log::info!(
            "Snake over: score {}, length {}, food {}",
            self.score,
            self.body.len(),
            self.food_eaten
        );
    }

    /// One discrete movement step
    fn step(&mut self) {
        self.facing = self.pending;
        let head = self.head() + self.facing.delta();

        if !self.in_bounds(head) || self.body.contains(&head) {
            self.game_over();
            return;
        }

        self.body.push_front(head);

        if head == self.food {
            self.food_eaten += 1;
            self.add_score(self.config.score_per_food);
            self.events.push(GameEvent::Sound(Sound::Food));
            self.events.push(GameEvent::Stat {
                stat: Stat::First,
                value: self.food_eaten,
            });
            self.events.push(GameEvent::Stat {
                stat: Stat::Length,
                value: self.body.len() as u64,
            });

            match self.free_cell(false) {
                Some(cell) => self.food = cell,
                None => {
                    // Nowhere left to put food
                    self.game_over();
                    return;
                }
            }
        } else {
            self.body.pop_back();
        }

        if self.power_up.is_some_and(|p| p.position == head) {
            self.collect_power_up();
        }
    }

    fn collect_power_up(&mut self) {
        let Some(power_up) = self.power_up.take() else {
            return;
        };
        self.power_ups_collected += 1;

        match power_up.kind {
            PowerUpKind::Speed => {
                let faster = self
                    .step_interval_ms
                    .saturating_sub(POWER_UP_INTERVAL_DELTA_MS)
                    .max(MIN_SNAKE_INTERVAL_MS);
                self.begin_timed_effect(faster);
            }
            PowerUpKind::Slow => {
                let slower = (self.step_interval_ms + POWER_UP_INTERVAL_DELTA_MS)
                    .min(MAX_SNAKE_INTERVAL_MS);
                self.begin_timed_effect(slower);
            }
            PowerUpKind::Points => {}
        }

        self.add_score(power_up.kind.bonus());
        self.events.push(GameEvent::Sound(Sound::PowerUp));
        self.events.push(GameEvent::Stat {
            stat: Stat::PowerUp,
            value: self.power_ups_collected,
        });
    }

    fn begin_timed_effect(&mut self, interval_ms: u32) {
        if self.active_effects == 0 {
            self.interval_before_effects = Some(self.step_interval_ms);
        }
        self.active_effects += 1;
        self.step_interval_ms = interval_ms;
        self.timers
            .schedule(self.config.power_up_effect_ms, SnakeTimer::RestoreInterval);
    }

    fn on_timer(&mut self, timer: SnakeTimer) {
        match timer {
            SnakeTimer::SpawnPowerUp => {
                self.spawn_power_up();
                let delay = self.config.power_up_spawn_delay_ms;
                let next = if delay > 0.0 {
                    self.rng.random_range(delay..delay * 2.0)
                } else {
                    0.0
                };
                self.timers.schedule(next, SnakeTimer::SpawnPowerUp);
            }
            SnakeTimer::ExpirePowerUp { id } => {
                if self.power_up.is_some_and(|p| p.id == id) {
                    log::debug!("Power-up {} expired", id);
                    self.power_up = None;
                }
            }
            SnakeTimer::RestoreInterval => {
                self.active_effects = self.active_effects.saturating_sub(1);
                if self.active_effects == 0 {
                    if let Some(interval) = self.interval_before_effects.take() {
                        self.step_interval_ms = interval;
                    }
                }
            }
        }
    }

    fn spawn_power_up(&mut self) {
        // The replaced power-up, if any, must not block its own cell
        self.power_up = None;
        let Some(position) = self.free_cell(true) else {
            return;
        };
        let kind = PowerUpKind::ALL[self.rng.random_range(0..PowerUpKind::ALL.len())];
        let id = self.next_power_up_id;
        self.next_power_up_id += 1;
        let lifetime = self.config.power_up_lifetime_ms;

        self.power_up = Some(PowerUp {
            id,
            position,
            kind,
            expires_at_ms: self.timers.now_ms() + lifetime,
        });
        self.timers
            .schedule(lifetime, SnakeTimer::ExpirePowerUp { id });
        log::debug!("Power-up {} ({:?}) at {}", id, kind, position);
    }
}

impl Engine for SnakeGame {
    fn kind(&self) -> GameKind {
        GameKind::Snake
    }

    /// Accumulates time and performs at most one step once the interval is
    /// reached. The remainder is dropped, not carried.
    fn update(&mut self, dt_ms: f64) {
        if self.phase == GamePhase::GameOver {
            return;
        }

        for timer in self.timers.advance(dt_ms) {
            self.on_timer(timer);
        }

        self.accumulator_ms += dt_ms;
        if self.accumulator_ms >= self.step_interval_ms as f64 {
            self.accumulator_ms = 0.0;
            self.step();
        }
    }

    fn apply(&mut self, action: Action) {
        if let Action::Turn(direction) = action {
            self.set_direction(direction);
        }
    }

    fn is_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    fn reset(&mut self) {
        self.start_run();
    }

    fn score(&self) -> u64 {
        self.score
    }

    fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    fn view(&self) -> GameView<'_> {
        GameView::Snake(self)
    }
}
