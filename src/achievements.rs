//! Achievement tables and evaluator
//!
//! Each game has a fixed table. Entries carry an explicit category so a
//! stat only ever reaches the achievements that watch it. The persisted
//! unlocked set is authoritative across restarts.

use std::collections::HashSet;

use serde::Serialize;

use crate::persistence::{Backend, Store};
use crate::sim::{GameKind, Stat};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Achievement {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub requirement: u64,
    pub category: Stat,
}

impl Achievement {
    const fn new(
        id: &'static str,
        name: &'static str,
        description: &'static str,
        requirement: u64,
        category: Stat,
    ) -> Self {
        Self {
            id,
            name,
            description,
            requirement,
            category,
        }
    }

    /// Whether `value` for `stat` meets this achievement
    pub fn is_met(&self, stat: Stat, value: u64) -> bool {
        self.category == stat && value >= self.requirement
    }
}

pub const SNAKE_ACHIEVEMENTS: &[Achievement] = &[
    Achievement::new("first_food", "First Bite", "Eat your first food", 1, Stat::First),
    Achievement::new("score_100", "Getting Started", "Score 100 points", 100, Stat::Score),
    Achievement::new("score_500", "Snake Master", "Score 500 points", 500, Stat::Score),
    Achievement::new("score_1000", "Legend", "Score 1000 points", 1000, Stat::Score),
    Achievement::new("length_20", "Long Snake", "Grow to 20 segments", 20, Stat::Length),
    Achievement::new("powerup_10", "Power Hungry", "Collect 10 power-ups", 10, Stat::PowerUp),
];

pub const TETRIS_ACHIEVEMENTS: &[Achievement] = &[
    Achievement::new("first_line", "Line Cleared", "Clear your first line", 1, Stat::First),
    Achievement::new("score_500", "Getting Started", "Score 500 points", 500, Stat::Score),
    Achievement::new("score_2000", "Tetris Master", "Score 2000 points", 2000, Stat::Score),
    Achievement::new("score_5000", "Legend", "Score 5000 points", 5000, Stat::Score),
    Achievement::new("lines_10", "10 Lines", "Clear 10 lines", 10, Stat::Lines),
    Achievement::new("lines_50", "50 Lines", "Clear 50 lines", 50, Stat::Lines),
];

pub fn for_game(kind: GameKind) -> &'static [Achievement] {
    match kind {
        GameKind::Snake => SNAKE_ACHIEVEMENTS,
        GameKind::Tetris => TETRIS_ACHIEVEMENTS,
    }
}

/// Unlock progress summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub unlocked: usize,
    pub total: usize,
    /// Rounded to the nearest whole percent
    pub percentage: u32,
}

#[derive(Debug, Clone)]
pub struct AchievementTracker {
    kind: GameKind,
    table: &'static [Achievement],
    unlocked: HashSet<&'static str>,
    just_unlocked: Vec<Achievement>,
}

impl AchievementTracker {
    /// Load the unlocked set for `kind` from the store
    pub fn load<B: Backend>(kind: GameKind, store: &Store<B>) -> Self {
        let table = for_game(kind);
        let saved = store.unlocked_achievements(kind);
        // Ids no longer in the table are ignored
        let unlocked = table
            .iter()
            .filter(|a| saved.iter().any(|id| id == a.id))
            .map(|a| a.id)
            .collect();
        Self {
            kind,
            table,
            unlocked,
            just_unlocked: Vec::new(),
        }
    }

    pub fn kind(&self) -> GameKind {
        self.kind
    }

    pub fn achievements(&self) -> &'static [Achievement] {
        self.table
    }

    pub fn is_unlocked(&self, id: &str) -> bool {
        self.unlocked.contains(id)
    }

    /// Unlock every achievement `stat` = `value` satisfies.
    ///
    /// Returns only the ones unlocked by this call, in table order. An id the
    /// store already holds is adopted silently and never reported.
    pub fn check<B: Backend>(
        &mut self,
        stat: Stat,
        value: u64,
        store: &mut Store<B>,
    ) -> Vec<Achievement> {
        let mut newly = Vec::new();
        for achievement in self.table {
            if self.unlocked.contains(achievement.id) || !achievement.is_met(stat, value) {
                continue;
            }
            self.unlocked.insert(achievement.id);
            if store.add_achievement(self.kind, achievement.id) {
                log::info!("Achievement unlocked: {} ({})", achievement.name, achievement.id);
                newly.push(*achievement);
            }
        }
        self.just_unlocked.extend(newly.iter().copied());
        newly
    }

    /// Everything unlocked since the last `reset`
    pub fn just_unlocked(&self) -> &[Achievement] {
        &self.just_unlocked
    }

    /// Forget the per-run unlock list. The unlocked set is kept.
    pub fn reset(&mut self) {
        self.just_unlocked.clear();
    }

    pub fn progress(&self) -> Progress {
        let unlocked = self.unlocked.len();
        let total = self.table.len();
        let percentage = if total == 0 {
            0
        } else {
            (unlocked as f64 / total as f64 * 100.0).round() as u32
        };
        Progress {
            unlocked,
            total,
            percentage,
        }
    }
}
