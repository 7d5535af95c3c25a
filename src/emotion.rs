//=========================================================================
// Emotion System
//=========================================================================
//
// Five bounded emotion values driven by player choices.
//
// Architecture:
//   Choice effects ("执念" → +10) → update_by_name() → EmotionValue
//                                                  ↓
//                                   history (last 100 changes)
//                                                  ↓
//                     summary() / effects() / snapshot()
//
// Decay: every update first subtracts `decay_rate` per minute of game
// time elapsed since that emotion last changed, then applies the delta,
// then clamps to [min, max].
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::{BTreeMap, VecDeque};
use std::fmt;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

//=== Internal Dependencies ===============================================

use crate::config::GameSettings;

/// Maximum history entries kept in memory and written to saves.
pub const HISTORY_LIMIT: usize = 100;

/// Number of recent deltas considered by the stability score.
const STABILITY_WINDOW: usize = 10;

//=== EmotionKind =========================================================

/// The five tracked emotions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmotionKind {
    /// 执念
    Obsession,
    /// 愤怒
    Anger,
    /// 压抑
    Depression,
    /// 情感
    Affection,
    /// 决心
    Determination,
}

impl EmotionKind {
    /// All kinds in display order.
    pub const ALL: [EmotionKind; 5] = [
        EmotionKind::Obsession,
        EmotionKind::Anger,
        EmotionKind::Depression,
        EmotionKind::Affection,
        EmotionKind::Determination,
    ];

    /// Chinese label used by story data and on screen.
    pub fn label(self) -> &'static str {
        match self {
            Self::Obsession => "执念",
            Self::Anger => "愤怒",
            Self::Depression => "压抑",
            Self::Affection => "情感",
            Self::Determination => "决心",
        }
    }

    /// Resolves a Chinese label or an English name (any case).
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL.into_iter().find(|kind| {
            kind.label() == name || format!("{:?}", kind).eq_ignore_ascii_case(name)
        })
    }

    /// Bar colour on the status panel.
    pub fn bar_color(self) -> [u8; 3] {
        match self {
            Self::Obsession => [255, 100, 100],
            Self::Anger => [255, 150, 0],
            Self::Depression => [100, 100, 255],
            Self::Affection => [255, 100, 255],
            Self::Determination => [100, 255, 100],
        }
    }
}

impl fmt::Display for EmotionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

//=== EmotionValue ========================================================

/// A single bounded value with time-based decay.
#[derive(Debug, Clone, PartialEq)]
pub struct EmotionValue {
    value: f64,
    min: f64,
    max: f64,
    decay_rate: f64,
    last_update: f64,
}

impl EmotionValue {
    fn new(min: f64, max: f64, decay_rate: f64) -> Self {
        Self {
            value: min,
            min,
            max,
            decay_rate,
            last_update: 0.0,
        }
    }

    /// Applies decay then `delta`, returning `(old, new)`.
    fn update(&mut self, delta: f64, now: f64) -> (f64, f64) {
        let old = self.value;
        let minutes = ((now - self.last_update) / 60.0).max(0.0);
        self.value = (self.value + delta - self.decay_rate * minutes).clamp(self.min, self.max);
        self.last_update = now;
        (old, self.value)
    }

    fn set(&mut self, value: f64) {
        self.value = value.clamp(self.min, self.max);
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Position within the range, 0.0 to 1.0.
    pub fn percentage(&self) -> f64 {
        if self.max > self.min {
            (self.value - self.min) / (self.max - self.min)
        } else {
            0.0
        }
    }
}

//=== Records =============================================================

/// One recorded change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionChange {
    pub emotion: EmotionKind,
    pub old_value: f64,
    pub new_value: f64,
    pub delta: f64,
    /// Game-clock seconds.
    pub timestamp: f64,
}

/// Aggregate view used by the debug overlay and CLI reports.
#[derive(Debug, Clone, PartialEq)]
pub struct EmotionSummary {
    pub values: BTreeMap<EmotionKind, f64>,
    pub percentages: BTreeMap<EmotionKind, f64>,
    pub total: f64,
    /// Highest emotion, `None` while everything sits at zero.
    pub dominant: Option<EmotionKind>,
    /// 1.0 for calm histories, dropping toward 0.0 as recent swings grow.
    pub stability: f64,
}

/// Gameplay modifiers derived from the current emotions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmotionEffects {
    pub system_activation: bool,
    pub combat_bonus: f64,
    pub recovery_penalty: f64,
    pub relationship_bonus: f64,
    pub growth_bonus: f64,
}

/// Persisted form (values plus trimmed history).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmotionSnapshot {
    pub values: BTreeMap<EmotionKind, f64>,
    pub history: Vec<EmotionChange>,
}

//=== EmotionSystem =======================================================

/// Tracks all emotions and their change history.
///
/// # Examples
///
/// ```
/// use simulate_to_survive::emotion::{EmotionKind, EmotionSystem};
///
/// let mut emotions = EmotionSystem::new(0.0, 100.0, 0.0);
/// emotions.update_by_name("执念", 30.0, 0.0);
/// assert_eq!(emotions.value(EmotionKind::Obsession), 30.0);
/// assert_eq!(emotions.summary().dominant, Some(EmotionKind::Obsession));
/// ```
#[derive(Debug, Clone)]
pub struct EmotionSystem {
    values: BTreeMap<EmotionKind, EmotionValue>,
    history: VecDeque<EmotionChange>,
}

impl EmotionSystem {
    //--- Construction -----------------------------------------------------

    pub fn new(min: f64, max: f64, decay_rate: f64) -> Self {
        let values = EmotionKind::ALL
            .into_iter()
            .map(|kind| (kind, EmotionValue::new(min, max, decay_rate)))
            .collect();

        Self {
            values,
            history: VecDeque::with_capacity(HISTORY_LIMIT),
        }
    }

    pub fn from_settings(settings: &GameSettings) -> Self {
        Self::new(
            settings.min_emotion_value,
            settings.max_emotion_value,
            settings.emotion_decay_rate,
        )
    }

    //--- Mutation ---------------------------------------------------------

    /// Changes one emotion and records the change. Returns the new value.
    pub fn update(&mut self, kind: EmotionKind, delta: f64, now: f64) -> f64 {
        let Some(entry) = self.values.get_mut(&kind) else {
            return 0.0;
        };

        let (old_value, new_value) = entry.update(delta, now);
        debug!(target: "emotion", "{}: {:.1} -> {:.1} ({:+})", kind, old_value, new_value, delta);

        if self.history.len() == HISTORY_LIMIT {
            self.history.pop_front();
        }
        self.history.push_back(EmotionChange {
            emotion: kind,
            old_value,
            new_value,
            delta,
            timestamp: now,
        });

        new_value
    }

    /// Like [`update`](Self::update), keyed by label or English name.
    ///
    /// Unknown names are logged and ignored.
    pub fn update_by_name(&mut self, name: &str, delta: f64, now: f64) -> bool {
        match EmotionKind::from_name(name) {
            Some(kind) => {
                self.update(kind, delta, now);
                true
            }
            None => {
                warn!(target: "emotion", "Unknown emotion name: {}", name);
                false
            }
        }
    }

    /// Applies a choice's effect table. Returns how many entries applied.
    pub fn apply_effects(&mut self, effects: &BTreeMap<String, i32>, now: f64) -> usize {
        effects
            .iter()
            .filter(|(name, delta)| self.update_by_name(name, f64::from(**delta), now))
            .count()
    }

    /// Sets a value directly (clamped, not recorded).
    pub fn set_value(&mut self, kind: EmotionKind, value: f64) {
        if let Some(entry) = self.values.get_mut(&kind) {
            entry.set(value);
        }
    }

    /// Zeroes everything and clears the history.
    pub fn reset(&mut self) {
        for entry in self.values.values_mut() {
            entry.set(0.0);
        }
        self.history.clear();
    }

    //--- Queries ----------------------------------------------------------

    pub fn value(&self, kind: EmotionKind) -> f64 {
        self.values.get(&kind).map_or(0.0, EmotionValue::value)
    }

    pub fn percentage(&self, kind: EmotionKind) -> f64 {
        self.values.get(&kind).map_or(0.0, EmotionValue::percentage)
    }

    /// `true` once `kind` has reached `threshold`.
    pub fn check_threshold(&self, kind: EmotionKind, threshold: f64) -> bool {
        self.value(kind) >= threshold
    }

    pub fn history(&self) -> impl Iterator<Item = &EmotionChange> {
        self.history.iter()
    }

    pub fn summary(&self) -> EmotionSummary {
        let values: BTreeMap<_, _> = EmotionKind::ALL
            .into_iter()
            .map(|kind| (kind, self.value(kind)))
            .collect();
        let percentages = EmotionKind::ALL
            .into_iter()
            .map(|kind| (kind, self.percentage(kind)))
            .collect();

        let mut dominant: Option<(EmotionKind, f64)> = None;
        for kind in EmotionKind::ALL {
            let value = values[&kind];
            if dominant.map_or(true, |(_, best)| value > best) {
                dominant = Some((kind, value));
            }
        }

        EmotionSummary {
            total: values.values().sum(),
            dominant: dominant.filter(|(_, v)| *v > 0.0).map(|(kind, _)| kind),
            stability: self.stability(),
            values,
            percentages,
        }
    }

    pub fn effects(&self) -> EmotionEffects {
        EmotionEffects {
            system_activation: self.check_threshold(EmotionKind::Obsession, 80.0),
            combat_bonus: self.percentage(EmotionKind::Anger) * 0.2,
            recovery_penalty: self.percentage(EmotionKind::Depression) * 0.3,
            relationship_bonus: self.percentage(EmotionKind::Affection) * 0.15,
            growth_bonus: self.percentage(EmotionKind::Determination) * 0.25,
        }
    }

    //--- Persistence ------------------------------------------------------

    pub fn snapshot(&self) -> EmotionSnapshot {
        EmotionSnapshot {
            values: EmotionKind::ALL
                .into_iter()
                .map(|kind| (kind, self.value(kind)))
                .collect(),
            history: self.history.iter().cloned().collect(),
        }
    }

    /// Restores values and history. Decay restarts from `now`.
    pub fn restore(&mut self, snapshot: &EmotionSnapshot, now: f64) {
        for (kind, entry) in self.values.iter_mut() {
            entry.set(snapshot.values.get(kind).copied().unwrap_or(entry.min));
            entry.last_update = now;
        }

        let skip = snapshot.history.len().saturating_sub(HISTORY_LIMIT);
        self.history = snapshot.history.iter().skip(skip).cloned().collect();
    }

    //--- Internal Helpers -------------------------------------------------

    fn stability(&self) -> f64 {
        if self.history.is_empty() {
            return 1.0;
        }

        let recent: Vec<f64> = self
            .history
            .iter()
            .rev()
            .take(STABILITY_WINDOW)
            .map(|change| change.delta)
            .collect();
        let mean = recent.iter().sum::<f64>() / recent.len() as f64;
        let variance =
            recent.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / recent.len() as f64;

        (1.0 - variance / 100.0).max(0.0)
    }
}

impl Default for EmotionSystem {
    fn default() -> Self {
        Self::from_settings(&GameSettings::default())
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn no_decay() -> EmotionSystem {
        EmotionSystem::new(0.0, 100.0, 0.0)
    }

    //=====================================================================
    // Kind Tests
    //=====================================================================

    #[test]
    fn names_resolve_in_both_languages() {
        assert_eq!(EmotionKind::from_name("执念"), Some(EmotionKind::Obsession));
        assert_eq!(EmotionKind::from_name("determination"), Some(EmotionKind::Determination));
        assert_eq!(EmotionKind::from_name("Anger"), Some(EmotionKind::Anger));
        assert_eq!(EmotionKind::from_name("快乐"), None);
    }

    #[test]
    fn bar_colors_are_distinct() {
        let mut colors: Vec<_> = EmotionKind::ALL.iter().map(|k| k.bar_color()).collect();
        colors.sort();
        colors.dedup();
        assert_eq!(colors.len(), 5);
    }

    //=====================================================================
    // Update Tests
    //=====================================================================

    #[test]
    fn update_clamps_to_range() {
        let mut emotions = no_decay();

        emotions.update(EmotionKind::Anger, 150.0, 0.0);
        assert_eq!(emotions.value(EmotionKind::Anger), 100.0);

        emotions.update(EmotionKind::Anger, -500.0, 0.0);
        assert_eq!(emotions.value(EmotionKind::Anger), 0.0);
    }

    #[test]
    fn decay_is_applied_per_elapsed_minute() {
        let mut emotions = EmotionSystem::new(0.0, 100.0, 0.1);

        emotions.update(EmotionKind::Obsession, 50.0, 0.0);
        // Ten minutes later: -1.0 decay, +0 delta
        let value = emotions.update(EmotionKind::Obsession, 0.0, 600.0);

        assert!((value - 49.0).abs() < 1e-9);
    }

    #[test]
    fn clock_going_backwards_does_not_inflate_values() {
        let mut emotions = EmotionSystem::new(0.0, 100.0, 0.1);
        let before = emotions.update(EmotionKind::Affection, 10.0, 600.0);

        let after = emotions.update(EmotionKind::Affection, 0.0, 0.0);

        assert_eq!(after, before);
    }

    #[test]
    fn unknown_name_is_ignored() {
        let mut emotions = no_decay();
        assert!(!emotions.update_by_name("boredom", 10.0, 0.0));
        assert_eq!(emotions.history().count(), 0);
    }

    #[test]
    fn apply_effects_counts_known_entries() {
        let mut emotions = no_decay();
        let effects = BTreeMap::from([
            ("压抑".to_string(), 8),
            ("执念".to_string(), 5),
            ("???".to_string(), 1),
        ]);

        assert_eq!(emotions.apply_effects(&effects, 0.0), 2);
        assert_eq!(emotions.value(EmotionKind::Depression), 8.0);
        assert_eq!(emotions.value(EmotionKind::Obsession), 5.0);
    }

    #[test]
    fn history_is_capped() {
        let mut emotions = no_decay();
        for i in 0..(HISTORY_LIMIT + 20) {
            emotions.update(EmotionKind::Anger, 1.0, i as f64);
        }

        assert_eq!(emotions.history().count(), HISTORY_LIMIT);
        assert_eq!(emotions.history().next().unwrap().timestamp, 20.0);
    }

    //=====================================================================
    // Summary Tests
    //=====================================================================

    #[test]
    fn fresh_summary_has_no_dominant_and_full_stability() {
        let summary = no_decay().summary();
        assert_eq!(summary.dominant, None);
        assert_eq!(summary.total, 0.0);
        assert_eq!(summary.stability, 1.0);
    }

    #[test]
    fn dominant_prefers_highest_then_display_order() {
        let mut emotions = no_decay();
        emotions.update(EmotionKind::Anger, 20.0, 0.0);
        emotions.update(EmotionKind::Determination, 20.0, 0.0);
        assert_eq!(emotions.summary().dominant, Some(EmotionKind::Anger));

        emotions.update(EmotionKind::Determination, 1.0, 0.0);
        assert_eq!(emotions.summary().dominant, Some(EmotionKind::Determination));
    }

    #[test]
    fn stability_drops_with_volatile_deltas() {
        let mut steady = no_decay();
        for _ in 0..10 {
            steady.update(EmotionKind::Anger, 5.0, 0.0);
        }
        assert_eq!(steady.summary().stability, 1.0);

        let mut volatile = no_decay();
        for i in 0..10 {
            let delta = if i % 2 == 0 { 30.0 } else { -30.0 };
            volatile.update(EmotionKind::Anger, delta, 0.0);
        }
        assert_eq!(volatile.summary().stability, 0.0);
    }

    #[test]
    fn effects_follow_thresholds_and_percentages() {
        let mut emotions = no_decay();
        emotions.set_value(EmotionKind::Obsession, 80.0);
        emotions.set_value(EmotionKind::Anger, 50.0);
        emotions.set_value(EmotionKind::Determination, 100.0);

        let effects = emotions.effects();

        assert!(effects.system_activation);
        assert!((effects.combat_bonus - 0.1).abs() < 1e-9);
        assert!((effects.growth_bonus - 0.25).abs() < 1e-9);
        assert_eq!(effects.recovery_penalty, 0.0);
    }

    //=====================================================================
    // Persistence Tests
    //=====================================================================

    #[test]
    fn snapshot_restore_preserves_values_and_history() {
        let mut emotions = no_decay();
        emotions.update(EmotionKind::Affection, 25.0, 3.0);
        emotions.update(EmotionKind::Determination, 15.0, 4.0);
        let snapshot = emotions.snapshot();

        let mut restored = no_decay();
        restored.restore(&snapshot, 0.0);

        assert_eq!(restored.value(EmotionKind::Affection), 25.0);
        assert_eq!(restored.history().count(), 2);
        assert_eq!(restored.snapshot(), snapshot);
    }

    #[test]
    fn reset_clears_everything() {
        let mut emotions = no_decay();
        emotions.update(EmotionKind::Obsession, 40.0, 0.0);

        emotions.reset();

        assert_eq!(emotions.summary().total, 0.0);
        assert_eq!(emotions.history().count(), 0);
    }
}
