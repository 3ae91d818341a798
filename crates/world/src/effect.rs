//! Status effects.
//!
//! The automation only applies and removes effects; the host counts them
//! down. [`StatusEffects`] is the per-entity collection `SimWorld` ages each
//! tick.

use serde::{Deserialize, Serialize};

/// Status effect types that can be applied to entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusEffectType {
    /// Makes entity invisible
    Invisibility,
    /// Increases movement speed (20% per level)
    Speed,
    /// Decreases movement speed (15% per level)
    Slowness,
    /// Allows seeing in the dark
    NightVision,
    /// Restores health over time
    Regeneration,
}

impl StatusEffectType {
    /// Get the maximum amplifier (level) for this effect.
    /// Level 1 = amplifier 0, Level 2 = amplifier 1, etc.
    pub fn max_amplifier(&self) -> u8 {
        match self {
            StatusEffectType::Invisibility => 0,
            StatusEffectType::Speed => 2,
            StatusEffectType::Slowness => 3,
            StatusEffectType::NightVision => 0,
            StatusEffectType::Regeneration => 1,
        }
    }

    /// Host effect name used in commands (`invisibility`).
    pub fn name(&self) -> &'static str {
        match self {
            StatusEffectType::Invisibility => "invisibility",
            StatusEffectType::Speed => "speed",
            StatusEffectType::Slowness => "slowness",
            StatusEffectType::NightVision => "night_vision",
            StatusEffectType::Regeneration => "regeneration",
        }
    }
}

/// An active status effect with duration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatusEffect {
    /// The type of effect.
    pub effect_type: StatusEffectType,
    /// The amplifier (level - 1). 0 = Level I, 1 = Level II, etc.
    pub amplifier: u8,
    /// Duration in game ticks (20 ticks = 1 second).
    pub duration_ticks: u32,
    /// Whether particles should be shown.
    pub show_particles: bool,
}

impl StatusEffect {
    /// Create a new status effect.
    pub fn new(effect_type: StatusEffectType, amplifier: u8, duration_ticks: u32) -> Self {
        Self {
            effect_type,
            amplifier: amplifier.min(effect_type.max_amplifier()),
            duration_ticks,
            show_particles: true,
        }
    }

    /// Same effect with particles suppressed.
    pub fn without_particles(mut self) -> Self {
        self.show_particles = false;
        self
    }

    /// Get the effect level (1-based).
    pub fn level(&self) -> u8 {
        self.amplifier + 1
    }

    /// Update the effect, reducing duration. Returns true if effect expired.
    pub fn tick(&mut self) -> bool {
        self.duration_ticks = self.duration_ticks.saturating_sub(1);
        self.duration_ticks == 0
    }
}

/// Collection of active status effects on an entity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusEffects {
    /// Active effects (only one of each type allowed).
    effects: Vec<StatusEffect>,
}

impl StatusEffects {
    /// Create empty status effects.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or upgrade a status effect.
    /// If an effect of the same type exists:
    /// - If new effect has higher amplifier, replace it
    /// - If same amplifier, keep the longer duration
    pub fn add(&mut self, effect: StatusEffect) {
        if let Some(existing) = self
            .effects
            .iter_mut()
            .find(|e| e.effect_type == effect.effect_type)
        {
            if effect.amplifier > existing.amplifier {
                *existing = effect;
            } else if effect.amplifier == existing.amplifier
                && effect.duration_ticks > existing.duration_ticks
            {
                existing.duration_ticks = effect.duration_ticks;
                existing.show_particles = effect.show_particles;
            }
        } else {
            self.effects.push(effect);
        }
    }

    /// Remove an effect by type. Returns whether it was active.
    pub fn remove(&mut self, effect_type: StatusEffectType) -> bool {
        let before = self.effects.len();
        self.effects.retain(|e| e.effect_type != effect_type);
        self.effects.len() != before
    }

    /// Check if an effect is active.
    pub fn has(&self, effect_type: StatusEffectType) -> bool {
        self.effects.iter().any(|e| e.effect_type == effect_type)
    }

    /// Get an effect by type.
    pub fn get(&self, effect_type: StatusEffectType) -> Option<&StatusEffect> {
        self.effects.iter().find(|e| e.effect_type == effect_type)
    }

    /// Update all effects, removing expired ones.
    /// Returns a list of effects that expired this tick.
    pub fn tick(&mut self) -> Vec<StatusEffectType> {
        let mut expired = Vec::new();
        self.effects.retain_mut(|effect| {
            if effect.tick() {
                expired.push(effect.effect_type);
                false
            } else {
                true
            }
        });
        expired
    }

    /// Get iterator over active effects.
    pub fn iter(&self) -> impl Iterator<Item = &StatusEffect> {
        self.effects.iter()
    }

    /// Check if any effects are active.
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}
