//! Damage resolution and the dice-scaled power modifier.

use crate::state::Character;

// ============================================================================
// Damage Type
// ============================================================================

/// Damage type for resistances and damage calculation.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display, strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DamageType {
    Normal,
    Fire,
    Ice,
    Cut,
    Blunt,
}

// ============================================================================
// Damage Resolution
// ============================================================================

/// Reduces raw damage by a fractional resistance and rounds to whole points.
///
/// # Formula
///
/// ```text
/// effective = round(raw * (100 - resistance * 100) / 100)
/// ```
///
/// clamped to >= 0. Monotonic in `raw`; a resistance of 1.0 always yields 0.
pub fn effective_damage(raw: f32, resistance: f32) -> i32 {
    let scaled = raw * (100.0 - resistance * 100.0) / 100.0;
    (scaled.round() as i32).max(0)
}

/// Applies typed damage to a unit and returns the effective amount.
///
/// Health is clamped at 0 and never healed through this path. Callers watch
/// for `current_health == 0` to notify the turn controller.
pub fn apply_damage(unit: &mut Character, raw: f32, damage_type: DamageType) -> i32 {
    let resistance = unit.resistances.resistance_for(damage_type);
    let effective = effective_damage(raw, resistance);
    unit.current_health = (unit.current_health - effective).max(0);
    effective
}

// ============================================================================
// Dice-Scaled Power Modifier
// ============================================================================

/// Multiplier applied to a skill's power from a two-die roll (total 2..=12).
///
/// 12 is a critical (x2.0), 9..=11 a strong roll (x1.5), 3..=8 neutral
/// (x1.0) and snake eyes a fumble (x0.8).
pub fn dice_multiplier(roll: u8) -> f32 {
    match roll {
        12 => 2.0,
        9..=11 => 1.5,
        3..=8 => 1.0,
        _ => 0.8,
    }
}

// ============================================================================
// Dice Oracle
// ============================================================================

/// Randomness provider for skill rolls. The core only consumes the combined
/// total; the rolling animation is a presentation concern.
pub trait DiceOracle {
    /// Rolls two six-sided dice, each 1..=6.
    fn roll(&mut self) -> (u8, u8);
}

/// Deterministic dice backed by a PCG-XSH-RR generator.
///
/// Same seed, same roll sequence; small state, no allocation. Suitable for
/// tests and single-session replay.
#[derive(Clone, Copy, Debug)]
pub struct PcgDice {
    state: u64,
}

impl PcgDice {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    pub fn new(seed: u64) -> Self {
        let mut dice = Self { state: 0 };
        dice.state = Self::step(seed.wrapping_add(Self::INCREMENT));
        dice
    }

    #[inline]
    fn step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    fn next_u32(&mut self) -> u32 {
        let state = self.state;
        self.state = Self::step(state);
        // XSH-RR output permutation.
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl DiceOracle for PcgDice {
    fn roll(&mut self) -> (u8, u8) {
        let d1 = (self.next_u32() % 6 + 1) as u8;
        let d2 = (self.next_u32() % 6 + 1) as u8;
        (d1, d2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{EntityId, Position, Resistances, Team};

    #[test]
    fn resistance_scales_and_rounds() {
        // 10 raw against 20% fire resistance -> round(10 * 0.8) = 8.
        assert_eq!(effective_damage(10.0, 0.2), 8);
        assert_eq!(effective_damage(10.0, 0.0), 10);
        assert_eq!(effective_damage(10.0, 1.0), 0);
        // Rounds to nearest, not down.
        assert_eq!(effective_damage(10.0, 0.25), 8);
        assert_eq!(effective_damage(10.0, 0.33), 7);
    }

    #[test]
    fn effective_damage_is_monotonic_in_raw() {
        let mut last = 0;
        for raw in 0..200 {
            let damage = effective_damage(raw as f32, 0.35);
            assert!(damage >= last);
            last = damage;
        }
    }

    #[test]
    fn apply_damage_clamps_health_at_zero() {
        let mut unit = Character::new(EntityId(1), Team::Enemy, Position::ORIGIN)
            .with_health(15)
            .with_resistances(Resistances::new().with(DamageType::Fire, 0.2));

        let dealt = apply_damage(&mut unit, 10.0, DamageType::Fire);
        assert_eq!(dealt, 8);
        assert_eq!(unit.current_health, 7);

        let dealt = apply_damage(&mut unit, 100.0, DamageType::Normal);
        assert_eq!(dealt, 100);
        assert_eq!(unit.current_health, 0);
        assert!(!unit.is_alive());
    }

    #[test]
    fn dice_multiplier_table() {
        assert_eq!(dice_multiplier(12), 2.0);
        for roll in 9..=11 {
            assert_eq!(dice_multiplier(roll), 1.5);
        }
        for roll in 3..=8 {
            assert_eq!(dice_multiplier(roll), 1.0);
        }
        assert_eq!(dice_multiplier(2), 0.8);
    }

    #[test]
    fn pcg_dice_are_deterministic_and_in_range() {
        let mut a = PcgDice::new(42);
        let mut b = PcgDice::new(42);
        for _ in 0..100 {
            let roll = a.roll();
            assert_eq!(roll, b.roll());
            assert!((1..=6).contains(&roll.0));
            assert!((1..=6).contains(&roll.1));
        }
        let mut c = PcgDice::new(43);
        let seq_a: Vec<_> = (0..10).map(|_| a.roll()).collect();
        let seq_c: Vec<_> = (0..10).map(|_| c.roll()).collect();
        assert_ne!(seq_a, seq_c);
    }
}
