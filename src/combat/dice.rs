//! Dice rolling
//!
//! Each die always consumes the same number of draws from the RNG (one for
//! magnitude, one more for accuracy when the die has it), so a seed replays
//! identically whatever the outcome.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::ability::Die;
use crate::combat::constants::ACCURACY_DIE;

/// Outcome of a single die
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DieRoll {
    pub sides: u32,
    pub value: u32,
    pub accuracy: Option<u32>,
    pub accuracy_roll: Option<u32>,
    pub hit: bool,
}

impl DieRoll {
    /// What this die adds to the raw magnitude
    pub fn contribution(&self) -> u32 {
        if self.hit {
            self.value
        } else {
            0
        }
    }
}

pub fn roll_die<R: Rng>(die: &Die, rng: &mut R) -> DieRoll {
    let sides = die.sides().max(1);
    let value = rng.gen_range(1..=sides);

    match die.accuracy() {
        None => DieRoll {
            sides,
            value,
            accuracy: None,
            accuracy_roll: None,
            hit: true,
        },
        Some(accuracy) => {
            let roll = rng.gen_range(1..=ACCURACY_DIE);
            DieRoll {
                sides,
                value,
                accuracy: Some(accuracy),
                accuracy_roll: Some(roll),
                hit: roll <= accuracy,
            }
        }
    }
}

/// Roll every die; returns the rolls and the summed magnitude of the hits
pub fn roll_dice<R: Rng>(dice: &[Die], rng: &mut R) -> (Vec<DieRoll>, u32) {
    let rolls: Vec<DieRoll> = dice.iter().map(|die| roll_die(die, rng)).collect();
    let raw = rolls.iter().map(DieRoll::contribution).sum();
    (rolls, raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_plain_die_in_bounds_and_always_hits() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..500 {
            let roll = roll_die(&Die::Plain { sides: 6 }, &mut rng);
            assert!((1..=6).contains(&roll.value));
            assert!(roll.hit);
            assert_eq!(roll.accuracy_roll, None);
        }
    }

    #[test]
    fn test_zero_accuracy_never_hits() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let die = Die::Weighted {
            damage: 10,
            accuracy: 0,
        };
        for _ in 0..200 {
            let roll = roll_die(&die, &mut rng);
            assert!(!roll.hit);
            assert_eq!(roll.contribution(), 0);
        }
    }

    #[test]
    fn test_full_accuracy_always_hits() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let die = Die::Weighted {
            damage: 10,
            accuracy: 100,
        };
        assert!((0..200).all(|_| roll_die(&die, &mut rng).hit));
    }

    #[test]
    fn test_same_seed_same_rolls() {
        let dice = [
            Die::Plain { sides: 8 },
            Die::Weighted {
                damage: 12,
                accuracy: 60,
            },
        ];
        let mut a = ChaCha8Rng::seed_from_u64(99);
        let mut b = ChaCha8Rng::seed_from_u64(99);
        assert_eq!(roll_dice(&dice, &mut a), roll_dice(&dice, &mut b));
    }

    #[test]
    fn test_raw_sums_only_hits() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let dice = [
            Die::Plain { sides: 4 },
            Die::Weighted {
                damage: 20,
                accuracy: 50,
            },
        ];
        for _ in 0..100 {
            let (rolls, raw) = roll_dice(&dice, &mut rng);
            let expected: u32 = rolls.iter().filter(|r| r.hit).map(|r| r.value).sum();
            assert_eq!(raw, expected);
        }
    }
}
