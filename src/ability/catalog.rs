//! Ability catalog: templates keyed by name
//!
//! Ships with a built-in set and can load more from TOML:
//!
//! ```toml
//! [[ability]]
//! name = "Strike"
//! cost = { pos = 25 }
//! dice = [{ damage = 15, accuracy = 85 }]
//! range = { min = 1, max = 1 }
//! potency = { Physical = 1.0 }
//! damage_types = { Cut = 1.0 }
//! ```

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use crate::ability::template::{
    Ability, AbilityCost, AbilityRange, DamageType, Die, Potency, Stance,
};
use crate::core::error::{BattleError, Result};

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    ability: Vec<Ability>,
}

/// Shared, immutable ability templates
#[derive(Debug, Clone, Default)]
pub struct AbilityCatalog {
    abilities: BTreeMap<String, Arc<Ability>>,
}

impl AbilityCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The abilities every battle starts with
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        for ability in builtin_abilities() {
            // Built-ins are known-good; insert skips validation
            catalog
                .abilities
                .insert(ability.name.clone(), Arc::new(ability));
        }
        catalog
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut catalog = Self::new();
        catalog.extend_from_toml_str(content)?;
        Ok(catalog)
    }

    /// Add abilities from TOML; a name already present is replaced
    pub fn extend_from_toml_str(&mut self, content: &str) -> Result<()> {
        let file: CatalogFile = toml::from_str(content)?;
        for ability in file.ability {
            self.insert(ability)?;
        }
        Ok(())
    }

    pub fn insert(&mut self, ability: Ability) -> Result<Arc<Ability>> {
        ability.validate()?;
        let ability = Arc::new(ability);
        self.abilities
            .insert(ability.name.clone(), Arc::clone(&ability));
        Ok(ability)
    }

    pub fn get(&self, name: &str) -> Result<Arc<Ability>> {
        self.abilities
            .get(name)
            .cloned()
            .ok_or_else(|| BattleError::UnknownAbility(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.abilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.abilities.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.abilities.keys().map(String::as_str)
    }
}

fn builtin_abilities() -> Vec<Ability> {
    vec![
        Ability::new("Strike", AbilityRange::melee())
            .with_cost(AbilityCost::pos(25.0))
            .with_die(Die::Weighted {
                damage: 15,
                accuracy: 85,
            })
            .with_potency(Potency::Physical, 1.0)
            .with_damage_type(DamageType::Cut, 1.0),
        Ability::new("Heavy Blow", AbilityRange::melee())
            .with_cost(AbilityCost::pos(45.0))
            .with_die(Die::Weighted {
                damage: 12,
                accuracy: 70,
            })
            .with_die(Die::Weighted {
                damage: 12,
                accuracy: 70,
            })
            .with_potency(Potency::Physical, 1.0)
            .with_damage_type(DamageType::Blunt, 1.0),
        Ability::new("Lunge", AbilityRange::new(1, 2))
            .with_cost(AbilityCost::pos(30.0))
            .with_die(Die::Weighted {
                damage: 10,
                accuracy: 80,
            })
            .with_potency(Potency::Physical, 1.0)
            .with_damage_type(DamageType::Pierce, 1.0),
        Ability::new("Disengage", AbilityRange::melee())
            .with_cost(AbilityCost::pos(15.0))
            .with_die(Die::Plain { sides: 4 })
            .with_stance(Stance::Backward)
            .with_potency(Potency::Physical, 0.5)
            .with_damage_type(DamageType::Blunt, 1.0),
        Ability::new("Firebolt", AbilityRange::new(2, 5))
            .with_cost(AbilityCost::new(30.0, 15.0))
            .with_die(Die::Plain { sides: 10 })
            .with_die(Die::Plain { sides: 6 })
            .with_stance(Stance::Stationary)
            .with_potency(Potency::Elemental, 0.8)
            .with_potency(Potency::Arcane, 0.2)
            .with_damage_type(DamageType::Fire, 1.0),
        Ability::new("Frost Lance", AbilityRange::new(1, 4))
            .with_cost(AbilityCost::new(35.0, 20.0))
            .with_die(Die::Weighted {
                damage: 18,
                accuracy: 75,
            })
            .with_stance(Stance::Stationary)
            .with_potency(Potency::Elemental, 1.0)
            .with_damage_type(DamageType::Frost, 0.7)
            .with_damage_type(DamageType::Pierce, 0.3),
        Ability::new("Smite", AbilityRange::new(1, 3))
            .with_cost(AbilityCost::new(40.0, 25.0))
            .with_die(Die::Plain { sides: 12 })
            .with_potency(Potency::Divine, 1.0)
            .with_damage_type(DamageType::Holy, 1.0),
        Ability::new("Iron Skin", AbilityRange::new(0, 0)).passive(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ability::template::AbilityKind;

    #[test]
    fn test_builtin_contains_strike() {
        let catalog = AbilityCatalog::builtin();
        let strike = catalog.get("Strike").unwrap();
        assert_eq!(strike.cost.pos, 25.0);
        assert_eq!(strike.range, AbilityRange::melee());
        assert_eq!(
            strike.dice,
            vec![Die::Weighted {
                damage: 15,
                accuracy: 85
            }]
        );
    }

    #[test]
    fn test_builtins_are_valid() {
        let catalog = AbilityCatalog::builtin();
        for name in catalog.names() {
            assert!(catalog.get(name).unwrap().validate().is_ok(), "{name}");
        }
    }

    #[test]
    fn test_unknown_ability() {
        let catalog = AbilityCatalog::builtin();
        assert!(matches!(
            catalog.get("Meteor"),
            Err(BattleError::UnknownAbility(name)) if name == "Meteor"
        ));
    }

    #[test]
    fn test_load_from_toml() {
        let catalog = AbilityCatalog::from_toml_str(
            r#"
            [[ability]]
            name = "Shock"
            cost = { pos = 20, mana = 5 }
            dice = [{ sides = 8 }]
            range = { min = 1, max = 3 }
            potency = { Elemental = 1.0 }
            damage_types = { Lightning = 1.0 }

            [[ability]]
            name = "Thick Hide"
            kind = "Passive"
            range = { min = 0, max = 0 }
            "#,
        )
        .unwrap();

        assert_eq!(catalog.len(), 2);
        let shock = catalog.get("Shock").unwrap();
        assert_eq!(shock.cost.mana, 5.0);
        assert_eq!(shock.damage_types.get(&DamageType::Lightning), Some(&1.0));
        assert_eq!(catalog.get("Thick Hide").unwrap().kind, AbilityKind::Passive);
    }

    #[test]
    fn test_load_rejects_invalid_template() {
        let result = AbilityCatalog::from_toml_str(
            r#"
            [[ability]]
            name = "Backwards"
            range = { min = 4, max = 2 }
            "#,
        );
        assert!(matches!(result, Err(BattleError::Config(_))));
    }
}
