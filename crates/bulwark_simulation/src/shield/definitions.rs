//! Shield definitions — статические blueprints экипируемых щитов
//!
//! **ShieldDefinition** — immutable данные (durability, тайминги, animator
//! имена), хранятся в `ShieldDefinitions` resource (HashMap lookup).
//! Создаются hardcoded в `ShieldDefinitions::default()` (позже из data files —
//! serde derive уже на месте).
//!
//! **Shield** (runtime компонент) создаётся из definition через `instantiate()`.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::animator::ShieldAnimationConfig;
use super::components::Shield;

/// Shield identifier (unique string ID)
///
/// # Examples
/// - "buckler"
/// - "kite_shield"
/// - "tower_shield"
#[derive(Clone, Debug, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
pub struct ShieldId(pub String);

impl From<&str> for ShieldId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Static shield definition (blueprint)
#[derive(Clone, Debug, Reflect, Serialize, Deserialize)]
pub struct ShieldDefinition {
    pub id: ShieldId,
    /// Локализованное название
    pub name: String,
    pub max_durability: f32,
    pub recovery_time: f32,
    /// Доля поглощаемого урона при блоке (0-1)
    pub block_damage_reduction: f32,
    /// Множитель скорости владельца пока щит поднят
    pub movement_multiplier: f32,
    pub modify_movement_while_blocking: bool,
    pub animation: ShieldAnimationConfig,
}

impl ShieldDefinition {
    /// Runtime компонент: Idle, полная durability
    pub fn instantiate(&self) -> Shield {
        let mut shield = Shield::new(self.name.clone(), self.max_durability);
        shield.recovery_time = self.recovery_time;
        shield.block_damage_reduction = self.block_damage_reduction;
        shield.movement_multiplier = self.movement_multiplier;
        shield.modify_movement_while_blocking = self.modify_movement_while_blocking;
        shield.animation = self.animation.clone();
        shield
    }
}

/// Реестр definitions (Resource, HashMap lookup)
#[derive(Resource, Debug)]
pub struct ShieldDefinitions {
    definitions: HashMap<ShieldId, ShieldDefinition>,
}

impl ShieldDefinitions {
    pub fn get(&self, id: &ShieldId) -> Option<&ShieldDefinition> {
        self.definitions.get(id)
    }

    pub fn insert(&mut self, definition: ShieldDefinition) {
        self.definitions.insert(definition.id.clone(), definition);
    }
}

impl Default for ShieldDefinitions {
    fn default() -> Self {
        let mut registry = Self {
            definitions: HashMap::new(),
        };

        // Лёгкий щит: быстрый recovery, почти не замедляет
        registry.insert(ShieldDefinition {
            id: "buckler".into(),
            name: "Buckler".to_string(),
            max_durability: 60.0,
            recovery_time: 3.0,
            block_damage_reduction: 0.35,
            movement_multiplier: 0.8,
            modify_movement_while_blocking: true,
            animation: ShieldAnimationConfig::default(),
        });

        // Средний щит (baseline)
        registry.insert(ShieldDefinition {
            id: "kite_shield".into(),
            name: "Kite Shield".to_string(),
            max_durability: 100.0,
            recovery_time: 5.0,
            block_damage_reduction: 0.5,
            movement_multiplier: 0.5,
            modify_movement_while_blocking: true,
            animation: ShieldAnimationConfig::default(),
        });

        // Тяжёлый щит: держит много, но сильно замедляет и долго чинится
        registry.insert(ShieldDefinition {
            id: "tower_shield".into(),
            name: "Tower Shield".to_string(),
            max_durability: 200.0,
            recovery_time: 8.0,
            block_damage_reduction: 0.7,
            movement_multiplier: 0.4,
            modify_movement_while_blocking: true,
            animation: ShieldAnimationConfig::default(),
        });

        registry
    }
}
