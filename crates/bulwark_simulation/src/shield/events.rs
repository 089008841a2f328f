//! Shield events: intents (вход от input/AI layer) + presentation notifications
//!
//! # Architecture
//!
//! **Intents** (caller → ECS):
//! - `EquipShieldIntent` / `UnequipShieldIntent` — lifecycle (bind/detach)
//! - `RaiseShieldIntent` / `LowerShieldIntent` — поднять/опустить
//! - `IncomingDamage` — удар по актору (сначала предлагается щиту)
//!
//! **Notifications** (ECS → presentation layer):
//! `ShieldRaised` / `ShieldBlocked` / `ShieldBroken` / `ShieldRecovered` —
//! fire-and-forget хуки для VFX/SFX. Отсутствие подписчиков — валидная
//! конфигурация (events просто истекают).

use bevy::prelude::*;

use super::definitions::ShieldId;

// ============================================================================
// Intents
// ============================================================================

/// Выдать актору щит из `ShieldDefinitions` (повторный equip заменяет старый)
#[derive(Event, Clone, Debug)]
pub struct EquipShieldIntent {
    pub entity: Entity,
    pub shield: ShieldId,
}

/// Забрать щит у актора
///
/// # Flow
/// 1. Если щит поднят — вернуть владельцу movement multiplier
/// 2. Удалить Shield + ShieldAnimatorParams
/// 3. Незавершённый recovery умирает вместе с компонентом
#[derive(Event, Clone, Debug)]
pub struct UnequipShieldIntent {
    pub entity: Entity,
}

/// Поднять щит (отклоняется пока щит сломан)
#[derive(Event, Clone, Debug)]
pub struct RaiseShieldIntent {
    pub entity: Entity,
}

/// Опустить щит
#[derive(Event, Clone, Debug)]
pub struct LowerShieldIntent {
    pub entity: Entity,
}

/// Удар по актору (combat layer → ECS)
///
/// Сначала предлагается щиту цели; если щит не Active — полный урон
/// падает в Health.
#[derive(Event, Clone, Debug)]
pub struct IncomingDamage {
    pub attacker: Entity,
    pub target: Entity,
    pub amount: f32,
}

// ============================================================================
// Presentation notifications
// ============================================================================

/// Щит поднят (raise feedback)
#[derive(Event, Clone, Debug)]
pub struct ShieldRaised {
    pub entity: Entity,
}

/// Щит принял удар (block feedback)
#[derive(Event, Clone, Debug)]
pub struct ShieldBlocked {
    pub entity: Entity,
    /// Сколько durability списано
    pub absorbed: f32,
    /// Остаток durability (может быть ≤ 0 если этот удар доломал щит)
    pub remaining_durability: f32,
}

/// Щит сломан (break feedback)
#[derive(Event, Clone, Debug)]
pub struct ShieldBroken {
    pub entity: Entity,
}

/// Щит восстановился после поломки
#[derive(Event, Clone, Debug)]
pub struct ShieldRecovered {
    pub entity: Entity,
}
