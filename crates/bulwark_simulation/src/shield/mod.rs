//! Shield system module (физический щит в руках актора)
//!
//! ECS ответственность:
//! - Game state: Shield durability, state machine (Idle/Active/Breaking)
//! - Rules: block damage reduction, timed recovery, movement penalty
//! - Events: intents от input/AI, presentation notifications для VFX
//!
//! Presentation ответственность (внешний слой, за capability interface):
//! - Animator backend (trait ShieldAnimator) — параметры резолвятся при bind
//! - VFX/SFX подписываются на ShieldRaised/ShieldBlocked/ShieldBroken/ShieldRecovered

use bevy::prelude::*;

pub mod animator;
pub mod components;
pub mod definitions;
pub mod events;
pub mod systems;

// Re-export основных типов
pub use animator::{
    AnimatorCall, AnimatorHandle, AnimatorParamId, AnimatorParamKind, RecordingAnimator,
    ShieldAnimationConfig, ShieldAnimator, ShieldAnimatorParams,
};
pub use components::{transition, BlockOutcome, Shield, ShieldInput, ShieldState};
pub use definitions::{ShieldDefinition, ShieldDefinitions, ShieldId};
pub use events::{
    EquipShieldIntent, IncomingDamage, LowerShieldIntent, RaiseShieldIntent, ShieldBlocked,
    ShieldBroken, ShieldRaised, ShieldRecovered, UnequipShieldIntent,
};

/// Shield Plugin
///
/// Регистрирует shield системы в FixedUpdate (сериализованный порядок,
/// movement multiplier мутируют только raise/lower — single writer).
///
/// Порядок выполнения:
/// 1. process_equip_shield — выдача щита из definitions
/// 2. bind_shield_animator — bind-time resolve animator параметров
/// 3. process_raise_intents / process_lower_intents — state + movement
/// 4. tick_shield_recovery — восстановление после поломки
/// 5. apply_shield_damage — блок / pass-through в Health
/// 6. process_unequip_shield — detach
///
/// Инвариант порядка: recovery стоит ДО damage — тик, сломавший щит,
/// взводит таймер, но не списывает с него; первый тик таймера происходит
/// на следующем FixedUpdate (Breaking наблюдаем минимум один тик).
///
/// Presentation (update_shield_animator) — в Update, каждый кадр.
pub struct ShieldPlugin;

impl Plugin for ShieldPlugin {
    fn build(&self, app: &mut App) {
        // Регистрация событий
        app.add_event::<EquipShieldIntent>()
            .add_event::<UnequipShieldIntent>()
            .add_event::<RaiseShieldIntent>()
            .add_event::<LowerShieldIntent>()
            .add_event::<IncomingDamage>()
            .add_event::<ShieldRaised>()
            .add_event::<ShieldBlocked>()
            .add_event::<ShieldBroken>()
            .add_event::<ShieldRecovered>();

        app.init_resource::<ShieldDefinitions>();

        app.add_systems(
            FixedUpdate,
            (
                systems::process_equip_shield,
                systems::bind_shield_animator,
                systems::process_raise_intents,
                systems::process_lower_intents,
                systems::tick_shield_recovery,
                systems::apply_shield_damage,
                systems::process_unequip_shield,
            )
                .chain(), // Последовательное выполнение
        );

        // Presentation refresh — каждый кадр, только чтение состояния
        app.add_systems(Update, systems::update_shield_animator);
    }
}
