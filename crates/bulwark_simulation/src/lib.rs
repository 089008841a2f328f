//! BULWARK Simulation Core
//!
//! Headless ECS-симуляция защитной механики щита на Bevy 0.16:
//! - Shield state machine (Idle/Active/Breaking + timed recovery)
//! - Block damage mitigation + durability pool
//! - Movement penalty пока щит поднят
//! - Animator capability negotiation + presentation events
//!
//! Архитектура: ECS = strategic layer (state, rules, timers);
//! presentation (рендер, анимации, звук) — внешний слой за
//! capability interfaces (см. shield::animator + shield::events).

use bevy::prelude::*;

// Публичные модули
pub mod components;
pub mod logger;
pub mod shield;

// Re-export базовых компонентов для удобства
pub use components::*;
pub use shield::{
    AnimatorHandle, EquipShieldIntent, IncomingDamage, LowerShieldIntent, RaiseShieldIntent,
    Shield, ShieldBlocked, ShieldBroken, ShieldDefinitions, ShieldPlugin, ShieldRaised,
    ShieldRecovered, ShieldState, UnequipShieldIntent,
};

// Re-export logger surface
pub use logger::{init_logger, log, log_error, log_info, log_warning};

/// Главный plugin симуляции (объединяет все подсистемы)
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app
            // Fixed timestep 60Hz для simulation tick (легче считать интервалы)
            .insert_resource(Time::<Fixed>::from_hz(60.0))
            // Подсистемы (ECS strategic layer)
            .add_plugins(ShieldPlugin);
    }
}

/// Создаёт minimal Bevy App для headless симуляции
pub fn create_headless_app() -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(Time::<Fixed>::from_hz(60.0)); // 60Hz FixedUpdate

    app
}

/// Snapshot мира для сравнения детерминизма
/// (Debug-формат компонентов, отсортированный по Entity ID)
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
