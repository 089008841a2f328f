//! Shield system implementations
//!
//! # Systems (FixedUpdate, chained — сериализованный порядок вызовов)
//!
//! **Lifecycle:**
//! - `process_equip_shield` — выдать щит из definitions
//! - `bind_shield_animator` — bind-time resolve animator параметров
//! - `process_unequip_shield` — забрать щит (вернуть movement multiplier)
//!
//! **Mechanics:**
//! - `process_raise_intents` / `process_lower_intents` — state + movement
//! - `tick_shield_recovery` — отложенное восстановление после поломки
//! - `apply_shield_damage` — блок урона / pass-through в Health
//!
//! Recovery стоит в chain ДО damage: тик поломки взводит таймер, но не
//! списывает с него (recovery_time отсчитывается с тика ПОСЛЕ поломки).
//!
//! **Presentation (Update, каждый кадр):**
//! - `update_shield_animator` — пишет ShieldUp bool в animator backend
//!
//! Порядок side effects при raise/block/break фиксирован: state change →
//! presentation event → animator → movement.

use bevy::prelude::*;

use crate::components::{Health, MovementSpeed};
use crate::logger::{log, log_error, log_warning};

use super::animator::{AnimatorHandle, ShieldAnimatorParams};
use super::components::Shield;
use super::definitions::ShieldDefinitions;
use super::events::*;

// ============================================================================
// Lifecycle
// ============================================================================

/// Process equip shield intents
///
/// Повторный equip заменяет старый щит: remove + insert, чтобы
/// `bind_shield_animator` увидел Added<Shield> и перерезолвил параметры.
pub fn process_equip_shield(
    mut commands: Commands,
    mut events: EventReader<EquipShieldIntent>,
    definitions: Res<ShieldDefinitions>,
) {
    for intent in events.read() {
        let Some(def) = definitions.get(&intent.shield) else {
            log_error(&format!("ShieldDefinition not found: {:?}", intent.shield));
            continue;
        };

        let Ok(mut entity) = commands.get_entity(intent.entity) else {
            log_warning(&format!(
                "EquipShieldIntent: entity {:?} despawned",
                intent.entity
            ));
            continue;
        };

        entity
            .remove::<Shield>()
            .remove::<ShieldAnimatorParams>()
            .insert(def.instantiate());

        log(&format!(
            "🛡️ Equipped shield '{}' on {:?}",
            def.name, intent.entity
        ));
    }
}

/// System: bind-time animator parameter negotiation
///
/// Запускается когда у entity появился Shield или AnimatorHandle:
/// опрашивает backend по трём именам из конфига щита и кэширует результат
/// в ShieldAnimatorParams. Дальше кэш только читается — повторных
/// запросов к backend нет.
///
/// Актор без AnimatorHandle получает пустой кэш (все gates закрыты).
pub fn bind_shield_animator(
    mut commands: Commands,
    shields: Query<
        (Entity, &Shield, Option<&AnimatorHandle>),
        Or<(Added<Shield>, Added<AnimatorHandle>)>,
    >,
) {
    for (entity, shield, animator) in shields.iter() {
        let params = match animator {
            Some(handle) => ShieldAnimatorParams::resolve(handle.0.as_ref(), &shield.animation),
            None => ShieldAnimatorParams::default(),
        };

        commands.entity(entity).insert(params);

        log(&format!(
            "🛡️ Shield '{}' bound: up={:?} block={:?} break={:?}",
            shield.name, params.up, params.block, params.break_param
        ));
    }
}

/// Process unequip shield intents
pub fn process_unequip_shield(
    mut commands: Commands,
    mut events: EventReader<UnequipShieldIntent>,
    mut shields: Query<(&Shield, Option<&mut MovementSpeed>)>,
) {
    for intent in events.read() {
        let Ok((shield, movement)) = shields.get_mut(intent.entity) else {
            continue;
        };

        // Вернуть multiplier если raise-время перезапись ещё жива:
        // щит поднят ИЛИ сломан в поднятом положении (break движение не возвращал)
        if (shield.is_up() || shield.is_broken()) && shield.modify_movement_while_blocking {
            if let Some(mut speed) = movement {
                speed.multiplier = shield.saved_movement_multiplier;
            }
        }

        commands
            .entity(intent.entity)
            .remove::<Shield>()
            .remove::<ShieldAnimatorParams>();

        // Незавершённый recovery умирает вместе с компонентом —
        // tick_shield_recovery просто перестаёт видеть entity.
        log(&format!("🗑️ Unequipped shield '{}'", shield.name));
    }
}

// ============================================================================
// Raise / Lower
// ============================================================================

/// Process raise shield intents
///
/// Guard: сломанный щит поднять нельзя (logged no-op, никаких side effects).
/// Порядок side effects: state → ShieldRaised event → movement snapshot.
pub fn process_raise_intents(
    mut intents: EventReader<RaiseShieldIntent>,
    mut raised_events: EventWriter<ShieldRaised>,
    mut shields: Query<(&mut Shield, Option<&mut MovementSpeed>)>,
) {
    for intent in intents.read() {
        let Ok((mut shield, movement)) = shields.get_mut(intent.entity) else {
            log_warning(&format!(
                "RaiseShieldIntent: entity {:?} has no Shield",
                intent.entity
            ));
            continue;
        };

        if !shield.raise() {
            log(&format!("🛡️ Shield '{}' is broken, cannot raise", shield.name));
            continue;
        }

        raised_events.write(ShieldRaised {
            entity: intent.entity,
        });

        if shield.modify_movement_while_blocking {
            if let Some(mut speed) = movement {
                shield.saved_movement_multiplier = speed.multiplier;
                speed.multiplier = shield.movement_multiplier;
            }
        }

        log(&format!("🛡️ Shield '{}' raised", shield.name));
    }
}

/// Process lower shield intents
///
/// Guard: Breaking отклоняется (щит и так не "поднят").
pub fn process_lower_intents(
    mut intents: EventReader<LowerShieldIntent>,
    mut shields: Query<(&mut Shield, Option<&mut MovementSpeed>)>,
) {
    for intent in intents.read() {
        let Ok((mut shield, movement)) = shields.get_mut(intent.entity) else {
            log_warning(&format!(
                "LowerShieldIntent: entity {:?} has no Shield",
                intent.entity
            ));
            continue;
        };

        if !shield.lower() {
            log(&format!("🛡️ Shield '{}' is broken, cannot lower", shield.name));
            continue;
        }

        if shield.modify_movement_while_blocking {
            if let Some(mut speed) = movement {
                speed.multiplier = shield.saved_movement_multiplier;
            }
        }

        log(&format!("🛡️ Shield '{}' lowered", shield.name));
    }
}

// ============================================================================
// Damage
// ============================================================================

/// System: обработка IncomingDamage событий
///
/// 1. Предлагаем урон щиту цели (absorb — только при Active)
/// 2. Принят: ShieldBlocked event + block trigger (gated кэшем);
///    если удар доломал щит — ShieldBroken + break trigger
///    (recovery таймер взведён внутри absorb)
/// 3. Не принят: полный урон падает в Health
pub fn apply_shield_damage(
    mut damage_events: EventReader<IncomingDamage>,
    mut blocked_events: EventWriter<ShieldBlocked>,
    mut broken_events: EventWriter<ShieldBroken>,
    mut targets: Query<(
        Option<&mut Shield>,
        Option<&ShieldAnimatorParams>,
        Option<&mut AnimatorHandle>,
        Option<&mut Health>,
    )>,
) {
    for damage in damage_events.read() {
        let Ok((shield, params, mut animator, health)) = targets.get_mut(damage.target) else {
            log_warning(&format!(
                "IncomingDamage: target {:?} despawned",
                damage.target
            ));
            continue;
        };

        let outcome = shield.and_then(|mut s| {
            let outcome = s.absorb(damage.amount)?;

            // Порядок как при block: event → animator; break — строго после
            blocked_events.write(ShieldBlocked {
                entity: damage.target,
                absorbed: outcome.absorbed,
                remaining_durability: s.current_durability,
            });
            if let (Some(handle), Some(params)) = (animator.as_mut(), params) {
                if let Some(id) = params.block {
                    handle.0.set_trigger(id);
                }
            }

            if outcome.broke {
                broken_events.write(ShieldBroken {
                    entity: damage.target,
                });
                if let (Some(handle), Some(params)) = (animator.as_mut(), params) {
                    if let Some(id) = params.break_param {
                        handle.0.set_trigger(id);
                    }
                }
                log(&format!("🛡️💥 Shield broke on {:?}", damage.target));
            }

            Some(outcome)
        });

        if outcome.is_some() {
            continue; // Урон полностью принят щитом
        }

        // Щит не Active (или его нет) — урон проходит в Health
        if let Some(mut hp) = health {
            let amount = damage.amount.round() as u32;
            hp.take_damage(amount);
            log(&format!(
                "💥 {:?} hit {:?} for {} (HP: {})",
                damage.attacker, damage.target, amount, hp.current
            ));
        }
    }
}

// ============================================================================
// Recovery
// ============================================================================

/// System: отложенное восстановление сломанных щитов
///
/// Тикает recovery таймер каждого Breaking щита фиксированной дельтой;
/// по истечении — durability = max, state = Idle, ShieldRecovered event.
///
/// В chain стоит ДО apply_shield_damage: таймер, взведённый поломкой,
/// первый раз тикает на следующем FixedUpdate. Даже recovery_time = 0
/// оставляет Breaking наблюдаемым один тик.
///
/// Это единственный выход из Breaking. Отмена не нужна: despawn/unequip
/// убирает компонент, и система просто перестаёт его видеть (никаких
/// висящих таймеров на мёртвых entity).
pub fn tick_shield_recovery(
    time: Res<Time<Fixed>>,
    mut recovered_events: EventWriter<ShieldRecovered>,
    mut shields: Query<(Entity, &mut Shield)>,
) {
    let delta = time.delta_secs();

    for (entity, mut shield) in shields.iter_mut() {
        if shield.tick_recovery(delta) {
            recovered_events.write(ShieldRecovered { entity });
            log(&format!(
                "🛡️ Shield '{}' recovered ({}/{})",
                shield.name, shield.current_durability, shield.max_durability
            ));
        }
    }
}

// ============================================================================
// Presentation
// ============================================================================

/// System: per-frame animator refresh (ShieldUp bool)
///
/// Только чтение состояния, никаких мутаций Shield — безопасно на любой
/// частоте. Gate: up параметр не распознан при bind → молча пропускаем.
pub fn update_shield_animator(
    mut shields: Query<(&Shield, &ShieldAnimatorParams, &mut AnimatorHandle)>,
) {
    for (shield, params, mut handle) in shields.iter_mut() {
        let Some(id) = params.up else {
            continue;
        };
        handle.0.set_bool(id, shield.is_up());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Actor;
    use crate::shield::animator::{
        AnimatorCall, AnimatorParamKind, RecordingAnimator, ShieldAnimator,
    };
    use crate::shield::components::ShieldState;

    fn test_app() -> App {
        let mut app = App::new();
        app.add_event::<EquipShieldIntent>()
            .add_event::<UnequipShieldIntent>()
            .add_event::<RaiseShieldIntent>()
            .add_event::<LowerShieldIntent>()
            .add_event::<IncomingDamage>()
            .add_event::<ShieldRaised>()
            .add_event::<ShieldBlocked>()
            .add_event::<ShieldBroken>()
            .add_event::<ShieldRecovered>()
            .init_resource::<ShieldDefinitions>();

        // Без tick_shield_recovery — таймерные тесты живут в components.rs
        // и в tests/shield_integration.rs
        app.add_systems(
            Update,
            (
                process_equip_shield,
                bind_shield_animator,
                process_raise_intents,
                process_lower_intents,
                apply_shield_damage,
                process_unequip_shield,
            )
                .chain(),
        );
        app
    }

    #[test]
    fn test_raise_applies_movement_multiplier() {
        let mut app = test_app();
        let entity = app
            .world_mut()
            .spawn((Actor::default(), Shield::new("Test", 100.0)))
            .id();
        app.update();

        app.world_mut().send_event(RaiseShieldIntent { entity });
        app.update();

        let shield = app.world().get::<Shield>(entity).unwrap();
        assert_eq!(shield.state, ShieldState::Active);
        // Default multiplier 1.0 снапшотнут, подменён на shield.movement_multiplier
        assert_eq!(shield.saved_movement_multiplier, 1.0);

        let speed = app.world().get::<MovementSpeed>(entity).unwrap();
        assert_eq!(speed.multiplier, 0.5);
    }

    #[test]
    fn test_lower_restores_movement_multiplier() {
        let mut app = test_app();
        let entity = app
            .world_mut()
            .spawn((Actor::default(), Shield::new("Test", 100.0)))
            .id();
        app.update();

        app.world_mut().send_event(RaiseShieldIntent { entity });
        app.update();
        app.world_mut().send_event(LowerShieldIntent { entity });
        app.update();

        let shield = app.world().get::<Shield>(entity).unwrap();
        assert_eq!(shield.state, ShieldState::Idle);
        let speed = app.world().get::<MovementSpeed>(entity).unwrap();
        assert_eq!(speed.multiplier, 1.0);
    }

    #[test]
    fn test_movement_untouched_when_disabled() {
        let mut app = test_app();
        let mut shield = Shield::new("Test", 100.0);
        shield.modify_movement_while_blocking = false;

        let entity = app.world_mut().spawn((Actor::default(), shield)).id();
        app.update();

        app.world_mut().send_event(RaiseShieldIntent { entity });
        app.update();

        let speed = app.world().get::<MovementSpeed>(entity).unwrap();
        assert_eq!(speed.multiplier, 1.0);
    }

    #[test]
    fn test_equip_from_definitions_and_bind() {
        let mut app = test_app();
        let animator = RecordingAnimator::with_parameters(&[
            ("ShieldUp", AnimatorParamKind::Bool),
            ("ShieldBlock", AnimatorParamKind::Trigger),
        ]);
        let entity = app
            .world_mut()
            .spawn((Actor::default(), AnimatorHandle(Box::new(animator))))
            .id();
        app.update();

        app.world_mut().send_event(EquipShieldIntent {
            entity,
            shield: "kite_shield".into(),
        });
        app.update(); // sync point в chain: equip команды применяются до bind

        let shield = app.world().get::<Shield>(entity).unwrap();
        assert_eq!(shield.name, "Kite Shield");

        let params = app.world().get::<ShieldAnimatorParams>(entity).unwrap();
        assert!(params.up.is_some());
        assert!(params.block.is_some());
        assert!(params.break_param.is_none()); // ShieldBreak не объявлен
    }

    #[test]
    fn test_damage_passthrough_to_health_when_idle() {
        let mut app = test_app();
        let entity = app
            .world_mut()
            .spawn((Actor::default(), Shield::new("Test", 100.0)))
            .id();
        app.update();

        app.world_mut().send_event(IncomingDamage {
            attacker: Entity::PLACEHOLDER,
            target: entity,
            amount: 40.0,
        });
        app.update();

        let shield = app.world().get::<Shield>(entity).unwrap();
        assert_eq!(shield.current_durability, 100.0); // Щит не тронут

        let health = app.world().get::<Health>(entity).unwrap();
        assert_eq!(health.current, 60);
    }

    #[test]
    fn test_block_trigger_gated_by_cache() {
        let mut app = test_app();
        // Backend знает только ShieldUp — block trigger должен пропускаться
        let animator =
            RecordingAnimator::with_parameters(&[("ShieldUp", AnimatorParamKind::Bool)]);
        let calls = animator.calls_log();

        let entity = app
            .world_mut()
            .spawn((
                Actor::default(),
                Shield::new("Test", 100.0),
                AnimatorHandle(Box::new(animator)),
            ))
            .id();
        app.update();

        app.world_mut().send_event(RaiseShieldIntent { entity });
        app.update();
        app.world_mut().send_event(IncomingDamage {
            attacker: Entity::PLACEHOLDER,
            target: entity,
            amount: 30.0,
        });
        app.update();

        // Durability списана полностью, backend не получил ни одного вызова
        let shield = app.world().get::<Shield>(entity).unwrap();
        assert_eq!(shield.current_durability, 85.0);
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_unequip_restores_movement() {
        let mut app = test_app();
        let entity = app
            .world_mut()
            .spawn((Actor::default(), Shield::new("Test", 100.0)))
            .id();
        app.update();

        app.world_mut().send_event(RaiseShieldIntent { entity });
        app.update();
        app.world_mut().send_event(UnequipShieldIntent { entity });
        app.update();

        assert!(app.world().get::<Shield>(entity).is_none());
        let speed = app.world().get::<MovementSpeed>(entity).unwrap();
        assert_eq!(speed.multiplier, 1.0);
    }

    #[test]
    fn test_unequip_restores_movement_after_break() {
        let mut app = test_app();
        let entity = app
            .world_mut()
            .spawn((Actor::default(), Shield::new("Test", 100.0)))
            .id();
        app.update();

        app.world_mut().send_event(RaiseShieldIntent { entity });
        app.update();
        app.world_mut().send_event(IncomingDamage {
            attacker: Entity::PLACEHOLDER,
            target: entity,
            amount: 500.0, // ломаем щит
        });
        app.update();

        // Break движение не возвращает — владелец всё ещё замедлен
        assert_eq!(
            app.world().get::<Shield>(entity).unwrap().state,
            ShieldState::Breaking
        );
        assert_eq!(
            app.world().get::<MovementSpeed>(entity).unwrap().multiplier,
            0.5
        );

        // Unequip во время Breaking обязан вернуть multiplier:
        // компонента больше не будет, откатывать некому
        app.world_mut().send_event(UnequipShieldIntent { entity });
        app.update();

        assert!(app.world().get::<Shield>(entity).is_none());
        let speed = app.world().get::<MovementSpeed>(entity).unwrap();
        assert_eq!(speed.multiplier, 1.0);
    }

    #[test]
    fn test_update_shield_animator_writes_up_bool() {
        let animator = RecordingAnimator::with_parameters(&[
            ("ShieldUp", AnimatorParamKind::Bool),
        ]);
        let calls = animator.calls_log();
        let up_id = animator
            .find_parameter("ShieldUp", AnimatorParamKind::Bool)
            .unwrap();

        let mut app = App::new();
        app.add_systems(Update, update_shield_animator);

        let mut shield = Shield::new("Test", 100.0);
        shield.raise();
        let params = ShieldAnimatorParams {
            up: Some(up_id),
            ..Default::default()
        };
        app.world_mut()
            .spawn((shield, params, AnimatorHandle(Box::new(animator))));

        app.update();

        assert_eq!(
            calls.lock().unwrap().last(),
            Some(&AnimatorCall::SetBool(up_id, true))
        );
    }
}
