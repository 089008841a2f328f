//! Shield core: state machine, durability pool, block mechanics
//!
//! # Механика
//! - raise → Active: щит блокирует `block_damage_reduction` долю урона,
//!   остаток урона списывается с durability
//! - durability ≤ 0 → Breaking: щит сломан, поднять нельзя
//! - через `recovery_time` секунд → Idle с полной durability
//!
//! Вся таблица переходов — в pure функции `transition()` (тестируется построчно).
//! Side effects (movement, animator, presentation events) живут в systems.rs.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::animator::ShieldAnimationConfig;

/// Состояния щита (lifecycle)
///
/// Реально достижимы только Idle, Active, Breaking.
/// Starting/Blocking/Recovering/Interrupted — reserved: остаются в модели
/// данных, но переходов в них пока нет (не придумываем семантику заранее).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect, Serialize, Deserialize)]
pub enum ShieldState {
    #[default]
    Idle,
    /// Reserved (wind-up анимация подъёма)
    Starting,
    Active,
    /// Reserved (отдельное состояние на время block impact)
    Blocking,
    Breaking,
    /// Reserved (отдельное состояние на время восстановления)
    Recovering,
    /// Reserved (прерывание подъёма)
    Interrupted,
}

/// Входы state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShieldInput {
    Raise,
    Lower,
    /// Durability упала до ≤ 0 при блоке
    DurabilityDepleted,
    /// Recovery таймер дотикал
    RecoveryElapsed,
}

/// Pure transition function: (state, input) → next state
///
/// Guards:
/// - Raise/Lower отклоняются в Breaking (сломанный щит не поднять и не опустить)
/// - DurabilityDepleted срабатывает только из Active
/// - RecoveryElapsed срабатывает только из Breaking
pub fn transition(state: ShieldState, input: ShieldInput) -> ShieldState {
    match (state, input) {
        (ShieldState::Breaking, ShieldInput::Raise) => ShieldState::Breaking,
        (_, ShieldInput::Raise) => ShieldState::Active,

        (ShieldState::Breaking, ShieldInput::Lower) => ShieldState::Breaking,
        (_, ShieldInput::Lower) => ShieldState::Idle,

        (ShieldState::Active, ShieldInput::DurabilityDepleted) => ShieldState::Breaking,
        (state, ShieldInput::DurabilityDepleted) => state,

        (ShieldState::Breaking, ShieldInput::RecoveryElapsed) => ShieldState::Idle,
        (state, ShieldInput::RecoveryElapsed) => state,
    }
}

/// Результат блока (absorb при Active)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockOutcome {
    /// Сколько durability списано (уже после damage reduction)
    pub absorbed: f32,
    /// Щит сломался этим ударом
    pub broke: bool,
}

/// Физический щит в руках актора
///
/// Числовое/state ядро без side effects: методы мутируют только сам компонент.
/// Движение владельца, animator и presentation events применяют системы
/// (порядок side effects — см. systems.rs).
#[derive(Component, Debug, Clone, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
pub struct Shield {
    /// Название щита (display name)
    pub name: String,
    /// Сколько урона щит держит до поломки
    pub max_durability: f32,
    /// Текущая durability. Во время Breaking может быть ≤ 0
    /// (значение "доломавшего" удара, восстанавливается recovery)
    pub current_durability: f32,
    /// Время восстановления после поломки (сек). ≤ 0 — восстановление на следующем тике
    pub recovery_time: f32,
    /// Доля поглощаемого урона при блоке (0-1)
    pub block_damage_reduction: f32,
    /// Множитель скорости владельца пока щит поднят
    pub movement_multiplier: f32,
    /// Если false — щит не трогает движение владельца
    pub modify_movement_while_blocking: bool,
    /// Названия animator параметров (резолвятся один раз при bind)
    pub animation: ShieldAnimationConfig,

    // === Runtime state ===
    pub state: ShieldState,
    /// Снапшот множителя владельца до raise (возвращается при lower)
    pub saved_movement_multiplier: f32,
    /// Остаток recovery таймера (взводится переходом в Breaking)
    pub recovery_timer: f32,
}

impl Default for Shield {
    fn default() -> Self {
        Self::new("Shield", 100.0)
    }
}

impl Shield {
    /// Новый щит: Idle, полная durability
    pub fn new(name: impl Into<String>, max_durability: f32) -> Self {
        Self {
            name: name.into(),
            max_durability,
            current_durability: max_durability,
            recovery_time: 5.0,
            block_damage_reduction: 0.5,
            movement_multiplier: 0.5,
            modify_movement_while_blocking: true,
            animation: ShieldAnimationConfig::default(),
            state: ShieldState::Idle,
            saved_movement_multiplier: 1.0,
            recovery_timer: 0.0,
        }
    }

    /// Щит поднят (блокирует входящий урон)
    pub fn is_up(&self) -> bool {
        self.state == ShieldState::Active
    }

    /// Щит сломан (ждёт recovery)
    pub fn is_broken(&self) -> bool {
        self.state == ShieldState::Breaking
    }

    /// Остаток durability как доля (для VFX/UI). Clamp — durability
    /// может быть отрицательной во время Breaking.
    pub fn durability_percent(&self) -> f32 {
        (self.current_durability / self.max_durability).clamp(0.0, 1.0)
    }

    /// Поднять щит. false = отклонено (Breaking), состояние не меняется
    pub fn raise(&mut self) -> bool {
        if self.is_broken() {
            return false;
        }
        self.state = transition(self.state, ShieldInput::Raise);
        true
    }

    /// Опустить щит. false = отклонено (Breaking)
    pub fn lower(&mut self) -> bool {
        if self.is_broken() {
            return false;
        }
        self.state = transition(self.state, ShieldInput::Lower);
        true
    }

    /// Принять удар. None = щит не Active, урон не поглощён (caller
    /// применяет его другим путём). Some = урон принят щитом:
    /// durability -= amount × (1 − reduction); при ≤ 0 → Breaking
    /// и взводится recovery таймер.
    pub fn absorb(&mut self, amount: f32) -> Option<BlockOutcome> {
        if self.state != ShieldState::Active {
            return None;
        }

        let absorbed = amount * (1.0 - self.block_damage_reduction);
        self.current_durability -= absorbed;

        let broke = self.current_durability <= 0.0;
        if broke {
            self.state = transition(self.state, ShieldInput::DurabilityDepleted);
            self.recovery_timer = self.recovery_time.max(0.0);
        }

        Some(BlockOutcome { absorbed, broke })
    }

    /// Тик recovery таймера. true = щит восстановился на этом тике
    /// (durability = max, state = Idle). Вне Breaking — no-op.
    ///
    /// Продвижение ровно на `recovery_time` достаточно для восстановления
    /// (строгое `> 0.0`, не `>= 0.0`).
    pub fn tick_recovery(&mut self, delta: f32) -> bool {
        if !self.is_broken() {
            return false;
        }

        self.recovery_timer -= delta;
        if self.recovery_timer > 0.0 {
            return false;
        }

        self.recovery_timer = 0.0;
        self.current_durability = self.max_durability;
        self.state = transition(self.state, ShieldInput::RecoveryElapsed);
        true
    }
}
