//! Базовые компоненты акторов: Actor, Health, MovementSpeed

use bevy::prelude::*;

/// Актор (NPC, игрок) — базовый компонент для носителей щита
///
/// Автоматически добавляет Health и MovementSpeed через Required Components.
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
#[require(Health, MovementSpeed)]
pub struct Actor {
    /// Stable ID фракции (для reputation, diplomacy)
    pub faction_id: u64,
}

/// Здоровье актора
///
/// Инвариант: 0 ≤ current ≤ max
/// Сюда падает урон, который щит НЕ принял (lowered / broken shield).
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Health {
    pub current: u32,
    pub max: u32,
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100) // Default 100 HP
    }
}

impl Health {
    pub fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0
    }

    pub fn take_damage(&mut self, amount: u32) {
        self.current = self.current.saturating_sub(amount);
    }

    pub fn heal(&mut self, amount: u32) {
        self.current = (self.current + amount).min(self.max);
    }
}

/// Скорость движения актора (метры/сек + модификатор)
///
/// `multiplier` — единственное поле, которое мутируют внешние системы
/// (щит при raise/lower, позже бафы/дебафы). Tactical layer читает
/// `effective()` при расчёте velocity.
#[derive(Component, Clone, Copy, Debug, Reflect)]
#[reflect(Component)]
pub struct MovementSpeed {
    /// Базовая скорость (m/s)
    pub speed: f32,
    /// Текущий множитель скорости (1.0 = без модификаторов)
    pub multiplier: f32,
}

impl Default for MovementSpeed {
    fn default() -> Self {
        Self {
            speed: 2.0, // 2 m/s — базовая скорость ходьбы
            multiplier: 1.0,
        }
    }
}

impl MovementSpeed {
    /// Итоговая скорость с учётом множителя
    pub fn effective(&self) -> f32 {
        self.speed * self.multiplier
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_damage() {
        let mut health = Health::new(100);
        assert_eq!(health.current, 100);

        health.take_damage(30);
        assert_eq!(health.current, 70);
        assert!(health.is_alive());

        health.take_damage(100); // Saturating sub
        assert_eq!(health.current, 0);
        assert!(!health.is_alive());
    }

    #[test]
    fn test_health_heal() {
        let mut health = Health::new(100);
        health.take_damage(50);

        health.heal(30);
        assert_eq!(health.current, 80);

        health.heal(100); // Clamped to max
        assert_eq!(health.current, 100);
    }

    #[test]
    fn test_movement_speed_effective() {
        let mut speed = MovementSpeed::default();
        assert_eq!(speed.effective(), 2.0);

        speed.multiplier = 0.5;
        assert_eq!(speed.effective(), 1.0);
    }
}
