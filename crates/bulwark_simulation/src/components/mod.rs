//! ECS Components для игровых entity
//!
//! Организация по доменам:
//! - actor: базовые характеристики владельца щита (Actor, Health, MovementSpeed)
//!
//! Shield-специфичные компоненты живут в crate::shield (механика + state machine).

pub mod actor;

// Re-exports для удобного импорта
pub use actor::*;
