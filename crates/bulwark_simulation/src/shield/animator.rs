//! Animator backend interface + bind-time parameter negotiation
//!
//! # Архитектура
//! ECS не знает, какой animator стоит за актором (Godot AnimationTree,
//! headless recorder, ничего). Backend прячется за trait `ShieldAnimator`:
//! - `find_parameter()` — "знает ли backend параметр X типа Y" (capability query)
//! - `set_bool()` / `set_trigger()` — запись параметров
//!
//! Распознанные параметры резолвятся ОДИН раз при bind (`ShieldAnimatorParams`)
//! и дальше только читаются: None в кэше = каждый вызов молча пропускается,
//! повторных запросов к backend нет.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Тип animator параметра
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimatorParamKind {
    Bool,
    Trigger,
}

/// Opaque id параметра внутри backend (аналог animator hash)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnimatorParamId(pub u32);

/// Animation backend актора (capability interface)
pub trait ShieldAnimator: Send + Sync {
    /// Some(id) если backend распознаёт параметр данного типа, иначе None
    fn find_parameter(&self, name: &str, kind: AnimatorParamKind) -> Option<AnimatorParamId>;

    fn set_bool(&mut self, id: AnimatorParamId, value: bool);

    fn set_trigger(&mut self, id: AnimatorParamId);
}

/// Optional animator backend владельца щита
///
/// Актор без этого компонента — валидная конфигурация: все animator
/// вызовы молча пропускаются.
#[derive(Component)]
pub struct AnimatorHandle(pub Box<dyn ShieldAnimator>);

/// Названия animator параметров щита (конфиг, резолвятся при bind)
#[derive(Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
pub struct ShieldAnimationConfig {
    /// Bool: щит поднят (пишется каждый кадр presentation системой)
    pub up_parameter: String,
    /// Trigger: принят блок
    pub block_parameter: String,
    /// Trigger: щит сломан
    pub break_parameter: String,
}

impl Default for ShieldAnimationConfig {
    fn default() -> Self {
        Self {
            up_parameter: "ShieldUp".to_string(),
            block_parameter: "ShieldBlock".to_string(),
            break_parameter: "ShieldBreak".to_string(),
        }
    }
}

/// Кэш распознанных параметров (вычисляется один раз при bind)
///
/// None = backend не знает параметр → соответствующие вызовы пропускаются
/// без повторной проверки.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct ShieldAnimatorParams {
    pub up: Option<AnimatorParamId>,
    pub block: Option<AnimatorParamId>,
    pub break_param: Option<AnimatorParamId>,
}

impl ShieldAnimatorParams {
    /// Capability negotiation: опрашиваем backend по трём именам из конфига
    pub fn resolve(animator: &dyn ShieldAnimator, config: &ShieldAnimationConfig) -> Self {
        Self {
            up: animator.find_parameter(&config.up_parameter, AnimatorParamKind::Bool),
            block: animator.find_parameter(&config.block_parameter, AnimatorParamKind::Trigger),
            break_param: animator.find_parameter(&config.break_parameter, AnimatorParamKind::Trigger),
        }
    }
}

// ============================================================================
// RecordingAnimator (headless backend для тестов и runner)
// ============================================================================

/// Записанный вызов backend
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimatorCall {
    SetBool(AnimatorParamId, bool),
    SetTrigger(AnimatorParamId),
}

/// In-memory animator backend: распознаёт заданный набор параметров и
/// пишет все вызовы в общий лог (Arc — тест держит клон и читает после тиков)
pub struct RecordingAnimator {
    params: HashMap<(String, AnimatorParamKind), AnimatorParamId>,
    calls: Arc<Mutex<Vec<AnimatorCall>>>,
}

impl RecordingAnimator {
    /// Backend, распознающий перечисленные параметры (id — порядковые)
    pub fn with_parameters(params: &[(&str, AnimatorParamKind)]) -> Self {
        let params = params
            .iter()
            .enumerate()
            .map(|(i, (name, kind))| ((name.to_string(), *kind), AnimatorParamId(i as u32)))
            .collect();

        Self {
            params,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Backend без единого параметра (все вызовы должны пропускаться)
    pub fn empty() -> Self {
        Self::with_parameters(&[])
    }

    /// Общий лог вызовов (клон Arc для проверок после тиков)
    pub fn calls_log(&self) -> Arc<Mutex<Vec<AnimatorCall>>> {
        Arc::clone(&self.calls)
    }
}

impl ShieldAnimator for RecordingAnimator {
    fn find_parameter(&self, name: &str, kind: AnimatorParamKind) -> Option<AnimatorParamId> {
        self.params.get(&(name.to_string(), kind)).copied()
    }

    fn set_bool(&mut self, id: AnimatorParamId, value: bool) {
        self.calls.lock().unwrap().push(AnimatorCall::SetBool(id, value));
    }

    fn set_trigger(&mut self, id: AnimatorParamId) {
        self.calls.lock().unwrap().push(AnimatorCall::SetTrigger(id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_all_parameters() {
        let animator = RecordingAnimator::with_parameters(&[
            ("ShieldUp", AnimatorParamKind::Bool),
            ("ShieldBlock", AnimatorParamKind::Trigger),
            ("ShieldBreak", AnimatorParamKind::Trigger),
        ]);

        let params = ShieldAnimatorParams::resolve(&animator, &ShieldAnimationConfig::default());
        assert!(params.up.is_some());
        assert!(params.block.is_some());
        assert!(params.break_param.is_some());
    }

    #[test]
    fn test_resolve_requires_matching_kind() {
        // ShieldUp объявлен как Trigger → Bool запрос должен промахнуться
        let animator =
            RecordingAnimator::with_parameters(&[("ShieldUp", AnimatorParamKind::Trigger)]);

        let params = ShieldAnimatorParams::resolve(&animator, &ShieldAnimationConfig::default());
        assert!(params.up.is_none());
    }

    #[test]
    fn test_resolve_partial_recognition() {
        let animator =
            RecordingAnimator::with_parameters(&[("ShieldUp", AnimatorParamKind::Bool)]);

        let params = ShieldAnimatorParams::resolve(&animator, &ShieldAnimationConfig::default());
        assert!(params.up.is_some());
        assert!(params.block.is_none());
        assert!(params.break_param.is_none());
    }

    #[test]
    fn test_recording_animator_logs_calls() {
        let mut animator =
            RecordingAnimator::with_parameters(&[("ShieldUp", AnimatorParamKind::Bool)]);
        let log = animator.calls_log();

        let id = animator
            .find_parameter("ShieldUp", AnimatorParamKind::Bool)
            .unwrap();
        animator.set_bool(id, true);
        animator.set_trigger(AnimatorParamId(99));

        let calls = log.lock().unwrap();
        assert_eq!(calls[0], AnimatorCall::SetBool(id, true));
        assert_eq!(calls[1], AnimatorCall::SetTrigger(AnimatorParamId(99)));
    }
}
