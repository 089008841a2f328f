//! Headless симуляция BULWARK
//!
//! Запускает Bevy App без рендера: актор с щитом ловит серию ударов,
//! щит ломается и восстанавливается. Прогон для ручной проверки логов.

use std::time::Duration;

use bevy::time::TimeUpdateStrategy;

use bulwark_simulation::shield::{AnimatorParamKind, RecordingAnimator};
use bulwark_simulation::*;

fn main() {
    println!("Starting BULWARK headless simulation");

    let mut app = create_headless_app();
    app.add_plugins(SimulationPlugin);
    // Фиксированная дельта: 1 app.update() == 1 simulation tick (60Hz)
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_micros(
        16_667,
    )));

    let animator = RecordingAnimator::with_parameters(&[
        ("ShieldUp", AnimatorParamKind::Bool),
        ("ShieldBlock", AnimatorParamKind::Trigger),
        ("ShieldBreak", AnimatorParamKind::Trigger),
    ]);

    let bearer = app
        .world_mut()
        .spawn((Actor::default(), AnimatorHandle(Box::new(animator))))
        .id();
    let attacker = app.world_mut().spawn(Actor { faction_id: 2 }).id();

    app.world_mut().send_event(EquipShieldIntent {
        entity: bearer,
        shield: "kite_shield".into(),
    });
    app.update();

    app.world_mut().send_event(RaiseShieldIntent { entity: bearer });

    // 600 тиков (~10 сек): удар каждые 30 тиков, щит ломается и чинится
    for tick in 0..600 {
        if tick % 30 == 0 {
            app.world_mut().send_event(IncomingDamage {
                attacker,
                target: bearer,
                amount: 25.0,
            });
        }

        app.update();

        if tick % 100 == 0 {
            let world = app.world();
            let shield = world.get::<Shield>(bearer);
            let health = world.get::<Health>(bearer);
            println!(
                "Tick {}: shield={:?} durability={:.1} hp={}",
                tick,
                shield.map(|s| s.state),
                shield.map(|s| s.current_durability).unwrap_or(0.0),
                health.map(|h| h.current).unwrap_or(0),
            );
        }
    }

    println!("Simulation complete!");
}
