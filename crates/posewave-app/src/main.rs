use chrono::Utc;
use log::info;

use posewave_domain::round::{RoundConfig, RoundEngine, RoundPhase};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let context = posewave_lib::bootstrap::bootstrap().await?;

    if std::env::var("POSEWAVE_DEMO").is_ok() {
        run_demo_round();
        return Ok(());
    }

    info!(
        "Headless core started; cache at {}",
        context.config.local_db_path.display()
    );

    Ok(())
}

/// Offline round simulation: a perfect player that hits every pose for
/// three waves, then lets the timer run out. Useful for eyeballing the
/// event flow without a camera or network.
fn run_demo_round() {
    let mut engine = RoundEngine::new(RoundConfig::default());
    let mut now = Utc::now();
    let step = chrono::Duration::seconds(1);

    for event in engine.reset(now) {
        info!("[demo] {:?}", event);
    }

    while engine.state().phase() != RoundPhase::GameOver {
        now += step;
        for event in engine.tick(now) {
            info!("[demo] {:?}", event);
        }

        // Stop cooperating after three cleared waves
        if engine.state().waves_cleared() >= 3 {
            continue;
        }

        if let Some(expected) = engine.state().expected_pose() {
            now += step * 3;
            for event in engine.classification(expected.label(), 0.9, now) {
                info!("[demo] {:?}", event);
            }
        }
    }

    info!("[demo] finished: {:?}", engine.tally(now));
}
