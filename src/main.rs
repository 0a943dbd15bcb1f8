//! Rhythm Grid headless runner
//!
//! Runs a seeded session at a fixed frame rate with an autoplay driver and
//! reports the result. Usage: `rhythm-grid [seconds] [seed]`

use rhythm_grid::Tuning;
use rhythm_grid::consts::FRAME_DT;
use rhythm_grid::sim::{
    Button, FrameInput, GameEvent, HitGrade, PerspectiveCamera, Session, SessionPhase,
    stick_toward,
};

/// Aim at the obstacle closest to arrival and press once it is on the beat
fn autoplay(session: &Session) -> FrameInput {
    let now = session.clock();
    let next_frame = now + FRAME_DT as f64;
    let window = session.tuning().hit_window;

    let target = session
        .obstacles()
        .iter()
        .filter(|o| !o.is_resolved() && !window.has_expired(o.time_until_arrival(now)))
        .min_by(|a, b| a.arrival_time.total_cmp(&b.arrival_time));

    let Some(target) = target else {
        return FrameInput::default();
    };

    let mut input = FrameInput::stick(stick_toward(target.cell));
    // Press on the last frame at or before arrival
    if target.time_until_arrival(next_frame) <= 0.0 {
        input.pressed.extend_from_slice(Button::for_cell(target.cell));
    }
    input
}

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let seconds: f32 = args.next().and_then(|s| s.parse().ok()).unwrap_or(180.0);
    let seed: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(12345);

    let tuning = match std::env::var("RHYTHM_GRID_TUNING") {
        Ok(json) => match Tuning::from_json(&json) {
            Ok(tuning) => tuning,
            Err(e) => {
                log::error!("{e}");
                std::process::exit(2);
            }
        },
        Err(_) => Tuning::default().with_speed_ramp(),
    };

    let mut session = match Session::new(tuning, seed, Box::new(PerspectiveCamera::default())) {
        Ok(session) => session,
        Err(e) => {
            log::error!("Cannot start session: {e}");
            std::process::exit(1);
        }
    };

    log::info!("Rhythm Grid (native) running {:.0}s, seed {}", seconds, seed);

    let frames = (seconds / FRAME_DT).ceil() as u64;
    let mut spawned = 0u32;
    let mut bursts = 0u32;
    for _ in 0..frames {
        let input = autoplay(&session);
        session.tick(&input, FRAME_DT);

        for event in session.drain_events() {
            match event {
                GameEvent::ObstacleSpawned { .. } => spawned += 1,
                GameEvent::BurstStarted { .. } => bursts += 1,
                GameEvent::PlayerMissed { id } => log::info!("Missed {id}"),
                _ => {}
            }
        }

        if session.phase() == SessionPhase::GameOver {
            break;
        }
    }

    let score = session.score();
    println!("Time:        {:.1}s", session.clock());
    println!("Spawned:     {} ({} bursts)", spawned, bursts);
    println!("Score:       {}", score.total_score());
    println!("Best streak: {}", score.best_streak());
    println!("Lives:       {}/{}", session.health().lives(), session.health().max_lives());
    for grade in HitGrade::ALL {
        println!("  {:<8} {}", grade.as_str(), score.counts().get(grade));
    }
}
