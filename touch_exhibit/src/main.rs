//! touch_exhibit — interactive entry point.

use std::io::{self, Write};

use touch_exhibit::app::{run, AppConfig, SceneKind};
use touch_midi::GeneralMidi;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║        Touch Exhibit — Color Changer & Air Keyboard          ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    #[cfg(feature = "leap")]
    println!("  Mode: LeapMotion hardware");
    #[cfg(not(feature = "leap"))]
    println!("  Mode: Mouse simulation  (use --features leap for hardware)");
    println!();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let scene = match scene_arg(&args).map(|s| s.parse::<SceneKind>()).transpose() {
        Ok(scene) => scene,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    };

    let cfg = if args.iter().any(|a| a == "--quick") {
        let cfg = AppConfig { scene: scene.unwrap_or(SceneKind::Color), ..AppConfig::default() };
        println!("  Quick-start: {} scene, C4–B4, piano, 120 BPM\n", cfg.scene);
        cfg
    } else {
        configure_interactively(scene)
    };

    println!();
    println!("  Opening exhibit window…  (Q or Esc quits, Tab changes instrument)");
    println!();

    if let Err(e) = run(cfg) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Value of `--scene NAME` or `--scene=NAME`.
fn scene_arg(args: &[String]) -> Option<&str> {
    args.iter().enumerate().find_map(|(i, a)| {
        if let Some(v) = a.strip_prefix("--scene=") {
            Some(v)
        } else if a == "--scene" {
            args.get(i + 1).map(String::as_str)
        } else {
            None
        }
    })
}

fn configure_interactively(scene: Option<SceneKind>) -> AppConfig {
    let defaults = AppConfig::default();

    let scene = scene.unwrap_or_else(|| {
        println!("  Scene: 1.Color changer  2.Air keyboard");
        match read_line("  Choice (1–2, default 1): ").trim() {
            "2" => SceneKind::Keyboard,
            _   => SceneKind::Color,
        }
    });

    let mut cfg = AppConfig { scene, ..defaults };
    if scene == SceneKind::Keyboard {
        let (low, high) = pick_octaves();
        cfg.low_octave  = low;
        cfg.high_octave = high;
        cfg.tempo_bpm = read_line("  Tempo BPM (default 120): ")
            .trim().parse().unwrap_or(120u32).clamp(20, 300);
    }
    cfg.instrument = pick_instrument();
    cfg.velocity = read_line("  Velocity 1–127 (default 100): ")
        .trim().parse().unwrap_or(100u8).clamp(1, 127);
    cfg
}

fn pick_octaves() -> (i8, i8) {
    loop {
        let low: i8 = read_line("  Lowest octave (default 4): ")
            .trim().parse().unwrap_or(4);
        let high: i8 = read_line("  Highest octave (default same): ")
            .trim().parse().unwrap_or(low);
        if (-1..=8).contains(&low) && (low..=8).contains(&high) { break (low, high); }
        println!("  ⚠  octaves -1–8, lowest first.");
    }
}

fn pick_instrument() -> GeneralMidi {
    println!("  Instrument:");
    for (i, gm) in GeneralMidi::ALL.iter().enumerate() {
        println!("    {:>2}. {}", i + 1, gm.name());
    }
    let choice: usize = read_line("  Choice (default 1): ").trim().parse().unwrap_or(1);
    GeneralMidi::ALL.get(choice.saturating_sub(1)).copied().unwrap_or(GeneralMidi::AcousticGrandPiano)
}

fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    io::stdout().flush().ok();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf
}
