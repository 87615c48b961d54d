use std::time::Duration;
use vapix_rs::{CameraConfig, Direction, Ptz, VapixCam};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 4 {
        println!("Usage: {} <IP> <Username> <Password>", args[0]);
        return Ok(());
    }

    let config = CameraConfig::new(&args[1], &args[2], &args[3]).with_timeout(Duration::from_secs(5));
    let cam = VapixCam::new(config)?;

    let position = cam.get_pan_tilt_zoom().await?;
    println!(
        "Current position: pan={:?} tilt={:?} zoom={:?}",
        position.pan, position.tilt, position.zoom
    );

    println!("Panning left...");
    cam.continuous_move(-50, 0, 0).await?;
    tokio::time::sleep(Duration::from_secs(1)).await;
    cam.stop_move().await?;

    println!("Zooming in...");
    cam.continuous_move(0, 0, 100).await?;
    tokio::time::sleep(Duration::from_millis(500)).await;
    cam.stop_move().await?;

    match cam.get_speed().await? {
        Some(speed) => println!("Speed: {}", speed),
        None => println!("Speed not reported"),
    }

    println!("Presets:");
    for preset in cam.list_all_presets().await? {
        println!(" - {}: {}", preset.index, preset.name);
    }

    println!("Going home...");
    cam.move_to(Direction::Home, Some(50)).await?;

    Ok(())
}
