use vapix_rs::{CameraConfig, Parameters, SystemInfo, VapixCam};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 4 {
        println!("Usage: {} <IP> <Username> <Password>", args[0]);
        return Ok(());
    }

    let cam = VapixCam::new(CameraConfig::new(&args[1], &args[2], &args[3]))?;

    let info = cam.device_info().await?;
    println!("IP address: {}", info.ip_address);
    println!("Brand:      {}", info.brand);
    println!("Firmware:   {}", info.firmware_version);

    println!("Device time: {}", cam.get_date_time().await?);

    let size = cam.get_image_size(1, None).await?;
    for (key, value) in size.iter() {
        println!("{}: {}", key, value);
    }

    Ok(())
}
