use vapix_rs::{CameraConfig, Outcome, UserManagement, VapixCam};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 6 {
        println!(
            "Usage: {} <IP> <Username> <Password> <NewUser> <NewPassword>",
            args[0]
        );
        return Ok(());
    }

    let cam = VapixCam::new(CameraConfig::new(&args[1], &args[2], &args[3]))?;
    let (new_user, new_password) = (&args[4], &args[5]);

    println!("--- USER LIST ---");
    for user in cam.get_users().await? {
        println!(" - {}", user);
    }

    match cam
        .create_user(new_user, new_password, "operator", Some("created by demo"))
        .await?
    {
        Outcome::Applied(reply) => println!("Created {}: {}", new_user, reply.trim()),
        Outcome::Conflict(reason) => println!("Skipped: {}", reason),
    }

    match cam.remove_user(new_user).await? {
        Outcome::Applied(reply) => println!("Removed {}: {}", new_user, reply.trim()),
        Outcome::Conflict(reason) => println!("Skipped: {}", reason),
    }

    Ok(())
}
