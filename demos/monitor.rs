use std::env;

use alterego::{AlteregoClient, RECOMMENDED_TICK_INTERVAL, StationCoordinator};

#[tokio::main]
async fn main() -> alterego::Result<()> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = env::args().collect();
    let usage = "usage: monitor <username> <password> <station-id>";
    let username = args.get(1).expect(usage).clone();
    let password = args.get(2).expect(usage).clone();
    let station = args.get(3).expect(usage).clone();

    let api = AlteregoClient::builder(username, password).build();
    let mut coordinator = StationCoordinator::new(api, station);

    println!("Fetching initial state...");
    coordinator.refresh().await?;

    loop {
        let data = coordinator.data();
        println!(
            "Season: {:?} | Outside: {:?}",
            data.global.season(),
            data.global.outside_temperature(),
        );
        for zone in data.enabled_zones() {
            println!(
                "  [{}] {} -> {} | {:?}{}",
                zone.name(),
                zone.temperature()
                    .map_or_else(|| "--".to_string(), |t| format!("{t:.1}\u{00b0}C")),
                zone.setpoint()
                    .map_or_else(|| "--".to_string(), |t| format!("{t:.1}\u{00b0}C")),
                zone.forcing(),
                if zone.is_off() { " | OFF" } else { "" },
            );
        }
        for deum in data.enabled_deums() {
            println!(
                "  [{}] override {:?} | boost {:?} min",
                deum.name(),
                deum.override_mode(),
                deum.boost_timer(),
            );
        }

        tokio::time::sleep(RECOMMENDED_TICK_INTERVAL).await;
        if let Err(e) = coordinator.refresh().await {
            eprintln!("Refresh error: {e}");
        }
    }
}
