use community_meals::{Config, build_rocket};
use rocket::{Build, Rocket};

#[rocket::launch]
fn rocket() -> Rocket<Build> {
    dotenvy::dotenv().ok();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // `community-meals print-config` dumps the merged configuration as TOML
    if std::env::args().nth(1).as_deref() == Some("print-config") {
        match config.to_toml() {
            Ok(rendered) => {
                println!("{}", rendered);
                std::process::exit(0);
            }
            Err(e) => {
                eprintln!("Failed to render configuration: {}", e);
                std::process::exit(1);
            }
        }
    }

    build_rocket(config)
}
