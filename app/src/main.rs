use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use rivet::{Container, ContainerConfig, LoadError};
use tracing_subscriber::EnvFilter;

mod models;

/// Load component definitions and resolve components by name
#[derive(Debug, Parser)]
#[command(name = "app", version)]
struct Cli {
    /// Definitions file, defaults to RIVET_CONFIG or config/rivet.json
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Build every definition right after loading
    #[arg(long)]
    eager: bool,

    /// Components to resolve, every definition when empty
    names: Vec<String>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let environment = rivet::config::load_dotenv(Path::new("."));
    tracing::debug!(%environment, "environment detected");

    match run(&Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "wiring failed");
            ExitCode::FAILURE
        }
    }
}

fn container_config(cli: &Cli) -> ContainerConfig {
    let mut builder = ContainerConfig::builder();
    if let Some(path) = &cli.config {
        builder = builder.config_path(path);
    }
    if cli.eager {
        builder = builder.eager(true);
    }
    builder.build()
}

fn run(cli: &Cli) -> Result<(), LoadError> {
    let container = Container::from_config(&container_config(cli))?;

    let names = if cli.names.is_empty() {
        container.definition_names()
    } else {
        cli.names.clone()
    };

    for name in names {
        match container.resolve(&name)? {
            Some(instance) => {
                println!("{}: {}", name, models::describe(&instance));
                if let Some(car) = instance.downcast_ref::<models::ElectricCar>() {
                    car.run();
                }
            }
            None => println!("{}: not defined", name),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn demo_config() -> ContainerConfig {
        ContainerConfig::builder()
            .config_path(Path::new(env!("CARGO_MANIFEST_DIR")).join("config/rivet.json"))
            .eager(false)
            .validate(true)
            .build()
    }

    #[test]
    fn test_demo_config_wires_car() {
        let container = Container::from_config(&demo_config()).unwrap();
        assert_eq!(container.definition_names(), vec!["battery", "tesla"]);
        assert!(container.is_empty());

        let tesla = container.make::<models::ElectricCar>("tesla").unwrap();
        let battery = container.make::<models::Battery>("battery").unwrap();

        assert_eq!(tesla.name, "Tesla");
        assert!(Arc::ptr_eq(tesla.battery.as_ref().unwrap(), &battery));
        assert_eq!(battery.charge_left, 40.0);
        assert!(tesla.run());
        assert_eq!(container.instance_names(), vec!["battery", "tesla"]);
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::parse_from(["app", "--config", "beans.json", "--eager", "tesla"]);
        assert_eq!(cli.names, vec!["tesla"]);

        let config = container_config(&cli);
        assert_eq!(config.config_path, PathBuf::from("beans.json"));
        assert!(config.eager);
    }
}
