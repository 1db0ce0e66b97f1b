use std::time::Duration;

use bevy::app::ScheduleRunnerPlugin;
use bevy::log::{Level, LogPlugin};
use bevy::prelude::*;
use clap::Parser;
use gasbox::cli::{Args, load_and_apply_config};
use gasbox::plugins::simulation::SimulationPlugin;

fn main() -> AppExit {
    let args = Args::parse();

    let config = match load_and_apply_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return AppExit::error();
        }
    };

    if args.print_config {
        return match toml::to_string_pretty(&config) {
            Ok(toml_string) => {
                print!("{toml_string}");
                AppExit::Success
            }
            Err(e) => {
                eprintln!("Error: failed to serialize configuration: {e}");
                AppExit::error()
            }
        };
    }

    let mut app = App::new();

    app.add_plugins((
        MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::ZERO)),
        LogPlugin {
            level: if args.verbose {
                Level::DEBUG
            } else {
                Level::INFO
            },
            ..default()
        },
        SimulationPlugin::with_config(config),
    ));

    app.run()
}
