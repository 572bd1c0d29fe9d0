//! # wire_readout_cli
//!
//! Part of the wire_readout crate family.
//!
//! Command line access to the wire readout channel mapping.
//!
//! ## Use
//!
//! Make a template configuration file, then fill it out:
//!
//! ```bash
//! wire_readout_cli --path config.yml new
//! ```
//!
//! Build the channel map and dump it as YAML (to stdout unless an output file is given):
//!
//! ```bash
//! wire_readout_cli --path config.yml dump --output channels.yml
//! ```
//!
//! Look up the wires read by a channel:
//!
//! ```bash
//! wire_readout_cli --path config.yml channel 4242
//! ```
//!
//! A log is written to `wire_readout.log` in the working directory.
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use libwire_readout::config::Config;
use libwire_readout::dump::ChannelMapDump;
use libwire_readout::error::ConfigError;
use libwire_readout::readout_id::ChannelID;
use libwire_readout::wire_readout::{load_wire_readout, WireReadout};

fn make_template_config(path: &Path) -> Result<(), ConfigError> {
    let config = Config::default();
    let yaml_str = serde_yaml::to_string(&config)?;
    let mut file = File::create(path)?;
    file.write_all(yaml_str.as_bytes())?;
    Ok(())
}

/// Log to the terminal (as the default logger does) and to a file
fn setup_logging(verbose: bool) -> Result<(), spdlog::Error> {
    let file_sink = Arc::new(
        spdlog::sink::FileSink::builder()
            .path(PathBuf::from("./wire_readout.log"))
            .formatter(Box::new(spdlog::formatter::PatternFormatter::new(
                spdlog::formatter::pattern!(
                    "[{date_short} {time_short}] - [thread: {tid}] - [{^{level}}] - {payload}{eol}"
                ),
            )))
            .truncate(true)
            .build()?,
    );
    let logger = Arc::new(
        spdlog::Logger::builder()
            .sinks(spdlog::default_logger().sinks().to_owned())
            .sink(file_sink)
            .flush_level_filter(spdlog::LevelFilter::All)
            .build()?,
    );
    if verbose {
        logger.set_level_filter(spdlog::LevelFilter::All);
    } else {
        logger.set_level_filter(spdlog::LevelFilter::MoreSevereEqual(spdlog::Level::Info));
    }
    spdlog::set_default_logger(logger);
    Ok(())
}

fn load(config_path: &Path) -> Option<WireReadout> {
    spdlog::info!("Loading config from {}...", config_path.to_string_lossy());
    let config = match Config::read_config_file(config_path) {
        Ok(c) => c,
        Err(e) => {
            spdlog::error!("{e}");
            return None;
        }
    };
    spdlog::info!("Config successfully loaded.");
    spdlog::info!("Detector Path: {}", config.detector_path.to_string_lossy());
    match config.stitch_tolerance {
        Some(tol) => spdlog::info!("Stitch Tolerance: {tol}"),
        None => spdlog::info!("Stitch Tolerance: none"),
    }

    match load_wire_readout(&config) {
        Ok(wr) => Some(wr),
        Err(e) => {
            spdlog::error!("{e}");
            None
        }
    }
}

fn dump(wire_readout: &WireReadout, args: &ArgMatches) -> bool {
    let output = args.get_one::<String>("output").map(PathBuf::from);
    let append = args.get_flag("append");
    let result =
        ChannelMapDump::new(wire_readout).and_then(|d| d.write(output.as_deref(), append));
    match result {
        Ok(()) => {
            if let Some(path) = output {
                spdlog::info!("Channel map written to {}", path.to_string_lossy());
            }
            true
        }
        Err(e) => {
            spdlog::error!("{e}");
            false
        }
    }
}

fn describe_channel(wire_readout: &WireReadout, args: &ArgMatches) -> bool {
    let Some(channel) = args.get_one::<ChannelID>("channel").copied() else {
        spdlog::error!("No channel given");
        return false;
    };
    let Some(rop) = wire_readout.channel_to_rop(channel) else {
        spdlog::error!(
            "Channel {channel} is out of range (the detector has {} channels)",
            wire_readout.n_channels()
        );
        return false;
    };

    println!("Channel {channel}");
    println!("  ROP: {rop} ({})", wire_readout.plane_type(&rop));
    println!("  Signal type: {}", wire_readout.signal_type(channel));
    let wires = wire_readout.channel_to_wire(channel);
    if wires.is_empty() {
        println!("  Wires: none (wireless channel)");
    }
    for wire in wires {
        println!("  Wire: {wire}");
    }
    true
}

fn main() -> ExitCode {
    // Create a cli
    let matches = Command::new("wire_readout_cli")
        .arg_required_else_help(true)
        .subcommand_required(true)
        .subcommand(Command::new("new").about("Make a template configuration yaml file"))
        .subcommand(
            Command::new("dump")
                .about("Build the channel map and write it as YAML")
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .help("File to write to (default: stdout)"),
                )
                .arg(
                    Arg::new("append")
                        .short('a')
                        .long("append")
                        .action(ArgAction::SetTrue)
                        .help("Append to the output file instead of replacing it"),
                ),
        )
        .subcommand(
            Command::new("channel")
                .about("Show the wires read by a channel")
                .arg(
                    Arg::new("channel")
                        .required(true)
                        .value_parser(clap::value_parser!(ChannelID))
                        .help("Channel number"),
                ),
        )
        .arg(
            Arg::new("path")
                .short('p')
                .long("path")
                .required(true)
                .help("Path to the configuration file"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("Log every readout plane as it is numbered"),
        )
        .get_matches();

    // Initialize feedback
    if let Err(e) = setup_logging(matches.get_flag("verbose")) {
        eprintln!("Could not create the log file, logging to the terminal only: {e}");
    }

    // Parse the cli
    let Some(config_path) = matches.get_one::<String>("path").map(PathBuf::from) else {
        spdlog::error!("A configuration path is required");
        return ExitCode::FAILURE;
    };

    if let Some(("new", _)) = matches.subcommand() {
        spdlog::info!(
            "Making a template config at {}...",
            config_path.to_string_lossy()
        );
        return match make_template_config(&config_path) {
            Ok(()) => {
                spdlog::info!("Done.");
                ExitCode::SUCCESS
            }
            Err(e) => {
                spdlog::error!("Could not write template config: {e}");
                ExitCode::FAILURE
            }
        };
    }

    let Some(wire_readout) = load(&config_path) else {
        return ExitCode::FAILURE;
    };

    let success = match matches.subcommand() {
        Some(("dump", args)) => dump(&wire_readout, args),
        Some(("channel", args)) => describe_channel(&wire_readout, args),
        _ => false,
    };

    if success {
        spdlog::info!("Done.");
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

//Unit tests
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_config() {
        let dir = tempfile::tempdir().expect("temporary directory");
        let path = dir.path().join("config.yml");
        make_template_config(&path).expect("template written");

        let config = Config::read_config_file(&path).expect("template is a valid config");
        assert_eq!(config.detector_path, PathBuf::from("None"));
        assert!(config.stitch_tolerance.is_none());
        assert!(config.wireless_channel_counts().is_ok());
    }

    #[test]
    fn test_template_config_bad_directory() {
        let dir = tempfile::tempdir().expect("temporary directory");
        let path = dir.path().join("missing").join("config.yml");
        assert!(matches!(
            make_template_config(&path),
            Err(ConfigError::IOError(_))
        ));
    }
}
