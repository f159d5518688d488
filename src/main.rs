/*
 * This file is part of pamfingerprint.
 *
 * Copyright (C) 2025 pamfingerprint contributors
 *
 * pamfingerprint is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * pamfingerprint is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with pamfingerprint. If not, see <https://www.gnu.org/licenses/>.
 */

mod cli;

use std::path::Path;

use anyhow::{bail, Context};
use clap::Parser;
use serde::Serialize;

use cli::{Cli, Commands, OutputArgs, RemoveArgs, UserArgs};
use pam_fingerprint::auth::{open_sensor, Authenticator, Outcome, SerialConnector};
use pam_fingerprint::config::Config;
use pam_fingerprint::constants::DEFAULT_CONFIG_PATH;
use pam_fingerprint::enroll::{add_user, remove_user};
use pam_fingerprint::logging;
use pam_fingerprint::session::TerminalSession;
use pf_sensor::{FingerprintSensor, SystemParameters};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_cli(cli.verbose);

    // The system configuration and the serial port are root-only
    if cli.config == Path::new(DEFAULT_CONFIG_PATH) && unsafe { libc::geteuid() } != 0 {
        eprintln!("Error: pamfingerprint-conf requires root privileges to manage {}.", DEFAULT_CONFIG_PATH);
        eprintln!(
            "Please run with: sudo {}",
            std::env::args().next().unwrap_or_else(|| "pamfingerprint-conf".to_string())
        );
        std::process::exit(1);
    }

    match cli.command {
        Commands::AddUser(args) => cmd_add_user(&cli.config, args),
        Commands::RemoveUser(args) => cmd_remove_user(&cli.config, args),
        Commands::CheckUser(args) => cmd_check_user(&cli.config, args),
        Commands::ListUsers(args) => cmd_list_users(&cli.config, args),
        Commands::SensorInfo(args) => cmd_sensor_info(&cli.config, args),
    }
}

fn load_config(path: &Path) -> anyhow::Result<Config> {
    Config::load(path).with_context(|| format!("Failed to load {}", path.display()))
}

fn connect(config: &Config) -> anyhow::Result<Box<dyn FingerprintSensor>> {
    let sensor_config = config.sensor().context("Invalid sensor settings")?;
    open_sensor(&SerialConnector, &sensor_config).context("The fingerprint sensor could not be initialized")
}

fn cmd_add_user(path: &Path, args: UserArgs) -> anyhow::Result<()> {
    let mut config = load_config(path)?;
    let timeout = config.sensor()?.timeout;
    let mut sensor = connect(&config)?;

    let record = add_user(&mut config, &args.user, sensor.as_mut(), timeout, &mut |step| {
        println!("{}", step)
    })
    .with_context(|| format!("Failed to add user \"{}\"", args.user))?;

    println!("Finger enrolled successfully at position #{}.", record.position);
    println!("The user \"{}\" has been added to {}.", args.user, config.path().display());
    Ok(())
}

fn cmd_remove_user(path: &Path, args: RemoveArgs) -> anyhow::Result<()> {
    let mut config = load_config(path)?;

    if args.keep_template {
        remove_user(&mut config, &args.user, None)?;
    } else {
        let mut sensor = connect(&config).context("Use --keep-template to remove only the record")?;
        remove_user(&mut config, &args.user, Some(sensor.as_mut()))?;
    }

    println!("The user \"{}\" has been removed from {}.", args.user, config.path().display());
    Ok(())
}

fn cmd_check_user(path: &Path, args: UserArgs) -> anyhow::Result<()> {
    let mut session = TerminalSession::new(&args.user, "pamfingerprint-conf");
    let report = Authenticator::new(path).authenticate(&mut session);

    match (report.outcome, report.reason) {
        (Outcome::Success, _) => {
            println!("The user \"{}\" was authenticated.", args.user);
            Ok(())
        }
        (outcome, Some(reason)) => bail!("{} ({})", reason, outcome),
        (outcome, None) => bail!("{}", outcome),
    }
}

#[derive(Serialize)]
struct UserEntry {
    user: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    position: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn cmd_list_users(path: &Path, args: OutputArgs) -> anyhow::Result<()> {
    let config = load_config(path)?;
    let entries: Vec<UserEntry> = config
        .users()
        .into_iter()
        .map(|(user, record)| match record {
            Ok(record) => UserEntry {
                user,
                position: Some(record.position),
                error: None,
            },
            Err(e) => UserEntry {
                user,
                position: None,
                error: Some(e.to_string()),
            },
        })
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No users configured.");
    }
    for entry in &entries {
        match (&entry.position, &entry.error) {
            (Some(position), _) => println!("{:<24} #{}", entry.user, position),
            (None, Some(error)) => println!("{:<24} invalid: {}", entry.user, error),
            (None, None) => println!("{}", entry.user),
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct SensorInfo {
    port: String,
    parameters: SystemParameters,
    templates_stored: u16,
}

fn cmd_sensor_info(path: &Path, args: OutputArgs) -> anyhow::Result<()> {
    let config = load_config(path)?;
    let port = config.sensor()?.port;
    let mut sensor = connect(&config)?;

    let info = SensorInfo {
        port,
        parameters: sensor.system_parameters()?,
        templates_stored: sensor.template_count()?,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    let p = &info.parameters;
    println!("Port:             {}", info.port);
    println!("System ID:        {:#06x}", p.system_id);
    println!("Address:          {:#010x}", p.address);
    println!("Security level:   {}", p.security_level);
    println!("Packet size:      {} bytes", p.packet_size());
    println!("Baud rate:        {}", p.baud_rate_bps());
    println!("Templates stored: {} / {}", info.templates_stored, p.storage_capacity);
    Ok(())
}
