//! Command Line Interface
//!
//! Enrollment and diagnostics for the fingerprint PAM module.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "pamfingerprint-conf")]
#[command(version)]
#[command(about = "Manage users of the fingerprint PAM module")]
#[command(long_about = "Manage users of the fingerprint PAM module

Enrolls fingers on the sensor and records them in the module's
configuration file. Must run as root to write /etc/pamfingerprint.conf
and to open the serial port.

EXAMPLES:
    pamfingerprint-conf add-user alice        Enroll a finger for alice
    pamfingerprint-conf check-user alice      Try an authentication for alice
    pamfingerprint-conf remove-user alice     Delete alice's template and record
    pamfingerprint-conf list-users --json     List enrolled users as JSON
    pamfingerprint-conf sensor-info           Show the sensor's parameters

ENVIRONMENT VARIABLES:
    PAMFINGERPRINT_LOG=debug   Log filter (default: info)

FILES:
    /etc/pamfingerprint.conf   Users and sensor connection settings")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file
    #[arg(long, short, default_value = "/etc/pamfingerprint.conf")]
    pub config: PathBuf,

    /// Log debug messages to stderr
    #[arg(long, short)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Enroll a finger for a user
    AddUser(UserArgs),

    /// Remove a user and their stored template
    RemoveUser(RemoveArgs),

    /// Run one authentication attempt for a user
    CheckUser(UserArgs),

    /// List configured users
    ListUsers(OutputArgs),

    /// Show sensor parameters and template count
    SensorInfo(OutputArgs),
}

#[derive(Args)]
pub struct UserArgs {
    /// User name
    pub user: String,
}

#[derive(Args)]
pub struct RemoveArgs {
    /// User name
    pub user: String,

    /// Leave the template stored on the sensor
    #[arg(long)]
    pub keep_template: bool,
}

#[derive(Args)]
pub struct OutputArgs {
    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}
