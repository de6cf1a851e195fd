use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use log::{error, info};

use tilepack::{convert::Converter, export::ExportType, profile::Profile};

#[derive(Parser, Debug)]
#[command(version, about = "Convert images into console graphics data")]
struct Args {
    /// Device profile (defaults to snes)
    #[arg(short, long, value_enum)]
    profile: Option<Profile>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = ExportType::Ca65)]
    export: ExportType,

    /// Segment for assembly output (defaults to the profile's)
    #[arg(long)]
    segment: Option<String>,

    /// Image to convert; options are read from the .yaml/.yml/.json file of the same name
    input: PathBuf,

    /// File to write
    output: PathBuf,
}

pub fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let profile = args.profile.unwrap_or_else(|| {
        info!("Defaulting to SNES profile.");
        Profile::Snes
    });
    let mut converter = Converter::new(profile, args.export);
    if let Some(segment) = args.segment {
        converter.segment = segment;
    }
    if let Err(e) = converter.convert(&args.input, &args.output) {
        error!("{:#}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
