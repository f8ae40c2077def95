//! Command line interface

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Vengeance Pact engine
#[derive(Parser, Debug)]
#[command(name = "pact")]
#[command(about = "Vengeance Pact 2D engine and dev demos", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Configuration file
    #[arg(short, long, global = true, default_value = crate::config::DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a headless dev demo
    Demo(DemoArgs),
}

#[derive(Args, Debug, Clone)]
pub struct DemoArgs {
    /// Which demo to run
    #[arg(value_enum)]
    pub name: DemoName,

    /// Directory for rendered frames
    #[arg(short, long, default_value = "demo-output")]
    pub output: PathBuf,

    /// Logic ticks to simulate
    #[arg(long, default_value_t = 600)]
    pub ticks: u32,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DemoName {
    /// Hue remapping of a key-hue test card
    Palette,
    /// Hover, click and a delayed restore on a three-state button
    Buttons,
    /// Parallax layers under a keyboard-driven camera
    Viewport,
    /// Slicing a generated sheet into frames
    Spritesheet,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_command() {
        let cli = Cli::try_parse_from(["pact"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.log_level.is_none());
        assert_eq!(cli.config, PathBuf::from("pact.toml"));
    }

    #[test]
    fn test_demo_command() {
        let cli = Cli::try_parse_from([
            "pact",
            "demo",
            "viewport",
            "--ticks",
            "30",
            "--log-level",
            "debug",
        ])
        .unwrap();

        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        let Some(Command::Demo(args)) = cli.command else {
            panic!("expected demo command");
        };
        assert_eq!(args.name, DemoName::Viewport);
        assert_eq!(args.ticks, 30);
        assert_eq!(args.output, PathBuf::from("demo-output"));
    }

    #[test]
    fn test_unknown_demo() {
        assert!(Cli::try_parse_from(["pact", "demo", "audio"]).is_err());
    }
}
