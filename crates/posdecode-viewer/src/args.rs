//! Command line parsing

use clap::Parser;
use std::path::PathBuf;

/// Heatmap of decoded position probabilities
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Decoded position data (`.json`, otherwise YAML)
    pub data_file: PathBuf,
    /// Config file overriding the default location
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("posdecode-viewer").chain(args.iter().copied()))
    }

    #[test]
    fn test_data_file_only() {
        let args = parse(&["run.json"]).unwrap();
        assert_eq!(args.data_file, PathBuf::from("run.json"));
        assert_eq!(args.config, None);
    }

    #[test]
    fn test_config_before_or_after() {
        let expected = Args {
            data_file: PathBuf::from("run.yaml"),
            config: Some(PathBuf::from("viewer.yaml")),
        };
        assert_eq!(parse(&["run.yaml", "--config", "viewer.yaml"]).unwrap(), expected);
        assert_eq!(parse(&["--config", "viewer.yaml", "run.yaml"]).unwrap(), expected);
        assert_eq!(parse(&["--config=viewer.yaml", "run.yaml"]).unwrap(), expected);
    }

    #[test]
    fn test_errors() {
        assert!(parse(&[]).is_err(), "data file is required");
        assert!(parse(&["run.json", "--config"]).is_err());
        assert!(parse(&["run.json", "--verbose"]).is_err());
        assert!(parse(&["a.json", "b.json"]).is_err());
    }

    #[test]
    fn test_command_definition() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
