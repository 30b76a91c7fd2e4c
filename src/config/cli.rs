use std::path::PathBuf;

use clap::Parser;

/// Search the book catalog and keep favorites from the terminal.
#[derive(Parser, Debug, Clone)]
#[command(name = "booktracker")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the YAML config file.
    #[arg(short, long, default_value = "./config.yaml")]
    pub config: PathBuf,

    /// Print the JSON schema of the config file and exit.
    #[arg(long)]
    pub schema: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["booktracker"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("./config.yaml"));
        assert!(!cli.schema);
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from(["booktracker", "-c", "/etc/booktracker.yaml", "--schema"])
            .unwrap();
        assert_eq!(cli.config, PathBuf::from("/etc/booktracker.yaml"));
        assert!(cli.schema);

        assert!(Cli::try_parse_from(["booktracker", "--config"]).is_err());
        assert!(Cli::try_parse_from(["booktracker", "--verbose"]).is_err());
    }
}
