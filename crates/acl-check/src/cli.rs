use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "acl-check", version, about = "Evaluate requests against a route ACL")]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "acl-check.yaml")]
    pub config: PathBuf,

    /// Path to the ACL file (overrides config file setting)
    #[arg(short, long, global = true)]
    pub acl: Option<PathBuf>,

    /// Log level filter (overrides config file setting)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decide whether a single request would be allowed
    Check {
        /// Request path, e.g. /apple/big
        #[arg(long)]
        path: String,

        /// HTTP method
        #[arg(short, long, default_value = "GET")]
        method: String,

        /// Role held by the requester; repeat for several roles
        #[arg(short, long = "role")]
        roles: Vec<String>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Load and compile the ACL without evaluating anything
    Validate,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_check_with_repeated_roles() {
        let cli = Cli::parse_from([
            "acl-check", "check", "--path", "/apple/", "-m", "post", "-r", "user", "-r", "manager",
        ]);
        match cli.command {
            Command::Check {
                path,
                method,
                roles,
                format,
            } => {
                assert_eq!(path, "/apple/");
                assert_eq!(method, "post");
                assert_eq!(roles, vec!["user", "manager"]);
                assert_eq!(format, OutputFormat::Text);
            }
            other => panic!("expected Check, got {:?}", other),
        }
        assert_eq!(cli.config, PathBuf::from("acl-check.yaml"));
    }

    #[test]
    fn global_acl_flag_after_subcommand() {
        let cli = Cli::parse_from(["acl-check", "validate", "--acl", "rules.yaml"]);
        assert_eq!(cli.acl, Some(PathBuf::from("rules.yaml")));
        assert!(matches!(cli.command, Command::Validate));
    }

    #[test]
    fn json_format() {
        let cli = Cli::parse_from(["acl-check", "check", "--path", "/", "--format", "json"]);
        match cli.command {
            Command::Check { format, roles, .. } => {
                assert_eq!(format, OutputFormat::Json);
                assert!(roles.is_empty());
            }
            other => panic!("expected Check, got {:?}", other),
        }
    }
}
