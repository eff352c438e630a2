use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Clone, Debug, Parser)]
#[command(version, about = "Register a new account against a registration service")]
pub struct Cli {
    /// Load configuration from a custom location. Defaults to: $XDG_CONFIG/signup/config.yml
    #[arg(short, long = "config", value_name = "FILE", global = true)]
    pub config_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Clone, Debug, Subcommand)]
pub enum Command {
    /// Print a config template
    ConfigTemplate,
    /// Create a config file. Defaults to: $XDG_CONFIG/signup/config.yml
    ConfigInit,
    /// Fill in the registration form and submit it
    Register(RegisterArgs),
}

#[derive(Clone, Debug, Args)]
pub struct RegisterArgs {
    #[arg(long, default_value = "")]
    pub full_name: String,

    #[arg(long, default_value = "")]
    pub email: String,

    #[arg(long, default_value = "")]
    pub password: String,

    /// Defaults to the value of --password
    #[arg(long)]
    pub confirm_password: Option<String>,

    /// Date of birth as YYYY-MM-DD
    #[arg(long, value_name = "DATE", default_value = "")]
    pub date_of_birth: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_register_with_global_config() {
        let cli = Cli::parse_from([
            "signup",
            "register",
            "--config",
            "/tmp/signup.yml",
            "--full-name",
            "Jo",
            "--email",
            "jo@x.com",
            "--password",
            "Abcdefg1",
            "--date-of-birth",
            "2000-01-01",
        ]);

        assert_eq!(cli.config_path, Some(PathBuf::from("/tmp/signup.yml")));
        let Command::Register(args) = cli.command else {
            panic!("expected register command");
        };
        assert_eq!(args.full_name, "Jo");
        assert_eq!(args.confirm_password, None);
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
