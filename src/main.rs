use anyhow::{bail, Result};
use clap::Parser;
use signup::{
    config::{self, Config},
    Field, HttpTransport, RegistrationController, SubmitOutcome, Validator,
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt as _};

mod cli;

use cli::{Cli, Command, RegisterArgs};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=debug", env!("CARGO_CRATE_NAME")).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::ConfigTemplate => config::print_config_template(),
        Command::ConfigInit => {
            let path = config::init_config(cli.config_path)?;
            println!("Configuration file created: {}", path.display());
        }
        Command::Register(args) => register(cli.config_path, args).await?,
    }

    Ok(())
}

async fn register(config_path: Option<PathBuf>, args: RegisterArgs) -> Result<()> {
    let config = Config::load(config_path)?;
    let transport = HttpTransport::from_config(&config)?;
    info!("registering against {}", transport.endpoint());

    let controller = RegistrationController::new(transport, Validator::system());
    let confirm_password = args
        .confirm_password
        .unwrap_or_else(|| args.password.clone());

    controller.update_field(Field::FullName, args.full_name);
    controller.update_field(Field::Email, args.email);
    controller.update_field(Field::Password, args.password);
    controller.update_field(Field::ConfirmPassword, confirm_password);
    controller.update_field(Field::DateOfBirth, args.date_of_birth);

    match controller.submit().await {
        SubmitOutcome::Succeeded(receipt) => {
            println!("{} ({})", receipt.message, receipt.user_email);
            Ok(())
        }
        SubmitOutcome::Invalid(errors) => {
            for (field, message) in errors.iter() {
                eprintln!("{}: {message}", field.label());
            }
            bail!("the registration form has {} invalid field(s)", errors.len())
        }
        SubmitOutcome::Failed(detail) => bail!("{detail}"),
        SubmitOutcome::AlreadySubmitting => bail!("a registration is already in progress"),
    }
}
