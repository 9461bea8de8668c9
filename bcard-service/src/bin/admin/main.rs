use std::sync::Arc;

use anyhow::bail;
use anyhow::Context;
use bcard_service::config::Config;
use bcard_service::config::StorageBackend;
use bcard_service::domain::clock::SystemClock;
use bcard_service::domain::common::models::Address;
use bcard_service::domain::common::models::EmailAddress;
use bcard_service::domain::common::models::Image;
use bcard_service::domain::common::models::Phone;
use bcard_service::domain::user::models::Password;
use bcard_service::domain::user::models::PersonName;
use bcard_service::domain::user::models::RegisterUserCommand;
use bcard_service::domain::user::ports::UserServicePort;
use bcard_service::domain::user::service::UserService;
use bcard_service::outbound::repositories::PostgresUserRepository;
use clap::Parser;
use clap::Subcommand;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Account administration against the configured database.
#[derive(Parser, Debug)]
#[command(name = "bcard-admin", author, version, about)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Grant admin privileges.
    Promote {
        #[arg(long)]
        email: String,
    },
    /// Revoke admin privileges.
    Demote {
        #[arg(long)]
        email: String,
    },
    /// Clear failed login attempts and any active lock.
    Unlock {
        #[arg(long)]
        email: String,
    },
    /// Register a new admin account.
    Create {
        #[arg(long)]
        email: String,
        #[arg(long, env = "BCARD_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        first: String,
        #[arg(long)]
        last: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        country: String,
        #[arg(long)]
        city: String,
        #[arg(long)]
        street: String,
        #[arg(long)]
        house_number: i64,
    },
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bcard_service=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = Config::load()?;

    if config.storage != StorageBackend::Postgres {
        bail!("bcard-admin needs storage = \"postgres\"");
    }

    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&config.database.url)
        .await
        .context("connecting to the database")?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let user_service = UserService::new(
        Arc::new(PostgresUserRepository::new(pool.clone())),
        Arc::new(config.auth.token_issuer()?),
        config.auth.password_hasher()?,
        config.auth.lockout_policy()?,
        Arc::new(SystemClock),
    );

    let result = run(&user_service, args.command).await;
    pool.close().await;
    result
}

async fn run(users: &impl UserServicePort, command: Command) -> Result<(), anyhow::Error> {
    match command {
        Command::Promote { email } => {
            let user = users.get_user_by_email(&EmailAddress::new(email)?).await?;
            users.set_admin_status(&user.id, true).await?;
            tracing::info!(user_id = %user.id, email = %user.email, "Admin privileges granted");
        }
        Command::Demote { email } => {
            let user = users.get_user_by_email(&EmailAddress::new(email)?).await?;
            users.set_admin_status(&user.id, false).await?;
            tracing::info!(user_id = %user.id, email = %user.email, "Admin privileges revoked");
        }
        Command::Unlock { email } => {
            let user = users.get_user_by_email(&EmailAddress::new(email)?).await?;
            users.unlock_account(&user.id).await?;
            tracing::info!(user_id = %user.id, email = %user.email, "Account unlocked");
        }
        Command::Create {
            email,
            password,
            first,
            last,
            phone,
            country,
            city,
            street,
            house_number,
        } => {
            let command = RegisterUserCommand {
                name: PersonName::new(&first, "", &last)?,
                phone: Phone::new(phone)?,
                email: EmailAddress::new(email)?,
                password: Password::new(password)?,
                image: Image::user_default(),
                address: Address::new("", &country, &city, &street, house_number, "")?,
                is_business: true,
            };
            let session = users.register(command).await?;
            users.set_admin_status(&session.user.id, true).await?;
            tracing::info!(
                user_id = %session.user.id,
                email = %session.user.email,
                "Admin account created"
            );
        }
    }

    Ok(())
}
