use clap::{Parser, Subcommand, ValueEnum};
use pastecrypt::{
    config::AppConfig,
    error::{AppError, AppResult},
    paste::PasteClient,
    publish::{publish_lab_credentials, LabSecretRefs},
    secrets::MountedSecrets,
};
use pastecrypt_base58::{Alphabet, BITCOIN, FLICKR};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use zeroize::Zeroizing;

#[derive(Parser)]
#[command(
    name = "pastecrypt",
    version,
    about = "Publish provisioning secrets as encrypted, self-destructing PrivateBin pastes"
)]
struct Cli {
    /// Extra configuration file layered over config/default and config/local
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    /// Seconds to wait for the paste service before giving up on a paste
    #[arg(long, global = true, default_value_t = 60)]
    deadline_secs: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Publish one message, read from stdin when --message is absent
    Paste {
        #[arg(long)]
        message: Option<String>,
        /// Override the configured expiry, e.g. 10min, 1hour, 1day
        #[arg(long)]
        expire: Option<String>,
        /// Override the configured formatter
        #[arg(long)]
        formatter: Option<String>,
    },
    /// Publish admin password and kubeconfig of every lab in a JSON manifest
    Publish {
        #[arg(long)]
        manifest: PathBuf,
    },
    /// Encode hex bytes as base58
    Encode {
        #[arg(long, value_enum, default_value_t = AlphabetName::Bitcoin)]
        alphabet: AlphabetName,
        hex: String,
    },
    /// Decode base58 text into hex bytes
    Decode {
        #[arg(long, value_enum, default_value_t = AlphabetName::Bitcoin)]
        alphabet: AlphabetName,
        text: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum AlphabetName {
    Bitcoin,
    Flickr,
}

impl AlphabetName {
    fn alphabet(self) -> &'static Alphabet {
        match self {
            Self::Bitcoin => &BITCOIN,
            Self::Flickr => &FLICKR,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Logs go to stderr, stdout carries results
    let registry = tracing_subscriber::registry().with(
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "pastecrypt=info".into()),
    );
    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    if cli.json_logs {
        registry.with(fmt_layer.json()).init();
    } else {
        registry.with(fmt_layer).init();
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

async fn run(cli: Cli) -> AppResult<()> {
    let deadline = Duration::from_secs(cli.deadline_secs);

    match cli.command {
        Command::Encode { alphabet, hex } => {
            let bytes = hex::decode(hex.trim())?;
            println!("{}", alphabet.alphabet().encode(&bytes));
        }
        Command::Decode { alphabet, text } => {
            let bytes = alphabet.alphabet().decode(text.trim())?;
            println!("{}", hex::encode(bytes));
        }
        Command::Paste {
            message,
            expire,
            formatter,
        } => {
            let config = AppConfig::load(cli.config.as_deref())?;
            info!("Using paste service {:?} at {}", config.paste.name, config.paste.host);
            let client = PasteClient::from_config(&config.paste)?;

            let mut options = config.paste.options();
            if let Some(expire) = expire {
                options.expire = expire;
            }
            if let Some(formatter) = formatter {
                options.formatter = formatter;
            }

            let message = match message {
                Some(message) => Zeroizing::new(message),
                None => {
                    let mut buffer = Zeroizing::new(String::new());
                    tokio::io::stdin().read_to_string(&mut buffer).await?;
                    buffer
                }
            };
            if message.is_empty() {
                return Err(AppError::invalid_input("refusing to publish an empty message"));
            }

            let response = client.create_paste(&message, &options, deadline).await?;
            println!("{}", response.url);
            println!("delete token: {}", response.delete_token);
        }
        Command::Publish { manifest } => {
            let config = AppConfig::load(cli.config.as_deref())?;
            let client = PasteClient::from_config(&config.paste)?;

            let labs: Vec<LabSecretRefs> = serde_json::from_slice(&tokio::fs::read(&manifest).await?)?;
            info!(labs = labs.len(), namespace = %config.secrets.namespace, "Publishing lab credentials");

            let source = MountedSecrets::new(&config.secrets.root);
            let pastes = publish_lab_credentials(
                &client,
                &source,
                &config.secrets.namespace,
                &labs,
                &config.paste.options(),
                deadline,
            )
            .await?;

            println!("{}", serde_json::to_string_pretty(&pastes)?);
        }
    }

    Ok(())
}
