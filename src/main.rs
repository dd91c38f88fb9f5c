use std::fmt::{Debug, Display};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use newsletter_client::{
    components::TestBanner,
    configuration::{Settings, get_configuration},
    domain::NewSubscriber,
    email_client::{SendEmailRequest, SendTemplateRequest, Substitutions},
    error::ClientError,
    newsletter_client::{SubscribeRequest, UnsubscribeRequest},
    telemetry::{get_subscriber, init_subscriber},
};

/// Subscribe contacts and send emails through the newsletter endpoint.
#[derive(Parser)]
#[command(name = "newsletter-client")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Endpoint url, overrides `api.base_url` from the configuration
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Subscribe a contact to the newsletter
    Subscribe {
        email: String,
        #[arg(long)]
        name: Option<String>,
        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
        #[arg(long)]
        list_id: Option<String>,
    },

    /// Unsubscribe a contact
    Unsubscribe {
        email: String,
        #[arg(long)]
        list_id: Option<String>,
    },

    /// Send a transactional email with an inline HTML body
    Send {
        #[arg(long)]
        to: String,
        #[arg(long)]
        to_name: Option<String>,
        #[arg(long)]
        subject: String,
        /// File holding the HTML body
        #[arg(long)]
        html: PathBuf,
        /// KEY=VALUE substitution, VALUE is parsed as JSON when possible
        #[arg(long = "sub", value_parser = parse_substitution)]
        substitutions: Vec<(String, serde_json::Value)>,
        #[arg(long = "tag")]
        tags: Vec<String>,
    },

    /// Send an email rendered from a provider template
    SendTemplate {
        #[arg(long)]
        to: String,
        #[arg(long)]
        to_name: Option<String>,
        #[arg(long)]
        template_id: String,
        #[arg(long)]
        subject: Option<String>,
        #[arg(long = "sub", value_parser = parse_substitution)]
        substitutions: Vec<(String, serde_json::Value)>,
    },

    /// Send a test email and remember that delivery works
    Test { to: String },

    /// Print the test banner HTML, or nothing once a test has succeeded
    Banner,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = get_configuration().context("Failed to read configuration")?;

    let subscriber = get_subscriber(
        config.application.name.clone(),
        config.application.log_level.clone(),
        std::io::stderr,
    );
    init_subscriber(subscriber)?;

    if let Some(api_url) = cli.api_url {
        config.api.base_url = api_url;
    }

    let outcome = run(cli.command, &config).await;
    report_exit(outcome)
}

async fn run(command: Command, config: &Settings) -> Result<String, anyhow::Error> {
    let output = match command {
        Command::Subscribe {
            email,
            name,
            tags,
            list_id,
        } => {
            let new_subscriber =
                NewSubscriber::parse(email, name.unwrap_or_default(), tags.unwrap_or_default())
                    .map_err(ClientError::Validation)?;
            let mut request: SubscribeRequest = new_subscriber.into();
            request.list_id = list_id;
            let response = config.api.newsletter_client()?.subscribe(&request).await?;
            serde_json::to_string_pretty(&response)?
        }
        Command::Unsubscribe { email, list_id } => {
            let request = UnsubscribeRequest { email, list_id };
            let response = config.api.newsletter_client()?.unsubscribe(&request).await?;
            serde_json::to_string_pretty(&response)?
        }
        Command::Send {
            to,
            to_name,
            subject,
            html,
            substitutions,
            tags,
        } => {
            let body_html = std::fs::read_to_string(&html)
                .with_context(|| format!("Failed to read {}", html.display()))?;
            let request = SendEmailRequest {
                to_email: to,
                to_name,
                subject,
                body_html,
                substitutions: collect_substitutions(substitutions),
                tags: Some(tags).filter(|t| !t.is_empty()),
            };
            let response = config.api.email_client()?.send_email(&request).await?;
            serde_json::to_string_pretty(&response)?
        }
        Command::SendTemplate {
            to,
            to_name,
            template_id,
            subject,
            substitutions,
        } => {
            let request = SendTemplateRequest {
                to_email: to,
                to_name,
                template_id,
                subject,
                substitutions: collect_substitutions(substitutions),
            };
            let response = config.api.email_client()?.send_template(&request).await?;
            serde_json::to_string_pretty(&response)?
        }
        Command::Test { to } => {
            let banner = test_banner(config)?;
            banner.set_to_email(to);
            let response = banner.send_test().await?;
            serde_json::to_string_pretty(&response)?
        }
        Command::Banner => test_banner(config)?.render()?.unwrap_or_default(),
    };

    Ok(output)
}

fn test_banner(config: &Settings) -> Result<TestBanner, anyhow::Error> {
    Ok(TestBanner::mount(
        config.api.email_client()?,
        config.storage.flag_store(),
        config.storage.test_flag_key.as_str(),
    ))
}

fn parse_substitution(raw: &str) -> Result<(String, serde_json::Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("{raw} is not a KEY=VALUE pair"))?;
    let value = serde_json::from_str(value)
        .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

fn collect_substitutions(pairs: Vec<(String, serde_json::Value)>) -> Option<Substitutions> {
    Some(pairs.into_iter().collect::<Substitutions>()).filter(|s| !s.is_empty())
}

fn report_exit(outcome: Result<String, impl Debug + Display>) -> anyhow::Result<()> {
    match outcome {
        Ok(output) => {
            println!("{output}");
            Ok(())
        }
        Err(e) => {
            tracing::error!(
                error.cause_chain = ?e,
                error.message = %e,
                "Command failed"
            );
            eprintln!("{e}");
            std::process::exit(1)
        }
    }
}
