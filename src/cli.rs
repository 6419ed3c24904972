//! Command-line interface.

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use tracing::debug;

use crate::config::Config;
use crate::llm::{ChatClient, ModelConfig, Role};
use crate::session::{self, Session};
use crate::ui::{print_bordered, render::models_table};

#[derive(Parser, Debug)]
#[command(name = "cao")]
#[command(version, about = "Chat with your favourite model from the terminal")]
pub struct Cli {
    /// Model to use (a key from the configuration file)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,

    /// Ask a single question and exit
    #[arg(short, long)]
    pub prompt: Option<String>,

    /// List the configured models
    #[arg(long)]
    pub list_models: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage configured models
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum ConfigAction {
    /// Add or replace a model
    Add {
        /// Name used with --model
        name: String,
        /// API base URL, e.g. https://api.deepseek.com/v1
        api_base: String,
        /// Model identifier sent to the provider
        model: String,
        /// Inline API key (environment variables take precedence)
        #[arg(long)]
        api_key: Option<String>,
    },
    /// Remove a model
    Remove { name: String },
    /// Make a model the default
    Default { name: String },
}

/// Look up `name` (or the default model) in `config`.
pub fn select_model(config: &Config, name: Option<&str>) -> anyhow::Result<ModelConfig> {
    let name = name.unwrap_or(config.default_model.as_str());
    config.model(name).ok_or_else(|| {
        anyhow!(
            "unsupported model '{}'; supported models: {}",
            name,
            config.model_names().join(", ")
        )
    })
}

/// Apply a configuration change and report what happened.
pub fn apply_config_action(config: &mut Config, action: ConfigAction) -> anyhow::Result<String> {
    match action {
        ConfigAction::Add {
            name,
            api_base,
            model,
            api_key,
        } => {
            config.add_model(&name, &api_base, &model, api_key);
            Ok(format!("Model '{name}' saved"))
        }
        ConfigAction::Remove { name } => {
            config.remove_model(&name)?;
            Ok(format!("Model '{name}' removed"))
        }
        ConfigAction::Default { name } => {
            config.set_default_model(&name)?;
            Ok(format!("Default model set to '{name}'"))
        }
    }
}

/// Run whatever the command line asked for.
pub async fn execute(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load();

    if let Some(Commands::Config { action }) = cli.command {
        let message = apply_config_action(&mut config, action)?;
        config.save().context("saving configuration")?;
        println!("{message}");
        return Ok(());
    }

    if cli.list_models {
        println!("{}", models_table(&config));
        return Ok(());
    }

    let model = select_model(&config, cli.model.as_deref())?;
    debug!(?model, "selected model");
    let client = ChatClient::new()?;

    match cli.prompt {
        Some(prompt) => {
            println!("\n{}{prompt}\n", Role::User.prefix());
            let reply = session::ask_once(&client, &model, &prompt).await;
            print_bordered("Cao 🌱", reply.text());
            Ok(())
        }
        None => session::run(Session::new(client, model)).await,
    }
}
