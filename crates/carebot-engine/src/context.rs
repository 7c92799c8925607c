//! Application context: the components built once at start-up.

use carebot_logic::config::{validate_config, BotConfig};

use crate::bot::Bot;
use crate::error::BotError;

/// Owns the validated configuration and the bot. Built once in `main` and
/// handed to whichever layer needs the bot.
#[derive(Debug, Clone)]
pub struct AppContext {
    config: BotConfig,
    bot: Bot,
}

impl AppContext {
    /// Validate `config` and build the bot from it.
    pub fn new(config: BotConfig) -> Result<Self, BotError> {
        let errors = validate_config(&config);
        if !errors.is_empty() {
            return Err(BotError::InvalidConfig(errors));
        }
        let bot = Bot::new(config.clone());
        Ok(Self { config, bot })
    }

    /// Wrap an already-built bot, e.g. one with a scripted drift source.
    pub fn with_bot(bot: Bot) -> Self {
        Self {
            config: bot.config().clone(),
            bot,
        }
    }

    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    pub fn bot(&self) -> &Bot {
        &self.bot
    }

    pub fn start(&self) {
        self.bot.start();
    }

    pub fn shutdown(&self) {
        self.bot.shutdown();
    }
}
