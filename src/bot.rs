use std::sync::Arc;

use anyhow::Result;
use teloxide::prelude::*;
use teloxide::types::AllowedUpdate;
use teloxide::update_listeners::Polling;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::effects;
use crate::handlers::{self, Command};
use crate::platform::{telegram, Messenger};
use crate::posts;

/// Send the welcome post to the channel. Failures are logged, never fatal.
pub async fn announce<M: Messenger + ?Sized>(messenger: &M, config: &Config) {
    let post = match posts::welcome_post() {
        Ok(post) => post,
        Err(e) => {
            error!("Failed to build welcome post: {:#}", e);
            return;
        }
    };

    match messenger.send(config.channel(), &post, None).await {
        Ok(()) => info!("Posted to channel: {}", config.telegram.channel_id),
        Err(e) => error!("Failed to send post: {:#}", e),
    }
}

/// Announce on the channel, then serve commands and button presses until stopped.
pub async fn run(config: Arc<Config>) -> Result<()> {
    let bot = Bot::new(&config.telegram.bot_token);

    announce(&bot, &config).await;

    let handler = dptree::entry()
        .branch(
            Update::filter_message()
                .filter_command::<Command>()
                .endpoint(handle_command),
        )
        .branch(Update::filter_callback_query().endpoint(handle_callback));

    let listener = Polling::builder(bot.clone())
        .allowed_updates(vec![AllowedUpdate::Message, AllowedUpdate::CallbackQuery])
        .build();

    info!("Starting Channel Poster Bot...");

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![config])
        .default_handler(|upd| async move {
            warn!("Unhandled update: {:?}", upd.id);
        })
        .error_handler(LoggingErrorHandler::with_custom_text("dispatcher"))
        .enable_ctrlc_handler()
        .build()
        .dispatch_with_listener(
            listener,
            LoggingErrorHandler::with_custom_text("An error from the update listener"),
        )
        .await;

    Ok(())
}

async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    config: Arc<Config>,
) -> ResponseResult<()> {
    let invocation = match telegram::command_invocation(&msg) {
        Some(invocation) => invocation,
        None => return Ok(()),
    };

    info!("Command {:?} from user {}", cmd, invocation.user_id.0);

    match handlers::command_effects(&cmd, &invocation, &config) {
        Ok(effects) => effects::execute(&bot, effects).await,
        Err(e) => error!("Failed to handle {:?}: {:#}", cmd, e),
    }

    Ok(())
}

async fn handle_callback(bot: Bot, q: CallbackQuery) -> ResponseResult<()> {
    let invocation = telegram::callback_invocation(&q);

    info!(
        "Button press from user {}: {:?}",
        invocation.user_id.0, invocation.data
    );

    effects::execute(&bot, handlers::callback_effects(&invocation)).await;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;
    use crate::platform::fake::{Call, RecordingMessenger};

    #[tokio::test]
    async fn test_announce_sends_one_welcome_post() {
        let config = test_config("-1001", &[]);
        let messenger = RecordingMessenger::default();

        announce(&messenger, &config).await;

        assert_eq!(
            messenger.calls().await,
            vec![Call::Send {
                to: config.channel(),
                message: posts::welcome_post().unwrap(),
                reply_to: None,
            }]
        );
    }

    #[tokio::test]
    async fn test_announce_failure_is_not_fatal() {
        let config = test_config("@chan", &[]);
        let messenger = RecordingMessenger::failing_for(config.channel());

        announce(&messenger, &config).await;

        assert_eq!(messenger.calls().await.len(), 1);
    }
}
