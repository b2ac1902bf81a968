use chatbridge_config::Config;
use chatbridge_store::ConversationStore;
use tracing::info;

/// Strategy for displaying configuration information.
///
/// This strategy outputs:
/// - Assistant connection settings (API key masked)
/// - Default error message as users will see it
/// - Speech service and database settings, with a connection check
/// - Telegram configuration
#[derive(Debug, Clone, Copy)]
pub struct InfoStrategy;

impl super::CommandStrategy for InfoStrategy {
    type Input = ();

    async fn execute(&self, _input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;

        println!("=== chatbridge Configuration ===\n");

        println!("Assistant:");
        println!("  API Key: {}", mask_secret(&config.assistant.api_key));
        println!("  Assistant ID: {}", config.assistant.assistant_id);
        println!("  Service URL: {}", config.assistant.service_url);
        println!("  API Version: {}", config.assistant.version);
        println!("  IAM URL: {}", config.assistant.iam_url);
        println!();

        println!("Messages:");
        println!("  Default Error: {}", config.default_error_message());
        println!();

        println!("Speech:");
        match &config.tts.url {
            Some(url) => println!("  URL: {url}"),
            None => println!("  URL: (not set - audio turns disabled)"),
        }
        println!();

        println!("Database:");
        let db_url = &config.database.url;
        println!("  URL: {}", mask_database_url(db_url));

        info!("Testing database connection");
        match ConversationStore::connect(db_url).await {
            Ok(_) => {
                println!("  Status: Connected");
            }
            Err(e) => {
                println!("  Status: Connection failed");
                println!("  Error: {e}");
            }
        }
        println!();

        println!("Telegram:");
        println!("  Enabled: {}", config.telegram.enabled);
        let token = if config.telegram.token.is_empty() {
            "(not set)".to_string()
        } else {
            mask_secret(&config.telegram.token)
        };
        println!("  Token: {token}");
        if config.telegram.allow_from.is_empty() {
            println!("  Allow From: (empty - all users allowed)");
        } else {
            println!("  Allow From: {}", config.telegram.allow_from.join(", "));
        }

        Ok(())
    }
}

fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    } else {
        "***".to_string()
    }
}

fn mask_database_url(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };

    let Some((credentials, after_at)) = rest.split_once('@') else {
        return url.to_string();
    };

    let Some((username, _password)) = credentials.split_once(':') else {
        return url.to_string();
    };

    format!("{scheme}://{username}:***@{after_at}")
}
