//! Ad-hoc access to the date parser and the model endpoints.

use clap::Subcommand;
use stockpulse_nlp::{parse_date, SentimentClient, TranslationClient};

/// Sub-commands available under `nlp`.
#[derive(Debug, Subcommand)]
pub enum NlpCommands {
    /// Normalize a day/month/year date to an ISO-8601 timestamp
    ParseDate {
        /// Raw date, e.g. "15/03/2024"
        value: String,
    },
    /// Translate Vietnamese text to English
    Translate {
        text: String,
        /// Translation endpoint; defaults to `TRANSLATION_URL`
        #[arg(long, env = "TRANSLATION_URL")]
        url: String,
    },
    /// Classify the sentiment of financial text
    Sentiment {
        text: String,
        /// Classifier endpoint; defaults to `SENTIMENT_URL`
        #[arg(long, env = "SENTIMENT_URL")]
        url: String,
    },
}

const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub(crate) async fn run(command: NlpCommands) -> anyhow::Result<()> {
    let token = std::env::var("INFERENCE_API_TOKEN").ok();
    match command {
        NlpCommands::ParseDate { value } => match parse_date(&value) {
            Some(iso) => println!("{iso}"),
            None => anyhow::bail!("could not parse '{value}' as day/month/year"),
        },
        NlpCommands::Translate { text, url } => {
            let client = TranslationClient::new(&url, token.as_deref(), DEFAULT_TIMEOUT_SECS)?;
            let translated = client.request_translation(&text).await?;
            println!("{translated}");
        }
        NlpCommands::Sentiment { text, url } => {
            let client = SentimentClient::new(&url, token.as_deref(), DEFAULT_TIMEOUT_SECS)?;
            match client.analyze(&text).await {
                Some(label) => println!("{} ({:.4})", label.label, label.score),
                None => anyhow::bail!("sentiment analysis returned no label"),
            }
        }
    }
    Ok(())
}
