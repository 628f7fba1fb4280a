mod display;
mod input;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use feedtag_ai::config::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use feedtag_ai::{ApiKey, GeminiClient, GeminiConfig, analyze_post};
use feedtag_core::{Normalizer, TagSet};

#[derive(Parser)]
#[command(name = "feedtag", version, about = "Summarize and tag social feed posts")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Summarize and tag a post.
    Analyze {
        /// Post text. Read from --file or stdin when omitted.
        text: Option<String>,
        #[arg(long, conflicts_with = "text")]
        file: Option<PathBuf>,
        /// Ask for a plain-text answer instead of a function call.
        #[arg(long)]
        no_structured: bool,
        #[command(flatten)]
        output: OutputArgs,
        #[command(flatten)]
        gemini: GeminiArgs,
    },
    /// Normalize a saved generateContent response (or raw completion text).
    Normalize {
        path: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Check that the API key is accepted.
    VerifyKey {
        #[command(flatten)]
        gemini: GeminiArgs,
    },
    /// List the tags a post can receive.
    Tags {
        #[arg(long)]
        legacy_tags: bool,
    },
}

#[derive(Args)]
struct OutputArgs {
    /// Print JSON instead of a card.
    #[arg(long)]
    json: bool,
    /// Restrict tags to the four-label legacy set.
    #[arg(long)]
    legacy_tags: bool,
}

#[derive(Args)]
struct GeminiArgs {
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
    #[arg(long, default_value = DEFAULT_MODEL)]
    model: String,
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,
}

impl GeminiArgs {
    fn client(self, tag_set: TagSet, structured_output: bool) -> GeminiClient {
        let config = GeminiConfig::new(ApiKey::new(self.api_key.unwrap_or_default()))
            .with_model(self.model)
            .with_base_url(self.base_url)
            .with_tag_set(tag_set)
            .with_structured_output(structured_output);
        GeminiClient::new(config)
    }
}

fn tag_set(legacy: bool) -> TagSet {
    if legacy {
        TagSet::Legacy
    } else {
        TagSet::Canonical
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::Analyze {
            text,
            file,
            no_structured,
            output,
            gemini,
        } => {
            let post = input::read_post_text(text, file.as_deref())?;
            let tags = tag_set(output.legacy_tags);
            let client = gemini.client(tags, !no_structured);
            let result = analyze_post(&client, &Normalizer::with_tag_set(tags), &post).await?;
            display::print_result(&result, output.json)?;
        }
        Command::Normalize { path, output } => {
            let payload = input::read_payload(&path)?;
            let result = Normalizer::with_tag_set(tag_set(output.legacy_tags))
                .normalize(&payload)
                .with_context(|| format!("normalizing {}", path.display()))?;
            display::print_result(&result, output.json)?;
        }
        Command::VerifyKey { gemini } => {
            gemini
                .client(TagSet::Canonical, true)
                .verify_key()
                .await
                .context("API key check failed")?;
            println!("API connection verified");
        }
        Command::Tags { legacy_tags } => display::print_tags(tag_set(legacy_tags)),
    }

    Ok(())
}
