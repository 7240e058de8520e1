// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info};
use std::io::Write;
use std::path::PathBuf;

use translore::app_config::{Config, LogLevel};
use translore::{Controller, SceneReport, TranslationReport};

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate text with both engines, back-translate and judge the drift
    Translate {
        /// Text to translate
        #[arg(value_name = "TEXT")]
        text: String,
    },

    /// Print the prompt the LLM engine would receive
    Prompt {
        /// Text to build the prompt for
        #[arg(value_name = "TEXT")]
        text: String,

        /// Build the plain prompt without retrieved knowledge
        #[arg(long)]
        no_rag: bool,
    },

    /// Print the scenes detected in a text and the knowledge retrieved for it
    Scenes {
        /// Text to analyse
        #[arg(value_name = "TEXT")]
        text: String,
    },

    /// Test the connection to both translation engines
    Check,

    /// Generate shell completions for translore
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Options shared by every command that needs a controller
#[derive(Args, Debug)]
struct CommonArgs {
    /// Configuration file path
    #[arg(short, long, global = true, default_value = "conf.json")]
    config_path: PathBuf,

    /// Source language (ISO code, English or Chinese name)
    #[arg(short, long, global = true)]
    source_language: Option<String>,

    /// Target language (ISO code, English or Chinese name)
    #[arg(short, long, global = true)]
    target_language: Option<String>,

    /// Set logging level
    #[arg(short, long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,

    /// DeepL API key, used when the configuration has none
    #[arg(long, env = "DEEPL_API_KEY", hide_env_values = true)]
    deepl_api_key: Option<String>,

    /// DeepSeek API key, used when the configuration has none
    #[arg(long, env = "DEEPSEEK_API_KEY", hide_env_values = true)]
    deepseek_api_key: Option<String>,
}

/// translore - knowledge-enhanced translation with engine arbitration
///
/// Translates text with DeepL and DeepSeek, picks the better result, checks it
/// by back-translation and learns new expressions into a scene-tagged
/// knowledge base.
#[derive(Parser, Debug)]
#[command(name = "translore")]
#[command(version)]
#[command(about = "Knowledge-enhanced translation with engine arbitration")]
#[command(long_about = "translore translates text with a phrase-based engine (DeepL) and an LLM (DeepSeek), \
picks the better result and checks it by back-translation.

EXAMPLES:
    translore translate \"他是个老司机\"              # Translate with the default config
    translore -t ja translate \"打酱油\"              # Translate into Japanese
    translore prompt \"API接口返回JSON数据\"          # Show the knowledge-enhanced prompt
    translore prompt --no-rag \"你好\"                # Show the plain prompt
    translore scenes \"我喜欢看NBA比赛\"              # Show detected scenes and knowledge
    translore check                                 # Test both API connections
    translore completions bash > translore.bash     # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically. Empty API keys are read from DEEPL_API_KEY and
    DEEPSEEK_API_KEY.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    common: CommonArgs,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Colour escape and emoji for log level
    fn get_style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("1;31", "❌ "),
            Level::Warn => ("1;33", "🚧 "),
            Level::Info => ("1;32", " "),
            Level::Debug => ("1;36", "🔍 "),
            Level::Trace => ("1;35", "📋 "),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (colour, emoji) = Self::get_style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "\x1B[{}m{} {} {}\x1B[0m", colour, now, emoji, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with the most verbose level; the effective
    // level is set through log::set_max_level once the config is loaded
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "translore", &mut std::io::stdout());
        return Ok(());
    }

    let config = load_config(&cli.common)?;
    log::set_max_level(config.log_level.to_level_filter());

    match cli.command {
        Commands::Translate { text } => {
            config.validate().context("Configuration validation failed")?;
            let controller = Controller::with_config(config)?;
            let report = controller.translate(&text).await?;
            print_translation(&report);
        }
        Commands::Prompt { text, no_rag } => {
            let controller = Controller::with_config(config)?;
            println!("{}", controller.prompt(&text, !no_rag));
        }
        Commands::Scenes { text } => {
            let controller = Controller::with_config(config)?;
            print_scenes(&controller.scenes(&text));
        }
        Commands::Check => {
            config.validate().context("Configuration validation failed")?;
            let controller = Controller::with_config(config)?;
            controller.check_connections().await?;
        }
        Commands::Completions { .. } => {}
    }

    Ok(())
}

/// Load or create the configuration and apply command line overrides.
fn load_config(options: &CommonArgs) -> Result<Config> {
    let mut config = Config::load_or_create(&options.config_path)?;

    if let Some(source_lang) = &options.source_language {
        config.source_language = source_lang.clone();
    }
    if let Some(target_lang) = &options.target_language {
        config.target_language = target_lang.clone();
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }
    config.apply_api_keys(options.deepl_api_key.clone(), options.deepseek_api_key.clone());

    Ok(config)
}

fn print_translation(report: &TranslationReport) {
    if !report.succeeded() {
        println!("Translation failed: both engines returned nothing");
        return;
    }

    println!("{}", report.translation);
    println!();
    for (index, chunk) in report.chunks.iter().enumerate() {
        let decision = &chunk.decision;
        if report.is_chunked() {
            println!("chunk {}/{}:", index + 1, report.chunks.len());
        }
        println!("method:      {} (confidence {:.2})", decision.method, decision.confidence);
        if let Some(scores) = &decision.scores {
            println!(
                "scores:      phrase {:.2}, llm {:.2}",
                scores.phrase.overall(),
                scores.llm.overall()
            );
        }
    }
    if let Some(back) = &report.back_translation {
        println!("back:        {}", back);
    }
    if let Some(drift) = &report.drift {
        println!(
            "drift:       {:.2} {} (threshold {:.2}, {})",
            drift.similarity,
            drift.level,
            drift.threshold,
            if drift.is_consistent { "consistent" } else { "inconsistent" }
        );
        println!("suggestion:  {}", drift.suggestion());
    }
    if let Some(candidate) = &report.learned {
        info!(
            "Learned '{}' into scene {} (confidence {:.2})",
            candidate.phrase, candidate.scene, candidate.confidence
        );
    }
}

fn print_scenes(report: &SceneReport) {
    if report.scenes.is_empty() {
        println!("No scene detected");
    }
    for scene in &report.scenes {
        println!("{:<12} {:.2}", scene.scene, scene.confidence);
    }

    if !report.expressions.is_empty() {
        println!();
    }
    for (index, result) in report.expressions.iter().enumerate() {
        println!(
            "{}. [{}] {} (relevance {:.2})",
            index + 1,
            result.scene_name,
            result.expression.source,
            result.relevance
        );
    }
}
