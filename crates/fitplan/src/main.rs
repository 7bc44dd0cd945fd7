use anyhow::{Context, Result, bail};
use clap::{Args as ClapArgs, Parser, Subcommand};
use fitplan_engine::cli::{self, OutputHandlers, ReplOptions};
use fitplan_engine::config::{ConfigLoader, FitplanConfig, OutputFormat};
use fitplan_engine::parser::FormatOptions;
use fitplan_engine::profile::{Biometrics, calculate_bmi};
use fitplan_engine::protocol::{PlanKind, ProfileUpdate, UserLogin, UserProfile};
use fitplan_engine::session::Session;
use fitplan_engine::source::{
    FileSource, HttpSource, LoadedPlan, SourceError, SuggestionSource, load_plan, parse_plan,
};
use std::io::Read;
use std::path::PathBuf;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fitplan", version, about = "Render AI-generated workout and nutrition plans")]
struct Args {
    /// Config file (defaults to ./fitplan.yaml, then ~/.fitplan/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Bearer token for the suggestion service
    #[arg(long, global = true, env = "FITPLAN_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Suggestion service base URL
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(ClapArgs)]
struct RenderArgs {
    /// Output format (text, markdown, json)
    #[arg(long)]
    format: Option<OutputFormat>,

    /// Leave out the plan banner
    #[arg(long)]
    no_banner: bool,

    /// Leave out the closing disclaimer
    #[arg(long)]
    no_disclaimer: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Render a plan file (raw text or saved suggestion JSON); `-` reads stdin
    Render {
        path: String,
        /// workout or nutrition (taken from the file when it is a saved suggestion)
        #[arg(long)]
        kind: Option<PlanKind>,
        #[command(flatten)]
        render: RenderArgs,
    },
    /// Classify lines typed at the prompt
    Classify {
        #[arg(long, default_value = "workout")]
        kind: PlanKind,
    },
    /// List saved plans, or render one with --show
    History {
        /// Read a saved history export instead of calling the service
        #[arg(long)]
        file: Option<PathBuf>,
        #[arg(long)]
        kind: Option<PlanKind>,
        /// Render the plan with this id
        #[arg(long)]
        show: Option<String>,
        #[command(flatten)]
        render: RenderArgs,
    },
    /// Ask the service for a new plan and render it
    Generate {
        kind: PlanKind,
        #[command(flatten)]
        render: RenderArgs,
    },
    /// Delete a saved plan
    Delete { id: String },
    /// Log in and print the access token, or store it with --save
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "FITPLAN_PASSWORD", hide_env_values = true)]
        password: String,
        /// Write the token into the config file
        #[arg(long)]
        save: bool,
    },
    /// Show the profile and BMI, optionally updating biometrics first
    Profile {
        #[arg(long)]
        age: Option<u32>,
        /// Weight in kg
        #[arg(long)]
        weight: Option<f64>,
        /// Height in cm
        #[arg(long)]
        height: Option<u32>,
    },
}

struct Renderer {
    format: OutputFormat,
    options: FormatOptions,
}

impl Renderer {
    fn new(config: &FitplanConfig, args: &RenderArgs) -> Self {
        let mut options = config.render.format_options();
        if args.no_banner {
            options.show_banner = false;
        }
        if args.no_disclaimer {
            options.show_disclaimer = false;
        }
        Self {
            format: args.format.unwrap_or(config.render.format),
            options,
        }
    }

    fn print(&self, content: &str, kind: PlanKind) -> Result<()> {
        let rendered = cli::render_plan(content, kind, self.format, self.options)?;
        println!("{}", rendered.trim_end());
        Ok(())
    }
}

fn init_logging(config: &FitplanConfig) {
    // Logs go to stderr so rendered plans on stdout stay clean.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

fn http_source(args: &Args, config: &FitplanConfig) -> Result<HttpSource> {
    let session = match &args.token {
        Some(token) => Session::with_token(token.clone()),
        None => config.session.session(),
    };
    if !session.is_authenticated() {
        debug!("No token configured, requests will be anonymous");
    }
    let base_url = args.api_url.as_deref().unwrap_or(&config.api.base_url);
    Ok(HttpSource::new(base_url, session, config.api.timeout())?)
}

fn explain(err: SourceError) -> anyhow::Error {
    match err {
        SourceError::Unauthorized => anyhow::anyhow!(
            "{}. Pass --token, set FITPLAN_TOKEN or session.token in the config.",
            SourceError::Unauthorized
        ),
        other => other.into(),
    }
}

fn print_profile(profile: &UserProfile) {
    let bmi = calculate_bmi(profile.weight, profile.height);
    println!("{}", profile.full_name);
    println!("  Idade:        {} anos", profile.age);
    println!("  Peso:         {:.1} kg", profile.weight);
    println!("  Altura:       {} cm", profile.height);
    println!("  IMC:          {:.1} ({})", bmi.value, bmi.category.label());
    println!("  Objetivos:    {}", profile.objectives);
    println!("  Treino:       {}", profile.training_type.label());
    if let Some(restrictions) = &profile.dietary_restrictions {
        println!("  Restrições:   {}", restrictions);
    }
    if let Some(activities) = &profile.current_activities {
        println!("  Atividades:   {}", activities);
    }

    let biometrics = Biometrics {
        age: profile.age,
        weight_kg: profile.weight,
        height_cm: profile.height,
    };
    if let Err(e) = biometrics.validate() {
        warn!("Stored profile is out of range: {}", e);
    }
    if (bmi.value - profile.bmi).abs() > 0.05 {
        warn!(
            "Service reported BMI {:.1}, recomputed {:.1}",
            profile.bmi, bmi.value
        );
    }
}

async fn read_input(path: &str) -> Result<LoadedPlan> {
    if path == "-" {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .context("Failed to read plan from stdin")?;
        return Ok(parse_plan(content));
    }
    Ok(load_plan(&PathBuf::from(path)).await?)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = ConfigLoader::load(args.config.as_deref())
        .await
        .context("Failed to load configuration")?;
    init_logging(&config);

    match &args.command {
        Command::Render { path, kind, render } => {
            let plan = read_input(path).await?;
            let kind = cli::resolve_kind(&plan, *kind);
            Renderer::new(&config, render).print(&plan.content, kind)?;
        }
        Command::Classify { kind } => {
            let output = OutputHandlers {
                out: |msg| println!("{}", msg),
                err: |msg| eprintln!("{}", msg),
            };
            let options = ReplOptions {
                banner_lines: &[
                    "Enter plan lines to see how each one is classified.",
                    "Switch variant with ':workout' or ':nutrition'.",
                    "Type 'exit' or 'quit' to close.",
                ],
                prompt: "> ",
                exit_commands: &["exit", "quit"],
            };
            if let Err(e) = cli::run_repl(*kind, output, options).await {
                bail!("Error during session: {}", e);
            }
        }
        Command::History {
            file,
            kind,
            show,
            render,
        } => {
            let mut source: Box<dyn SuggestionSource> = match file {
                Some(path) => Box::new(FileSource::new(path.clone())),
                None => Box::new(http_source(&args, &config)?),
            };
            match show {
                Some(id) => {
                    let suggestion = source.fetch(id).await.map_err(explain)?;
                    Renderer::new(&config, render).print(&suggestion.content, suggestion.kind)?;
                }
                None => {
                    let history = source.history().await.map_err(explain)?;
                    if history.is_empty() {
                        println!("No saved plans.");
                    }
                    for line in cli::history_lines(&history, *kind) {
                        println!("{}", line);
                    }
                }
            }
        }
        Command::Generate { kind, render } => {
            let mut source = http_source(&args, &config)?;
            let suggestion = source.generate(*kind).await.map_err(explain)?;
            info!("Generated suggestion {}", suggestion.id);
            Renderer::new(&config, render).print(&suggestion.content, suggestion.kind)?;
        }
        Command::Delete { id } => {
            let mut source = http_source(&args, &config)?;
            source.delete(id).await.map_err(explain)?;
            println!("Deleted {}", id);
        }
        Command::Login {
            email,
            password,
            save,
        } => {
            let mut source = http_source(&args, &config)?;
            let token = source
                .login(&UserLogin {
                    email: email.clone(),
                    password: password.clone(),
                })
                .await?;
            if *save {
                let path = ConfigLoader::save_path(args.config.as_deref())?;
                let mut updated = config.clone();
                updated.session.token = Some(token.access_token.clone());
                ConfigLoader::save_to(&path, &updated).await?;
                println!("Token saved to {}", path.display());
            } else {
                println!("{}", token.access_token);
            }
        }
        Command::Profile {
            age,
            weight,
            height,
        } => {
            let mut source = http_source(&args, &config)?;
            let update = ProfileUpdate {
                age: *age,
                weight: *weight,
                height: *height,
                ..Default::default()
            };
            let profile = if update.is_empty() {
                source.profile().await
            } else {
                source.update_profile(&update).await
            }
            .map_err(explain)?;
            print_profile(&profile);
        }
    }

    Ok(())
}
