use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hc_core::{
    extraction::{self, ExtractionMethod},
    lipid::AnalyteBand,
    symptoms, ChatService, CoreConfig, LabPanel, LlmClient, NoteStore, NoteText,
};
use hc_llm::OpenAiClient;

#[derive(Parser)]
#[command(name = "hc")]
#[command(about = "Health Companion CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the selectable symptoms
    Symptoms,
    /// Predict a disease from symptoms
    Predict {
        /// Symptom names, e.g. "Fever" "Sore Throat"
        symptoms: Vec<String>,
    },
    /// Classify a lipid panel (values in mg/dL)
    Lipid {
        total_cholesterol: f64,
        hdl: f64,
        ldl: f64,
        triglycerides: f64,
    },
    /// Ask the health assistant
    Chat {
        /// Message text
        message: Vec<String>,
    },
    /// Read or append clinical notes
    Notes {
        #[command(subcommand)]
        command: NotesCommands,
    },
    /// Extract history fields from a note file
    Extract {
        /// Transcript or note file
        file: PathBuf,
        /// Use the language model instead of the regex extractor
        #[arg(long)]
        llm: bool,
    },
}

#[derive(Subcommand)]
enum NotesCommands {
    /// Print all stored notes
    List,
    /// Append a note
    Add {
        /// Note text
        text: Vec<String>,
    },
}

fn llm_client(cfg: &CoreConfig) -> anyhow::Result<Option<Arc<dyn LlmClient>>> {
    match cfg.llm() {
        Some(llm_cfg) => Ok(Some(Arc::new(OpenAiClient::new(llm_cfg)?))),
        None => Ok(None),
    }
}

fn print_band<B: AnalyteBand>(name: &str, value: f64, band: B) {
    println!("{name:<18} {value:>7.1}  {}", band.label());
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("hc=warn".parse()?))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let cfg = CoreConfig::from_lookup(|k| std::env::var(k).ok())?;

    match cli.command {
        Some(Commands::Symptoms) => {
            for symptom in symptoms::SYMPTOMS {
                println!("{symptom}");
            }
        }
        Some(Commands::Predict { symptoms: selected }) => {
            let result = symptoms::predict(&selected);
            println!(
                "Prediction: {} ({}% confidence)",
                result.prediction.label(),
                result.confidence
            );
            if let Some(disclaimer) = result.disclaimer() {
                println!("{disclaimer}");
            }
        }
        Some(Commands::Lipid {
            total_cholesterol,
            hdl,
            ldl,
            triglycerides,
        }) => {
            let panel = LabPanel::new(total_cholesterol, hdl, ldl, triglycerides);
            let assessment = panel.classify();
            print_band("Total cholesterol", panel.total_cholesterol, assessment.total_cholesterol);
            print_band("HDL", panel.hdl, assessment.hdl);
            print_band("LDL", panel.ldl, assessment.ldl);
            print_band("Triglycerides", panel.triglycerides, assessment.triglycerides);
            println!();
            println!("{}", assessment.result_text);
            for recommendation in &assessment.recommendations {
                println!("- {recommendation}");
            }
        }
        Some(Commands::Chat { message }) => {
            let chat = ChatService::new(llm_client(&cfg)?);
            println!("{}", chat.respond(&message.join(" ")).text);
        }
        Some(Commands::Notes { command }) => {
            let store = NoteStore::new(cfg.notes_file());
            match command {
                NotesCommands::List => {
                    let notes = store.read_all()?;
                    if notes.is_empty() {
                        println!("No notes found.");
                    }
                    for (i, note) in notes.iter().enumerate() {
                        println!("[{}]\n{note}\n", i + 1);
                    }
                }
                NotesCommands::Add { text } => {
                    let note = NoteText::new(text.join(" "))?;
                    store.append(&note)?;
                    println!("Saved note to {}", store.path().display());
                }
            }
        }
        Some(Commands::Extract { file, llm }) => {
            let note = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let method = if llm {
                ExtractionMethod::Llm
            } else {
                ExtractionMethod::Regex
            };
            let client = llm_client(&cfg)?;
            let history = extraction::extract(&note, method, client.as_deref())?;
            println!("Personal details: {}", history.personal_details);
            println!("Chief complaints: {}", history.chief_complaints);
            println!("Family history:   {}", history.family_history);
        }
        None => {
            println!("Use 'hc --help' for commands");
        }
    }

    Ok(())
}
