use crate::{render, wizard};
use anyhow::{Context, Result};
use console::style;
use dialoguer::Confirm;
use hotline_core::{
    AssistantForm, AssistantRecord, AssistantStore, ChatSimulator, Config, Language,
    PromptEditor, PromptSaver, SaveOutcome, Tone,
};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(clap::Subcommand, Clone, Debug)]
pub enum AssistantCommands {
    /// List all assistants, newest first
    List,
    /// Show one assistant, including its system prompt
    Show { assistant: String },
    /// Create an assistant (interactive unless --name is given)
    Create(CreateArgs),
    /// Edit an assistant with the interactive wizard
    Edit { assistant: String },
    /// Delete an assistant after confirmation
    Delete {
        assistant: String,
        #[arg(short, long)]
        yes: bool,
    },
    /// Replace an assistant's system prompt
    Train {
        assistant: String,
        #[arg(short, long, conflicts_with = "file")]
        prompt: Option<String>,
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Preview the assistant in the chat simulator
    Chat {
        assistant: String,
        #[arg(short, long)]
        message: Option<String>,
    },
}

#[derive(clap::Args, Clone, Debug)]
pub struct CreateArgs {
    #[arg(short, long)]
    name: Option<String>,
    #[arg(long, default_value = "spanish")]
    language: Language,
    #[arg(long, default_value = "professional")]
    tone: Tone,
    #[arg(long, default_value_t = 30, allow_negative_numbers = true)]
    short: i64,
    #[arg(long, default_value_t = 40, allow_negative_numbers = true)]
    medium: i64,
    #[arg(long, default_value_t = 30, allow_negative_numbers = true)]
    long: i64,
    #[arg(long)]
    audio: bool,
}

pub async fn handle_command(
    command: AssistantCommands,
    store: AssistantStore,
    config: &Config,
) -> Result<()> {
    match command {
        AssistantCommands::List => {
            render::print_list(store.list());
            Ok(())
        }
        AssistantCommands::Show { assistant } => {
            render::print_detail(resolve(&store, &assistant)?);
            Ok(())
        }
        AssistantCommands::Create(args) => create_assistant(store, args).await,
        AssistantCommands::Edit { assistant } => edit_assistant(store, &assistant).await,
        AssistantCommands::Delete { assistant, yes } => {
            delete_assistant(store, &assistant, yes).await
        }
        AssistantCommands::Train {
            assistant,
            prompt,
            file,
        } => train_assistant(store, config, &assistant, prompt, file).await,
        AssistantCommands::Chat { assistant, message } => {
            chat(&store, config, &assistant, message).await
        }
    }
}

/// Looks an assistant up by id, then by (case-insensitive) name.
fn resolve<'a>(store: &'a AssistantStore, key: &str) -> Result<&'a AssistantRecord> {
    store
        .get(key)
        .or_else(|| store.find_by_name(key))
        .ok_or_else(|| anyhow::anyhow!("Assistant not found: {}", key))
}

async fn create_assistant(mut store: AssistantStore, args: CreateArgs) -> Result<()> {
    let mut form = AssistantForm::new();
    form.open_create();

    let record = match args.name {
        Some(name) => {
            form.set_name(&name);
            form.set_language(args.language);
            form.set_tone(args.tone);
            form.next(store.list())?;

            form.set_short(args.short);
            form.set_medium(args.medium);
            form.set_long(args.long);
            form.set_audio_enabled(args.audio);
            form.submit()?
        }
        None => match wizard::run(&mut form, store.list())? {
            Some(record) => record,
            None => {
                println!("{} Cancelled, nothing saved", style("!").yellow());
                return Ok(());
            }
        },
    };

    let name = record.name.clone();
    let id = record.id.clone();
    store.save(record);
    store.flush().await?;

    println!(
        "{} Assistant '{}' created ({})",
        style("✓").green().bold(),
        name,
        style(id).dim()
    );
    Ok(())
}

async fn edit_assistant(mut store: AssistantStore, key: &str) -> Result<()> {
    let existing = resolve(&store, key)?.clone();

    let mut form = AssistantForm::new();
    form.open_edit(&existing);

    let Some(record) = wizard::run(&mut form, store.list())? else {
        println!("{} Cancelled, nothing saved", style("!").yellow());
        return Ok(());
    };

    let name = record.name.clone();
    store.save(record);
    store.flush().await?;

    println!("{} Assistant '{}' updated", style("✓").green().bold(), name);
    Ok(())
}

async fn delete_assistant(mut store: AssistantStore, key: &str, yes: bool) -> Result<()> {
    let target = resolve(&store, key)?.clone();

    let confirmed = yes
        || Confirm::new()
            .with_prompt(format!("Delete '{}'? This cannot be undone", target.name))
            .default(false)
            .interact()
            .context("Failed to read confirmation")?;

    if !confirmed {
        println!("{} Kept '{}'", style("!").yellow(), target.name);
        return Ok(());
    }

    store.remove(&target.id);
    store.flush().await?;

    println!(
        "{} Assistant '{}' deleted",
        style("✓").green().bold(),
        target.name
    );
    Ok(())
}

async fn train_assistant(
    store: AssistantStore,
    config: &Config,
    key: &str,
    prompt: Option<String>,
    file: Option<PathBuf>,
) -> Result<()> {
    let target = resolve(&store, key)?.clone();

    let text = match (prompt, file) {
        (Some(prompt), _) => prompt,
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read prompt from {}", path.display()))?,
        (None, None) => anyhow::bail!("Provide the new prompt with --prompt or --file"),
    };

    let mut editor = PromptEditor::new(&target);
    editor.set_text(&text);

    if editor.char_count() < text.chars().count() {
        println!(
            "  {} Prompt cut to {} characters",
            style("!").yellow(),
            editor.char_count()
        );
    }

    if !editor.is_dirty() {
        println!("{} No changes to save", style("!").yellow());
        return Ok(());
    }

    let store = Arc::new(tokio::sync::Mutex::new(store));
    let saver = PromptSaver::from_config(store.clone(), config);

    println!("{} Saving...", style("→").cyan());
    let outcome = saver.save(editor.assistant_id(), editor.text()).await?;
    store.lock().await.flush().await?;

    match outcome {
        SaveOutcome::Committed => println!(
            "{} System prompt saved for '{}' ({} characters)",
            style("✓").green().bold(),
            target.name,
            editor.char_count()
        ),
        SaveOutcome::Superseded => {
            println!("{} A newer save replaced this one", style("!").yellow())
        }
        SaveOutcome::NotFound => anyhow::bail!("Assistant disappeared while saving: {}", key),
    }

    Ok(())
}

async fn chat(
    store: &AssistantStore,
    config: &Config,
    key: &str,
    message: Option<String>,
) -> Result<()> {
    let target = resolve(store, key)?;
    let mut simulator = ChatSimulator::new(target).with_delay(config.reply_delay());
    let name = simulator.assistant_name().to_string();

    if let Some(message) = message {
        if let Some(reply) = simulator.send(&message).await {
            render::print_chat_message(reply, &name);
        }
        return Ok(());
    }

    println!(
        "💬 {} {}",
        style(&name).cyan().bold(),
        style("online (simulated)").dim()
    );
    println!("Type a message, /reset to clear, Ctrl+D to exit:\n");
    for message in simulator.messages() {
        render::print_chat_message(message, &name);
    }

    let stdin = io::stdin();
    loop {
        print!("> ");
        let _ = io::stdout().flush();

        let mut input = String::new();
        match stdin.lock().read_line(&mut input) {
            Ok(0) | Err(_) => {
                println!("\n👋 Goodbye!");
                break;
            }
            Ok(_) => {
                let input = input.trim();
                if input.is_empty() {
                    continue;
                }

                if input == "/reset" {
                    simulator.reset();
                    println!("  {}", style("Chat cleared").dim());
                    continue;
                }

                if simulator.push_user(input) {
                    println!("  {}", style(format!("{} is typing...", name)).dim());
                    let reply = simulator.reply().await;
                    render::print_chat_message(reply, &name);
                }
                println!();
            }
        }
    }

    Ok(())
}
