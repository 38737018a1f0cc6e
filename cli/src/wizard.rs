use crate::render;
use anyhow::{Context, Result};
use console::style;
use dialoguer::{Confirm, Input, Select};
use hotline_core::{
    AssistantForm, AssistantRecord, FormError, FormState, Language, NAME_MAX_CHARS, Tone,
};

fn print_step(step: usize, total: usize, title: &str) {
    println!();
    println!(
        "{}",
        style(format!("[{}/{}] {}", step, total, title))
            .cyan()
            .bold()
    );
    println!();
}

fn print_validation(error: &impl std::fmt::Display) {
    eprintln!("  {} {}", style("!").red().bold(), style(error).red());
}

/// Drives an opened form until it is submitted or cancelled. Returns `None`
/// when the user cancels.
pub fn run(form: &mut AssistantForm, existing: &[AssistantRecord]) -> Result<Option<AssistantRecord>> {
    let title = if form.is_edit() {
        "Edit assistant"
    } else {
        "New AI assistant"
    };
    println!("  {}", style(title).white().bold());

    loop {
        match form.state() {
            FormState::Closed => return Ok(None),
            FormState::Step1 => {
                print_step(1, 2, "Basics");
                ask_identity(form)?;

                match form.next(existing) {
                    Ok(()) => {}
                    Err(FormError::Validation(e)) => print_validation(&e),
                    Err(e) => return Err(e.into()),
                }
            }
            FormState::Step2 => {
                print_step(2, 2, "Responses");
                ask_distribution(form)?;

                let submit_label = if form.is_edit() { "Save" } else { "Create" };
                let actions = [submit_label, "Back", "Cancel"];
                let action = Select::new()
                    .with_prompt("Next")
                    .items(&actions)
                    .default(0)
                    .interact()
                    .context("Failed to read action")?;

                match action {
                    0 => match form.submit() {
                        Ok(record) => return Ok(Some(record)),
                        Err(FormError::Validation(e)) => print_validation(&e),
                        Err(e) => return Err(e.into()),
                    },
                    1 => form.back()?,
                    _ => {
                        form.cancel();
                        return Ok(None);
                    }
                }
            }
        }
    }
}

fn ask_identity(form: &mut AssistantForm) -> Result<()> {
    let name: String = Input::new()
        .with_prompt(format!("Assistant name (max {NAME_MAX_CHARS})"))
        .with_initial_text(form.draft().name.clone())
        .allow_empty(true)
        .interact_text()
        .context("Failed to read name")?;

    form.set_name(&name);
    if form.draft().name.chars().count() < name.chars().count() {
        println!(
            "  {} Name cut to {} characters: {}",
            style("!").yellow(),
            NAME_MAX_CHARS,
            form.draft().name
        );
    }

    let languages = Language::ALL;
    let current = languages
        .iter()
        .position(|l| *l == form.draft().language)
        .unwrap_or(0);
    let selection = Select::new()
        .with_prompt("Language")
        .items(&languages)
        .default(current)
        .interact()
        .context("Failed to select language")?;
    form.set_language(languages[selection]);

    let tones = Tone::ALL;
    let current = tones
        .iter()
        .position(|t| *t == form.draft().tone)
        .unwrap_or(0);
    let selection = Select::new()
        .with_prompt("Tone")
        .items(&tones)
        .default(current)
        .interact()
        .context("Failed to select tone")?;
    form.set_tone(tones[selection]);

    Ok(())
}

fn ask_distribution(form: &mut AssistantForm) -> Result<()> {
    println!("  {}", style("Response length mix (must add up to 100%)").dim());

    let short = ask_percent("Short (%)", form.draft().short)?;
    form.set_short(short);
    let medium = ask_percent("Medium (%)", form.draft().medium)?;
    form.set_medium(medium);
    let long = ask_percent("Long (%)", form.draft().long)?;
    form.set_long(long);

    println!("  {}", render::distribution_line(form.distribution_status()));

    let audio = Confirm::new()
        .with_prompt("Enable audio responses?")
        .default(form.draft().audio_enabled)
        .interact()
        .context("Failed to read audio toggle")?;
    form.set_audio_enabled(audio);

    Ok(())
}

fn ask_percent(prompt: &str, current: i64) -> Result<i64> {
    Input::<i64>::new()
        .with_prompt(prompt)
        .default(current)
        .interact_text()
        .with_context(|| format!("Failed to read {}", prompt))
}
