use console::style;
use hotline_core::{AssistantRecord, ChatMessage, DistributionStatus, Sender};

pub fn print_list(assistants: &[AssistantRecord]) {
    if assistants.is_empty() {
        println!("{} No active assistants", style("!").yellow());
        println!();
        println!("Create your first one:");
        println!("  hotline create");
        return;
    }

    println!(
        "{} My assistants ({})",
        style("✓").green().bold(),
        assistants.len()
    );
    println!();

    for assistant in assistants {
        print_card(assistant);
        println!();
    }
}

pub fn print_card(assistant: &AssistantRecord) {
    let config = &assistant.response_config;

    println!(
        "  {} {}",
        style(&assistant.name).white().bold(),
        style(format!("{} • {}", assistant.language, assistant.tone)).dim()
    );
    println!(
        "    Responses: {}% short / {}% medium / {}% long{}",
        config.short,
        config.medium,
        config.long,
        if config.audio_enabled { "  🔊" } else { "" }
    );
    println!(
        "    {} {}",
        style(format!("id {}", assistant.id)).dim(),
        style(format!("created {}", created_date(&assistant.created_at))).dim()
    );
}

pub fn print_detail(assistant: &AssistantRecord) {
    print_card(assistant);
    println!();
    println!("  {}", style("System prompt").cyan().bold());

    match assistant.system_prompt.as_deref() {
        Some(prompt) if !prompt.trim().is_empty() => {
            for line in prompt.lines() {
                println!("    {}", line);
            }
        }
        _ => println!("    {}", style("(empty)").dim()),
    }
}

pub fn distribution_line(status: DistributionStatus) -> String {
    let text = format!("Sum: {}%", status.sum);
    if status.is_valid {
        format!("{} {}", style("✓").green(), style(text).green())
    } else {
        format!("{} {}", style("✗").red(), style(text).red())
    }
}

pub fn print_chat_message(message: &ChatMessage, assistant_name: &str) {
    match message.sender {
        Sender::User => println!(
            "  {} {} {}",
            style("you").green().bold(),
            message.text,
            style(format!("{} ✓✓", message.time)).dim()
        ),
        Sender::Bot => println!(
            "  {} {} {}",
            style(assistant_name).cyan().bold(),
            message.text,
            style(&message.time).dim()
        ),
    }
}

fn created_date(created_at: &str) -> &str {
    created_at.split('T').next().unwrap_or(created_at)
}
