//! Display helpers for autodiagctl output.

use crate::orchestrator::{DiagnosisReport, OrchestratorError, ReportSource};
use anyhow::Result;
use autodiag_shared::part_images::PartImage;
use autodiag_shared::zones::zones_for_view;
use autodiag_shared::{CarView, InterpretationResult, VisualContext};
use owo_colors::OwoColorize;
use serde::Serialize;

const WRAP_WIDTH: usize = 76;
const KEY_WIDTH: usize = 12;

fn print_kv(key: &str, value: &str, width: usize) {
    println!("  {:width$} {}", key.dimmed(), value, width = width);
}

fn print_wrapped(text: &str) {
    let options = textwrap::Options::new(WRAP_WIDTH)
        .initial_indent("  ")
        .subsequent_indent("  ");
    for paragraph in text.split("\n\n") {
        println!("{}", textwrap::fill(paragraph.trim(), &options));
        println!();
    }
}

fn print_visual_context(ctx: &VisualContext) {
    let part = if ctx.specific_part_name.is_empty() {
        "(não identificada)"
    } else {
        ctx.specific_part_name.as_str()
    };
    print_kv("peça", part, KEY_WIDTH);
    print_kv("vista", ctx.car_view_needed.label(), KEY_WIDTH);
    match ctx.highlight_zone_id {
        Some(zone) => print_kv("zona", &format!("{} ({})", zone.label(), zone), KEY_WIDTH),
        None => print_kv("zona", "-", KEY_WIDTH),
    }
}

fn print_part_image_line(image: &PartImage) {
    print_kv("imagem", image.url, KEY_WIDTH);
}

/// Print a finished diagnosis
pub fn print_report(report: &DiagnosisReport) {
    println!();
    match report.source {
        ReportSource::Remote => println!("{}", "Diagnóstico".green().bold()),
        ReportSource::Offline => println!("{}", "Diagnóstico offline".yellow().bold()),
    }
    println!();

    if let Some(note) = &report.remote_failure {
        println!(
            "  {} {}",
            "!".yellow().bold(),
            format!("Serviço indisponível: {}", note.message).dimmed()
        );
        if let Some(code) = note.code {
            println!("    {}", format!("código: {}", code).dimmed());
        }
        if note.retryable {
            println!("    {}", "Tente novamente em alguns instantes.".yellow());
        }
        println!();
    }

    if let Some(entry) = report.offline_entry {
        println!("  {}", entry.title.bold());
        println!();
    }

    print_wrapped(&report.narrative);

    if let Some(entry) = report.offline_entry {
        println!("  {}", "Causas prováveis".bold());
        for cause in entry.probable_causes {
            println!("    - {}", cause);
        }
        println!();
        print_kv("gravidade", &entry.severity.to_string(), KEY_WIDTH);
        print_kv("recomendação", entry.recommendation, KEY_WIDTH);
    }

    if let Some(ctx) = &report.visual_context {
        print_visual_context(ctx);
    }
    if let Some(category) = report.legacy_category {
        print_kv("categoria", category.as_str(), KEY_WIDTH);
    }
    if let Some(image) = &report.part_image {
        print_part_image_line(image);
    }
    if let Some(thread_id) = &report.thread_id {
        print_kv("thread", thread_id, KEY_WIDTH);
    }
    println!();
}

/// Print the result of interpreting a raw assistant reply
pub fn print_interpretation(result: &InterpretationResult) {
    println!();
    println!(
        "{} {}",
        "Interpretação".bright_cyan().bold(),
        format!("({:?})", result.strategy).dimmed()
    );
    println!();
    print_wrapped(&result.narrative);

    match &result.visual_context {
        Some(ctx) => {
            print_visual_context(ctx);
            if let Some(category) = result.legacy_category() {
                print_kv("categoria", category.as_str(), KEY_WIDTH);
            }
        }
        None => println!("  {}", "Sem contexto visual".dimmed()),
    }
    println!();
}

/// List zones, grouped per view
pub fn print_zones(view: Option<CarView>) {
    let views: Vec<CarView> = match view {
        Some(v) => vec![v],
        None => CarView::ALL.to_vec(),
    };

    for view in views {
        println!();
        println!("{} {}", "Vista".bold(), view.label().bright_cyan().bold());
        for zone in zones_for_view(view) {
            println!(
                "  {:28} {:26} {}",
                zone.as_str(),
                zone.label(),
                zone.legacy_category().as_str().dimmed()
            );
        }
    }
    println!();
}

pub fn print_part_image(name: &str, image: &PartImage, matched: bool) {
    println!();
    print_kv("peça", name, KEY_WIDTH);
    print_kv("imagem", image.url, KEY_WIDTH);
    print_kv("descrição", image.alt, KEY_WIDTH);
    print_kv("categoria", image.category, KEY_WIDTH);
    if !matched {
        println!("  {}", "Sem imagem específica, usando imagem genérica".dimmed());
    }
    println!();
}

/// Print a failed diagnosis to stderr
pub fn print_failure(err: &OrchestratorError) {
    eprintln!();
    eprintln!("{} {}", "Erro:".red().bold(), err);

    if let OrchestratorError::Remote(failure) = err {
        if let Some(code) = failure.code {
            eprintln!("  {}", format!("código: {}", code).dimmed());
        }
        if let Some(details) = &failure.details {
            eprintln!("  {}", format!("detalhes: {}", details).dimmed());
        }
        if failure.retryable() {
            eprintln!("  {}", "Tente novamente em alguns instantes.".yellow());
        }
    }
    eprintln!();
}

/// Print any value as pretty JSON, stamped with the generation time
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut json = serde_json::to_value(value)?;
    if let Some(obj) = json.as_object_mut() {
        obj.insert(
            "generated_at".to_string(),
            serde_json::Value::String(chrono::Utc::now().to_rfc3339()),
        );
    }
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
