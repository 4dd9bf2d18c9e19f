//! Command implementations

use anyhow::{Context, Result};
use autodiag_shared::part_images::{has_part_image, part_image, part_image_url};
use autodiag_shared::rpc::InterpretResponse;
use autodiag_shared::zones::zones_for_view;
use autodiag_shared::{interpret, CarView};
use autodiagctl::client::DaemonClient;
use autodiagctl::display;
use autodiagctl::orchestrator::{self, DiagnosisSession, Mode};
use autodiagctl::stepper::StageSpinner;
use owo_colors::OwoColorize;
use std::io::Read;
use std::path::PathBuf;

pub async fn diagnose(
    daemon_url: Option<String>,
    symptom: Vec<String>,
    thread: Option<String>,
    offline: bool,
    json: bool,
) -> Result<()> {
    let client = DaemonClient::new(DaemonClient::discover_url(daemon_url.as_deref()))?;
    let mut session = match thread {
        Some(id) => DiagnosisSession::resume(id),
        None => DiagnosisSession::new(),
    };
    let mode = if offline { Mode::Offline } else { Mode::Remote };
    let symptom = symptom.join(" ");

    let spinner = if json {
        StageSpinner::hidden()
    } else {
        StageSpinner::new()
    };
    let outcome = orchestrator::diagnose(&client, &mut session, &symptom, mode, &spinner).await;
    spinner.finish();

    match outcome {
        Ok(report) if json => display::print_json(&report),
        Ok(report) => {
            display::print_report(&report);
            if let Some(thread_id) = session.thread_id() {
                println!(
                    "{}",
                    format!("Para continuar: autodiagctl diagnose --thread {} ...", thread_id).dimmed()
                );
            }
            Ok(())
        }
        Err(err) => {
            if json {
                display::print_json(&serde_json::json!({ "error": err.to_string() }))?;
            } else {
                display::print_failure(&err);
            }
            std::process::exit(1);
        }
    }
}

pub async fn interpret_file(file: Option<PathBuf>, json: bool) -> Result<()> {
    let text = match file {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            buf
        }
    };

    let result = interpret(&text);
    if json {
        display::print_json(&InterpretResponse::from(result))
    } else {
        display::print_interpretation(&result);
        Ok(())
    }
}

pub async fn zones(view: Option<String>, json: bool) -> Result<()> {
    let view = view.map(|raw| raw.parse::<CarView>()).transpose()?;

    if json {
        let views: Vec<CarView> = view.map(|v| vec![v]).unwrap_or_else(|| CarView::ALL.to_vec());
        let listing: Vec<_> = views
            .into_iter()
            .map(|v| {
                let zones: Vec<_> = zones_for_view(v)
                    .into_iter()
                    .map(|z| {
                        serde_json::json!({
                            "id": z,
                            "label": z.label(),
                            "legacy_category": z.legacy_category(),
                        })
                    })
                    .collect();
                serde_json::json!({ "view": v, "zones": zones })
            })
            .collect();
        return display::print_json(&serde_json::json!({ "views": listing }));
    }

    display::print_zones(view);
    Ok(())
}

pub async fn part_image_cmd(name: Vec<String>, url_only: bool) -> Result<()> {
    let name = name.join(" ");
    if url_only {
        println!("{}", part_image_url(Some(&name)));
        return Ok(());
    }
    let image = part_image(Some(&name));
    display::print_part_image(&name, &image, has_part_image(Some(&name)));
    Ok(())
}

pub async fn status(daemon_url: Option<String>) -> Result<()> {
    let client = DaemonClient::new(DaemonClient::discover_url(daemon_url.as_deref()))?;
    let health = client.health().await?;

    println!();
    println!("{} {}", "autodiagd".bright_cyan().bold(), health.version);
    println!("  {:12} {}", "daemon".dimmed(), health.status.green());
    println!("  {:12} {}s", "uptime".dimmed(), health.uptime_seconds);
    let assistant = if health.assistant_configured {
        "configurado".green().to_string()
    } else {
        "não configurado".red().to_string()
    };
    println!("  {:12} {}", "assistente".dimmed(), assistant);
    println!("  {:12} {}", "url".dimmed(), client.base_url());
    println!();
    Ok(())
}
