//! Line-oriented front end: one command per line on stdin, state changes
//! rendered to stdout as their events arrive.

use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;

use crate::{
    audio::commands::{list_atmospheres, play_atmosphere, set_volume, stop_atmosphere},
    breathing::commands::{start_breathing, stop_breathing},
    capture::CameraStatus,
    chat::commands::send_chat_message,
    events::{
        AppEvent, BREATHING_STATE_CHANGED, CAMERA_STATE_CHANGED, CHAT_STATE_CHANGED,
        MOOD_HISTORY_CHANGED, SCAN_STATE_CHANGED,
    },
    get_current_user,
    mood::commands::{get_dashboard_summary, open_dashboard},
    scan::commands::{open_scan, retry_camera, trigger_scan},
    support::get_support_directory,
    AppState, Page,
};

const HELP: &str = "\
Commands:
  chat <text>        talk to Pandora
  scan               capture a frame and analyze your mood
  retry-camera       ask for the camera again after a failure
  history            mood history for the week
  dashboard          mood summary and stress sources
  breathe            start the breathing exercise
  stop-breathing     stop the breathing exercise
  play <atmosphere>  play an ambient sound
  stop-sound         stop the ambient sound
  volume <0-1>       set the ambient volume
  support [tag]      crisis lines and therapists, optionally by specialty
  whoami             show the current user
  help               show this help
  quit               exit";

const CAMERA_SETTLE_TIMEOUT: Duration = Duration::from_secs(5);

enum Flow {
    Continue,
    Quit,
}

pub(crate) async fn run(state: AppState) -> Result<()> {
    let renderer = tokio::spawn(render_events(state.events.subscribe()));

    let user = get_current_user(&state);
    println!("Welcome back, {}. Type `help` for commands.", user.name);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match dispatch(&state, line).await {
            Ok(Flow::Continue) => {}
            Ok(Flow::Quit) => break,
            Err(message) => println!("! {}", message),
        }
    }

    state.navigate(Page::Home).await;
    renderer.abort();
    log::info!("MindCare shutting down");
    Ok(())
}

async fn dispatch(state: &AppState, line: &str) -> Result<Flow, String> {
    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    match command {
        "chat" => {
            send_chat_message(state, rest.to_string()).await?;
        }
        "scan" => {
            if state.page() != Page::Scan {
                open_scan(state).await?;
                wait_for_camera(state).await?;
            }
            let snapshot = trigger_scan(state)?;
            if let Some(error) = snapshot.error {
                println!("! {}", error);
            } else {
                println!("Analyzing...");
            }
        }
        "retry-camera" => {
            retry_camera(state)?;
        }
        "history" => {
            let history = open_dashboard(state).await?;
            for sample in &history.samples {
                println!("  {:<4} {:>3}  {}", sample.day, sample.score, sample.label);
            }
        }
        "dashboard" => {
            let summary = get_dashboard_summary(state).await?;
            println!("Average mood: {:.1}", summary.average_score);
            if let Some(best) = &summary.best_day {
                println!("Best day: {} ({})", best.day, best.score);
            }
            if let Some(latest) = &summary.latest {
                println!("Latest: {} {} ({})", latest.day, latest.label, latest.score);
            }
            println!("Stress sources:");
            for source in &summary.stress_sources {
                println!("  {:<8} {:>3}%", source.name, source.value);
            }
        }
        "breathe" => {
            let snapshot = start_breathing(state).await?;
            println!(
                "Breathing started: {:?} for {}s",
                snapshot.state.cycle.phase, snapshot.state.cycle.remaining_secs
            );
        }
        "stop-breathing" => {
            let snapshot = stop_breathing(state).await?;
            println!(
                "Breathing stopped after {} cycles",
                snapshot.state.cycle.completed_cycles
            );
        }
        "play" => {
            if rest.is_empty() {
                return Err(format!("Choose one of: {}", list_atmospheres().join(", ")));
            }
            let status = play_atmosphere(state, rest).await?;
            if let Some(atmosphere) = status.now_playing {
                println!("Playing {} at {:.0}%", atmosphere.name(), status.volume * 100.0);
            }
        }
        "stop-sound" => {
            stop_atmosphere(state)?;
            println!("Sound stopped");
        }
        "volume" => {
            let volume: f32 = rest
                .parse()
                .map_err(|_| format!("Expected a number between 0 and 1, got '{}'", rest))?;
            let status = set_volume(state, volume)?;
            println!("Volume {:.0}%", status.volume * 100.0);
        }
        "support" => {
            state.navigate(Page::Support).await;
            let tag = (!rest.is_empty()).then_some(rest);
            let directory = get_support_directory(tag);
            println!("If you are in crisis:");
            for resource in &directory.crisis_resources {
                println!("  {} ({}, {})", resource.name, resource.contact, resource.availability);
            }
            if directory.therapists.is_empty() {
                println!("No therapists match '{}'", rest);
            }
            for therapist in &directory.therapists {
                println!(
                    "  {}, {} ({} yrs): {}",
                    therapist.name,
                    therapist.role,
                    therapist.experience_years,
                    therapist.specialties.join(", ")
                );
            }
        }
        "whoami" => {
            let user = get_current_user(state);
            println!("{} ({:?})", user.name, user.role);
        }
        "help" => println!("{}", HELP),
        "quit" | "exit" => return Ok(Flow::Quit),
        other => return Err(format!("Unknown command '{}'. Type `help`.", other)),
    }
    Ok(Flow::Continue)
}

async fn wait_for_camera(state: &AppState) -> Result<(), String> {
    let settle = async {
        loop {
            let status = state.with_scan(|scan| Ok(scan.camera_status()))?;
            if status != CameraStatus::Requesting {
                return Ok::<_, String>(status);
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    };
    match tokio::time::timeout(CAMERA_SETTLE_TIMEOUT, settle).await {
        Ok(Ok(CameraStatus::Live)) => Ok(()),
        Ok(Ok(_)) => Err("Camera unavailable. Use `retry-camera` once it is connected.".into()),
        Ok(Err(err)) => Err(err),
        Err(_) => Err("Still waiting for the camera. Try `scan` again shortly.".into()),
    }
}

async fn render_events(mut rx: tokio::sync::broadcast::Receiver<AppEvent>) {
    loop {
        match rx.recv().await {
            Ok(event) => render(&event),
            Err(RecvError::Lagged(skipped)) => {
                log::warn!("Renderer fell behind; skipped {} events", skipped);
            }
            Err(RecvError::Closed) => break,
        }
    }
}

fn render(event: &AppEvent) {
    let payload = &event.payload;
    match event.name {
        CHAT_STATE_CHANGED => {
            if payload["pending"] == true {
                println!("Pandora is typing...");
                return;
            }
            let last = payload["transcript"]
                .as_array()
                .and_then(|turns| turns.last());
            if let Some(turn) = last.filter(|turn| turn["role"] == "model") {
                let badge = payload["badge"].as_str().unwrap_or("");
                println!("Pandora [{}]: {}", badge, text_of(&turn["text"]));
            }
        }
        SCAN_STATE_CHANGED => {
            if let Some(error) = payload["error"].as_str() {
                println!("! {}", error);
            } else if payload["result"].is_object() {
                let result = &payload["result"];
                println!(
                    "Emotion: {} ({:.0}% confident), stress {}%, mood score {}",
                    text_of(&result["emotion"]),
                    result["confidence"].as_f64().unwrap_or(0.0) * 100.0,
                    result["stressLevel"].as_f64().unwrap_or(0.0).round(),
                    payload["moodScore"]
                );
                if let Some(advice) = result["advice"].as_str().filter(|a| !a.is_empty()) {
                    println!("  {}", advice);
                }
            }
        }
        CAMERA_STATE_CHANGED => match payload["status"].as_str() {
            Some("live") => println!("Camera is live"),
            Some("error") => println!("! {}", text_of(&payload["error"])),
            Some("requesting") => println!("Requesting camera..."),
            _ => {}
        },
        MOOD_HISTORY_CHANGED => {
            let count = payload["samples"].as_array().map_or(0, Vec::len);
            println!("Mood history updated from backend ({} days)", count);
        }
        BREATHING_STATE_CHANGED => {
            let cycle = &payload["state"]["cycle"];
            if payload["state"]["status"] == "running" {
                println!(
                    "  {} ({}s)",
                    text_of(&cycle["phase"]),
                    cycle["remainingSecs"]
                );
            }
        }
        _ => {}
    }
}

fn text_of(value: &Value) -> &str {
    value.as_str().unwrap_or("")
}
