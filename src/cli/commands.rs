//! CLI command implementations.

use crate::analyzer::LogAnalyzer;
use crate::cli::{
    Cli, InfoArgs, OutputFormat, SessionLogArgs, SessionsArgs, ThreadLogArgs, ThreadsArgs,
};
use crate::config::Config;
use crate::error::Result;
use crate::model::SessionDetails;

fn load(config: &Config, file: &std::path::Path) -> Result<LogAnalyzer> {
    LogAnalyzer::from_path_with(file, config.reconstruction.clone())
}

/// Run the sessions command.
pub fn sessions(cli: &Cli, config: &Config, args: &SessionsArgs) -> Result<()> {
    let analyzer = load(config, &args.file)?;
    let sessions = analyzer.list_sessions();

    match cli.effective_output() {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(sessions)?);
        }
        OutputFormat::Text => {
            if sessions.is_empty() {
                println!("No sessions found.");
                return Ok(());
            }
            println!("Sessions ({}):", sessions.len());
            for session in sessions {
                println!(
                    "  {}  (first seen at line {})",
                    session.session_id, session.start_line
                );
            }
        }
    }
    Ok(())
}

/// Run the info command.
pub fn info(cli: &Cli, config: &Config, args: &InfoArgs) -> Result<()> {
    let analyzer = load(config, &args.file)?;
    let details = analyzer.session_details(&args.session_id)?;

    match cli.effective_output() {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&details)?);
        }
        OutputFormat::Text => print_details_text(&details),
    }
    Ok(())
}

fn print_details_text(details: &SessionDetails) {
    println!("Session: {}", details.session_id);

    let config = &details.recognition_config;
    println!("\nRecognizer configuration:");
    print_field("sample rate", config.audio.sample_rate.as_deref());
    print_field("bits per sample", config.audio.bits_per_sample.as_deref());
    print_field("channels", config.audio.channels.as_deref());
    print_field("mode", config.recognition.mode.as_deref());
    print_field("language", config.recognition.language.as_deref());
    print_field("region", config.system.region.as_deref());

    let metrics = &details.performance_metrics;
    println!("\nPerformance:");
    println!("  websocket messages sent: {}", metrics.websocket_messages);
    println!(
        "  websocket messages received: {}",
        metrics.websocket_messages_received
    );
    println!("  audio chunks: {}", metrics.audio_chunks);
    if let Some(ms) = metrics.websocket_connection_time {
        println!("  websocket connection time: {ms} ms");
    }
    if let Some(avg) = metrics.avg_recognition_latency {
        println!(
            "  recognition latency avg/min/max: {avg} / {} / {} ms",
            metrics.min_recognition_latency.unwrap_or_default(),
            metrics.max_recognition_latency.unwrap_or_default()
        );
    }
    if let Some(rate) = metrics.avg_upload_rate {
        println!("  average upload rate: {rate} KB/s");
    }

    if !details.recognition_results.is_empty() {
        println!("\nRecognition results:");
        for result in &details.recognition_results {
            println!("  [{}] {}", result.line_number, result.text);
        }
    }

    if !details.error_analysis.is_empty() {
        println!("\nErrors ({}):", details.error_analysis.len());
        for error in &details.error_analysis {
            println!("  [{}] {}", error.line_number, error.message);
        }
    }

    if !details.timeline.is_empty() {
        println!("\nTimeline:");
        for event in &details.timeline {
            let ts = event
                .timestamp_ms
                .map_or_else(|| "     ?".to_string(), |t| format!("{t:>6}"));
            println!("  {ts} ms  {:?}  {}", event.event_type, event.excerpt);
        }
    }
}

fn print_field(label: &str, value: Option<&str>) {
    if let Some(value) = value {
        println!("  {label}: {value}");
    }
}

/// Run the threads command.
pub fn threads(cli: &Cli, config: &Config, args: &ThreadsArgs) -> Result<()> {
    let analyzer = load(config, &args.file)?;
    let analysis = analyzer.thread_analysis(args.session_id.as_deref())?;

    match cli.effective_output() {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&analysis)?);
        }
        OutputFormat::Text => {
            for (session_id, roles) in &analysis.session_threads {
                println!("Session {session_id}:");
                for (role, binding) in roles.resolved() {
                    println!(
                        "  {:<18} thread [{}]  (line {})",
                        role.label(),
                        binding.thread_id,
                        binding.discovery_line
                    );
                }
                if roles.resolved_count() == 0 {
                    println!("  no threads resolved");
                }
            }
        }
    }
    Ok(())
}

/// Run the session-log command.
pub fn session_log(_cli: &Cli, config: &Config, args: &SessionLogArgs) -> Result<()> {
    let analyzer = load(config, &args.file)?;
    let text = analyzer.session_log_text(&args.session_id)?;
    if !text.is_empty() {
        println!("{text}");
    }
    Ok(())
}

/// Run the thread-log command.
pub fn thread_log(_cli: &Cli, config: &Config, args: &ThreadLogArgs) -> Result<()> {
    let analyzer = load(config, &args.file)?;
    let text = analyzer.thread_log_text(&args.thread_id)?;
    if !text.is_empty() {
        println!("{text}");
    }
    Ok(())
}
