use crate::{
    media::{DownloadError, FailureKind, MediaMetadata},
    platform::{self, Platform},
    session::{Outcome, SessionHistory},
    utils::{format_bytes, format_duration, format_number, format_upload_date, truncate},
};
use colored::Colorize;
use std::path::Path;
use time::macros::format_description;

const RULE_WIDTH: usize = 63;

fn rule(ch: char) -> String {
    ch.to_string().repeat(RULE_WIDTH)
}

/// Display name for a recorded platform id, or the id itself if unknown.
fn platform_label(id: &str) -> &str {
    match platform::get(id) {
        Ok(platform) => platform.display_name,
        Err(_) => id,
    }
}

pub fn banner() {
    println!();
    println!("{}", format!("╔{}╗", rule('═')).bold().cyan());
    println!(
        "   {}",
        "🎥  SOCIAL MEDIA VIDEO DOWNLOADER  🎥".bold().yellow()
    );
    println!("   {}", "Download videos from 5+ platforms".bold().white());
    println!("   {}", "Fast • Reliable • Easy".bold().green());
    println!("{}", format!("╚{}╝", rule('═')).bold().cyan());
}

pub fn platform_menu(platforms: &[Platform]) {
    println!();
    println!("{}", "📱 Supported Platforms".bold().yellow());
    println!("{}", rule('━').cyan());
    println!(
        " {:^8} {:<20} {:^6} {}",
        "Option".bold().magenta(),
        "Platform".bold().magenta(),
        "Icon".bold().magenta(),
        "Status".bold().magenta()
    );
    println!("{}", rule('━').cyan());
    for (index, platform) in platforms.iter().enumerate() {
        println!(
            " {:^8} {:<20} {:^6} {}",
            (index + 1).to_string().bold().cyan(),
            platform.display_name.bold().green(),
            platform.icon,
            "✓ Active".green()
        );
    }
    println!(
        " {:^8} {:<20} {:^6} {}",
        "0".bold().red(),
        "Exit Program".bold().red(),
        "🚪",
        "Exit".red()
    );
    println!("{}", rule('━').cyan());
}

pub fn platform_guide(platform: &Platform) {
    println!();
    println!(
        "{}",
        format!("How to Download from {}", platform.display_name)
            .bold()
            .green()
    );
    println!(
        "{}",
        format!("{} {} - URL Examples", platform.icon, platform.display_name)
            .bold()
            .cyan()
    );
    for (i, example) in platform.examples.iter().enumerate() {
        println!("├── {}", format!("Example {}", i + 1).yellow());
        println!("│   └── {}", example);
    }
    println!("└── {}", "💡 Tips".bold().green());
    println!("    ├── • Copy URL directly from your browser");
    println!("    ├── • Make sure the video is public");
    println!("    └── • Video will be saved in highest quality");
}

pub fn video_info(info: &MediaMetadata) {
    let na = || "N/A".to_string();
    let duration = info.length().map(format_duration).unwrap_or_else(na);
    let views = info.view_count.map(format_number).unwrap_or_else(na);
    let size = info.size().map(format_bytes).unwrap_or_else(na);
    let date = info
        .upload_date
        .as_deref()
        .map(format_upload_date)
        .unwrap_or_else(na);

    println!();
    println!("{}", "📹 Video Information".bold().yellow());
    println!("{}", rule('═').yellow());
    let rows = [
        ("📝 Title", info.title.clone().unwrap_or_else(na)),
        ("👤 Uploader", info.uploader.clone().unwrap_or_else(na)),
        ("⏱️  Duration", duration),
        ("👁️  Views", views),
        ("💾 File Size", size),
        ("📅 Upload Date", date),
    ];
    for (label, value) in rows {
        println!(" {:<18} {}", label.bold().cyan(), value);
    }
    println!("{}", rule('═').yellow());
}

pub fn success(output_dir: &Path, file: Option<&Path>) {
    println!();
    println!("{}", rule('═').bold().green());
    println!("  {}", "✅ Download Completed Successfully!".bold().green());
    println!();
    println!("  {}", "📁 File Location:".bold().cyan());
    match file {
        Some(file) => println!("     {}", file.display()),
        None => println!("     {}", output_dir.display()),
    }
    println!();
    println!("  {}", "🎉 Ready to watch!".bold().yellow());
    println!("{}", rule('═').bold().green());
}

pub fn failure(error: &DownloadError) {
    println!();
    println!("{}", rule('━').red());
    let heading = match error.kind() {
        FailureKind::Cancelled => "⚠️  Download Cancelled",
        _ => "❌ Download Failed",
    };
    println!("  {}", heading.bold().red());
    println!();
    println!("  {}", "Error Details:".yellow());
    println!("  {}", error);
    println!();
    println!("  {} {}", "🔧 Suggested fix:".cyan(), error.hint());
    println!("{}", rule('━').red());
}

pub fn warning(message: &str) {
    println!("{}", format!("⚠️  {message}").yellow());
}

pub fn invalid(message: &str) {
    println!("{}", format!("❌ {message}").red());
}

pub fn statistics(history: &SessionHistory) {
    let summary = history.summary();

    println!();
    println!("{}", "📊 Download Statistics".bold().cyan());
    println!("{}", rule('─').cyan());
    if summary.total == 0 {
        println!("  No downloads this session.");
        println!("{}", rule('─').cyan());
        return;
    }

    let time_format = format_description!("[hour]:[minute]:[second]");
    println!(
        " {:<4} {:<9} {:<11} {:<10} {:<10} {}",
        "#".cyan(),
        "Time".cyan(),
        "Platform".cyan(),
        "Result".cyan(),
        "Took".cyan(),
        "Video".cyan()
    );
    for (i, entry) in history.entries().iter().enumerate() {
        let time = entry
            .timestamp
            .format(&time_format)
            .unwrap_or_else(|_| "--:--:--".to_string());
        let result = match &entry.outcome {
            Outcome::Success { .. } => "✓ ok".green(),
            Outcome::Failure(_) => "✗ failed".red(),
        };
        let name = entry.title.as_deref().unwrap_or(&entry.url);
        println!(
            " {:<4} {:<9} {:<11} {:<10} {:<10} {}",
            i + 1,
            time,
            platform_label(entry.platform_id()),
            result,
            format_duration(entry.elapsed),
            truncate(name, 50)
        );
    }
    println!("{}", rule('─').cyan());

    let by_platform = summary
        .by_platform
        .iter()
        .map(|(id, count)| format!("{}: {count}", platform_label(id)))
        .collect::<Vec<_>>()
        .join(", ");
    println!(
        "  Total: {}  {}  {}",
        summary.total.to_string().bold(),
        format!("Succeeded: {}", summary.succeeded).green(),
        format!("Failed: {}", summary.failed).red()
    );
    println!("  By platform: {by_platform}");
}

pub fn goodbye() {
    println!();
    println!("{}", rule('═').yellow());
    println!(
        "  {}",
        "👋 Thank you for using Video Downloader!".bold().yellow()
    );
    println!("{}", rule('═').yellow());
    println!();
}
