// Colored terminal output for comparisons, archive listings and vectors.

use colored::Colorize;

use crate::archive::ArchiveEntry;
use crate::pipeline::compare::Comparison;

/// Display a comparison verdict with its confidence.
pub fn display_comparison(comparison: &Comparison) {
    println!();
    println!(
        "  \"{}\"",
        super::truncate_chars(&comparison.text, 120).italic()
    );
    println!(
        "  is more likely to be said by {} than {}",
        format!("@{}", comparison.likely).green().bold(),
        format!("@{}", comparison.unlikely).dimmed(),
    );

    let confidence = comparison.confidence();
    let confidence_str = format!("{:.1}%", confidence * 100.0);
    let colored_confidence = if confidence >= 0.75 {
        confidence_str.green()
    } else if confidence >= 0.6 {
        confidence_str.yellow()
    } else {
        confidence_str.red()
    };
    println!("  confidence: {colored_confidence}");

    if confidence < 0.6 {
        println!(
            "  {}",
            "Close call: the two accounts' tweets don't separate this text well.".dimmed()
        );
    }
}

/// Display the available tweet archives with their tweet counts.
pub fn display_archives(archives: &[(ArchiveEntry, usize)]) {
    if archives.is_empty() {
        println!("No tweet archives found.");
        println!(
            "{}",
            "Add <user>.txt (one tweet per line) or <user>.json files to the tweets directory."
                .dimmed()
        );
        return;
    }

    println!(
        "\n{}",
        format!("=== Tweet archives ({} users) ===", archives.len()).bold()
    );
    println!();
    println!(
        "  {:<32} {:>7}  {}",
        "User".dimmed(),
        "Tweets".dimmed(),
        "File".dimmed()
    );
    println!("  {}", "-".repeat(70).dimmed());

    for (entry, count) in archives {
        let count_str = format!("{count:>7}");
        let count_colored = if *count == 0 {
            count_str.red()
        } else {
            count_str.normal()
        };
        println!(
            "  @{:<31} {}  {}",
            entry.user,
            count_colored,
            entry.path.display().to_string().dimmed()
        );
    }
}

/// Display an embedding's dimension and leading components.
pub fn display_vector(text: &str, vector: &[f64]) {
    println!(
        "{} \"{}\"",
        "Embedding of".bold(),
        super::truncate_chars(text, 80)
    );
    println!("  dimension: {}", vector.len());

    let norm = vector.iter().map(|x| x * x).sum::<f64>().sqrt();
    println!("  L2 norm:   {norm:.4}");

    let preview: Vec<String> = vector.iter().take(8).map(|x| format!("{x:+.4}")).collect();
    let more = if vector.len() > 8 { ", ..." } else { "" };
    println!("  values:    [{}{}]", preview.join(", "), more);
}
