//! Synthetic review message generation and the live-data file.
//!
//! The producer binary emits one of these messages per interval tick: a
//! random category, a random score between 50 and 99, and a human-readable
//! message line. Each message is appended to a JSONL file as well as being
//! published to the topic, so the stream can be inspected without a
//! consumer attached.

use {
    chrono::Local,
    rand::Rng,
    serde::Serialize,
    std::{
        fs::{self, OpenOptions},
        io::Write,
        path::Path,
    },
};

pub const CATEGORIES: [&str; 10] = [
    "Horror",
    "Action",
    "RPG",
    "Roguelike",
    "Platformer",
    "Sports",
    "Strategy",
    "FPS",
    "MMO",
    "Mobile",
];

/// One synthetic review, serialized with the wire field names the consumer
/// recognizes ("category", "Review Score").
#[derive(Debug, Clone, Serialize)]
pub struct ReviewMessage {
    pub message: String,
    pub timestamp: String,
    pub category: String,
    #[serde(rename = "Review Score")]
    pub review_score: i64,
    pub keyword_mentioned: String,
    pub message_length: usize,
}

/// Generate one random review message.
pub fn generate_message(rng: &mut impl Rng) -> ReviewMessage {
    let category = CATEGORIES[rng.gen_range(0..CATEGORIES.len())];
    let score = rng.gen_range(50..=99);
    let message = format!(
        "I just played a {} game! I'd give it a score of {}.",
        category, score
    );

    ReviewMessage {
        message_length: message.len(),
        timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        category: category.to_string(),
        review_score: score,
        keyword_mentioned: category.to_lowercase(),
        message,
    }
}

/// Delete a stale live-data file and make sure its parent directory exists,
/// so each producer run starts fresh.
pub fn reset_live_data(path: &Path) -> std::io::Result<()> {
    if path.exists() {
        fs::remove_file(path)?;
        log::info!("Deleted existing live data file: {}", path.display());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Append one message to the live-data file as a JSON line.
pub fn append_live_data(path: &Path, message: &ReviewMessage) -> std::io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    let line = serde_json::to_string(message)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    writeln!(file, "{}", line)?;
    Ok(())
}
