use crate::model::{Linkage, LinkageKind};

/// Description fragments that mark a move between the holder's own accounts.
/// Matched case-insensitively.
pub const INTERNAL_TRANSFER_PHRASES: &[&str] = &["top up wallet from my account"];

pub fn detect(description: &str) -> Option<Linkage> {
    detect_with(description, INTERNAL_TRANSFER_PHRASES)
}

pub fn detect_with(description: &str, phrases: &[&str]) -> Option<Linkage> {
    let lower = description.to_lowercase();
    let phrase = phrases
        .iter()
        .find(|p| lower.contains(&p.to_lowercase()))?;
    Some(Linkage {
        kind: LinkageKind::Internal,
        reason: format!("description matches internal transfer phrase \"{phrase}\""),
    })
}
