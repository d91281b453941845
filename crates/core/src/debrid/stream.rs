//! Stream entry formatting, embedded in each client but shared here.

use crate::addon::{BehaviorHints, StreamEntry};

use super::matching::{extract_quality, format_bytes};
use super::types::OwnedItem;

/// Build the protocol stream entry for an owned item.
///
/// The URL always routes back through this gateway's resolve endpoint so
/// that ready direct links and deferred torrent files share one response
/// path. The stored reference is the direct link when one exists, else the
/// `#` placeholder.
pub fn format_stream_entry(
    short_tag: &str,
    provider_name: &str,
    api_key: &str,
    item: &OwnedItem,
    base_url: &str,
) -> StreamEntry {
    let quality = extract_quality(&item.name);
    let size = item
        .size_bytes
        .filter(|bytes| *bytes > 0)
        .map(|bytes| format!(" ({})", format_bytes(bytes)))
        .unwrap_or_default();

    StreamEntry {
        name: format!("{short_tag} 🔗 {quality}{size}"),
        description: item.name.clone(),
        url: Some(format!(
            "{base_url}/resolve/{provider_name}/{api_key}/{}/{}",
            item.id,
            urlencoding::encode(item.stored_ref())
        )),
        external_url: None,
        behavior_hints: BehaviorHints { not_web_ready: true },
    }
}
