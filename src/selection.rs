//! Snapshot of the entries the user checked.

use crate::entries::EntryStore;
use crate::error::AppError;
use crate::types::EntryId;
use regex::Regex;
use std::sync::LazyLock;

/// One entry chosen for episode creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedEntry {
    pub entry_id: EntryId,
    pub url: String,
}

/// Read the currently checked entries, in rendering order.
///
/// Computed on every call; nothing is cached between invocations.
pub fn current_selection(store: &EntryStore) -> Vec<SelectedEntry> {
    store
        .rows()
        .filter(|row| row.checked && row.selectable())
        .map(|row| SelectedEntry {
            entry_id: row.entry.id.clone(),
            url: row.entry.url.clone(),
        })
        .collect()
}

static POSITION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d+)\s*(?:-\s*(\d+)\s*)?$").expect("valid regex"));

/// Check entries by 1-based position, as given on the command line.
///
/// Accepts `all`, or a comma separated list of positions and inclusive
/// ranges such as `1,3-5`. Positions past the end of the list are an error.
///
/// # Examples
///
/// ```
/// use playlist_import::entries::EntryStore;
/// use playlist_import::playlist::FetchTicket;
/// use playlist_import::selection::{apply_positions, current_selection};
/// use playlist_import::types::{EntryId, Playlist, PlaylistEntry};
///
/// let entries = ["a", "b", "c"]
///     .iter()
///     .map(|id| PlaylistEntry {
///         id: EntryId::new(*id),
///         url: format!("https://example.com/{}", id),
///         title: String::new(),
///         thumbnail_url: None,
///         description: None,
///     })
///     .collect();
/// let mut store = EntryStore::new();
/// store.render(FetchTicket(1), Ok(Playlist { entries, ..Playlist::default() }));
///
/// apply_positions(&mut store, "1,3").unwrap();
/// let ids: Vec<String> = current_selection(&store)
///     .into_iter()
///     .map(|s| s.entry_id.to_string())
///     .collect();
/// assert_eq!(ids, vec!["a", "c"]);
/// ```
pub fn apply_positions(store: &mut EntryStore, input: &str) -> Result<usize, AppError> {
    let positions = parse_positions(input, store.len())?;
    let ids: Vec<EntryId> = positions
        .into_iter()
        .filter_map(|index| store.row_at(index).map(|row| row.entry.id.clone()))
        .collect();

    Ok(ids
        .iter()
        .filter(|id| store.set_checked(id, true))
        .count())
}

/// Parse a position list into sorted, de-duplicated 0-based indices.
pub fn parse_positions(input: &str, len: usize) -> Result<Vec<usize>, AppError> {
    if input.trim().eq_ignore_ascii_case("all") {
        return Ok((0..len).collect());
    }

    let mut indices = Vec::new();
    for part in input.split(',') {
        let caps = POSITION_RE.captures(part).ok_or_else(|| {
            AppError::InvalidInput(format!(
                "'{}' is not a position or range (e.g. 1,3-5)",
                part.trim()
            ))
        })?;

        let start: usize = parse_number(&caps[1])?;
        let end: usize = match caps.get(2) {
            Some(m) => parse_number(m.as_str())?,
            None => start,
        };

        if start == 0 || start > end {
            return Err(AppError::InvalidInput(format!(
                "invalid range '{}': positions start at 1 and ranges go upwards",
                part.trim()
            )));
        }
        if end > len {
            return Err(AppError::InvalidInput(format!(
                "position {} is past the end of the playlist ({} entries)",
                end, len
            )));
        }

        indices.extend(start - 1..end);
    }

    indices.sort_unstable();
    indices.dedup();
    Ok(indices)
}

fn parse_number(digits: &str) -> Result<usize, AppError> {
    digits
        .parse()
        .map_err(|_| AppError::InvalidInput(format!("'{}' is not a valid position", digits)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playlist::FetchTicket;
    use crate::types::{Playlist, PlaylistEntry};

    fn store(ids: &[&str]) -> EntryStore {
        let entries = ids
            .iter()
            .map(|id| PlaylistEntry {
                id: EntryId::new(*id),
                url: format!("u{}", id),
                title: String::new(),
                thumbnail_url: None,
                description: None,
            })
            .collect();
        let mut store = EntryStore::new();
        store.render(
            FetchTicket(1),
            Ok(Playlist {
                entries,
                ..Playlist::default()
            }),
        );
        store
    }

    #[test]
    fn test_selection_follows_rendering_order() {
        let mut store = store(&["5", "2", "9", "1"]);
        // Checked out of order on purpose.
        store.set_checked(&EntryId::new("1"), true);
        store.set_checked(&EntryId::new("5"), true);
        store.set_checked(&EntryId::new("9"), true);

        let selection = current_selection(&store);
        let ids: Vec<&str> = selection.iter().map(|s| s.entry_id.as_str()).collect();
        assert_eq!(ids, vec!["5", "9", "1"]);
        assert_eq!(selection[0].url, "u5");
    }

    #[test]
    fn test_empty_selection_is_valid() {
        let store = store(&["1", "2"]);
        assert!(current_selection(&store).is_empty());
    }

    #[test]
    fn test_selection_is_a_fresh_snapshot() {
        let mut store = store(&["1", "2"]);
        store.set_checked(&EntryId::new("1"), true);
        assert_eq!(current_selection(&store).len(), 1);

        store.set_checked(&EntryId::new("1"), false);
        store.set_checked(&EntryId::new("2"), true);
        let selection = current_selection(&store);
        assert_eq!(selection.len(), 1);
        assert_eq!(selection[0].entry_id, EntryId::new("2"));
    }

    #[test]
    fn test_created_entries_are_not_selected() {
        let mut store = store(&["1", "2"]);
        store.set_checked(&EntryId::new("1"), true);
        store.set_checked(&EntryId::new("2"), true);
        store.mark_created(&EntryId::new("1"));

        let selection = current_selection(&store);
        assert_eq!(selection.len(), 1);
        assert_eq!(selection[0].entry_id, EntryId::new("2"));
    }

    #[test]
    fn test_parse_positions() {
        assert_eq!(parse_positions("all", 3).unwrap(), vec![0, 1, 2]);
        assert_eq!(parse_positions("ALL", 0).unwrap(), Vec::<usize>::new());
        assert_eq!(parse_positions("1,3-5", 5).unwrap(), vec![0, 2, 3, 4]);
        assert_eq!(parse_positions(" 2 , 2-3 ", 3).unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_parse_positions_rejects_bad_input() {
        assert!(parse_positions("0", 3).is_err());
        assert!(parse_positions("3-1", 3).is_err());
        assert!(parse_positions("4", 3).is_err());
        assert!(parse_positions("one", 3).is_err());
        assert!(parse_positions("", 3).is_err());
    }

    #[test]
    fn test_apply_positions_skips_created_entries() {
        let mut store = store(&["a", "b", "c"]);
        store.mark_created(&EntryId::new("b"));

        let checked = apply_positions(&mut store, "all").unwrap();
        assert_eq!(checked, 2);
        let ids: Vec<String> = current_selection(&store)
            .into_iter()
            .map(|s| s.entry_id.to_string())
            .collect();
        assert_eq!(ids, vec!["a", "c"]);
    }
}
