//! Browse aggregates derived from a track list.
//!
//! Every function here is pure and infallible. Grouping is case-sensitive:
//! `"Rush"` and `"rush"` stay separate because the filters downstream match
//! on exact strings.

use crate::collate::locale_cmp;
use cloudstream_core::{AlbumInfo, ArtistInfo, GenreInfo, Track, YearInfo};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Artists sorted alphabetically, with track and distinct-album counts.
pub fn artists(tracks: &[Track]) -> Vec<ArtistInfo> {
    let mut groups: HashMap<&str, (usize, HashSet<&str>)> = HashMap::new();

    for track in tracks {
        let entry = groups.entry(track.artist.as_str()).or_default();
        entry.0 += 1;
        entry.1.insert(track.album.as_str());
    }

    let mut result: Vec<ArtistInfo> = groups
        .into_iter()
        .map(|(name, (track_count, albums))| ArtistInfo {
            name: name.to_string(),
            track_count,
            album_count: albums.len(),
        })
        .collect();

    result.sort_by(|a, b| locale_cmp(&a.name, &b.name));
    result
}

/// Albums keyed by `(album, artist)`, sorted by album name.
///
/// Albums sharing a name keep first-seen order relative to each other.
pub fn albums(tracks: &[Track]) -> Vec<AlbumInfo> {
    let mut order: Vec<AlbumInfo> = Vec::new();
    let mut slots: HashMap<(&str, &str), usize> = HashMap::new();

    for track in tracks {
        let key = (track.album.as_str(), track.artist.as_str());
        match slots.get(&key) {
            Some(&slot) => {
                let album = &mut order[slot];
                album.track_count += 1;
                if album.artwork.is_none() {
                    album.artwork = track.artwork_ref().map(str::to_string);
                }
                if album.year.is_none() {
                    album.year = track.year;
                }
                album.tracks.push(track.clone());
            }
            None => {
                slots.insert(key, order.len());
                order.push(AlbumInfo {
                    name: track.album.clone(),
                    artist: track.artist.clone(),
                    year: track.year,
                    artwork: track.artwork_ref().map(str::to_string),
                    track_count: 1,
                    tracks: vec![track.clone()],
                });
            }
        }
    }

    // sort_by is stable
    order.sort_by(|a, b| locale_cmp(&a.name, &b.name));
    order
}

/// Genres sorted alphabetically; tracks without a genre count as `"Unknown"`.
pub fn genres(tracks: &[Track]) -> Vec<GenreInfo> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for track in tracks {
        *counts.entry(track.genre_or_unknown()).or_default() += 1;
    }

    let mut result: Vec<GenreInfo> = counts
        .into_iter()
        .map(|(name, track_count)| GenreInfo {
            name: name.to_string(),
            track_count,
        })
        .collect();

    result.sort_by(|a, b| locale_cmp(&a.name, &b.name));
    result
}

/// Years, most recent first. Tracks without a year are skipped.
pub fn years(tracks: &[Track]) -> Vec<YearInfo> {
    let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
    for year in tracks.iter().filter_map(|t| t.year) {
        *counts.entry(year).or_default() += 1;
    }

    counts
        .into_iter()
        .rev()
        .map(|(year, track_count)| YearInfo { year, track_count })
        .collect()
}
