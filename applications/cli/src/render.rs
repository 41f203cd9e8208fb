//! Plain-text rendering of library views.

use cloudstream_cache::{format_bytes, CacheStats};
use cloudstream_cloud::BrowseListing;
use cloudstream_core::{format_duration, AlbumInfo, ArtistInfo, GenreInfo, Playlist, Track, YearInfo};
use cloudstream_library::Catalog;
use cloudstream_window::{GridLayout, VisibleRange};
use std::fmt::Write;

pub fn track_row(index: usize, track: &Track) -> String {
    format!(
        "{:>6}  {:<40}  {:<28}  {:<28}  {:>8}",
        index + 1,
        clip(&track.title, 40),
        clip(&track.artist, 28),
        clip(&track.album, 28),
        format_duration(track.duration)
    )
}

/// Rows of `tracks` inside `range`, numbered by their position in the full list
pub fn track_window(tracks: &[Track], range: &VisibleRange) -> String {
    let mut out = String::new();
    for (rendered, track) in range.slice(tracks).iter().enumerate() {
        let index = range.logical_index(rendered).unwrap_or(rendered);
        let _ = writeln!(out, "{}", track_row(index, track));
    }
    if range.is_empty() {
        let _ = writeln!(out, "(no tracks)");
    } else {
        let _ = writeln!(out, "-- rows {}-{} of {}", range.start + 1, range.end, tracks.len());
    }
    out
}

pub fn artists(items: &[ArtistInfo]) -> String {
    let mut out = String::new();
    for a in items {
        let _ = writeln!(
            out,
            "{:<40}  {:>5} tracks  {:>4} albums",
            clip(&a.name, 40),
            a.track_count,
            a.album_count
        );
    }
    out
}

pub fn albums(items: &[AlbumInfo]) -> String {
    let mut out = String::new();
    for a in items {
        let year = a.year.map(|y| y.to_string()).unwrap_or_default();
        let _ = writeln!(
            out,
            "{:<40}  {:<28}  {:>4}  {:>5} tracks",
            clip(&a.name, 40),
            clip(&a.artist, 28),
            year,
            a.track_count
        );
    }
    out
}

/// Albums arranged as the grid rows a renderer would materialize
pub fn album_grid(items: &[AlbumInfo], layout: &GridLayout) -> String {
    let mut out = String::new();
    let visible = layout.range.slice(items);
    for (row, chunk) in layout.rows.clone().zip(visible.chunks(layout.columns.max(1))) {
        let names: Vec<String> = chunk.iter().map(|a| clip(&a.name, 24)).collect();
        let _ = writeln!(out, "{:>4}  {}", row + 1, names.join(" | "));
    }
    let _ = writeln!(
        out,
        "-- {} columns, rows {}-{} of {}",
        layout.columns,
        layout.rows.start + 1,
        layout.rows.end,
        layout.total_rows
    );
    out
}

pub fn genres(items: &[GenreInfo]) -> String {
    let mut out = String::new();
    for g in items {
        let _ = writeln!(out, "{:<32}  {:>5} tracks", clip(&g.name, 32), g.track_count);
    }
    out
}

pub fn years(items: &[YearInfo]) -> String {
    let mut out = String::new();
    for y in items {
        let _ = writeln!(out, "{:>4}  {:>5} tracks", y.year, y.track_count);
    }
    out
}

pub fn playlists(items: &[Playlist], catalog: &Catalog) -> String {
    if items.is_empty() {
        return "(no playlists)\n".to_string();
    }
    let mut out = String::new();
    for p in items {
        let resolved = p.track_ids.iter().filter(|id| catalog.contains(id)).count();
        let _ = writeln!(
            out,
            "{}  {:<32}  {:>4} tracks  created {}",
            p.id.as_str(),
            clip(&p.name, 32),
            resolved,
            p.created_at.format("%Y-%m-%d")
        );
    }
    out
}

pub fn summary(catalog: &Catalog, artists: usize, albums: usize, genres: usize, playlists: usize) -> String {
    let total: f64 = catalog.tracks().iter().map(|t| t.duration).sum();
    let mut out = String::new();
    if let Some(version) = catalog.version() {
        let _ = writeln!(out, "Version:    {}", version);
    }
    if let Some(generated) = catalog.generated_at() {
        let _ = writeln!(out, "Generated:  {}", generated);
    }
    let _ = writeln!(out, "Tracks:     {}", catalog.len());
    let _ = writeln!(out, "Artists:    {}", artists);
    let _ = writeln!(out, "Albums:     {}", albums);
    let _ = writeln!(out, "Genres:     {}", genres);
    let _ = writeln!(out, "Playlists:  {}", playlists);
    let _ = writeln!(out, "Duration:   {}", format_duration(total));
    out
}

pub fn listing(listing: &BrowseListing) -> String {
    let mut out = String::new();
    let prefix = if listing.prefix.is_empty() { "/" } else { &listing.prefix };
    let _ = writeln!(out, "{}", prefix);
    for folder in &listing.folders {
        let _ = writeln!(out, "  [dir]  {}/", folder.name);
    }
    for file in &listing.files {
        let _ = writeln!(out, "  {:>9}  {}", format_bytes(file.size), file.name);
    }
    if let Some(cover) = listing.cover_image() {
        let _ = writeln!(out, "  cover: {}", cover.name);
    }
    out
}

pub fn cache_stats(stats: &CacheStats) -> String {
    let oldest = stats
        .oldest_cached_at
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string());
    format!(
        "Files:   {}\nSize:    {}\nOldest:  {}\n",
        stats.total_files,
        format_bytes(stats.total_bytes),
        oldest
    )
}

/// Truncate to `width` characters, marking the cut with `~`
fn clip(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    let mut clipped: String = s.chars().take(width.saturating_sub(1)).collect();
    clipped.push('~');
    clipped
}
