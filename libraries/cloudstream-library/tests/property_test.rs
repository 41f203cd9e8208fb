//! Property-based tests for views, filtering, sorting and playlists
//!
//! Uses proptest to verify invariants across many random catalogs.

use cloudstream_core::{Track, TrackId};
use cloudstream_library::{
    filter_tracks, views, Catalog, FilterState, PlaylistStore, SortDirection, SortField, SortState,
};
use proptest::prelude::*;
use std::collections::HashSet;

// ===== Helpers =====

fn arbitrary_track() -> impl Strategy<Value = Track> {
    (
        "[A-Za-z ]{0,12}",                        // title
        proptest::option::of("[A-Ca-c]{1,3}"),    // artist (small alphabet to force collisions)
        proptest::option::of("[M-Om-o]{1,3}"),    // album
        proptest::option::of("[A-Za-z]{1,6}"),    // genre
        proptest::option::of(1990u32..2010),      // year
        0.0f64..600.0,                            // duration
    )
        .prop_map(|(title, artist, album, genre, year, duration)| {
            let mut track = Track::new(TrackId::generate(), title).with_duration(duration);
            if let Some(artist) = artist {
                track = track.with_artist(artist);
            }
            if let Some(album) = album {
                track = track.with_album(album);
            }
            if let Some(genre) = genre {
                track = track.with_genre(genre);
            }
            if let Some(year) = year {
                track = track.with_year(year);
            }
            track
        })
}

fn arbitrary_catalog() -> impl Strategy<Value = Catalog> {
    prop::collection::vec(arbitrary_track(), 0..60).prop_map(Catalog::new)
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn search_hit(track: &Track, needle: &str) -> bool {
    contains_ci(&track.title, needle)
        || contains_ci(&track.artist, needle)
        || contains_ci(&track.album, needle)
        || track.genre.as_deref().is_some_and(|g| contains_ci(g, needle))
}

fn ids(tracks: &[Track]) -> Vec<TrackId> {
    tracks.iter().map(|t| t.id.clone()).collect()
}

// ===== Aggregates =====

proptest! {
    /// Property: every track lands in exactly one artist and one album
    #[test]
    fn artist_and_album_counts_sum_to_catalog(catalog in arbitrary_catalog()) {
        let artist_sum: usize = views::artists(catalog.tracks()).iter().map(|a| a.track_count).sum();
        let album_sum: usize = views::albums(catalog.tracks()).iter().map(|a| a.track_count).sum();
        let genre_sum: usize = views::genres(catalog.tracks()).iter().map(|g| g.track_count).sum();

        prop_assert_eq!(artist_sum, catalog.len());
        prop_assert_eq!(album_sum, catalog.len());
        prop_assert_eq!(genre_sum, catalog.len());
    }

    /// Property: years skip undated tracks and are strictly descending
    #[test]
    fn years_exclude_undated_and_descend(catalog in arbitrary_catalog()) {
        let years = views::years(catalog.tracks());
        let dated: usize = years.iter().map(|y| y.track_count).sum();
        let undated = catalog.tracks().iter().filter(|t| t.year.is_none()).count();

        prop_assert_eq!(dated + undated, catalog.len());
        prop_assert!(years.windows(2).all(|w| w[0].year > w[1].year));
    }

    /// Property: album member lists agree with their counts
    #[test]
    fn album_members_match_key(catalog in arbitrary_catalog()) {
        for album in views::albums(catalog.tracks()) {
            prop_assert_eq!(album.tracks.len(), album.track_count);
            for track in &album.tracks {
                prop_assert_eq!(&track.album, &album.name);
                prop_assert_eq!(&track.artist, &album.artist);
            }
        }
    }
}

// ===== Filter / Sort =====

proptest! {
    /// Property: search returns exactly the tracks with a case-insensitive hit
    #[test]
    fn search_is_exact(catalog in arbitrary_catalog(), needle in "[a-cA-Cm-o]{1,2}") {
        let filter = FilterState { search: needle.clone(), ..FilterState::default() };
        let result = filter_tracks(&catalog, &PlaylistStore::default(), &filter, &SortState::default());
        let returned: HashSet<&TrackId> = result.iter().map(|t| &t.id).collect();

        for track in catalog.tracks() {
            prop_assert_eq!(returned.contains(&track.id), search_hit(track, &needle));
        }
    }

    /// Property: sorting an already-sorted list changes nothing
    #[test]
    fn sort_is_idempotent(catalog in arbitrary_catalog(), field_idx in 0usize..8, desc in any::<bool>()) {
        let direction = if desc { SortDirection::Desc } else { SortDirection::Asc };
        let sort = SortState::new(SortField::ALL[field_idx], direction);

        let once = filter_tracks(&catalog, &PlaylistStore::default(), &FilterState::default(), &sort);
        let mut twice = once.clone();
        sort.apply(&mut twice);

        prop_assert_eq!(ids(&once), ids(&twice));
    }

    /// Property: with unique keys, descending is the exact reverse of ascending
    #[test]
    fn descending_reverses_unique_keys(titles in prop::collection::hash_set("[a-z]{1,8}", 0..40)) {
        let catalog = Catalog::new(
            titles.into_iter().map(|t| Track::new(TrackId::generate(), t)).collect(),
        );
        let asc = filter_tracks(&catalog, &PlaylistStore::default(), &FilterState::default(),
            &SortState::new(SortField::Title, SortDirection::Asc));
        let mut desc = filter_tracks(&catalog, &PlaylistStore::default(), &FilterState::default(),
            &SortState::new(SortField::Title, SortDirection::Desc));
        desc.reverse();

        prop_assert_eq!(ids(&asc), ids(&desc));
    }

    /// Property: equal sort keys keep catalog order
    #[test]
    fn sort_is_stable(catalog in arbitrary_catalog()) {
        let sort = SortState::new(SortField::Artist, SortDirection::Asc);
        let result = filter_tracks(&catalog, &PlaylistStore::default(), &FilterState::default(), &sort);

        for pair in result.windows(2) {
            if pair[0].artist.to_lowercase() == pair[1].artist.to_lowercase() {
                prop_assert!(catalog.position(&pair[0].id) < catalog.position(&pair[1].id));
            }
        }
    }
}

// ===== Playlists =====

proptest! {
    /// Property: add then remove restores the previous member list
    #[test]
    fn add_remove_round_trip(
        catalog in prop::collection::vec(arbitrary_track(), 2..30).prop_map(Catalog::new),
        initial_picks in prop::collection::vec(any::<prop::sample::Index>(), 0..10),
        added_picks in prop::collection::vec(any::<prop::sample::Index>(), 1..10),
    ) {
        let pick = |picks: &[prop::sample::Index]| -> Vec<TrackId> {
            picks.iter().map(|i| catalog.tracks()[i.index(catalog.len())].id.clone()).collect()
        };
        let initial = pick(&initial_picks);
        let mut added = pick(&added_picks);
        added.retain(|id| !initial.contains(id));

        let mut store = PlaylistStore::default();
        let playlist = store.create("p", &initial, &catalog);
        let before = playlist.track_ids.clone();

        store.add_tracks(&playlist.id, &added, &catalog);
        store.remove_tracks(&playlist.id, &added);

        prop_assert_eq!(&store.get(&playlist.id).unwrap().track_ids, &before);
    }

    /// Property: adding the same id twice leaves one occurrence
    #[test]
    fn add_is_idempotent(
        catalog in prop::collection::vec(arbitrary_track(), 1..30).prop_map(Catalog::new),
        pick in any::<prop::sample::Index>(),
    ) {
        let id = catalog.tracks()[pick.index(catalog.len())].id.clone();
        let mut store = PlaylistStore::default();
        let playlist = store.create("p", &[], &catalog);

        store.add_tracks(&playlist.id, &[id.clone()], &catalog);
        store.add_tracks(&playlist.id, &[id.clone()], &catalog);

        let members = &store.get(&playlist.id).unwrap().track_ids;
        prop_assert_eq!(members.iter().filter(|m| **m == id).count(), 1);
    }
}
