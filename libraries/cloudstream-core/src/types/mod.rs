mod aggregate;
mod cloud;
mod document;
mod ids;
mod playlist;
mod track;

pub use aggregate::{AlbumInfo, ArtistInfo, GenreInfo, YearInfo};
pub use cloud::{CloudAccount, CloudProvider, FileEntry};
pub use document::LibraryDocument;
pub use ids::{PlaylistId, TrackId};
pub use playlist::{Playlist, PlaylistRecord};
pub use track::{
    format_duration, PlayableSource, Track, UNKNOWN_ALBUM, UNKNOWN_ARTIST, UNKNOWN_GENRE,
};
