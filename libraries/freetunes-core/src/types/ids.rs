/// ID types for FreeTunes entities
///
/// Every primary key is an opaque string made of a table prefix and a random
/// suffix (`user-3f2a...`). Uniqueness comes from the random part, never from
/// a sequence.
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[cfg(feature = "sqlx-support")]
use sqlx::{
    encode::IsNull,
    error::BoxDynError,
    sqlite::{SqliteArgumentValue, SqliteTypeInfo, SqliteValueRef},
    Decode, Encode, Sqlite, Type,
};

/// Build a prefixed random identifier, e.g. `song-1b9d6bcd...`
pub fn prefixed_id(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4().simple())
}

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Table prefix used when generating new identifiers
            pub const PREFIX: &'static str = $prefix;

            /// Wrap an existing identifier
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Generate a new random identifier
            pub fn generate() -> Self {
                Self(prefixed_id(Self::PREFIX))
            }

            /// Get the inner string
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        #[cfg(feature = "sqlx-support")]
        impl Type<Sqlite> for $name {
            fn type_info() -> SqliteTypeInfo {
                <String as Type<Sqlite>>::type_info()
            }

            fn compatible(ty: &SqliteTypeInfo) -> bool {
                <String as Type<Sqlite>>::compatible(ty)
            }
        }

        #[cfg(feature = "sqlx-support")]
        impl<'q> Encode<'q, Sqlite> for $name {
            fn encode_by_ref(
                &self,
                args: &mut Vec<SqliteArgumentValue<'q>>,
            ) -> Result<IsNull, BoxDynError> {
                <String as Encode<Sqlite>>::encode_by_ref(&self.0, args)
            }
        }

        #[cfg(feature = "sqlx-support")]
        impl<'r> Decode<'r, Sqlite> for $name {
            fn decode(value: SqliteValueRef<'r>) -> Result<Self, BoxDynError> {
                let s = <String as Decode<Sqlite>>::decode(value)?;
                Ok(Self(s))
            }
        }
    };
}

define_id!(
    /// User identifier (also the artist identifier for owned content)
    UserId,
    "user"
);
define_id!(
    /// Album identifier
    AlbumId,
    "album"
);
define_id!(
    /// Song identifier
    SongId,
    "song"
);
define_id!(
    /// Playlist identifier
    PlaylistId,
    "playlist"
);
define_id!(
    /// Genre identifier
    GenreId,
    "genre"
);
define_id!(
    /// Report identifier
    ReportId,
    "report"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_carry_their_prefix() {
        let id = UserId::generate();
        assert!(id.as_str().starts_with("user-"));

        let id = PlaylistId::generate();
        assert!(id.as_str().starts_with("playlist-"));
    }

    #[test]
    fn user_id_generation_creates_unique_ids() {
        let id1 = UserId::generate();
        let id2 = UserId::generate();
        assert_ne!(id1, id2);
    }

    #[test]
    fn song_id_display() {
        let id = SongId::new("song-456");
        assert_eq!(format!("{}", id), "song-456");
    }

    #[test]
    fn ids_serialize_as_plain_strings() {
        let id = AlbumId::new("album-1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"album-1\"");
    }
}
