//! Identifier newtypes for cards, assets, bindings and versions
//!
//! Fresh ids are random UUIDs; ids read back from storage or a request
//! path keep whatever string they were given.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! define_ids {
    ($($(#[$meta:meta])* $name:ident;)+) => {$(
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// A fresh random id
            pub fn new() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            pub fn from_string(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }

        #[cfg(feature = "rusqlite")]
        impl rusqlite::types::ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<rusqlite::types::ToSqlOutput<'_>> {
                rusqlite::types::ToSql::to_sql(&self.0)
            }
        }

        #[cfg(feature = "rusqlite")]
        impl rusqlite::types::FromSql for $name {
            fn column_result(
                value: rusqlite::types::ValueRef<'_>,
            ) -> rusqlite::types::FromSqlResult<Self> {
                <String as rusqlite::types::FromSql>::column_result(value).map(Self)
            }
        }
    )+};
}

define_ids! {
    /// A card document
    CardId;
    /// A stored media asset
    AssetId;
    /// A card/asset binding, which is also the asset graph node id
    BindingId;
    /// A saved snapshot of a card's data
    VersionId;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_ids_are_unique() {
        assert_ne!(BindingId::new(), BindingId::new());
        assert_eq!(CardId::new().as_str().len(), 36);
    }

    #[test]
    fn test_string_conversions() {
        let id = AssetId::from_string("asset-123");
        assert_eq!(id.as_str(), "asset-123");
        assert_eq!(id, AssetId::from("asset-123"));
        assert_eq!(id, AssetId::from(String::from("asset-123")));
        assert_eq!(CardId::from("card-abc").to_string(), "card-abc");
    }

    #[test]
    fn test_serde_is_transparent() {
        let id = VersionId::from("ver-1");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"ver-1\"");
        assert_eq!(serde_json::from_str::<VersionId>(&json).unwrap(), id);
    }

    #[cfg(feature = "rusqlite")]
    #[test]
    fn test_id_sqlite_column_roundtrip() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        let id = CardId::from("card-7");
        let back: CardId = conn.query_row("SELECT ?1", [&id], |row| row.get(0)).unwrap();
        assert_eq!(back, id);
    }
}
