use std::{
    fmt,
    str::FromStr,
    sync::{LazyLock, Mutex},
};

use bson::{Binary, Bson, spec::BinarySubtype};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use ulid::{Generator, Ulid};

/// Ids minted within the same millisecond still sort in creation order.
static GENERATOR: LazyLock<Mutex<Generator>> = LazyLock::new(|| Mutex::new(Generator::new()));

/// Document identifier. Stored as a 16-byte BSON binary, rendered as the
/// 26-character ULID string in self links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DbUlid(Ulid);

impl DbUlid {
    pub fn new() -> Self {
        let mut generator = GENERATOR.lock().unwrap_or_else(|e| e.into_inner());
        DbUlid(generator.generate().unwrap_or_else(|_| Ulid::new()))
    }

    /// Parses a path segment. Anything that is not a ULID yields `None`, which
    /// callers treat as "no such document".
    pub fn from_string(s: &str) -> Option<Self> {
        Ulid::from_string(s).ok().map(DbUlid)
    }

    pub fn inner(&self) -> &Ulid {
        &self.0
    }

    /// The creation time encoded in the identifier.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.0.datetime().into()
    }
}

impl Default for DbUlid {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DbUlid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DbUlid {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ulid::from_string(s).map(DbUlid)
    }
}

impl From<Ulid> for DbUlid {
    fn from(u: Ulid) -> Self {
        Self(u)
    }
}

impl From<DbUlid> for String {
    fn from(d: DbUlid) -> Self {
        d.0.to_string()
    }
}

impl Serialize for DbUlid {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        Binary {
            subtype: BinarySubtype::Generic,
            bytes: self.0.to_bytes().to_vec(),
        }
        .serialize(s)
    }
}

impl<'de> Deserialize<'de> for DbUlid {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let bin = Binary::deserialize(d)?;
        let bytes: [u8; 16] = bin
            .bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("DbUlid: expected exactly 16 bytes"))?;
        Ok(DbUlid(Ulid::from_bytes(bytes)))
    }
}

// lets you use DbUlid directly in doc! {} filters
impl From<DbUlid> for Bson {
    fn from(d: DbUlid) -> Self {
        Bson::Binary(Binary {
            subtype: BinarySubtype::Generic,
            bytes: d.0.to_bytes().to_vec(),
        })
    }
}
