// SPDX-License-Identifier: MIT

//! Boundary between the `plist` crate and the [`PrefValue`] tree.

use plist::{Uid, Value};
use std::{
    collections::HashMap,
    io::Cursor,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use crate::core::{
    error::DockError,
    types::{PrefValue, RawStore},
};

// Apple epoch is Jan 1, 2001, which is 978307200 seconds after UNIX_EPOCH
static APPLE_EPOCH_UNIX: u64 = 978307200;

const BINARY_MAGIC: &[u8] = b"bplist00";

pub(crate) fn plist_to_prefvalue(val: &Value) -> Result<PrefValue, DockError> {
    let val = match val {
        Value::String(s) => PrefValue::String(s.clone()),
        Value::Integer(i) => match i.as_signed() {
            Some(n) => PrefValue::Integer(n),
            None => {
                return Err(DockError::StoreUnavailable(format!(
                    "integer {i:?} does not fit in 64 signed bits"
                )));
            }
        },
        Value::Real(f) => PrefValue::Float(*f),
        Value::Boolean(b) => PrefValue::Boolean(*b),
        Value::Array(arr) => PrefValue::Array(
            arr.iter()
                .map(plist_to_prefvalue)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        Value::Dictionary(dict) => {
            let mut result = HashMap::with_capacity(dict.len());
            for (k, v) in dict.iter() {
                result.insert(k.clone(), plist_to_prefvalue(v)?);
            }
            PrefValue::Dictionary(result)
        }
        Value::Data(data) => PrefValue::Data(data.clone()),
        Value::Date(date) => {
            let system_time: SystemTime = date.clone().into();
            let since_unix = match system_time.duration_since(UNIX_EPOCH) {
                Ok(d) => d.as_secs_f64(),
                Err(before) => -before.duration().as_secs_f64(),
            };
            PrefValue::Date(since_unix - APPLE_EPOCH_UNIX as f64)
        }
        Value::Uid(uid) => PrefValue::Uid(uid.get()),
        other => {
            return Err(DockError::StoreUnavailable(format!(
                "unsupported plist value: {other:?}"
            )));
        }
    };

    Ok(val)
}

pub(crate) fn prefvalue_to_plist(val: &PrefValue) -> Value {
    match val {
        PrefValue::String(s) => Value::String(s.clone()),
        PrefValue::Integer(i) => Value::Integer((*i).into()),
        PrefValue::Float(f) => Value::Real(*f),
        PrefValue::Boolean(b) => Value::Boolean(*b),
        PrefValue::Array(arr) => Value::Array(arr.iter().map(prefvalue_to_plist).collect()),
        PrefValue::Dictionary(dict) => Value::Dictionary(
            dict.iter()
                .map(|(k, v)| (k.clone(), prefvalue_to_plist(v)))
                .collect(),
        ),
        PrefValue::Data(data) => Value::Data(data.clone()),
        PrefValue::Date(dt) => {
            let secs = APPLE_EPOCH_UNIX as f64 + *dt;
            let system_time = if secs >= 0.0 {
                UNIX_EPOCH + Duration::from_secs_f64(secs)
            } else {
                UNIX_EPOCH - Duration::from_secs_f64(-secs)
            };
            Value::Date(plist::Date::from(system_time))
        }
        PrefValue::Uid(uid) => Value::Uid(Uid::new(*uid)),
    }
}

/// Whether `buf` holds a binary property list.
pub(crate) fn is_binary_plist(buf: &[u8]) -> bool {
    buf.starts_with(BINARY_MAGIC)
}

/// Decodes a property list (XML first, then any other supported format) into a [`RawStore`].
pub(crate) fn decode_store(buf: &[u8]) -> Result<RawStore, DockError> {
    // try to parse as XML first, and if that fails, fallback to another format
    let plist = match Value::from_reader_xml(Cursor::new(buf)) {
        Ok(v) => v,
        Err(_) => Value::from_reader(Cursor::new(buf))
            .map_err(|e| DockError::StoreUnavailable(format!("plist parse error: {e}")))?,
    };

    match plist_to_prefvalue(&plist)? {
        PrefValue::Dictionary(map) => Ok(map),
        other => Err(DockError::StoreUnavailable(format!(
            "expected a dictionary at the plist root, found {}",
            other.get_type()
        ))),
    }
}

/// Encodes a [`RawStore`] as a binary or XML property list.
pub(crate) fn encode_store(store: &RawStore, binary: bool) -> Result<Vec<u8>, DockError> {
    let plist = Value::Dictionary(
        store
            .iter()
            .map(|(k, v)| (k.clone(), prefvalue_to_plist(v)))
            .collect(),
    );

    let mut buf = Vec::new();
    let res = if binary {
        plist.to_writer_binary(&mut buf)
    } else {
        plist.to_writer_xml(&mut buf)
    };
    res.map_err(|e| DockError::StoreWrite(format!("plist write error: {e}")))?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RawStore {
        let mut tile_data = HashMap::new();
        tile_data.insert("file-label".to_string(), PrefValue::from("Mail"));
        tile_data.insert("book".to_string(), PrefValue::Data(vec![0, 1, 2, 255]));
        let mut entry = HashMap::new();
        entry.insert("GUID".to_string(), PrefValue::Integer(1234));
        entry.insert("tile-data".to_string(), PrefValue::Dictionary(tile_data));

        let mut store = RawStore::new();
        store.insert("autohide".to_string(), PrefValue::Boolean(true));
        store.insert("tilesize".to_string(), PrefValue::Float(48.0));
        store.insert(
            "persistent-apps".to_string(),
            PrefValue::Array(vec![PrefValue::Dictionary(entry)]),
        );
        store
    }

    #[test]
    fn xml_and_binary_encodings_decode_to_the_same_store() {
        let store = sample();

        let xml = encode_store(&store, false).unwrap();
        assert!(!is_binary_plist(&xml));
        assert_eq!(decode_store(&xml).unwrap(), store);

        let binary = encode_store(&store, true).unwrap();
        assert!(is_binary_plist(&binary));
        assert_eq!(decode_store(&binary).unwrap(), store);
    }

    #[test]
    fn non_dictionary_root_is_rejected() {
        let mut buf = Vec::new();
        Value::Array(vec![Value::Boolean(true)])
            .to_writer_xml(&mut buf)
            .unwrap();
        assert!(matches!(
            decode_store(&buf),
            Err(DockError::StoreUnavailable(_))
        ));
    }

    #[test]
    fn garbage_is_reported_as_unavailable() {
        assert!(matches!(
            decode_store(b"definitely not a plist"),
            Err(DockError::StoreUnavailable(_))
        ));
    }

    #[test]
    fn dates_survive_conversion() {
        let v = PrefValue::Date(700_000_000.5);
        let back = plist_to_prefvalue(&prefvalue_to_plist(&v)).unwrap();
        match back {
            PrefValue::Date(dt) => assert!((dt - 700_000_000.5).abs() < 1e-3),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn integers_past_i64_are_rejected() {
        let big = Value::Integer(u64::MAX.into());
        assert!(matches!(
            plist_to_prefvalue(&big),
            Err(DockError::StoreUnavailable(_))
        ));

        let edge = Value::Integer((i64::MAX as u64).into());
        assert_eq!(plist_to_prefvalue(&edge).unwrap(), PrefValue::Integer(i64::MAX));
    }

    #[test]
    fn store_with_an_oversized_integer_fails_to_decode() {
        let mut dict = plist::Dictionary::new();
        dict.insert("counter".to_string(), Value::Integer(u64::MAX.into()));
        let mut buf = Vec::new();
        Value::Dictionary(dict).to_writer_xml(&mut buf).unwrap();
        assert!(matches!(
            decode_store(&buf),
            Err(DockError::StoreUnavailable(_))
        ));
    }
}
