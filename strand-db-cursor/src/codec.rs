//! Continuation wire codec
//!
//! Combinator continuations persist as small versioned postcard records: the
//! routing metadata a combinator needs to find the right child again, plus
//! the child's own opaque token embedded as a byte blob. The format is the
//! only persisted artifact of a scan and must round-trip byte-for-byte, so
//! every record leads with an explicit format version and decoding rejects
//! anything it does not recognize as a fatal [`Error::MalformedContinuation`].
//!
//! [`Error::MalformedContinuation`]: strand_db_core::Error::MalformedContinuation

use serde::{Deserialize, Serialize};
use strand_db_core::{Continuation, Error, Result};

/// Current continuation wire version. Bump on any layout change.
const WIRE_VERSION: u8 = 1;

/// Routing record for a two-child sequential combinator.
///
/// `second` is optional on the wire; absence decodes as false (still on the
/// first child).
#[derive(Debug, Serialize, Deserialize)]
struct ConcatContinuationWire {
    version: u8,
    second: Option<bool>,
    #[serde(with = "serde_bytes")]
    child: Vec<u8>,
}

/// Per-child slot of a simultaneous two-child combinator.
#[derive(Debug, Serialize, Deserialize)]
struct ChildStateWire {
    exhausted: bool,
    #[serde(with = "serde_bytes")]
    continuation: Option<Vec<u8>>,
}

/// Routing record for union/intersection: both children's positions plus
/// which of them already exhausted.
#[derive(Debug, Serialize, Deserialize)]
struct PairContinuationWire {
    version: u8,
    first: ChildStateWire,
    second: ChildStateWire,
}

/// Position record for an in-memory list leaf.
#[derive(Debug, Serialize, Deserialize)]
struct ListContinuationWire {
    version: u8,
    next_index: u64,
}

pub(crate) fn encode_concat(second: bool, child: Option<&[u8]>) -> Result<Vec<u8>> {
    let wire = ConcatContinuationWire {
        version: WIRE_VERSION,
        second: Some(second),
        child: child.unwrap_or_default().to_vec(),
    };
    postcard::to_allocvec(&wire).map_err(encode_failure)
}

/// Decode a concat routing record into (second child active, inner position).
pub(crate) fn decode_concat(raw: &[u8]) -> Result<(bool, Continuation)> {
    let wire: ConcatContinuationWire = parse(raw)?;
    check_version(wire.version, raw)?;
    let inner = if wire.child.is_empty() {
        Continuation::Start
    } else {
        Continuation::Active(wire.child)
    };
    Ok((wire.second.unwrap_or(false), inner))
}

pub(crate) fn encode_pair(
    first: (bool, Option<&[u8]>),
    second: (bool, Option<&[u8]>),
) -> Result<Vec<u8>> {
    let wire = PairContinuationWire {
        version: WIRE_VERSION,
        first: child_state(first),
        second: child_state(second),
    };
    postcard::to_allocvec(&wire).map_err(encode_failure)
}

/// Decode a pair routing record into per-child (exhausted, position) states.
pub(crate) fn decode_pair(raw: &[u8]) -> Result<[(bool, Continuation); 2]> {
    let wire: PairContinuationWire = parse(raw)?;
    check_version(wire.version, raw)?;
    Ok([resume_state(wire.first), resume_state(wire.second)])
}

pub(crate) fn encode_list_index(next_index: u64) -> Result<Vec<u8>> {
    let wire = ListContinuationWire {
        version: WIRE_VERSION,
        next_index,
    };
    postcard::to_allocvec(&wire).map_err(encode_failure)
}

pub(crate) fn decode_list_index(raw: &[u8]) -> Result<u64> {
    let wire: ListContinuationWire = parse(raw)?;
    check_version(wire.version, raw)?;
    Ok(wire.next_index)
}

fn child_state((exhausted, continuation): (bool, Option<&[u8]>)) -> ChildStateWire {
    ChildStateWire {
        exhausted,
        continuation: continuation.map(<[u8]>::to_vec),
    }
}

fn resume_state(wire: ChildStateWire) -> (bool, Continuation) {
    if wire.exhausted {
        return (true, Continuation::End);
    }
    let continuation = match wire.continuation {
        Some(bytes) if !bytes.is_empty() => Continuation::Active(bytes),
        _ => Continuation::Start,
    };
    (false, continuation)
}

fn parse<'de, W: Deserialize<'de>>(raw: &'de [u8]) -> Result<W> {
    postcard::from_bytes(raw)
        .map_err(|e| Error::malformed_continuation(format!("continuation does not parse: {e}"), raw))
}

fn check_version(version: u8, raw: &[u8]) -> Result<()> {
    if version == WIRE_VERSION {
        Ok(())
    } else {
        Err(Error::malformed_continuation(
            format!("unsupported continuation wire version {version}"),
            raw,
        ))
    }
}

fn encode_failure(e: postcard::Error) -> Error {
    Error::internal(format!("continuation encoding failed: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concat_round_trip() {
        let encoded = encode_concat(true, Some(&[1, 2, 3])).unwrap();
        let (second, inner) = decode_concat(&encoded).unwrap();
        assert!(second);
        assert_eq!(inner, Continuation::Active(vec![1, 2, 3]));

        let encoded = encode_concat(false, None).unwrap();
        let (second, inner) = decode_concat(&encoded).unwrap();
        assert!(!second);
        assert_eq!(inner, Continuation::Start);
    }

    #[test]
    fn absent_second_flag_decodes_as_false() {
        let wire = ConcatContinuationWire {
            version: WIRE_VERSION,
            second: None,
            child: vec![9, 9],
        };
        let raw = postcard::to_allocvec(&wire).unwrap();
        let (second, inner) = decode_concat(&raw).unwrap();
        assert!(!second);
        assert_eq!(inner, Continuation::Active(vec![9, 9]));
    }

    #[test]
    fn unknown_version_is_malformed() {
        let wire = ConcatContinuationWire {
            version: 99,
            second: Some(true),
            child: vec![],
        };
        let raw = postcard::to_allocvec(&wire).unwrap();
        let err = decode_concat(&raw).unwrap_err();
        assert!(matches!(err, Error::MalformedContinuation { .. }), "got {err:?}");
    }

    #[test]
    fn garbage_bytes_are_malformed_and_kept_for_diagnostics() {
        let raw = vec![0xff, 0xfe, 0xfd];
        let err = decode_concat(&raw).unwrap_err();
        match err {
            Error::MalformedContinuation { raw: kept, .. } => assert_eq!(kept, raw),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn pair_round_trip() {
        let encoded = encode_pair((false, Some(&[4, 5])), (true, None)).unwrap();
        let [first, second] = decode_pair(&encoded).unwrap();
        assert_eq!(first, (false, Continuation::Active(vec![4, 5])));
        assert_eq!(second, (true, Continuation::End));
    }

    #[test]
    fn pair_active_child_without_bytes_resumes_at_start() {
        let encoded = encode_pair((false, None), (false, Some(&[1]))).unwrap();
        let [first, _] = decode_pair(&encoded).unwrap();
        assert_eq!(first, (false, Continuation::Start));
    }

    #[test]
    fn list_index_round_trip() {
        let encoded = encode_list_index(12).unwrap();
        assert_eq!(decode_list_index(&encoded).unwrap(), 12);

        let err = decode_list_index(&[0x01]).unwrap_err();
        assert!(matches!(err, Error::MalformedContinuation { .. }));
    }

    #[test]
    fn encoding_is_deterministic() {
        let a = encode_concat(true, Some(&[7, 7, 7])).unwrap();
        let b = encode_concat(true, Some(&[7, 7, 7])).unwrap();
        assert_eq!(a, b);
    }
}
