// Smoke tests for the public crate surface: version reporting and the
// top-level re-exports working together.

use zstream::{
    compress_bound, compress_one_shot, decompress_one_shot, version_number, version_string, Mode,
    Params, Progress, Session, ZError, ZSTREAM_VERSION_NUMBER, ZSTREAM_VERSION_STRING,
};

#[test]
fn version_constants_agree() {
    assert_eq!(version_number(), ZSTREAM_VERSION_NUMBER);
    assert_eq!(version_string(), ZSTREAM_VERSION_STRING);
    assert_eq!(version_string(), env!("CARGO_PKG_VERSION"));
}

/// Everything needed for a compress/decompress trip is reachable from the
/// crate root.
#[test]
fn root_exports_compose() {
    let data = b"public surface smoke test";
    let mut dst = vec![0u8; compress_bound(data.len())];
    let written = compress_one_shot(&mut dst, data, &Params::default()).unwrap();

    let mut plain = vec![0u8; data.len()];
    let got = decompress_one_shot(&mut plain, &dst[..written]).unwrap();
    assert_eq!(&plain[..got], data);

    // The session type is usable directly from the root as well.
    let mut session = Session::open(Mode::Decode, &Params::default()).unwrap();
    session.feed(&dst[..written]).unwrap();
    let mut out = vec![0u8; data.len() + 16];
    let (n, progress) = session.drain(&mut out).unwrap();
    assert_eq!(&out[..n], data);
    assert_eq!(progress, Progress::StreamEnd);
    session.end();
}

/// Errors render through Display and convert into std::io::Error.
#[test]
fn error_rendering_and_conversion() {
    let err = ZError::DataError;
    assert!(!err.to_string().is_empty());
    assert_eq!(err.error_name(), "ERROR_data_corrupted");

    let io: std::io::Error = ZError::DataError.into();
    assert_eq!(io.kind(), std::io::ErrorKind::InvalidData);
}
