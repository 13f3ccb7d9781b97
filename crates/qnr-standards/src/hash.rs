#![deny(unsafe_code)]

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::StandardsError;

const BUFFER_SIZE: usize = 65536;

pub fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    hex::encode(digest)
}

/// Compute the SHA256 hash of a file, streaming its contents.
pub fn sha256_file(path: &Path) -> Result<String, StandardsError> {
    let file = File::open(path).map_err(|e| StandardsError::io(path, e))?;
    let mut reader = BufReader::with_capacity(BUFFER_SIZE, file);
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; BUFFER_SIZE];
    loop {
        let bytes_read = reader
            .read(&mut buffer)
            .map_err(|e| StandardsError::io(path, e))?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Verify that a file matches the expected SHA256 hash (case-insensitive).
pub fn verify_sha256(path: &Path, expected: &str) -> Result<(), StandardsError> {
    let actual = sha256_file(path)?;
    let expected = expected.trim().to_lowercase();
    if actual != expected {
        return Err(StandardsError::Sha256Mismatch {
            path: path.to_path_buf(),
            expected,
            actual,
        });
    }
    Ok(())
}
