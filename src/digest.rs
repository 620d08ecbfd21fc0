//! Checksum commands over adapter input streams.
//!
//! The transport-level checksum machinery of the backend is switched off
//! at connect time, so integrity checking is offered to clients instead:
//! one command word per algorithm, each hashing the full file server-side
//! and replying with the hex digest.

use std::io::{self, Read};

use sha1::Sha1;
use sha2::{Digest, Sha256, Sha512};

/// Hash algorithm selected by the command word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestAlgorithm {
    Sha1,
    Sha256,
    Sha512,
}

impl DigestAlgorithm {
    /// Name used in replies and in the FEAT listing.
    pub fn name(&self) -> &'static str {
        match self {
            DigestAlgorithm::Sha1 => "SHA1",
            DigestAlgorithm::Sha256 => "SHA256",
            DigestAlgorithm::Sha512 => "SHA512",
        }
    }
}

/// Hashes everything the reader yields and returns the lowercase hex
/// digest.
pub fn compute(algorithm: DigestAlgorithm, reader: &mut dyn Read) -> io::Result<String> {
    match algorithm {
        DigestAlgorithm::Sha1 => hash_into(Sha1::new(), reader),
        DigestAlgorithm::Sha256 => hash_into(Sha256::new(), reader),
        DigestAlgorithm::Sha512 => hash_into(Sha512::new(), reader),
    }
}

fn hash_into<D: Digest>(mut hasher: D, reader: &mut dyn Read) -> io::Result<String> {
    let mut buffer = [0; 1024];
    loop {
        let n = reader.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}
