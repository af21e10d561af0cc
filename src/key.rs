//! Key extraction: reduce an arbitrary-length user key to the 48-byte
//! `(I, J, L)` material AEZ's tweak schedule is built from.

use blake2::digest::{Update, VariableOutput};
use blake2::Blake2bVar;
use zeroize::Zeroize;

use crate::gf128::Block;

const EXTRACTED_KEY_SIZE: usize = 48;

/// The 48-byte expanded key, split into its three 16-byte sub-keys.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct ExpandedKey([u8; EXTRACTED_KEY_SIZE]);

impl ExpandedKey {
    /// Extracts a 48-byte key from `key`. If `key` is already 48 bytes it is
    /// used verbatim; otherwise it is hashed with BLAKE2b at a 384-bit
    /// digest size. The caller's key is never retained past this call.
    pub fn extract(key: &[u8]) -> Self {
        let mut buf = [0u8; EXTRACTED_KEY_SIZE];
        if key.len() == EXTRACTED_KEY_SIZE {
            buf.copy_from_slice(key);
        } else {
            let mut hasher = Blake2bVar::new(EXTRACTED_KEY_SIZE)
                .expect("48 is a valid Blake2b-var digest size");
            hasher.update(key);
            hasher
                .finalize_variable(&mut buf)
                .expect("buf is exactly the configured digest size");
        }
        ExpandedKey(buf)
    }

    pub fn i(&self) -> Block {
        self.0[0..16].try_into().unwrap()
    }

    pub fn j(&self) -> Block {
        self.0[16..32].try_into().unwrap()
    }

    pub fn l(&self) -> Block {
        self.0[32..48].try_into().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passthrough_when_already_48_bytes() {
        let raw = [7u8; 48];
        let ek = ExpandedKey::extract(&raw);
        assert_eq!(ek.i(), raw[0..16]);
        assert_eq!(ek.j(), raw[16..32]);
        assert_eq!(ek.l(), raw[32..48]);
    }

    #[test]
    fn short_keys_are_hashed_deterministically() {
        let a = ExpandedKey::extract(b"short key");
        let b = ExpandedKey::extract(b"short key");
        assert_eq!(a.i(), b.i());
        assert_eq!(a.j(), b.j());
        assert_eq!(a.l(), b.l());

        let c = ExpandedKey::extract(b"different key");
        assert_ne!(a.i(), c.i());
    }
}
