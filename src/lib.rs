//! AEZ v5: a wide-block, misuse-resistant authenticated-encryption scheme.
//!
//! `encrypt` and `decrypt` are the only entry points a caller needs. Both
//! take an already-extracted key of any length, a nonce, an associated-data
//! vector, and a tag length `tau` in bytes; `decrypt` returns `Ok(plaintext)`
//! only if the ciphertext authenticates, and never reveals partial
//! plaintext for a forged ciphertext.
//!
//! ```
//! let key = b"an example key, any length is fine";
//! let nonce = b"unique per message";
//! let ad: &[&[u8]] = &[b"header"];
//! let tau = 16;
//!
//! let ciphertext = aez::encrypt(key, nonce, ad, tau, b"hello, world");
//! let plaintext = aez::decrypt(key, nonce, ad, tau, &ciphertext).unwrap();
//! assert_eq!(plaintext, b"hello, world");
//! ```

mod backend;
mod core_cipher;
mod error;
mod gf128;
mod hash;
mod key;
mod prf;
mod state;
mod tiny;

pub use error::AezError;

use backend::Dispatched;
use state::State;
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

/// Encrypts `plaintext` under `key`, `nonce`, and the associated-data vector
/// `ad`, appending a `tau`-byte authentication tag. The returned ciphertext
/// is always `plaintext.len() + tau` bytes long.
pub fn encrypt(key: &[u8], nonce: &[u8], ad: &[&[u8]], tau: usize, plaintext: &[u8]) -> Vec<u8> {
    let state: State<Dispatched> = State::new(key);
    let mut delta = hash::aez_hash(&state, nonce, ad, (tau * 8) as u32);

    let mut out = vec![0u8; plaintext.len() + tau];
    if plaintext.is_empty() {
        prf::aez_prf(&state, &delta, &mut out);
        delta.zeroize();
        return out;
    }

    out[..plaintext.len()].copy_from_slice(plaintext);
    encipher(&state, &delta, &mut out, 0);
    delta.zeroize();
    out
}

/// Decrypts `ciphertext`, which must be at least `tau` bytes long, returning
/// the plaintext only if it authenticates under `key`/`nonce`/`ad`/`tau`.
pub fn decrypt(
    key: &[u8],
    nonce: &[u8],
    ad: &[&[u8]],
    tau: usize,
    ciphertext: &[u8],
) -> Result<Vec<u8>, AezError> {
    if ciphertext.len() < tau {
        return Err(AezError::Forgery);
    }

    let state: State<Dispatched> = State::new(key);
    let mut delta = hash::aez_hash(&state, nonce, ad, (tau * 8) as u32);

    if ciphertext.len() == tau {
        let mut expected = vec![0u8; tau];
        prf::aez_prf(&state, &delta, &mut expected);
        let ok = bool::from(ciphertext.ct_eq(&expected));
        delta.zeroize();
        expected.zeroize();
        return if ok {
            Ok(Vec::new())
        } else {
            Err(AezError::Forgery)
        };
    }

    let mut buf = ciphertext.to_vec();
    decipher(&state, &delta, &mut buf, 1);
    delta.zeroize();

    let plaintext_len = buf.len() - tau;
    let tag_is_zero = buf[plaintext_len..]
        .iter()
        .fold(0u8, |acc, &byte| acc | byte);
    if tag_is_zero != 0 {
        buf.zeroize();
        return Err(AezError::Forgery);
    }

    buf.truncate(plaintext_len);
    Ok(buf)
}

fn encipher<B: backend::AesBackend>(state: &State<B>, delta: &gf128::Block, buf: &mut [u8], d: u8) {
    if buf.len() < 32 {
        let input = buf.to_vec();
        tiny::aez_tiny(state, delta, &input, d, buf);
    } else {
        core_cipher::aez_core(state, delta, buf, d);
    }
}

fn decipher<B: backend::AesBackend>(state: &State<B>, delta: &gf128::Block, buf: &mut [u8], d: u8) {
    encipher(state, delta, buf, d)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::RngCore;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn rng() -> ChaCha20Rng {
        ChaCha20Rng::seed_from_u64(0xA22_5EED)
    }

    #[test]
    fn round_trips_across_message_and_tag_lengths() {
        let mut r = rng();
        for tau in [0usize, 8, 16] {
            for len in [0usize, 1, 15, 16, 31, 32, 33, 100, 1000] {
                let key = {
                    let mut k = vec![0u8; 32];
                    r.fill_bytes(&mut k);
                    k
                };
                let mut nonce = [0u8; 12];
                r.fill_bytes(&mut nonce);
                let mut plaintext = vec![0u8; len];
                r.fill_bytes(&mut plaintext);

                let ciphertext = encrypt(&key, &nonce, &[b"ad"], tau, &plaintext);
                assert_eq!(ciphertext.len(), len + tau);
                let recovered = decrypt(&key, &nonce, &[b"ad"], tau, &ciphertext).unwrap();
                assert_eq!(recovered, plaintext, "tau={tau} len={len}");
            }
        }
    }

    #[test]
    fn round_trips_for_every_tiny_message_plus_tag_length() {
        // `|M| + tau` in `17..=31` routes through `aez_tiny`'s 16..31-byte
        // branch, whose reassembly buffer used to be sized for exactly one
        // block and panicked on anything past 16 bytes.
        let key = b"tiny-plus-tag regression test key!";
        let nonce = b"n";
        for total in 17usize..=31 {
            for tau in 0..=total.min(16) {
                let len = total - tau;
                let plaintext: Vec<u8> = (0..len as u8).collect();
                let ciphertext = encrypt(key, nonce, &[], tau, &plaintext);
                assert_eq!(ciphertext.len(), total);
                let recovered = decrypt(key, nonce, &[], tau, &ciphertext).unwrap();
                assert_eq!(recovered, plaintext, "len={len} tau={tau}");
            }
        }
    }

    #[test]
    fn tampering_with_any_byte_is_rejected() {
        let key = b"tamper detection test key, 48 bytes long!!!!!!!";
        let nonce = b"nonce";
        let plaintext = b"authenticate this message";
        let ciphertext = encrypt(key, nonce, &[], 16, plaintext);

        for i in 0..ciphertext.len() {
            let mut tampered = ciphertext.clone();
            tampered[i] ^= 0x01;
            assert!(
                decrypt(key, nonce, &[], 16, &tampered).is_err(),
                "byte {i} flip should have been rejected"
            );
        }
    }

    #[test]
    fn associated_data_is_authenticated() {
        let key = b"ad authentication test key value";
        let nonce = b"nonce";
        let plaintext = b"payload";
        let ciphertext = encrypt(key, nonce, &[b"correct ad"], 16, plaintext);

        assert!(decrypt(key, nonce, &[b"wrong ad"], 16, &ciphertext).is_err());
        assert!(decrypt(key, nonce, &[], 16, &ciphertext).is_err());
        assert!(decrypt(key, nonce, &[b"correct ad"], 16, &ciphertext).is_ok());
    }

    #[test]
    fn empty_message_round_trips_as_tag_only_ciphertext() {
        let key = b"empty message test key";
        let nonce = b"n";
        let ciphertext = encrypt(key, nonce, &[], 16, b"");
        assert_eq!(ciphertext.len(), 16);
        let recovered = decrypt(key, nonce, &[], 16, &ciphertext).unwrap();
        assert!(recovered.is_empty());
    }

    #[test]
    fn short_ciphertext_is_rejected_without_panicking() {
        let key = b"short ciphertext test key";
        assert_eq!(decrypt(key, b"n", &[], 16, &[0u8; 4]), Err(AezError::Forgery));
    }

    #[test]
    fn key_length_does_not_change_behavior() {
        let nonce = b"n";
        let plaintext = b"same plaintext either way";
        let a = encrypt(b"a short key", nonce, &[], 16, plaintext);
        let b = encrypt(b"a different length key entirely", nonce, &[], 16, plaintext);
        assert_ne!(a, b);

        let recovered = decrypt(b"a short key", nonce, &[], 16, &a).unwrap();
        assert_eq!(recovered, plaintext);
    }
}
