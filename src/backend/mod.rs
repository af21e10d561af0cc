//! The AES round-function collaborator AEZ's tweakable cipher is built on.
//!
//! AEZ never needs AES *decryption* — both encipherment and decipherment of
//! the wide block route through the forward round function only, the way
//! the reduced-round constructions `E^{j,i}` are defined (§4.2/§4.3 of
//! `SPEC_FULL.md`). A backend therefore only has to expose the forward
//! round transform, keyed by the three 16-byte sub-keys `I, J, L` derived at
//! key-schedule time, cycled in the fixed order AEZ dictates for 4- and
//! 10-round calls.
//!
//! Two backends are provided: an AES-NI accelerated one
//! ([`aesni`]) used when the host CPU advertises the `aes`/`sse2`
//! features, and a constant-time bitsliced one ([`bitsliced`]) used
//! otherwise. The choice is made once, the first time a backend is
//! constructed, mirroring the one-shot `is_x86_feature_detected!` dispatch
//! the rest of this codebase's AES-using ancestor used.

pub mod aesni;
pub mod bitsliced;

use crate::gf128::Block;

/// A keyed AES round-function collaborator.
///
/// `rounds` applies AEZ's `n`-round schedule (`n` is always 4 or 10) to
/// `state` in place; the caller has already folded the tweak into `state`
/// before calling. `reset` wipes the backend's round-key material.
pub trait AesBackend {
    fn new(i: &Block, j: &Block, l: &Block) -> Self
    where
        Self: Sized;
    fn rounds(&self, state: &mut Block, n: u8);
    fn reset(&mut self);
}

/// The backend chosen for this process, constructed once per `Dispatched`
/// value (each `State` owns its own, matching AEZ's single-call resource
/// model — see §5 of `SPEC_FULL.md`).
pub enum Dispatched {
    AesNi(aesni::AesNiBackend),
    Bitsliced(bitsliced::BitslicedBackend),
}

impl AesBackend for Dispatched {
    fn new(i: &Block, j: &Block, l: &Block) -> Self {
        #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
        {
            if is_x86_feature_detected!("aes") && is_x86_feature_detected!("sse2") {
                return Dispatched::AesNi(aesni::AesNiBackend::new(i, j, l));
            }
        }
        Dispatched::Bitsliced(bitsliced::BitslicedBackend::new(i, j, l))
    }

    fn rounds(&self, state: &mut Block, n: u8) {
        match self {
            Dispatched::AesNi(b) => b.rounds(state, n),
            Dispatched::Bitsliced(b) => b.rounds(state, n),
        }
    }

    fn reset(&mut self) {
        match self {
            Dispatched::AesNi(b) => b.reset(),
            Dispatched::Bitsliced(b) => b.reset(),
        }
    }
}
