//! AES-NI backend: one `aesenc` per round, keyed by `I`, `J`, `L` cycled in
//! the order AEZ's AES4/AES10 schedules dictate.
//!
//! Unlike a standard AES-128 encryption (the teacher's `cpu::aes::simd`
//! module, which ran the full 10/11-round FIPS-197 schedule with a
//! key-derived round-key ladder and a final round without `MixColumns`),
//! AEZ folds the tweak into the state *before* calling in here, uses no
//! initial whitening step, and — critically — every round, including the
//! last one of both AES4 and AES10, runs the *full* SubBytes/ShiftRows/
//! MixColumns/AddRoundKey transform. `_mm_aesenc_si128` is exactly that
//! transform, so it is used for every round; `_mm_aesenclast_si128` (which
//! skips `MixColumns`) is never needed here.

#[cfg(target_arch = "x86")]
use core::arch::x86::{__m128i, _mm_aesenc_si128, _mm_loadu_si128, _mm_setzero_si128, _mm_storeu_si128};
#[cfg(target_arch = "x86_64")]
use core::arch::x86_64::{
    __m128i, _mm_aesenc_si128, _mm_loadu_si128, _mm_setzero_si128, _mm_storeu_si128,
};

use super::AesBackend;
use crate::gf128::Block;

/// `I`, `J`, `L` pre-loaded as SSE registers so each round is a single
/// `aesenc`. AES-NI's load/store instructions treat a 16-byte buffer's
/// bytes in the same left-to-right order FIPS-197 uses for its state
/// array, so no byte-swapping is needed going in or out.
pub struct AesNiBackend {
    i: __m128i,
    j: __m128i,
    l: __m128i,
    zero: __m128i,
}

unsafe fn load(b: &Block) -> __m128i {
    _mm_loadu_si128(b.as_ptr() as *const __m128i)
}

unsafe fn store(dst: &mut Block, v: __m128i) {
    _mm_storeu_si128(dst.as_mut_ptr() as *mut __m128i, v);
}

impl AesBackend for AesNiBackend {
    fn new(i: &Block, j: &Block, l: &Block) -> Self {
        unsafe {
            AesNiBackend {
                i: load(i),
                j: load(j),
                l: load(l),
                zero: _mm_setzero_si128(),
            }
        }
    }

    fn rounds(&self, state: &mut Block, n: u8) {
        debug_assert!(n == 4 || n == 10, "AEZ only ever calls rounds(_, 4 | 10)");
        unsafe {
            let mut s = load(state);
            s = match n {
                4 => self.aes4(s),
                10 => self.aes10(s),
                _ => unreachable!("rounds() is only ever called with n = 4 or n = 10"),
            };
            store(state, s);
        }
    }

    fn reset(&mut self) {
        unsafe {
            self.i = _mm_setzero_si128();
            self.j = _mm_setzero_si128();
            self.l = _mm_setzero_si128();
        }
    }
}

impl AesNiBackend {
    /// `J, I, L, 0` — four rounds.
    #[target_feature(enable = "aes", enable = "sse2")]
    unsafe fn aes4(&self, state: __m128i) -> __m128i {
        let s = _mm_aesenc_si128(state, self.j);
        let s = _mm_aesenc_si128(s, self.i);
        let s = _mm_aesenc_si128(s, self.l);
        _mm_aesenc_si128(s, self.zero)
    }

    /// `I, J, L` three times, then a final `I` — ten rounds.
    #[target_feature(enable = "aes", enable = "sse2")]
    unsafe fn aes10(&self, state: __m128i) -> __m128i {
        let mut s = state;
        for _ in 0..3 {
            s = _mm_aesenc_si128(s, self.i);
            s = _mm_aesenc_si128(s, self.j);
            s = _mm_aesenc_si128(s, self.l);
        }
        _mm_aesenc_si128(s, self.i)
    }
}

impl Drop for AesNiBackend {
    fn drop(&mut self) {
        self.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aes4_is_deterministic_and_keyless_symmetric_under_zero_keys() {
        if !is_x86_feature_detected!("aes") || !is_x86_feature_detected!("sse2") {
            return;
        }
        let zero = [0u8; 16];
        let backend = AesNiBackend::new(&zero, &zero, &zero);
        let mut state = [0x11u8; 16];
        backend.rounds(&mut state, 4);
        let mut state2 = [0x11u8; 16];
        backend.rounds(&mut state2, 4);
        assert_eq!(state, state2);
    }

    #[test]
    fn aes4_and_aes10_differ() {
        if !is_x86_feature_detected!("aes") || !is_x86_feature_detected!("sse2") {
            return;
        }
        let i = [1u8; 16];
        let j = [2u8; 16];
        let l = [3u8; 16];
        let backend = AesNiBackend::new(&i, &j, &l);
        let mut a = [0xAAu8; 16];
        let mut b = [0xAAu8; 16];
        backend.rounds(&mut a, 4);
        backend.rounds(&mut b, 10);
        assert_ne!(a, b);
    }
}
