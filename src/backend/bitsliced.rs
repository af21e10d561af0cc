//! Constant-time software AES round function, used whenever the host CPU
//! has no AES-NI.
//!
//! Every byte of the state is carried through `SubBytes` via closed-form
//! GF(2^8) arithmetic (inversion by repeated squaring, then the standard
//! affine map) rather than a lookup table, so there is no
//! secret-dependent memory access anywhere in this module. `ShiftRows` and
//! `MixColumns` are already just wiring and GF(2^8) doublings, which are
//! branch-free by construction.

use zeroize::Zeroize;

use super::AesBackend;
use crate::gf128::Block;

/// GF(2^8) doubling (`xtime`), reduction polynomial `x^8+x^4+x^3+x+1`
/// (`0x1b`). Branchless: the reduction term is masked in rather than
/// `if`-guarded, mirroring `gf128::double`'s treatment of the 128-bit
/// field at byte granularity.
fn xtime(a: u8) -> u8 {
    let carry_mask = 0u8.wrapping_sub(a >> 7);
    (a << 1) ^ (carry_mask & 0x1b)
}

/// GF(2^8) multiplication by repeated doubling ("Russian peasant"
/// multiplication), unrolled over the 8 bits of `b`. Both operands may be
/// secret; the loop always runs exactly 8 steps and every step's
/// contribution is selected with a mask, never a branch.
fn gmul(a: u8, b: u8) -> u8 {
    let mut a = a;
    let mut b = b;
    let mut product = 0u8;
    for _ in 0..8 {
        let bit_mask = 0u8.wrapping_sub(b & 1);
        product ^= a & bit_mask;
        a = xtime(a);
        b >>= 1;
    }
    product
}

/// `a^254`, the GF(2^8) multiplicative inverse of `a` (and `0` when
/// `a == 0`, matching the convention FIPS-197's S-box uses), computed via
/// the standard 7-squarings/6-multiplies addition chain for the exponent
/// `254 = 128+64+32+16+8+4+2`.
fn gf_inverse(a: u8) -> u8 {
    let a2 = gmul(a, a);
    let a4 = gmul(a2, a2);
    let a8 = gmul(a4, a4);
    let a16 = gmul(a8, a8);
    let a32 = gmul(a16, a16);
    let a64 = gmul(a32, a32);
    let a128 = gmul(a64, a64);
    let mut p = gmul(a2, a4);
    p = gmul(p, a8);
    p = gmul(p, a16);
    p = gmul(p, a32);
    p = gmul(p, a64);
    p = gmul(p, a128);
    p
}

/// The FIPS-197 affine transform following inversion, expressed as four
/// cyclic rotations of the byte plus the constant `0x63` — the standard
/// closed form for the S-box's linear part.
fn affine(b: u8) -> u8 {
    b ^ b.rotate_right(4) ^ b.rotate_right(5) ^ b.rotate_right(6) ^ b.rotate_right(7) ^ 0x63
}

fn sub_byte(a: u8) -> u8 {
    affine(gf_inverse(a))
}

fn sub_bytes(state: &mut Block) {
    for b in state.iter_mut() {
        *b = sub_byte(*b);
    }
}

/// Column-major FIPS state: byte index `r + 4*c` is row `r`, column `c`.
/// Row `r` is rotated left by `r` positions.
fn shift_rows(state: &Block) -> Block {
    let mut out = [0u8; 16];
    for c in 0..4 {
        for r in 0..4 {
            out[r + 4 * c] = state[r + 4 * ((c + r) % 4)];
        }
    }
    out
}

fn mix_columns(state: &Block) -> Block {
    let mut out = [0u8; 16];
    for c in 0..4 {
        let s0 = state[4 * c];
        let s1 = state[4 * c + 1];
        let s2 = state[4 * c + 2];
        let s3 = state[4 * c + 3];
        let t = s0 ^ s1 ^ s2 ^ s3;
        out[4 * c] = s0 ^ t ^ xtime(s0 ^ s1);
        out[4 * c + 1] = s1 ^ t ^ xtime(s1 ^ s2);
        out[4 * c + 2] = s2 ^ t ^ xtime(s2 ^ s3);
        out[4 * c + 3] = s3 ^ t ^ xtime(s3 ^ s0);
    }
    out
}

fn add_round_key(state: &mut Block, key: &Block) {
    for i in 0..16 {
        state[i] ^= key[i];
    }
}

/// `SubBytes`, `ShiftRows`, `MixColumns`, `AddRoundKey` — one AEZ round,
/// keyed by `key`. Every round of AES4 and AES10 runs this in full,
/// including the last one of each (no FIPS-197 "skip MixColumns on the
/// final round" special case — AEZ's round schedule has no such thing).
fn round(state: &mut Block, key: &Block) {
    sub_bytes(state);
    let shifted = shift_rows(state);
    let mixed = mix_columns(&shifted);
    *state = mixed;
    add_round_key(state, key);
}

pub struct BitslicedBackend {
    i: Block,
    j: Block,
    l: Block,
    zero: Block,
}

impl AesBackend for BitslicedBackend {
    fn new(i: &Block, j: &Block, l: &Block) -> Self {
        BitslicedBackend {
            i: *i,
            j: *j,
            l: *l,
            zero: crate::gf128::ZERO,
        }
    }

    fn rounds(&self, state: &mut Block, n: u8) {
        debug_assert!(n == 4 || n == 10, "AEZ only ever calls rounds(_, 4 | 10)");
        match n {
            4 => {
                round(state, &self.j);
                round(state, &self.i);
                round(state, &self.l);
                round(state, &self.zero);
            }
            10 => {
                for _ in 0..3 {
                    round(state, &self.i);
                    round(state, &self.j);
                    round(state, &self.l);
                }
                round(state, &self.i);
            }
            _ => unreachable!("rounds() is only ever called with n = 4 or n = 10"),
        }
    }

    fn reset(&mut self) {
        self.i.zeroize();
        self.j.zeroize();
        self.l.zeroize();
    }
}

impl Drop for BitslicedBackend {
    fn drop(&mut self) {
        self.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xtime_matches_known_values() {
        assert_eq!(xtime(0x01), 0x02);
        assert_eq!(xtime(0x80), 0x1b);
        assert_eq!(xtime(0x00), 0x00);
    }

    #[test]
    fn gmul_is_commutative_and_matches_xtime() {
        assert_eq!(gmul(0x57, 0x02), xtime(0x57));
        assert_eq!(gmul(0x57, 0x13), gmul(0x13, 0x57));
        assert_eq!(gmul(0x00, 0xAB), 0x00);
        assert_eq!(gmul(0x01, 0xAB), 0xAB);
    }

    #[test]
    fn sbox_of_zero_and_known_vector() {
        // FIPS-197 S-box table: sbox(0x00) = 0x63, sbox(0x53) = 0xed.
        assert_eq!(sub_byte(0x00), 0x63);
        assert_eq!(sub_byte(0x53), 0xed);
    }

    #[test]
    fn aes4_and_aes10_are_deterministic() {
        let i = [1u8; 16];
        let j = [2u8; 16];
        let l = [3u8; 16];
        let backend = BitslicedBackend::new(&i, &j, &l);
        let mut a = [0xAAu8; 16];
        let mut b = [0xAAu8; 16];
        backend.rounds(&mut a, 4);
        backend.rounds(&mut b, 4);
        assert_eq!(a, b);

        let mut c = [0xAAu8; 16];
        backend.rounds(&mut c, 10);
        assert_ne!(a, c);
    }
}
