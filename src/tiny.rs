//! AEZ-tiny: balanced-Feistel encipherment used for `1 <= |M| <= 31` bytes.

use zeroize::Zeroize;

use crate::backend::AesBackend;
use crate::gf128::{self, Block};
use crate::state::State;

/// `d = 0` enciphers, `d = 1` deciphers. `input` and `out` must both be
/// `in_bytes` long, with `in_bytes` in `1..=31`.
pub fn aez_tiny<B: AesBackend>(state: &State<B>, delta: &Block, input: &[u8], d: u8, out: &mut [u8]) {
    let in_bytes = input.len();
    debug_assert!((1..=31).contains(&in_bytes));
    debug_assert_eq!(out.len(), in_bytes);

    let (rounds, tweak_i): (u32, usize) = if in_bytes == 1 {
        (24, 7)
    } else if in_bytes == 2 {
        (16, 7)
    } else if in_bytes < 16 {
        (10, 7)
    } else {
        (8, 6)
    };
    let mut l_tweak = state.l(tweak_i);

    let half = (in_bytes + 1) / 2; // ceil(in_bytes/2)
    let half_floor = in_bytes / 2;

    let mut l_half = [0u8; 16];
    let mut r_half = [0u8; 16];
    l_half[..half].copy_from_slice(&input[..half]);
    r_half[..half].copy_from_slice(&input[half_floor..half_floor + half]);

    let (mut pad, mut mask) = (0x80u8, 0x00u8);
    if in_bytes & 1 != 0 {
        // Odd length: R's bits are nibble-shifted so both halves carry
        // exactly `in_bytes * 4` bits.
        for k in 0..half_floor {
            r_half[k] = (r_half[k] << 4) | (r_half[k + 1] >> 4);
        }
        r_half[half_floor] <<= 4;
        pad = 0x08;
        mask = 0xf0;
    }

    let (mut j, step): (i64, i64) = if d != 0 {
        if in_bytes < 16 {
            let mut buf = gf128::ZERO;
            buf[..in_bytes].copy_from_slice(input);
            buf[0] |= 0x80;
            gf128::xor_in_place(&mut buf, delta);
            let mut tmp = state.e4(&gf128::ZERO, &state.i(1), &state.l(3), &buf);
            l_half[0] ^= tmp[0] & 0x80;
            buf.zeroize();
            tmp.zeroize();
        }
        (rounds as i64 - 1, -1)
    } else {
        (0, 1)
    };

    for _ in 0..(rounds / 2) {
        let mut buf = gf128::ZERO;
        buf[..half].copy_from_slice(&r_half[..half]);
        buf[half_floor] = (buf[half_floor] & mask) | pad;
        gf128::xor_in_place(&mut buf, delta);
        buf[15] ^= j as u8;
        let mut tmp = state.e4(&gf128::ZERO, &state.i(1), &l_tweak, &buf);
        gf128::xor_in_place(&mut l_half, &tmp);
        buf.zeroize();
        tmp.zeroize();

        let mut buf = gf128::ZERO;
        buf[..half].copy_from_slice(&l_half[..half]);
        buf[half_floor] = (buf[half_floor] & mask) | pad;
        gf128::xor_in_place(&mut buf, delta);
        buf[15] ^= (j + step) as u8;
        let mut tmp = state.e4(&gf128::ZERO, &state.i(1), &l_tweak, &buf);
        gf128::xor_in_place(&mut r_half, &tmp);
        buf.zeroize();
        tmp.zeroize();

        j += 2 * step;
    }

    let mut buf = [0u8; 32];
    buf[..half_floor].copy_from_slice(&r_half[..half_floor]);
    buf[half_floor..half_floor + half].copy_from_slice(&l_half[..half]);
    if in_bytes & 1 != 0 {
        for k in (half_floor + 1..in_bytes).rev() {
            buf[k] = (buf[k] >> 4) | (buf[k - 1] << 4);
        }
        buf[half_floor] = (l_half[0] >> 4) | (r_half[half_floor] & 0xf0);
    }
    out[..in_bytes].copy_from_slice(&buf[..in_bytes]);
    buf.zeroize();
    l_half.zeroize();
    r_half.zeroize();

    // The `|M| < 16` domain binding: forces the top bit of the first output
    // byte on encipher (mirrors the matching pre-tweak applied to the
    // input's top bit above, on decipher).
    if in_bytes < 16 && d == 0 {
        let mut buf = gf128::ZERO;
        buf[..in_bytes].copy_from_slice(&out[..in_bytes]);
        buf[0] |= 0x80;
        gf128::xor_in_place(&mut buf, delta);
        let mut tmp = state.e4(&gf128::ZERO, &state.i(1), &state.l(3), &buf);
        out[0] ^= tmp[0] & 0x80;
        buf.zeroize();
        tmp.zeroize();
    }

    l_tweak.zeroize();
}
