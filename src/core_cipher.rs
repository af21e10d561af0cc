//! AEZ-core: the two-pass wide-block encipherment used once
//! `|message| + τ >= 32` bytes, operating entirely in place on a single
//! buffer (the caller has already copied the plaintext/ciphertext into the
//! buffer it wants the result written back into — see §9's in-place
//! support requirement).

use zeroize::Zeroize;

use crate::backend::AesBackend;
use crate::gf128::{self, Block};
use crate::state::State;

fn read_block(buf: &[u8], at: usize) -> Block {
    buf[at..at + 16].try_into().unwrap()
}

/// Pass 1: folds every full 32-byte pair into the accumulator `x`, writing
/// `W = M_{2i-1} ^ E^{1,i}(M_{2i})` and `X_i = M_{2i} ^ E^{0,0}(W)` back in
/// place of the pair it came from, then folds the trailing 0..31-byte
/// fragment (if any) into `x` without touching the buffer. Returns the
/// number of bytes consumed — everything except the final two blocks.
fn pass1<B: AesBackend>(state: &State<B>, buf: &mut [u8], x: &mut Block) -> usize {
    let total = buf.len();
    let mut remaining = total;
    let mut i_tweak = state.i(1);
    let mut pos = 0usize;
    let mut idx: u32 = 1;

    while remaining >= 64 {
        let mut m1 = read_block(buf, pos);
        let mut m2 = read_block(buf, pos + 16);

        let mut e1i = state.e4(&state.j(0), &i_tweak, &state.l(idx as usize), &m2); // E(1,i)
        let mut w = gf128::xor(&m1, &e1i);
        let mut e00 = state.e4(&gf128::ZERO, &state.i(0), &state.l(0), &w); // E(0,0)
        let mut xi = gf128::xor(&m2, &e00);

        buf[pos..pos + 16].copy_from_slice(&w);
        buf[pos + 16..pos + 32].copy_from_slice(&xi);
        gf128::xor_in_place(x, &xi);

        m1.zeroize();
        m2.zeroize();
        e1i.zeroize();
        w.zeroize();
        e00.zeroize();
        xi.zeroize();

        pos += 32;
        remaining -= 32;
        if idx % 8 == 0 {
            i_tweak = gf128::double(&i_tweak);
        }
        idx += 1;
    }

    let fragment_len = remaining - 32; // 0..31, untouched in the buffer
    if fragment_len >= 16 {
        let mut mu = read_block(buf, pos);
        let mut e04 = state.e4(&gf128::ZERO, &state.i(1), &state.l(4), &mu); // E(0,4)
        gf128::xor_in_place(x, &e04);

        let tail_len = fragment_len - 16;
        let mut mv = gf128::ZERO;
        mv[..tail_len].copy_from_slice(&buf[pos + 16..pos + 16 + tail_len]);
        mv[tail_len] = 0x80;
        let mut e05 = state.e4(&gf128::ZERO, &state.i(1), &state.l(5), &mv); // E(0,5)
        gf128::xor_in_place(x, &e05);

        mu.zeroize();
        e04.zeroize();
        mv.zeroize();
        e05.zeroize();
    } else if fragment_len > 0 {
        let mut mu = gf128::ZERO;
        mu[..fragment_len].copy_from_slice(&buf[pos..pos + fragment_len]);
        mu[fragment_len] = 0x80;
        let mut e04 = state.e4(&gf128::ZERO, &state.i(1), &state.l(4), &mu); // E(0,4)
        gf128::xor_in_place(x, &e04);
        mu.zeroize();
        e04.zeroize();
    }

    i_tweak.zeroize();
    pos + fragment_len
}

/// Pass 2: folds `S` into every pair via `E^{2,i}`, swaps the pair, and
/// accumulates `y`; finishes with the fragment's keystream re-encryption
/// (a non-block-sized XOR, distinct from the block XOR used everywhere
/// else — see §4.7's design note). Returns the same consumed-byte count
/// `pass1` returned.
fn pass2<B: AesBackend>(state: &State<B>, buf: &mut [u8], y: &mut Block, s: &Block) -> usize {
    let total = buf.len();
    let mut remaining = total;
    let mut i_tweak = state.i(1);
    let mut pos = 0usize;
    let mut idx: u32 = 1;

    while remaining >= 64 {
        let mut t = state.e4(&state.j(1), &i_tweak, &state.l(idx as usize), s); // E(2,i)
        let mut out1 = read_block(buf, pos);
        let mut out2 = read_block(buf, pos + 16);
        gf128::xor_in_place(&mut out1, &t);
        gf128::xor_in_place(&mut out2, &t);
        gf128::xor_in_place(y, &out1);

        let mut e00 = state.e4(&gf128::ZERO, &state.i(0), &state.l(0), &out2); // E(0,0)
        gf128::xor_in_place(&mut out1, &e00);
        let mut e1i = state.e4(&state.j(0), &i_tweak, &state.l(idx as usize), &out1); // E(1,i)
        gf128::xor_in_place(&mut out2, &e1i);

        buf[pos..pos + 16].copy_from_slice(&out2);
        buf[pos + 16..pos + 32].copy_from_slice(&out1);

        t.zeroize();
        out1.zeroize();
        out2.zeroize();
        e00.zeroize();
        e1i.zeroize();

        pos += 32;
        remaining -= 32;
        if idx % 8 == 0 {
            i_tweak = gf128::double(&i_tweak);
        }
        idx += 1;
    }

    let fragment_len = remaining - 32;
    if fragment_len >= 16 {
        let mut ks4 = state.e10(&state.l(4), s); // E(-1,4)
        let mut in1 = read_block(buf, pos);
        let mut ct1 = gf128::xor(&in1, &ks4);
        buf[pos..pos + 16].copy_from_slice(&ct1);
        let mut e04 = state.e4(&gf128::ZERO, &state.i(1), &state.l(4), &ct1); // E(0,4)
        gf128::xor_in_place(y, &e04);
        in1.zeroize();
        ct1.zeroize();
        e04.zeroize();

        let tail_len = fragment_len - 16;
        let mut ks5 = state.e10(&state.l(5), s); // E(-1,5)
        let mut ct2 = vec![0u8; tail_len];
        for k in 0..tail_len {
            ct2[k] = buf[pos + 16 + k] ^ ks5[k];
        }
        buf[pos + 16..pos + 16 + tail_len].copy_from_slice(&ct2);
        let mut padded = gf128::ZERO;
        padded[..tail_len].copy_from_slice(&ct2);
        padded[tail_len] = 0x80;
        let mut e05 = state.e4(&gf128::ZERO, &state.i(1), &state.l(5), &padded); // E(0,5)
        gf128::xor_in_place(y, &e05);

        ks4.zeroize();
        ks5.zeroize();
        ct2.zeroize();
        padded.zeroize();
        e05.zeroize();
    } else if fragment_len > 0 {
        let mut ks4 = state.e10(&state.l(4), s); // E(-1,4)
        let mut ct = vec![0u8; fragment_len];
        for k in 0..fragment_len {
            ct[k] = buf[pos + k] ^ ks4[k];
        }
        buf[pos..pos + fragment_len].copy_from_slice(&ct);
        let mut padded = gf128::ZERO;
        padded[..fragment_len].copy_from_slice(&ct);
        padded[fragment_len] = 0x80;
        let mut e04 = state.e4(&gf128::ZERO, &state.i(1), &state.l(4), &padded); // E(0,4)
        gf128::xor_in_place(y, &e04);

        ks4.zeroize();
        ct.zeroize();
        padded.zeroize();
        e04.zeroize();
    }

    i_tweak.zeroize();
    pos + fragment_len
}

/// `d = 0` enciphers, `d = 1` deciphers. `buf` holds the plaintext (resp.
/// ciphertext) on entry and the ciphertext (resp. plaintext) on return;
/// `buf.len() >= 32` is required.
pub fn aez_core<B: AesBackend>(state: &State<B>, delta: &Block, buf: &mut [u8], d: u8) {
    debug_assert!(buf.len() >= 32);

    let mut x = gf128::ZERO;
    let mut y = gf128::ZERO;

    let off = pass1(state, buf, &mut x);

    let mut l_1pd = state.l((1 + d as usize) % 8);
    let mut my = read_block(buf, off + 16);
    let mut e0_1pd = state.e4(&gf128::ZERO, &state.i(1), &l_1pd, &my); // E(0,1+d)
    let mut mx = read_block(buf, off);
    let mut sx = gf128::xor(&x, &mx);
    gf128::xor_in_place(&mut sx, delta);
    gf128::xor_in_place(&mut sx, &e0_1pd);
    buf[off..off + 16].copy_from_slice(&sx);
    mx.zeroize();
    e0_1pd.zeroize();

    let mut e_neg1_1pd = state.e10(&l_1pd, &sx); // E(-1,1+d)
    let mut sy = gf128::xor(&my, &e_neg1_1pd);
    buf[off + 16..off + 32].copy_from_slice(&sy);
    my.zeroize();
    e_neg1_1pd.zeroize();
    l_1pd.zeroize();

    let mut s = gf128::xor(&sx, &sy);
    sx.zeroize();
    sy.zeroize();

    let off2 = pass2(state, buf, &mut y, &s);
    debug_assert_eq!(off, off2);
    s.zeroize();

    let mut l_2md = state.l((2 + 8 - d as usize) % 8);
    let mut sy = read_block(buf, off + 16);
    let mut sx = read_block(buf, off);
    let mut e_neg1_2md = state.e10(&l_2md, &sy); // E(-1,2-d)
    let mut yx = gf128::xor(&sx, &e_neg1_2md);
    let mut e0_2md = state.e4(&gf128::ZERO, &state.i(1), &l_2md, &yx); // E(0,2-d)
    let mut yy = gf128::xor(&e0_2md, &sy);
    gf128::xor_in_place(&mut yy, delta);
    gf128::xor_in_place(&mut yy, &y);

    buf[off..off + 16].copy_from_slice(&yy);
    buf[off + 16..off + 32].copy_from_slice(&yx);

    sx.zeroize();
    sy.zeroize();
    e_neg1_2md.zeroize();
    e0_2md.zeroize();
    yy.zeroize();
    yx.zeroize();
    l_2md.zeroize();
    x.zeroize();
    y.zeroize();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Dispatched;

    #[test]
    fn round_trips_at_fragment_boundaries() {
        let state: State<Dispatched> = State::new(b"core round trip key");
        let delta = [0x77u8; 16];
        for len in [32usize, 33, 47, 48, 63, 64, 95, 96, 128] {
            let plaintext: Vec<u8> = (0..len).map(|i| (i * 7 + 3) as u8).collect();
            let mut buf = plaintext.clone();
            aez_core(&state, &delta, &mut buf, 0);
            assert_ne!(buf, plaintext, "len={len} ciphertext should differ from plaintext");
            aez_core(&state, &delta, &mut buf, 1);
            assert_eq!(buf, plaintext, "round-trip failed at len={len}");
        }
    }
}
