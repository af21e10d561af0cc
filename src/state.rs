//! Per-call key schedule: the doubled `I`/`J` material and precomputed `L`
//! multiples the tweakable cipher `E^{j,i}` is built from, plus the keyed
//! AES backend.

use zeroize::Zeroize;

use crate::backend::{AesBackend, Dispatched};
use crate::gf128::{self, Block};
use crate::key::ExpandedKey;

/// `I[0] = I`, `I[1] = 2I`; `J[0] = J`, `J[1] = 2J`, `J[2] = 4J`;
/// `L[0] = 0`, `L[1] = L ... L[7] = 7L`. Exactly the layout
/// `examples/original_source/aez.go`'s `eState` uses, since every tweak
/// `E^{j,i}` in §4.2-§4.7 is defined in terms of these specific multiples
/// and no others.
pub struct State<B: AesBackend = Dispatched> {
    i: [Block; 2],
    j: [Block; 3],
    l: [Block; 8],
    aes: B,
}

impl<B: AesBackend> State<B> {
    pub fn new(key: &[u8]) -> Self {
        let extracted = ExpandedKey::extract(key);
        let i0 = extracted.i();
        let i1 = gf128::double(&i0);

        let j0 = extracted.j();
        let j1 = gf128::double(&j0);
        let j2 = gf128::double(&j1);

        let l0 = gf128::ZERO;
        let l1 = extracted.l();
        let l2 = gf128::double(&l1);
        let l3 = gf128::xor(&l2, &l1);
        let l4 = gf128::double(&l2);
        let l5 = gf128::xor(&l4, &l1);
        let l6 = gf128::double(&l3);
        let l7 = gf128::xor(&l6, &l1);

        let aes = B::new(&i0, &j0, &l1);

        State {
            i: [i0, i1],
            j: [j0, j1, j2],
            l: [l0, l1, l2, l3, l4, l5, l6, l7],
            aes,
        }
    }

    pub fn i(&self, idx: usize) -> Block {
        self.i[idx]
    }

    pub fn j(&self, idx: usize) -> Block {
        self.j[idx]
    }

    pub fn l(&self, idx: usize) -> Block {
        self.l[idx % 8]
    }

    /// `E^{j,i}(in)`: the four-way tweak XOR fused with the backend's
    /// 4-round schedule. `j, i, l` here are the already-multiplied tweak
    /// blocks (the caller has already done e.g. `j * J`, `2^{ceil(idx/8)}
    /// * I`), not the key-schedule blocks this `State` holds internally.
    pub fn e4(&self, j: &Block, i: &Block, l: &Block, input: &Block) -> Block {
        let mut dst = gf128::xor(j, i);
        gf128::xor_in_place(&mut dst, l);
        gf128::xor_in_place(&mut dst, input);
        self.aes.rounds(&mut dst, 4);
        dst
    }

    /// `E^{-1,i}(in)`: a single-block XOR fused with the backend's
    /// 10-round schedule.
    pub fn e10(&self, l: &Block, input: &Block) -> Block {
        let mut dst = gf128::xor(input, l);
        self.aes.rounds(&mut dst, 10);
        dst
    }

    pub fn reset(&mut self) {
        for b in self.i.iter_mut() {
            b.zeroize();
        }
        for b in self.j.iter_mut() {
            b.zeroize();
        }
        for b in self.l.iter_mut() {
            b.zeroize();
        }
        self.aes.reset();
    }
}

impl<B: AesBackend> Drop for State<B> {
    fn drop(&mut self) {
        self.reset();
    }
}
