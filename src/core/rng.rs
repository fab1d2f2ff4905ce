//! PCG32 pseudo-random number generator (O'Neill 2014), the same
//! generator pbrt-family renderers use for the independent sampler and
//! for seeding the Sobol scrambler.

use crate::core::pbrt::Float;

pub const FLOAT_ONE_MINUS_EPSILON: Float = crate::core::pbrt::ONE_MINUS_EPSILON;

const PCG32_DEFAULT_STATE: u64 = 0x853c_49e6_748f_ea9b;
const PCG32_DEFAULT_STREAM: u64 = 0xda3e_39cb_94b9_5bdb;
const PCG32_MULT: u64 = 0x5851_f42d_4c95_7f2d;

#[derive(Debug, Copy, Clone)]
pub struct Rng {
    state: u64,
    inc: u64,
}

impl Default for Rng {
    fn default() -> Self {
        Rng {
            state: PCG32_DEFAULT_STATE,
            inc: PCG32_DEFAULT_STREAM,
        }
    }
}

impl Rng {
    pub fn new(seq_index: u64, offset: u64) -> Self {
        let mut rng = Rng { state: 0, inc: 0 };
        rng.set_sequence(seq_index, offset);
        rng
    }
    pub fn set_sequence(&mut self, seq_index: u64, seed: u64) {
        self.state = 0;
        self.inc = (seq_index << 1) | 1;
        self.uniform_uint32();
        self.state = self.state.wrapping_add(seed);
        self.uniform_uint32();
    }
    pub fn uniform_uint32(&mut self) -> u32 {
        let old_state = self.state;
        self.state = old_state
            .wrapping_mul(PCG32_MULT)
            .wrapping_add(self.inc);
        let xorshifted = (((old_state >> 18) ^ old_state) >> 27) as u32;
        let rot = (old_state >> 59) as u32;
        (xorshifted >> rot) | (xorshifted << ((!rot).wrapping_add(1) & 31))
    }
    pub fn uniform_uint32_bounded(&mut self, b: u32) -> u32 {
        let threshold = (!b).wrapping_add(1) % b;
        loop {
            let r = self.uniform_uint32();
            if r >= threshold {
                return r % b;
            }
        }
    }
    pub fn uniform_float(&mut self) -> Float {
        (self.uniform_uint32() as Float * 2.328_306_4e-10_f32).min(FLOAT_ONE_MINUS_EPSILON)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_streams_diverge() {
        let mut a = Rng::new(1, 0);
        let mut b = Rng::new(2, 0);
        assert_ne!(a.uniform_uint32(), b.uniform_uint32());
    }

    #[test]
    fn uniform_float_in_unit_interval() {
        let mut rng = Rng::new(7, 3);
        for _ in 0..10_000 {
            let f = rng.uniform_float();
            assert!((0.0..1.0).contains(&f));
        }
    }
}
