//! Scripted random source for forcing exact branches in unit tests.

use rand::RngCore;

/// Replays a fixed list of uniform rolls for `gen::<f64>()`, cycling when exhausted.
///
/// `next_u32` always yields 0 without consuming a roll, so slice choices and
/// `gen_range` pick the first candidate.
pub(crate) struct ScriptedRng {
    rolls: Vec<f64>,
    next: usize,
}

impl ScriptedRng {
    pub(crate) fn new(rolls: &[f64]) -> Self {
        assert!(!rolls.is_empty());
        assert!(rolls.iter().all(|r| (0.0..1.0).contains(r)));
        Self {
            rolls: rolls.to_vec(),
            next: 0,
        }
    }
}

impl RngCore for ScriptedRng {
    fn next_u32(&mut self) -> u32 {
        0
    }

    fn next_u64(&mut self) -> u64 {
        let roll = self.rolls[self.next % self.rolls.len()];
        self.next += 1;
        // gen::<f64>() keeps the top 53 bits.
        ((roll * (1u64 << 53) as f64) as u64) << 11
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        dest.fill(0);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}
