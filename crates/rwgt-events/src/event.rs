use rwgt_core::EventId;
use serde::{Deserialize, Serialize};

/// A particle leg of the hard process.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    /// PDG Monte Carlo particle code.
    pub pdg: i32,
    /// Energy.
    pub e: f64,
    /// Momentum x component.
    pub px: f64,
    /// Momentum y component.
    pub py: f64,
    /// Momentum z component.
    pub pz: f64,
}

impl Particle {
    /// Creates a particle from its code and four-momentum.
    pub fn new(pdg: i32, [e, px, py, pz]: [f64; 4]) -> Self {
        Self { pdg, e, px, py, pz }
    }

    /// Four-momentum as `[E, px, py, pz]`.
    pub fn momentum(&self) -> [f64; 4] {
        [self.e, self.px, self.py, self.pz]
    }
}

/// One simulated event: identifier, incoming and outgoing legs, and the
/// optional coefficient vector attached on export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Identifier, unique within the sample.
    pub id: EventId,
    /// Incoming particles in order.
    pub input: Vec<Particle>,
    /// Outgoing particles in order.
    pub output: Vec<Particle>,
    /// Reweighting coefficients, empty until attached.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub coefficients: Vec<f64>,
}

impl Event {
    /// Creates an event without coefficients.
    pub fn new(id: EventId, input: Vec<Particle>, output: Vec<Particle>) -> Self {
        Self {
            id,
            input,
            output,
            coefficients: Vec::new(),
        }
    }

    /// Particle codes, incoming first.
    pub fn particle_codes(&self) -> Vec<i32> {
        self.input.iter().chain(&self.output).map(|p| p.pdg).collect()
    }

    /// Summed four-momentum of the outgoing legs.
    pub fn outgoing_momentum(&self) -> [f64; 4] {
        self.output.iter().fold([0.0; 4], |mut acc, particle| {
            for (slot, value) in acc.iter_mut().zip(particle.momentum()) {
                *slot += value;
            }
            acc
        })
    }
}
