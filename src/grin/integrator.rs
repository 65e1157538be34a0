use super::{Hamiltonian, PhaseSpacePoint};
use crate::config::GrinSettings;
use crate::error::{invalid, TraceResult};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntegrationScheme {
    #[serde(rename = "euler")]
    Euler,
    #[serde(rename = "rk4")]
    RungeKutta4,
    /// Adaptive Runge-Kutta with Cash-Karp coefficients.
    #[serde(rename = "rk45")]
    CashKarp45,
}

// Step halvings the adaptive scheme tries before it takes the step anyway.
const MAX_HALVINGS: usize = 30;

// Cash-Karp tableau:
const B: [[f64; 5]; 6] = [
    [0., 0., 0., 0., 0.],
    [1. / 5., 0., 0., 0., 0.],
    [3. / 40., 9. / 40., 0., 0., 0.],
    [3. / 10., -9. / 10., 6. / 5., 0., 0.],
    [-11. / 54., 5. / 2., -70. / 27., 35. / 27., 0.],
    [1631. / 55296., 175. / 512., 575. / 13824., 44275. / 110592., 253. / 4096.],
];
const C5: [f64; 6] = [37. / 378., 0., 250. / 621., 125. / 594., 0., 512. / 1771.];
const C4: [f64; 6] = [
    2825. / 27648.,
    0.,
    18575. / 48384.,
    13525. / 55296.,
    277. / 14336.,
    1. / 4.,
];

/// Advances rays through phase space one step at a time.
///
/// The step in the Hamiltonian parameter is chosen so that the ray moves by about
/// `delta_x_max` (never more, to first order).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Integrator {
    scheme: IntegrationScheme,
    delta_x_max: f64,
    tolerance: f64,
}

impl Integrator {
    pub fn new(scheme: IntegrationScheme, delta_x_max: f64, tolerance: f64) -> TraceResult<Self> {
        if !(delta_x_max > 0.) {
            return invalid(format!("delta_x_max must be positive, got {}", delta_x_max));
        }
        if !(tolerance > 0.) {
            return invalid(format!("integration tolerance must be positive, got {}", tolerance));
        }
        Ok(Integrator {
            scheme,
            delta_x_max,
            tolerance,
        })
    }

    pub fn from_settings(settings: &GrinSettings) -> TraceResult<Self> {
        Integrator::new(settings.scheme, settings.delta_x_max, settings.tolerance)
    }

    pub fn scheme(&self) -> IntegrationScheme {
        self.scheme
    }

    pub fn delta_x_max(&self) -> f64 {
        self.delta_x_max
    }

    fn derivative(h: &dyn Hamiltonian, p: PhaseSpacePoint) -> PhaseSpacePoint {
        PhaseSpacePoint {
            x: h.dh_dk(p.x, p.k),
            k: -h.dh_dx(p.x, p.k),
        }
    }

    pub fn step(&self, h: &dyn Hamiltonian, p: PhaseSpacePoint) -> TraceResult<PhaseSpacePoint> {
        let f0 = Integrator::derivative(h, p);
        let speed = f0.x.length();
        if !(speed > 0.) || !speed.is_finite() {
            return invalid(format!(
                "ray stalls at ({}, {}, {}): dH/dk = {}",
                p.x.x, p.x.y, p.x.z, speed
            ));
        }
        let tau = self.delta_x_max / speed;

        Ok(match self.scheme {
            IntegrationScheme::Euler => p + f0 * tau,
            IntegrationScheme::RungeKutta4 => {
                let k2 = Integrator::derivative(h, p + f0 * (tau / 2.));
                let k3 = Integrator::derivative(h, p + k2 * (tau / 2.));
                let k4 = Integrator::derivative(h, p + k3 * tau);
                p + (f0 + k2 * 2. + k3 * 2. + k4) * (tau / 6.)
            }
            IntegrationScheme::CashKarp45 => self.cash_karp(h, p, f0, tau),
        })
    }

    fn cash_karp(
        &self,
        h: &dyn Hamiltonian,
        p: PhaseSpacePoint,
        f0: PhaseSpacePoint,
        tau: f64,
    ) -> PhaseSpacePoint {
        let k_scale = p.k.length().max(1e-12);
        let mut tau = tau;
        let mut halvings = 0;
        loop {
            let mut f = [f0; 6];
            for i in 1..6 {
                let mut arg = p;
                for j in 0..i {
                    arg = arg + f[j] * (tau * B[i][j]);
                }
                f[i] = Integrator::derivative(h, arg);
            }

            let mut fifth = p;
            let mut fourth = p;
            for i in 0..6 {
                fifth = fifth + f[i] * (tau * C5[i]);
                fourth = fourth + f[i] * (tau * C4[i]);
            }
            let error = (fifth.x - fourth.x).length() / self.delta_x_max
                + (fifth.k - fourth.k).length() / k_scale;
            if error <= self.tolerance || halvings == MAX_HALVINGS {
                return fifth;
            }
            tau /= 2.;
            halvings += 1;
        }
    }
}
