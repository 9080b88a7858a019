use std::f64::consts::PI;

/// Trait defining the basic filter interface.
pub trait Filter {
    fn process(&mut self, input: f64) -> f64;
    fn reset(&mut self);
}

/// A second-order (12 dB/octave) low-pass biquad using Direct Form I.
#[derive(Clone, Copy, Debug)]
pub struct Biquad {
    pub sample_rate: f64,
    pub frequency: f64,
    pub q: f64,
    // Coefficients, a0 normalized to 1
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
    // State variables (Direct Form I)
    x1: f64,
    x2: f64,
    y1: f64,
    y2: f64,
}

impl Biquad {
    pub fn low_pass(sample_rate: f64, frequency: f64, q: f64) -> Self {
        let sample_rate = if sample_rate > 0.0 { sample_rate } else { 1.0 };
        let mut filter = Self {
            sample_rate,
            // the 1 Hz floor gives way to the Nyquist bound at very low rates
            frequency: frequency.max(1.0).min(sample_rate * 0.499),
            q: q.max(0.01),
            b0: 1.0,
            b1: 0.0,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        };
        filter.update_coefficients();
        filter
    }

    /// Recalculates the coefficients from the Audio EQ Cookbook (RBJ) low-pass.
    pub fn update_coefficients(&mut self) {
        let omega = 2.0 * PI * self.frequency / self.sample_rate;
        let sn = omega.sin();
        let cs = omega.cos();
        let alpha = sn / (2.0 * self.q);

        let a0 = 1.0 + alpha;
        self.b0 = (1.0 - cs) / 2.0 / a0;
        self.b1 = (1.0 - cs) / a0;
        self.b2 = (1.0 - cs) / 2.0 / a0;
        self.a1 = -2.0 * cs / a0;
        self.a2 = (1.0 - alpha) / a0;
    }
}

impl Filter for Biquad {
    #[inline(always)]
    fn process(&mut self, input: f64) -> f64 {
        // y[n] = b0*x[n] + b1*x[n-1] + b2*x[n-2] - a1*y[n-1] - a2*y[n-2]
        let output = self.b0 * input + self.b1 * self.x1 + self.b2 * self.x2
            - self.a1 * self.y1
            - self.a2 * self.y2;

        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = output;

        // flush denormals
        if output.abs() < 1e-30 {
            0.0
        } else {
            output
        }
    }

    fn reset(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }
}

/// Two low-pass stages in series for a 24 dB/octave slope.
#[derive(Clone, Copy, Debug)]
pub struct CascadedBiquad {
    pub first: Biquad,
    pub second: Biquad,
}

impl CascadedBiquad {
    pub fn low_pass(sample_rate: f64, frequency: f64, q: f64) -> Self {
        // Q slightly above 0.5 per stage keeps the cascade well damped
        let q_stage = q.max(0.501);
        Self {
            first: Biquad::low_pass(sample_rate, frequency, q_stage),
            second: Biquad::low_pass(sample_rate, frequency, q_stage),
        }
    }
}

impl Filter for CascadedBiquad {
    #[inline(always)]
    fn process(&mut self, input: f64) -> f64 {
        let temp = self.first.process(input);
        self.second.process(temp)
    }

    fn reset(&mut self) {
        self.first.reset();
        self.second.reset();
    }
}
