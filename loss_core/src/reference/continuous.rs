//! # Moment Distribution Method (Hardy Cross)
//!
//! Continuity moments of a girder line made continuous over its interior
//! piers. Exterior supports are pinned; interior joints are continuous.
//!
//! ## Algorithm Overview
//!
//! 1. Distribution factors from the span stiffness `EI/L`, reduced to
//!    `3EI/4L` for spans whose far end is an exterior pin
//! 2. Fixed-end moments per span, clockwise positive
//! 3. Release the exterior pins, carrying half over to the far end
//! 4. Balance the interior joints, carrying half over to the far end unless
//!    it is an exterior pin, until the unbalance vanishes
//!
//! Results are returned as sagging-positive end moments so they can be
//! added directly to simple-span moments.

/// Maximum balancing cycles
const MAX_ITERATIONS: usize = 200;

/// Unbalance tolerance relative to the largest fixed-end moment
const RELATIVE_TOLERANCE: f64 = 1.0e-12;

#[derive(Debug, Clone)]
struct SpanData {
    length: f64,
    /// Stiffness factor k = EI/L
    k: f64,
    fem_left: f64,
    fem_right: f64,
    moment_left: f64,
    moment_right: f64,
}

#[derive(Debug, Clone)]
pub struct MomentDistribution {
    spans: Vec<SpanData>,
    /// Distribution factors at each interior joint, (left span, right span)
    factors: Vec<(f64, f64)>,
}

impl MomentDistribution {
    pub fn new(lengths: &[f64], ei: f64) -> Self {
        let n = lengths.len();
        let spans: Vec<SpanData> = lengths
            .iter()
            .map(|&length| SpanData {
                length,
                k: if length > 0.0 { ei / length } else { 0.0 },
                fem_left: 0.0,
                fem_right: 0.0,
                moment_left: 0.0,
                moment_right: 0.0,
            })
            .collect();

        // Interior joint j sits between span j-1 and span j
        let factors = (1..n)
            .map(|j| {
                let modified = |span: usize| {
                    let exterior_far_end = span == 0 || span == n - 1;
                    if exterior_far_end {
                        0.75 * spans[span].k
                    } else {
                        spans[span].k
                    }
                };
                let (left, right) = (modified(j - 1), modified(j));
                let total = left + right;
                if total > 0.0 {
                    (left / total, right / total)
                } else {
                    (0.0, 0.0)
                }
            })
            .collect();

        MomentDistribution { spans, factors }
    }

    pub fn span_count(&self) -> usize {
        self.spans.len()
    }

    pub fn length(&self, span: usize) -> f64 {
        self.spans[span].length
    }

    /// Add clockwise-positive fixed-end moments to a span
    pub fn add_fixed_end_moments(&mut self, span: usize, left: f64, right: f64) {
        if let Some(s) = self.spans.get_mut(span) {
            s.fem_left += left;
            s.fem_right += right;
        }
    }

    /// Fixed-end moments of a uniform load over the full span
    pub fn add_uniform_load(&mut self, span: usize, w: f64) {
        let l = self.spans.get(span).map_or(0.0, |s| s.length);
        let fem = w * l * l / 12.0;
        self.add_fixed_end_moments(span, -fem, fem);
    }

    /// Fixed-end moments of an imposed curvature, from its integrals over
    /// the span `Φ0 = ∫κ dx` and `Φ1 = ∫κ·x dx`
    pub fn add_imposed_curvature(&mut self, span: usize, ei: f64, phi0: f64, phi1: f64) {
        let l = self.spans.get(span).map_or(0.0, |s| s.length);
        if l <= 0.0 {
            return;
        }
        let sag_left = -4.0 * ei * phi0 / l + 6.0 * ei * phi1 / (l * l);
        let sag_right = 2.0 * ei * phi0 / l - 6.0 * ei * phi1 / (l * l);
        self.add_fixed_end_moments(span, sag_left, -sag_right);
    }

    /// Run the distribution. Returns false if the iteration limit was reached.
    pub fn solve(&mut self) -> bool {
        for span in &mut self.spans {
            span.moment_left = span.fem_left;
            span.moment_right = span.fem_right;
        }

        let n = self.spans.len();
        if n == 0 {
            return true;
        }
        if n == 1 {
            self.spans[0].moment_left = 0.0;
            self.spans[0].moment_right = 0.0;
            return true;
        }

        let scale = self
            .spans
            .iter()
            .map(|s| s.fem_left.abs().max(s.fem_right.abs()))
            .fold(0.0_f64, f64::max);
        if scale == 0.0 {
            return true;
        }
        let tolerance = RELATIVE_TOLERANCE * scale;

        // Exterior pins cannot hold moment
        let release = -self.spans[0].moment_left;
        self.spans[0].moment_left = 0.0;
        self.spans[0].moment_right += 0.5 * release;

        let release = -self.spans[n - 1].moment_right;
        self.spans[n - 1].moment_right = 0.0;
        self.spans[n - 1].moment_left += 0.5 * release;

        for _ in 0..MAX_ITERATIONS {
            let mut max_unbalance = 0.0_f64;

            for j in 1..n {
                let (left, right) = (j - 1, j);
                let unbalanced = self.spans[left].moment_right + self.spans[right].moment_left;
                max_unbalance = max_unbalance.max(unbalanced.abs());
                if unbalanced.abs() < tolerance {
                    continue;
                }

                let (df_left, df_right) = self.factors[j - 1];
                let to_left = -unbalanced * df_left;
                let to_right = -unbalanced * df_right;
                self.spans[left].moment_right += to_left;
                self.spans[right].moment_left += to_right;

                // No carryover into an exterior pin
                if left != 0 {
                    self.spans[left].moment_left += 0.5 * to_left;
                }
                if right != n - 1 {
                    self.spans[right].moment_right += 0.5 * to_right;
                }
            }

            if max_unbalance < tolerance {
                return true;
            }
        }

        false
    }

    /// Sagging-positive moments at the (left, right) end of each span
    pub fn end_moments(&self) -> Vec<(f64, f64)> {
        self.spans
            .iter()
            .map(|span| (span.moment_left, -span.moment_right))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn test_two_equal_spans_uniform_load() {
        // Interior support moment = -wL²/8
        let (w, l) = (0.1, 1200.0);
        let mut md = MomentDistribution::new(&[l, l], 1.0e9);
        md.add_uniform_load(0, w);
        md.add_uniform_load(1, w);
        assert!(md.solve());
        let moments = md.end_moments();
        let expected = -w * l * l / 8.0;
        assert!(approx_eq(moments[0].1, expected, 1e-6));
        assert!(approx_eq(moments[1].0, expected, 1e-6));
        assert!(approx_eq(moments[0].0, 0.0, 1e-9));
        assert!(approx_eq(moments[1].1, 0.0, 1e-9));
    }

    #[test]
    fn test_two_spans_one_loaded() {
        // Interior support moment = -wL²/16
        let (w, l) = (0.1, 1200.0);
        let mut md = MomentDistribution::new(&[l, l], 1.0e9);
        md.add_uniform_load(0, w);
        assert!(md.solve());
        let moments = md.end_moments();
        assert!(approx_eq(moments[0].1, -w * l * l / 16.0, 1e-6));
    }

    #[test]
    fn test_three_spans_converge() {
        // Three equal spans, all loaded: interior moments = -wL²/10
        let (w, l) = (0.1, 1000.0);
        let mut md = MomentDistribution::new(&[l, l, l], 1.0e9);
        for span in 0..3 {
            md.add_uniform_load(span, w);
        }
        assert!(md.solve());
        let moments = md.end_moments();
        let expected = -w * l * l / 10.0;
        assert!(approx_eq(moments[0].1, expected, 1e-4));
        assert!(approx_eq(moments[2].0, expected, 1e-4));
    }

    #[test]
    fn test_uniform_curvature_on_two_spans() {
        // A uniform imposed curvature on a two-span beam is restrained by
        // an interior moment of -1.5·EI·κ
        let (ei, kappa, l) = (1.0e9, 1.0e-6, 1200.0);
        let mut md = MomentDistribution::new(&[l, l], ei);
        for span in 0..2 {
            md.add_imposed_curvature(span, ei, kappa * l, kappa * l * l / 2.0);
        }
        assert!(md.solve());
        let moments = md.end_moments();
        assert!(approx_eq(moments[0].1, -1.5 * ei * kappa, 1e-6));
        assert!(approx_eq(moments[0].0, 0.0, 1e-9));
    }

    #[test]
    fn test_single_span_is_determinate() {
        let mut md = MomentDistribution::new(&[1200.0], 1.0e9);
        md.add_uniform_load(0, 0.1);
        assert!(md.solve());
        assert_eq!(md.end_moments(), vec![(0.0, 0.0)]);
    }
}
