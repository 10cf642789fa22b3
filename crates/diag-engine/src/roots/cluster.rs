//! Grouping of computed roots into distinct eigenvalues.
//!
//! Two roots are the same eigenvalue iff
//! `|r1 - r2| < eigen · (1 + max(|r1|, |r2|))`, applied transitively.
//! A defective k-fold eigenvalue may split wider than that; neighbouring
//! groups within `Tolerances::multiple_root_diameter(k)` are merged only
//! when the caller confirms the defect against the matrix.
//!
//! Each surviving cluster becomes one eigenvalue whose value is the cluster
//! centroid. Roots taken from the polynomial alone are additionally polished
//! by Newton's method on the (k-1)-th derivative, for which the k-fold root
//! is simple.

use num_complex::Complex64;

use crate::charpoly::Polynomial;
use crate::config::Tolerances;
use crate::error::{EngineError, Result};

const NEWTON_STEPS: usize = 8;

/// A group of computed roots taken to be one eigenvalue.
#[derive(Debug, Clone, PartialEq)]
pub struct RootCluster {
    pub value: Complex64,
    pub multiplicity: usize,
    /// Largest distance between two member roots
    pub diameter: f64,
}

fn diameter(members: &[Complex64]) -> f64 {
    let mut d: f64 = 0.0;
    for (i, a) in members.iter().enumerate() {
        for b in &members[i + 1..] {
            d = d.max((a - b).norm());
        }
    }
    d
}

fn max_modulus(members: &[Complex64]) -> f64 {
    members.iter().map(|z| z.norm()).fold(0.0, f64::max)
}

fn centroid(members: &[Complex64]) -> Complex64 {
    members.iter().sum::<Complex64>() / members.len() as f64
}

fn same_eigenvalue(a: Complex64, b: Complex64, tol: &Tolerances) -> bool {
    (a - b).norm() < tol.eigen * (1.0 + a.norm().max(b.norm()))
}

/// Descending real part, then descending imaginary part.
pub fn descending(a: &Complex64, b: &Complex64) -> std::cmp::Ordering {
    b.re.total_cmp(&a.re).then(b.im.total_cmp(&a.im))
}

/// Partition `roots` into the connected components of the pairwise rule.
///
/// Groups come back in descending order of their leading root.
pub fn cluster_roots(roots: &[Complex64], tol: &Tolerances) -> Vec<Vec<Complex64>> {
    let mut pending = roots.to_vec();
    pending.sort_by(descending);

    let mut clusters = Vec::new();
    while !pending.is_empty() {
        let mut group = vec![pending.remove(0)];
        while let Some(j) = pending
            .iter()
            .position(|&r| group.iter().any(|&g| same_eigenvalue(g, r, tol)))
        {
            group.push(pending.remove(j));
        }
        group.sort_by(descending);
        clusters.push(group);
    }
    clusters
}

/// Merge neighbouring groups that form one split defective eigenvalue.
///
/// Each group in turn seeds unions with its nearest remaining groups. A union
/// of k roots is a candidate while its diameter stays below
/// `multiple_root_diameter(k) · (1 + max|r|)`; the largest candidate for which
/// `is_defective(centroid, k, diameter)` holds is merged.
pub fn merge_multiple_roots<F>(
    groups: Vec<Vec<Complex64>>,
    tol: &Tolerances,
    is_defective: F,
) -> Vec<Vec<Complex64>>
where
    F: Fn(Complex64, usize, f64) -> bool,
{
    let mut pending = groups;
    let mut merged = Vec::new();

    while !pending.is_empty() {
        let seed = pending.remove(0);
        let anchor = centroid(&seed);
        let mut neighbours: Vec<usize> = (0..pending.len()).collect();
        neighbours.sort_by(|&a, &b| {
            (centroid(&pending[a]) - anchor)
                .norm()
                .total_cmp(&(centroid(&pending[b]) - anchor).norm())
        });

        let mut take = 0;
        let mut union = seed.clone();
        for (count, &j) in neighbours.iter().enumerate() {
            union.extend_from_slice(&pending[j]);
            let k = union.len();
            let spread = diameter(&union);
            let limit = tol.multiple_root_diameter(k) * (1.0 + max_modulus(&union));
            if spread < limit && is_defective(centroid(&union), k, spread) {
                take = count + 1;
            }
        }

        let mut chosen = neighbours[..take].to_vec();
        chosen.sort_unstable_by(|a, b| b.cmp(a));
        let mut group = seed;
        for j in chosen {
            group.extend(pending.remove(j));
        }
        group.sort_by(descending);
        merged.push(group);
    }

    merged
}

/// Newton's method on the (k-1)-th derivative, starting from a cluster centroid.
///
/// The step is rejected if it leaves the cluster's tolerance disc or does not
/// reduce the residual.
fn polish(poly: &Polynomial, start: Complex64, multiplicity: usize, reach: f64) -> Complex64 {
    let target = poly.nth_derivative(multiplicity - 1);
    let slope = target.derivative();

    let mut z = start;
    for _ in 0..NEWTON_STEPS {
        let value = target.eval(z);
        let d = slope.eval(z);
        if value.norm() == 0.0 || d.norm() == 0.0 {
            break;
        }
        let next = z - value / d;
        if !next.re.is_finite() || !next.im.is_finite() {
            break;
        }
        let converged = (next - z).norm() <= f64::EPSILON * (1.0 + z.norm());
        z = next;
        if converged {
            break;
        }
    }

    if (z - start).norm() <= reach && target.eval(z).norm() <= target.eval(start).norm() {
        z
    } else {
        start
    }
}

/// Pair every upper-half-plane cluster with its conjugate and symmetrise both.
fn pair_conjugates(clusters: &mut [RootCluster], tol: &Tolerances) -> Result<()> {
    let mut paired = vec![false; clusters.len()];
    for i in 0..clusters.len() {
        if clusters[i].value.im <= 0.0 {
            continue;
        }
        let target = clusters[i].value.conj();
        let partner = (0..clusters.len())
            .filter(|&j| !paired[j] && clusters[j].value.im < 0.0)
            .min_by(|&a, &b| {
                (clusters[a].value - target)
                    .norm()
                    .total_cmp(&(clusters[b].value - target).norm())
            });

        let Some(j) = partner else {
            return Err(EngineError::non_convergence(
                "root clustering",
                format!("complex root {} has no conjugate partner", clusters[i].value),
            ));
        };

        let k = clusters[i].multiplicity;
        let limit = tol.multiple_root_diameter(k) * (1.0 + target.norm());
        if clusters[j].multiplicity != k || (clusters[j].value - target).norm() >= limit {
            return Err(EngineError::non_convergence(
                "root clustering",
                format!(
                    "complex root {} (multiplicity {}) does not match conjugate candidate {} (multiplicity {})",
                    clusters[i].value, k, clusters[j].value, clusters[j].multiplicity
                ),
            ));
        }

        let upper = (clusters[i].value + clusters[j].value.conj()) / 2.0;
        clusters[i].value = upper;
        clusters[j].value = upper.conj();
        let spread = clusters[i].diameter.max(clusters[j].diameter);
        clusters[i].diameter = spread;
        clusters[j].diameter = spread;
        paired[i] = true;
        paired[j] = true;
    }

    if let Some(j) = (0..clusters.len()).find(|&j| clusters[j].value.im < 0.0 && !paired[j]) {
        return Err(EngineError::non_convergence(
            "root clustering",
            format!("complex root {} has no conjugate partner", clusters[j].value),
        ));
    }
    Ok(())
}

/// Cluster, merge, snap, polish, pair and order the roots of a real monic polynomial.
///
/// `polish` enables the Newton step for roots that came from the polynomial
/// alone; `is_defective` is the confirmation used by [`merge_multiple_roots`].
pub fn resolve_clusters<F>(
    roots: &[Complex64],
    poly: &Polynomial,
    tol: &Tolerances,
    polish_roots: bool,
    is_defective: F,
) -> Result<Vec<RootCluster>>
where
    F: Fn(Complex64, usize, f64) -> bool,
{
    let groups = merge_multiple_roots(cluster_roots(roots, tol), tol, is_defective);

    let mut clusters: Vec<RootCluster> = groups
        .iter()
        .map(|members| {
            let k = members.len();
            let mut value = centroid(members);
            if value.im.abs() < tol.eigen * (1.0 + value.norm()) {
                value.im = 0.0;
            }
            if polish_roots {
                let reach = tol.multiple_root_diameter(k) * (1.0 + value.norm());
                let real = value.im == 0.0;
                value = polish(poly, value, k, reach);
                if real {
                    value.im = 0.0;
                }
            }
            RootCluster {
                value,
                multiplicity: k,
                diameter: diameter(members),
            }
        })
        .collect();

    pair_conjugates(&mut clusters, tol)?;

    let total: usize = clusters.iter().map(|c| c.multiplicity).sum();
    if total != roots.len() {
        return Err(EngineError::non_convergence(
            "root clustering",
            format!("multiplicities sum to {total}, expected {}", roots.len()),
        ));
    }

    clusters.sort_by(|a, b| descending(&a.value, &b.value));
    Ok(clusters)
}
