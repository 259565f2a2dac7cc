// ============================================================
// Layer 5 — CART Decision Tree
// ============================================================
// One classification tree of the forest.
//
//   - impurity:      Gini, 1 - Σ p_k²
//   - split test:    row[feature] <= threshold goes left
//   - thresholds:    midpoints between consecutive distinct
//                    values of a feature
//   - per split:     `max_features` candidate features drawn
//                    without replacement from the tree's RNG
//   - leaves:        class probability distribution over the
//                    forest's class list
//
// Nodes live in a flat arena (Vec<Node>) and refer to their
// children by index, so the whole tree serialises with serde.

use ndarray::{ArrayView1, ArrayView2};
use rand::seq::index::sample;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    Split {
        feature:   usize,
        threshold: f64,
        left:      usize,
        right:     usize,
    },
    Leaf {
        distribution: Vec<f64>,
    },
}

/// Growth limits for a single tree
#[derive(Debug, Clone, Copy)]
pub struct TreeParams {
    pub max_depth:         Option<usize>,
    pub max_features:      usize,
    pub min_samples_split: usize,
    pub min_samples_leaf:  usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

/// Borrowed training data shared by every recursive call
struct GrowCtx<'a> {
    rows:      ArrayView2<'a, f64>,
    targets:   &'a [usize],
    n_classes: usize,
    params:    TreeParams,
}

struct BestSplit {
    feature:   usize,
    threshold: f64,
    impurity:  f64,
}

impl DecisionTree {
    /// Grow a tree on the rows listed in `sample_idx`.
    /// `sample_idx` may repeat rows (bootstrap sample).
    pub fn fit<'a, R: Rng>(
        rows:       ArrayView2<'a, f64>,
        targets:    &'a [usize],
        sample_idx: &[usize],
        n_classes:  usize,
        params:     TreeParams,
        rng:        &mut R,
    ) -> Self {
        let ctx = GrowCtx { rows, targets, n_classes, params };
        let mut tree    = DecisionTree { nodes: Vec::new() };
        let mut samples = sample_idx.to_vec();
        tree.grow(&ctx, &mut samples, 0, rng);
        tree
    }

    /// Class distribution of the leaf `row` lands in
    pub fn predict_proba(&self, row: ArrayView1<'_, f64>) -> &[f64] {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Split { feature, threshold, left, right } => {
                    idx = if row[*feature] <= *threshold { *left } else { *right };
                }
                Node::Leaf { distribution } => return distribution,
            }
        }
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Longest root-to-leaf path, counted in edges
    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], idx: usize) -> usize {
            match &nodes[idx] {
                Node::Split { left, right, .. } => 1 + walk(nodes, *left).max(walk(nodes, *right)),
                Node::Leaf { .. } => 0,
            }
        }
        if self.nodes.is_empty() { 0 } else { walk(&self.nodes, 0) }
    }

    fn grow<R: Rng>(
        &mut self,
        ctx:     &GrowCtx<'_>,
        samples: &mut [usize],
        depth:   usize,
        rng:     &mut R,
    ) -> usize {
        let counts = class_counts(ctx, samples);
        let node_idx = self.nodes.len();
        self.nodes.push(leaf(&counts, samples.len()));

        let at_depth_limit = ctx.params.max_depth.map_or(false, |d| depth >= d);
        let is_pure        = counts.iter().filter(|&&c| c > 0).count() <= 1;
        if at_depth_limit || is_pure || samples.len() < ctx.params.min_samples_split {
            return node_idx;
        }

        let Some(best) = best_split(ctx, samples, rng) else {
            return node_idx;
        };

        // Partition in place: left block = rows with value <= threshold
        let mut mid = 0;
        for i in 0..samples.len() {
            if ctx.rows[[samples[i], best.feature]] <= best.threshold {
                samples.swap(i, mid);
                mid += 1;
            }
        }

        let (left_samples, right_samples) = samples.split_at_mut(mid);
        let left  = self.grow(ctx, left_samples, depth + 1, rng);
        let right = self.grow(ctx, right_samples, depth + 1, rng);

        tracing::trace!(depth, feature = best.feature, impurity = best.impurity, "split");
        self.nodes[node_idx] = Node::Split {
            feature:   best.feature,
            threshold: best.threshold,
            left,
            right,
        };
        node_idx
    }
}

fn class_counts(ctx: &GrowCtx<'_>, samples: &[usize]) -> Vec<usize> {
    let mut counts = vec![0usize; ctx.n_classes];
    for &s in samples {
        counts[ctx.targets[s]] += 1;
    }
    counts
}

fn leaf(counts: &[usize], total: usize) -> Node {
    let total = total.max(1) as f64;
    Node::Leaf {
        distribution: counts.iter().map(|&c| c as f64 / total).collect(),
    }
}

fn gini(counts: &[usize], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    1.0 - counts.iter().map(|&c| (c as f64 / total).powi(2)).sum::<f64>()
}

/// Lowest weighted child impurity over the sampled features.
/// None when no feature has two distinct values that respect
/// `min_samples_leaf`.
fn best_split<R: Rng>(ctx: &GrowCtx<'_>, samples: &[usize], rng: &mut R) -> Option<BestSplit> {
    let n_features = ctx.rows.ncols();
    let k          = ctx.params.max_features.clamp(1, n_features);
    let n          = samples.len();
    let min_leaf   = ctx.params.min_samples_leaf.max(1);

    let mut best: Option<BestSplit> = None;
    let mut column: Vec<(f64, usize)> = Vec::with_capacity(n);

    for feature in sample(rng, n_features, k).into_iter() {
        column.clear();
        column.extend(samples.iter().map(|&s| (ctx.rows[[s, feature]], ctx.targets[s])));
        column.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut left_counts  = vec![0usize; ctx.n_classes];
        let mut right_counts = vec![0usize; ctx.n_classes];
        for &(_, t) in &column {
            right_counts[t] += 1;
        }

        for i in 0..n - 1 {
            let (value, target) = column[i];
            left_counts[target]  += 1;
            right_counts[target] -= 1;

            let next = column[i + 1].0;
            let n_left  = i + 1;
            let n_right = n - n_left;
            if value >= next || n_left < min_leaf || n_right < min_leaf {
                continue;
            }

            let impurity = (n_left as f64 * gini(&left_counts, n_left)
                + n_right as f64 * gini(&right_counts, n_right))
                / n as f64;

            if best.as_ref().map_or(true, |b| impurity < b.impurity) {
                let mut threshold = value + (next - value) / 2.0;
                if threshold >= next {
                    threshold = value;
                }
                best = Some(BestSplit { feature, threshold, impurity });
            }
        }
    }

    best
}
