use anyhow::{Context, bail};
use qcar_pade::{SampleMatrix, build_labels, enumerate_labels, estimate};
use qcar_sim::{ArcProbe, FeatureColumn, TrajectorySample, collect_sweep, feature_column, feature_rows, random_probes};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{info, warn};

use crate::config::{Analysis, AppConfig};

/// One qualitative class found in the data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassSummary {
    pub id: usize,
    pub label: String,
    pub count: usize,
}

/// Heading sweep, then PADE on the configured sweep columns.
pub fn run_sweep(config: &AppConfig) -> anyhow::Result<Vec<ClassSummary>> {
    let samples = collect_sweep(&config.sweep).context("Heading sweep failed")?;
    let (rows, target) = sweep_table(&samples, &config.pade.sweep);
    classify(&rows, &target, &config.pade.sweep, config.pade.neighbours)
}

/// Random arc probes, then PADE on the configured probe columns.
///
/// A `seed` makes the probes reproducible.
pub fn run_probe(config: &AppConfig, seed: Option<u64>) -> anyhow::Result<Vec<ClassSummary>> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    };
    let probes = random_probes(&mut rng, &config.probe).context("Arc probes failed")?;
    let (rows, target) = probe_table(&probes, &config.pade.probe)?;
    classify(&rows, &target, &config.pade.probe, config.pade.neighbours)
}

fn sweep_table(samples: &[TrajectorySample], analysis: &Analysis) -> (Vec<Vec<f64>>, Vec<f64>) {
    (
        feature_rows(samples, &analysis.features),
        feature_column(samples, analysis.target),
    )
}

fn probe_table(probes: &[ArcProbe], analysis: &Analysis) -> anyhow::Result<(Vec<Vec<f64>>, Vec<f64>)> {
    let value = |p: &ArcProbe, c: FeatureColumn| {
        p.get(c).with_context(|| format!("Arc probes have no '{c}' column"))
    };
    let rows = probes
        .iter()
        .map(|p| {
            analysis
                .features
                .iter()
                .map(|&c| value(p, c))
                .collect::<anyhow::Result<Vec<f64>>>()
        })
        .collect::<anyhow::Result<Vec<Vec<f64>>>>()?;
    let target = probes
        .iter()
        .map(|p| value(p, analysis.target))
        .collect::<anyhow::Result<Vec<f64>>>()?;
    Ok((rows, target))
}

/// Estimates the Q-table, keeps the label columns and groups samples by label.
pub fn classify(
    rows: &[Vec<f64>],
    target: &[f64],
    analysis: &Analysis,
    neighbours: usize,
) -> anyhow::Result<Vec<ClassSummary>> {
    let columns = analysis
        .labels
        .iter()
        .map(|label| match analysis.features.iter().position(|f| f == label) {
            Some(i) => Ok(i),
            None => bail!("Label column '{label}' is not among the features"),
        })
        .collect::<anyhow::Result<Vec<usize>>>()?;

    if rows.is_empty() {
        warn!("No samples to analyse");
        return Ok(Vec::new());
    }

    let data = SampleMatrix::from_rows(rows)?;
    let table = estimate(&data, target, neighbours)?.select_columns(&columns)?;
    let names: Vec<&str> = analysis.labels.iter().map(|c| c.name()).collect();
    let labels = build_labels(&table, &names)?;
    let (classes, class_names) = enumerate_labels(&labels);

    let mut counts = vec![0; class_names.len()];
    for class in classes {
        counts[class] += 1;
    }
    info!(
        samples = rows.len(),
        classes = class_names.len(),
        target = %analysis.target,
        "Qualitative classes found"
    );

    Ok(class_names
        .into_iter()
        .zip(counts)
        .enumerate()
        .map(|(id, (label, count))| ClassSummary { id, label, count })
        .collect())
}

pub fn print_classes(classes: &[ClassSummary]) {
    println!("{:>5}  {:>7}  label", "class", "samples");
    for class in classes {
        println!("{:>5}  {:>7}  {}", class.id, class.count, class.label);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qcar_sim::{ProbeConfig, SweepConfig};

    fn analysis(features: &[FeatureColumn], target: FeatureColumn, labels: &[FeatureColumn]) -> Analysis {
        Analysis {
            features: features.to_vec(),
            target,
            labels: labels.to_vec(),
        }
    }

    #[test]
    fn test_classify_counts_per_label() {
        let rows: Vec<Vec<f64>> = (0..6).map(|i| vec![i as f64, 0.0]).collect();
        let target = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0];
        let a = analysis(
            &[FeatureColumn::X, FeatureColumn::Y],
            FeatureColumn::Dx,
            &[FeatureColumn::Y, FeatureColumn::X],
        );

        let classes = classify(&rows, &target, &a, 2).unwrap();
        assert_eq!(
            classes,
            vec![ClassSummary { id: 0, label: "Q(+x)".into(), count: 6 }]
        );
    }

    #[test]
    fn test_label_must_be_a_feature() {
        let a = analysis(&[FeatureColumn::X], FeatureColumn::Dx, &[FeatureColumn::Gamma]);
        let err = classify(&[vec![0.0]], &[0.0], &a, 1).unwrap_err();
        assert!(err.to_string().contains("gamma"));
    }

    #[test]
    fn test_probe_table_rejects_absolute_position() {
        let a = analysis(&[FeatureColumn::X], FeatureColumn::Dx, &[]);
        assert!(probe_table(&[ArcProbe::default()], &a).is_err());
    }

    #[test]
    fn test_sweep_classes_cover_all_samples() {
        let mut config = AppConfig::default();
        config.sweep = SweepConfig {
            initial_headings: vec![0.0, 90.0],
            samples_per_heading: 41,
            ..SweepConfig::default()
        };
        config.pade.neighbours = 5;

        let classes = run_sweep(&config).unwrap();
        assert_eq!(classes.iter().map(|c| c.count).sum::<usize>(), 80);
        assert!(classes.windows(2).all(|w| w[0].label < w[1].label));
    }

    #[test]
    fn test_seeded_probe_is_reproducible() {
        let mut config = AppConfig::default();
        config.probe = ProbeConfig { count: 40, ..ProbeConfig::default() };
        config.pade.neighbours = 5;

        let a = run_probe(&config, Some(3)).unwrap();
        let b = run_probe(&config, Some(3)).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.iter().map(|c| c.count).sum::<usize>(), 40);
    }
}
