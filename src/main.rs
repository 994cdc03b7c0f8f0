use anyhow::Context;
use graphly::{FeatureMatrix, Pipeline, PipelineConfig, StudyMode};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing_subscriber::EnvFilter;

const GROUPS: usize = 3;
const ROWS_PER_GROUP: usize = 20;
const FEATURES: usize = 6;

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("Graphly v{}", graphly::version());
    println!("==========================================");
    println!();

    let matrix = synthetic_districts(42).context("building demo dataset")?;
    println!(
        "Demo dataset: {} districts x {} indicators",
        matrix.row_count(),
        matrix.column_count()
    );

    for mode in StudyMode::ALL {
        let config = PipelineConfig::default()
            .with_threshold(0.8)
            .with_mode(mode)
            .with_pca(4, 80.0);

        let output = Pipeline::new(config)?
            .run(&matrix)
            .with_context(|| format!("study '{}'", mode))?;

        println!("\n=== Study: {} ===", mode);
        println!(
            "  columns: {} -> {}",
            output.transform_summary.input_columns, output.transform_summary.output_columns
        );
        println!("{}", serde_json::to_string_pretty(&output.report())?);

        for warning in &output.communities.warnings {
            println!("  warning: {}", warning);
        }
    }

    Ok(())
}

/// Rows drawn around three group profiles with skewed, strictly positive
/// indicators
fn synthetic_districts(seed: u64) -> graphly::PipelineResult<FeatureMatrix> {
    let mut rng = StdRng::seed_from_u64(seed);
    let profiles: Vec<Vec<f64>> = (0..GROUPS)
        .map(|_| (0..FEATURES).map(|_| rng.gen_range(1.0..10.0)).collect())
        .collect();

    let mut ids = Vec::with_capacity(GROUPS * ROWS_PER_GROUP);
    let mut rows = Vec::with_capacity(GROUPS * ROWS_PER_GROUP);
    for (g, profile) in profiles.iter().enumerate() {
        for r in 0..ROWS_PER_GROUP {
            ids.push(format!("district-{}-{:02}", g, r));
            rows.push(
                profile
                    .iter()
                    .map(|&base| base * rng.gen_range(0.7_f64..1.3).powi(2))
                    .collect(),
            );
        }
    }

    let names = (0..FEATURES).map(|j| format!("indicator{}", j)).collect();
    FeatureMatrix::new(ids, rows)?.with_column_names(names)
}
