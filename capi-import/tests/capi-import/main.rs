use std::path::Path;

use anyhow::Context;
use capi_import::{Config, ImageCatalog, Outcome, Pipeline, ProviderConfig, Release, ResourceMap};
use serde::Deserialize;

datatest_stable::harness! {
    { test = test, root = "tests/capi-import/testdata", pattern = r".*/case.yaml" },
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct Case {
    version: String,
    provider: ProviderConfig,
}

fn test(path: &Path) -> datatest_stable::Result<()> {
    let dir = path.parent().unwrap();
    let case: Case = serde_yaml::from_str(&std::fs::read_to_string(path)?)?;
    let release = Release {
        metadata: std::fs::read(dir.join("metadata.yaml"))?,
        components: std::fs::read_to_string(dir.join("components.yaml"))?,
    };

    let ctx = case.provider.context(case.version.as_str());
    let pipeline = Pipeline::new(Config::builtin());
    let result = pipeline.run(&case.provider, &ctx, &release, ImageCatalog::default());

    let (expected, unexpected) = match &result {
        Ok(_) => (dir.join("expected.yaml"), dir.join("expected.stderr")),
        Err(_) => (dir.join("expected.stderr"), dir.join("expected.yaml")),
    };
    if unexpected.exists() && !update_snapshots() {
        return Err(format!(
            "{} expects {}, but the import {}",
            path.display(),
            unexpected.display(),
            if result.is_ok() { "succeeded" } else { "failed" },
        )
        .into());
    }

    match result {
        Ok(outcome) => {
            let again = pipeline.run(&case.provider, &ctx, &release, ImageCatalog::default())?;
            if again != outcome {
                return Err(format!("output of {} is not deterministic", path.display()).into());
            }

            check_conservation(&release, &outcome)?;
            snapshot(&expected, &render(&outcome))?;
        }
        Err(err) => {
            eprintln!("Error importing {}: {}", path.display(), err);
            snapshot(&expected, &format!("{err}\n"))?;
        }
    }
    Ok(())
}

fn check_conservation(release: &Release, outcome: &Outcome) -> datatest_stable::Result<()> {
    let input = ResourceMap::from_yaml_stream(&release.components)?.len();
    let output = outcome.components + outcome.rbac + outcome.dropped;
    if input != output {
        return Err(format!("{input} objects in, {output} accounted for").into());
    }
    Ok(())
}

fn render(outcome: &Outcome) -> String {
    let mut buf = String::new();
    for file in &outcome.files {
        buf.push_str(&format!("# {}\n", file.path.display()));
        buf.push_str(&file.contents);
    }
    buf
}

fn update_snapshots() -> bool {
    std::env::var("UPDATE_SNAPSHOTS").is_ok()
}

/// Compares `actual` against the snapshot at `path`. Snapshots are only written, or
/// created, with `UPDATE_SNAPSHOTS` set.
fn snapshot(path: &Path, actual: &str) -> datatest_stable::Result<()> {
    if update_snapshots() {
        std::fs::write(path, actual).context("writing snapshot")?;
        return Ok(());
    }

    if !path.exists() {
        return Err(format!(
            "missing snapshot {}, rerun with UPDATE_SNAPSHOTS=1 to create it",
            path.display()
        )
        .into());
    }

    let expected = std::fs::read_to_string(path).context("reading snapshot")?;
    if expected == actual {
        return Ok(());
    }

    let chunks = dissimilar::diff(&expected, actual);
    eprintln!(
        "Snapshot mismatch for {}:\n{}",
        path.display(),
        format_chunks(chunks)
    );

    Err(format!("Snapshot mismatch for {}", path.display()).into())
}

fn format_chunks(chunks: Vec<dissimilar::Chunk>) -> String {
    let mut buf = String::new();
    for chunk in chunks {
        let formatted = match chunk {
            dissimilar::Chunk::Equal(text) => text.into(),
            dissimilar::Chunk::Delete(text) => format!("\x1b[4m\x1b[31m{}\x1b[0m", text),
            dissimilar::Chunk::Insert(text) => format!("\x1b[4m\x1b[32m{}\x1b[0m", text),
        };
        buf.push_str(&formatted);
    }
    buf
}
