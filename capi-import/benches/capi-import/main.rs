use capi_import::{Config, ImageCatalog, Outcome, Pipeline, ProviderConfig, Release};

fn main() {
    divan::main();
}

fn import(case: &str, name: &str, version: &str) -> Outcome {
    let config = Config::builtin();
    let provider: &ProviderConfig = config
        .providers(Some(name))
        .next()
        .expect("configured provider");
    let dir = format!("tests/capi-import/testdata/{case}");
    let release = Release {
        metadata: std::fs::read(format!("{dir}/metadata.yaml")).unwrap(),
        components: std::fs::read_to_string(format!("{dir}/components.yaml")).unwrap(),
    };
    Pipeline::new(config)
        .run(
            provider,
            &provider.context(version),
            &release,
            ImageCatalog::default(),
        )
        .unwrap()
}

#[divan::bench]
fn import_core() -> Outcome {
    import("core-cluster-api", "cluster-api", "v1.4.0")
}

#[divan::bench]
fn import_metal3() -> Outcome {
    import("infrastructure-metal3", "metal3", "v1.3.0")
}
