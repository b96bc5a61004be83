use std::path::PathBuf;

#[test]
fn shipped_configs_validate() {
    let crate_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let root = crate_dir
        .parent()
        .and_then(|p| p.parent())
        .expect("workspace root");

    let configs = ["configs/plant.yaml", "configs/plant-extended.yaml"];

    for rel in configs {
        let path = root.join(rel);
        let result = hv_project::load_yaml(&path);
        assert!(
            result.is_ok(),
            "config failed validation: {} => {:?}",
            path.display(),
            result.err()
        );
    }
}
