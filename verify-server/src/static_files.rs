// verify-server/src/static_files.rs
use actix_files::Files;
use actix_web::web;
use common::StaticFilesConfig;
use std::path::Path;

/// Serve the embedded game build read-only.
///
/// A missing asset directory only disables the mount; the API keeps working.
pub fn configure(cfg: &mut web::ServiceConfig, config: &StaticFilesConfig) {
    let root = Path::new(&config.path);
    if !root.is_dir() {
        tracing::warn!(
            "Game assets not found at {}; {} will not be served",
            root.display(),
            config.mount_path
        );
        return;
    }

    tracing::info!("Serving game assets from {} at {}", root.display(), config.mount_path);

    cfg.service(
        Files::new(&config.mount_path, root)
            .index_file(config.index.clone())
            .prefer_utf8(true)
            .use_etag(true)
            .use_last_modified(true),
    );
}
