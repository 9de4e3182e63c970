#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use hoverplane::{AppConfig, ImageSource};

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Image files to show; procedural swatches when none are given.
    let images = std::env::args_os()
        .skip(1)
        .map(|path| ImageSource::File(path.into()))
        .collect();

    if let Err(err) = hoverplane::run_with_config(AppConfig::new().images(images)) {
        log::error!("{err}");
        std::process::exit(1);
    }
}

// The browser build starts from `hoverplane::mount` instead.
#[cfg(target_arch = "wasm32")]
fn main() {}
