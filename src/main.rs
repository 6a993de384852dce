use crate::engine::renderer::Renderer;
use crate::engine::settings::WindowSettings;

mod engine;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = WindowSettings::default();

    let renderer = match Renderer::new(&settings) {
        Ok(renderer) => renderer,
        Err(err) => fail(err),
    };

    if let Err(err) = renderer.run() {
        fail(err);
    }
}

fn fail(err: engine::renderer::RendererError) -> ! {
    if !err.already_reported() {
        println!("{err}");
    }
    if let Some(source) = std::error::Error::source(&err) {
        log::error!("{err}: {source}");
    }
    std::process::exit(-1);
}
