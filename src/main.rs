mod demo_scenes;

use deferred_engine::{
    App, Context, EngineSettings, HeadlessPlatform, RendererRegistry, ScriptedEvent,
};
use demo_scenes::DemoScene;

const ACTIVE_SCENE: DemoScene = DemoScene::Cube;
const FRAMES: u64 = 120;

fn main() {
    deferred_engine::init_logging();

    let settings = EngineSettings::load();
    let texture = std::env::args().nth(1);

    let mut context = Context::new();
    if let Err(err) = ACTIVE_SCENE.build(&mut context, texture.as_deref()) {
        log::error!("Failed to build demo scene: {}", err);
        std::process::exit(1);
    }

    // Halfway through, tab over to the other demo scene.
    let mut platform = HeadlessPlatform::new(settings.window.width, settings.window.height, FRAMES)
        .with_step(1.0 / 30.0)
        .schedule(FRAMES / 2, ScriptedEvent::Press("tab".into()))
        .schedule(FRAMES / 2 + 1, ScriptedEvent::Release("tab".into()));
    let result = App::new(settings, context, &RendererRegistry::with_defaults())
        .and_then(|mut app| app.run(&mut platform));

    if let Err(err) = result {
        eprintln!("Application error: {err}");
        std::process::exit(1);
    }
    log::info!("Presented {} frames", platform.presented_frames());
}
