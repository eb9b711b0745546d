use std::io;
use std::time::Duration;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use viewpoint_console::logging::{LogEvent, LogSink};
use viewpoint_console::{
    ConsoleRuntime, DisplayInfo, DisplayRegistry, ImageResolver, LayoutManager, LayoutParams,
    LayoutType, Logger, LoggingResult, Rect, Result, RuntimeEvent, Size, TextureCache,
    build_layout, shared_displays,
};

#[derive(Clone, Default)]
struct NullSink;

impl LogSink for NullSink {
    fn log(&self, _event: &LogEvent) -> LoggingResult<()> {
        Ok(())
    }
}

const CAMERAS: usize = 6;

fn registry() -> DisplayRegistry {
    let mut registry = DisplayRegistry::new();
    for ix in 0..CAMERAS {
        registry.register(DisplayInfo::new(format!("cam{ix}"), 320, 240, 3));
    }
    registry
}

fn build_runtime(layout: LayoutType) -> Result<ConsoleRuntime> {
    let mut runtime = ConsoleRuntime::new(
        LayoutManager::new(LayoutParams::default()),
        shared_displays(registry()),
        Size::new(120, 40),
    );
    let config = runtime.config_mut();
    config.logger = Some(Logger::new(NullSink));
    config.metrics_interval = Duration::from_millis(0);
    config.enable_metrics();
    runtime.select_layout(layout)?;
    Ok(runtime)
}

fn scripted_events() -> Vec<RuntimeEvent> {
    let tick = RuntimeEvent::Tick {
        elapsed: Duration::from_millis(33),
    };
    let mut events = Vec::new();
    for ix in 0..60 {
        events.push(tick.clone());
        match ix % 6 {
            0 => events.push(RuntimeEvent::Command("primary_next".into())),
            1 => events.push(RuntimeEvent::Controller("grab=1;clutch=0".into())),
            2 => events.push(RuntimeEvent::Key(KeyEvent::new(
                KeyCode::Right,
                KeyModifiers::NONE,
            ))),
            3 => events.push(RuntimeEvent::Command("toggle".into())),
            4 => events.push(RuntimeEvent::Controller("grab=0;clutch=1".into())),
            _ => events.push(RuntimeEvent::Collision("contact".into())),
        }
    }
    events
}

fn runtime_layout_scripts(c: &mut Criterion) {
    let script = scripted_events();
    for layout in [LayoutType::Wide, LayoutType::TimedPip, LayoutType::Grid] {
        let name = format!("runtime_script_{layout:?}").to_lowercase();
        c.bench_function(&name, |b| {
            b.iter(|| {
                let mut runtime = build_runtime(layout).expect("runtime");
                let mut sink = io::sink();
                runtime
                    .run_scripted(&mut sink, black_box(script.clone()))
                    .expect("scripted run");
            });
        });
    }
}

fn layout_switching(c: &mut Criterion) {
    c.bench_function("runtime_layout_switch_cycle", |b| {
        b.iter(|| {
            let mut runtime = build_runtime(LayoutType::Wide).expect("runtime");
            let mut sink = io::sink();
            let events = (1..=10u8)
                .flat_map(|n| {
                    [
                        RuntimeEvent::Key(KeyEvent::new(KeyCode::F(n), KeyModifiers::NONE)),
                        RuntimeEvent::Tick {
                            elapsed: Duration::from_millis(33),
                        },
                    ]
                })
                .collect::<Vec<_>>();
            runtime
                .run_scripted(&mut sink, black_box(events))
                .expect("switch cycle");
        });
    });
}

fn texture_resolve(c: &mut Criterion) {
    let displays = registry();
    let params = LayoutParams::default();
    let mut layout = build_layout(LayoutType::Grid, &displays, &params).expect("grid layout");
    layout.core_mut().set_display_bounds(Rect::new(0, 0, 120, 40));
    layout.draw(&displays).expect("draw");
    let requests = layout.core_mut().take_image_requests();

    c.bench_function("texture_resolve_unchanged", |b| {
        let mut cache = TextureCache::new();
        b.iter(|| {
            let responses = cache
                .resolve(&displays, black_box(&requests))
                .expect("resolve");
            black_box(responses);
        });
    });
}

criterion_group!(
    benches,
    runtime_layout_scripts,
    layout_switching,
    texture_resolve
);
criterion_main!(benches);
