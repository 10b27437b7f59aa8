use crate::scene::SceneController;
use crate::scene::grid::GridType;
use crate::scene::modes::SceneMode;
use crate::scene::surface::{PointerEvent, PointerEventKind, RecordingSurface};
use crate::settings::{CliArgs, FieldEdit, OperationMode};
use anyhow::Context;
use clap::Parser;
use glam::Vec2;
use itertools::Itertools;
use sheetxml::renderer::{DisplayNode, RenderWatcher, render_sheet};
use sheetxml::{SheetEngine, Value};
use std::fs;

pub mod scene;
mod settings;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = CliArgs::parse();
    log::trace!("Starting with args: {:?}", args);

    match args.operation_mode {
        OperationMode::RenderSheet {
            sheet,
            actor,
            ruleset,
            set,
        } => run_render_sheet(&sheet, actor.as_deref(), ruleset.as_deref(), &set),
        OperationMode::SceneDemo {
            width,
            height,
            grid_size,
            grid_type,
        } => {
            run_scene_demo(width, height, grid_size, grid_type);
            Ok(())
        }
    }
}

fn run_render_sheet(
    sheet_path: &str,
    actor_path: Option<&str>,
    ruleset_path: Option<&str>,
    edits: &[FieldEdit],
) -> anyhow::Result<()> {
    let markup = fs::read_to_string(sheet_path)
        .with_context(|| format!("Failed to read sheet markup from {}", sheet_path))?;

    let mut engine = SheetEngine::new();
    engine.load_sheet(sheet_path, &markup)?;

    if let Some(path) = actor_path {
        engine.load_actor(path, Some(read_document(path)?), false);
    }
    if let Some(path) = ruleset_path {
        engine.load_ruleset(path, read_document(path)?);
    }

    let render_id = engine.create_render(actor_path, sheet_path, ruleset_path);
    let mut watcher = RenderWatcher::new(&engine);

    match render_sheet(&engine, &render_id) {
        Some(tree) => print_tree(&tree, 0),
        None => println!("The sheet rendered to nothing."),
    }

    if edits.is_empty() {
        return Ok(());
    }

    for edit in edits {
        engine.set_actor_field(&render_id, &edit.path, coerce_value(&edit.value));
    }

    if watcher.poll(&engine) {
        println!();
        println!("After {} edit(s):", edits.len());
        if let Some(tree) = render_sheet(&engine, &render_id) {
            print_tree(&tree, 0);
        }
    }

    Ok(())
}

fn read_document(path: &str) -> anyhow::Result<Value> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read document from {}", path))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {} as JSON", path))
}

/// `--set` values arrive as strings; numbers and booleans are written as
/// their typed counterparts so bindings compare the way documents do.
fn coerce_value(raw: &str) -> Value {
    if let Ok(number) = raw.parse::<f64>() {
        return Value::Number(number);
    }
    match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::from(raw),
    }
}

fn print_tree(node: &DisplayNode, depth: usize) {
    let props = node
        .props
        .iter()
        .map(|(name, value)| format!("{}=\"{}\"", name, value))
        .join(" ");

    if props.is_empty() {
        println!("{}{:?}", "  ".repeat(depth), node.kind);
    } else {
        println!("{}{:?} {}", "  ".repeat(depth), node.kind, props);
    }

    for child in &node.children {
        print_tree(child, depth + 1);
    }
}

/// A fixed interaction script: place two props, drag one, pan, recenter.
/// Everything the scene asked the surface to draw is printed afterwards.
fn run_scene_demo(width: f32, height: f32, grid_size: f32, grid_type: GridType) {
    let mut scene = SceneController::new(RecordingSurface::new());
    scene.set_scene_size(width, height, grid_size, grid_type);

    let hero = scene.add_prop("hero.png", Vec2::new(width * 0.25, height * 0.5));
    scene.add_prop("goblin.png", Vec2::new(width * 0.75, height * 0.5));

    scene.handle_pointer(PointerEvent {
        kind: PointerEventKind::Down,
        position: scene.prop(hero).map(|prop| prop.position).unwrap_or(Vec2::ZERO),
        target: Some(hero),
    });
    scene.handle_pointer(PointerEvent {
        kind: PointerEventKind::Move,
        position: Vec2::new(width * 0.5, height * 0.25),
        target: None,
    });
    scene.handle_pointer(PointerEvent {
        kind: PointerEventKind::Up,
        position: Vec2::new(width * 0.5, height * 0.25),
        target: None,
    });

    scene.set_mode(SceneMode::Pan);
    scene.handle_pointer(PointerEvent {
        kind: PointerEventKind::Down,
        position: Vec2::new(10.0, 10.0),
        target: None,
    });
    scene.handle_pointer(PointerEvent {
        kind: PointerEventKind::Move,
        position: Vec2::new(90.0, 40.0),
        target: None,
    });
    scene.handle_pointer(PointerEvent {
        kind: PointerEventKind::Up,
        position: Vec2::new(90.0, 40.0),
        target: None,
    });
    scene.center_viewport();

    println!(
        "Scene {}x{}, {} grid of {}x{} cells",
        width,
        height,
        grid_type.readable(),
        scene.grid().grid_width,
        scene.grid().grid_height
    );
    for command in &scene.surface().commands {
        println!("{:?}", command);
    }
}
