use glam::Vec2;
use log::{debug, warn};

pub mod grid;
pub mod modes;
pub mod props;
pub mod surface;

use grid::{GridState, GridType};
use modes::{DragState, SceneMode};
use props::{Prop, PropSet};
use surface::{DrawSurface, PointerEvent, PointerEventKind, PropKey};

/// One scene: a grid, its props and the active interaction mode, drawn
/// onto whatever surface hosts it.
pub struct SceneController<S: DrawSurface> {
    surface: S,
    grid: GridState,
    props: PropSet,
    mode: SceneMode,
    drag: Option<DragState>,
    viewport: Vec2,
}

impl<S: DrawSurface> SceneController<S> {
    pub fn new(surface: S) -> Self {
        SceneController {
            surface,
            grid: GridState::default(),
            props: PropSet::default(),
            mode: SceneMode::default(),
            drag: None,
            viewport: Vec2::ZERO,
        }
    }

    pub fn grid(&self) -> &GridState {
        &self.grid
    }

    pub fn mode(&self) -> SceneMode {
        self.mode
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn prop(&self, key: PropKey) -> Option<&Prop> {
        self.props.get(key)
    }

    pub fn props(&self) -> impl Iterator<Item = &Prop> {
        self.props.iter()
    }

    /// The single entry point for resizing or re-tiling the scene. All
    /// four values change together so the background, the cell counts and
    /// the drawn geometry can never disagree.
    pub fn set_scene_size(&mut self, width: f32, height: f32, grid_size: f32, grid_type: GridType) {
        self.grid.width = width;
        self.grid.height = height;
        self.grid.grid_size = grid_size;
        self.grid.grid_type = grid_type;

        self.surface.rect(Vec2::ZERO, Vec2::new(width, height));
        self.grid.rebuild(&mut self.surface);
        self.center_viewport();
        debug!(
            "Scene resized to {}x{}, {} grid of {}x{} cells",
            width,
            height,
            grid_type.readable(),
            self.grid.grid_width,
            self.grid.grid_height
        );
    }

    /// Resets any pan offset, recentering the scene on the surface.
    pub fn center_viewport(&mut self) {
        self.viewport = Vec2::ZERO;
        self.surface.set_viewport(self.viewport);
    }

    /// Switches the interaction mode, running the outgoing mode's unset
    /// hook before the incoming mode's set hook. An in-flight drag is
    /// cancelled, returning a dragged prop to its last committed cell.
    pub fn set_mode(&mut self, mode: SceneMode) {
        if mode == self.mode {
            return;
        }

        if let Some(DragState::Prop { key, .. }) = self.drag {
            if let Some(prop) = self.props.get(key) {
                self.surface.move_sprite(key, prop.position);
            }
        }
        self.drag = None;

        self.mode.unset(&mut self.surface);
        self.mode = mode;
        self.mode.set(&mut self.surface);
    }

    /// Places a prop, snapped onto the grid.
    pub fn add_prop(&mut self, image_ref: &str, position: Vec2) -> PropKey {
        let snapped = self.grid.snap(position);
        let key = self.props.insert(image_ref, snapped);
        self.surface.place_sprite(key, image_ref, snapped);
        key
    }

    pub fn remove_prop(&mut self, key: PropKey) -> bool {
        if let Some(DragState::Prop { key: dragged, .. }) = self.drag {
            if dragged == key {
                self.drag = None;
            }
        }

        match self.props.remove(key) {
            Some(_) => {
                self.surface.remove_sprite(key);
                true
            }
            None => {
                warn!("Tried to remove unknown prop {}", key);
                false
            }
        }
    }

    /// Routes a pointer event through the active mode. Release events
    /// inside and outside the scene are treated identically, so a drag
    /// always terminates.
    pub fn handle_pointer(&mut self, event: PointerEvent) {
        match event.kind {
            PointerEventKind::Down => self.pointer_down(event),
            PointerEventKind::Move => self.pointer_move(event),
            PointerEventKind::Up | PointerEventKind::UpOutside => self.pointer_up(event),
        }
    }

    fn pointer_down(&mut self, event: PointerEvent) {
        match self.mode {
            SceneMode::Select => {
                let Some(key) = event.target else {
                    return;
                };
                let Some(prop) = self.props.get(key) else {
                    warn!("Pointer down on unknown prop {}", key);
                    return;
                };
                self.drag = Some(DragState::Prop {
                    key,
                    grab_offset: prop.position - event.position,
                });
            }
            SceneMode::Pan => {
                self.drag = Some(DragState::Pan {
                    pointer_start: event.position,
                    viewport_start: self.viewport,
                });
            }
        }
    }

    fn pointer_move(&mut self, event: PointerEvent) {
        match self.drag {
            Some(DragState::Prop { key, grab_offset }) => {
                // Free movement while dragging; snapping happens on release.
                self.surface.move_sprite(key, event.position + grab_offset);
            }
            Some(DragState::Pan {
                pointer_start,
                viewport_start,
            }) => {
                self.viewport = viewport_start + (event.position - pointer_start);
                self.surface.set_viewport(self.viewport);
            }
            None => {}
        }
    }

    fn pointer_up(&mut self, event: PointerEvent) {
        match self.drag.take() {
            Some(DragState::Prop { key, grab_offset }) => {
                let landed = self.grid.snap(event.position + grab_offset);
                if let Some(prop) = self.props.get_mut(key) {
                    prop.position = landed;
                }
                self.surface.move_sprite(key, landed);
            }
            Some(DragState::Pan { .. }) | None => {}
        }
    }
}
